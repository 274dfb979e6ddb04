/*
 * Copyright (c) 2026. Mikhail Kulik.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 * You may obtain a copy of the License at
 *
 *     http://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 */

use std::collections::HashSet;

use super::{compile_with, gc_options, lower_err, lower_err_with, lower_ok, lower_with};
use crate::error::CompileError;
use crate::ir::{BinaryOp, ExprKind, Function, Literal, UnaryOp};
use crate::types::{NumKind, WasmType};
use crate::{CompileOptions, FloorDivision};

const PRELUDE: &str = "from wasmfunc import wasmfunc, i32, i64, f32, f64, array, string\n";

fn program(body: &str) -> String {
    format!("{PRELUDE}{body}")
}

fn binary_ops(function: &Function) -> Vec<BinaryOp> {
    function
        .nodes()
        .into_iter()
        .filter_map(|e| match &e.kind {
            ExprKind::Binary { op, .. } => Some(*op),
            _ => None,
        })
        .collect()
}

fn unary_ops(function: &Function) -> Vec<UnaryOp> {
    function
        .nodes()
        .into_iter()
        .filter_map(|e| match &e.kind {
            ExprKind::Unary { op, .. } => Some(*op),
            _ => None,
        })
        .collect()
}

// ─── Expressions ──────────────────────────────────────────────────────────────

#[test]
fn test_literal_defaults() {
    let module = lower_ok(&program(
        r#"
@wasmfunc()
def five() -> i32:
    return 2 + 3

@wasmfunc()
def half() -> f64:
    x = 0.5
    return x
"#,
    ));
    let five = module.function("five").unwrap();
    assert_eq!(binary_ops(five), vec![BinaryOp::AddI32]);
    let consts: Vec<Literal> = five
        .nodes()
        .into_iter()
        .filter_map(|e| match e.kind {
            ExprKind::Const(value) => Some(value),
            _ => None,
        })
        .collect();
    assert_eq!(consts, vec![Literal::I32(2), Literal::I32(3)]);

    let half = module.function("half").unwrap();
    assert_eq!(half.locals, vec![WasmType::F64]);
}

#[test]
fn test_recursive_call() {
    let module = lower_ok(&program(
        r#"
@wasmfunc()
def fib(n: i32) -> i32:
    if n <= 1:
        return n
    return fib(n - 1) + fib(n - 2)
"#,
    ));
    let fib = module.function("fib").unwrap();
    let calls = fib
        .nodes()
        .into_iter()
        .filter(|e| matches!(&e.kind, ExprKind::Call { target, .. } if target == "fib"))
        .count();
    assert_eq!(calls, 2);
    let adds = binary_ops(fib).into_iter().filter(|op| *op == BinaryOp::AddI32).count();
    assert_eq!(adds, 1);
}

#[test]
fn test_mixed_operands_are_unified() {
    let module = lower_ok(&program(
        r#"
@wasmfunc()
def widen(a: i32, b: f64) -> f64:
    return a + b

@wasmfunc()
def cross(a: i64, b: f32) -> f64:
    return a * b
"#,
    ));
    let widen = module.function("widen").unwrap();
    assert_eq!(unary_ops(widen), vec![UnaryOp::ConvertI32ToF64]);
    assert_eq!(binary_ops(widen), vec![BinaryOp::AddF64]);

    let cross = module.function("cross").unwrap();
    assert_eq!(unary_ops(cross), vec![UnaryOp::ConvertI64ToF64, UnaryOp::PromoteF32]);
    assert_eq!(binary_ops(cross), vec![BinaryOp::MulF64]);
}

#[test]
fn test_every_kind_pair_unifies() {
    let kinds = ["i32", "i64", "f32", "f64"];
    for a in kinds {
        for b in kinds {
            let source = program(&format!(
                "@wasmfunc()\ndef f(a: {a}, b: {b}) -> i32:\n    return a + b < a - b\n"
            ));
            compile_with(&source, &CompileOptions::default());
        }
    }
}

#[test]
fn test_true_division_is_float() {
    let module = lower_ok(&program(
        r#"
@wasmfunc()
def ratio(a: i32, b: i32) -> f32:
    return a / b

@wasmfunc()
def wide_ratio(a: i64, b: i32) -> f64:
    return a / b
"#,
    ));
    assert_eq!(binary_ops(module.function("ratio").unwrap()), vec![BinaryOp::DivF32]);
    assert_eq!(binary_ops(module.function("wide_ratio").unwrap()), vec![BinaryOp::DivF64]);
}

#[test]
fn test_floor_division_lowering() {
    let source = program(
        r#"
@wasmfunc()
def idiv(a: i32, b: i32) -> i32:
    return a // b

@wasmfunc()
def fdiv(a: f64, b: f64) -> f64:
    return a // b
"#,
    );
    let module = lower_ok(&source);
    assert_eq!(binary_ops(module.function("idiv").unwrap()), vec![BinaryOp::DivSI32]);
    let fdiv = module.function("fdiv").unwrap();
    assert_eq!(unary_ops(fdiv), vec![UnaryOp::FloorF64]);
    assert_eq!(binary_ops(fdiv), vec![BinaryOp::DivF64]);

    let floored = lower_with(&source, &CompileOptions::default().with_floor_division(FloorDivision::Floor));
    let idiv = floored.function("idiv").unwrap();
    assert!(binary_ops(idiv).contains(&BinaryOp::RemSI32));
    assert_eq!(idiv.locals.len(), 3);
}

#[test]
fn test_unary_lowering() {
    let module = lower_ok(&program(
        r#"
@wasmfunc()
def neg_int(x: i64) -> i64:
    return -x

@wasmfunc()
def neg_float(x: f32) -> f32:
    return -x

@wasmfunc()
def logical_not(x: i32) -> i32:
    return not x
"#,
    ));
    assert_eq!(binary_ops(module.function("neg_int").unwrap()), vec![BinaryOp::MulI64]);
    assert_eq!(unary_ops(module.function("neg_float").unwrap()), vec![UnaryOp::NegF32]);
    assert_eq!(binary_ops(module.function("logical_not").unwrap()), vec![BinaryOp::SubI32]);
}

#[test]
fn test_ternary_is_select() {
    let module = lower_ok(&program(
        r#"
@wasmfunc()
def pick(x: f64) -> f64:
    return 1 if x else 2.5
"#,
    ));
    let pick = module.function("pick").unwrap();
    let select = pick.nodes().into_iter().find(|e| matches!(e.kind, ExprKind::Select { .. }));
    assert_eq!(select.map(|e| e.ty), Some(WasmType::F64));
    // the f64 condition is compared against zero
    assert!(binary_ops(pick).contains(&BinaryOp::NeF64));
}

// ─── Statements ───────────────────────────────────────────────────────────────

#[test]
fn test_locals_and_names() {
    let module = lower_ok(&program(
        r#"
@wasmfunc()
def f(a: i32) -> i64:
    b: i64 = a
    c = b + 1
    c += a
    return c
"#,
    ));
    let f = module.function("f").unwrap();
    assert_eq!(f.locals, vec![WasmType::I64, WasmType::I64]);
    let names: Vec<&str> = f.local_names.iter().map(|(_, name)| name.as_str()).collect();
    assert_eq!(names, vec!["a", "b", "c"]);
}

#[test]
fn test_multiple_targets_use_scratch_local() {
    let module = lower_ok(&program(
        r#"
@wasmfunc()
def f() -> i32:
    a = b = 4
    return a + b
"#,
    ));
    let f = module.function("f").unwrap();
    // scratch, a, b
    assert_eq!(f.locals, vec![WasmType::I32; 3]);
    assert_eq!(f.local_names.len(), 2);
}

#[test]
fn test_loop_labels_are_unique() {
    let module = lower_ok(&program(
        r#"
@wasmfunc()
def f(n: i32) -> i32:
    i: i32 = 0
    while i < n:
        j: i32 = 0
        while j < n:
            j += 1
        i += 1
    return i

@wasmfunc()
def g(n: i32):
    while n > 0:
        n -= 1
"#,
    ));
    let mut labels = Vec::new();
    for function in &module.functions {
        for node in function.nodes() {
            match &node.kind {
                ExprKind::Loop { label, .. } => labels.push(label.clone()),
                ExprKind::Block { label: Some(label), .. } => labels.push(label.clone()),
                _ => {}
            }
        }
    }
    let unique: HashSet<&String> = labels.iter().collect();
    assert_eq!(labels.len(), 6);
    assert_eq!(unique.len(), labels.len());
}

#[test]
fn test_break_and_continue_targets() {
    let module = lower_ok(&program(
        r#"
@wasmfunc()
def f(n: i32):
    while n > 0:
        n -= 1
        if n == 5:
            continue
        if n == 2:
            break
"#,
    ));
    let targets: Vec<String> = module.functions[0]
        .nodes()
        .into_iter()
        .filter_map(|e| match &e.kind {
            ExprKind::Break { label, .. } => Some(label.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(targets, vec!["loop_0", "loop_body_0", "loop_0"]);
}

#[test]
fn test_expression_statements() {
    let module = lower_ok(&program(
        r#"
@wasmfunc()
def one() -> i32:
    return 1

@wasmfunc()
def f():
    """Docstring."""
    one()
    pass
"#,
    ));
    let f = module.function("f").unwrap();
    assert!(matches!(f.body[0].kind, ExprKind::Nop));
    assert!(matches!(f.body[1].kind, ExprKind::Drop(_)));
    assert!(matches!(f.body[2].kind, ExprKind::Nop));
}

#[test]
fn test_forward_reference() {
    let module = lower_ok(&program(
        r#"
@wasmfunc()
def first(x: i32) -> f64:
    return second(x)

@wasmfunc()
def second(x: f64) -> f64:
    return x * 2
"#,
    ));
    let first = module.function("first").unwrap();
    assert_eq!(unary_ops(first), vec![UnaryOp::ConvertI32ToF64]);
}

#[test]
fn test_unmarked_and_top_level_code_is_inert() {
    let module = lower_ok(&program(
        r#"
x = 1
if x:
    print(x)

def plain(a, b):
    return a ** b

@wasmfunc()
def f() -> i32:
    return 1

print(f())
"#,
    ));
    assert_eq!(module.functions.len(), 1);
    assert!(module.globals.is_empty());
}

// ─── Globals ──────────────────────────────────────────────────────────────────

#[test]
fn test_global_is_promoted_once() {
    let module = lower_ok(&program(
        r#"
num: i32 = 6
unused: f64 = 1.5
ratio: f32 = -2

@wasmfunc()
def get() -> i32:
    global num
    return num

@wasmfunc()
def add(x: i32) -> i32:
    global num, ratio
    num = num + x
    return num
"#,
    ));
    assert_eq!(module.globals.len(), 2);
    let num = module.global("num").unwrap();
    assert_eq!((num.ty, num.mutable, num.init), (NumKind::I32, true, Literal::I32(6)));
    assert_eq!(module.global("ratio").unwrap().init, Literal::F32(-2.0));
    assert!(module.global("unused").is_none());
}

#[test]
fn test_repeated_global_statement() {
    let module = lower_ok(&program(
        "num: i32 = 1\n\n@wasmfunc()\ndef f() -> i32:\n    global num\n    global num\n    return num\n",
    ));
    assert_eq!(module.globals.len(), 1);
    assert_eq!(module.global("num").unwrap().init, Literal::I32(1));
}

#[test]
fn test_global_errors() {
    let undeclared = lower_err(&program(
        "@wasmfunc()\ndef f():\n    global missing\n    missing = 1\n",
    ));
    assert!(matches!(undeclared, CompileError::Scope { .. }));

    let after_promotion = lower_err(&program(
        "num: i32 = 1\n\n@wasmfunc()\ndef f():\n    global num\n    num = 2\n\nnum = 3\n",
    ));
    assert!(matches!(after_promotion, CompileError::Scope { .. }));

    let redeclared = lower_err(&program("num: i32 = 1\nnum: i32 = 2\n"));
    assert!(matches!(redeclared, CompileError::Scope { .. }));

    let no_value = lower_err(&program("num: i32\n"));
    assert!(matches!(no_value, CompileError::Type { .. }));

    let not_constant = lower_err(&program("a: i32 = 1\nb: i32 = a + 1\n"));
    assert!(matches!(not_constant, CompileError::Type { .. }));

    let shadowed = lower_err(&program(
        "num: i32 = 1\n\n@wasmfunc()\ndef f():\n    num = 2\n    global num\n",
    ));
    assert!(matches!(shadowed, CompileError::Scope { .. }));
}

#[test]
fn test_non_wasm_annotation_at_top_level_is_ignored() {
    let module = lower_ok(&program("count: int = 0\nnames: list[str] = []\n"));
    assert!(module.globals.is_empty());
}

// ─── Error taxonomy ───────────────────────────────────────────────────────────

fn in_function(body: &str) -> String {
    let indented: String = body.lines().map(|line| format!("    {line}\n")).collect();
    program(&format!("@wasmfunc()\ndef f(x: i32, y: f64) -> i32:\n{indented}"))
}

#[test]
fn test_unsupported_constructs() {
    let cases = [
        "return 1 < x < 3",
        "return f(x=1, y=2.0)",
        "return x ** 2",
        "return x << 1",
        "return x and 1",
        "return ~x",
        "return x is 1",
        "a = None\nreturn 0",
        "a, b = 1, 2\nreturn a",
        "for i in x:\n    pass\nreturn 0",
        "def inner():\n    pass\nreturn 0",
        "class C:\n    pass\nreturn 0",
        "try:\n    pass\nexcept:\n    pass\nreturn 0",
        "assert x, 'message'\nreturn 0",
    ];
    for body in cases {
        let err = lower_err(&in_function(body));
        assert!(
            matches!(err, CompileError::Unsupported { .. }),
            "expected unsupported construct for {body:?}, got {err:?}"
        );
    }
}

#[test]
fn test_type_policy_violations() {
    let cases = [
        "return y % 2",
        "a: i32 = 1\na: f64 = 2.0\nreturn a",
        "a: i32 = 1\na: i32\nreturn a",
        "a: wrong = 1\nreturn a",
    ];
    for body in cases {
        let err = lower_err(&in_function(body));
        assert!(
            matches!(err, CompileError::Type { .. }),
            "expected type error for {body:?}, got {err:?}"
        );
    }
}

#[test]
fn test_plain_assignment_cannot_change_kind_of_value() {
    let source = in_function("a = 1\na = \"text\"\nreturn a");
    let err = lower_err_with(&source, &CompileOptions::default().with_gc().with_strings());
    assert!(matches!(err, CompileError::Type { .. }));
}

#[test]
fn test_scope_violations() {
    let cases = ["break\nreturn 0", "continue\nreturn 0", "return z", "return len(x)"];
    for body in cases {
        let err = lower_err(&in_function(body));
        assert!(
            matches!(err, CompileError::Scope { .. }),
            "expected scope error for {body:?}, got {err:?}"
        );
    }
}

#[test]
fn test_signature_violations() {
    let cases = ["return undefined_fn(1)", "return f(1)", "return f(1, 2.0, 3)"];
    for body in cases {
        let err = lower_err(&in_function(body));
        assert!(
            matches!(err, CompileError::Signature { .. }),
            "expected signature error for {body:?}, got {err:?}"
        );
    }
}

#[test]
fn test_error_carries_source_span() {
    let source = in_function("return z");
    let err = lower_err(&source);
    let span = err.span().cloned().unwrap();
    assert_eq!(&source[span], "z");
}

// ─── Arrays and strings ───────────────────────────────────────────────────────

const ARRAYS: &str = r#"
@wasmfunc()
def squares(n: i32) -> i32:
    xs: array[i32] = list(range(n))
    total: i32 = 0
    i: i32 = 0
    while i < len(xs):
        xs[i] = xs[i] * xs[i]
        total += xs[i]
        i += 1
    return total

@wasmfunc()
def countdown() -> array[f64]:
    return list(range(10, 0, -2))

@wasmfunc()
def literal_sum() -> f64:
    values: array[f64] = [1, 2.5, 3]
    values[0] = 4
    return values[0] + values[1] + values[2]

@wasmfunc()
def first(values: array[i64]) -> i64:
    return values[0]
"#;

#[test]
fn test_arrays_require_gc() {
    let err = lower_err(&program(ARRAYS));
    assert!(matches!(err, CompileError::Scope { .. }));
}

#[test]
fn test_arrays_lower_and_validate() {
    let module = lower_with(&program(ARRAYS), &gc_options());
    let squares = module.function("squares").unwrap();
    let kinds: Vec<&ExprKind> = squares.nodes().into_iter().map(|e| &e.kind).collect();
    assert!(kinds.iter().any(|k| matches!(k, ExprKind::ArrayNew { element: NumKind::I32, .. })));
    assert!(kinds.iter().any(|k| matches!(k, ExprKind::ArrayLen(_))));
    assert!(kinds.iter().any(|k| matches!(k, ExprKind::ArraySet { .. })));
    assert!(kinds.iter().any(|k| matches!(k, ExprKind::Loop { label, .. } if label.starts_with("range_"))));

    let literal_sum = module.function("literal_sum").unwrap();
    let fixed = literal_sum
        .nodes()
        .into_iter()
        .find_map(|e| match &e.kind {
            ExprKind::ArrayNewFixed { element, values } => Some((*element, values.len())),
            _ => None,
        });
    assert_eq!(fixed, Some((NumKind::F64, 3)));

    compile_with(&program(ARRAYS), &gc_options());
}

#[test]
fn test_list_needs_array_annotation() {
    let err = lower_err_with(&in_function("a = [1, 2]\nreturn 0"), &gc_options());
    assert!(matches!(err, CompileError::Type { .. }));
    let err = lower_err_with(&in_function("a = list(range(3))\nreturn 0"), &gc_options());
    assert!(matches!(err, CompileError::Type { .. }));
}

#[test]
fn test_strings() {
    let source = program(
        r#"
@wasmfunc()
def greet() -> string:
    s: string = "hello"
    t = "world"
    return s if 1 else t
"#,
    );
    let err = lower_err_with(&source, &gc_options());
    assert!(matches!(err, CompileError::Scope { .. }));

    let options = gc_options().with_strings();
    let module = lower_with(&source, &options);
    assert_eq!(module.function("greet").unwrap().result, WasmType::Str);
    compile_with(&source, &options);
}

// ─── Listing ──────────────────────────────────────────────────────────────────

#[test]
fn test_ir_listing() {
    let module = lower_ok(&program(
        r#"
total: i64 = 0

@wasmfunc()
def add(x: i64) -> i64:
    global total
    total += x
    return total
"#,
    ));
    let listing = module.to_string();
    assert!(listing.starts_with("(module"));
    assert!(listing.contains("(global $total (mut i64) (i64.const 0))"));
    assert!(listing.contains("(func $add (param $x i64) (result i64)"));
    assert!(listing.contains("global.set $total"));
}
