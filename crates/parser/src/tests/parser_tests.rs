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

use ast::{BinOp, CmpOp, Expr, Module, Stmt, UnaryOp};

use crate::parse_source;

fn parse(source: &str) -> Module {
    parse_source(source).expect("parse failed")
}

fn only_expr(module: &Module) -> &Expr {
    match &module.body[0].node {
        Stmt::Expr(expr) => &expr.node,
        other => panic!("expected expression statement, got {:?}", other),
    }
}

#[test]
fn test_simple_assignment() {
    let m = parse("x = 42\n");
    assert_eq!(m.body.len(), 1);
    match &m.body[0].node {
        Stmt::Assign { targets, value } => {
            assert_eq!(targets.len(), 1);
            assert_eq!(targets[0].node, Expr::Name("x".into()));
            assert_eq!(value.node, Expr::Number("42".into()));
        }
        other => panic!("expected Assign, got {:?}", other),
    }
}

#[test]
fn test_chained_assignment() {
    let m = parse("a = b = 1\n");
    match &m.body[0].node {
        Stmt::Assign { targets, .. } => assert_eq!(targets.len(), 2),
        other => panic!("expected Assign, got {:?}", other),
    }
}

#[test]
fn test_annotated_assignment() {
    let m = parse("x: i32 = 5\ny: array[f64]\n");
    match &m.body[0].node {
        Stmt::AnnAssign {
            target,
            annotation,
            value,
        } => {
            assert_eq!(target.node, Expr::Name("x".into()));
            assert_eq!(annotation.node, Expr::Name("i32".into()));
            assert!(value.is_some());
        }
        other => panic!("expected AnnAssign, got {:?}", other),
    }
    match &m.body[1].node {
        Stmt::AnnAssign {
            annotation, value, ..
        } => {
            assert!(matches!(annotation.node, Expr::Subscript { .. }));
            assert!(value.is_none());
        }
        other => panic!("expected AnnAssign, got {:?}", other),
    }
}

#[test]
fn test_augmented_assignment() {
    let m = parse("i += 1\nj //= 2\nk **= 3\n");
    let ops: Vec<BinOp> = m
        .body
        .iter()
        .map(|stmt| match &stmt.node {
            Stmt::AugAssign { op, .. } => *op,
            other => panic!("expected AugAssign, got {:?}", other),
        })
        .collect();
    assert_eq!(ops, vec![BinOp::Add, BinOp::FloorDiv, BinOp::Pow]);
}

#[test]
fn test_function_def() {
    let m = parse("def foo(x: i32, y) -> i64:\n    return x + y\n");
    assert_eq!(m.body.len(), 1);
    match &m.body[0].node {
        Stmt::FuncDef {
            name,
            params,
            returns,
            body,
            decorators,
        } => {
            assert_eq!(name, "foo");
            assert_eq!(params.len(), 2);
            assert_eq!(params[0].name, "x");
            assert!(params[0].annotation.is_some());
            assert!(params[1].annotation.is_none());
            assert_eq!(returns.as_ref().map(|r| &r.node), Some(&Expr::Name("i64".into())));
            assert!(decorators.is_empty());
            match &body[0].node {
                Stmt::Return(Some(expr)) => match &expr.node {
                    Expr::BinOp { op, .. } => assert_eq!(*op, BinOp::Add),
                    other => panic!("expected BinOp, got {:?}", other),
                },
                other => panic!("expected Return, got {:?}", other),
            }
        }
        other => panic!("expected FuncDef, got {:?}", other),
    }
}

#[test]
fn test_decorators() {
    let src = "\
@wasmfunc
@p.wasmfunc()
def f() -> i32:
    return 1
";
    let m = parse(src);
    match &m.body[0].node {
        Stmt::FuncDef { decorators, .. } => {
            assert_eq!(decorators.len(), 2);
            assert_eq!(decorators[0].node, Expr::Name("wasmfunc".into()));
            assert!(matches!(decorators[1].node, Expr::Call { .. }));
        }
        other => panic!("expected FuncDef, got {:?}", other),
    }
}

#[test]
fn test_if_elif_else() {
    let src = "\
if x > 0:
    pass
elif x < 0:
    pass
else:
    pass
";
    let m = parse(src);
    assert_eq!(m.body.len(), 1);
    match &m.body[0].node {
        Stmt::If {
            elif_clauses,
            else_body,
            ..
        } => {
            assert_eq!(elif_clauses.len(), 1);
            assert!(else_body.is_some());
        }
        other => panic!("expected If, got {:?}", other),
    }
}

#[test]
fn test_single_line_suite() {
    let m = parse("if x: y = 1\nz = 2\n");
    assert_eq!(m.body.len(), 2);
    match &m.body[0].node {
        Stmt::If { body, .. } => assert!(matches!(body[0].node, Stmt::Assign { .. })),
        other => panic!("expected If, got {:?}", other),
    }
}

#[test]
fn test_while_else() {
    let src = "\
while i < 20:
    i += 1
    break
else:
    pass
";
    let m = parse(src);
    assert_eq!(m.body.len(), 1);
    match &m.body[0].node {
        Stmt::While {
            body, else_body, ..
        } => {
            assert_eq!(body.len(), 2);
            assert!(matches!(&body[1].node, Stmt::Break));
            assert_eq!(else_body.as_ref().map(Vec::len), Some(1));
        }
        other => panic!("expected While, got {:?}", other),
    }
}

#[test]
fn test_for_loop() {
    let src = "\
for i in items:
    pass
";
    let m = parse(src);
    match &m.body[0].node {
        Stmt::For { target, iter, .. } => {
            assert_eq!(target.node, Expr::Name("i".into()));
            assert_eq!(iter.node, Expr::Name("items".into()));
        }
        other => panic!("expected For, got {:?}", other),
    }
}

#[test]
fn test_class_def() {
    let src = "\
class Foo(Base):
    pass
";
    let m = parse(src);
    match &m.body[0].node {
        Stmt::ClassDef { name, bases, .. } => {
            assert_eq!(name, "Foo");
            assert_eq!(bases.len(), 1);
        }
        other => panic!("expected ClassDef, got {:?}", other),
    }
}

#[test]
fn test_binary_precedence() {
    // 1 + 2 * 3 parses as 1 + (2 * 3)
    let m = parse("1 + 2 * 3\n");
    match only_expr(&m) {
        Expr::BinOp { op, right, .. } => {
            assert_eq!(*op, BinOp::Add);
            match &right.node {
                Expr::BinOp { op, .. } => assert_eq!(*op, BinOp::Mul),
                other => panic!("expected BinOp(Mul), got {:?}", other),
            }
        }
        other => panic!("expected BinOp, got {:?}", other),
    }
}

#[test]
fn test_left_associative_subtraction() {
    // 10 - 4 - 3 parses as (10 - 4) - 3
    let m = parse("10 - 4 - 3\n");
    match only_expr(&m) {
        Expr::BinOp { left, right, .. } => {
            assert!(matches!(left.node, Expr::BinOp { op: BinOp::Sub, .. }));
            assert_eq!(right.node, Expr::Number("3".into()));
        }
        other => panic!("expected BinOp, got {:?}", other),
    }
}

#[test]
fn test_unary_minus_and_power() {
    // -x ** 2 parses as -(x ** 2)
    let m = parse("-x ** 2\n");
    match only_expr(&m) {
        Expr::UnaryOp { op, operand } => {
            assert_eq!(*op, UnaryOp::Neg);
            assert!(matches!(operand.node, Expr::BinOp { op: BinOp::Pow, .. }));
        }
        other => panic!("expected UnaryOp, got {:?}", other),
    }
}

#[test]
fn test_chained_comparison() {
    let m = parse("0 < x <= 10\n");
    match only_expr(&m) {
        Expr::Compare {
            ops, comparators, ..
        } => {
            assert_eq!(ops, &vec![CmpOp::Lt, CmpOp::LtE]);
            assert_eq!(comparators.len(), 2);
        }
        other => panic!("expected Compare, got {:?}", other),
    }
}

#[test]
fn test_not_in_and_is_not() {
    let m = parse("a not in b\n");
    assert!(matches!(only_expr(&m), Expr::Compare { ops, .. } if ops == &vec![CmpOp::NotIn]));
    let m = parse("a is not b\n");
    assert!(matches!(only_expr(&m), Expr::Compare { ops, .. } if ops == &vec![CmpOp::IsNot]));
}

#[test]
fn test_ternary() {
    let m = parse("a if a > b else b\n");
    assert!(matches!(only_expr(&m), Expr::IfExpr { .. }));
}

#[test]
fn test_call_expression() {
    let m = parse("print(1, x < 2, sep=\",\")\n");
    match only_expr(&m) {
        Expr::Call { args, kwargs, .. } => {
            assert_eq!(args.len(), 2);
            assert!(matches!(args[1].node, Expr::Compare { .. }));
            assert_eq!(kwargs.len(), 1);
            assert_eq!(kwargs[0].0, "sep");
            assert_eq!(kwargs[0].1.node, Expr::StringLit(",".into()));
        }
        other => panic!("expected Call, got {:?}", other),
    }
}

#[test]
fn test_nested_call_and_subscript() {
    let m = parse("arr: array[i32] = list(range(0, n, 2))\narr[i + 1] = 3\n");
    match &m.body[0].node {
        Stmt::AnnAssign { value: Some(value), .. } => match &value.node {
            Expr::Call { func, args, .. } => {
                assert_eq!(func.node, Expr::Name("list".into()));
                assert!(matches!(args[0].node, Expr::Call { .. }));
            }
            other => panic!("expected Call, got {:?}", other),
        },
        other => panic!("expected AnnAssign, got {:?}", other),
    }
    match &m.body[1].node {
        Stmt::Assign { targets, .. } => {
            assert!(matches!(targets[0].node, Expr::Subscript { .. }))
        }
        other => panic!("expected Assign, got {:?}", other),
    }
}

#[test]
fn test_list_dict_set() {
    let m = parse("[1, 2, 3]\n");
    assert!(matches!(only_expr(&m), Expr::List(items) if items.len() == 3));

    let m = parse("{\"a\": 1}\n");
    assert!(matches!(only_expr(&m), Expr::Dict { .. }));

    let m = parse("{1, 2}\n");
    assert!(matches!(only_expr(&m), Expr::Set(_)));
}

#[test]
fn test_tuple_assignment() {
    let m = parse("a, b = b, a\n");
    match &m.body[0].node {
        Stmt::Assign { targets, value } => {
            assert!(matches!(targets[0].node, Expr::Tuple(_)));
            assert!(matches!(value.node, Expr::Tuple(_)));
        }
        other => panic!("expected Assign, got {:?}", other),
    }
}

#[test]
fn test_number_literals() {
    let m = parse("100_000_000\n");
    assert_eq!(only_expr(&m), &Expr::Number("100_000_000".into()));
    let m = parse("2.5e3\n");
    assert_eq!(only_expr(&m), &Expr::Number("2.5e3".into()));
    for text in [".5", "0x1F", "0o17", "0b101"] {
        let m = parse(&format!("{text}\n"));
        assert_eq!(only_expr(&m), &Expr::Number(text.into()));
    }
}

#[test]
fn test_docstring_and_comments() {
    let src = "\
def f():
    \"\"\"Multi-line
    docstring.\"\"\"
    # a comment

    return 1  # trailing
";
    let m = parse(src);
    match &m.body[0].node {
        Stmt::FuncDef { body, .. } => {
            assert_eq!(body.len(), 2);
            match &body[0].node {
                Stmt::Expr(doc) => assert!(matches!(&doc.node, Expr::StringLit(s) if s.starts_with("Multi-line"))),
                other => panic!("expected docstring, got {:?}", other),
            }
        }
        other => panic!("expected FuncDef, got {:?}", other),
    }
}

#[test]
fn test_nested_indent() {
    let src = "\
def foo():
    if True:
        return 1
    return 0
";
    let m = parse(src);
    match &m.body[0].node {
        Stmt::FuncDef { body, .. } => assert_eq!(body.len(), 2),
        other => panic!("expected FuncDef, got {:?}", other),
    }
}

#[test]
fn test_import() {
    let m = parse("import os.path as p\n");
    match &m.body[0].node {
        Stmt::Import { module, alias } => {
            assert_eq!(module, &["os", "path"]);
            assert_eq!(alias.as_deref(), Some("p"));
        }
        other => panic!("expected Import, got {:?}", other),
    }
}

#[test]
fn test_from_import() {
    let m = parse("from wasmfunc import wasmfunc, i32 as l\n");
    match &m.body[0].node {
        Stmt::FromImport { module, names } => {
            assert_eq!(module, &["wasmfunc"]);
            assert_eq!(names.len(), 2);
            assert_eq!(names[0], ("wasmfunc".into(), None));
            assert_eq!(names[1], ("i32".into(), Some("l".into())));
        }
        other => panic!("expected FromImport, got {:?}", other),
    }
}

#[test]
fn test_spans_cover_statement() {
    let src = "x = 1\ny = x + 2\n";
    let m = parse(src);
    let span = m.body[1].span.clone();
    assert_eq!(&src[span], "y = x + 2");
}

#[test]
fn test_errors_carry_span() {
    let err = parse_source("def f(:\n    pass\n").unwrap_err();
    assert!(err.message.contains("identifier"), "{}", err.message);
    assert_eq!(err.span.start, 6);

    assert!(parse_source("x = \n").is_err());
    assert!(parse_source("if x:\npass\n").is_err());
}
