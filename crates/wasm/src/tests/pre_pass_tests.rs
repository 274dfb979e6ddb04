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

use super::parse;
use crate::error::CompileError;
use crate::signature::{collect, AliasTable};
use crate::types::{NumKind, WasmType};

#[test]
fn test_collects_only_marked_functions() {
    let module = parse(
        r#"
from wasmfunc import wasmfunc, i32, f64

@wasmfunc()
def area(w: i32, h: f64) -> f64:
    return w * h

def helper(x):
    return x
"#,
    );
    let signatures = collect(&module).unwrap();
    assert_eq!(signatures.param_types("area"), Some(&[WasmType::I32, WasmType::F64][..]));
    assert_eq!(signatures.return_type("area"), Some(WasmType::F64));
    assert!(signatures.get("helper").is_none());
}

#[test]
fn test_marker_forms() {
    let module = parse(
        r#"
import wasmfunc
import wasmfunc as p
from wasmfunc import wasmfunc as compiled, i64 as long

@wasmfunc.wasmfunc()
def a(x: wasmfunc.i32) -> p.i32:
    return x

@p.wasmfunc
def b(x: long):
    pass

@compiled
def c() -> long:
    return 1

@compiled()
def d():
    pass
"#,
    );
    let signatures = collect(&module).unwrap();
    for name in ["a", "b", "c", "d"] {
        assert!(signatures.get(name).is_some(), "{name} not marked");
    }
    assert_eq!(signatures.param_types("b"), Some(&[WasmType::I64][..]));
    assert_eq!(signatures.return_type("c"), Some(WasmType::I64));
    assert_eq!(signatures.return_type("d"), Some(WasmType::Void));
}

#[test]
fn test_decorator_of_other_module_is_ignored() {
    let module = parse(
        r#"
import functools
from wasmfunc import i32

@functools.wasmfunc
def f(x: i32) -> i32:
    return x
"#,
    );
    assert!(collect(&module).unwrap().is_empty());
}

#[test]
fn test_array_and_string_annotations() {
    let module = parse(
        r#"
import wasmfunc as w
from wasmfunc import wasmfunc, array, f32

@wasmfunc()
def f(xs: array[f32], ys: w.array[w.i64], s: string) -> None:
    pass
"#,
    );
    let signatures = collect(&module).unwrap();
    assert_eq!(
        signatures.param_types("f"),
        Some(&[WasmType::Array(NumKind::F32), WasmType::Array(NumKind::I64), WasmType::Str][..])
    );
    assert_eq!(signatures.return_type("f"), Some(WasmType::Void));
}

#[test]
fn test_missing_parameter_annotation() {
    let module = parse(
        r#"
from wasmfunc import wasmfunc, i32

@wasmfunc()
def f(x: i32, y) -> i32:
    return x
"#,
    );
    let err = collect(&module).unwrap_err();
    assert!(matches!(err, CompileError::Type { .. }));
    assert!(err.to_string().contains("'y'"));
}

#[test]
fn test_unknown_type_is_an_error() {
    let module = parse(
        r#"
from wasmfunc import wasmfunc

@wasmfunc()
def f(x: int) -> int:
    return x
"#,
    );
    let err = collect(&module).unwrap_err();
    assert_eq!(err.to_string(), "unknown type 'int'");
}

#[test]
fn test_unimported_type_name_is_unknown() {
    // `i32` was never imported, so it is not a type here
    let module = parse(
        r#"
from wasmfunc import wasmfunc

@wasmfunc()
def f(x: i32):
    pass
"#,
    );
    assert!(collect(&module).is_err());
}

#[test]
fn test_none_parameter_is_rejected() {
    let module = parse(
        r#"
from wasmfunc import wasmfunc

@wasmfunc()
def f(x: None):
    pass
"#,
    );
    assert!(matches!(collect(&module), Err(CompileError::Type { .. })));
}

#[test]
fn test_duplicate_function() {
    let module = parse(
        r#"
from wasmfunc import wasmfunc, i32

@wasmfunc()
def f() -> i32:
    return 1

@wasmfunc()
def f() -> i32:
    return 2
"#,
    );
    assert!(matches!(collect(&module), Err(CompileError::Signature { .. })));
}

#[test]
fn test_alias_table_ignores_other_modules() {
    let module = parse("import numpy as np\nfrom math import floor\nimport wasmfunc as w\n");
    let mut aliases = AliasTable::new();
    for stmt in &module.body {
        aliases.record_import(&stmt.node);
    }
    assert!(aliases.is_module_alias("w"));
    assert!(!aliases.is_module_alias("np"));
    assert_eq!(aliases.object_symbol("floor"), None);
}
