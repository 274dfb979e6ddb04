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
use ast::{Expr, Spanned};

use super::AliasTable;
use crate::error::{CompileError, CompileResult};
use crate::types::WasmType;

fn canonical_type(symbol: &str) -> Option<WasmType> {
    match symbol {
        "i32" => Some(WasmType::I32),
        "i64" => Some(WasmType::I64),
        "f32" => Some(WasmType::F32),
        "f64" => Some(WasmType::F64),
        "string" => Some(WasmType::Str),
        _ => None,
    }
}

fn unknown(annotation: &Spanned<Expr>) -> CompileError {
    CompileError::type_error(
        format!("unknown type annotation ({})", annotation.node.describe()),
        annotation.span.clone(),
    )
}

/// Resolve a type annotation to a [`WasmType`].
///
/// Accepted forms are a name bound by `from wasmfunc import ...`, an
/// attribute on a module alias (`wasmfunc.i32`, `p.f64`), `array[T]` with a
/// numeric element, the bare `string` marker and `None` for "no value".
pub fn resolve_annotation(annotation: &Spanned<Expr>, aliases: &AliasTable) -> CompileResult<WasmType> {
    match &annotation.node {
        Expr::NoneLit => Ok(WasmType::Void),
        Expr::Name(name) => {
            let symbol = aliases.object_symbol(name).or_else(|| (name == "string").then_some("string"));
            symbol
                .and_then(canonical_type)
                .ok_or_else(|| CompileError::type_error(format!("unknown type '{name}'"), annotation.span.clone()))
        }
        Expr::Attribute { value, attr } => match value.node.as_name() {
            Some(module) if aliases.is_module_alias(module) => canonical_type(attr)
                .ok_or_else(|| CompileError::type_error(format!("unknown type '{module}.{attr}'"), annotation.span.clone())),
            _ => Err(unknown(annotation)),
        },
        Expr::Subscript { value, index } if is_array_constructor(&value.node, aliases) => {
            match resolve_annotation(index, aliases)? {
                WasmType::Num(kind) => Ok(WasmType::Array(kind)),
                other => Err(CompileError::type_error(
                    format!("array elements must be numeric, found {other}"),
                    index.span.clone(),
                )),
            }
        }
        _ => Err(unknown(annotation)),
    }
}

fn is_array_constructor(expr: &Expr, aliases: &AliasTable) -> bool {
    match expr {
        Expr::Name(name) => aliases.object_symbol(name) == Some("array"),
        Expr::Attribute { value, attr } => {
            attr == "array" && value.node.as_name().is_some_and(|m| aliases.is_module_alias(m))
        }
        _ => false,
    }
}

