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
//! Signature pre-pass.
//!
//! Walks the top-level statements once, before any code is generated, so
//! that calls may refer to functions defined further down the file. It
//! records how the marker module was imported and resolves the signature of
//! every function carrying the marker decorator.

mod annotation;

pub use annotation::resolve_annotation;

use std::collections::{HashMap, HashSet};

use ast::{Expr, Module, Param, Spanned, Stmt};
use tracing::debug;

use crate::error::{CompileError, CompileResult};
use crate::types::WasmType;

/// Module that defines the marker decorator and the type names.
pub const MARKER_MODULE: &str = "wasmfunc";
/// Canonical name of the marker decorator.
pub const MARKER: &str = "wasmfunc";

/// Import bindings of the marker module seen at the top level.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AliasTable {
    /// Names bound to the module itself (`import wasmfunc as p`)
    module_aliases: HashSet<String>,
    /// Local name -> canonical symbol (`from wasmfunc import i32 as int32`)
    object_aliases: HashMap<String, String>,
}

impl AliasTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a top-level import. Imports of other modules are ignored.
    pub fn record_import(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Import { module, alias } if is_marker_module(module) => {
                let bound = alias.clone().unwrap_or_else(|| MARKER_MODULE.to_string());
                self.module_aliases.insert(bound);
            }
            Stmt::FromImport { module, names } if is_marker_module(module) => {
                for (symbol, alias) in names {
                    let bound = alias.as_ref().unwrap_or(symbol);
                    // Rebinding a name keeps the most recent import
                    self.object_aliases.insert(bound.clone(), symbol.clone());
                }
            }
            _ => {}
        }
    }

    pub fn is_module_alias(&self, name: &str) -> bool {
        self.module_aliases.contains(name)
    }

    pub fn object_symbol(&self, name: &str) -> Option<&str> {
        self.object_aliases.get(name).map(String::as_str)
    }

    /// Whether `decorator` is the marker, referenced directly or called.
    pub fn is_marker(&self, decorator: &Expr) -> bool {
        let target = match decorator {
            Expr::Call { func, .. } => &func.node,
            other => other,
        };
        match target {
            Expr::Name(name) => self.object_symbol(name) == Some(MARKER),
            Expr::Attribute { value, attr } => {
                attr == MARKER && value.node.as_name().is_some_and(|m| self.is_module_alias(m))
            }
            _ => false,
        }
    }

    pub fn is_marked(&self, decorators: &[Spanned<Expr>]) -> bool {
        decorators.iter().any(|d| self.is_marker(&d.node))
    }
}

fn is_marker_module(path: &[String]) -> bool {
    matches!(path, [name] if name == MARKER_MODULE)
}

/// Resolved signature of one marked function.
#[derive(Debug, Clone, PartialEq)]
pub struct FuncSig {
    pub params: Vec<WasmType>,
    pub return_type: WasmType,
}

/// Output of the pre-pass: the alias tables plus every marked signature.
#[derive(Debug, Clone, Default)]
pub struct Signatures {
    pub aliases: AliasTable,
    functions: HashMap<String, FuncSig>,
}

impl Signatures {
    pub fn get(&self, name: &str) -> Option<&FuncSig> {
        self.functions.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    pub fn param_types(&self, name: &str) -> Option<&[WasmType]> {
        self.get(name).map(|sig| sig.params.as_slice())
    }

    pub fn return_type(&self, name: &str) -> Option<WasmType> {
        self.get(name).map(|sig| sig.return_type)
    }
}

/// Run the pre-pass over the top-level statements of `module`.
///
/// Fails on the first marked function with an unresolvable annotation, a
/// missing parameter annotation, or a name already taken by another marked
/// function.
pub fn collect(module: &Module) -> CompileResult<Signatures> {
    let mut signatures = Signatures::default();

    for stmt in &module.body {
        match &stmt.node {
            Stmt::Import { .. } | Stmt::FromImport { .. } => signatures.aliases.record_import(&stmt.node),
            Stmt::FuncDef {
                name,
                params,
                returns,
                decorators,
                ..
            } if signatures.aliases.is_marked(decorators) => {
                if signatures.functions.contains_key(name) {
                    return Err(CompileError::signature(
                        format!("function '{name}' is defined more than once"),
                        stmt.span.clone(),
                    ));
                }
                let sig = resolve_signature(params, returns.as_ref(), &signatures.aliases)?;
                debug!(function = %name, params = ?sig.params, returns = %sig.return_type, "registered signature");
                signatures.functions.insert(name.clone(), sig);
            }
            _ => {}
        }
    }

    Ok(signatures)
}

fn resolve_signature(
    params: &[Param],
    returns: Option<&Spanned<Expr>>,
    aliases: &AliasTable,
) -> CompileResult<FuncSig> {
    let mut resolved = Vec::with_capacity(params.len());
    for param in params {
        let annotation = param.annotation.as_ref().ok_or_else(|| {
            CompileError::type_error(
                format!("parameter '{}' has no type annotation", param.name),
                param.span.clone(),
            )
        })?;
        if let Some(default) = &param.default {
            return Err(CompileError::unsupported("default parameter value", default.span.clone()));
        }
        let ty = resolve_annotation(annotation, aliases)?;
        if ty.is_void() {
            return Err(CompileError::type_error(
                format!("parameter '{}' cannot have type None", param.name),
                annotation.span.clone(),
            ));
        }
        resolved.push(ty);
    }

    let return_type = match returns {
        Some(annotation) => resolve_annotation(annotation, aliases)?,
        None => WasmType::Void,
    };

    Ok(FuncSig {
        params: resolved,
        return_type,
    })
}
