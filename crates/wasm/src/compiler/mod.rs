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
//! Tree-walking code generator.
//!
//! Lowers every marked function of a parsed module into an [`ir::Function`],
//! statement by statement. Module-level statements are inert apart from
//! annotated declarations, which register globals that a function may later
//! promote with a `global` statement.

mod assign;
mod builtins;
mod control_flow;
mod data_access;
mod helpers;
mod literal;
mod op;
mod op_dispatch;

use std::collections::HashMap;

use ast::{Expr, Module, Param, Span, Spanned, Stmt};
use tracing::debug;

use crate::error::{CompileError, CompileResult};
use crate::functions::FunctionContext;
use crate::ir::{self, Literal, ModuleBuilder};
use crate::options::CompileOptions;
use crate::signature::Signatures;
use crate::types::{NumKind, WasmType};

/// A module-level declaration such as `num: i32 = 6`. It is only emitted
/// once some function names it in a `global` statement.
#[derive(Debug, Clone, Copy)]
struct DeclaredGlobal {
    ty: NumKind,
    init: Literal,
}

pub struct Compiler<'a> {
    options: &'a CompileOptions,
    signatures: &'a Signatures,
    builder: ModuleBuilder,
    globals: HashMap<String, DeclaredGlobal>,
    /// Source of every synthesized label; shared by all functions so labels never repeat
    next_label_id: u32,
}

impl<'a> Compiler<'a> {
    pub fn new(options: &'a CompileOptions, signatures: &'a Signatures) -> Self {
        Self {
            options,
            signatures,
            builder: ModuleBuilder::new(),
            globals: HashMap::new(),
            next_label_id: 0,
        }
    }

    /// Lower every top-level statement in source order.
    pub fn compile_module(&mut self, module: &Module) -> CompileResult<()> {
        for stmt in &module.body {
            self.compile_top_level(stmt)?;
        }
        Ok(())
    }

    pub fn finish(self) -> ir::Module {
        self.builder.finish()
    }

    fn fresh_label_id(&mut self) -> u32 {
        let id = self.next_label_id;
        self.next_label_id += 1;
        id
    }

    /// Fails if `ty` needs a feature that is switched off.
    fn require_type(&self, ty: WasmType, span: &Span) -> CompileResult<()> {
        match self.options.missing_feature(ty) {
            Some(message) => Err(CompileError::scope(message, span.clone())),
            None => Ok(()),
        }
    }

    fn compile_top_level(&mut self, stmt: &Spanned<Stmt>) -> CompileResult<()> {
        match &stmt.node {
            Stmt::FuncDef {
                name,
                params,
                body,
                decorators,
                ..
            } if self.signatures.aliases.is_marked(decorators) => self.compile_function(name, params, body, &stmt.span),
            Stmt::AnnAssign {
                target,
                annotation,
                value,
            } => self.declare_global(target, annotation, value.as_ref(), &stmt.span),
            Stmt::Assign { targets, .. } => targets.iter().try_for_each(|target| self.check_module_level_write(target)),
            Stmt::AugAssign { target, .. } => self.check_module_level_write(target),
            _ => Ok(()),
        }
    }

    /// A promoted global may only change inside a compiled function.
    fn check_module_level_write(&self, target: &Spanned<Expr>) -> CompileResult<()> {
        match target.node.as_name() {
            Some(name) if self.builder.has_global(name) => Err(CompileError::scope(
                format!("cannot modify global '{name}' outside of a compiled function"),
                target.span.clone(),
            )),
            _ => Ok(()),
        }
    }

    fn declare_global(
        &mut self,
        target: &Spanned<Expr>,
        annotation: &Spanned<Expr>,
        value: Option<&Spanned<Expr>>,
        span: &Span,
    ) -> CompileResult<()> {
        // Annotations that are not wasm types belong to ordinary Python code
        let Ok(ty) = crate::signature::resolve_annotation(annotation, &self.signatures.aliases) else {
            return Ok(());
        };

        let Some(name) = target.node.as_name() else {
            return Err(CompileError::unsupported(
                format!("global declaration of {}", target.node.describe()),
                target.span.clone(),
            ));
        };
        if self.globals.contains_key(name) {
            return Err(CompileError::scope(
                format!("global '{name}' is already declared"),
                span.clone(),
            ));
        }
        let Some(kind) = ty.num_kind() else {
            return Err(CompileError::unsupported(format!("global of type {ty}"), annotation.span.clone()));
        };
        let Some(value) = value else {
            return Err(CompileError::type_error(
                format!("global '{name}' must be initialised with a value"),
                span.clone(),
            ));
        };

        let init = literal::constant_initializer(value, kind).ok_or_else(|| {
            CompileError::type_error(
                format!("global '{name}' must be initialised with a numeric constant"),
                value.span.clone(),
            )
        })?;
        debug!(global = %name, ty = %kind, "declared global");
        self.globals.insert(
            name.to_string(),
            DeclaredGlobal { ty: kind, init },
        );
        Ok(())
    }

    fn compile_function(
        &mut self,
        name: &str,
        params: &[Param],
        body: &[Spanned<Stmt>],
        span: &Span,
    ) -> CompileResult<()> {
        let signatures = self.signatures;
        let Some(sig) = signatures.get(name) else {
            return Err(CompileError::signature(format!("no signature recorded for '{name}'"), span.clone()));
        };
        for ty in sig.params.iter().chain(std::iter::once(&sig.return_type)) {
            self.require_type(*ty, span)?;
        }

        let named: Vec<(String, WasmType)> = params
            .iter()
            .map(|p| p.name.clone())
            .zip(sig.params.iter().copied())
            .collect();
        let mut ctx = FunctionContext::new(name, &named, sig.return_type);

        let mut lowered = Vec::with_capacity(body.len());
        for stmt in body {
            lowered.push(self.compile_stmt(&mut ctx, stmt)?);
        }

        let function = ctx.finish(lowered);
        debug!(
            function = %function.name,
            params = function.params.len(),
            locals = function.locals.len(),
            "lowered function"
        );
        self.builder.add_function(function);
        Ok(())
    }

    fn compile_stmt(&mut self, ctx: &mut FunctionContext, stmt: &Spanned<Stmt>) -> CompileResult<ir::Expr> {
        let span = &stmt.span;
        match &stmt.node {
            // Docstrings
            Stmt::Expr(Spanned {
                node: Expr::StringLit(_),
                ..
            }) => Ok(ir::Expr::nop()),
            Stmt::Expr(expr) => {
                let value = self.compile_expr(ctx, expr)?;
                if value.ty.is_void() {
                    Ok(value)
                } else {
                    Ok(ir::Expr::drop(value))
                }
            }
            Stmt::Assign { targets, value } => self.compile_assign(ctx, targets, value, span),
            Stmt::AnnAssign {
                target,
                annotation,
                value,
            } => self.compile_ann_assign(ctx, target, annotation, value.as_ref(), span),
            Stmt::AugAssign { target, op, value } => self.compile_aug_assign(ctx, target, *op, value, span),
            Stmt::Return(value) => self.compile_return(ctx, value.as_ref(), span),
            Stmt::Pass => Ok(ir::Expr::nop()),
            Stmt::Break => self.compile_break(ctx, span),
            Stmt::Continue => self.compile_continue(ctx, span),
            Stmt::Assert { test, msg } => self.compile_assert(ctx, test, msg.as_ref()),
            Stmt::Global(names) => self.compile_global(ctx, names, span),
            // Aliases were fixed by the pre-pass
            Stmt::Import { .. } | Stmt::FromImport { .. } => Ok(ir::Expr::nop()),
            Stmt::If {
                test,
                body,
                elif_clauses,
                else_body,
            } => self.compile_if(ctx, test, body, elif_clauses, else_body.as_deref()),
            Stmt::While { test, body, else_body } => self.compile_while(ctx, test, body, else_body.as_deref()),
            Stmt::FuncDef { .. } => Err(CompileError::unsupported("nested function definition", span.clone())),
            other => Err(CompileError::unsupported(other.describe(), span.clone())),
        }
    }

    /// Lower a statement list into one unlabelled void block.
    fn compile_block(&mut self, ctx: &mut FunctionContext, stmts: &[Spanned<Stmt>]) -> CompileResult<ir::Expr> {
        let mut body = Vec::with_capacity(stmts.len());
        for stmt in stmts {
            body.push(self.compile_stmt(ctx, stmt)?);
        }
        Ok(ir::Expr::block(None, body, WasmType::Void))
    }

    fn compile_expr(&mut self, ctx: &mut FunctionContext, expr: &Spanned<Expr>) -> CompileResult<ir::Expr> {
        self.compile_expr_with_hint(ctx, expr, None)
    }

    /// `hint` is the type the surrounding declaration expects. Only list
    /// literals and `list(range(...))` use it, since neither carries an
    /// element type of its own.
    fn compile_expr_with_hint(
        &mut self,
        ctx: &mut FunctionContext,
        expr: &Spanned<Expr>,
        hint: Option<WasmType>,
    ) -> CompileResult<ir::Expr> {
        let span = &expr.span;
        match &expr.node {
            Expr::Name(name) => self.compile_name(ctx, name, span),
            Expr::Number(text) => literal::compile_number(text, span),
            Expr::Bool(value) => Ok(ir::Expr::i32(i32::from(*value))),
            Expr::StringLit(value) => {
                self.require_type(WasmType::Str, span)?;
                Ok(ir::Expr::string(value.as_str()))
            }
            Expr::NoneLit => Err(CompileError::unsupported("None", span.clone())),
            Expr::UnaryOp { op, operand } => self.compile_unary(ctx, *op, operand, span),
            Expr::BinOp { left, op, right } => self.compile_binop(ctx, left, *op, right, span),
            Expr::Compare {
                left,
                ops,
                comparators,
            } => self.compile_compare(ctx, left, ops, comparators, span),
            Expr::IfExpr { test, body, orelse } => self.compile_ternary(ctx, test, body, orelse, span),
            Expr::Call { func, args, kwargs } => self.compile_call(ctx, func, args, kwargs, hint, span),
            Expr::Subscript { value, index } => self.compile_subscript(ctx, value, index, span),
            Expr::List(elements) => self.compile_list(ctx, elements, hint, span),
            other => Err(CompileError::unsupported(other.describe(), span.clone())),
        }
    }

    /// Locals shadow promoted globals.
    fn compile_name(&self, ctx: &FunctionContext, name: &str, span: &Span) -> CompileResult<ir::Expr> {
        if let Some(local) = ctx.local(name) {
            return Ok(ir::Expr::local_get(local.index, local.ty));
        }
        if let Some(ty) = ctx.scoped_global(name) {
            return Ok(ir::Expr::global_get(name, ty));
        }
        Err(CompileError::scope(format!("undeclared variable '{name}'"), span.clone()))
    }
}
