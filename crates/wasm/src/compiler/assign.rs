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
use ast::BinOp;

use super::*;
use crate::signature::resolve_annotation;

impl Compiler<'_> {
    /// `a = b = value` evaluates `value` once, through a scratch local when
    /// there is more than one target.
    pub(super) fn compile_assign(
        &mut self,
        ctx: &mut FunctionContext,
        targets: &[Spanned<Expr>],
        value: &Spanned<Expr>,
        span: &Span,
    ) -> CompileResult<ir::Expr> {
        let hint = targets.first().and_then(|target| recorded_type(ctx, target));
        let lowered = self.compile_expr_with_hint(ctx, value, hint)?;

        if let [target] = targets {
            return self.assign_to(ctx, target, lowered);
        }
        if lowered.ty.is_void() {
            return Err(CompileError::type_error("cannot assign a value of type void", span.clone()));
        }

        let scratch = ctx.temp_local(lowered.ty);
        let mut body = vec![ir::Expr::local_set(scratch.index, lowered)];
        for target in targets {
            let copy = ir::Expr::local_get(scratch.index, scratch.ty);
            body.push(self.assign_to(ctx, target, copy)?);
        }
        Ok(ir::Expr::block(None, body, WasmType::Void))
    }

    /// `x op= value` is lowered exactly like `x = x op value`.
    pub(super) fn compile_aug_assign(
        &mut self,
        ctx: &mut FunctionContext,
        target: &Spanned<Expr>,
        op: BinOp,
        value: &Spanned<Expr>,
        span: &Span,
    ) -> CompileResult<ir::Expr> {
        if target.node.as_name().is_none() {
            return Err(CompileError::unsupported(
                format!("augmented assignment to {}", target.node.describe()),
                target.span.clone(),
            ));
        }
        let desugared = Spanned::new(
            Expr::BinOp {
                left: Box::new(target.clone()),
                op,
                right: Box::new(value.clone()),
            },
            span.clone(),
        );
        self.compile_assign(ctx, std::slice::from_ref(target), &desugared, span)
    }

    pub(super) fn compile_ann_assign(
        &mut self,
        ctx: &mut FunctionContext,
        target: &Spanned<Expr>,
        annotation: &Spanned<Expr>,
        value: Option<&Spanned<Expr>>,
        span: &Span,
    ) -> CompileResult<ir::Expr> {
        let Some(name) = target.node.as_name() else {
            return Err(CompileError::unsupported(
                format!("annotated assignment to {}", target.node.describe()),
                target.span.clone(),
            ));
        };
        let ty = resolve_annotation(annotation, &self.signatures.aliases)?;
        if ty.is_void() {
            return Err(CompileError::type_error(
                format!("variable '{name}' cannot have type None"),
                annotation.span.clone(),
            ));
        }
        self.require_type(ty, &annotation.span)?;

        let existing = recorded_type(ctx, target);
        match existing {
            Some(recorded) if recorded != ty => {
                return Err(CompileError::type_error(
                    format!("cannot change the type of '{name}' from {recorded} to {ty}"),
                    span.clone(),
                ));
            }
            _ => {}
        }

        let Some(value) = value else {
            if existing.is_some() {
                return Err(CompileError::type_error(
                    format!("cannot redeclare '{name}' without a value"),
                    span.clone(),
                ));
            }
            ctx.declare_local(name, ty);
            return Ok(ir::Expr::nop());
        };

        let lowered = self.compile_expr_with_hint(ctx, value, Some(ty))?;
        let lowered = self.cast_to_type(lowered, ty, &value.span)?;
        if let Some(local) = ctx.local(name) {
            return Ok(ir::Expr::local_set(local.index, lowered));
        }
        if ctx.scoped_global(name).is_some() {
            return Ok(ir::Expr::global_set(name, lowered));
        }
        let local = ctx.declare_local(name, ty);
        Ok(ir::Expr::local_set(local.index, lowered))
    }

    fn assign_to(&mut self, ctx: &mut FunctionContext, target: &Spanned<Expr>, value: ir::Expr) -> CompileResult<ir::Expr> {
        match &target.node {
            Expr::Name(name) => self.assign_name(ctx, name, value, &target.span),
            Expr::Subscript { value: array, index } => self.compile_array_store(ctx, array, index, value, &target.span),
            Expr::Tuple(_) | Expr::List(_) => Err(CompileError::unsupported("tuple unpacking", target.span.clone())),
            other => Err(CompileError::unsupported(
                format!("assignment to {}", other.describe()),
                target.span.clone(),
            )),
        }
    }

    /// The first plain assignment declares the local with the value's type;
    /// later ones convert numbers to the recorded type.
    fn assign_name(&mut self, ctx: &mut FunctionContext, name: &str, value: ir::Expr, span: &Span) -> CompileResult<ir::Expr> {
        if let Some(local) = ctx.local(name) {
            let value = self.reassign(name, local.ty, value, span)?;
            return Ok(ir::Expr::local_set(local.index, value));
        }
        if let Some(ty) = ctx.scoped_global(name) {
            let value = self.reassign(name, ty, value, span)?;
            return Ok(ir::Expr::global_set(name, value));
        }
        if value.ty.is_void() {
            return Err(CompileError::type_error(
                format!("cannot assign a value of type void to '{name}'"),
                span.clone(),
            ));
        }
        let local = ctx.declare_local(name, value.ty);
        Ok(ir::Expr::local_set(local.index, value))
    }

    fn reassign(&self, name: &str, recorded: WasmType, value: ir::Expr, span: &Span) -> CompileResult<ir::Expr> {
        if value.ty != recorded && (value.ty.num_kind().is_none() || recorded.num_kind().is_none()) {
            return Err(CompileError::type_error(
                format!("cannot change the type of '{name}' from {recorded} to {}", value.ty),
                span.clone(),
            ));
        }
        self.cast_to_type(value, recorded, span)
    }

    /// `global a, b`: emits each global on first use anywhere in the module
    /// and makes it visible for the rest of this function.
    pub(super) fn compile_global(
        &mut self,
        ctx: &mut FunctionContext,
        names: &[String],
        span: &Span,
    ) -> CompileResult<ir::Expr> {
        for name in names {
            if ctx.local(name).is_some() {
                return Err(CompileError::scope(
                    format!("name '{name}' is assigned to before its global declaration"),
                    span.clone(),
                ));
            }
            let Some(global) = self.globals.get(name).copied() else {
                return Err(CompileError::scope(
                    format!("global '{name}' must be declared at module level with a wasm type"),
                    span.clone(),
                ));
            };
            if !self.builder.has_global(name) {
                self.builder.add_global(name.as_str(), global.ty, true, global.init);
                debug!(global = %name, function = %ctx.name(), "promoted global");
            }
            ctx.scope_global(name, global.ty.into());
        }
        Ok(ir::Expr::nop())
    }
}

/// Type already on record for an assignment target, if it is a known name.
fn recorded_type(ctx: &FunctionContext, target: &Spanned<Expr>) -> Option<WasmType> {
    let name = target.node.as_name()?;
    ctx.local(name).map(|local| local.ty).or_else(|| ctx.scoped_global(name))
}
