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
//! Calls: marked functions first, then the fixed built-in surface
//! (`list(range(...))` and `len(...)`).

use super::helpers::{convert, zero};
use super::*;
use crate::functions::Local;
use crate::ir::{BinaryOp, UnaryOp};

impl Compiler<'_> {
    pub(super) fn compile_call(
        &mut self,
        ctx: &mut FunctionContext,
        func: &Spanned<Expr>,
        args: &[Spanned<Expr>],
        kwargs: &[(String, Spanned<Expr>)],
        hint: Option<WasmType>,
        span: &Span,
    ) -> CompileResult<ir::Expr> {
        if let Some((_, value)) = kwargs.first() {
            return Err(CompileError::unsupported("keyword arguments", value.span.clone()));
        }
        if let Some(starred) = args.iter().find(|a| matches!(a.node, Expr::Starred(_))) {
            return Err(CompileError::unsupported("starred arguments", starred.span.clone()));
        }
        let Some(name) = func.node.as_name() else {
            return Err(CompileError::unsupported(
                format!("call through {}", func.node.describe()),
                func.span.clone(),
            ));
        };

        let signatures = self.signatures;
        if let Some(sig) = signatures.get(name) {
            if sig.params.len() != args.len() {
                return Err(CompileError::signature(
                    format!(
                        "function '{name}' takes {} arguments but {} were given",
                        sig.params.len(),
                        args.len()
                    ),
                    span.clone(),
                ));
            }
            let mut lowered = Vec::with_capacity(args.len());
            for (arg, ty) in args.iter().zip(&sig.params) {
                let value = self.compile_expr_with_hint(ctx, arg, Some(*ty))?;
                lowered.push(self.cast_to_type(value, *ty, &arg.span)?);
            }
            return Ok(ir::Expr::call(name, lowered, sig.return_type));
        }

        match name {
            "list" => self.compile_list_range(ctx, args, hint, span),
            "len" => self.compile_len(ctx, args, span),
            _ => Err(CompileError::signature(format!("unknown function '{name}'"), span.clone())),
        }
    }

    /// `len(arr)` is the array length as an `i32`.
    fn compile_len(&mut self, ctx: &mut FunctionContext, args: &[Spanned<Expr>], span: &Span) -> CompileResult<ir::Expr> {
        if !self.options.enable_gc {
            return Err(CompileError::scope("array support is disabled (enable gc)", span.clone()));
        }
        let [arg] = args else {
            return Err(CompileError::signature("len() takes exactly one argument", span.clone()));
        };
        let array = self.compile_expr(ctx, arg)?;
        if !matches!(array.ty, WasmType::Array(_)) {
            return Err(CompileError::type_error(
                format!("len() of a value of type {}", array.ty),
                arg.span.clone(),
            ));
        }
        Ok(ir::Expr::array_len(array))
    }

    /// `list(range([start,] stop[, step]))` allocates an array of
    /// `max(0, ceil((stop - start) / step))` elements and fills it in a loop:
    ///
    /// ```text
    /// arr = array.new(zero, len); n = 0; i = start
    /// loop $range_N
    ///   if n < len: arr[n] = i; i += step; n += 1; br $range_N
    /// arr
    /// ```
    ///
    /// A zero step traps.
    fn compile_list_range(
        &mut self,
        ctx: &mut FunctionContext,
        args: &[Spanned<Expr>],
        hint: Option<WasmType>,
        span: &Span,
    ) -> CompileResult<ir::Expr> {
        if !self.options.enable_gc {
            return Err(CompileError::scope("array support is disabled (enable gc)", span.clone()));
        }
        let range_args = match args {
            [Spanned {
                node: Expr::Call { func, args, kwargs },
                ..
            }] if func.node.as_name() == Some("range") && kwargs.is_empty() => args,
            _ => return Err(CompileError::unsupported("list() of anything but range(...)", span.clone())),
        };
        let Some(WasmType::Array(element)) = hint else {
            return Err(CompileError::type_error(
                "list(range(...)) must initialise a variable annotated with an array type",
                span.clone(),
            ));
        };

        let mut bounds = Vec::with_capacity(range_args.len());
        for arg in range_args {
            let value = self.compile_expr(ctx, arg)?;
            bounds.push(self.cast_to_type(value, WasmType::I32, &arg.span)?);
        }
        let mut bounds = bounds.into_iter();
        let (start, stop, step) = match (bounds.next(), bounds.next(), bounds.next(), bounds.next()) {
            (Some(stop), None, None, None) => (ir::Expr::i32(0), stop, ir::Expr::i32(1)),
            (Some(start), Some(stop), None, None) => (start, stop, ir::Expr::i32(1)),
            (Some(start), Some(stop), Some(step), None) => (start, stop, step),
            _ => return Err(CompileError::signature("range() takes 1 to 3 arguments", span.clone())),
        };

        Ok(self.range_fill(ctx, element, start, stop, step))
    }

    fn range_fill(&mut self, ctx: &mut FunctionContext, element: NumKind, start: ir::Expr, stop: ir::Expr, step: ir::Expr) -> ir::Expr {
        let label = format!("range_{}", self.fresh_label_id());
        let array_ty = WasmType::Array(element);
        let first = ctx.temp_local(WasmType::I32);
        let stride = ctx.temp_local(WasmType::I32);
        let length = ctx.temp_local(WasmType::I32);
        let array = ctx.temp_local(array_ty);
        let n = ctx.temp_local(WasmType::I32);
        let i = ctx.temp_local(WasmType::I32);
        let get = |local: Local| ir::Expr::local_get(local.index, local.ty);

        // ceil((stop - start) / step) entirely in f64, then clamped at zero
        let span_f64 = ir::Expr::binary(
            BinaryOp::SubF64,
            convert(stop, NumKind::F64),
            convert(get(first), NumKind::F64),
        );
        let quotient = ir::Expr::binary(BinaryOp::DivF64, span_f64, convert(get(stride), NumKind::F64));
        let raw_length = ir::Expr::unary(UnaryOp::TruncF64ToI32, ir::Expr::unary(UnaryOp::CeilF64, quotient));
        let clamped = ir::Expr::select(
            ir::Expr::binary(BinaryOp::GtSI32, get(length), ir::Expr::i32(0)),
            get(length),
            ir::Expr::i32(0),
        );

        let fill = ir::Expr::block(
            None,
            vec![
                ir::Expr::array_set(element, get(array), get(n), convert(get(i), element)),
                ir::Expr::local_set(i.index, ir::Expr::binary(BinaryOp::AddI32, get(i), get(stride))),
                ir::Expr::local_set(n.index, ir::Expr::binary(BinaryOp::AddI32, get(n), ir::Expr::i32(1))),
                ir::Expr::br(label.clone()),
            ],
            WasmType::Void,
        );
        let fill_loop = ir::Expr::loop_(
            label,
            ir::Expr::if_else(ir::Expr::binary(BinaryOp::LtSI32, get(n), get(length)), fill, None),
        );

        ir::Expr::block(
            None,
            vec![
                ir::Expr::local_set(first.index, start),
                ir::Expr::local_set(stride.index, step),
                ir::Expr::if_else(
                    ir::Expr::binary(BinaryOp::EqI32, get(stride), ir::Expr::i32(0)),
                    ir::Expr::unreachable(),
                    None,
                ),
                ir::Expr::local_set(length.index, raw_length),
                ir::Expr::local_set(length.index, clamped),
                ir::Expr::local_set(
                    array.index,
                    ir::Expr::array_new(element, zero(element), get(length)),
                ),
                ir::Expr::local_set(n.index, ir::Expr::i32(0)),
                ir::Expr::local_set(i.index, get(first)),
                fill_loop,
                get(array),
            ],
            array_ty,
        )
    }
}
