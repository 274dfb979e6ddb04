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
use ast::{BinOp, CmpOp, UnaryOp};

use super::helpers::{convert, zero};
use super::op_dispatch;
use super::*;
use crate::functions::Local;
use crate::options::FloorDivision;

impl Compiler<'_> {
    pub(super) fn compile_binop(
        &mut self,
        ctx: &mut FunctionContext,
        left: &Spanned<Expr>,
        op: BinOp,
        right: &Spanned<Expr>,
        span: &Span,
    ) -> CompileResult<ir::Expr> {
        if !matches!(
            op,
            BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div | BinOp::FloorDiv | BinOp::Mod
        ) {
            return Err(CompileError::unsupported(format!("operator '{op}'"), span.clone()));
        }

        let left = self.compile_expr(ctx, left)?;
        let right = self.compile_expr(ctx, right)?;
        let (left, right, kind) = self.unify_operands(left, right, span)?;

        match op {
            // True division always happens in floating point
            BinOp::Div => {
                let float = kind.to_float();
                Ok(ir::Expr::binary(
                    op_dispatch::div(float),
                    convert(left, float),
                    convert(right, float),
                ))
            }
            BinOp::FloorDiv => Ok(self.floor_divide(ctx, left, right, kind)),
            BinOp::Mod => match op_dispatch::rem(kind) {
                Some(rem) => Ok(ir::Expr::binary(rem, left, right)),
                None => Err(CompileError::type_error(
                    format!("modulo is not supported for {kind} operands"),
                    span.clone(),
                )),
            },
            _ => op_dispatch::arithmetic(op, kind)
                .map(|instr| ir::Expr::binary(instr, left, right))
                .ok_or_else(|| CompileError::unsupported(format!("operator '{op}'"), span.clone())),
        }
    }

    fn floor_divide(&self, ctx: &mut FunctionContext, left: ir::Expr, right: ir::Expr, kind: NumKind) -> ir::Expr {
        if let Some(floor) = op_dispatch::floor(kind) {
            return ir::Expr::unary(floor, ir::Expr::binary(op_dispatch::div(kind), left, right));
        }
        match self.options.floor_division {
            FloorDivision::Truncate => ir::Expr::binary(op_dispatch::div(kind), left, right),
            FloorDivision::Floor => flooring_int_division(ctx, left, right, kind),
        }
    }

    pub(super) fn compile_unary(
        &mut self,
        ctx: &mut FunctionContext,
        op: UnaryOp,
        operand: &Spanned<Expr>,
        span: &Span,
    ) -> CompileResult<ir::Expr> {
        let value = self.compile_expr(ctx, operand)?;
        let Some(kind) = value.ty.num_kind() else {
            return Err(CompileError::type_error(
                format!("unary operator on non-numeric value of type {}", value.ty),
                span.clone(),
            ));
        };

        match op {
            UnaryOp::Pos => Ok(value),
            UnaryOp::Neg => Ok(match op_dispatch::neg(kind) {
                Some(neg) => ir::Expr::unary(neg, value),
                None => ir::Expr::binary(
                    op_dispatch::mul(kind),
                    ir::Expr::constant(Literal::from_i32(kind, -1)),
                    value,
                ),
            }),
            // `zero - x`: only behaves like a boolean not for 0
            UnaryOp::Not => Ok(ir::Expr::binary(op_dispatch::sub(kind), zero(kind), value)),
            UnaryOp::Invert => Err(CompileError::unsupported("operator '~'", span.clone())),
        }
    }

    pub(super) fn compile_compare(
        &mut self,
        ctx: &mut FunctionContext,
        left: &Spanned<Expr>,
        ops: &[CmpOp],
        comparators: &[Spanned<Expr>],
        span: &Span,
    ) -> CompileResult<ir::Expr> {
        let ([op], [right]) = (ops, comparators) else {
            return Err(CompileError::unsupported("chained comparison", span.clone()));
        };
        if op_dispatch::comparison(*op, NumKind::I32).is_none() {
            return Err(CompileError::unsupported(format!("'{op}' comparison"), span.clone()));
        }

        let left = self.compile_expr(ctx, left)?;
        let right = self.compile_expr(ctx, right)?;
        let (left, right, kind) = self.unify_operands(left, right, span)?;
        op_dispatch::comparison(*op, kind)
            .map(|instr| ir::Expr::binary(instr, left, right))
            .ok_or_else(|| CompileError::unsupported(format!("'{op}' comparison"), span.clone()))
    }

    pub(super) fn compile_ternary(
        &mut self,
        ctx: &mut FunctionContext,
        test: &Spanned<Expr>,
        body: &Spanned<Expr>,
        orelse: &Spanned<Expr>,
        span: &Span,
    ) -> CompileResult<ir::Expr> {
        let condition = self.compile_condition(ctx, test)?;
        let if_true = self.compile_expr(ctx, body)?;
        let if_false = self.compile_expr(ctx, orelse)?;

        if if_true.ty == if_false.ty && !if_true.ty.is_void() {
            return Ok(ir::Expr::select(condition, if_true, if_false));
        }
        if if_true.ty.num_kind().is_some() && if_false.ty.num_kind().is_some() {
            let (if_true, if_false, _) = self.unify_operands(if_true, if_false, span)?;
            return Ok(ir::Expr::select(condition, if_true, if_false));
        }
        Err(CompileError::type_error(
            format!(
                "branches of conditional expression have incompatible types {} and {}",
                if_true.ty, if_false.ty
            ),
            span.clone(),
        ))
    }
}

/// `left // right` rounding toward negative infinity, for integer kinds:
/// the truncated quotient, minus one when the remainder is non-zero and its
/// sign differs from the divisor's.
fn flooring_int_division(ctx: &mut FunctionContext, left: ir::Expr, right: ir::Expr, kind: NumKind) -> ir::Expr {
    use ir::BinaryOp::*;
    let (less, not_equal, rem) = match kind {
        NumKind::I64 => (LtSI64, NeI64, RemSI64),
        _ => (LtSI32, NeI32, RemSI32),
    };

    let ty = WasmType::from(kind);
    let dividend = ctx.temp_local(ty);
    let divisor = ctx.temp_local(ty);
    let remainder = ctx.temp_local(ty);
    let get = |local: Local| ir::Expr::local_get(local.index, ty);
    let negative = |value: ir::Expr| ir::Expr::binary(less, value, zero(kind));

    let remainder_nonzero = ir::Expr::binary(not_equal, get(remainder), zero(kind));
    let signs_differ = ir::Expr::binary(NeI32, negative(get(remainder)), negative(get(divisor)));
    // Both operands are 0 or 1, so the product is their conjunction
    let adjust = ir::Expr::binary(MulI32, remainder_nonzero, signs_differ);

    let quotient = ir::Expr::binary(op_dispatch::div(kind), get(dividend), get(divisor));
    ir::Expr::block(
        None,
        vec![
            ir::Expr::local_set(dividend.index, left),
            ir::Expr::local_set(divisor.index, right),
            ir::Expr::local_set(remainder.index, ir::Expr::binary(rem, get(dividend), get(divisor))),
            ir::Expr::binary(op_dispatch::sub(kind), quotient, convert(adjust, kind)),
        ],
        ty,
    )
}
