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
use tracing::warn;

use super::*;
use crate::ir::{BinaryOp, UnaryOp};

/// The fixed from-kind x to-kind conversion table. `None` on the diagonal.
pub(super) fn conversion(from: NumKind, to: NumKind) -> Option<UnaryOp> {
    use NumKind::*;
    let op = match (from, to) {
        (I32, I64) => UnaryOp::ExtendI32ToI64,
        (I32, F32) => UnaryOp::ConvertI32ToF32,
        (I32, F64) => UnaryOp::ConvertI32ToF64,
        (I64, I32) => UnaryOp::WrapI64ToI32,
        (I64, F32) => UnaryOp::ConvertI64ToF32,
        (I64, F64) => UnaryOp::ConvertI64ToF64,
        (F32, I32) => UnaryOp::TruncF32ToI32,
        (F32, I64) => UnaryOp::TruncF32ToI64,
        (F32, F64) => UnaryOp::PromoteF32,
        (F64, I32) => UnaryOp::TruncF64ToI32,
        (F64, I64) => UnaryOp::TruncF64ToI64,
        (F64, F32) => UnaryOp::DemoteF64,
        (I32, I32) | (I64, I64) | (F32, F32) | (F64, F64) => return None,
    };
    Some(op)
}

/// Convert a numeric value to `to`. Values already of that kind pass through.
pub(super) fn convert(value: ir::Expr, to: NumKind) -> ir::Expr {
    match value.ty.num_kind().and_then(|from| conversion(from, to)) {
        Some(op) => ir::Expr::unary(op, value),
        None => value,
    }
}

pub(super) fn zero(kind: NumKind) -> ir::Expr {
    ir::Expr::constant(Literal::zero(kind))
}

fn not_equal(kind: NumKind) -> BinaryOp {
    match kind {
        NumKind::I32 => BinaryOp::NeI32,
        NumKind::I64 => BinaryOp::NeI64,
        NumKind::F32 => BinaryOp::NeF32,
        NumKind::F64 => BinaryOp::NeF64,
    }
}

impl Compiler<'_> {
    /// Coerce `value` to `target`. Numeric kinds convert through the table;
    /// any other mismatch is a type error.
    pub(super) fn cast_to_type(&self, value: ir::Expr, target: WasmType, span: &Span) -> CompileResult<ir::Expr> {
        if value.ty == target {
            return Ok(value);
        }
        match (value.ty.num_kind(), target.num_kind()) {
            (Some(from), Some(to)) => {
                if from.narrows_to(to) {
                    warn!(from = %from, to = %to, at = ?span, "implicit narrowing conversion");
                } else {
                    debug!(from = %from, to = %to, "implicit widening conversion");
                }
                Ok(convert(value, to))
            }
            _ => Err(CompileError::type_error(
                format!("expected a value of type {target}, found {}", value.ty),
                span.clone(),
            )),
        }
    }

    /// Bring two operands to their common kind (see [`NumKind::unify`]).
    pub(super) fn unify_operands(
        &self,
        left: ir::Expr,
        right: ir::Expr,
        span: &Span,
    ) -> CompileResult<(ir::Expr, ir::Expr, NumKind)> {
        let (Some(l), Some(r)) = (left.ty.num_kind(), right.ty.num_kind()) else {
            return Err(CompileError::type_error(
                format!("unsupported operand types {} and {}", left.ty, right.ty),
                span.clone(),
            ));
        };
        let target = l.unify(r);
        if l != r {
            debug!(left = %l, right = %r, target = %target, "unifying operands");
        }
        Ok((convert(left, target), convert(right, target), target))
    }

    /// Lower a branch condition to an `i32`; other numeric kinds compare
    /// against zero.
    pub(super) fn compile_condition(
        &mut self,
        ctx: &mut FunctionContext,
        test: &Spanned<Expr>,
    ) -> CompileResult<ir::Expr> {
        let value = self.compile_expr(ctx, test)?;
        match value.ty.num_kind() {
            Some(NumKind::I32) => Ok(value),
            Some(kind) => Ok(ir::Expr::binary(not_equal(kind), value, zero(kind))),
            None => Err(CompileError::type_error(
                format!("condition must be numeric, found {}", value.ty),
                test.span.clone(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversion_table_is_total() {
        for from in NumKind::ALL {
            for to in NumKind::ALL {
                match conversion(from, to) {
                    None => assert_eq!(from, to),
                    Some(op) => {
                        assert_eq!(op.operand_kind(), from);
                        assert_eq!(op.result_kind(), to);
                    }
                }
            }
        }
    }

    #[test]
    fn test_convert_skips_matching_kind() {
        let value = ir::Expr::i32(3);
        assert_eq!(convert(value.clone(), NumKind::I32), value);
        let widened = convert(value, NumKind::F64);
        assert_eq!(widened.ty, WasmType::F64);
    }
}
