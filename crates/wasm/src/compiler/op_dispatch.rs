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
use ast::{BinOp, CmpOp};

use crate::ir::{BinaryOp, UnaryOp};
use crate::types::NumKind;

pub(super) fn add(kind: NumKind) -> BinaryOp {
    match kind {
        NumKind::I32 => BinaryOp::AddI32,
        NumKind::I64 => BinaryOp::AddI64,
        NumKind::F32 => BinaryOp::AddF32,
        NumKind::F64 => BinaryOp::AddF64,
    }
}

pub(super) fn sub(kind: NumKind) -> BinaryOp {
    match kind {
        NumKind::I32 => BinaryOp::SubI32,
        NumKind::I64 => BinaryOp::SubI64,
        NumKind::F32 => BinaryOp::SubF32,
        NumKind::F64 => BinaryOp::SubF64,
    }
}

pub(super) fn mul(kind: NumKind) -> BinaryOp {
    match kind {
        NumKind::I32 => BinaryOp::MulI32,
        NumKind::I64 => BinaryOp::MulI64,
        NumKind::F32 => BinaryOp::MulF32,
        NumKind::F64 => BinaryOp::MulF64,
    }
}

/// Signed, truncating for integers.
pub(super) fn div(kind: NumKind) -> BinaryOp {
    match kind {
        NumKind::I32 => BinaryOp::DivSI32,
        NumKind::I64 => BinaryOp::DivSI64,
        NumKind::F32 => BinaryOp::DivF32,
        NumKind::F64 => BinaryOp::DivF64,
    }
}

/// Signed remainder; floats have none.
pub(super) fn rem(kind: NumKind) -> Option<BinaryOp> {
    match kind {
        NumKind::I32 => Some(BinaryOp::RemSI32),
        NumKind::I64 => Some(BinaryOp::RemSI64),
        NumKind::F32 | NumKind::F64 => None,
    }
}

pub(super) fn floor(kind: NumKind) -> Option<UnaryOp> {
    match kind {
        NumKind::F32 => Some(UnaryOp::FloorF32),
        NumKind::F64 => Some(UnaryOp::FloorF64),
        NumKind::I32 | NumKind::I64 => None,
    }
}

pub(super) fn neg(kind: NumKind) -> Option<UnaryOp> {
    match kind {
        NumKind::F32 => Some(UnaryOp::NegF32),
        NumKind::F64 => Some(UnaryOp::NegF64),
        NumKind::I32 | NumKind::I64 => None,
    }
}

/// Instruction for `+ - *` at `kind`. Division and modulo have their own
/// lowering rules and are not in this table.
pub(super) fn arithmetic(op: BinOp, kind: NumKind) -> Option<BinaryOp> {
    match op {
        BinOp::Add => Some(add(kind)),
        BinOp::Sub => Some(sub(kind)),
        BinOp::Mul => Some(mul(kind)),
        _ => None,
    }
}

pub(super) fn comparison(op: CmpOp, kind: NumKind) -> Option<BinaryOp> {
    use BinaryOp::*;
    let table = match op {
        CmpOp::Eq => [EqI32, EqI64, EqF32, EqF64],
        CmpOp::NotEq => [NeI32, NeI64, NeF32, NeF64],
        CmpOp::Lt => [LtSI32, LtSI64, LtF32, LtF64],
        CmpOp::LtE => [LeSI32, LeSI64, LeF32, LeF64],
        CmpOp::Gt => [GtSI32, GtSI64, GtF32, GtF64],
        CmpOp::GtE => [GeSI32, GeSI64, GeF32, GeF64],
        CmpOp::Is | CmpOp::IsNot | CmpOp::In | CmpOp::NotIn => return None,
    };
    let column = match kind {
        NumKind::I32 => 0,
        NumKind::I64 => 1,
        NumKind::F32 => 2,
        NumKind::F64 => 3,
    };
    Some(table[column])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tables_match_operand_kind() {
        for kind in NumKind::ALL {
            for op in [add(kind), sub(kind), mul(kind), div(kind)] {
                assert_eq!(op.operand_kind(), kind);
                assert!(!op.is_comparison());
            }
            for cmp in [CmpOp::Eq, CmpOp::NotEq, CmpOp::Lt, CmpOp::LtE, CmpOp::Gt, CmpOp::GtE] {
                let op = comparison(cmp, kind).unwrap();
                assert_eq!(op.operand_kind(), kind);
                assert_eq!(op.result_kind(), NumKind::I32);
            }
        }
    }

    #[test]
    fn test_float_only_and_int_only_ops() {
        assert_eq!(rem(NumKind::F64), None);
        assert_eq!(rem(NumKind::I64), Some(BinaryOp::RemSI64));
        assert_eq!(floor(NumKind::I32), None);
        assert_eq!(neg(NumKind::F32), Some(UnaryOp::NegF32));
        assert_eq!(comparison(CmpOp::In, NumKind::I32), None);
        assert_eq!(arithmetic(BinOp::Pow, NumKind::I32), None);
    }
}
