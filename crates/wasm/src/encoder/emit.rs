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
use wasm_encoder::{BlockType, Function as WasmFunction, Instruction, ValType};

use super::{ArrayStorage, Symbols, TypeInterner};
use crate::error::{CompileError, CompileResult};
use crate::ir::{self, BinaryOp, ExprKind, Literal, UnaryOp};
use crate::types::WasmType;

/// Encode one function body. Non-void functions end in `unreachable` so a
/// body whose every path returns still type-checks at its end.
pub(super) fn encode_function(
    function: &ir::Function,
    symbols: &Symbols,
    types: &mut TypeInterner,
    strings: &mut Vec<Vec<u8>>,
) -> CompileResult<WasmFunction> {
    // Group consecutive locals of the same type for compact encoding
    let mut grouped: Vec<(u32, ValType)> = Vec::new();
    for ty in &function.locals {
        let Some(val_type) = types.val_type(*ty) else {
            return Err(CompileError::Encoding(format!("void local in function '{}'", function.name)));
        };
        match grouped.last_mut() {
            Some((count, last)) if *last == val_type => *count += 1,
            _ => grouped.push((1, val_type)),
        }
    }

    let mut emitter = Emitter {
        func: WasmFunction::new(grouped),
        symbols,
        types,
        strings,
        labels: Vec::new(),
    };
    for expr in &function.body {
        emitter.emit(expr)?;
    }
    if !function.result.is_void() {
        emitter.func.instruction(&Instruction::Unreachable);
    }
    emitter.func.instruction(&Instruction::End);
    Ok(emitter.func)
}

struct Emitter<'a> {
    func: WasmFunction,
    symbols: &'a Symbols,
    types: &'a mut TypeInterner,
    strings: &'a mut Vec<Vec<u8>>,
    /// Enclosing structured constructs, innermost last; `None` for unlabelled ones
    labels: Vec<Option<ir::Label>>,
}

impl Emitter<'_> {
    fn instr(&mut self, instruction: Instruction<'static>) {
        self.func.instruction(&instruction);
    }

    fn block_type(&mut self, ty: WasmType) -> BlockType {
        match self.types.val_type(ty) {
            Some(val_type) => BlockType::Result(val_type),
            None => BlockType::Empty,
        }
    }

    /// Relative depth of the construct named `label`.
    fn depth_of(&self, label: &str) -> CompileResult<u32> {
        self.labels
            .iter()
            .rev()
            .position(|l| l.as_deref() == Some(label))
            .map(|depth| depth as u32)
            .ok_or_else(|| CompileError::Encoding(format!("branch to unknown label '{label}'")))
    }

    fn emit_nested(&mut self, label: Option<ir::Label>, body: &[&ir::Expr]) -> CompileResult<()> {
        self.labels.push(label);
        for expr in body {
            self.emit(expr)?;
        }
        self.labels.pop();
        Ok(())
    }

    fn emit(&mut self, expr: &ir::Expr) -> CompileResult<()> {
        match &expr.kind {
            ExprKind::Nop => self.instr(Instruction::Nop),
            ExprKind::Unreachable => self.instr(Instruction::Unreachable),
            ExprKind::Const(literal) => self.instr(match *literal {
                Literal::I32(v) => Instruction::I32Const(v),
                Literal::I64(v) => Instruction::I64Const(v),
                Literal::F32(v) => Instruction::F32Const(v.into()),
                Literal::F64(v) => Instruction::F64Const(v.into()),
            }),
            ExprKind::StringConst(value) => {
                let bytes = value.as_bytes().to_vec();
                let array_type_index = self.types.array(ArrayStorage::Byte);
                let array_data_index = self.strings.len() as u32;
                self.instr(Instruction::I32Const(0));
                self.instr(Instruction::I32Const(bytes.len() as i32));
                self.instr(Instruction::ArrayNewData {
                    array_type_index,
                    array_data_index,
                });
                self.strings.push(bytes);
            }
            ExprKind::LocalGet(index) => self.instr(Instruction::LocalGet(*index)),
            ExprKind::LocalSet { index, value } => {
                self.emit(value)?;
                self.instr(Instruction::LocalSet(*index));
            }
            ExprKind::GlobalGet(name) => {
                let index = self.symbols.global(name)?;
                self.instr(Instruction::GlobalGet(index));
            }
            ExprKind::GlobalSet { name, value } => {
                self.emit(value)?;
                let index = self.symbols.global(name)?;
                self.instr(Instruction::GlobalSet(index));
            }
            ExprKind::Unary { op, value } => {
                self.emit(value)?;
                self.instr(unary_instruction(*op));
            }
            ExprKind::Binary { op, left, right } => {
                self.emit(left)?;
                self.emit(right)?;
                self.instr(binary_instruction(*op));
            }
            ExprKind::Select {
                condition,
                if_true,
                if_false,
            } => {
                self.emit(if_true)?;
                self.emit(if_false)?;
                self.emit(condition)?;
                if expr.ty.is_reference() {
                    match self.types.val_type(expr.ty) {
                        Some(val_type) => self.instr(Instruction::TypedSelect(val_type)),
                        None => self.instr(Instruction::Select),
                    }
                } else {
                    self.instr(Instruction::Select);
                }
            }
            ExprKind::Block { label, body } => {
                let block_type = self.block_type(expr.ty);
                self.instr(Instruction::Block(block_type));
                let body: Vec<&ir::Expr> = body.iter().collect();
                self.emit_nested(label.clone(), &body)?;
                self.instr(Instruction::End);
            }
            ExprKind::Loop { label, body } => {
                self.instr(Instruction::Loop(BlockType::Empty));
                self.emit_nested(Some(label.clone()), &[body.as_ref()])?;
                self.instr(Instruction::End);
            }
            ExprKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                self.emit(condition)?;
                self.instr(Instruction::If(BlockType::Empty));
                self.emit_nested(None, &[then_branch.as_ref()])?;
                if let Some(else_branch) = else_branch {
                    self.instr(Instruction::Else);
                    self.emit_nested(None, &[else_branch.as_ref()])?;
                }
                self.instr(Instruction::End);
            }
            ExprKind::Break { label, condition } => {
                let depth = self.depth_of(label)?;
                match condition {
                    Some(condition) => {
                        self.emit(condition)?;
                        self.instr(Instruction::BrIf(depth));
                    }
                    None => self.instr(Instruction::Br(depth)),
                }
            }
            ExprKind::Call { target, args } => {
                for arg in args {
                    self.emit(arg)?;
                }
                let index = self.symbols.function(target)?;
                self.instr(Instruction::Call(index));
            }
            ExprKind::Return(value) => {
                if let Some(value) = value {
                    self.emit(value)?;
                }
                self.instr(Instruction::Return);
            }
            ExprKind::Drop(value) => {
                self.emit(value)?;
                self.instr(Instruction::Drop);
            }
            ExprKind::ArrayNew { element, init, size } => {
                self.emit(init)?;
                self.emit(size)?;
                let index = self.types.array(ArrayStorage::Num(*element));
                self.instr(Instruction::ArrayNew(index));
            }
            ExprKind::ArrayNewFixed { element, values } => {
                for value in values {
                    self.emit(value)?;
                }
                let array_type_index = self.types.array(ArrayStorage::Num(*element));
                self.instr(Instruction::ArrayNewFixed {
                    array_type_index,
                    array_size: values.len() as u32,
                });
            }
            ExprKind::ArrayGet { element, array, index } => {
                self.emit(array)?;
                self.emit(index)?;
                let type_index = self.types.array(ArrayStorage::Num(*element));
                self.instr(Instruction::ArrayGet(type_index));
            }
            ExprKind::ArraySet {
                element,
                array,
                index,
                value,
            } => {
                self.emit(array)?;
                self.emit(index)?;
                self.emit(value)?;
                let type_index = self.types.array(ArrayStorage::Num(*element));
                self.instr(Instruction::ArraySet(type_index));
            }
            ExprKind::ArrayLen(array) => {
                self.emit(array)?;
                self.instr(Instruction::ArrayLen);
            }
        }
        Ok(())
    }
}

/// Float to integer conversions saturate instead of trapping.
fn unary_instruction(op: UnaryOp) -> Instruction<'static> {
    match op {
        UnaryOp::ExtendI32ToI64 => Instruction::I64ExtendI32S,
        UnaryOp::WrapI64ToI32 => Instruction::I32WrapI64,
        UnaryOp::ConvertI32ToF32 => Instruction::F32ConvertI32S,
        UnaryOp::ConvertI32ToF64 => Instruction::F64ConvertI32S,
        UnaryOp::ConvertI64ToF32 => Instruction::F32ConvertI64S,
        UnaryOp::ConvertI64ToF64 => Instruction::F64ConvertI64S,
        UnaryOp::TruncF32ToI32 => Instruction::I32TruncSatF32S,
        UnaryOp::TruncF32ToI64 => Instruction::I64TruncSatF32S,
        UnaryOp::TruncF64ToI32 => Instruction::I32TruncSatF64S,
        UnaryOp::TruncF64ToI64 => Instruction::I64TruncSatF64S,
        UnaryOp::PromoteF32 => Instruction::F64PromoteF32,
        UnaryOp::DemoteF64 => Instruction::F32DemoteF64,
        UnaryOp::NegF32 => Instruction::F32Neg,
        UnaryOp::NegF64 => Instruction::F64Neg,
        UnaryOp::FloorF32 => Instruction::F32Floor,
        UnaryOp::FloorF64 => Instruction::F64Floor,
        UnaryOp::CeilF64 => Instruction::F64Ceil,
    }
}

fn binary_instruction(op: BinaryOp) -> Instruction<'static> {
    use BinaryOp::*;
    match op {
        AddI32 => Instruction::I32Add,
        AddI64 => Instruction::I64Add,
        AddF32 => Instruction::F32Add,
        AddF64 => Instruction::F64Add,
        SubI32 => Instruction::I32Sub,
        SubI64 => Instruction::I64Sub,
        SubF32 => Instruction::F32Sub,
        SubF64 => Instruction::F64Sub,
        MulI32 => Instruction::I32Mul,
        MulI64 => Instruction::I64Mul,
        MulF32 => Instruction::F32Mul,
        MulF64 => Instruction::F64Mul,
        DivSI32 => Instruction::I32DivS,
        DivSI64 => Instruction::I64DivS,
        DivF32 => Instruction::F32Div,
        DivF64 => Instruction::F64Div,
        RemSI32 => Instruction::I32RemS,
        RemSI64 => Instruction::I64RemS,
        EqI32 => Instruction::I32Eq,
        EqI64 => Instruction::I64Eq,
        EqF32 => Instruction::F32Eq,
        EqF64 => Instruction::F64Eq,
        NeI32 => Instruction::I32Ne,
        NeI64 => Instruction::I64Ne,
        NeF32 => Instruction::F32Ne,
        NeF64 => Instruction::F64Ne,
        LtSI32 => Instruction::I32LtS,
        LtSI64 => Instruction::I64LtS,
        LtF32 => Instruction::F32Lt,
        LtF64 => Instruction::F64Lt,
        LeSI32 => Instruction::I32LeS,
        LeSI64 => Instruction::I64LeS,
        LeF32 => Instruction::F32Le,
        LeF64 => Instruction::F64Le,
        GtSI32 => Instruction::I32GtS,
        GtSI64 => Instruction::I64GtS,
        GtF32 => Instruction::F32Gt,
        GtF64 => Instruction::F64Gt,
        GeSI32 => Instruction::I32GeS,
        GeSI64 => Instruction::I64GeS,
        GeF32 => Instruction::F32Ge,
        GeF64 => Instruction::F64Ge,
    }
}
