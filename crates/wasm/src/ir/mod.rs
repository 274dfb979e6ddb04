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

//! Structured, typed intermediate representation handed to the encoder.
//!
//! Expressions form a tree: every node carries its result type, control
//! constructs carry named labels, and branches refer to labels by name.
//! Label names are resolved to relative depths only when encoding.

mod print;

use crate::types::{NumKind, WasmType};

pub type Label = String;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Literal {
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
}

impl Literal {
    pub fn kind(self) -> NumKind {
        match self {
            Literal::I32(_) => NumKind::I32,
            Literal::I64(_) => NumKind::I64,
            Literal::F32(_) => NumKind::F32,
            Literal::F64(_) => NumKind::F64,
        }
    }

    pub fn zero(kind: NumKind) -> Literal {
        Literal::from_i32(kind, 0)
    }

    /// Small integer constant of any kind.
    pub fn from_i32(kind: NumKind, value: i32) -> Literal {
        match kind {
            NumKind::I32 => Literal::I32(value),
            NumKind::I64 => Literal::I64(value.into()),
            NumKind::F32 => Literal::F32(value as f32),
            NumKind::F64 => Literal::F64(value.into()),
        }
    }
}

/// Single-operand instructions: the numeric conversion table plus the few
/// float operations the generator needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    ExtendI32ToI64,
    WrapI64ToI32,
    ConvertI32ToF32,
    ConvertI32ToF64,
    ConvertI64ToF32,
    ConvertI64ToF64,
    TruncF32ToI32,
    TruncF32ToI64,
    TruncF64ToI32,
    TruncF64ToI64,
    PromoteF32,
    DemoteF64,
    NegF32,
    NegF64,
    FloorF32,
    FloorF64,
    CeilF64,
}

impl UnaryOp {
    pub fn operand_kind(self) -> NumKind {
        use UnaryOp::*;
        match self {
            ExtendI32ToI64 | ConvertI32ToF32 | ConvertI32ToF64 => NumKind::I32,
            WrapI64ToI32 | ConvertI64ToF32 | ConvertI64ToF64 => NumKind::I64,
            TruncF32ToI32 | TruncF32ToI64 | PromoteF32 | NegF32 | FloorF32 => NumKind::F32,
            TruncF64ToI32 | TruncF64ToI64 | DemoteF64 | NegF64 | FloorF64 | CeilF64 => NumKind::F64,
        }
    }

    pub fn result_kind(self) -> NumKind {
        use UnaryOp::*;
        match self {
            WrapI64ToI32 | TruncF32ToI32 | TruncF64ToI32 => NumKind::I32,
            ExtendI32ToI64 | TruncF32ToI64 | TruncF64ToI64 => NumKind::I64,
            ConvertI32ToF32 | ConvertI64ToF32 | DemoteF64 | NegF32 | FloorF32 => NumKind::F32,
            ConvertI32ToF64 | ConvertI64ToF64 | PromoteF32 | NegF64 | FloorF64 | CeilF64 => NumKind::F64,
        }
    }
}

/// Two-operand instructions, one variant per numeric kind. Integer
/// division, remainder and ordering are signed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    AddI32,
    AddI64,
    AddF32,
    AddF64,
    SubI32,
    SubI64,
    SubF32,
    SubF64,
    MulI32,
    MulI64,
    MulF32,
    MulF64,
    DivSI32,
    DivSI64,
    DivF32,
    DivF64,
    RemSI32,
    RemSI64,
    EqI32,
    EqI64,
    EqF32,
    EqF64,
    NeI32,
    NeI64,
    NeF32,
    NeF64,
    LtSI32,
    LtSI64,
    LtF32,
    LtF64,
    LeSI32,
    LeSI64,
    LeF32,
    LeF64,
    GtSI32,
    GtSI64,
    GtF32,
    GtF64,
    GeSI32,
    GeSI64,
    GeF32,
    GeF64,
}

impl BinaryOp {
    pub fn operand_kind(self) -> NumKind {
        use BinaryOp::*;
        match self {
            AddI32 | SubI32 | MulI32 | DivSI32 | RemSI32 | EqI32 | NeI32 | LtSI32 | LeSI32
            | GtSI32 | GeSI32 => NumKind::I32,
            AddI64 | SubI64 | MulI64 | DivSI64 | RemSI64 | EqI64 | NeI64 | LtSI64 | LeSI64
            | GtSI64 | GeSI64 => NumKind::I64,
            AddF32 | SubF32 | MulF32 | DivF32 | EqF32 | NeF32 | LtF32 | LeF32 | GtF32
            | GeF32 => NumKind::F32,
            AddF64 | SubF64 | MulF64 | DivF64 | EqF64 | NeF64 | LtF64 | LeF64 | GtF64
            | GeF64 => NumKind::F64,
        }
    }

    pub fn is_comparison(self) -> bool {
        use BinaryOp::*;
        matches!(
            self,
            EqI32 | EqI64 | EqF32 | EqF64 | NeI32 | NeI64 | NeF32 | NeF64 | LtSI32 | LtSI64
                | LtF32 | LtF64 | LeSI32 | LeSI64 | LeF32 | LeF64 | GtSI32 | GtSI64 | GtF32
                | GtF64 | GeSI32 | GeSI64 | GeF32 | GeF64
        )
    }

    /// Comparisons produce an `i32` boolean; everything else keeps the operand kind.
    pub fn result_kind(self) -> NumKind {
        if self.is_comparison() {
            NumKind::I32
        } else {
            self.operand_kind()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub ty: WasmType,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Nop,
    Unreachable,
    Const(Literal),
    StringConst(String),
    LocalGet(u32),
    LocalSet {
        index: u32,
        value: Box<Expr>,
    },
    GlobalGet(String),
    GlobalSet {
        name: String,
        value: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        value: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// Evaluates both arms, then picks one by `condition`.
    Select {
        condition: Box<Expr>,
        if_true: Box<Expr>,
        if_false: Box<Expr>,
    },
    Block {
        label: Option<Label>,
        body: Vec<Expr>,
    },
    /// Branching to a loop's label jumps back to its start.
    Loop {
        label: Label,
        body: Box<Expr>,
    },
    If {
        condition: Box<Expr>,
        then_branch: Box<Expr>,
        else_branch: Option<Box<Expr>>,
    },
    /// `br`, or `br_if` when a condition is present.
    Break {
        label: Label,
        condition: Option<Box<Expr>>,
    },
    Call {
        target: String,
        args: Vec<Expr>,
    },
    Return(Option<Box<Expr>>),
    Drop(Box<Expr>),
    ArrayNew {
        element: NumKind,
        init: Box<Expr>,
        size: Box<Expr>,
    },
    ArrayNewFixed {
        element: NumKind,
        values: Vec<Expr>,
    },
    ArrayGet {
        element: NumKind,
        array: Box<Expr>,
        index: Box<Expr>,
    },
    ArraySet {
        element: NumKind,
        array: Box<Expr>,
        index: Box<Expr>,
        value: Box<Expr>,
    },
    ArrayLen(Box<Expr>),
}

impl Expr {
    fn new(kind: ExprKind, ty: WasmType) -> Self {
        Self { kind, ty }
    }

    pub fn nop() -> Self {
        Self::new(ExprKind::Nop, WasmType::Void)
    }

    pub fn unreachable() -> Self {
        Self::new(ExprKind::Unreachable, WasmType::Void)
    }

    pub fn constant(value: Literal) -> Self {
        Self::new(ExprKind::Const(value), value.kind().into())
    }

    pub fn i32(value: i32) -> Self {
        Self::constant(Literal::I32(value))
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self::new(ExprKind::StringConst(value.into()), WasmType::Str)
    }

    pub fn local_get(index: u32, ty: WasmType) -> Self {
        Self::new(ExprKind::LocalGet(index), ty)
    }

    pub fn local_set(index: u32, value: Expr) -> Self {
        Self::new(
            ExprKind::LocalSet {
                index,
                value: Box::new(value),
            },
            WasmType::Void,
        )
    }

    pub fn global_get(name: impl Into<String>, ty: WasmType) -> Self {
        Self::new(ExprKind::GlobalGet(name.into()), ty)
    }

    pub fn global_set(name: impl Into<String>, value: Expr) -> Self {
        Self::new(
            ExprKind::GlobalSet {
                name: name.into(),
                value: Box::new(value),
            },
            WasmType::Void,
        )
    }

    pub fn unary(op: UnaryOp, value: Expr) -> Self {
        Self::new(
            ExprKind::Unary {
                op,
                value: Box::new(value),
            },
            op.result_kind().into(),
        )
    }

    pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Self {
        Self::new(
            ExprKind::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            },
            op.result_kind().into(),
        )
    }

    /// Both arms must already share a type.
    pub fn select(condition: Expr, if_true: Expr, if_false: Expr) -> Self {
        let ty = if_true.ty;
        Self::new(
            ExprKind::Select {
                condition: Box::new(condition),
                if_true: Box::new(if_true),
                if_false: Box::new(if_false),
            },
            ty,
        )
    }

    pub fn block(label: Option<Label>, body: Vec<Expr>, ty: WasmType) -> Self {
        Self::new(ExprKind::Block { label, body }, ty)
    }

    pub fn loop_(label: impl Into<Label>, body: Expr) -> Self {
        Self::new(
            ExprKind::Loop {
                label: label.into(),
                body: Box::new(body),
            },
            WasmType::Void,
        )
    }

    pub fn if_else(condition: Expr, then_branch: Expr, else_branch: Option<Expr>) -> Self {
        Self::new(
            ExprKind::If {
                condition: Box::new(condition),
                then_branch: Box::new(then_branch),
                else_branch: else_branch.map(Box::new),
            },
            WasmType::Void,
        )
    }

    pub fn br(label: impl Into<Label>) -> Self {
        Self::new(
            ExprKind::Break {
                label: label.into(),
                condition: None,
            },
            WasmType::Void,
        )
    }

    pub fn call(target: impl Into<String>, args: Vec<Expr>, result: WasmType) -> Self {
        Self::new(
            ExprKind::Call {
                target: target.into(),
                args,
            },
            result,
        )
    }

    pub fn ret(value: Option<Expr>) -> Self {
        Self::new(ExprKind::Return(value.map(Box::new)), WasmType::Void)
    }

    pub fn drop(value: Expr) -> Self {
        Self::new(ExprKind::Drop(Box::new(value)), WasmType::Void)
    }

    pub fn array_new(element: NumKind, init: Expr, size: Expr) -> Self {
        Self::new(
            ExprKind::ArrayNew {
                element,
                init: Box::new(init),
                size: Box::new(size),
            },
            WasmType::Array(element),
        )
    }

    pub fn array_new_fixed(element: NumKind, values: Vec<Expr>) -> Self {
        Self::new(
            ExprKind::ArrayNewFixed { element, values },
            WasmType::Array(element),
        )
    }

    pub fn array_get(element: NumKind, array: Expr, index: Expr) -> Self {
        Self::new(
            ExprKind::ArrayGet {
                element,
                array: Box::new(array),
                index: Box::new(index),
            },
            element.into(),
        )
    }

    pub fn array_set(element: NumKind, array: Expr, index: Expr, value: Expr) -> Self {
        Self::new(
            ExprKind::ArraySet {
                element,
                array: Box::new(array),
                index: Box::new(index),
                value: Box::new(value),
            },
            WasmType::Void,
        )
    }

    pub fn array_len(array: Expr) -> Self {
        Self::new(ExprKind::ArrayLen(Box::new(array)), WasmType::I32)
    }

    /// Visits this node and every descendant, parents first.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Expr)) {
        visit(self);
        match &self.kind {
            ExprKind::Nop
            | ExprKind::Unreachable
            | ExprKind::Const(_)
            | ExprKind::StringConst(_)
            | ExprKind::LocalGet(_)
            | ExprKind::GlobalGet(_) => {}
            ExprKind::LocalSet { value, .. }
            | ExprKind::GlobalSet { value, .. }
            | ExprKind::Unary { value, .. }
            | ExprKind::Drop(value)
            | ExprKind::ArrayLen(value) => value.walk(visit),
            ExprKind::Binary { left, right, .. } => {
                left.walk(visit);
                right.walk(visit);
            }
            ExprKind::Select {
                condition,
                if_true,
                if_false,
            } => {
                condition.walk(visit);
                if_true.walk(visit);
                if_false.walk(visit);
            }
            ExprKind::Block { body, .. } => body.iter().for_each(|e| e.walk(visit)),
            ExprKind::Loop { body, .. } => body.walk(visit),
            ExprKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                condition.walk(visit);
                then_branch.walk(visit);
                if let Some(else_branch) = else_branch {
                    else_branch.walk(visit);
                }
            }
            ExprKind::Break { condition, .. } => {
                if let Some(condition) = condition {
                    condition.walk(visit);
                }
            }
            ExprKind::Call { args, .. } => args.iter().for_each(|e| e.walk(visit)),
            ExprKind::ArrayNewFixed { values, .. } => values.iter().for_each(|e| e.walk(visit)),
            ExprKind::Return(value) => {
                if let Some(value) = value {
                    value.walk(visit);
                }
            }
            ExprKind::ArrayNew { init, size, .. } => {
                init.walk(visit);
                size.walk(visit);
            }
            ExprKind::ArrayGet { array, index, .. } => {
                array.walk(visit);
                index.walk(visit);
            }
            ExprKind::ArraySet {
                array,
                index,
                value,
                ..
            } => {
                array.walk(visit);
                index.walk(visit);
                value.walk(visit);
            }
        }
    }
}

/// A lowered function. Parameters occupy local indices `0..params.len()`,
/// followed by `locals` in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub name: String,
    pub params: Vec<WasmType>,
    pub result: WasmType,
    pub locals: Vec<WasmType>,
    /// Debug names for parameters and named locals
    pub local_names: Vec<(u32, String)>,
    pub body: Vec<Expr>,
}

impl Function {
    /// Every node in the body, parents first.
    pub fn nodes(&self) -> Vec<&Expr> {
        let mut nodes = Vec::new();
        for stmt in &self.body {
            stmt.walk(&mut |e| nodes.push(e));
        }
        nodes
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Global {
    pub name: String,
    pub ty: NumKind,
    pub mutable: bool,
    pub init: Literal,
}

/// Functions and globals, each exported under its source name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Module {
    pub functions: Vec<Function>,
    pub globals: Vec<Global>,
}

impl Module {
    pub fn function(&self, name: &str) -> Option<&Function> {
        self.functions.iter().find(|f| f.name == name)
    }

    pub fn global(&self, name: &str) -> Option<&Global> {
        self.globals.iter().find(|g| g.name == name)
    }
}

/// Append-only sink the code generator writes into.
#[derive(Debug, Default)]
pub struct ModuleBuilder {
    module: Module,
}

impl ModuleBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_function(&mut self, function: Function) {
        self.module.functions.push(function);
    }

    pub fn add_global(&mut self, name: impl Into<String>, ty: NumKind, mutable: bool, init: Literal) {
        self.module.globals.push(Global {
            name: name.into(),
            ty,
            mutable,
            init,
        });
    }

    pub fn has_global(&self, name: &str) -> bool {
        self.module.global(name).is_some()
    }

    pub fn finish(self) -> Module {
        self.module
    }
}
