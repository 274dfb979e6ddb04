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

use crate::{Param, Spanned};
use crate::op::{BinOp, CmpOp, UnaryOp};

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Name(String),

    /// Numeric literal kept as written (`1_000`, `2.5e3`); the code generator picks its kind
    Number(String),

    /// String literal with quotes stripped and escapes applied: `"hello"`
    StringLit(String),

    Bool(bool),

    /// `None`
    NoneLit,

    UnaryOp {
        op: UnaryOp,
        operand: Box<Spanned<Expr>>,
    },

    /// Arithmetic, bitwise and boolean (`and`/`or`) operators
    BinOp {
        left: Box<Spanned<Expr>>,
        op: BinOp,
        right: Box<Spanned<Expr>>,
    },

    /// `left op0 c0 op1 c1 ...`; a chain like `1 < x < 10` keeps every operator
    Compare {
        left: Box<Spanned<Expr>>,
        ops: Vec<CmpOp>,
        comparators: Vec<Spanned<Expr>>,
    },

    /// `a if cond else b`
    IfExpr {
        test: Box<Spanned<Expr>>,
        body: Box<Spanned<Expr>>,
        orelse: Box<Spanned<Expr>>,
    },

    /// `lambda params: body`
    Lambda {
        params: Vec<Param>,
        body: Box<Spanned<Expr>>,
    },

    /// Keyword arguments are kept in source order
    Call {
        func: Box<Spanned<Expr>>,
        args: Vec<Spanned<Expr>>,
        kwargs: Vec<(String, Spanned<Expr>)>,
    },

    Attribute {
        value: Box<Spanned<Expr>>,
        attr: String,
    },

    /// `value[index]`, also used for annotations such as `array[f64]`
    Subscript {
        value: Box<Spanned<Expr>>,
        index: Box<Spanned<Expr>>,
    },

    /// Parenthesised or bare: `a, b`
    Tuple(Vec<Spanned<Expr>>),

    List(Vec<Spanned<Expr>>),

    Dict {
        keys: Vec<Spanned<Expr>>,
        values: Vec<Spanned<Expr>>,
    },

    Set(Vec<Spanned<Expr>>),

    /// `*expr`
    Starred(Box<Spanned<Expr>>),

    /// `await expr`
    Await(Box<Spanned<Expr>>),

    /// `yield expr`
    Yield(Option<Box<Spanned<Expr>>>),

    /// `yield from expr`
    YieldFrom(Box<Spanned<Expr>>),

    /// `name := expr`
    NamedExpr {
        target: Box<Spanned<Expr>>,
        value: Box<Spanned<Expr>>,
    },
}
impl Expr {
    /// Short human-readable name used in diagnostics.
    pub fn describe(&self) -> &'static str {
        match self {
            Expr::Name(_) => "name",
            Expr::Number(_) => "number",
            Expr::StringLit(_) => "string literal",
            Expr::Bool(_) => "boolean literal",
            Expr::NoneLit => "None",
            Expr::UnaryOp { .. } => "unary operation",
            Expr::BinOp { .. } => "binary operation",
            Expr::Compare { .. } => "comparison",
            Expr::IfExpr { .. } => "conditional expression",
            Expr::Lambda { .. } => "lambda",
            Expr::Call { .. } => "call",
            Expr::Attribute { .. } => "attribute access",
            Expr::Subscript { .. } => "subscript",
            Expr::Tuple(_) => "tuple",
            Expr::List(_) => "list literal",
            Expr::Dict { .. } => "dict literal",
            Expr::Set(_) => "set literal",
            Expr::Starred(_) => "starred expression",
            Expr::Await(_) => "await expression",
            Expr::Yield(_) => "yield expression",
            Expr::YieldFrom(_) => "yield from expression",
            Expr::NamedExpr { .. } => "assignment expression",
        }
    }

    pub fn as_name(&self) -> Option<&str> {
        match self {
            Expr::Name(name) => Some(name),
            _ => None,
        }
    }
}
