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

use crate::op::BinOp;
use crate::{ExceptHandler, Expr, Param, Spanned};

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// Expression used as a statement (e.g. function call, docstring)
    Expr(Spanned<Expr>),

    /// `x = expr` or chained `a = b = expr`
    Assign {
        targets: Vec<Spanned<Expr>>,
        value: Spanned<Expr>,
    },

    /// `x: T = expr` or bare `x: T`
    AnnAssign {
        target: Spanned<Expr>,
        annotation: Spanned<Expr>,
        value: Option<Spanned<Expr>>,
    },

    /// Augmented assignment: `x += 1`, `x //= 2`, etc.
    AugAssign {
        target: Spanned<Expr>,
        op: BinOp,
        value: Spanned<Expr>,
    },

    Return(Option<Spanned<Expr>>),

    Pass,
    Break,
    Continue,

    Del(Spanned<Expr>),

    /// `assert expr [, msg]`
    Assert {
        test: Spanned<Expr>,
        msg: Option<Spanned<Expr>>,
    },

    /// `raise [expr [from expr]]`
    Raise {
        exc: Option<Spanned<Expr>>,
        cause: Option<Spanned<Expr>>,
    },

    /// Names listed in a `global` statement
    Global(Vec<String>),

    Nonlocal(Vec<String>),

    /// `import module [as alias]`
    Import {
        module: Vec<String>,
        alias: Option<String>,
    },

    /// `from module import name [as alias], ...`
    FromImport {
        module: Vec<String>,
        names: Vec<(String, Option<String>)>,
    },

    /// `if` with any number of `elif` clauses and an optional `else`.
    If {
        test: Spanned<Expr>,
        body: Vec<Spanned<Stmt>>,
        elif_clauses: Vec<(Spanned<Expr>, Vec<Spanned<Stmt>>)>,
        else_body: Option<Vec<Spanned<Stmt>>>,
    },

    /// The else body runs only when the loop ends without `break`
    While {
        test: Spanned<Expr>,
        body: Vec<Spanned<Stmt>>,
        else_body: Option<Vec<Spanned<Stmt>>>,
    },

    For {
        target: Spanned<Expr>,
        iter: Spanned<Expr>,
        body: Vec<Spanned<Stmt>>,
        else_body: Option<Vec<Spanned<Stmt>>>,
    },

    /// ```python
    /// @decorator
    /// def name(params) -> returns:
    ///     body
    /// ```
    FuncDef {
        name: String,
        params: Vec<Param>,
        returns: Option<Spanned<Expr>>,
        body: Vec<Spanned<Stmt>>,
        decorators: Vec<Spanned<Expr>>,
    },

    /// `class Name(bases): body`
    ClassDef {
        name: String,
        bases: Vec<Spanned<Expr>>,
        body: Vec<Spanned<Stmt>>,
        decorators: Vec<Spanned<Expr>>,
    },

    Try {
        body: Vec<Spanned<Stmt>>,
        handlers: Vec<ExceptHandler>,
        else_body: Option<Vec<Spanned<Stmt>>>,
        finally_body: Option<Vec<Spanned<Stmt>>>,
    },

    /// Each item is a context expression with an optional `as` target
    With {
        items: Vec<(Spanned<Expr>, Option<Spanned<Expr>>)>,
        body: Vec<Spanned<Stmt>>,
    },
}

impl Stmt {
    /// Short human-readable name used in diagnostics.
    pub fn describe(&self) -> &'static str {
        match self {
            Stmt::Expr(_) => "expression statement",
            Stmt::Assign { .. } => "assignment",
            Stmt::AnnAssign { .. } => "annotated assignment",
            Stmt::AugAssign { .. } => "augmented assignment",
            Stmt::Return(_) => "return statement",
            Stmt::Pass => "pass statement",
            Stmt::Break => "break statement",
            Stmt::Continue => "continue statement",
            Stmt::Del(_) => "del statement",
            Stmt::Assert { .. } => "assert statement",
            Stmt::Raise { .. } => "raise statement",
            Stmt::Global(_) => "global statement",
            Stmt::Nonlocal(_) => "nonlocal statement",
            Stmt::Import { .. } => "import statement",
            Stmt::FromImport { .. } => "from-import statement",
            Stmt::If { .. } => "if statement",
            Stmt::While { .. } => "while loop",
            Stmt::For { .. } => "for loop",
            Stmt::FuncDef { .. } => "function definition",
            Stmt::ClassDef { .. } => "class definition",
            Stmt::Try { .. } => "try statement",
            Stmt::With { .. } => "with statement",
        }
    }
}
