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

//! Text listing of the IR in a WAT-flavoured s-expression syntax.

use std::fmt::{self, Write};

use super::{Expr, ExprKind, Function, Global, Literal, Module};
use crate::types::WasmType;

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::I32(v) => write!(f, "i32.const {v}"),
            Literal::I64(v) => write!(f, "i64.const {v}"),
            Literal::F32(v) => write!(f, "f32.const {v:?}"),
            Literal::F64(v) => write!(f, "f64.const {v:?}"),
        }
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "(module")?;
        for global in &self.globals {
            write_global(f, global)?;
        }
        for function in &self.functions {
            write_function(f, function)?;
        }
        write!(f, ")")
    }
}

fn write_global(f: &mut fmt::Formatter<'_>, global: &Global) -> fmt::Result {
    let ty = if global.mutable {
        format!("(mut {})", global.ty)
    } else {
        global.ty.to_string()
    };
    writeln!(f, "  (global ${} {} ({}))", global.name, ty, global.init)
}

fn write_function(f: &mut fmt::Formatter<'_>, function: &Function) -> fmt::Result {
    let name_of = |index: u32| {
        function
            .local_names
            .iter()
            .find(|(i, _)| *i == index)
            .map(|(_, name)| format!("${name}"))
            .unwrap_or_else(|| index.to_string())
    };

    write!(f, "  (func ${}", function.name)?;
    for (i, ty) in function.params.iter().enumerate() {
        write!(f, " (param {} {})", name_of(i as u32), ty)?;
    }
    if !function.result.is_void() {
        write!(f, " (result {})", function.result)?;
    }
    writeln!(f)?;
    let first_local = function.params.len() as u32;
    for (offset, ty) in function.locals.iter().enumerate() {
        writeln!(f, "    (local {} {})", name_of(first_local + offset as u32), ty)?;
    }

    let mut out = String::new();
    for stmt in &function.body {
        write_expr(&mut out, stmt, 2)?;
    }
    f.write_str(&out)?;
    writeln!(f, "  )")
}

fn write_expr(out: &mut String, expr: &Expr, depth: usize) -> fmt::Result {
    let pad = "  ".repeat(depth);
    let head = match &expr.kind {
        ExprKind::Nop => "nop".to_string(),
        ExprKind::Unreachable => "unreachable".to_string(),
        ExprKind::Const(value) => value.to_string(),
        ExprKind::StringConst(value) => format!("string.const {value:?}"),
        ExprKind::LocalGet(index) => format!("local.get {index}"),
        ExprKind::LocalSet { index, .. } => format!("local.set {index}"),
        ExprKind::GlobalGet(name) => format!("global.get ${name}"),
        ExprKind::GlobalSet { name, .. } => format!("global.set ${name}"),
        ExprKind::Unary { op, .. } => format!("{op:?}"),
        ExprKind::Binary { op, .. } => format!("{op:?}"),
        ExprKind::Select { .. } => "select".to_string(),
        ExprKind::Block { label, .. } => match label {
            Some(label) => format!("block ${label}{}", result_suffix(expr.ty)),
            None => format!("block{}", result_suffix(expr.ty)),
        },
        ExprKind::Loop { label, .. } => format!("loop ${label}"),
        ExprKind::If { .. } => "if".to_string(),
        ExprKind::Break { label, condition } => match condition {
            Some(_) => format!("br_if ${label}"),
            None => format!("br ${label}"),
        },
        ExprKind::Call { target, .. } => format!("call ${target}"),
        ExprKind::Return(_) => "return".to_string(),
        ExprKind::Drop(_) => "drop".to_string(),
        ExprKind::ArrayNew { element, .. } => format!("array.new {element}"),
        ExprKind::ArrayNewFixed { element, values } => {
            format!("array.new_fixed {element} {}", values.len())
        }
        ExprKind::ArrayGet { element, .. } => format!("array.get {element}"),
        ExprKind::ArraySet { element, .. } => format!("array.set {element}"),
        ExprKind::ArrayLen(_) => "array.len".to_string(),
    };

    let children = children(expr);
    if children.is_empty() {
        return writeln!(out, "{pad}({head})");
    }
    writeln!(out, "{pad}({head}")?;
    for child in children {
        write_expr(out, child, depth + 1)?;
    }
    writeln!(out, "{pad})")
}

fn result_suffix(ty: WasmType) -> String {
    if ty.is_void() {
        String::new()
    } else {
        format!(" (result {ty})")
    }
}

/// Direct operands in evaluation order.
fn children(expr: &Expr) -> Vec<&Expr> {
    match &expr.kind {
        ExprKind::LocalSet { value, .. }
        | ExprKind::GlobalSet { value, .. }
        | ExprKind::Unary { value, .. }
        | ExprKind::Drop(value)
        | ExprKind::ArrayLen(value) => vec![value.as_ref()],
        ExprKind::Binary { left, right, .. } => vec![left.as_ref(), right.as_ref()],
        ExprKind::Select {
            condition,
            if_true,
            if_false,
        } => vec![if_true.as_ref(), if_false.as_ref(), condition.as_ref()],
        ExprKind::Block { body, .. } => body.iter().collect(),
        ExprKind::Loop { body, .. } => vec![body.as_ref()],
        ExprKind::If {
            condition,
            then_branch,
            else_branch,
        } => {
            let mut children = vec![condition.as_ref(), then_branch.as_ref()];
            children.extend(else_branch.as_deref());
            children
        }
        ExprKind::Break { condition, .. } => condition.as_deref().into_iter().collect(),
        ExprKind::Return(value) => value.as_deref().into_iter().collect(),
        ExprKind::Call { args, .. } => args.iter().collect(),
        ExprKind::ArrayNewFixed { values, .. } => values.iter().collect(),
        ExprKind::ArrayNew { init, size, .. } => vec![init.as_ref(), size.as_ref()],
        ExprKind::ArrayGet { array, index, .. } => vec![array.as_ref(), index.as_ref()],
        ExprKind::ArraySet {
            array,
            index,
            value,
            ..
        } => vec![array.as_ref(), index.as_ref(), value.as_ref()],
        ExprKind::Nop
        | ExprKind::Unreachable
        | ExprKind::Const(_)
        | ExprKind::StringConst(_)
        | ExprKind::LocalGet(_)
        | ExprKind::GlobalGet(_) => Vec::new(),
    }
}
