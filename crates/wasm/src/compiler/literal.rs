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
use super::*;

/// A numeric literal as written in the source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) enum Number {
    Int(i64),
    Float(f64),
}

pub(super) fn parse_number(text: &str) -> Option<Number> {
    let digits: String = text.chars().filter(|c| *c != '_').collect();
    let radix = match digits.get(..2) {
        Some("0x" | "0X") => 16,
        Some("0o" | "0O") => 8,
        Some("0b" | "0B") => 2,
        _ => 10,
    };
    if radix != 10 {
        i64::from_str_radix(&digits[2..], radix).ok().map(Number::Int)
    } else if digits.contains(['.', 'e', 'E']) {
        digits.parse().ok().map(Number::Float)
    } else {
        digits.parse().ok().map(Number::Int)
    }
}

/// Integer literals default to `i32`, widening to `i64` only when the value
/// does not fit. Float literals are always `f64`.
pub(super) fn compile_number(text: &str, span: &Span) -> CompileResult<ir::Expr> {
    match parse_number(text) {
        Some(Number::Int(value)) => match i32::try_from(value) {
            Ok(small) => Ok(ir::Expr::i32(small)),
            Err(_) => Ok(ir::Expr::constant(Literal::I64(value))),
        },
        Some(Number::Float(value)) => Ok(ir::Expr::constant(Literal::F64(value))),
        None => Err(CompileError::type_error(
            format!("numeric literal '{text}' is out of range"),
            span.clone(),
        )),
    }
}

fn literal_of(number: Number, kind: NumKind) -> Literal {
    match (number, kind) {
        (Number::Int(v), NumKind::I32) => Literal::I32(v as i32),
        (Number::Int(v), NumKind::I64) => Literal::I64(v),
        (Number::Int(v), NumKind::F32) => Literal::F32(v as f32),
        (Number::Int(v), NumKind::F64) => Literal::F64(v as f64),
        (Number::Float(v), NumKind::I32) => Literal::I32(v as i32),
        (Number::Float(v), NumKind::I64) => Literal::I64(v as i64),
        (Number::Float(v), NumKind::F32) => Literal::F32(v as f32),
        (Number::Float(v), NumKind::F64) => Literal::F64(v),
    }
}

/// Evaluate a global's initializer at compile time: a number, a negated
/// number or a boolean, converted to the declared kind.
pub(super) fn constant_initializer(value: &Spanned<Expr>, kind: NumKind) -> Option<Literal> {
    let number = match &value.node {
        Expr::Number(text) => parse_number(text)?,
        Expr::Bool(flag) => Number::Int(i64::from(*flag)),
        Expr::UnaryOp {
            op: ast::UnaryOp::Neg,
            operand,
        } => match &operand.node {
            Expr::Number(text) => match parse_number(text)? {
                Number::Int(v) => Number::Int(v.checked_neg()?),
                Number::Float(v) => Number::Float(-v),
            },
            _ => return None,
        },
        _ => return None,
    };
    Some(literal_of(number, kind))
}

impl Compiler<'_> {
    /// `[a, b, c]` builds a fixed-size array. The element kind comes from
    /// the declaration the literal initializes.
    pub(super) fn compile_list(
        &mut self,
        ctx: &mut FunctionContext,
        elements: &[Spanned<Expr>],
        hint: Option<WasmType>,
        span: &Span,
    ) -> CompileResult<ir::Expr> {
        let Some(WasmType::Array(element)) = hint else {
            return Err(CompileError::type_error(
                "list literal must initialise a variable annotated with an array type",
                span.clone(),
            ));
        };
        self.require_type(WasmType::Array(element), span)?;

        let mut values = Vec::with_capacity(elements.len());
        for item in elements {
            let value = self.compile_expr(ctx, item)?;
            values.push(self.cast_to_type(value, element.into(), &item.span)?);
        }
        Ok(ir::Expr::array_new_fixed(element, values))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("42"), Some(Number::Int(42)));
        assert_eq!(parse_number("100_000"), Some(Number::Int(100_000)));
        assert_eq!(parse_number("0.5"), Some(Number::Float(0.5)));
        assert_eq!(parse_number("1e3"), Some(Number::Float(1000.0)));
        assert_eq!(parse_number(".5"), Some(Number::Float(0.5)));
        assert_eq!(parse_number("0x1F"), Some(Number::Int(31)));
        assert_eq!(parse_number("0xE"), Some(Number::Int(14)));
        assert_eq!(parse_number("0o17"), Some(Number::Int(15)));
        assert_eq!(parse_number("0b1010_1010"), Some(Number::Int(170)));
        assert_eq!(parse_number("0x"), None);
        assert_eq!(parse_number("99999999999999999999"), None);
    }

    #[test]
    fn test_integer_literal_widens_when_large() {
        let small = compile_number("7", &(0..1)).unwrap();
        assert_eq!(small.ty, WasmType::I32);
        let large = compile_number("10000000000", &(0..11)).unwrap();
        assert_eq!(large.ty, WasmType::I64);
        let float = compile_number("2.5", &(0..3)).unwrap();
        assert_eq!(float.ty, WasmType::F64);
    }

    #[test]
    fn test_constant_initializer() {
        let negated = Spanned::new(
            Expr::UnaryOp {
                op: ast::UnaryOp::Neg,
                operand: Box::new(Spanned::new(Expr::Number("6".into()), 1..2)),
            },
            0..2,
        );
        assert_eq!(constant_initializer(&negated, NumKind::I64), Some(Literal::I64(-6)));
        let flag = Spanned::new(Expr::Bool(true), 0..4);
        assert_eq!(constant_initializer(&flag, NumKind::F32), Some(Literal::F32(1.0)));
        let name = Spanned::new(Expr::Name("x".into()), 0..1);
        assert_eq!(constant_initializer(&name, NumKind::I32), None);
    }
}
