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

use ast::{BinOp, CmpOp, Expr, Spanned, UnaryOp};

use super::*;

/// Binding power of infix arithmetic and bitwise operators; higher binds tighter.
fn infix_precedence(token: Token) -> Option<(BinOp, u8)> {
    let entry = match token {
        Token::Pipe => (BinOp::BitOr, 1),
        Token::Caret => (BinOp::BitXor, 2),
        Token::Amp => (BinOp::BitAnd, 3),
        Token::ShiftLeft => (BinOp::LShift, 4),
        Token::ShiftRight => (BinOp::RShift, 4),
        Token::Plus => (BinOp::Add, 5),
        Token::Minus => (BinOp::Sub, 5),
        Token::Star => (BinOp::Mul, 6),
        Token::Slash => (BinOp::Div, 6),
        Token::FloorDiv => (BinOp::FloorDiv, 6),
        Token::Percent => (BinOp::Mod, 6),
        Token::At => (BinOp::MatMul, 6),
        _ => return None,
    };
    Some(entry)
}

impl<I: Iterator<Item = SpannedToken>> Parser<I> {
    /// `a < b`, `a not in b`, `a is not b`; chains are kept as one node.
    pub(crate) fn parse_comparison(&mut self) -> ParseResult<Spanned<Expr>> {
        let start = self.peek_span();
        let left = self.parse_infix(1)?;
        let mut ops = Vec::new();
        let mut comparators = Vec::new();

        while let Some(op) = self.parse_cmp_op()? {
            ops.push(op);
            comparators.push(self.parse_infix(1)?);
        }

        if ops.is_empty() {
            return Ok(left);
        }
        Ok(Spanned::new(
            Expr::Compare {
                left: Box::new(left),
                ops,
                comparators,
            },
            self.span_from(&start),
        ))
    }

    fn parse_cmp_op(&mut self) -> ParseResult<Option<CmpOp>> {
        let op = match self.peek_token() {
            Token::Eq => CmpOp::Eq,
            Token::NotEq => CmpOp::NotEq,
            Token::Lt => CmpOp::Lt,
            Token::Gt => CmpOp::Gt,
            Token::Le => CmpOp::LtE,
            Token::Ge => CmpOp::GtE,
            Token::Name if self.peek_is_name("in") => CmpOp::In,
            Token::Name if self.peek_is_name("is") => {
                self.advance();
                if self.peek_is_name("not") {
                    self.advance();
                    return Ok(Some(CmpOp::IsNot));
                }
                return Ok(Some(CmpOp::Is));
            }
            Token::Name if self.peek_is_name("not") => {
                self.advance();
                if !self.peek_is_name("in") {
                    return Err(self.unexpected("`in` after `not`"));
                }
                self.advance();
                return Ok(Some(CmpOp::NotIn));
            }
            _ => return Ok(None),
        };
        self.advance();
        Ok(Some(op))
    }

    /// Precedence climbing over the infix operators in [`infix_precedence`].
    /// All of them are left-associative.
    fn parse_infix(&mut self, min_precedence: u8) -> ParseResult<Spanned<Expr>> {
        let start = self.peek_span();
        let mut left = self.parse_factor()?;
        while let Some((op, precedence)) = infix_precedence(self.peek_token()) {
            if precedence < min_precedence {
                break;
            }
            self.advance();
            let right = self.parse_infix(precedence + 1)?;
            left = Spanned::new(
                Expr::BinOp {
                    left: Box::new(left),
                    op,
                    right: Box::new(right),
                },
                self.span_from(&start),
            );
        }
        Ok(left)
    }

    // Unary: +x, -x, ~x
    pub(crate) fn parse_factor(&mut self) -> ParseResult<Spanned<Expr>> {
        let start = self.peek_span();
        let op = match self.peek_token() {
            Token::Plus => UnaryOp::Pos,
            Token::Minus => UnaryOp::Neg,
            Token::Tilde => UnaryOp::Invert,
            _ => return self.parse_power(),
        };
        self.advance();
        let operand = self.parse_factor()?;
        Ok(Spanned::new(
            Expr::UnaryOp {
                op,
                operand: Box::new(operand),
            },
            self.span_from(&start),
        ))
    }

    // ** is right-associative and binds tighter than a unary minus on its left
    fn parse_power(&mut self) -> ParseResult<Spanned<Expr>> {
        let start = self.peek_span();
        let base = self.parse_await_expr()?;
        if !self.eat(Token::Pow) {
            return Ok(base);
        }
        let exponent = self.parse_factor()?;
        Ok(Spanned::new(
            Expr::BinOp {
                left: Box::new(base),
                op: BinOp::Pow,
                right: Box::new(exponent),
            },
            self.span_from(&start),
        ))
    }
}
