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

use ast::{Expr, Spanned};

use super::*;

impl<I: Iterator<Item = SpannedToken>> Parser<I> {
    pub(crate) fn parse_await_expr(&mut self) -> ParseResult<Spanned<Expr>> {
        if self.peek_token() != Token::Await {
            return self.parse_postfix();
        }
        let start = self.peek_span();
        self.advance();
        let operand = self.parse_postfix()?;
        Ok(Spanned::new(
            Expr::Await(Box::new(operand)),
            self.span_from(&start),
        ))
    }

    /// A primary followed by any number of calls, attribute accesses and subscripts.
    pub(crate) fn parse_postfix(&mut self) -> ParseResult<Spanned<Expr>> {
        let start = self.peek_span();
        let mut expr = self.parse_primary()?;

        loop {
            let node = match self.peek_token() {
                Token::LParen => {
                    self.advance();
                    let (args, kwargs) = self.parse_call_args()?;
                    self.expect(Token::RParen)?;
                    Expr::Call {
                        func: Box::new(expr),
                        args,
                        kwargs,
                    }
                }
                Token::Dot => {
                    self.advance();
                    let attr = self.expect_name()?;
                    Expr::Attribute {
                        value: Box::new(expr),
                        attr,
                    }
                }
                Token::LBracket => {
                    self.advance();
                    let index = self.parse_expr_list()?;
                    self.expect(Token::RBracket)?;
                    Expr::Subscript {
                        value: Box::new(expr),
                        index: Box::new(index),
                    }
                }
                _ => break,
            };
            expr = Spanned::new(node, self.span_from(&start));
        }
        Ok(expr)
    }

    /// Positional and keyword call arguments. A keyword argument is a bare
    /// name followed by `=`, which no expression can otherwise contain.
    fn parse_call_args(&mut self) -> ParseResult<(Vec<Spanned<Expr>>, Vec<(String, Spanned<Expr>)>)> {
        let mut args = Vec::new();
        let mut kwargs = Vec::new();
        while self.peek_token() != Token::RParen {
            let arg = self.parse_expr()?;
            let keyword = arg.node.as_name().map(str::to_string);
            match keyword {
                Some(name) if self.eat(Token::Assign) => {
                    kwargs.push((name, self.parse_expr()?));
                }
                _ if !kwargs.is_empty() => {
                    return Err(ParseError::new(
                        "positional argument follows keyword argument",
                        arg.span,
                    ));
                }
                _ => args.push(arg),
            }
            if !self.eat(Token::Comma) {
                break;
            }
        }
        Ok((args, kwargs))
    }
}
