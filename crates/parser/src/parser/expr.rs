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

use ast::{BinOp, Expr, Spanned, UnaryOp};

use super::*;

impl<I: Iterator<Item = SpannedToken>> Parser<I> {
    /// Full expression: ternary, lambda, yield, or walrus.
    pub(crate) fn parse_expr(&mut self) -> ParseResult<Spanned<Expr>> {
        let start = self.peek_span();

        match self.peek_token() {
            Token::Lambda => return self.parse_lambda(),
            Token::Yield => return self.parse_yield_expr(),
            _ => {}
        }

        let expr = self.parse_or()?;

        // ternary: `body if test else orelse`
        if self.eat(Token::If) {
            let test = self.parse_or()?;
            self.expect(Token::Else)?;
            let orelse = self.parse_expr()?;
            return Ok(Spanned::new(
                Expr::IfExpr {
                    test: Box::new(test),
                    body: Box::new(expr),
                    orelse: Box::new(orelse),
                },
                self.span_from(&start),
            ));
        }

        if self.eat(Token::Walrus) {
            let value = self.parse_expr()?;
            return Ok(Spanned::new(
                Expr::NamedExpr {
                    target: Box::new(expr),
                    value: Box::new(value),
                },
                self.span_from(&start),
            ));
        }

        Ok(expr)
    }

    /// Expression that may be an unparenthesized tuple: `a, b = b, a`.
    pub(crate) fn parse_expr_list(&mut self) -> ParseResult<Spanned<Expr>> {
        let start = self.peek_span();
        let first = self.parse_expr()?;
        if self.peek_token() != Token::Comma {
            return Ok(first);
        }
        let mut elems = vec![first];
        while self.eat(Token::Comma) {
            if self.at_expr_list_end() {
                break;
            }
            elems.push(self.parse_expr()?);
        }
        Ok(Spanned::new(Expr::Tuple(elems), self.span_from(&start)))
    }

    fn at_expr_list_end(&mut self) -> bool {
        matches!(
            self.peek_token(),
            Token::Newline | Token::Eof | Token::Dedent | Token::Assign | Token::Colon | Token::RParen
        ) || self.peek_token().aug_op().is_some()
    }

    fn parse_lambda(&mut self) -> ParseResult<Spanned<Expr>> {
        let start = self.peek_span();
        self.advance(); // consume `lambda`
        let params = self.parse_params(Token::Colon, false)?;
        self.expect(Token::Colon)?;
        let body = self.parse_expr()?;
        Ok(Spanned::new(
            Expr::Lambda {
                params,
                body: Box::new(body),
            },
            self.span_from(&start),
        ))
    }

    fn parse_yield_expr(&mut self) -> ParseResult<Spanned<Expr>> {
        let start = self.peek_span();
        self.advance(); // consume `yield`
        if self.eat(Token::From) {
            let value = self.parse_expr()?;
            return Ok(Spanned::new(
                Expr::YieldFrom(Box::new(value)),
                self.span_from(&start),
            ));
        }
        if matches!(
            self.peek_token(),
            Token::Newline | Token::Eof | Token::Dedent | Token::RParen
        ) {
            return Ok(Spanned::new(Expr::Yield(None), self.span_from(&start)));
        }
        let value = self.parse_expr()?;
        Ok(Spanned::new(
            Expr::Yield(Some(Box::new(value))),
            self.span_from(&start),
        ))
    }

    fn parse_or(&mut self) -> ParseResult<Spanned<Expr>> {
        self.parse_bool_chain("or", BinOp::Or, Self::parse_and)
    }

    fn parse_and(&mut self) -> ParseResult<Spanned<Expr>> {
        self.parse_bool_chain("and", BinOp::And, Self::parse_not)
    }

    fn parse_bool_chain(
        &mut self,
        keyword: &str,
        op: BinOp,
        operand: fn(&mut Self) -> ParseResult<Spanned<Expr>>,
    ) -> ParseResult<Spanned<Expr>> {
        let start = self.peek_span();
        let mut left = operand(self)?;
        while self.peek_is_name(keyword) {
            self.advance();
            let right = operand(self)?;
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

    fn parse_not(&mut self) -> ParseResult<Spanned<Expr>> {
        if !self.peek_is_name("not") {
            return self.parse_comparison();
        }
        let start = self.peek_span();
        self.advance();
        let operand = self.parse_not()?;
        Ok(Spanned::new(
            Expr::UnaryOp {
                op: UnaryOp::Not,
                operand: Box::new(operand),
            },
            self.span_from(&start),
        ))
    }

    /// `and`, `or`, `not`, `in`, `is` are lexed as names.
    pub(crate) fn peek_is_name(&mut self, word: &str) -> bool {
        if self.peek_token() != Token::Name {
            return false;
        }
        let span = self.peek_span();
        self.text(&span) == word
    }

    pub(crate) fn parse_primary(&mut self) -> ParseResult<Spanned<Expr>> {
        let start = self.peek_span();

        let node = match self.peek_token() {
            Token::Name => {
                self.advance();
                Expr::Name(self.last_text().to_string())
            }
            Token::Number => {
                self.advance();
                Expr::Number(self.last_text().to_string())
            }
            Token::String => {
                // adjacent literals concatenate: `"a" "b"`
                let mut value = String::new();
                while self.eat(Token::String) {
                    value.push_str(&unquote(self.last_text()));
                }
                Expr::StringLit(value)
            }
            Token::True => {
                self.advance();
                Expr::Bool(true)
            }
            Token::False => {
                self.advance();
                Expr::Bool(false)
            }
            Token::None_ => {
                self.advance();
                Expr::NoneLit
            }
            Token::LParen => {
                self.advance();
                if self.eat(Token::RParen) {
                    Expr::Tuple(Vec::new())
                } else {
                    let inner = self.parse_expr_list()?;
                    self.expect(Token::RParen)?;
                    // a parenthesized expression keeps its own span
                    return Ok(inner);
                }
            }
            Token::LBracket => {
                self.advance();
                let elems = self.parse_sequence(Token::RBracket)?;
                self.expect(Token::RBracket)?;
                Expr::List(elems)
            }
            Token::LBrace => {
                self.advance();
                let node = self.parse_brace_literal()?;
                self.expect(Token::RBrace)?;
                node
            }
            Token::Star => {
                self.advance();
                let inner = self.parse_or()?;
                Expr::Starred(Box::new(inner))
            }
            _ => return Err(self.unexpected("expression")),
        };
        Ok(Spanned::new(node, self.span_from(&start)))
    }

    /// Comma-separated expressions up to `close`, allowing a trailing comma.
    fn parse_sequence(&mut self, close: Token) -> ParseResult<Vec<Spanned<Expr>>> {
        let mut elems = Vec::new();
        while self.peek_token() != close {
            elems.push(self.parse_expr()?);
            if !self.eat(Token::Comma) {
                break;
            }
        }
        Ok(elems)
    }

    /// Body of `{...}`: a dict if the first entry has a colon, a set otherwise.
    fn parse_brace_literal(&mut self) -> ParseResult<Expr> {
        if self.peek_token() == Token::RBrace {
            return Ok(Expr::Dict {
                keys: Vec::new(),
                values: Vec::new(),
            });
        }
        let first = self.parse_expr()?;
        if !self.eat(Token::Colon) {
            let mut elems = vec![first];
            if self.eat(Token::Comma) {
                elems.extend(self.parse_sequence(Token::RBrace)?);
            }
            return Ok(Expr::Set(elems));
        }

        let mut keys = vec![first];
        let mut values = vec![self.parse_expr()?];
        while self.eat(Token::Comma) {
            if self.peek_token() == Token::RBrace {
                break;
            }
            keys.push(self.parse_expr()?);
            self.expect(Token::Colon)?;
            values.push(self.parse_expr()?);
        }
        Ok(Expr::Dict { keys, values })
    }
}

/// Strips the quotes from a string token and applies the common escapes.
fn unquote(token: &str) -> String {
    let quote_len = if token.starts_with("\"\"\"") || token.starts_with("'''") {
        3
    } else {
        1
    };
    let inner = &token[quote_len..token.len() - quote_len];

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some('\\') => out.push('\\'),
            Some('\'') => out.push('\''),
            Some('"') => out.push('"'),
            Some('\n') => {}
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::unquote;

    #[test]
    fn test_unquote() {
        assert_eq!(unquote("'abc'"), "abc");
        assert_eq!(unquote(r#""a\nb""#), "a\nb");
        assert_eq!(unquote(r#""say \"hi\"""#), "say \"hi\"");
        assert_eq!(unquote("\"\"\"doc\nstring\"\"\""), "doc\nstring");
        assert_eq!(unquote(r"'\d'"), r"\d");
    }
}
