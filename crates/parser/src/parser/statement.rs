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

use ast::{ExceptHandler, Expr, Param, Spanned, Stmt};

use super::*;

impl<I: Iterator<Item = SpannedToken>> Parser<I> {
    pub(crate) fn parse_stmt(&mut self) -> ParseResult<Spanned<Stmt>> {
        let start = self.peek_span();
        let stmt = match self.peek_token() {
            Token::If => self.parse_if()?,
            Token::While => self.parse_while()?,
            Token::For => self.parse_for()?,
            Token::Def => self.parse_func_def(Vec::new())?,
            Token::Class => self.parse_class_def(Vec::new())?,
            Token::Try => self.parse_try()?,
            Token::With => self.parse_with()?,
            Token::At => self.parse_decorated()?,
            _ => {
                let stmt = self.parse_simple_stmt()?;
                let span = self.span_from(&start);
                self.end_of_statement()?;
                return Ok(Spanned::new(stmt, span));
            }
        };
        Ok(Spanned::new(stmt, self.span_from(&start)))
    }

    /// A statement that fits on one line. The terminating newline is left
    /// for the caller.
    fn parse_simple_stmt(&mut self) -> ParseResult<Stmt> {
        let stmt = match self.peek_token() {
            Token::Pass => {
                self.advance();
                Stmt::Pass
            }
            Token::Break => {
                self.advance();
                Stmt::Break
            }
            Token::Continue => {
                self.advance();
                Stmt::Continue
            }
            Token::Return => {
                self.advance();
                if self.at_line_end() {
                    Stmt::Return(None)
                } else {
                    Stmt::Return(Some(self.parse_expr_list()?))
                }
            }
            Token::Del => {
                self.advance();
                Stmt::Del(self.parse_expr_list()?)
            }
            Token::Assert => {
                self.advance();
                let test = self.parse_expr()?;
                let msg = if self.eat(Token::Comma) {
                    Some(self.parse_expr()?)
                } else {
                    None
                };
                Stmt::Assert { test, msg }
            }
            Token::Raise => self.parse_raise()?,
            Token::Global => {
                self.advance();
                Stmt::Global(self.parse_name_list()?)
            }
            Token::Nonlocal => {
                self.advance();
                Stmt::Nonlocal(self.parse_name_list()?)
            }
            Token::Import => self.parse_import()?,
            Token::From => self.parse_from_import()?,
            _ => self.parse_expr_or_assign_stmt()?,
        };
        Ok(stmt)
    }

    fn at_line_end(&mut self) -> bool {
        matches!(
            self.peek_token(),
            Token::Newline | Token::Eof | Token::Dedent
        )
    }

    fn parse_raise(&mut self) -> ParseResult<Stmt> {
        self.advance(); // consume `raise`
        if self.at_line_end() {
            return Ok(Stmt::Raise {
                exc: None,
                cause: None,
            });
        }
        let exc = self.parse_expr()?;
        let cause = if self.eat(Token::From) {
            Some(self.parse_expr()?)
        } else {
            None
        };
        Ok(Stmt::Raise {
            exc: Some(exc),
            cause,
        })
    }

    fn parse_name_list(&mut self) -> ParseResult<Vec<String>> {
        let mut names = vec![self.expect_name()?];
        while self.eat(Token::Comma) {
            names.push(self.expect_name()?);
        }
        Ok(names)
    }

    fn parse_import(&mut self) -> ParseResult<Stmt> {
        self.advance(); // consume `import`
        let module = self.parse_dotted_name()?;
        let alias = if self.eat(Token::As) {
            Some(self.expect_name()?)
        } else {
            None
        };
        Ok(Stmt::Import { module, alias })
    }

    fn parse_from_import(&mut self) -> ParseResult<Stmt> {
        self.advance(); // consume `from`
        let module = self.parse_dotted_name()?;
        self.expect(Token::Import)?;
        let parenthesized = self.eat(Token::LParen);
        let mut names = Vec::new();
        loop {
            let name = self.expect_name()?;
            let alias = if self.eat(Token::As) {
                Some(self.expect_name()?)
            } else {
                None
            };
            names.push((name, alias));
            if !self.eat(Token::Comma) || (parenthesized && self.peek_token() == Token::RParen) {
                break;
            }
        }
        if parenthesized {
            self.expect(Token::RParen)?;
        }
        Ok(Stmt::FromImport { module, names })
    }

    fn parse_dotted_name(&mut self) -> ParseResult<Vec<String>> {
        let mut parts = vec![self.expect_name()?];
        while self.eat(Token::Dot) {
            parts.push(self.expect_name()?);
        }
        Ok(parts)
    }

    fn parse_expr_or_assign_stmt(&mut self) -> ParseResult<Stmt> {
        let expr = self.parse_expr_list()?;

        if let Some(op) = self.peek_token().aug_op() {
            self.advance();
            let value = self.parse_expr_list()?;
            return Ok(Stmt::AugAssign {
                target: expr,
                op,
                value,
            });
        }

        // `target: annotation [= value]`
        if self.eat(Token::Colon) {
            let annotation = self.parse_expr()?;
            let value = if self.eat(Token::Assign) {
                Some(self.parse_expr_list()?)
            } else {
                None
            };
            return Ok(Stmt::AnnAssign {
                target: expr,
                annotation,
                value,
            });
        }

        if self.eat(Token::Assign) {
            // chained assignment: `a = b = value`
            let mut targets = vec![expr];
            let mut value = self.parse_expr_list()?;
            while self.eat(Token::Assign) {
                targets.push(value);
                value = self.parse_expr_list()?;
            }
            return Ok(Stmt::Assign { targets, value });
        }

        Ok(Stmt::Expr(expr))
    }

    /// Optional `else:` suite shared by `if`, `while`, `for` and `try`.
    fn parse_else_suite(&mut self) -> ParseResult<Option<Vec<Spanned<Stmt>>>> {
        if self.eat(Token::Else) {
            self.expect(Token::Colon)?;
            Ok(Some(self.parse_block()?))
        } else {
            Ok(None)
        }
    }

    fn parse_if(&mut self) -> ParseResult<Stmt> {
        self.advance(); // consume `if`
        let test = self.parse_expr()?;
        self.expect(Token::Colon)?;
        let body = self.parse_block()?;

        let mut elif_clauses = Vec::new();
        while self.eat(Token::Elif) {
            let elif_test = self.parse_expr()?;
            self.expect(Token::Colon)?;
            elif_clauses.push((elif_test, self.parse_block()?));
        }

        Ok(Stmt::If {
            test,
            body,
            elif_clauses,
            else_body: self.parse_else_suite()?,
        })
    }

    fn parse_while(&mut self) -> ParseResult<Stmt> {
        self.advance(); // consume `while`
        let test = self.parse_expr()?;
        self.expect(Token::Colon)?;
        let body = self.parse_block()?;
        Ok(Stmt::While {
            test,
            body,
            else_body: self.parse_else_suite()?,
        })
    }

    fn parse_for(&mut self) -> ParseResult<Stmt> {
        self.advance(); // consume `for`
        let target = self.parse_target_list()?;
        if !self.peek_is_name("in") {
            return Err(self.unexpected("`in`"));
        }
        self.advance();
        let iter = self.parse_expr_list()?;
        self.expect(Token::Colon)?;
        let body = self.parse_block()?;
        Ok(Stmt::For {
            target,
            iter,
            body,
            else_body: self.parse_else_suite()?,
        })
    }

    /// `for` targets stop before `in`, which is otherwise a comparison operator.
    fn parse_target_list(&mut self) -> ParseResult<Spanned<Expr>> {
        let start = self.peek_span();
        let first = self.parse_postfix()?;
        if self.peek_token() != Token::Comma {
            return Ok(first);
        }
        let mut elems = vec![first];
        while self.eat(Token::Comma) {
            if self.peek_is_name("in") {
                break;
            }
            elems.push(self.parse_postfix()?);
        }
        Ok(Spanned::new(Expr::Tuple(elems), self.span_from(&start)))
    }

    fn parse_func_def(&mut self, decorators: Vec<Spanned<Expr>>) -> ParseResult<Stmt> {
        self.advance(); // consume `def`
        let name = self.expect_name()?;
        self.expect(Token::LParen)?;
        let params = self.parse_params(Token::RParen, true)?;
        self.expect(Token::RParen)?;
        let returns = if self.eat(Token::Arrow) {
            Some(self.parse_expr()?)
        } else {
            None
        };
        self.expect(Token::Colon)?;
        let body = self.parse_block()?;
        Ok(Stmt::FuncDef {
            name,
            params,
            returns,
            body,
            decorators,
        })
    }

    /// Comma-separated parameters up to (not including) `close`. Lambdas
    /// pass `annotated = false` because `:` ends their parameter list.
    pub(crate) fn parse_params(&mut self, close: Token, annotated: bool) -> ParseResult<Vec<Param>> {
        let mut params = Vec::new();
        while self.peek_token() != close {
            let start = self.peek_span();
            let name = self.expect_name()?;
            let annotation = if annotated && self.eat(Token::Colon) {
                Some(self.parse_expr()?)
            } else {
                None
            };
            let default = if self.eat(Token::Assign) {
                Some(self.parse_expr()?)
            } else {
                None
            };
            params.push(Param {
                name,
                annotation,
                default,
                span: self.span_from(&start),
            });
            if !self.eat(Token::Comma) {
                break;
            }
        }
        Ok(params)
    }

    fn parse_class_def(&mut self, decorators: Vec<Spanned<Expr>>) -> ParseResult<Stmt> {
        self.advance(); // consume `class`
        let name = self.expect_name()?;
        let mut bases = Vec::new();
        if self.eat(Token::LParen) {
            while self.peek_token() != Token::RParen {
                bases.push(self.parse_expr()?);
                if !self.eat(Token::Comma) {
                    break;
                }
            }
            self.expect(Token::RParen)?;
        }
        self.expect(Token::Colon)?;
        let body = self.parse_block()?;
        Ok(Stmt::ClassDef {
            name,
            bases,
            body,
            decorators,
        })
    }

    fn parse_try(&mut self) -> ParseResult<Stmt> {
        self.advance(); // consume `try`
        self.expect(Token::Colon)?;
        let body = self.parse_block()?;

        let mut handlers = Vec::new();
        while self.eat(Token::Except) {
            let mut exc_type = None;
            let mut name = None;
            if self.peek_token() != Token::Colon {
                exc_type = Some(self.parse_expr()?);
                if self.eat(Token::As) {
                    name = Some(self.expect_name()?);
                }
            }
            self.expect(Token::Colon)?;
            handlers.push(ExceptHandler {
                exc_type,
                name,
                body: self.parse_block()?,
            });
        }

        let else_body = self.parse_else_suite()?;
        let finally_body = if self.eat(Token::Finally) {
            self.expect(Token::Colon)?;
            Some(self.parse_block()?)
        } else {
            None
        };

        if handlers.is_empty() && finally_body.is_none() {
            return Err(self.unexpected("`except` or `finally`"));
        }

        Ok(Stmt::Try {
            body,
            handlers,
            else_body,
            finally_body,
        })
    }

    fn parse_with(&mut self) -> ParseResult<Stmt> {
        self.advance(); // consume `with`
        let mut items = Vec::new();
        loop {
            let context = self.parse_expr()?;
            let target = if self.eat(Token::As) {
                Some(self.parse_postfix()?)
            } else {
                None
            };
            items.push((context, target));
            if !self.eat(Token::Comma) {
                break;
            }
        }
        self.expect(Token::Colon)?;
        let body = self.parse_block()?;
        Ok(Stmt::With { items, body })
    }

    fn parse_decorated(&mut self) -> ParseResult<Stmt> {
        let mut decorators = Vec::new();
        while self.eat(Token::At) {
            decorators.push(self.parse_expr()?);
            self.expect(Token::Newline)?;
            self.skip_newlines();
        }
        match self.peek_token() {
            Token::Def => self.parse_func_def(decorators),
            Token::Class => self.parse_class_def(decorators),
            _ => Err(self.unexpected("`def` or `class` after decorator")),
        }
    }
}
