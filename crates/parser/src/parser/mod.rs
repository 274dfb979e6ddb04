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

mod binop;
mod expr;
mod postfix;
mod statement;

use std::iter::Peekable;

use ast::{Module, Spanned, Stmt};
use logos::Span;
use thiserror::Error;

use crate::lexer::{SpannedToken, Token};

#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct ParseError {
    pub message: String,
    pub span: Span,
}

impl ParseError {
    fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
        }
    }
}

type ParseResult<T> = Result<T, ParseError>;

/// Recursive-descent parser over an indentation-aware token stream.
pub struct Parser<I: Iterator<Item = SpannedToken>> {
    tokens: Peekable<I>,
    current_span: Span,
    /// Source text for slicing identifiers / literals
    source: String,
}

impl<I: Iterator<Item = SpannedToken>> Parser<I> {
    pub fn new(source: &str, iterator: I) -> Self {
        Self {
            tokens: iterator.peekable(),
            current_span: 0..0,
            source: source.to_string(),
        }
    }

    fn peek_token(&mut self) -> Token {
        self.tokens.peek().map(|(t, _)| *t).unwrap_or(Token::Eof)
    }

    fn peek_span(&mut self) -> Span {
        match self.tokens.peek() {
            Some((_, span)) => span.clone(),
            None => self.current_span.clone(),
        }
    }

    /// Advances to the next token and returns it, updating the current span.
    fn advance(&mut self) -> Option<Token> {
        let (token, span) = self.tokens.next()?;
        self.current_span = span;
        Some(token)
    }

    fn text(&self, span: &Span) -> &str {
        &self.source[span.start..span.end]
    }

    /// Source text of the last consumed token.
    fn last_text(&self) -> &str {
        self.text(&self.current_span)
    }

    /// Span from `start` up to the end of the last consumed token.
    fn span_from(&self, start: &Span) -> Span {
        start.start..self.current_span.end.max(start.end)
    }

    fn unexpected(&mut self, what: &str) -> ParseError {
        let token = self.peek_token();
        let span = self.peek_span();
        let found = match token {
            Token::Name | Token::Number | Token::String => format!("`{}`", self.text(&span)),
            other => format!("{other:?}"),
        };
        ParseError::new(format!("expected {what}, found {found}"), span)
    }

    /// Consumes the next token if it matches `expected`, else returns an error.
    fn expect(&mut self, expected: Token) -> ParseResult<Span> {
        if self.peek_token() == expected {
            self.advance();
            Ok(self.current_span.clone())
        } else {
            Err(self.unexpected(&format!("{expected:?}")))
        }
    }

    fn expect_name(&mut self) -> ParseResult<String> {
        if self.peek_token() == Token::Name {
            self.advance();
            Ok(self.last_text().to_string())
        } else {
            Err(self.unexpected("identifier"))
        }
    }

    fn skip_newlines(&mut self) {
        while self.peek_token() == Token::Newline {
            self.advance();
        }
    }

    /// Consumes the next token if it matches.
    fn eat(&mut self, expected: Token) -> bool {
        if self.peek_token() == expected {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Ends a simple statement: a newline, or the end of the enclosing block.
    fn end_of_statement(&mut self) -> ParseResult<()> {
        match self.peek_token() {
            Token::Newline => {
                self.advance();
                Ok(())
            }
            Token::Eof | Token::Dedent => Ok(()),
            _ => Err(self.unexpected("end of line")),
        }
    }

    /// Parse a complete module (sequence of statements until EOF).
    pub fn parse_module(&mut self) -> ParseResult<Module> {
        let mut body = Vec::new();
        self.skip_newlines();
        while self.peek_token() != Token::Eof {
            body.push(self.parse_stmt()?);
            self.skip_newlines();
        }
        Ok(Module { body })
    }

    /// Parse a suite: `NEWLINE INDENT stmt+ DEDENT`, or a single simple
    /// statement on the same line as the colon.
    fn parse_block(&mut self) -> ParseResult<Vec<Spanned<Stmt>>> {
        if self.peek_token() != Token::Newline {
            return Ok(vec![self.parse_stmt()?]);
        }
        self.advance();
        if self.peek_token() != Token::Indent {
            return Err(self.unexpected("an indented block"));
        }
        self.advance();

        let mut stmts = Vec::new();
        self.skip_newlines();
        while !matches!(self.peek_token(), Token::Dedent | Token::Eof) {
            stmts.push(self.parse_stmt()?);
            self.skip_newlines();
        }
        self.eat(Token::Dedent);
        Ok(stmts)
    }
}
