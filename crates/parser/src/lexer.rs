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

use std::collections::VecDeque;

use logos::{Logos, Span};

#[derive(Logos, Debug, PartialEq, Eq, Clone, Copy)]
#[logos(skip r"[ \t\f]+")] // skip spaces/tabs/form feed but not newlines
#[logos(skip r"\\\r?\n")] // explicit line continuation
pub enum Token {
    #[regex(r"\r?\n")]
    Newline,

    Indent,
    Dedent,

    // Keywords
    #[token("def")] Def,
    #[token("class")] Class,
    #[token("if")] If,
    #[token("else")] Else,
    #[token("elif")] Elif,
    #[token("for")] For,
    #[token("while")] While,
    #[token("break")] Break,
    #[token("continue")] Continue,
    #[token("return")] Return,
    #[token("import")] Import,
    #[token("from")] From,
    #[token("as")] As,
    #[token("pass")] Pass,
    #[token("raise")] Raise,
    #[token("try")] Try,
    #[token("except")] Except,
    #[token("finally")] Finally,
    #[token("with")] With,
    #[token("lambda")] Lambda,
    #[token("yield")] Yield,
    #[token("global")] Global,
    #[token("nonlocal")] Nonlocal,
    #[token("assert")] Assert,
    #[token("del")] Del,
    #[token("async")] Async,
    #[token("await")] Await,
    #[token("True")] True,
    #[token("False")] False,
    #[token("None")] None_,

    // Augmented assignment
    #[token("+=")] PlusAssign,
    #[token("-=")] MinusAssign,
    #[token("*=")] StarAssign,
    #[token("/=")] SlashAssign,
    #[token("//=")] FloorDivAssign,
    #[token("%=")] PercentAssign,
    #[token("**=")] PowAssign,
    #[token("@=")] AtAssign,
    #[token("&=")] AmpAssign,
    #[token("|=")] PipeAssign,
    #[token("^=")] CaretAssign,
    #[token("<<=")] ShiftLeftAssign,
    #[token(">>=")] ShiftRightAssign,

    // Multi-char operators
    #[token("**")] Pow,
    #[token("//")] FloorDiv,
    #[token("<<")] ShiftLeft,
    #[token(">>")] ShiftRight,
    #[token("==")] Eq,
    #[token("!=")] NotEq,
    #[token("<=")] Le,
    #[token(">=")] Ge,
    #[token(":=")] Walrus,
    #[token("->")] Arrow,

    // Single-char operators
    #[token("+")] Plus,
    #[token("-")] Minus,
    #[token("*")] Star,
    #[token("/")] Slash,
    #[token("%")] Percent,
    #[token("@")] At,
    #[token("&")] Amp,
    #[token("|")] Pipe,
    #[token("^")] Caret,
    #[token("~")] Tilde,
    #[token("<")] Lt,
    #[token(">")] Gt,
    #[token("=")] Assign,
    #[token(":")] Colon,
    #[token(".")] Dot,
    #[token(",")] Comma,
    #[token(";")] Semicolon,
    #[token("(")] LParen,
    #[token(")")] RParen,
    #[token("[")] LBracket,
    #[token("]")] RBracket,
    #[token("{")] LBrace,
    #[token("}")] RBrace,

    // Literals and identifiers
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Name,

    #[regex(r"[0-9][0-9_]*(\.[0-9_]*)?([eE][+-]?[0-9]+)?")]
    #[regex(r"\.[0-9][0-9_]*([eE][+-]?[0-9]+)?")]
    #[regex(r"0[xX][0-9a-fA-F_]+|0[oO][0-7_]+|0[bB][01_]+")]
    Number,

    // Single-line strings plus triple-quoted docstrings
    #[regex(r#"'([^'\\\n]|\\.)*'|"([^"\\\n]|\\.)*""#)]
    #[regex(r#""""([^"]|"[^"]|""[^"])*""""#)]
    #[regex(r"'''([^']|'[^']|''[^'])*'''")]
    String,

    #[regex(r"#[^\n]*")]
    Comment,

    Eof,

    // Logos error fallback
    Error,
}

impl Token {
    /// Binary operator carried by an augmented-assignment token.
    pub fn aug_op(self) -> Option<ast::BinOp> {
        use ast::BinOp;
        let op = match self {
            Token::PlusAssign => BinOp::Add,
            Token::MinusAssign => BinOp::Sub,
            Token::StarAssign => BinOp::Mul,
            Token::SlashAssign => BinOp::Div,
            Token::FloorDivAssign => BinOp::FloorDiv,
            Token::PercentAssign => BinOp::Mod,
            Token::PowAssign => BinOp::Pow,
            Token::AtAssign => BinOp::MatMul,
            Token::AmpAssign => BinOp::BitAnd,
            Token::PipeAssign => BinOp::BitOr,
            Token::CaretAssign => BinOp::BitXor,
            Token::ShiftLeftAssign => BinOp::LShift,
            Token::ShiftRightAssign => BinOp::RShift,
            _ => return None,
        };
        Some(op)
    }
}

pub type SpannedToken = (Token, Span);

/// Wraps the Logos lexer and emits `Indent` / `Dedent` tokens based on
/// leading whitespace after each newline, following Python's indentation rules.
pub struct IndentLexer<'src> {
    source: &'src str,
    /// Pre-collected raw tokens from Logos (with spans)
    raw: Vec<SpannedToken>,
    pos: usize,
    /// Stack of indentation column widths; always starts with `[0]`
    indent_stack: Vec<usize>,
    /// Synthetic tokens to emit before continuing with `raw`
    pending: VecDeque<SpannedToken>,
    finished: bool,
    /// Indentation is ignored inside `()`, `[]`, `{}` (implicit line continuation)
    bracket_depth: usize,
}

impl<'src> IndentLexer<'src> {
    pub fn new(source: &'src str) -> Self {
        let raw = Token::lexer(source)
            .spanned()
            .map(|(token, span)| (token.unwrap_or(Token::Error), span))
            .collect();

        Self {
            source,
            raw,
            pos: 0,
            indent_stack: vec![0],
            pending: VecDeque::new(),
            finished: false,
            bracket_depth: 0,
        }
    }

    /// Leading whitespace columns starting at byte offset `start`.
    /// Tabs advance to the next multiple of 8.
    fn measure_indent(&self, start: usize) -> usize {
        let mut col = 0;
        for ch in self.source[start..].chars() {
            match ch {
                ' ' => col += 1,
                '\t' => col = (col / 8 + 1) * 8,
                _ => break,
            }
        }
        col
    }

    fn current_indent(&self) -> usize {
        self.indent_stack.last().copied().unwrap_or(0)
    }

    /// Queue Indent/Dedent tokens for the line starting with `new_indent` columns.
    fn handle_indent_change(&mut self, new_indent: usize, span: Span) {
        let current = self.current_indent();

        if new_indent > current {
            self.indent_stack.push(new_indent);
            self.pending.push_back((Token::Indent, span));
        } else if new_indent < current {
            while self.current_indent() > new_indent {
                self.indent_stack.pop();
                self.pending.push_back((Token::Dedent, span.clone()));
            }
            // unindent does not match any outer indentation level
            if self.current_indent() != new_indent {
                self.pending.push_back((Token::Error, span));
            }
        }
    }

    /// Byte offset of the start of the line holding raw token `pos`.
    fn line_start_of(&self, pos: usize) -> usize {
        let token_start = self.raw[pos].1.start;
        self.source[..token_start]
            .rfind('\n')
            .map(|idx| idx + 1)
            .unwrap_or(0)
    }

    fn finish(&mut self) -> Option<SpannedToken> {
        self.finished = true;
        let eof_span = self.source.len()..self.source.len();
        while self.indent_stack.len() > 1 {
            self.indent_stack.pop();
            self.pending.push_back((Token::Dedent, eof_span.clone()));
        }
        self.pending.push_back((Token::Eof, eof_span));
        self.pending.pop_front()
    }
}

impl Iterator for IndentLexer<'_> {
    type Item = SpannedToken;

    fn next(&mut self) -> Option<SpannedToken> {
        loop {
            if let Some(token) = self.pending.pop_front() {
                return Some(token);
            }
            if self.finished {
                return None;
            }
            if self.pos >= self.raw.len() {
                return self.finish();
            }

            let (token, span) = self.raw[self.pos].clone();
            self.pos += 1;

            match token {
                Token::LParen | Token::LBracket | Token::LBrace => {
                    self.bracket_depth += 1;
                    return Some((token, span));
                }
                Token::RParen | Token::RBracket | Token::RBrace => {
                    self.bracket_depth = self.bracket_depth.saturating_sub(1);
                    return Some((token, span));
                }
                Token::Comment => continue,
                Token::Newline if self.bracket_depth > 0 => continue,
                Token::Newline => {
                    // blank and comment-only lines never change indentation
                    while self
                        .raw
                        .get(self.pos)
                        .is_some_and(|(t, _)| matches!(t, Token::Newline | Token::Comment))
                    {
                        self.pos += 1;
                    }

                    let new_indent = if self.pos < self.raw.len() {
                        self.measure_indent(self.line_start_of(self.pos))
                    } else {
                        0
                    };
                    self.handle_indent_change(new_indent, span.clone());
                    return Some((Token::Newline, span));
                }
                _ => return Some((token, span)),
            }
        }
    }
}
