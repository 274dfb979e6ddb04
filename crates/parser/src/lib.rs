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

pub mod lexer;
pub mod parser;

#[cfg(test)]
mod tests;

pub use lexer::{IndentLexer, Token};
pub use parser::{ParseError, Parser};

/// Lexes and parses a whole source file.
pub fn parse_source(source: &str) -> Result<ast::Module, ParseError> {
    let lexer = IndentLexer::new(source);
    Parser::new(source, lexer).parse_module()
}
