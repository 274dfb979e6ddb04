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

mod compiler_tests;
mod pre_pass_tests;

use crate::{ir, CompileError, CompileOptions};

pub(crate) fn parse(source: &str) -> ast::Module {
    parser::parse_source(source).expect("source should parse")
}

/// Lower with default options, panicking on failure.
pub(crate) fn lower_ok(source: &str) -> ir::Module {
    lower_with(source, &CompileOptions::default())
}

pub(crate) fn lower_with(source: &str, options: &CompileOptions) -> ir::Module {
    match crate::lower(&parse(source), options) {
        Ok(module) => module,
        Err(err) => panic!("lowering failed: {err}"),
    }
}

pub(crate) fn lower_err(source: &str) -> CompileError {
    lower_err_with(source, &CompileOptions::default())
}

pub(crate) fn lower_err_with(source: &str, options: &CompileOptions) -> CompileError {
    match crate::lower(&parse(source), options) {
        Ok(module) => panic!("expected lowering to fail, got:\n{module}"),
        Err(err) => err,
    }
}

/// Compile to bytes; `crate::compile` has already validated them.
pub(crate) fn compile_with(source: &str, options: &CompileOptions) -> Vec<u8> {
    match crate::compile(&parse(source), options) {
        Ok(bytes) => bytes,
        Err(err) => panic!("compilation failed: {err}"),
    }
}

pub(crate) fn gc_options() -> CompileOptions {
    CompileOptions::default().with_gc()
}
