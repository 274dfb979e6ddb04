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

//! Compiler from marked, type-annotated Python functions to WebAssembly.
//!
//! The pipeline is a signature pre-pass ([`signature::collect`]), the code
//! generator ([`compiler::Compiler`]) producing an [`ir::Module`], and the
//! encoder ([`encoder::encode`]) whose output is always validated before it
//! is returned.

pub mod compiler;
pub mod encoder;
pub mod error;
pub mod functions;
pub mod ir;
pub mod options;
pub mod signature;
pub mod types;

#[cfg(test)]
mod tests;

pub use error::{CompileError, CompileResult};
pub use options::{CompileOptions, FloorDivision};
pub use types::{NumKind, WasmType};

/// Run the pre-pass and the code generator over a parsed module.
pub fn lower(module: &ast::Module, options: &CompileOptions) -> CompileResult<ir::Module> {
    let signatures = signature::collect(module)?;
    let mut compiler = compiler::Compiler::new(options, &signatures);
    compiler.compile_module(module)?;
    Ok(compiler.finish())
}

/// Encode a lowered module and validate the bytes.
pub fn assemble(module: &ir::Module) -> CompileResult<Vec<u8>> {
    let bytes = encoder::encode(module)?;
    encoder::validate(&bytes)?;
    Ok(bytes)
}

/// Compile a parsed module to a validated WebAssembly binary.
pub fn compile(module: &ast::Module, options: &CompileOptions) -> CompileResult<Vec<u8>> {
    assemble(&lower(module, options)?)
}
