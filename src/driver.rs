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

//! Reads source files, runs the compiler and writes the artifacts.

use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use ast::LineIndex;
use parser::ParseError;
use thiserror::Error;
use tracing::{debug, info, warn};
use wasm::{ir, CompileError, CompileOptions};

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("cannot read \"{}\": {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("cannot write \"{}\": {source}", .path.display())]
    Write { path: PathBuf, source: io::Error },

    #[error("\"{file}\", line {line}: {source}")]
    Parse {
        file: String,
        line: usize,
        source: ParseError,
    },

    #[error("\"{file}\": cannot print text format: {reason}")]
    Print { file: String, reason: String },

    #[error("{}: {source}", location(.file, .line))]
    Compile {
        file: String,
        line: Option<usize>,
        source: CompileError,
    },
}

fn location(file: &str, line: &Option<usize>) -> String {
    match line {
        Some(line) => format!("\"{file}\", line {line}"),
        None => format!("\"{file}\""),
    }
}

/// Where and what to write for each input file.
#[derive(Debug, Clone, Default)]
pub struct OutputConfig {
    /// Defaults to the directory of the input file
    pub out_dir: Option<PathBuf>,
    pub emit_ir: bool,
}

/// A compiled source file.
#[derive(Debug)]
pub struct Artifact {
    pub module: ir::Module,
    pub bytes: Vec<u8>,
}

/// Compile one source text. `file` is only used in diagnostics. Returns
/// `None` when the source has no marked functions.
pub fn compile_source(source: &str, file: &str, options: &CompileOptions) -> Result<Option<Artifact>, DriverError> {
    let lines = LineIndex::new(source);
    let module = parser::parse_source(source).map_err(|err| DriverError::Parse {
        file: file.to_string(),
        line: lines.line_of(&err.span),
        source: err,
    })?;

    let compile_error = |err: CompileError| DriverError::Compile {
        file: file.to_string(),
        line: err.span().map(|span| lines.line_of(span)),
        source: err,
    };
    let lowered = wasm::lower(&module, options).map_err(compile_error)?;
    if lowered.functions.is_empty() {
        return Ok(None);
    }
    let bytes = wasm::assemble(&lowered).map_err(compile_error)?;
    debug!(file, functions = lowered.functions.len(), bytes = bytes.len(), "compiled");
    Ok(Some(Artifact { module: lowered, bytes }))
}

/// Compile `path` and write `<stem>.wasm` and its text format `<stem>.wat`,
/// plus `<stem>.ir` when asked. Returns the paths written.
pub fn compile_file(path: &Path, options: &CompileOptions, output: &OutputConfig) -> Result<Vec<PathBuf>, DriverError> {
    let source = fs::read_to_string(path).map_err(|source| DriverError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let file = path.display().to_string();
    let Some(artifact) = compile_source(&source, &file, options)? else {
        warn!(file = %file, "no compilable functions found");
        return Ok(Vec::new());
    };

    let dir = match &output.out_dir {
        Some(dir) => dir.clone(),
        None => path.parent().map(Path::to_path_buf).unwrap_or_default(),
    };
    if !dir.as_os_str().is_empty() {
        fs::create_dir_all(&dir).map_err(|source| DriverError::Write {
            path: dir.clone(),
            source,
        })?;
    }
    let stem = path.file_stem().unwrap_or(OsStr::new("module"));

    let mut written = Vec::new();
    let wasm_path = dir.join(stem).with_extension("wasm");
    write_artifact(&wasm_path, &artifact.bytes)?;
    info!(path = %wasm_path.display(), bytes = artifact.bytes.len(), "wrote module");
    written.push(wasm_path);

    let text = wasmprinter::print_bytes(&artifact.bytes).map_err(|err| DriverError::Print {
        file: file.clone(),
        reason: err.to_string(),
    })?;
    let wat_path = dir.join(stem).with_extension("wat");
    write_artifact(&wat_path, text.as_bytes())?;
    info!(path = %wat_path.display(), "wrote text format");
    written.push(wat_path);

    if output.emit_ir {
        let ir_path = dir.join(stem).with_extension("ir");
        write_artifact(&ir_path, artifact.module.to_string().as_bytes())?;
        info!(path = %ir_path.display(), "wrote IR listing");
        written.push(ir_path);
    }
    Ok(written)
}

fn write_artifact(path: &Path, contents: &[u8]) -> Result<(), DriverError> {
    fs::write(path, contents).map_err(|source| DriverError::Write {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEMOS: [(&str, &str); 4] = [
        ("fib.py", include_str!("../demos/fib.py")),
        ("control_flow.py", include_str!("../demos/control_flow.py")),
        ("globals.py", include_str!("../demos/globals.py")),
        ("gc_lists.py", include_str!("../demos/gc_lists.py")),
    ];

    fn all_features() -> CompileOptions {
        CompileOptions::default().with_gc().with_strings()
    }

    #[test]
    fn test_demos_compile() {
        for (name, source) in DEMOS {
            let artifact = match compile_source(source, name, &all_features()) {
                Ok(Some(artifact)) => artifact,
                Ok(None) => panic!("{name}: no functions"),
                Err(err) => panic!("{err}"),
            };
            assert!(artifact.bytes.starts_with(b"\0asm"), "{name}");
        }
    }

    #[test]
    fn test_demo_without_gc_reports_line() {
        let (name, source) = DEMOS[3];
        let err = compile_source(source, name, &CompileOptions::default()).unwrap_err();
        assert!(matches!(err, DriverError::Compile { line: Some(4), .. }), "{err}");
        assert!(err.to_string().starts_with("\"gc_lists.py\", line 4: "));
    }

    #[test]
    fn test_parse_error_location() {
        let err = compile_source("x = 1\ndef f(:\n", "bad.py", &CompileOptions::default()).unwrap_err();
        assert!(matches!(err, DriverError::Parse { line: 2, .. }), "{err}");
        assert!(err.to_string().starts_with("\"bad.py\", line 2: "));
    }

    #[test]
    fn test_compile_error_location() {
        let source = "from wasmfunc import wasmfunc, i32\n\n@wasmfunc()\ndef f() -> i32:\n    x = 1\n    return y\n";
        let err = compile_source(source, "scope.py", &CompileOptions::default()).unwrap_err();
        assert_eq!(err.to_string(), "\"scope.py\", line 6: undeclared variable 'y'");
    }

    #[test]
    fn test_no_marked_functions() {
        let source = "def plain(a, b):\n    return a + b\n";
        assert!(compile_source(source, "plain.py", &CompileOptions::default()).unwrap().is_none());
    }

    #[test]
    fn test_compile_file_writes_artifacts() {
        let dir = std::env::temp_dir().join(format!("wasmfunc-driver-{}", std::process::id()));
        let input = dir.join("fib.py");
        fs::create_dir_all(&dir).unwrap();
        fs::write(&input, DEMOS[0].1).unwrap();

        let output = OutputConfig {
            out_dir: Some(dir.join("out")),
            emit_ir: true,
        };
        let written = compile_file(&input, &CompileOptions::default(), &output).unwrap();
        assert_eq!(
            written,
            vec![dir.join("out/fib.wasm"), dir.join("out/fib.wat"), dir.join("out/fib.ir")]
        );
        let listing = fs::read_to_string(&written[2]).unwrap();
        assert!(listing.contains("(func $fib"));

        let text = fs::read_to_string(&written[1]).unwrap();
        assert!(text.contains("(func $fib"), "{text}");
        let reassembled = wat::parse_str(&text).unwrap();
        wasm::encoder::validate(&reassembled).unwrap();

        let missing = compile_file(&dir.join("missing.py"), &CompileOptions::default(), &output);
        assert!(matches!(missing, Err(DriverError::Read { .. })));
        fs::remove_dir_all(&dir).unwrap();
    }
}
