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

mod driver;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, ValueEnum};
use tracing::Level;
use wasm::{CompileOptions, FloorDivision};

use crate::driver::OutputConfig;

#[derive(ValueEnum, Debug, Clone, Copy)]
enum FloorDivisionMode {
    /// Round toward zero, like the native wasm instruction
    Truncate,
    /// Round toward negative infinity, like Python
    Floor,
}

impl From<FloorDivisionMode> for FloorDivision {
    fn from(mode: FloorDivisionMode) -> Self {
        match mode {
            FloorDivisionMode::Truncate => FloorDivision::Truncate,
            FloorDivisionMode::Floor => FloorDivision::Floor,
        }
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Python source files containing functions marked with `@wasmfunc`
    #[arg(required = true)]
    files: Vec<PathBuf>,
    /// Enable GC arrays: `array[T]` annotations, list literals, `list(range(...))` and `len`
    #[arg(short = 'g', long)]
    enable_gc: bool,
    /// Enable string constants and the `string` type. Implies --enable-gc.
    #[arg(short = 's', long)]
    enable_strings: bool,
    /// Rounding of integer `//`
    #[arg(long, value_enum, default_value_t = FloorDivisionMode::Truncate)]
    floor_division: FloorDivisionMode,
    /// Directory for generated files. Defaults to the directory of each input.
    #[arg(short, long)]
    out_dir: Option<PathBuf>,
    /// Also write the IR listing as `<stem>.ir`
    #[arg(long)]
    emit_ir: bool,
    /// More logging: -v for debug, -vv for trace
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn compile_options(&self) -> CompileOptions {
        let mut options = CompileOptions::default().with_floor_division(self.floor_division.into());
        if self.enable_gc || self.enable_strings {
            options = options.with_gc();
        }
        if self.enable_strings {
            options = options.with_strings();
        }
        options
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    let level = match args.verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let options = args.compile_options();
    let output = OutputConfig {
        out_dir: args.out_dir.clone(),
        emit_ir: args.emit_ir,
    };

    let mut failed = 0;
    for path in &args.files {
        if let Err(err) = driver::compile_file(path, &options, &output) {
            eprintln!("{err}");
            failed += 1;
        }
    }

    if failed > 0 {
        eprintln!("{failed} of {} files failed to compile", args.files.len());
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strings_imply_gc() {
        let args = Args::parse_from(["wasmfunc", "-s", "--floor-division", "floor", "a.py"]);
        let options = args.compile_options();
        assert!(options.enable_gc && options.enable_strings);
        assert_eq!(options.floor_division, FloorDivision::Floor);
    }

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["wasmfunc", "a.py", "b.py", "-vv"]);
        assert_eq!(args.files.len(), 2);
        assert_eq!(args.verbose, 2);
        assert_eq!(args.compile_options(), CompileOptions::default());
    }
}
