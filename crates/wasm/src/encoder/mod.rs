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
//! Binary encoding of an [`ir::Module`] with `wasm-encoder`, and validation
//! of the result with `wasmparser`.
//!
//! Section order: type, function, global, export, data count, code, data,
//! then the `name` custom section.

mod emit;

use std::collections::HashMap;

use tracing::debug;
use wasm_encoder::{
    CodeSection, ConstExpr, DataCountSection, DataSection, ExportKind, ExportSection, FunctionSection,
    GlobalSection, GlobalType, HeapType, IndirectNameMap, Module as WasmModule, NameMap, NameSection, RefType,
    StorageType, TypeSection, ValType,
};

use crate::error::{CompileError, CompileResult};
use crate::ir::{self, Literal};
use crate::types::{NumKind, WasmType};

/// Storage of a GC array type. Strings are byte arrays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum ArrayStorage {
    Num(NumKind),
    Byte,
}

/// Type section under construction. Every type is added on first use.
#[derive(Default)]
struct TypeInterner {
    section: TypeSection,
    arrays: HashMap<ArrayStorage, u32>,
    functions: HashMap<(Vec<ValType>, Vec<ValType>), u32>,
    count: u32,
}

impl TypeInterner {
    fn next_index(&mut self) -> u32 {
        let index = self.count;
        self.count += 1;
        index
    }

    fn array(&mut self, storage: ArrayStorage) -> u32 {
        if let Some(index) = self.arrays.get(&storage) {
            return *index;
        }
        let element = match storage {
            ArrayStorage::Num(kind) => StorageType::Val(num_val_type(kind)),
            ArrayStorage::Byte => StorageType::I8,
        };
        self.section.ty().array(&element, true);
        let index = self.next_index();
        self.arrays.insert(storage, index);
        index
    }

    /// `None` for [`WasmType::Void`].
    fn val_type(&mut self, ty: WasmType) -> Option<ValType> {
        let storage = match ty {
            WasmType::Num(kind) => return Some(num_val_type(kind)),
            WasmType::Void => return None,
            WasmType::Array(kind) => ArrayStorage::Num(kind),
            WasmType::Str => ArrayStorage::Byte,
        };
        let index = self.array(storage);
        Some(ValType::Ref(RefType {
            nullable: true,
            heap_type: HeapType::Concrete(index),
        }))
    }

    /// Array types a signature mentions are interned before the signature
    /// itself, so the function type only refers backwards.
    fn function(&mut self, params: &[WasmType], result: WasmType) -> u32 {
        let params: Vec<ValType> = params.iter().filter_map(|ty| self.val_type(*ty)).collect();
        let results: Vec<ValType> = self.val_type(result).into_iter().collect();
        let key = (params, results);
        if let Some(index) = self.functions.get(&key) {
            return *index;
        }
        self.section.ty().function(key.0.iter().copied(), key.1.iter().copied());
        let index = self.next_index();
        self.functions.insert(key, index);
        index
    }
}

fn num_val_type(kind: NumKind) -> ValType {
    match kind {
        NumKind::I32 => ValType::I32,
        NumKind::I64 => ValType::I64,
        NumKind::F32 => ValType::F32,
        NumKind::F64 => ValType::F64,
    }
}

fn const_expr(literal: Literal) -> ConstExpr {
    match literal {
        Literal::I32(v) => ConstExpr::i32_const(v),
        Literal::I64(v) => ConstExpr::i64_const(v),
        Literal::F32(v) => ConstExpr::f32_const(v.into()),
        Literal::F64(v) => ConstExpr::f64_const(v.into()),
    }
}

/// Function and global indices by source name.
struct Symbols {
    functions: HashMap<String, u32>,
    globals: HashMap<String, u32>,
}

impl Symbols {
    fn new(module: &ir::Module) -> Self {
        Self {
            functions: index_by_name(module.functions.iter().map(|f| f.name.as_str())),
            globals: index_by_name(module.globals.iter().map(|g| g.name.as_str())),
        }
    }

    fn function(&self, name: &str) -> CompileResult<u32> {
        self.functions
            .get(name)
            .copied()
            .ok_or_else(|| CompileError::Encoding(format!("call to unknown function '{name}'")))
    }

    fn global(&self, name: &str) -> CompileResult<u32> {
        self.globals
            .get(name)
            .copied()
            .ok_or_else(|| CompileError::Encoding(format!("reference to unknown global '{name}'")))
    }
}

fn index_by_name<'a>(names: impl Iterator<Item = &'a str>) -> HashMap<String, u32> {
    names.enumerate().map(|(i, name)| (name.to_string(), i as u32)).collect()
}

/// Encode `module` into a binary module. Does not validate; see [`validate`].
pub fn encode(module: &ir::Module) -> CompileResult<Vec<u8>> {
    let symbols = Symbols::new(module);
    let mut types = TypeInterner::default();
    let mut functions = FunctionSection::new();
    let mut globals = GlobalSection::new();
    let mut exports = ExportSection::new();
    let mut code = CodeSection::new();
    let mut strings: Vec<Vec<u8>> = Vec::new();

    for (index, function) in module.functions.iter().enumerate() {
        let type_index = types.function(&function.params, function.result);
        functions.function(type_index);
        exports.export(&function.name, ExportKind::Func, index as u32);
    }

    for (index, global) in module.globals.iter().enumerate() {
        globals.global(
            GlobalType {
                val_type: num_val_type(global.ty),
                mutable: global.mutable,
                shared: false,
            },
            &const_expr(global.init),
        );
        exports.export(&global.name, ExportKind::Global, index as u32);
    }

    for function in &module.functions {
        let body = emit::encode_function(function, &symbols, &mut types, &mut strings)?;
        code.function(&body);
    }

    let mut wasm = WasmModule::new();
    wasm.section(&types.section);
    wasm.section(&functions);
    if !module.globals.is_empty() {
        wasm.section(&globals);
    }
    wasm.section(&exports);
    if !strings.is_empty() {
        wasm.section(&DataCountSection {
            count: strings.len() as u32,
        });
    }
    wasm.section(&code);
    if !strings.is_empty() {
        let mut data = DataSection::new();
        for bytes in &strings {
            data.passive(bytes.iter().copied());
        }
        wasm.section(&data);
    }
    wasm.section(&name_section(module));

    let bytes = wasm.finish();
    debug!(
        functions = module.functions.len(),
        globals = module.globals.len(),
        types = types.count,
        bytes = bytes.len(),
        "encoded module"
    );
    Ok(bytes)
}

fn name_section(module: &ir::Module) -> NameSection {
    let mut function_names = NameMap::new();
    let mut local_names = IndirectNameMap::new();
    for (index, function) in module.functions.iter().enumerate() {
        function_names.append(index as u32, &function.name);
        let mut locals = NameMap::new();
        for (local, name) in &function.local_names {
            locals.append(*local, name);
        }
        local_names.append(index as u32, &locals);
    }
    let mut global_names = NameMap::new();
    for (index, global) in module.globals.iter().enumerate() {
        global_names.append(index as u32, &global.name);
    }

    let mut names = NameSection::new();
    names.functions(&function_names);
    names.locals(&local_names);
    names.globals(&global_names);
    names
}

/// Run the full validator over `bytes` with every proposal enabled.
pub fn validate(bytes: &[u8]) -> CompileResult<()> {
    let mut validator = wasmparser::Validator::new_with_features(wasmparser::WasmFeatures::all());
    validator
        .validate_all(bytes)
        .map(|_| ())
        .map_err(|err| CompileError::Validation(err.to_string()))
}
