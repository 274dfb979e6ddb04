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
use std::collections::HashMap;

use crate::ir::{self, Expr, Label};
use crate::types::WasmType;

/// A named local slot: `index` is the local's position in the function,
/// parameters first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Local {
    pub index: u32,
    pub ty: WasmType,
}

/// Per-function lowering state.
///
/// Owned by one in-flight function lowering and dropped when it completes,
/// so nothing leaks between functions. Locals are function-scoped: blocks
/// inside the body never open a new scope.
pub struct FunctionContext {
    name: String,
    return_type: WasmType,
    /// Named locals, including parameters
    locals: HashMap<String, Local>,
    /// Types of the non-parameter locals. Index 0 here = `param_count`.
    extra_local_types: Vec<WasmType>,
    param_types: Vec<WasmType>,
    local_names: Vec<(u32, String)>,
    /// Globals made visible by a `global` statement in this function
    scoped_globals: HashMap<String, WasmType>,
    /// Identifiers of the loops enclosing the statement being lowered
    loop_stack: Vec<u32>,
}

impl FunctionContext {
    /// Parameters are registered as locals at indices `0..params.len()`.
    pub fn new(name: &str, params: &[(String, WasmType)], return_type: WasmType) -> Self {
        let mut locals = HashMap::new();
        let mut local_names = Vec::new();
        for (index, (param, ty)) in params.iter().enumerate() {
            let index = index as u32;
            locals.insert(param.clone(), Local { index, ty: *ty });
            local_names.push((index, param.clone()));
        }

        Self {
            name: name.to_string(),
            return_type,
            locals,
            extra_local_types: Vec::new(),
            param_types: params.iter().map(|(_, ty)| *ty).collect(),
            local_names,
            scoped_globals: HashMap::new(),
            loop_stack: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn return_type(&self) -> WasmType {
        self.return_type
    }

    fn next_index(&self) -> u32 {
        (self.param_types.len() + self.extra_local_types.len()) as u32
    }

    /// Declare a new named local and return its slot. Callers check for an
    /// existing slot first; redeclaring replaces the name binding.
    pub fn declare_local(&mut self, name: &str, ty: WasmType) -> Local {
        let local = Local {
            index: self.next_index(),
            ty,
        };
        self.extra_local_types.push(ty);
        self.locals.insert(name.to_string(), local);
        self.local_names.push((local.index, name.to_string()));
        local
    }

    /// Anonymous scratch local for values the generator needs to reuse.
    pub fn temp_local(&mut self, ty: WasmType) -> Local {
        let local = Local {
            index: self.next_index(),
            ty,
        };
        self.extra_local_types.push(ty);
        local
    }

    pub fn local(&self, name: &str) -> Option<Local> {
        self.locals.get(name).copied()
    }

    pub fn scope_global(&mut self, name: &str, ty: WasmType) {
        self.scoped_globals.insert(name.to_string(), ty);
    }

    pub fn scoped_global(&self, name: &str) -> Option<WasmType> {
        self.scoped_globals.get(name).copied()
    }

    pub fn push_loop(&mut self, id: u32) {
        self.loop_stack.push(id);
    }

    pub fn pop_loop(&mut self) {
        self.loop_stack.pop();
    }

    pub fn current_loop(&self) -> Option<u32> {
        self.loop_stack.last().copied()
    }

    /// Consume the context and produce the finished function.
    pub fn finish(self, body: Vec<Expr>) -> ir::Function {
        ir::Function {
            name: self.name,
            params: self.param_types,
            result: self.return_type,
            locals: self.extra_local_types,
            local_names: self.local_names,
            body,
        }
    }
}

/// Branch targets of the loop with identifier `id`.
pub fn loop_label(id: u32) -> Label {
    format!("loop_{id}")
}

pub fn loop_body_label(id: u32) -> Label {
    format!("loop_body_{id}")
}

pub fn loop_else_label(id: u32) -> Label {
    format!("loop_else_{id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_come_first() {
        let params = vec![("a".to_string(), WasmType::I32), ("b".to_string(), WasmType::F64)];
        let mut ctx = FunctionContext::new("f", &params, WasmType::Void);
        assert_eq!(ctx.local("b"), Some(Local { index: 1, ty: WasmType::F64 }));

        let x = ctx.declare_local("x", WasmType::I64);
        let tmp = ctx.temp_local(WasmType::I32);
        let y = ctx.declare_local("y", WasmType::F32);
        assert_eq!((x.index, tmp.index, y.index), (2, 3, 4));

        let function = ctx.finish(Vec::new());
        assert_eq!(function.params, vec![WasmType::I32, WasmType::F64]);
        assert_eq!(function.locals, vec![WasmType::I64, WasmType::I32, WasmType::F32]);
        let names: Vec<u32> = function.local_names.iter().map(|(i, _)| *i).collect();
        assert_eq!(names, vec![0, 1, 2, 4]);
    }

    #[test]
    fn test_loop_stack() {
        let mut ctx = FunctionContext::new("f", &[], WasmType::Void);
        assert_eq!(ctx.current_loop(), None);
        ctx.push_loop(3);
        ctx.push_loop(7);
        assert_eq!(ctx.current_loop(), Some(7));
        ctx.pop_loop();
        assert_eq!(ctx.current_loop(), Some(3));
        assert_eq!(loop_body_label(3), "loop_body_3");
    }
}
