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
use crate::types::WasmType;

/// How integer `//` rounds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FloorDivision {
    /// Native signed division, rounding toward zero: `-10 // 3 == -3`
    #[default]
    Truncate,
    /// Rounds toward negative infinity like the source language: `-10 // 3 == -4`
    Floor,
}

/// Feature switches for one compilation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompileOptions {
    /// Allow GC arrays: annotations, list literals, subscripts, `list(range())` and `len`
    pub enable_gc: bool,
    /// Allow opaque string constants and the `string` type
    pub enable_strings: bool,
    pub floor_division: FloorDivision,
}

impl CompileOptions {
    pub fn with_gc(mut self) -> Self {
        self.enable_gc = true;
        self
    }

    pub fn with_strings(mut self) -> Self {
        self.enable_strings = true;
        self
    }

    pub fn with_floor_division(mut self, floor_division: FloorDivision) -> Self {
        self.floor_division = floor_division;
        self
    }

    /// Name of the switch that must be on for values of type `ty`, if any is off.
    pub fn missing_feature(&self, ty: WasmType) -> Option<&'static str> {
        match ty {
            WasmType::Array(_) if !self.enable_gc => Some("array support is disabled (enable gc)"),
            WasmType::Str if !self.enable_strings => Some("string support is disabled (enable strings)"),
            _ => None,
        }
    }
}
