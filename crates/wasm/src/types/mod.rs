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

use std::fmt;

/// One of the four numeric representations a value can have at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumKind {
    I32,
    I64,
    F32,
    F64,
}

impl NumKind {
    pub const ALL: [NumKind; 4] = [NumKind::I32, NumKind::I64, NumKind::F32, NumKind::F64];

    pub fn is_float(self) -> bool {
        matches!(self, NumKind::F32 | NumKind::F64)
    }

    pub fn is_64_bit(self) -> bool {
        matches!(self, NumKind::I64 | NumKind::F64)
    }

    fn from_parts(float: bool, wide: bool) -> NumKind {
        match (float, wide) {
            (false, false) => NumKind::I32,
            (false, true) => NumKind::I64,
            (true, false) => NumKind::F32,
            (true, true) => NumKind::F64,
        }
    }

    /// Common kind for a binary operation: floats win over integers and
    /// 64-bit wins over 32-bit, so `i64 + f32` resolves to `f64`.
    pub fn unify(self, other: NumKind) -> NumKind {
        NumKind::from_parts(
            self.is_float() || other.is_float(),
            self.is_64_bit() || other.is_64_bit(),
        )
    }

    /// Float kind of the same width, used for true division.
    pub fn to_float(self) -> NumKind {
        NumKind::from_parts(true, self.is_64_bit())
    }

    /// Whether converting from `self` to `target` can lose information.
    pub fn narrows_to(self, target: NumKind) -> bool {
        (self.is_float() && !target.is_float()) || (self.is_64_bit() && !target.is_64_bit())
    }

    pub fn name(self) -> &'static str {
        match self {
            NumKind::I32 => "i32",
            NumKind::I64 => "i64",
            NumKind::F32 => "f32",
            NumKind::F64 => "f64",
        }
    }
}

impl fmt::Display for NumKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The type of a value in the generated module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WasmType {
    Num(NumKind),
    /// Growable GC array holding a single numeric element kind
    Array(NumKind),
    /// Opaque reference to a string constant
    Str,
    /// No value: statements, and functions without a return annotation
    Void,
}

impl WasmType {
    pub const I32: WasmType = WasmType::Num(NumKind::I32);
    pub const I64: WasmType = WasmType::Num(NumKind::I64);
    pub const F32: WasmType = WasmType::Num(NumKind::F32);
    pub const F64: WasmType = WasmType::Num(NumKind::F64);

    pub fn num_kind(self) -> Option<NumKind> {
        match self {
            WasmType::Num(kind) => Some(kind),
            _ => None,
        }
    }

    pub fn is_void(self) -> bool {
        self == WasmType::Void
    }

    /// Arrays and strings are GC references.
    pub fn is_reference(self) -> bool {
        matches!(self, WasmType::Array(_) | WasmType::Str)
    }
}

impl From<NumKind> for WasmType {
    fn from(kind: NumKind) -> Self {
        WasmType::Num(kind)
    }
}

impl fmt::Display for WasmType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WasmType::Num(kind) => write!(f, "{kind}"),
            WasmType::Array(kind) => write!(f, "array[{kind}]"),
            WasmType::Str => f.write_str("string"),
            WasmType::Void => f.write_str("void"),
        }
    }
}
