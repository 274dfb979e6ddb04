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

use ast::Span;
use thiserror::Error;

/// Every way lowering a module can fail. Spans are byte ranges into the
/// source; the driver turns them into line numbers.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompileError {
    #[error("{construct} is not supported")]
    Unsupported { construct: String, span: Span },

    #[error("{message}")]
    Type { message: String, span: Span },

    #[error("{message}")]
    Scope { message: String, span: Span },

    #[error("{message}")]
    Signature { message: String, span: Span },

    #[error("failed to encode module: {0}")]
    Encoding(String),

    #[error("generated module failed validation: {0}")]
    Validation(String),
}

impl CompileError {
    pub fn unsupported(construct: impl Into<String>, span: Span) -> Self {
        CompileError::Unsupported {
            construct: construct.into(),
            span,
        }
    }

    pub fn type_error(message: impl Into<String>, span: Span) -> Self {
        CompileError::Type {
            message: message.into(),
            span,
        }
    }

    pub fn scope(message: impl Into<String>, span: Span) -> Self {
        CompileError::Scope {
            message: message.into(),
            span,
        }
    }

    pub fn signature(message: impl Into<String>, span: Span) -> Self {
        CompileError::Signature {
            message: message.into(),
            span,
        }
    }

    /// Source location of the error, if it came from a syntax node.
    pub fn span(&self) -> Option<&Span> {
        match self {
            CompileError::Unsupported { span, .. }
            | CompileError::Type { span, .. }
            | CompileError::Scope { span, .. }
            | CompileError::Signature { span, .. } => Some(span),
            CompileError::Encoding(_) | CompileError::Validation(_) => None,
        }
    }
}

pub type CompileResult<T> = Result<T, CompileError>;
