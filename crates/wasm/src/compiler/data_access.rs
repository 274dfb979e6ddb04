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
use super::*;

impl Compiler<'_> {
    /// Lower an array operand and its index, returning the element kind.
    fn array_operands(
        &mut self,
        ctx: &mut FunctionContext,
        array: &Spanned<Expr>,
        index: &Spanned<Expr>,
        span: &Span,
    ) -> CompileResult<(ir::Expr, ir::Expr, NumKind)> {
        if !self.options.enable_gc {
            return Err(CompileError::scope("array support is disabled (enable gc)", span.clone()));
        }
        let array = self.compile_expr(ctx, array)?;
        let WasmType::Array(element) = array.ty else {
            return Err(CompileError::type_error(
                format!("cannot index a value of type {}", array.ty),
                span.clone(),
            ));
        };
        let index_value = self.compile_expr(ctx, index)?;
        let index_value = self.cast_to_type(index_value, WasmType::I32, &index.span)?;
        Ok((array, index_value, element))
    }

    /// `arr[i]`
    pub(super) fn compile_subscript(
        &mut self,
        ctx: &mut FunctionContext,
        array: &Spanned<Expr>,
        index: &Spanned<Expr>,
        span: &Span,
    ) -> CompileResult<ir::Expr> {
        let (array, index, element) = self.array_operands(ctx, array, index, span)?;
        Ok(ir::Expr::array_get(element, array, index))
    }

    /// `arr[i] = value`, with `value` converted to the element kind.
    pub(super) fn compile_array_store(
        &mut self,
        ctx: &mut FunctionContext,
        array: &Spanned<Expr>,
        index: &Spanned<Expr>,
        value: ir::Expr,
        span: &Span,
    ) -> CompileResult<ir::Expr> {
        let (array, index, element) = self.array_operands(ctx, array, index, span)?;
        let value = self.cast_to_type(value, element.into(), span)?;
        Ok(ir::Expr::array_set(element, array, index, value))
    }
}
