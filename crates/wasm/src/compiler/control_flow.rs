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
use crate::functions::{loop_body_label, loop_else_label, loop_label};

impl Compiler<'_> {
    /// `elif` clauses nest as further if/else nodes in the else arm. A
    /// missing `else` still produces an empty block.
    pub(super) fn compile_if(
        &mut self,
        ctx: &mut FunctionContext,
        test: &Spanned<Expr>,
        body: &[Spanned<Stmt>],
        elif_clauses: &[(Spanned<Expr>, Vec<Spanned<Stmt>>)],
        else_body: Option<&[Spanned<Stmt>]>,
    ) -> CompileResult<ir::Expr> {
        let condition = self.compile_condition(ctx, test)?;
        let then_branch = self.compile_block(ctx, body)?;

        let else_branch = match elif_clauses.split_first() {
            Some(((elif_test, elif_body), rest)) => {
                let nested = self.compile_if(ctx, elif_test, elif_body, rest, else_body)?;
                ir::Expr::block(None, vec![nested], WasmType::Void)
            }
            None => self.compile_block(ctx, else_body.unwrap_or_default())?,
        };

        Ok(ir::Expr::if_else(condition, then_branch, Some(else_branch)))
    }

    /// ```text
    /// loop $loop_N
    ///   if <test>
    ///     block $loop_body_N  <body>  br $loop_N  end
    ///   else
    ///     block $loop_else_N  <else body>  end
    ///   end
    /// end
    /// ```
    /// `break` leaves `$loop_body_N`, which also skips the else arm;
    /// `continue` re-enters `$loop_N` and tests again.
    pub(super) fn compile_while(
        &mut self,
        ctx: &mut FunctionContext,
        test: &Spanned<Expr>,
        body: &[Spanned<Stmt>],
        else_body: Option<&[Spanned<Stmt>]>,
    ) -> CompileResult<ir::Expr> {
        let id = self.fresh_label_id();
        let condition = self.compile_condition(ctx, test)?;

        ctx.push_loop(id);
        let lowered = body
            .iter()
            .map(|stmt| self.compile_stmt(ctx, stmt))
            .collect::<CompileResult<Vec<_>>>();
        ctx.pop_loop();
        let mut lowered = lowered?;
        lowered.push(ir::Expr::br(loop_label(id)));
        let body_block = ir::Expr::block(Some(loop_body_label(id)), lowered, WasmType::Void);

        // `break` in the else arm belongs to an enclosing loop
        let else_block = match else_body {
            Some(stmts) if !stmts.is_empty() => {
                let mut lowered = Vec::with_capacity(stmts.len());
                for stmt in stmts {
                    lowered.push(self.compile_stmt(ctx, stmt)?);
                }
                Some(ir::Expr::block(Some(loop_else_label(id)), lowered, WasmType::Void))
            }
            _ => None,
        };

        Ok(ir::Expr::loop_(
            loop_label(id),
            ir::Expr::if_else(condition, body_block, else_block),
        ))
    }

    pub(super) fn compile_break(&self, ctx: &FunctionContext, span: &Span) -> CompileResult<ir::Expr> {
        match ctx.current_loop() {
            Some(id) => Ok(ir::Expr::br(loop_body_label(id))),
            None => Err(CompileError::scope("'break' outside of a loop", span.clone())),
        }
    }

    pub(super) fn compile_continue(&self, ctx: &FunctionContext, span: &Span) -> CompileResult<ir::Expr> {
        match ctx.current_loop() {
            Some(id) => Ok(ir::Expr::br(loop_label(id))),
            None => Err(CompileError::scope("'continue' outside of a loop", span.clone())),
        }
    }

    pub(super) fn compile_assert(
        &mut self,
        ctx: &mut FunctionContext,
        test: &Spanned<Expr>,
        msg: Option<&Spanned<Expr>>,
    ) -> CompileResult<ir::Expr> {
        if let Some(msg) = msg {
            return Err(CompileError::unsupported("assertion message", msg.span.clone()));
        }
        let condition = self.compile_condition(ctx, test)?;
        Ok(ir::Expr::if_else(
            condition,
            ir::Expr::nop(),
            Some(ir::Expr::unreachable()),
        ))
    }

    pub(super) fn compile_return(
        &mut self,
        ctx: &mut FunctionContext,
        value: Option<&Spanned<Expr>>,
        span: &Span,
    ) -> CompileResult<ir::Expr> {
        let expected = ctx.return_type();
        match value {
            None if expected.is_void() => Ok(ir::Expr::ret(None)),
            Some(Spanned {
                node: Expr::NoneLit,
                ..
            }) if expected.is_void() => Ok(ir::Expr::ret(None)),
            None => Err(CompileError::type_error(
                format!("function '{}' must return a value of type {expected}", ctx.name()),
                span.clone(),
            )),
            Some(value) if expected.is_void() => Err(CompileError::type_error(
                format!("function '{}' has no return annotation but returns a value", ctx.name()),
                value.span.clone(),
            )),
            Some(value) => {
                let lowered = self.compile_expr_with_hint(ctx, value, Some(expected))?;
                let lowered = self.cast_to_type(lowered, expected, &value.span)?;
                Ok(ir::Expr::ret(Some(lowered)))
            }
        }
    }
}
