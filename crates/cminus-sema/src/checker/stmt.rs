//! Statement checking.
//!
//! Statements carry the scope and loop bookkeeping: compound statements
//! open a scope unless a `for` loop already opened one for its own
//! header, and `break n` / `continue n` are validated against the
//! current loop nesting depth.

use cminus_ast::{Condition, ForInit, Stmt, StmtKind};
use cminus_core::SemaError;

use super::Checker;

impl Checker {
    pub(crate) fn check_stmt(&mut self, stmt: &mut Stmt) -> Result<(), SemaError> {
        let span = stmt.span;
        match &mut stmt.kind {
            StmtKind::Declaration(decl) => self.check_simple_declaration(decl),

            StmtKind::Expr(expr) => {
                if let Some(expr) = expr {
                    self.check_expr(expr, true)?;
                }
                Ok(())
            }

            StmtKind::Break { level } => self.check_loop_level("break", *level, span),
            StmtKind::Continue { level } => self.check_loop_level("continue", *level, span),

            StmtKind::Return(expr) => {
                let Some(ret) = self.curr_ret_type else {
                    return Err(SemaError::Internal {
                        message: "return statement outside of a function".into(),
                        span,
                    });
                };
                match expr {
                    Some(expr) => self.check_and_convert(expr, ret, span),
                    None => {
                        if !self.types.is_void(ret) {
                            return Err(SemaError::MissingReturnValue { span });
                        }
                        Ok(())
                    }
                }
            }

            StmtKind::Compound(stmts) => {
                let new_scope = self.compound_opens_scope;
                self.compound_opens_scope = true;
                if new_scope {
                    self.add_scope();
                }
                for stmt in stmts {
                    self.check_stmt(stmt)?;
                }
                if new_scope {
                    self.drop_scope();
                }
                Ok(())
            }

            StmtKind::If {
                cond,
                body,
                else_body,
            } => {
                self.check_condition(cond)?;
                self.check_stmt(body)?;
                if let Some(else_body) = else_body {
                    self.check_stmt(else_body)?;
                }
                Ok(())
            }

            StmtKind::While { cond, body } | StmtKind::DoWhile { cond, body } => {
                self.check_condition(cond)?;
                self.loop_depth += 1;
                self.check_stmt(body)?;
                self.loop_depth -= 1;
                Ok(())
            }

            StmtKind::For {
                init,
                cond,
                post_iter,
                body,
            } => {
                // the header declarations live in a scope of their own,
                // shared with the body
                self.add_scope();
                match init {
                    ForInit::Expr(Some(expr)) => {
                        self.check_expr(expr, true)?;
                    }
                    ForInit::Expr(None) => {}
                    ForInit::Declaration(decl) => self.check_simple_declaration(decl)?,
                }
                if let Some(cond) = cond {
                    self.check_condition(cond)?;
                }
                if let Some(post_iter) = post_iter {
                    self.check_expr(post_iter, true)?;
                }
                self.compound_opens_scope = false;
                self.loop_depth += 1;
                let result = self.check_stmt(body);
                self.loop_depth -= 1;
                self.compound_opens_scope = true;
                self.drop_scope();
                result
            }
        }
    }

    fn check_condition(&mut self, cond: &mut Condition) -> Result<(), SemaError> {
        let bool_ty = self.types.bool_ty(false);
        self.check_and_convert(&mut cond.expr, bool_ty, cond.span)
    }

    fn check_loop_level(
        &mut self,
        keyword: &'static str,
        level: usize,
        span: cminus_core::Span,
    ) -> Result<(), SemaError> {
        if level == 0 || level > self.loop_depth {
            return Err(SemaError::InvalidLoopLevel {
                keyword,
                level: level as u32,
                depth: self.loop_depth as u32,
                span,
            });
        }
        Ok(())
    }
}
