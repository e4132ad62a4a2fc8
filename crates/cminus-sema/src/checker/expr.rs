//! Expression checking.
//!
//! Every expression is visited exactly once. The visit resolves names,
//! computes the [`ExprInfo`] of the node, and rewrites the tree in place
//! so that implicit operations become explicit nodes: loads, casts,
//! array decay, `this->` in front of bare member names, and default
//! arguments at call sites.
//!
//! `decay` controls whether an array-typed lvalue result is collapsed to
//! a pointer to its first element after the visit. Address-of and
//! `sizeof` keep the array; so does initializing a char array from a
//! string literal.

use cminus_ast::{Expr, ExprKind, UnaryOp};
use cminus_core::{SemaError, Span, TypeId};

use crate::conversion::{TypeMatch, explicit_convertible, implicit_match};
use crate::expr_info::ExprInfo;
use crate::scope::ScopeId;

use super::Checker;

impl Checker {
    /// Check one expression, rewriting it in place.
    pub(crate) fn check_expr(
        &mut self,
        expr: &mut Expr,
        decay: bool,
    ) -> Result<ExprInfo, SemaError> {
        self.rewrite_implicit_member_access(expr)?;
        if let ExprKind::Unary {
            op: UnaryOp::Sizeof,
            ..
        } = expr.kind
        {
            return self.check_sizeof_expr(expr);
        }

        let info = self.check_expr_kind(expr)?;

        if decay && info.is_lvalue() {
            if let Some((elem, _)) = self.types.as_array(info.ty) {
                expr.wrap(ExprKind::ArrayToPointer);
                let ptr = self.types.pointer(elem, false);
                return Ok(ExprInfo::rvalue(ptr));
            }
        }
        Ok(info)
    }

    // ==========================================================================
    // Pre-visit rewrites
    // ==========================================================================

    /// Turn a bare identifier naming a member of the class being defined
    /// into `this->name`. Call callees get the same treatment so that
    /// `foo(1)` inside a method finds the method `foo`.
    fn rewrite_implicit_member_access(&mut self, expr: &mut Expr) -> Result<(), SemaError> {
        if let ExprKind::Call { callee, .. } = &mut expr.kind {
            let callee = &mut **callee;
            return self.rewrite_implicit_ident(callee);
        }
        self.rewrite_implicit_ident(expr)
    }

    fn rewrite_implicit_ident(&mut self, expr: &mut Expr) -> Result<(), SemaError> {
        let ExprKind::Ident { name, .. } = &expr.kind else {
            return Ok(());
        };
        if !self.refers_to_class_member(name) {
            return Ok(());
        }
        // in a default argument the class scope itself is current and
        // there is no object to bind the member to
        if let Some(class) = self.defined_class.as_deref() {
            if self.classes.get(class) == Some(&self.current_scope) {
                return Err(SemaError::InvalidOperation {
                    message: format!("cannot use non-static member '{}' here", name),
                    span: expr.span,
                });
            }
        }
        let name = name.clone();
        expr.kind = ExprKind::Member {
            object: Box::new(Expr::new(expr.span, ExprKind::ImplicitThis)),
            arrow: true,
            name,
            decl: None,
        };
        Ok(())
    }

    /// `sizeof e` only needs the type of `e`; the operand is checked and
    /// then dropped in favor of a [`ExprKind::SizeofType`] node.
    fn check_sizeof_expr(&mut self, expr: &mut Expr) -> Result<ExprInfo, SemaError> {
        let span = expr.span;
        let kind = std::mem::replace(&mut expr.kind, ExprKind::NullptrLit);
        let ExprKind::Unary { operand, .. } = kind else {
            return Err(SemaError::Internal {
                message: "sizeof rewrite on a non-unary node".into(),
                span,
            });
        };
        let mut operand = operand;
        let info = self.check_expr(&mut operand, false)?;
        if self.incomplete_type(info.ty) {
            return Err(SemaError::InvalidOperands {
                message: format!(
                    "sizeof applied to incomplete type {}",
                    self.types.display(info.ty)
                ),
                span,
            });
        }
        expr.kind = ExprKind::SizeofType(info.ty);
        Ok(ExprInfo::rvalue(self.sizeof_result_ty()))
    }

    // ==========================================================================
    // Dispatch
    // ==========================================================================

    fn check_expr_kind(&mut self, expr: &mut Expr) -> Result<ExprInfo, SemaError> {
        let span = expr.span;
        match &mut expr.kind {
            ExprKind::IntLit(_) => {
                let ty = self.types.int_ty(false);
                Ok(ExprInfo::rvalue(ty))
            }
            ExprKind::CharLit(_) => {
                let ty = self.types.char_ty(false);
                Ok(ExprInfo::rvalue(ty))
            }
            ExprKind::BoolLit(_) => {
                let ty = self.types.bool_ty(false);
                Ok(ExprInfo::rvalue(ty))
            }
            ExprKind::FloatLit(_) => {
                let ty = self.types.double_ty(false);
                Ok(ExprInfo::rvalue(ty))
            }
            ExprKind::NullptrLit => {
                let ty = self.types.nullptr_ty();
                Ok(ExprInfo::rvalue(ty))
            }
            ExprKind::StringLit(s) => {
                // "hi" is an lvalue of type 'const char[3]'
                let size = s.len() as u64 + 1;
                let elem = self.types.char_ty(true);
                let ty = self.types.array(elem, Some(size));
                Ok(ExprInfo::lvalue(ty))
            }

            ExprKind::Ident { name, decl } => {
                let bindings = self.scopes.values(self.current_scope, name, true);
                match bindings.len() {
                    0 => Err(SemaError::UnknownIdentifier {
                        name: name.clone(),
                        span,
                    }),
                    1 => {
                        let binding = bindings[0];
                        if self.types.as_function(binding.ty).is_some() {
                            return Err(SemaError::InvalidOperation {
                                message: format!("function '{}' used outside of a call", name),
                                span,
                            });
                        }
                        *decl = Some(binding.decl);
                        Ok(ExprInfo::lvalue(binding.ty))
                    }
                    _ => Err(SemaError::InvalidOperation {
                        message: format!("'{}' does not name a single value", name),
                        span,
                    }),
                }
            }

            ExprKind::This | ExprKind::ImplicitThis => {
                let class = match (&self.defined_class, self.curr_ret_type) {
                    (Some(class), Some(_)) => class.clone(),
                    _ => return Err(SemaError::ThisOutsideMethod { span }),
                };
                let class_ty = self.types.simple(&class, false);
                let ty = self.types.pointer(class_ty, true);
                Ok(ExprInfo::rvalue(ty))
            }

            ExprKind::SizeofType(ty) => {
                let ty = *ty;
                self.validate_type(ty, span)?;
                if self.types.as_function(ty).is_some() {
                    return Err(SemaError::InvalidOperands {
                        message: "sizeof applied to a function type".into(),
                        span,
                    });
                }
                if self.incomplete_type(ty) {
                    return Err(SemaError::InvalidOperands {
                        message: format!(
                            "sizeof applied to incomplete type {}",
                            self.types.display(ty)
                        ),
                        span,
                    });
                }
                Ok(ExprInfo::rvalue(self.sizeof_result_ty()))
            }

            ExprKind::Binary { op, lhs, rhs } => {
                let op = *op;
                let lhs_info = self.check_expr(lhs, true)?;
                let rhs_info = self.check_expr(rhs, true)?;
                let lt = self.types.const_unqualified(lhs_info.ty);
                let rt = self.types.const_unqualified(rhs_info.ty);
                let Some((left_dest, right_dest, result)) =
                    self.conversions_for_bin_op(lt, rt, op)
                else {
                    return Err(SemaError::InvalidOperands {
                        message: format!(
                            "invalid operands to binary '{}' ({} and {})",
                            op,
                            self.types.display(lhs_info.ty),
                            self.types.display(rhs_info.ty)
                        ),
                        span,
                    });
                };
                self.convert_to_rvalue(lhs, lhs_info, left_dest, span)?;
                self.convert_to_rvalue(rhs, rhs_info, right_dest, span)?;
                Ok(ExprInfo::rvalue(result))
            }

            ExprKind::Assign {
                op,
                lhs,
                rhs,
                operand_ty,
            } => {
                let op = *op;
                let lhs_info = self.check_expr(lhs, true)?;
                if !lhs_info.is_lvalue() {
                    return Err(SemaError::InvalidOperands {
                        message: "cannot assign to an rvalue".into(),
                        span,
                    });
                }
                if self.types.is_const(lhs_info.ty) {
                    return Err(SemaError::InvalidOperands {
                        message: format!(
                            "cannot assign to a value of type {}",
                            self.types.display(lhs_info.ty)
                        ),
                        span,
                    });
                }
                match op.compute_op() {
                    None => {
                        self.check_and_convert(rhs, lhs_info.ty, span)?;
                    }
                    Some(compute) => {
                        let rhs_info = self.check_expr(rhs, true)?;
                        let rt = self.types.const_unqualified(rhs_info.ty);
                        let Some((left_dest, right_dest, result)) =
                            self.conversions_for_bin_op(lhs_info.ty, rt, compute)
                        else {
                            return Err(SemaError::InvalidOperands {
                                message: format!(
                                    "invalid operands to '{}' ({} and {})",
                                    op,
                                    self.types.display(lhs_info.ty),
                                    self.types.display(rhs_info.ty)
                                ),
                                span,
                            });
                        };
                        self.convert_to_rvalue(rhs, rhs_info, right_dest, span)?;
                        *operand_ty = Some(left_dest);
                        // the computed value must fit back into the target
                        if implicit_match(&self.types, result, lhs_info.ty) == TypeMatch::None {
                            return Err(SemaError::TypeMismatch {
                                message: format!(
                                    "rvalue of type {} is not convertible to type {}",
                                    self.types.display(result),
                                    self.types.display(lhs_info.ty)
                                ),
                                span,
                            });
                        }
                    }
                }
                Ok(ExprInfo::lvalue(lhs_info.ty))
            }

            ExprKind::Comma { lhs, rhs } => {
                self.check_expr(lhs, true)?;
                self.check_expr(rhs, true)
            }

            ExprKind::Call {
                callee,
                args,
                ctor_call,
                resolved,
            } => self.check_call(callee, args, ctor_call, resolved, span),

            ExprKind::Index { object, index } => {
                let object_info = self.check_expr(object, true)?;
                let object_ty = self.to_rvalue(object, object_info, span)?;
                let Some(pointee) = self.pointer_to_complete_type(object_ty) else {
                    return Err(SemaError::InvalidOperands {
                        message: format!(
                            "subscripted value of type {} is not a pointer to a complete type",
                            self.types.display(object_ty)
                        ),
                        span,
                    });
                };
                let index_info = self.check_expr(index, true)?;
                let index_ty = self.types.const_unqualified(index_info.ty);
                if !self.types.is_integral(index_ty) {
                    return Err(SemaError::InvalidOperands {
                        message: format!(
                            "array subscript is not an integer ({})",
                            self.types.display(index_info.ty)
                        ),
                        span,
                    });
                }
                let int = self.types.int_ty(false);
                self.convert_to_rvalue(index, index_info, int, span)?;
                Ok(ExprInfo::lvalue(pointee))
            }

            ExprKind::Ternary {
                cond,
                then_val,
                else_val,
            } => {
                let bool_ty = self.types.bool_ty(false);
                self.check_and_convert(cond, bool_ty, span)?;
                let then_info = self.check_expr(then_val, true)?;
                let else_info = self.check_expr(else_val, true)?;
                // two lvalues of the one type stay an lvalue
                if then_info.is_lvalue() && else_info.is_lvalue() && then_info.ty == else_info.ty {
                    return Ok(ExprInfo::lvalue(then_info.ty));
                }
                let tt = self.types.const_unqualified(then_info.ty);
                let et = self.types.const_unqualified(else_info.ty);
                let Some(common) = self.determine_common_type(tt, et) else {
                    return Err(SemaError::InvalidOperands {
                        message: format!(
                            "incompatible operand types in conditional expression ({} and {})",
                            self.types.display(then_info.ty),
                            self.types.display(else_info.ty)
                        ),
                        span,
                    });
                };
                self.convert_to_rvalue(then_val, then_info, common, span)?;
                self.convert_to_rvalue(else_val, else_info, common, span)?;
                Ok(ExprInfo::rvalue(common))
            }

            ExprKind::PostIncr { operand, incr } => {
                let op_name = if *incr { "++" } else { "--" };
                let info = self.check_expr(operand, true)?;
                self.check_incr_operand(info, op_name, span)?;
                let ty = self.types.const_unqualified(info.ty);
                Ok(ExprInfo::rvalue(ty))
            }

            ExprKind::Unary { op, operand } => {
                let op = *op;
                self.check_unary(op, operand, span)
            }

            ExprKind::Cast { to, operand } => {
                let to = *to;
                self.validate_type(to, span)?;
                let info = self.check_expr(operand, true)?;
                let from = self.to_rvalue(operand, info, span)?;
                if !explicit_convertible(&self.types, from, to) {
                    return Err(SemaError::TypeMismatch {
                        message: format!(
                            "cannot cast {} to {}",
                            self.types.display(from),
                            self.types.display(to)
                        ),
                        span,
                    });
                }
                let ty = self.types.const_unqualified(to);
                Ok(ExprInfo::rvalue(ty))
            }

            ExprKind::Member {
                object,
                arrow,
                name,
                decl,
            } => {
                let (underlying, class_scope) =
                    self.resolve_member_object(object, *arrow, span)?;
                let bindings = self.scopes.values(class_scope, name, false);
                if bindings.is_empty() {
                    return Err(SemaError::UnknownMember {
                        name: name.clone(),
                        span,
                    });
                }
                if bindings.len() > 1 || self.types.as_function(bindings[0].ty).is_some() {
                    return Err(SemaError::InvalidOperation {
                        message: format!("method '{}' used outside of a call", name),
                        span,
                    });
                }
                let binding = bindings[0];
                if self.scopes.is_private(class_scope, binding.decl)
                    && !self.inside_scope(class_scope)
                {
                    return Err(SemaError::PrivateAccess {
                        name: name.clone(),
                        span,
                    });
                }
                *decl = Some(binding.decl);
                // a const object makes its members const
                let ty = if self.types.is_const(underlying) {
                    self.types.const_qualified(binding.ty)
                } else {
                    binding.ty
                };
                Ok(ExprInfo::lvalue(ty))
            }

            ExprKind::DefaultArg(id) => match self.def_arg_vals.get(id) {
                Some(info) => Ok(*info),
                None => Err(SemaError::Internal {
                    message: "default argument without a cached result".into(),
                    span,
                }),
            },

            // subtrees rewritten by an earlier visit re-derive their
            // result without inserting further conversions
            ExprKind::LValueToRValue(inner) => {
                let info = self.check_expr(inner, false)?;
                let ty = self.types.const_unqualified(info.ty);
                Ok(ExprInfo::rvalue(ty))
            }
            ExprKind::ImplicitCast { to, operand } => {
                let to = *to;
                self.check_expr(operand, false)?;
                let ty = self.types.const_unqualified(to);
                Ok(ExprInfo::rvalue(ty))
            }
            ExprKind::ArrayToPointer(inner) => {
                let info = self.check_expr(inner, false)?;
                let Some((elem, _)) = self.types.as_array(info.ty) else {
                    return Err(SemaError::Internal {
                        message: "decayed operand is not an array".into(),
                        span,
                    });
                };
                let ptr = self.types.pointer(elem, false);
                Ok(ExprInfo::rvalue(ptr))
            }
        }
    }

    // ==========================================================================
    // Unary operators
    // ==========================================================================

    fn check_unary(
        &mut self,
        op: UnaryOp,
        operand: &mut Expr,
        span: Span,
    ) -> Result<ExprInfo, SemaError> {
        match op {
            UnaryOp::Deref => {
                let info = self.check_expr(operand, true)?;
                let ty = self.to_rvalue(operand, info, span)?;
                match self.pointer_to_complete_type(ty) {
                    Some(pointee) => Ok(ExprInfo::lvalue(pointee)),
                    None => Err(SemaError::InvalidOperands {
                        message: format!(
                            "cannot dereference a value of type {}",
                            self.types.display(ty)
                        ),
                        span,
                    }),
                }
            }
            UnaryOp::AddrOf => {
                // the operand keeps its array type under '&'
                let info = self.check_expr(operand, false)?;
                if !info.is_lvalue() {
                    return Err(SemaError::InvalidOperands {
                        message: "cannot take the address of an rvalue".into(),
                        span,
                    });
                }
                let ty = self.types.pointer(info.ty, false);
                Ok(ExprInfo::rvalue(ty))
            }
            UnaryOp::Plus | UnaryOp::Minus => {
                let info = self.check_expr(operand, true)?;
                let ty = self.to_rvalue(operand, info, span)?;
                // unary plus passes pointers through unchanged
                if op == UnaryOp::Plus && self.types.as_pointer(ty).is_some() {
                    return Ok(ExprInfo::rvalue(ty));
                }
                if !self.types.is_numerical(ty) {
                    return Err(self.invalid_unary_operand(op, info, span));
                }
                let ty = self.promote_to_int(operand, ty);
                Ok(ExprInfo::rvalue(ty))
            }
            UnaryOp::BitNot => {
                let info = self.check_expr(operand, true)?;
                let ty = self.to_rvalue(operand, info, span)?;
                if !self.types.is_integral(ty) {
                    return Err(self.invalid_unary_operand(op, info, span));
                }
                let ty = self.promote_to_int(operand, ty);
                Ok(ExprInfo::rvalue(ty))
            }
            UnaryOp::Not => {
                let bool_ty = self.types.bool_ty(false);
                self.check_and_convert(operand, bool_ty, span)?;
                Ok(ExprInfo::rvalue(bool_ty))
            }
            UnaryOp::PreIncr | UnaryOp::PreDecr => {
                let op_name = if op == UnaryOp::PreIncr { "++" } else { "--" };
                let info = self.check_expr(operand, true)?;
                self.check_incr_operand(info, op_name, span)?;
                Ok(ExprInfo::lvalue(info.ty))
            }
            UnaryOp::Sizeof => Err(SemaError::Internal {
                message: "sizeof reached the unary dispatcher".into(),
                span,
            }),
        }
    }

    fn check_incr_operand(
        &mut self,
        info: ExprInfo,
        op_name: &str,
        span: Span,
    ) -> Result<(), SemaError> {
        if !info.is_lvalue() {
            return Err(SemaError::InvalidOperands {
                message: format!("operand of '{}' must be an lvalue", op_name),
                span,
            });
        }
        if self.types.is_const(info.ty) {
            return Err(SemaError::InvalidOperands {
                message: format!(
                    "operand of '{}' cannot be of type {}",
                    op_name,
                    self.types.display(info.ty)
                ),
                span,
            });
        }
        if !self.viable_incr_type(info.ty) {
            return Err(SemaError::InvalidOperands {
                message: format!(
                    "operand of '{}' cannot be of type {}",
                    op_name,
                    self.types.display(info.ty)
                ),
                span,
            });
        }
        Ok(())
    }

    /// Narrow integral rvalues take part in arithmetic as `int`.
    fn promote_to_int(&mut self, operand: &mut Expr, ty: TypeId) -> TypeId {
        if self.types.is_integral(ty) && !self.types.is_int(ty) {
            let int = self.types.int_ty(false);
            operand.wrap(|inner| ExprKind::ImplicitCast {
                to: int,
                operand: inner,
            });
            return int;
        }
        ty
    }

    fn invalid_unary_operand(&self, op: UnaryOp, info: ExprInfo, span: Span) -> SemaError {
        SemaError::InvalidOperands {
            message: format!(
                "invalid operand to unary '{}' ({})",
                op,
                self.types.display(info.ty)
            ),
            span,
        }
    }

    // ==========================================================================
    // Shared pieces
    // ==========================================================================

    /// Load `expr` as an rvalue of its own const-unqualified type.
    pub(crate) fn to_rvalue(
        &mut self,
        expr: &mut Expr,
        info: ExprInfo,
        span: Span,
    ) -> Result<TypeId, SemaError> {
        let dest = self.types.const_unqualified(info.ty);
        self.convert_to_rvalue(expr, info, dest, span)?;
        Ok(dest)
    }

    /// Check a member access object and find the class scope behind it.
    /// `->` loads the object and looks through the pointer; `.` requires
    /// an lvalue of class type.
    pub(crate) fn resolve_member_object(
        &mut self,
        object: &mut Expr,
        arrow: bool,
        span: Span,
    ) -> Result<(TypeId, ScopeId), SemaError> {
        let info = self.check_expr(object, true)?;
        let underlying = if arrow {
            let ty = self.to_rvalue(object, info, span)?;
            match self.types.as_pointer(ty) {
                Some((pointee, _)) => pointee,
                None => {
                    return Err(SemaError::InvalidOperands {
                        message: format!(
                            "'->' applied to a value of non-pointer type {}",
                            self.types.display(ty)
                        ),
                        span,
                    });
                }
            }
        } else {
            if !info.is_lvalue() {
                return Err(SemaError::InvalidOperands {
                    message: "'.' requires an lvalue object".into(),
                    span,
                });
            }
            info.ty
        };
        let class_scope = self
            .types
            .as_simple(underlying)
            .and_then(|(name, _)| self.classes.get(name).copied());
        match class_scope {
            Some(scope) => Ok((underlying, scope)),
            None => Err(SemaError::InvalidOperands {
                message: format!(
                    "member access on a value of non-class type {}",
                    self.types.display(underlying)
                ),
                span,
            }),
        }
    }
}
