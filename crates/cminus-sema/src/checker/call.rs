//! Call checking: plain calls, method calls, and constructor calls.
//!
//! The callee is never visited as an expression of its own; a call reads
//! the candidate set straight out of the scopes so overloaded names stay
//! legal in call position. Method and constructor calls prepend the
//! receiver pointer to the argument list before overload resolution, so
//! a method's implicit `this` parameter takes part in matching like any
//! other parameter.

use cminus_ast::{Expr, ExprKind};
use cminus_core::{DeclId, SemaError, Span, TypeId};

use crate::expr_info::ExprInfo;
use crate::overload::{self, OverloadFailure};
use crate::scope::{Binding, ScopeId};

use super::Checker;

/// How the callee shaped the candidate set.
struct CallPlan {
    name: String,
    candidates: Vec<Binding>,
    /// Class scope the candidates came from, for access checking.
    class_scope: Option<ScopeId>,
    /// Receiver pointer type prepended to the arguments.
    this_ty: Option<TypeId>,
    /// For constructor calls, the type the call produces.
    ctor_result: Option<TypeId>,
}

impl Checker {
    pub(crate) fn check_call(
        &mut self,
        callee: &mut Expr,
        args: &mut Vec<Expr>,
        ctor_call: &mut bool,
        resolved: &mut Option<DeclId>,
        span: Span,
    ) -> Result<ExprInfo, SemaError> {
        let plan = self.plan_call(callee, span)?;
        if plan
            .candidates
            .iter()
            .all(|b| self.types.as_function(b.ty).is_none())
        {
            return Err(SemaError::NotCallable { span });
        }

        let mut arg_types = Vec::with_capacity(args.len() + 1);
        let offset = match plan.this_ty {
            Some(ty) => {
                arg_types.push(ty);
                1
            }
            None => 0,
        };
        let mut arg_infos = Vec::with_capacity(args.len());
        for arg in args.iter_mut() {
            let info = self.check_expr(arg, true)?;
            arg_types.push(info.ty);
            arg_infos.push(info);
        }

        let chosen = overload::resolve(
            &self.types,
            &plan.candidates,
            &self.funcs_def_args,
            &arg_types,
        )
        .map_err(|failure| match failure {
            OverloadFailure::NoViable => SemaError::NoMatchingOverload {
                name: plan.name.clone(),
                span,
            },
            OverloadFailure::Ambiguous(tied) => SemaError::AmbiguousCall {
                name: plan.name.clone(),
                candidates: tied
                    .iter()
                    .map(|b| self.types.display(b.ty))
                    .collect::<Vec<_>>()
                    .join(", "),
                span,
            },
        })?;

        if let Some(scope) = plan.class_scope {
            if self.scopes.is_private(scope, chosen.decl) && !self.inside_scope(scope) {
                return Err(SemaError::PrivateAccess {
                    name: plan.name,
                    span,
                });
            }
        }

        match &mut callee.kind {
            ExprKind::Ident { decl, .. } | ExprKind::Member { decl, .. } => {
                *decl = Some(chosen.decl);
            }
            _ => {}
        }
        *resolved = Some(chosen.decl);
        *ctor_call = plan.ctor_result.is_some();

        // convert the explicit arguments
        let Some((ret, params, _)) = self.types.as_function(chosen.ty) else {
            return Err(SemaError::Internal {
                message: "chosen overload is not a function".into(),
                span,
            });
        };
        let params = params.to_vec();
        for (i, arg) in args.iter_mut().enumerate() {
            let info = arg_infos[i];
            if i + offset < params.len() {
                let dest = self.types.const_unqualified(params[i + offset]);
                self.convert_to_rvalue(arg, info, dest, span)?;
            } else {
                // variadic arguments are loaded as they are
                self.to_rvalue(arg, info, span)?;
            }
        }

        // materialize defaults for the parameters left unfilled
        let first_missing = args.len() + offset;
        if first_missing < params.len() {
            let slots = match self.funcs_def_args.get(&chosen.decl) {
                Some(slots) => slots.clone(),
                None => Vec::new(),
            };
            for slot in slots.iter().skip(first_missing) {
                let Some(id) = slot else {
                    return Err(SemaError::Internal {
                        message: "viable overload is missing a default argument".into(),
                        span,
                    });
                };
                args.push(Expr::new(span, ExprKind::DefaultArg(*id)));
            }
        }

        let result = match plan.ctor_result {
            Some(class_ty) => class_ty,
            None => ret,
        };
        Ok(ExprInfo::rvalue(result))
    }

    fn plan_call(&mut self, callee: &mut Expr, span: Span) -> Result<CallPlan, SemaError> {
        match &mut callee.kind {
            ExprKind::Ident { name, .. } => {
                if let Some(&class_scope) = self.classes.get(name.as_str()) {
                    // 'C(...)' builds a C by constructor
                    let class_ty = self.types.simple(name, false);
                    let this_ty = self.types.pointer(class_ty, true);
                    let candidates = self.scopes.values(class_scope, name, false);
                    if candidates.is_empty() {
                        return Err(SemaError::NoMatchingOverload {
                            name: name.clone(),
                            span,
                        });
                    }
                    return Ok(CallPlan {
                        name: name.clone(),
                        candidates,
                        class_scope: Some(class_scope),
                        this_ty: Some(this_ty),
                        ctor_result: Some(class_ty),
                    });
                }
                let candidates = self.scopes.values(self.current_scope, name, true);
                if candidates.is_empty() {
                    return Err(SemaError::UnknownIdentifier {
                        name: name.clone(),
                        span,
                    });
                }
                Ok(CallPlan {
                    name: name.clone(),
                    candidates,
                    class_scope: None,
                    this_ty: None,
                    ctor_result: None,
                })
            }
            ExprKind::Member {
                object,
                arrow,
                name,
                ..
            } => {
                let arrow = *arrow;
                let name = name.clone();
                let (underlying, class_scope) =
                    self.resolve_member_object(object, arrow, span)?;
                if self
                    .types
                    .as_simple(underlying)
                    .is_some_and(|(class, _)| class == name)
                {
                    return Err(SemaError::InvalidOperation {
                        message: format!(
                            "cannot call constructor '{}' on an existing object",
                            name
                        ),
                        span,
                    });
                }
                // the receiver keeps the object's constness, so methods
                // cannot be called on const objects
                let this_ty = self.types.pointer(underlying, true);
                let candidates = self.scopes.values(class_scope, &name, false);
                if candidates.is_empty() {
                    return Err(SemaError::UnknownMember { name, span });
                }
                Ok(CallPlan {
                    name,
                    candidates,
                    class_scope: Some(class_scope),
                    this_ty: Some(this_ty),
                    ctor_result: None,
                })
            }
            _ => Err(SemaError::NotCallable { span }),
        }
    }
}
