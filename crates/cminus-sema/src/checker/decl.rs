//! Declaration checking: variables, function declarations, and function
//! definitions.
//!
//! Functions may be declared any number of times; the first declaration
//! becomes the canonical one and every redeclaration resolves to its
//! [`DeclId`](cminus_core::DeclId). Default arguments accumulate across
//! redeclarations into the canonical declaration's slot list, and each
//! default expression is checked exactly once.

use cminus_ast::{
    Declaration, Declarator, DefaultValue, FunctionDef, InitDeclarator, SimpleDeclaration,
    TranslationUnit,
};
use cminus_core::{DeclId, SemaError, Span, TypeId};
use rustc_hash::FxHashSet;

use crate::expr_info::ExprInfo;
use crate::scope::Binding;

use super::{Checker, FuncCmp};

impl Checker {
    pub(crate) fn check_translation_unit(
        &mut self,
        unit: &mut TranslationUnit,
    ) -> Result<(), SemaError> {
        if unit.declarations.is_empty() {
            self.diagnostics
                .warning("translation unit contains no declarations", unit.span);
        }
        let mut declarations = self.builtin_declarations();
        declarations.append(&mut unit.declarations);
        unit.declarations = declarations;
        for declaration in &mut unit.declarations {
            self.check_declaration(declaration)?;
        }
        Ok(())
    }

    fn check_declaration(&mut self, declaration: &mut Declaration) -> Result<(), SemaError> {
        match declaration {
            Declaration::Simple(decl) => self.check_simple_declaration(decl),
            Declaration::Function(def) => self.check_function_def(def),
            Declaration::Class(def) => self.check_class_def(def),
            Declaration::Empty(_) => Ok(()),
        }
    }

    pub(crate) fn check_simple_declaration(
        &mut self,
        decl: &mut SimpleDeclaration,
    ) -> Result<(), SemaError> {
        for declarator in &mut decl.declarators {
            self.check_init_declarator(declarator)?;
        }
        Ok(())
    }

    // ==========================================================================
    // Variables
    // ==========================================================================

    fn check_init_declarator(&mut self, decl: &mut InitDeclarator) -> Result<(), SemaError> {
        let span = decl.span;
        let ty = decl.declarator.ty;

        if self.types.as_function(ty).is_some() {
            if self.current_scope != self.global_scope {
                return Err(SemaError::InvalidOperation {
                    message: "function declarations are only allowed at global scope".into(),
                    span,
                });
            }
            if decl.initializer.is_some() {
                return Err(SemaError::InvalidOperation {
                    message: format!("function '{}' cannot be initialized", decl.declarator.name),
                    span,
                });
            }
            self.check_function_declarator(&mut decl.declarator)?;
            self.declare_function(&mut decl.declarator, None)?;
            return Ok(());
        }

        self.validate_type(ty, span)?;
        if self.incomplete_type(ty) {
            return Err(SemaError::InvalidType {
                message: format!(
                    "variable '{}' has incomplete type {}",
                    decl.declarator.name,
                    self.types.display(ty)
                ),
                span,
            });
        }
        if self.scopes.contains(self.current_scope, &decl.declarator.name) {
            return Err(SemaError::Redeclaration {
                name: decl.declarator.name.clone(),
                span,
            });
        }

        if let Some(init) = &mut decl.initializer {
            if self.types.as_array(ty).is_some() && init.is_string_literal() {
                self.check_string_array_init(init, ty, span)?;
            } else {
                let dest = self.types.const_unqualified(ty);
                let info = self.check_expr(init, true)?;
                if self.convert_to_rvalue(init, info, dest, span).is_err() {
                    return Err(SemaError::TypeMismatch {
                        message: format!(
                            "cannot initialize a value of type {} with {}",
                            self.types.display(ty),
                            info.describe(&self.types)
                        ),
                        span,
                    });
                }
            }
        }

        let id = self.decls.alloc(&decl.declarator.name, ty, span);
        decl.declarator.declared = Some(id);
        self.scopes.add_value(
            self.current_scope,
            decl.declarator.name.clone(),
            Binding { decl: id, ty },
        );
        Ok(())
    }

    /// `char s[N] = "..."`: the literal fills the array directly, no
    /// decay, no conversion node. The array must be a char array big
    /// enough for the characters and the terminator.
    fn check_string_array_init(
        &mut self,
        init: &mut cminus_ast::Expr,
        ty: TypeId,
        span: Span,
    ) -> Result<(), SemaError> {
        let info = self.check_expr(init, false)?;
        if let (Some((elem, Some(size))), Some((_, Some(lit_size)))) =
            (self.types.as_array(ty), self.types.as_array(info.ty))
        {
            if self.types.is_char(elem) && size >= lit_size {
                return Ok(());
            }
        }
        Err(SemaError::TypeMismatch {
            message: format!(
                "cannot initialize a value of type {} with {}",
                self.types.display(ty),
                info.describe(&self.types)
            ),
            span,
        })
    }

    // ==========================================================================
    // Function declarations
    // ==========================================================================

    /// Structural checks a function declarator must pass before being
    /// added to the scope.
    pub(crate) fn check_function_declarator(
        &mut self,
        declarator: &mut Declarator,
    ) -> Result<(), SemaError> {
        self.validate_type(declarator.ty, declarator.span)?;
        let mut names: FxHashSet<&str> = FxHashSet::default();
        for param in &declarator.params {
            let name = param.declarator.name.as_str();
            if !name.is_empty() && !names.insert(name) {
                return Err(SemaError::Redeclaration {
                    name: name.to_string(),
                    span: param.span,
                });
            }
        }
        Ok(())
    }

    /// Declare a function in the current scope, resolving to the
    /// canonical declaration on redeclaration and merging default
    /// arguments into it.
    pub(crate) fn declare_function(
        &mut self,
        declarator: &mut Declarator,
        access: Option<cminus_ast::Access>,
    ) -> Result<DeclId, SemaError> {
        let span = declarator.span;
        let ty = declarator.ty;
        let Some((ret, params, _)) = self.types.as_function(ty) else {
            return Err(SemaError::Internal {
                message: "declaring a non-function as a function".into(),
                span,
            });
        };
        let n_params = params.len();
        if declarator.name == "main" && !self.types.is_int(ret) {
            return Err(SemaError::InvalidType {
                message: "'main' must return 'int'".into(),
                span,
            });
        }

        let name = declarator.name.clone();
        let decl = self.add_function_to_scope(&name, ty, span, access)?;
        declarator.declared = Some(decl);

        let mut slots = self
            .funcs_def_args
            .remove(&decl)
            .unwrap_or_else(|| vec![None; n_params]);
        for (i, param) in declarator.params.iter_mut().enumerate() {
            if i >= slots.len() {
                break;
            }
            match param.default.take() {
                None => {}
                Some(DefaultValue::Checked(id)) => {
                    // merged on a previous declaration of this signature
                    param.default = Some(DefaultValue::Checked(id));
                }
                Some(DefaultValue::Raw(expr)) => {
                    if slots[i].is_some() {
                        return Err(SemaError::DefaultArgRedefinition {
                            name: param.declarator.name.clone(),
                            span: param.span,
                        });
                    }
                    let mut expr = *expr;
                    let info = self.check_expr(&mut expr, true)?;
                    let dest = self.types.const_unqualified(param.declarator.ty);
                    self.convert_to_rvalue(&mut expr, info, dest, param.span)?;
                    let id = self.default_exprs.alloc(expr);
                    self.def_arg_vals.insert(id, ExprInfo::rvalue(dest));
                    slots[i] = Some(id);
                    param.default = Some(DefaultValue::Checked(id));
                }
            }
        }
        // once a parameter has a default, all following ones must too
        let mut seen_default = false;
        for slot in &slots {
            if slot.is_some() {
                seen_default = true;
            } else if seen_default {
                return Err(SemaError::DefaultArgGap { name, span });
            }
        }
        self.funcs_def_args.insert(decl, slots);
        Ok(decl)
    }

    fn add_function_to_scope(
        &mut self,
        name: &str,
        ty: TypeId,
        span: Span,
        access: Option<cminus_ast::Access>,
    ) -> Result<DeclId, SemaError> {
        for binding in self.scopes.values(self.current_scope, name, false) {
            if self.types.as_function(binding.ty).is_none() {
                return Err(SemaError::Redeclaration {
                    name: name.to_string(),
                    span,
                });
            }
            match self.cmp_signatures(binding.ty, ty) {
                FuncCmp::Match => return Ok(binding.decl),
                FuncCmp::RetDiff => {
                    return Err(SemaError::TypeMismatch {
                        message: format!("function '{}' differs only in return type", name),
                        span,
                    });
                }
                FuncCmp::NoMatch => {}
            }
        }
        let decl = self.decls.alloc(name, ty, span);
        let binding = Binding { decl, ty };
        match access {
            Some(access) => self
                .scopes
                .add_member(self.current_scope, name, binding, access),
            None => self.scopes.add_value(self.current_scope, name, binding),
        }
        Ok(decl)
    }

    /// Relate two function signatures. Parameters compare without their
    /// outermost const, return types compare exactly.
    pub(crate) fn cmp_signatures(&self, a: TypeId, b: TypeId) -> FuncCmp {
        let (Some((ret_a, params_a, vararg_a)), Some((ret_b, params_b, vararg_b))) =
            (self.types.as_function(a), self.types.as_function(b))
        else {
            return FuncCmp::NoMatch;
        };
        if params_a.len() != params_b.len() || vararg_a != vararg_b {
            return FuncCmp::NoMatch;
        }
        for (pa, pb) in params_a.iter().zip(params_b) {
            if !self.types.unqualified_eq(*pa, *pb) {
                return FuncCmp::NoMatch;
            }
        }
        if ret_a == ret_b {
            FuncCmp::Match
        } else {
            FuncCmp::RetDiff
        }
    }

    // ==========================================================================
    // Function definitions
    // ==========================================================================

    pub(crate) fn check_function_def(&mut self, def: &mut FunctionDef) -> Result<(), SemaError> {
        let span = def.span;
        if def.is_ctor {
            if self.defined_class.as_deref() != Some(def.declarator.name.as_str()) {
                return Err(SemaError::InvalidConstructor {
                    message: format!(
                        "'{}' is not a constructor of the enclosing class",
                        def.declarator.name
                    ),
                    span,
                });
            }
            let returns_void = self
                .types
                .as_function(def.declarator.ty)
                .is_some_and(|(ret, _, _)| self.types.is_void(ret));
            if !returns_void {
                return Err(SemaError::InvalidConstructor {
                    message: "constructor cannot have a return type".into(),
                    span,
                });
            }
        }

        self.check_function_declarator(&mut def.declarator)?;
        let access = if self.scopes.is_class(self.current_scope) {
            Some(self.current_access)
        } else {
            None
        };
        let decl = self.declare_function(&mut def.declarator, access)?;
        if !self.defined_funcs.insert(decl) {
            return Err(SemaError::FunctionRedefinition {
                name: def.declarator.name.clone(),
                span,
            });
        }

        // the parameters live in a scope the body shares
        self.add_scope();
        for param in &mut def.declarator.params {
            if param.declarator.name.is_empty() {
                continue;
            }
            let ty = param.declarator.ty;
            let id = self.decls.alloc(&param.declarator.name, ty, param.span);
            param.declarator.declared = Some(id);
            self.scopes.add_value(
                self.current_scope,
                param.declarator.name.clone(),
                Binding { decl: id, ty },
            );
        }

        let ret = self
            .types
            .as_function(def.declarator.ty)
            .map(|(ret, _, _)| ret);
        let Some(ret) = ret else {
            return Err(SemaError::Internal {
                message: "function definition without a function type".into(),
                span,
            });
        };
        let prev_ret = self.curr_ret_type.replace(ret);
        let mut result = Ok(());
        for stmt in &mut def.body {
            result = self.check_stmt(stmt);
            if result.is_err() {
                break;
            }
        }
        self.curr_ret_type = prev_ret;
        self.drop_scope();
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cminus_ast::{Expr, ExprKind, Param, Stmt, StmtKind};
    use cminus_types::TypeInterner;

    fn checker() -> Checker {
        Checker::new(TypeInterner::new())
    }

    fn sp() -> Span {
        Span::point(1, 1)
    }

    fn var_decl(name: &str, ty: TypeId, init: Option<Expr>) -> InitDeclarator {
        InitDeclarator {
            span: sp(),
            declarator: Declarator::new(sp(), name, ty),
            initializer: init,
        }
    }

    fn fn_declarator(c: &mut Checker, name: &str, ret: TypeId, params: &[(&str, TypeId)]) -> Declarator {
        let param_tys: Vec<TypeId> = params.iter().map(|(_, ty)| *ty).collect();
        let ty = c.types.function(ret, param_tys, false);
        let mut declarator = Declarator::new(sp(), name, ty);
        declarator.params = params
            .iter()
            .map(|(name, ty)| Param {
                span: sp(),
                declarator: Declarator::new(sp(), *name, *ty),
                default: None,
            })
            .collect();
        declarator
    }

    #[test]
    fn an_empty_translation_unit_warns_but_checks() {
        let mut c = checker();
        let mut unit = TranslationUnit {
            span: sp(),
            declarations: Vec::new(),
        };
        c.run(&mut unit).unwrap();
        assert!(c.diagnostics().has_warnings());
    }

    #[test]
    fn void_variables_are_rejected() {
        let mut c = checker();
        let void = c.types.void_ty();
        let mut decl = var_decl("v", void, None);
        let err = c.check_init_declarator(&mut decl).unwrap_err();
        assert!(matches!(err, SemaError::InvalidType { .. }));
    }

    #[test]
    fn redeclaring_a_variable_is_rejected() {
        let mut c = checker();
        let int = c.types.int_ty(false);
        let mut first = var_decl("a", int, None);
        c.check_init_declarator(&mut first).unwrap();
        assert!(first.declarator.declared.is_some());

        let double = c.types.double_ty(false);
        let mut second = var_decl("a", double, None);
        let err = c.check_init_declarator(&mut second).unwrap_err();
        assert!(matches!(err, SemaError::Redeclaration { name, .. } if name == "a"));
    }

    #[test]
    fn char_array_initializes_from_a_string_literal_without_decay() {
        let mut c = checker();
        let ch = c.types.char_ty(false);
        let arr = c.types.array(ch, Some(6));
        let lit = Expr::new(sp(), ExprKind::StringLit("hello".into()));
        let mut decl = var_decl("s", arr, Some(lit));
        c.check_init_declarator(&mut decl).unwrap();
        // the literal is untouched: no conversion or decay node
        assert!(matches!(
            decl.initializer.as_ref().map(|e| &e.kind),
            Some(ExprKind::StringLit(_))
        ));
    }

    #[test]
    fn undersized_char_array_rejects_the_literal() {
        let mut c = checker();
        let ch = c.types.char_ty(false);
        let arr = c.types.array(ch, Some(3));
        let lit = Expr::new(sp(), ExprKind::StringLit("hello".into()));
        let mut decl = var_decl("s", arr, Some(lit));
        let err = c.check_init_declarator(&mut decl).unwrap_err();
        assert!(matches!(err, SemaError::TypeMismatch { .. }));
    }

    #[test]
    fn pointer_initializer_decays_an_array_variable() {
        let mut c = checker();
        let int = c.types.int_ty(false);
        let arr = c.types.array(int, Some(3));
        let mut a = var_decl("a", arr, None);
        c.check_init_declarator(&mut a).unwrap();

        let int_ptr = c.types.pointer(int, false);
        let init = Expr::new(
            sp(),
            ExprKind::Ident {
                name: "a".into(),
                decl: None,
            },
        );
        let mut p = var_decl("p", int_ptr, Some(init));
        c.check_init_declarator(&mut p).unwrap();
        assert!(matches!(
            p.initializer.as_ref().map(|e| &e.kind),
            Some(ExprKind::ArrayToPointer(_))
        ));
    }

    #[test]
    fn functions_cannot_be_initialized() {
        let mut c = checker();
        let int = c.types.int_ty(false);
        let ty = c.types.function(int, vec![], false);
        let init = Expr::new(sp(), ExprKind::IntLit(1));
        let mut decl = var_decl("f", ty, Some(init));
        let err = c.check_init_declarator(&mut decl).unwrap_err();
        assert!(matches!(err, SemaError::InvalidOperation { .. }));
    }

    #[test]
    fn main_must_return_int() {
        let mut c = checker();
        let void = c.types.void_ty();
        let mut declarator = fn_declarator(&mut c, "main", void, &[]);
        let err = c.declare_function(&mut declarator, None).unwrap_err();
        assert!(matches!(err, SemaError::InvalidType { .. }));
    }

    #[test]
    fn redeclaration_differing_only_in_return_type_is_rejected() {
        let mut c = checker();
        let int = c.types.int_ty(false);
        let double = c.types.double_ty(false);
        let mut first = fn_declarator(&mut c, "f", int, &[("a", int)]);
        let canonical = c.declare_function(&mut first, None).unwrap();

        let mut same = fn_declarator(&mut c, "f", int, &[("b", int)]);
        assert_eq!(c.declare_function(&mut same, None).unwrap(), canonical);

        let mut different = fn_declarator(&mut c, "f", double, &[("a", int)]);
        let err = c.declare_function(&mut different, None).unwrap_err();
        assert!(matches!(err, SemaError::TypeMismatch { .. }));
    }

    #[test]
    fn default_argument_gap_is_rejected() {
        let mut c = checker();
        let int = c.types.int_ty(false);
        let mut declarator = fn_declarator(&mut c, "f", int, &[("a", int), ("b", int)]);
        declarator.params[0].default = Some(DefaultValue::Raw(Box::new(Expr::new(
            sp(),
            ExprKind::IntLit(1),
        ))));
        let err = c.declare_function(&mut declarator, None).unwrap_err();
        assert!(matches!(err, SemaError::DefaultArgGap { name, .. } if name == "f"));
    }

    #[test]
    fn redeclaration_fills_missing_defaults_but_cannot_repeat_them() {
        let mut c = checker();
        let int = c.types.int_ty(false);
        let mut first = fn_declarator(&mut c, "f", int, &[("a", int), ("b", int)]);
        first.params[1].default = Some(DefaultValue::Raw(Box::new(Expr::new(
            sp(),
            ExprKind::IntLit(2),
        ))));
        let canonical = c.declare_function(&mut first, None).unwrap();

        // the redeclaration may default the remaining leading parameter
        let mut second = fn_declarator(&mut c, "f", int, &[("a", int), ("b", int)]);
        second.params[0].default = Some(DefaultValue::Raw(Box::new(Expr::new(
            sp(),
            ExprKind::IntLit(1),
        ))));
        assert_eq!(c.declare_function(&mut second, None).unwrap(), canonical);
        let slots = &c.funcs_def_args[&canonical];
        assert!(slots[0].is_some() && slots[1].is_some());

        // but repeating an existing default is an error
        let mut third = fn_declarator(&mut c, "f", int, &[("a", int), ("b", int)]);
        third.params[1].default = Some(DefaultValue::Raw(Box::new(Expr::new(
            sp(),
            ExprKind::IntLit(3),
        ))));
        let err = c.declare_function(&mut third, None).unwrap_err();
        assert!(matches!(err, SemaError::DefaultArgRedefinition { .. }));
    }

    #[test]
    fn defining_a_function_twice_is_rejected() {
        let mut c = checker();
        let int = c.types.int_ty(false);
        let body = vec![Stmt::new(
            sp(),
            StmtKind::Return(Some(Expr::new(sp(), ExprKind::IntLit(0)))),
        )];
        let mut first = FunctionDef {
            span: sp(),
            declarator: fn_declarator(&mut c, "f", int, &[]),
            body: body.clone(),
            is_ctor: false,
        };
        c.check_function_def(&mut first).unwrap();

        let mut second = FunctionDef {
            span: sp(),
            declarator: fn_declarator(&mut c, "f", int, &[]),
            body,
            is_ctor: false,
        };
        let err = c.check_function_def(&mut second).unwrap_err();
        assert!(matches!(err, SemaError::FunctionRedefinition { name, .. } if name == "f"));
    }

    #[test]
    fn parameters_are_visible_in_the_body() {
        let mut c = checker();
        let int = c.types.int_ty(false);
        let body = vec![Stmt::new(
            sp(),
            StmtKind::Return(Some(Expr::new(
                sp(),
                ExprKind::Ident {
                    name: "a".into(),
                    decl: None,
                },
            ))),
        )];
        let mut def = FunctionDef {
            span: sp(),
            declarator: fn_declarator(&mut c, "f", int, &[("a", int)]),
            body,
            is_ctor: false,
        };
        c.check_function_def(&mut def).unwrap();
        assert!(def.declarator.params[0].declarator.declared.is_some());
    }
}
