//! Class checking.
//!
//! A class body is processed in two passes. The first pass declares the
//! fields and then the method signatures, so methods can refer to every
//! member and to each other regardless of order. While the fields are
//! being declared the class type is incomplete, which keeps a class from
//! containing itself by value; pointers to it are fine. The second pass
//! checks the method bodies.
//!
//! Every method, constructors included, gets an implicit first parameter
//! `this` of type `C *const` both in its declarator and in its function
//! type, so overload resolution and call conversion treat the receiver
//! as an ordinary argument.

use cminus_ast::{Access, ClassDef, Declarator, FunctionDef, MemberSpec, Param};
use cminus_core::SemaError;

use crate::scope::Binding;

use super::Checker;

impl Checker {
    pub(crate) fn check_class_def(&mut self, def: &mut ClassDef) -> Result<(), SemaError> {
        let span = def.span;
        if self.type_exists(&def.name) {
            return Err(SemaError::Redeclaration {
                name: def.name.clone(),
                span,
            });
        }

        let class_scope = self.scopes.push_class(Some(self.global_scope));
        self.classes.insert(def.name.clone(), class_scope);
        let class_ty = self.types.simple(&def.name, false);

        let Some(members) = &mut def.members else {
            // bodyless definition: the type exists but stays incomplete
            self.incomplete_types.insert(class_ty);
            return Ok(());
        };

        let prev_scope = self.current_scope;
        self.current_scope = class_scope;
        self.defined_class = Some(def.name.clone());

        let result = self.check_class_members(def.key.default_access(), class_ty, members);

        self.defined_class = None;
        self.current_access = Access::Public;
        self.current_scope = prev_scope;
        result
    }

    fn check_class_members(
        &mut self,
        default_access: Access,
        class_ty: cminus_core::TypeId,
        members: &mut [MemberSpec],
    ) -> Result<(), SemaError> {
        // fields first; the class is incomplete while they are declared
        self.incomplete_types.insert(class_ty);
        self.current_access = default_access;
        for member in members.iter_mut() {
            match member {
                MemberSpec::Access(access) => self.current_access = *access,
                MemberSpec::Fields(declarators) => {
                    for declarator in declarators {
                        self.first_pass_field(declarator)?;
                    }
                }
                MemberSpec::Method(_) => {}
            }
        }
        self.incomplete_types.remove(&class_ty);

        // then the method signatures
        self.current_access = default_access;
        for member in members.iter_mut() {
            match member {
                MemberSpec::Access(access) => self.current_access = *access,
                MemberSpec::Fields(_) => {}
                MemberSpec::Method(def) => self.first_pass_method(def)?,
            }
        }

        // and finally the bodies
        self.current_access = default_access;
        for member in members.iter_mut() {
            match member {
                MemberSpec::Access(access) => self.current_access = *access,
                MemberSpec::Fields(_) => {}
                MemberSpec::Method(def) => self.check_function_def(def)?,
            }
        }
        Ok(())
    }

    fn first_pass_field(&mut self, declarator: &mut Declarator) -> Result<(), SemaError> {
        let span = declarator.span;
        let ty = declarator.ty;
        if self.types.as_function(ty).is_some() {
            return Err(SemaError::InvalidOperation {
                message: "class methods cannot be forward declared".into(),
                span,
            });
        }
        self.validate_type(ty, span)?;
        if self.incomplete_type(ty) {
            return Err(SemaError::IncompleteType {
                message: format!(
                    "field '{}' has incomplete type {}",
                    declarator.name,
                    self.types.display(ty)
                ),
                span,
            });
        }
        if self.scopes.contains(self.current_scope, &declarator.name) {
            return Err(SemaError::Redeclaration {
                name: declarator.name.clone(),
                span,
            });
        }
        let id = self.decls.alloc(&declarator.name, ty, span);
        declarator.declared = Some(id);
        self.scopes.add_member(
            self.current_scope,
            declarator.name.clone(),
            Binding { decl: id, ty },
            self.current_access,
        );
        Ok(())
    }

    fn first_pass_method(&mut self, def: &mut FunctionDef) -> Result<(), SemaError> {
        self.add_this_to_declarator(&mut def.declarator)?;
        self.check_function_declarator(&mut def.declarator)?;
        self.declare_function(&mut def.declarator, Some(self.current_access))?;
        Ok(())
    }

    /// Prepend the implicit receiver to a method declarator: a parameter
    /// named `this` of type `C *const`, mirrored into the function type.
    fn add_this_to_declarator(&mut self, declarator: &mut Declarator) -> Result<(), SemaError> {
        let span = declarator.span;
        let Some(class) = self.defined_class.clone() else {
            return Err(SemaError::Internal {
                message: "method declarator outside of a class".into(),
                span,
            });
        };
        let Some((ret, params, vararg)) = self.types.as_function(declarator.ty) else {
            return Err(SemaError::Internal {
                message: "method declarator without a function type".into(),
                span,
            });
        };
        let mut params = params.to_vec();
        let class_ty = self.types.simple(&class, false);
        let this_ty = self.types.pointer(class_ty, true);
        params.insert(0, this_ty);
        declarator.ty = self.types.function(ret, params, vararg);
        declarator.params.insert(
            0,
            Param {
                span,
                declarator: Declarator::new(span, "this", this_ty),
                default: None,
            },
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cminus_ast::{ClassKey, Expr, ExprKind, Stmt, StmtKind};
    use cminus_core::Span;
    use cminus_types::TypeInterner;

    fn checker() -> Checker {
        Checker::new(TypeInterner::new())
    }

    fn sp() -> Span {
        Span::point(1, 1)
    }

    fn method(c: &mut Checker, name: &str, ret: cminus_core::TypeId, body: Vec<Stmt>) -> FunctionDef {
        let ty = c.types.function(ret, vec![], false);
        FunctionDef {
            span: sp(),
            declarator: Declarator::new(sp(), name, ty),
            body,
            is_ctor: false,
        }
    }

    fn class(name: &str, key: ClassKey, members: Vec<MemberSpec>) -> ClassDef {
        ClassDef {
            span: sp(),
            key,
            name: name.into(),
            members: Some(members),
        }
    }

    #[test]
    fn fields_and_methods_land_in_the_class_scope() {
        let mut c = checker();
        let int = c.types.int_ty(false);
        let body = vec![Stmt::new(
            sp(),
            StmtKind::Return(Some(Expr::new(
                sp(),
                ExprKind::Ident {
                    name: "x".into(),
                    decl: None,
                },
            ))),
        )];
        let getter = method(&mut c, "get", int, body);
        let mut def = class(
            "Point",
            ClassKey::Struct,
            vec![
                MemberSpec::Fields(vec![Declarator::new(sp(), "x", int)]),
                MemberSpec::Method(getter),
            ],
        );
        c.check_class_def(&mut def).unwrap();

        let scope = c.classes["Point"];
        assert!(c.scopes.contains(scope, "x"));
        assert!(c.scopes.contains(scope, "get"));

        // the method gained the receiver parameter
        let Some(MemberSpec::Method(m)) = def.members.as_ref().map(|m| &m[1]) else {
            panic!("missing method");
        };
        assert_eq!(m.declarator.params[0].declarator.name, "this");
        let point = c.types.simple("Point", false);
        let expected = c.types.pointer(point, true);
        let (_, params, _) = c.types.as_function(m.declarator.ty).unwrap();
        assert_eq!(params[0], expected);
    }

    #[test]
    fn methods_see_fields_declared_after_them() {
        let mut c = checker();
        let int = c.types.int_ty(false);
        let body = vec![Stmt::new(
            sp(),
            StmtKind::Return(Some(Expr::new(
                sp(),
                ExprKind::Ident {
                    name: "late".into(),
                    decl: None,
                },
            ))),
        )];
        let getter = method(&mut c, "get", int, body);
        let mut def = class(
            "S",
            ClassKey::Struct,
            vec![
                MemberSpec::Method(getter),
                MemberSpec::Fields(vec![Declarator::new(sp(), "late", int)]),
            ],
        );
        c.check_class_def(&mut def).unwrap();
    }

    #[test]
    fn a_class_cannot_contain_itself_by_value() {
        let mut c = checker();
        let self_ty = c.types.simple("R", false);
        let mut def = class(
            "R",
            ClassKey::Struct,
            vec![MemberSpec::Fields(vec![Declarator::new(sp(), "r", self_ty)])],
        );
        let err = c.check_class_def(&mut def).unwrap_err();
        assert!(matches!(err, SemaError::IncompleteType { .. }));
    }

    #[test]
    fn a_class_can_point_to_itself() {
        let mut c = checker();
        let self_ty = c.types.simple("Node", false);
        let self_ptr = c.types.pointer(self_ty, false);
        let mut def = class(
            "Node",
            ClassKey::Struct,
            vec![MemberSpec::Fields(vec![Declarator::new(
                sp(),
                "next",
                self_ptr,
            )])],
        );
        c.check_class_def(&mut def).unwrap();
    }

    #[test]
    fn method_forward_declarations_are_rejected() {
        let mut c = checker();
        let int = c.types.int_ty(false);
        let fn_ty = c.types.function(int, vec![], false);
        let mut def = class(
            "S",
            ClassKey::Struct,
            vec![MemberSpec::Fields(vec![Declarator::new(sp(), "f", fn_ty)])],
        );
        let err = c.check_class_def(&mut def).unwrap_err();
        assert!(matches!(err, SemaError::InvalidOperation { .. }));
    }

    #[test]
    fn redefining_a_class_or_builtin_name_is_rejected() {
        let mut c = checker();
        let mut def = class("S", ClassKey::Struct, vec![]);
        c.check_class_def(&mut def).unwrap();

        let mut again = class("S", ClassKey::Class, vec![]);
        let err = c.check_class_def(&mut again).unwrap_err();
        assert!(matches!(err, SemaError::Redeclaration { .. }));

        let mut shadow_int = class("int", ClassKey::Struct, vec![]);
        let err = c.check_class_def(&mut shadow_int).unwrap_err();
        assert!(matches!(err, SemaError::Redeclaration { .. }));
    }

    #[test]
    fn class_members_default_to_private() {
        let mut c = checker();
        let int = c.types.int_ty(false);
        let mut def = class(
            "C",
            ClassKey::Class,
            vec![
                MemberSpec::Fields(vec![Declarator::new(sp(), "hidden", int)]),
                MemberSpec::Access(Access::Public),
                MemberSpec::Fields(vec![Declarator::new(sp(), "open", int)]),
            ],
        );
        c.check_class_def(&mut def).unwrap();

        let scope = c.classes["C"];
        let hidden = c.scopes.values(scope, "hidden", false)[0].decl;
        let open = c.scopes.values(scope, "open", false)[0].decl;
        assert!(c.scopes.is_private(scope, hidden));
        assert!(!c.scopes.is_private(scope, open));
    }
}
