//! The tree walker driving the whole analysis.
//!
//! [`Checker`] holds all ambient state of the walk: the scope chain, the
//! class being defined, the enclosing function's return type, the loop
//! nesting depth, and the arenas behind resolved [`DeclId`]/[`ExprId`]
//! handles. The walk itself is spread over the submodules by syntactic
//! category; this module keeps the shared state and the type-level
//! helpers every category needs.

mod builtins;
mod call;
mod class;
mod decl;
mod expr;
mod stmt;

use cminus_ast::{Access, BinaryOp, Expr, ExprKind, TranslationUnit};
use cminus_core::{DeclId, Diagnostics, ExprId, SemaError, Span, TypeId};
use cminus_types::{Type, TypeInterner};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::arena::{DeclArena, DefaultArgTable, ExprStore};
use crate::conversion::{TypeMatch, implicit_match};
use crate::expr_info::ExprInfo;
use crate::scope::{ScopeId, ScopeTable};

/// The semantic checker.
///
/// Construct it with the [`TypeInterner`] the parser used for the tree,
/// run it once over the translation unit, then read the annotated tree
/// and the arenas back out of it.
pub struct Checker {
    pub(crate) types: TypeInterner,
    pub(crate) scopes: ScopeTable,
    pub(crate) decls: DeclArena,
    pub(crate) default_exprs: ExprStore,
    /// Default-argument slots per canonical function declaration.
    pub(crate) funcs_def_args: DefaultArgTable,
    /// Cached check result per default-argument expression, so call
    /// sites never re-check the shared expression.
    pub(crate) def_arg_vals: FxHashMap<ExprId, ExprInfo>,
    /// Canonical declarations whose body has been seen.
    pub(crate) defined_funcs: FxHashSet<DeclId>,
    /// Class name to class scope.
    pub(crate) classes: FxHashMap<String, ScopeId>,
    pub(crate) global_scope: ScopeId,
    pub(crate) current_scope: ScopeId,
    /// Return type of the enclosing function, `None` outside functions.
    pub(crate) curr_ret_type: Option<TypeId>,
    pub(crate) loop_depth: usize,
    /// Whether the next compound statement opens a fresh scope. Cleared
    /// for for-loop bodies, whose scope already exists.
    pub(crate) compound_opens_scope: bool,
    /// Class currently being defined, `None` outside class bodies.
    pub(crate) defined_class: Option<String>,
    pub(crate) current_access: Access,
    pub(crate) valid_types: FxHashSet<TypeId>,
    /// Const-unqualified types that cannot be used by value.
    pub(crate) incomplete_types: FxHashSet<TypeId>,
    pub(crate) diagnostics: Diagnostics,
    ran: bool,
}

/// Everything a later pass needs beyond the annotated tree.
///
/// Produced by [`Checker::into_analysis`] after a successful run.
pub struct Analysis {
    /// The type interner, including types created during checking.
    pub types: TypeInterner,
    /// Canonical declaration records behind the tree's [`DeclId`]s.
    pub decls: DeclArena,
    /// Shared default-argument expressions behind the tree's [`ExprId`]s.
    pub default_exprs: ExprStore,
    /// Default-argument slots per canonical function declaration.
    pub defaults: DefaultArgTable,
    /// Non-fatal findings accumulated during the run.
    pub diagnostics: Diagnostics,
}

/// How two function signatures relate for redeclaration purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FuncCmp {
    /// Parameters match const-unqualified and the return types match.
    Match,
    /// Parameters match but the return types differ.
    RetDiff,
    /// At least one parameter differs.
    NoMatch,
}

impl Checker {
    /// Create a checker over the types interned so far.
    pub fn new(types: TypeInterner) -> Self {
        let mut types = types;
        let void = types.void_ty();
        let mut scopes = ScopeTable::new();
        let global_scope = scopes.push_block(None);
        let mut incomplete_types = FxHashSet::default();
        incomplete_types.insert(void);

        Self {
            types,
            scopes,
            decls: DeclArena::new(),
            default_exprs: ExprStore::new(),
            funcs_def_args: DefaultArgTable::default(),
            def_arg_vals: FxHashMap::default(),
            defined_funcs: FxHashSet::default(),
            classes: FxHashMap::default(),
            global_scope,
            current_scope: global_scope,
            curr_ret_type: None,
            loop_depth: 0,
            compound_opens_scope: true,
            defined_class: None,
            current_access: Access::Public,
            valid_types: FxHashSet::default(),
            incomplete_types,
            diagnostics: Diagnostics::new(),
            ran: false,
        }
    }

    /// Run the checker over a translation unit, rewriting it in place.
    ///
    /// A checker instance checks exactly one translation unit; a second
    /// call is rejected.
    pub fn run(&mut self, unit: &mut TranslationUnit) -> Result<(), SemaError> {
        if self.ran {
            return Err(SemaError::Internal {
                message: "checker has already run".into(),
                span: unit.span,
            });
        }
        self.ran = true;
        self.check_translation_unit(unit)
    }

    /// The type interner, including types created during checking.
    pub fn types(&self) -> &TypeInterner {
        &self.types
    }

    /// Canonical declarations the tree's [`DeclId`]s resolve to.
    pub fn decls(&self) -> &DeclArena {
        &self.decls
    }

    /// The shared default-argument expression behind an [`ExprId`].
    pub fn default_expr(&self, id: ExprId) -> &Expr {
        self.default_exprs.get(id)
    }

    /// Non-fatal findings accumulated during the run.
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Consume the checker into the data a later pass works from.
    pub fn into_analysis(self) -> Analysis {
        Analysis {
            types: self.types,
            decls: self.decls,
            default_exprs: self.default_exprs,
            defaults: self.funcs_def_args,
            diagnostics: self.diagnostics,
        }
    }

    // ==========================================================================
    // Scopes
    // ==========================================================================

    pub(crate) fn add_scope(&mut self) -> ScopeId {
        self.current_scope = self.scopes.push_block(Some(self.current_scope));
        self.current_scope
    }

    pub(crate) fn drop_scope(&mut self) {
        if let Some(parent) = self.scopes.parent(self.current_scope) {
            self.current_scope = parent;
        }
    }

    /// Whether `scope` is the current scope or one of its ancestors.
    pub(crate) fn inside_scope(&self, scope: ScopeId) -> bool {
        self.scopes.is_within(self.current_scope, scope)
    }

    /// Whether a bare `name` inside a method body names a non-static
    /// member of the class being defined. Constructors are not members.
    pub(crate) fn refers_to_class_member(&self, name: &str) -> bool {
        let Some(class) = self.defined_class.as_deref() else {
            return false;
        };
        name != class
            && self
                .classes
                .get(class)
                .copied()
                .is_some_and(|class_scope| {
                    self.scopes.value_scope(self.current_scope, name) == Some(class_scope)
                })
    }

    // ==========================================================================
    // Type predicates tied to checker state
    // ==========================================================================

    /// Whether a simple type name is usable by the program.
    pub(crate) fn type_exists(&self, name: &str) -> bool {
        matches!(name, "int" | "char" | "bool" | "double" | "void")
            || self.classes.contains_key(name)
    }

    pub(crate) fn incomplete_type(&mut self, ty: TypeId) -> bool {
        let unqualified = self.types.const_unqualified(ty);
        self.incomplete_types.contains(&unqualified)
    }

    /// If `ty` is a pointer to a complete type, its pointee.
    pub(crate) fn pointer_to_complete_type(&mut self, ty: TypeId) -> Option<TypeId> {
        let (pointee, _) = self.types.as_pointer(ty)?;
        if self.incomplete_type(pointee) {
            None
        } else {
            Some(pointee)
        }
    }

    /// Whether `ty` can be the operand of `++`/`--`: a pointer to a
    /// complete type, or an integral type other than `bool`.
    pub(crate) fn viable_incr_type(&mut self, ty: TypeId) -> bool {
        if self.pointer_to_complete_type(ty).is_some() {
            return true;
        }
        self.types.is_integral(ty) && !self.types.is_bool(ty)
    }

    /// The type of `sizeof` results.
    pub(crate) fn sizeof_result_ty(&mut self) -> TypeId {
        self.types.int_ty(true)
    }

    /// Check a type against the structural rules, caching successes.
    pub(crate) fn validate_type(&mut self, ty: TypeId, span: Span) -> Result<(), SemaError> {
        if self.valid_types.contains(&ty) {
            return Ok(());
        }
        let descriptor = match self.types.get(ty) {
            Some(d) => d.clone(),
            None => {
                return Err(SemaError::Internal {
                    message: "type handle with no descriptor".into(),
                    span,
                });
            }
        };
        match descriptor {
            Type::Simple { name, .. } => {
                if !self.type_exists(&name) {
                    return Err(SemaError::UnknownType { name, span });
                }
            }
            Type::Pointer { pointee, .. } => {
                if self.types.as_function(pointee).is_some() {
                    return Err(SemaError::InvalidType {
                        message: "pointer to function type is not allowed".into(),
                        span,
                    });
                }
                self.validate_type(pointee, span)?;
            }
            Type::Array { elem, size } => {
                if self.types.as_function(elem).is_some() {
                    return Err(SemaError::InvalidType {
                        message: "array of functions is not allowed".into(),
                        span,
                    });
                }
                if size.is_none() {
                    return Err(SemaError::InvalidType {
                        message: "array without defined size".into(),
                        span,
                    });
                }
                if self.incomplete_type(elem) {
                    return Err(SemaError::IncompleteType {
                        message: format!(
                            "array element type cannot be incomplete: {}",
                            self.types.display(elem)
                        ),
                        span,
                    });
                }
                self.validate_type(elem, span)?;
            }
            Type::Function { ret, params, vararg } => {
                if !self.types.is_void(ret) && self.incomplete_type(ret) {
                    return Err(SemaError::IncompleteType {
                        message: "incomplete function return type".into(),
                        span,
                    });
                }
                if self.types.as_array(ret).is_some() {
                    return Err(SemaError::InvalidType {
                        message: "function cannot return array".into(),
                        span,
                    });
                }
                if self.types.as_function(ret).is_some() {
                    return Err(SemaError::InvalidType {
                        message: "function cannot return function".into(),
                        span,
                    });
                }
                self.validate_type(ret, span)?;
                for p in &params {
                    if self.incomplete_type(*p) {
                        return Err(SemaError::IncompleteType {
                            message: format!(
                                "parameter has incomplete type: {}",
                                self.types.display(*p)
                            ),
                            span,
                        });
                    }
                    if self.types.as_array(*p).is_some() {
                        return Err(SemaError::InvalidType {
                            message: "parameter is of array type".into(),
                            span,
                        });
                    }
                    if self.types.as_function(*p).is_some() {
                        return Err(SemaError::InvalidType {
                            message: "parameter is of function type".into(),
                            span,
                        });
                    }
                    self.validate_type(*p, span)?;
                }
                if params.is_empty() && vararg {
                    return Err(SemaError::InvalidType {
                        message: "vararg function without any parameters".into(),
                        span,
                    });
                }
            }
        }
        self.valid_types.insert(ty);
        Ok(())
    }

    // ==========================================================================
    // Common types and operator typing
    // ==========================================================================

    /// The type two operands can both be converted to, if any.
    ///
    /// Simple types use the numeric common type; similar pointers merge
    /// const requirements at every level below the first.
    pub(crate) fn determine_common_type(&mut self, t1: TypeId, t2: TypeId) -> Option<TypeId> {
        if t1 == t2 {
            return Some(t1);
        }
        if self.types.unqualified_eq(t1, t2) {
            return Some(self.types.const_unqualified(t1));
        }

        let t1_to_t2 = implicit_match(&self.types, t1, t2);
        let t2_to_t1 = implicit_match(&self.types, t2, t1);
        if t1_to_t2 != TypeMatch::None && t2_to_t1 == TypeMatch::None {
            return Some(t2);
        }
        if t2_to_t1 != TypeMatch::None && t1_to_t2 == TypeMatch::None {
            return Some(t1);
        }

        if self.types.as_simple(t1).is_some() && self.types.as_simple(t2).is_some() {
            self.common_simple_type(t1, t2)
        } else if self.types.as_pointer(t1).is_some() && self.types.as_pointer(t2).is_some() {
            self.common_pointer_type(t1, t2)
        } else {
            None
        }
    }

    /// Const-unqualified common type of two simple types.
    fn common_simple_type(&mut self, t1: TypeId, t2: TypeId) -> Option<TypeId> {
        let types = &self.types;
        if types.is_nullptr(t1) && types.is_nullptr(t2) {
            return Some(self.types.nullptr_ty());
        }
        if !types.is_numerical(t1) || !types.is_numerical(t2) {
            return None;
        }
        if types.is_double(t1) && types.is_double(t2) {
            return Some(self.types.double_ty(false));
        }
        if (types.is_double(t1) && types.is_int(t2)) || (types.is_int(t1) && types.is_double(t2)) {
            return Some(self.types.double_ty(false));
        }
        // double with a narrower integral type has no common type
        if types.is_double(t1) || types.is_double(t2) {
            return None;
        }
        if types.is_int(t1) || types.is_int(t2) {
            Some(self.types.int_ty(false))
        } else if types.is_char(t1) || types.is_char(t2) {
            Some(self.types.char_ty(false))
        } else {
            Some(self.types.bool_ty(false))
        }
    }

    fn common_pointer_type(&mut self, p1: TypeId, p2: TypeId) -> Option<TypeId> {
        if p1 == p2 {
            return Some(p1);
        }
        if self.types.similar(p1, p2) {
            self.common_type_rec(p1, p2)
        } else {
            None
        }
    }

    /// For two similar types, the type at least as const-strong as both,
    /// e.g. `const int * *` and `int * const *` give
    /// `const int * const *`.
    fn common_type_rec(&mut self, t1: TypeId, t2: TypeId) -> Option<TypeId> {
        if t1 == t2 {
            return Some(t1);
        }
        if let (Some((n1, c1)), Some((n2, c2))) =
            (self.types.as_simple(t1), self.types.as_simple(t2))
        {
            if n1 != n2 {
                return None;
            }
            let name = n1.to_string();
            let is_const = c1 || c2;
            return Some(self.types.simple(&name, is_const));
        }
        if let (Some((e1, _)), Some((e2, _))) =
            (self.types.as_pointer(t1), self.types.as_pointer(t2))
        {
            // the merged pointer level is always const to keep
            // 'const T **' and 'T **' apart
            let elem = self.common_type_rec(e1, e2)?;
            return Some(self.types.pointer(elem, true));
        }
        if let (Some((e1, s1)), Some((e2, s2))) =
            (self.types.as_array(t1), self.types.as_array(t2))
        {
            if s1 != s2 {
                return None;
            }
            let elem = self.common_type_rec(e1, e2)?;
            return Some(self.types.array(elem, s1));
        }
        None
    }

    /// For operands `lhs` and `rhs` of binary `op`, the types each side
    /// must convert to and the result type of the operation.
    pub(crate) fn conversions_for_bin_op(
        &mut self,
        lhs: TypeId,
        rhs: TypeId,
        op: BinaryOp,
    ) -> Option<(TypeId, TypeId, TypeId)> {
        let bool_ty = self.types.bool_ty(false);
        let int_ty = self.types.int_ty(false);
        let common = self.determine_common_type(lhs, rhs);

        if op.is_logical() {
            return Some((bool_ty, bool_ty, bool_ty));
        }
        if op.is_bitwise() || op == BinaryOp::Mod {
            if self.types.is_integral(lhs) && self.types.is_integral(rhs) {
                return Some((int_ty, int_ty, int_ty));
            }
            return None;
        }
        if op.is_comparison() {
            let common = common?;
            if self.types.is_numerical(common) || self.types.as_pointer(common).is_some() {
                return Some((common, common, bool_ty));
            }
            return None;
        }
        if op.is_arithmetic() {
            // pointer arithmetic needs a complete pointee
            let lhs_ptr = self.pointer_to_complete_type(lhs).is_some();
            let rhs_ptr = self.pointer_to_complete_type(rhs).is_some();
            if lhs_ptr && rhs_ptr && op == BinaryOp::Minus {
                let common = common?;
                return Some((common, common, int_ty));
            }
            if lhs_ptr
                && self.types.is_integral(rhs)
                && matches!(op, BinaryOp::Plus | BinaryOp::Minus)
            {
                return Some((lhs, int_ty, lhs));
            }
            if self.types.is_numerical(lhs) && self.types.is_numerical(rhs) {
                let common = common?;
                return Some((common, common, common));
            }
        }
        None
    }

    // ==========================================================================
    // Rvalue conversion
    // ==========================================================================

    /// Convert `expr` (already checked, with result `from`) into an
    /// rvalue of type `dest`, inserting load/cast nodes in place.
    pub(crate) fn convert_to_rvalue(
        &mut self,
        expr: &mut Expr,
        from: ExprInfo,
        dest: TypeId,
        span: Span,
    ) -> Result<(), SemaError> {
        // 1) obtain an rvalue; array decay already happened during the
        //    visit of `expr`
        let rval_ty = if from.is_lvalue() {
            if self.types.as_pointer(from.ty).is_some() || self.types.as_simple(from.ty).is_some() {
                expr.wrap(ExprKind::LValueToRValue);
                self.types.const_unqualified(from.ty)
            } else {
                return Err(self.convert_error(from, dest, span));
            }
        } else {
            self.types.const_unqualified(from.ty)
        };

        // 2) adjust the type if needed
        match implicit_match(&self.types, rval_ty, dest) {
            TypeMatch::Exact | TypeMatch::Const => Ok(()),
            TypeMatch::Conversion => {
                expr.wrap(|inner| ExprKind::ImplicitCast {
                    to: dest,
                    operand: inner,
                });
                Ok(())
            }
            TypeMatch::None => Err(self.convert_error(from, dest, span)),
        }
    }

    /// Check `expr` and convert it to an rvalue of `dest`.
    pub(crate) fn check_and_convert(
        &mut self,
        expr: &mut Expr,
        dest: TypeId,
        span: Span,
    ) -> Result<(), SemaError> {
        let from = self.check_expr(expr, true)?;
        self.convert_to_rvalue(expr, from, dest, span)
    }

    pub(crate) fn convert_error(&self, from: ExprInfo, dest: TypeId, span: Span) -> SemaError {
        SemaError::TypeMismatch {
            message: format!(
                "{} is not convertible to type {}",
                from.describe(&self.types),
                self.types.display(dest)
            ),
            span,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checker() -> Checker {
        Checker::new(TypeInterner::new())
    }

    #[test]
    fn common_type_of_numeric_pairs() {
        let mut c = checker();
        let int = c.types.int_ty(false);
        let ch = c.types.char_ty(false);
        let b = c.types.bool_ty(false);
        let d = c.types.double_ty(false);

        assert_eq!(c.determine_common_type(int, d), Some(d));
        assert_eq!(c.determine_common_type(ch, int), Some(int));
        assert_eq!(c.determine_common_type(b, ch), Some(ch));
        // double and char have no common type
        assert_eq!(c.determine_common_type(d, ch), None);
    }

    #[test]
    fn common_pointer_type_merges_const() {
        let mut c = checker();
        let int = c.types.int_ty(false);
        let const_int = c.types.int_ty(true);
        // 'const int * *' and 'int * const *'
        let p1_inner = c.types.pointer(const_int, false);
        let p1 = c.types.pointer(p1_inner, false);
        let p2_inner = c.types.pointer(int, true);
        let p2 = c.types.pointer(p2_inner, false);

        let common = c.determine_common_type(p1, p2).expect("common type");
        // 'const int * const * const'... the first level const does not
        // matter for rvalues; levels below must hold both requirements
        let expected_inner = c.types.pointer(const_int, true);
        let expected = c.types.pointer(expected_inner, true);
        assert_eq!(common, expected);
    }

    #[test]
    fn bin_op_typing_table() {
        let mut c = checker();
        let int = c.types.int_ty(false);
        let d = c.types.double_ty(false);
        let b = c.types.bool_ty(false);
        let int_ptr = c.types.pointer(int, false);

        // arithmetic promotes to the common type
        assert_eq!(
            c.conversions_for_bin_op(int, d, BinaryOp::Plus),
            Some((d, d, d))
        );
        // pointer minus pointer is int
        assert_eq!(
            c.conversions_for_bin_op(int_ptr, int_ptr, BinaryOp::Minus),
            Some((int_ptr, int_ptr, int))
        );
        // pointer plus integral keeps the pointer type
        assert_eq!(
            c.conversions_for_bin_op(int_ptr, int, BinaryOp::Plus),
            Some((int_ptr, int, int_ptr))
        );
        // comparisons yield bool
        assert_eq!(
            c.conversions_for_bin_op(int, int, BinaryOp::Less),
            Some((int, int, b))
        );
        // bitwise ops demand integral operands
        assert_eq!(c.conversions_for_bin_op(d, int, BinaryOp::And), None);
        // logical ops convert both sides to bool
        assert_eq!(
            c.conversions_for_bin_op(int_ptr, int, BinaryOp::LogicalAnd),
            Some((b, b, b))
        );
    }

    #[test]
    fn pointer_plus_pointer_is_rejected() {
        let mut c = checker();
        let int = c.types.int_ty(false);
        let int_ptr = c.types.pointer(int, false);
        assert_eq!(c.conversions_for_bin_op(int_ptr, int_ptr, BinaryOp::Plus), None);
    }

    #[test]
    fn incr_viability() {
        let mut c = checker();
        let int = c.types.int_ty(false);
        let b = c.types.bool_ty(false);
        let d = c.types.double_ty(false);
        let void = c.types.void_ty();
        let int_ptr = c.types.pointer(int, false);
        let void_ptr = c.types.pointer(void, false);

        assert!(c.viable_incr_type(int));
        assert!(c.viable_incr_type(int_ptr));
        assert!(!c.viable_incr_type(b));
        assert!(!c.viable_incr_type(d));
        // void is incomplete, so 'void *' cannot be incremented
        assert!(!c.viable_incr_type(void_ptr));
    }

    #[test]
    fn run_is_single_shot() {
        let mut c = checker();
        let mut unit = TranslationUnit {
            span: Span::point(1, 1),
            declarations: Vec::new(),
        };
        assert!(c.run(&mut unit).is_ok());
        let err = c.run(&mut unit).unwrap_err();
        assert!(err.is_internal());
    }
}
