//! Arenas owned by the checker.
//!
//! The AST refers to resolved declarations and shared default-argument
//! expressions by index instead of by reference, so the tree stays free
//! of self-referential lifetimes while every call site of the same
//! function still observes the same canonical declaration and the same
//! default-argument expression.

use cminus_ast::Expr;
use cminus_core::{DeclId, ExprId, Span, TypeId};
use rustc_hash::FxHashMap;

/// A canonical declaration: the name/type pair a [`DeclId`] resolves to.
#[derive(Debug, Clone, PartialEq)]
pub struct DeclRecord {
    pub name: String,
    pub ty: TypeId,
    pub span: Span,
}

/// Append-only arena of canonical declarations.
///
/// A function with several declarations gets exactly one record, created
/// at the first declaration; later declarations resolve to the same id.
#[derive(Debug, Default)]
pub struct DeclArena {
    decls: Vec<DeclRecord>,
}

impl DeclArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self, name: impl Into<String>, ty: TypeId, span: Span) -> DeclId {
        let id = DeclId(self.decls.len() as u32);
        self.decls.push(DeclRecord {
            name: name.into(),
            ty,
            span,
        });
        id
    }

    pub fn get(&self, id: DeclId) -> &DeclRecord {
        &self.decls[id.0 as usize]
    }

    pub fn len(&self) -> usize {
        self.decls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }
}

/// Append-only arena of checked default-argument expressions.
///
/// When a parameter's default value passes checking it moves out of the
/// declarator into this store; the parameter and every call site that
/// needs the default then share it through an [`ExprId`].
#[derive(Debug, Default)]
pub struct ExprStore {
    exprs: Vec<Expr>,
}

impl ExprStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self, expr: Expr) -> ExprId {
        let id = ExprId(self.exprs.len() as u32);
        self.exprs.push(expr);
        id
    }

    pub fn get(&self, id: ExprId) -> &Expr {
        &self.exprs[id.0 as usize]
    }
}

/// Per-function default-argument lists, keyed by the canonical first
/// declaration.
///
/// Each list has one slot per parameter (including the implicit `this`
/// of methods); `None` means the parameter has no default value yet. A
/// later redeclaration may fill slots that are still `None`.
pub type DefaultArgTable = FxHashMap<DeclId, Vec<Option<ExprId>>>;
