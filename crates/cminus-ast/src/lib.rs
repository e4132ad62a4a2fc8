//! The abstract syntax tree the semantic checker walks and rewrites.
//!
//! The tree arrives from the parser with only syntactic information; the
//! checker annotates it in place. Annotation happens two ways:
//!
//! - resolution slots (`decl`, `resolved`, `operand_ty`) start as `None`
//!   and are filled in once the checker has resolved the node,
//! - implicit operations become explicit wrapper nodes
//!   ([`ExprKind::LValueToRValue`], [`ExprKind::ArrayToPointer`],
//!   [`ExprKind::ImplicitCast`], [`ExprKind::ImplicitThis`],
//!   [`ExprKind::DefaultArg`]) inserted around existing children.
//!
//! Nodes refer to types by [`TypeId`] and to resolved declarations by
//! [`DeclId`]; the arenas that own the referents live in the checker.

mod decl;
mod expr;
mod ops;
mod stmt;

pub use decl::{
    Access, ClassDef, ClassKey, Declaration, Declarator, DefaultValue, FunctionDef,
    InitDeclarator, MemberSpec, Param, SimpleDeclaration, TranslationUnit,
};
pub use expr::{Expr, ExprKind};
pub use ops::{AssignOp, BinaryOp, UnaryOp};
pub use stmt::{Condition, ForInit, Stmt, StmtKind};
