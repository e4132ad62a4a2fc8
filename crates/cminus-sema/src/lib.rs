//! Semantic analysis: name resolution, type checking, overload
//! resolution, and implicit-conversion insertion.
//!
//! The entry point is [`Checker::run`], which walks a parsed
//! [`TranslationUnit`](cminus_ast::TranslationUnit) once and rewrites it
//! in place. After a successful run every name is resolved, every
//! expression is typed, and every implicit operation (lvalue load, array
//! decay, type conversion, `this->`, default arguments) is an explicit
//! node in the tree, so downstream consumers never need to re-derive
//! conversion rules.
//!
//! Checking is fail-fast: the first violation aborts the walk with a
//! [`SemaError`](cminus_core::SemaError). Non-fatal findings accumulate
//! as [`Diagnostics`](cminus_core::Diagnostics).

mod arena;
mod checker;
mod conversion;
mod expr_info;
mod overload;
mod scope;

pub use arena::{DeclArena, DeclRecord, DefaultArgTable, ExprStore};
pub use checker::{Analysis, Checker};
pub use conversion::TypeMatch;
pub use expr_info::{ExprInfo, ValueCategory};
pub use scope::{Binding, ScopeId, ScopeTable};
