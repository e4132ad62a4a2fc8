//! Semantic analysis for a small C-like language with classes.
//!
//! The crates divide the work along the data they own:
//!
//! - `cminus-core`: spans, handle types, errors, diagnostics
//! - `cminus-types`: the type interner and its query surface
//! - `cminus-ast`: the tree the parser builds and the checker annotates
//! - `cminus-sema`: the checking pass itself
//!
//! This facade re-exports the pieces a front end needs: build a
//! [`TranslationUnit`](ast::TranslationUnit) against a
//! [`TypeInterner`](types::TypeInterner), hand both to a
//! [`Checker`](sema::Checker), and run it once.

pub mod core {
    pub use cminus_core::*;
}

pub mod types {
    pub use cminus_types::*;
}

pub mod ast {
    pub use cminus_ast::*;
}

pub mod sema {
    pub use cminus_sema::*;
}

pub mod prelude {
    pub use cminus_ast::{Declaration, Expr, ExprKind, Stmt, StmtKind, TranslationUnit};
    pub use cminus_core::{DeclId, Diagnostics, ExprId, SemaError, Span, TypeId};
    pub use cminus_sema::{Analysis, Checker, ExprInfo, ValueCategory};
    pub use cminus_types::TypeInterner;
}
