//! Shared foundation for the cminus semantic analyzer.
//!
//! This crate carries the pieces every other crate needs: source spans,
//! stable handles for types/declarations/expressions, the semantic error
//! type, and the warning sink.

pub mod diagnostics;
pub mod error;
pub mod handles;
pub mod span;

pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
pub use error::SemaError;
pub use handles::{DeclId, ExprId, TypeId};
pub use span::Span;
