//! Semantic analysis errors.
//!
//! Every failure during the checking pass is a [`SemaError`] carrying a
//! 1-based line:column [`Span`]. There is no recovery: the first error
//! unwinds the whole pass through `Result` propagation.
//!
//! User-facing semantic errors and internal invariant violations share the
//! same type but render with different prefixes; [`SemaError::Internal`]
//! indicates a bug in the checker itself, not in the analyzed program.

use thiserror::Error;

use crate::Span;

/// Errors produced by the semantic checker.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SemaError {
    /// A name could not be resolved in the current scope chain.
    #[error("at {span}: error: unknown identifier '{name}'")]
    UnknownIdentifier {
        /// The identifier that wasn't found.
        name: String,
        /// Where the identifier was referenced.
        span: Span,
    },

    /// A type name does not exist.
    #[error("at {span}: error: unknown type '{name}'")]
    UnknownType { name: String, span: Span },

    /// A member access named a member the class does not have.
    #[error("at {span}: error: unknown member '{name}'")]
    UnknownMember { name: String, span: Span },

    /// A name was declared twice in the same scope.
    #[error("at {span}: error: redeclaration of name '{name}'")]
    Redeclaration { name: String, span: Span },

    /// A value could not be converted to the type a context requires.
    #[error("at {span}: error: {message}")]
    TypeMismatch { message: String, span: Span },

    /// Operand types are invalid for an operator.
    #[error("at {span}: error: {message}")]
    InvalidOperands { message: String, span: Span },

    /// A generic semantic rule violation.
    #[error("at {span}: error: {message}")]
    InvalidOperation { message: String, span: Span },

    /// The callee of a call expression is not something callable.
    #[error("at {span}: error: invalid callee")]
    NotCallable { span: Span },

    /// No declared overload accepts the supplied argument types.
    #[error("at {span}: error: no matching function for call of '{name}'")]
    NoMatchingOverload { name: String, span: Span },

    /// More than one overload matches equally well (or incomparably).
    #[error("at {span}: error: ambiguous call of '{name}': could be {candidates}")]
    AmbiguousCall {
        name: String,
        /// Rendered signatures of the tied candidates.
        candidates: String,
        span: Span,
    },

    /// A private member, method, or constructor was used outside its class.
    #[error("at {span}: error: cannot access private member '{name}'")]
    PrivateAccess { name: String, span: Span },

    /// `this` used outside a method body.
    #[error("at {span}: error: cannot use 'this' here")]
    ThisOutsideMethod { span: Span },

    /// `break n` / `continue n` with a level outside the current nesting.
    #[error("at {span}: error: invalid {keyword} level {level}, current loop depth is {depth}")]
    InvalidLoopLevel {
        /// "break" or "continue".
        keyword: &'static str,
        level: u32,
        depth: u32,
        span: Span,
    },

    /// A bare `return` inside a function that must return a value.
    #[error("at {span}: error: implicit void return in non-void function")]
    MissingReturnValue { span: Span },

    /// An incomplete type was used where a complete type is required.
    #[error("at {span}: error: {message}")]
    IncompleteType { message: String, span: Span },

    /// A structurally invalid type (array of functions, unsized array, ...).
    #[error("at {span}: error: {message}")]
    InvalidType { message: String, span: Span },

    /// A parameter without a default follows parameters with defaults.
    #[error("at {span}: error: gap in default arguments of '{name}'")]
    DefaultArgGap { name: String, span: Span },

    /// A redeclaration supplied a default value a parameter already has.
    #[error("at {span}: error: redefinition of default argument of '{name}'")]
    DefaultArgRedefinition { name: String, span: Span },

    /// A function body was provided twice for the same signature.
    #[error("at {span}: error: redefinition of function '{name}'")]
    FunctionRedefinition { name: String, span: Span },

    /// A constructor definition that does not follow constructor rules.
    #[error("at {span}: error: {message}")]
    InvalidConstructor { message: String, span: Span },

    /// A semantic violation not covered by a more specific variant.
    #[error("at {span}: error: {message}")]
    Semantic { message: String, span: Span },

    /// A bug in the checker itself: an AST or type shape the walker does
    /// not expect from a valid parse.
    #[error("at {span}: internal error: {message}")]
    Internal { message: String, span: Span },
}

impl SemaError {
    /// Get the span where this error occurred.
    pub fn span(&self) -> Span {
        match self {
            SemaError::UnknownIdentifier { span, .. } => *span,
            SemaError::UnknownType { span, .. } => *span,
            SemaError::UnknownMember { span, .. } => *span,
            SemaError::Redeclaration { span, .. } => *span,
            SemaError::TypeMismatch { span, .. } => *span,
            SemaError::InvalidOperands { span, .. } => *span,
            SemaError::InvalidOperation { span, .. } => *span,
            SemaError::NotCallable { span } => *span,
            SemaError::NoMatchingOverload { span, .. } => *span,
            SemaError::AmbiguousCall { span, .. } => *span,
            SemaError::PrivateAccess { span, .. } => *span,
            SemaError::ThisOutsideMethod { span } => *span,
            SemaError::InvalidLoopLevel { span, .. } => *span,
            SemaError::MissingReturnValue { span } => *span,
            SemaError::IncompleteType { span, .. } => *span,
            SemaError::InvalidType { span, .. } => *span,
            SemaError::DefaultArgGap { span, .. } => *span,
            SemaError::DefaultArgRedefinition { span, .. } => *span,
            SemaError::FunctionRedefinition { span, .. } => *span,
            SemaError::InvalidConstructor { span, .. } => *span,
            SemaError::Semantic { span, .. } => *span,
            SemaError::Internal { span, .. } => *span,
        }
    }

    /// Whether this error indicates a checker bug rather than a user error.
    pub fn is_internal(&self) -> bool {
        matches!(self, SemaError::Internal { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_error_rendering() {
        let err = SemaError::UnknownIdentifier {
            name: "x".into(),
            span: Span::new(3, 7, 1),
        };
        assert_eq!(err.to_string(), "at 3:7: error: unknown identifier 'x'");
        assert!(!err.is_internal());
    }

    #[test]
    fn internal_error_prefix() {
        let err = SemaError::Internal {
            message: "unexpected node".into(),
            span: Span::new(1, 1, 0),
        };
        assert!(err.to_string().contains("internal error:"));
        assert!(err.is_internal());
    }
}
