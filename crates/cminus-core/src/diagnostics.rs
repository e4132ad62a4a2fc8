//! Non-fatal diagnostics.
//!
//! Warnings do not abort the checking pass; they accumulate in a
//! [`Diagnostics`] collection that the driver can print after the run.

use std::fmt;

use crate::Span;

/// The severity level of a diagnostic message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// A warning about potentially problematic code.
    Warning,
    /// An informational message.
    Info,
}

/// A single non-fatal diagnostic message.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// The severity level of this diagnostic.
    pub kind: DiagnosticKind,
    /// The diagnostic message text.
    pub message: String,
    /// Where in the source the diagnostic applies.
    pub span: Span,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            DiagnosticKind::Warning => "warning",
            DiagnosticKind::Info => "info",
        };
        write!(f, "at {}: {}: {}", self.span, kind, self.message)
    }
}

/// A collection of diagnostics accumulated during a checking pass.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    messages: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a warning.
    pub fn warning(&mut self, message: impl Into<String>, span: Span) {
        self.messages.push(Diagnostic {
            kind: DiagnosticKind::Warning,
            message: message.into(),
            span,
        });
    }

    /// Record an informational message.
    pub fn info(&mut self, message: impl Into<String>, span: Span) {
        self.messages.push(Diagnostic {
            kind: DiagnosticKind::Info,
            message: message.into(),
            span,
        });
    }

    /// Whether any warnings were recorded.
    pub fn has_warnings(&self) -> bool {
        self.messages
            .iter()
            .any(|d| d.kind == DiagnosticKind::Warning)
    }

    /// All recorded diagnostics, in emission order.
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.messages.iter()
    }

    /// Number of recorded diagnostics.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
