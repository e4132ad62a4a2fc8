//! Statement nodes.

use cminus_core::Span;

use crate::decl::SimpleDeclaration;
use crate::expr::Expr;

/// A statement node.
#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    pub span: Span,
    pub kind: StmtKind,
}

/// The closed set of statement forms.
#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    /// A local declaration, e.g. `int a = 5;`.
    Declaration(SimpleDeclaration),

    /// An expression statement; `None` for a bare `;`.
    Expr(Option<Expr>),

    /// `break` / `break n`: how many enclosing loops to break out of.
    Break { level: usize },

    /// `continue` / `continue n`: which enclosing loop to continue in.
    Continue { level: usize },

    Return(Option<Expr>),

    Compound(Vec<Stmt>),

    If {
        cond: Condition,
        body: Box<Stmt>,
        else_body: Option<Box<Stmt>>,
    },

    While {
        cond: Condition,
        body: Box<Stmt>,
    },

    DoWhile {
        cond: Condition,
        body: Box<Stmt>,
    },

    For {
        init: ForInit,
        cond: Option<Condition>,
        post_iter: Option<Expr>,
        body: Box<Stmt>,
    },
}

impl Stmt {
    pub fn new(span: Span, kind: StmtKind) -> Self {
        Self { span, kind }
    }
}

/// A loop or branch condition.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub span: Span,
    pub expr: Expr,
}

/// The initializer clause of a `for` loop.
#[derive(Debug, Clone, PartialEq)]
pub enum ForInit {
    /// An expression statement; `None` for a bare `;`.
    Expr(Option<Expr>),
    /// A declaration, e.g. `for (int i = 0; ...)`.
    Declaration(SimpleDeclaration),
}
