//! Expression nodes.

use cminus_core::{DeclId, ExprId, Span, TypeId};

use crate::ops::{AssignOp, BinaryOp, UnaryOp};

/// An expression node: a source location plus the expression itself.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub span: Span,
    pub kind: ExprKind,
}

/// The closed set of expression forms.
///
/// The variants after `Member` never come out of the parser; the checker
/// inserts them to make implicit operations explicit.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    // ==========================================================================
    // Literals
    // ==========================================================================
    IntLit(u64),
    CharLit(char),
    BoolLit(bool),
    FloatLit(f64),
    StringLit(String),
    NullptrLit,

    /// A name used in expression position.
    ///
    /// Before checking this can also name a class member accessed from
    /// inside a method; the checker rewrites those into an explicit
    /// member access on [`ExprKind::ImplicitThis`]. Afterwards `decl`
    /// points at the resolved declaration.
    Ident {
        name: String,
        decl: Option<DeclId>,
    },

    /// Explicit `this` inside a method.
    This,

    /// `sizeof(type)` with a type operand. `sizeof expr` is
    /// [`ExprKind::Unary`] with [`UnaryOp::Sizeof`].
    SizeofType(TypeId),

    // ==========================================================================
    // Compound expressions
    // ==========================================================================
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },

    Assign {
        op: AssignOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
        /// For compound assignment, the type the loaded left operand is
        /// converted to before the compute operation. Set by the checker.
        operand_ty: Option<TypeId>,
    },

    Comma {
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },

    /// A function, method, or constructor call.
    Call {
        /// An [`ExprKind::Ident`] or [`ExprKind::Member`].
        callee: Box<Expr>,
        args: Vec<Expr>,
        /// Whether this turned out to be a constructor call. Set by the
        /// checker.
        ctor_call: bool,
        /// The overload the call resolved to. Set by the checker.
        resolved: Option<DeclId>,
    },

    Index {
        object: Box<Expr>,
        index: Box<Expr>,
    },

    Ternary {
        cond: Box<Expr>,
        then_val: Box<Expr>,
        else_val: Box<Expr>,
    },

    /// Post-increment (`incr`) or post-decrement.
    PostIncr {
        operand: Box<Expr>,
        incr: bool,
    },

    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },

    /// An explicit C-style cast `(T) e`.
    Cast {
        to: TypeId,
        operand: Box<Expr>,
    },

    /// Member access `e.name` or `e->name` (`arrow`).
    Member {
        object: Box<Expr>,
        arrow: bool,
        name: String,
        /// The member declaration this resolved to. Set by the checker.
        decl: Option<DeclId>,
    },

    // ==========================================================================
    // Checker-inserted nodes
    // ==========================================================================
    /// The implicit `this->` in front of a member used bare inside a
    /// method body.
    ImplicitThis,

    /// A default argument materialized at a call site. The expression is
    /// owned by the checker's default-argument arena and shared by every
    /// call site of the same parameter.
    DefaultArg(ExprId),

    /// An implicit type conversion to `to`.
    ImplicitCast {
        to: TypeId,
        operand: Box<Expr>,
    },

    /// An lvalue loaded for use as a value.
    LValueToRValue(Box<Expr>),

    /// An array decaying to a pointer to its first element.
    ArrayToPointer(Box<Expr>),
}

impl Expr {
    pub fn new(span: Span, kind: ExprKind) -> Self {
        Self { span, kind }
    }

    /// Replace this expression with a wrapper built around it.
    ///
    /// The closure receives the old expression boxed and returns the new
    /// kind; the span is kept. This is how the checker inserts implicit
    /// conversion nodes without re-owning the tree.
    pub fn wrap(&mut self, build: impl FnOnce(Box<Expr>) -> ExprKind) {
        let kind = std::mem::replace(&mut self.kind, ExprKind::NullptrLit);
        let inner = Box::new(Expr::new(self.span, kind));
        self.kind = build(inner);
    }

    /// Whether this is a string literal, looking through wrapper nodes
    /// the checker may already have inserted.
    pub fn is_string_literal(&self) -> bool {
        match &self.kind {
            ExprKind::StringLit(_) => true,
            ExprKind::LValueToRValue(inner) | ExprKind::ArrayToPointer(inner) => {
                inner.is_string_literal()
            }
            _ => false,
        }
    }
}
