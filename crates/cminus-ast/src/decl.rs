//! Declaration, function, and class nodes.

use cminus_core::{DeclId, ExprId, Span, TypeId};

use crate::expr::Expr;
use crate::stmt::Stmt;

/// The root of a parsed program: the top-level declarations in order.
#[derive(Debug, Clone, PartialEq)]
pub struct TranslationUnit {
    pub span: Span,
    pub declarations: Vec<Declaration>,
}

/// Anything that can appear at the top level.
#[derive(Debug, Clone, PartialEq)]
pub enum Declaration {
    Simple(SimpleDeclaration),
    Function(FunctionDef),
    Class(ClassDef),
    /// An extraneous semicolon.
    Empty(Span),
}

/// One or more declarators sharing a declaration specifier sequence,
/// e.g. `int a = 5, *p, foo(char c);`.
#[derive(Debug, Clone, PartialEq)]
pub struct SimpleDeclaration {
    pub span: Span,
    pub declarators: Vec<InitDeclarator>,
}

/// A declarator with an optional initializer.
#[derive(Debug, Clone, PartialEq)]
pub struct InitDeclarator {
    pub span: Span,
    pub declarator: Declarator,
    pub initializer: Option<Expr>,
}

/// A single declarator: a name bound to a type.
///
/// Covers variables, parameters, class fields, and function declarators.
/// For a function declarator `ty` is a function type and `params` carries
/// the parameter list; otherwise `params` is empty.
#[derive(Debug, Clone, PartialEq)]
pub struct Declarator {
    pub span: Span,
    pub name: String,
    pub ty: TypeId,
    pub params: Vec<Param>,
    /// The arena declaration this declarator produced or, for a function
    /// redeclaration, the canonical first declaration. Set by the
    /// checker.
    pub declared: Option<DeclId>,
}

impl Declarator {
    pub fn new(span: Span, name: impl Into<String>, ty: TypeId) -> Self {
        Self {
            span,
            name: name.into(),
            ty,
            params: Vec::new(),
            declared: None,
        }
    }
}

/// A function parameter, e.g. the `int a = 5` in `int foo(int a = 5)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub span: Span,
    pub declarator: Declarator,
    pub default: Option<DefaultValue>,
}

/// A parameter's default argument.
///
/// Parsed defaults start out [`DefaultValue::Raw`]. When the checker
/// accepts one it converts the expression and moves it into its
/// default-argument arena; every call site then shares the checked
/// expression through the [`DefaultValue::Checked`] handle.
#[derive(Debug, Clone, PartialEq)]
pub enum DefaultValue {
    Raw(Box<Expr>),
    Checked(ExprId),
}

/// A function definition: a global function, a method, or a constructor.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDef {
    pub span: Span,
    pub declarator: Declarator,
    /// The body's compound statement.
    pub body: Vec<Stmt>,
    pub is_ctor: bool,
}

/// `class` or `struct`, which differ only in default member access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassKey {
    Class,
    Struct,
}

impl ClassKey {
    /// Member access before any access specifier appears.
    pub fn default_access(self) -> Access {
        match self {
            ClassKey::Class => Access::Private,
            ClassKey::Struct => Access::Public,
        }
    }
}

/// Member accessibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    Private,
}

/// A class or struct definition.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDef {
    pub span: Span,
    pub key: ClassKey,
    pub name: String,
    /// The class body items in source order; `None` for a forward-style
    /// definition with no body.
    pub members: Option<Vec<MemberSpec>>,
}

/// One item inside a class body.
#[derive(Debug, Clone, PartialEq)]
pub enum MemberSpec {
    /// An access specifier label, e.g. `public:`.
    Access(Access),
    /// A field declarator list, e.g. `int a, *p;`. Fields cannot carry
    /// initializers.
    Fields(Vec<Declarator>),
    /// A method or constructor definition.
    Method(FunctionDef),
}
