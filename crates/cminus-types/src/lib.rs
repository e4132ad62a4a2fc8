//! Canonical type descriptors and the type interner.
//!
//! Every type in the analyzed program is represented by a [`TypeId`]
//! handle; the [`TypeInterner`] is the only component that creates them.
//! Interning is idempotent, so handle equality is structural equality and
//! type comparison is O(1). Handles are never invalidated: the interner
//! lives for the whole compilation.

mod interner;
mod queries;

pub use interner::{Type, TypeInterner};

pub use cminus_core::TypeId;

/// Names of the built-in simple types.
pub mod primitives {
    /// The signed integer type.
    pub const INT: &str = "int";
    /// The character type.
    pub const CHAR: &str = "char";
    /// The boolean type.
    pub const BOOL: &str = "bool";
    /// The floating-point type.
    pub const DOUBLE: &str = "double";
    /// The unit type of functions that return nothing.
    pub const VOID: &str = "void";
    /// The type of the `nullptr` literal.
    pub const NULLPTR: &str = "nullptr_t";

    /// All built-in simple type names.
    pub const ALL: &[&str] = &[INT, CHAR, BOOL, DOUBLE, VOID, NULLPTR];
}
