//! The type interner: structural descriptors canonicalized to handles.

use std::fmt::Write as _;

use cminus_core::TypeId;
use rustc_hash::FxHashMap;

use crate::primitives;

/// A structural type descriptor.
///
/// Owned exclusively by the [`TypeInterner`]; everything else refers to
/// types by [`TypeId`]. Never mutated after interning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Type {
    /// A named type: a builtin (`int`, `double`, ...) or a class.
    Simple {
        /// The type name.
        name: String,
        /// Whether the type is const-qualified.
        is_const: bool,
    },
    /// A pointer type.
    Pointer {
        /// The pointed-to type.
        pointee: TypeId,
        /// Whether the pointer itself is const (`T * const`).
        is_const: bool,
    },
    /// An array type. Arrays carry no const qualifier of their own; the
    /// element type does.
    Array {
        /// The element type.
        elem: TypeId,
        /// Number of elements, if known.
        size: Option<u64>,
    },
    /// A function type.
    Function {
        /// The return type.
        ret: TypeId,
        /// Declared parameter types, in order. For methods this includes
        /// the implicit receiver pointer as the first parameter.
        params: Vec<TypeId>,
        /// Whether the function accepts extra variadic arguments.
        vararg: bool,
    },
}

/// Canonicalizing factory for types.
///
/// `intern`-style constructors return the same handle for structurally
/// equal descriptors. Interning never fails and nothing is ever removed.
#[derive(Debug, Default)]
pub struct TypeInterner {
    types: FxHashMap<TypeId, Type>,
}

impl TypeInterner {
    /// Create an empty interner.
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a simple (named) type.
    pub fn simple(&mut self, name: &str, is_const: bool) -> TypeId {
        let id = TypeId::from_simple(name, is_const);
        self.types.entry(id).or_insert_with(|| Type::Simple {
            name: name.to_string(),
            is_const,
        });
        id
    }

    /// Intern a pointer type.
    pub fn pointer(&mut self, pointee: TypeId, is_const: bool) -> TypeId {
        let id = TypeId::from_pointer(pointee, is_const);
        self.types
            .entry(id)
            .or_insert(Type::Pointer { pointee, is_const });
        id
    }

    /// Intern an array type.
    pub fn array(&mut self, elem: TypeId, size: Option<u64>) -> TypeId {
        let id = TypeId::from_array(elem, size);
        self.types.entry(id).or_insert(Type::Array { elem, size });
        id
    }

    /// Intern a function type.
    pub fn function(&mut self, ret: TypeId, params: Vec<TypeId>, vararg: bool) -> TypeId {
        let id = TypeId::from_function(ret, &params, vararg);
        self.types
            .entry(id)
            .or_insert(Type::Function { ret, params, vararg });
        id
    }

    /// Look up the descriptor behind a handle.
    pub fn get(&self, id: TypeId) -> Option<&Type> {
        self.types.get(&id)
    }

    // ==========================================================================
    // Primitive shortcuts
    // ==========================================================================

    /// The `int` type.
    pub fn int_ty(&mut self, is_const: bool) -> TypeId {
        self.simple(primitives::INT, is_const)
    }

    /// The `bool` type.
    pub fn bool_ty(&mut self, is_const: bool) -> TypeId {
        self.simple(primitives::BOOL, is_const)
    }

    /// The `char` type.
    pub fn char_ty(&mut self, is_const: bool) -> TypeId {
        self.simple(primitives::CHAR, is_const)
    }

    /// The `double` type.
    pub fn double_ty(&mut self, is_const: bool) -> TypeId {
        self.simple(primitives::DOUBLE, is_const)
    }

    /// The `void` type.
    pub fn void_ty(&mut self) -> TypeId {
        self.simple(primitives::VOID, false)
    }

    /// The type of the `nullptr` literal.
    pub fn nullptr_ty(&mut self) -> TypeId {
        self.simple(primitives::NULLPTR, false)
    }

    // ==========================================================================
    // Decomposition
    // ==========================================================================

    /// If `id` is a simple type, its name and constness.
    pub fn as_simple(&self, id: TypeId) -> Option<(&str, bool)> {
        match self.get(id)? {
            Type::Simple { name, is_const } => Some((name.as_str(), *is_const)),
            _ => None,
        }
    }

    /// If `id` is a pointer type, its pointee and constness.
    pub fn as_pointer(&self, id: TypeId) -> Option<(TypeId, bool)> {
        match self.get(id)? {
            Type::Pointer { pointee, is_const } => Some((*pointee, *is_const)),
            _ => None,
        }
    }

    /// If `id` is an array type, its element type and size.
    pub fn as_array(&self, id: TypeId) -> Option<(TypeId, Option<u64>)> {
        match self.get(id)? {
            Type::Array { elem, size } => Some((*elem, *size)),
            _ => None,
        }
    }

    /// If `id` is a function type, its return type, parameters, and
    /// vararg flag.
    pub fn as_function(&self, id: TypeId) -> Option<(TypeId, &[TypeId], bool)> {
        match self.get(id)? {
            Type::Function { ret, params, vararg } => Some((*ret, params.as_slice(), *vararg)),
            _ => None,
        }
    }

    // ==========================================================================
    // Rendering
    // ==========================================================================

    /// Human-readable rendering of a type, for error messages.
    pub fn display(&self, id: TypeId) -> String {
        match self.get(id) {
            None => format!("<unknown type {:?}>", id),
            Some(Type::Simple { name, is_const }) => {
                if *is_const {
                    format!("const {}", name)
                } else {
                    name.clone()
                }
            }
            Some(Type::Pointer { pointee, is_const }) => {
                let mut s = self.display(*pointee);
                s.push_str(" *");
                if *is_const {
                    s.push_str(" const");
                }
                s
            }
            Some(Type::Array { elem, size }) => {
                let mut s = self.display(*elem);
                match size {
                    Some(n) => {
                        let _ = write!(s, "[{}]", n);
                    }
                    None => s.push_str("[]"),
                }
                s
            }
            Some(Type::Function { ret, params, vararg }) => {
                let mut s = self.display(*ret);
                s.push('(');
                for (i, p) in params.iter().enumerate() {
                    if i > 0 {
                        s.push_str(", ");
                    }
                    s.push_str(&self.display(*p));
                }
                if *vararg {
                    if !params.is_empty() {
                        s.push_str(", ");
                    }
                    s.push_str("...");
                }
                s.push(')');
                s
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_is_idempotent() {
        let mut interner = TypeInterner::new();
        let a = interner.int_ty(false);
        let b = interner.simple("int", false);
        assert_eq!(a, b);

        let pa = interner.pointer(a, false);
        let pb = interner.pointer(b, false);
        assert_eq!(pa, pb);
    }

    #[test]
    fn distinct_types_get_distinct_handles() {
        let mut interner = TypeInterner::new();
        let int = interner.int_ty(false);
        let const_int = interner.int_ty(true);
        let double = interner.double_ty(false);
        assert_ne!(int, const_int);
        assert_ne!(int, double);

        let ptr = interner.pointer(int, false);
        let arr = interner.array(int, Some(5));
        assert_ne!(ptr, arr);
    }

    #[test]
    fn nested_structure_round_trips() {
        let mut interner = TypeInterner::new();
        let int = interner.int_ty(false);
        let ptr = interner.pointer(int, true);
        let (pointee, is_const) = interner.as_pointer(ptr).unwrap();
        assert_eq!(pointee, int);
        assert!(is_const);

        let func = interner.function(int, vec![int, ptr], true);
        let (ret, params, vararg) = interner.as_function(func).unwrap();
        assert_eq!(ret, int);
        assert_eq!(params, &[int, ptr]);
        assert!(vararg);
    }

    #[test]
    fn display_renders_structure() {
        let mut interner = TypeInterner::new();
        let int = interner.int_ty(false);
        let const_int = interner.int_ty(true);
        let ptr = interner.pointer(const_int, false);
        let arr = interner.array(int, Some(3));
        let func = interner.function(int, vec![ptr], true);

        assert_eq!(interner.display(const_int), "const int");
        assert_eq!(interner.display(ptr), "const int *");
        assert_eq!(interner.display(arr), "int[3]");
        assert_eq!(interner.display(func), "int(const int *, ...)");
    }
}
