//! Type predicates and const-qualification algebra.
//!
//! These are the queries the conversion engine and checker lean on. They
//! are all pure probes: they never fail, and only the ones that may need
//! to intern a new descriptor take `&mut self`.

use cminus_core::TypeId;

use crate::interner::{Type, TypeInterner};
use crate::primitives;

impl TypeInterner {
    fn is_named(&self, id: TypeId, name: &str) -> bool {
        matches!(self.as_simple(id), Some((n, _)) if n == name)
    }

    /// Whether `id` is `void` (any constness).
    pub fn is_void(&self, id: TypeId) -> bool {
        self.is_named(id, primitives::VOID)
    }

    /// Whether `id` is `int` (any constness).
    pub fn is_int(&self, id: TypeId) -> bool {
        self.is_named(id, primitives::INT)
    }

    /// Whether `id` is `bool` (any constness).
    pub fn is_bool(&self, id: TypeId) -> bool {
        self.is_named(id, primitives::BOOL)
    }

    /// Whether `id` is `char` (any constness).
    pub fn is_char(&self, id: TypeId) -> bool {
        self.is_named(id, primitives::CHAR)
    }

    /// Whether `id` is `double` (any constness).
    pub fn is_double(&self, id: TypeId) -> bool {
        self.is_named(id, primitives::DOUBLE)
    }

    /// Whether `id` is the type of the `nullptr` literal.
    pub fn is_nullptr(&self, id: TypeId) -> bool {
        self.is_named(id, primitives::NULLPTR)
    }

    /// Whether `id` is an integral type (`int`, `char`, `bool`).
    pub fn is_integral(&self, id: TypeId) -> bool {
        self.is_int(id) || self.is_char(id) || self.is_bool(id)
    }

    /// Whether `id` is a floating-point type.
    pub fn is_floating(&self, id: TypeId) -> bool {
        self.is_double(id)
    }

    /// Whether `id` is a numeric type (integral or floating).
    pub fn is_numerical(&self, id: TypeId) -> bool {
        self.is_integral(id) || self.is_floating(id)
    }

    /// Whether `id` carries a const qualifier at its outermost level.
    ///
    /// Only simple and pointer types can be const; arrays and functions
    /// are never const themselves.
    pub fn is_const(&self, id: TypeId) -> bool {
        match self.get(id) {
            Some(Type::Simple { is_const, .. }) => *is_const,
            Some(Type::Pointer { is_const, .. }) => *is_const,
            _ => false,
        }
    }

    /// `id` with the outermost const qualifier stripped (if any).
    pub fn const_unqualified(&mut self, id: TypeId) -> TypeId {
        match self.get(id) {
            Some(Type::Simple { name, is_const: true }) => {
                let name = name.clone();
                self.simple(&name, false)
            }
            Some(Type::Pointer { pointee, is_const: true }) => {
                let pointee = *pointee;
                self.pointer(pointee, false)
            }
            _ => id,
        }
    }

    /// Whether two types are equal modulo the outermost const qualifier.
    pub fn unqualified_eq(&self, a: TypeId, b: TypeId) -> bool {
        if a == b {
            return true;
        }
        match (self.get(a), self.get(b)) {
            (
                Some(Type::Simple { name: n1, .. }),
                Some(Type::Simple { name: n2, .. }),
            ) => n1 == n2,
            (
                Some(Type::Pointer { pointee: p1, .. }),
                Some(Type::Pointer { pointee: p2, .. }),
            ) => p1 == p2,
            _ => false,
        }
    }

    /// Whether two types are similar: the same shape when stripped of
    /// const qualifiers at every level.
    ///
    /// Function types are only similar when identical.
    pub fn similar(&self, mut a: TypeId, mut b: TypeId) -> bool {
        loop {
            if a == b {
                return true;
            }
            match (self.get(a), self.get(b)) {
                (
                    Some(Type::Simple { name: n1, .. }),
                    Some(Type::Simple { name: n2, .. }),
                ) => return n1 == n2,
                (
                    Some(Type::Pointer { pointee: p1, .. }),
                    Some(Type::Pointer { pointee: p2, .. }),
                ) => {
                    a = *p1;
                    b = *p2;
                }
                (
                    Some(Type::Array { elem: e1, size: s1 }),
                    Some(Type::Array { elem: e2, size: s2 }),
                ) => {
                    if s1 != s2 {
                        return false;
                    }
                    a = *e1;
                    b = *e2;
                }
                _ => return false,
            }
        }
    }

    /// Whether `a` and `b` are the same pointer/array shape except that
    /// `a`'s element type is const-qualified and `b`'s is not.
    ///
    /// e.g. `const int *` vs `int *`, or `const int[5]` vs `int[5]`.
    pub fn const_stronger_elem(&self, a: TypeId, b: TypeId) -> bool {
        let (e1, e2) = match (self.get(a), self.get(b)) {
            (
                Some(Type::Pointer { pointee: p1, .. }),
                Some(Type::Pointer { pointee: p2, .. }),
            ) => (*p1, *p2),
            (
                Some(Type::Array { elem: e1, size: s1 }),
                Some(Type::Array { elem: e2, size: s2 }),
            ) if s1 == s2 => (*e1, *e2),
            _ => return false,
        };
        self.is_const(e1) && !self.is_const(e2) && self.unqualified_eq(e1, e2)
    }

    /// Const-qualify the first constable level of `id`.
    ///
    /// Used for members of const class instances. Arrays cannot be const,
    /// so the qualification applies to the underlying element type.
    /// Function types are returned unchanged.
    pub fn const_qualified(&mut self, mut id: TypeId) -> TypeId {
        while let Some((elem, _)) = self.as_array(id) {
            id = elem;
        }
        match self.get(id) {
            Some(Type::Pointer { pointee, is_const: false }) => {
                let pointee = *pointee;
                self.pointer(pointee, true)
            }
            Some(Type::Simple { name, is_const: false }) => {
                let name = name.clone();
                self.simple(&name, true)
            }
            _ => id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integral_predicates() {
        let mut interner = TypeInterner::new();
        let int = interner.int_ty(false);
        let ch = interner.char_ty(false);
        let b = interner.bool_ty(false);
        let d = interner.double_ty(false);
        let ptr = interner.pointer(int, false);

        assert!(interner.is_integral(int));
        assert!(interner.is_integral(ch));
        assert!(interner.is_integral(b));
        assert!(!interner.is_integral(d));
        assert!(interner.is_numerical(d));
        assert!(!interner.is_numerical(ptr));
    }

    #[test]
    fn const_stripping() {
        let mut interner = TypeInterner::new();
        let int = interner.int_ty(false);
        let const_int = interner.int_ty(true);
        assert_eq!(interner.const_unqualified(const_int), int);
        assert_eq!(interner.const_unqualified(int), int);
        assert!(interner.unqualified_eq(int, const_int));

        let p = interner.pointer(const_int, true);
        let p_unq = interner.const_unqualified(p);
        let expected = interner.pointer(const_int, false);
        assert_eq!(p_unq, expected);
    }

    #[test]
    fn similar_ignores_const_at_depth() {
        let mut interner = TypeInterner::new();
        let int = interner.int_ty(false);
        let const_int = interner.int_ty(true);
        let p1 = interner.pointer(const_int, false);
        let p2 = interner.pointer(int, true);
        assert!(interner.similar(p1, p2));

        let double = interner.double_ty(false);
        let p3 = interner.pointer(double, false);
        assert!(!interner.similar(p1, p3));
    }

    #[test]
    fn const_stronger_elem_is_one_directional() {
        let mut interner = TypeInterner::new();
        let int = interner.int_ty(false);
        let const_int = interner.int_ty(true);
        let cp = interner.pointer(const_int, false);
        let p = interner.pointer(int, false);
        assert!(interner.const_stronger_elem(cp, p));
        assert!(!interner.const_stronger_elem(p, cp));
    }

    #[test]
    fn const_qualified_skips_arrays() {
        let mut interner = TypeInterner::new();
        let int = interner.int_ty(false);
        let arr = interner.array(int, Some(4));
        let const_int = interner.int_ty(true);
        assert_eq!(interner.const_qualified(arr), const_int);
        assert_eq!(interner.const_qualified(int), const_int);
        assert_eq!(interner.const_qualified(const_int), const_int);
    }
}
