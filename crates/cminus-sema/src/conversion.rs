//! Implicit and explicit convertibility between types.
//!
//! [`TypeMatch`] grades how well an rvalue of one type converts to
//! another; overload resolution compares the grades, and the checker
//! uses them to decide whether a conversion node is needed at all.

use cminus_core::TypeId;
use cminus_types::TypeInterner;

/// How an rvalue of one type can become an rvalue of another.
///
/// The order matters: a smaller variant is a better match, and candidate
/// ranking compares them with `<`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TypeMatch {
    /// The types are equal modulo outermost const, e.g. `const int` and
    /// `int`.
    Exact = 0,
    /// The destination's element type has extra const qualification,
    /// e.g. `int *` to `const int *`.
    Const = 1,
    /// A value conversion is required, e.g. `int` to `double`.
    Conversion = 2,
    /// No implicit conversion exists, e.g. `int` to `int *`.
    None = 3,
}

/// Grade the implicit conversion from an rvalue of `start` to `dest`.
pub fn implicit_match(types: &TypeInterner, start: TypeId, dest: TypeId) -> TypeMatch {
    if types.unqualified_eq(start, dest) {
        return TypeMatch::Exact;
    }
    if types.const_stronger_elem(dest, start) {
        return TypeMatch::Const;
    }

    let start_ptr = types.as_pointer(start);
    let dest_ptr = types.as_pointer(dest);
    let convertible =
        // 'T *' -> 'void *'
        (start_ptr.is_some()
            && dest_ptr.is_some_and(|(pointee, _)| types.is_void(pointee)))
        // 'nullptr_t' -> 'T *'
        || (dest_ptr.is_some() && types.is_nullptr(start))
        // pointer or numeric -> 'bool'
        || (types.is_bool(dest) && (start_ptr.is_some() || types.is_numerical(start)))
        // integral promotions and demotions
        || (types.is_integral(start) && types.is_integral(dest))
        // 'int' <-> 'double'
        || (types.is_int(start) && types.is_double(dest))
        || (types.is_double(start) && types.is_int(dest));

    if convertible {
        TypeMatch::Conversion
    } else {
        TypeMatch::None
    }
}

/// Whether an explicit (C-style) cast from `start` to `dest` is allowed:
/// any implicit conversion, or any pointer-to-pointer reinterpretation.
pub fn explicit_convertible(types: &TypeInterner, start: TypeId, dest: TypeId) -> bool {
    implicit_match(types, start, dest) != TypeMatch::None
        || (types.as_pointer(start).is_some() && types.as_pointer(dest).is_some())
}

/// Whether match list `m1` is at least as good as `m2`.
///
/// Element-wise, no grade of `m1` may be worse. A shorter list reaches
/// into variadic parameters, which is always worse, so `m1` must also be
/// at least as long as `m2`.
pub fn better_or_same_match(m1: &[TypeMatch], m2: &[TypeMatch]) -> bool {
    let len = m1.len().min(m2.len());
    for i in 0..len {
        if m1[i] > m2[i] {
            return false;
        }
    }
    m1.len() >= m2.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_ignores_outer_const() {
        let mut types = TypeInterner::new();
        let int = types.int_ty(false);
        let const_int = types.int_ty(true);
        assert_eq!(implicit_match(&types, int, const_int), TypeMatch::Exact);
        assert_eq!(implicit_match(&types, const_int, int), TypeMatch::Exact);
    }

    #[test]
    fn adding_element_const_is_a_const_match() {
        let mut types = TypeInterner::new();
        let int = types.int_ty(false);
        let const_int = types.int_ty(true);
        let p = types.pointer(int, false);
        let cp = types.pointer(const_int, false);
        assert_eq!(implicit_match(&types, p, cp), TypeMatch::Const);
        // dropping const is not implicit
        assert_eq!(implicit_match(&types, cp, p), TypeMatch::None);
    }

    #[test]
    fn standard_conversions() {
        let mut types = TypeInterner::new();
        let int = types.int_ty(false);
        let ch = types.char_ty(false);
        let b = types.bool_ty(false);
        let d = types.double_ty(false);
        let void = types.void_ty();
        let int_ptr = types.pointer(int, false);
        let void_ptr = types.pointer(void, false);
        let nullptr = types.nullptr_ty();

        assert_eq!(implicit_match(&types, int, d), TypeMatch::Conversion);
        assert_eq!(implicit_match(&types, d, int), TypeMatch::Conversion);
        assert_eq!(implicit_match(&types, ch, int), TypeMatch::Conversion);
        assert_eq!(implicit_match(&types, int, b), TypeMatch::Conversion);
        assert_eq!(implicit_match(&types, int_ptr, b), TypeMatch::Conversion);
        assert_eq!(implicit_match(&types, int_ptr, void_ptr), TypeMatch::Conversion);
        assert_eq!(implicit_match(&types, nullptr, int_ptr), TypeMatch::Conversion);

        // double <-> char has no direct conversion
        assert_eq!(implicit_match(&types, d, ch), TypeMatch::None);
        assert_eq!(implicit_match(&types, int, int_ptr), TypeMatch::None);
    }

    #[test]
    fn explicit_casts_allow_pointer_reinterpretation() {
        let mut types = TypeInterner::new();
        let int = types.int_ty(false);
        let d = types.double_ty(false);
        let int_ptr = types.pointer(int, false);
        let double_ptr = types.pointer(d, false);

        assert!(explicit_convertible(&types, int_ptr, double_ptr));
        assert!(!explicit_convertible(&types, int, int_ptr));
    }

    #[test]
    fn match_lists_compare_element_wise() {
        use TypeMatch::*;
        assert!(better_or_same_match(&[Exact, Exact], &[Exact, Conversion]));
        assert!(!better_or_same_match(&[Exact, Conversion], &[Exact, Exact]));
        // incomparable both ways
        assert!(!better_or_same_match(&[Exact, Conversion], &[Conversion, Exact]));
        assert!(!better_or_same_match(&[Conversion, Exact], &[Exact, Conversion]));
    }

    #[test]
    fn reaching_into_varargs_is_worse() {
        use TypeMatch::*;
        // the shorter list taps into variadic parameters
        assert!(better_or_same_match(&[Exact, Exact], &[Exact]));
        assert!(!better_or_same_match(&[Exact], &[Exact, Exact]));
    }
}
