//! The result of checking an expression: its type and value category.

use cminus_core::TypeId;
use cminus_types::TypeInterner;

/// Whether an expression designates an object or a plain value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueCategory {
    LValue,
    RValue,
}

/// Type and value category of a checked expression.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExprInfo {
    pub ty: TypeId,
    pub category: ValueCategory,
}

impl ExprInfo {
    pub fn lvalue(ty: TypeId) -> Self {
        Self {
            ty,
            category: ValueCategory::LValue,
        }
    }

    pub fn rvalue(ty: TypeId) -> Self {
        Self {
            ty,
            category: ValueCategory::RValue,
        }
    }

    pub fn is_lvalue(self) -> bool {
        self.category == ValueCategory::LValue
    }

    /// Rendering for error messages, e.g. `lvalue of type const int`.
    pub fn describe(self, types: &TypeInterner) -> String {
        let cat = match self.category {
            ValueCategory::LValue => "lvalue",
            ValueCategory::RValue => "rvalue",
        };
        format!("{} of type {}", cat, types.display(self.ty))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describe_renders_category_and_type() {
        let mut types = TypeInterner::new();
        let const_int = types.int_ty(true);
        let info = ExprInfo::lvalue(const_int);
        assert_eq!(info.describe(&types), "lvalue of type const int");
        assert!(info.is_lvalue());
        assert!(!ExprInfo::rvalue(const_int).is_lvalue());
    }
}
