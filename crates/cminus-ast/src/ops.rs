//! Operator kinds and their classification.

use std::fmt;

/// A binary operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    // arithmetic
    Plus,
    Minus,
    Star,
    Div,
    Mod,
    // bit-wise
    And,
    Or,
    Caret,
    LeftShift,
    RightShift,
    // comparison
    Greater,
    Less,
    GreaterEqual,
    LessEqual,
    Equal,
    NotEqual,
    // logical
    LogicalAnd,
    LogicalOr,
}

impl BinaryOp {
    /// `+ - * / %`
    pub fn is_arithmetic(self) -> bool {
        matches!(
            self,
            Self::Plus | Self::Minus | Self::Star | Self::Div | Self::Mod
        )
    }

    /// `& | ^ << >>`
    pub fn is_bitwise(self) -> bool {
        matches!(
            self,
            Self::And | Self::Or | Self::Caret | Self::LeftShift | Self::RightShift
        )
    }

    /// `== != > < >= <=`
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            Self::Equal
                | Self::NotEqual
                | Self::Greater
                | Self::Less
                | Self::GreaterEqual
                | Self::LessEqual
        )
    }

    /// `&& ||`
    pub fn is_logical(self) -> bool {
        matches!(self, Self::LogicalAnd | Self::LogicalOr)
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Plus => "+",
            Self::Minus => "-",
            Self::Star => "*",
            Self::Div => "/",
            Self::Mod => "%",
            Self::And => "&",
            Self::Or => "|",
            Self::Caret => "^",
            Self::LeftShift => "<<",
            Self::RightShift => ">>",
            Self::Greater => ">",
            Self::Less => "<",
            Self::GreaterEqual => ">=",
            Self::LessEqual => "<=",
            Self::Equal => "==",
            Self::NotEqual => "!=",
            Self::LogicalAnd => "&&",
            Self::LogicalOr => "||",
        };
        f.write_str(s)
    }
}

/// A unary operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// Dereference `*e`.
    Deref,
    /// Address-of `&e`.
    AddrOf,
    /// Unary plus `+e`.
    Plus,
    /// Unary minus `-e`.
    Minus,
    /// Bit-wise negation `~e`.
    BitNot,
    /// Logical negation `!e`.
    Not,
    /// Pre-increment `++e`.
    PreIncr,
    /// Pre-decrement `--e`.
    PreDecr,
    /// `sizeof e` applied to an expression.
    Sizeof,
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Deref => "*",
            Self::AddrOf => "&",
            Self::Plus => "+",
            Self::Minus => "-",
            Self::BitNot => "~",
            Self::Not => "!",
            Self::PreIncr => "++",
            Self::PreDecr => "--",
            Self::Sizeof => "sizeof",
        };
        f.write_str(s)
    }
}

/// An assignment operator, plain or compound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    Assign,
    PlusAssign,
    MinusAssign,
    StarAssign,
    DivAssign,
    ModAssign,
    AndAssign,
    OrAssign,
    CaretAssign,
    LeftShiftAssign,
    RightShiftAssign,
}

impl AssignOp {
    /// The binary operator a compound assignment applies before storing.
    /// `None` for plain `=`.
    pub fn compute_op(self) -> Option<BinaryOp> {
        match self {
            Self::Assign => None,
            Self::PlusAssign => Some(BinaryOp::Plus),
            Self::MinusAssign => Some(BinaryOp::Minus),
            Self::StarAssign => Some(BinaryOp::Star),
            Self::DivAssign => Some(BinaryOp::Div),
            Self::ModAssign => Some(BinaryOp::Mod),
            Self::AndAssign => Some(BinaryOp::And),
            Self::OrAssign => Some(BinaryOp::Or),
            Self::CaretAssign => Some(BinaryOp::Caret),
            Self::LeftShiftAssign => Some(BinaryOp::LeftShift),
            Self::RightShiftAssign => Some(BinaryOp::RightShift),
        }
    }
}

impl fmt::Display for AssignOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Assign => "=",
            Self::PlusAssign => "+=",
            Self::MinusAssign => "-=",
            Self::StarAssign => "*=",
            Self::DivAssign => "/=",
            Self::ModAssign => "%=",
            Self::AndAssign => "&=",
            Self::OrAssign => "|=",
            Self::CaretAssign => "^=",
            Self::LeftShiftAssign => "<<=",
            Self::RightShiftAssign => ">>=",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binary_op_classes_are_disjoint() {
        let all = [
            BinaryOp::Plus,
            BinaryOp::Minus,
            BinaryOp::Star,
            BinaryOp::Div,
            BinaryOp::Mod,
            BinaryOp::And,
            BinaryOp::Or,
            BinaryOp::Caret,
            BinaryOp::LeftShift,
            BinaryOp::RightShift,
            BinaryOp::Greater,
            BinaryOp::Less,
            BinaryOp::GreaterEqual,
            BinaryOp::LessEqual,
            BinaryOp::Equal,
            BinaryOp::NotEqual,
            BinaryOp::LogicalAnd,
            BinaryOp::LogicalOr,
        ];
        for op in all {
            let classes = [
                op.is_arithmetic(),
                op.is_bitwise(),
                op.is_comparison(),
                op.is_logical(),
            ];
            assert_eq!(classes.iter().filter(|&&c| c).count(), 1, "{op}");
        }
    }

    #[test]
    fn compound_assign_maps_to_compute_op() {
        assert_eq!(AssignOp::Assign.compute_op(), None);
        assert_eq!(AssignOp::PlusAssign.compute_op(), Some(BinaryOp::Plus));
        assert_eq!(
            AssignOp::LeftShiftAssign.compute_op(),
            Some(BinaryOp::LeftShift)
        );
    }
}
