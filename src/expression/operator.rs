//! Operators usable in predicates.

use crate::access::DataType;
use std::cmp::Ordering;
use std::fmt;

/// Binary operators: comparisons and the two logical connectives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOperator {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

impl BinaryOperator {
    pub fn is_comparison(&self) -> bool {
        self.accepts(Ordering::Equal).is_some()
    }

    /// Whether a comparison holds for two values ordered as `ordering`.
    /// `None` for AND and OR.
    pub fn accepts(&self, ordering: Ordering) -> Option<bool> {
        use BinaryOperator::*;
        Some(match self {
            Eq => ordering.is_eq(),
            Ne => ordering.is_ne(),
            Lt => ordering.is_lt(),
            Le => ordering.is_le(),
            Gt => ordering.is_gt(),
            Ge => ordering.is_ge(),
            And | Or => return None,
        })
    }

    /// Result type for operands of the given types, `None` if they don't fit.
    ///
    /// Comparisons need operands of equal width, since row values compare
    /// column by column; an untyped NULL fits any width.
    pub fn output_type(&self, left: &DataType, right: &DataType) -> Option<DataType> {
        let fits = if self.is_comparison() {
            left.is_null() || right.is_null() || left.num_columns() == right.num_columns()
        } else {
            is_truth_value(left) && is_truth_value(right)
        };
        fits.then_some(DataType::Boolean)
    }

    pub fn as_str(&self) -> &'static str {
        use BinaryOperator::*;
        match self {
            Eq => "=",
            Ne => "!=",
            Lt => "<",
            Le => "<=",
            Gt => ">",
            Ge => ">=",
            And => "AND",
            Or => "OR",
        }
    }
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOperator {
    Not,
    IsNull,
    IsNotNull,
}

impl UnaryOperator {
    /// Result type for an operand of the given type. The NULL tests accept
    /// anything.
    pub fn output_type(&self, operand: &DataType) -> Option<DataType> {
        let fits = match self {
            UnaryOperator::Not => is_truth_value(operand),
            UnaryOperator::IsNull | UnaryOperator::IsNotNull => true,
        };
        fits.then_some(DataType::Boolean)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UnaryOperator::Not => "NOT",
            UnaryOperator::IsNull => "IS NULL",
            UnaryOperator::IsNotNull => "IS NOT NULL",
        }
    }
}

impl fmt::Display for UnaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn is_truth_value(data_type: &DataType) -> bool {
    matches!(data_type, DataType::Boolean | DataType::Null)
}
