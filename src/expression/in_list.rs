//! Membership test evaluated by a linear scan over the candidates.

use crate::access::Value;
use crate::expression::{Expression, ExpressionError, ExpressionEvaluator, ExpressionResult};
use std::cmp::Ordering;
use std::fmt;

/// Access to the two operands of a binary predicate.
///
/// Membership predicates expose their operands through this trait but have no
/// ordering of their own, so they are never usable where a comparison result
/// is expected.
pub trait BinaryOperands {
    fn left(&self) -> &Expression;
    fn right(&self) -> &Expression;
}

/// `left IN right`, where `right` is a tuple of candidate expressions
#[derive(Debug, Clone, PartialEq)]
pub struct InList {
    left: Box<Expression>,
    right: Box<Expression>,
}

impl InList {
    pub fn new(left: Expression, right: Expression) -> Self {
        Self {
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Evaluate with SQL three-valued semantics: `true` on the first match,
    /// otherwise NULL if any candidate was NULL (or compared as unknown),
    /// otherwise `false`.
    pub fn evaluate(&self, evaluator: &ExpressionEvaluator<'_>) -> ExpressionResult<Value> {
        let left = evaluator.evaluate(&self.left)?;
        if left.is_null() {
            return Ok(Value::Null);
        }

        let comparison_type = self.left.data_type().promote();
        let left_columns = comparison_type.num_columns();

        let candidates = match self.right.as_ref() {
            Expression::Tuple(candidates) => candidates,
            other => {
                return Err(ExpressionError::UnsupportedOperandShape {
                    context: "IN",
                    expected: "a tuple of candidates",
                    operand: other.to_string(),
                    data_type: other.data_type(),
                })
            }
        };

        let left = comparison_type.convert(&left)?;
        let mut saw_null = false;

        for candidate in candidates {
            let candidate_type = candidate.data_type();
            let columns = candidate_type.num_columns();
            if columns != left_columns {
                return Err(ExpressionError::ArityMismatch {
                    expected: left_columns,
                    actual: columns,
                    operand: candidate.to_string(),
                    data_type: candidate_type,
                });
            }

            let value = evaluator.evaluate(candidate)?;
            if value.is_null() {
                saw_null = true;
                continue;
            }

            match comparison_type.compare(&left, &value)? {
                Some(Ordering::Equal) => return Ok(Value::Boolean(true)),
                Some(_) => {}
                None => saw_null = true,
            }
        }

        if saw_null {
            Ok(Value::Null)
        } else {
            Ok(Value::Boolean(false))
        }
    }
}

impl BinaryOperands for InList {
    fn left(&self) -> &Expression {
        &self.left
    }

    fn right(&self) -> &Expression {
        &self.right
    }
}

impl fmt::Display for InList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({} IN {})", self.left, self.right)
    }
}
