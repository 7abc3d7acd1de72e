//! Membership test answered by probing a [`MembershipIndex`].

use crate::access::Value;
use crate::expression::canonical::{hash_of, MembershipIndex};
use crate::expression::in_list::{BinaryOperands, InList};
use crate::expression::{
    Expression, ExpressionError, ExpressionEvaluator, ExpressionResult, Literal,
};
use std::fmt;
use std::sync::Arc;

/// `left IN right` with the candidates preindexed by canonical key.
///
/// The index is shared between clones of the expression and never mutated
/// after it is built.
#[derive(Debug, Clone)]
pub struct HashInList {
    in_list: InList,
    index: Arc<MembershipIndex>,
}

impl HashInList {
    pub fn new(in_list: InList, index: MembershipIndex) -> Self {
        Self {
            in_list,
            index: Arc::new(index),
        }
    }

    /// Index the candidates of `left IN right`.
    ///
    /// Fails if the candidate set cannot be indexed; callers keep the scanning
    /// predicate in that case.
    pub fn try_new(left: Expression, right: Expression) -> ExpressionResult<Self> {
        let index = MembershipIndex::build(&right, &left.data_type())?;
        Ok(Self::new(InList::new(left, right), index))
    }

    pub fn in_list(&self) -> &InList {
        &self.in_list
    }

    pub fn index(&self) -> &MembershipIndex {
        &self.index
    }

    pub fn evaluate(&self, evaluator: &ExpressionEvaluator<'_>) -> ExpressionResult<Value> {
        if self.index.always_unknown() {
            return Ok(Value::Null);
        }

        let left = self.in_list.left();
        let probe = materialize(left, evaluator)?;
        if let Expression::Literal(lit) = &probe {
            if lit.value.is_null() {
                return Ok(Value::Null);
            }
        }
        if has_null_element(&probe) {
            // A partially NULL row can still compare unknown against some
            // candidates, which only the scan can tell.
            return self.in_list.evaluate(evaluator);
        }

        let left_type = left.data_type();
        let key = hash_of(&probe, &left_type)?;

        match self.index.probe(&key) {
            Some(candidate) => {
                let expected = left_type.num_columns();
                let candidate_type = candidate.data_type();
                if candidate_type.num_columns() != expected {
                    return Err(ExpressionError::ArityMismatch {
                        expected,
                        actual: candidate_type.num_columns(),
                        operand: candidate.to_string(),
                        data_type: candidate_type,
                    });
                }
                Ok(Value::Boolean(true))
            }
            None if self.index.has_null_candidate() => Ok(Value::Null),
            None => Ok(Value::Boolean(false)),
        }
    }
}

/// Whether `expr` can be materialized from a single row: a literal, a column
/// or a tuple of those. Only such left operands are ever hashed.
pub fn is_hashable_operand(expr: &Expression) -> bool {
    match expr {
        Expression::Literal(_) | Expression::ColumnRef(_) => true,
        Expression::Tuple(elements) => elements.iter().all(is_hashable_operand),
        _ => false,
    }
}

/// Replace column references with literals holding the current row's values
fn materialize(left: &Expression, evaluator: &ExpressionEvaluator<'_>) -> ExpressionResult<Expression> {
    left.clone().transform_up(&mut |expr| match expr {
        Expression::ColumnRef(col) => {
            let value = evaluator.evaluate_column_ref(&col)?;
            Ok(Expression::Literal(Literal::typed(value, col.data_type)))
        }
        Expression::Literal(_) | Expression::Tuple(_) => Ok(expr),
        other => Err(ExpressionError::UnsupportedOperandShape {
            context: "hash IN",
            expected: "a literal, a column or a tuple of them",
            operand: other.to_string(),
            data_type: other.data_type(),
        }),
    })
}

fn has_null_element(expr: &Expression) -> bool {
    match expr {
        Expression::Literal(lit) => lit.value.has_null_column(),
        Expression::Tuple(elements) => elements.iter().any(|e| match e {
            Expression::Literal(lit) => lit.value.is_null() || lit.value.has_null_column(),
            other => has_null_element(other),
        }),
        _ => false,
    }
}

impl BinaryOperands for HashInList {
    fn left(&self) -> &Expression {
        self.in_list.left()
    }

    fn right(&self) -> &Expression {
        self.in_list.right()
    }
}

// The index is derived from the operands, so equal operands mean equal nodes.
impl PartialEq for HashInList {
    fn eq(&self, other: &Self) -> bool {
        self.in_list == other.in_list
    }
}

impl fmt::Display for HashInList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({} HASH IN {})", self.in_list.left(), self.in_list.right())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::DataType;
    use crate::expression::evaluate_expression;

    fn int(v: i32) -> Expression {
        Expression::literal(Value::Int32(v))
    }

    fn x() -> Expression {
        Expression::column_with_name(0, "x", DataType::Int32)
    }

    fn y() -> Expression {
        Expression::column_with_name(1, "y", DataType::Int32)
    }

    fn hashed(left: Expression, candidates: Vec<Expression>) -> ExpressionResult<Expression> {
        Ok(Expression::HashInList(HashInList::try_new(
            left,
            Expression::tuple(candidates),
        )?))
    }

    #[test]
    fn test_agrees_with_scan_on_simple_list() -> ExpressionResult<()> {
        let candidates = vec![int(1), int(2), int(3)];
        let scan = Expression::in_list(x(), candidates.clone());
        let hash = hashed(x(), candidates)?;

        for probe in [2, 7] {
            let row = [Value::Int32(probe)];
            assert_eq!(evaluate_expression(&hash, &row)?, evaluate_expression(&scan, &row)?);
        }
        assert_eq!(evaluate_expression(&hash, &[Value::Int32(2)])?, Value::Boolean(true));
        assert_eq!(evaluate_expression(&hash, &[Value::Int32(7)])?, Value::Boolean(false));
        Ok(())
    }

    #[test]
    fn test_null_candidate_makes_miss_unknown() -> ExpressionResult<()> {
        let candidates = vec![int(1), int(2), Expression::literal(Value::Null)];
        let scan = Expression::in_list(x(), candidates.clone());
        let hash = hashed(x(), candidates)?;

        let row = [Value::Int32(5)];
        assert_eq!(evaluate_expression(&scan, &row)?, Value::Null);
        assert_eq!(evaluate_expression(&hash, &row)?, Value::Null);
        assert_eq!(evaluate_expression(&hash, &[Value::Int32(1)])?, Value::Boolean(true));

        // NOT IN follows: unknown stays unknown under negation
        let not_in = Expression::not_expr(hash);
        assert_eq!(evaluate_expression(&not_in, &row)?, Value::Null);
        Ok(())
    }

    #[test]
    fn test_null_left_is_unknown() -> ExpressionResult<()> {
        let hash = hashed(x(), vec![int(1)])?;
        assert_eq!(evaluate_expression(&hash, &[Value::Null])?, Value::Null);
        Ok(())
    }

    #[test]
    fn test_null_typed_left_is_always_unknown() -> ExpressionResult<()> {
        let hash = hashed(Expression::literal(Value::Null), vec![int(1)])?;
        assert_eq!(evaluate_expression(&hash, &[])?, Value::Null);
        Ok(())
    }

    #[test]
    fn test_mixed_widths_match() -> ExpressionResult<()> {
        let hash = hashed(
            x(),
            vec![Expression::literal(Value::Int64(5)), Expression::literal(Value::Int16(6))],
        )?;
        assert_eq!(evaluate_expression(&hash, &[Value::Int32(5)])?, Value::Boolean(true));
        assert_eq!(evaluate_expression(&hash, &[Value::Int32(6)])?, Value::Boolean(true));
        assert_eq!(evaluate_expression(&hash, &[Value::Int32(7)])?, Value::Boolean(false));
        Ok(())
    }

    #[test]
    fn test_row_values() -> ExpressionResult<()> {
        let left = Expression::tuple(vec![x(), y()]);
        let hash = hashed(
            left,
            vec![
                Expression::tuple(vec![int(1), int(2)]),
                Expression::tuple(vec![int(3), int(4)]),
            ],
        )?;
        assert_eq!(
            evaluate_expression(&hash, &[Value::Int32(3), Value::Int32(4)])?,
            Value::Boolean(true)
        );
        assert_eq!(
            evaluate_expression(&hash, &[Value::Int32(3), Value::Int32(2)])?,
            Value::Boolean(false)
        );
        Ok(())
    }

    #[test]
    fn test_row_with_null_column_matches_scan() -> ExpressionResult<()> {
        let left = Expression::tuple(vec![x(), y()]);
        let candidates = vec![
            Expression::tuple(vec![int(1), int(2)]),
            Expression::tuple(vec![int(3), int(4)]),
        ];
        let scan = Expression::in_list(left.clone(), candidates.clone());
        let hash = hashed(left, candidates)?;

        for row in [
            [Value::Null, Value::Int32(4)],
            [Value::Int32(9), Value::Null],
        ] {
            assert_eq!(evaluate_expression(&hash, &row)?, evaluate_expression(&scan, &row)?);
        }
        assert_eq!(
            evaluate_expression(&hash, &[Value::Null, Value::Int32(4)])?,
            Value::Null
        );
        assert_eq!(
            evaluate_expression(&hash, &[Value::Int32(9), Value::Null])?,
            Value::Boolean(false)
        );
        Ok(())
    }

    #[test]
    fn test_probe_conversion_failure() -> ExpressionResult<()> {
        let left = Expression::column_with_name(0, "s", DataType::Varchar);
        let hash = hashed(left, vec![Expression::literal(Value::String("a".into()))])?;
        // The declared type is honored, so a stray integer is converted to text
        assert_eq!(
            evaluate_expression(&hash, &[Value::Int32(1)])?,
            Value::Boolean(false)
        );

        let left = Expression::column_with_name(0, "n", DataType::Int32);
        let hash = hashed(left, vec![int(1)])?;
        let err = evaluate_expression(&hash, &[Value::String("abc".into())]).unwrap_err();
        assert!(matches!(err, ExpressionError::Conversion(_)));
        Ok(())
    }

    #[test]
    fn test_unsupported_left_shape() -> ExpressionResult<()> {
        let left = Expression::function("abs", vec![x()]);
        let hash = hashed(left, vec![int(1)])?;
        let err = evaluate_expression(&hash, &[Value::Int32(1)]).unwrap_err();
        assert!(matches!(
            err,
            ExpressionError::UnsupportedOperandShape {
                context: "hash IN",
                ..
            }
        ));
        Ok(())
    }

    #[test]
    fn test_hashable_operands() {
        let subquery = Expression::Subquery(crate::expression::Subquery::new(
            "SELECT 1",
            DataType::Int32,
            vec![Value::Int32(1)],
        ));
        assert!(is_hashable_operand(&x()));
        assert!(is_hashable_operand(&Expression::tuple(vec![x(), int(1)])));
        assert!(!is_hashable_operand(&subquery));
        assert!(!is_hashable_operand(&Expression::tuple(vec![x(), subquery])));
        assert!(!is_hashable_operand(&Expression::function("abs", vec![x()])));
    }

    #[test]
    fn test_display_and_equality() -> ExpressionResult<()> {
        let a = HashInList::try_new(x(), Expression::tuple(vec![int(1), int(2)]))?;
        let b = HashInList::try_new(x(), Expression::tuple(vec![int(1), int(2)]))?;
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "(x HASH IN (1, 2))");
        assert_eq!(a.index().len(), 2);
        Ok(())
    }

    #[test]
    fn test_index_is_shared_between_clones() -> ExpressionResult<()> {
        let a = HashInList::try_new(x(), Expression::tuple(vec![int(1)]))?;
        let b = a.clone();
        assert!(std::ptr::eq(a.index(), b.index()));
        Ok(())
    }
}
