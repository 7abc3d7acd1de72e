//! Expression evaluation implementation.

use crate::access::{DataType, Value};
use crate::expression::{
    BinaryOperator, ColumnRef, Expression, ExpressionError, ExpressionResult, UnaryOperator,
};

/// Evaluator for expressions
pub struct ExpressionEvaluator<'a> {
    /// The row values to evaluate against
    row: &'a [Value],
}

impl<'a> ExpressionEvaluator<'a> {
    /// Create a new evaluator over one row
    pub fn new(row: &'a [Value]) -> Self {
        Self { row }
    }

    /// Evaluate an expression and return the result
    pub fn evaluate(&self, expr: &Expression) -> ExpressionResult<Value> {
        match expr {
            Expression::Literal(lit) => Ok(lit.value.clone()),

            Expression::ColumnRef(col) => self.evaluate_column_ref(col),

            Expression::Tuple(elements) => elements
                .iter()
                .map(|e| self.evaluate(e))
                .collect::<ExpressionResult<Vec<_>>>()
                .map(Value::Tuple),

            Expression::BinaryOp { op, left, right } => match op {
                BinaryOperator::And | BinaryOperator::Or => self.evaluate_logical(*op, left, right),
                _ => self.evaluate_comparison(*op, left, right),
            },

            Expression::UnaryOp { op, operand } => {
                let operand_val = self.evaluate(operand)?;
                self.evaluate_unary_op(*op, operand_val)
            }

            Expression::FunctionCall { name, args } => self.evaluate_function(name, args),

            Expression::Subquery(subquery) => subquery.evaluate(),

            Expression::InList(in_list) => in_list.evaluate(self),

            Expression::HashInList(hash_in) => hash_in.evaluate(self),
        }
    }

    /// Evaluate a column reference
    pub(crate) fn evaluate_column_ref(&self, col: &ColumnRef) -> ExpressionResult<Value> {
        self.row
            .get(col.index)
            .cloned()
            .ok_or(ExpressionError::ColumnIndexOutOfBounds {
                index: col.index,
                row_size: self.row.len(),
            })
    }

    /// AND / OR with three-valued logic. The right side is skipped once the
    /// left side decides the result.
    fn evaluate_logical(
        &self,
        op: BinaryOperator,
        left: &Expression,
        right: &Expression,
    ) -> ExpressionResult<Value> {
        let left_val = as_bool(op, self.evaluate(left)?)?;
        match (op, left_val) {
            (BinaryOperator::And, Some(false)) => return Ok(Value::Boolean(false)),
            (BinaryOperator::Or, Some(true)) => return Ok(Value::Boolean(true)),
            _ => {}
        }

        let right_val = as_bool(op, self.evaluate(right)?)?;
        let result = match (op, left_val, right_val) {
            (BinaryOperator::And, _, Some(false)) => Some(false),
            (BinaryOperator::And, Some(true), Some(true)) => Some(true),
            (BinaryOperator::Or, _, Some(true)) => Some(true),
            (BinaryOperator::Or, Some(false), Some(false)) => Some(false),
            _ => None,
        };
        Ok(result.map_or(Value::Null, Value::Boolean))
    }

    /// Comparison operators convert both sides to the promoted type of the
    /// left operand (or of the right one if the left is an untyped NULL).
    fn evaluate_comparison(
        &self,
        op: BinaryOperator,
        left: &Expression,
        right: &Expression,
    ) -> ExpressionResult<Value> {
        let left_type = left.data_type();
        let right_type = right.data_type();
        if left_type.num_columns() != right_type.num_columns()
            && !left_type.is_null()
            && !right_type.is_null()
        {
            return Err(ExpressionError::ArityMismatch {
                expected: left_type.num_columns(),
                actual: right_type.num_columns(),
                operand: right.to_string(),
                data_type: right_type,
            });
        }

        let left_val = self.evaluate(left)?;
        let right_val = self.evaluate(right)?;
        if left_val.is_null() || right_val.is_null() {
            return Ok(Value::Null);
        }

        let comparison_type = if left_type.is_null() {
            right_type.promote()
        } else {
            left_type.promote()
        };

        let Some(ordering) = comparison_type.compare(&left_val, &right_val)? else {
            return Ok(Value::Null);
        };

        let Some(result) = op.accepts(ordering) else {
            return Err(ExpressionError::EvaluationError {
                message: format!("{} is not a comparison", op),
            });
        };
        Ok(Value::Boolean(result))
    }

    /// Evaluate a unary operation
    fn evaluate_unary_op(&self, op: UnaryOperator, operand: Value) -> ExpressionResult<Value> {
        match op {
            UnaryOperator::Not => match operand {
                Value::Null => Ok(Value::Null),
                Value::Boolean(b) => Ok(Value::Boolean(!b)),
                _ => Err(ExpressionError::InvalidOperandTypes {
                    operator: op.to_string(),
                    left_type: operand.data_type(),
                    right_type: None,
                }),
            },

            UnaryOperator::IsNull => Ok(Value::Boolean(operand.is_null())),

            UnaryOperator::IsNotNull => Ok(Value::Boolean(!operand.is_null())),
        }
    }

    fn evaluate_function(&self, name: &str, args: &[Expression]) -> ExpressionResult<Value> {
        let function = name.to_ascii_lowercase();
        match function.as_str() {
            "lower" | "upper" => {
                let value = self.single_argument(&function, args)?;
                if value.is_null() {
                    return Ok(Value::Null);
                }
                match DataType::Varchar.convert(&value)? {
                    Value::String(s) if function == "lower" => Ok(Value::String(s.to_lowercase())),
                    Value::String(s) => Ok(Value::String(s.to_uppercase())),
                    other => Ok(other),
                }
            }
            "abs" => match self.single_argument(&function, args)? {
                Value::Int16(n) => Ok(Value::Int16(n.wrapping_abs())),
                Value::Int32(n) => Ok(Value::Int32(n.wrapping_abs())),
                Value::Int64(n) => Ok(Value::Int64(n.wrapping_abs())),
                Value::Float64(f) => Ok(Value::Float64(f.abs())),
                Value::Null => Ok(Value::Null),
                other => Err(ExpressionError::InvalidOperandTypes {
                    operator: function,
                    left_type: other.data_type(),
                    right_type: None,
                }),
            },
            "coalesce" => {
                for arg in args {
                    let value = self.evaluate(arg)?;
                    if !value.is_null() {
                        return Ok(value);
                    }
                }
                Ok(Value::Null)
            }
            _ => Err(ExpressionError::UnknownFunction {
                name: name.to_string(),
            }),
        }
    }

    fn single_argument(&self, function: &str, args: &[Expression]) -> ExpressionResult<Value> {
        match args {
            [arg] => self.evaluate(arg),
            _ => Err(ExpressionError::FunctionArgumentCount {
                function: function.to_string(),
                expected: 1,
                actual: args.len(),
            }),
        }
    }
}

fn as_bool(op: BinaryOperator, value: Value) -> ExpressionResult<Option<bool>> {
    match value {
        Value::Null => Ok(None),
        Value::Boolean(b) => Ok(Some(b)),
        other => Err(ExpressionError::InvalidOperandTypes {
            operator: op.to_string(),
            left_type: other.data_type(),
            right_type: Some(DataType::Boolean),
        }),
    }
}

/// Helper function to evaluate an expression against row values
pub fn evaluate_expression(expr: &Expression, row: &[Value]) -> ExpressionResult<Value> {
    ExpressionEvaluator::new(row).evaluate(expr)
}
