//! Type checking for expressions.

use crate::access::DataType;
use crate::expression::{Expression, ExpressionError, ExpressionResult};

/// Type checker for expressions
pub struct TypeChecker<'a> {
    /// Schema defining the types of input columns
    schema: &'a [DataType],
}

impl<'a> TypeChecker<'a> {
    /// Create a new type checker with the given schema
    pub fn new(schema: &'a [DataType]) -> Self {
        Self { schema }
    }

    /// Type check an expression and return its output type
    pub fn check(&self, expr: &Expression) -> ExpressionResult<DataType> {
        match expr {
            Expression::Literal(lit) => Ok(lit.data_type.clone()),

            Expression::ColumnRef(col) => {
                let schema_type =
                    self.schema
                        .get(col.index)
                        .ok_or(ExpressionError::ColumnIndexOutOfBounds {
                            index: col.index,
                            row_size: self.schema.len(),
                        })?;
                if *schema_type != col.data_type {
                    return Err(ExpressionError::TypeCheckFailed {
                        expression: expr.to_string(),
                        reason: format!(
                            "column is declared as {} but the input has {}",
                            col.data_type, schema_type
                        ),
                    });
                }
                Ok(col.data_type.clone())
            }

            Expression::Tuple(elements) => elements
                .iter()
                .map(|e| self.check(e))
                .collect::<ExpressionResult<Vec<_>>>()
                .map(DataType::Tuple),

            Expression::BinaryOp { op, left, right } => {
                let left_type = self.check(left)?;
                let right_type = self.check(right)?;
                op.output_type(&left_type, &right_type)
                    .ok_or(ExpressionError::InvalidOperandTypes {
                        operator: op.to_string(),
                        left_type,
                        right_type: Some(right_type),
                    })
            }

            Expression::UnaryOp { op, operand } => {
                let operand_type = self.check(operand)?;
                op.output_type(&operand_type)
                    .ok_or(ExpressionError::InvalidOperandTypes {
                        operator: op.to_string(),
                        left_type: operand_type,
                        right_type: None,
                    })
            }

            Expression::FunctionCall { name, args } => {
                for arg in args {
                    self.check(arg)?;
                }
                match name.to_ascii_lowercase().as_str() {
                    "lower" | "upper" | "abs" | "coalesce" => Ok(expr.data_type()),
                    _ => Err(ExpressionError::UnknownFunction { name: name.clone() }),
                }
            }

            Expression::Subquery(subquery) => Ok(subquery.data_type.clone()),

            // Candidate widths are checked while evaluating, one candidate at a time
            Expression::InList(_) | Expression::HashInList(_) => {
                for child in expr.children() {
                    self.check(child)?;
                }
                Ok(DataType::Boolean)
            }
        }
    }

    /// Check if an expression is valid for use as a filter predicate
    pub fn check_filter_predicate(&self, expr: &Expression) -> ExpressionResult<()> {
        match self.check(expr)? {
            DataType::Boolean | DataType::Null => Ok(()),
            other => Err(ExpressionError::TypeCheckFailed {
                expression: expr.to_string(),
                reason: format!("filter predicate must be BOOLEAN, found {}", other),
            }),
        }
    }
}
