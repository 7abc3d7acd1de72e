//! Error types for plan rewriting and validation.

use crate::expression::ExpressionError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum OptimizerError {
    /// An AUTO_INCREMENT column breaks one of the table definition rules
    #[error("Incorrect table definition for column {column}: {reason}")]
    InvalidAutoIncrement { column: String, reason: &'static str },

    /// An index refers to a column the table does not have
    #[error("Key column '{column}' doesn't exist in table (index {index})")]
    UnknownIndexColumn { column: String, index: String },

    #[error(transparent)]
    Expression(#[from] ExpressionError),
}

pub type OptimizerResult<T> = Result<T, OptimizerError>;
