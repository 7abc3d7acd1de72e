//! Error types for expression evaluation.

use crate::access::{ConversionError, DataType};
use thiserror::Error;

/// Errors that can occur during expression evaluation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExpressionError {
    /// Left operand and a compared operand have different column counts
    #[error("Operand should contain {expected} column(s), but {operand} of type {data_type} has {actual}")]
    ArityMismatch {
        expected: usize,
        actual: usize,
        operand: String,
        data_type: DataType,
    },

    /// An operand has an expression shape the operator cannot work with
    #[error("{context} expects {expected}, found {operand} of type {data_type}")]
    UnsupportedOperandShape {
        context: &'static str,
        expected: &'static str,
        operand: String,
        data_type: DataType,
    },

    /// A value cannot be converted to the type required for comparison or hashing
    #[error(transparent)]
    Conversion(#[from] ConversionError),

    /// A row element intended as a hash key is not a literal
    #[error("hash IN only supports literals and unnested tuples, found {operand} of type {data_type}")]
    NestedExpressionUnsupported { operand: String, data_type: DataType },

    /// Invalid operand types for operator
    #[error("Invalid operand types for operator {operator}: left={left_type}, right={right_type:?}")]
    InvalidOperandTypes {
        operator: String,
        left_type: DataType,
        right_type: Option<DataType>,
    },

    /// Column index out of bounds
    #[error("Column index {index} out of bounds for row with {row_size} columns")]
    ColumnIndexOutOfBounds { index: usize, row_size: usize },

    /// Invalid function name
    #[error("Unknown function: {name}")]
    UnknownFunction { name: String },

    /// Wrong number of function arguments
    #[error("Function {function} expects {expected} arguments, got {actual}")]
    FunctionArgumentCount {
        function: String,
        expected: usize,
        actual: usize,
    },

    /// `with_children` was called with the wrong number of children
    #[error("{node} expects {expected} children, got {actual}")]
    InvalidChildrenCount {
        node: String,
        expected: usize,
        actual: usize,
    },

    /// A scalar subquery produced more than one row
    #[error("Subquery {query} returned {rows} rows, expected at most one")]
    SubqueryCardinality { query: String, rows: usize },

    /// Generic evaluation error
    #[error("Expression evaluation error: {message}")]
    EvaluationError { message: String },

    /// Type checking failed
    #[error("Type check failed for expression '{expression}': {reason}")]
    TypeCheckFailed { expression: String, reason: String },
}

/// Result type for expression operations
pub type ExpressionResult<T> = Result<T, ExpressionError>;
