//! Expression evaluation framework for query execution.
//!
//! This module provides:
//! - Expression AST representation
//! - Type checking and validation
//! - Expression evaluation against rows
//! - Membership tests, both scanning and hash-indexed

pub mod canonical;
pub mod error;
pub mod eval;
pub mod expr;
pub mod hash_in_list;
pub mod in_list;
pub mod operator;
pub mod type_checker;

pub use canonical::{hash_of, CanonicalKey, MembershipIndex};
pub use error::{ExpressionError, ExpressionResult};
pub use eval::{evaluate_expression, ExpressionEvaluator};
pub use expr::{ColumnRef, Expression, Literal, Subquery};
pub use hash_in_list::{is_hashable_operand, HashInList};
pub use in_list::{BinaryOperands, InList};
pub use operator::{BinaryOperator, UnaryOperator};
pub use type_checker::TypeChecker;
