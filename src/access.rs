//! Access layer for typed values.
//!
//! This module provides the datum representation shared by expressions and
//! executors:
//!
//! - **Value**: Type-safe representation of column values, including row values
//! - **DataType**: Supported data types with promotion, conversion and comparison
//! - **Row**: One tuple instance flowing through the executors
//!
//! Column values are addressed positionally; a `Row` has the fixed arity of the
//! schema of the executor that produced it.

pub mod value;

pub use value::{ConversionError, DataType, Value};

/// An ordered, fixed-arity sequence of column values
pub type Row = Vec<Value>;
