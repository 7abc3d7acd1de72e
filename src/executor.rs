//! Executor layer for query execution.
//!
//! This module implements the Volcano-style iterator model for executing
//! query plans. Each executor produces rows one at a time via the `next()`
//! method, allowing for efficient memory usage and composability.

use crate::access::{DataType, Row};
use crate::planner::PlanNode;
use anyhow::{bail, Result};

pub mod error_handler;
pub mod filter;
pub mod projection;
pub mod values;

// Re-export executors
pub use error_handler::{ErrorHandlerExecutor, ErrorHandlerFn};
pub use filter::FilterExecutor;
pub use projection::ProjectionExecutor;
pub use values::ValuesExecutor;

/// Trait for all query executors
pub trait Executor: Send {
    /// Initialize the executor. This must be called before `next()`.
    fn init(&mut self) -> Result<()>;

    /// Get the next row from the executor.
    /// Returns None when there are no more rows.
    fn next(&mut self) -> Result<Option<Row>>;

    /// Get the output schema of this executor
    fn output_schema(&self) -> &[ColumnInfo];
}

/// Information about a column in the output schema
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnInfo {
    pub name: String,
    pub data_type: DataType,
}

impl ColumnInfo {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }
}

/// Build the executor tree for a row-producing plan
pub fn build_executor(plan: PlanNode) -> Result<Box<dyn Executor>> {
    Ok(match plan {
        PlanNode::Values { schema, rows } => Box::new(ValuesExecutor::new(schema, rows)),
        PlanNode::Filter { input, predicate } => {
            Box::new(FilterExecutor::new(build_executor(*input)?, predicate))
        }
        PlanNode::Projection { input, expressions } => {
            Box::new(ProjectionExecutor::new(build_executor(*input)?, expressions))
        }
        PlanNode::ErrorHandler { input, handler } => {
            Box::new(ErrorHandlerExecutor::new(build_executor(*input)?, handler))
        }
        PlanNode::CreateTable(stmt) => {
            bail!("CREATE TABLE {} does not produce rows", stmt.table_name)
        }
    })
}

/// Initialize an executor and drain all of its rows
pub fn collect_rows(executor: &mut dyn Executor) -> Result<Vec<Row>> {
    executor.init()?;
    let mut rows = Vec::new();
    while let Some(row) = executor.next()? {
        rows.push(row);
    }
    Ok(rows)
}
