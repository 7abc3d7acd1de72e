//! Filter executor implementation.
//!
//! This executor filters rows from a child executor based on a predicate
//! expression. It implements the volcano-style iterator model, producing one
//! row at a time that matches the predicate.

use crate::access::{DataType, Row, Value};
use crate::executor::{ColumnInfo, Executor};
use crate::expression::{evaluate_expression, Expression, TypeChecker};
use anyhow::{bail, Result};

/// Executor that filters rows based on an expression
pub struct FilterExecutor {
    /// Child executor that produces rows
    child: Box<dyn Executor>,
    /// Filter expression that evaluates to boolean
    filter_expr: Expression,
    /// Output schema (same as child's schema)
    output_schema: Vec<ColumnInfo>,
    /// Whether the executor has been initialized
    initialized: bool,
}

impl FilterExecutor {
    /// Create a new filter executor
    ///
    /// # Arguments
    /// * `child` - The child executor that produces rows
    /// * `filter_expr` - The filter expression that evaluates to boolean
    pub fn new(child: Box<dyn Executor>, filter_expr: Expression) -> Self {
        Self {
            child,
            filter_expr,
            output_schema: Vec::new(),
            initialized: false,
        }
    }
}

impl Executor for FilterExecutor {
    fn init(&mut self) -> Result<()> {
        if self.initialized {
            return Ok(());
        }

        // Initialize child executor
        self.child.init()?;

        // Copy the child's output schema
        self.output_schema = self.child.output_schema().to_vec();

        // Type check the filter expression
        let schema_types: Vec<DataType> = self
            .output_schema
            .iter()
            .map(|col| col.data_type.clone())
            .collect();
        TypeChecker::new(&schema_types).check_filter_predicate(&self.filter_expr)?;

        self.initialized = true;
        Ok(())
    }

    fn next(&mut self) -> Result<Option<Row>> {
        if !self.initialized {
            bail!("Executor not initialized. Call init() first.");
        }

        // Keep getting rows from child until we find one that matches the predicate
        while let Some(row) = self.child.next()? {
            match evaluate_expression(&self.filter_expr, &row)? {
                Value::Boolean(true) => return Ok(Some(row)),
                // NULL is treated as false in WHERE clause
                Value::Boolean(false) | Value::Null => {}
                other => bail!(
                    "Filter expression {} evaluated to {} instead of a boolean",
                    self.filter_expr,
                    other
                ),
            }
        }
        Ok(None)
    }

    fn output_schema(&self) -> &[ColumnInfo] {
        &self.output_schema
    }
}
