//! Projection executor implementation.
//!
//! This executor computes output columns from each row of a child executor.
//! Every output column is an expression over the child row, so it can select,
//! reorder or compute columns.

use crate::access::{DataType, Row};
use crate::executor::{ColumnInfo, Executor};
use crate::expression::{ExpressionEvaluator, Expression, TypeChecker};
use anyhow::{bail, Result};

/// Executor that projects expressions over child rows
pub struct ProjectionExecutor {
    /// Child executor that produces rows
    child: Box<dyn Executor>,
    /// Output expressions and their column names
    expressions: Vec<(Expression, String)>,
    /// Output schema (projected columns)
    output_schema: Vec<ColumnInfo>,
    /// Whether the executor has been initialized
    initialized: bool,
}

impl ProjectionExecutor {
    /// Create a new projection executor
    ///
    /// # Arguments
    /// * `child` - The child executor that produces rows
    /// * `expressions` - Output expressions, each with the name of its column
    pub fn new(child: Box<dyn Executor>, expressions: Vec<(Expression, String)>) -> Self {
        Self {
            child,
            expressions,
            output_schema: Vec::new(),
            initialized: false,
        }
    }
}

impl Executor for ProjectionExecutor {
    fn init(&mut self) -> Result<()> {
        if self.initialized {
            return Ok(());
        }

        self.child.init()?;

        let child_types: Vec<DataType> = self
            .child
            .output_schema()
            .iter()
            .map(|col| col.data_type.clone())
            .collect();
        let checker = TypeChecker::new(&child_types);

        // Build projected output schema from the expression types
        self.output_schema = self
            .expressions
            .iter()
            .map(|(expr, name)| Ok(ColumnInfo::new(name.clone(), checker.check(expr)?)))
            .collect::<Result<Vec<_>>>()?;

        self.initialized = true;
        Ok(())
    }

    fn next(&mut self) -> Result<Option<Row>> {
        if !self.initialized {
            bail!("Executor not initialized. Call init() first.");
        }

        match self.child.next()? {
            Some(row) => {
                let evaluator = ExpressionEvaluator::new(&row);
                let projected = self
                    .expressions
                    .iter()
                    .map(|(expr, _)| evaluator.evaluate(expr))
                    .collect::<Result<Row, _>>()?;
                Ok(Some(projected))
            }
            None => Ok(None),
        }
    }

    fn output_schema(&self) -> &[ColumnInfo] {
        &self.output_schema
    }
}
