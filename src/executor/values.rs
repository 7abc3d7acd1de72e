//! Values executor implementation.
//!
//! Produces literal rows. Each cell is an expression evaluated against an
//! empty row when its row is produced, so a failing cell fails only that row.

use crate::access::{Row, Value};
use crate::executor::{ColumnInfo, Executor};
use crate::expression::{ExpressionEvaluator, Expression};
use anyhow::{bail, Context, Result};

/// Executor that yields a fixed list of rows
pub struct ValuesExecutor {
    schema: Vec<ColumnInfo>,
    rows: Vec<Vec<Expression>>,
    /// Index of the next row to produce
    current: usize,
    initialized: bool,
}

impl ValuesExecutor {
    pub fn new(schema: Vec<ColumnInfo>, rows: Vec<Vec<Expression>>) -> Self {
        Self {
            schema,
            rows,
            current: 0,
            initialized: false,
        }
    }
}

impl Executor for ValuesExecutor {
    fn init(&mut self) -> Result<()> {
        if self.initialized {
            return Ok(());
        }

        for (i, row) in self.rows.iter().enumerate() {
            if row.len() != self.schema.len() {
                bail!(
                    "Row {} has {} values but the schema has {} columns",
                    i,
                    row.len(),
                    self.schema.len()
                );
            }
        }

        self.current = 0;
        self.initialized = true;
        Ok(())
    }

    fn next(&mut self) -> Result<Option<Row>> {
        if !self.initialized {
            bail!("Executor not initialized. Call init() first.");
        }

        let Some(cells) = self.rows.get(self.current) else {
            return Ok(None);
        };
        let index = self.current;
        self.current += 1;

        let empty: [Value; 0] = [];
        let evaluator = ExpressionEvaluator::new(&empty);
        let row = cells
            .iter()
            .map(|cell| evaluator.evaluate(cell))
            .collect::<Result<Row, _>>()
            .with_context(|| format!("Failed to evaluate row {}", index))?;
        Ok(Some(row))
    }

    fn output_schema(&self) -> &[ColumnInfo] {
        &self.schema
    }
}
