use crate::access::Row;
use crate::catalog::Catalog;
use crate::config::EngineConfig;
use crate::executor::{ColumnInfo, build_executor, collect_rows};
use crate::optimizer::{OptimizedPlan, Optimizer};
use crate::planner::PlanNode;
use anyhow::{Context, Result};
use log::{debug, info};
use std::sync::Arc;

/// Result of executing a plan
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionResult {
    TableCreated(String),
    Rows {
        schema: Vec<ColumnInfo>,
        rows: Vec<Row>,
    },
}

/// Entry point tying the optimizer, the catalog and the executors together
pub struct Engine {
    config: EngineConfig,
    catalog: Arc<Catalog>,
    optimizer: Optimizer,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        let optimizer = Optimizer::new(&config.optimizer);
        Self {
            config,
            catalog: Arc::new(Catalog::new()),
            optimizer,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn catalog(&self) -> Arc<Catalog> {
        Arc::clone(&self.catalog)
    }

    /// Run the optimizer rules over a plan without executing it
    pub fn optimize(&self, plan: PlanNode) -> Result<OptimizedPlan> {
        let optimized = self.optimizer.optimize(plan)?;
        debug!(
            "Optimized plan in {} passes ({} rewrites):\n{}",
            optimized.passes,
            optimized.rules_applied,
            optimized.plan.explain(0)
        );
        Ok(optimized)
    }

    /// Optimize and run a plan
    pub fn execute(&self, plan: PlanNode) -> Result<ExecutionResult> {
        let plan = self.optimize(plan)?.plan;

        match plan {
            PlanNode::CreateTable(stmt) => {
                let table = self
                    .catalog
                    .create_table(&stmt)
                    .with_context(|| format!("Failed to create table {}", stmt.table_name))?;
                info!("Created table {} ({:?})", table.table_name, table.table_id);
                Ok(ExecutionResult::TableCreated(table.table_name.clone()))
            }
            plan => {
                let mut executor = build_executor(plan)?;
                let rows = collect_rows(executor.as_mut())?;
                let schema = executor.output_schema().to_vec();
                info!("Query returned {} rows", rows.len());
                Ok(ExecutionResult::Rows { schema, rows })
            }
        }
    }
}
