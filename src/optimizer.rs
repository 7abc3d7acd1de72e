//! Rule-based plan optimizer.
//!
//! Rules run in order over the whole plan, and the list is repeated until a
//! pass changes nothing or the configured pass limit is hit. Validation rules
//! run first so a bad definition is rejected before anything is rewritten.

pub mod error;
pub mod hash_in;
pub mod rule;
pub mod validate_create_table;

pub use error::{OptimizerError, OptimizerResult};
pub use hash_in::ApplyHashIn;
pub use rule::{OptimizerRule, Transformed};
pub use validate_create_table::ValidateCreateTable;

use crate::config::OptimizerConfig;
use crate::planner::PlanNode;
use log::debug;

/// The outcome of running the optimizer over a plan.
#[derive(Debug, Clone)]
pub struct OptimizedPlan {
    pub plan: PlanNode,
    /// Number of passes over the rule list.
    pub passes: usize,
    /// Number of rule applications that changed the plan.
    pub rules_applied: usize,
}

pub struct Optimizer {
    rules: Vec<Box<dyn OptimizerRule>>,
    config: OptimizerConfig,
}

impl Optimizer {
    /// Create an optimizer with the default rule set for `config`.
    pub fn new(config: &OptimizerConfig) -> Self {
        let mut optimizer = Self::with_rules(Vec::new(), config.clone());
        optimizer.add_rule(ValidateCreateTable::new());
        if config.enable_hash_in {
            optimizer.add_rule(ApplyHashIn::new());
        }
        optimizer
    }

    pub fn with_rules(rules: Vec<Box<dyn OptimizerRule>>, config: OptimizerConfig) -> Self {
        Self { rules, config }
    }

    pub fn add_rule<R: OptimizerRule + 'static>(&mut self, rule: R) {
        self.rules.push(Box::new(rule));
    }

    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    pub fn optimize(&self, plan: PlanNode) -> OptimizerResult<OptimizedPlan> {
        let mut plan = plan;
        let mut passes = 0;
        let mut rules_applied = 0;

        while passes < self.config.max_passes {
            passes += 1;
            let mut changed = false;

            for rule in &self.rules {
                let result = rule.apply(plan)?;
                if result.changed {
                    debug!("Rule '{}' applied in pass {}", rule.name(), passes);
                    changed = true;
                    rules_applied += 1;
                }
                plan = result.plan;
            }

            if !changed {
                debug!("No changes in pass {}, reached fixpoint", passes);
                break;
            }
        }

        if passes == self.config.max_passes {
            debug!("Optimizer stopped after {} passes", passes);
        }

        Ok(OptimizedPlan {
            plan,
            passes,
            rules_applied,
        })
    }
}
