//! Optimizer rule trait.

use crate::optimizer::OptimizerResult;
use crate::planner::PlanNode;

/// A single rewrite or validation pass over a plan.
///
/// A rule must leave the rows a plan produces unchanged, including how NULL
/// is treated, and applying it to its own output must be a no-op.
pub trait OptimizerRule: Send + Sync {
    /// Get the name of this rule.
    fn name(&self) -> &'static str;

    /// Get a description of what this rule does.
    fn description(&self) -> &'static str {
        "No description available"
    }

    /// Apply this rule to the plan. Returns the plan unchanged if the rule
    /// doesn't apply.
    fn apply(&self, plan: PlanNode) -> OptimizerResult<Transformed>;
}

/// The result of applying an optimizer rule.
#[derive(Debug, Clone)]
pub struct Transformed {
    /// The (potentially transformed) plan.
    pub plan: PlanNode,
    /// Whether the plan was actually changed.
    pub changed: bool,
}

impl Transformed {
    pub fn yes(plan: PlanNode) -> Self {
        Self {
            plan,
            changed: true,
        }
    }

    pub fn no(plan: PlanNode) -> Self {
        Self {
            plan,
            changed: false,
        }
    }
}

impl From<PlanNode> for Transformed {
    fn from(plan: PlanNode) -> Self {
        Self::no(plan)
    }
}
