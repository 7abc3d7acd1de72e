//! Query plans.
//!
//! Plans are built programmatically as a tree of [`PlanNode`]s, rewritten by
//! the optimizer and then turned into executors.

pub mod plan;

pub use plan::{PlanNode, TransformContext};
