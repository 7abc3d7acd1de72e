//! Rewrite of scanning IN filters into hash lookups.

use crate::expression::{
    is_hashable_operand, BinaryOperands, Expression, HashInList, MembershipIndex,
};
use crate::optimizer::rule::{OptimizerRule, Transformed};
use crate::optimizer::{OptimizerError, OptimizerResult};
use crate::planner::PlanNode;
use log::debug;

/// Replaces `InList` predicates inside filters with `HashInList` whenever
/// the candidate set can be indexed.
///
/// Only filters are rewritten; IN lists in projections keep scanning. The
/// left operand has to be a literal, a column or a tuple of those, since
/// anything else (a subquery in particular) cannot be materialized per row.
#[derive(Debug, Default)]
pub struct ApplyHashIn;

impl ApplyHashIn {
    pub fn new() -> Self {
        Self
    }
}

impl OptimizerRule for ApplyHashIn {
    fn name(&self) -> &'static str {
        "ApplyHashIn"
    }

    fn description(&self) -> &'static str {
        "Evaluate IN filters with literal candidates through a prebuilt hash index"
    }

    fn apply(&self, plan: PlanNode) -> OptimizerResult<Transformed> {
        let mut changed = false;

        let plan = plan.transform_up_ctx(&mut |node, ctx| {
            let PlanNode::Filter { input, predicate } = node else {
                return Ok(node);
            };
            let parent = ctx.parent.unwrap_or("root");

            let predicate = predicate.transform_up(&mut |expr| {
                let Expression::InList(in_list) = expr else {
                    return Ok(expr);
                };
                if !is_hashable_operand(in_list.left()) {
                    return Ok(Expression::InList(in_list));
                }

                match MembershipIndex::build(in_list.right(), &in_list.left().data_type()) {
                    Ok(index) => {
                        debug!(
                            "Hashing {} candidates of {} in filter under {}",
                            index.len(),
                            in_list,
                            parent
                        );
                        changed = true;
                        Ok(Expression::HashInList(HashInList::new(in_list, index)))
                    }
                    Err(err) => {
                        debug!("Keeping {} as a scan: {}", in_list, err);
                        Ok(Expression::InList(in_list))
                    }
                }
            })?;

            Ok::<_, OptimizerError>(PlanNode::Filter { input, predicate })
        })?;

        Ok(Transformed { plan, changed })
    }
}
