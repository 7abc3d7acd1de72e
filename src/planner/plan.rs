//! Plan tree consumed by the optimizer and turned into executors.

use crate::executor::{ColumnInfo, ErrorHandlerFn};
use crate::expression::Expression;
use crate::sql::ast::CreateTableStatement;

/// Plan node for query execution trees
#[derive(Debug, Clone)]
pub enum PlanNode {
    /// Literal rows; each cell is evaluated when the row is produced
    Values {
        schema: Vec<ColumnInfo>,
        rows: Vec<Vec<Expression>>,
    },

    /// Filter rows based on predicate
    Filter {
        input: Box<PlanNode>,
        predicate: Expression,
    },

    /// Compute output columns from each input row
    Projection {
        input: Box<PlanNode>,
        expressions: Vec<(Expression, String)>,
    },

    /// Report row errors of the input to a handler instead of failing
    ErrorHandler {
        input: Box<PlanNode>,
        handler: ErrorHandlerFn,
    },

    /// CREATE TABLE
    CreateTable(CreateTableStatement),
}

/// Where a node sits while a bottom-up transform visits it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransformContext {
    /// Kind of the parent node (see [`PlanNode::name`]), `None` for the root
    pub parent: Option<&'static str>,
    /// Position among the parent's children
    pub child_index: usize,
}

impl PlanNode {
    pub fn values(schema: Vec<ColumnInfo>, rows: Vec<Vec<Expression>>) -> Self {
        PlanNode::Values { schema, rows }
    }

    pub fn filter(input: PlanNode, predicate: Expression) -> Self {
        PlanNode::Filter {
            input: Box::new(input),
            predicate,
        }
    }

    pub fn projection(input: PlanNode, expressions: Vec<(Expression, String)>) -> Self {
        PlanNode::Projection {
            input: Box::new(input),
            expressions,
        }
    }

    pub fn error_handler(input: PlanNode, handler: ErrorHandlerFn) -> Self {
        PlanNode::ErrorHandler {
            input: Box::new(input),
            handler,
        }
    }

    /// Short name of the node kind
    pub fn name(&self) -> &'static str {
        match self {
            PlanNode::Values { .. } => "Values",
            PlanNode::Filter { .. } => "Filter",
            PlanNode::Projection { .. } => "Projection",
            PlanNode::ErrorHandler { .. } => "ErrorHandler",
            PlanNode::CreateTable(_) => "CreateTable",
        }
    }

    pub fn children(&self) -> Vec<&PlanNode> {
        match self {
            PlanNode::Values { .. } | PlanNode::CreateTable(_) => vec![],
            PlanNode::Filter { input, .. }
            | PlanNode::Projection { input, .. }
            | PlanNode::ErrorHandler { input, .. } => vec![input.as_ref()],
        }
    }

    /// Rebuild this node with every child replaced by `f(child)`
    pub fn map_children<E, F>(self, mut f: F) -> Result<PlanNode, E>
    where
        F: FnMut(PlanNode) -> Result<PlanNode, E>,
    {
        Ok(match self {
            PlanNode::Values { .. } | PlanNode::CreateTable(_) => self,
            PlanNode::Filter { input, predicate } => PlanNode::Filter {
                input: Box::new(f(*input)?),
                predicate,
            },
            PlanNode::Projection { input, expressions } => PlanNode::Projection {
                input: Box::new(f(*input)?),
                expressions,
            },
            PlanNode::ErrorHandler { input, handler } => PlanNode::ErrorHandler {
                input: Box::new(f(*input)?),
                handler,
            },
        })
    }

    /// Rewrite the tree bottom-up. `f` sees every node after its children
    /// have been rewritten, along with the node's parent and child position.
    pub fn transform_up_ctx<E, F>(self, f: &mut F) -> Result<PlanNode, E>
    where
        F: FnMut(PlanNode, &TransformContext) -> Result<PlanNode, E>,
    {
        let root = TransformContext {
            parent: None,
            child_index: 0,
        };
        self.transform_up_inner(root, f)
    }

    fn transform_up_inner<E, F>(self, ctx: TransformContext, f: &mut F) -> Result<PlanNode, E>
    where
        F: FnMut(PlanNode, &TransformContext) -> Result<PlanNode, E>,
    {
        let parent = Some(self.name());
        let mut child_index = 0;
        let node = self.map_children(|child| {
            let child_ctx = TransformContext { parent, child_index };
            child_index += 1;
            child.transform_up_inner(child_ctx, &mut *f)
        })?;
        f(node, &ctx)
    }

    /// Get a human-readable explanation of this node
    pub fn explain(&self, indent_level: usize) -> String {
        let indent = "  ".repeat(indent_level);

        match self {
            PlanNode::Values { schema, rows } => {
                let columns = schema
                    .iter()
                    .map(|c| c.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("{}Values: {} rows ({})", indent, rows.len(), columns)
            }

            PlanNode::Filter { input, predicate } => {
                let mut result = format!("{}Filter: {}\n", indent, predicate);
                result.push_str(&input.explain(indent_level + 1));
                result
            }

            PlanNode::Projection { input, expressions } => {
                let proj_str = expressions
                    .iter()
                    .map(|(expr, alias)| format!("{} AS {}", expr, alias))
                    .collect::<Vec<_>>()
                    .join(", ");
                let mut result = format!("{}Projection: {}\n", indent, proj_str);
                result.push_str(&input.explain(indent_level + 1));
                result
            }

            PlanNode::ErrorHandler { input, .. } => {
                let mut result = format!("{}ErrorHandler\n", indent);
                result.push_str(&input.explain(indent_level + 1));
                result
            }

            PlanNode::CreateTable(stmt) => format!(
                "{}CreateTable: {} ({} columns, {} indexes)",
                indent,
                stmt.table_name,
                stmt.columns.len(),
                stmt.indexes.len()
            ),
        }
    }
}
