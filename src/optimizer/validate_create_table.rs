//! Validation of CREATE TABLE definitions.

use crate::optimizer::rule::{OptimizerRule, Transformed};
use crate::optimizer::{OptimizerError, OptimizerResult};
use crate::planner::PlanNode;
use crate::sql::ast::{CreateTableStatement, TableConstraint};
use std::collections::HashSet;

/// Rejects table definitions with misused AUTO_INCREMENT columns or indexes
/// over columns the table does not have. Never changes the plan.
#[derive(Debug, Default)]
pub struct ValidateCreateTable;

impl ValidateCreateTable {
    pub fn new() -> Self {
        Self
    }
}

impl OptimizerRule for ValidateCreateTable {
    fn name(&self) -> &'static str {
        "ValidateCreateTable"
    }

    fn description(&self) -> &'static str {
        "Check AUTO_INCREMENT columns and index columns of CREATE TABLE"
    }

    fn apply(&self, plan: PlanNode) -> OptimizerResult<Transformed> {
        if let PlanNode::CreateTable(stmt) = &plan {
            validate_auto_increment(stmt)?;
            validate_indexes(stmt)?;
        }
        Ok(Transformed::no(plan))
    }
}

fn validate_auto_increment(stmt: &CreateTableStatement) -> OptimizerResult<()> {
    let mut seen = false;
    for col in stmt.columns.iter().filter(|c| c.is_auto_increment()) {
        let invalid = |reason| OptimizerError::InvalidAutoIncrement {
            column: col.name.clone(),
            reason,
        };
        if !stmt.is_primary_key(&col.name) {
            return Err(invalid("AUTO_INCREMENT column must be part of the primary key"));
        }
        if col.default.is_some() {
            return Err(invalid("AUTO_INCREMENT column cannot have a default value"));
        }
        if seen {
            return Err(invalid("there can be only one AUTO_INCREMENT column"));
        }
        seen = true;
    }
    Ok(())
}

fn validate_indexes(stmt: &CreateTableStatement) -> OptimizerResult<()> {
    let names: HashSet<String> = stmt
        .columns
        .iter()
        .map(|c| c.name.to_lowercase())
        .collect();

    let constraint_indexes = stmt.constraints.iter().map(|constraint| match constraint {
        TableConstraint::PrimaryKey(columns) => ("PRIMARY", columns),
        TableConstraint::Unique(columns) => ("UNIQUE", columns),
    });
    let explicit_indexes = stmt
        .indexes
        .iter()
        .map(|index| (index.index_name.as_str(), &index.columns));

    for (index, columns) in constraint_indexes.chain(explicit_indexes) {
        if let Some(missing) = columns.iter().find(|c| !names.contains(&c.to_lowercase())) {
            return Err(OptimizerError::UnknownIndexColumn {
                column: missing.clone(),
                index: index.to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::Value;
    use crate::sql::ast::{ColumnConstraint, ColumnDefinition, DataType, IndexDefinition};

    fn id() -> ColumnDefinition {
        ColumnDefinition::new("id", DataType::BigInt)
    }

    fn table(columns: Vec<ColumnDefinition>) -> CreateTableStatement {
        let mut columns = columns;
        columns.push(ColumnDefinition::new("Name", DataType::Varchar(Some(64))));
        CreateTableStatement::new("users", columns)
    }

    fn validate(stmt: CreateTableStatement) -> OptimizerResult<Transformed> {
        ValidateCreateTable::new().apply(PlanNode::CreateTable(stmt))
    }

    fn reason(result: OptimizerResult<Transformed>) -> Option<&'static str> {
        match result {
            Err(OptimizerError::InvalidAutoIncrement { reason, .. }) => Some(reason),
            _ => None,
        }
    }

    #[test]
    fn test_valid_auto_increment() -> OptimizerResult<()> {
        let stmt = table(vec![id()
            .with_constraint(ColumnConstraint::PrimaryKey)
            .with_constraint(ColumnConstraint::AutoIncrement)]);
        let result = validate(stmt)?;
        assert!(!result.changed);

        // Primary key declared as a table constraint also counts
        let stmt = table(vec![id().with_constraint(ColumnConstraint::AutoIncrement)])
            .with_constraint(TableConstraint::PrimaryKey(vec!["ID".into()]));
        validate(stmt)?;
        Ok(())
    }

    #[test]
    fn test_auto_increment_must_be_primary_key() {
        let stmt = table(vec![id().with_constraint(ColumnConstraint::AutoIncrement)]);
        assert_eq!(
            reason(validate(stmt)),
            Some("AUTO_INCREMENT column must be part of the primary key")
        );
    }

    #[test]
    fn test_auto_increment_without_default() {
        let stmt = table(vec![id()
            .with_constraint(ColumnConstraint::PrimaryKey)
            .with_constraint(ColumnConstraint::AutoIncrement)
            .with_default(Value::Int64(1))]);
        assert_eq!(
            reason(validate(stmt)),
            Some("AUTO_INCREMENT column cannot have a default value")
        );
    }

    #[test]
    fn test_single_auto_increment() {
        let stmt = table(vec![
            id().with_constraint(ColumnConstraint::AutoIncrement),
            ColumnDefinition::new("seq", DataType::Int).with_constraint(ColumnConstraint::AutoIncrement),
        ])
        .with_constraint(TableConstraint::PrimaryKey(vec!["id".into(), "seq".into()]));
        assert_eq!(
            reason(validate(stmt)),
            Some("there can be only one AUTO_INCREMENT column")
        );
    }

    #[test]
    fn test_index_columns_are_case_insensitive() -> OptimizerResult<()> {
        let stmt = table(vec![id()])
            .with_index(IndexDefinition::new("idx_name", vec!["NAME".into(), "Id".into()]))
            .with_constraint(TableConstraint::Unique(vec!["name".into()]));
        validate(stmt)?;
        Ok(())
    }

    #[test]
    fn test_unknown_index_column() {
        let stmt = table(vec![id()]).with_index(IndexDefinition::new(
            "idx_email",
            vec!["id".into(), "email".into()],
        ));
        assert_eq!(
            validate(stmt).unwrap_err(),
            OptimizerError::UnknownIndexColumn {
                column: "email".to_string(),
                index: "idx_email".to_string(),
            }
        );

        let stmt = table(vec![id()]).with_constraint(TableConstraint::PrimaryKey(vec!["uid".into()]));
        assert!(matches!(
            validate(stmt),
            Err(OptimizerError::UnknownIndexColumn { index, .. }) if index == "PRIMARY"
        ));
    }

    #[test]
    fn test_other_nodes_pass_through() -> OptimizerResult<()> {
        let plan = PlanNode::values(vec![], vec![]);
        let result = ValidateCreateTable::new().apply(plan)?;
        assert!(!result.changed);
        assert_eq!(result.plan.name(), "Values");
        Ok(())
    }
}
