//! Table information and metadata structures.

use crate::executor::ColumnInfo;
use crate::sql::ast::{CreateTableStatement, TableConstraint};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TableId(pub u32);

#[derive(Debug, Clone, PartialEq)]
pub struct IndexInfo {
    pub index_name: String,
    pub columns: Vec<String>,
    pub unique: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableInfo {
    pub table_id: TableId,
    pub table_name: String,
    pub columns: Vec<ColumnInfo>,
    /// Primary key columns, in key order
    pub primary_key: Vec<String>,
    pub indexes: Vec<IndexInfo>,
}

impl TableInfo {
    pub fn from_statement(table_id: TableId, stmt: &CreateTableStatement) -> Self {
        let columns = stmt
            .columns
            .iter()
            .map(|c| ColumnInfo::new(c.name.clone(), c.data_type.value_type()))
            .collect();

        let primary_key = stmt
            .columns
            .iter()
            .filter(|c| stmt.is_primary_key(&c.name))
            .map(|c| c.name.clone())
            .collect();

        let unique_constraints = stmt.constraints.iter().filter_map(|constraint| match constraint {
            TableConstraint::Unique(columns) => Some(IndexInfo {
                index_name: format!("{}_{}_key", stmt.table_name, columns.join("_")),
                columns: columns.clone(),
                unique: true,
            }),
            TableConstraint::PrimaryKey(_) => None,
        });
        let indexes = stmt
            .indexes
            .iter()
            .map(|index| IndexInfo {
                index_name: index.index_name.clone(),
                columns: index.columns.clone(),
                unique: index.unique,
            })
            .chain(unique_constraints)
            .collect();

        Self {
            table_id,
            table_name: stmt.table_name.clone(),
            columns,
            primary_key,
            indexes,
        }
    }

    /// Position of a column, ignoring case.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.name.eq_ignore_ascii_case(name))
    }
}
