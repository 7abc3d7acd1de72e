//! In-memory catalog of created tables.
//!
//! Table names are case-insensitive. The catalog is shared between threads,
//! so every method takes `&self`.

pub mod table_info;

pub use table_info::{IndexInfo, TableId, TableInfo};

use crate::sql::ast::CreateTableStatement;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CatalogError {
    #[error("Table '{0}' already exists")]
    TableExists(String),
}

pub type CatalogResult<T> = Result<T, CatalogError>;

pub const FIRST_TABLE_ID: TableId = TableId(1);

pub struct Catalog {
    tables: DashMap<String, Arc<TableInfo>>,
    next_table_id: AtomicU32,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

impl Catalog {
    pub fn new() -> Self {
        Self {
            tables: DashMap::new(),
            next_table_id: AtomicU32::new(FIRST_TABLE_ID.0),
        }
    }

    pub fn create_table(&self, stmt: &CreateTableStatement) -> CatalogResult<Arc<TableInfo>> {
        match self.tables.entry(stmt.table_name.to_lowercase()) {
            Entry::Occupied(_) => Err(CatalogError::TableExists(stmt.table_name.clone())),
            Entry::Vacant(slot) => {
                let table_id = TableId(self.next_table_id.fetch_add(1, Ordering::SeqCst));
                let info = Arc::new(TableInfo::from_statement(table_id, stmt));
                slot.insert(Arc::clone(&info));
                Ok(info)
            }
        }
    }

    pub fn get_table(&self, name: &str) -> Option<Arc<TableInfo>> {
        self.tables
            .get(&name.to_lowercase())
            .map(|entry| Arc::clone(entry.value()))
    }

    /// All tables ordered by id.
    pub fn list_tables(&self) -> Vec<Arc<TableInfo>> {
        let mut tables: Vec<_> = self
            .tables
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();
        tables.sort_by_key(|t| t.table_id);
        tables
    }
}
