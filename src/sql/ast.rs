use crate::access::{DataType as ValueType, Value};

#[derive(Debug, Clone, PartialEq)]
pub struct CreateTableStatement {
    pub table_name: String,
    pub columns: Vec<ColumnDefinition>,
    pub constraints: Vec<TableConstraint>,
    pub indexes: Vec<IndexDefinition>,
}

impl CreateTableStatement {
    pub fn new(table_name: impl Into<String>, columns: Vec<ColumnDefinition>) -> Self {
        Self {
            table_name: table_name.into(),
            columns,
            constraints: Vec::new(),
            indexes: Vec::new(),
        }
    }

    pub fn with_constraint(mut self, constraint: TableConstraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    pub fn with_index(mut self, index: IndexDefinition) -> Self {
        self.indexes.push(index);
        self
    }

    /// Look up a column by name, ignoring case
    pub fn column(&self, name: &str) -> Option<&ColumnDefinition> {
        self.columns.iter().find(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// True if `name` is part of the primary key, declared either on the
    /// column itself or as a table constraint
    pub fn is_primary_key(&self, name: &str) -> bool {
        let inline = self
            .column(name)
            .is_some_and(|c| c.constraints.contains(&ColumnConstraint::PrimaryKey));
        inline
            || self.constraints.iter().any(|constraint| match constraint {
                TableConstraint::PrimaryKey(columns) => {
                    columns.iter().any(|c| c.eq_ignore_ascii_case(name))
                }
                TableConstraint::Unique(_) => false,
            })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDefinition {
    pub name: String,
    pub data_type: DataType,
    pub nullable: bool,
    pub default: Option<Value>,
    pub constraints: Vec<ColumnConstraint>,
}

impl ColumnDefinition {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            nullable: true,
            default: None,
            constraints: Vec::new(),
        }
    }

    pub fn with_constraint(mut self, constraint: ColumnConstraint) -> Self {
        if matches!(constraint, ColumnConstraint::NotNull | ColumnConstraint::PrimaryKey) {
            self.nullable = false;
        }
        self.constraints.push(constraint);
        self
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    pub fn is_auto_increment(&self) -> bool {
        self.constraints.contains(&ColumnConstraint::AutoIncrement)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DataType {
    Int,
    BigInt,
    SmallInt,
    Double,
    Varchar(Option<u32>),
    Text,
    Boolean,
}

impl DataType {
    /// Type of the values stored in a column of this SQL type
    pub fn value_type(&self) -> ValueType {
        match self {
            DataType::Int => ValueType::Int32,
            DataType::BigInt => ValueType::Int64,
            DataType::SmallInt => ValueType::Int16,
            DataType::Double => ValueType::Float64,
            DataType::Varchar(_) | DataType::Text => ValueType::Varchar,
            DataType::Boolean => ValueType::Boolean,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ColumnConstraint {
    PrimaryKey,
    NotNull,
    Unique,
    AutoIncrement,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TableConstraint {
    PrimaryKey(Vec<String>),
    Unique(Vec<String>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndexDefinition {
    pub index_name: String,
    pub columns: Vec<String>,
    pub unique: bool,
}

impl IndexDefinition {
    pub fn new(index_name: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            index_name: index_name.into(),
            columns,
            unique: false,
        }
    }
}
