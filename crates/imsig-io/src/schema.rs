//! Schema and column types for data representation

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Schema describing the structure of a dataset
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DataSchema {
    /// Column descriptors, in file order
    pub columns: Vec<ColumnDescriptor>,

    /// Number of records
    pub num_records: usize,

    /// Additional metadata
    pub metadata: HashMap<String, String>,
}

impl DataSchema {
    /// Create a new schema
    pub fn new(columns: Vec<ColumnDescriptor>, num_records: usize) -> Self {
        Self {
            columns,
            num_records,
            metadata: HashMap::new(),
        }
    }

    /// Get a column by name
    pub fn column(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Get column index by name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Get column names
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Names of the numeric columns, in file order
    pub fn numeric_column_names(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| c.dtype.is_numeric())
            .map(|c| c.name.as_str())
            .collect()
    }

    /// Number of columns
    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }
}

/// Descriptor for a column
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    /// Column name
    pub name: String,

    /// Data type
    pub dtype: ColumnType,

    /// Description
    pub description: Option<String>,
}

impl ColumnDescriptor {
    /// Create a new column descriptor
    pub fn new(name: impl Into<String>, dtype: ColumnType) -> Self {
        Self {
            name: name.into(),
            dtype,
            description: None,
        }
    }

    /// Set the description
    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    /// Analysis kind of this column
    pub fn kind(&self) -> ColumnKind {
        self.dtype.kind()
    }
}

/// Physical data type inferred for a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnType {
    Int64,
    Float64,
    Bool,
    String,
}

impl ColumnType {
    /// Check if this is a numeric type
    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnType::Int64 | ColumnType::Float64)
    }

    /// Analysis kind for this type
    pub fn kind(&self) -> ColumnKind {
        if self.is_numeric() {
            ColumnKind::Numeric
        } else {
            ColumnKind::Categorical
        }
    }

    /// Short display name
    pub fn name(&self) -> &'static str {
        match self {
            ColumnType::Int64 => "int64",
            ColumnType::Float64 => "float64",
            ColumnType::Bool => "bool",
            ColumnType::String => "string",
        }
    }
}

/// Declared kind of a column, as seen by the analysis engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnKind {
    Numeric,
    Categorical,
}

impl ColumnKind {
    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnKind::Numeric)
    }
}

impl std::fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColumnKind::Numeric => write!(f, "numeric"),
            ColumnKind::Categorical => write!(f, "categorical"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_column_lookup() {
        let schema = DataSchema::new(
            vec![
                ColumnDescriptor::new("x", ColumnType::Float64),
                ColumnDescriptor::new("group", ColumnType::String),
                ColumnDescriptor::new("y", ColumnType::Int64),
            ],
            100,
        );

        assert_eq!(schema.column_index("x"), Some(0));
        assert_eq!(schema.column_index("y"), Some(2));
        assert_eq!(schema.column_index("z"), None);
        assert_eq!(schema.numeric_column_names(), vec!["x", "y"]);
    }

    #[test]
    fn test_column_type_kind() {
        assert!(ColumnType::Float64.is_numeric());
        assert!(ColumnType::Int64.is_numeric());
        assert!(!ColumnType::String.is_numeric());
        assert_eq!(ColumnType::Bool.kind(), ColumnKind::Categorical);
        assert_eq!(ColumnKind::Numeric.to_string(), "numeric");
    }
}
