//! In-memory dataset representation
//!
//! A [`Dataset`] is a rectangular table of named columns. Numeric columns
//! store `Option<f64>`, categorical columns store `Option<String>`; `None`
//! marks a missing cell.

use crate::reader::{IoError, IoResult};
use crate::schema::{ColumnDescriptor, ColumnKind, ColumnType, DataSchema};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;

/// Values of a single column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ColumnData {
    Numeric(Vec<Option<f64>>),
    Categorical(Vec<Option<String>>),
}

impl ColumnData {
    /// Number of cells, including missing ones
    pub fn len(&self) -> usize {
        match self {
            ColumnData::Numeric(v) => v.len(),
            ColumnData::Categorical(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Value of a cell as a grouping key (`None` when missing)
    pub fn cell(&self, row: usize) -> Option<CellValue> {
        match self {
            ColumnData::Numeric(v) => v.get(row).copied().flatten().map(CellValue::number),
            ColumnData::Categorical(v) => v
                .get(row)
                .and_then(|c| c.as_ref())
                .map(|s| CellValue::Text(s.clone())),
        }
    }
}

/// A non-missing cell value usable as a grouping key
///
/// Numbers order before text; numbers use IEEE total ordering with `-0.0`
/// folded into `0.0`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum CellValue {
    Number(f64),
    Text(String),
}

impl CellValue {
    pub fn number(x: f64) -> Self {
        CellValue::Number(x + 0.0)
    }
}

impl PartialEq for CellValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (CellValue::Number(a), CellValue::Number(b)) => a.total_cmp(b),
            (CellValue::Number(_), CellValue::Text(_)) => Ordering::Less,
            (CellValue::Text(_), CellValue::Number(_)) => Ordering::Greater,
            (CellValue::Text(a), CellValue::Text(b)) => a.cmp(b),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Number(x) => write!(f, "{}", x),
            CellValue::Text(s) => write!(f, "{}", s),
        }
    }
}

/// A named, typed column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    name: String,
    dtype: ColumnType,
    data: ColumnData,
}

impl Column {
    /// Create a column, checking that the data matches the declared type
    pub fn new(name: impl Into<String>, dtype: ColumnType, data: ColumnData) -> IoResult<Self> {
        let name = name.into();
        let matches = match &data {
            ColumnData::Numeric(_) => dtype.is_numeric(),
            ColumnData::Categorical(_) => !dtype.is_numeric(),
        };
        if !matches {
            return Err(IoError::TypeMismatch {
                expected: dtype.name().to_string(),
                actual: match data {
                    ColumnData::Numeric(_) => "numeric data".to_string(),
                    ColumnData::Categorical(_) => "categorical data".to_string(),
                },
            });
        }
        Ok(Self { name, dtype, data })
    }

    /// Numeric column from plain values; NaN becomes a missing cell
    pub fn numeric(name: impl Into<String>, values: impl IntoIterator<Item = f64>) -> Self {
        Self {
            name: name.into(),
            dtype: ColumnType::Float64,
            data: ColumnData::Numeric(
                values
                    .into_iter()
                    .map(|x| if x.is_nan() { None } else { Some(x) })
                    .collect(),
            ),
        }
    }

    /// Numeric column with explicit missing cells
    pub fn numeric_with_missing(
        name: impl Into<String>,
        values: impl IntoIterator<Item = Option<f64>>,
    ) -> Self {
        Self {
            name: name.into(),
            dtype: ColumnType::Float64,
            data: ColumnData::Numeric(values.into_iter().collect()),
        }
    }

    /// Categorical column from labels
    pub fn categorical<S: Into<String>>(
        name: impl Into<String>,
        values: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            name: name.into(),
            dtype: ColumnType::String,
            data: ColumnData::Categorical(values.into_iter().map(|s| Some(s.into())).collect()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dtype(&self) -> ColumnType {
        self.dtype
    }

    pub fn kind(&self) -> ColumnKind {
        self.dtype.kind()
    }

    pub fn is_numeric(&self) -> bool {
        self.kind().is_numeric()
    }

    pub fn data(&self) -> &ColumnData {
        &self.data
    }

    /// Number of rows, including missing cells
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Number of non-missing cells
    pub fn observation_count(&self) -> usize {
        match &self.data {
            ColumnData::Numeric(v) => v.iter().filter(|x| x.is_some()).count(),
            ColumnData::Categorical(v) => v.iter().filter(|x| x.is_some()).count(),
        }
    }

    /// Number of distinct non-missing values
    pub fn distinct_count(&self) -> usize {
        (0..self.len())
            .filter_map(|row| self.data.cell(row))
            .collect::<BTreeSet<_>>()
            .len()
    }

    /// Non-missing numeric values in row order (`None` for categorical columns)
    pub fn numeric_values(&self) -> Option<Vec<f64>> {
        match &self.data {
            ColumnData::Numeric(v) => Some(v.iter().flatten().copied().collect()),
            ColumnData::Categorical(_) => None,
        }
    }

    /// Numeric cell at `row` (`None` when missing or categorical)
    pub fn numeric_at(&self, row: usize) -> Option<f64> {
        match &self.data {
            ColumnData::Numeric(v) => v.get(row).copied().flatten(),
            ColumnData::Categorical(_) => None,
        }
    }

    /// Cell at `row` as a grouping key
    pub fn cell(&self, row: usize) -> Option<CellValue> {
        self.data.cell(row)
    }

    pub fn descriptor(&self) -> ColumnDescriptor {
        ColumnDescriptor::new(self.name.clone(), self.dtype)
    }
}

/// A rectangular, in-memory table of named columns
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    name: String,
    columns: Vec<Column>,
}

impl Dataset {
    /// Create an empty dataset
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
        }
    }

    /// Build a dataset from columns, validating names and row counts
    pub fn from_columns(name: impl Into<String>, columns: Vec<Column>) -> IoResult<Self> {
        let mut dataset = Self::new(name);
        for column in columns {
            dataset.push(column)?;
        }
        Ok(dataset)
    }

    /// Append a column
    ///
    /// Names must be unique and every column must have the same row count.
    pub fn push(&mut self, column: Column) -> IoResult<()> {
        if self.column(column.name()).is_some() {
            return Err(IoError::DuplicateColumn(column.name().to_string()));
        }
        if let Some(first) = self.columns.first() {
            if first.len() != column.len() {
                return Err(IoError::RaggedColumn {
                    column: column.name().to_string(),
                    rows: column.len(),
                    expected: first.len(),
                });
            }
        }
        self.columns.push(column);
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Get a column by name
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Get a column by name, failing with `ColumnNotFound`
    pub fn require(&self, name: &str) -> IoResult<&Column> {
        self.column(name)
            .ok_or_else(|| IoError::ColumnNotFound(name.to_string()))
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Numeric columns in table order
    pub fn numeric_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| c.is_numeric())
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn num_rows(&self) -> usize {
        self.columns.first().map(|c| c.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Schema view of this dataset
    pub fn schema(&self) -> DataSchema {
        DataSchema::new(
            self.columns.iter().map(|c| c.descriptor()).collect(),
            self.num_rows(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Dataset {
        Dataset::from_columns(
            "sample",
            vec![
                Column::numeric("a", vec![1.0, 2.0, f64::NAN, 2.0]),
                Column::categorical("g", vec!["x", "y", "x", "z"]),
                Column::numeric("b", vec![4.0, 3.0, 2.0, 1.0]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_observation_and_distinct_counts() {
        let ds = sample();
        let a = ds.column("a").unwrap();
        assert_eq!(a.len(), 4);
        assert_eq!(a.observation_count(), 3);
        assert_eq!(a.distinct_count(), 2);
        assert_eq!(ds.column("g").unwrap().distinct_count(), 3);
    }

    #[test]
    fn test_numeric_columns_in_order() {
        let ds = sample();
        let names: Vec<&str> = ds.numeric_columns().map(|c| c.name()).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(ds.num_rows(), 4);
    }

    #[test]
    fn test_duplicate_and_ragged_columns_rejected() {
        let mut ds = sample();
        assert!(matches!(
            ds.push(Column::numeric("a", vec![0.0; 4])),
            Err(IoError::DuplicateColumn(_))
        ));
        assert!(matches!(
            ds.push(Column::numeric("c", vec![0.0; 3])),
            Err(IoError::RaggedColumn { .. })
        ));
    }

    #[test]
    fn test_require_missing_column() {
        let ds = sample();
        assert!(matches!(ds.require("nope"), Err(IoError::ColumnNotFound(_))));
    }

    #[test]
    fn test_cell_value_ordering_folds_negative_zero() {
        assert_eq!(CellValue::number(-0.0), CellValue::number(0.0));
        assert!(CellValue::number(5.0) < CellValue::Text("a".to_string()));
    }

    #[test]
    fn test_column_type_checked() {
        let err = Column::new(
            "x",
            ColumnType::String,
            ColumnData::Numeric(vec![Some(1.0)]),
        );
        assert!(matches!(err, Err(IoError::TypeMismatch { .. })));
    }
}
