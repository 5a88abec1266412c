//! Column classification
//!
//! Derives the facts the recommender needs from a column selection: column
//! kinds, observation counts, distinct values and whether the two columns
//! can be treated as paired.

use crate::error::{AnalysisError, AnalysisResult};
use imsig_io::{Column, ColumnKind, Dataset};
use serde::{Deserialize, Serialize};

/// Facts about one selected column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub name: String,
    pub kind: ColumnKind,
    /// Non-missing cells
    pub observations: usize,
    /// Distinct non-missing values
    pub distinct: usize,
}

impl ColumnInfo {
    pub fn from_column(column: &Column) -> Self {
        Self {
            name: column.name().to_string(),
            kind: column.kind(),
            observations: column.observation_count(),
            distinct: column.distinct_count(),
        }
    }

    pub fn is_numeric(&self) -> bool {
        self.kind.is_numeric()
    }
}

/// Everything the recommender knows about a selection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnFacts {
    pub col1: ColumnInfo,
    pub col2: Option<ColumnInfo>,
    /// Both columns given with equal observation counts
    pub is_paired: bool,
    /// Numeric columns in the whole dataset
    pub numeric_column_count: usize,
}

impl ColumnFacts {
    pub fn col1_is_numeric(&self) -> bool {
        self.col1.is_numeric()
    }

    /// `None` when no secondary column was selected
    pub fn col2_is_numeric(&self) -> Option<bool> {
        self.col2.as_ref().map(ColumnInfo::is_numeric)
    }

    pub fn col2_distinct(&self) -> Option<usize> {
        self.col2.as_ref().map(|c| c.distinct)
    }
}

/// Look up a column, mapping absence to [`AnalysisError::ColumnNotFound`]
pub fn find_column<'a>(dataset: &'a Dataset, name: &str) -> AnalysisResult<&'a Column> {
    dataset
        .column(name)
        .ok_or_else(|| AnalysisError::ColumnNotFound {
            column: name.to_string(),
        })
}

/// Classify the selected columns of `dataset`
pub fn classify(dataset: &Dataset, col1: &str, col2: Option<&str>) -> AnalysisResult<ColumnFacts> {
    let first = ColumnInfo::from_column(find_column(dataset, col1)?);
    let second = col2
        .map(|name| find_column(dataset, name).map(ColumnInfo::from_column))
        .transpose()?;

    let is_paired = second
        .as_ref()
        .is_some_and(|c| c.observations == first.observations);

    Ok(ColumnFacts {
        col1: first,
        col2: second,
        is_paired,
        numeric_column_count: dataset.numeric_columns().count(),
    })
}
