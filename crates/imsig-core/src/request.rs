//! Analysis request value objects

use crate::catalog::TestName;
use crate::config::AnalysisConfig;
use crate::plot::PlotKind;
use serde::{Deserialize, Serialize};

/// The columns an analysis works on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSelection {
    /// Primary column (required)
    pub primary: String,
    /// Secondary column, for two-sample, correlation and grouped tests
    pub secondary: Option<String>,
}

impl ColumnSelection {
    pub fn single(primary: impl Into<String>) -> Self {
        Self {
            primary: primary.into(),
            secondary: None,
        }
    }

    pub fn pair(primary: impl Into<String>, secondary: impl Into<String>) -> Self {
        Self {
            primary: primary.into(),
            secondary: Some(secondary.into()),
        }
    }

    pub fn secondary(&self) -> Option<&str> {
        self.secondary.as_deref()
    }

    /// Names of the selected columns, primary first
    pub fn names(&self) -> Vec<&str> {
        std::iter::once(self.primary.as_str())
            .chain(self.secondary())
            .collect()
    }
}

/// Everything one analysis action needs, fixed before it starts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub selection: ColumnSelection,
    pub test: TestName,
    pub null_hypothesis: String,
    pub alternative_hypothesis: String,
    pub plots: Vec<PlotKind>,
}

impl AnalysisRequest {
    /// Build a request with the default hypotheses and plots from `config`
    pub fn new(selection: ColumnSelection, test: TestName, config: &AnalysisConfig) -> Self {
        Self {
            selection,
            test,
            null_hypothesis: config.default_null_hypothesis.clone(),
            alternative_hypothesis: config.default_alternative_hypothesis.clone(),
            plots: config.default_plots.clone(),
        }
    }

    pub fn with_null_hypothesis(mut self, text: impl Into<String>) -> Self {
        self.null_hypothesis = text.into();
        self
    }

    pub fn with_alternative_hypothesis(mut self, text: impl Into<String>) -> Self {
        self.alternative_hypothesis = text.into();
        self
    }

    /// Replace the plot selection; duplicates are dropped, order is kept
    pub fn with_plots(mut self, plots: impl IntoIterator<Item = PlotKind>) -> Self {
        let mut selected = Vec::new();
        for kind in plots {
            if !selected.contains(&kind) {
                selected.push(kind);
            }
        }
        self.plots = selected;
        self
    }

    pub fn primary(&self) -> &str {
        &self.selection.primary
    }

    pub fn secondary(&self) -> Option<&str> {
        self.selection.secondary()
    }
}
