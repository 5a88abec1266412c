//! Analysis pipeline
//!
//! [`Analyzer`] ties the stages together for one dataset:
//! classify the selection, recommend tests, execute the chosen test,
//! interpret its p-value and render the requested plots. Every call is
//! independent; the analyzer only holds configuration.

use crate::catalog::TestName;
use crate::classify::{classify, ColumnFacts};
use crate::config::AnalysisConfig;
use crate::error::{AnalysisError, AnalysisResult};
use crate::execute::execute;
use crate::interpret::{interpret, Conclusion};
use crate::plot::{generate_plots, RenderedPlot};
use crate::recommend::{recommend, TestSet};
use crate::request::{AnalysisRequest, ColumnSelection};
use chrono::{DateTime, Utc};
use imsig_io::Dataset;
use imsig_stats::PValueMethod;
use serde::{Deserialize, Serialize};

/// Interpreted outcome of one test run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    pub test: TestName,
    pub statistic: f64,
    /// Two-sided p-value in [0, 1]
    pub p_value: f64,
    pub method: PValueMethod,
    pub conclusion: Conclusion,
    /// Threshold the p-value was compared against
    pub alpha: f64,
    pub null_hypothesis: String,
    pub alternative_hypothesis: String,
    /// Columns the test consumed, which may differ from the selection
    pub columns_used: Vec<String>,
    pub observations: usize,
    pub computed_at: DateTime<Utc>,
}

impl TestResult {
    pub fn is_significant(&self) -> bool {
        self.conclusion.is_significant()
    }
}

/// A test result together with its rendered plots
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisOutput {
    pub result: TestResult,
    pub plots: Vec<RenderedPlot>,
}

/// Runs analyses against a dataset with a fixed configuration
#[derive(Debug, Clone, Default)]
pub struct Analyzer {
    config: AnalysisConfig,
}

impl Analyzer {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Build a request for `test` using the configured defaults
    pub fn request(&self, selection: ColumnSelection, test: TestName) -> AnalysisRequest {
        AnalysisRequest::new(selection, test, &self.config)
    }

    /// Classify the selected columns
    pub fn classify(
        &self,
        dataset: &Dataset,
        selection: &ColumnSelection,
    ) -> AnalysisResult<ColumnFacts> {
        classify(dataset, &selection.primary, selection.secondary())
    }

    /// Recommend tests for the selection
    ///
    /// The primary column must be numeric.
    pub fn recommend(
        &self,
        dataset: &Dataset,
        selection: &ColumnSelection,
    ) -> AnalysisResult<TestSet> {
        let facts = self.classify(dataset, selection)?;
        if !facts.col1_is_numeric() {
            return Err(AnalysisError::precondition(
                "Test recommendation",
                format!("primary column '{}' is not numeric", facts.col1.name),
            ));
        }

        let tests = recommend(&facts);
        tracing::debug!(
            "Recommended for {:?}: {}",
            selection.names(),
            tests
                .iter()
                .map(|t| t.display_name())
                .collect::<Vec<_>>()
                .join(", ")
        );
        Ok(tests)
    }

    /// Execute and interpret the requested test
    pub fn run(&self, dataset: &Dataset, request: &AnalysisRequest) -> AnalysisResult<TestResult> {
        if let Ok(recommended) = self.recommend(dataset, &request.selection) {
            if !recommended.contains(request.test) {
                tracing::warn!(
                    "{} is not recommended for {:?}",
                    request.test,
                    request.selection.names()
                );
            }
        }

        let execution = execute(request.test, dataset, request.primary(), request.secondary())?;
        let conclusion = interpret(execution.p_value, self.config.alpha);

        tracing::info!(
            "{}: statistic = {:.4}, p = {:.4} ({})",
            execution.test,
            execution.statistic,
            execution.p_value,
            conclusion
        );

        Ok(TestResult {
            test: execution.test,
            statistic: execution.statistic,
            p_value: execution.p_value,
            method: execution.method,
            conclusion,
            alpha: self.config.alpha,
            null_hypothesis: request.null_hypothesis.clone(),
            alternative_hypothesis: request.alternative_hypothesis.clone(),
            columns_used: execution.columns_used,
            observations: execution.observations,
            computed_at: Utc::now(),
        })
    }

    /// Run the test and render the requested plots
    pub fn analyze(
        &self,
        dataset: &Dataset,
        request: &AnalysisRequest,
    ) -> AnalysisResult<AnalysisOutput> {
        let result = self.run(dataset, request)?;
        let plots = generate_plots(
            &request.plots,
            dataset,
            request.primary(),
            request.secondary(),
        );
        Ok(AnalysisOutput { result, plots })
    }
}
