//! Test execution
//!
//! Each invocation moves through `Validating → Computing → Succeeded | Failed`.
//!
//! Validating checks the selection against the test's arity and pairing
//! requirements and shapes the column data into [`Samples`]; any mismatch is
//! a [`AnalysisError::PreconditionViolation`] and nothing is computed.
//! Computing calls the test's routine; a routine failure becomes
//! [`AnalysisError::TestExecutionError`].
//!
//! Missing cells are dropped per column for independent samples and
//! row-wise for paired or row-aligned samples.

use crate::catalog::{Arity, Pairing, Samples, TestName};
use crate::classify::find_column;
use crate::error::{AnalysisError, AnalysisResult};
use crate::recommend::FRIEDMAN_COLUMNS;
use imsig_io::{CellValue, Column, Dataset};
use imsig_stats::PValueMethod;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Lifecycle of a single execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionState {
    Validating,
    Computing,
    Succeeded,
    Failed,
}

impl fmt::Display for ExecutionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ExecutionState::Validating => "validating",
            ExecutionState::Computing => "computing",
            ExecutionState::Succeeded => "succeeded",
            ExecutionState::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Samples shaped for a test, with the columns they came from
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedInput {
    pub test: TestName,
    pub samples: Samples,
    pub columns_used: Vec<String>,
}

/// Statistic and p-value of a successful execution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Execution {
    pub test: TestName,
    pub statistic: f64,
    pub p_value: f64,
    pub method: PValueMethod,
    /// Columns the test actually consumed
    pub columns_used: Vec<String>,
    /// Number of values fed to the routine
    pub observations: usize,
}

/// Run `test` on the selected columns
pub fn execute(
    test: TestName,
    dataset: &Dataset,
    col1: &str,
    col2: Option<&str>,
) -> AnalysisResult<Execution> {
    let mut state = ExecutionState::Validating;
    tracing::debug!("{}: {}", test, state);

    let prepared = match prepare(test, dataset, col1, col2) {
        Ok(prepared) => prepared,
        Err(e) => {
            state = ExecutionState::Failed;
            tracing::debug!("{}: {} ({})", test, state, e);
            return Err(e);
        }
    };

    state = ExecutionState::Computing;
    tracing::debug!(
        "{}: {} on {} values from {:?}",
        test,
        state,
        prepared.samples.len(),
        prepared.columns_used
    );

    match test.descriptor().compute(&prepared.samples) {
        Ok(outcome) => {
            state = ExecutionState::Succeeded;
            tracing::debug!(
                "{}: {} (statistic = {}, p = {})",
                test,
                state,
                outcome.statistic,
                outcome.p_value
            );
            Ok(Execution {
                test,
                statistic: outcome.statistic,
                p_value: outcome.p_value,
                method: outcome.method,
                observations: prepared.samples.len(),
                columns_used: prepared.columns_used,
            })
        }
        Err(e) => {
            state = ExecutionState::Failed;
            tracing::debug!("{}: {} ({})", test, state, e);
            Err(AnalysisError::TestExecutionError {
                test: test.to_string(),
                reason: e.to_string(),
            })
        }
    }
}

/// Validate the selection for `test` and shape its samples
pub fn prepare(
    test: TestName,
    dataset: &Dataset,
    col1: &str,
    col2: Option<&str>,
) -> AnalysisResult<PreparedInput> {
    let descriptor = test.descriptor();
    let primary = find_column(dataset, col1)?;
    let secondary = col2.map(|name| find_column(dataset, name)).transpose()?;

    let prepared = match descriptor.arity {
        Arity::OneColumn => {
            let values = require_numeric(test, primary)?;
            PreparedInput {
                test,
                samples: Samples::One(values),
                columns_used: vec![primary.name().to_string()],
            }
        }
        Arity::TwoColumn => {
            require_numeric(test, primary)?;
            let secondary = secondary.ok_or_else(|| {
                AnalysisError::precondition(test.to_string(), "requires a second column")
            })?;
            let samples = if test == TestName::KruskalWallis {
                group_by(test, dataset, primary, secondary)?
            } else {
                pair_samples(test, descriptor.pairing, dataset, primary, secondary)?
            };
            PreparedInput {
                test,
                samples,
                columns_used: vec![primary.name().to_string(), secondary.name().to_string()],
            }
        }
        Arity::WholeDataset => dataset_columns(test, dataset, col1, col2)?,
    };

    if let Some(empty) = empty_sample(&prepared) {
        return Err(AnalysisError::precondition(
            test.to_string(),
            format!("no complete observations in {}", empty),
        ));
    }
    Ok(prepared)
}

fn require_numeric(test: TestName, column: &Column) -> AnalysisResult<Vec<f64>> {
    column.numeric_values().ok_or_else(|| {
        AnalysisError::precondition(
            test.to_string(),
            format!("column '{}' is not numeric", column.name()),
        )
    })
}

fn pair_samples(
    test: TestName,
    pairing: Pairing,
    dataset: &Dataset,
    primary: &Column,
    secondary: &Column,
) -> AnalysisResult<Samples> {
    let second_values = require_numeric(test, secondary)?;
    match pairing {
        Pairing::Unpaired => {
            let first_values = require_numeric(test, primary)?;
            Ok(Samples::Two(first_values, second_values))
        }
        Pairing::Paired => {
            let (n1, n2) = (primary.observation_count(), secondary.observation_count());
            if n1 != n2 {
                return Err(AnalysisError::precondition(
                    test.to_string(),
                    format!(
                        "requires equal-length paired samples ('{}' has {} observations, '{}' has {})",
                        primary.name(),
                        n1,
                        secondary.name(),
                        n2
                    ),
                ));
            }
            Ok(complete_pairs(dataset, primary, secondary))
        }
        Pairing::RowAligned => Ok(complete_pairs(dataset, primary, secondary)),
    }
}

/// Rows where both columns hold a number
fn complete_pairs(dataset: &Dataset, primary: &Column, secondary: &Column) -> Samples {
    let (first, second): (Vec<f64>, Vec<f64>) = (0..dataset.num_rows())
        .filter_map(|row| Some((primary.numeric_at(row)?, secondary.numeric_at(row)?)))
        .unzip();
    Samples::Two(first, second)
}

/// Primary values grouped by the secondary column, groups in ascending key order
fn group_by(
    test: TestName,
    dataset: &Dataset,
    values: &Column,
    keys: &Column,
) -> AnalysisResult<Samples> {
    let mut groups: BTreeMap<CellValue, Vec<f64>> = BTreeMap::new();
    for row in 0..dataset.num_rows() {
        if let (Some(x), Some(key)) = (values.numeric_at(row), keys.cell(row)) {
            groups.entry(key).or_default().push(x);
        }
    }
    if groups.len() < 2 {
        return Err(AnalysisError::precondition(
            test.to_string(),
            "at least 2 groups required",
        ));
    }
    Ok(Samples::Groups(groups.into_values().collect()))
}

/// Friedman: the first numeric columns of the dataset, whatever was selected
fn dataset_columns(
    test: TestName,
    dataset: &Dataset,
    col1: &str,
    col2: Option<&str>,
) -> AnalysisResult<PreparedInput> {
    let columns: Vec<&Column> = dataset.numeric_columns().take(FRIEDMAN_COLUMNS).collect();
    if columns.len() < FRIEDMAN_COLUMNS {
        return Err(AnalysisError::precondition(
            test.to_string(),
            format!(
                "requires at least {} numeric columns, dataset has {}",
                FRIEDMAN_COLUMNS,
                columns.len()
            ),
        ));
    }

    let names: Vec<String> = columns.iter().map(|c| c.name().to_string()).collect();
    let selection_used = std::iter::once(col1)
        .chain(col2)
        .all(|name| names.iter().any(|n| n == name));
    if !selection_used {
        tracing::warn!(
            "{} uses the first {} numeric columns ({}) instead of the selection",
            test,
            FRIEDMAN_COLUMNS,
            names.join(", ")
        );
    }

    let mut samples = vec![Vec::new(); columns.len()];
    for row in 0..dataset.num_rows() {
        let values: Option<Vec<f64>> = columns.iter().map(|c| c.numeric_at(row)).collect();
        if let Some(values) = values {
            for (sample, value) in samples.iter_mut().zip(values) {
                sample.push(value);
            }
        }
    }

    Ok(PreparedInput {
        test,
        samples: Samples::Groups(samples),
        columns_used: names,
    })
}

fn empty_sample(prepared: &PreparedInput) -> Option<String> {
    let any_empty = match &prepared.samples {
        Samples::One(v) => v.is_empty(),
        Samples::Two(a, b) => a.is_empty() || b.is_empty(),
        Samples::Groups(g) => g.iter().any(Vec::is_empty),
    };
    any_empty.then(|| format!("'{}'", prepared.columns_used.join("', '")))
}
