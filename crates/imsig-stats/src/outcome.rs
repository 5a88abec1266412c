//! Test outcome type shared by every routine

use serde::{Deserialize, Serialize};

/// How a p-value was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PValueMethod {
    /// Enumerated exact null distribution
    Exact,
    /// Large-sample approximation
    Asymptotic,
}

/// Statistic and two-sided p-value of a hypothesis test
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TestOutcome {
    pub statistic: f64,
    pub p_value: f64,
    pub method: PValueMethod,
}

impl TestOutcome {
    /// Build an outcome, clamping the p-value into [0, 1]
    pub fn new(statistic: f64, p_value: f64, method: PValueMethod) -> Self {
        Self {
            statistic,
            p_value: p_value.clamp(0.0, 1.0),
            method,
        }
    }

    pub fn exact(statistic: f64, p_value: f64) -> Self {
        Self::new(statistic, p_value, PValueMethod::Exact)
    }

    pub fn asymptotic(statistic: f64, p_value: f64) -> Self {
        Self::new(statistic, p_value, PValueMethod::Asymptotic)
    }
}
