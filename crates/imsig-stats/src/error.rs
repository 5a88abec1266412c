//! Error types for imsig-stats

use thiserror::Error;

/// Reasons a statistic or p-value cannot be computed
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StatsError {
    /// Too few observations or groups
    #[error("insufficient data: {0}")]
    InsufficientData(String),

    /// Data for which the statistic is undefined (constant input, zero variance)
    #[error("degenerate data: {0}")]
    Degenerate(String),

    /// NaN or infinite input
    #[error("non-finite value in {0}")]
    NonFinite(String),

    /// Mismatched or otherwise invalid arguments
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Reference distribution could not be constructed
    #[error("distribution error: {0}")]
    Distribution(String),
}

/// Result type alias for statistical routines
pub type StatsResult<T> = Result<T, StatsError>;

/// Reject samples containing NaN or infinities
pub(crate) fn ensure_finite(data: &[f64], what: &str) -> StatsResult<()> {
    if data.iter().any(|v| !v.is_finite()) {
        return Err(StatsError::NonFinite(what.to_string()));
    }
    Ok(())
}
