//! One-sample tests
//!
//! Both tests split the sample at its own median: the sign test asks
//! whether values fall evenly on either side, the runs test whether the
//! sides alternate at random.

use crate::distribution::{binomial_two_sided, normal_two_sided};
use crate::error::{ensure_finite, StatsError, StatsResult};
use crate::outcome::TestOutcome;
use crate::summary::median;
use serde::{Deserialize, Serialize};

/// Samples at or above this size skip the runs-test continuity correction
const RUNS_CORRECTION_LIMIT: usize = 50;

/// Counts of values on either side of the sample median
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignCounts {
    pub median: f64,
    /// Values strictly above the median
    pub positive: usize,
    /// Values strictly below the median
    pub negative: usize,
    /// Values equal to the median (excluded from the test)
    pub ties: usize,
}

impl SignCounts {
    pub fn total(&self) -> usize {
        self.positive + self.negative
    }
}

/// Classify every value against the sample median
pub fn sign_counts(values: &[f64]) -> StatsResult<SignCounts> {
    ensure_finite(values, "sample")?;
    let center = median(values).ok_or_else(|| {
        StatsError::InsufficientData("sign test needs at least one observation".to_string())
    })?;

    let mut counts = SignCounts {
        median: center,
        positive: 0,
        negative: 0,
        ties: 0,
    };
    for &v in values {
        if v > center {
            counts.positive += 1;
        } else if v < center {
            counts.negative += 1;
        } else {
            counts.ties += 1;
        }
    }
    Ok(counts)
}

/// Sign test about the sample median.
///
/// The statistic is the number of values strictly above the median; the
/// p-value is the exact two-sided binomial probability with p = 0.5 over the
/// untied values.
pub fn sign_test(values: &[f64]) -> StatsResult<TestOutcome> {
    let counts = sign_counts(values)?;
    if counts.total() == 0 {
        return Err(StatsError::Degenerate(
            "every value equals the median".to_string(),
        ));
    }
    let p_value = binomial_two_sided(counts.positive as u64, counts.total() as u64, 0.5)?;
    Ok(TestOutcome::exact(counts.positive as f64, p_value))
}

/// Runs of consecutive values on the same side of the median
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunCounts {
    pub cutoff: f64,
    pub runs: usize,
    /// Values at or above the cutoff
    pub above: usize,
    /// Values below the cutoff
    pub below: usize,
}

/// Count runs of values at-or-above versus below the sample median
pub fn count_runs(values: &[f64]) -> StatsResult<RunCounts> {
    ensure_finite(values, "sample")?;
    let cutoff = median(values).ok_or_else(|| {
        StatsError::InsufficientData("runs test needs at least one observation".to_string())
    })?;

    let mut counts = RunCounts {
        cutoff,
        runs: 0,
        above: 0,
        below: 0,
    };
    let mut previous: Option<bool> = None;
    for &v in values {
        let side = v >= cutoff;
        if side {
            counts.above += 1;
        } else {
            counts.below += 1;
        }
        if previous != Some(side) {
            counts.runs += 1;
        }
        previous = Some(side);
    }
    Ok(counts)
}

/// Wald-Wolfowitz runs test for randomness of order.
///
/// The statistic is z = (R - μ) / σ with μ = 2·n₊n₋/n + 1 and
/// σ² = 2·n₊n₋(2·n₊n₋ - n) / (n²(n-1)). With `correction` set and n < 50,
/// |R - μ| is reduced by 0.5 before standardizing.
pub fn runs_test(values: &[f64], correction: bool) -> StatsResult<TestOutcome> {
    let counts = count_runs(values)?;
    if counts.above == 0 || counts.below == 0 {
        return Err(StatsError::Degenerate(
            "all values fall on one side of the median".to_string(),
        ));
    }

    let n = values.len() as f64;
    let npn = (counts.above * counts.below) as f64;
    let mean = 2.0 * npn / n + 1.0;
    let variance = 2.0 * npn * (2.0 * npn - n) / (n * n * (n - 1.0));
    if variance <= 0.0 {
        return Err(StatsError::Degenerate(
            "run count variance is zero".to_string(),
        ));
    }

    let mut deviation = counts.runs as f64 - mean;
    if correction && values.len() < RUNS_CORRECTION_LIMIT {
        deviation = deviation.signum() * (deviation.abs() - 0.5).max(0.0);
    }

    let z = deviation / variance.sqrt();
    let p_value = normal_two_sided(z)?;
    Ok(TestOutcome::asymptotic(z, p_value))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() < tol
    }

    #[test]
    fn test_sign_counts_with_ties() {
        let counts = sign_counts(&[5.0, 5.0, 6.0, 7.0, 8.0]).unwrap();
        assert_eq!(counts.median, 6.0);
        assert_eq!(counts.positive, 2);
        assert_eq!(counts.negative, 2);
        assert_eq!(counts.ties, 1);
        assert_eq!(counts.total(), 4);
    }

    #[test]
    fn test_sign_test_balanced() {
        let r = sign_test(&[5.0, 5.0, 6.0, 7.0, 8.0]).unwrap();
        assert_eq!(r.statistic, 2.0);
        assert_eq!(r.p_value, 1.0);
    }

    #[test]
    fn test_sign_test_constant_sample() {
        assert!(matches!(
            sign_test(&[4.0, 4.0, 4.0]),
            Err(StatsError::Degenerate(_))
        ));
        assert!(matches!(
            sign_test(&[]),
            Err(StatsError::InsufficientData(_))
        ));
    }

    #[test]
    fn test_runs_sorted_sample() {
        let values: Vec<f64> = (1..=10).map(|i| i as f64).collect();
        let runs = count_runs(&values).unwrap();
        assert_eq!(runs.runs, 2);
        assert_eq!(runs.above, 5);

        let r = runs_test(&values, true).unwrap();
        assert!(close(r.statistic, -2.3478713763747794, 1e-9));
        assert!(close(r.p_value, 0.018881040151103, 1e-9));
    }

    #[test]
    fn test_runs_alternating_sample() {
        let values = [1.0, 10.0, 2.0, 9.0, 3.0, 8.0, 4.0, 7.0, 5.0, 6.0];
        assert_eq!(count_runs(&values).unwrap().runs, 10);
        let r = runs_test(&values, true).unwrap();
        assert!(close(r.statistic, 2.3478713763747794, 1e-9));
    }

    #[test]
    fn test_runs_without_correction() {
        let values: Vec<f64> = (1..=10).map(|i| i as f64).collect();
        let r = runs_test(&values, false).unwrap();
        // |R - μ| = 4, σ = √(20/9)
        assert!(close(r.statistic, -4.0 / (20.0f64 / 9.0).sqrt(), 1e-12));
    }

    #[test]
    fn test_runs_one_sided_sample() {
        assert!(matches!(
            runs_test(&[3.0, 3.0, 3.0, 3.0], true),
            Err(StatsError::Degenerate(_))
        ));
    }
}
