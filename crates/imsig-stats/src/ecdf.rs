//! Empirical Cumulative Distribution Function (ECDF)
//!
//! For a sample of n values, ECDF(x) = (number of values <= x) / n.
//! The two-sample Kolmogorov-Smirnov statistic is the largest vertical gap
//! between two ECDFs, so counts are exposed as integers to keep that
//! comparison exact.

use serde::{Deserialize, Serialize};

/// Empirical Cumulative Distribution Function
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ecdf {
    /// Sorted finite values
    values: Vec<f64>,
}

impl Ecdf {
    /// Build an ECDF from data, ignoring non-finite values
    ///
    /// Time complexity: O(n log n) for sorting
    pub fn from_data(data: &[f64]) -> Self {
        let mut values: Vec<f64> = data.iter().copied().filter(|x| x.is_finite()).collect();
        values.sort_by(|a, b| a.total_cmp(b));
        Self { values }
    }

    /// Number of values <= x
    ///
    /// Time complexity: O(log n)
    pub fn count_le(&self, x: f64) -> usize {
        self.values.partition_point(|&v| v <= x)
    }

    /// Get the number of samples
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the ECDF is empty
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
