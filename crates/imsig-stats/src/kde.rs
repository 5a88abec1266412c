//! Gaussian kernel density estimate
//!
//! Used for violin outlines and density overlays. The bandwidth follows
//! Scott's rule, h = σ · n^(-1/5), with σ the sample standard deviation.

use crate::error::{ensure_finite, StatsError, StatsResult};
use crate::summary::SummaryStats;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// One-dimensional Gaussian KDE
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GaussianKde {
    data: Vec<f64>,
    bandwidth: f64,
}

impl GaussianKde {
    /// Fit a KDE with Scott's bandwidth
    pub fn new(data: &[f64]) -> StatsResult<Self> {
        ensure_finite(data, "density sample")?;
        if data.len() < 2 {
            return Err(StatsError::InsufficientData(
                "density estimate needs at least 2 observations".to_string(),
            ));
        }
        let std_dev = SummaryStats::from_data(data).std_dev;
        if std_dev <= 0.0 {
            return Err(StatsError::Degenerate(
                "density estimate of a constant sample".to_string(),
            ));
        }
        let bandwidth = std_dev * (data.len() as f64).powf(-0.2);
        Ok(Self {
            data: data.to_vec(),
            bandwidth,
        })
    }

    pub fn bandwidth(&self) -> f64 {
        self.bandwidth
    }

    /// Density at `x`
    pub fn evaluate(&self, x: f64) -> f64 {
        let h = self.bandwidth;
        let norm = 1.0 / ((2.0 * PI).sqrt() * h * self.data.len() as f64);
        self.data
            .iter()
            .map(|&xi| {
                let u = (x - xi) / h;
                (-0.5 * u * u).exp()
            })
            .sum::<f64>()
            * norm
    }

    /// Density on `points` evenly spaced samples spanning the data ± 3h
    pub fn grid(&self, points: usize) -> Vec<(f64, f64)> {
        let points = points.max(2);
        let min = self.data.iter().copied().fold(f64::INFINITY, f64::min) - 3.0 * self.bandwidth;
        let max = self.data.iter().copied().fold(f64::NEG_INFINITY, f64::max) + 3.0 * self.bandwidth;
        let step = (max - min) / (points - 1) as f64;
        (0..points)
            .map(|i| {
                let x = min + step * i as f64;
                (x, self.evaluate(x))
            })
            .collect()
    }
}
