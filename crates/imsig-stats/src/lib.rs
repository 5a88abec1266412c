//! imsig-stats - Statistical routines for non-parametric testing
//!
//! This crate provides the numeric layer underneath the imsig engine:
//!
//! - **Ranks**: average ranks with tie bookkeeping
//! - **Distributions**: normal, chi-squared, Student t, binomial and
//!   Kolmogorov tail probabilities
//! - **Two-sample tests**: Mann-Whitney U, Wilcoxon signed-rank,
//!   Kolmogorov-Smirnov
//! - **Correlation tests**: Spearman's rho, Kendall's tau-b
//! - **Group tests**: Kruskal-Wallis H, Friedman chi-square
//! - **One-sample tests**: sign test, Wald-Wolfowitz runs test
//! - **Descriptive helpers**: summary statistics, ECDF, Gaussian KDE
//!
//! # Conventions
//!
//! Every test returns a [`TestOutcome`] with a two-sided p-value clamped to
//! [0, 1], or a [`StatsError`] describing why the statistic is undefined.
//! Inputs are plain `&[f64]` slices; missing values must be removed by the
//! caller.

pub mod correlation;
pub mod distribution;
pub mod ecdf;
pub mod error;
pub mod groups;
pub mod kde;
pub mod one_sample;
pub mod outcome;
pub mod rank;
pub mod summary;
pub mod two_sample;

pub use correlation::*;
pub use ecdf::*;
pub use error::*;
pub use groups::*;
pub use kde::*;
pub use one_sample::*;
pub use outcome::*;
pub use rank::*;
pub use summary::*;
pub use two_sample::*;
