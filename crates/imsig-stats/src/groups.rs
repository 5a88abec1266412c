//! k-sample rank tests
//!
//! Kruskal-Wallis compares independent groups; Friedman compares repeated
//! measures of the same subjects. Both refer their statistic to the
//! chi-squared distribution with k - 1 degrees of freedom.

use crate::distribution::chi_squared_sf;
use crate::error::{ensure_finite, StatsError, StatsResult};
use crate::outcome::TestOutcome;
use crate::rank::rank_average;

/// Kruskal-Wallis H test: H₀: all groups share one distribution.
///
/// H = 12 / (N(N+1)) · Σ Rᵢ²/nᵢ - 3(N+1), divided by the tie correction
/// 1 - Σ(t³-t) / (N³-N).
pub fn kruskal_wallis<G: AsRef<[f64]>>(groups: &[G]) -> StatsResult<TestOutcome> {
    if groups.len() < 2 {
        return Err(StatsError::InsufficientData(
            "at least 2 groups required".to_string(),
        ));
    }
    for group in groups {
        let group = group.as_ref();
        if group.is_empty() {
            return Err(StatsError::InsufficientData(
                "every group needs at least one observation".to_string(),
            ));
        }
        ensure_finite(group, "group")?;
    }

    let pooled: Vec<f64> = groups
        .iter()
        .flat_map(|g| g.as_ref().iter().copied())
        .collect();
    let ranking = rank_average(&pooled);
    let n = pooled.len() as f64;

    let correction = 1.0 - ranking.tie_term() / (n * n * n - n);
    if correction <= 0.0 {
        return Err(StatsError::Degenerate(
            "all observations are identical".to_string(),
        ));
    }

    let mut offset = 0;
    let mut sum = 0.0;
    for group in groups {
        let len = group.as_ref().len();
        let rank_sum: f64 = ranking.ranks[offset..offset + len].iter().sum();
        sum += rank_sum * rank_sum / len as f64;
        offset += len;
    }

    let h = (12.0 / (n * (n + 1.0)) * sum - 3.0 * (n + 1.0)) / correction;
    let df = (groups.len() - 1) as f64;
    let p_value = chi_squared_sf(h, df)?;
    Ok(TestOutcome::asymptotic(h, p_value))
}

/// Friedman test for repeated measures: H₀: the k treatments have identical
/// effects.
///
/// `samples` holds one slice per treatment; row i across all slices is one
/// subject. Values are ranked within each subject, and the statistic is
///
/// χ² = (12 / (n·k·(k+1)) · Σ Rⱼ² - 3n(k+1)) / c
///
/// with the within-row tie correction c = 1 - Σ(t³-t) / (n·k·(k²-1)).
pub fn friedman<S: AsRef<[f64]>>(samples: &[S]) -> StatsResult<TestOutcome> {
    let k = samples.len();
    if k < 3 {
        return Err(StatsError::InsufficientData(format!(
            "Friedman test needs at least 3 measurement sets, got {}",
            k
        )));
    }
    let n = samples[0].as_ref().len();
    if samples.iter().any(|s| s.as_ref().len() != n) {
        return Err(StatsError::InvalidArgument(
            "measurement sets must all have the same length".to_string(),
        ));
    }
    if n == 0 {
        return Err(StatsError::InsufficientData(
            "Friedman test needs at least one subject".to_string(),
        ));
    }
    for sample in samples {
        ensure_finite(sample.as_ref(), "measurement set")?;
    }

    let mut rank_sums = vec![0.0; k];
    let mut ties = 0.0;
    let mut row = vec![0.0; k];
    for i in 0..n {
        for (j, sample) in samples.iter().enumerate() {
            row[j] = sample.as_ref()[i];
        }
        let ranking = rank_average(&row);
        for (sum, rank) in rank_sums.iter_mut().zip(ranking.ranks.iter()) {
            *sum += rank;
        }
        ties += ranking.tie_term();
    }

    let nf = n as f64;
    let kf = k as f64;
    let correction = 1.0 - ties / (nf * kf * (kf * kf - 1.0));
    if correction <= 0.0 {
        return Err(StatsError::Degenerate(
            "every subject has identical measurements".to_string(),
        ));
    }

    let ssbn: f64 = rank_sums.iter().map(|r| r * r).sum();
    let chi = (12.0 / (nf * kf * (kf + 1.0)) * ssbn - 3.0 * nf * (kf + 1.0)) / correction;
    let p_value = chi_squared_sf(chi, kf - 1.0)?;
    Ok(TestOutcome::asymptotic(chi, p_value))
}
