//! Two-sample rank tests
//!
//! - Mann-Whitney U (independent samples)
//! - Wilcoxon signed-rank (paired samples)
//! - Kolmogorov-Smirnov (independent samples, whole-distribution comparison)
//!
//! All tests are two-sided. Exact null distributions are used for small
//! samples without ties; larger samples use normal or Kolmogorov
//! approximations.

use crate::distribution::{kolmogorov_finite_sf, normal_sf, normal_two_sided};
use crate::ecdf::Ecdf;
use crate::error::{ensure_finite, StatsError, StatsResult};
use crate::outcome::TestOutcome;
use crate::rank::rank_average;

/// The exact U distribution is used unless both samples exceed this size
/// (or there are ties)
const MANN_WHITNEY_EXACT_LIMIT: usize = 8;

/// Signed-rank tests with at most this many non-zero differences are exact
const WILCOXON_EXACT_LIMIT: usize = 50;

/// Kolmogorov-Smirnov p-values are exact while the larger sample has at most
/// this many observations
const KS_EXACT_LIMIT: usize = 10_000;

// ---------------------------------------------------------------------------
// Mann-Whitney U
// ---------------------------------------------------------------------------

/// Mann-Whitney U test: H₀: both samples come from the same distribution.
///
/// The statistic is U of the first sample, U₁ = R₁ - n₁(n₁+1)/2.
///
/// # Algorithm
///
/// 1. Rank the pooled observations (average ranks for ties)
/// 2. Exact p-value from the U distribution when at least one sample has
///    at most 8 observations and there are no ties
/// 3. Otherwise z = (max(U₁, U₂) - n₁n₂/2 - 0.5) / σ with tie-corrected σ
pub fn mann_whitney_u(a: &[f64], b: &[f64]) -> StatsResult<TestOutcome> {
    let n1 = a.len();
    let n2 = b.len();
    if n1 == 0 || n2 == 0 {
        return Err(StatsError::InsufficientData(
            "Mann-Whitney U needs two non-empty samples".to_string(),
        ));
    }
    ensure_finite(a, "first sample")?;
    ensure_finite(b, "second sample")?;

    let pooled: Vec<f64> = a.iter().chain(b.iter()).copied().collect();
    let ranking = rank_average(&pooled);

    let n1f = n1 as f64;
    let n2f = n2 as f64;
    let nf = (n1 + n2) as f64;

    let r1: f64 = ranking.ranks[..n1].iter().sum();
    let u1 = r1 - n1f * (n1f + 1.0) / 2.0;
    let u2 = n1f * n2f - u1;
    let u = u1.max(u2);

    let both_large = n1 > MANN_WHITNEY_EXACT_LIMIT && n2 > MANN_WHITNEY_EXACT_LIMIT;
    if !both_large && !ranking.has_ties() {
        let p_value = 2.0 * mann_whitney_exact_sf(u, n1, n2);
        return Ok(TestOutcome::exact(u1, p_value));
    }

    let sigma_sq = n1f * n2f / 12.0 * ((nf + 1.0) - ranking.tie_term() / (nf * (nf - 1.0)));
    if sigma_sq <= 0.0 {
        return Err(StatsError::Degenerate(
            "all observations are identical".to_string(),
        ));
    }

    let z = (u - n1f * n2f / 2.0 - 0.5) / sigma_sq.sqrt();
    let p_value = 2.0 * normal_sf(z)?;
    Ok(TestOutcome::asymptotic(u1, p_value))
}

/// P(U >= u) under H₀ for sample sizes n1, n2 (no ties)
fn mann_whitney_exact_sf(u: f64, n1: usize, n2: usize) -> f64 {
    // The number of orderings with U = d is the q^d coefficient of the
    // Gaussian binomial [n1 + n2 choose k]_q, k = min(n1, n2), built one
    // factor (1 - q^(n+i)) / (1 - q^i) at a time.
    let k = n1.min(n2);
    let n = n1.max(n2);
    let degree = k * n;
    let mut counts = vec![0.0; degree + 1];
    counts[0] = 1.0;
    for i in 1..=k {
        let shift = n + i;
        for d in (shift..=degree).rev() {
            counts[d] -= counts[d - shift];
        }
        for d in i..=degree {
            counts[d] += counts[d - i];
        }
    }

    let total: f64 = counts.iter().sum();
    let start = (u.ceil().max(0.0) as usize).min(counts.len());
    counts[start..].iter().sum::<f64>() / total
}

// ---------------------------------------------------------------------------
// Wilcoxon signed-rank
// ---------------------------------------------------------------------------

/// Wilcoxon signed-rank test: H₀: the paired differences are symmetric
/// about zero.
///
/// The statistic is T = min(T⁺, T⁻).
///
/// # Algorithm
///
/// 1. dᵢ = xᵢ - yᵢ, zero differences discarded
/// 2. Rank |dᵢ| (average ranks for ties)
/// 3. Exact p-value from the subset-sum distribution when n ≤ 50 and there
///    were neither ties nor zero differences
/// 4. Otherwise z = (T - n(n+1)/4) / σ with tie-corrected σ, no continuity
///    correction
pub fn wilcoxon_signed_rank(x: &[f64], y: &[f64]) -> StatsResult<TestOutcome> {
    if x.len() != y.len() {
        return Err(StatsError::InvalidArgument(format!(
            "paired samples differ in length ({} vs {})",
            x.len(),
            y.len()
        )));
    }
    ensure_finite(x, "first sample")?;
    ensure_finite(y, "second sample")?;

    let all_diffs: Vec<f64> = x.iter().zip(y.iter()).map(|(&a, &b)| a - b).collect();
    let diffs: Vec<f64> = all_diffs.iter().copied().filter(|&d| d != 0.0).collect();
    let had_zeros = diffs.len() != all_diffs.len();

    let n = diffs.len();
    if n == 0 {
        return Err(StatsError::Degenerate(
            "all paired differences are zero".to_string(),
        ));
    }

    let abs_diffs: Vec<f64> = diffs.iter().map(|d| d.abs()).collect();
    let ranking = rank_average(&abs_diffs);

    let (mut r_plus, mut r_minus) = (0.0, 0.0);
    for (d, r) in diffs.iter().zip(ranking.ranks.iter()) {
        if *d > 0.0 {
            r_plus += r;
        } else {
            r_minus += r;
        }
    }
    let t = r_plus.min(r_minus);

    if n <= WILCOXON_EXACT_LIMIT && !ranking.has_ties() && !had_zeros {
        let p_value = 2.0 * wilcoxon_exact_cdf(t, n);
        return Ok(TestOutcome::exact(t, p_value));
    }

    let nf = n as f64;
    let mean = nf * (nf + 1.0) / 4.0;
    let variance = (nf * (nf + 1.0) * (2.0 * nf + 1.0) - 0.5 * ranking.tie_term()) / 24.0;
    if variance <= 0.0 {
        return Err(StatsError::Degenerate(
            "signed-rank variance is zero".to_string(),
        ));
    }

    let z = (t - mean) / variance.sqrt();
    let p_value = normal_two_sided(z)?;
    Ok(TestOutcome::asymptotic(t, p_value))
}

/// P(T <= t) under H₀ for n untied, non-zero differences
fn wilcoxon_exact_cdf(t: f64, n: usize) -> f64 {
    // counts[s] = number of subsets of {1..n} whose rank sum is s
    let max_sum = n * (n + 1) / 2;
    let mut counts = vec![0.0; max_sum + 1];
    counts[0] = 1.0;
    for k in 1..=n {
        for s in (k..=max_sum).rev() {
            counts[s] += counts[s - k];
        }
    }

    let upper = (t.floor().max(0.0) as usize).min(max_sum);
    let total = 2f64.powi(n as i32);
    counts[..=upper].iter().sum::<f64>() / total
}

// ---------------------------------------------------------------------------
// Kolmogorov-Smirnov
// ---------------------------------------------------------------------------

/// Two-sample Kolmogorov-Smirnov test: H₀: both samples share one
/// continuous distribution.
///
/// The statistic is D = sup |F₁(x) - F₂(x)|.
///
/// # Algorithm
///
/// D is computed exactly on the integer lattice |i·n - j·m|. While the larger
/// sample has at most 10 000 observations the p-value is the probability that
/// a uniformly random monotone lattice path leaves the band |i/m - j/n| < D.
/// Larger samples use the one-sample Kolmogorov distribution for
/// n = round(mn/(m+n)).
pub fn kolmogorov_smirnov(a: &[f64], b: &[f64]) -> StatsResult<TestOutcome> {
    let m = a.len();
    let n = b.len();
    if m == 0 || n == 0 {
        return Err(StatsError::InsufficientData(
            "Kolmogorov-Smirnov needs two non-empty samples".to_string(),
        ));
    }
    ensure_finite(a, "first sample")?;
    ensure_finite(b, "second sample")?;

    let ecdf_a = Ecdf::from_data(a);
    let ecdf_b = Ecdf::from_data(b);

    // Largest |i·n - j·m| over the pooled support
    let gap = a
        .iter()
        .chain(b.iter())
        .map(|&x| {
            let i = ecdf_a.count_le(x) as i64;
            let j = ecdf_b.count_le(x) as i64;
            (i * n as i64 - j * m as i64).unsigned_abs()
        })
        .max()
        .unwrap_or(0);

    let mn = (m * n) as f64;
    let d = gap as f64 / mn;

    if m.max(n) <= KS_EXACT_LIMIT {
        let p_value = ks_exact_sf(gap, m, n);
        return Ok(TestOutcome::exact(d, p_value));
    }

    let en = (mn / (m + n) as f64).round() as u64;
    let p_value = kolmogorov_finite_sf(d, en);
    Ok(TestOutcome::asymptotic(d, p_value))
}

/// P(D >= gap/(mn)) as the probability mass of lattice paths that leave the
/// band
///
/// Each path from (0, 0) to (m, n) is equally likely, so from (i, j) the
/// path steps along the first sample with probability (m - i)/(m + n - i - j).
/// Mass is carried only through points inside the band and summed where it
/// first steps outside, which keeps tiny p-values representable.
fn ks_exact_sf(gap: u64, m: usize, n: usize) -> f64 {
    if gap == 0 {
        return 1.0;
    }
    let outside = |i: usize, j: usize| -> bool {
        ((i * n) as i64 - (j * m) as i64).unsigned_abs() >= gap
    };

    let mut exited = 0.0;
    let mut row = vec![0.0; n + 1];
    row[0] = 1.0;
    for i in 0..=m {
        let mut next = vec![0.0; n + 1];
        for j in 0..=n {
            let mass = row[j];
            if mass == 0.0 {
                continue;
            }
            let remaining = (m + n - i - j) as f64;
            if i < m {
                let step = mass * (m - i) as f64 / remaining;
                if outside(i + 1, j) {
                    exited += step;
                } else {
                    next[j] += step;
                }
            }
            if j < n {
                let step = mass * (n - j) as f64 / remaining;
                if outside(i, j + 1) {
                    exited += step;
                } else {
                    row[j + 1] += step;
                }
            }
        }
        row = next;
    }
    exited
}
