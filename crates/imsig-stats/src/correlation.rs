//! Rank correlation
//!
//! Spearman's rho and Kendall's tau-b for paired samples. Both report the
//! coefficient as the statistic with a two-sided p-value for H₀: no
//! monotonic association.

use crate::distribution::{factorial, normal_two_sided, student_t_two_sided};
use crate::error::{ensure_finite, StatsError, StatsResult};
use crate::outcome::TestOutcome;
use crate::rank::rank_average;

/// Kendall's tau uses the exact permutation distribution up to this many pairs
const KENDALL_EXACT_LIMIT: usize = 33;

fn check_pairs(x: &[f64], y: &[f64], min: usize, what: &str) -> StatsResult<()> {
    if x.len() != y.len() {
        return Err(StatsError::InvalidArgument(format!(
            "paired samples differ in length ({} vs {})",
            x.len(),
            y.len()
        )));
    }
    if x.len() < min {
        return Err(StatsError::InsufficientData(format!(
            "{} needs at least {} pairs, got {}",
            what,
            min,
            x.len()
        )));
    }
    ensure_finite(x, "first sample")?;
    ensure_finite(y, "second sample")
}

fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
    let n = x.len() as f64;
    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;

    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (&a, &b) in x.iter().zip(y.iter()) {
        let dx = a - mean_x;
        let dy = b - mean_y;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    if sxx == 0.0 || syy == 0.0 {
        return None;
    }
    Some(sxy / (sxx * syy).sqrt())
}

/// Spearman's rank correlation coefficient.
///
/// rho is the Pearson correlation of the average ranks. The p-value uses
/// t = rho · √((n-2) / (1 - rho²)) against Student's t with n-2 degrees of
/// freedom.
pub fn spearman(x: &[f64], y: &[f64]) -> StatsResult<TestOutcome> {
    check_pairs(x, y, 3, "Spearman correlation")?;

    let rx = rank_average(x).ranks;
    let ry = rank_average(y).ranks;
    let rho = pearson(&rx, &ry).ok_or_else(|| {
        StatsError::Degenerate("correlation of a constant sample is undefined".to_string())
    })?;
    let rho = rho.clamp(-1.0, 1.0);

    let df = (x.len() - 2) as f64;
    let denom = (1.0 + rho) * (1.0 - rho);
    let p_value = if denom <= 0.0 {
        0.0
    } else {
        let t = rho * (df / denom).sqrt();
        student_t_two_sided(t, df)?
    };
    Ok(TestOutcome::asymptotic(rho, p_value))
}

/// Tie structure of one variable: Σt(t-1)/2, Σt(t-1)(t-2), Σt(t-1)(2t+5)
struct TieSums {
    pairs: f64,
    cubic: f64,
    variance: f64,
}

impl TieSums {
    fn from_values(values: &[f64]) -> Self {
        let mut sums = Self {
            pairs: 0.0,
            cubic: 0.0,
            variance: 0.0,
        };
        for t in rank_average(values).tie_groups {
            let t = t as f64;
            sums.pairs += t * (t - 1.0) / 2.0;
            sums.cubic += t * (t - 1.0) * (t - 2.0);
            sums.variance += t * (t - 1.0) * (2.0 * t + 5.0);
        }
        sums
    }
}

/// Kendall's tau-b.
///
/// # Algorithm
///
/// 1. Count concordant and discordant pairs (pairs tied in either variable
///    count as neither)
/// 2. tau = (C - D) / √((n₀ - n₁)(n₀ - n₂)) where n₀ = n(n-1)/2 and n₁, n₂
///    are the tied pairs in each variable
/// 3. Without ties and for small n (or nearly perfect orderings) the
///    p-value comes from the exact distribution of inversions; otherwise
///    from the tie-corrected normal approximation of C - D
pub fn kendall_tau(x: &[f64], y: &[f64]) -> StatsResult<TestOutcome> {
    check_pairs(x, y, 2, "Kendall's tau")?;
    let n = x.len();

    let mut concordant = 0usize;
    let mut discordant = 0usize;
    for i in 0..n {
        for j in (i + 1)..n {
            let s = (x[i] - x[j]) * (y[i] - y[j]);
            if s > 0.0 {
                concordant += 1;
            } else if s < 0.0 {
                discordant += 1;
            }
        }
    }

    let total = (n * (n - 1) / 2) as f64;
    let xt = TieSums::from_values(x);
    let yt = TieSums::from_values(y);
    if xt.pairs == total || yt.pairs == total {
        return Err(StatsError::Degenerate(
            "correlation of a constant sample is undefined".to_string(),
        ));
    }

    let score = concordant as f64 - discordant as f64;
    let tau = (score / (total - xt.pairs).sqrt() / (total - yt.pairs).sqrt()).clamp(-1.0, 1.0);

    let untied = xt.pairs == 0.0 && yt.pairs == 0.0;
    let near_extreme = discordant.min(n * (n - 1) / 2 - discordant) <= 1;
    if untied && (n <= KENDALL_EXACT_LIMIT || near_extreme) {
        let p_value = kendall_exact_p(n, discordant);
        return Ok(TestOutcome::exact(tau, p_value));
    }

    let nf = n as f64;
    let m = nf * (nf - 1.0);
    let mut variance = (m * (2.0 * nf + 5.0) - xt.variance - yt.variance) / 18.0
        + 2.0 * xt.pairs * yt.pairs / m;
    if n > 2 {
        variance += xt.cubic * yt.cubic / (9.0 * m * (nf - 2.0));
    }
    if variance <= 0.0 {
        return Err(StatsError::Degenerate(
            "Kendall score variance is zero".to_string(),
        ));
    }
    let z = score / variance.sqrt();
    let p_value = normal_two_sided(z)?;
    Ok(TestOutcome::asymptotic(tau, p_value))
}

/// Two-sided p-value for `discordant` inversions among n untied pairs
fn kendall_exact_p(n: usize, discordant: usize) -> f64 {
    let total = n * (n - 1) / 2;
    let c = discordant.min(total - discordant);

    if n <= 2 || 2 * c == total {
        return 1.0;
    }
    if c == 0 {
        return (2.0 / factorial(n as u64)).min(1.0);
    }
    if c == 1 {
        return (2.0 / factorial(n as u64 - 1)).min(1.0);
    }

    // Mahonian numbers: permutations of k elements with a given inversion
    // count, truncated at c
    let mut counts = vec![0.0; c + 1];
    counts[0] = 1.0;
    for k in 2..=n {
        let mut next = vec![0.0; c + 1];
        let mut window = 0.0;
        for s in 0..=c {
            window += counts[s];
            if s >= k {
                window -= counts[s - k];
            }
            next[s] = window;
        }
        counts = next;
    }

    let tail: f64 = counts.iter().sum();
    (2.0 * tail / factorial(n as u64)).min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::PValueMethod;

    fn close(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() < tol
    }

    #[test]
    fn test_spearman_reference() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let y = [5.0, 6.0, 7.0, 8.0, 7.0];
        let r = spearman(&x, &y).unwrap();
        assert!(close(r.statistic, 0.8207826816681233, 1e-12));
        assert!(close(r.p_value, 0.08858700531354381, 1e-9));
    }

    #[test]
    fn test_spearman_perfect_monotone() {
        let x = [1.0, 2.0, 3.0, 4.0];
        let y = [10.0, 20.0, 30.0, 1000.0];
        let r = spearman(&x, &y).unwrap();
        assert!(close(r.statistic, 1.0, 1e-12));
        assert_eq!(r.p_value, 0.0);
    }

    #[test]
    fn test_spearman_preconditions() {
        assert!(matches!(
            spearman(&[1.0, 2.0], &[2.0, 1.0]),
            Err(StatsError::InsufficientData(_))
        ));
        assert!(matches!(
            spearman(&[1.0, 1.0, 1.0], &[1.0, 2.0, 3.0]),
            Err(StatsError::Degenerate(_))
        ));
        assert!(matches!(
            spearman(&[1.0, 2.0, 3.0], &[1.0, 2.0]),
            Err(StatsError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_kendall_with_ties() {
        let x = [12.0, 2.0, 1.0, 12.0, 2.0];
        let y = [1.0, 4.0, 7.0, 1.0, 0.0];
        let r = kendall_tau(&x, &y).unwrap();
        assert_eq!(r.method, PValueMethod::Asymptotic);
        assert!(close(r.statistic, -0.47140452079103173, 1e-12));
        assert!(close(r.p_value, 0.2827454599327748, 1e-9));
    }

    #[test]
    fn test_kendall_ties_in_one_variable() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let y = [5.0, 6.0, 7.0, 8.0, 7.0];
        let r = kendall_tau(&x, &y).unwrap();
        assert!(close(r.statistic, 0.7378647873726218, 1e-12));
        assert!(close(r.p_value, 0.07697417298126674, 1e-9));
    }

    #[test]
    fn test_kendall_exact() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let y = [2.0, 1.0, 4.0, 3.0, 6.0, 5.0];
        let r = kendall_tau(&x, &y).unwrap();
        assert_eq!(r.method, PValueMethod::Exact);
        assert!(close(r.statistic, 0.6, 1e-12));
        assert!(close(r.p_value, 0.1361111111111111, 1e-12));
    }

    #[test]
    fn test_kendall_perfect_order() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let r = kendall_tau(&x, &x).unwrap();
        assert_eq!(r.statistic, 1.0);
        assert!(close(r.p_value, 2.0 / 120.0, 1e-12));
    }

    #[test]
    fn test_kendall_constant_is_degenerate() {
        assert!(matches!(
            kendall_tau(&[3.0, 3.0, 3.0], &[1.0, 2.0, 3.0]),
            Err(StatsError::Degenerate(_))
        ));
    }
}
