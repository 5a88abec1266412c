//! Tail probabilities of the reference distributions
//!
//! Thin wrappers over `statrs` plus the Kolmogorov distributions (finite n
//! and limiting), which `statrs` does not provide.

use crate::error::{StatsError, StatsResult};
use statrs::distribution::{Binomial, ChiSquared, ContinuousCDF, Discrete, Normal, StudentsT};

/// Relative tolerance when comparing binomial probabilities to the observed one
const BINOMIAL_RELATIVE_TOLERANCE: f64 = 1e-7;

fn distribution_error(e: impl std::fmt::Display) -> StatsError {
    StatsError::Distribution(e.to_string())
}

/// Upper tail P(Z > z) of the standard normal
pub fn normal_sf(z: f64) -> StatsResult<f64> {
    let normal = Normal::new(0.0, 1.0).map_err(distribution_error)?;
    Ok(normal.sf(z))
}

/// Two-sided normal p-value 2·P(Z > |z|)
pub fn normal_two_sided(z: f64) -> StatsResult<f64> {
    Ok((2.0 * normal_sf(z.abs())?).min(1.0))
}

/// Upper tail of the chi-squared distribution with `df` degrees of freedom
pub fn chi_squared_sf(x: f64, df: f64) -> StatsResult<f64> {
    let chi2 = ChiSquared::new(df).map_err(distribution_error)?;
    Ok(chi2.sf(x))
}

/// Two-sided Student t p-value 2·P(T > |t|)
pub fn student_t_two_sided(t: f64, df: f64) -> StatsResult<f64> {
    let dist = StudentsT::new(0.0, 1.0, df).map_err(distribution_error)?;
    Ok((2.0 * dist.sf(t.abs())).min(1.0))
}

/// Exact two-sided binomial test of `successes` out of `trials` at `p`
///
/// Sums the probability of every outcome that is no more likely than the
/// observed one.
pub fn binomial_two_sided(successes: u64, trials: u64, p: f64) -> StatsResult<f64> {
    if successes > trials {
        return Err(StatsError::InvalidArgument(format!(
            "{} successes exceed {} trials",
            successes, trials
        )));
    }
    if trials == 0 {
        return Err(StatsError::InsufficientData(
            "binomial test needs at least one trial".to_string(),
        ));
    }
    if successes as f64 == p * trials as f64 {
        return Ok(1.0);
    }

    let binomial = Binomial::new(p, trials).map_err(distribution_error)?;
    let observed = binomial.pmf(successes) * (1.0 + BINOMIAL_RELATIVE_TOLERANCE);
    let p_value: f64 = (0..=trials)
        .map(|k| binomial.pmf(k))
        .filter(|&pk| pk <= observed)
        .sum();
    Ok(p_value.min(1.0))
}

/// Survival function of the Kolmogorov distribution, Q(λ) = P(K > λ)
///
/// Q(λ) = 2 Σ (-1)^(k-1) exp(-2 k² λ²)
pub fn kolmogorov_sf(lambda: f64) -> f64 {
    if lambda <= 0.0 {
        return 1.0;
    }
    // The alternating series converges too slowly below this point; Q is 1 to
    // double precision there anyway.
    if lambda < 0.2 {
        return 1.0;
    }

    let mut sum = 0.0;
    let mut sign = 1.0;
    for k in 1..=100 {
        let k = k as f64;
        let term = (-2.0 * k * k * lambda * lambda).exp();
        sum += sign * term;
        if term < 1e-16 {
            break;
        }
        sign = -sign;
    }
    (2.0 * sum).clamp(0.0, 1.0)
}

/// Largest n evaluated with the Durbin matrix; beyond it Stephens'
/// correction of the limiting distribution is accurate to about 1e-3
const KOLMOGOROV_MATRIX_MAX_N: u64 = 140;

/// Rescaling step for the matrix power, as a power of ten
const MATRIX_EXPONENT_STEP: i32 = 140;

/// Survival function P(Dₙ ≥ d) of the one-sample Kolmogorov statistic for
/// sample size n
///
/// Small n uses the Durbin matrix formula (Marsaglia, Tsang & Wang 2003).
/// When n·d² is large the tail is 2·exp(-(2.000071 + 0.331/√n + 1.409/n)·n·d²);
/// larger n use Q((√n + 0.12 + 0.11/√n)·d).
pub fn kolmogorov_finite_sf(d: f64, n: u64) -> f64 {
    if n == 0 || d.is_nan() {
        return 1.0;
    }
    let nf = n as f64;
    // Dₙ is never below 1/(2n) and never above 1
    if d <= 0.5 / nf {
        return 1.0;
    }
    if d >= 1.0 {
        return 0.0;
    }

    let s = nf * d * d;
    if s > 7.24 || (s > 3.76 && n > 99) {
        let rate = 2.000071 + 0.331 / nf.sqrt() + 1.409 / nf;
        return (2.0 * (-rate * s).exp()).clamp(0.0, 1.0);
    }
    if n > KOLMOGOROV_MATRIX_MAX_N {
        let root = nf.sqrt();
        return kolmogorov_sf((root + 0.12 + 0.11 / root) * d);
    }
    (1.0 - durbin_cdf(n, d)).clamp(0.0, 1.0)
}

/// P(Dₙ < d) from the k-th diagonal entry of Hⁿ, with H the
/// (2k-1)×(2k-1) Durbin matrix
fn durbin_cdf(n: u64, d: f64) -> f64 {
    let nd = n as f64 * d;
    let k = nd as usize + 1;
    let m = 2 * k - 1;
    let h = k as f64 - nd;

    let mut matrix = vec![0.0; m * m];
    for i in 0..m {
        for j in 0..m {
            if i + 1 >= j {
                matrix[i * m + j] = 1.0;
            }
        }
    }
    for i in 0..m {
        matrix[i * m] -= h.powi(i as i32 + 1);
        matrix[(m - 1) * m + i] -= h.powi((m - i) as i32);
    }
    if 2.0 * h - 1.0 > 0.0 {
        matrix[(m - 1) * m] += (2.0 * h - 1.0).powi(m as i32);
    }
    for i in 0..m {
        for j in 0..m {
            if i + 1 > j {
                matrix[i * m + j] /= factorial((i + 1 - j) as u64);
            }
        }
    }

    let (power, mut exponent) = matrix_power(&matrix, 0, m, n);
    let mut s = power[(k - 1) * m + (k - 1)];
    for i in 1..=n {
        s = s * i as f64 / n as f64;
        if s < 1e-140 {
            s *= 1e140;
            exponent -= MATRIX_EXPONENT_STEP;
        }
    }
    s * 10f64.powi(exponent)
}

fn matrix_multiply(a: &[f64], b: &[f64], m: usize) -> Vec<f64> {
    let mut c = vec![0.0; m * m];
    for i in 0..m {
        for k in 0..m {
            let aik = a[i * m + k];
            if aik == 0.0 {
                continue;
            }
            for j in 0..m {
                c[i * m + j] += aik * b[k * m + j];
            }
        }
    }
    c
}

/// aⁿ as (matrix, decimal exponent), rescaled to stay in range
fn matrix_power(a: &[f64], exponent: i32, m: usize, n: u64) -> (Vec<f64>, i32) {
    if n == 1 {
        return (a.to_vec(), exponent);
    }
    let (half, half_exponent) = matrix_power(a, exponent, m, n / 2);
    let mut result = matrix_multiply(&half, &half, m);
    let mut result_exponent = 2 * half_exponent;
    if n % 2 == 1 {
        result = matrix_multiply(a, &result, m);
        result_exponent += exponent;
    }
    let centre = (m / 2) * m + m / 2;
    if result[centre] > 1e140 {
        for x in result.iter_mut() {
            *x *= 1e-140;
        }
        result_exponent += MATRIX_EXPONENT_STEP;
    }
    (result, result_exponent)
}

/// n! as a float (`inf` beyond 170)
pub fn factorial(n: u64) -> f64 {
    (1..=n).fold(1.0, |acc, k| acc * k as f64)
}
