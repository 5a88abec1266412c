//! Average ranks with tie bookkeeping
//!
//! Tied values share the mean of the ranks they span, which is the
//! convention every rank test in this crate relies on.

/// Ranks of a sample together with its tie structure
#[derive(Debug, Clone, PartialEq)]
pub struct Ranking {
    /// 1-based average ranks, in the original order of the input
    pub ranks: Vec<f64>,
    /// Size of every tie group (including singletons)
    pub tie_groups: Vec<usize>,
}

impl Ranking {
    /// Σ (t³ - t) over tie groups
    pub fn tie_term(&self) -> f64 {
        self.tie_groups
            .iter()
            .map(|&t| {
                let t = t as f64;
                t * t * t - t
            })
            .sum()
    }

    /// Whether any two values are tied
    pub fn has_ties(&self) -> bool {
        self.tie_groups.iter().any(|&t| t > 1)
    }
}

/// Rank `values`, averaging the ranks of exact ties
pub fn rank_average(values: &[f64]) -> Ranking {
    let n = values.len();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut ranks = vec![0.0; n];
    let mut tie_groups = Vec::new();
    let mut i = 0;
    while i < n {
        let mut j = i + 1;
        while j < n && values[order[j]] == values[order[i]] {
            j += 1;
        }
        // Positions i..j are tied; average rank = (i+1 + j) / 2
        let avg_rank = (i + 1 + j) as f64 / 2.0;
        for &idx in &order[i..j] {
            ranks[idx] = avg_rank;
        }
        tie_groups.push(j - i);
        i = j;
    }

    Ranking { ranks, tie_groups }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rank_without_ties() {
        let r = rank_average(&[30.0, 10.0, 20.0]);
        assert_eq!(r.ranks, vec![3.0, 1.0, 2.0]);
        assert!(!r.has_ties());
        assert_eq!(r.tie_term(), 0.0);
    }

    #[test]
    fn test_rank_with_ties() {
        let r = rank_average(&[1.0, 2.0, 2.0, 3.0, 2.0]);
        assert_eq!(r.ranks, vec![1.0, 3.0, 3.0, 5.0, 3.0]);
        assert!(r.has_ties());
        // one group of three: 27 - 3
        assert_eq!(r.tie_term(), 24.0);
    }

    #[test]
    fn test_rank_sum_invariant() {
        let data = [4.0, 4.0, 1.0, 9.0, 9.0, 9.0, 2.0];
        let r = rank_average(&data);
        let n = data.len() as f64;
        assert_eq!(r.ranks.iter().sum::<f64>(), n * (n + 1.0) / 2.0);
    }
}
