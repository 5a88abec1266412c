//! Catalog of the supported tests
//!
//! Every [`TestName`] maps to a static [`TestDescriptor`] holding its arity,
//! pairing requirement and the routine that computes it. Dispatch is an
//! exhaustive `match` on the enum, so adding a test without a descriptor
//! does not compile.

use imsig_stats::{StatsError, StatsResult, TestOutcome};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The nine supported non-parametric tests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TestName {
    MannWhitneyU,
    KolmogorovSmirnov,
    WilcoxonSignedRank,
    Spearman,
    KendallTau,
    KruskalWallis,
    Friedman,
    SignTest,
    RunsTest,
}

impl TestName {
    pub const ALL: [TestName; 9] = [
        TestName::MannWhitneyU,
        TestName::KolmogorovSmirnov,
        TestName::WilcoxonSignedRank,
        TestName::Spearman,
        TestName::KendallTau,
        TestName::KruskalWallis,
        TestName::Friedman,
        TestName::SignTest,
        TestName::RunsTest,
    ];

    /// Name shown to users and in reports
    pub fn display_name(&self) -> &'static str {
        match self {
            TestName::MannWhitneyU => "Mann-Whitney U Test",
            TestName::KolmogorovSmirnov => "Kolmogorov-Smirnov Test",
            TestName::WilcoxonSignedRank => "Wilcoxon Signed-Rank Test",
            TestName::Spearman => "Spearman's Rank Correlation",
            TestName::KendallTau => "Kendall's Tau",
            TestName::KruskalWallis => "Kruskal-Wallis Test",
            TestName::Friedman => "Friedman Test",
            TestName::SignTest => "Sign Test",
            TestName::RunsTest => "Runs Test (Wald-Wolfowitz)",
        }
    }

    /// Short identifier accepted on the command line
    pub fn short_id(&self) -> &'static str {
        match self {
            TestName::MannWhitneyU => "mann-whitney",
            TestName::KolmogorovSmirnov => "ks",
            TestName::WilcoxonSignedRank => "wilcoxon",
            TestName::Spearman => "spearman",
            TestName::KendallTau => "kendall",
            TestName::KruskalWallis => "kruskal",
            TestName::Friedman => "friedman",
            TestName::SignTest => "sign",
            TestName::RunsTest => "runs",
        }
    }

    /// Static descriptor for this test
    pub fn descriptor(&self) -> &'static TestDescriptor {
        match self {
            TestName::MannWhitneyU => &MANN_WHITNEY_U,
            TestName::KolmogorovSmirnov => &KOLMOGOROV_SMIRNOV,
            TestName::WilcoxonSignedRank => &WILCOXON_SIGNED_RANK,
            TestName::Spearman => &SPEARMAN,
            TestName::KendallTau => &KENDALL_TAU,
            TestName::KruskalWallis => &KRUSKAL_WALLIS,
            TestName::Friedman => &FRIEDMAN,
            TestName::SignTest => &SIGN_TEST,
            TestName::RunsTest => &RUNS_TEST,
        }
    }
}

impl fmt::Display for TestName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Unrecognized test name
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Unknown test '{0}' (expected one of: mann-whitney, ks, wilcoxon, spearman, kendall, kruskal, friedman, sign, runs)")]
pub struct ParseTestNameError(pub String);

impl FromStr for TestName {
    type Err = ParseTestNameError;

    /// Accepts the display name or short id, case-insensitively
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        TestName::ALL
            .into_iter()
            .find(|t| t.short_id() == wanted || t.display_name().to_lowercase() == wanted)
            .ok_or_else(|| ParseTestNameError(s.to_string()))
    }
}

/// How many columns a test consumes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Arity {
    /// The primary column only
    OneColumn,
    /// Primary and secondary column
    TwoColumn,
    /// Columns of the whole dataset, regardless of the selection
    WholeDataset,
}

/// How observations of two columns relate to each other
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Pairing {
    /// Row-aligned pairs; both columns must have equal observation counts
    Paired,
    /// Row-aligned pairs; rows missing either value are dropped
    RowAligned,
    /// Independent samples
    Unpaired,
}

/// Prepared input for a compute function
#[derive(Debug, Clone, PartialEq)]
pub enum Samples {
    One(Vec<f64>),
    Two(Vec<f64>, Vec<f64>),
    Groups(Vec<Vec<f64>>),
}

impl Samples {
    /// Total number of values across all arrays
    pub fn len(&self) -> usize {
        match self {
            Samples::One(v) => v.len(),
            Samples::Two(a, b) => a.len() + b.len(),
            Samples::Groups(groups) => groups.iter().map(Vec::len).sum(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn shape(&self) -> &'static str {
        match self {
            Samples::One(_) => "one sample",
            Samples::Two(..) => "two samples",
            Samples::Groups(_) => "grouped samples",
        }
    }
}

/// Routine computing (statistic, p-value) from prepared samples
pub type ComputeFn = fn(&Samples) -> StatsResult<TestOutcome>;

/// Static description of a test
pub struct TestDescriptor {
    pub name: TestName,
    pub arity: Arity,
    pub pairing: Pairing,
    pub compute: ComputeFn,
}

impl fmt::Debug for TestDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestDescriptor")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .field("pairing", &self.pairing)
            .finish_non_exhaustive()
    }
}

impl TestDescriptor {
    pub fn compute(&self, samples: &Samples) -> StatsResult<TestOutcome> {
        (self.compute)(samples)
    }
}

fn wrong_shape(expected: &str, samples: &Samples) -> StatsError {
    StatsError::InvalidArgument(format!(
        "expected {}, got {}",
        expected,
        samples.shape()
    ))
}

fn one(samples: &Samples, f: fn(&[f64]) -> StatsResult<TestOutcome>) -> StatsResult<TestOutcome> {
    match samples {
        Samples::One(v) => f(v),
        other => Err(wrong_shape("one sample", other)),
    }
}

fn two(
    samples: &Samples,
    f: fn(&[f64], &[f64]) -> StatsResult<TestOutcome>,
) -> StatsResult<TestOutcome> {
    match samples {
        Samples::Two(a, b) => f(a, b),
        other => Err(wrong_shape("two samples", other)),
    }
}

fn groups(
    samples: &Samples,
    f: fn(&[Vec<f64>]) -> StatsResult<TestOutcome>,
) -> StatsResult<TestOutcome> {
    match samples {
        Samples::Groups(g) => f(g),
        other => Err(wrong_shape("grouped samples", other)),
    }
}

static MANN_WHITNEY_U: TestDescriptor = TestDescriptor {
    name: TestName::MannWhitneyU,
    arity: Arity::TwoColumn,
    pairing: Pairing::Unpaired,
    compute: |s| two(s, imsig_stats::mann_whitney_u),
};

static KOLMOGOROV_SMIRNOV: TestDescriptor = TestDescriptor {
    name: TestName::KolmogorovSmirnov,
    arity: Arity::TwoColumn,
    pairing: Pairing::Unpaired,
    compute: |s| two(s, imsig_stats::kolmogorov_smirnov),
};

static WILCOXON_SIGNED_RANK: TestDescriptor = TestDescriptor {
    name: TestName::WilcoxonSignedRank,
    arity: Arity::TwoColumn,
    pairing: Pairing::Paired,
    compute: |s| two(s, imsig_stats::wilcoxon_signed_rank),
};

static SPEARMAN: TestDescriptor = TestDescriptor {
    name: TestName::Spearman,
    arity: Arity::TwoColumn,
    pairing: Pairing::RowAligned,
    compute: |s| two(s, imsig_stats::spearman),
};

static KENDALL_TAU: TestDescriptor = TestDescriptor {
    name: TestName::KendallTau,
    arity: Arity::TwoColumn,
    pairing: Pairing::RowAligned,
    compute: |s| two(s, imsig_stats::kendall_tau),
};

static KRUSKAL_WALLIS: TestDescriptor = TestDescriptor {
    name: TestName::KruskalWallis,
    arity: Arity::TwoColumn,
    pairing: Pairing::RowAligned,
    compute: |s| groups(s, |g| imsig_stats::kruskal_wallis(g)),
};

static FRIEDMAN: TestDescriptor = TestDescriptor {
    name: TestName::Friedman,
    arity: Arity::WholeDataset,
    pairing: Pairing::RowAligned,
    compute: |s| groups(s, |g| imsig_stats::friedman(g)),
};

static SIGN_TEST: TestDescriptor = TestDescriptor {
    name: TestName::SignTest,
    arity: Arity::OneColumn,
    pairing: Pairing::Unpaired,
    compute: |s| one(s, imsig_stats::sign_test),
};

static RUNS_TEST: TestDescriptor = TestDescriptor {
    name: TestName::RunsTest,
    arity: Arity::OneColumn,
    pairing: Pairing::Unpaired,
    compute: |s| one(s, |v| imsig_stats::runs_test(v, true)),
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_names_match() {
        for name in TestName::ALL {
            assert_eq!(name.descriptor().name, name);
        }
    }

    #[test]
    fn test_parse_short_id_and_display_name() {
        assert_eq!("ks".parse::<TestName>().unwrap(), TestName::KolmogorovSmirnov);
        assert_eq!(
            "mann-whitney u test".parse::<TestName>().unwrap(),
            TestName::MannWhitneyU
        );
        assert_eq!(
            "Runs Test (Wald-Wolfowitz)".parse::<TestName>().unwrap(),
            TestName::RunsTest
        );
        assert_eq!(" Sign ".parse::<TestName>().unwrap(), TestName::SignTest);
        assert!("t-test".parse::<TestName>().is_err());
    }

    #[test]
    fn test_display_round_trips() {
        for name in TestName::ALL {
            assert_eq!(name.to_string().parse::<TestName>().unwrap(), name);
        }
    }

    #[test]
    fn test_compute_rejects_wrong_shape() {
        let err = TestName::SignTest
            .descriptor()
            .compute(&Samples::Two(vec![1.0], vec![2.0]))
            .unwrap_err();
        assert!(matches!(err, StatsError::InvalidArgument(_)));
    }

    #[test]
    fn test_compute_dispatches_to_routine() {
        let samples = Samples::One(vec![5.0, 5.0, 6.0, 7.0, 8.0]);
        let outcome = TestName::SignTest.descriptor().compute(&samples).unwrap();
        assert_eq!(outcome.statistic, 2.0);
        assert_eq!(outcome.p_value, 1.0);
    }

    #[test]
    fn test_arity_table() {
        assert_eq!(TestName::SignTest.descriptor().arity, Arity::OneColumn);
        assert_eq!(TestName::Friedman.descriptor().arity, Arity::WholeDataset);
        assert_eq!(
            TestName::WilcoxonSignedRank.descriptor().pairing,
            Pairing::Paired
        );
    }
}
