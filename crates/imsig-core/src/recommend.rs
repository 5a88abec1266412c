//! Test recommendation
//!
//! Maps [`ColumnFacts`] to the tests that are valid for the selection. Rules
//! are checked in a fixed order and each test is added at most once, so the
//! result is deterministic.
//!
//! | Selection | Tests |
//! |---|---|
//! | primary column only | Sign, Runs |
//! | two numeric columns | Mann-Whitney U, Kolmogorov-Smirnov |
//! | ... with equal observation counts | + Wilcoxon signed-rank |
//! | numeric secondary column | + Spearman, Kendall |
//! | numeric secondary column, > 2 distinct values | + Kruskal-Wallis |
//! | categorical secondary column, > 2 distinct values, ≥ 3 numeric columns | + Friedman |
//!
//! When a secondary column is given but none of the rules apply, the
//! one-sample tests for the primary column are returned instead.

use crate::catalog::TestName;
use crate::classify::ColumnFacts;
use serde::{Deserialize, Serialize};

/// Friedman runs on this many numeric columns
pub const FRIEDMAN_COLUMNS: usize = 3;

/// Grouping tests need more than this many distinct values
const GROUPING_MIN_EXCLUSIVE: usize = 2;

/// Insertion-ordered set of tests
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestSet(Vec<TestName>);

impl TestSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a test unless it is already present; returns whether it was added
    pub fn insert(&mut self, test: TestName) -> bool {
        if self.0.contains(&test) {
            return false;
        }
        self.0.push(test);
        true
    }

    pub fn contains(&self, test: TestName) -> bool {
        self.0.contains(&test)
    }

    pub fn iter(&self) -> impl Iterator<Item = TestName> + '_ {
        self.0.iter().copied()
    }

    pub fn as_slice(&self) -> &[TestName] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<TestName> for TestSet {
    fn from_iter<I: IntoIterator<Item = TestName>>(iter: I) -> Self {
        let mut set = TestSet::new();
        for test in iter {
            set.insert(test);
        }
        set
    }
}

impl IntoIterator for TestSet {
    type Item = TestName;
    type IntoIter = std::vec::IntoIter<TestName>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Tests for a single column
pub fn one_sample_tests() -> TestSet {
    [TestName::SignTest, TestName::RunsTest].into_iter().collect()
}

/// Recommend tests for a classified selection
pub fn recommend(facts: &ColumnFacts) -> TestSet {
    let Some(col2) = &facts.col2 else {
        return one_sample_tests();
    };

    let mut tests = TestSet::new();
    let both_numeric = facts.col1_is_numeric() && col2.is_numeric();
    let grouping = col2.distinct > GROUPING_MIN_EXCLUSIVE;

    if both_numeric {
        tests.insert(TestName::MannWhitneyU);
        tests.insert(TestName::KolmogorovSmirnov);
        if facts.is_paired {
            tests.insert(TestName::WilcoxonSignedRank);
        }
    }
    if col2.is_numeric() {
        tests.insert(TestName::Spearman);
        tests.insert(TestName::KendallTau);
        if grouping {
            tests.insert(TestName::KruskalWallis);
        }
    } else if grouping && facts.numeric_column_count >= FRIEDMAN_COLUMNS {
        tests.insert(TestName::Friedman);
    }

    if tests.is_empty() {
        tracing::debug!(
            "No two-column test applies to '{}' and '{}', recommending one-sample tests",
            facts.col1.name,
            col2.name
        );
        return one_sample_tests();
    }
    tests
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::ColumnInfo;
    use imsig_io::ColumnKind;

    fn info(name: &str, kind: ColumnKind, observations: usize, distinct: usize) -> ColumnInfo {
        ColumnInfo {
            name: name.to_string(),
            kind,
            observations,
            distinct,
        }
    }

    fn facts(col2: Option<ColumnInfo>, is_paired: bool, numeric_columns: usize) -> ColumnFacts {
        ColumnFacts {
            col1: info("x", ColumnKind::Numeric, 10, 10),
            col2,
            is_paired,
            numeric_column_count: numeric_columns,
        }
    }

    #[test]
    fn test_single_column() {
        let tests = recommend(&facts(None, false, 5));
        assert_eq!(tests.as_slice(), &[TestName::SignTest, TestName::RunsTest]);
    }

    #[test]
    fn test_paired_numeric_columns_with_few_levels() {
        let col2 = info("y", ColumnKind::Numeric, 10, 2);
        let tests = recommend(&facts(Some(col2), true, 2));
        assert_eq!(
            tests.as_slice(),
            &[
                TestName::MannWhitneyU,
                TestName::KolmogorovSmirnov,
                TestName::WilcoxonSignedRank,
                TestName::Spearman,
                TestName::KendallTau,
            ]
        );
    }

    #[test]
    fn test_unpaired_numeric_columns_with_many_levels() {
        let col2 = info("y", ColumnKind::Numeric, 8, 8);
        let tests = recommend(&facts(Some(col2), false, 2));
        assert!(!tests.contains(TestName::WilcoxonSignedRank));
        assert!(tests.contains(TestName::KruskalWallis));
        assert!(!tests.contains(TestName::Friedman));
    }

    #[test]
    fn test_categorical_grouping_column() {
        let col2 = info("g", ColumnKind::Categorical, 10, 3);
        let tests = recommend(&facts(Some(col2.clone()), true, 3));
        assert_eq!(tests.as_slice(), &[TestName::Friedman]);

        // Too few numeric columns for Friedman
        let tests = recommend(&facts(Some(col2), true, 2));
        assert_eq!(tests, one_sample_tests());
    }

    #[test]
    fn test_binary_categorical_falls_back() {
        let col2 = info("g", ColumnKind::Categorical, 10, 2);
        let tests = recommend(&facts(Some(col2), true, 4));
        assert_eq!(tests, one_sample_tests());
    }

    #[test]
    fn test_set_deduplicates() {
        let mut set = TestSet::new();
        assert!(set.insert(TestName::SignTest));
        assert!(!set.insert(TestName::SignTest));
        assert_eq!(set.len(), 1);
    }
}
