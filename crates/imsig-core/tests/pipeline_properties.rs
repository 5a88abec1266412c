//! Property and end-to-end tests for the analysis pipeline

use imsig_core::classify::{ColumnFacts, ColumnInfo};
use imsig_core::interpret::{interpret, Conclusion, DEFAULT_ALPHA};
use imsig_core::recommend::recommend;
use imsig_core::{
    execute, AnalysisConfig, AnalysisError, Analyzer, ColumnSelection, DefaultTypstRenderer,
    PlotKind, Report, TestName,
};
use imsig_io::{load_dataset, Column, ColumnKind, Dataset};
use proptest::prelude::*;
use std::io::Write;

fn info(name: &str, numeric: bool, observations: usize, distinct: usize) -> ColumnInfo {
    ColumnInfo {
        name: name.to_string(),
        kind: if numeric {
            ColumnKind::Numeric
        } else {
            ColumnKind::Categorical
        },
        observations,
        distinct,
    }
}

// === Recommender ===

proptest! {
    #[test]
    fn single_column_gets_one_sample_tests(
        numeric in any::<bool>(),
        observations in 0usize..500,
        distinct in 0usize..50,
        numeric_columns in 0usize..10,
    ) {
        let facts = ColumnFacts {
            col1: info("x", numeric, observations, distinct),
            col2: None,
            is_paired: false,
            numeric_column_count: numeric_columns,
        };
        let recommended = recommend(&facts);
        prop_assert_eq!(
            recommended.as_slice(),
            &[TestName::SignTest, TestName::RunsTest][..]
        );
    }

    #[test]
    fn paired_numeric_with_few_levels(
        n in 1usize..500,
        distinct in 0usize..=2,
        numeric_columns in 2usize..10,
    ) {
        let facts = ColumnFacts {
            col1: info("x", true, n, n),
            col2: Some(info("y", true, n, distinct)),
            is_paired: true,
            numeric_column_count: numeric_columns,
        };
        let tests = recommend(&facts);
        for expected in [
            TestName::MannWhitneyU,
            TestName::KolmogorovSmirnov,
            TestName::WilcoxonSignedRank,
            TestName::Spearman,
            TestName::KendallTau,
        ] {
            prop_assert!(tests.contains(expected));
        }
        prop_assert!(!tests.contains(TestName::KruskalWallis));
        prop_assert!(!tests.contains(TestName::Friedman));
    }

    #[test]
    fn recommendations_are_nonempty_and_unique(
        col1_numeric in any::<bool>(),
        col2_numeric in any::<bool>(),
        obs1 in 0usize..100,
        obs2 in 0usize..100,
        distinct in 0usize..20,
        numeric_columns in 0usize..6,
    ) {
        let facts = ColumnFacts {
            col1: info("x", col1_numeric, obs1, obs1),
            col2: Some(info("y", col2_numeric, obs2, distinct)),
            is_paired: obs1 == obs2,
            numeric_column_count: numeric_columns,
        };
        let tests = recommend(&facts);
        prop_assert!(!tests.is_empty());

        let mut seen = tests.as_slice().to_vec();
        seen.sort();
        seen.dedup();
        prop_assert_eq!(seen.len(), tests.len());

        if numeric_columns < 3 {
            prop_assert!(!tests.contains(TestName::Friedman));
        }
        if !col2_numeric {
            prop_assert!(!tests.contains(TestName::MannWhitneyU));
            prop_assert!(!tests.contains(TestName::WilcoxonSignedRank));
        }
    }
}

// === Interpreter ===

proptest! {
    #[test]
    fn reject_iff_strictly_below_alpha(p in 0.0f64..=1.0, alpha in 0.001f64..0.999) {
        let conclusion = interpret(p, alpha);
        prop_assert_eq!(conclusion == Conclusion::RejectNull, p < alpha);
    }
}

#[test]
fn interpreter_threshold_is_strict() {
    assert_eq!(interpret(0.0499, DEFAULT_ALPHA), Conclusion::RejectNull);
    assert_eq!(interpret(0.05, DEFAULT_ALPHA), Conclusion::FailToRejectNull);
}

// === Executor ===

fn dataset() -> Dataset {
    Dataset::from_columns(
        "pipeline",
        vec![
            Column::numeric("score", [5.0, 5.0, 6.0, 7.0, 8.0]),
            Column::numeric_with_missing(
                "retest",
                [Some(5.5), Some(4.0), None, Some(7.5), Some(9.0)],
            ),
            Column::numeric("other", [1.0, 3.0, 2.0, 5.0, 4.0]),
            Column::categorical("site", ["north", "north", "north", "north", "north"]),
        ],
    )
    .unwrap()
}

#[test]
fn sign_test_excludes_ties_with_the_median() {
    let r = execute(TestName::SignTest, &dataset(), "score", None).unwrap();
    assert_eq!(r.statistic, 2.0);
    assert!((r.p_value - 1.0).abs() < 1e-12);
}

#[test]
fn wilcoxon_on_unequal_lengths_is_precondition() {
    let err = execute(TestName::WilcoxonSignedRank, &dataset(), "score", Some("retest"))
        .unwrap_err();
    assert!(matches!(err, AnalysisError::PreconditionViolation { .. }));
    assert_eq!(err.test(), Some("Wilcoxon Signed-Rank Test"));
}

#[test]
fn kruskal_with_one_level_is_precondition() {
    let err = execute(TestName::KruskalWallis, &dataset(), "score", Some("site")).unwrap_err();
    match err {
        AnalysisError::PreconditionViolation { reason, .. } => {
            assert_eq!(reason, "at least 2 groups required")
        }
        other => panic!("expected precondition violation, got {:?}", other),
    }
}

#[test]
fn execute_is_idempotent() {
    let ds = dataset();
    for test in TestName::ALL {
        let first = execute(test, &ds, "score", Some("other"));
        let second = execute(test, &ds, "score", Some("other"));
        assert_eq!(first, second, "{} is not deterministic", test);
    }
}

// === End to end ===

#[test]
fn csv_to_report() {
    let mut file = tempfile::Builder::new()
        .suffix(".csv")
        .tempfile()
        .unwrap();
    writeln!(file, "dose,response,arm").unwrap();
    for (i, arm) in ["a", "b", "c"].iter().cycle().take(12).enumerate() {
        writeln!(file, "{},{},{}", i, (i * i) as f64 * 0.5 + 1.0, arm).unwrap();
    }

    let ds = load_dataset(file.path().to_str().unwrap()).unwrap();
    let analyzer = Analyzer::new(AnalysisConfig::default());
    let selection = ColumnSelection::pair("response", "dose");

    let tests = analyzer.recommend(&ds, &selection).unwrap();
    assert!(tests.contains(TestName::Spearman));
    assert!(tests.contains(TestName::KruskalWallis));

    let request = analyzer
        .request(selection, TestName::Spearman)
        .with_plots([PlotKind::Scatterplot, PlotKind::DistributionPlot]);
    let output = analyzer.analyze(&ds, &request).unwrap();
    assert!((output.result.statistic - 1.0).abs() < 1e-12);
    assert_eq!(output.result.conclusion, Conclusion::RejectNull);
    let expected_plots = if cfg!(feature = "kuva") { 2 } else { 0 };
    assert_eq!(output.plots.len(), expected_plots);

    let report = Report::from_output("Statistical Test Report", output);
    let src = report.to_typst();
    assert!(src.contains("#\"Spearman's Rank Correlation\""));
    assert_eq!(src.matches("image(bytes(").count(), expected_plots);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.typ");
    imsig_core::write_report(&report, &path, &DefaultTypstRenderer::new()).unwrap();
    assert!(path.exists());
}

#[cfg(feature = "pdf")]
#[test]
fn report_compiles_to_pdf() {
    let ds = dataset();
    let analyzer = Analyzer::new(AnalysisConfig::default());
    let request = analyzer.request(ColumnSelection::pair("score", "other"), TestName::KendallTau);
    let output = analyzer.analyze(&ds, &request).unwrap();
    let report = Report::from_output("Statistical Test Report", output);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.pdf");
    let format = imsig_core::write_report(&report, &path, &DefaultTypstRenderer::new()).unwrap();
    assert_eq!(format, imsig_core::ReportFormat::Pdf);

    let bytes = std::fs::read(&path).unwrap();
    assert!(bytes.starts_with(b"%PDF"));
}
