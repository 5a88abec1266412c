//! imsig CLI - non-parametric test recommendation and execution
//!
//! # Commands
//!
//! - `columns` - List the columns of a dataset with their kinds
//! - `recommend` - Recommend tests for a column selection
//! - `run` - Run a test, print the result and optionally write a report

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use imsig_core::{
    write_report, AnalysisConfig, AnalysisOutput, Analyzer, ColumnSelection, DefaultTypstRenderer,
    ImsigResult, PlotKind, Report, ReportError, TestName, TestResult,
};
use imsig_io::csv_reader::CsvReader;
use imsig_io::{load_dataset, DataReader, Dataset};
use tracing_subscriber::EnvFilter;

/// imsig - pick and run the right non-parametric test
#[derive(Parser)]
#[command(name = "imsig")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Configuration file (TOML, or JSON with a .json extension)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List columns with kind, observation count and distinct values
    Columns {
        /// CSV or TSV file
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Recommend tests for a column selection
    ///
    /// Examples:
    ///   imsig recommend data.csv before
    ///   imsig recommend data.csv before after
    Recommend {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Primary column (numeric)
        #[arg(value_name = "COL1")]
        col1: String,

        /// Secondary column
        #[arg(value_name = "COL2")]
        col2: Option<String>,
    },
    /// Run a test and interpret the result
    ///
    /// Examples:
    ///   imsig run data.csv before after --test wilcoxon
    ///   imsig run data.csv score group --test kruskal --report report.pdf
    ///   imsig run data.csv score group --test kruskal --plot box --report
    Run {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        #[arg(value_name = "COL1")]
        col1: String,

        #[arg(value_name = "COL2")]
        col2: Option<String>,

        /// Test to run, by name or short id (e.g. mann-whitney, ks, sign)
        #[arg(short, long)]
        test: TestName,

        /// Null hypothesis text for the report
        #[arg(long = "null")]
        null_hypothesis: Option<String>,

        /// Alternative hypothesis text for the report
        #[arg(long = "alt")]
        alternative_hypothesis: Option<String>,

        /// Plot to include (box, violin, distribution, scatter); repeatable
        #[arg(short, long = "plot")]
        plots: Vec<PlotKind>,

        /// Write a report (.pdf, .typ or .json); without FILE the configured
        /// report file name is used
        #[arg(short, long, value_name = "FILE", num_args = 0..=1)]
        report: Option<Option<PathBuf>>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> ImsigResult<()> {
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Columns { file } => {
            let dataset = load(&file, &config)?;
            print_columns(&dataset);
        }
        Commands::Recommend { file, col1, col2 } => {
            let dataset = load(&file, &config)?;
            let analyzer = Analyzer::new(config);
            let selection = selection(col1, col2);
            let tests = analyzer.recommend(&dataset, &selection)?;
            for (i, test) in tests.iter().enumerate() {
                println!("{}. {} ({})", i + 1, test.display_name(), test.short_id());
            }
        }
        Commands::Run {
            file,
            col1,
            col2,
            test,
            null_hypothesis,
            alternative_hypothesis,
            plots,
            report,
            json,
        } => {
            let dataset = load(&file, &config)?;
            let title = config.report.title.clone();
            let report = report_path(report, &config);
            let analyzer = Analyzer::new(config);

            let mut request = analyzer.request(selection(col1, col2), test);
            if let Some(text) = null_hypothesis {
                request = request.with_null_hypothesis(text);
            }
            if let Some(text) = alternative_hypothesis {
                request = request.with_alternative_hypothesis(text);
            }
            if !plots.is_empty() {
                request = request.with_plots(plots);
            }

            let output = match &report {
                Some(_) => analyzer.analyze(&dataset, &request)?,
                None => AnalysisOutput {
                    result: analyzer.run(&dataset, &request)?,
                    plots: Vec::new(),
                },
            };

            if json {
                let text = serde_json::to_string_pretty(&output.result)
                    .map_err(ReportError::from)?;
                println!("{}", text);
            } else {
                print_result(&output.result);
            }

            if let Some(path) = report {
                let report = Report::from_output(title, output);
                write_report(&report, &path, &DefaultTypstRenderer::new())?;
                eprintln!("Report written to {}", path.display());
            }
        }
    }
    Ok(())
}

/// Explicit `--config`, else `imsig/config.toml` in the user config dir,
/// else defaults
fn load_config(explicit: Option<&Path>) -> ImsigResult<AnalysisConfig> {
    if let Some(path) = explicit {
        return Ok(AnalysisConfig::load(path)?);
    }
    match dirs::config_dir().map(|dir| dir.join("imsig").join("config.toml")) {
        Some(path) if path.is_file() => {
            tracing::debug!("Loading config from {}", path.display());
            Ok(AnalysisConfig::load(path)?)
        }
        _ => Ok(AnalysisConfig::default()),
    }
}

/// `--report FILE` writes to FILE, a bare `--report` to the configured file
/// name
fn report_path(arg: Option<Option<PathBuf>>, config: &AnalysisConfig) -> Option<PathBuf> {
    arg.map(|path| path.unwrap_or_else(|| PathBuf::from(&config.report.file_name)))
}

/// CSV files honour the configured delimiter and header setting; other
/// formats are detected from the extension
fn load(path: &Path, config: &AnalysisConfig) -> ImsigResult<Dataset> {
    let path_str = path.to_string_lossy();
    let is_csv = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"));

    let dataset = if is_csv {
        let delimiter = config.csv.delimiter_byte()?;
        CsvReader::open_with_options(&path_str, delimiter, config.csv.has_header)?.read_dataset()?
    } else {
        load_dataset(&path_str)?
    };
    tracing::info!(
        "Loaded {} ({} columns, {} rows)",
        path.display(),
        dataset.columns().len(),
        dataset.num_rows()
    );
    Ok(dataset)
}

fn selection(col1: String, col2: Option<String>) -> ColumnSelection {
    ColumnSelection {
        primary: col1,
        secondary: col2,
    }
}

fn print_columns(dataset: &Dataset) {
    let width = dataset
        .columns()
        .iter()
        .map(|c| c.name().len())
        .max()
        .unwrap_or(0)
        .max("column".len());
    println!(
        "{:<width$}  {:<11}  {:>12}  {:>8}",
        "column",
        "kind",
        "observations",
        "distinct",
        width = width
    );
    for column in dataset.columns() {
        println!(
            "{:<width$}  {:<11}  {:>12}  {:>8}",
            column.name(),
            column.kind().to_string(),
            column.observation_count(),
            column.distinct_count(),
            width = width
        );
    }
}

fn print_result(result: &TestResult) {
    println!("Test:        {}", result.test);
    println!("Columns:     {}", result.columns_used.join(", "));
    println!("Statistic:   {:.6}", result.statistic);
    println!("P-value:     {:.6}", result.p_value);
    println!("Alpha:       {}", result.alpha);
    println!("H0:          {}", result.null_hypothesis);
    println!("H1:          {}", result.alternative_hypothesis);
    println!("Conclusion:  {}", result.conclusion);
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use imsig_core::{ImsigError, TypstRenderer};

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_run_arguments() {
        let cli = Cli::parse_from([
            "imsig", "run", "data.csv", "a", "b", "--test", "Mann-Whitney U Test", "--plot",
            "box", "--plot", "scatter", "--json", "-vv",
        ]);
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Run {
                test, plots, json, col2, ..
            } => {
                assert_eq!(test, TestName::MannWhitneyU);
                assert_eq!(plots, vec![PlotKind::Boxplot, PlotKind::Scatterplot]);
                assert!(json);
                assert_eq!(col2.as_deref(), Some("b"));
            }
            _ => panic!("expected run command"),
        }
    }

    #[test]
    fn test_unknown_test_name_is_rejected() {
        let parsed = Cli::try_parse_from(["imsig", "run", "data.csv", "a", "--test", "anova"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_bare_report_flag_uses_configured_file_name() {
        let cli = Cli::parse_from([
            "imsig", "run", "data.csv", "a", "--test", "sign", "--report",
        ]);
        let Commands::Run { report, .. } = cli.command else {
            panic!("expected run command");
        };
        assert_eq!(report, Some(None));

        let mut config = AnalysisConfig::default();
        assert_eq!(
            report_path(report.clone(), &config),
            Some(PathBuf::from("statistical_report.pdf"))
        );
        config.report.file_name = "weekly.typ".to_string();
        assert_eq!(report_path(report, &config), Some(PathBuf::from("weekly.typ")));
    }

    #[test]
    fn test_explicit_report_path_wins() {
        let cli = Cli::parse_from([
            "imsig", "run", "data.csv", "a", "--test", "sign", "-r", "out.json",
        ]);
        let Commands::Run { report, .. } = cli.command else {
            panic!("expected run command");
        };
        let path = report_path(report, &AnalysisConfig::default());
        assert_eq!(path, Some(PathBuf::from("out.json")));
        assert_eq!(report_path(None, &AnalysisConfig::default()), None);
    }

    #[cfg(feature = "pdf")]
    #[test]
    fn test_default_build_renders_pdf() {
        assert!(DefaultTypstRenderer::new().is_available());
    }

    #[test]
    fn test_missing_config_file_is_an_error() {
        let err = load_config(Some(Path::new("/nonexistent/imsig.toml"))).unwrap_err();
        assert!(matches!(err, ImsigError::Config(_)));
    }
}
