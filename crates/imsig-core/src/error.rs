//! Error types for imsig-core
//!
//! Provides error handling for:
//! - Column lookup and test preconditions
//! - Statistical routine failures
//! - Plot generation
//! - Report assembly and export
//! - Configuration

use imsig_io::IoError;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for imsig operations
#[derive(Error, Debug)]
pub enum ImsigError {
    /// Dataset loading errors
    #[error("Failed to load dataset: {0}")]
    Dataset(#[from] IoError),

    /// Recommendation or execution errors
    #[error("Analysis failed: {0}")]
    Analysis(#[from] AnalysisError),

    /// Plot generation errors
    #[error("Plot failed: {0}")]
    Plot(#[from] PlotError),

    /// Report errors
    #[error("Report failed: {0}")]
    Report(#[from] ReportError),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while classifying columns or running a test
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    /// A selected column does not exist in the dataset
    #[error("Column '{column}' not found in dataset")]
    ColumnNotFound { column: String },

    /// The selection does not satisfy what the test needs; nothing was computed
    #[error("{test}: {reason}")]
    PreconditionViolation { test: String, reason: String },

    /// The statistical routine failed on the prepared samples
    #[error("{test} could not be computed: {reason}")]
    TestExecutionError { test: String, reason: String },
}

impl AnalysisError {
    pub fn precondition(test: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::PreconditionViolation {
            test: test.into(),
            reason: reason.into(),
        }
    }

    /// Name of the test involved, if any
    pub fn test(&self) -> Option<&str> {
        match self {
            Self::ColumnNotFound { .. } => None,
            Self::PreconditionViolation { test, .. } | Self::TestExecutionError { test, .. } => {
                Some(test)
            }
        }
    }
}

/// Errors related to plot generation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlotError {
    /// Not enough values to draw the plot
    #[error("{plot} needs more data: {reason}")]
    InsufficientData { plot: String, reason: String },

    /// Plot needs a column that was not selected or has the wrong kind
    #[error("{plot} is not available: {reason}")]
    Unavailable { plot: String, reason: String },

    /// Unknown plot name
    #[error("Unknown plot kind: {0}")]
    UnknownKind(String),
}

/// Errors related to report assembly and export
#[derive(Error, Debug)]
pub enum ReportError {
    /// Typst compilation failed
    #[error("Typst compilation error: {0}")]
    Compilation(String),

    /// PDF generation failed after successful compilation
    #[error("PDF generation error: {0}")]
    Pdf(String),

    /// The `pdf` feature is not enabled
    #[error("PDF output requires the 'pdf' feature")]
    FeatureNotEnabled,

    /// Unsupported output file extension
    #[error("Unsupported report format for {path}")]
    UnsupportedFormat { path: PathBuf },

    /// JSON serialization failed
    #[error("JSON export error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error while writing output
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration validation error
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Value is out of valid range
    #[error("Value out of range: {0}")]
    OutOfRange(String),

    /// Required field is missing or empty
    #[error("Missing field: {0}")]
    MissingField(String),

    /// The file could not be parsed
    #[error("Parse error: {0}")]
    Parse(String),

    /// The file could not be read
    #[error("Cannot read {path}: {message}")]
    Read { path: PathBuf, message: String },
}

/// Result type alias for imsig operations
pub type ImsigResult<T> = Result<T, ImsigError>;

/// Result type alias for analysis operations
pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// Result type alias for plot operations
pub type PlotResult<T> = Result<T, PlotError>;

/// Result type alias for report operations
pub type ReportResult<T> = Result<T, ReportError>;
