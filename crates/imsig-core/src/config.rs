//! Configuration for imsig-core
//!
//! Analysis defaults (significance threshold, hypothesis wording, plots),
//! report naming and CSV parsing options. Every section has defaults, so a
//! config file only needs the values it changes.

use crate::error::ConfigError;
use crate::interpret::DEFAULT_ALPHA;
use crate::plot::PlotKind;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Analysis-wide configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Significance threshold; H0 is rejected when p < alpha
    pub alpha: f64,
    /// Null hypothesis text used when the request gives none
    pub default_null_hypothesis: String,
    /// Alternative hypothesis text used when the request gives none
    pub default_alternative_hypothesis: String,
    /// Plots generated when the request selects none
    pub default_plots: Vec<PlotKind>,
    pub report: ReportConfig,
    pub csv: CsvConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            alpha: DEFAULT_ALPHA,
            default_null_hypothesis: "No significant difference exists".to_string(),
            default_alternative_hypothesis: "A significant difference exists".to_string(),
            default_plots: vec![PlotKind::Boxplot, PlotKind::ViolinPlot],
            report: ReportConfig::default(),
            csv: CsvConfig::default(),
        }
    }
}

/// Report settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub title: String,
    /// Default output file name
    pub file_name: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            title: "Statistical Test Report".to_string(),
            file_name: "statistical_report.pdf".to_string(),
        }
    }
}

/// CSV parsing settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CsvConfig {
    pub delimiter: char,
    pub has_header: bool,
}

impl Default for CsvConfig {
    fn default() -> Self {
        Self {
            delimiter: ',',
            has_header: true,
        }
    }
}

impl CsvConfig {
    /// Delimiter as a byte for the CSV reader
    pub fn delimiter_byte(&self) -> Result<u8, ConfigError> {
        u8::try_from(self.delimiter)
            .ok()
            .filter(u8::is_ascii)
            .ok_or_else(|| {
                ConfigError::OutOfRange(format!(
                    "csv.delimiter must be a single ASCII character, got {:?}",
                    self.delimiter
                ))
            })
    }
}

impl AnalysisConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a TOML string
    #[cfg(feature = "toml-config")]
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Serialize configuration to TOML
    #[cfg(feature = "toml-config")]
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load configuration from a JSON string
    pub fn from_json(json_str: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json_str)
    }

    /// Serialize configuration to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Load and validate a config file; `.json` files are read as JSON,
    /// anything else as TOML
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));
        let config = if is_json {
            Self::from_json(&text).map_err(|e| ConfigError::Parse(e.to_string()))?
        } else {
            Self::parse_toml(&text)?
        };

        config.validate()?;
        Ok(config)
    }

    #[cfg(feature = "toml-config")]
    fn parse_toml(text: &str) -> Result<Self, ConfigError> {
        Self::from_toml(text)
    }

    #[cfg(not(feature = "toml-config"))]
    fn parse_toml(_text: &str) -> Result<Self, ConfigError> {
        Err(ConfigError::Parse(
            "TOML configuration requires the 'toml-config' feature".to_string(),
        ))
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.alpha > 0.0 && self.alpha < 1.0) {
            return Err(ConfigError::OutOfRange(format!(
                "alpha must lie strictly between 0 and 1, got {}",
                self.alpha
            )));
        }

        if self.default_null_hypothesis.trim().is_empty() {
            return Err(ConfigError::MissingField(
                "default_null_hypothesis".to_string(),
            ));
        }

        if self.default_alternative_hypothesis.trim().is_empty() {
            return Err(ConfigError::MissingField(
                "default_alternative_hypothesis".to_string(),
            ));
        }

        if self.report.file_name.trim().is_empty() {
            return Err(ConfigError::MissingField("report.file_name".to_string()));
        }

        self.csv.delimiter_byte()?;
        Ok(())
    }
}
