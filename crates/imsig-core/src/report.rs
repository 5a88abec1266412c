//! Report assembly and export
//!
//! A [`Report`] lays out a test result as Typst markup:
//!
//! 1. the title, then the sections "Test Performed", "Null Hypothesis",
//!    "Alternative Hypothesis", "Test Results" and "Conclusion";
//! 2. when plots exist, a new page headed "Visualizations" with one image
//!    per plot, stacked vertically.
//!
//! The markup is written as-is (`.typ`), compiled to PDF by a
//! [`TypstRenderer`] (`.pdf`), or the report is exported as JSON (`.json`).
//!
//! # Example
//!
//! ```ignore
//! use imsig_core::report::{write_report, DefaultTypstRenderer, Report};
//!
//! let report = Report::new("Statistical Test Report", output.result, output.plots);
//! write_report(&report, "statistical_report.pdf", &DefaultTypstRenderer::new())?;
//! ```

use crate::engine::{AnalysisOutput, TestResult};
use crate::error::{ReportError, ReportResult};
use crate::plot::RenderedPlot;
use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::path::Path;

/// Output formats, chosen by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportFormat {
    Pdf,
    Typst,
    Json,
}

impl ReportFormat {
    pub fn from_path(path: &Path) -> ReportResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("pdf") => Ok(ReportFormat::Pdf),
            Some("typ") => Ok(ReportFormat::Typst),
            Some("json") => Ok(ReportFormat::Json),
            _ => Err(ReportError::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Pdf => "pdf",
            ReportFormat::Typst => "typ",
            ReportFormat::Json => "json",
        }
    }
}

/// A test result and its plots, ready to be laid out
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub title: String,
    pub generated_at: DateTime<Utc>,
    pub result: TestResult,
    pub plots: Vec<RenderedPlot>,
}

impl Report {
    pub fn new(title: impl Into<String>, result: TestResult, plots: Vec<RenderedPlot>) -> Self {
        Self {
            title: title.into(),
            generated_at: Utc::now(),
            result,
            plots,
        }
    }

    pub fn from_output(title: impl Into<String>, output: AnalysisOutput) -> Self {
        Self::new(title, output.result, output.plots)
    }

    /// Result sections in layout order
    pub fn sections(&self) -> Vec<(&'static str, String)> {
        let r = &self.result;
        vec![
            ("Test Performed", r.test.display_name().to_string()),
            ("Null Hypothesis", r.null_hypothesis.clone()),
            ("Alternative Hypothesis", r.alternative_hypothesis.clone()),
            (
                "Test Results",
                format!(
                    "Statistic: {}\nP-value: {}",
                    format_value(r.statistic),
                    format_value(r.p_value)
                ),
            ),
            ("Conclusion", r.conclusion.text().to_string()),
        ]
    }

    /// Typst markup for the whole report
    pub fn to_typst(&self) -> String {
        let date = self.generated_at.date_naive();
        let mut src = String::new();

        let _ = writeln!(
            src,
            "#set document(title: {}, date: datetime(year: {}, month: {}, day: {}))",
            typst_string(&self.title),
            date.year(),
            date.month(),
            date.day()
        );
        src.push_str("#set page(paper: \"a4\", margin: 2cm)\n");
        src.push_str("#set text(size: 11pt)\n\n");

        let _ = writeln!(
            src,
            "#align(center, text(size: 16pt, weight: \"bold\", {}))\n",
            typst_string(&self.title)
        );
        let _ = writeln!(
            src,
            "#align(center, text(size: 9pt, {}))\n",
            typst_string(&format!("Generated {}", self.generated_at.format("%Y-%m-%d %H:%M UTC")))
        );

        for (heading, content) in self.sections() {
            let _ = writeln!(src, "== {}\n", heading);
            let lines: Vec<String> = content.lines().map(|l| format!("#{}", typst_string(l))).collect();
            let _ = writeln!(src, "{}\n", lines.join(" \\\n"));
        }

        if !self.plots.is_empty() {
            src.push_str("#pagebreak()\n\n");
            src.push_str("#align(center, text(size: 14pt, weight: \"bold\", \"Visualizations\"))\n\n");
            for plot in &self.plots {
                let _ = writeln!(
                    src,
                    "#figure(image(bytes({}), format: \"svg\", width: 100%), caption: {})\n",
                    typst_string(&plot.svg),
                    typst_string(&plot.title)
                );
            }
        }
        src
    }

    pub fn to_json(&self) -> ReportResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Four decimals, or scientific notation for very small magnitudes
fn format_value(value: f64) -> String {
    if value != 0.0 && value.abs() < 1e-4 {
        format!("{:.4e}", value)
    } else {
        format!("{:.4}", value)
    }
}

/// Quote text as a Typst string literal
fn typst_string(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => {}
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Compiles Typst markup to PDF
pub trait TypstRenderer: Send + Sync {
    fn render_pdf(&self, source: &str) -> ReportResult<Vec<u8>>;

    /// Whether this renderer can produce PDF output
    fn is_available(&self) -> bool;
}

#[cfg(feature = "pdf")]
mod typst_impl {
    use super::*;

    /// Renderer backed by typst-as-lib with system and embedded fonts
    #[derive(Debug, Default)]
    pub struct DefaultTypstRenderer {}

    impl DefaultTypstRenderer {
        pub fn new() -> Self {
            Self {}
        }
    }

    impl TypstRenderer for DefaultTypstRenderer {
        fn render_pdf(&self, source: &str) -> ReportResult<Vec<u8>> {
            use typst_as_lib::{typst_kit_options::TypstKitFontOptions, TypstEngine};

            let engine = TypstEngine::builder()
                .main_file(source)
                .search_fonts_with(
                    TypstKitFontOptions::default()
                        .include_system_fonts(true)
                        .include_embedded_fonts(true),
                )
                .build();

            let compiled = engine.compile();
            for warning in &compiled.warnings {
                tracing::warn!("Typst warning: {:?}", warning);
            }

            let document = compiled
                .output
                .map_err(|e| ReportError::Compilation(format!("{:?}", e)))?;

            typst_pdf::pdf(&document, &typst_pdf::PdfOptions::default())
                .map_err(|e| ReportError::Pdf(format!("{:?}", e)))
        }

        fn is_available(&self) -> bool {
            true
        }
    }
}

#[cfg(feature = "pdf")]
pub use typst_impl::DefaultTypstRenderer;

#[cfg(not(feature = "pdf"))]
mod stub_impl {
    use super::*;

    /// Placeholder renderer used when the `pdf` feature is disabled
    ///
    /// Typst and JSON output still work; PDF output fails with
    /// [`ReportError::FeatureNotEnabled`].
    #[derive(Debug, Default)]
    pub struct DefaultTypstRenderer {
        _private: (),
    }

    impl DefaultTypstRenderer {
        pub fn new() -> Self {
            Self { _private: () }
        }
    }

    impl TypstRenderer for DefaultTypstRenderer {
        fn render_pdf(&self, _source: &str) -> ReportResult<Vec<u8>> {
            Err(ReportError::FeatureNotEnabled)
        }

        fn is_available(&self) -> bool {
            false
        }
    }
}

#[cfg(not(feature = "pdf"))]
pub use stub_impl::DefaultTypstRenderer;

/// Write `report` to `path` in the format implied by its extension
pub fn write_report(
    report: &Report,
    path: impl AsRef<Path>,
    renderer: &dyn TypstRenderer,
) -> ReportResult<ReportFormat> {
    let path = path.as_ref();
    let format = ReportFormat::from_path(path)?;
    let bytes = match format {
        ReportFormat::Pdf => renderer.render_pdf(&report.to_typst())?,
        ReportFormat::Typst => report.to_typst().into_bytes(),
        ReportFormat::Json => report.to_json()?.into_bytes(),
    };
    std::fs::write(path, bytes)?;
    tracing::info!("Wrote {} report to {}", format.extension(), path.display());
    Ok(format)
}
