//! imsig-core - Non-parametric test recommendation and execution
//!
//! This crate turns a column selection on a tabular dataset into a tested,
//! interpreted and reportable result.
//!
//! # Key Components
//!
//! - **Classifier**: column kinds, observation counts, pairing and group counts
//! - **Recommender**: ordered set of applicable tests for a selection
//! - **Catalog**: static descriptor (arity, pairing, routine) for every test
//! - **Executor**: precondition checks and sample shaping, then the routine
//! - **Interpreter**: reject / fail-to-reject at a significance threshold
//! - **Plots**: box, violin, distribution and scatter plots as SVG
//! - **Report**: Typst layout compiled to PDF, or exported as JSON
//!
//! # Pipeline
//!
//! ```text
//! classify → recommend → (pick a test) → execute → interpret → report
//! ```
//!
//! [`Analyzer`] drives the pipeline from an [`AnalysisRequest`]; the stage
//! functions are public for callers that need only part of it.

pub mod catalog;
pub mod classify;
pub mod config;
pub mod engine;
pub mod error;
pub mod execute;
pub mod interpret;
pub mod plot;
pub mod recommend;
pub mod report;
pub mod request;

pub use catalog::*;
pub use classify::*;
pub use config::*;
pub use engine::*;
pub use error::*;
pub use execute::*;
pub use interpret::*;
pub use recommend::*;
pub use request::*;

pub use plot::{generate_plots, PlotKind, RenderedPlot};
pub use report::{write_report, DefaultTypstRenderer, Report, ReportFormat, TypstRenderer};
