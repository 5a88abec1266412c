//! imsig-io - Data I/O for tabular datasets
//!
//! This crate loads uploaded tables into an in-memory [`Dataset`]:
//!
//! - **CSV / TSV**: delimited text with per-column type inference
//!
//! # Design
//!
//! Readers implement the `DataReader` trait for uniform access. A dataset is
//! read once per session and then handed to the analysis engine read-only.
//! Every column is either numeric or categorical; missing cells are kept as
//! `None` so observation counts can be derived later.

pub mod reader;
pub mod schema;
pub mod table;

#[cfg(feature = "csv")]
pub mod csv_reader;

pub use reader::*;
pub use schema::*;
pub use table::*;
