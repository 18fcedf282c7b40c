#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CSV ingestion for the two source tables.
//!
//! Both files are semicolon-delimited, cp1252-encoded exports with
//! decimal-comma numerics. A cell that fails numeric coercion becomes a
//! missing value and is logged; it never aborts the load. A missing
//! column is a structural problem and fails the whole load.

pub mod gazetteer;
pub mod survey;
mod text;

use thiserror::Error;

/// Errors that can occur while loading a source table.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Reading the source file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV framing/record error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A required column is absent from the header row.
    #[error("Missing column '{name}' in header row")]
    MissingColumn {
        /// The header name that was not found.
        name: String,
    },
}

/// Resolves a header name to its column index.
///
/// # Errors
///
/// Returns [`IngestError::MissingColumn`] if the header is absent.
fn column_index(headers: &[String], name: &str) -> Result<usize, IngestError> {
    headers
        .iter()
        .position(|h| h == name)
        .ok_or_else(|| IngestError::MissingColumn {
            name: name.to_string(),
        })
}

/// Returns the trimmed cell at `index`, or `""` when the record is short.
fn cell<'a>(record: &'a csv::StringRecord, index: usize) -> &'a str {
    record.get(index).unwrap_or("").trim()
}
