//! Error taxonomy for loading, computing and persisting the analyses.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Input file not found: {}", path.display())]
    MissingInput { path: PathBuf },

    #[error("Missing column '{column}' in {table} table")]
    MissingColumn { table: &'static str, column: String },

    #[error("Invalid dates in column '{column}': {reason}")]
    InvalidDate { column: String, reason: String },

    #[error("Non-numeric values in {table} column '{column}': {reason}")]
    InvalidNumber {
        table: &'static str,
        column: String,
        reason: String,
    },

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: Box<AnalysisError>,
    },

    #[error("Invalid configuration in {}: {reason}", path.display())]
    Config { path: PathBuf, reason: String },
}

pub type AnalysisResult<T> = std::result::Result<T, AnalysisError>;
