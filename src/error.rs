use std::path::PathBuf;

use arrow::error::ArrowError;
use thiserror::Error;

/// Everything that can stop the processed table from being built.
///
/// All of these are fatal at startup: the server never binds its socket
/// without a table to serve.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("dataset not found: {}", .path.display())]
    FileNotFound { path: PathBuf },

    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ArrowError,
    },

    #[error("unsupported dataset format: {} (expected .csv, .parquet or .pq)", .path.display())]
    UnsupportedFormat { path: PathBuf },

    #[error("required column '{column}' is missing")]
    MissingColumn { column: String },

    #[error("row {row}: cannot parse date '{value}'")]
    DateParse { row: usize, value: String },

    #[error("invalid date window: start {start} is after end {end}")]
    InvalidWindow { start: String, end: String },

    /// Arrow kernel failure after the file was read (filter, cast, concat).
    #[error("table operation failed: {0}")]
    Table(#[from] ArrowError),
}

pub type LoadResult<T> = std::result::Result<T, LoadError>;
