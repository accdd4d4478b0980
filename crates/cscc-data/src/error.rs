//! Error types for CSV ingestion.

use std::fmt;
use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum DataError {
    #[error("Failed to open data source: {path}")]
    SourceOpen {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid filter: {what}")]
    FilterConfig { what: &'static str },

    #[error("Missing column {column:?} in {context}")]
    MissingColumn {
        column: &'static str,
        context: &'static str,
    },
}

pub type DataResult<T> = Result<T, DataError>;

/// A row-level problem. Rows with errors are skipped and reported, never fatal.
#[derive(Debug, Clone, PartialEq)]
pub struct RowError {
    pub line: u64,
    pub message: String,
}

impl RowError {
    pub fn new(line: u64, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

impl fmt::Display for RowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}
