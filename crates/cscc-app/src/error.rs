//! Error types for the cscc-app service layer.

use std::path::PathBuf;

/// Application error wrapping the backend crates' errors for the CLI.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Failed to read config file: {path}")]
    ConfigFileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write config file: {path}")]
    ConfigFileWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Config validation failed: {0}")]
    Validation(String),

    #[error("Data error: {0}")]
    Data(String),

    #[error("Metrics error: {0}")]
    Metrics(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Data source did not complete within {waited_ms} ms")]
    Timeout { waited_ms: u64 },

    #[error("Loader worker exited without a result")]
    WorkerLost,

    #[error("Output error: {0}")]
    Output(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for cscc-app operations.
pub type AppResult<T> = Result<T, AppError>;

impl From<cscc_core::CoreError> for AppError {
    fn from(err: cscc_core::CoreError) -> Self {
        AppError::InvalidInput(err.to_string())
    }
}

impl From<cscc_data::DataError> for AppError {
    fn from(err: cscc_data::DataError) -> Self {
        AppError::Data(err.to_string())
    }
}

impl From<cscc_metrics::MetricsError> for AppError {
    fn from(err: cscc_metrics::MetricsError) -> Self {
        AppError::Metrics(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Output(err.to_string())
    }
}

impl From<csv::Error> for AppError {
    fn from(err: csv::Error) -> Self {
        AppError::Output(err.to_string())
    }
}
