//! Error types for the transit_ecm crate

use polars::prelude::PolarsError;
use thiserror::Error;
use transit_math::MathError;

/// Errors surfaced by the alignment, estimation and forecasting stages
#[derive(Debug, Error)]
pub enum EcmError {
    /// Missing columns, too few observations or degenerate series
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Every lag combination in the grid was skipped
    #[error("Lag search exhausted: none of {combinations} combinations produced a usable fit")]
    SearchExhaustionError { combinations: usize },

    /// Malformed input tables
    #[error("Data error: {0}")]
    DataError(String),

    /// Error from numerical routines
    #[error("Math error: {0}")]
    MathError(#[from] MathError),

    /// Error from IO operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error from Polars operations
    #[error("Polars error: {0}")]
    PolarsError(String),

    #[error("CSV error: {0}")]
    CsvError(String),

    /// Invalid or unreadable configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, EcmError>;

impl From<PolarsError> for EcmError {
    fn from(err: PolarsError) -> Self {
        EcmError::PolarsError(err.to_string())
    }
}

impl From<csv::Error> for EcmError {
    fn from(err: csv::Error) -> Self {
        EcmError::CsvError(err.to_string())
    }
}

impl From<serde_json::Error> for EcmError {
    fn from(err: serde_json::Error) -> Self {
        EcmError::ConfigError(err.to_string())
    }
}
