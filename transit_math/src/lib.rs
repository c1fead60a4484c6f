//! # Transit Math
//!
//! Numerical building blocks for the transit-time econometrics pipeline.
//! This crate provides ordinary least squares with robust covariance,
//! residual diagnostics and a few series helpers. It knows nothing about
//! routes or panels.

use thiserror::Error;

pub mod diagnostics;
pub mod regression;
pub mod rolling;
pub mod series;

pub use diagnostics::{JarqueBera, LjungBox, TestResult};
pub use regression::{CovarianceType, InformationCriterion, OlsFit};

/// Errors that can occur in numerical calculations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),

    #[error("Singular design matrix: rank {rank} < {columns} columns")]
    SingularMatrix { rank: usize, columns: usize },
}

/// Result type for numerical operations
pub type Result<T> = std::result::Result<T, MathError>;

impl From<statrs::StatsError> for MathError {
    fn from(err: statrs::StatsError) -> Self {
        MathError::CalculationError(err.to_string())
    }
}
