//! Error types for the production_forecast crate

use chrono::NaiveDateTime;
use forecast_math::MathError;
use thiserror::Error;

/// Custom error types for the production_forecast crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// The requested date could not be parsed
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// The requested date is not after the last observation
    #[error("{message}: {}", .last_known.date())]
    RangeError {
        /// Last timestamp of the historical series
        last_known: NaiveDateTime,
        /// Human readable reason
        message: String,
    },

    /// The series is too short for the configured model order
    #[error("Insufficient data: need at least {needed} observations, got {got}")]
    InsufficientData { needed: usize, got: usize },

    /// Parameter estimation failed
    #[error("Convergence error: {0}")]
    ConvergenceError(String),

    /// A forecast was requested without a usable fitted model
    #[error("Model error: {0}")]
    ModelError(String),

    /// Error related to data validation or loading
    #[error("Data error: {0}")]
    DataError(String),

    /// Error from invalid parameters
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Error from IO operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error from CSV parsing
    #[error("CSV error: {0}")]
    CsvError(String),

    /// Error from numerical routines
    #[error("Math error: {0}")]
    MathError(String),
}

impl ForecastError {
    /// Range error for a target that does not lie after `last_known`
    pub fn not_after(last_known: NaiveDateTime) -> Self {
        ForecastError::RangeError {
            last_known,
            message: "Please provide a date after the last known data point".to_string(),
        }
    }

    /// The last known date carried by a range error
    pub fn last_known(&self) -> Option<NaiveDateTime> {
        match self {
            ForecastError::RangeError { last_known, .. } => Some(*last_known),
            _ => None,
        }
    }
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;

impl From<csv::Error> for ForecastError {
    fn from(err: csv::Error) -> Self {
        ForecastError::CsvError(err.to_string())
    }
}

impl From<MathError> for ForecastError {
    fn from(err: MathError) -> Self {
        ForecastError::MathError(err.to_string())
    }
}
