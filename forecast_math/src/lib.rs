//! # Forecast Math
//!
//! Numerical building blocks for fitting and projecting ARIMA models.
//! This crate provides differencing and its inverse, a Nelder-Mead simplex
//! optimizer, an ARMA(1,1) state-space model with an exact Kalman filter
//! likelihood, and a handful of summary statistics.

use thiserror::Error;

pub mod differencing;
pub mod optimization;
pub mod state_space;
pub mod stats;

pub use differencing::{difference, integrate};
pub use optimization::{nelder_mead, NelderMeadConfig, NelderMeadResult};
pub use state_space::{constrain_coefficient, unconstrain_coefficient, Arma11, FilterOutput};

/// Errors that can occur in numerical routines
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),
}

/// Result type for numerical operations
pub type Result<T> = std::result::Result<T, MathError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = MathError::InsufficientData("need 3 values".to_string());
        assert_eq!(err.to_string(), "Insufficient data for calculation: need 3 values");

        let err = MathError::CalculationError("singular".to_string());
        assert!(err.to_string().contains("singular"));
    }
}
