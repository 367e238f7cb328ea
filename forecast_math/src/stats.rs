//! Summary statistics used when seeding and reporting model fits

use crate::{MathError, Result};

/// Arithmetic mean
pub fn mean(values: &[f64]) -> Result<f64> {
    if values.is_empty() {
        return Err(MathError::InsufficientData(
            "Mean of an empty slice".to_string(),
        ));
    }
    Ok(values.iter().sum::<f64>() / values.len() as f64)
}

/// Population variance
pub fn variance(values: &[f64]) -> Result<f64> {
    let m = mean(values)?;
    Ok(values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64)
}

/// Sample autocorrelation at `lag`.
///
/// Returns zero for a constant series, where the autocorrelation is undefined.
pub fn autocorrelation(values: &[f64], lag: usize) -> Result<f64> {
    if lag == 0 || values.len() <= lag {
        return Err(MathError::InsufficientData(format!(
            "Autocorrelation at lag {} needs more than {} values, got {}",
            lag,
            lag,
            values.len()
        )));
    }

    let m = mean(values)?;
    let denominator: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    if denominator <= f64::EPSILON {
        return Ok(0.0);
    }
    let numerator: f64 = values
        .iter()
        .zip(&values[lag..])
        .map(|(a, b)| (a - m) * (b - m))
        .sum();

    Ok(numerator / denominator)
}

/// Round to a fixed number of decimal places
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}
