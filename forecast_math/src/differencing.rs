//! Differencing and integration of time series
//!
//! Differencing `d` times removes a polynomial trend of degree `d`;
//! integration undoes it by cumulatively summing projected differences onto
//! the last known level of every intermediate series.

use crate::{MathError, Result};

/// Apply `d` rounds of first differencing.
///
/// Each round shortens the series by one value. A series that runs out of
/// values comes back empty.
pub fn difference(series: &[f64], d: usize) -> Vec<f64> {
    let mut result = series.to_vec();
    for _ in 0..d {
        if result.len() < 2 {
            return Vec::new();
        }
        result = result.windows(2).map(|w| w[1] - w[0]).collect();
    }
    result
}

/// Re-integrate projected differences onto the end of `history`.
///
/// `differences` are future values on the `d`-times differenced scale; the
/// returned vector holds the same periods on the original scale.
pub fn integrate(differences: &[f64], history: &[f64], d: usize) -> Result<Vec<f64>> {
    if d == 0 {
        return Ok(differences.to_vec());
    }
    if history.len() < d {
        return Err(MathError::InsufficientData(format!(
            "Integration of order {} needs at least {} historical values, got {}",
            d,
            d,
            history.len()
        )));
    }

    let mut result = differences.to_vec();
    for level in (0..d).rev() {
        let anchor = difference(history, level)
            .last()
            .copied()
            .ok_or_else(|| {
                MathError::InsufficientData(format!("No level available at difference order {}", level))
            })?;

        let mut running = anchor;
        for value in result.iter_mut() {
            running += *value;
            *value = running;
        }
    }

    Ok(result)
}
