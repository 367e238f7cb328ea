//! Horizon-based value extraction from a fitted model

use crate::error::{ForecastError, Result};
use crate::models::TrainedForecastModel;
use forecast_math::stats::round_to;
use tracing::debug;

/// Decimal places kept in every returned forecast
pub const FORECAST_DECIMALS: u32 = 4;

/// Projected value `horizon` periods after the end of the training sample.
///
/// - `horizon >= 1`: the last value of the multi-step forecast path.
/// - `horizon == 0`: the target lies in the month of the last observation,
///   which is returned as is.
/// - `horizon < 0`: range error.
///
/// Values are rounded to [`FORECAST_DECIMALS`] places.
pub fn forecast_value<M>(model: Option<&M>, horizon: i64) -> Result<f64>
where
    M: TrainedForecastModel + ?Sized,
{
    let model = model.ok_or_else(|| {
        ForecastError::ModelError("No fitted model is available for forecasting".to_string())
    })?;

    let value = match horizon {
        h if h < 0 => {
            return Err(ForecastError::RangeError {
                last_known: model.sample_end(),
                message: format!(
                    "Horizon {} points before the last known data point",
                    h
                ),
            })
        }
        0 => model.last_observation(),
        h => {
            let path = model.forecast(h as usize)?;
            path.last().ok_or_else(|| {
                ForecastError::ModelError(format!("{} returned an empty forecast", model.name()))
            })?
        }
    };

    debug!(model = model.name(), horizon, value, "forecast extracted");
    Ok(round_to(value, FORECAST_DECIMALS))
}
