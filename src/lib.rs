//! # Production Forecast Workspace
//!
//! Umbrella crate over the workspace members:
//!
//! - [`math`]: differencing, the Nelder-Mead optimizer and the ARMA(1,1)
//!   Kalman filter
//! - [`forecast`]: series loading, ARIMA training and the date-query facade
//! - [`chat`]: the interactive prompt
//!
//! ## Example
//!
//! ```
//! use production_forecast_workspace::forecast::{horizon, parse_date};
//!
//! let last = parse_date("2018-01-01").unwrap();
//! let target = parse_date("2018-06-15").unwrap();
//! assert_eq!(horizon(last, target).unwrap(), 5);
//! ```

pub use forecast_chat as chat;
pub use forecast_math as math;
pub use production_forecast as forecast;

pub use production_forecast::{ForecastError, Forecaster, TimeSeries};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_members_are_reachable() {
        assert_eq!(forecast::NAME, "production_forecast");
        assert_eq!(math::difference(&[1.0, 3.0, 6.0], 1), vec![2.0, 3.0]);
        assert_eq!(chat::ChatSettings::default().exit_keyword, "exit");
    }
}
