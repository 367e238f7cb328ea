//! # Production Forecast
//!
//! Forecasting of a single monthly time series with an ARIMA model fitted
//! once over the full history.
//!
//! ## Features
//!
//! - Monthly time series container and CSV loading
//! - ARIMA(p,d,q) estimation by exact Gaussian maximum likelihood (p, q <= 1)
//! - Translation of a calendar date into a forecast horizon in months
//! - A `Forecaster` facade answering "what is the value on date X?"
//!
//! ## Horizon policy
//!
//! A query must be strictly later than the last observation. The horizon is
//! counted in month periods, so a date later in the same month as the last
//! observation has horizon zero and is answered with the last observed value.
//!
//! ## Quick Start
//!
//! ```no_run
//! use production_forecast::{ArimaModel, CsvLoader, Forecaster};
//!
//! let series = CsvLoader::new()
//!     .date_column("DATE")
//!     .value_column("IPG2211A2N")
//!     .load("Electric_Production.csv")?;
//!
//! let forecaster = Forecaster::new(series, ArimaModel::arima_111())?;
//! let value = forecaster.predict("2018-06-01")?;
//! println!("Forecast: {}", value);
//! # Ok::<(), production_forecast::ForecastError>(())
//! ```

pub mod data;
pub mod dates;
pub mod error;
pub mod forecast;
pub mod forecaster;
pub mod horizon;
pub mod models;

// Re-export commonly used types
pub use crate::data::{CsvLoader, TimeSeries};
pub use crate::dates::{parse_date, MonthPeriod};
pub use crate::error::{ForecastError, Result};
pub use crate::forecast::{forecast_value, FORECAST_DECIMALS};
pub use crate::forecaster::{Forecaster, Prediction};
pub use crate::horizon::horizon;
pub use crate::models::arima::{
    ArimaConfig, ArimaModel, ArimaOrder, FittedArima, DEFAULT_MIN_OBSERVATIONS,
};
pub use crate::models::{ForecastModel, ForecastResult, TrainedForecastModel};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
