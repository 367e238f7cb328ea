//! Forecaster facade: fit once, answer date queries

use crate::data::TimeSeries;
use crate::dates::parse_date;
use crate::error::{ForecastError, Result};
use crate::forecast::forecast_value;
use crate::horizon::horizon;
use crate::models::arima::{ArimaModel, FittedArima};
use crate::models::ForecastModel;
use chrono::NaiveDateTime;
use serde::Serialize;
use tracing::{info, warn};

/// Outcome of the one-time training step
#[derive(Debug)]
enum Training {
    Fitted(FittedArima),
    Failed(ForecastError),
}

/// A single answered query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    /// Parsed target date
    pub date: NaiveDateTime,
    /// Months between the last observation and the target
    pub horizon: i64,
    /// Forecast value, rounded to four decimals
    pub value: f64,
}

/// Owns a series and the model fitted to it.
///
/// Training happens exactly once, during construction. Everything is
/// immutable afterwards, so a `&Forecaster` can be shared between threads.
#[derive(Debug)]
pub struct Forecaster {
    series: TimeSeries,
    model: ArimaModel,
    training: Training,
}

impl Forecaster {
    /// Fit `model` to `series`, failing if training fails
    pub fn new(series: TimeSeries, model: ArimaModel) -> Result<Self> {
        let forecaster = Self::build(series, model);
        if let Training::Failed(err) = forecaster.training {
            return Err(err);
        }
        Ok(forecaster)
    }

    /// Fit an ARIMA(1,1,1) with default settings
    pub fn from_series(series: TimeSeries) -> Result<Self> {
        Self::new(series, ArimaModel::default())
    }

    /// Fit `model` to `series`, keeping a training failure instead of returning it.
    ///
    /// A forecaster whose training failed answers every parseable query with
    /// [`ForecastError::ModelError`].
    pub fn build(series: TimeSeries, model: ArimaModel) -> Self {
        let training = match model.train(&series) {
            Ok(fitted) => {
                info!(
                    model = model.name(),
                    last_known = %series.last_timestamp().date(),
                    "forecaster ready"
                );
                Training::Fitted(fitted)
            }
            Err(err) => {
                warn!(model = model.name(), error = %err, "training failed");
                Training::Failed(err)
            }
        };

        Self {
            series,
            model,
            training,
        }
    }

    /// Predict the value at `date`, rounded to four decimals
    pub fn predict(&self, date: &str) -> Result<f64> {
        self.predict_detailed(date).map(|prediction| prediction.value)
    }

    /// Predict the value at `date`, also reporting the parsed date and horizon
    pub fn predict_detailed(&self, date: &str) -> Result<Prediction> {
        let target = parse_date(date)?;
        let fitted = self.fitted()?;
        let horizon = horizon(self.series.last_timestamp(), target)?;
        let value = forecast_value(Some(fitted), horizon)?;

        Ok(Prediction {
            date: target,
            horizon,
            value,
        })
    }

    /// The historical series
    pub fn series(&self) -> &TimeSeries {
        &self.series
    }

    /// The model as configured, before fitting
    pub fn arima(&self) -> &ArimaModel {
        &self.model
    }

    /// The fitted model, if training succeeded
    pub fn model(&self) -> Option<&FittedArima> {
        match &self.training {
            Training::Fitted(fitted) => Some(fitted),
            Training::Failed(_) => None,
        }
    }

    /// Why training failed, if it did
    pub fn training_error(&self) -> Option<&ForecastError> {
        match &self.training {
            Training::Fitted(_) => None,
            Training::Failed(err) => Some(err),
        }
    }

    /// Timestamp of the last observation
    pub fn last_known_date(&self) -> NaiveDateTime {
        self.series.last_timestamp()
    }

    fn fitted(&self) -> Result<&FittedArima> {
        match &self.training {
            Training::Fitted(fitted) => Ok(fitted),
            Training::Failed(err) => Err(ForecastError::ModelError(format!(
                "{} was not fitted: {}",
                self.model.name(),
                err
            ))),
        }
    }
}
