//! ARIMA models for time series forecasting
//!
//! Parameters are estimated by exact Gaussian maximum likelihood: the series
//! is differenced `d` times, the ARMA part is cast in state-space form, and
//! the Kalman filter likelihood (innovation variance concentrated out) is
//! maximized with a deterministic Nelder-Mead search over unconstrained
//! coefficients.

use crate::data::TimeSeries;
use crate::error::{ForecastError, Result};
use crate::models::{ForecastModel, ForecastResult, TrainedForecastModel};
use chrono::NaiveDateTime;
use forecast_math::stats::{autocorrelation, mean};
use forecast_math::{
    constrain_coefficient, difference, integrate, nelder_mead, unconstrain_coefficient, Arma11,
    NelderMeadConfig,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info};

/// Smallest series length accepted by default.
///
/// ARIMA(1,1,1) can technically be estimated from four points, but the
/// likelihood surface is too flat for a meaningful fit below ten.
pub const DEFAULT_MIN_OBSERVATIONS: usize = 10;

/// Coefficients closer than this to +/-1 are rejected as non-stationary or non-invertible
const BOUNDARY_MARGIN: f64 = 1e-3;

/// Starting AR coefficients are clamped to this magnitude
const MAX_START_COEFFICIENT: f64 = 0.9;

/// ARIMA order (p, d, q)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArimaOrder {
    /// AR order
    pub p: usize,
    /// Differencing order
    pub d: usize,
    /// MA order
    pub q: usize,
}

impl ArimaOrder {
    /// Create an order, rejecting ones the state-space model cannot represent
    pub fn new(p: usize, d: usize, q: usize) -> Result<Self> {
        let order = Self { p, d, q };
        order.validate()?;
        Ok(order)
    }

    /// AR and MA orders are limited to one, differencing to two
    pub fn validate(&self) -> Result<()> {
        if self.p > 1 || self.q > 1 {
            return Err(ForecastError::InvalidParameter(format!(
                "Only AR and MA orders 0 or 1 are supported, got p={} q={}",
                self.p, self.q
            )));
        }
        if self.d > 2 {
            return Err(ForecastError::InvalidParameter(format!(
                "Differencing order must be at most 2, got {}",
                self.d
            )));
        }
        Ok(())
    }

    /// Fewest observations that leave one residual after differencing and lags
    pub fn min_observations(&self) -> usize {
        self.p + self.d + self.q + 1
    }
}

impl Default for ArimaOrder {
    fn default() -> Self {
        Self { p: 1, d: 1, q: 1 }
    }
}

impl fmt::Display for ArimaOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{},{})", self.p, self.d, self.q)
    }
}

impl FromStr for ArimaOrder {
    type Err = ForecastError;

    /// Parse `p,d,q`, optionally wrapped in parentheses
    fn from_str(s: &str) -> Result<Self> {
        let inner = s.trim().trim_start_matches('(').trim_end_matches(')');
        let parts = inner
            .split(',')
            .map(|part| part.trim().parse::<usize>())
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| ForecastError::InvalidParameter(format!("Invalid order '{}': {}", s, e)))?;

        match parts.as_slice() {
            [p, d, q] => Self::new(*p, *d, *q),
            _ => Err(ForecastError::InvalidParameter(format!(
                "Order must have three components p,d,q, got '{}'",
                s
            ))),
        }
    }
}

/// Estimation settings for [`ArimaModel`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArimaConfig {
    /// Model order
    pub order: ArimaOrder,
    /// Estimate a constant mean for the differenced series
    pub include_drift: bool,
    /// Minimum series length accepted for training
    pub min_observations: usize,
    /// Optimizer settings
    pub optimizer: NelderMeadConfig,
}

impl Default for ArimaConfig {
    fn default() -> Self {
        Self {
            order: ArimaOrder::default(),
            include_drift: false,
            min_observations: DEFAULT_MIN_OBSERVATIONS,
            optimizer: NelderMeadConfig::default(),
        }
    }
}

impl ArimaConfig {
    /// Validate every setting
    pub fn validate(&self) -> Result<()> {
        self.order.validate()?;
        self.optimizer
            .validate()
            .map_err(|e| ForecastError::InvalidParameter(e.to_string()))
    }

    /// Observations required by both the order and the configured minimum
    pub fn required_observations(&self) -> usize {
        self.min_observations.max(self.order.min_observations())
    }
}

/// Which entries of the optimizer's parameter vector are in use
#[derive(Debug, Clone, Copy)]
struct ParameterLayout {
    ar: bool,
    ma: bool,
    drift: bool,
}

impl ParameterLayout {
    fn new(config: &ArimaConfig) -> Self {
        Self {
            ar: config.order.p == 1,
            ma: config.order.q == 1,
            drift: config.include_drift,
        }
    }

    fn len(&self) -> usize {
        self.ar as usize + self.ma as usize + self.drift as usize
    }

    /// Unpack `(phi, theta, drift)` from unconstrained parameters
    fn decode(&self, params: &[f64]) -> (f64, f64, f64) {
        let mut it = params.iter().copied();
        let phi = if self.ar {
            it.next().map(constrain_coefficient).unwrap_or(0.0)
        } else {
            0.0
        };
        let theta = if self.ma {
            it.next().map(constrain_coefficient).unwrap_or(0.0)
        } else {
            0.0
        };
        let drift = if self.drift { it.next().unwrap_or(0.0) } else { 0.0 };
        (phi, theta, drift)
    }
}

/// Mean negative log-likelihood of the differenced series
fn negative_log_likelihood(diffs: &[f64], phi: f64, theta: f64, drift: f64) -> f64 {
    let centered: Vec<f64> = diffs.iter().map(|d| d - drift).collect();
    match Arma11::new(phi, theta).and_then(|process| process.filter(&centered)) {
        Ok(output) => -output.concentrated_log_likelihood() / centered.len() as f64,
        Err(_) => f64::INFINITY,
    }
}

/// ARIMA model (AutoRegressive Integrated Moving Average)
#[derive(Debug, Clone)]
pub struct ArimaModel {
    /// Name of the model
    name: String,
    /// Estimation settings
    config: ArimaConfig,
}

/// Trained ARIMA model
#[derive(Debug, Clone, Serialize)]
pub struct FittedArima {
    /// Name of the model
    name: String,
    /// Name of the series the model was fit to
    series_name: String,
    /// Model order
    order: ArimaOrder,
    /// Fitted AR coefficient
    ar: Option<f64>,
    /// Fitted MA coefficient
    ma: Option<f64>,
    /// Fitted mean of the differenced series
    drift: Option<f64>,
    /// Innovation variance
    sigma2: f64,
    /// Maximized log-likelihood
    log_likelihood: f64,
    /// Akaike information criterion
    aic: f64,
    /// Bayesian information criterion
    bic: f64,
    /// Number of observations in the training series
    nobs: usize,
    /// Optimizer iterations used
    iterations: usize,
    /// Timestamp of the last observation
    sample_end: NaiveDateTime,
    /// Tail of the training series used to re-integrate forecasts
    #[serde(skip)]
    history_tail: Vec<f64>,
    /// Predicted state for the first period after the sample
    #[serde(skip)]
    next_state: [f64; 2],
}

impl ArimaModel {
    /// Create a new ARIMA model
    pub fn new(config: ArimaConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            name: format!("ARIMA{}", config.order),
            config,
        })
    }

    /// ARIMA(1,1,1) with default estimation settings
    pub fn arima_111() -> Self {
        Self {
            name: format!("ARIMA{}", ArimaOrder::default()),
            config: ArimaConfig::default(),
        }
    }

    /// Estimation settings
    pub fn config(&self) -> &ArimaConfig {
        &self.config
    }

    /// Deterministic starting point for the optimizer
    fn starting_values(&self, diffs: &[f64], layout: ParameterLayout) -> Result<Vec<f64>> {
        let mut start = Vec::with_capacity(layout.len());
        if layout.ar {
            let acf = if diffs.len() > 1 {
                autocorrelation(diffs, 1)?
            } else {
                0.0
            };
            let phi0 = acf.clamp(-MAX_START_COEFFICIENT, MAX_START_COEFFICIENT);
            start.push(unconstrain_coefficient(phi0));
        }
        if layout.ma {
            start.push(0.0);
        }
        if layout.drift {
            start.push(mean(diffs)?);
        }
        Ok(start)
    }
}

impl Default for ArimaModel {
    fn default() -> Self {
        Self::arima_111()
    }
}

impl ForecastModel for ArimaModel {
    type Trained = FittedArima;

    fn train(&self, data: &TimeSeries) -> Result<FittedArima> {
        let values = data.values();
        let needed = self.config.required_observations();
        if values.len() < needed {
            return Err(ForecastError::InsufficientData {
                needed,
                got: values.len(),
            });
        }

        let order = self.config.order;
        let diffs = difference(values, order.d);
        let layout = ParameterLayout::new(&self.config);

        let (params, iterations) = if layout.len() == 0 {
            (Vec::new(), 0)
        } else {
            let start = self.starting_values(&diffs, layout)?;
            let result = nelder_mead(
                |params| {
                    let (phi, theta, drift) = layout.decode(params);
                    negative_log_likelihood(&diffs, phi, theta, drift)
                },
                &start,
                &self.config.optimizer,
            )?;
            debug!(
                model = %self.name,
                iterations = result.iterations,
                objective = result.value,
                "optimizer finished"
            );

            if !result.converged {
                return Err(ForecastError::ConvergenceError(format!(
                    "{} did not converge within {} iterations",
                    self.name, self.config.optimizer.max_iterations
                )));
            }
            if !result.value.is_finite() {
                return Err(ForecastError::ConvergenceError(format!(
                    "{} likelihood is not finite at the optimum",
                    self.name
                )));
            }
            (result.point, result.iterations)
        };

        let (phi, theta, drift) = layout.decode(&params);
        if layout.ar && 1.0 - phi.abs() < BOUNDARY_MARGIN {
            return Err(ForecastError::ConvergenceError(format!(
                "AR coefficient {:.6} is on the stationarity boundary",
                phi
            )));
        }
        if layout.ma && 1.0 - theta.abs() < BOUNDARY_MARGIN {
            return Err(ForecastError::ConvergenceError(format!(
                "MA coefficient {:.6} is on the invertibility boundary",
                theta
            )));
        }

        let centered: Vec<f64> = diffs.iter().map(|d| d - drift).collect();
        let process = Arma11::new(phi, theta)?;
        let output = process.filter(&centered)?;

        let sigma2 = output.innovation_variance();
        let log_likelihood = output.concentrated_log_likelihood();
        if !(sigma2 > 0.0 && log_likelihood.is_finite()) {
            return Err(ForecastError::ConvergenceError(format!(
                "Degenerate fit: innovation variance {}",
                sigma2
            )));
        }

        // estimated coefficients plus the innovation variance
        let k = (layout.len() + 1) as f64;
        let n_eff = output.len() as f64;
        let aic = -2.0 * log_likelihood + 2.0 * k;
        let bic = -2.0 * log_likelihood + k * n_eff.ln();

        let tail_len = (order.d + 1).min(values.len());
        let fitted = FittedArima {
            name: self.name.clone(),
            series_name: data.name().to_string(),
            order,
            ar: layout.ar.then_some(phi),
            ma: layout.ma.then_some(theta),
            drift: layout.drift.then_some(drift),
            sigma2,
            log_likelihood,
            aic,
            bic,
            nobs: values.len(),
            iterations,
            sample_end: data.last_timestamp(),
            history_tail: values[values.len() - tail_len..].to_vec(),
            next_state: output.next_state,
        };

        info!(
            model = %fitted.name,
            series = %fitted.series_name,
            nobs = fitted.nobs,
            ar = ?fitted.ar,
            ma = ?fitted.ma,
            drift = ?fitted.drift,
            sigma2 = fitted.sigma2,
            "model fitted"
        );
        Ok(fitted)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl FittedArima {
    /// Model order
    pub fn order(&self) -> ArimaOrder {
        self.order
    }

    /// AR coefficient, if the order has one
    pub fn ar_coefficient(&self) -> Option<f64> {
        self.ar
    }

    /// MA coefficient, if the order has one
    pub fn ma_coefficient(&self) -> Option<f64> {
        self.ma
    }

    /// Mean of the differenced series, if drift was estimated
    pub fn drift(&self) -> Option<f64> {
        self.drift
    }

    /// Innovation (residual) variance
    pub fn sigma2(&self) -> f64 {
        self.sigma2
    }

    /// Maximized log-likelihood
    pub fn log_likelihood(&self) -> f64 {
        self.log_likelihood
    }

    /// Akaike information criterion
    pub fn aic(&self) -> f64 {
        self.aic
    }

    /// Bayesian information criterion
    pub fn bic(&self) -> f64 {
        self.bic
    }

    /// Number of observations in the training series
    pub fn nobs(&self) -> usize {
        self.nobs
    }

    /// Optimizer iterations used during estimation
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Serialize the estimated parameters to JSON
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ForecastError::DataError(format!("Failed to serialize model: {}", e)))
    }
}

impl TrainedForecastModel for FittedArima {
    fn forecast(&self, horizons: usize) -> Result<ForecastResult> {
        if self.history_tail.is_empty() {
            return Err(ForecastError::ModelError(
                "Model has not been fitted to data".to_string(),
            ));
        }
        if horizons == 0 {
            return ForecastResult::new(Vec::new(), 0);
        }

        let process = Arma11::new(self.ar.unwrap_or(0.0), self.ma.unwrap_or(0.0))?;
        let drift = self.drift.unwrap_or(0.0);
        let differenced: Vec<f64> = process
            .forecast(self.next_state, horizons)
            .into_iter()
            .map(|x| x + drift)
            .collect();
        let levels = integrate(&differenced, &self.history_tail, self.order.d)?;

        ForecastResult::new(levels, horizons)
    }

    fn last_observation(&self) -> f64 {
        self.history_tail[self.history_tail.len() - 1]
    }

    fn sample_end(&self) -> NaiveDateTime {
        self.sample_end
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for FittedArima {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let show = |value: Option<f64>| match value {
            Some(v) => format!("{:.4}", v),
            None => "-".to_string(),
        };
        writeln!(f, "{} fit on {}", self.name, self.series_name)?;
        writeln!(f, "  Observations:   {}", self.nobs)?;
        writeln!(f, "  Sample end:     {}", self.sample_end.date())?;
        writeln!(f, "  ar.L1:          {}", show(self.ar))?;
        writeln!(f, "  ma.L1:          {}", show(self.ma))?;
        writeln!(f, "  drift:          {}", show(self.drift))?;
        writeln!(f, "  sigma2:         {:.4}", self.sigma2)?;
        writeln!(f, "  Log likelihood: {:.4}", self.log_likelihood)?;
        writeln!(f, "  AIC:            {:.4}", self.aic)?;
        writeln!(f, "  BIC:            {:.4}", self.bic)?;
        writeln!(f, "  Iterations:     {}", self.iterations)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("1,1,1", ArimaOrder { p: 1, d: 1, q: 1 })]
    #[case("(0, 1, 1)", ArimaOrder { p: 0, d: 1, q: 1 })]
    #[case("1,2,0", ArimaOrder { p: 1, d: 2, q: 0 })]
    fn test_order_parsing(#[case] input: &str, #[case] expected: ArimaOrder) {
        assert_eq!(input.parse::<ArimaOrder>().unwrap(), expected);
    }

    #[rstest]
    #[case("2,1,1")]
    #[case("1,3,1")]
    #[case("1,1")]
    #[case("a,b,c")]
    fn test_order_rejected(#[case] input: &str) {
        assert!(matches!(
            input.parse::<ArimaOrder>(),
            Err(ForecastError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_layout_decoding() {
        let layout = ParameterLayout {
            ar: false,
            ma: true,
            drift: true,
        };
        let (phi, theta, drift) = layout.decode(&[0.0, 1.5]);
        assert_eq!(phi, 0.0);
        assert_eq!(theta, 0.0);
        assert_eq!(drift, 1.5);
        assert_eq!(layout.len(), 2);
    }

    #[test]
    fn test_required_observations() {
        let config = ArimaConfig::default();
        assert_eq!(config.required_observations(), DEFAULT_MIN_OBSERVATIONS);

        let relaxed = ArimaConfig {
            min_observations: 0,
            ..Default::default()
        };
        assert_eq!(relaxed.required_observations(), 4);
    }

    #[test]
    fn test_model_name() {
        assert_eq!(ArimaModel::arima_111().name(), "ARIMA(1,1,1)");
        let config = ArimaConfig {
            order: ArimaOrder::new(0, 1, 1).unwrap(),
            ..Default::default()
        };
        assert_eq!(ArimaModel::new(config).unwrap().name(), "ARIMA(0,1,1)");
    }
}
