//! ARMA(1,1) in state-space form
//!
//! The model `y[t] = phi * y[t-1] + e[t] + theta * e[t-1]` is written in
//! Harvey's representation with state `(y[t], theta * e[t])`:
//!
//! ```text
//! state[t+1] = T * state[t] + R * e[t+1]      T = [[phi, 1], [0, 0]],  R = [1, theta]'
//! y[t]       = Z * state[t]                   Z = [1, 0]
//! ```
//!
//! The innovation variance is fixed to one so the filter output can be used
//! for a likelihood with the variance concentrated out. Setting `phi` or
//! `theta` to zero gives the MA(1), AR(1) and white-noise special cases.

use crate::{MathError, Result};
use std::f64::consts::PI;

type Matrix2 = [[f64; 2]; 2];

/// Map an unconstrained real onto (-1, 1).
///
/// Optimizing over the unconstrained value keeps AR coefficients stationary
/// and MA coefficients invertible.
pub fn constrain_coefficient(x: f64) -> f64 {
    x / (1.0 + x * x).sqrt()
}

/// Inverse of [`constrain_coefficient`] for values strictly inside (-1, 1).
pub fn unconstrain_coefficient(r: f64) -> f64 {
    r / (1.0 - r * r).sqrt()
}

/// ARMA(1,1) process with unit innovation variance
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Arma11 {
    phi: f64,
    theta: f64,
}

/// Result of running the Kalman filter over a sample
#[derive(Debug, Clone, PartialEq)]
pub struct FilterOutput {
    /// One-step-ahead prediction errors
    pub innovations: Vec<f64>,
    /// Prediction error variances (in units of the innovation variance)
    pub variances: Vec<f64>,
    /// Predicted state for the period after the last observation
    pub next_state: [f64; 2],
}

impl Arma11 {
    /// Create a process, rejecting non-stationary or non-invertible coefficients
    pub fn new(phi: f64, theta: f64) -> Result<Self> {
        if !phi.is_finite() || phi.abs() >= 1.0 {
            return Err(MathError::InvalidInput(format!(
                "AR coefficient must lie in (-1, 1), got {}",
                phi
            )));
        }
        if !theta.is_finite() || theta.abs() >= 1.0 {
            return Err(MathError::InvalidInput(format!(
                "MA coefficient must lie in (-1, 1), got {}",
                theta
            )));
        }
        Ok(Self { phi, theta })
    }

    /// AR coefficient
    pub fn phi(&self) -> f64 {
        self.phi
    }

    /// MA coefficient
    pub fn theta(&self) -> f64 {
        self.theta
    }

    /// Unconditional state covariance, the solution of `P = T P T' + R R'`
    pub fn stationary_covariance(&self) -> Matrix2 {
        let (phi, theta) = (self.phi, self.theta);
        let variance = (1.0 + 2.0 * phi * theta + theta * theta) / (1.0 - phi * phi);
        [[variance, theta], [theta, theta * theta]]
    }

    /// Run the Kalman filter over `observations`.
    pub fn filter(&self, observations: &[f64]) -> Result<FilterOutput> {
        if observations.is_empty() {
            return Err(MathError::InsufficientData(
                "Kalman filter needs at least one observation".to_string(),
            ));
        }

        let mut state = [0.0, 0.0];
        let mut cov = self.stationary_covariance();
        let mut innovations = Vec::with_capacity(observations.len());
        let mut variances = Vec::with_capacity(observations.len());

        for (t, &y) in observations.iter().enumerate() {
            let f = cov[0][0];
            if !(f.is_finite() && f > 0.0) {
                return Err(MathError::CalculationError(format!(
                    "Degenerate prediction variance {} at observation {}",
                    f, t
                )));
            }
            let v = y - state[0];

            // measurement update
            let gain = [cov[0][0] / f, cov[1][0] / f];
            let filtered_state = [state[0] + gain[0] * v, state[1] + gain[1] * v];
            let mut filtered_cov = cov;
            for (i, row) in filtered_cov.iter_mut().enumerate() {
                for (j, cell) in row.iter_mut().enumerate() {
                    *cell -= gain[i] * cov[0][j];
                }
            }

            // time update
            state = self.transition(filtered_state);
            cov = self.propagate(&filtered_cov);

            innovations.push(v);
            variances.push(f);
        }

        Ok(FilterOutput {
            innovations,
            variances,
            next_state: state,
        })
    }

    /// Point forecasts for `horizon` periods starting from a predicted state.
    ///
    /// Future shocks have zero expectation, so only the transition matrix
    /// acts on the state.
    pub fn forecast(&self, next_state: [f64; 2], horizon: usize) -> Vec<f64> {
        let mut state = next_state;
        let mut path = Vec::with_capacity(horizon);
        for _ in 0..horizon {
            path.push(state[0]);
            state = self.transition(state);
        }
        path
    }

    fn transition(&self, state: [f64; 2]) -> [f64; 2] {
        [self.phi * state[0] + state[1], 0.0]
    }

    /// `T P T' + R R'`
    fn propagate(&self, cov: &Matrix2) -> Matrix2 {
        let (phi, theta) = (self.phi, self.theta);
        let top = phi * phi * cov[0][0] + phi * (cov[0][1] + cov[1][0]) + cov[1][1];
        [[top + 1.0, theta], [theta, theta * theta]]
    }
}

impl FilterOutput {
    /// Number of observations filtered
    pub fn len(&self) -> usize {
        self.innovations.len()
    }

    /// Whether the filter saw no observations
    pub fn is_empty(&self) -> bool {
        self.innovations.is_empty()
    }

    /// Maximum-likelihood innovation variance, `sum(v^2 / F) / n`
    pub fn innovation_variance(&self) -> f64 {
        let weighted: f64 = self
            .innovations
            .iter()
            .zip(&self.variances)
            .map(|(v, f)| v * v / f)
            .sum();
        weighted / self.len() as f64
    }

    /// Gaussian log-likelihood with the innovation variance concentrated out
    pub fn concentrated_log_likelihood(&self) -> f64 {
        let n = self.len() as f64;
        let sigma2 = self.innovation_variance();
        let log_det: f64 = self.variances.iter().map(|f| f.ln()).sum();
        -0.5 * n * ((2.0 * PI).ln() + sigma2.ln() + 1.0) - 0.5 * log_det
    }

    /// Innovations scaled by their standard deviations
    pub fn standardized_innovations(&self) -> Vec<f64> {
        let sigma = self.innovation_variance().sqrt();
        self.innovations
            .iter()
            .zip(&self.variances)
            .map(|(v, f)| v / (f.sqrt() * sigma))
            .collect()
    }
}
