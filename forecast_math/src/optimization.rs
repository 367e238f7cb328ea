//! Derivative-free minimization with the Nelder-Mead simplex method
//!
//! The search is fully deterministic: the initial simplex is built from the
//! starting point with fixed steps, so the same objective and start always
//! produce the same optimum.

use crate::{MathError, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Configuration for Nelder-Mead optimization
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NelderMeadConfig {
    /// Maximum number of iterations
    pub max_iterations: usize,
    /// Convergence tolerance on both the spread of objective values and the
    /// simplex diameter
    pub tolerance: f64,
    /// Reflection coefficient
    pub alpha: f64,
    /// Expansion coefficient
    pub gamma: f64,
    /// Contraction coefficient
    pub rho: f64,
    /// Shrink coefficient
    pub sigma: f64,
    /// Step used to build the initial simplex
    pub initial_step: f64,
}

impl Default for NelderMeadConfig {
    fn default() -> Self {
        Self {
            max_iterations: 2000,
            tolerance: 1e-8,
            alpha: 1.0,
            gamma: 2.0,
            rho: 0.5,
            sigma: 0.5,
            initial_step: 0.1,
        }
    }
}

impl NelderMeadConfig {
    /// Check that the coefficients describe a usable simplex search
    pub fn validate(&self) -> Result<()> {
        if self.max_iterations == 0 {
            return Err(MathError::InvalidInput(
                "max_iterations must be at least 1".to_string(),
            ));
        }
        if !(self.tolerance > 0.0 && self.tolerance.is_finite()) {
            return Err(MathError::InvalidInput(format!(
                "tolerance must be positive and finite, got {}",
                self.tolerance
            )));
        }
        if self.alpha <= 0.0 || self.gamma <= 1.0 {
            return Err(MathError::InvalidInput(
                "alpha must be positive and gamma greater than 1".to_string(),
            ));
        }
        if !(0.0..1.0).contains(&self.rho) || !(0.0..1.0).contains(&self.sigma) {
            return Err(MathError::InvalidInput(
                "rho and sigma must lie in (0, 1)".to_string(),
            ));
        }
        if self.initial_step <= 0.0 {
            return Err(MathError::InvalidInput(
                "initial_step must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Outcome of a Nelder-Mead search
#[derive(Debug, Clone, PartialEq)]
pub struct NelderMeadResult {
    /// Best point found
    pub point: Vec<f64>,
    /// Objective value at `point`
    pub value: f64,
    /// Iterations performed
    pub iterations: usize,
    /// Whether the tolerance was met before the iteration budget ran out
    pub converged: bool,
}

/// Minimize `objective` starting from `initial`.
///
/// Non-finite objective values are treated as `+inf`, which lets callers
/// reject infeasible regions by returning `f64::INFINITY` or `NaN`.
///
/// # Example
/// ```
/// use forecast_math::{nelder_mead, NelderMeadConfig};
///
/// let result = nelder_mead(
///     |x| (x[0] - 2.0).powi(2) + (x[1] + 1.0).powi(2),
///     &[0.0, 0.0],
///     &NelderMeadConfig::default(),
/// )
/// .unwrap();
///
/// assert!(result.converged);
/// assert!((result.point[0] - 2.0).abs() < 1e-3);
/// assert!((result.point[1] + 1.0).abs() < 1e-3);
/// ```
pub fn nelder_mead<F>(
    objective: F,
    initial: &[f64],
    config: &NelderMeadConfig,
) -> Result<NelderMeadResult>
where
    F: Fn(&[f64]) -> f64,
{
    config.validate()?;
    let n = initial.len();
    if n == 0 {
        return Err(MathError::InvalidInput(
            "Cannot optimize over zero parameters".to_string(),
        ));
    }

    let eval = |x: &[f64]| {
        let value = objective(x);
        if value.is_finite() {
            value
        } else {
            f64::INFINITY
        }
    };

    let mut simplex: Vec<Vec<f64>> = Vec::with_capacity(n + 1);
    simplex.push(initial.to_vec());
    for i in 0..n {
        let mut vertex = initial.to_vec();
        vertex[i] += if initial[i].abs() > 1e-8 {
            config.initial_step * initial[i].abs()
        } else {
            config.initial_step
        };
        simplex.push(vertex);
    }
    let mut values: Vec<f64> = simplex.iter().map(|v| eval(v)).collect();

    let mut iterations = 0;
    let mut converged = false;

    while iterations < config.max_iterations {
        order_simplex(&mut simplex, &mut values);

        let best = values[0];
        let worst = values[n];
        // value spread alone can vanish across a minimum in one dimension
        if best.is_finite()
            && (worst - best).abs() <= config.tolerance
            && simplex_diameter(&simplex) <= config.tolerance
        {
            converged = true;
            break;
        }

        iterations += 1;
        let centroid = centroid(&simplex[..n]);

        let reflected = combine(&centroid, &simplex[n], -config.alpha);
        let reflected_value = eval(&reflected);

        if reflected_value < values[0] {
            let expanded = combine(&centroid, &reflected, config.gamma);
            let expanded_value = eval(&expanded);
            if expanded_value < reflected_value {
                simplex[n] = expanded;
                values[n] = expanded_value;
            } else {
                simplex[n] = reflected;
                values[n] = reflected_value;
            }
            continue;
        }

        if reflected_value < values[n - 1] {
            simplex[n] = reflected;
            values[n] = reflected_value;
            continue;
        }

        let (contracted, contracted_value) = if reflected_value < values[n] {
            let outside = combine(&centroid, &reflected, config.rho);
            let value = eval(&outside);
            (outside, value)
        } else {
            let inside = combine(&centroid, &simplex[n], config.rho);
            let value = eval(&inside);
            (inside, value)
        };

        if contracted_value < reflected_value.min(values[n]) {
            simplex[n] = contracted;
            values[n] = contracted_value;
            continue;
        }

        // shrink towards the best vertex
        let anchor = simplex[0].clone();
        for i in 1..=n {
            simplex[i] = combine(&anchor, &simplex[i], config.sigma);
            values[i] = eval(&simplex[i]);
        }
    }

    order_simplex(&mut simplex, &mut values);

    Ok(NelderMeadResult {
        point: simplex.swap_remove(0),
        value: values[0],
        iterations,
        converged,
    })
}

/// Sort vertices by ascending objective value.
fn order_simplex(simplex: &mut Vec<Vec<f64>>, values: &mut Vec<f64>) {
    let mut paired: Vec<(f64, Vec<f64>)> = values
        .drain(..)
        .zip(simplex.drain(..))
        .collect();
    paired.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));
    for (value, vertex) in paired {
        values.push(value);
        simplex.push(vertex);
    }
}

fn centroid(vertices: &[Vec<f64>]) -> Vec<f64> {
    let dim = vertices[0].len();
    let mut c = vec![0.0; dim];
    for vertex in vertices {
        for (acc, x) in c.iter_mut().zip(vertex) {
            *acc += x;
        }
    }
    let count = vertices.len() as f64;
    c.iter_mut().for_each(|x| *x /= count);
    c
}

/// `centroid + coefficient * (point - centroid)`
fn combine(centroid: &[f64], point: &[f64], coefficient: f64) -> Vec<f64> {
    centroid
        .iter()
        .zip(point)
        .map(|(c, p)| c + coefficient * (p - c))
        .collect()
}

fn simplex_diameter(simplex: &[Vec<f64>]) -> f64 {
    let best = &simplex[0];
    simplex[1..]
        .iter()
        .map(|v| {
            v.iter()
                .zip(best)
                .map(|(a, b)| (a - b).abs())
                .fold(0.0, f64::max)
        })
        .fold(0.0, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rstest::rstest;

    #[test]
    fn test_quadratic_bowl() {
        let result = nelder_mead(
            |x| (x[0] - 2.0).powi(2) + 3.0 * (x[1] - 3.0).powi(2),
            &[0.0, 0.0],
            &NelderMeadConfig::default(),
        )
        .unwrap();

        assert!(result.converged);
        assert_abs_diff_eq!(result.point[0], 2.0, epsilon = 1e-3);
        assert_abs_diff_eq!(result.point[1], 3.0, epsilon = 1e-3);
        assert_abs_diff_eq!(result.value, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_one_dimensional() {
        let result = nelder_mead(
            |x| (x[0] + 0.75).powi(2) + 1.0,
            &[1.0],
            &NelderMeadConfig::default(),
        )
        .unwrap();

        assert!(result.converged);
        assert_abs_diff_eq!(result.point[0], -0.75, epsilon = 1e-3);
        assert_abs_diff_eq!(result.value, 1.0, epsilon = 1e-6);
    }

    #[rstest]
    #[case(0.0)]
    #[case(1.0)]
    #[case(5.0)]
    #[case(-3.0)]
    fn test_one_dimensional_from_any_start(#[case] start: f64) {
        let result = nelder_mead(
            |x| (x[0] + 0.75).powi(2) + 1.0,
            &[start],
            &NelderMeadConfig::default(),
        )
        .unwrap();

        assert!(result.converged);
        assert_abs_diff_eq!(result.point[0], -0.75, epsilon = 1e-4);
    }

    #[test]
    fn test_infeasible_region_is_avoided() {
        // Minimum of the unconstrained parabola sits at x = -1, which is rejected
        let result = nelder_mead(
            |x| {
                if x[0] < 0.0 {
                    f64::NAN
                } else {
                    (x[0] + 1.0).powi(2)
                }
            },
            &[2.0],
            &NelderMeadConfig::default(),
        )
        .unwrap();

        assert!(result.point[0] >= 0.0);
        assert!(result.value.is_finite());
    }

    #[test]
    fn test_deterministic() {
        let objective = |x: &[f64]| (1.0 - x[0]).powi(2) + 10.0 * (x[1] - x[0] * x[0]).powi(2);
        let config = NelderMeadConfig::default();
        let a = nelder_mead(objective, &[-0.5, 0.5], &config).unwrap();
        let b = nelder_mead(objective, &[-0.5, 0.5], &config).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_iteration_budget_exhausted() {
        let config = NelderMeadConfig {
            max_iterations: 2,
            ..Default::default()
        };
        let result = nelder_mead(|x| (x[0] - 50.0).powi(2), &[0.0], &config).unwrap();
        assert!(!result.converged);
        assert_eq!(result.iterations, 2);
    }

    #[test]
    fn test_invalid_configuration() {
        let config = NelderMeadConfig {
            tolerance: 0.0,
            ..Default::default()
        };
        assert!(nelder_mead(|x| x[0], &[0.0], &config).is_err());
        assert!(nelder_mead(|x| x.len() as f64, &[], &NelderMeadConfig::default()).is_err());
    }
}
