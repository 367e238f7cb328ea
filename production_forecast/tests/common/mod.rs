//! Shared fixtures for integration tests

#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use production_forecast::TimeSeries;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};

/// First-of-month timestamps for `n` consecutive months ending at `end_year-end_month`
pub fn monthly_dates(end_year: i32, end_month: u32, n: usize) -> Vec<NaiveDateTime> {
    let end = end_year as i64 * 12 + end_month as i64 - 1;
    (0..n)
        .map(|i| {
            let ordinal = end - (n - 1 - i) as i64;
            NaiveDate::from_ymd_opt((ordinal / 12) as i32, (ordinal % 12) as u32 + 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
        })
        .collect()
}

/// Simulate ARIMA(1,1,1) levels with unit innovation variance
pub fn simulate_arima111(
    n: usize,
    phi: f64,
    theta: f64,
    drift: f64,
    seed: u64,
) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let noise = Normal::new(0.0, 1.0).unwrap();
    let burn_in = 200;

    let mut prev_diff = 0.0;
    let mut prev_shock = 0.0;
    let mut level = 100.0;
    let mut levels = Vec::with_capacity(n);

    for t in 0..(burn_in + n) {
        let shock = noise.sample(&mut rng);
        let diff = phi * prev_diff + shock + theta * prev_shock;
        prev_diff = diff;
        prev_shock = shock;
        if t >= burn_in {
            level += drift + diff;
            levels.push(level);
        }
    }
    levels
}

/// Independent N(level, 1) draws, which are over-differenced by any d >= 1
pub fn white_noise(n: usize, level: f64, seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let noise = Normal::new(level, 1.0).unwrap();
    (0..n).map(|_| noise.sample(&mut rng)).collect()
}

/// Simulated monthly series whose last observation is 2018-01-01
pub fn simulated_series(n: usize, seed: u64) -> TimeSeries {
    let values = simulate_arima111(n, 0.5, 0.3, 0.0, seed);
    TimeSeries::new("IPG2211A2N", monthly_dates(2018, 1, n), values).unwrap()
}
