use chrono::{Months, NaiveDate};
use production_forecast::models::{ForecastModel, TrainedForecastModel};
use production_forecast::{ArimaModel, Forecaster, TimeSeries};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Production Forecast: Basic ARIMA(1,1,1) Example");
    println!("===============================================\n");

    let series = create_sample_series(120)?;
    println!(
        "Sample data created: {} monthly points up to {}\n",
        series.len(),
        series.last_timestamp().date()
    );

    // Fit the model directly to inspect the estimates
    let model = ArimaModel::arima_111();
    let fitted = model.train(&series)?;
    println!("{}", fitted);

    let path = fitted.forecast(6)?;
    println!("Next 6 months: {:?}\n", path.values());

    // The facade answers date queries with the same fit
    let forecaster = Forecaster::new(series, model)?;
    for date in ["2018-02-01", "2018-06-15", "2019-01-01", "2017-12-01"] {
        match forecaster.predict(date) {
            Ok(value) => println!("{}: {}", date, value),
            Err(err) => println!("{}: {}", date, err),
        }
    }

    Ok(())
}

/// Trending monthly series with ARMA noise, ending 2018-01-01
fn create_sample_series(n: usize) -> Result<TimeSeries, Box<dyn std::error::Error>> {
    let mut rng = StdRng::seed_from_u64(2018);
    let noise = Normal::new(0.0, 1.5)?;
    let end = NaiveDate::from_ymd_opt(2018, 1, 1).ok_or("invalid end date")?;

    let mut timestamps = Vec::with_capacity(n);
    let mut values = Vec::with_capacity(n);
    let mut level = 80.0;
    let mut prev_diff = 0.0;
    for i in 0..n {
        let months_back = (n - 1 - i) as u32;
        let date = end
            .checked_sub_months(Months::new(months_back))
            .ok_or("date out of range")?;
        let diff = 0.6 * prev_diff + noise.sample(&mut rng) + 0.1;
        prev_diff = diff;
        level += diff;

        timestamps.push(date.and_hms_opt(0, 0, 0).ok_or("invalid time")?);
        values.push(level);
    }

    Ok(TimeSeries::new("IPG2211A2N", timestamps, values)?)
}
