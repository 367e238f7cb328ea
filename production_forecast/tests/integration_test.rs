mod common;

use common::{monthly_dates, simulate_arima111};
use production_forecast::{
    ArimaConfig, ArimaModel, CsvLoader, ForecastError, Forecaster, ForecastModel,
    TrainedForecastModel,
};
use std::io::Write;
use tempfile::NamedTempFile;

/// Write a simulated monthly series in the `M/D/YYYY` layout of the source data
fn write_series(n: usize, seed: u64) -> NamedTempFile {
    let values = simulate_arima111(n, 0.5, 0.3, 0.1, seed);
    let dates = monthly_dates(2018, 1, n);

    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "DATE,IPG2211A2N").unwrap();
    // newest first to exercise sorting
    for (date, value) in dates.iter().zip(&values).rev() {
        writeln!(file, "{},{:.4}", date.format("%-m/%-d/%Y"), value).unwrap();
    }
    file
}

#[test]
fn test_csv_to_prediction() {
    let file = write_series(240, 99);
    let series = CsvLoader::new()
        .date_column("DATE")
        .value_column("IPG2211A2N")
        .load(file.path())
        .unwrap();

    assert_eq!(series.len(), 240);
    assert_eq!(series.last_timestamp().date().to_string(), "2018-01-01");

    let forecaster = Forecaster::new(series, ArimaModel::arima_111()).unwrap();
    let value = forecaster.predict("2018-02-01").unwrap();
    assert!(value.is_finite());

    // one step ahead should stay within a few innovation standard deviations
    let last = forecaster.series().last_value();
    assert!((value - last).abs() < 10.0, "{} vs {}", value, last);

    assert!(matches!(
        forecaster.predict("2018-01-01"),
        Err(ForecastError::RangeError { .. })
    ));
}

#[test]
fn test_drift_configuration_end_to_end() {
    let file = write_series(240, 5);
    let series = CsvLoader::new().load(file.path()).unwrap();

    let config = ArimaConfig {
        include_drift: true,
        ..Default::default()
    };
    let model = ArimaModel::new(config).unwrap();
    let fitted = model.train(&series).unwrap();
    let forecaster = Forecaster::new(series, model).unwrap();

    let expected = fitted.forecast(24).unwrap().last().unwrap();
    let value = forecaster.predict("2020-01-01").unwrap();
    assert!((value - expected).abs() < 1e-4);
    assert!(forecaster.model().unwrap().drift().is_some());
}
