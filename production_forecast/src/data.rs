//! Time series data handling for forecasting

use crate::dates::{parse_date, MonthPeriod};
use crate::error::{ForecastError, Result};
use chrono::NaiveDateTime;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

/// Monthly time series: one value per calendar month, ascending and immutable
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    /// Name of the value column
    name: String,
    /// Observation timestamps, strictly ascending
    timestamps: Vec<NaiveDateTime>,
    /// Observed values
    values: Vec<f64>,
}

impl TimeSeries {
    /// Create a series from timestamps that are already in ascending order
    pub fn new(
        name: impl Into<String>,
        timestamps: Vec<NaiveDateTime>,
        values: Vec<f64>,
    ) -> Result<Self> {
        if timestamps.len() != values.len() {
            return Err(ForecastError::DataError(format!(
                "Timestamps length ({}) doesn't match values length ({})",
                timestamps.len(),
                values.len()
            )));
        }
        if timestamps.is_empty() {
            return Err(ForecastError::DataError(
                "Empty time series data".to_string(),
            ));
        }
        if let Some(idx) = values.iter().position(|v| !v.is_finite()) {
            return Err(ForecastError::DataError(format!(
                "Non-finite value {} at {}",
                values[idx], timestamps[idx]
            )));
        }

        for pair in timestamps.windows(2) {
            if pair[1] <= pair[0] {
                return Err(ForecastError::DataError(format!(
                    "Timestamps must be strictly ascending: {} is followed by {}",
                    pair[0], pair[1]
                )));
            }
            let (prev, next) = (MonthPeriod::of(&pair[0]), MonthPeriod::of(&pair[1]));
            match prev.months_until(&next) {
                0 => {
                    return Err(ForecastError::DataError(format!(
                        "More than one observation in month {}",
                        prev
                    )))
                }
                1 => {}
                gap => warn!(from = %prev, to = %next, missing = gap - 1, "gap in monthly series"),
            }
        }

        Ok(Self {
            name: name.into(),
            timestamps,
            values,
        })
    }

    /// Create a series from pairs in any order, rejecting duplicate timestamps
    pub fn from_unsorted(
        name: impl Into<String>,
        mut observations: Vec<(NaiveDateTime, f64)>,
    ) -> Result<Self> {
        observations.sort_by_key(|(ts, _)| *ts);
        if let Some(pair) = observations.windows(2).find(|w| w[0].0 == w[1].0) {
            return Err(ForecastError::DataError(format!(
                "Duplicate timestamp {}",
                pair[0].0
            )));
        }
        let (timestamps, values) = observations.into_iter().unzip();
        Self::new(name, timestamps, values)
    }

    /// Name of the observed quantity
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Observed values in time order
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Observation timestamps in ascending order
    pub fn timestamps(&self) -> &[NaiveDateTime] {
        &self.timestamps
    }

    /// Get the length of the time series
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the time series is empty
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Earliest timestamp
    pub fn first_timestamp(&self) -> NaiveDateTime {
        self.timestamps[0]
    }

    /// Latest timestamp, the "last known date"
    pub fn last_timestamp(&self) -> NaiveDateTime {
        self.timestamps[self.timestamps.len() - 1]
    }

    /// Value at the latest timestamp
    pub fn last_value(&self) -> f64 {
        self.values[self.values.len() - 1]
    }

    /// Iterate over `(timestamp, value)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (NaiveDateTime, f64)> + '_ {
        self.timestamps.iter().copied().zip(self.values.iter().copied())
    }

    /// Calculate the mean of the values
    pub fn mean(&self) -> f64 {
        self.values.iter().sum::<f64>() / self.len() as f64
    }

    /// Calculate the population standard deviation of the values
    pub fn std_dev(&self) -> f64 {
        let mean = self.mean();
        let variance = self
            .values
            .iter()
            .map(|v| (v - mean).powi(2))
            .sum::<f64>()
            / self.len() as f64;
        variance.sqrt()
    }
}

/// CSV loader producing a [`TimeSeries`] from a date column and a value column
#[derive(Debug, Clone, Default)]
pub struct CsvLoader {
    date_column: Option<String>,
    value_column: Option<String>,
}

impl CsvLoader {
    /// Loader that detects both columns from the header
    pub fn new() -> Self {
        Self::default()
    }

    /// Use an explicit date column
    pub fn date_column(mut self, name: impl Into<String>) -> Self {
        self.date_column = Some(name.into());
        self
    }

    /// Use an explicit value column
    pub fn value_column(mut self, name: impl Into<String>) -> Self {
        self.value_column = Some(name.into());
        self
    }

    /// Load time series data from a CSV file
    pub fn load<P: AsRef<Path>>(&self, path: P) -> Result<TimeSeries> {
        let path = path.as_ref();
        debug!(path = %path.display(), "opening series");
        let file = File::open(path)?;
        self.from_reader(file)
    }

    /// Load time series data from any CSV source
    pub fn from_reader<R: Read>(&self, reader: R) -> Result<TimeSeries> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        let column_names: Vec<&str> = headers.iter().collect();
        let date_idx = self.detect_date_column(&column_names)?;
        let value_idx = self.detect_value_column(&column_names, date_idx)?;
        let value_name = column_names[value_idx].to_string();

        let mut observations = Vec::new();
        for (row, record) in csv_reader.records().enumerate() {
            let record = record?;
            // header is line 1
            let line = row + 2;
            let raw_date = record.get(date_idx).ok_or_else(|| {
                ForecastError::DataError(format!("Line {}: missing date field", line))
            })?;
            let raw_value = record.get(value_idx).ok_or_else(|| {
                ForecastError::DataError(format!("Line {}: missing value field", line))
            })?;

            let timestamp = parse_date(raw_date).map_err(|_| {
                ForecastError::DataError(format!("Line {}: invalid date '{}'", line, raw_date))
            })?;
            let value: f64 = raw_value.parse().map_err(|_| {
                ForecastError::DataError(format!("Line {}: invalid value '{}'", line, raw_value))
            })?;
            observations.push((timestamp, value));
        }

        if observations.is_empty() {
            return Err(ForecastError::DataError(
                "No rows found in CSV input".to_string(),
            ));
        }

        let series = TimeSeries::from_unsorted(value_name, observations)?;
        info!(
            rows = series.len(),
            column = series.name(),
            first = %series.first_timestamp().date(),
            last = %series.last_timestamp().date(),
            "loaded series"
        );
        Ok(series)
    }

    /// Detect the date column in the header
    fn detect_date_column(&self, column_names: &[&str]) -> Result<usize> {
        if let Some(name) = &self.date_column {
            return find_column(column_names, name);
        }

        column_names
            .iter()
            .position(|name| {
                let lower = name.to_lowercase();
                lower.contains("date") || lower.contains("time")
            })
            .ok_or_else(|| ForecastError::DataError("No date column found in data".to_string()))
    }

    /// Detect the value column: explicit name, otherwise the first non-date column
    fn detect_value_column(&self, column_names: &[&str], date_idx: usize) -> Result<usize> {
        let idx = match &self.value_column {
            Some(name) => find_column(column_names, name)?,
            None => (0..column_names.len())
                .find(|&i| i != date_idx)
                .ok_or_else(|| {
                    ForecastError::DataError("No value column found in data".to_string())
                })?,
        };
        if idx == date_idx {
            return Err(ForecastError::DataError(format!(
                "Column '{}' cannot be both the date and the value column",
                column_names[idx]
            )));
        }
        Ok(idx)
    }
}

fn find_column(column_names: &[&str], name: &str) -> Result<usize> {
    column_names
        .iter()
        .position(|c| c.eq_ignore_ascii_case(name))
        .ok_or_else(|| ForecastError::DataError(format!("Column '{}' not found", name)))
}
