use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use production_forecast::data::{CsvLoader, TimeSeries};
use production_forecast::ForecastError;
use std::io::Write;
use tempfile::NamedTempFile;

fn csv_file(lines: &[&str]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    for line in lines {
        writeln!(file, "{}", line).unwrap();
    }
    file
}

#[test]
fn test_data_loader_from_csv() {
    let file = csv_file(&[
        "DATE,IPG2211A2N",
        "1/1/1985,72.5052",
        "2/1/1985,70.6720",
        "3/1/1985,62.4502",
    ]);

    let data = CsvLoader::new().load(file.path()).unwrap();

    assert_eq!(data.len(), 3);
    assert_eq!(data.name(), "IPG2211A2N");
    assert_eq!(data.values(), &[72.5052, 70.6720, 62.4502]);
    assert_eq!(
        data.last_timestamp().date(),
        NaiveDate::from_ymd_opt(1985, 3, 1).unwrap()
    );
}

#[test]
fn test_explicit_columns() {
    let file = csv_file(&[
        "id,observed_at,production,notes",
        "1,2017-11-01,101.5,a",
        "2,2017-12-01,114.2,b",
    ]);

    let data = CsvLoader::new()
        .date_column("observed_at")
        .value_column("Production")
        .load(file.path())
        .unwrap();

    assert_eq!(data.name(), "production");
    assert_eq!(data.values(), &[101.5, 114.2]);
}

#[test]
fn test_unsorted_rows_are_sorted() {
    let file = csv_file(&[
        "date,value",
        "2018-03-01, 3.0",
        "2018-01-01, 1.0",
        "2018-02-01, 2.0",
    ]);

    let data = CsvLoader::new().load(file.path()).unwrap();
    assert_eq!(data.values(), &[1.0, 2.0, 3.0]);

    let pairs: Vec<(String, f64)> = data
        .iter()
        .map(|(ts, v)| (ts.date().to_string(), v))
        .collect();
    assert_eq!(pairs[0], ("2018-01-01".to_string(), 1.0));
}

#[test]
fn test_time_series_statistics() {
    let dates = vec!["2023-01-01", "2023-02-01", "2023-03-01"]
        .into_iter()
        .map(|s| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
        })
        .collect();

    let data = TimeSeries::new("close", dates, vec![100.0, 103.0, 106.0]).unwrap();

    assert_eq!(data.len(), 3);
    assert!(!data.is_empty());
    assert_eq!(data.last_value(), 106.0);

    let mean = data.mean();
    assert!(mean > 102.0 && mean < 104.0);

    let std_dev = data.std_dev();
    assert!(std_dev > 2.0 && std_dev < 4.0);
}

#[test]
fn test_missing_file() {
    let result = CsvLoader::new().load("nonexistent_file.csv");
    assert!(matches!(result, Err(ForecastError::IoError(_))));
}

#[test]
fn test_invalid_rows() {
    let bad_date = csv_file(&["date,value", "2018-01-01,1.0", "someday,2.0"]);
    let err = CsvLoader::new().load(bad_date.path()).unwrap_err();
    assert!(err.to_string().contains("Line 3"), "{}", err);

    let bad_value = csv_file(&["date,value", "2018-01-01,n/a"]);
    assert!(matches!(
        CsvLoader::new().load(bad_value.path()),
        Err(ForecastError::DataError(_))
    ));

    let duplicate = csv_file(&["date,value", "2018-01-01,1.0", "2018-01-01,2.0"]);
    assert!(CsvLoader::new().load(duplicate.path()).is_err());
}

#[test]
fn test_header_problems() {
    let no_date = csv_file(&["invalid,csv,format", "1,2,3"]);
    assert!(CsvLoader::new().load(no_date.path()).is_err());

    let only_header = csv_file(&["date,value"]);
    assert!(matches!(
        CsvLoader::new().load(only_header.path()),
        Err(ForecastError::DataError(_))
    ));

    let unknown = csv_file(&["date,value", "2018-01-01,1.0"]);
    assert!(CsvLoader::new()
        .value_column("missing")
        .load(unknown.path())
        .is_err());
    assert!(CsvLoader::new()
        .value_column("date")
        .load(unknown.path())
        .is_err());
}

#[test]
fn test_from_reader() {
    let input = "DATE,IPG2211A2N\n2017-12-01,114.8505\n2018-01-01,129.4048\n";
    let data = CsvLoader::new().from_reader(input.as_bytes()).unwrap();
    assert_eq!(data.len(), 2);
    assert_eq!(data.last_value(), 129.4048);
}
