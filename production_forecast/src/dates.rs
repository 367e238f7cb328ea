//! Calendar date parsing and month periods

use crate::error::{ForecastError, Result};
use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;

const DATE_TIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

/// Parse a calendar date or date-time.
///
/// Accepted forms: `2018-01-15`, `2018/01/15`, `1/15/2018`, `2018-01-15 08:30:00`,
/// `2018-01-15T08:30:00`, `2018-01-15 08:30` and `2018-01` (first day of the month).
/// Dates without a time component resolve to midnight.
pub fn parse_date(input: &str) -> Result<NaiveDateTime> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ForecastError::ValidationError(
            "Empty date string".to_string(),
        ));
    }

    for format in DATE_TIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(dt);
        }
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Ok(date.and_time(NaiveTime::MIN));
        }
    }

    // year-month only
    if let Ok(date) = NaiveDate::parse_from_str(&format!("{}-01", trimmed), "%Y-%m-%d") {
        return Ok(date.and_time(NaiveTime::MIN));
    }

    Err(ForecastError::ValidationError(format!(
        "Could not parse '{}' as a date (expected YYYY-MM-DD)",
        trimmed
    )))
}

/// A calendar date truncated to year and month
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MonthPeriod {
    year: i32,
    month: u32,
}

impl MonthPeriod {
    /// Create a period, validating the month
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(ForecastError::InvalidParameter(format!(
                "Month must be between 1 and 12, got {}",
                month
            )));
        }
        Ok(Self { year, month })
    }

    /// Period containing the given date
    pub fn of<D: Datelike>(date: &D) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Year of the period
    pub fn year(&self) -> i32 {
        self.year
    }

    /// Month of the period (1-12)
    pub fn month(&self) -> u32 {
        self.month
    }

    /// Months elapsed since year zero
    pub fn ordinal(&self) -> i64 {
        self.year as i64 * 12 + self.month as i64
    }

    /// Number of month boundaries from `self` to `other` (negative if `other` is earlier)
    pub fn months_until(&self, other: &MonthPeriod) -> i64 {
        other.ordinal() - self.ordinal()
    }

    /// The following month
    pub fn succ(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }
}

impl fmt::Display for MonthPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[rstest]
    #[case("2018-02-01", ymd(2018, 2, 1))]
    #[case("  2018-02-01 ", ymd(2018, 2, 1))]
    #[case("2018/02/01", ymd(2018, 2, 1))]
    #[case("2/1/2018", ymd(2018, 2, 1))]
    #[case("2018-02", ymd(2018, 2, 1))]
    fn test_parse_date_forms(#[case] input: &str, #[case] expected: NaiveDateTime) {
        assert_eq!(parse_date(input).unwrap(), expected);
    }

    #[test]
    fn test_parse_date_time() {
        let dt = parse_date("2018-01-01 12:30:00").unwrap();
        assert_eq!(dt, ymd(2018, 1, 1).date().and_hms_opt(12, 30, 0).unwrap());
        assert_eq!(parse_date("2018-01-01T12:30:00").unwrap(), dt);
    }

    #[rstest]
    #[case("")]
    #[case("tomorrow")]
    #[case("2018-13-01")]
    #[case("2018-02-30")]
    #[case("exit")]
    fn test_parse_date_rejects(#[case] input: &str) {
        assert!(matches!(
            parse_date(input),
            Err(ForecastError::ValidationError(_))
        ));
    }

    #[test]
    fn test_month_period_arithmetic() {
        let jan = MonthPeriod::of(&ymd(2018, 1, 31));
        let next_year = MonthPeriod::new(2019, 3).unwrap();
        assert_eq!(jan.months_until(&next_year), 14);
        assert_eq!(next_year.months_until(&jan), -14);
        assert_eq!(MonthPeriod::new(2017, 12).unwrap().succ(), MonthPeriod::new(2018, 1).unwrap());
        assert_eq!(jan.to_string(), "2018-01");
        assert!(MonthPeriod::new(2018, 0).is_err());
    }
}
