//! Conversion of a target date into a forecast horizon in months

use crate::dates::MonthPeriod;
use crate::error::{ForecastError, Result};
use chrono::NaiveDateTime;

/// Number of monthly periods between the last observation and `target`.
///
/// The target must be strictly later than `last_known` (exact date-time
/// comparison). The horizon itself only looks at the month periods, so a
/// target later in the same month as the last observation gives `0`.
pub fn horizon(last_known: NaiveDateTime, target: NaiveDateTime) -> Result<i64> {
    if target <= last_known {
        return Err(ForecastError::not_after(last_known));
    }
    Ok(MonthPeriod::of(&last_known).months_until(&MonthPeriod::of(&target)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rstest::rstest;

    fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[rstest]
    #[case(at(2018, 2, 1), 1)]
    #[case(at(2018, 2, 28), 1)]
    #[case(at(2018, 12, 1), 11)]
    #[case(at(2019, 1, 1), 12)]
    #[case(at(2020, 3, 17), 26)]
    #[case(at(2018, 1, 15), 0)]
    fn test_month_granular_horizon(#[case] target: NaiveDateTime, #[case] expected: i64) {
        assert_eq!(horizon(at(2018, 1, 1), target).unwrap(), expected);
    }

    #[rstest]
    #[case(at(2018, 1, 1))]
    #[case(at(2017, 12, 31))]
    #[case(at(1985, 1, 1))]
    fn test_rejects_dates_not_after_last_known(#[case] target: NaiveDateTime) {
        let err = horizon(at(2018, 1, 1), target).unwrap_err();
        assert_eq!(err.last_known(), Some(at(2018, 1, 1)));
        assert!(err.to_string().contains("2018-01-01"));
    }

    #[test]
    fn test_later_time_on_same_day_passes_the_check() {
        let later = at(2018, 1, 1).date().and_hms_opt(0, 0, 1).unwrap();
        assert_eq!(horizon(at(2018, 1, 1), later).unwrap(), 0);
    }

    #[test]
    fn test_monotonic_in_month_period() {
        let last = at(2018, 1, 1);
        let targets: Vec<NaiveDateTime> = (0..36)
            .map(|k| at(2018 + (k / 12) as i32, (k % 12) as u32 + 1, 10))
            .collect();
        let horizons: Vec<i64> = targets.iter().map(|t| horizon(last, *t).unwrap()).collect();
        assert!(horizons.windows(2).all(|w| w[0] < w[1]));
    }
}
