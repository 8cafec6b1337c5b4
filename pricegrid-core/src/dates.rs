//! Start-date resolution.
//!
//! A load starts either at an absolute calendar date or a number of business
//! days before the configured end date. Business days skip weekends only;
//! exchange holidays are not modeled.

use crate::error::LoaderError;
use chrono::{Datelike, Days, Duration, NaiveDate, NaiveDateTime, Weekday};
use std::fmt;
use std::str::FromStr;

const ACCEPTED_FORMS: &str =
    "expected a date (YYYY-MM-DD, optionally with a time) or a non-negative integer lookback count";

/// Where a load starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartSpec {
    /// Used verbatim.
    AbsoluteDate(NaiveDate),
    /// Business days before the end date.
    LookbackCount(u32),
}

impl From<NaiveDate> for StartSpec {
    fn from(date: NaiveDate) -> Self {
        StartSpec::AbsoluteDate(date)
    }
}

impl From<NaiveDateTime> for StartSpec {
    fn from(ts: NaiveDateTime) -> Self {
        StartSpec::AbsoluteDate(ts.date())
    }
}

impl From<u32> for StartSpec {
    fn from(count: u32) -> Self {
        StartSpec::LookbackCount(count)
    }
}

impl FromStr for StartSpec {
    type Err = LoaderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) {
            return s
                .parse::<u32>()
                .map(StartSpec::LookbackCount)
                .map_err(|e| LoaderError::InvalidArgument(format!("lookback '{s}': {e}")));
        }
        if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            return Ok(StartSpec::AbsoluteDate(date));
        }
        for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
            if let Ok(ts) = NaiveDateTime::parse_from_str(s, fmt) {
                return Ok(StartSpec::AbsoluteDate(ts.date()));
            }
        }
        Err(LoaderError::InvalidArgument(format!(
            "unrecognized start '{s}': {ACCEPTED_FORMS}"
        )))
    }
}

impl fmt::Display for StartSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StartSpec::AbsoluteDate(d) => write!(f, "{d}"),
            StartSpec::LookbackCount(n) => write!(f, "{n} business days"),
        }
    }
}

/// Resolve a start specification against a fixed end date.
///
/// Fails with [`LoaderError::InvalidArgument`] when a lookback reaches past the
/// earliest representable date.
pub fn resolve(spec: StartSpec, end: NaiveDate) -> Result<NaiveDate, LoaderError> {
    match spec {
        StartSpec::AbsoluteDate(date) => Ok(date),
        StartSpec::LookbackCount(n) => sub_business_days(end, n).ok_or_else(|| {
            LoaderError::InvalidArgument(format!(
                "lookback of {n} business days from {end} is out of the supported date range"
            ))
        }),
    }
}

pub fn is_business_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Step back `n` weekdays from `from`. A weekend `from` counts its first step
/// to the preceding Friday. `None` if the result would underflow `NaiveDate`.
pub fn sub_business_days(from: NaiveDate, n: u32) -> Option<NaiveDate> {
    if n == 0 {
        return Some(from);
    }
    // Walk the first 1..=5 weekdays, then jump whole weeks: from a weekday,
    // five weekdays back is always seven calendar days back.
    let weeks = u64::from((n - 1) / 5);
    let mut remaining = (n - 1) % 5 + 1;
    let mut date = from;
    while remaining > 0 {
        date = date.pred_opt()?;
        if is_business_day(date) {
            remaining -= 1;
        }
    }
    date.checked_sub_days(Days::new(weeks.checked_mul(7)?))
}

/// Number of weekdays in `[earlier, later)`.
pub fn business_days_between(earlier: NaiveDate, later: NaiveDate) -> u32 {
    let mut count = 0;
    let mut date = earlier;
    while date < later {
        if is_business_day(date) {
            count += 1;
        }
        date += Duration::days(1);
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    // Saturday
    fn end() -> NaiveDate {
        d(2024, 11, 16)
    }

    #[test]
    fn absolute_date_is_verbatim() {
        let spec: StartSpec = "2020-01-01".parse().unwrap();
        assert_eq!(resolve(spec, end()).unwrap(), d(2020, 1, 1));

        // Weekend dates are not adjusted.
        let sunday: StartSpec = "2024-11-10".parse().unwrap();
        assert_eq!(resolve(sunday, end()).unwrap(), d(2024, 11, 10));
    }

    #[test]
    fn timestamp_strings_truncate_to_date() {
        let spec: StartSpec = "2021-06-15T09:30:00".parse().unwrap();
        assert_eq!(spec, StartSpec::AbsoluteDate(d(2021, 6, 15)));
        let spec: StartSpec = "2021-06-15 16:00:00".parse().unwrap();
        assert_eq!(spec, StartSpec::AbsoluteDate(d(2021, 6, 15)));
    }

    #[test]
    fn integer_strings_are_lookbacks() {
        assert_eq!("1298".parse::<StartSpec>().unwrap(), StartSpec::LookbackCount(1298));
        assert_eq!(" 0 ".parse::<StartSpec>().unwrap(), StartSpec::LookbackCount(0));
    }

    #[test]
    fn rejects_other_inputs() {
        for bad in ["3.5", "-4", "", "yesterday", "2024-13-01", "99999999999"] {
            match bad.parse::<StartSpec>() {
                Err(LoaderError::InvalidArgument(msg)) => assert!(!msg.is_empty()),
                other => panic!("expected InvalidArgument for {bad:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn lookback_past_earliest_date_is_invalid_argument() {
        let spec: StartSpec = "99999999".parse().unwrap();
        assert_eq!(spec, StartSpec::LookbackCount(99_999_999));
        match resolve(spec, end()) {
            Err(LoaderError::InvalidArgument(msg)) => assert!(msg.contains("99999999")),
            other => panic!("expected InvalidArgument, got {other:?}"),
        }
        assert!(resolve(StartSpec::LookbackCount(u32::MAX), end()).is_err());
        assert_eq!(sub_business_days(NaiveDate::MIN, 1), None);
    }

    #[test]
    fn large_lookback_matches_calendar_weeks() {
        // 2600 weekdays back from a Friday is exactly 520 weeks.
        let friday = d(2024, 11, 15);
        assert_eq!(
            sub_business_days(friday, 2600).unwrap(),
            friday - Duration::weeks(520)
        );
    }

    #[test]
    fn zero_lookback_is_end_date() {
        assert_eq!(resolve(StartSpec::LookbackCount(0), end()).unwrap(), end());
    }

    #[test]
    fn lookback_from_saturday() {
        // Sat 2024-11-16 -> Fri 15, Thu 14, ..., Mon 11, Fri 8
        assert_eq!(resolve(1.into(), end()).unwrap(), d(2024, 11, 15));
        assert_eq!(resolve(5.into(), end()).unwrap(), d(2024, 11, 11));
        assert_eq!(resolve(6.into(), end()).unwrap(), d(2024, 11, 8));
    }

    #[test]
    fn lookback_from_monday_skips_weekend() {
        assert_eq!(sub_business_days(d(2024, 11, 18), 1).unwrap(), d(2024, 11, 15));
        assert_eq!(sub_business_days(d(2024, 11, 18), 10).unwrap(), d(2024, 11, 4));
    }

    proptest! {
        #[test]
        fn lookback_counts_exactly_n_weekdays(
            n in 0u32..3000,
            offset in 0i64..3650,
        ) {
            let end = d(2015, 1, 1) + Duration::days(offset);
            let start = sub_business_days(end, n).unwrap();
            prop_assert!(start <= end);
            prop_assert_eq!(business_days_between(start, end), n);
            if n > 0 {
                prop_assert!(is_business_day(start));
            }
        }
    }
}
