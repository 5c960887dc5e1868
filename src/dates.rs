//! Calendar arithmetic for payment scheduling
//!
//! All dates are naive calendar dates; no time zone conversion happens anywhere.

use chrono::{Datelike, NaiveDate};

use crate::error::{EngineError, EngineResult};

/// Display format used by schedules and year-end lookups
pub const DISPLAY_FORMAT: &str = "%m/%d/%Y";

/// Number of days in the given month (1-12)
pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if NaiveDate::from_ymd_opt(year, 2, 29).is_some() => 29,
        2 => 28,
        _ => 0,
    }
}

/// Whether the date is the last day of its month
pub fn is_end_of_month(date: NaiveDate) -> bool {
    date.day() == days_in_month(date.year(), date.month())
}

/// Add calendar months, anchoring end-of-month dates
///
/// The result is clamped to the last day of the target month when the
/// original day does not exist there, or when the original date was itself
/// the last day of its month. Jan 31 + 1 month is Feb 28 (or 29), and
/// Feb 28 + 1 month is Mar 31.
pub fn add_months(date: NaiveDate, months: i32) -> EngineResult<NaiveDate> {
    let total = date.year() * 12 + date.month0() as i32 + months;
    let year = total.div_euclid(12);
    let month = total.rem_euclid(12) as u32 + 1;

    let last_day = days_in_month(year, month);
    let day = if date.day() > last_day || is_end_of_month(date) {
        last_day
    } else {
        date.day()
    };

    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| EngineError::invalid_date(format!("{date} + {months} months")))
}

/// Signed whole days from `b` to `a` (positive when `a` is later)
pub fn diff_days(a: NaiveDate, b: NaiveDate) -> i64 {
    (a - b).num_days()
}

/// Whole calendar months from `from` to `to`
///
/// A partial trailing month is not counted, except that landing on the last
/// day of a month counts as a full month.
pub fn months_between(to: NaiveDate, from: NaiveDate) -> i32 {
    let mut count = (to.year() - from.year()) * 12 + to.month() as i32 - from.month() as i32;
    if count != 0 && to.day() < from.day() && !is_end_of_month(to) {
        count -= 1;
    }
    count
}

/// Parse a calendar date
///
/// Accepts ISO `YYYY-MM-DD`, the display form `MM/DD/YYYY`, and ISO
/// date-times such as `2023-01-01T00:00:00Z` (time part ignored).
pub fn parse_date(text: &str) -> EngineResult<NaiveDate> {
    let trimmed = text.trim();

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(date);
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, DISPLAY_FORMAT) {
        return Ok(date);
    }
    if let Some((day_part, _time)) = trimmed.split_once('T') {
        if let Ok(date) = NaiveDate::parse_from_str(day_part, "%Y-%m-%d") {
            return Ok(date);
        }
    }

    Err(EngineError::invalid_date(trimmed))
}

/// Format a date the way schedule rows display it
pub fn format_date(date: NaiveDate) -> String {
    date.format(DISPLAY_FORMAT).to_string()
}

/// December 31 of the given year
pub fn year_end(year: i32) -> EngineResult<NaiveDate> {
    NaiveDate::from_ymd_opt(year, 12, 31)
        .ok_or_else(|| EngineError::invalid_date(format!("12/31/{year}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_add_months_end_of_month_anchoring() {
        assert_eq!(add_months(d(2023, 1, 31), 1).unwrap(), d(2023, 2, 28));
        assert_eq!(add_months(d(2024, 1, 31), 1).unwrap(), d(2024, 2, 29));
        assert_eq!(add_months(d(2023, 3, 31), -1).unwrap(), d(2023, 2, 28));
    }

    #[test]
    fn test_add_months_keeps_anchor_from_month_end() {
        // Feb 28 is the last day of its month, so the anchor follows month ends
        assert_eq!(add_months(d(2023, 2, 28), 1).unwrap(), d(2023, 3, 31));
        assert_eq!(add_months(d(2023, 4, 30), 2).unwrap(), d(2023, 6, 30));
        assert_eq!(add_months(d(2023, 1, 15), 13).unwrap(), d(2024, 2, 15));
        assert_eq!(add_months(d(2023, 1, 15), -13).unwrap(), d(2021, 12, 15));
    }

    #[test]
    fn test_days_in_month() {
        assert_eq!(days_in_month(2023, 2), 28);
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(1900, 2), 28);
        assert_eq!(days_in_month(2000, 2), 29);
        assert_eq!(days_in_month(2023, 4), 30);
        assert_eq!(days_in_month(2023, 12), 31);
    }

    #[test]
    fn test_diff_days_is_signed() {
        assert_eq!(diff_days(d(2024, 1, 1), d(2023, 1, 1)), 365);
        assert_eq!(diff_days(d(2023, 1, 1), d(2024, 1, 1)), -365);
        assert_eq!(diff_days(d(2023, 1, 1), d(2023, 1, 1)), 0);
    }

    #[test]
    fn test_months_between() {
        assert_eq!(months_between(d(2024, 1, 1), d(2023, 1, 1)), 12);
        assert_eq!(months_between(d(2023, 3, 14), d(2023, 1, 15)), 1);
        // Landing on a month end counts the month
        assert_eq!(months_between(d(2023, 2, 28), d(2023, 1, 31)), 1);
        assert_eq!(months_between(d(2023, 1, 20), d(2023, 1, 5)), 0);
    }

    #[test]
    fn test_parse_date_formats() {
        assert_eq!(parse_date("2023-01-31").unwrap(), d(2023, 1, 31));
        assert_eq!(parse_date("01/31/2023").unwrap(), d(2023, 1, 31));
        assert_eq!(parse_date("2023-01-31T00:00:00Z").unwrap(), d(2023, 1, 31));
        assert!(matches!(parse_date("31.01.2023"), Err(EngineError::InvalidDate { .. })));
    }

    #[test]
    fn test_format_date_trailing_year() {
        let text = format_date(d(2023, 7, 4));
        assert_eq!(text, "07/04/2023");
        assert!(text.ends_with("2023"));
    }
}
