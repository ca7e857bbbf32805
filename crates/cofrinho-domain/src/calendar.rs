//! Calendar month arithmetic with end-of-month clamping.

use chrono::{Datelike, Duration, NaiveDate};

/// Advances `date` by `months` calendar months, keeping the day-of-month when the target
/// month has it and clamping to the target month's last day otherwise.
///
/// Negative values move backwards. Returns `None` only when the result falls outside the
/// range `NaiveDate` can represent.
pub fn add_months_clamped(date: NaiveDate, months: i32) -> Option<NaiveDate> {
    let month_index = date.year() * 12 + date.month0() as i32 + months;
    let year = month_index.div_euclid(12);
    let month = month_index.rem_euclid(12) as u32 + 1;
    let day = date.day().min(days_in_month(year, month)?);
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Number of days in `month` of `year`, accounting for leap years.
pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    let first_next = NaiveDate::from_ymd_opt(next_year, next_month, 1)?;
    let last_current = first_next - Duration::days(1);
    Some(last_current.day())
}

/// Returns the date in `year`/`month` whose day is `day`, clamped to the month's length.
pub fn clamped_day(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    let day = day.max(1).min(days_in_month(year, month)?);
    NaiveDate::from_ymd_opt(year, month, day)
}
