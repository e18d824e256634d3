//! Gregorian date helpers built on chrono.

use chrono::{NaiveDate, TimeDelta};

use crate::error::CalendarError;

/// Reference date for integer time coordinates (`1970-01-01`).
pub fn epoch() -> NaiveDate {
    // chrono's default NaiveDate is the Unix epoch.
    NaiveDate::default()
}

/// Adds a signed number of days to `date`.
///
/// # Errors
///
/// Returns [`CalendarError::Overflow`] if the result is not representable.
pub fn add_days(date: NaiveDate, days: i64) -> Result<NaiveDate, CalendarError> {
    TimeDelta::try_days(days)
        .and_then(|delta| date.checked_add_signed(delta))
        .ok_or(CalendarError::Overflow { date, days })
}

/// Whole days from [`epoch`] to `date` (negative before 1970).
pub fn days_since_epoch(date: NaiveDate) -> i64 {
    date.signed_duration_since(epoch()).num_days()
}

/// Inverse of [`days_since_epoch`].
///
/// # Errors
///
/// Returns [`CalendarError::Overflow`] if the offset is out of range.
pub fn from_epoch_days(days: i64) -> Result<NaiveDate, CalendarError> {
    add_days(epoch(), days)
}

/// Number of calendar days in `[start, end]`, both ends included.
///
/// # Errors
///
/// Returns [`CalendarError::InvertedRange`] if `end < start`.
pub fn inclusive_day_count(start: NaiveDate, end: NaiveDate) -> Result<usize, CalendarError> {
    if end < start {
        return Err(CalendarError::InvertedRange { start, end });
    }
    Ok(end.signed_duration_since(start).num_days() as usize + 1)
}

/// Parses `value` with a chrono `format` string such as `"%Y-%m-%d"`.
///
/// Leading and trailing whitespace in `value` is ignored.
///
/// # Errors
///
/// Returns [`CalendarError::Parse`] if the value does not match.
pub fn parse_date(value: &str, format: &str) -> Result<NaiveDate, CalendarError> {
    NaiveDate::parse_from_str(value.trim(), format).map_err(|_| CalendarError::Parse {
        value: value.to_string(),
        format: format.to_string(),
    })
}
