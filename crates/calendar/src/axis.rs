//! Contiguous daily time axis.

use chrono::NaiveDate;

use crate::date::{add_days, days_since_epoch, inclusive_day_count};
use crate::error::CalendarError;
use crate::sequence::{check_contiguous, daily_sequence};

/// A gap-free run of consecutive days.
///
/// The axis is stored as an anchor date plus a length, so contiguity holds
/// by construction. An empty axis keeps its anchor but has no dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeAxis {
    start: NaiveDate,
    len: usize,
}

impl TimeAxis {
    /// Creates the axis covering `[start, end]` inclusive.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::InvertedRange`] if `end < start`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, CalendarError> {
        let len = inclusive_day_count(start, end)?;
        Ok(Self { start, len })
    }

    /// Creates an axis of `len` days beginning at `start`.
    pub fn from_start_len(start: NaiveDate, len: usize) -> Self {
        Self { start, len }
    }

    /// Builds an axis from explicit dates, verifying daily contiguity.
    ///
    /// Returns `Ok(None)` for an empty slice.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::Gap`] at the first non-consecutive date.
    pub fn from_dates(dates: &[NaiveDate]) -> Result<Option<Self>, CalendarError> {
        check_contiguous(dates)?;
        Ok(dates.first().map(|&start| Self {
            start,
            len: dates.len(),
        }))
    }

    /// The `len`-day axis that ends on the day before `next_start`.
    ///
    /// The start is derived by calendar arithmetic (`next_start - len days`).
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::Overflow`] if the start is not representable.
    pub fn preceding(next_start: NaiveDate, len: usize) -> Result<Self, CalendarError> {
        let start = add_days(next_start, -(len as i64))?;
        Ok(Self { start, len })
    }

    /// First day of the axis (the anchor, even when empty).
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// Last day of the axis, or `None` when empty.
    pub fn end(&self) -> Option<NaiveDate> {
        match self.len {
            0 => None,
            n => self.date_at(n - 1),
        }
    }

    /// The day immediately after the axis.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::Overflow`] at the end of chrono's range.
    pub fn following_day(&self) -> Result<NaiveDate, CalendarError> {
        add_days(self.start, self.len as i64)
    }

    /// Number of days.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` when the axis has no days.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Date at position `index`, or `None` past the end.
    pub fn date_at(&self, index: usize) -> Option<NaiveDate> {
        if index >= self.len {
            return None;
        }
        add_days(self.start, index as i64).ok()
    }

    /// Position of `date` on the axis, or `None` when outside it.
    pub fn index_of(&self, date: NaiveDate) -> Option<usize> {
        let offset = date.signed_duration_since(self.start).num_days();
        if offset < 0 || offset as usize >= self.len {
            None
        } else {
            Some(offset as usize)
        }
    }

    /// Returns `true` if `date` lies on the axis.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.index_of(date).is_some()
    }

    /// All dates of the axis in order.
    pub fn dates(&self) -> Vec<NaiveDate> {
        daily_sequence(self.start, self.len)
    }

    /// Day offsets from 1970-01-01 for every date, suitable for a CF
    /// `days since 1970-01-01` coordinate.
    pub fn epoch_days(&self) -> Vec<i64> {
        let first = days_since_epoch(self.start);
        (0..self.len as i64).map(|i| first + i).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn new_inclusive() {
        let axis = TimeAxis::new(ymd(2011, 1, 1), ymd(2011, 12, 31)).unwrap();
        assert_eq!(axis.len(), 365);
        assert_eq!(axis.start(), ymd(2011, 1, 1));
        assert_eq!(axis.end(), Some(ymd(2011, 12, 31)));
        assert_eq!(axis.following_day().unwrap(), ymd(2012, 1, 1));
    }

    #[test]
    fn new_single_day() {
        let axis = TimeAxis::new(ymd(2011, 1, 1), ymd(2011, 1, 1)).unwrap();
        assert_eq!(axis.len(), 1);
        assert_eq!(axis.end(), Some(ymd(2011, 1, 1)));
    }

    #[test]
    fn empty_axis_has_no_end() {
        let axis = TimeAxis::from_start_len(ymd(2011, 1, 1), 0);
        assert!(axis.is_empty());
        assert_eq!(axis.end(), None);
        assert!(axis.dates().is_empty());
    }

    #[test]
    fn from_dates_rejects_gap() {
        let dates = [ymd(2011, 1, 1), ymd(2011, 1, 3)];
        assert!(matches!(
            TimeAxis::from_dates(&dates),
            Err(CalendarError::Gap { index: 1, .. })
        ));
    }

    #[test]
    fn from_dates_empty() {
        assert_eq!(TimeAxis::from_dates(&[]).unwrap(), None);
    }

    #[test]
    fn preceding_ends_day_before() {
        let axis = TimeAxis::preceding(ymd(2011, 1, 1), 90).unwrap();
        assert_eq!(axis.len(), 90);
        assert_eq!(axis.end(), Some(ymd(2010, 12, 31)));
        assert_eq!(axis.start(), ymd(2010, 10, 3));
        assert_eq!(axis.following_day().unwrap(), ymd(2011, 1, 1));
    }

    #[test]
    fn index_of_and_contains() {
        let axis = TimeAxis::new(ymd(2012, 2, 27), ymd(2012, 3, 2)).unwrap();
        assert_eq!(axis.index_of(ymd(2012, 2, 29)), Some(2));
        assert_eq!(axis.index_of(ymd(2012, 3, 2)), Some(4));
        assert_eq!(axis.index_of(ymd(2012, 3, 3)), None);
        assert_eq!(axis.index_of(ymd(2012, 2, 26)), None);
        assert!(axis.contains(ymd(2012, 3, 1)));
    }

    #[test]
    fn epoch_days_are_consecutive() {
        let axis = TimeAxis::new(ymd(1970, 1, 1), ymd(1970, 1, 3)).unwrap();
        assert_eq!(axis.epoch_days(), vec![0, 1, 2]);
    }
}
