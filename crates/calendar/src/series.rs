//! Values attached to a contiguous daily axis.

use chrono::NaiveDate;

use crate::axis::TimeAxis;
use crate::error::CalendarError;

/// One value per day over a [`TimeAxis`].
///
/// Missing observations are stored as `NaN`; nothing in this type fills
/// or interpolates them.
#[derive(Debug, Clone, PartialEq)]
pub struct DailySeries {
    axis: TimeAxis,
    values: Vec<f64>,
}

impl DailySeries {
    /// Pairs `values` with `axis`.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::LengthMismatch`] if the lengths differ.
    pub fn new(axis: TimeAxis, values: Vec<f64>) -> Result<Self, CalendarError> {
        if axis.len() != values.len() {
            return Err(CalendarError::LengthMismatch {
                expected: axis.len(),
                got: values.len(),
            });
        }
        Ok(Self { axis, values })
    }

    /// Series whose first value falls on `start`.
    pub fn from_start(start: NaiveDate, values: Vec<f64>) -> Self {
        Self {
            axis: TimeAxis::from_start_len(start, values.len()),
            values,
        }
    }

    /// The time axis.
    pub fn axis(&self) -> TimeAxis {
        self.axis
    }

    /// First day (the axis anchor, even when empty).
    pub fn start(&self) -> NaiveDate {
        self.axis.start()
    }

    /// Last day, or `None` when empty.
    pub fn end(&self) -> Option<NaiveDate> {
        self.axis.end()
    }

    /// The values in date order.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Consumes the series and returns its values.
    pub fn into_values(self) -> Vec<f64> {
        self.values
    }

    /// Number of days.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` when there are no values.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value on `date`, or `None` when the date is off the axis.
    pub fn get(&self, date: NaiveDate) -> Option<f64> {
        self.axis.index_of(date).map(|i| self.values[i])
    }

    /// Sub-series restricted to `[first, last]`.
    ///
    /// The result is clipped to the dates actually present, so it can be
    /// shorter than the requested range. An empty intersection yields an
    /// empty series anchored at `first`.
    pub fn window(&self, first: NaiveDate, last: NaiveDate) -> Self {
        let lo = first.max(self.start());
        let hi = match self.end() {
            Some(end) => last.min(end),
            None => return Self::from_start(first, Vec::new()),
        };
        if hi < lo {
            return Self::from_start(first, Vec::new());
        }
        // Both bounds are on the axis after clipping.
        let (i, j) = match (self.axis.index_of(lo), self.axis.index_of(hi)) {
            (Some(i), Some(j)) => (i, j),
            _ => return Self::from_start(first, Vec::new()),
        };
        Self::from_start(lo, self.values[i..=j].to_vec())
    }

    /// Entries dated strictly before `date`.
    pub fn before(&self, date: NaiveDate) -> Self {
        let keep = match self.axis.index_of(date) {
            Some(i) => i,
            None if date <= self.start() => 0,
            None => self.len(),
        };
        Self::from_start(self.start(), self.values[..keep].to_vec())
    }

    /// The last `n` entries (all of them when shorter).
    pub fn tail(&self, n: usize) -> Self {
        let skip = self.len().saturating_sub(n);
        let start = self.axis.date_at(skip).unwrap_or(self.start());
        Self::from_start(start, self.values[skip..].to_vec())
    }

    /// Applies `f` to every value, keeping the axis.
    pub fn map(self, f: impl Fn(f64) -> f64) -> Self {
        Self {
            axis: self.axis,
            values: self.values.into_iter().map(f).collect(),
        }
    }
}
