//! Error types for metprep-transform.

use chrono::NaiveDate;

/// Error type for all fallible operations in the metprep-transform crate.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TransformError {
    /// Returned when the history before a run is shorter than the lookback.
    #[error(
        "insufficient history for '{variable}': need {required} day(s) before {run_start}, have {available}"
    )]
    InsufficientHistory {
        /// Canonical variable name.
        variable: String,
        /// First day of the run.
        run_start: NaiveDate,
        /// Required lookback in days.
        required: usize,
        /// Days actually available.
        available: usize,
    },

    /// Returned when a window's dates disagree with calendar arithmetic.
    #[error("spin-up alignment for '{variable}': expected {what} {expected}, found {}", fmt_date(.found))]
    Alignment {
        /// Canonical variable name.
        variable: String,
        /// Which boundary disagreed (`"last day"` or `"first day"`).
        what: &'static str,
        /// Date derived by calendar arithmetic.
        expected: NaiveDate,
        /// Date actually present.
        found: Option<NaiveDate>,
    },

    /// Wraps an error originating from the metprep-calendar crate.
    #[error("calendar error: {reason}")]
    Calendar {
        /// Description of the underlying calendar failure.
        reason: String,
    },
}

fn fmt_date(date: &Option<NaiveDate>) -> String {
    date.map_or_else(|| "no data".to_string(), |d| d.to_string())
}

impl From<metprep_calendar::CalendarError> for TransformError {
    fn from(e: metprep_calendar::CalendarError) -> Self {
        TransformError::Calendar {
            reason: e.to_string(),
        }
    }
}
