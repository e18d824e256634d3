//! Error types for the metprep-calendar crate.

use chrono::NaiveDate;

/// Error type for all fallible operations in the metprep-calendar crate.
///
/// This enum covers invalid date ranges, broken daily contiguity, date
/// arithmetic overflow and unparseable date strings.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CalendarError {
    /// Returned when a range ends before it starts.
    #[error("inverted date range: {start} .. {end}")]
    InvertedRange {
        /// First day of the range.
        start: NaiveDate,
        /// Last day of the range.
        end: NaiveDate,
    },

    /// Returned when two consecutive dates are not exactly one day apart.
    #[error("date gap at index {index}: {previous} is followed by {found}")]
    Gap {
        /// Index of the offending date within the sequence.
        index: usize,
        /// Date immediately before the gap.
        previous: NaiveDate,
        /// Date found where `previous + 1 day` was expected.
        found: NaiveDate,
    },

    /// Returned when date arithmetic leaves chrono's representable range.
    #[error("date overflow adding {days} days to {date}")]
    Overflow {
        /// Date the offset was applied to.
        date: NaiveDate,
        /// Signed day offset.
        days: i64,
    },

    /// Returned when a value vector does not match its time axis length.
    #[error("series length mismatch: axis has {expected} days, got {got} values")]
    LengthMismatch {
        /// Number of days on the axis.
        expected: usize,
        /// Number of values supplied.
        got: usize,
    },

    /// Returned when a string does not match the expected date format.
    #[error("invalid date '{value}' for format '{format}'")]
    Parse {
        /// The raw string that failed to parse.
        value: String,
        /// The chrono format string used.
        format: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn display_inverted_range() {
        let err = CalendarError::InvertedRange {
            start: ymd(2010, 2, 1),
            end: ymd(2010, 1, 1),
        };
        assert_eq!(err.to_string(), "inverted date range: 2010-02-01 .. 2010-01-01");
    }

    #[test]
    fn display_gap() {
        let err = CalendarError::Gap {
            index: 4,
            previous: ymd(2010, 1, 4),
            found: ymd(2010, 1, 6),
        };
        assert_eq!(
            err.to_string(),
            "date gap at index 4: 2010-01-04 is followed by 2010-01-06"
        );
    }

    #[test]
    fn display_parse() {
        let err = CalendarError::Parse {
            value: "2010/13/01".to_string(),
            format: "%Y/%m/%d".to_string(),
        };
        assert_eq!(err.to_string(), "invalid date '2010/13/01' for format '%Y/%m/%d'");
    }

    #[test]
    fn error_is_send_sync_and_std_error() {
        fn assert_bounds<T: Send + Sync + std::error::Error>() {}
        assert_bounds::<CalendarError>();
    }
}
