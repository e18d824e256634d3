//! Error types for metprep-dataset.

use chrono::NaiveDate;

/// Error type for all fallible operations in the metprep-dataset crate.
///
/// Every variant names the spatial unit and variable involved, when there is
/// one, so a failed assembly can be traced back to its configuration entry.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DatasetError {
    /// Returned when a run declares no spatial units.
    #[error("no spatial units declared")]
    EmptyUnits,

    /// Returned when a unit identifier or coordinate value repeats.
    #[error("duplicate spatial unit {unit}")]
    DuplicateUnit {
        /// Description of the repeated unit or coordinate.
        unit: String,
    },

    /// Returned when a declared unit lacks one or more static attributes.
    #[error("unit {unit} is missing domain attribute(s): {}", attributes.join(", "))]
    MissingDomainAttribute {
        /// Description of the unit.
        unit: String,
        /// Names of the absent attributes.
        attributes: Vec<String>,
    },

    /// Returned when mask values are not exactly 0 or 1.
    #[error("{count} invalid mask value(s): {details}")]
    InvalidMask {
        /// Number of offending units.
        count: usize,
        /// Human-readable summary of the failures.
        details: String,
    },

    /// Returned when static attributes are out of range or non-finite.
    #[error("{count} invalid domain value(s): {details}")]
    InvalidDomain {
        /// Number of accumulated validation failures.
        count: usize,
        /// Human-readable summary of the failures.
        details: String,
    },

    /// Returned when an active unit has no series for a variable.
    #[error("no '{variable}' series for active unit {unit}")]
    MissingSeries {
        /// Canonical variable name.
        variable: String,
        /// Description of the unit.
        unit: String,
    },

    /// Returned when a series length differs from the time axis length.
    #[error("shape mismatch for '{variable}' at unit {unit}: expected {expected} day(s), got {got}")]
    ShapeMismatch {
        /// Canonical variable name.
        variable: String,
        /// Description of the unit.
        unit: String,
        /// Length of the time axis.
        expected: usize,
        /// Length of the offending series.
        got: usize,
    },

    /// Returned when dates disagree with the dataset's time axis.
    #[error("alignment error for {context}: expected {expected}, found {found}")]
    Alignment {
        /// What was being aligned.
        context: String,
        /// Date required by the axis.
        expected: NaiveDate,
        /// Date actually present.
        found: NaiveDate,
    },

    /// Returned when the state window is shorter than the required lookback.
    #[error("state window has {available} day(s), lookback requires {required}")]
    InsufficientHistory {
        /// Required lookback in days.
        required: usize,
        /// Days in the state window.
        available: usize,
    },

    /// Returned when a variable's array does not fit its dimensions.
    #[error("variable '{name}' has shape {shape:?}, dimensions require {expected:?}")]
    VariableShape {
        /// Variable name.
        name: String,
        /// Shape of the supplied array.
        shape: Vec<usize>,
        /// Shape implied by the named dimensions.
        expected: Vec<usize>,
    },

    /// Returned when a variable names a dimension the dataset lacks.
    #[error("variable '{name}' uses unknown dimension '{dim}'")]
    UnknownDimension {
        /// Variable name.
        name: String,
        /// Offending dimension name.
        dim: String,
    },

    /// Wraps an error originating from the metprep-calendar crate.
    #[error("calendar error: {reason}")]
    Calendar {
        /// Description of the underlying calendar failure.
        reason: String,
    },
}

impl From<metprep_calendar::CalendarError> for DatasetError {
    fn from(e: metprep_calendar::CalendarError) -> Self {
        DatasetError::Calendar {
            reason: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_missing_domain_attribute() {
        let err = DatasetError::MissingDomainAttribute {
            unit: "'170601080103'".to_string(),
            attributes: vec!["elev".to_string(), "mask".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "unit '170601080103' is missing domain attribute(s): elev, mask"
        );
    }

    #[test]
    fn display_shape_mismatch() {
        let err = DatasetError::ShapeMismatch {
            variable: "t_min".to_string(),
            unit: "(lat 44.5, lon -114.25)".to_string(),
            expected: 365,
            got: 364,
        };
        assert_eq!(
            err.to_string(),
            "shape mismatch for 't_min' at unit (lat 44.5, lon -114.25): expected 365 day(s), got 364"
        );
    }

    #[test]
    fn display_alignment() {
        let err = DatasetError::Alignment {
            context: "state end".to_string(),
            expected: NaiveDate::from_ymd_opt(2010, 12, 31).unwrap(),
            found: NaiveDate::from_ymd_opt(2010, 12, 30).unwrap(),
        };
        assert_eq!(
            err.to_string(),
            "alignment error for state end: expected 2010-12-31, found 2010-12-30"
        );
    }

    #[test]
    fn display_invalid_mask() {
        let err = DatasetError::InvalidMask {
            count: 1,
            details: "unit 'a': mask 2".to_string(),
        };
        assert_eq!(err.to_string(), "1 invalid mask value(s): unit 'a': mask 2");
    }

    #[test]
    fn from_calendar_error() {
        let cal = metprep_calendar::CalendarError::LengthMismatch {
            expected: 2,
            got: 1,
        };
        let err: DatasetError = cal.into();
        assert!(matches!(err, DatasetError::Calendar { .. }));
    }

    #[test]
    fn error_is_send_sync_and_std_error() {
        fn assert_bounds<T: Send + Sync + std::error::Error>() {}
        assert_bounds::<DatasetError>();
    }
}
