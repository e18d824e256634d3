//! Error types for metprep-io.

use std::path::PathBuf;

/// Error type for all fallible operations in the metprep-io crate.
///
/// Covers file-system failures, NetCDF library errors, calendar conversion
/// issues, and mismatches between a file and the dataset schema it is read
/// against.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    /// Returned when a required file does not exist on disk.
    #[error("file not found: {}", path.display())]
    FileNotFound {
        /// Path that could not be found.
        path: PathBuf,
    },

    /// Wraps an error originating from the NetCDF library.
    #[error("netcdf error: {reason}")]
    Netcdf {
        /// Description of the underlying NetCDF failure.
        reason: String,
    },

    /// Returned when the finished temporary file cannot be moved into place.
    #[error("failed to persist {}: {reason}", path.display())]
    Persist {
        /// Final destination path.
        path: PathBuf,
        /// Description of the file-system failure.
        reason: String,
    },

    /// Wraps an error originating from the metprep-calendar crate.
    #[error("calendar error: {reason}")]
    Calendar {
        /// Description of the underlying calendar failure.
        reason: String,
    },

    /// Wraps an error originating from the metprep-dataset crate.
    #[error("dataset error: {reason}")]
    Dataset {
        /// Description of the underlying dataset failure.
        reason: String,
    },

    /// Returned when one or more validation checks fail.
    #[error("{count} validation error(s): {details}")]
    Validation {
        /// Number of accumulated validation failures.
        count: usize,
        /// Human-readable summary of the failures.
        details: String,
    },

    /// Returned when a required variable is not present in a file.
    #[error("variable '{name}' not found in {}", path.display())]
    MissingVariable {
        /// Name of the missing variable.
        name: String,
        /// Path to the file that was inspected.
        path: PathBuf,
    },

    /// Returned when a required global attribute is absent.
    #[error("attribute '{name}' not found in {}", path.display())]
    MissingAttribute {
        /// Name of the missing attribute.
        name: String,
        /// Path to the file that was inspected.
        path: PathBuf,
    },

    /// Returned when a dimension has an unexpected size.
    #[error("dimension '{name}' mismatch: expected {expected}, got {got}")]
    DimensionMismatch {
        /// Name of the dimension.
        name: String,
        /// Expected size.
        expected: usize,
        /// Actual size.
        got: usize,
    },

    /// Returned when a time value cannot be parsed or is out of range.
    #[error("invalid time: {reason}")]
    InvalidTime {
        /// Description of the time parsing issue.
        reason: String,
    },
}

impl From<netcdf::Error> for IoError {
    fn from(e: netcdf::Error) -> Self {
        IoError::Netcdf {
            reason: e.to_string(),
        }
    }
}

impl From<metprep_calendar::CalendarError> for IoError {
    fn from(e: metprep_calendar::CalendarError) -> Self {
        IoError::Calendar {
            reason: e.to_string(),
        }
    }
}

impl From<metprep_dataset::DatasetError> for IoError {
    fn from(e: metprep_dataset::DatasetError) -> Self {
        IoError::Dataset {
            reason: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_file_not_found() {
        let err = IoError::FileNotFound {
            path: PathBuf::from("/tmp/missing.nc"),
        };
        assert_eq!(err.to_string(), "file not found: /tmp/missing.nc");
    }

    #[test]
    fn display_persist() {
        let err = IoError::Persist {
            path: PathBuf::from("out/forcing.nc"),
            reason: "permission denied".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "failed to persist out/forcing.nc: permission denied"
        );
    }

    #[test]
    fn display_missing_variable() {
        let err = IoError::MissingVariable {
            name: "t_max".to_string(),
            path: PathBuf::from("/data/forcing.nc"),
        };
        assert_eq!(
            err.to_string(),
            "variable 't_max' not found in /data/forcing.nc"
        );
    }

    #[test]
    fn display_dimension_mismatch() {
        let err = IoError::DimensionMismatch {
            name: "time".to_string(),
            expected: 365,
            got: 366,
        };
        assert_eq!(
            err.to_string(),
            "dimension 'time' mismatch: expected 365, got 366"
        );
    }

    #[test]
    fn from_netcdf_error() {
        let nc_err = netcdf::Error::Str("test nc error".to_string());
        let err: IoError = nc_err.into();
        assert!(matches!(err, IoError::Netcdf { .. }));
        assert!(err.to_string().contains("test nc error"));
    }

    #[test]
    fn from_dataset_error() {
        let err: IoError = metprep_dataset::DatasetError::EmptyUnits.into();
        assert_eq!(err.to_string(), "dataset error: no spatial units declared");
    }

    #[test]
    fn error_is_send_sync_and_std_error() {
        fn assert_bounds<T: Send + Sync + std::error::Error>() {}
        assert_bounds::<IoError>();
    }
}
