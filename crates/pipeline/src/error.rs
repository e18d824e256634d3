//! Error types for metprep-pipeline.

use std::path::PathBuf;

use metprep_calendar::CalendarError;
use metprep_dataset::DatasetError;
use metprep_io::IoError;
use metprep_tabular::TabularError;
use metprep_transform::TransformError;

/// Error type for a pipeline run.
///
/// Stage errors are wrapped unchanged so callers can match on the
/// underlying taxonomy.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Returned when the run configuration is inconsistent.
    #[error("invalid configuration: {reason}")]
    Config {
        /// Description of the problem.
        reason: String,
    },

    /// Loading or parsing an input table failed.
    #[error(transparent)]
    Tabular(#[from] TabularError),

    /// De-accumulation or spin-up extraction failed.
    #[error(transparent)]
    Transform(#[from] TransformError),

    /// Dataset assembly failed.
    #[error(transparent)]
    Dataset(#[from] DatasetError),

    /// Date arithmetic failed.
    #[error(transparent)]
    Calendar(#[from] CalendarError),

    /// Writing a dataset failed.
    #[error(transparent)]
    Io(#[from] IoError),

    /// Returned when a dataset sink rejects a write.
    #[error("failed to persist {}: {reason}", path.display())]
    Persist {
        /// Destination path.
        path: PathBuf,
        /// Description of the sink failure.
        reason: String,
    },

    /// Returned when the driver configuration record is invalid.
    #[error("driver configuration: {reason}")]
    Driver {
        /// Description of the problem.
        reason: String,
    },

    /// Returned when an output file or directory cannot be written.
    #[error("failed to write {}: {reason}", path.display())]
    Output {
        /// Path being written.
        path: PathBuf,
        /// Description of the file-system failure.
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrapped_errors_keep_their_message() {
        let inner = DatasetError::EmptyUnits;
        let err: PipelineError = inner.clone().into();
        assert_eq!(err.to_string(), inner.to_string());
        assert!(matches!(err, PipelineError::Dataset(DatasetError::EmptyUnits)));
    }

    #[test]
    fn display_config() {
        let err = PipelineError::Config {
            reason: "stop precedes start".to_string(),
        };
        assert_eq!(err.to_string(), "invalid configuration: stop precedes start");
    }

    #[test]
    fn display_output() {
        let err = PipelineError::Output {
            path: PathBuf::from("out/metsim.json"),
            reason: "read-only file system".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "failed to write out/metsim.json: read-only file system"
        );
    }

    #[test]
    fn error_is_send_sync_and_std_error() {
        fn assert_bounds<T: Send + Sync + std::error::Error>() {}
        assert_bounds::<PipelineError>();
    }
}
