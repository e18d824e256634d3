//! Error types for metprep-tabular.

use std::path::PathBuf;

/// Error type for all fallible operations in the metprep-tabular crate.
///
/// Every variant that concerns a file carries its path so a failure can be
/// diagnosed without re-running. Line numbers are 1-based positions in the
/// source file.
#[derive(Debug, thiserror::Error)]
pub enum TabularError {
    /// Returned when a required file does not exist on disk.
    #[error("file not found: {}", path.display())]
    FileNotFound {
        /// Path that could not be found.
        path: PathBuf,
    },

    /// Wraps an error originating from the CSV reader.
    #[error("csv error in {}: {reason}", path.display())]
    Csv {
        /// File being read.
        path: PathBuf,
        /// Description of the underlying CSV failure.
        reason: String,
    },

    /// Returned when a row cannot be interpreted: wrong field count, bad
    /// number, bad date, or a break in the daily sequence.
    #[error("malformed input in {} at line {line}: {reason}", path.display())]
    MalformedInput {
        /// File being read.
        path: PathBuf,
        /// Line of the offending row.
        line: u64,
        /// What was wrong with it.
        reason: String,
    },

    /// Returned when one or more requested column labels are absent from
    /// the header. Labels are shown quoted so trailing spaces are visible.
    #[error("missing column(s) {columns:?} in {}", path.display())]
    MissingColumns {
        /// File being read.
        path: PathBuf,
        /// Every requested label that was not found.
        columns: Vec<String>,
    },

    /// Returned when a file has no header row after the skipped metadata.
    #[error("no header row in {} after skipping {skipped} row(s)", path.display())]
    MissingHeader {
        /// File being read.
        path: PathBuf,
        /// Number of metadata rows that were discarded.
        skipped: usize,
    },

    /// Returned when a column label carries no recognisable unit.
    #[error("cannot determine unit of column {label:?}")]
    UnknownUnit {
        /// The raw column label.
        label: String,
    },

    /// Returned when a unit does not measure the quantity a variable needs.
    #[error("unit '{unit}' cannot be used for variable '{variable}'")]
    IncompatibleUnit {
        /// Canonical variable name.
        variable: String,
        /// Unit symbol.
        unit: String,
    },

    /// Returned when an unknown variable name is requested.
    #[error("unknown variable '{name}'")]
    UnknownVariable {
        /// The name that was not recognised.
        name: String,
    },
}

impl TabularError {
    /// Returns `true` for the errors that signal a malformed input file:
    /// a bad row, a missing column or header, or an unreadable CSV.
    pub fn is_malformed_input(&self) -> bool {
        matches!(
            self,
            Self::MalformedInput { .. }
                | Self::MissingColumns { .. }
                | Self::MissingHeader { .. }
                | Self::Csv { .. }
        )
    }
}
