//! Persistence seam between assembly and storage.

use std::path::Path;

use crate::model::Dataset;

/// Writes assembled datasets somewhere durable.
///
/// Implementations must either persist the whole dataset at `path` or
/// leave nothing behind. Callers never re-open what they persisted.
pub trait DatasetSink {
    /// Error type returned on a failed write.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Persists `dataset` at `path`.
    fn persist(&mut self, dataset: &Dataset, path: &Path) -> Result<(), Self::Error>;
}
