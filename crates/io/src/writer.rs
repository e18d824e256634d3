//! High-level NetCDF writer configuration and atomic persistence.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use metprep_dataset::{Dataset, DatasetSink};
use tracing::{debug, info, warn};

use crate::error::IoError;
use crate::netcdf_write;

/// Configuration for writing datasets to NetCDF-4.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriterConfig {
    /// zlib deflate level for data variables, `None` for uncompressed.
    deflate_level: Option<u8>,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            deflate_level: Some(4),
        }
    }
}

impl WriterConfig {
    /// Sets the deflate level (0..=9), or `None` to disable compression.
    pub fn with_deflate_level(mut self, level: Option<u8>) -> Self {
        self.deflate_level = level;
        self
    }

    /// The configured deflate level.
    pub fn deflate_level(&self) -> Option<u8> {
        self.deflate_level
    }

    /// Validates this configuration.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::Validation`] if the deflate level exceeds 9.
    pub fn validate(&self) -> Result<(), IoError> {
        if let Some(level) = self.deflate_level
            && level > 9
        {
            return Err(IoError::Validation {
                count: 1,
                details: format!("deflate_level must be 0..=9, got {level}"),
            });
        }
        Ok(())
    }
}

/// Path of the temporary sibling a dataset is written to before renaming.
pub fn temp_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}

/// Write `dataset` to `path` atomically.
///
/// The file is written to `<path>.tmp` and renamed into place once
/// complete. On failure the temporary file is removed and any existing
/// file at `path` is left untouched.
///
/// # Errors
///
/// Returns [`IoError::Validation`] for an invalid configuration,
/// [`IoError::Netcdf`] if the file cannot be created or written, and
/// [`IoError::Persist`] if the rename fails.
pub fn write_netcdf(path: &Path, dataset: &Dataset, config: &WriterConfig) -> Result<(), IoError> {
    config.validate()?;

    let tmp = temp_path(path);
    debug!(tmp = %tmp.display(), "writing temporary dataset file");

    let result = write_file(&tmp, dataset, config).and_then(|()| {
        std::fs::rename(&tmp, path).map_err(|e| IoError::Persist {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    });

    if let Err(e) = &result {
        if tmp.exists()
            && let Err(rm) = std::fs::remove_file(&tmp)
        {
            warn!(tmp = %tmp.display(), error = %rm, "failed to remove temporary file");
        }
        debug!(path = %path.display(), error = %e, "dataset write failed");
        return result;
    }

    info!(
        path = %path.display(),
        dataset = %dataset.kind(),
        n_variables = dataset.variables().len(),
        "wrote dataset"
    );
    Ok(())
}

/// Creates and fills the file; it is closed when the handle drops.
fn write_file(tmp: &Path, dataset: &Dataset, config: &WriterConfig) -> Result<(), IoError> {
    let mut file = netcdf::create(tmp)?;
    netcdf_write::write_dataset(&mut file, dataset, config.deflate_level)?;
    Ok(())
}

/// [`DatasetSink`] backed by NetCDF files on disk.
#[derive(Debug, Clone, Default)]
pub struct NetcdfWriter {
    config: WriterConfig,
}

impl NetcdfWriter {
    /// Creates a writer after validating `config`.
    ///
    /// # Errors
    ///
    /// See [`WriterConfig::validate`].
    pub fn new(config: WriterConfig) -> Result<Self, IoError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The writer's configuration.
    pub fn config(&self) -> &WriterConfig {
        &self.config
    }
}

impl DatasetSink for NetcdfWriter {
    type Error = IoError;

    fn persist(&mut self, dataset: &Dataset, path: &Path) -> Result<(), IoError> {
        write_netcdf(path, dataset, &self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_compresses() {
        let c = WriterConfig::default();
        assert_eq!(c.deflate_level(), Some(4));
        assert!(c.validate().is_ok());
    }

    #[test]
    fn deflate_level_out_of_range() {
        let c = WriterConfig::default().with_deflate_level(Some(12));
        assert!(matches!(
            c.validate(),
            Err(IoError::Validation { count: 1, .. })
        ));
        assert!(NetcdfWriter::new(c).is_err());
        assert!(
            WriterConfig::default()
                .with_deflate_level(None)
                .validate()
                .is_ok()
        );
    }

    #[test]
    fn temp_path_appends_suffix() {
        assert_eq!(
            temp_path(Path::new("out/forcing.nc")),
            PathBuf::from("out/forcing.nc.tmp")
        );
    }
}
