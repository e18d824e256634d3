//! Per-run cache of loaded observation exports.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::path::{Path, PathBuf};

use metprep_tabular::{Observations, TabularError, load_observations};
use tracing::debug;

use crate::config::SourceOptions;

/// Loads each distinct export once and hands out shared references.
#[derive(Debug)]
pub(crate) struct SourceCache<'a> {
    options: &'a SourceOptions,
    loaded: BTreeMap<PathBuf, Observations>,
}

impl<'a> SourceCache<'a> {
    pub(crate) fn new(options: &'a SourceOptions) -> Self {
        Self {
            options,
            loaded: BTreeMap::new(),
        }
    }

    /// Observations of `path`, loading the file on first use.
    pub(crate) fn get(&mut self, path: &Path) -> Result<&Observations, TabularError> {
        match self.loaded.entry(path.to_path_buf()) {
            Entry::Occupied(e) => Ok(e.into_mut()),
            Entry::Vacant(e) => {
                let obs = load_observations(
                    path,
                    self.options.loader(),
                    self.options.columns(),
                    self.options.date(),
                )?;
                debug!(path = %path.display(), n_days = obs.axis().len(), "loaded source");
                Ok(e.insert(obs))
            }
        }
    }

    /// Number of distinct files loaded so far.
    pub(crate) fn len(&self) -> usize {
        self.loaded.len()
    }
}
