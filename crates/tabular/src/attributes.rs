//! Per-unit static attribute tables for unstructured (HRU) runs.

use std::collections::BTreeSet;
use std::path::Path;

use tracing::info;

use crate::error::TabularError;
use crate::loader::{LoaderConfig, load_table};

/// Column labels of an HRU attribute export.
///
/// `key` is the join key shared with the external geometry source
/// (e.g. `HUC12`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeColumns {
    key: String,
    elev: String,
    mask: String,
    lat: String,
    lon: String,
}

impl Default for AttributeColumns {
    fn default() -> Self {
        Self {
            key: "hru".into(),
            elev: "elev".into(),
            mask: "mask".into(),
            lat: "lat".into(),
            lon: "lon".into(),
        }
    }
}

impl AttributeColumns {
    /// Sets the join-key column.
    pub fn with_key(mut self, label: impl Into<String>) -> Self {
        self.key = label.into();
        self
    }

    /// Sets the elevation column.
    pub fn with_elev(mut self, label: impl Into<String>) -> Self {
        self.elev = label.into();
        self
    }

    /// Sets the mask column.
    pub fn with_mask(mut self, label: impl Into<String>) -> Self {
        self.mask = label.into();
        self
    }

    /// Sets the latitude column.
    pub fn with_lat(mut self, label: impl Into<String>) -> Self {
        self.lat = label.into();
        self
    }

    /// Sets the longitude column.
    pub fn with_lon(mut self, label: impl Into<String>) -> Self {
        self.lon = label.into();
        self
    }

    /// The join-key label.
    pub fn key(&self) -> &str {
        &self.key
    }
}

/// One row of an attribute table. Blank cells are `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitRecord {
    /// Join key, whitespace-trimmed.
    pub key: String,
    /// Elevation in metres.
    pub elev: Option<f64>,
    /// Raw mask value; range checking happens at assembly.
    pub mask: Option<f64>,
    /// Latitude in degrees north.
    pub lat: Option<f64>,
    /// Longitude in degrees east.
    pub lon: Option<f64>,
}

/// Loads per-unit attributes keyed by the join column.
///
/// # Errors
///
/// Returns the loader's errors, [`TabularError::MissingColumns`] for absent
/// labels, and [`TabularError::MalformedInput`] for non-numeric values,
/// blank keys or duplicate keys.
pub fn load_unit_records(
    path: &Path,
    loader: &LoaderConfig,
    columns: &AttributeColumns,
) -> Result<Vec<UnitRecord>, TabularError> {
    let table = load_table(path, loader)?;
    let idx = table.require_columns(&[
        columns.key.as_str(),
        columns.elev.as_str(),
        columns.mask.as_str(),
        columns.lat.as_str(),
        columns.lon.as_str(),
    ])?;

    let optional = |v: f64| if v.is_nan() { None } else { Some(v) };

    let mut seen = BTreeSet::new();
    let mut records = Vec::with_capacity(table.len());
    for record in table.records() {
        let key = record.field(idx[0]).trim().to_string();
        if key.is_empty() {
            return Err(table.malformed(record.line(), format!("blank {:?}", columns.key)));
        }
        if !seen.insert(key.clone()) {
            return Err(table.malformed(record.line(), format!("duplicate key '{key}'")));
        }
        records.push(UnitRecord {
            key,
            elev: optional(record.number(idx[1])?),
            mask: optional(record.number(idx[2])?),
            lat: optional(record.number(idx[3])?),
            lon: optional(record.number(idx[4])?),
        });
    }

    info!(
        path = %path.display(),
        key = %columns.key,
        n_units = records.len(),
        "loaded unit attributes"
    );

    Ok(records)
}
