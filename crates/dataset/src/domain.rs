//! Static per-unit attributes.

use std::collections::BTreeMap;

use metprep_tabular::UnitRecord;

use crate::error::DatasetError;
use crate::spatial::{SpatialUnits, UnitKey};
use crate::validate::{ValidationCollector, check_attributes, check_mask};

/// Static attributes of one unit as supplied. Absent values are `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct UnitAttributes {
    /// Elevation in metres.
    pub elev: Option<f64>,
    /// Raw mask value, 0 or 1 once validated.
    pub mask: Option<f64>,
    /// Centroid latitude, required for unstructured units.
    pub lat: Option<f64>,
    /// Centroid longitude, required for unstructured units.
    pub lon: Option<f64>,
}

impl UnitAttributes {
    /// Attributes of a grid cell, whose position comes from the grid.
    pub fn cell(elev: f64, mask: f64) -> Self {
        Self {
            elev: Some(elev),
            mask: Some(mask),
            lat: None,
            lon: None,
        }
    }

    fn missing(&self, grid: bool) -> Vec<String> {
        let mut names = Vec::new();
        if self.elev.is_none() {
            names.push("elev".to_string());
        }
        if self.mask.is_none() {
            names.push("mask".to_string());
        }
        if !grid {
            if self.lat.is_none() {
                names.push("lat".to_string());
            }
            if self.lon.is_none() {
                names.push("lon".to_string());
            }
        }
        names
    }
}

impl From<&UnitRecord> for UnitAttributes {
    fn from(r: &UnitRecord) -> Self {
        Self {
            elev: r.elev,
            mask: r.mask,
            lat: r.lat,
            lon: r.lon,
        }
    }
}

/// Attributes keyed by unit.
///
/// Entries for units outside the run are allowed and ignored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DomainTable {
    entries: BTreeMap<UnitKey, UnitAttributes>,
}

impl DomainTable {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a table from attribute rows joined on their key.
    pub fn from_records(records: &[UnitRecord]) -> Self {
        let entries = records
            .iter()
            .map(|r| (UnitKey::Hru(r.key.clone()), UnitAttributes::from(r)))
            .collect();
        Self { entries }
    }

    /// Adds or replaces the attributes of `key`.
    pub fn insert(&mut self, key: UnitKey, attrs: UnitAttributes) {
        self.entries.insert(key, attrs);
    }

    /// Attributes of `key`.
    pub fn get(&self, key: &UnitKey) -> Option<&UnitAttributes> {
        self.entries.get(key)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when no entries exist.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Checks coverage and values for every unit of `units`.
    ///
    /// Units are visited in declaration order and the first incomplete unit
    /// is reported. Mask and range problems are collected across all units.
    ///
    /// # Errors
    ///
    /// - [`DatasetError::MissingDomainAttribute`] for a unit with no entry
    ///   or with absent values.
    /// - [`DatasetError::InvalidMask`] for masks other than 0 or 1.
    /// - [`DatasetError::InvalidDomain`] for non-finite elevations or
    ///   out-of-range coordinates.
    pub fn resolve(&self, units: &SpatialUnits) -> Result<ResolvedDomain, DatasetError> {
        let grid = units.is_grid();
        let keys = units.keys();

        let mut rows = Vec::with_capacity(keys.len());
        for key in &keys {
            let attrs = self.entries.get(key).copied().unwrap_or_default();
            let missing = attrs.missing(grid);
            if !missing.is_empty() {
                return Err(DatasetError::MissingDomainAttribute {
                    unit: units.describe(key),
                    attributes: missing,
                });
            }
            rows.push(attrs);
        }

        let mut masks = ValidationCollector::new();
        let mut values = ValidationCollector::new();
        let mut resolved = Vec::with_capacity(rows.len());
        for (key, attrs) in keys.into_iter().zip(rows) {
            let label = units.describe(&key);
            let elev = attrs.elev.unwrap_or(f64::NAN);
            let mask = attrs.mask.unwrap_or(f64::NAN);
            check_mask(&mut masks, &label, mask);
            check_attributes(&mut values, &label, elev, attrs.lat, attrs.lon);
            resolved.push(ResolvedUnit {
                key,
                elev,
                active: mask == 1.0,
                lat: attrs.lat,
                lon: attrs.lon,
            });
        }
        masks.finish(|count, details| DatasetError::InvalidMask { count, details })?;
        values.finish(|count, details| DatasetError::InvalidDomain { count, details })?;

        Ok(ResolvedDomain { units: resolved })
    }
}

/// Validated attributes of one unit.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedUnit {
    /// Unit key.
    pub key: UnitKey,
    /// Elevation in metres.
    pub elev: f64,
    /// `true` when the mask is 1.
    pub active: bool,
    /// Centroid latitude (unstructured units only).
    pub lat: Option<f64>,
    /// Centroid longitude (unstructured units only).
    pub lon: Option<f64>,
}

impl ResolvedUnit {
    /// Mask as stored on disk.
    pub fn mask(&self) -> i32 {
        i32::from(self.active)
    }
}

/// Validated attributes for every unit of a run, in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedDomain {
    units: Vec<ResolvedUnit>,
}

impl ResolvedDomain {
    /// Units in declaration order.
    pub fn units(&self) -> &[ResolvedUnit] {
        &self.units
    }

    /// Number of active units.
    pub fn n_active(&self) -> usize {
        self.units.iter().filter(|u| u.active).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(key: &str, elev: Option<f64>, mask: Option<f64>) -> UnitRecord {
        UnitRecord {
            key: key.to_string(),
            elev,
            mask,
            lat: Some(44.0),
            lon: Some(-114.0),
        }
    }

    #[test]
    fn third_unit_without_record() {
        let units = SpatialUnits::hru(vec!["a".into(), "b".into(), "c".into()]).unwrap();
        let table = DomainTable::from_records(&[
            record("a", Some(1.0), Some(1.0)),
            record("b", Some(2.0), Some(1.0)),
        ]);
        let err = table.resolve(&units).unwrap_err();
        assert_eq!(
            err,
            DatasetError::MissingDomainAttribute {
                unit: "'c'".to_string(),
                attributes: vec!["elev", "mask", "lat", "lon"]
                    .into_iter()
                    .map(String::from)
                    .collect(),
            }
        );
    }

    #[test]
    fn partially_missing_attribute() {
        let units = SpatialUnits::hru(vec!["a".into()]).unwrap();
        let table = DomainTable::from_records(&[record("a", None, Some(1.0))]);
        match table.resolve(&units).unwrap_err() {
            DatasetError::MissingDomainAttribute { attributes, .. } => {
                assert_eq!(attributes, vec!["elev".to_string()]);
            }
            other => panic!("expected MissingDomainAttribute, got {other:?}"),
        }
    }

    #[test]
    fn grid_cells_need_no_centroid() {
        let units = SpatialUnits::grid(vec![44.0], vec![-114.0, -113.5]).unwrap();
        let mut table = DomainTable::new();
        table.insert(UnitKey::Cell { lat: 0, lon: 0 }, UnitAttributes::cell(1500.0, 1.0));
        table.insert(UnitKey::Cell { lat: 0, lon: 1 }, UnitAttributes::cell(1600.0, 0.0));
        let resolved = table.resolve(&units).unwrap();
        assert_eq!(resolved.units().len(), 2);
        assert_eq!(resolved.n_active(), 1);
        assert_eq!(resolved.units()[1].mask(), 0);
    }

    #[test]
    fn invalid_masks_are_collected() {
        let units = SpatialUnits::hru(vec!["a".into(), "b".into(), "c".into()]).unwrap();
        let table = DomainTable::from_records(&[
            record("a", Some(1.0), Some(2.0)),
            record("b", Some(1.0), Some(1.0)),
            record("c", Some(1.0), Some(0.5)),
        ]);
        match table.resolve(&units).unwrap_err() {
            DatasetError::InvalidMask { count, details } => {
                assert_eq!(count, 2);
                assert!(details.contains("'a'"));
                assert!(details.contains("'c'"));
            }
            other => panic!("expected InvalidMask, got {other:?}"),
        }
    }

    #[test]
    fn extra_records_are_ignored() {
        let units = SpatialUnits::hru(vec!["b".into()]).unwrap();
        let table = DomainTable::from_records(&[
            record("a", Some(1.0), Some(1.0)),
            record("b", Some(2.0), Some(1.0)),
        ]);
        let resolved = table.resolve(&units).unwrap();
        assert_eq!(resolved.units()[0].elev, 2.0);
        assert_eq!(table.len(), 2);
    }
}
