//! Spatial units a run operates over.

use std::collections::BTreeSet;

use crate::error::DatasetError;

/// Dimension name of the unstructured unit axis.
pub const HRU_DIM: &str = "hru";
/// Dimension name of the latitude axis.
pub const LAT_DIM: &str = "lat";
/// Dimension name of the longitude axis.
pub const LON_DIM: &str = "lon";

/// Identifies one spatial unit.
///
/// Grid cells are addressed by coordinate index so keys stay totally
/// ordered; [`SpatialUnits::describe`] renders the coordinate values.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum UnitKey {
    /// Cell of a regular grid.
    Cell {
        /// Index into the latitude coordinate.
        lat: usize,
        /// Index into the longitude coordinate.
        lon: usize,
    },
    /// Hydrologic response unit identifier.
    Hru(String),
}

/// Ordered, duplicate-free collection of units fixed for a run.
#[derive(Debug, Clone, PartialEq)]
pub enum SpatialUnits {
    /// Every combination of `lats` × `lons`.
    Grid {
        /// Latitudes in degrees north.
        lats: Vec<f64>,
        /// Longitudes in degrees east.
        lons: Vec<f64>,
    },
    /// Opaque identifiers in declaration order.
    Hru {
        /// Unit identifiers.
        ids: Vec<String>,
    },
}

impl SpatialUnits {
    /// Structured units over the product of two coordinate vectors.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::EmptyUnits`] if either coordinate is empty and
    /// [`DatasetError::DuplicateUnit`] if a coordinate value repeats.
    pub fn grid(lats: Vec<f64>, lons: Vec<f64>) -> Result<Self, DatasetError> {
        if lats.is_empty() || lons.is_empty() {
            return Err(DatasetError::EmptyUnits);
        }
        check_unique_coords("lat", &lats)?;
        check_unique_coords("lon", &lons)?;
        Ok(Self::Grid { lats, lons })
    }

    /// Unstructured units.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::EmptyUnits`] for an empty list and
    /// [`DatasetError::DuplicateUnit`] for a repeated identifier.
    pub fn hru(ids: Vec<String>) -> Result<Self, DatasetError> {
        if ids.is_empty() {
            return Err(DatasetError::EmptyUnits);
        }
        let mut seen = BTreeSet::new();
        for id in &ids {
            if !seen.insert(id.as_str()) {
                return Err(DatasetError::DuplicateUnit {
                    unit: format!("'{id}'"),
                });
            }
        }
        Ok(Self::Hru { ids })
    }

    /// Total number of units.
    pub fn len(&self) -> usize {
        match self {
            Self::Grid { lats, lons } => lats.len() * lons.len(),
            Self::Hru { ids } => ids.len(),
        }
    }

    /// Always `false` for a validated collection.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `true` for structured lat/lon units.
    pub fn is_grid(&self) -> bool {
        matches!(self, Self::Grid { .. })
    }

    /// Spatial dimensions with their sizes, in array order.
    pub fn dims(&self) -> Vec<(&'static str, usize)> {
        match self {
            Self::Grid { lats, lons } => vec![(LAT_DIM, lats.len()), (LON_DIM, lons.len())],
            Self::Hru { ids } => vec![(HRU_DIM, ids.len())],
        }
    }

    /// Every unit key, row-major for grids.
    pub fn keys(&self) -> Vec<UnitKey> {
        match self {
            Self::Grid { lats, lons } => (0..lats.len())
                .flat_map(|lat| (0..lons.len()).map(move |lon| UnitKey::Cell { lat, lon }))
                .collect(),
            Self::Hru { ids } => ids.iter().cloned().map(UnitKey::Hru).collect(),
        }
    }

    /// Key of the grid cell at exactly (`lat`, `lon`).
    pub fn cell_at(&self, lat: f64, lon: f64) -> Option<UnitKey> {
        match self {
            Self::Grid { lats, lons } => {
                let i = lats.iter().position(|&v| v == lat)?;
                let j = lons.iter().position(|&v| v == lon)?;
                Some(UnitKey::Cell { lat: i, lon: j })
            }
            Self::Hru { .. } => None,
        }
    }

    /// Index of `key` along the spatial dimension(s).
    ///
    /// Grids return `[lat, lon]`, HRUs return `[position]`.
    pub fn index_of(&self, key: &UnitKey) -> Option<Vec<usize>> {
        match (self, key) {
            (Self::Grid { lats, lons }, UnitKey::Cell { lat, lon })
                if *lat < lats.len() && *lon < lons.len() =>
            {
                Some(vec![*lat, *lon])
            }
            (Self::Hru { ids }, UnitKey::Hru(id)) => {
                ids.iter().position(|x| x == id).map(|i| vec![i])
            }
            _ => None,
        }
    }

    /// Human-readable description of `key` for error messages.
    pub fn describe(&self, key: &UnitKey) -> String {
        match (self, key) {
            (Self::Grid { lats, lons }, UnitKey::Cell { lat, lon }) => {
                match (lats.get(*lat), lons.get(*lon)) {
                    (Some(y), Some(x)) => format!("(lat {y}, lon {x})"),
                    _ => format!("cell [{lat}, {lon}]"),
                }
            }
            (_, UnitKey::Cell { lat, lon }) => format!("cell [{lat}, {lon}]"),
            (_, UnitKey::Hru(id)) => format!("'{id}'"),
        }
    }
}

fn check_unique_coords(name: &str, values: &[f64]) -> Result<(), DatasetError> {
    let mut seen = BTreeSet::new();
    for &v in values {
        // -0.0 and 0.0 are the same coordinate.
        let bits = if v == 0.0 { 0u64 } else { v.to_bits() };
        if !seen.insert(bits) {
            return Err(DatasetError::DuplicateUnit {
                unit: format!("{name} {v}"),
            });
        }
    }
    Ok(())
}
