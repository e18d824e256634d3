//! Structured and unstructured dataset assembly.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use metprep_calendar::{DailySeries, TimeAxis, add_days};
use metprep_tabular::Variable;
use ndarray::{ArrayD, IxDyn};
use tracing::{debug, info};

use crate::domain::{DomainTable, ResolvedDomain};
use crate::error::DatasetError;
use crate::model::{DataVariable, Dataset, DatasetKind, TIME_DIM, VariableData};
use crate::spatial::{HRU_DIM, SpatialUnits, UnitKey};

/// Target-unit daily series per unit and variable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeriesTable {
    by_unit: BTreeMap<UnitKey, BTreeMap<Variable, DailySeries>>,
}

impl SeriesTable {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the series of `variable` at `key`.
    pub fn insert(&mut self, key: UnitKey, variable: Variable, series: DailySeries) {
        self.by_unit
            .entry(key)
            .or_default()
            .insert(variable, series);
    }

    /// Series of `variable` at `key`.
    pub fn get(&self, key: &UnitKey, variable: Variable) -> Option<&DailySeries> {
        self.by_unit.get(key).and_then(|m| m.get(&variable))
    }

    /// Number of units with at least one series.
    pub fn n_units(&self) -> usize {
        self.by_unit.len()
    }
}

/// Builds forcing, domain and state datasets over one set of units.
///
/// Domain coverage and mask values are validated on construction, before
/// any series is looked at.
#[derive(Debug, Clone)]
pub struct Assembler {
    units: SpatialUnits,
    domain: ResolvedDomain,
    join_key: Option<String>,
}

impl Assembler {
    /// Validates `table` against `units`.
    ///
    /// # Errors
    ///
    /// See [`DomainTable::resolve`].
    pub fn new(units: SpatialUnits, table: &DomainTable) -> Result<Self, DatasetError> {
        let domain = table.resolve(&units)?;
        debug!(
            n_units = units.len(),
            n_active = domain.n_active(),
            "resolved domain attributes"
        );
        Ok(Self {
            units,
            domain,
            join_key: None,
        })
    }

    /// Records the external join field for unstructured units.
    pub fn with_join_key(mut self, key: impl Into<String>) -> Self {
        self.join_key = Some(key.into());
        self
    }

    /// Spatial units.
    pub fn units(&self) -> &SpatialUnits {
        &self.units
    }

    /// Validated domain attributes.
    pub fn domain(&self) -> &ResolvedDomain {
        &self.domain
    }

    /// Builds the static domain dataset.
    ///
    /// Unstructured domains also carry `lat`/`lon` data variables.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::VariableShape`] only on internal
    /// inconsistency.
    pub fn build_domain(&self) -> Result<Dataset, DatasetError> {
        let mut ds = self.empty(DatasetKind::Domain, None);
        let spatial: Vec<&str> = self.units.dims().iter().map(|(d, _)| *d).collect();
        let shape: Vec<usize> = self.units.dims().iter().map(|(_, n)| *n).collect();
        let units = self.domain.units();

        let elev = units.iter().map(|u| u.elev).collect();
        ds.push_variable(DataVariable::new(
            "elev",
            &spatial,
            VariableData::F64(shaped(&shape, elev, "elev")?),
            "m",
            "elevation",
        ))?;

        let mask = units.iter().map(|u| u.mask()).collect();
        ds.push_variable(DataVariable::new(
            "mask",
            &spatial,
            VariableData::I32(shaped(&shape, mask, "mask")?),
            "1",
            "domain mask",
        ))?;

        if !self.units.is_grid() {
            let lat = units.iter().map(|u| u.lat.unwrap_or(f64::NAN)).collect();
            ds.push_variable(DataVariable::new(
                "lat",
                &[HRU_DIM],
                VariableData::F64(shaped(&shape, lat, "lat")?),
                "degrees_north",
                "latitude",
            ))?;
            let lon = units.iter().map(|u| u.lon.unwrap_or(f64::NAN)).collect();
            ds.push_variable(DataVariable::new(
                "lon",
                &[HRU_DIM],
                VariableData::F64(shaped(&shape, lon, "lon")?),
                "degrees_east",
                "longitude",
            ))?;
        }

        info!(
            dataset = "domain",
            n_units = self.units.len(),
            n_active = self.domain.n_active(),
            "assembled dataset"
        );
        Ok(ds)
    }

    /// Builds the forcing dataset over `axis`.
    ///
    /// # Errors
    ///
    /// - [`DatasetError::MissingSeries`] for an active unit without a series.
    /// - [`DatasetError::ShapeMismatch`] if a series length differs from
    ///   `axis`.
    /// - [`DatasetError::Alignment`] if a series starts on another day.
    pub fn build_forcing(
        &self,
        series: &SeriesTable,
        axis: TimeAxis,
    ) -> Result<Dataset, DatasetError> {
        self.build_timed(DatasetKind::Forcing, series, axis)
    }

    /// Builds the state dataset over `axis`.
    ///
    /// The axis must end the day before `forcing_start` and hold at least
    /// `lookback` days.
    ///
    /// # Errors
    ///
    /// - [`DatasetError::InsufficientHistory`] if the axis is shorter than
    ///   `lookback`.
    /// - [`DatasetError::Alignment`] if the axis does not abut
    ///   `forcing_start`.
    /// - Any error of [`build_forcing`](Self::build_forcing).
    pub fn build_state(
        &self,
        series: &SeriesTable,
        axis: TimeAxis,
        forcing_start: NaiveDate,
        lookback: usize,
    ) -> Result<Dataset, DatasetError> {
        if axis.len() < lookback || axis.is_empty() {
            return Err(DatasetError::InsufficientHistory {
                required: lookback,
                available: axis.len(),
            });
        }
        if axis.following_day()? != forcing_start {
            let expected = add_days(forcing_start, -1)?;
            return Err(DatasetError::Alignment {
                context: "state window end".to_string(),
                expected,
                found: axis.end().unwrap_or(axis.start()),
            });
        }
        self.build_timed(DatasetKind::State, series, axis)
    }

    fn build_timed(
        &self,
        kind: DatasetKind,
        series: &SeriesTable,
        axis: TimeAxis,
    ) -> Result<Dataset, DatasetError> {
        let mut ds = self.empty(kind, Some(axis));
        let mut dims = vec![TIME_DIM];
        let mut shape = vec![axis.len()];
        for (d, n) in self.units.dims() {
            dims.push(d);
            shape.push(n);
        }

        let n_units = self.units.len();
        for variable in Variable::ALL {
            let mut values = vec![f64::NAN; axis.len() * n_units];
            for (k, unit) in self.domain.units().iter().enumerate() {
                let Some(s) = series.get(&unit.key, variable) else {
                    if unit.active {
                        return Err(DatasetError::MissingSeries {
                            variable: variable.name().to_string(),
                            unit: self.units.describe(&unit.key),
                        });
                    }
                    continue;
                };
                self.check_series(variable, &unit.key, s, axis)?;
                for (t, &v) in s.values().iter().enumerate() {
                    values[t * n_units + k] = v;
                }
            }
            ds.push_variable(DataVariable::new(
                variable.name(),
                &dims,
                VariableData::F64(shaped(&shape, values, variable.name())?),
                variable.units_attr(),
                variable.long_name(),
            ))?;
        }

        info!(
            dataset = kind.name(),
            start = %axis.start(),
            n_days = axis.len(),
            n_units,
            "assembled dataset"
        );
        Ok(ds)
    }

    fn check_series(
        &self,
        variable: Variable,
        key: &UnitKey,
        s: &DailySeries,
        axis: TimeAxis,
    ) -> Result<(), DatasetError> {
        if s.len() != axis.len() {
            return Err(DatasetError::ShapeMismatch {
                variable: variable.name().to_string(),
                unit: self.units.describe(key),
                expected: axis.len(),
                got: s.len(),
            });
        }
        if !s.is_empty() && s.start() != axis.start() {
            return Err(DatasetError::Alignment {
                context: format!("'{variable}' at unit {}", self.units.describe(key)),
                expected: axis.start(),
                found: s.start(),
            });
        }
        Ok(())
    }

    fn empty(&self, kind: DatasetKind, time: Option<TimeAxis>) -> Dataset {
        let mut ds = Dataset::new(kind, self.units.clone(), time);
        if let (Some(key), false) = (&self.join_key, self.units.is_grid()) {
            ds.set_attr("join_key", key.clone());
        }
        ds
    }
}

fn shaped<T>(shape: &[usize], values: Vec<T>, name: &str) -> Result<ArrayD<T>, DatasetError> {
    let got = values.len();
    ArrayD::from_shape_vec(IxDyn(shape), values).map_err(|_| DatasetError::VariableShape {
        name: name.to_string(),
        shape: vec![got],
        expected: shape.to_vec(),
    })
}
