//! Per-variable extraction of dated series from a loaded table.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use metprep_calendar::{CalendarError, DailySeries, TimeAxis, parse_date};
use tracing::debug;

use crate::columns::{ColumnMap, DateColumn};
use crate::error::TabularError;
use crate::table::Table;
use crate::units::{Unit, Variable};

/// A variable's series still in the unit of its source column.
///
/// Conversion consumes the value ([`into_target_units`]), so a series can
/// be normalised only once.
///
/// [`into_target_units`]: RawSeries::into_target_units
#[derive(Debug, Clone, PartialEq)]
pub struct RawSeries {
    variable: Variable,
    unit: Unit,
    series: DailySeries,
}

impl RawSeries {
    /// Wraps `series` recorded in `unit`.
    ///
    /// # Errors
    ///
    /// Returns [`TabularError::IncompatibleUnit`] if `unit` does not suit
    /// `variable`.
    pub fn new(variable: Variable, unit: Unit, series: DailySeries) -> Result<Self, TabularError> {
        variable.check_unit(unit)?;
        Ok(Self {
            variable,
            unit,
            series,
        })
    }

    /// The canonical variable.
    pub fn variable(&self) -> Variable {
        self.variable
    }

    /// Source unit.
    pub fn unit(&self) -> Unit {
        self.unit
    }

    /// The dated values in source units.
    pub fn series(&self) -> &DailySeries {
        &self.series
    }

    /// Replaces the series, keeping variable and unit.
    pub fn map_series(self, f: impl FnOnce(DailySeries) -> DailySeries) -> Self {
        Self {
            variable: self.variable,
            unit: self.unit,
            series: f(self.series),
        }
    }

    /// Converts to the variable's target unit (mm or °C).
    pub fn into_target_units(self) -> DailySeries {
        let unit = self.unit;
        self.series.map(|v| unit.to_target(v))
    }
}

/// Every mapped variable from one export, on a shared daily axis.
#[derive(Debug, Clone)]
pub struct Observations {
    path: PathBuf,
    axis: TimeAxis,
    series: BTreeMap<Variable, RawSeries>,
}

impl Observations {
    /// Source file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The contiguous axis of the file's rows.
    pub fn axis(&self) -> TimeAxis {
        self.axis
    }

    /// Raw series for `variable`.
    pub fn get(&self, variable: Variable) -> Option<&RawSeries> {
        self.series.get(&variable)
    }

    /// Variables present.
    pub fn variables(&self) -> impl Iterator<Item = Variable> + '_ {
        self.series.keys().copied()
    }
}

/// Parses dates and mapped columns out of `table`.
///
/// Dates must form a gap-free daily sequence. Blank cells become `NaN`.
///
/// # Errors
///
/// - [`TabularError::MissingColumns`] if the date column or any mapped
///   label is absent (all absent labels are listed).
/// - [`TabularError::MalformedInput`] for an unparseable date, a date that
///   does not follow its predecessor by exactly one day, a non-numeric
///   value, or an empty table.
pub fn extract_observations(
    table: &Table,
    columns: &ColumnMap,
    date: &DateColumn,
) -> Result<Observations, TabularError> {
    let mut labels = vec![date.label()];
    labels.extend(columns.iter().map(|(_, spec)| spec.label()));
    let indices = table.require_columns(&labels)?;
    let date_idx = indices[0];

    let mut dates: Vec<NaiveDate> = Vec::with_capacity(table.len());
    let mut lines: Vec<u64> = Vec::with_capacity(table.len());
    for record in table.records() {
        let parsed = parse_date(record.field(date_idx), date.format())
            .map_err(|e| table.malformed(record.line(), e.to_string()))?;
        dates.push(parsed);
        lines.push(record.line());
    }

    let axis = match TimeAxis::from_dates(&dates) {
        Ok(Some(axis)) => axis,
        Ok(None) => return Err(table.malformed(0, "no data rows")),
        Err(CalendarError::Gap {
            index,
            previous,
            found,
        }) => {
            return Err(table.malformed(
                lines[index],
                format!("date {found} does not follow {previous} by one day"),
            ));
        }
        Err(e) => return Err(table.malformed(lines[0], e.to_string())),
    };

    let mut series = BTreeMap::new();
    for ((variable, spec), &col_idx) in columns.iter().zip(&indices[1..]) {
        let values = table
            .records()
            .map(|record| record.number(col_idx))
            .collect::<Result<Vec<_>, _>>()?;
        let n_missing = values.iter().filter(|v| v.is_nan()).count();
        debug!(
            path = %table.path().display(),
            variable = %variable,
            unit = %spec.unit(),
            n_missing,
            "extracted column"
        );
        let daily = DailySeries::from_start(axis.start(), values);
        series.insert(variable, RawSeries::new(variable, spec.unit(), daily)?);
    }

    Ok(Observations {
        path: table.path().to_path_buf(),
        axis,
        series,
    })
}
