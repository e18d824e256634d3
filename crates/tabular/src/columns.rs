//! Mapping from canonical variables to raw export column labels.

use std::collections::BTreeMap;

use crate::error::TabularError;
use crate::table::Table;
use crate::units::{Unit, Variable};

/// Raw label and unit for one variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    label: String,
    unit: Unit,
}

impl ColumnSpec {
    /// The literal header label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Unit the column is recorded in.
    pub fn unit(&self) -> Unit {
        self.unit
    }
}

/// Explicit table from canonical variable to the label the export uses.
///
/// Labels are an exact contract with the upstream export format, trailing
/// whitespace included. The map is checked against a file's header once at
/// load time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap {
    entries: BTreeMap<Variable, ColumnSpec>,
}

impl Default for ColumnMap {
    /// Labels used by SNOTEL/SCAN daily station exports.
    fn default() -> Self {
        let entries = [
            (Variable::Precipitation, "PREC.I-1 (in) ", Unit::Inches),
            (Variable::TempMax, "TMAX.D-1 (degC) ", Unit::Celsius),
            (Variable::TempMin, "TMIN.D-1 (degC) ", Unit::Celsius),
        ]
        .into_iter()
        .map(|(var, label, unit)| {
            (
                var,
                ColumnSpec {
                    label: label.to_string(),
                    unit,
                },
            )
        })
        .collect();
        Self { entries }
    }
}

impl ColumnMap {
    /// An empty map.
    pub fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Maps `variable` to `label`, reading the unit from the label.
    ///
    /// # Errors
    ///
    /// Returns [`TabularError::UnknownUnit`] if the label has no unit, or
    /// [`TabularError::IncompatibleUnit`] if it does not suit the variable.
    pub fn with_column(self, variable: Variable, label: &str) -> Result<Self, TabularError> {
        let unit = Unit::from_label(label).ok_or_else(|| TabularError::UnknownUnit {
            label: label.to_string(),
        })?;
        self.with_column_unit(variable, label, unit)
    }

    /// Maps `variable` to `label` with an explicit unit.
    ///
    /// # Errors
    ///
    /// Returns [`TabularError::IncompatibleUnit`] if the unit does not suit
    /// the variable.
    pub fn with_column_unit(
        mut self,
        variable: Variable,
        label: &str,
        unit: Unit,
    ) -> Result<Self, TabularError> {
        variable.check_unit(unit)?;
        self.entries.insert(
            variable,
            ColumnSpec {
                label: label.to_string(),
                unit,
            },
        );
        Ok(self)
    }

    /// Spec for `variable`, if mapped.
    pub fn get(&self, variable: Variable) -> Option<&ColumnSpec> {
        self.entries.get(&variable)
    }

    /// Mapped variables in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (Variable, &ColumnSpec)> {
        self.entries.iter().map(|(&v, spec)| (v, spec))
    }

    /// Number of mapped variables.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when nothing is mapped.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Checks every mapped label against `table`'s header.
    ///
    /// # Errors
    ///
    /// Returns [`TabularError::MissingColumns`] naming every absent label.
    pub fn validate(&self, table: &Table) -> Result<(), TabularError> {
        let labels: Vec<&str> = self.entries.values().map(ColumnSpec::label).collect();
        table.require_columns(&labels).map(|_| ())
    }
}

/// Where and how dates are stored in an export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateColumn {
    label: String,
    format: String,
}

impl Default for DateColumn {
    fn default() -> Self {
        Self {
            label: "Date".into(),
            format: "%Y-%m-%d".into(),
        }
    }
}

impl DateColumn {
    /// Sets the header label of the date column.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Sets the chrono format string.
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = format.into();
        self
    }

    /// Header label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// chrono format string.
    pub fn format(&self) -> &str {
        &self.format
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_map_uses_snotel_labels() {
        let map = ColumnMap::default();
        assert_eq!(map.len(), 3);
        let prec = map.get(Variable::Precipitation).unwrap();
        assert_eq!(prec.label(), "PREC.I-1 (in) ");
        assert_eq!(prec.unit(), Unit::Inches);
        assert_eq!(map.get(Variable::TempMin).unwrap().label(), "TMIN.D-1 (degC) ");
    }

    #[test]
    fn with_column_infers_unit() {
        let map = ColumnMap::empty()
            .with_column(Variable::TempMax, "TMAX (degF)")
            .unwrap();
        assert_eq!(map.get(Variable::TempMax).unwrap().unit(), Unit::Fahrenheit);
    }

    #[test]
    fn with_column_without_unit_fails() {
        let err = ColumnMap::empty()
            .with_column(Variable::Precipitation, "PRECIP")
            .unwrap_err();
        assert!(matches!(err, TabularError::UnknownUnit { .. }));
    }

    #[test]
    fn with_column_wrong_quantity_fails() {
        let err = ColumnMap::empty()
            .with_column(Variable::Precipitation, "TOBS (degC)")
            .unwrap_err();
        assert!(matches!(err, TabularError::IncompatibleUnit { .. }));
    }

    #[test]
    fn date_column_defaults_and_builders() {
        let d = DateColumn::default();
        assert_eq!(d.label(), "Date");
        assert_eq!(d.format(), "%Y-%m-%d");
        let d = d.with_label("date").with_format("%m/%d/%Y");
        assert_eq!(d.label(), "date");
        assert_eq!(d.format(), "%m/%d/%Y");
    }
}
