//! In-memory representation of a dimensioned dataset.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use metprep_calendar::TimeAxis;
use ndarray::ArrayD;

use crate::error::DatasetError;
use crate::spatial::SpatialUnits;

/// Dimension name of the daily time axis.
pub const TIME_DIM: &str = "time";

/// Which of the three driver inputs a dataset is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatasetKind {
    /// Time-varying meteorology over the run period.
    Forcing,
    /// Static per-unit attributes.
    Domain,
    /// Trailing spin-up window before the run.
    State,
}

impl DatasetKind {
    /// All kinds in assembly order.
    pub const ALL: [DatasetKind; 3] = [Self::Forcing, Self::Domain, Self::State];

    /// Lowercase name, also stored as the `dataset` global attribute.
    pub fn name(self) -> &'static str {
        match self {
            Self::Forcing => "forcing",
            Self::Domain => "domain",
            Self::State => "state",
        }
    }

    /// `true` for datasets with a `time` dimension.
    pub fn has_time(self) -> bool {
        !matches!(self, Self::Domain)
    }
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DatasetKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "forcing" => Ok(Self::Forcing),
            "domain" => Ok(Self::Domain),
            "state" => Ok(Self::State),
            other => Err(format!("unknown dataset kind '{other}'")),
        }
    }
}

/// Element type of a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DType {
    /// 64-bit float.
    F64,
    /// 32-bit signed integer.
    I32,
}

/// Values of a variable laid out along its dimensions.
#[derive(Debug, Clone, PartialEq)]
pub enum VariableData {
    /// Floating-point values; `NaN` marks missing.
    F64(ArrayD<f64>),
    /// Integer values.
    I32(ArrayD<i32>),
}

impl VariableData {
    /// Array shape.
    pub fn shape(&self) -> &[usize] {
        match self {
            Self::F64(a) => a.shape(),
            Self::I32(a) => a.shape(),
        }
    }

    /// Element type.
    pub fn dtype(&self) -> DType {
        match self {
            Self::F64(_) => DType::F64,
            Self::I32(_) => DType::I32,
        }
    }

    /// The float array, if this is one.
    pub fn as_f64(&self) -> Option<&ArrayD<f64>> {
        match self {
            Self::F64(a) => Some(a),
            Self::I32(_) => None,
        }
    }

    /// The integer array, if this is one.
    pub fn as_i32(&self) -> Option<&ArrayD<i32>> {
        match self {
            Self::I32(a) => Some(a),
            Self::F64(_) => None,
        }
    }

    /// Min, max and missing count over all elements.
    pub fn summary(&self) -> Summary {
        match self {
            Self::F64(a) => Summary::from_values(a.iter().copied()),
            Self::I32(a) => Summary::from_values(a.iter().map(|&v| f64::from(v))),
        }
    }
}

/// Basic statistics of a variable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    /// Number of elements.
    pub len: usize,
    /// Number of `NaN` elements.
    pub missing: usize,
    /// Smallest finite value, `NaN` when none.
    pub min: f64,
    /// Largest finite value, `NaN` when none.
    pub max: f64,
}

impl Summary {
    fn from_values(values: impl Iterator<Item = f64>) -> Self {
        let mut s = Summary {
            len: 0,
            missing: 0,
            min: f64::NAN,
            max: f64::NAN,
        };
        for v in values {
            s.len += 1;
            if v.is_nan() {
                s.missing += 1;
                continue;
            }
            // f64::min/max ignore a NaN operand.
            s.min = s.min.min(v);
            s.max = s.max.max(v);
        }
        s
    }
}

/// One named variable with its dimensions and CF attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct DataVariable {
    name: String,
    dims: Vec<String>,
    data: VariableData,
    units: String,
    long_name: String,
}

impl DataVariable {
    /// Creates a variable. Shape is checked when added to a [`Dataset`].
    pub fn new(
        name: impl Into<String>,
        dims: &[&str],
        data: VariableData,
        units: impl Into<String>,
        long_name: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            dims: dims.iter().map(|d| d.to_string()).collect(),
            data,
            units: units.into(),
            long_name: long_name.into(),
        }
    }

    /// Variable name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Dimension names in array order.
    pub fn dims(&self) -> &[String] {
        &self.dims
    }

    /// Values.
    pub fn data(&self) -> &VariableData {
        &self.data
    }

    /// `units` attribute.
    pub fn units(&self) -> &str {
        &self.units
    }

    /// `long_name` attribute.
    pub fn long_name(&self) -> &str {
        &self.long_name
    }
}

/// A forcing, domain or state dataset ready for persistence.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    kind: DatasetKind,
    units: SpatialUnits,
    time: Option<TimeAxis>,
    variables: Vec<DataVariable>,
    attrs: BTreeMap<String, String>,
}

impl Dataset {
    /// Creates an empty dataset over `units` and an optional time axis.
    ///
    /// The `title`, `dataset` and `Conventions` global attributes are set.
    pub fn new(kind: DatasetKind, units: SpatialUnits, time: Option<TimeAxis>) -> Self {
        let mut attrs = BTreeMap::new();
        attrs.insert("title".to_string(), format!("metprep {kind} dataset"));
        attrs.insert("dataset".to_string(), kind.name().to_string());
        attrs.insert("Conventions".to_string(), "CF-1.8".to_string());
        Self {
            kind,
            units,
            time,
            variables: Vec::new(),
            attrs,
        }
    }

    /// Sets a global attribute.
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    /// Sets a global attribute in place.
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attrs.insert(name.into(), value.into());
    }

    /// Adds a variable after checking its dimensions.
    ///
    /// # Errors
    ///
    /// - [`DatasetError::UnknownDimension`] if a dimension is not defined.
    /// - [`DatasetError::VariableShape`] if the array shape does not match.
    pub fn push_variable(&mut self, var: DataVariable) -> Result<(), DatasetError> {
        let mut expected = Vec::with_capacity(var.dims.len());
        for dim in &var.dims {
            let len = self
                .dim_len(dim)
                .ok_or_else(|| DatasetError::UnknownDimension {
                    name: var.name.clone(),
                    dim: dim.clone(),
                })?;
            expected.push(len);
        }
        if var.data.shape() != expected.as_slice() {
            return Err(DatasetError::VariableShape {
                name: var.name.clone(),
                shape: var.data.shape().to_vec(),
                expected,
            });
        }
        self.variables.push(var);
        Ok(())
    }

    /// Which dataset this is.
    pub fn kind(&self) -> DatasetKind {
        self.kind
    }

    /// Spatial units.
    pub fn units(&self) -> &SpatialUnits {
        &self.units
    }

    /// Daily axis, for forcing and state.
    pub fn time(&self) -> Option<TimeAxis> {
        self.time
    }

    /// Variables in insertion order.
    pub fn variables(&self) -> &[DataVariable] {
        &self.variables
    }

    /// Variable by name.
    pub fn variable(&self, name: &str) -> Option<&DataVariable> {
        self.variables.iter().find(|v| v.name == name)
    }

    /// Global attributes.
    pub fn attrs(&self) -> &BTreeMap<String, String> {
        &self.attrs
    }

    /// Global attribute by name.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    /// Dimensions with sizes: `time` first when present, then spatial.
    pub fn dims(&self) -> Vec<(&'static str, usize)> {
        let mut dims = Vec::with_capacity(3);
        if let Some(axis) = self.time {
            dims.push((TIME_DIM, axis.len()));
        }
        dims.extend(self.units.dims());
        dims
    }

    /// Size of dimension `name`.
    pub fn dim_len(&self, name: &str) -> Option<usize> {
        self.dims()
            .into_iter()
            .find(|(d, _)| *d == name)
            .map(|(_, n)| n)
    }
}
