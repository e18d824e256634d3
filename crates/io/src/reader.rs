//! Schema-driven read-back of persisted datasets.

use std::path::Path;

use metprep_dataset::{
    DType, DataVariable, Dataset, DatasetKind, HRU_DIM, LAT_DIM, LON_DIM, SpatialUnits, TIME_DIM,
    VariableData,
};
use metprep_tabular::Variable;
use ndarray::{ArrayD, IxDyn};
use tracing::info;

use crate::error::IoError;
use crate::netcdf_read;

/// Variables a dataset of `kind` must contain, with their element types.
pub fn expected_variables(kind: DatasetKind, grid: bool) -> Vec<(&'static str, DType)> {
    match kind {
        DatasetKind::Forcing | DatasetKind::State => {
            Variable::ALL.iter().map(|v| (v.name(), DType::F64)).collect()
        }
        DatasetKind::Domain => {
            let mut vars = vec![("elev", DType::F64), ("mask", DType::I32)];
            if !grid {
                vars.push(("lat", DType::F64));
                vars.push(("lon", DType::F64));
            }
            vars
        }
    }
}

/// Kind recorded in the `dataset` global attribute of `path`.
///
/// # Errors
///
/// Returns [`IoError::MissingAttribute`] if the attribute is absent and
/// [`IoError::Validation`] if it names no known kind.
pub fn detect_kind(path: &Path) -> Result<DatasetKind, IoError> {
    let file = netcdf_read::open_file(path)?;
    kind_from_attrs(&file, path)
}

fn kind_from_attrs(file: &netcdf::File, path: &Path) -> Result<DatasetKind, IoError> {
    let attrs = netcdf_read::global_text_attrs(file);
    let value = attrs.get("dataset").ok_or_else(|| IoError::MissingAttribute {
        name: "dataset".to_string(),
        path: path.to_path_buf(),
    })?;
    value
        .parse()
        .map_err(|details| IoError::Validation { count: 1, details })
}

/// Read a persisted forcing, domain or state dataset.
///
/// With `kind` as `None` the kind is taken from the `dataset` global
/// attribute. Structured and unstructured layouts are told apart by the
/// presence of an `hru` dimension.
///
/// # Errors
///
/// Returns [`IoError`] on missing variables or attributes, dimension
/// mismatches, or invalid time coordinates.
pub fn read_dataset(path: &Path, kind: Option<DatasetKind>) -> Result<Dataset, IoError> {
    let file = netcdf_read::open_file(path)?;
    let kind = match kind {
        Some(k) => k,
        None => kind_from_attrs(&file, path)?,
    };

    // -- Spatial units ------------------------------------------------------

    let units = match netcdf_read::dimension_len(&file, HRU_DIM) {
        Some(n) => SpatialUnits::hru(netcdf_read::read_strings(&file, HRU_DIM, n, path)?)?,
        None => SpatialUnits::grid(
            netcdf_read::read_1d_f64(&file, LAT_DIM, path)?,
            netcdf_read::read_1d_f64(&file, LON_DIM, path)?,
        )?,
    };

    // -- Time ---------------------------------------------------------------

    let time = if kind.has_time() {
        Some(netcdf_read::read_time_axis(&file, TIME_DIM, path)?)
    } else {
        None
    };

    let mut ds = Dataset::new(kind, units, time);
    for (name, value) in netcdf_read::global_text_attrs(&file) {
        ds.set_attr(name, value);
    }

    // -- Data variables -----------------------------------------------------

    // Unstructured lat/lon data variables span `hru`, the only dimension of
    // an unstructured domain.
    let dims = ds.dims();
    let dim_names: Vec<&str> = dims.iter().map(|(d, _)| *d).collect();
    for (name, dtype) in expected_variables(kind, ds.units().is_grid()) {
        let data = match dtype {
            DType::F64 => {
                let (values, shape) = netcdf_read::read_nd_f64(&file, name, &dims, path)?;
                VariableData::F64(to_array(name, &shape, values)?)
            }
            DType::I32 => {
                let (values, shape) = netcdf_read::read_nd_i32(&file, name, &dims, path)?;
                VariableData::I32(to_array(name, &shape, values)?)
            }
        };

        ds.push_variable(DataVariable::new(
            name,
            &dim_names,
            data,
            netcdf_read::variable_text_attr(&file, name, "units"),
            netcdf_read::variable_text_attr(&file, name, "long_name"),
        ))?;
    }

    info!(
        path = %path.display(),
        dataset = %kind,
        n_units = ds.units().len(),
        n_days = ds.time().map_or(0, |t| t.len()),
        "read dataset"
    );

    Ok(ds)
}

fn to_array<T>(name: &str, shape: &[usize], values: Vec<T>) -> Result<ArrayD<T>, IoError> {
    let got = values.len();
    ArrayD::from_shape_vec(IxDyn(shape), values).map_err(|_| IoError::DimensionMismatch {
        name: format!("{name} values"),
        expected: shape.iter().product(),
        got,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forcing_schema() {
        let vars = expected_variables(DatasetKind::Forcing, true);
        let names: Vec<&str> = vars.iter().map(|(n, _)| *n).collect();
        assert_eq!(names, vec!["prec", "t_max", "t_min"]);
    }

    #[test]
    fn domain_schema_depends_on_layout() {
        assert_eq!(expected_variables(DatasetKind::Domain, true).len(), 2);
        let hru = expected_variables(DatasetKind::Domain, false);
        assert_eq!(hru.len(), 4);
        assert_eq!(hru[1], ("mask", DType::I32));
    }
}
