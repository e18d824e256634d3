//! Low-level NetCDF emission helpers.

use metprep_calendar::TimeAxis;
use metprep_dataset::{
    DataVariable, Dataset, HRU_DIM, LAT_DIM, LON_DIM, SpatialUnits, TIME_DIM, VariableData,
};

use crate::error::IoError;

/// CF units string of the `time` coordinate.
pub const TIME_UNITS: &str = "days since 1970-01-01";

/// Write every dimension, coordinate, variable and global attribute of
/// `ds` into an open file.
pub(crate) fn write_dataset(
    file: &mut netcdf::FileMut,
    ds: &Dataset,
    deflate_level: Option<u8>,
) -> Result<(), IoError> {
    for (name, value) in ds.attrs() {
        file.add_attribute(name, value.as_str())?;
    }

    for (name, len) in ds.dims() {
        file.add_dimension(name, len)?;
    }

    if let Some(axis) = ds.time() {
        write_time(file, axis)?;
    }
    write_spatial(file, ds.units())?;

    for var in ds.variables() {
        write_variable(file, var, deflate_level)?;
    }

    Ok(())
}

/// Write the `time` coordinate as integer days since the epoch.
fn write_time(file: &mut netcdf::FileMut, axis: TimeAxis) -> Result<(), IoError> {
    let values = axis
        .epoch_days()
        .into_iter()
        .map(|d| {
            i32::try_from(d).map_err(|_| IoError::InvalidTime {
                reason: format!("{d} days since 1970-01-01 does not fit in i32"),
            })
        })
        .collect::<Result<Vec<i32>, _>>()?;

    let mut var = file.add_variable::<i32>(TIME_DIM, &[TIME_DIM])?;
    var.put_attribute("standard_name", "time")?;
    var.put_attribute("long_name", "time")?;
    var.put_attribute("units", TIME_UNITS)?;
    var.put_attribute("calendar", "standard")?;
    if !values.is_empty() {
        var.put_values(&values, ..)?;
    }
    Ok(())
}

/// Write `lat`/`lon` coordinates for grids, or the `hru` identifier
/// variable for unstructured units.
fn write_spatial(file: &mut netcdf::FileMut, units: &SpatialUnits) -> Result<(), IoError> {
    match units {
        SpatialUnits::Grid { lats, lons } => {
            let mut lat = file.add_variable::<f64>(LAT_DIM, &[LAT_DIM])?;
            lat.put_attribute("standard_name", "latitude")?;
            lat.put_attribute("long_name", "latitude")?;
            lat.put_attribute("units", "degrees_north")?;
            lat.put_values(lats, ..)?;

            let mut lon = file.add_variable::<f64>(LON_DIM, &[LON_DIM])?;
            lon.put_attribute("standard_name", "longitude")?;
            lon.put_attribute("long_name", "longitude")?;
            lon.put_attribute("units", "degrees_east")?;
            lon.put_values(lons, ..)?;
        }
        SpatialUnits::Hru { ids } => {
            let mut var = file.add_string_variable(HRU_DIM, &[HRU_DIM])?;
            var.put_attribute("long_name", "hydrologic response unit")?;
            var.put_attribute("cf_role", "timeseries_id")?;
            for (i, id) in ids.iter().enumerate() {
                var.put_string(id, [i])?;
            }
        }
    }
    Ok(())
}

/// Write one data variable with its `units` and `long_name` attributes.
fn write_variable(
    file: &mut netcdf::FileMut,
    var: &DataVariable,
    deflate_level: Option<u8>,
) -> Result<(), IoError> {
    let dims: Vec<&str> = var.dims().iter().map(String::as_str).collect();
    let empty = var.data().shape().contains(&0);

    match var.data() {
        VariableData::F64(a) => {
            let mut v = file.add_variable::<f64>(var.name(), &dims)?;
            if let Some(level) = deflate_level
                && !empty
            {
                v.set_compression(i32::from(level), true)?;
            }
            v.put_attribute("units", var.units())?;
            v.put_attribute("long_name", var.long_name())?;
            if !empty {
                // Logical iteration order is row-major.
                let flat: Vec<f64> = a.iter().copied().collect();
                v.put_values(&flat, ..)?;
            }
        }
        VariableData::I32(a) => {
            let mut v = file.add_variable::<i32>(var.name(), &dims)?;
            if let Some(level) = deflate_level
                && !empty
            {
                v.set_compression(i32::from(level), true)?;
            }
            v.put_attribute("units", var.units())?;
            v.put_attribute("long_name", var.long_name())?;
            if !empty {
                let flat: Vec<i32> = a.iter().copied().collect();
                v.put_values(&flat, ..)?;
            }
        }
    }
    Ok(())
}
