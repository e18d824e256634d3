//! Low-level NetCDF extraction helpers.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::NaiveDate;
use metprep_calendar::{TimeAxis, add_days};
use netcdf::AttributeValue;

use crate::error::IoError;

/// Calendars whose day arithmetic is plain Gregorian.
const GREGORIAN: &[&str] = &["standard", "gregorian", "proleptic_gregorian"];

/// Open a NetCDF file at `path`, returning [`IoError::FileNotFound`] if the
/// path does not exist on disk.
pub(crate) fn open_file(path: &Path) -> Result<netcdf::File, IoError> {
    if !path.exists() {
        return Err(IoError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    Ok(netcdf::open(path)?)
}

fn variable<'f>(
    file: &'f netcdf::File,
    name: &str,
    path: &Path,
) -> Result<netcdf::Variable<'f>, IoError> {
    file.variable(name).ok_or_else(|| IoError::MissingVariable {
        name: name.to_string(),
        path: path.to_path_buf(),
    })
}

/// Length of dimension `name`, if defined.
pub(crate) fn dimension_len(file: &netcdf::File, name: &str) -> Option<usize> {
    file.dimension(name).map(|d| d.len())
}

/// Read a 1-D `f64` variable.
pub(crate) fn read_1d_f64(
    file: &netcdf::File,
    name: &str,
    path: &Path,
) -> Result<Vec<f64>, IoError> {
    Ok(variable(file, name, path)?.get_values::<f64, _>(..)?)
}

/// Read `len` entries of a 1-D string variable.
pub(crate) fn read_strings(
    file: &netcdf::File,
    name: &str,
    len: usize,
    path: &Path,
) -> Result<Vec<String>, IoError> {
    let var = variable(file, name, path)?;
    (0..len)
        .map(|i| var.get_string([i]).map_err(IoError::from))
        .collect()
}

/// Check that variable `name` spans exactly `expected` dimensions, in order,
/// and return its shape.
fn check_dims(
    var: &netcdf::Variable<'_>,
    name: &str,
    expected: &[(&str, usize)],
) -> Result<Vec<usize>, IoError> {
    let dims = var.dimensions();
    if dims.len() != expected.len() {
        return Err(IoError::DimensionMismatch {
            name: format!("{name} dimensions"),
            expected: expected.len(),
            got: dims.len(),
        });
    }
    for (d, (want, len)) in dims.iter().zip(expected) {
        if d.name() != *want {
            return Err(IoError::Validation {
                count: 1,
                details: format!("variable '{name}' has dimension '{}', expected '{want}'", d.name()),
            });
        }
        if d.len() != *len {
            return Err(IoError::DimensionMismatch {
                name: want.to_string(),
                expected: *len,
                got: d.len(),
            });
        }
    }
    Ok(expected.iter().map(|(_, n)| *n).collect())
}

/// Read an N-D `f64` variable laid out along `dims`.
pub(crate) fn read_nd_f64(
    file: &netcdf::File,
    name: &str,
    dims: &[(&str, usize)],
    path: &Path,
) -> Result<(Vec<f64>, Vec<usize>), IoError> {
    let var = variable(file, name, path)?;
    let shape = check_dims(&var, name, dims)?;
    let data = if shape.contains(&0) {
        Vec::new()
    } else {
        var.get_values::<f64, _>(..)?
    };
    Ok((data, shape))
}

/// Read an N-D `i32` variable laid out along `dims`.
pub(crate) fn read_nd_i32(
    file: &netcdf::File,
    name: &str,
    dims: &[(&str, usize)],
    path: &Path,
) -> Result<(Vec<i32>, Vec<usize>), IoError> {
    let var = variable(file, name, path)?;
    let shape = check_dims(&var, name, dims)?;
    let data = if shape.contains(&0) {
        Vec::new()
    } else {
        var.get_values::<i32, _>(..)?
    };
    Ok((data, shape))
}

/// String value of attribute `attr` on variable `name`, or an empty string.
pub(crate) fn variable_text_attr(file: &netcdf::File, name: &str, attr: &str) -> String {
    file.variable(name)
        .and_then(|v| v.attribute_value(attr))
        .and_then(|res| res.ok())
        .and_then(|av| match av {
            AttributeValue::Str(s) => Some(s),
            _ => None,
        })
        .unwrap_or_default()
}

/// All string-valued global attributes.
pub(crate) fn global_text_attrs(file: &netcdf::File) -> BTreeMap<String, String> {
    file.attributes()
        .filter_map(|a| match a.value() {
            Ok(AttributeValue::Str(s)) => Some((a.name().to_string(), s)),
            _ => None,
        })
        .collect()
}

/// Parse a CF `"days since YYYY-MM-DD[ HH:MM:SS]"` units string.
pub(crate) fn parse_time_units(units: &str) -> Result<NaiveDate, IoError> {
    let parts: Vec<&str> = units.splitn(3, ' ').collect();
    if parts.len() < 3 || parts[0] != "days" || parts[1] != "since" {
        return Err(IoError::InvalidTime {
            reason: format!("unexpected time units format: '{units}'"),
        });
    }

    // Take only the date portion.
    let date_str = parts[2].get(..10).unwrap_or(parts[2]);
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|e| IoError::InvalidTime {
        reason: format!("failed to parse base date '{date_str}': {e}"),
    })
}

/// Read the `time` coordinate as a contiguous daily axis.
///
/// # Errors
///
/// Returns [`IoError::InvalidTime`] for missing or unsupported units or
/// calendars, and [`IoError::Calendar`] if the offsets are not consecutive
/// days.
pub(crate) fn read_time_axis(
    file: &netcdf::File,
    time_var: &str,
    path: &Path,
) -> Result<TimeAxis, IoError> {
    let var = variable(file, time_var, path)?;

    let units = variable_text_attr(file, time_var, "units");
    if units.is_empty() {
        return Err(IoError::InvalidTime {
            reason: format!("time variable '{time_var}' has no 'units' attribute"),
        });
    }
    let base = parse_time_units(&units)?;

    let calendar = variable_text_attr(file, time_var, "calendar");
    if !calendar.is_empty() && !GREGORIAN.contains(&calendar.as_str()) {
        return Err(IoError::InvalidTime {
            reason: format!("unsupported calendar '{calendar}'"),
        });
    }

    let n = var.dimensions().first().map_or(0, |d| d.len());
    if n == 0 {
        return Ok(TimeAxis::from_start_len(base, 0));
    }

    let offsets = var.get_values::<i32, _>(..)?;
    let dates = offsets
        .iter()
        .map(|&d| add_days(base, i64::from(d)))
        .collect::<Result<Vec<_>, _>>()?;

    match TimeAxis::from_dates(&dates)? {
        Some(axis) => Ok(axis),
        None => Ok(TimeAxis::from_start_len(base, 0)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_units_plain_date() {
        let base = parse_time_units("days since 1970-01-01").unwrap();
        assert_eq!(base, NaiveDate::from_ymd_opt(1970, 1, 1).unwrap());
    }

    #[test]
    fn time_units_with_clock() {
        let base = parse_time_units("days since 2000-06-15 00:00:00").unwrap();
        assert_eq!(base, NaiveDate::from_ymd_opt(2000, 6, 15).unwrap());
    }

    #[test]
    fn time_units_rejects_other_steps() {
        assert!(matches!(
            parse_time_units("hours since 1970-01-01"),
            Err(IoError::InvalidTime { .. })
        ));
        assert!(parse_time_units("days").is_err());
        assert!(parse_time_units("days since yesterday").is_err());
    }

    #[test]
    fn open_missing_file() {
        let err = open_file(Path::new("/nonexistent/forcing.nc")).unwrap_err();
        assert!(matches!(err, IoError::FileNotFound { .. }));
    }
}
