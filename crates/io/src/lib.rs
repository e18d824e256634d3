//! # metprep-io
//!
//! Persist assembled datasets as CF-style NetCDF-4 files and read them back.
//! Writes go to a temporary sibling and are renamed into place, so a failed
//! write never leaves a partial file at the destination.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `writer` | `WriterConfig`, atomic `write_netcdf`, `NetcdfWriter` sink |
//! | `reader` | Schema-driven `read_dataset` |
//! | `netcdf_write` | Dimension, coordinate and variable emission |
//! | `netcdf_read` | Variable, attribute and time-axis extraction |
//! | `error` | Error types |

mod error;
mod netcdf_read;
mod netcdf_write;
mod reader;
mod writer;

pub use error::IoError;
pub use netcdf_write::TIME_UNITS;
pub use reader::{detect_kind, expected_variables, read_dataset};
pub use writer::{NetcdfWriter, WriterConfig, temp_path, write_netcdf};
