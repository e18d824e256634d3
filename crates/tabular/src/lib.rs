//! # metprep-tabular
//!
//! Load raw observation CSV exports, resolve their unit-embedding column
//! labels through an explicit [`ColumnMap`], and extract per-variable daily
//! series ready for transformation and assembly.

mod attributes;
mod columns;
mod error;
mod extract;
mod loader;
mod table;
mod units;

use std::path::Path;

pub use attributes::{AttributeColumns, UnitRecord, load_unit_records};
pub use columns::{ColumnMap, ColumnSpec, DateColumn};
pub use error::TabularError;
pub use extract::{Observations, RawSeries, extract_observations};
pub use loader::{LoaderConfig, load_table};
pub use table::{Record, Table};
pub use units::{MM_PER_INCH, Quantity, Unit, Variable};

/// Loads `path` and extracts every mapped variable in one step.
///
/// The column map is validated against the header before any row is
/// interpreted.
///
/// # Errors
///
/// See [`load_table`] and [`extract_observations`].
pub fn load_observations(
    path: &Path,
    loader: &LoaderConfig,
    columns: &ColumnMap,
    date: &DateColumn,
) -> Result<Observations, TabularError> {
    let table = load_table(path, loader)?;
    columns.validate(&table)?;
    extract_observations(&table, columns, date)
}
