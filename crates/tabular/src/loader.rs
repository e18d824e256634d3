//! CSV loading with discarded metadata rows.

use std::path::Path;

use tracing::debug;

use crate::error::TabularError;
use crate::table::{Row, Table};

/// Configuration for reading a raw observation export.
///
/// The [`Default`] matches station exports that carry two metadata rows
/// above the header and no comment lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderConfig {
    /// Rows discarded before the header row.
    skip_rows: usize,
    /// Lines starting with this byte are ignored entirely.
    comment: Option<u8>,
    /// Field delimiter.
    delimiter: u8,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            skip_rows: 2,
            comment: None,
            delimiter: b',',
        }
    }
}

impl LoaderConfig {
    /// Sets the number of metadata rows to discard.
    pub fn with_skip_rows(mut self, n: usize) -> Self {
        self.skip_rows = n;
        self
    }

    /// Sets the comment byte (e.g. `b'#'`), or `None` to disable.
    pub fn with_comment(mut self, comment: Option<u8>) -> Self {
        self.comment = comment;
        self
    }

    /// Sets the field delimiter.
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Number of metadata rows discarded.
    pub fn skip_rows(&self) -> usize {
        self.skip_rows
    }
}

fn csv_error(path: &Path, e: csv::Error) -> TabularError {
    TabularError::Csv {
        path: path.to_path_buf(),
        reason: e.to_string(),
    }
}

/// Reads `path` into a [`Table`], preserving row order.
///
/// The first `skip_rows` records are discarded, the next one is the header.
/// Fields are kept verbatim, so header labels retain trailing spaces.
///
/// # Errors
///
/// - [`TabularError::FileNotFound`] if the path does not exist.
/// - [`TabularError::MissingHeader`] if the file ends before the header.
/// - [`TabularError::MalformedInput`] if a row's field count differs from
///   the header's.
/// - [`TabularError::Csv`] for unreadable content.
pub fn load_table(path: &Path, config: &LoaderConfig) -> Result<Table, TabularError> {
    if !path.exists() {
        return Err(TabularError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::None)
        .delimiter(config.delimiter)
        .comment(config.comment)
        .from_path(path)
        .map_err(|e| csv_error(path, e))?;

    let mut records = reader.records();

    let missing_header = || TabularError::MissingHeader {
        path: path.to_path_buf(),
        skipped: config.skip_rows,
    };

    for _ in 0..config.skip_rows {
        records
            .next()
            .ok_or_else(missing_header)?
            .map_err(|e| csv_error(path, e))?;
    }

    let header: Vec<String> = records
        .next()
        .ok_or_else(missing_header)?
        .map_err(|e| csv_error(path, e))?
        .iter()
        .map(str::to_string)
        .collect();

    let mut rows = Vec::new();
    for result in records {
        let record = result.map_err(|e| csv_error(path, e))?;
        let line = record.position().map_or(0, |p| p.line());
        if record.len() != header.len() {
            return Err(TabularError::MalformedInput {
                path: path.to_path_buf(),
                line,
                reason: format!(
                    "expected {} fields, found {}",
                    header.len(),
                    record.len()
                ),
            });
        }
        rows.push(Row {
            line,
            fields: record.iter().map(str::to_string).collect(),
        });
    }

    debug!(
        path = %path.display(),
        n_columns = header.len(),
        n_rows = rows.len(),
        "loaded table"
    );

    Ok(Table::new(path.to_path_buf(), header, rows))
}
