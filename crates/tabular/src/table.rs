//! Parsed CSV rows keyed by column label.

use std::path::{Path, PathBuf};

use crate::error::TabularError;

/// One data row together with its source line.
#[derive(Debug, Clone)]
pub(crate) struct Row {
    pub(crate) line: u64,
    pub(crate) fields: Vec<String>,
}

/// A loaded CSV export: header labels plus rows in file order.
///
/// Every row has exactly as many fields as the header; the loader
/// guarantees this.
#[derive(Debug, Clone)]
pub struct Table {
    path: PathBuf,
    header: Vec<String>,
    rows: Vec<Row>,
}

/// Borrowed view of one row, addressed by label.
#[derive(Debug, Clone, Copy)]
pub struct Record<'a> {
    table: &'a Table,
    row: &'a Row,
}

impl Table {
    pub(crate) fn new(path: PathBuf, header: Vec<String>, rows: Vec<Row>) -> Self {
        Self { path, header, rows }
    }

    /// Source file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Header labels exactly as written, whitespace included.
    pub fn header(&self) -> &[String] {
        &self.header
    }

    /// Number of data rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` when there are no data rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of `label` in the header. Matching is literal.
    pub fn column_index(&self, label: &str) -> Option<usize> {
        self.header.iter().position(|h| h == label)
    }

    /// Resolves every label, reporting all absent ones at once.
    ///
    /// # Errors
    ///
    /// Returns [`TabularError::MissingColumns`] listing each missing label.
    pub fn require_columns(&self, labels: &[&str]) -> Result<Vec<usize>, TabularError> {
        let mut indices = Vec::with_capacity(labels.len());
        let mut missing = Vec::new();
        for &label in labels {
            match self.column_index(label) {
                Some(i) => indices.push(i),
                None => missing.push(label.to_string()),
            }
        }
        if missing.is_empty() {
            Ok(indices)
        } else {
            Err(TabularError::MissingColumns {
                path: self.path.clone(),
                columns: missing,
            })
        }
    }

    /// Iterates rows in file order.
    pub fn records(&self) -> impl Iterator<Item = Record<'_>> {
        self.rows.iter().map(move |row| Record { table: self, row })
    }

    /// Builds a [`TabularError::MalformedInput`] for this file.
    pub(crate) fn malformed(&self, line: u64, reason: impl Into<String>) -> TabularError {
        TabularError::MalformedInput {
            path: self.path.clone(),
            line,
            reason: reason.into(),
        }
    }
}

impl<'a> Record<'a> {
    /// Source line of the row.
    pub fn line(&self) -> u64 {
        self.row.line
    }

    /// Field under `label`, or `None` if the table has no such column.
    pub fn get(&self, label: &str) -> Option<&'a str> {
        self.table
            .column_index(label)
            .map(|i| self.row.fields[i].as_str())
    }

    /// Field at a resolved column index.
    pub fn field(&self, index: usize) -> &'a str {
        &self.row.fields[index]
    }

    /// Parses the field at `index` as a number.
    ///
    /// A blank field is a missing observation and yields `NaN`.
    ///
    /// # Errors
    ///
    /// Returns [`TabularError::MalformedInput`] for anything else that is
    /// not a number.
    pub fn number(&self, index: usize) -> Result<f64, TabularError> {
        let raw = self.field(index);
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(f64::NAN);
        }
        trimmed.parse::<f64>().map_err(|_| {
            self.table.malformed(
                self.line(),
                format!(
                    "column {:?}: '{raw}' is not a number",
                    self.table.header[index]
                ),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> Table {
        Table::new(
            PathBuf::from("obs.csv"),
            vec!["Date".into(), "PREC.I-1 (in) ".into()],
            vec![
                Row {
                    line: 4,
                    fields: vec!["2010-01-01".into(), "0.5".into()],
                },
                Row {
                    line: 5,
                    fields: vec!["2010-01-02".into(), " ".into()],
                },
                Row {
                    line: 6,
                    fields: vec!["2010-01-03".into(), "n/a".into()],
                },
            ],
        )
    }

    #[test]
    fn column_lookup_is_literal() {
        let t = table();
        assert_eq!(t.column_index("PREC.I-1 (in) "), Some(1));
        assert_eq!(t.column_index("PREC.I-1 (in)"), None);
    }

    #[test]
    fn require_columns_lists_all_missing() {
        let err = table()
            .require_columns(&["Date", "TMAX.D-1 (degC) ", "TMIN.D-1 (degC) "])
            .unwrap_err();
        match err {
            TabularError::MissingColumns { columns, .. } => {
                assert_eq!(columns, vec!["TMAX.D-1 (degC) ", "TMIN.D-1 (degC) "]);
            }
            other => panic!("expected MissingColumns, got {other:?}"),
        }
    }

    #[test]
    fn records_keyed_by_label() {
        let t = table();
        let first = t.records().next().unwrap();
        assert_eq!(first.get("Date"), Some("2010-01-01"));
        assert_eq!(first.get("nope"), None);
        assert_eq!(first.line(), 4);
    }

    #[test]
    fn blank_number_is_nan() {
        let t = table();
        let second = t.records().nth(1).unwrap();
        assert!(second.number(1).unwrap().is_nan());
    }

    #[test]
    fn garbage_number_is_malformed() {
        let t = table();
        let third = t.records().nth(2).unwrap();
        match third.number(1).unwrap_err() {
            TabularError::MalformedInput { line, reason, .. } => {
                assert_eq!(line, 6);
                assert!(reason.contains("n/a"));
            }
            other => panic!("expected MalformedInput, got {other:?}"),
        }
    }
}
