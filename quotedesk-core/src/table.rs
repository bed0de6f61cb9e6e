//! Tabular result model.
//!
//! Everything the dashboard renders is a `Table`: an index column plus named
//! data columns, immutable once built. Cells are numeric, text, or absent —
//! the three value kinds the upstream provider actually produces.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single table cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Cell {
    Number(f64),
    Text(String),
    Absent,
}

impl Cell {
    /// Display form: numbers use the shortest round-trippable representation,
    /// absent cells render as an empty string.
    pub fn render(&self) -> String {
        match self {
            Cell::Number(n) => format!("{n}"),
            Cell::Text(s) => s.clone(),
            Cell::Absent => String::new(),
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Cell::Absent)
    }
}

impl From<f64> for Cell {
    fn from(n: f64) -> Self {
        Cell::Number(n)
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Cell::Text(s)
    }
}

impl From<Option<f64>> for Cell {
    fn from(n: Option<f64>) -> Self {
        match n {
            Some(n) => Cell::Number(n),
            None => Cell::Absent,
        }
    }
}

/// Shape violation when assembling a table from raw rows.
#[derive(Debug, Error)]
pub enum ShapeError {
    #[error("row {row} has {got} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        got: usize,
        expected: usize,
    },
    #[error("index has {got} entries for {rows} rows")]
    IndexMismatch { got: usize, rows: usize },
}

/// A two-dimensional table: one index column and zero or more data columns.
///
/// Invariants (enforced at construction):
/// - every row has exactly `columns.len()` cells
/// - the index has one entry per row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    index_name: String,
    index: Vec<String>,
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    /// Build a table from pre-assembled rows, validating the shape.
    pub fn from_rows(
        index_name: impl Into<String>,
        columns: Vec<String>,
        index: Vec<String>,
        rows: Vec<Vec<Cell>>,
    ) -> Result<Self, ShapeError> {
        if index.len() != rows.len() {
            return Err(ShapeError::IndexMismatch {
                got: index.len(),
                rows: rows.len(),
            });
        }
        for (i, row) in rows.iter().enumerate() {
            if row.len() != columns.len() {
                return Err(ShapeError::RaggedRow {
                    row: i,
                    got: row.len(),
                    expected: columns.len(),
                });
            }
        }
        Ok(Self {
            index_name: index_name.into(),
            index,
            columns,
            rows,
        })
    }

    /// Build a two-column `(key, value)` table from name/value pairs.
    ///
    /// The keys become the index; the single data column is named `value_column`.
    pub fn from_pairs(
        index_name: impl Into<String>,
        value_column: impl Into<String>,
        pairs: Vec<(String, Cell)>,
    ) -> Self {
        let (index, rows): (Vec<String>, Vec<Vec<Cell>>) =
            pairs.into_iter().map(|(k, v)| (k, vec![v])).unzip();
        Self {
            index_name: index_name.into(),
            index,
            columns: vec![value_column.into()],
            rows,
        }
    }

    /// Wrap a single named series (one value per index entry) into a
    /// one-column table, preserving the index.
    pub fn from_series(
        index_name: impl Into<String>,
        series_name: impl Into<String>,
        index: Vec<String>,
        values: Vec<Cell>,
    ) -> Result<Self, ShapeError> {
        let rows: Vec<Vec<Cell>> = values.into_iter().map(|v| vec![v]).collect();
        Self::from_rows(index_name, vec![series_name.into()], index, rows)
    }

    /// An empty table with the given column layout.
    pub fn empty(index_name: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            index_name: index_name.into(),
            index: Vec::new(),
            columns,
            rows: Vec::new(),
        }
    }

    pub fn index_name(&self) -> &str {
        &self.index_name
    }

    pub fn index(&self) -> &[String] {
        &self.index
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cells of row `i`, without the index entry.
    pub fn row(&self, i: usize) -> Option<&[Cell]> {
        self.rows.get(i).map(|r| r.as_slice())
    }

    pub fn rows(&self) -> impl Iterator<Item = (&str, &[Cell])> {
        self.index
            .iter()
            .zip(self.rows.iter())
            .map(|(idx, row)| (idx.as_str(), row.as_slice()))
    }
}
