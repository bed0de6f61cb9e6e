//! CSV export of rendered tables.
//!
//! Layout: a header row, the index as the first column, UTF-8 bytes, and a
//! filename derived from the section label.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::table::{Cell, Table};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed csv: {0}")]
    Malformed(String),
}

/// Derive the export filename for a section label: spaces become
/// underscores, `.csv` appended. `"Annual Balance Sheet"` →
/// `"Annual_Balance_Sheet.csv"`.
pub fn export_filename(label: &str) -> String {
    format!("{}.csv", label.replace(' ', "_"))
}

/// Serialize a table to CSV bytes: header row first, index column leading
/// every record, absent cells as empty fields.
pub fn table_to_csv(table: &Table) -> Result<Vec<u8>, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    let mut header = Vec::with_capacity(table.column_count() + 1);
    header.push(table.index_name().to_string());
    header.extend(table.columns().iter().cloned());
    writer.write_record(&header)?;

    for (index, cells) in table.rows() {
        let mut record = Vec::with_capacity(cells.len() + 1);
        record.push(index.to_string());
        record.extend(cells.iter().map(Cell::render));
        writer.write_record(&record)?;
    }

    writer
        .into_inner()
        .map_err(|e| ExportError::Malformed(e.to_string()))
}

/// Parse CSV bytes back into a table, treating the first column as the
/// index. Fields that parse as f64 become numeric cells; empty fields
/// become absent.
///
/// CSV carries no type information, so numeric-looking text is ambiguous:
/// `Cell::Text("123")` serializes to the same field as `Cell::Number(123.0)`
/// and parses back as the number. The round trip is exact only for text
/// that does not parse as f64.
pub fn csv_to_table(bytes: &[u8]) -> Result<Table, ExportError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(bytes);

    let headers = reader.headers()?.clone();
    if headers.is_empty() {
        return Err(ExportError::Malformed("no header row".into()));
    }
    let index_name = headers[0].to_string();
    let columns: Vec<String> = headers.iter().skip(1).map(String::from).collect();

    let mut index = Vec::new();
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let mut fields = record.iter();
        let idx = fields
            .next()
            .ok_or_else(|| ExportError::Malformed("record with no index field".into()))?;
        index.push(idx.to_string());
        rows.push(fields.map(parse_cell).collect());
    }

    Table::from_rows(index_name, columns, index, rows)
        .map_err(|e| ExportError::Malformed(e.to_string()))
}

fn parse_cell(field: &str) -> Cell {
    if field.is_empty() {
        return Cell::Absent;
    }
    match field.parse::<f64>() {
        Ok(n) => Cell::Number(n),
        Err(_) => Cell::Text(field.to_string()),
    }
}

/// Write a section's table into `dir` under its derived filename.
/// Returns the path written.
pub fn write_table_csv(
    dir: impl AsRef<Path>,
    label: &str,
    table: &Table,
) -> Result<PathBuf, ExportError> {
    let path = dir.as_ref().join(export_filename(label));
    std::fs::write(&path, table_to_csv(table)?)?;
    Ok(path)
}
