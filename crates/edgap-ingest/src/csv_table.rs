//! Raw CSV ingestion into a string table.
//!
//! Inputs are machine-written exports: the first row is the header. Cells
//! are trimmed and BOM-stripped; fully-empty rows are dropped. Everything
//! else (typing, range checks) belongs to the cleaning stage.

use std::path::Path;

use anyhow::{Context, Result};
use csv::ReaderBuilder;

/// A header row plus string rows, exactly as read from disk.
#[derive(Debug, Clone)]
pub struct CsvTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Tokens treated as a missing value, compared after trimming,
/// case-insensitively.
const MISSING_TOKENS: [&str; 3] = ["NA", "N/A", "NULL"];

/// True when a raw cell should be treated as missing.
pub fn is_missing_value(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed.is_empty()
        || MISSING_TOKENS
            .iter()
            .any(|token| trimmed.eq_ignore_ascii_case(token))
}

/// Index of `column` in `headers`, matched case-insensitively.
pub fn column_index(headers: &[String], column: &str) -> Option<usize> {
    headers
        .iter()
        .position(|header| header.eq_ignore_ascii_case(column))
}

fn normalize_cell(raw: &str) -> String {
    raw.trim().trim_matches('\u{feff}').to_string()
}

/// Read a CSV file into a [`CsvTable`].
///
/// Short rows are padded with empty cells to the header width; extra cells
/// beyond it are dropped.
pub fn read_csv_table(path: &Path) -> Result<CsvTable> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("read csv: {}", path.display()))?;
    let mut records = reader.records();
    let headers: Vec<String> = match records.next() {
        Some(record) => {
            let record = record.with_context(|| format!("read header: {}", path.display()))?;
            record.iter().map(normalize_cell).collect()
        }
        None => Vec::new(),
    };
    let mut rows = Vec::new();
    for record in records {
        let record = record.with_context(|| format!("read record: {}", path.display()))?;
        let mut row = Vec::with_capacity(headers.len());
        for idx in 0..headers.len() {
            let value = record.get(idx).unwrap_or("");
            row.push(normalize_cell(value));
        }
        if row.iter().all(|value| value.is_empty()) {
            continue;
        }
        rows.push(row);
    }
    Ok(CsvTable { headers, rows })
}
