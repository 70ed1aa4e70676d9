use anyhow::{Context, Result};
use std::collections::HashMap;

use crate::error::LoadError;

/// Cell contents treated as missing values
pub const MISSING_TOKENS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// A parsed CSV payload. Missing cells are `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl RawTable {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Iterate the cells of one column
    pub fn column_values(&self, idx: usize) -> impl Iterator<Item = Option<&str>> {
        self.rows.iter().map(move |row| row[idx].as_deref())
    }
}

fn is_missing(cell: &str) -> bool {
    MISSING_TOKENS.contains(&cell.trim())
}

/// Give every header cell a unique, non-empty name.
/// Blank cells become `Unnamed: <index>`; a name seen before gets the next
/// free `.N` suffix.
fn normalize_headers(raw: &[String]) -> Vec<String> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut columns = Vec::with_capacity(raw.len());

    for (idx, name) in raw.iter().enumerate() {
        let mut col = if name.trim().is_empty() {
            format!("Unnamed: {}", idx)
        } else {
            name.clone()
        };

        let mut seen = counts.get(&col).copied().unwrap_or(0);
        while seen > 0 {
            counts.insert(col.clone(), seen + 1);
            col = format!("{}.{}", col, seen);
            seen = counts.get(&col).copied().unwrap_or(0);
        }
        counts.insert(col.clone(), seen + 1);
        columns.push(col);
    }

    columns
}

/// Parse a CSV payload whose first record is the header
pub fn parse_csv(data: &[u8]) -> Result<RawTable> {
    let data = data.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(data);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(data);

    let headers = reader.headers().context("Failed to read CSV header")?.clone();
    if headers.is_empty() {
        return Err(LoadError::EmptyPayload.into());
    }

    let raw_names: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
    let columns = normalize_headers(&raw_names);
    let width = columns.len();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.context("Failed to read CSV record")?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);

        // A single empty field is a blank line
        if record.len() == 1 && record[0].trim().is_empty() && width > 1 {
            continue;
        }

        if record.len() > width {
            return Err(LoadError::RaggedRow {
                line,
                expected: width,
                found: record.len(),
            }
            .into());
        }

        let mut row: Vec<Option<String>> = record
            .iter()
            .map(|cell| {
                if is_missing(cell) {
                    None
                } else {
                    Some(cell.to_string())
                }
            })
            .collect();
        row.resize(width, None);
        rows.push(row);
    }

    Ok(RawTable { columns, rows })
}
