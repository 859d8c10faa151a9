//! CSV parser for map export tables.

use anyhow::{Context, Result};
use csv::ReaderBuilder;

use crate::table::Table;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Decodes a CSV export into a [`Table`].
///
/// A leading UTF-8 byte order mark is skipped (exports are written as
/// `utf-8-sig`). Empty cells become missing values and ragged rows are
/// tolerated.
///
/// # Errors
///
/// Returns an error if the bytes are not valid UTF-8 CSV.
pub fn parse_table(bytes: &[u8]) -> Result<Table> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);

    let mut rdr = ReaderBuilder::new().flexible(true).from_reader(bytes);

    let headers: Vec<String> = rdr
        .headers()
        .context("Failed to read CSV header")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for (line, record) in rdr.records().enumerate() {
        let record = record.with_context(|| format!("Malformed CSV record {}", line + 1))?;
        let row = record
            .iter()
            .map(|cell| {
                if cell.is_empty() {
                    None
                } else {
                    Some(cell.to_string())
                }
            })
            .collect();
        rows.push(row);
    }

    Ok(Table::new(headers, rows))
}
