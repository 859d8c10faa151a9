use anyhow::{Result, bail};
use serde::Serialize;

/// A half-open cell range on one sheet (`GridRange` in the Sheets API).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridRange {
    pub sheet_id: i64,
    pub start_row_index: usize,
    pub end_row_index: usize,
    pub start_column_index: usize,
    pub end_column_index: usize,
}

impl GridRange {
    pub fn new(sheet_id: i64, rows: std::ops::Range<usize>, cols: std::ops::Range<usize>) -> Self {
        Self {
            sheet_id,
            start_row_index: rows.start,
            end_row_index: rows.end,
            start_column_index: cols.start,
            end_column_index: cols.end,
        }
    }

    /// A single column over `rows`.
    pub fn column(sheet_id: i64, col: usize, rows: std::ops::Range<usize>) -> Self {
        Self::new(sheet_id, rows, col..col + 1)
    }
}

/// Column letters for a 1-based column number (`1` → `A`, `27` → `AA`).
pub fn column_letter(mut n: usize) -> String {
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}

/// A1 reference of a whole sheet, quoting the title.
pub fn sheet_range(title: &str) -> String {
    format!("'{}'", title.replace('\'', "''"))
}

/// A1 reference of cell `A1` on a sheet.
pub fn sheet_origin(title: &str) -> String {
    format!("{}!A1", sheet_range(title))
}

/// How a style entry names its column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnKey {
    /// 1-based column number.
    Number(usize),
    /// Column letters (`"C"`), a digit string, or a header name.
    Name(String),
}

impl From<&str> for ColumnKey {
    fn from(s: &str) -> Self {
        ColumnKey::Name(s.to_string())
    }
}

impl ColumnKey {
    /// Zero-based column index of this key in a sheet with `headers`.
    pub fn resolve(&self, headers: &[&str]) -> Result<usize> {
        match self {
            ColumnKey::Number(n) if *n > 0 => Ok(n - 1),
            ColumnKey::Number(n) => bail!("Column numbers start at 1, got {n}"),
            ColumnKey::Name(name) => {
                if let Some(i) = headers.iter().position(|h| h == name) {
                    return Ok(i);
                }
                if let Ok(n) = name.parse::<usize>() {
                    return ColumnKey::Number(n).resolve(headers);
                }
                if !name.is_empty() && name.chars().all(|c| c.is_ascii_alphabetic()) {
                    let idx = name
                        .to_ascii_uppercase()
                        .bytes()
                        .fold(0usize, |acc, b| acc * 26 + (b - b'A' + 1) as usize);
                    return Ok(idx - 1);
                }
                bail!("Unknown column key: {name}")
            }
        }
    }
}

/// Pulls the spreadsheet id out of a Google Sheets URL.
///
/// Anything that is not a `/spreadsheets/d/<id>` URL is returned unchanged,
/// so bare ids work too.
pub fn extract_spreadsheet_id(url: &str) -> String {
    const MARKER: &str = "/spreadsheets/d/";
    if let Some(pos) = url.find(MARKER) {
        let rest = &url[pos + MARKER.len()..];
        let id: String = rest
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
            .collect();
        if !id.is_empty() {
            return id;
        }
    }
    url.to_string()
}
