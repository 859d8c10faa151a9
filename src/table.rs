//! In-memory, header-addressed string tables.
//!
//! Every export from the map service is a loosely typed CSV: column sets vary
//! between maps and numeric columns frequently contain text. Cells are kept as
//! raw strings and interpreted by the consumers.

/// A rectangular table of optional string cells addressed by header name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
}

impl Table {
    /// Builds a table, padding or truncating every row to the header width.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<Option<String>>>) -> Self {
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, None);
                row
            })
            .collect();
        Self { headers, rows }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of the first column named `name`.
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// Cell at `row` / `col`, `None` when missing or out of range.
    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row)?.get(col)?.as_deref()
    }

    /// Cell at `row` in the column named `name`.
    pub fn get(&self, row: usize, name: &str) -> Option<&str> {
        self.cell(row, self.column(name)?)
    }

    /// Iterates over row indices.
    pub fn row_indices(&self) -> std::ops::Range<usize> {
        0..self.rows.len()
    }

    /// Fails with a descriptive error if any of `names` is not a column.
    pub fn require_columns(&self, table: &str, names: &[&str]) -> anyhow::Result<()> {
        let missing: Vec<&str> = names
            .iter()
            .copied()
            .filter(|n| !self.has_column(n))
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(anyhow::anyhow!(
                "{} table is missing required column(s): {}",
                table,
                missing.join(", ")
            ))
        }
    }
}

/// The three tables exported from a topic map.
#[derive(Debug, Clone, Default)]
pub struct MapTables {
    /// One row per topic node: depth, topic_id, labels and description.
    pub meta: Table,
    /// Topic membership per item: labels at each depth plus `row_number`.
    pub topics: Table,
    /// Item data keyed by `row_number`.
    pub data: Table,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table::new(
            vec!["a".into(), "b".into()],
            vec![
                vec![Some("1".into()), Some("x".into())],
                vec![Some("2".into())],
            ],
        )
    }

    #[test]
    fn test_short_rows_are_padded() {
        let t = sample();
        assert_eq!(t.get(1, "a"), Some("2"));
        assert_eq!(t.get(1, "b"), None);
    }

    #[test]
    fn test_unknown_column() {
        let t = sample();
        assert!(!t.has_column("zzz"));
        assert_eq!(t.get(0, "zzz"), None);
    }

    #[test]
    fn test_require_columns_names_missing() {
        let t = sample();
        let err = t.require_columns("meta", &["a", "c", "d"]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "meta table is missing required column(s): c, d"
        );
        assert!(t.require_columns("meta", &["a", "b"]).is_ok());
    }
}
