//! Coercion of loosely typed score columns into numbers.

use crate::table::Table;

/// Parses a single cell as a score. Missing, non-numeric and non-finite
/// values count as 0.0.
pub fn to_score(cell: Option<&str>) -> f64 {
    cell.and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// Numeric values of column `name` for the given rows of `table`.
///
/// The output is always aligned with `rows`; an absent column yields zeros.
pub fn numeric_column(table: &Table, name: &str, rows: &[usize]) -> Vec<f64> {
    match table.column(name) {
        Some(col) => rows
            .iter()
            .map(|&row| to_score(table.cell(row, col)))
            .collect(),
        None => vec![0.0; rows.len()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(values: &[Option<&str>]) -> Table {
        Table::new(
            vec!["score".to_string()],
            values
                .iter()
                .map(|v| vec![v.map(str::to_string)])
                .collect(),
        )
    }

    #[test]
    fn test_mixed_values() {
        let t = table(&[Some("3"), Some("x"), None, Some("5")]);
        let rows: Vec<usize> = t.row_indices().collect();
        assert_eq!(numeric_column(&t, "score", &rows), vec![3.0, 0.0, 0.0, 5.0]);
    }

    #[test]
    fn test_absent_column_is_all_zero() {
        let t = table(&[Some("3"), Some("4")]);
        assert_eq!(numeric_column(&t, "missing", &[0, 1]), vec![0.0, 0.0]);
    }

    #[test]
    fn test_row_subset_keeps_order() {
        let t = table(&[Some("1"), Some("2"), Some("3")]);
        assert_eq!(numeric_column(&t, "score", &[2, 0]), vec![3.0, 1.0]);
    }

    #[test]
    fn test_to_score_edge_cases() {
        assert_eq!(to_score(Some(" 4.5 ")), 4.5);
        assert_eq!(to_score(Some("")), 0.0);
        assert_eq!(to_score(Some("NaN")), 0.0);
        assert_eq!(to_score(Some("inf")), 0.0);
        assert_eq!(to_score(Some("-2")), -2.0);
    }
}
