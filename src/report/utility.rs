/// Computes the arithmetic mean of a slice of values. Returns 0.0 for empty input.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Rounds to two decimal places, ties to even on the exact binary value.
///
/// `0.125` becomes `0.12` and `0.625` becomes `0.62`.
pub fn round2(value: f64) -> f64 {
    format!("{value:.2}").parse().unwrap_or(0.0)
}

/// Number of values at or above `threshold`.
pub fn count_at_least(values: &[f64], threshold: f64) -> usize {
    values.iter().filter(|v| **v >= threshold).count()
}
