/// Formats `part / total` as a percentage with one decimal place.
///
/// | part / total | output    |
/// |--------------|-----------|
/// | any / 0      | `"0%"`    |
/// | 1 / 3        | `"33.3%"` |
/// | 1 / 4        | `"25.0%"` |
/// | 4 / 4        | `"100.0%"`|
///
/// `part` is capped at `total`, so the result never exceeds `"100.0%"`.
pub fn format_ratio(part: usize, total: usize) -> String {
    if total == 0 {
        return "0%".into();
    }
    let pct = part.min(total) as f64 / total as f64 * 100.0;
    format!("{:.1}%", pct)
}
