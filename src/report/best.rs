use crate::report::aggregate::ScoreVectors;
use crate::report::types::{BestItem, ReportConfig};
use crate::table::Table;

/// Returns the first candidate that is a column of the table, if any.
pub fn first_existing<'a>(headers: &[String], candidates: &[&'a str]) -> Option<&'a str> {
    candidates
        .iter()
        .copied()
        .find(|c| headers.iter().any(|h| h == c))
}

/// Descriptive columns resolved once against the item table's headers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextFields {
    pub title: Option<String>,
    pub summary: Option<String>,
    pub category: Option<String>,
}

impl TextFields {
    pub fn resolve(data: &Table, config: &ReportConfig) -> Self {
        let headers = data.headers();
        let pick = |candidates: Vec<&str>| first_existing(headers, &candidates).map(str::to_string);
        Self {
            title: pick(config.title_candidates()),
            summary: pick(config.summary_candidates()),
            category: pick(config.category_candidates()),
        }
    }
}

/// Position within `totals` of the highest score.
///
/// The positions are stably sorted by score, descending, so the earliest of
/// several equal maxima wins.
pub fn best_position(totals: &[f64]) -> Option<usize> {
    let mut order: Vec<usize> = (0..totals.len()).collect();
    order.sort_by(|a, b| totals[*b].total_cmp(&totals[*a]));
    order.first().copied()
}

/// Snapshot of the highest-scoring item among `rows`.
///
/// `scores` must be aligned with `rows`. An empty subset yields the default
/// (empty strings, zero scores).
pub fn select_best(
    data: &Table,
    rows: &[usize],
    scores: &ScoreVectors,
    fields: &TextFields,
) -> BestItem {
    let totals = scores.totals();
    let Some(pos) = best_position(&totals) else {
        return BestItem::default();
    };
    let row = rows[pos];

    let text = |field: &Option<String>| {
        field
            .as_deref()
            .and_then(|name| data.get(row, name))
            .unwrap_or("")
            .to_string()
    };

    BestItem {
        title: text(&fields.title),
        summary: text(&fields.summary),
        category: text(&fields.category),
        total_score: totals[pos],
        novelty: scores.novelty[pos],
        marketability: scores.marketability[pos],
        feasibility: scores.feasibility[pos],
    }
}
