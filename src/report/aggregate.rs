use std::collections::HashSet;

use crate::report::normalize::numeric_column;
use crate::report::ratio::format_ratio;
use crate::report::types::{DimensionDetail, ROW_NUMBER, ScoreColumns, TopicRecord};
use crate::report::utility::{count_at_least, mean, round2};
use crate::table::Table;

/// Combined score at or above which an item counts as excellent.
pub const EXCELLENT_TOTAL: f64 = 12.0;
/// Single-dimension score at or above which an item counts as excellent.
pub const EXCELLENT_DIMENSION: f64 = 4.0;

/// The items belonging to one topic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TopicSubset {
    /// Matching rows in the membership table.
    pub member_count: usize,
    /// Indices into the item data table, in data-table order.
    pub rows: Vec<usize>,
}

/// Finds the membership rows and item rows of `topic`.
///
/// Topics whose depth has no matching rule get an empty subset.
pub fn select_subset(topic: &TopicRecord, topics: &Table, data: &Table) -> TopicSubset {
    let Some((label_col, label)) = topic.membership_key() else {
        return TopicSubset::default();
    };

    let mut member_count = 0;
    let mut row_numbers: HashSet<&str> = HashSet::new();

    for row in topics.row_indices() {
        if topics.get(row, label_col) != Some(label) {
            continue;
        }
        member_count += 1;
        if let Some(id) = topics.get(row, ROW_NUMBER) {
            row_numbers.insert(id.trim());
        }
    }

    let rows = data
        .row_indices()
        .filter(|&row| {
            data.get(row, ROW_NUMBER)
                .is_some_and(|id| row_numbers.contains(id.trim()))
        })
        .collect();

    TopicSubset { member_count, rows }
}

/// Normalized score columns for a row subset, aligned to it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoreVectors {
    pub novelty: Vec<f64>,
    pub feasibility: Vec<f64>,
    pub marketability: Vec<f64>,
}

impl ScoreVectors {
    pub fn collect(data: &Table, columns: &ScoreColumns, rows: &[usize]) -> Self {
        Self {
            novelty: numeric_column(data, &columns.novelty, rows),
            feasibility: numeric_column(data, &columns.feasibility, rows),
            marketability: numeric_column(data, &columns.marketability, rows),
        }
    }

    pub fn len(&self) -> usize {
        self.novelty.len()
    }

    pub fn is_empty(&self) -> bool {
        self.novelty.is_empty()
    }

    /// Elementwise sum of the three dimensions.
    pub fn totals(&self) -> Vec<f64> {
        self.novelty
            .iter()
            .zip(&self.feasibility)
            .zip(&self.marketability)
            .map(|((n, f), m)| n + f + m)
            .collect()
    }
}

/// Counts, means and ratios for one topic.
#[derive(Debug, Clone, PartialEq)]
pub struct TopicAggregate {
    pub item_count: usize,
    pub avg_total: f64,
    pub avg_novelty: f64,
    pub avg_marketability: f64,
    pub avg_feasibility: f64,
    pub excellent_count: usize,
    pub excellent_ratio: String,
    pub novelty: DimensionDetail,
    pub marketability: DimensionDetail,
    pub feasibility: DimensionDetail,
}

impl Default for TopicAggregate {
    fn default() -> Self {
        Self {
            item_count: 0,
            avg_total: 0.0,
            avg_novelty: 0.0,
            avg_marketability: 0.0,
            avg_feasibility: 0.0,
            excellent_count: 0,
            excellent_ratio: "0%".to_string(),
            novelty: DimensionDetail::empty(),
            marketability: DimensionDetail::empty(),
            feasibility: DimensionDetail::empty(),
        }
    }
}

/// Aggregates the scores of one topic.
///
/// `member_count` is the topic's idea count and the denominator of the
/// combined excellent ratio. Per-dimension ratios use the number of item rows
/// found, and a dimension whose column is missing from `data` keeps its
/// defaults.
pub fn aggregate_topic(
    member_count: usize,
    scores: &ScoreVectors,
    data: &Table,
    columns: &ScoreColumns,
) -> TopicAggregate {
    let mut agg = TopicAggregate {
        item_count: member_count,
        ..Default::default()
    };

    if scores.is_empty() {
        return agg;
    }

    let totals = scores.totals();
    agg.avg_total = round2(mean(&totals));
    agg.avg_novelty = round2(mean(&scores.novelty));
    agg.avg_marketability = round2(mean(&scores.marketability));
    agg.avg_feasibility = round2(mean(&scores.feasibility));

    agg.excellent_count = count_at_least(&totals, EXCELLENT_TOTAL);
    agg.excellent_ratio = format_ratio(agg.excellent_count, member_count);

    let detail = |name: &str, values: &[f64]| {
        if data.has_column(name) {
            dimension_detail(values)
        } else {
            DimensionDetail::empty()
        }
    };
    agg.novelty = detail(&columns.novelty, &scores.novelty);
    agg.marketability = detail(&columns.marketability, &scores.marketability);
    agg.feasibility = detail(&columns.feasibility, &scores.feasibility);

    agg
}

/// Mean and excellent (>= 4) statistics of a single dimension.
pub fn dimension_detail(values: &[f64]) -> DimensionDetail {
    if values.is_empty() {
        return DimensionDetail::empty();
    }
    let excellent_count = count_at_least(values, EXCELLENT_DIMENSION);
    DimensionDetail {
        mean: round2(mean(values)),
        excellent_count,
        excellent_ratio: format_ratio(excellent_count, values.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_table;

    fn topic(depth: &str, broad: &str, medium: &str) -> TopicRecord {
        TopicRecord {
            depth: depth.to_string(),
            topic_id: "t".to_string(),
            broad_label: broad.to_string(),
            medium_label: medium.to_string(),
            keyword_description: String::new(),
        }
    }

    fn membership() -> Table {
        parse_table(
            b"topic_depth_1,topic_depth_2,row_number\n\
              Health,Sleep,1\n\
              Health,Diet,2\n\
              Energy,Solar,3\n\
              Health,Sleep,4\n",
        )
        .unwrap()
    }

    fn data() -> Table {
        parse_table(
            b"row_number,novelty_score,feasibility_score,marketability_score\n\
              4,1,1,1\n\
              3,2,2,2\n\
              2,4,4,4\n\
              1,5,5,5\n",
        )
        .unwrap()
    }

    #[test]
    fn test_depth_one_subset_in_data_order() {
        let subset = select_subset(&topic("1", "Health", ""), &membership(), &data());
        assert_eq!(subset.member_count, 3);
        assert_eq!(subset.rows, vec![0, 2, 3]);
    }

    #[test]
    fn test_depth_two_subset() {
        let subset = select_subset(&topic("2", "Health", "Sleep"), &membership(), &data());
        assert_eq!(subset.member_count, 2);
        assert_eq!(subset.rows, vec![0, 3]);
    }

    #[test]
    fn test_unknown_depth_has_empty_subset() {
        let subset = select_subset(&topic("3", "Health", "Sleep"), &membership(), &data());
        assert_eq!(subset, TopicSubset::default());
    }

    #[test]
    fn test_labels_match_exactly() {
        let topics = parse_table(
            b"topic_depth_1,topic_depth_2,row_number\n\
              Health ,Sleep,1\n\
              health,Sleep,2\n\
              Health,Sleep,3\n",
        )
        .unwrap();
        let subset = select_subset(&topic("1", "Health", ""), &topics, &data());
        assert_eq!(subset.member_count, 1);
        assert_eq!(subset.rows, vec![1]);
    }

    #[test]
    fn test_empty_label_matches_nothing() {
        let topics = parse_table(b"topic_depth_1,topic_depth_2,row_number\n,,1\n").unwrap();
        let subset = select_subset(&topic("2", "Health", ""), &topics, &data());
        assert_eq!(subset.member_count, 0);
        assert!(subset.rows.is_empty());
    }

    #[test]
    fn test_empty_scores_give_defaults() {
        let columns = ScoreColumns::default();
        let agg = aggregate_topic(0, &ScoreVectors::default(), &data(), &columns);
        assert_eq!(agg, TopicAggregate::default());
        assert_eq!(agg.excellent_ratio, "0%");
        assert_eq!(agg.novelty.excellent_ratio, "0%");
    }

    #[test]
    fn test_members_without_item_rows_keep_count() {
        let columns = ScoreColumns::default();
        let agg = aggregate_topic(2, &ScoreVectors::default(), &data(), &columns);
        assert_eq!(agg.item_count, 2);
        assert_eq!(agg.avg_total, 0.0);
        assert_eq!(agg.excellent_ratio, "0%");
    }

    #[test]
    fn test_aggregate_health_topic() {
        let data = data();
        let columns = ScoreColumns::default();
        let subset = select_subset(&topic("1", "Health", ""), &membership(), &data);
        let scores = ScoreVectors::collect(&data, &columns, &subset.rows);
        let agg = aggregate_topic(subset.member_count, &scores, &data, &columns);

        // totals: 3, 12, 15
        assert_eq!(agg.item_count, 3);
        assert_eq!(agg.avg_total, 10.0);
        assert_eq!(agg.avg_novelty, 3.33);
        assert_eq!(agg.excellent_count, 2);
        assert_eq!(agg.excellent_ratio, "66.7%");
        assert_eq!(agg.novelty.excellent_count, 2);
        assert_eq!(agg.novelty.excellent_ratio, "66.7%");
        assert_eq!(agg.feasibility.mean, 3.33);
    }

    #[test]
    fn test_mean_total_matches_sum_of_dimension_means() {
        let data = data();
        let columns = ScoreColumns::default();
        let rows: Vec<usize> = data.row_indices().collect();
        let scores = ScoreVectors::collect(&data, &columns, &rows);
        let agg = aggregate_topic(rows.len(), &scores, &data, &columns);

        let sum = agg.avg_novelty + agg.avg_feasibility + agg.avg_marketability;
        assert!((agg.avg_total - sum).abs() < 0.02);
    }

    #[test]
    fn test_duplicate_row_numbers_keep_ratio_in_range() {
        let topics = parse_table(b"topic_depth_1,topic_depth_2,row_number\nHealth,Sleep,1\n").unwrap();
        let data = parse_table(
            b"row_number,novelty_score,feasibility_score,marketability_score\n\
              1,5,5,5\n\
              1,4,4,4\n",
        )
        .unwrap();
        let columns = ScoreColumns::default();
        let subset = select_subset(&topic("1", "Health", ""), &topics, &data);
        assert_eq!(subset.member_count, 1);
        assert_eq!(subset.rows, vec![0, 1]);

        let scores = ScoreVectors::collect(&data, &columns, &subset.rows);
        let agg = aggregate_topic(subset.member_count, &scores, &data, &columns);
        assert_eq!(agg.excellent_count, 2);
        assert_eq!(agg.excellent_ratio, "100.0%");
    }

    #[test]
    fn test_missing_dimension_column_keeps_detail_defaults() {
        let data = parse_table(b"row_number,novelty_score\n1,5\n2,4\n").unwrap();
        let columns = ScoreColumns::default();
        let scores = ScoreVectors::collect(&data, &columns, &[0, 1]);
        let agg = aggregate_topic(2, &scores, &data, &columns);

        assert_eq!(agg.avg_total, 4.5);
        assert_eq!(agg.excellent_count, 0);
        assert_eq!(agg.excellent_ratio, "0.0%");
        assert_eq!(agg.novelty.excellent_ratio, "100.0%");
        assert_eq!(agg.feasibility, DimensionDetail::empty());
        assert_eq!(agg.marketability, DimensionDetail::empty());
    }
}
