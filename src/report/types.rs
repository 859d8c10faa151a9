//! Data types used by the report pipeline.

use serde::{Deserialize, Serialize};

use crate::table::Table;

/// Metadata columns every topic export carries.
pub const META_DEPTH: &str = "depth";
pub const META_TOPIC_ID: &str = "topic_id";
pub const META_DESCRIPTION: &str = "topic_description";
/// Label columns shared by the metadata and membership tables.
pub const LABEL_DEPTH_1: &str = "topic_depth_1";
pub const LABEL_DEPTH_2: &str = "topic_depth_2";
/// Row identifier linking membership rows to item data.
pub const ROW_NUMBER: &str = "row_number";

pub const TITLE_CANDIDATES: &[&str] = &[
    "title",
    "タイトル",
    "idea_title",
    "name",
    "document_title",
    "node_title",
];
pub const SUMMARY_CANDIDATES: &[&str] = &[
    "summary",
    "要約",
    "概要",
    "説明",
    "content_summary",
    "description",
];
pub const CATEGORY_CANDIDATES: &[&str] = &[
    "category",
    "カテゴリー",
    "カテゴリ",
    "アイデアカテゴリー",
    "タグ",
    "label",
];

/// Names of the three score columns in the item data table.
///
/// Source maps are not consistent about naming, so these are supplied by the
/// caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreColumns {
    pub novelty: String,
    pub feasibility: String,
    pub marketability: String,
}

impl Default for ScoreColumns {
    fn default() -> Self {
        Self {
            novelty: "novelty_score".to_string(),
            feasibility: "feasibility_score".to_string(),
            marketability: "marketability_score".to_string(),
        }
    }
}

/// Everything the pipeline needs besides the tables themselves.
#[derive(Debug, Clone, Default)]
pub struct ReportConfig {
    pub scores: ScoreColumns,
    /// Preferred title field, tried before [`TITLE_CANDIDATES`].
    pub title_field: Option<String>,
    /// Preferred summary field, tried before [`SUMMARY_CANDIDATES`].
    pub summary_field: Option<String>,
    /// Preferred category field, tried before [`CATEGORY_CANDIDATES`].
    pub category_field: Option<String>,
}

impl ReportConfig {
    pub fn title_candidates(&self) -> Vec<&str> {
        with_preferred(self.title_field.as_deref(), TITLE_CANDIDATES)
    }

    pub fn summary_candidates(&self) -> Vec<&str> {
        with_preferred(self.summary_field.as_deref(), SUMMARY_CANDIDATES)
    }

    pub fn category_candidates(&self) -> Vec<&str> {
        with_preferred(self.category_field.as_deref(), CATEGORY_CANDIDATES)
    }
}

fn with_preferred<'a>(preferred: Option<&'a str>, defaults: &[&'a str]) -> Vec<&'a str> {
    let mut out = Vec::with_capacity(defaults.len() + 1);
    if let Some(p) = preferred.filter(|p| !p.is_empty()) {
        out.push(p);
    }
    out.extend(defaults.iter().copied().filter(|d| Some(*d) != preferred));
    out
}

/// One topic node from the metadata table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicRecord {
    pub depth: String,
    pub topic_id: String,
    pub broad_label: String,
    pub medium_label: String,
    pub keyword_description: String,
}

impl TopicRecord {
    /// Reads every topic node from the metadata table.
    pub fn load_all(meta: &Table) -> anyhow::Result<Vec<Self>> {
        meta.require_columns(
            "meta",
            &[
                META_DEPTH,
                META_TOPIC_ID,
                LABEL_DEPTH_1,
                LABEL_DEPTH_2,
                META_DESCRIPTION,
            ],
        )?;

        let text = |row: usize, col: &str| meta.get(row, col).unwrap_or("").to_string();
        // Labels are matched verbatim against membership rows; only ids are trimmed.
        let id = |row: usize, col: &str| meta.get(row, col).unwrap_or("").trim().to_string();

        Ok(meta
            .row_indices()
            .map(|row| TopicRecord {
                depth: id(row, META_DEPTH),
                topic_id: id(row, META_TOPIC_ID),
                broad_label: text(row, LABEL_DEPTH_1),
                medium_label: text(row, LABEL_DEPTH_2),
                keyword_description: text(row, META_DESCRIPTION),
            })
            .collect())
    }

    /// Membership column and label value that select this topic's items.
    ///
    /// Only depths "1" and "2" have a matching rule; anything else yields `None`.
    pub fn membership_key(&self) -> Option<(&'static str, &str)> {
        match self.depth.as_str() {
            "1" => Some((LABEL_DEPTH_1, self.broad_label.as_str())),
            "2" => Some((LABEL_DEPTH_2, self.medium_label.as_str())),
            _ => None,
        }
    }
}

/// Mean and threshold statistics for a single score dimension.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DimensionDetail {
    pub mean: f64,
    pub excellent_count: usize,
    pub excellent_ratio: String,
}

impl DimensionDetail {
    pub fn empty() -> Self {
        Self {
            excellent_ratio: "0%".to_string(),
            ..Default::default()
        }
    }
}

/// Highest-scoring item of a topic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BestItem {
    pub title: String,
    pub summary: String,
    pub category: String,
    pub total_score: f64,
    pub novelty: f64,
    pub marketability: f64,
    pub feasibility: f64,
}

/// Column headers of the report, in output order.
pub const REPORT_HEADERS: [&str; 28] = [
    "depth",
    "topic_id",
    "Nomic Topic: Broad",
    "Nomic Topic: Medium",
    "Keywords",
    "Idea Count",
    "Average Score",
    "Novelty Avg",
    "Marketability Avg",
    "Feasibility Avg",
    "Excellent Ideas (>=12)",
    "Excellent Idea Ratio (>=12)",
    "novelty_score (Novelty)\nAvg",
    "novelty_score (Novelty)\nExcellent Ideas (>=4)",
    "novelty_score (Novelty)\nExcellent Ratio (>=4)",
    "marketability_score (Marketability)\nAvg",
    "marketability_score (Marketability)\nExcellent Ideas (>=4)",
    "marketability_score (Marketability)\nExcellent Ratio (>=4)",
    "feasibility_score (Feasibility)\nAvg",
    "feasibility_score (Feasibility)\nExcellent Ideas (>=4)",
    "feasibility_score (Feasibility)\nExcellent Ratio (>=4)",
    "Best Idea",
    "Summary",
    "Category",
    "Total Score",
    "Novelty Score",
    "Marketability Score",
    "Feasibility Score",
];

/// One flat report row per topic.
///
/// Field order is column order; the serde names match [`REPORT_HEADERS`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopicReport {
    pub depth: String,
    pub topic_id: String,
    #[serde(rename = "Nomic Topic: Broad")]
    pub broad_label: String,
    #[serde(rename = "Nomic Topic: Medium")]
    pub medium_label: String,
    #[serde(rename = "Keywords")]
    pub keywords: String,

    #[serde(rename = "Idea Count")]
    pub item_count: usize,

    #[serde(rename = "Average Score")]
    pub avg_total: f64,
    #[serde(rename = "Novelty Avg")]
    pub avg_novelty: f64,
    #[serde(rename = "Marketability Avg")]
    pub avg_marketability: f64,
    #[serde(rename = "Feasibility Avg")]
    pub avg_feasibility: f64,

    #[serde(rename = "Excellent Ideas (>=12)")]
    pub excellent_count: usize,
    #[serde(rename = "Excellent Idea Ratio (>=12)")]
    pub excellent_ratio: String,

    #[serde(rename = "novelty_score (Novelty)\nAvg")]
    pub novelty_mean: f64,
    #[serde(rename = "novelty_score (Novelty)\nExcellent Ideas (>=4)")]
    pub novelty_excellent_count: usize,
    #[serde(rename = "novelty_score (Novelty)\nExcellent Ratio (>=4)")]
    pub novelty_excellent_ratio: String,
    #[serde(rename = "marketability_score (Marketability)\nAvg")]
    pub marketability_mean: f64,
    #[serde(rename = "marketability_score (Marketability)\nExcellent Ideas (>=4)")]
    pub marketability_excellent_count: usize,
    #[serde(rename = "marketability_score (Marketability)\nExcellent Ratio (>=4)")]
    pub marketability_excellent_ratio: String,
    #[serde(rename = "feasibility_score (Feasibility)\nAvg")]
    pub feasibility_mean: f64,
    #[serde(rename = "feasibility_score (Feasibility)\nExcellent Ideas (>=4)")]
    pub feasibility_excellent_count: usize,
    #[serde(rename = "feasibility_score (Feasibility)\nExcellent Ratio (>=4)")]
    pub feasibility_excellent_ratio: String,

    #[serde(rename = "Best Idea")]
    pub best_title: String,
    #[serde(rename = "Summary")]
    pub best_summary: String,
    #[serde(rename = "Category")]
    pub best_category: String,
    #[serde(rename = "Total Score")]
    pub best_total: f64,
    #[serde(rename = "Novelty Score")]
    pub best_novelty: f64,
    #[serde(rename = "Marketability Score")]
    pub best_marketability: f64,
    #[serde(rename = "Feasibility Score")]
    pub best_feasibility: f64,
}

impl TopicReport {
    /// A row carrying only the topic identity, every aggregate at its default.
    pub fn from_topic(topic: &TopicRecord) -> Self {
        TopicReport {
            depth: topic.depth.clone(),
            topic_id: topic.topic_id.clone(),
            broad_label: topic.broad_label.clone(),
            medium_label: topic.medium_label.clone(),
            keywords: topic.keyword_description.clone(),
            item_count: 0,
            avg_total: 0.0,
            avg_novelty: 0.0,
            avg_marketability: 0.0,
            avg_feasibility: 0.0,
            excellent_count: 0,
            excellent_ratio: "0%".to_string(),
            novelty_mean: 0.0,
            novelty_excellent_count: 0,
            novelty_excellent_ratio: "0%".to_string(),
            marketability_mean: 0.0,
            marketability_excellent_count: 0,
            marketability_excellent_ratio: "0%".to_string(),
            feasibility_mean: 0.0,
            feasibility_excellent_count: 0,
            feasibility_excellent_ratio: "0%".to_string(),
            best_title: String::new(),
            best_summary: String::new(),
            best_category: String::new(),
            best_total: 0.0,
            best_novelty: 0.0,
            best_marketability: 0.0,
            best_feasibility: 0.0,
        }
    }

    /// Set the per-dimension columns (novelty, marketability, feasibility).
    pub fn with_details(
        mut self,
        novelty: DimensionDetail,
        marketability: DimensionDetail,
        feasibility: DimensionDetail,
    ) -> Self {
        self.novelty_mean = novelty.mean;
        self.novelty_excellent_count = novelty.excellent_count;
        self.novelty_excellent_ratio = novelty.excellent_ratio;
        self.marketability_mean = marketability.mean;
        self.marketability_excellent_count = marketability.excellent_count;
        self.marketability_excellent_ratio = marketability.excellent_ratio;
        self.feasibility_mean = feasibility.mean;
        self.feasibility_excellent_count = feasibility.excellent_count;
        self.feasibility_excellent_ratio = feasibility.excellent_ratio;
        self
    }

    /// Set the best-item snapshot columns.
    pub fn with_best(mut self, best: BestItem) -> Self {
        self.best_title = best.title;
        self.best_summary = best.summary;
        self.best_category = best.category;
        self.best_total = best.total_score;
        self.best_novelty = best.novelty;
        self.best_marketability = best.marketability;
        self.best_feasibility = best.feasibility;
        self
    }

    /// Cell values in column order, for writers that address cells directly.
    pub fn cells(&self) -> Vec<serde_json::Value> {
        use serde_json::Value;

        let s = |v: &str| Value::from(v);
        let n = |v: f64| Value::from(v);
        let c = |v: usize| Value::from(v as u64);

        vec![
            s(&self.depth),
            s(&self.topic_id),
            s(&self.broad_label),
            s(&self.medium_label),
            s(&self.keywords),
            c(self.item_count),
            n(self.avg_total),
            n(self.avg_novelty),
            n(self.avg_marketability),
            n(self.avg_feasibility),
            c(self.excellent_count),
            s(&self.excellent_ratio),
            n(self.novelty_mean),
            c(self.novelty_excellent_count),
            s(&self.novelty_excellent_ratio),
            n(self.marketability_mean),
            c(self.marketability_excellent_count),
            s(&self.marketability_excellent_ratio),
            n(self.feasibility_mean),
            c(self.feasibility_excellent_count),
            s(&self.feasibility_excellent_ratio),
            s(&self.best_title),
            s(&self.best_summary),
            s(&self.best_category),
            n(self.best_total),
            n(self.best_novelty),
            n(self.best_marketability),
            n(self.best_feasibility),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn topic(depth: &str) -> TopicRecord {
        TopicRecord {
            depth: depth.to_string(),
            topic_id: "t1".to_string(),
            broad_label: "Health".to_string(),
            medium_label: "Sleep".to_string(),
            keyword_description: "sleep, rest".to_string(),
        }
    }

    #[test]
    fn test_membership_key_by_depth() {
        assert_eq!(topic("1").membership_key(), Some((LABEL_DEPTH_1, "Health")));
        assert_eq!(topic("2").membership_key(), Some((LABEL_DEPTH_2, "Sleep")));
        assert_eq!(topic("3").membership_key(), None);
        assert_eq!(topic("").membership_key(), None);
    }

    #[test]
    fn test_load_all_trims_ids_but_not_labels() {
        let meta = crate::parser::parse_table(
            b"depth,topic_id,topic_depth_1,topic_depth_2,topic_description\n 1 , t1 ,Health ,,rest\n",
        )
        .unwrap();
        let topics = TopicRecord::load_all(&meta).unwrap();
        assert_eq!(topics[0].depth, "1");
        assert_eq!(topics[0].topic_id, "t1");
        assert_eq!(topics[0].broad_label, "Health ");
        assert_eq!(topics[0].medium_label, "");
    }

    #[test]
    fn test_preferred_field_goes_first_without_duplicates() {
        let config = ReportConfig {
            title_field: Some("name".to_string()),
            ..Default::default()
        };
        let candidates = config.title_candidates();
        assert_eq!(candidates[0], "name");
        assert_eq!(candidates.iter().filter(|c| **c == "name").count(), 1);
        assert_eq!(candidates.len(), TITLE_CANDIDATES.len());
    }

    #[test]
    fn test_unknown_preferred_field_is_prepended() {
        let config = ReportConfig {
            category_field: Some("theme".to_string()),
            ..Default::default()
        };
        let candidates = config.category_candidates();
        assert_eq!(candidates[0], "theme");
        assert_eq!(candidates.len(), CATEGORY_CANDIDATES.len() + 1);
    }

    #[test]
    fn test_default_row_has_zero_aggregates() {
        let row = TopicReport::from_topic(&topic("1"));
        assert_eq!(row.item_count, 0);
        assert_eq!(row.excellent_ratio, "0%");
        assert_eq!(row.feasibility_excellent_ratio, "0%");
        assert_eq!(row.best_total, 0.0);
        assert_eq!(row.cells().len(), REPORT_HEADERS.len());
    }
}
