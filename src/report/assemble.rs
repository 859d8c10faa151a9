use anyhow::Result;
use tracing::{debug, info};

use crate::report::aggregate::{ScoreVectors, aggregate_topic, select_subset};
use crate::report::best::{TextFields, select_best};
use crate::report::types::{
    LABEL_DEPTH_1, LABEL_DEPTH_2, ROW_NUMBER, ReportConfig, TopicRecord, TopicReport,
};
use crate::table::MapTables;

/// Builds one [`TopicReport`] per topic node of the map.
///
/// Either every topic is aggregated or an error is returned; there are no
/// partial results.
///
/// # Errors
///
/// Returns an error when a table lacks a structural column (topic identity
/// fields, membership labels or `row_number`). Missing score or text columns
/// are not errors.
#[tracing::instrument(skip_all, fields(topics = tables.meta.len(), items = tables.data.len()))]
pub fn build_report(tables: &MapTables, config: &ReportConfig) -> Result<Vec<TopicReport>> {
    let topics = TopicRecord::load_all(&tables.meta)?;
    tables
        .topics
        .require_columns("topics", &[LABEL_DEPTH_1, LABEL_DEPTH_2, ROW_NUMBER])?;
    tables.data.require_columns("data", &[ROW_NUMBER])?;

    let fields = TextFields::resolve(&tables.data, config);
    debug!(
        title = ?fields.title,
        summary = ?fields.summary,
        category = ?fields.category,
        "Resolved descriptive columns"
    );

    for (label, name) in [
        ("novelty", &config.scores.novelty),
        ("feasibility", &config.scores.feasibility),
        ("marketability", &config.scores.marketability),
    ] {
        if !tables.data.has_column(name) {
            info!(dimension = label, column = %name, "Score column not found, treating as zero");
        }
    }

    let rows: Vec<TopicReport> = topics
        .iter()
        .map(|topic| {
            if topic.membership_key().is_none() {
                debug!(
                    topic_id = %topic.topic_id,
                    depth = %topic.depth,
                    "No membership rule for depth, leaving aggregates at defaults"
                );
            }

            let subset = select_subset(topic, &tables.topics, &tables.data);
            let scores = ScoreVectors::collect(&tables.data, &config.scores, &subset.rows);
            let agg = aggregate_topic(subset.member_count, &scores, &tables.data, &config.scores);
            let best = select_best(&tables.data, &subset.rows, &scores, &fields);

            debug!(
                topic_id = %topic.topic_id,
                item_count = agg.item_count,
                avg_total = agg.avg_total,
                "Topic aggregated"
            );

            let mut row = TopicReport::from_topic(topic);
            row.item_count = agg.item_count;
            row.avg_total = agg.avg_total;
            row.avg_novelty = agg.avg_novelty;
            row.avg_marketability = agg.avg_marketability;
            row.avg_feasibility = agg.avg_feasibility;
            row.excellent_count = agg.excellent_count;
            row.excellent_ratio = agg.excellent_ratio;
            row.with_details(agg.novelty, agg.marketability, agg.feasibility)
                .with_best(best)
        })
        .collect();

    info!(rows = rows.len(), "Report assembled");
    Ok(rows)
}
