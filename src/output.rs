//! Output formatting and persistence for topic reports.
//!
//! Supports preview logging, JSON documents, and CSV files.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::report::TopicReport;
use csv::WriterBuilder;
use std::fs::File;
use std::path::Path;

/// Rows shown by [`log_preview`] by default.
pub const PREVIEW_ROWS: usize = 20;

/// Logs the first `limit` report rows.
pub fn log_preview(rows: &[TopicReport], limit: usize) {
    for row in rows.iter().take(limit) {
        info!(
            depth = %row.depth,
            topic_id = %row.topic_id,
            broad = %row.broad_label,
            medium = %row.medium_label,
            item_count = row.item_count,
            avg_total = row.avg_total,
            excellent_ratio = %row.excellent_ratio,
            best = %row.best_title,
            "Report row"
        );
    }
    if rows.len() > limit {
        info!(shown = limit, total = rows.len(), "Preview truncated");
    }
}

/// Logs report rows using Rust's debug pretty-print format.
pub fn print_pretty(rows: &[TopicReport]) {
    debug!("{:#?}", rows);
}

/// JSON document written by [`write_json`].
#[derive(Serialize)]
pub struct ReportDocument<'a> {
    pub generated_at: DateTime<Utc>,
    pub map: &'a str,
    pub rows: &'a [TopicReport],
}

/// Serializes a report as pretty-printed JSON.
pub fn to_json(map: &str, rows: &[TopicReport]) -> Result<String> {
    let doc = ReportDocument {
        generated_at: Utc::now(),
        map,
        rows,
    };
    Ok(serde_json::to_string_pretty(&doc)?)
}

/// Writes a report as a JSON document, replacing any existing file.
pub fn write_json(path: &str, map: &str, rows: &[TopicReport]) -> Result<()> {
    let json = to_json(map, rows)?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {path}"))?;
    info!(path, rows = rows.len(), "JSON report written");
    Ok(())
}

/// Writes a report as CSV with a header row, replacing any existing file.
///
/// The file starts with a UTF-8 byte order mark so spreadsheet tools detect
/// the encoding of non-ASCII labels.
pub fn write_csv(path: &str, rows: &[TopicReport]) -> Result<()> {
    if let Some(parent) = Path::new(path).parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let mut file = File::create(path).with_context(|| format!("Failed to create {path}"))?;
    std::io::Write::write_all(&mut file, b"\xEF\xBB\xBF")?;

    let mut writer = WriterBuilder::new().has_headers(true).from_writer(file);

    if rows.is_empty() {
        writer.write_record(crate::report::types::REPORT_HEADERS)?;
    }
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    info!(path, rows = rows.len(), "CSV report written");
    Ok(())
}
