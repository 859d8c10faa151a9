use anyhow::{Context, Result};
use serde_json::Value;
use tracing::{debug, info};

use crate::report::TopicReport;
use crate::report::types::REPORT_HEADERS;
use crate::sheets::api::SpreadsheetApi;
use crate::sheets::range::{sheet_origin, sheet_range};
use crate::sheets::requests::{resize_request, style_requests};
use crate::sheets::style::StyleConfig;

/// Size of a newly added sheet before it is resized to the report.
pub const NEW_SHEET_ROWS: usize = 100;
pub const NEW_SHEET_COLS: usize = 26;

/// Browser URL of one sheet in a spreadsheet.
pub fn sheet_url(spreadsheet_id: &str, sheet_id: i64) -> String {
    format!("https://docs.google.com/spreadsheets/d/{spreadsheet_id}/edit#gid={sheet_id}")
}

/// Header row followed by one row of cells per topic.
pub fn report_values(rows: &[TopicReport]) -> Vec<Vec<Value>> {
    std::iter::once(REPORT_HEADERS.iter().map(|h| Value::from(*h)).collect())
        .chain(rows.iter().map(TopicReport::cells))
        .collect()
}

/// Replaces the contents of `sheet_name` with the report and styles it.
///
/// The sheet is created when missing. Returns the sheet's URL.
#[tracing::instrument(skip(api, rows, style), fields(rows = rows.len()))]
pub async fn write_report<A: SpreadsheetApi + Sync>(
    api: &A,
    spreadsheet_id: &str,
    sheet_name: &str,
    rows: &[TopicReport],
    style: &StyleConfig,
) -> Result<String> {
    let (sheet_id, existing_rules) = match api.find_sheet(spreadsheet_id, sheet_name).await? {
        Some(info) => (info.sheet_id, info.conditional_rule_count),
        None => {
            let id = api
                .add_sheet(spreadsheet_id, sheet_name, NEW_SHEET_ROWS, NEW_SHEET_COLS)
                .await
                .with_context(|| format!("Failed to add sheet '{sheet_name}'"))?;
            info!(sheet_id = id, "Sheet added");
            (id, 0)
        }
    };

    let values = report_values(rows);
    let cols = REPORT_HEADERS.len();

    api.batch_update(spreadsheet_id, vec![resize_request(sheet_id, values.len(), cols)])
        .await
        .context("Failed to resize sheet")?;
    api.clear_values(spreadsheet_id, &sheet_range(sheet_name))
        .await
        .context("Failed to clear sheet")?;

    let data_rows: Vec<Vec<Value>> = values[1..].to_vec();
    api.update_values(spreadsheet_id, &sheet_origin(sheet_name), values)
        .await
        .context("Failed to write report values")?;

    let requests = style_requests(sheet_id, &REPORT_HEADERS, &data_rows, style, existing_rules)?;
    debug!(requests = requests.len(), existing_rules, "Applying sheet style");
    api.batch_update(spreadsheet_id, requests)
        .await
        .context("Failed to style sheet")?;

    let url = sheet_url(spreadsheet_id, sheet_id);
    info!(url = %url, "Report written to sheet");
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::types::TopicRecord;
    use crate::sheets::api::SheetInfo;
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Find(String),
        Add(String, usize, usize),
        Clear(String),
        Update(String, Vec<Vec<Value>>),
        Batch(Vec<Value>),
    }

    /// Records calls; knows a single existing sheet when `existing` is set.
    struct RecordingApi {
        existing: Option<SheetInfo>,
        calls: Mutex<Vec<Call>>,
    }

    impl RecordingApi {
        fn new(existing: Option<SheetInfo>) -> Self {
            Self {
                existing,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, call: Call) {
            self.calls.lock().unwrap().push(call);
        }
    }

    #[async_trait::async_trait]
    impl SpreadsheetApi for RecordingApi {
        async fn find_sheet(&self, _id: &str, title: &str) -> Result<Option<SheetInfo>> {
            self.record(Call::Find(title.to_string()));
            Ok(self.existing)
        }

        async fn add_sheet(&self, _id: &str, title: &str, rows: usize, cols: usize) -> Result<i64> {
            self.record(Call::Add(title.to_string(), rows, cols));
            Ok(77)
        }

        async fn clear_values(&self, _id: &str, range: &str) -> Result<()> {
            self.record(Call::Clear(range.to_string()));
            Ok(())
        }

        async fn update_values(&self, _id: &str, range: &str, values: Vec<Vec<Value>>) -> Result<()> {
            self.record(Call::Update(range.to_string(), values));
            Ok(())
        }

        async fn batch_update(&self, _id: &str, requests: Vec<Value>) -> Result<()> {
            self.record(Call::Batch(requests));
            Ok(())
        }
    }

    fn report(id: &str, broad: &str, medium: &str) -> TopicReport {
        TopicReport::from_topic(&TopicRecord {
            depth: "1".to_string(),
            topic_id: id.to_string(),
            broad_label: broad.to_string(),
            medium_label: medium.to_string(),
            keyword_description: String::new(),
        })
    }

    #[test]
    fn test_sheet_url() {
        assert_eq!(
            sheet_url("abc", 5),
            "https://docs.google.com/spreadsheets/d/abc/edit#gid=5"
        );
    }

    #[test]
    fn test_report_values_start_with_header() {
        let values = report_values(&[report("t1", "Health", "")]);
        assert_eq!(values.len(), 2);
        assert_eq!(values[0][0], "depth");
        assert_eq!(values[1][1], "t1");
        assert_eq!(values[1].len(), REPORT_HEADERS.len());
    }

    #[tokio::test]
    async fn test_write_report_adds_missing_sheet() {
        let api = RecordingApi::new(None);
        let rows = [report("t1", "Health", ""), report("t2", "Energy", "Solar")];

        let url = write_report(&api, "sid", "Topics", &rows, &StyleConfig::default())
            .await
            .unwrap();
        assert_eq!(url, "https://docs.google.com/spreadsheets/d/sid/edit#gid=77");

        let calls = api.calls();
        assert_eq!(calls.len(), 6);
        assert_eq!(calls[0], Call::Find("Topics".to_string()));
        assert_eq!(calls[1], Call::Add("Topics".to_string(), 100, 26));
        assert_eq!(calls[3], Call::Clear("'Topics'".to_string()));

        let Call::Batch(resize) = &calls[2] else {
            panic!("expected resize batch, got {:?}", calls[2]);
        };
        let grid = &resize[0]["updateSheetProperties"]["properties"]["gridProperties"];
        assert_eq!(grid["rowCount"], 3);
        assert_eq!(grid["columnCount"], 28);

        let Call::Update(range, values) = &calls[4] else {
            panic!("expected value update, got {:?}", calls[4]);
        };
        assert_eq!(range, "'Topics'!A1");
        assert_eq!(values.len(), 3);

        let Call::Batch(style) = &calls[5] else {
            panic!("expected style batch, got {:?}", calls[5]);
        };
        assert!(style[0].get("clearBasicFilter").is_some());
        assert!(style.iter().any(|r| r.get("setBasicFilter").is_some()));
        assert!(style.iter().any(|r| r.get("addConditionalFormatRule").is_some()));
    }

    #[tokio::test]
    async fn test_write_report_reuses_sheet_and_drops_old_rules() {
        let api = RecordingApi::new(Some(SheetInfo {
            sheet_id: 9,
            conditional_rule_count: 2,
        }));

        let url = write_report(&api, "sid", "Sheet1", &[], &StyleConfig::default())
            .await
            .unwrap();
        assert!(url.ends_with("#gid=9"));

        let calls = api.calls();
        assert!(!calls.iter().any(|c| matches!(c, Call::Add(..))));

        let Some(Call::Batch(style)) = calls.last() else {
            panic!("expected style batch last");
        };
        let deletes = style
            .iter()
            .filter(|r| r.get("deleteConditionalFormatRule").is_some())
            .count();
        assert_eq!(deletes, 2);
        // empty report: reset only
        assert!(!style.iter().any(|r| r.get("setBasicFilter").is_some()));
    }
}
