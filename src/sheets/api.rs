//! Trait and types for talking to a spreadsheet backend.

use anyhow::Result;
use serde_json::Value;

/// What the writer needs to know about an existing sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SheetInfo {
    pub sheet_id: i64,
    /// Conditional format rules currently on the sheet.
    pub conditional_rule_count: usize,
}

/// Abstraction over a spreadsheet provider (e.g., Google Sheets).
///
/// `range` arguments are A1 references such as `'Sheet1'!A1`.
#[async_trait::async_trait]
pub trait SpreadsheetApi {
    /// Looks up a sheet by title.
    async fn find_sheet(&self, spreadsheet_id: &str, title: &str) -> Result<Option<SheetInfo>>;

    /// Adds an empty sheet and returns its id.
    async fn add_sheet(&self, spreadsheet_id: &str, title: &str, rows: usize, cols: usize)
    -> Result<i64>;

    async fn clear_values(&self, spreadsheet_id: &str, range: &str) -> Result<()>;

    /// Writes `values` starting at `range`, parsing them as if typed by a user.
    async fn update_values(&self, spreadsheet_id: &str, range: &str, values: Vec<Vec<Value>>)
    -> Result<()>;

    /// Sends one `batchUpdate` with `requests`, in order.
    async fn batch_update(&self, spreadsheet_id: &str, requests: Vec<Value>) -> Result<()>;
}

/// Finds `title` in a `spreadsheets.get` response.
pub fn find_sheet_in(spreadsheet: &Value, title: &str) -> Option<SheetInfo> {
    spreadsheet["sheets"].as_array()?.iter().find_map(|sheet| {
        let props = &sheet["properties"];
        if props["title"].as_str()? != title {
            return None;
        }
        Some(SheetInfo {
            sheet_id: props["sheetId"].as_i64().unwrap_or(0),
            conditional_rule_count: sheet["conditionalFormats"]
                .as_array()
                .map_or(0, Vec::len),
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_find_sheet_in() {
        let doc = json!({
            "sheets": [
                {"properties": {"title": "Sheet1"}},
                {
                    "properties": {"title": "Report", "sheetId": 42},
                    "conditionalFormats": [{}, {}, {}]
                }
            ]
        });

        assert_eq!(
            find_sheet_in(&doc, "Report"),
            Some(SheetInfo {
                sheet_id: 42,
                conditional_rule_count: 3
            })
        );
        // The first sheet's id is omitted by the API when it is 0.
        assert_eq!(find_sheet_in(&doc, "Sheet1").map(|s| s.sheet_id), Some(0));
        assert_eq!(find_sheet_in(&doc, "Missing"), None);
        assert_eq!(find_sheet_in(&json!({}), "Report"), None);
    }
}
