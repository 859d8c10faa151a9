use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::{Response, Url};
use serde_json::{Value, json};
use std::time::Duration;
use tracing::debug;

use topic_report::sheets::api::find_sheet_in;
use topic_report::sheets::{SheetInfo, SpreadsheetApi};

const BASE_URL: &str = "https://sheets.googleapis.com/v4/spreadsheets";

pub struct GoogleSheetsClient {
    http: reqwest::Client,
    access_token: String,
}

impl GoogleSheetsClient {
    pub fn new(access_token: String) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self { http, access_token })
    }

    /// `BASE_URL/<spreadsheet_id>/<segments...>`, each segment percent-encoded.
    fn url(&self, spreadsheet_id: &str, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(BASE_URL)?;
        url.path_segments_mut()
            .map_err(|_| anyhow!("Invalid base URL {BASE_URL}"))?
            .push(spreadsheet_id)
            .extend(segments);
        Ok(url)
    }

    async fn check(response: Response) -> Result<Value> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("Sheets API returned status {}: {}", status, body));
        }
        response
            .json()
            .await
            .map_err(|e| anyhow!("Failed to parse Sheets response: {}", e))
    }

    async fn post(&self, url: Url, body: &Value) -> Result<Value> {
        debug!(url = %url, "Sheets POST");
        let response = self
            .http
            .post(url)
            .bearer_auth(&self.access_token)
            .json(body)
            .send()
            .await
            .map_err(|e| anyhow!("Failed to send request: {}", e))?;
        Self::check(response).await
    }

    async fn batch_update_raw(&self, spreadsheet_id: &str, requests: Vec<Value>) -> Result<Value> {
        let url = self.url(spreadsheet_id, &[])?;
        // `:batchUpdate` is a method suffix on the id segment, not a new segment.
        let url = Url::parse(&format!("{url}:batchUpdate"))?;
        self.post(url, &json!({"requests": requests})).await
    }
}

#[async_trait]
impl SpreadsheetApi for GoogleSheetsClient {
    async fn find_sheet(&self, spreadsheet_id: &str, title: &str) -> Result<Option<SheetInfo>> {
        let mut url = self.url(spreadsheet_id, &[])?;
        url.query_pairs_mut().append_pair(
            "fields",
            "sheets(properties(sheetId,title),conditionalFormats)",
        );

        let response = self
            .http
            .get(url)
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|e| anyhow!("Failed to send request: {}", e))?;
        let doc = Self::check(response).await?;
        Ok(find_sheet_in(&doc, title))
    }

    async fn add_sheet(
        &self,
        spreadsheet_id: &str,
        title: &str,
        rows: usize,
        cols: usize,
    ) -> Result<i64> {
        let reply = self
            .batch_update_raw(
                spreadsheet_id,
                vec![json!({
                    "addSheet": {"properties": {
                        "title": title,
                        "gridProperties": {"rowCount": rows, "columnCount": cols},
                    }}
                })],
            )
            .await?;
        reply["replies"][0]["addSheet"]["properties"]["sheetId"]
            .as_i64()
            .context("addSheet reply has no sheetId")
    }

    async fn clear_values(&self, spreadsheet_id: &str, range: &str) -> Result<()> {
        let segment = format!("{range}:clear");
        let url = self.url(spreadsheet_id, &["values", segment.as_str()])?;
        self.post(url, &json!({})).await?;
        Ok(())
    }

    async fn update_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
        values: Vec<Vec<Value>>,
    ) -> Result<()> {
        let mut url = self.url(spreadsheet_id, &["values", range])?;
        url.query_pairs_mut()
            .append_pair("valueInputOption", "USER_ENTERED");

        let body = json!({"range": range, "majorDimension": "ROWS", "values": values});
        debug!(url = %url, rows = values.len(), "Sheets PUT");
        let response = self
            .http
            .put(url)
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| anyhow!("Failed to send request: {}", e))?;
        Self::check(response).await?;
        Ok(())
    }

    async fn batch_update(&self, spreadsheet_id: &str, requests: Vec<Value>) -> Result<()> {
        if requests.is_empty() {
            return Ok(());
        }
        self.batch_update_raw(spreadsheet_id, requests).await?;
        Ok(())
    }
}
