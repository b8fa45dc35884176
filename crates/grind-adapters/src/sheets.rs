//! Google Sheets report sink
//!
//! Replaces the content of one worksheet with the report table: ensures the
//! worksheet exists, clears it, writes the grid at `A1` and freezes the
//! header row. The OAuth access token is supplied by the caller.

use crate::error::{AdapterError, AdapterResult};
use crate::traits::ReportSink;
use async_trait::async_trait;
use grind_core::ReportTable;
use serde_json::{json, Value};

/// Sheets API v4 base URL
pub const SHEETS_API_BASE: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// Default worksheet title
pub const DEFAULT_WORKSHEET: &str = "Sheet1";

/// Sink writing to one worksheet of a spreadsheet
#[derive(Debug, Clone)]
pub struct SheetsSink {
    http: reqwest::Client,
    token: String,
    spreadsheet_id: String,
    worksheet: String,
    base_url: String,
}

impl SheetsSink {
    /// Sink for `worksheet` of `spreadsheet_id`
    pub fn new(
        token: impl Into<String>,
        spreadsheet_id: impl Into<String>,
        worksheet: impl Into<String>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            token: token.into(),
            spreadsheet_id: spreadsheet_id.into(),
            worksheet: worksheet.into(),
            base_url: SHEETS_API_BASE.to_string(),
        }
    }

    /// With API base URL
    #[inline]
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn url(&self, suffix: &str) -> String {
        format!("{}/{}{}", self.base_url, self.spreadsheet_id, suffix)
    }

    async fn send(&self, method: &str, request: reqwest::RequestBuilder) -> AdapterResult<Value> {
        let resp = request.bearer_auth(&self.token).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(AdapterError::api(
                "sheets",
                method,
                format!("{status}: {}", api_error_message(&text)),
            ));
        }
        Ok(resp.json().await?)
    }

    async fn batch_update(&self, requests: Value) -> AdapterResult<Value> {
        let request = self
            .http
            .post(self.url(":batchUpdate"))
            .json(&json!({ "requests": requests }));
        self.send("batchUpdate", request).await
    }

    /// Sheet id of the worksheet, adding it when missing
    async fn ensure_worksheet(&self) -> AdapterResult<i64> {
        let request = self
            .http
            .get(self.url(""))
            .query(&[("fields", "sheets.properties")]);
        let meta = self.send("get", request).await?;
        if let Some(id) = find_sheet_id(&meta, &self.worksheet) {
            return Ok(id);
        }

        tracing::info!("Adding worksheet '{}'", self.worksheet);
        let reply = self
            .batch_update(json!([{ "addSheet": { "properties": { "title": self.worksheet } } }]))
            .await?;
        reply
            .pointer("/replies/0/addSheet/properties/sheetId")
            .and_then(Value::as_i64)
            .ok_or_else(|| AdapterError::Payload("addSheet reply without sheetId".into()))
    }
}

#[async_trait]
impl ReportSink for SheetsSink {
    async fn publish(&self, table: &ReportTable) -> AdapterResult<()> {
        let sheet_id = self.ensure_worksheet().await?;
        let range = a1_sheet(&self.worksheet);

        let clear = self
            .http
            .post(self.url("/values:batchClear"))
            .json(&json!({ "ranges": [range] }));
        self.send("values.batchClear", clear).await?;

        let update = self.http.post(self.url("/values:batchUpdate")).json(&json!({
            "valueInputOption": "RAW",
            "data": [{ "range": format!("{range}!A1"), "values": sheet_values(table) }],
        }));
        self.send("values.batchUpdate", update).await?;

        self.batch_update(json!([{
            "updateSheetProperties": {
                "properties": { "sheetId": sheet_id, "gridProperties": { "frozenRowCount": 1 } },
                "fields": "gridProperties.frozenRowCount",
            }
        }]))
        .await?;

        tracing::info!(
            "Published {} rows to worksheet '{}'",
            table.len(),
            self.worksheet
        );
        Ok(())
    }
}

/// Worksheet title quoted for A1 notation
#[must_use]
pub fn a1_sheet(title: &str) -> String {
    format!("'{}'", title.replace('\'', "''"))
}

/// Header and rows as JSON cells; counters stay numeric
#[must_use]
pub fn sheet_values(table: &ReportTable) -> Vec<Vec<Value>> {
    std::iter::once(grind_core::REPORT_HEADER.iter().map(|h| json!(h)).collect::<Vec<_>>())
        .chain(table.rows.iter().map(|r| {
            vec![
                json!(r.name),
                json!(r.highest_react),
                json!(r.mentions),
                json!(r.posts),
                json!(r.total),
            ]
        }))
        .collect()
}

fn find_sheet_id(meta: &Value, title: &str) -> Option<i64> {
    meta.get("sheets")?
        .as_array()?
        .iter()
        .filter_map(|s| s.get("properties"))
        .find(|p| p.get("title").and_then(Value::as_str) == Some(title))
        .and_then(|p| p.get("sheetId"))
        .and_then(Value::as_i64)
}

fn api_error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.pointer("/error/message").and_then(Value::as_str).map(String::from))
        .unwrap_or_else(|| body.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use grind_core::ReportRow;

    #[test]
    fn quotes_titles() {
        assert_eq!(a1_sheet("Sheet1"), "'Sheet1'");
        assert_eq!(a1_sheet("Bob's"), "'Bob''s'");
    }

    #[test]
    fn values_grid() {
        let table = ReportTable {
            rows: vec![ReportRow {
                name: "Ada".into(),
                highest_react: 0,
                mentions: 2,
                posts: 3,
                total: 5,
            }],
        };
        let values = sheet_values(&table);
        assert_eq!(values.len(), 2);
        assert_eq!(values[0][0], json!("Name"));
        assert_eq!(values[1], vec![json!("Ada"), json!(0), json!(2), json!(3), json!(5)]);
    }

    #[test]
    fn finds_existing_sheet() {
        let meta = json!({"sheets": [
            {"properties": {"sheetId": 0, "title": "Sheet1"}},
            {"properties": {"sheetId": 77, "title": "Totals"}}
        ]});
        assert_eq!(find_sheet_id(&meta, "Totals"), Some(77));
        assert_eq!(find_sheet_id(&meta, "Missing"), None);
    }

    #[test]
    fn error_message_extraction() {
        let body = r#"{"error": {"code": 403, "message": "The caller does not have permission"}}"#;
        assert_eq!(api_error_message(body), "The caller does not have permission");
        assert_eq!(api_error_message("gateway timeout\n"), "gateway timeout");
    }
}
