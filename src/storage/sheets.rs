//! Google Sheets values API client

use reqwest::{header::HeaderMap, Client, Url};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info};

use super::{CellValue, TableStore};
use crate::{core::http::bearer_header_map, error::ScoreError, Result};

/// Base path for the Sheets v4 API.
pub const SHEETS_BASE_URL: &str = "https://sheets.googleapis.com/v4/spreadsheets";

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

pub struct SheetsStore {
    client: Client,
    base_url: String,
    spreadsheet_id: String,
    headers: HeaderMap,
}

impl SheetsStore {
    pub fn new(spreadsheet_id: &str, access_token: &str) -> Result<Self> {
        Self::with_base_url(SHEETS_BASE_URL, spreadsheet_id, access_token)
    }

    /// Point the client at another host (tests use a local mock server).
    pub fn with_base_url(base_url: &str, spreadsheet_id: &str, access_token: &str) -> Result<Self> {
        let client = Client::builder().user_agent("weekly-score/1.0").build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            spreadsheet_id: spreadsheet_id.to_string(),
            headers: bearer_header_map(access_token)?,
        })
    }

    /// `{base}/{id}/values/{range}{suffix}` with the range percent-encoded.
    fn values_url(&self, range: &str, suffix: &str) -> Result<Url> {
        let mut url = Url::parse(&self.base_url).map_err(|e| ScoreError::InvalidConfig {
            key: "sheets base url".to_string(),
            value: e.to_string(),
        })?;
        url.path_segments_mut()
            .map_err(|_| ScoreError::InvalidConfig {
                key: "sheets base url".to_string(),
                value: self.base_url.clone(),
            })?
            .pop_if_empty()
            .push(&self.spreadsheet_id)
            .push("values")
            .push(&format!("{}{}", range, suffix));
        Ok(url)
    }
}

/// Quote a sheet name for A1 notation.
fn quoted(sheet: &str) -> String {
    format!("'{}'", sheet.replace('\'', "''"))
}

fn cell_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

impl TableStore for SheetsStore {
    async fn read_all(&self, sheet: &str) -> Result<Vec<Vec<String>>> {
        let url = self.values_url(&quoted(sheet), "")?;
        let range: ValueRange = self
            .client
            .get(url)
            .headers(self.headers.clone())
            .query(&[("majorDimension", "ROWS")])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let rows: Vec<Vec<String>> = range
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_text).collect())
            .collect();
        debug!(sheet, rows = rows.len(), "read sheet");
        Ok(rows)
    }

    async fn clear(&self, sheet: &str) -> Result<()> {
        let url = self.values_url(&quoted(sheet), ":clear")?;
        self.client
            .post(url)
            .headers(self.headers.clone())
            .json(&json!({}))
            .send()
            .await?
            .error_for_status()?;
        info!(sheet, "cleared sheet");
        Ok(())
    }

    async fn write_rows(
        &self,
        sheet: &str,
        start_row: usize,
        rows: &[Vec<CellValue>],
    ) -> Result<()> {
        let range = format!("{}!A{}", quoted(sheet), start_row.max(1));
        let url = self.values_url(&range, "")?;
        let body = json!({
            "range": range,
            "majorDimension": "ROWS",
            "values": rows,
        });

        self.client
            .put(url)
            .headers(self.headers.clone())
            .query(&[("valueInputOption", "USER_ENTERED")])
            .json(&body)
            .send()
            .await?
            .error_for_status()?;
        debug!(sheet, start_row, rows = rows.len(), "wrote sheet batch");
        Ok(())
    }
}
