use std::path::Path;

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::info;

use crate::growth::GrowthValue;
use crate::insight::Insight;

/// Production spreadsheet API base.
pub const SHEETS_BASE: &str = "https://sheets.googleapis.com";

/// Growth cells start at the 4th column of the row (symbol, sector,
/// sub-sector come first).
const GROWTH_START_COL: i64 = 3;

static TRAILING_ROW_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+)$").expect("valid regex"));

/// Read the bearer token from the credential JSON file. Token acquisition
/// itself is the credential issuer's concern, not this tool's.
pub fn load_token(path: &Path) -> Result<String> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading credential file {}", path.display()))?;
    let creds: Value = serde_json::from_str(&raw)
        .with_context(|| format!("parsing credential file {}", path.display()))?;
    creds
        .get("token")
        .and_then(Value::as_str)
        .map(str::to_string)
        .with_context(|| format!("credential file {} has no \"token\" field", path.display()))
}

/// Assemble the final spreadsheet row:
/// `[symbol, sector, subSector, g1..g12, concallSummary, guidance]`.
pub fn build_output_row(symbol: &str, insight: &Insight, growth: &[GrowthValue]) -> Vec<Value> {
    let mut row = Vec::with_capacity(growth.len() + 5);
    row.push(Value::String(symbol.to_string()));
    row.push(Value::String(insight.sector.clone()));
    row.push(Value::String(insight.sub_sector.clone()));
    row.extend(growth.iter().map(cell_value));
    row.push(Value::String(insight.concall_summary.clone()));
    row.push(Value::String(insight.guidance.clone()));
    row
}

/// Spreadsheet cell for a growth value: finite percentages are numbers,
/// the unavailable sentinel is `"-"`, and non-finite percentages (zero
/// prior-year base) become null, which the API writes as an empty cell.
fn cell_value(v: &GrowthValue) -> Value {
    match v {
        GrowthValue::Unavailable => Value::String("-".to_string()),
        GrowthValue::Pct(p) => serde_json::Number::from_f64(*p)
            .map(Value::Number)
            .unwrap_or(Value::Null),
    }
}

/// Background color for a growth cell: white when unavailable, green at
/// or above 10, red below (negative included; NaN compares false, so it
/// lands on red too).
fn cell_color(v: &GrowthValue) -> Value {
    match v {
        GrowthValue::Unavailable => json!({ "red": 1, "green": 1, "blue": 1 }),
        GrowthValue::Pct(p) if *p >= 10.0 => json!({ "red": 0, "green": 0.8, "blue": 0 }),
        GrowthValue::Pct(_) => json!({ "red": 1, "green": 0, "blue": 0 }),
    }
}

/// One `repeatCell` background-color request per growth cell, starting at
/// `start_col` of the (zero-indexed) appended row.
fn color_requests(row: i64, start_col: i64, growth: &[GrowthValue]) -> Vec<Value> {
    growth
        .iter()
        .enumerate()
        .map(|(i, v)| {
            let col = start_col + i as i64;
            json!({
                "repeatCell": {
                    "range": {
                        "sheetId": 0,
                        "startRowIndex": row,
                        "endRowIndex": row + 1,
                        "startColumnIndex": col,
                        "endColumnIndex": col + 1,
                    },
                    "cell": { "userEnteredFormat": { "backgroundColor": cell_color(v) } },
                    "fields": "userEnteredFormat.backgroundColor",
                }
            })
        })
        .collect()
}

/// Zero-indexed row number from an updated-range reference such as
/// `"Sheet1!A7:R7"`.
fn parse_row_index(range: &str) -> Result<i64> {
    let caps = TRAILING_ROW_NUMBER
        .captures(range)
        .with_context(|| format!("no trailing row number in range {range:?}"))?;
    let row: i64 = caps[1]
        .parse()
        .with_context(|| format!("row number out of range in {range:?}"))?;
    Ok(row - 1)
}

/// Spreadsheet API client. Use [`SheetsClient::new`] for production or
/// [`SheetsClient::with_base_url`] to point at a mock server in tests.
pub struct SheetsClient {
    client: Client,
    base_url: String,
    token: String,
}

impl SheetsClient {
    pub fn new(client: Client, token: impl Into<String>) -> Self {
        Self::with_base_url(client, token, SHEETS_BASE)
    }

    pub fn with_base_url(
        client: Client,
        token: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    /// Append `row` to `tab`, then color the 12 growth cells of the row
    /// the append landed on.
    pub async fn append_row(
        &self,
        sheet_id: &str,
        tab: &str,
        row: &[Value],
        growth: &[GrowthValue],
    ) -> Result<()> {
        let append_url = format!(
            "{}/v4/spreadsheets/{}/values/{}!A:Z:append?valueInputOption=RAW&insertDataOption=INSERT_ROWS",
            self.base_url, sheet_id, tab
        );
        let resp: Value = self
            .client
            .post(&append_url)
            .bearer_auth(&self.token)
            .json(&json!({ "values": [row] }))
            .send()
            .await
            .context("append request failed")?
            .error_for_status()
            .context("append returned non-success status")?
            .json()
            .await
            .context("reading append response")?;

        let range = resp
            .pointer("/updates/updatedRange")
            .and_then(Value::as_str)
            .context("append response missing updates.updatedRange")?;
        let row_index = parse_row_index(range)?;

        let requests = color_requests(row_index, GROWTH_START_COL, growth);
        if !requests.is_empty() {
            self.client
                .post(format!(
                    "{}/v4/spreadsheets/{}:batchUpdate",
                    self.base_url, sheet_id
                ))
                .bearer_auth(&self.token)
                .json(&json!({ "requests": requests }))
                .send()
                .await
                .context("batch format request failed")?
                .error_for_status()
                .context("batch format returned non-success status")?;
        }

        info!(tab = %tab, row = row_index, "row appended and colored");
        Ok(())
    }
}
