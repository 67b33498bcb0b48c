use crate::models::HoldingRecord;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_FUND_ASSETS_URL: &str =
    "https://www.nomurafunds.com.tw/API/ETFAPI/api/Fund/GetFundAssets";
pub const DEFAULT_FUND_ID: &str = "00980A";
pub const DEFAULT_START_DATE: &str = "2025-05-02";
pub const DEFAULT_TIMEZONE: &str = "Asia/Taipei";
pub const DEFAULT_ORIGIN: &str = "https://www.nomurafunds.com.tw";
pub const DEFAULT_REFERER: &str = "https://www.nomurafunds.com.tw/";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Title of the equity table inside the fund assets response
pub const STOCK_TABLE_TITLE: &str = "股票";

/// Configuration for the daily holdings collector
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectorConfig {
    pub api_url: String,
    pub fund_id: String,
    pub data_dir: PathBuf,
    pub request_delay_ms: u64,
    pub request_timeout_secs: u64,
    pub default_start_date: String,
    pub timezone: String,
    /// Browser-style headers the endpoint expects on every request
    pub origin: String,
    pub referer: String,
    pub user_agent: String,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_FUND_ASSETS_URL.to_string(),
            fund_id: DEFAULT_FUND_ID.to_string(),
            data_dir: PathBuf::from("docs/data"),
            request_delay_ms: 1000,
            request_timeout_secs: 30,
            default_start_date: DEFAULT_START_DATE.to_string(),
            timezone: DEFAULT_TIMEZONE.to_string(),
            origin: DEFAULT_ORIGIN.to_string(),
            referer: DEFAULT_REFERER.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Request body for the fund assets endpoint
#[derive(Debug, Clone, Serialize)]
pub struct FundAssetsRequest {
    #[serde(rename = "FundID")]
    pub fund_id: String,
    #[serde(rename = "SearchDate")]
    pub search_date: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct FundAssetsResponse {
    #[serde(rename = "Entries", default)]
    pub entries: Option<FundAssetsEntries>,
}

#[derive(Debug, Default, Deserialize)]
pub struct FundAssetsEntries {
    #[serde(rename = "Data", default)]
    pub data: Option<FundAssetsData>,
}

#[derive(Debug, Default, Deserialize)]
pub struct FundAssetsData {
    #[serde(rename = "Table", default)]
    pub tables: Vec<FundAssetsTable>,
}

#[derive(Debug, Default, Deserialize)]
pub struct FundAssetsTable {
    #[serde(rename = "TableTitle", default)]
    pub title: String,
    #[serde(rename = "Rows", default)]
    pub rows: Vec<Vec<serde_json::Value>>,
}

impl FundAssetsResponse {
    /// Extract the equity holdings for `date`; rows with fewer than 4 cells are skipped
    pub fn into_holdings(self, date: &str) -> Vec<HoldingRecord> {
        let tables = self
            .entries
            .and_then(|entries| entries.data)
            .map(|data| data.tables)
            .unwrap_or_default();

        let Some(stock_table) = tables.into_iter().find(|t| t.title == STOCK_TABLE_TITLE) else {
            return Vec::new();
        };

        stock_table
            .rows
            .iter()
            .filter(|row| row.len() >= 4)
            .filter_map(|row| {
                let code = cell_text(&row[0]);
                if code.is_empty() {
                    return None;
                }
                Some(HoldingRecord::new(
                    date,
                    code,
                    cell_text(&row[1]),
                    crate::models::parse_shares(&cell_text(&row[2])),
                    crate::models::parse_weight(&cell_text(&row[3])),
                ))
            })
            .collect()
    }
}

fn cell_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.trim().to_string(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}
