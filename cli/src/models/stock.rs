use crate::models::HoldingRecord;
use serde::{Deserialize, Serialize};

/// Entry of the stock picker, one per stock code
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockOption {
    pub code: String,
    pub name: String,
    pub max_weight: f64,
}

impl StockOption {
    pub fn label(&self) -> String {
        format!("{} - {} (最高權重: {:.2}%)", self.code, self.name, self.max_weight)
    }
}

/// One day of a single stock's history with day-over-day changes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockHistoryRow {
    #[serde(flatten)]
    pub record: HoldingRecord,
    pub weight_change: f64,
    pub shares_change: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockSummary {
    pub code: String,
    pub name: String,
    pub first_date: String,
    pub last_date: String,
    pub min_weight: f64,
    pub max_weight: f64,
    pub avg_weight: f64,
    pub min_shares: u64,
    pub max_shares: u64,
    pub record_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockHistory {
    pub summary: StockSummary,
    pub rows: Vec<StockHistoryRow>,
}

/// Dataset-level statistics for the landing page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverviewStats {
    pub start_date: String,
    pub end_date: String,
    pub total_records: usize,
    pub trading_days: usize,
    pub avg_holdings: usize,
}
