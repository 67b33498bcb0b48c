use crate::error::{HoldingsError, HoldingsResult};
use crate::models::{HoldingRecord, StockHistory, StockHistoryRow, StockOption, StockSummary};
use crate::utils::format::round2;
use std::collections::HashMap;

/// One option per stock code with its highest weight, heaviest first
pub fn stock_options(records: &[HoldingRecord]) -> Vec<StockOption> {
    let mut order: Vec<StockOption> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for record in records {
        match index.get(record.stock_code.as_str()) {
            Some(&i) => {
                if record.weight > order[i].max_weight {
                    order[i].max_weight = record.weight;
                }
            }
            None => {
                index.insert(record.stock_code.as_str(), order.len());
                order.push(StockOption {
                    code: record.stock_code.clone(),
                    name: record.stock_name.clone(),
                    max_weight: record.weight,
                });
            }
        }
    }

    order.sort_by(|a, b| b.max_weight.total_cmp(&a.max_weight));
    order
}

/// Case-insensitive match against the option label
pub fn search_options<'a>(options: &'a [StockOption], term: &str) -> Vec<&'a StockOption> {
    let term = term.trim().to_lowercase();
    options
        .iter()
        .filter(|option| term.is_empty() || option.label().to_lowercase().contains(&term))
        .collect()
}

/// Date-ordered history of one stock with day-over-day changes and summary statistics
pub fn stock_history(records: &[HoldingRecord], code: &str) -> HoldingsResult<StockHistory> {
    let code = code.trim();
    let mut matching: Vec<&HoldingRecord> = records.iter().filter(|r| r.stock_code == code).collect();
    if matching.is_empty() {
        return Err(HoldingsError::StockNotFound(code.to_string()));
    }
    matching.sort_by(|a, b| a.date.cmp(&b.date));

    let rows: Vec<StockHistoryRow> = matching
        .iter()
        .enumerate()
        .map(|(i, record)| {
            let (weight_change, shares_change) = match i.checked_sub(1).map(|p| matching[p]) {
                Some(prev) => (
                    round2(record.weight - prev.weight),
                    record.shares as i64 - prev.shares as i64,
                ),
                None => (0.0, 0),
            };
            StockHistoryRow {
                record: (*record).clone(),
                weight_change,
                shares_change,
            }
        })
        .collect();

    let weights: Vec<f64> = matching.iter().map(|r| r.weight).collect();
    let first = matching[0];
    let last = matching[matching.len() - 1];

    let summary = StockSummary {
        code: first.stock_code.clone(),
        name: first.stock_name.clone(),
        first_date: first.date.clone(),
        last_date: last.date.clone(),
        min_weight: weights.iter().copied().fold(f64::INFINITY, f64::min),
        max_weight: weights.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        avg_weight: weights.iter().sum::<f64>() / weights.len() as f64,
        min_shares: matching.iter().map(|r| r.shares).min().unwrap_or(0),
        max_shares: matching.iter().map(|r| r.shares).max().unwrap_or(0),
        record_count: matching.len(),
    };

    Ok(StockHistory { summary, rows })
}
