use crate::error::{HoldingsError, HoldingsResult};
use crate::models::{HoldingRecord, OverviewStats};
use crate::utils::snapshots::DailySnapshots;

pub const DEFAULT_TOP_HOLDINGS: usize = 10;

/// Date span, record count, trading days and average daily constituent count
pub fn overview_stats(records: &[HoldingRecord]) -> HoldingsResult<OverviewStats> {
    let snapshots = DailySnapshots::group(records);
    let dates = snapshots.dates();
    let (Some(start), Some(end)) = (dates.first(), dates.last()) else {
        return Err(HoldingsError::NoData);
    };

    let total_holdings: usize = dates.iter().map(|d| snapshots.codes(d).len()).sum();
    let avg_holdings = (total_holdings as f64 / dates.len() as f64).round() as usize;

    Ok(OverviewStats {
        start_date: start.to_string(),
        end_date: end.to_string(),
        total_records: records.len(),
        trading_days: dates.len(),
        avg_holdings,
    })
}

/// Heaviest holdings on the most recent trading date
pub fn top_holdings(records: &[HoldingRecord], limit: usize) -> Vec<HoldingRecord> {
    let Some(latest) = records.iter().map(|r| r.date.as_str()).max() else {
        return Vec::new();
    };

    let mut latest_day: Vec<HoldingRecord> = records.iter().filter(|r| r.date == latest).cloned().collect();
    latest_day.sort_by(|a, b| b.weight.total_cmp(&a.weight));
    latest_day.truncate(limit);
    latest_day
}
