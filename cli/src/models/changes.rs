use crate::models::{HoldingRecord, MonthKey};
use serde::{Deserialize, Serialize};

/// Number of stable holdings surfaced to consumers
pub const STABLE_DISPLAY_LIMIT: usize = 20;

/// A constituent entering or leaving the fund, tagged with the day it was observed.
///
/// For additions `record` is the holding on `change_date`; for removals it is
/// the last holding seen before `change_date`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub change_date: String,
    #[serde(flatten)]
    pub record: HoldingRecord,
}

impl ChangeEvent {
    pub fn new(record: HoldingRecord, change_date: impl Into<String>) -> Self {
        Self {
            change_date: change_date.into(),
            record,
        }
    }

    pub fn stock_code(&self) -> &str {
        &self.record.stock_code
    }
}

/// Constituent held at both the anchor date and month end
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StableHolding {
    pub stock_code: String,
    pub stock_name: String,
    pub shares: u64,
    pub weight: f64,
    pub previous_weight: f64,
    pub weight_change: f64,
    pub weight_change_text: String,
}

/// One step of the rolling day-by-day comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyChange {
    pub date: String,
    pub previous_date: String,
    pub previous_count: usize,
    pub current_count: usize,
    pub added: Vec<String>,
    pub removed: Vec<String>,
}

impl DailyChange {
    pub fn is_unchanged(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Month-over-month constituent change analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthChangeReport {
    pub month: MonthKey,
    pub previous_month: Option<MonthKey>,
    pub anchor_date: Option<String>,
    pub month_end_date: Option<String>,
    pub added: Vec<ChangeEvent>,
    pub removed: Vec<ChangeEvent>,
    pub stable: Vec<StableHolding>,
    pub total_holdings_at_month_end: usize,
    pub daily: Vec<DailyChange>,
}

impl MonthChangeReport {
    /// Report with no changes, used whenever the month cannot be diffed
    pub fn empty(month: MonthKey, previous_month: Option<MonthKey>) -> Self {
        Self {
            month,
            previous_month,
            anchor_date: None,
            month_end_date: None,
            added: Vec::new(),
            removed: Vec::new(),
            stable: Vec::new(),
            total_holdings_at_month_end: 0,
            daily: Vec::new(),
        }
    }

    /// Stable holdings with the largest absolute weight change, plus how many were left out
    pub fn top_stable(&self, limit: usize) -> (&[StableHolding], usize) {
        let shown = self.stable.len().min(limit);
        (&self.stable[..shown], self.stable.len() - shown)
    }

    pub fn summary(&self) -> ChangeSummary {
        ChangeSummary {
            added: self.added.len(),
            removed: self.removed.len(),
            stable: self.stable.len(),
            total_at_month_end: self.total_holdings_at_month_end,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeSummary {
    pub added: usize,
    pub removed: usize,
    pub stable: usize,
    pub total_at_month_end: usize,
}

/// Count-only variant of the analysis shown on the month selector
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthPreview {
    pub month: MonthKey,
    pub previous_month: Option<MonthKey>,
    pub added: usize,
    pub removed: usize,
    pub stable: usize,
}
