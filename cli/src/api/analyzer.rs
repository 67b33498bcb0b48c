//! High-level holdings analyzer for easy library usage

use crate::error::{HoldingsError, HoldingsResult};
use crate::models::{
    HoldingRecord, HoldingsDataset, HoldingsPage, HoldingsQuery, MonthChangeReport, MonthKey,
    MonthPreview, OverviewStats, StockHistory, StockOption,
};
use crate::services::HoldingsCsvService;
use crate::utils::{
    analyze_month_changes, log_analysis, overview_stats, preview_month_changes, query_holdings,
    search_options, stock_history, stock_options, top_holdings, Timer,
};
use rayon::prelude::*;
use std::path::Path;

/// Read-only view over a loaded dataset.
///
/// Every query works on the dataset handed in at construction; reloading
/// means building a new analyzer.
#[derive(Debug, Clone, Default)]
pub struct HoldingsAnalyzer {
    dataset: HoldingsDataset,
    records: Vec<HoldingRecord>,
}

impl HoldingsAnalyzer {
    pub fn new(dataset: HoldingsDataset) -> Self {
        let records = dataset.all_records();
        Self { dataset, records }
    }

    /// Load every monthly file under `data_dir`
    pub fn load(data_dir: impl AsRef<Path>) -> anyhow::Result<Self> {
        let service = HoldingsCsvService::new(data_dir.as_ref())?;
        Ok(Self::new(service.load_dataset()?))
    }

    pub fn dataset(&self) -> &HoldingsDataset {
        &self.dataset
    }

    /// Every loaded record in month order
    pub fn records(&self) -> &[HoldingRecord] {
        &self.records
    }

    pub fn months(&self) -> Vec<MonthKey> {
        self.dataset.months()
    }

    /// Full change report for `month`, diffed against the loaded month before it
    pub fn analyze_month(&self, month: &MonthKey) -> HoldingsResult<MonthChangeReport> {
        let current = self.dataset.month_records(month)?;
        let previous = self.dataset.previous_month(month);

        let report = analyze_month_changes(month, current, previous);
        let summary = report.summary();
        log_analysis(&format!(
            "{}: +{} / -{} / ={} (end total {})",
            month, summary.added, summary.removed, summary.stable, summary.total_at_month_end
        ));
        Ok(report)
    }

    /// Change counts for every loaded month, ascending
    pub fn month_previews(&self) -> Vec<MonthPreview> {
        let timer = Timer::start("month previews");
        let months = self.dataset.months();

        let previews: Vec<MonthPreview> = months
            .par_iter()
            .filter_map(|month| {
                let current = self.dataset.month_records(month).ok()?;
                Some(preview_month_changes(month, current, self.dataset.previous_month(month)))
            })
            .collect();

        timer.log_elapsed();
        previews
    }

    pub fn query_holdings(&self, query: &HoldingsQuery) -> HoldingsPage {
        query_holdings(&self.records, query)
    }

    pub fn stock_options(&self) -> Vec<StockOption> {
        stock_options(&self.records)
    }

    /// Options whose label contains `term`; an empty term returns everything
    pub fn search_stocks(&self, term: &str) -> Vec<StockOption> {
        let options = self.stock_options();
        search_options(&options, term).into_iter().cloned().collect()
    }

    pub fn stock_history(&self, code: &str) -> HoldingsResult<StockHistory> {
        stock_history(&self.records, code)
    }

    pub fn overview(&self) -> HoldingsResult<OverviewStats> {
        overview_stats(&self.records)
    }

    /// Largest positions on the latest trading date
    pub fn top_holdings(&self, limit: usize) -> HoldingsResult<Vec<HoldingRecord>> {
        if self.records.is_empty() {
            return Err(HoldingsError::NoData);
        }
        Ok(top_holdings(&self.records, limit))
    }
}
