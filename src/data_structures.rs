use chrono::{DateTime, Utc};
use etfwatch::api::HoldingsAnalyzer;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;

// --- Core Data Structures ---

/// The dataset currently served, and when it was read from disk
///
/// The analyzer sits behind an `Arc` so handlers can take a snapshot and
/// release the lock before heavy work.
#[derive(Debug, Clone, Default)]
pub struct LoadedHoldings {
    pub analyzer: Arc<HoldingsAnalyzer>,
    pub loaded_at: Option<DateTime<Utc>>,
}

impl LoadedHoldings {
    pub fn new(analyzer: HoldingsAnalyzer) -> Self {
        Self {
            analyzer: Arc::new(analyzer),
            loaded_at: Some(Utc::now()),
        }
    }

    pub fn status(&self) -> ReloadStatus {
        ReloadStatus {
            months: self.analyzer.months().into_iter().map(String::from).collect(),
            records: self.analyzer.records().len(),
            loaded_at: self.loaded_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReloadStatus {
    pub months: Vec<String>,
    pub records: usize,
    pub loaded_at: Option<DateTime<Utc>>,
}

// --- Type Aliases for Shared State ---

pub type SharedData = Arc<Mutex<LoadedHoldings>>;

/// Read-only settings the handlers need
#[derive(Debug, Clone)]
pub struct ServeSettings {
    pub data_dir: PathBuf,
    pub page_size: usize,
}

pub type SharedSettings = Arc<ServeSettings>;

#[derive(Debug, Error)]
pub enum ReloadError {
    #[error(transparent)]
    Load(#[from] anyhow::Error),

    #[error("Reload task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Read every monthly file under `data_dir` and swap it into `data`.
///
/// On failure the previously served dataset stays in place.
pub async fn reload_holdings(data: &SharedData, data_dir: PathBuf) -> Result<ReloadStatus, ReloadError> {
    let loaded = tokio::task::spawn_blocking(move || HoldingsAnalyzer::load(&data_dir)).await??;

    let mut guard = data.lock().await;
    *guard = LoadedHoldings::new(loaded);
    Ok(guard.status())
}

#[cfg(test)]
mod tests {
    use super::*;
    use etfwatch::models::{HoldingRecord, HoldingsDataset};

    #[test]
    fn load_errors_keep_their_message() {
        let err = ReloadError::from(anyhow::anyhow!("permission denied"));
        assert!(matches!(err, ReloadError::Load(_)));
        assert_eq!(err.to_string(), "permission denied");
    }

    #[tokio::test]
    async fn reload_swaps_in_the_new_dataset() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("holdings_2025-06.csv"),
            "\u{feff}日期,股票代號,股票名稱,股數,權重\n2025-06-02,2330,台積電,1000,9.5\n2025-06-02,2317,鴻海,500,3.2\n",
        )
        .unwrap();

        let stale = HoldingsAnalyzer::new(HoldingsDataset::from_records(vec![HoldingRecord::new(
            "2025-05-30", "A", "Alpha", 1, 1.0,
        )]));
        let data: SharedData = Arc::new(Mutex::new(LoadedHoldings::new(stale)));
        let snapshot = data.lock().await.analyzer.clone();

        let status = reload_holdings(&data, dir.path().to_path_buf()).await.unwrap();
        assert_eq!(status.months, vec!["2025-06"]);
        assert_eq!(status.records, 2);
        assert!(status.loaded_at.is_some());

        // Earlier snapshots are unaffected by the swap
        assert_eq!(snapshot.records().len(), 1);
    }
}
