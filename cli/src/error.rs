//! Error types for the holdings loading and query layer.
//!
//! The change engine itself never fails; these errors describe absent or
//! malformed input at the data boundary.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HoldingsError {
    /// Month key not in `YYYY-MM` form
    #[error("Invalid month key: {0}")]
    InvalidMonth(String),

    /// Date not in `YYYY-MM-DD` form
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// No holdings data is loaded at all
    #[error("No holdings data available")]
    NoData,

    #[error("Month not found: {0}")]
    MonthNotFound(String),

    #[error("Stock not found: {0}")]
    StockNotFound(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl HoldingsError {
    /// True for the "input data absent" class surfaced to users as not-found.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            HoldingsError::NoData | HoldingsError::MonthNotFound(_) | HoldingsError::StockNotFound(_)
        )
    }
}

pub type HoldingsResult<T> = Result<T, HoldingsError>;
