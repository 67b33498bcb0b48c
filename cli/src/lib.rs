//! # etfwatch - Active ETF Holdings Tracker
//!
//! A Rust library for tracking the daily constituents of an actively managed ETF:
//! - Daily holdings collection from the issuer API into monthly CSV files
//! - Month-over-month change detection (additions, removals, weight moves)
//! - Filterable holdings table, per-stock history and dataset overview
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use etfwatch::prelude::*;
//!
//! fn main() -> anyhow::Result<()> {
//!     let analyzer = HoldingsAnalyzer::load("docs/data")?;
//!     for month in analyzer.months() {
//!         let report = analyzer.analyze_month(&month)?;
//!         println!("{}: +{} / -{}", month, report.added.len(), report.removed.len());
//!     }
//!     Ok(())
//! }
//! ```

// Core modules - these contain the main functionality
pub mod error;
pub mod models;
pub mod utils;
pub mod services;

// Analysis modules - high-level analysis functionality
pub mod analysis {
    //! Core analysis functionality over daily holdings snapshots

    /// Month-over-month constituent changes
    pub mod changes {
        pub use crate::models::changes::*;
        pub use crate::utils::change_engine::*;
        pub use crate::utils::snapshots::DailySnapshots;
    }

    /// Holdings table filtering, sorting and paging
    pub mod table {
        pub use crate::models::table::*;
        pub use crate::utils::holdings_table::*;
    }

    /// Per-stock history and dataset overview
    pub mod stocks {
        pub use crate::models::stock::*;
        pub use crate::utils::overview::*;
        pub use crate::utils::stock_lookup::*;
    }
}

// Public API for easy library usage
pub mod api;

// Prelude for convenient imports
pub mod prelude {
    //! Prelude module for convenient imports
    //!
    //! Import this module to get the most commonly used types and functions:
    //! ```rust
    //! use etfwatch::prelude::*;
    //! ```

    pub use crate::api::{HoldingsAnalyzer, HoldingsQueryBuilder};
    pub use crate::error::{HoldingsError, HoldingsResult};
    pub use crate::models::{
        ChangeEvent, HoldingRecord, HoldingsDataset, HoldingsPage, HoldingsQuery, MonthChangeReport,
        MonthKey, MonthPreview, StableHolding, STABLE_DISPLAY_LIMIT,
    };
    pub use crate::services::HoldingsCsvService;
}

// Re-export some commonly used utilities
pub use utils::{init_logger, Logger, Timer};
