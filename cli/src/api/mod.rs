//! High-level API for easy library usage
//!
//! This module provides simplified interfaces for the holdings dashboards.

pub mod analyzer;
pub mod builder;

pub use analyzer::HoldingsAnalyzer;
pub use builder::HoldingsQueryBuilder;
