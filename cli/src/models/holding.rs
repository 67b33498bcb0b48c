use crate::error::{HoldingsError, HoldingsResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One constituent of the ETF on one trading date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoldingRecord {
    pub date: String, // Format: YYYY-MM-DD
    pub stock_code: String,
    pub stock_name: String,
    pub shares: u64,
    pub weight: f64, // Percent of fund NAV
}

impl HoldingRecord {
    pub fn new(
        date: impl Into<String>,
        stock_code: impl Into<String>,
        stock_name: impl Into<String>,
        shares: u64,
        weight: f64,
    ) -> Self {
        Self {
            date: date.into(),
            stock_code: stock_code.into(),
            stock_name: stock_name.into(),
            shares,
            weight,
        }
    }

    /// Month this record belongs to, derived from its date prefix
    pub fn month(&self) -> Option<MonthKey> {
        MonthKey::from_date(&self.date)
    }
}

/// Calendar month key in `YYYY-MM` form.
///
/// Ordering is lexicographic, which matches chronological order for
/// zero-padded keys.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MonthKey(String);

impl MonthKey {
    pub fn parse(value: &str) -> HoldingsResult<Self> {
        let value = value.trim();
        let bytes = value.as_bytes();
        let well_formed = bytes.len() == 7
            && bytes[4] == b'-'
            && bytes[..4].iter().all(u8::is_ascii_digit)
            && bytes[5..].iter().all(u8::is_ascii_digit);
        if !well_formed {
            return Err(HoldingsError::InvalidMonth(value.to_string()));
        }

        let month: u32 = value[5..]
            .parse()
            .map_err(|_| HoldingsError::InvalidMonth(value.to_string()))?;
        if !(1..=12).contains(&month) {
            return Err(HoldingsError::InvalidMonth(value.to_string()));
        }

        Ok(Self(value.to_string()))
    }

    /// Month key of a `YYYY-MM-DD` date string
    pub fn from_date(date: &str) -> Option<Self> {
        date.get(..7).and_then(|prefix| Self::parse(prefix).ok())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Prefix match of a `YYYY-MM-DD` date against this month
    pub fn contains_date(&self, date: &str) -> bool {
        date.starts_with(self.0.as_str())
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for MonthKey {
    type Error = HoldingsError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<MonthKey> for String {
    fn from(key: MonthKey) -> Self {
        key.0
    }
}

/// Raw CSV row as written by the collector (`holdings_YYYY-MM.csv`)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawHoldingRow {
    #[serde(rename = "日期")]
    pub date: String,
    #[serde(rename = "股票代號")]
    pub stock_code: String,
    #[serde(rename = "股票名稱")]
    pub stock_name: String,
    #[serde(rename = "股數")]
    pub shares: String,
    #[serde(rename = "權重")]
    pub weight: String,
}

impl RawHoldingRow {
    /// Validate and convert to a typed record.
    ///
    /// Date and stock code must be present; numeric fields that fail to
    /// parse become 0.
    pub fn to_holding_record(&self) -> HoldingsResult<HoldingRecord> {
        let date = self.date.trim();
        NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .map_err(|_| HoldingsError::InvalidDate(date.to_string()))?;

        let stock_code = self.stock_code.trim();
        if stock_code.is_empty() {
            return Err(HoldingsError::InvalidDate(format!("{} (missing stock code)", date)));
        }

        Ok(HoldingRecord::new(
            date,
            stock_code,
            self.stock_name.trim(),
            parse_shares(&self.shares),
            parse_weight(&self.weight),
        ))
    }
}

impl From<&HoldingRecord> for RawHoldingRow {
    fn from(record: &HoldingRecord) -> Self {
        Self {
            date: record.date.clone(),
            stock_code: record.stock_code.clone(),
            stock_name: record.stock_name.clone(),
            shares: crate::utils::format_number(record.shares as i64),
            // Shortest round-trip text
            weight: record.weight.to_string(),
        }
    }
}

/// Parse a share count such as `"1,234,000"`; anything unparsable is 0
pub fn parse_shares(text: &str) -> u64 {
    let cleaned: String = text.trim().chars().filter(|c| *c != ',').collect();
    cleaned
        .parse::<u64>()
        .ok()
        .or_else(|| {
            cleaned
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite() && *v >= 0.0)
                .map(|v| v.trunc() as u64)
        })
        .unwrap_or(0)
}

/// Parse a weight percent such as `"3.50"` or `"3.50%"`; anything unparsable is 0
pub fn parse_weight(text: &str) -> f64 {
    text.trim()
        .trim_end_matches('%')
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}
