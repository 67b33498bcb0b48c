use crate::error::{HoldingsError, HoldingsResult};
use crate::models::MonthKey;
use chrono::{Datelike, NaiveDate, Utc};
use chrono_tz::Tz;

/// Parse a trading date string (YYYY-MM-DD)
pub fn parse_trading_date(date_str: &str) -> HoldingsResult<NaiveDate> {
    NaiveDate::parse_from_str(date_str.trim(), "%Y-%m-%d")
        .map_err(|_| HoldingsError::InvalidDate(date_str.to_string()))
}

/// Format a date as YYYY-MM-DD
pub fn format_trading_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn month_of(date: NaiveDate) -> HoldingsResult<MonthKey> {
    MonthKey::parse(&date.format("%Y-%m").to_string())
}

/// Check if it's weekend (Saturday or Sunday)
pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), chrono::Weekday::Sat | chrono::Weekday::Sun)
}

/// Weekdays between two dates, both ends inclusive
pub fn get_trading_days_between(start_date: NaiveDate, end_date: NaiveDate) -> Vec<NaiveDate> {
    start_date
        .iter_days()
        .take_while(|d| *d <= end_date)
        .filter(|d| !is_weekend(*d))
        .collect()
}

/// Today's date in the given IANA timezone, falling back to UTC
pub fn today_in(timezone: &str) -> NaiveDate {
    match timezone.parse::<Tz>() {
        Ok(tz) => Utc::now().with_timezone(&tz).date_naive(),
        Err(e) => {
            tracing::warn!("Failed to parse timezone '{}': {}", timezone, e);
            Utc::now().date_naive()
        }
    }
}

/// Format duration for logging
pub fn format_duration(duration_ms: f64) -> String {
    if duration_ms < 1000.0 {
        format!("{:.1}ms", duration_ms)
    } else if duration_ms < 60000.0 {
        format!("{:.1}s", duration_ms / 1000.0)
    } else {
        let minutes = (duration_ms / 60000.0).floor();
        let seconds = (duration_ms % 60000.0) / 1000.0;
        format!("{}m{:.1}s", minutes, seconds)
    }
}
