use crate::{
    models::{CollectorConfig, FundAssetsRequest, FundAssetsResponse, HoldingRecord, MonthKey},
    services::HoldingsCsvService,
    utils::{format_trading_date, get_trading_days_between, log_collect, month_of, Logger, Timer},
};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ORIGIN, REFERER, USER_AGENT};
use std::{collections::BTreeMap, time::Duration};

/// Source of one trading day's holdings
#[async_trait]
pub trait HoldingsFetcher: Send + Sync {
    async fn fetch_day(&self, date: NaiveDate) -> anyhow::Result<Vec<HoldingRecord>>;
}

/// Fetches holdings from the issuer's fund assets endpoint
pub struct NomuraFetcher {
    client: reqwest::Client,
    api_url: String,
    fund_id: String,
}

impl NomuraFetcher {
    pub fn new(config: &CollectorConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .default_headers(fund_assets_headers(config)?)
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            fund_id: config.fund_id.clone(),
        })
    }
}

/// Headers sent with every fund assets request
pub fn fund_assets_headers(config: &CollectorConfig) -> anyhow::Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(ORIGIN, HeaderValue::from_str(&config.origin)?);
    headers.insert(REFERER, HeaderValue::from_str(&config.referer)?);
    headers.insert(USER_AGENT, HeaderValue::from_str(&config.user_agent)?);
    Ok(headers)
}

#[async_trait]
impl HoldingsFetcher for NomuraFetcher {
    async fn fetch_day(&self, date: NaiveDate) -> anyhow::Result<Vec<HoldingRecord>> {
        let search_date = format_trading_date(date);
        let request = FundAssetsRequest {
            fund_id: self.fund_id.clone(),
            search_date: search_date.clone(),
        };

        let response = self
            .client
            .post(&self.api_url)
            .json(&request)
            .send()
            .await?
            .error_for_status()?;

        let body: FundAssetsResponse = response.json().await?;
        Ok(body.into_holdings(&search_date))
    }
}

/// Outcome of one collection run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollectionSummary {
    pub days_requested: usize,
    pub days_with_data: usize,
    pub records_collected: usize,
    pub months_saved: Vec<MonthKey>,
}

/// Walks a date range, fetches each weekday and saves the results month by month
pub struct HoldingsCollector<F: HoldingsFetcher> {
    fetcher: F,
    storage: HoldingsCsvService,
    request_delay: Duration,
    logger: Logger,
}

impl HoldingsCollector<NomuraFetcher> {
    pub fn from_config(config: &CollectorConfig) -> anyhow::Result<Self> {
        let fetcher = NomuraFetcher::new(config)?;
        let storage = HoldingsCsvService::new(config.data_dir.clone())?;
        Ok(Self::new(fetcher, storage, Duration::from_millis(config.request_delay_ms)))
    }
}

impl<F: HoldingsFetcher> HoldingsCollector<F> {
    pub fn new(fetcher: F, storage: HoldingsCsvService, request_delay: Duration) -> Self {
        Self {
            fetcher,
            storage,
            request_delay,
            logger: Logger::new("COLLECTOR"),
        }
    }

    /// Fetch one day; failures are logged and treated as an empty day
    pub async fn collect_day(&self, date: NaiveDate) -> Vec<HoldingRecord> {
        match self.fetcher.fetch_day(date).await {
            Ok(records) => {
                if records.is_empty() {
                    self.logger.debug(&format!("{}: no holdings", date));
                } else {
                    self.logger.info(&format!("✅ {}: {} holdings", date, records.len()));
                }
                records
            }
            Err(e) => {
                self.logger.warn(&format!("❌ {}: fetch failed: {}", date, e));
                Vec::new()
            }
        }
    }

    /// Collect every weekday in `start..=end` and persist each touched month
    pub async fn collect_range(&self, start: NaiveDate, end: NaiveDate) -> anyhow::Result<CollectionSummary> {
        let timer = Timer::start("holdings collection");
        let days = get_trading_days_between(start, end);
        log_collect(&format!("Collecting {} weekdays from {} to {}", days.len(), start, end));

        let mut summary = CollectionSummary {
            days_requested: days.len(),
            ..Default::default()
        };
        let mut by_month: BTreeMap<MonthKey, Vec<HoldingRecord>> = BTreeMap::new();

        for (i, day) in days.iter().enumerate() {
            let records = self.collect_day(*day).await;
            if !records.is_empty() {
                summary.days_with_data += 1;
                summary.records_collected += records.len();
                by_month.entry(month_of(*day)?).or_default().extend(records);
            }

            if i + 1 < days.len() && !self.request_delay.is_zero() {
                tokio::time::sleep(self.request_delay).await;
            }
        }

        for (month, records) in by_month {
            self.storage.save_month(&month, &records)?;
            summary.months_saved.push(month);
        }

        log_collect(&format!(
            "Collected {} records over {}/{} days, saved {} months",
            summary.records_collected,
            summary.days_with_data,
            summary.days_requested,
            summary.months_saved.len()
        ));
        timer.log_elapsed();
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn fund_assets_headers_come_from_config() {
        let config = CollectorConfig::default();
        let headers = fund_assets_headers(&config).unwrap();
        assert_eq!(headers[ACCEPT], "application/json");
        assert_eq!(headers[ORIGIN], "https://www.nomurafunds.com.tw");
        assert_eq!(headers[REFERER], "https://www.nomurafunds.com.tw/");
        assert!(headers[USER_AGENT].to_str().unwrap().starts_with("Mozilla/5.0"));

        let config = CollectorConfig {
            user_agent: "etfwatch/0.1".to_string(),
            ..Default::default()
        };
        assert_eq!(fund_assets_headers(&config).unwrap()[USER_AGENT], "etfwatch/0.1");
        assert!(NomuraFetcher::new(&config).is_ok());

        let config = CollectorConfig {
            referer: "bad\nvalue".to_string(),
            ..Default::default()
        };
        assert!(fund_assets_headers(&config).is_err());
        assert!(NomuraFetcher::new(&config).is_err());
    }

    struct MockFetcher {
        days: HashMap<String, Vec<HoldingRecord>>,
    }

    #[async_trait]
    impl HoldingsFetcher for MockFetcher {
        async fn fetch_day(&self, date: NaiveDate) -> anyhow::Result<Vec<HoldingRecord>> {
            let key = format_trading_date(date);
            if key == "2025-06-30" {
                anyhow::bail!("upstream error");
            }
            Ok(self.days.get(&key).cloned().unwrap_or_default())
        }
    }

    fn day(date: &str, codes: &[&str]) -> (String, Vec<HoldingRecord>) {
        let records = codes
            .iter()
            .enumerate()
            .map(|(i, code)| HoldingRecord::new(date, *code, *code, 100, i as f64 + 1.0))
            .collect();
        (date.to_string(), records)
    }

    #[tokio::test]
    async fn collects_weekdays_and_saves_per_month() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = MockFetcher {
            days: HashMap::from([
                day("2025-06-27", &["A", "B"]),
                day("2025-07-01", &["A", "C"]),
                // Weekend data is never requested
                day("2025-06-28", &["Z"]),
            ]),
        };
        let storage = HoldingsCsvService::new(dir.path()).unwrap();
        let collector = HoldingsCollector::new(fetcher, storage, Duration::ZERO);

        let start = NaiveDate::from_ymd_opt(2025, 6, 27).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 7, 1).unwrap();
        let summary = collector.collect_range(start, end).await.unwrap();

        // Fri 27, Mon 30 (fails), Tue 1
        assert_eq!(summary.days_requested, 3);
        assert_eq!(summary.days_with_data, 2);
        assert_eq!(summary.records_collected, 4);
        let months: Vec<&str> = summary.months_saved.iter().map(MonthKey::as_str).collect();
        assert_eq!(months, vec!["2025-06", "2025-07"]);

        let reader = HoldingsCsvService::new(dir.path()).unwrap();
        let june = reader.load_month(&MonthKey::parse("2025-06").unwrap()).unwrap();
        assert_eq!(june.len(), 2);
        assert!(june.iter().all(|r| r.date == "2025-06-27"));
        // Weight descending within the date
        assert_eq!(june[0].stock_code, "B");
    }

    #[tokio::test]
    async fn empty_range_saves_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = MockFetcher { days: HashMap::new() };
        let storage = HoldingsCsvService::new(dir.path()).unwrap();
        let collector = HoldingsCollector::new(fetcher, storage, Duration::ZERO);

        let start = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
        let summary = collector.collect_range(start, start).await.unwrap();
        assert_eq!(summary.days_requested, 1);
        assert!(summary.months_saved.is_empty());
        assert!(std::fs::read_dir(dir.path()).unwrap().next().is_none());
    }
}
