use crate::{
    error::{HoldingsError, HoldingsResult},
    models::{HoldingRecord, HoldingsDataset, MonthKey, RawHoldingRow},
    utils::{log_load, Logger, Timer},
};
use regex::Regex;
use std::{
    collections::{BTreeMap, HashSet},
    fs,
    path::PathBuf,
};

const UTF8_BOM: &str = "\u{feff}";

/// Reads and writes monthly holdings files (`holdings_YYYY-MM.csv`) in one directory
pub struct HoldingsCsvService {
    data_dir: PathBuf,
    file_pattern: Regex,
    logger: Logger,
}

impl HoldingsCsvService {
    pub fn new(data_dir: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let data_dir = data_dir.into();
        let file_pattern = Regex::new(r"^holdings_(\d{4}-\d{2})\.csv$")?;
        let logger = Logger::new("CSV_SERVICE");

        logger.info(&format!("📁 Holdings data folder: {}", data_dir.display()));

        Ok(Self {
            data_dir,
            file_pattern,
            logger,
        })
    }

    pub fn month_path(&self, month: &MonthKey) -> PathBuf {
        self.data_dir.join(format!("holdings_{}.csv", month))
    }

    /// Months that have a holdings file, ascending
    pub fn available_months(&self) -> HoldingsResult<Vec<MonthKey>> {
        if !self.data_dir.exists() {
            self.logger.warn(&format!("Data folder does not exist: {}", self.data_dir.display()));
            return Ok(Vec::new());
        }

        let mut months = Vec::new();
        for entry in fs::read_dir(&self.data_dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let file_name = entry.file_name();
            let Some(captures) = file_name.to_str().and_then(|name| self.file_pattern.captures(name)) else {
                continue;
            };
            match MonthKey::parse(&captures[1]) {
                Ok(month) => months.push(month),
                Err(e) => self.logger.warn_with_error("Skipping holdings file", &e),
            }
        }

        months.sort();
        self.logger.debug(&format!("Detected {} monthly files", months.len()));
        Ok(months)
    }

    pub fn load_month(&self, month: &MonthKey) -> HoldingsResult<Vec<HoldingRecord>> {
        let path = self.month_path(month);
        if !path.exists() {
            return Err(HoldingsError::MonthNotFound(month.to_string()));
        }
        let content = fs::read_to_string(&path)?;
        let records = parse_holdings_csv(&content)?;
        self.logger.debug(&format!("Loaded {}: {} records", month, records.len()));
        Ok(records)
    }

    /// Load every available month. Months that fail to load or contain no rows are skipped.
    pub fn load_dataset(&self) -> HoldingsResult<HoldingsDataset> {
        let timer = Timer::start("holdings load");
        let mut months = BTreeMap::new();

        for month in self.available_months()? {
            match self.load_month(&month) {
                Ok(records) if !records.is_empty() => {
                    months.insert(month, records);
                }
                Ok(_) => self.logger.warn(&format!("Holdings file for {} has no rows", month)),
                Err(e) => self.logger.warn_with_error(&format!("Failed to load {}", month), &e),
            }
        }

        let dataset = HoldingsDataset::new(months);
        log_load(&format!(
            "✅ Loaded {} months, {} records",
            dataset.months().len(),
            dataset.record_count()
        ));
        timer.log_elapsed();
        Ok(dataset)
    }

    /// Merge `records` into the month's file.
    ///
    /// Any date present in `records` replaces that whole date in the existing
    /// file. Output is sorted by date ascending, then weight descending.
    pub fn save_month(&self, month: &MonthKey, records: &[HoldingRecord]) -> HoldingsResult<usize> {
        if records.is_empty() {
            return Ok(0);
        }
        fs::create_dir_all(&self.data_dir)?;

        let path = self.month_path(month);
        let new_dates: HashSet<&str> = records.iter().map(|r| r.date.as_str()).collect();

        let mut merged: Vec<HoldingRecord> = if path.exists() {
            parse_holdings_csv(&fs::read_to_string(&path)?)?
                .into_iter()
                .filter(|r| !new_dates.contains(r.date.as_str()))
                .collect()
        } else {
            Vec::new()
        };
        merged.extend(records.iter().cloned());
        merged.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| b.weight.total_cmp(&a.weight)));

        let content = write_holdings_csv(&merged)?;
        fs::write(&path, content)?;

        self.logger.info(&format!("💾 Saved {} records to {}", merged.len(), path.display()));
        Ok(merged.len())
    }
}

/// Parse holdings CSV text (header row required, BOM tolerated).
///
/// Rows that fail validation are logged and skipped.
pub fn parse_holdings_csv(content: &str) -> HoldingsResult<Vec<HoldingRecord>> {
    let content = content.strip_prefix(UTF8_BOM).unwrap_or(content);
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut records = Vec::new();
    for result in reader.deserialize::<RawHoldingRow>() {
        match result.map_err(HoldingsError::from).and_then(|raw| raw.to_holding_record()) {
            Ok(record) => records.push(record),
            Err(e) => tracing::debug!("Skipping holdings row: {}", e),
        }
    }
    Ok(records)
}

/// Serialize records with a UTF-8 BOM so spreadsheet tools detect the encoding
pub fn write_holdings_csv(records: &[HoldingRecord]) -> HoldingsResult<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for record in records {
        writer.serialize(RawHoldingRow::from(record))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| HoldingsError::Io(e.into_error()))?;
    Ok(format!("{}{}", UTF8_BOM, String::from_utf8_lossy(&bytes)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\u{feff}日期,股票代號,股票名稱,股數,權重\n\
        2025-06-02,2330,台積電,\"1,234,000\",9.51\n\
        2025-06-02,2317,鴻海,56000,3.20\n\
        ,9999,缺日期,1,1\n\
        2025-06-03,1234\n\
        2025-06-03,2330,台積電,\"1,240,000\",n/a\n";

    #[test]
    fn parses_bom_quoted_numbers_and_skips_bad_rows() {
        let records = parse_holdings_csv(SAMPLE).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].stock_code, "2330");
        assert_eq!(records[0].shares, 1_234_000);
        assert_eq!(records[1].weight, 3.2);
        assert_eq!(records[2].weight, 0.0);
    }

    #[test]
    fn detects_monthly_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("holdings_2025-06.csv"), SAMPLE).unwrap();
        fs::write(dir.path().join("holdings_2025-05.csv"), SAMPLE).unwrap();
        fs::write(dir.path().join("holdings_2025-13.csv"), SAMPLE).unwrap();
        fs::write(dir.path().join("notes.txt"), "x").unwrap();

        let service = HoldingsCsvService::new(dir.path()).unwrap();
        let months: Vec<String> = service.available_months().unwrap().into_iter().map(String::from).collect();
        assert_eq!(months, vec!["2025-05", "2025-06"]);
    }

    #[test]
    fn missing_directory_has_no_months() {
        let dir = tempfile::tempdir().unwrap();
        let service = HoldingsCsvService::new(dir.path().join("absent")).unwrap();
        assert!(service.available_months().unwrap().is_empty());
        assert!(service.load_dataset().unwrap().is_empty());
    }

    #[test]
    fn save_replaces_dates_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        let service = HoldingsCsvService::new(dir.path()).unwrap();
        let june = MonthKey::parse("2025-06").unwrap();

        service
            .save_month(
                &june,
                &[
                    HoldingRecord::new("2025-06-03", "A", "a", 10, 1.0),
                    HoldingRecord::new("2025-06-02", "A", "a", 10, 1.0),
                    HoldingRecord::new("2025-06-02", "B", "b", 1_500, 2.0),
                ],
            )
            .unwrap();

        // Re-collecting 06-03 replaces that day only
        let total = service
            .save_month(&june, &[HoldingRecord::new("2025-06-03", "C", "c", 5, 4.0)])
            .unwrap();
        assert_eq!(total, 3);

        let raw = fs::read_to_string(service.month_path(&june)).unwrap();
        assert!(raw.starts_with(UTF8_BOM));
        assert!(raw.contains("\"1,500\""));

        let records = service.load_month(&june).unwrap();
        let keys: Vec<(&str, &str)> = records.iter().map(|r| (r.date.as_str(), r.stock_code.as_str())).collect();
        assert_eq!(keys, vec![("2025-06-02", "B"), ("2025-06-02", "A"), ("2025-06-03", "C")]);
        assert_eq!(records[0].shares, 1_500);
    }

    #[test]
    fn save_leaves_other_dates_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let service = HoldingsCsvService::new(dir.path()).unwrap();
        let june = MonthKey::parse("2025-06").unwrap();
        fs::write(
            service.month_path(&june),
            "\u{feff}日期,股票代號,股票名稱,股數,權重\n2025-06-02,2330,台積電,1000,3.456\n",
        )
        .unwrap();

        service
            .save_month(&june, &[HoldingRecord::new("2025-06-03", "2330", "台積電", 1_000, 3.5)])
            .unwrap();

        let raw = fs::read_to_string(service.month_path(&june)).unwrap();
        assert!(raw.contains("2025-06-02,2330,台積電,\"1,000\",3.456"));

        let records = service.load_month(&june).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].date, "2025-06-02");
        assert_eq!(records[0].weight, 3.456);
        assert_eq!(records[1].weight, 3.5);
    }

    #[test]
    fn load_dataset_groups_by_month() {
        let dir = tempfile::tempdir().unwrap();
        let service = HoldingsCsvService::new(dir.path()).unwrap();
        fs::write(dir.path().join("holdings_2025-06.csv"), SAMPLE).unwrap();
        fs::write(dir.path().join("holdings_2025-07.csv"), "日期,股票代號,股票名稱,股數,權重\n").unwrap();

        let dataset = service.load_dataset().unwrap();
        let months: Vec<String> = dataset.months().into_iter().map(String::from).collect();
        assert_eq!(months, vec!["2025-06"]);
        assert_eq!(dataset.record_count(), 3);
    }
}
