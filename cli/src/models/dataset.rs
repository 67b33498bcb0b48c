use crate::error::{HoldingsError, HoldingsResult};
use crate::models::{HoldingRecord, MonthKey};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// All loaded months of holdings, keyed and ordered by month
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HoldingsDataset {
    months: BTreeMap<MonthKey, Vec<HoldingRecord>>,
}

impl HoldingsDataset {
    pub fn new(months: BTreeMap<MonthKey, Vec<HoldingRecord>>) -> Self {
        Self { months }
    }

    /// Build from flat records, bucketing each by its date's month.
    /// Records whose date has no valid month prefix are dropped.
    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = HoldingRecord>,
    {
        let mut months: BTreeMap<MonthKey, Vec<HoldingRecord>> = BTreeMap::new();
        for record in records {
            if let Some(month) = record.month() {
                months.entry(month).or_default().push(record);
            }
        }
        Self { months }
    }

    pub fn is_empty(&self) -> bool {
        self.months.is_empty()
    }

    /// Available months, ascending
    pub fn months(&self) -> Vec<MonthKey> {
        self.months.keys().cloned().collect()
    }

    pub fn month_records(&self, month: &MonthKey) -> HoldingsResult<&[HoldingRecord]> {
        self.months
            .get(month)
            .map(Vec::as_slice)
            .ok_or_else(|| HoldingsError::MonthNotFound(month.to_string()))
    }

    /// The loaded month immediately before `month`, if any
    pub fn previous_month(&self, month: &MonthKey) -> Option<(&MonthKey, &[HoldingRecord])> {
        self.months
            .range(..month)
            .next_back()
            .map(|(key, records)| (key, records.as_slice()))
    }

    /// Every record, month by month in file order
    pub fn all_records(&self) -> Vec<HoldingRecord> {
        self.months.values().flatten().cloned().collect()
    }

    pub fn record_count(&self) -> usize {
        self.months.values().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset() -> HoldingsDataset {
        HoldingsDataset::from_records(vec![
            HoldingRecord::new("2025-07-01", "A", "a", 1, 1.0),
            HoldingRecord::new("2025-05-30", "A", "a", 1, 1.0),
            HoldingRecord::new("2025-06-02", "A", "a", 1, 1.0),
            HoldingRecord::new("garbage", "A", "a", 1, 1.0),
        ])
    }

    #[test]
    fn months_are_ordered_and_invalid_dates_dropped() {
        let data = dataset();
        let months: Vec<String> = data.months().into_iter().map(String::from).collect();
        assert_eq!(months, vec!["2025-05", "2025-06", "2025-07"]);
        assert_eq!(data.record_count(), 3);
    }

    #[test]
    fn previous_month_lookup() {
        let data = dataset();
        let june = MonthKey::parse("2025-06").unwrap();
        let (prev, records) = data.previous_month(&june).unwrap();
        assert_eq!(prev.as_str(), "2025-05");
        assert_eq!(records.len(), 1);

        let may = MonthKey::parse("2025-05").unwrap();
        assert!(data.previous_month(&may).is_none());
    }

    #[test]
    fn missing_month_is_an_error() {
        let data = dataset();
        let august = MonthKey::parse("2025-08").unwrap();
        assert!(matches!(data.month_records(&august), Err(HoldingsError::MonthNotFound(_))));
    }
}
