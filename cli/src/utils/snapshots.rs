use crate::models::HoldingRecord;
use std::collections::{BTreeMap, HashMap, HashSet};

/// Holdings grouped by trading date.
///
/// Dates iterate in ascending lexicographic order, which is chronological
/// for `YYYY-MM-DD` strings. Within one date a stock code appears at most
/// once; the first record seen for a code wins.
#[derive(Debug, Clone, Default)]
pub struct DailySnapshots<'a> {
    by_date: BTreeMap<&'a str, Vec<&'a HoldingRecord>>,
}

impl<'a> DailySnapshots<'a> {
    pub fn group<I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a HoldingRecord>,
    {
        let mut by_date: BTreeMap<&'a str, Vec<&'a HoldingRecord>> = BTreeMap::new();
        let mut seen: HashMap<&'a str, HashSet<&'a str>> = HashMap::new();

        for record in records {
            let codes = seen.entry(record.date.as_str()).or_default();
            if !codes.insert(record.stock_code.as_str()) {
                continue;
            }
            by_date.entry(record.date.as_str()).or_default().push(record);
        }

        Self { by_date }
    }

    /// Distinct dates, ascending
    pub fn dates(&self) -> Vec<&'a str> {
        self.by_date.keys().copied().collect()
    }

    pub fn holdings(&self, date: &str) -> &[&'a HoldingRecord] {
        self.by_date.get(date).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn codes(&self, date: &str) -> HashSet<&'a str> {
        self.holdings(date)
            .iter()
            .map(|record| record.stock_code.as_str())
            .collect()
    }

    pub fn holdings_by_code(&self, date: &str) -> HashMap<&'a str, &'a HoldingRecord> {
        self.holdings(date)
            .iter()
            .map(|record| (record.stock_code.as_str(), *record))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.by_date.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_date.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(date: &str, code: &str, weight: f64) -> HoldingRecord {
        HoldingRecord::new(date, code, format!("name-{}", code), 100, weight)
    }

    #[test]
    fn groups_and_sorts_dates() {
        let records = vec![
            rec("2025-06-03", "A", 1.0),
            rec("2025-05-30", "A", 1.0),
            rec("2025-06-02", "B", 2.0),
            rec("2025-06-02", "A", 1.0),
        ];
        let snapshots = DailySnapshots::group(&records);

        assert_eq!(snapshots.dates(), vec!["2025-05-30", "2025-06-02", "2025-06-03"]);
        let codes: Vec<&str> = snapshots
            .holdings("2025-06-02")
            .iter()
            .map(|r| r.stock_code.as_str())
            .collect();
        assert_eq!(codes, vec!["B", "A"]);
    }

    #[test]
    fn duplicate_code_within_a_date_keeps_first() {
        let records = vec![rec("2025-06-02", "A", 1.0), rec("2025-06-02", "A", 9.0)];
        let snapshots = DailySnapshots::group(&records);

        assert_eq!(snapshots.holdings("2025-06-02").len(), 1);
        assert_eq!(snapshots.holdings_by_code("2025-06-02")["A"].weight, 1.0);
    }

    #[test]
    fn empty_input_and_unknown_date() {
        let records: Vec<HoldingRecord> = Vec::new();
        let snapshots = DailySnapshots::group(&records);
        assert!(snapshots.is_empty());
        assert!(snapshots.dates().is_empty());
        assert!(snapshots.holdings("2025-06-02").is_empty());
        assert!(snapshots.codes("2025-06-02").is_empty());
    }
}
