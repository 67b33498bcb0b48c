//! Month-over-month constituent change detection.
//!
//! The previous month's records and the target month's records are merged
//! into daily snapshots, then each trading day of the target month is
//! compared against the day before it. The first trading day is compared
//! against the previous month's last day when one exists; otherwise the
//! scan starts on the second day of the month.

use crate::models::{
    ChangeEvent, DailyChange, HoldingRecord, MonthChangeReport, MonthKey, MonthPreview,
    StableHolding,
};
use crate::utils::format::{format_signed_percentage, round2};
use crate::utils::snapshots::DailySnapshots;
use std::collections::HashSet;
use tracing::debug;

/// Analyze additions, removals and stable holdings of `month`.
///
/// `previous` carries the immediately preceding month and its records, if
/// any were loaded. Never fails: missing or insufficient data yields an
/// empty report.
pub fn analyze_month_changes(
    month: &MonthKey,
    current: &[HoldingRecord],
    previous: Option<(&MonthKey, &[HoldingRecord])>,
) -> MonthChangeReport {
    let previous_month = previous.map(|(key, _)| key.clone());
    let previous_records = previous.map(|(_, records)| records).unwrap_or(&[]);

    let snapshots = DailySnapshots::group(previous_records.iter().chain(current.iter()));
    let dates = snapshots.dates();

    if dates.len() < 2 {
        debug!(month = %month, dates = dates.len(), "Not enough trading days to compare");
        return MonthChangeReport::empty(month.clone(), previous_month);
    }

    let Some(first_index) = dates.iter().position(|d| month.contains_date(d)) else {
        debug!(month = %month, "Month has no trading days in data");
        return MonthChangeReport::empty(month.clone(), previous_month);
    };

    // Without an earlier day the first day of the month has nothing to be compared to
    let scan_start = if first_index == 0 { 1 } else { first_index };

    let mut yesterday_date = dates[scan_start - 1];
    let mut yesterday = snapshots.holdings(yesterday_date);
    let mut yesterday_codes = snapshots.codes(yesterday_date);

    let mut added: Vec<ChangeEvent> = Vec::new();
    let mut removed: Vec<ChangeEvent> = Vec::new();
    let mut added_codes: HashSet<&str> = HashSet::new();
    let mut removed_codes: HashSet<&str> = HashSet::new();
    let mut daily: Vec<DailyChange> = Vec::new();

    for &today_date in &dates[scan_start..] {
        if !month.contains_date(today_date) {
            debug!(month = %month, date = today_date, "Reached end of month");
            break;
        }

        let today = snapshots.holdings(today_date);
        let today_codes = snapshots.codes(today_date);

        let mut day = DailyChange {
            date: today_date.to_string(),
            previous_date: yesterday_date.to_string(),
            previous_count: yesterday_codes.len(),
            current_count: today_codes.len(),
            added: Vec::new(),
            removed: Vec::new(),
        };

        for record in today.iter().filter(|r| !yesterday_codes.contains(r.stock_code.as_str())) {
            day.added.push(record.stock_code.clone());
            if added_codes.insert(record.stock_code.as_str()) {
                added.push(ChangeEvent::new((*record).clone(), today_date));
            }
        }

        for record in yesterday.iter().filter(|r| !today_codes.contains(r.stock_code.as_str())) {
            day.removed.push(record.stock_code.clone());
            if removed_codes.insert(record.stock_code.as_str()) {
                removed.push(ChangeEvent::new((*record).clone(), today_date));
            }
        }

        debug!(
            date = today_date,
            previous_date = yesterday_date,
            previous_count = day.previous_count,
            current_count = day.current_count,
            added = ?day.added,
            removed = ?day.removed,
            "Compared trading day"
        );
        daily.push(day);

        yesterday_date = today_date;
        yesterday = today;
        yesterday_codes = today_codes;
    }

    let anchor_date = if first_index > 0 {
        dates[first_index - 1]
    } else {
        dates[first_index]
    };
    let month_end_date = dates
        .iter()
        .rev()
        .find(|d| month.contains_date(d))
        .copied()
        .unwrap_or(dates[first_index]);

    let stable = stable_holdings(&snapshots, anchor_date, month_end_date);
    let total_holdings_at_month_end = snapshots.holdings(month_end_date).len();

    added.sort_by(|a, b| {
        a.change_date
            .cmp(&b.change_date)
            .then_with(|| b.record.weight.total_cmp(&a.record.weight))
    });
    removed.sort_by(|a, b| a.change_date.cmp(&b.change_date));

    MonthChangeReport {
        month: month.clone(),
        previous_month,
        anchor_date: Some(anchor_date.to_string()),
        month_end_date: Some(month_end_date.to_string()),
        added,
        removed,
        stable,
        total_holdings_at_month_end,
        daily,
    }
}

/// Holdings present at both dates, ordered by absolute weight change, largest first
fn stable_holdings(snapshots: &DailySnapshots<'_>, anchor_date: &str, end_date: &str) -> Vec<StableHolding> {
    let end = snapshots.holdings_by_code(end_date);

    let mut stable: Vec<StableHolding> = snapshots
        .holdings(anchor_date)
        .iter()
        .filter_map(|anchor| {
            let current = end.get(anchor.stock_code.as_str())?;
            let weight_change = round2(current.weight - anchor.weight);
            Some(StableHolding {
                stock_code: current.stock_code.clone(),
                stock_name: current.stock_name.clone(),
                shares: current.shares,
                weight: current.weight,
                previous_weight: anchor.weight,
                weight_change,
                weight_change_text: format_signed_percentage(weight_change),
            })
        })
        .collect();

    stable.sort_by(|a, b| b.weight_change.abs().total_cmp(&a.weight_change.abs()));
    stable
}

/// Counts-only analysis for the month selector
pub fn preview_month_changes(
    month: &MonthKey,
    current: &[HoldingRecord],
    previous: Option<(&MonthKey, &[HoldingRecord])>,
) -> MonthPreview {
    let report = analyze_month_changes(month, current, previous);
    MonthPreview {
        month: report.month,
        previous_month: report.previous_month,
        added: report.added.len(),
        removed: report.removed.len(),
        stable: report.stable.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::STABLE_DISPLAY_LIMIT;

    fn rec(date: &str, code: &str, weight: f64) -> HoldingRecord {
        HoldingRecord::new(date, code, format!("name-{}", code), 1000, weight)
    }

    fn day(date: &str, holdings: &[(&str, f64)]) -> Vec<HoldingRecord> {
        holdings.iter().map(|(code, w)| rec(date, code, *w)).collect()
    }

    fn month(key: &str) -> MonthKey {
        MonthKey::parse(key).unwrap()
    }

    fn codes(events: &[ChangeEvent]) -> Vec<&str> {
        events.iter().map(ChangeEvent::stock_code).collect()
    }

    fn scenario_a() -> (Vec<HoldingRecord>, Vec<HoldingRecord>) {
        let mut may = day("2025-05-29", &[("A", 5.0), ("B", 4.0), ("C", 3.0)]);
        may.extend(day("2025-05-30", &[("A", 5.0), ("B", 4.0), ("C", 3.0)]));

        let mut june = day("2025-06-02", &[("A", 5.5), ("B", 4.0), ("D", 2.0)]);
        june.extend(day("2025-06-03", &[("A", 6.0), ("D", 2.5)]));
        (may, june)
    }

    #[test]
    fn scenario_additions_removals_and_stable() {
        let (may, june) = scenario_a();
        let (june_key, may_key) = (month("2025-06"), month("2025-05"));

        let report = analyze_month_changes(&june_key, &june, Some((&may_key, &may)));

        assert_eq!(codes(&report.added), vec!["D"]);
        assert_eq!(report.added[0].change_date, "2025-06-02");

        assert_eq!(codes(&report.removed), vec!["C", "B"]);
        assert_eq!(report.removed[0].change_date, "2025-06-02");
        assert_eq!(report.removed[1].change_date, "2025-06-03");
        // Removal carries the record from the last day the stock was held
        assert_eq!(report.removed[1].record.date, "2025-06-02");

        let stable: Vec<&str> = report.stable.iter().map(|s| s.stock_code.as_str()).collect();
        assert_eq!(stable, vec!["A"]);
        assert_eq!(report.stable[0].weight_change, 1.0);
        assert_eq!(report.stable[0].weight_change_text, "+1.00%");

        assert_eq!(report.anchor_date.as_deref(), Some("2025-05-30"));
        assert_eq!(report.month_end_date.as_deref(), Some("2025-06-03"));
        assert_eq!(report.total_holdings_at_month_end, 2);
        assert_eq!(report.daily.len(), 2);
        assert_eq!(report.daily[1].removed, vec!["B".to_string()]);
    }

    #[test]
    fn single_day_without_previous_month_is_empty() {
        let june = day("2025-06-02", &[("A", 5.0), ("B", 4.0)]);
        let report = analyze_month_changes(&month("2025-06"), &june, None);

        assert!(report.added.is_empty());
        assert!(report.removed.is_empty());
        assert!(report.stable.is_empty());
        assert_eq!(report.total_holdings_at_month_end, 0);
        assert!(report.anchor_date.is_none());
    }

    #[test]
    fn absent_month_is_empty() {
        let (may, june) = scenario_a();
        let report = analyze_month_changes(&month("2025-07"), &june, Some((&month("2025-05"), &may)));

        assert_eq!(report.summary().added, 0);
        assert_eq!(report.summary().removed, 0);
        assert_eq!(report.summary().stable, 0);
        assert_eq!(report.total_holdings_at_month_end, 0);
    }

    #[test]
    fn weight_change_is_rounded_and_signed() {
        let may = day("2025-05-30", &[("X", 3.50)]);
        let june = day("2025-06-02", &[("X", 3.20)]);
        let report = analyze_month_changes(&month("2025-06"), &june, Some((&month("2025-05"), &may)));

        assert_eq!(report.stable.len(), 1);
        assert_eq!(report.stable[0].weight_change, -0.30);
        assert_eq!(report.stable[0].weight_change_text, "-0.30%");
        assert_eq!(report.stable[0].previous_weight, 3.50);
        assert_eq!(report.stable[0].weight, 3.20);
    }

    #[test]
    fn first_month_starts_on_second_day() {
        let mut june = day("2025-06-02", &[("A", 5.0), ("B", 4.0)]);
        june.extend(day("2025-06-03", &[("A", 5.0), ("C", 1.0)]));
        let report = analyze_month_changes(&month("2025-06"), &june, None);

        assert_eq!(codes(&report.added), vec!["C"]);
        assert_eq!(codes(&report.removed), vec!["B"]);
        assert_eq!(report.daily.len(), 1);
        // Anchor falls back to the month's own first day
        assert_eq!(report.anchor_date.as_deref(), Some("2025-06-02"));
        assert_eq!(report.stable.len(), 1);
        assert_eq!(report.stable[0].weight_change_text, "0.00%");
    }

    #[test]
    fn churn_is_recorded_once_at_first_occurrence() {
        let may = day("2025-05-30", &[("A", 5.0)]);
        let mut june = day("2025-06-02", &[("A", 5.0), ("B", 1.0)]);
        june.extend(day("2025-06-03", &[("A", 5.0)]));
        june.extend(day("2025-06-04", &[("A", 5.0), ("B", 1.2)]));
        june.extend(day("2025-06-05", &[("A", 5.0)]));
        let report = analyze_month_changes(&month("2025-06"), &june, Some((&month("2025-05"), &may)));

        assert_eq!(codes(&report.added), vec!["B"]);
        assert_eq!(report.added[0].change_date, "2025-06-02");
        assert_eq!(report.added[0].record.weight, 1.0);
        assert_eq!(codes(&report.removed), vec!["B"]);
        assert_eq!(report.removed[0].change_date, "2025-06-03");
    }

    #[test]
    fn added_sorted_by_date_then_weight_desc() {
        let may = day("2025-05-30", &[("A", 5.0)]);
        let mut june = day("2025-06-02", &[("A", 5.0), ("L", 0.5), ("H", 2.5)]);
        june.extend(day("2025-06-03", &[("A", 5.0), ("L", 0.5), ("H", 2.5), ("Z", 9.0)]));
        let report = analyze_month_changes(&month("2025-06"), &june, Some((&month("2025-05"), &may)));

        assert_eq!(codes(&report.added), vec!["H", "L", "Z"]);
    }

    #[test]
    fn scan_stops_at_following_month() {
        let may = day("2025-05-30", &[("A", 5.0)]);
        let mut june = day("2025-06-30", &[("A", 5.0)]);
        // Stray next-month rows in the input are never compared
        june.extend(day("2025-07-01", &[("Q", 1.0)]));
        let report = analyze_month_changes(&month("2025-06"), &june, Some((&month("2025-05"), &may)));

        assert!(report.added.is_empty());
        assert!(report.removed.is_empty());
        assert_eq!(report.month_end_date.as_deref(), Some("2025-06-30"));
    }

    #[test]
    fn outputs_respect_month_and_uniqueness_invariants() {
        let may = day("2025-05-30", &[("A", 5.0), ("B", 1.0), ("C", 1.0)]);
        let mut june = Vec::new();
        let days = ["2025-06-02", "2025-06-03", "2025-06-04", "2025-06-05"];
        let sets: [&[(&str, f64)]; 4] = [
            &[("A", 5.0), ("D", 1.0)],
            &[("A", 5.0), ("B", 1.0), ("E", 1.0)],
            &[("D", 1.0), ("C", 1.0)],
            &[("A", 4.0), ("E", 2.0), ("C", 1.5)],
        ];
        for (date, set) in days.iter().zip(sets.iter()) {
            june.extend(day(date, set));
        }
        let june_key = month("2025-06");
        let report = analyze_month_changes(&june_key, &june, Some((&month("2025-05"), &may)));

        for list in [&report.added, &report.removed] {
            let unique: HashSet<&str> = list.iter().map(ChangeEvent::stock_code).collect();
            assert_eq!(unique.len(), list.len());
            assert!(list.iter().all(|e| june_key.contains_date(&e.change_date)));
        }

        let anchor: HashSet<&str> = ["A", "B", "C"].into_iter().collect();
        let end: HashSet<&str> = ["A", "E", "C"].into_iter().collect();
        for holding in &report.stable {
            assert!(anchor.contains(holding.stock_code.as_str()));
            assert!(end.contains(holding.stock_code.as_str()));
        }
        assert_eq!(report.stable.len(), 2);
        // |−1.0| for A outranks |+0.5| for C
        assert_eq!(report.stable[0].stock_code, "A");
    }

    #[test]
    fn analysis_is_idempotent() {
        let (may, june) = scenario_a();
        let (june_key, may_key) = (month("2025-06"), month("2025-05"));
        let first = analyze_month_changes(&june_key, &june, Some((&may_key, &may)));
        let second = analyze_month_changes(&june_key, &june, Some((&may_key, &may)));
        assert_eq!(first, second);
    }

    #[test]
    fn top_stable_reports_remainder() {
        let holdings: Vec<(String, f64)> = (0..25).map(|i| (format!("S{:02}", i), i as f64)).collect();
        let may: Vec<HoldingRecord> = holdings.iter().map(|(c, w)| rec("2025-05-30", c, *w)).collect();
        let june: Vec<HoldingRecord> = holdings.iter().map(|(c, w)| rec("2025-06-02", c, w * 2.0)).collect();
        let report = analyze_month_changes(&month("2025-06"), &june, Some((&month("2025-05"), &may)));

        let (top, remaining) = report.top_stable(STABLE_DISPLAY_LIMIT);
        assert_eq!(top.len(), 20);
        assert_eq!(remaining, 5);
        assert_eq!(top[0].stock_code, "S24");
    }

    #[test]
    fn preview_matches_full_report_counts() {
        let (may, june) = scenario_a();
        let (june_key, may_key) = (month("2025-06"), month("2025-05"));
        let preview = preview_month_changes(&june_key, &june, Some((&may_key, &may)));

        assert_eq!(preview.added, 1);
        assert_eq!(preview.removed, 2);
        assert_eq!(preview.stable, 1);
        assert_eq!(preview.previous_month, Some(may_key));
    }
}
