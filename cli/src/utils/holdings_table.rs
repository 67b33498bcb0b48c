use crate::models::{
    HoldingRecord, HoldingsFilter, HoldingsPage, HoldingsQuery, SortDirection, SortField, SortState,
    PAGE_WINDOW,
};
use std::cmp::Ordering;

/// Apply date, stock text and minimum weight filters
pub fn filter_holdings(records: &[HoldingRecord], filter: &HoldingsFilter) -> Vec<HoldingRecord> {
    let needle = filter
        .stock
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase);
    let date = filter.date.as_deref().map(str::trim).filter(|d| !d.is_empty());

    records
        .iter()
        .filter(|record| date.map_or(true, |d| record.date == d))
        .filter(|record| {
            needle.as_deref().map_or(true, |n| {
                record.stock_code.to_lowercase().contains(n)
                    || record.stock_name.to_lowercase().contains(n)
            })
        })
        .filter(|record| record.weight >= filter.min_weight)
        .cloned()
        .collect()
}

/// Stable sort by the given field and direction
pub fn sort_holdings(records: &mut [HoldingRecord], sort: SortState) {
    records.sort_by(|a, b| {
        let ordering = compare_by(a, b, sort.field);
        match sort.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });
}

fn compare_by(a: &HoldingRecord, b: &HoldingRecord, field: SortField) -> Ordering {
    match field {
        SortField::Date => a.date.cmp(&b.date),
        SortField::StockCode => a.stock_code.cmp(&b.stock_code),
        SortField::StockName => a.stock_name.cmp(&b.stock_name),
        SortField::Shares => a.shares.cmp(&b.shares),
        SortField::Weight => a.weight.total_cmp(&b.weight),
    }
}

pub fn total_pages(total_records: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    total_records.div_ceil(page_size)
}

/// Page buttons: up to `PAGE_WINDOW` numbers starting two before the current page
pub fn page_window(page: usize, total_pages: usize) -> Vec<usize> {
    if total_pages == 0 {
        return Vec::new();
    }
    let start = page.saturating_sub(2).max(1);
    let end = (start + PAGE_WINDOW - 1).min(total_pages);
    (start..=end).collect()
}

/// Filter, sort and cut one page out of the full record set.
///
/// Out-of-range pages clamp to the nearest valid page.
pub fn query_holdings(records: &[HoldingRecord], query: &HoldingsQuery) -> HoldingsPage {
    let mut filtered = filter_holdings(records, &query.filter);
    sort_holdings(&mut filtered, query.sort);

    let page_size = query.page_size.max(1);
    let total_records = filtered.len();
    let pages = total_pages(total_records, page_size);
    let page = query.page.clamp(1, pages.max(1));

    let start = (page - 1) * page_size;
    let page_records: Vec<HoldingRecord> = filtered.into_iter().skip(start).take(page_size).collect();

    HoldingsPage {
        records: page_records,
        total_records,
        page,
        page_size,
        total_pages: pages,
        page_numbers: page_window(page, pages),
        sort: query.sort,
    }
}
