//! Builder pattern for configuring holdings table queries

use crate::models::{
    HoldingsFilter, HoldingsQuery, SortDirection, SortField, SortState, DEFAULT_PAGE_SIZE,
};

/// Builder for a holdings table query
///
/// Provides a fluent interface over filter, sort and page parameters.
///
/// # Example
/// ```rust
/// use etfwatch::api::HoldingsQueryBuilder;
/// use etfwatch::models::SortField;
///
/// let query = HoldingsQueryBuilder::new()
///     .with_date("2025-06-30")
///     .with_min_weight(1.0)
///     .sort_by(SortField::Weight)
///     .descending()
///     .with_page(2)
///     .build();
/// assert_eq!(query.page, 2);
/// ```
#[derive(Debug, Clone)]
pub struct HoldingsQueryBuilder {
    date: Option<String>,
    stock: Option<String>,
    min_weight: f64,
    sort: SortState,
    page: usize,
    page_size: usize,
}

impl HoldingsQueryBuilder {
    /// Create a builder with the table defaults (date descending, page 1)
    pub fn new() -> Self {
        Self {
            date: None,
            stock: None,
            min_weight: 0.0,
            sort: SortState::default(),
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Only rows on this trading date; blank clears the filter
    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = non_blank(date.into());
        self
    }

    /// Substring match on code or name; blank clears the filter
    pub fn with_stock(mut self, stock: impl Into<String>) -> Self {
        self.stock = non_blank(stock.into());
        self
    }

    pub fn with_min_weight(mut self, min_weight: f64) -> Self {
        self.min_weight = min_weight.max(0.0);
        self
    }

    /// Sort by `field`, ascending
    pub fn sort_by(mut self, field: SortField) -> Self {
        self.sort = SortState {
            field,
            direction: SortDirection::Asc,
        };
        self
    }

    pub fn descending(self) -> Self {
        self.with_direction(SortDirection::Desc)
    }

    pub fn with_direction(mut self, direction: SortDirection) -> Self {
        self.sort.direction = direction;
        self
    }

    /// Apply textual sort parameters.
    ///
    /// A field without a direction sorts ascending. Neither keeps the
    /// current sort, which starts as date descending.
    pub fn with_sort_params(mut self, sort: Option<&str>, direction: Option<&str>) -> Result<Self, String> {
        if let Some(sort) = sort {
            self = self.sort_by(sort.parse::<SortField>()?);
        }
        if let Some(direction) = direction {
            self = self.with_direction(direction.parse::<SortDirection>()?);
        }
        Ok(self)
    }

    /// Same behaviour as clicking a column header
    pub fn toggle_sort(mut self, field: SortField) -> Self {
        self.sort = self.sort.toggle(field);
        self
    }

    pub fn with_page(mut self, page: usize) -> Self {
        self.page = page.max(1);
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn build(self) -> HoldingsQuery {
        HoldingsQuery {
            filter: HoldingsFilter {
                date: self.date,
                stock: self.stock,
                min_weight: self.min_weight,
            },
            sort: self.sort,
            page: self.page,
            page_size: self.page_size,
        }
    }
}

impl Default for HoldingsQueryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
