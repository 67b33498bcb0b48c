use crate::models::HoldingRecord;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub const DEFAULT_PAGE_SIZE: usize = 50;

/// Number of page buttons shown around the current page
pub const PAGE_WINDOW: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    Date,
    StockCode,
    StockName,
    Shares,
    Weight,
}

impl SortField {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::Date => "date",
            SortField::StockCode => "stock_code",
            SortField::StockName => "stock_name",
            SortField::Shares => "shares",
            SortField::Weight => "weight",
        }
    }
}

impl FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "date" => Ok(SortField::Date),
            "code" | "stock_code" => Ok(SortField::StockCode),
            "name" | "stock_name" => Ok(SortField::StockName),
            "shares" => Ok(SortField::Shares),
            "weight" => Ok(SortField::Weight),
            other => Err(format!("unknown sort field: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            other => Err(format!("unknown sort direction: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortState {
    pub field: SortField,
    pub direction: SortDirection,
}

impl Default for SortState {
    fn default() -> Self {
        Self {
            field: SortField::Date,
            direction: SortDirection::Desc,
        }
    }
}

impl SortState {
    /// Header click: same field flips direction, a new field starts ascending
    pub fn toggle(self, field: SortField) -> Self {
        if self.field == field {
            Self {
                field,
                direction: self.direction.flipped(),
            }
        } else {
            Self {
                field,
                direction: SortDirection::Asc,
            }
        }
    }
}

/// Row filter for the full holdings table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HoldingsFilter {
    pub date: Option<String>,
    pub stock: Option<String>,
    pub min_weight: f64,
}

/// Filter, sort and page parameters for one table request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoldingsQuery {
    pub filter: HoldingsFilter,
    pub sort: SortState,
    pub page: usize,
    pub page_size: usize,
}

impl Default for HoldingsQuery {
    fn default() -> Self {
        Self {
            filter: HoldingsFilter::default(),
            sort: SortState::default(),
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Visual weight band used when rendering a row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightClass {
    High,
    Medium,
    Low,
}

impl WeightClass {
    pub fn of(weight: f64) -> Self {
        if weight >= 3.0 {
            WeightClass::High
        } else if weight >= 1.0 {
            WeightClass::Medium
        } else {
            WeightClass::Low
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoldingsPage {
    pub records: Vec<HoldingRecord>,
    pub total_records: usize,
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
    pub page_numbers: Vec<usize>,
    pub sort: SortState,
}

impl HoldingsPage {
    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_flips_same_field_and_resets_new_field() {
        let state = SortState::default();
        assert_eq!(state.direction, SortDirection::Desc);

        let flipped = state.toggle(SortField::Date);
        assert_eq!(flipped.direction, SortDirection::Asc);

        let weight = flipped.toggle(SortField::Weight);
        assert_eq!(weight.field, SortField::Weight);
        assert_eq!(weight.direction, SortDirection::Asc);
        assert_eq!(weight.toggle(SortField::Weight).direction, SortDirection::Desc);
    }

    #[test]
    fn sort_field_parses_aliases() {
        assert_eq!("code".parse::<SortField>().unwrap(), SortField::StockCode);
        assert_eq!("Weight".parse::<SortField>().unwrap(), SortField::Weight);
        assert!("price".parse::<SortField>().is_err());
    }

    #[test]
    fn weight_class_bands() {
        assert_eq!(WeightClass::of(3.0), WeightClass::High);
        assert_eq!(WeightClass::of(1.5), WeightClass::Medium);
        assert_eq!(WeightClass::of(0.99), WeightClass::Low);
    }
}
