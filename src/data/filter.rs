use chrono::{NaiveDate, NaiveDateTime};

use super::model::{Dataset, Record};

// ---------------------------------------------------------------------------
// Filter predicate: date range plus categorical equality selections
// ---------------------------------------------------------------------------

/// Label shown for [`Selection::All`] in the UI.
pub const ALL_LABEL: &str = "All";

/// A categorical filter: either no constraint or one exact value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum Selection {
    #[default]
    All,
    Only(String),
}

impl Selection {
    /// Exact, case-sensitive match. `All` matches everything.
    pub fn matches(&self, value: &str) -> bool {
        match self {
            Selection::All => true,
            Selection::Only(wanted) => wanted == value,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Selection::All => ALL_LABEL,
            Selection::Only(value) => value,
        }
    }
}

/// Inclusive calendar-date bounds on a record's timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        DateRange { start, end }
    }

    pub fn unbounded() -> Self {
        DateRange::new(NaiveDate::MIN, NaiveDate::MAX)
    }

    /// Whether the timestamp falls on a day within `[start, end]`.
    /// Any time of day on `end` is included.
    pub fn contains(&self, timestamp: &NaiveDateTime) -> bool {
        let day = timestamp.date();
        self.start <= day && day <= self.end
    }
}

/// Everything the user selected in the filter panel.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FilterCriteria {
    pub date_range: DateRange,
    pub country: Selection,
    pub customer: Selection,
    pub product: Selection,
}

impl Default for FilterCriteria {
    fn default() -> Self {
        FilterCriteria {
            date_range: DateRange::unbounded(),
            country: Selection::All,
            customer: Selection::All,
            product: Selection::All,
        }
    }
}

impl FilterCriteria {
    /// All categories over the dataset's full date span (shows everything).
    pub fn full(dataset: &Dataset) -> Self {
        let date_range = dataset
            .date_bounds()
            .map(|(start, end)| DateRange::new(start, end))
            .unwrap_or_else(DateRange::unbounded);
        FilterCriteria {
            date_range,
            ..FilterCriteria::default()
        }
    }

    pub fn matches(&self, record: &Record) -> bool {
        self.date_range.contains(&record.timestamp)
            && self.country.matches(&record.country)
            && self.customer.matches(&record.customer_id)
            && self.product.matches(&record.product)
    }
}

/// Return the records that pass the criteria, as a new dataset in source order.
///
/// The date range is applied first, then each categorical filter that is
/// not `All`.  An empty result is valid.
pub fn filter(dataset: &Dataset, criteria: &FilterCriteria) -> Dataset {
    dataset
        .records()
        .iter()
        .filter(|r| criteria.date_range.contains(&r.timestamp))
        .filter(|r| criteria.country.matches(&r.country))
        .filter(|r| criteria.customer.matches(&r.customer_id))
        .filter(|r| criteria.product.matches(&r.product))
        .cloned()
        .collect()
}
