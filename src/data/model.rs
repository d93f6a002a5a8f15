use std::collections::HashSet;
use std::fmt;

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// RawValue – a single cell as read from the source file
// ---------------------------------------------------------------------------

/// A dynamically-typed cell, before the required columns are interpreted.
/// Every file format is decoded into these so one routine builds records.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    DateTime(NaiveDateTime),
    Null,
}

/// Text that spreadsheet and CSV exports use for a missing value.
pub const NULL_MARKERS: &[&str] = &[
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "NaT", "None", "n/a", "nan", "null",
];

impl RawValue {
    /// Missing cell: explicit null, NaN, empty text or a null marker such as
    /// `N/A` or `NaN`.
    pub fn is_null(&self) -> bool {
        match self {
            RawValue::Null => true,
            RawValue::Text(s) => {
                let s = s.trim();
                s.is_empty() || NULL_MARKERS.contains(&s)
            }
            RawValue::Float(f) => f.is_nan(),
            _ => false,
        }
    }

    /// Render the cell as a categorical label (`None` for null cells).
    ///
    /// Whole floats lose their fractional part so a customer id stored as
    /// `12346.0` by a spreadsheet matches the same id stored as text.
    pub fn as_label(&self) -> Option<String> {
        if self.is_null() {
            return None;
        }
        let label = match self {
            RawValue::Text(s) => s.clone(),
            RawValue::Integer(i) => i.to_string(),
            RawValue::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => {
                format!("{}", *f as i64)
            }
            RawValue::Float(f) => f.to_string(),
            RawValue::Bool(b) => b.to_string(),
            RawValue::DateTime(dt) => dt.to_string(),
            RawValue::Null => return None,
        };
        Some(label)
    }
}

/// Header row plus data rows, in source order.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<RawValue>>,
}

// ---------------------------------------------------------------------------
// Calendar keys used for grouping
// ---------------------------------------------------------------------------

/// Calendar month of a timestamp. Field order gives chronological `Ord`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn of(date: &impl Datelike) -> Self {
        YearMonth {
            year: date.year(),
            month: date.month(),
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Calendar quarter (1..=4) of a timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Quarter {
    pub year: i32,
    pub quarter: u32,
}

impl Quarter {
    pub fn of(date: &impl Datelike) -> Self {
        Quarter {
            year: date.year(),
            quarter: date.month0() / 3 + 1,
        }
    }

    /// The quarter immediately following this one.
    pub fn next(self) -> Self {
        if self.quarter >= 4 {
            Quarter {
                year: self.year + 1,
                quarter: 1,
            }
        } else {
            Quarter {
                year: self.year,
                quarter: self.quarter + 1,
            }
        }
    }
}

impl fmt::Display for Quarter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}Q{}", self.year, self.quarter)
    }
}

// ---------------------------------------------------------------------------
// Record – one sales transaction
// ---------------------------------------------------------------------------

/// One sales transaction (one row of the source spreadsheet).
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub timestamp: NaiveDateTime,
    pub country: String,
    pub customer_id: String,
    pub product: String,
    pub quantity: f64,
    /// Monetary total of the line.
    pub total: f64,
    /// Derived from `timestamp`.
    pub year_month: YearMonth,
}

impl Record {
    pub fn new(
        timestamp: NaiveDateTime,
        country: impl Into<String>,
        customer_id: impl Into<String>,
        product: impl Into<String>,
        quantity: f64,
        total: f64,
    ) -> Self {
        Record {
            timestamp,
            country: country.into(),
            customer_id: customer_id.into(),
            product: product.into(),
            quantity,
            total,
            year_month: YearMonth::of(&timestamp),
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }

    pub fn quarter(&self) -> Quarter {
        Quarter::of(&self.timestamp)
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded dataset
// ---------------------------------------------------------------------------

/// Immutable collection of records in source order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    records: Vec<Record>,
}

impl Dataset {
    pub fn from_records(records: Vec<Record>) -> Self {
        Dataset { records }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct countries in order of first appearance.
    pub fn countries(&self) -> Vec<&str> {
        self.distinct(|r| r.country.as_str())
    }

    /// Distinct customer ids in order of first appearance.
    pub fn customers(&self) -> Vec<&str> {
        self.distinct(|r| r.customer_id.as_str())
    }

    /// Distinct product descriptions in order of first appearance.
    pub fn products(&self) -> Vec<&str> {
        self.distinct(|r| r.product.as_str())
    }

    /// Earliest and latest calendar date, `None` for an empty dataset.
    pub fn date_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = self.records.first()?.date();
        Some(
            self.records
                .iter()
                .map(Record::date)
                .fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d))),
        )
    }

    fn distinct<'a>(&'a self, key: impl Fn(&'a Record) -> &'a str) -> Vec<&'a str> {
        let mut seen = HashSet::new();
        self.records
            .iter()
            .map(key)
            .filter(|k| seen.insert(*k))
            .collect()
    }
}

impl FromIterator<Record> for Dataset {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        Dataset::from_records(iter.into_iter().collect())
    }
}

// ---------------------------------------------------------------------------
// Source column names
// ---------------------------------------------------------------------------

/// Header names of the six columns the loader requires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnNames {
    pub date: String,
    pub country: String,
    pub customer_id: String,
    pub product: String,
    pub quantity: String,
    pub total: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        ColumnNames {
            date: "Date".to_string(),
            country: "Pais".to_string(),
            customer_id: "IdCliente".to_string(),
            product: "Descripcion".to_string(),
            quantity: "Cantidad".to_string(),
            total: "Total".to_string(),
        }
    }
}

impl ColumnNames {
    pub fn required(&self) -> [&str; 6] {
        [
            &self.date,
            &self.country,
            &self.customer_id,
            &self.product,
            &self.quantity,
            &self.total,
        ]
    }
}
