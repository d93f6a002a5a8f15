/// Data layer: core types, loading, filtering and aggregation.
///
/// Architecture:
/// ```text
///  .xlsx / .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → RawTable → Dataset (drop incomplete rows)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  Dataset  │  Vec<Record>, immutable after load
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  date range + equality selections → new Dataset
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ aggregate  │  sums, distinct customers, groupings → AggregateResult
///   └───────────┘
/// ```

pub mod aggregate;
pub mod error;
pub mod filter;
pub mod loader;
pub mod model;

pub use aggregate::{aggregate, AggregateResult, CrossTab};
pub use error::DataLoadError;
pub use filter::{filter, DateRange, FilterCriteria, Selection};
pub use loader::{load, load_with};
pub use model::{ColumnNames, Dataset, Quarter, Record, YearMonth};
