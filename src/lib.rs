//! Sales dashboard: load spreadsheet sales records, filter them and compute
//! the metrics shown by the desktop UI.
//!
//! ```no_run
//! use std::path::Path;
//! use sales_dashboard::data::{aggregate, filter, load, FilterCriteria};
//!
//! let dataset = load(Path::new("ventas.xlsx"))?;
//! let summary = aggregate(&filter(&dataset, &FilterCriteria::full(&dataset)));
//! println!("{}", sales_dashboard::format::currency(summary.total));
//! # Ok::<(), sales_dashboard::data::DataLoadError>(())
//! ```

pub mod asset;
pub mod config;
pub mod data;
pub mod format;
