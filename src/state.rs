use std::path::{Path, PathBuf};
use std::sync::Arc;

use sales_dashboard::data::{
    aggregate, filter, load_with, AggregateResult, ColumnNames, Dataset, FilterCriteria,
};

use crate::color::ColorMap;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// Choices offered by the filter combo boxes, in first-appearance order.
#[derive(Debug, Clone, Default)]
pub struct FilterOptions {
    pub countries: Vec<String>,
    pub customers: Vec<String>,
    pub products: Vec<String>,
}

impl FilterOptions {
    fn from_dataset(dataset: &Dataset) -> Self {
        let owned =
            |values: Vec<&str>| -> Vec<String> { values.into_iter().map(String::from).collect() };
        FilterOptions {
            countries: owned(dataset.countries()),
            customers: owned(dataset.customers()),
            products: owned(dataset.products()),
        }
    }
}

/// Filtered rows and aggregates for one (dataset generation, criteria) key.
struct Snapshot {
    generation: u64,
    criteria: FilterCriteria,
    filtered: Dataset,
    summary: AggregateResult,
}

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Loaded dataset (None until a file is loaded).
    pub dataset: Option<Dataset>,

    /// File the dataset came from.
    pub source: Option<PathBuf>,

    /// Current filter selections, edited by the side panel.
    pub criteria: FilterCriteria,

    pub options: FilterOptions,

    /// Country colours shared by the pie and the stacked bars.
    pub country_colors: ColorMap,

    /// Header names used when loading files.
    pub columns: ColumnNames,

    /// Banner image bytes and the URI egui caches them under.
    pub banner: Option<(String, Arc<[u8]>)>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    /// Bumped on every successful load; part of the snapshot key.
    generation: u64,

    snapshot: Option<Snapshot>,
}

impl AppState {
    pub fn new(columns: ColumnNames, banner: Option<(String, Arc<[u8]>)>) -> Self {
        Self {
            dataset: None,
            source: None,
            criteria: FilterCriteria::default(),
            options: FilterOptions::default(),
            country_colors: ColorMap::default(),
            columns,
            banner,
            status_message: None,
            generation: 0,
            snapshot: None,
        }
    }

    /// Load a file, replacing the current dataset on success.  On failure
    /// the previous dataset stays and the error goes to the status bar.
    pub fn load_path(&mut self, path: &Path) {
        match load_with(path, &self.columns) {
            Ok(dataset) => {
                log::info!("Loaded {} sales records from {}", dataset.len(), path.display());
                self.set_dataset(dataset, Some(path.to_path_buf()));
            }
            Err(e) => {
                log::error!("Failed to load {}: {e}", path.display());
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }

    /// Startup load.  A path named on the command line is always attempted so
    /// a missing file shows up in the status bar; the configured default is
    /// skipped quietly when it does not exist.
    pub fn load_initial(&mut self, explicit: Option<&Path>, default: &Path) {
        match explicit {
            Some(path) => self.load_path(path),
            None if default.exists() => self.load_path(default),
            None => log::info!("{} not found; waiting for File → Open", default.display()),
        }
    }

    /// Ingest a newly loaded dataset and reset the filters to show everything.
    pub fn set_dataset(&mut self, dataset: Dataset, source: Option<PathBuf>) {
        self.criteria = FilterCriteria::full(&dataset);
        self.options = FilterOptions::from_dataset(&dataset);
        self.country_colors = ColorMap::new(dataset.countries());
        self.generation += 1;
        self.snapshot = None;

        self.dataset = Some(dataset);
        self.source = source;
        self.status_message = None;
    }

    pub fn reset_filters(&mut self) {
        if let Some(ds) = &self.dataset {
            self.criteria = FilterCriteria::full(ds);
        }
    }

    /// Recompute the filtered rows and aggregates if the criteria or the
    /// dataset changed since the last call.
    pub fn refresh(&mut self) {
        let Some(dataset) = &self.dataset else {
            self.snapshot = None;
            return;
        };
        let fresh = self.snapshot.as_ref().is_some_and(|s| {
            s.generation == self.generation && s.criteria == self.criteria
        });
        if fresh {
            return;
        }

        let filtered = filter(dataset, &self.criteria);
        let summary = aggregate(&filtered);
        log::debug!(
            "Recomputed aggregates: {} of {} records match",
            filtered.len(),
            dataset.len()
        );
        self.snapshot = Some(Snapshot {
            generation: self.generation,
            criteria: self.criteria.clone(),
            filtered,
            summary,
        });
    }

    /// Result of the last [`refresh`](Self::refresh).
    pub fn current(&self) -> Option<(&Dataset, &AggregateResult)> {
        self.snapshot.as_ref().map(|s| (&s.filtered, &s.summary))
    }
}
