use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::data::ColumnNames;

/// Looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "sales-dashboard.json";

/// Optional JSON settings file.  Every field has a default, so a partial
/// file (or none at all) is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Spreadsheet opened at startup when it exists.
    pub data_path: PathBuf,
    /// Decorative banner shown above the filters.  Not fetched when unset.
    pub banner_url: Option<String>,
    pub fetch_timeout_secs: u64,
    pub window_width: f32,
    pub window_height: f32,
    /// Header names of the required source columns.
    pub columns: ColumnNames,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        DashboardConfig {
            data_path: PathBuf::from("ventas.xlsx"),
            banner_url: None,
            fetch_timeout_secs: 5,
            window_width: 1400.0,
            window_height: 900.0,
            columns: ColumnNames::default(),
        }
    }
}

impl DashboardConfig {
    /// Read the config file; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let config: DashboardConfig = serde_json::from_str(&text)
            .with_context(|| format!("parsing config file {}", path.display()))?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}
