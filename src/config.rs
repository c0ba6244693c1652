//! Editor configuration.
//!
//! Settings are persisted together with the rest of the UI state through
//! eframe's storage; the storage directory can additionally be overridden
//! from the environment at startup.

use crate::constants::{DATA_DIR_ENV, DEFAULT_DATA_DIR};
use serde::{Deserialize, Serialize};

/// User-adjustable editor settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Directory holding saved flows (native builds only)
    pub data_dir: String,
    /// Whether the canvas grid is drawn
    pub show_grid: bool,
    /// Whether dark mode visuals are enabled
    pub dark_mode: bool,
    /// Save the open flow after every change instead of on demand
    pub autosave: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            data_dir: DEFAULT_DATA_DIR.to_string(),
            show_grid: true,
            dark_mode: true,
            autosave: true,
        }
    }
}

impl EditorConfig {
    /// Default settings with the environment's overrides applied.
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Applies the environment's overrides on top of these settings.
    pub fn with_env_overrides(self) -> Self {
        self.with_data_dir_override(std::env::var(DATA_DIR_ENV).ok())
    }

    /// Replaces the data directory when `dir` is a non-empty path.
    pub fn with_data_dir_override(mut self, dir: Option<String>) -> Self {
        if let Some(dir) = dir.map(|d| d.trim().to_string()).filter(|d| !d.is_empty()) {
            log::info!("using flow directory {dir} from {DATA_DIR_ENV}");
            self.data_dir = dir;
        }
        self
    }
}
