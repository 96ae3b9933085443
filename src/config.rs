use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_REPORTS_DIR: &str = "reports";

const DB_FILE_NAME: &str = "agent_baseline.db";

/// Explicit application configuration.
///
/// Paths are passed into constructors instead of living in module globals,
/// so tests can run against isolated directories in parallel.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub reports_dir: PathBuf,
}

impl AppConfig {
    pub fn new(data_dir: impl Into<PathBuf>, reports_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            reports_dir: reports_dir.into(),
        }
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(DB_FILE_NAME)
    }

    /// Create the data directory if missing and return the database path.
    pub fn ensure_data_dir(&self) -> Result<PathBuf> {
        fs::create_dir_all(&self.data_dir).with_context(|| {
            format!("Failed to create data directory {}", self.data_dir.display())
        })?;
        Ok(self.db_path())
    }

    /// Create the reports directory if missing.
    pub fn ensure_reports_dir(&self) -> Result<&Path> {
        fs::create_dir_all(&self.reports_dir).with_context(|| {
            format!(
                "Failed to create reports directory {}",
                self.reports_dir.display()
            )
        })?;
        Ok(&self.reports_dir)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new(DEFAULT_DATA_DIR, DEFAULT_REPORTS_DIR)
    }
}
