//! Path Utilities
//!
//! Resolves the application data directory and the per-run storage layout
//! beneath it. Every store takes a `StorageLayout` rather than touching
//! process-global paths, so tests can point the whole stack at a temp dir.

use std::path::{Path, PathBuf};

use crate::utils::error::{AppError, AppResult};

/// Name of the result file the analysis engine writes into a run directory.
pub const RESULT_FILE_NAME: &str = "analysis_results.json";

/// Name of the persisted narrative record within a run directory.
pub const NARRATIVE_FILE_NAME: &str = "narrative_analysis.json";

/// Get the user's home directory
pub fn home_dir() -> AppResult<PathBuf> {
    dirs::home_dir().ok_or_else(|| AppError::config("Could not determine home directory"))
}

/// Get the default ForceQC data directory (~/.forceqc/)
pub fn default_data_dir() -> AppResult<PathBuf> {
    Ok(home_dir()?.join(".forceqc"))
}

/// Get the config file path (~/.forceqc/config.json)
pub fn config_path() -> AppResult<PathBuf> {
    Ok(default_data_dir()?.join("config.json"))
}

/// Ensure a directory exists, creating it if necessary
pub fn ensure_dir(path: &Path) -> AppResult<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

/// Storage layout rooted at the application data directory.
#[derive(Debug, Clone)]
pub struct StorageLayout {
    root: PathBuf,
}

impl StorageLayout {
    /// Create a layout rooted at the given directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The data root itself.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding staged measurement uploads.
    pub fn uploads_dir(&self) -> PathBuf {
        self.root.join("uploads")
    }

    /// Resolve a staged upload by its source id.
    pub fn upload_file(&self, source_id: &str) -> PathBuf {
        self.uploads_dir().join(format!("{}.csv", source_id))
    }

    /// Directory holding one output subdirectory per run.
    pub fn runs_dir(&self) -> PathBuf {
        self.root.join("charts")
    }

    /// A run's output directory (chart images + result file).
    pub fn run_dir(&self, task_id: &str) -> PathBuf {
        self.runs_dir().join(task_id)
    }

    /// A run's engine result file.
    pub fn result_file(&self, task_id: &str) -> PathBuf {
        self.run_dir(task_id).join(RESULT_FILE_NAME)
    }

    /// A run's persisted narrative record.
    pub fn narrative_file(&self, task_id: &str) -> PathBuf {
        self.run_dir(task_id).join(NARRATIVE_FILE_NAME)
    }

    /// Directory of history records, one JSON file per run.
    pub fn history_dir(&self) -> PathBuf {
        self.root.join("history")
    }

    /// A run's history record file.
    pub fn history_file(&self, task_id: &str) -> PathBuf {
        self.history_dir().join(format!("{}.json", task_id))
    }

    /// Ephemeral report location served for download.
    pub fn report_downloads_dir(&self) -> PathBuf {
        self.root.join("reports").join("downloads")
    }

    /// Durable report archive.
    pub fn report_archive_dir(&self) -> PathBuf {
        self.root.join("reports").join("archive")
    }

    /// Public retrieval path for a file inside a run directory, as exposed
    /// by the static file server in front of this service.
    pub fn public_chart_path(&self, task_id: &str, file_name: &str) -> String {
        format!("/static/charts/{}/{}", task_id, file_name)
    }

    /// Create every directory of the layout.
    pub fn ensure_layout(&self) -> AppResult<()> {
        ensure_dir(&self.uploads_dir())?;
        ensure_dir(&self.runs_dir())?;
        ensure_dir(&self.history_dir())?;
        ensure_dir(&self.report_downloads_dir())?;
        ensure_dir(&self.report_archive_dir())?;
        Ok(())
    }
}
