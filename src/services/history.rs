//! History Store
//!
//! Durable, file-backed catalog of completed runs: one JSON record per run
//! keyed by task id. Append-on-completion, read-many; records are only
//! mutated by rename and only removed by explicit deletion, which also
//! removes the run's output directory (charts and cached result file).

use chrono::Utc;
use tracing::{info, warn};

use crate::models::analysis::NormalizedResult;
use crate::models::history::{BatchDeleteFailure, BatchDeleteOutcome, HistoryRecord, HistoryStats};
use crate::services::normalizer;
use crate::utils::error::{AppError, AppResult};
use crate::utils::paths::{ensure_dir, StorageLayout};

/// File-backed history catalog.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    layout: StorageLayout,
}

impl HistoryStore {
    /// Create a store over the given storage layout.
    pub fn new(layout: StorageLayout) -> Self {
        Self { layout }
    }

    /// Append the record for a completed run.
    ///
    /// Derives the display name from the source file and the current time,
    /// and captures the sample-weighted success rate. Not idempotent: the
    /// orchestrator calls this exactly once per completed task.
    pub fn append(
        &self,
        task_id: &str,
        result: &NormalizedResult,
        source_name: &str,
    ) -> AppResult<HistoryRecord> {
        ensure_dir(&self.layout.history_dir())?;

        let now = Utc::now();
        let stem = source_name.trim_end_matches(".csv");
        let record = HistoryRecord {
            id: task_id.to_string(),
            name: format!("{}_{}", stem, now.format("%Y%m%d_%H%M%S")),
            original_filename: source_name.to_string(),
            created_at: now.to_rfc3339(),
            modified_at: None,
            success_rate: result.weighted_success_rate(),
        };

        self.write_record(&record)?;
        info!(task_id = %task_id, "history record appended");
        Ok(record)
    }

    /// Load one record. `NotFound` when no record exists, a decode error
    /// when the file exists but cannot be parsed.
    pub fn get(&self, task_id: &str) -> AppResult<HistoryRecord> {
        let path = self.layout.history_file(task_id);
        if !path.exists() {
            return Err(AppError::not_found(format!(
                "analysis record not found: {}",
                task_id
            )));
        }
        let content = std::fs::read_to_string(&path)?;
        serde_json::from_str(&content)
            .map_err(|e| AppError::decode(format!("history record {}: {}", task_id, e)))
    }

    /// List all records, newest first.
    ///
    /// The success rate is re-derived from the run's live result file when
    /// it is readable; otherwise the stored value stands. Unreadable record
    /// files are skipped with a warning rather than failing the listing.
    pub fn list(&self) -> AppResult<Vec<HistoryRecord>> {
        let history_dir = self.layout.history_dir();
        if !history_dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut records = Vec::new();
        for entry in std::fs::read_dir(&history_dir)?.flatten() {
            let path = entry.path();
            if path.extension().map(|e| e == "json").unwrap_or(false) {
                let content = match std::fs::read_to_string(&path) {
                    Ok(content) => content,
                    Err(e) => {
                        warn!(file = %path.display(), error = %e, "skipping unreadable history file");
                        continue;
                    }
                };
                let mut record: HistoryRecord = match serde_json::from_str(&content) {
                    Ok(record) => record,
                    Err(e) => {
                        warn!(file = %path.display(), error = %e, "skipping malformed history file");
                        continue;
                    }
                };

                if let Some(rate) = self.live_success_rate(&record.id) {
                    record.success_rate = rate;
                }
                records.push(record);
            }
        }

        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records)
    }

    /// Best-effort recomputation of a run's success rate from its live
    /// result file. `None` keeps the stored value.
    fn live_success_rate(&self, task_id: &str) -> Option<f64> {
        let result_path = self.layout.result_file(task_id);
        if !result_path.exists() {
            return None;
        }
        let content = std::fs::read_to_string(&result_path).ok()?;
        match normalizer::normalize_str(&content) {
            Ok(result) => Some((result.weighted_success_rate() * 100.0).round() / 100.0),
            Err(e) => {
                warn!(
                    task_id = %task_id,
                    error = %e,
                    "could not recompute success rate, using stored value"
                );
                None
            }
        }
    }

    /// Update a record's display name.
    pub fn rename(&self, task_id: &str, new_name: &str) -> AppResult<HistoryRecord> {
        if new_name.trim().is_empty() {
            return Err(AppError::validation("new name must not be empty"));
        }
        let mut record = self.get(task_id)?;
        record.name = new_name.to_string();
        record.modified_at = Some(Utc::now().to_rfc3339());
        self.write_record(&record)?;
        Ok(record)
    }

    /// Delete a record and the run's entire output directory.
    pub fn delete(&self, task_id: &str) -> AppResult<()> {
        let record_path = self.layout.history_file(task_id);
        if !record_path.exists() {
            return Err(AppError::not_found(format!(
                "analysis record not found: {}",
                task_id
            )));
        }
        std::fs::remove_file(&record_path)?;

        let run_dir = self.layout.run_dir(task_id);
        if run_dir.is_dir() {
            std::fs::remove_dir_all(&run_dir)?;
        }
        info!(task_id = %task_id, "history record and run directory deleted");
        Ok(())
    }

    /// Delete several records, reporting the outcome per id. Never atomic:
    /// one failing id does not stop the rest.
    pub fn batch_delete(&self, task_ids: &[String]) -> BatchDeleteOutcome {
        let mut outcome = BatchDeleteOutcome::default();
        for task_id in task_ids {
            match self.delete(task_id) {
                Ok(()) => outcome.deleted.push(task_id.clone()),
                Err(e) => outcome.failed.push(BatchDeleteFailure {
                    task_id: task_id.clone(),
                    reason: e.to_string(),
                }),
            }
        }
        outcome
    }

    /// Aggregate statistics over the catalog.
    pub fn stats(&self) -> AppResult<HistoryStats> {
        let records = self.list()?;
        let total_runs = records.len();
        let average_success_rate = if total_runs == 0 {
            0.0
        } else {
            records.iter().map(|r| r.success_rate).sum::<f64>() / total_runs as f64
        };
        Ok(HistoryStats {
            total_runs,
            average_success_rate,
        })
    }

    fn write_record(&self, record: &HistoryRecord) -> AppResult<()> {
        let content = serde_json::to_string_pretty(record)?;
        std::fs::write(self.layout.history_file(&record.id), content)?;
        Ok(())
    }
}
