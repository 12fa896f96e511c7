//! Narrative Record Store
//!
//! Persists one `NarrativeRecord` per run inside the run's output
//! directory. Regeneration overwrites; there is never more than one active
//! record per run.

use std::collections::BTreeMap;

use serde_json::{json, Value};

use crate::models::analysis::NormalizedResult;
use crate::models::narrative::NarrativeRecord;
use crate::utils::error::{AppError, AppResult};
use crate::utils::paths::StorageLayout;

/// File-backed narrative record store.
#[derive(Debug, Clone)]
pub struct NarrativeStore {
    layout: StorageLayout,
}

impl NarrativeStore {
    /// Create a store over the given storage layout.
    pub fn new(layout: StorageLayout) -> Self {
        Self { layout }
    }

    /// True when a narrative record exists for the run.
    pub fn exists(&self, task_id: &str) -> bool {
        self.layout.narrative_file(task_id).exists()
    }

    /// Persist a record, overwriting any previous one.
    pub fn save(&self, task_id: &str, record: &NarrativeRecord) -> AppResult<()> {
        let path = self.layout.narrative_file(task_id);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(record)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load the record for a run. `NotFound` when absent, a decode error
    /// when present but unparseable.
    pub fn load(&self, task_id: &str) -> AppResult<NarrativeRecord> {
        let path = self.layout.narrative_file(task_id);
        if !path.exists() {
            return Err(AppError::not_found(format!(
                "no narrative analysis for run {}",
                task_id
            )));
        }
        let content = std::fs::read_to_string(&path)?;
        serde_json::from_str(&content)
            .map_err(|e| AppError::decode(format!("narrative record {}: {}", task_id, e)))
    }
}

/// Extract the headline metrics the narrative was grounded on, stored next
/// to the generated text so consumers can sanity-check it later.
pub fn extract_summary(result: &NormalizedResult) -> BTreeMap<String, Value> {
    let mut summary = BTreeMap::new();
    summary.insert("total_samples".to_string(), json!(result.total_samples()));
    summary.insert(
        "success_rate".to_string(),
        json!(result.weighted_success_rate()),
    );
    summary.insert("mean_force".to_string(), json!(result.overall_stats.mean));
    summary.insert(
        "cv_percent".to_string(),
        json!(result.overall_stats.cv_percent),
    );

    let ratings: BTreeMap<String, String> = result
        .process_capability
        .iter()
        .map(|c| (format!("{}", c.target_force), c.rating.clone()))
        .collect();
    if !ratings.is_empty() {
        summary.insert("capability_ratings".to_string(), json!(ratings));
    }
    summary
}
