//! History Models
//!
//! Persisted catalog entries for completed runs and the aggregate shapes
//! the history API returns.

use serde::{Deserialize, Serialize};

/// One completed run's catalog entry, stored as a JSON file keyed by task
/// id under the history directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryRecord {
    /// Task id of the run
    pub id: String,
    /// Display name, editable after the fact
    pub name: String,
    /// Name of the uploaded measurement file the run analyzed
    pub original_filename: String,
    /// Creation timestamp (RFC 3339)
    pub created_at: String,
    /// Last rename timestamp (RFC 3339)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<String>,
    /// Weighted success rate at completion time, in percent
    #[serde(default)]
    pub success_rate: f64,
}

/// Aggregate statistics over the history catalog.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistoryStats {
    /// Number of cataloged runs
    pub total_runs: usize,
    /// Mean success rate across cataloged runs, in percent
    pub average_success_rate: f64,
}

/// Why one id in a batch delete was not removed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchDeleteFailure {
    pub task_id: String,
    pub reason: String,
}

/// Per-id outcome of a batch delete. Batch deletion is never atomic; each
/// id succeeds or fails on its own.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchDeleteOutcome {
    pub deleted: Vec<String>,
    pub failed: Vec<BatchDeleteFailure>,
}
