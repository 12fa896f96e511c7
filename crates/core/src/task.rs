//! Task Model
//!
//! One submitted analysis run and its lifecycle. Tasks move strictly
//! Pending → Running → Completed/Failed; the terminal states absorb any
//! further transition attempt, and progress only moves forward. All
//! timestamps are RFC-3339 strings so the model serializes the same way it
//! is persisted and returned.

use serde::{Deserialize, Serialize};

/// Lifecycle state of an analysis task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl TaskStatus {
    /// True for states no transition may leave.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// A single analysis run tracked by the orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// Unique task identifier
    pub id: String,
    /// Current lifecycle state
    pub status: TaskStatus,
    /// Creation timestamp (RFC 3339)
    pub created_at: String,
    /// Execution start timestamp (RFC 3339)
    pub started_at: Option<String>,
    /// Completion timestamp (RFC 3339)
    pub completed_at: Option<String>,
    /// Advisory progress, 0–100, monotonically increasing
    pub progress: u8,
    /// Human-readable status message
    pub message: String,
    /// Error text captured verbatim when the task failed
    pub error: Option<String>,
}

impl Task {
    /// Create a new pending task.
    pub fn new(id: impl Into<String>, created_at: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            status: TaskStatus::Pending,
            created_at: created_at.into(),
            started_at: None,
            completed_at: None,
            progress: 0,
            message: "Task created, waiting for execution".to_string(),
            error: None,
        }
    }

    /// Move the task into the running state. No-op once terminal.
    pub fn mark_running(&mut self, started_at: impl Into<String>) {
        if self.status.is_terminal() {
            return;
        }
        self.status = TaskStatus::Running;
        self.started_at = Some(started_at.into());
    }

    /// Advance progress and update the status message. Progress never moves
    /// backwards; stale updates are dropped.
    pub fn set_progress(&mut self, progress: u8, message: impl Into<String>) {
        if self.status.is_terminal() {
            return;
        }
        if progress > self.progress {
            self.progress = progress.min(100);
        }
        self.message = message.into();
    }

    /// Move the task into the completed state. No-op once terminal.
    pub fn mark_completed(&mut self, completed_at: impl Into<String>) {
        if self.status.is_terminal() {
            return;
        }
        self.status = TaskStatus::Completed;
        self.completed_at = Some(completed_at.into());
        self.progress = 100;
        self.message = "Analysis completed".to_string();
    }

    /// Move the task into the failed state, capturing the error verbatim.
    /// No-op once terminal.
    pub fn mark_failed(&mut self, error: impl Into<String>, failed_at: impl Into<String>) {
        if self.status.is_terminal() {
            return;
        }
        let error = error.into();
        self.status = TaskStatus::Failed;
        self.completed_at = Some(failed_at.into());
        self.message = format!("Analysis failed: {}", error);
        self.error = Some(error);
    }
}
