//! Task Store
//!
//! The live task registry behind the orchestrator, abstracted as a trait so
//! the orchestrator never touches a global map. Each task has exactly one
//! background writer, so the store only needs whole-record upsert
//! semantics; readers observe whichever state was last written.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::task::Task;

/// Registry of live tasks.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Insert or replace a task record.
    async fn upsert(&self, task: Task);

    /// Fetch a snapshot of a task by id.
    async fn get(&self, id: &str) -> Option<Task>;

    /// Remove a task from the registry, returning it if present.
    async fn remove(&self, id: &str) -> Option<Task>;

    /// Snapshot all live tasks, in no particular order.
    async fn list(&self) -> Vec<Task>;
}

/// In-memory task store backed by an `RwLock<HashMap>`.
#[derive(Debug, Default)]
pub struct InMemoryTaskStore {
    tasks: RwLock<HashMap<String, Task>>,
}

impl InMemoryTaskStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    async fn upsert(&self, task: Task) {
        let mut tasks = self.tasks.write().await;
        tasks.insert(task.id.clone(), task);
    }

    async fn get(&self, id: &str) -> Option<Task> {
        let tasks = self.tasks.read().await;
        tasks.get(id).cloned()
    }

    async fn remove(&self, id: &str) -> Option<Task> {
        let mut tasks = self.tasks.write().await;
        tasks.remove(id)
    }

    async fn list(&self) -> Vec<Task> {
        let tasks = self.tasks.read().await;
        tasks.values().cloned().collect()
    }
}
