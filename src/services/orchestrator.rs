//! Task Orchestrator
//!
//! Owns the live task registry and the task state machine. Submission
//! validates parameters, registers a pending task, and schedules background
//! execution; callers observe progress only by polling. Engine invocations
//! are gated by a fixed-size semaphore so an arbitrary number of
//! submissions cannot spawn an arbitrary number of external processes, and
//! every running task carries a cancellation token.
//!
//! Per task there is exactly one background writer; the HTTP-facing read
//! path only ever takes snapshots. Once a task leaves the live registry the
//! history record is the system of record.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use forceqc_core::{AnalysisParams, Task, TaskStore, ValidatedParams};
use tokio::sync::{RwLock, Semaphore};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use uuid::Uuid;

use crate::models::analysis::NormalizedResult;
use crate::services::engine::AnalysisEngine;
use crate::services::history::HistoryStore;
use crate::services::normalizer;
use crate::utils::error::{AppError, AppResult};
use crate::utils::paths::StorageLayout;

/// Orchestrates the lifecycle of analysis tasks.
#[derive(Clone)]
pub struct TaskOrchestrator {
    store: Arc<dyn TaskStore>,
    engine: Arc<AnalysisEngine>,
    history: HistoryStore,
    layout: StorageLayout,
    /// Gates concurrent engine invocations.
    permits: Arc<Semaphore>,
    /// Cancellation tokens of live tasks, removed when execution ends.
    cancellations: Arc<RwLock<HashMap<String, CancellationToken>>>,
}

impl TaskOrchestrator {
    /// Create an orchestrator.
    pub fn new(
        store: Arc<dyn TaskStore>,
        engine: AnalysisEngine,
        layout: StorageLayout,
        max_concurrent: usize,
    ) -> Self {
        Self {
            store,
            engine: Arc::new(engine),
            history: HistoryStore::new(layout.clone()),
            layout,
            permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
            cancellations: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Submit an analysis run.
    ///
    /// Validates synchronously (no task is created for invalid parameters),
    /// registers a pending task, schedules execution, and returns the new
    /// task id immediately. Never blocks on the engine.
    pub async fn submit(&self, params: &AnalysisParams) -> AppResult<String> {
        let validated = params.validate()?;

        let task_id = Uuid::new_v4().to_string();
        let task = Task::new(task_id.clone(), Utc::now().to_rfc3339());
        self.store.upsert(task).await;

        let cancel = CancellationToken::new();
        self.cancellations
            .write()
            .await
            .insert(task_id.clone(), cancel.clone());

        info!(task_id = %task_id, source = %validated.source_id, "analysis task submitted");

        let orchestrator = self.clone();
        let spawned_id = task_id.clone();
        tokio::spawn(async move {
            orchestrator.execute(spawned_id, validated, cancel).await;
        });

        Ok(task_id)
    }

    /// Background execution of one task. Errors are captured into the task
    /// record and never propagate out of the spawned future.
    async fn execute(&self, task_id: String, params: ValidatedParams, cancel: CancellationToken) {
        let outcome = self.execute_inner(&task_id, &params, &cancel).await;

        // Drop the token before the terminal transition so a task observed
        // as terminal is already uncancellable.
        self.cancellations.write().await.remove(&task_id);

        let now = Utc::now().to_rfc3339();
        match outcome {
            Ok(()) => {
                self.update_task(&task_id, |t| t.mark_completed(now.clone()))
                    .await;
                info!(task_id = %task_id, "analysis task completed");
            }
            Err(e) => {
                let message = e.to_string();
                error!(task_id = %task_id, error = %message, "analysis task failed");
                self.update_task(&task_id, |t| t.mark_failed(message.clone(), now.clone()))
                    .await;
            }
        }
    }

    async fn execute_inner(
        &self,
        task_id: &str,
        params: &ValidatedParams,
        cancel: &CancellationToken,
    ) -> AppResult<()> {
        // Queue on the permit before touching the task so a backlog stays
        // visibly pending instead of half-started.
        let _permit = self
            .permits
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| AppError::internal("task scheduler is shut down"))?;

        self.update_task(task_id, |t| {
            t.mark_running(Utc::now().to_rfc3339());
            t.set_progress(10, "Initializing analysis");
        })
        .await;

        let input_path = self.layout.upload_file(&params.source_id);
        let output_dir = self.layout.run_dir(task_id);

        self.update_task(task_id, |t| t.set_progress(30, "Running statistical analysis"))
            .await;

        let result = self
            .engine
            .run(&input_path, &output_dir, task_id, params, cancel)
            .await?;

        self.update_task(task_id, |t| t.set_progress(90, "Cataloging results"))
            .await;

        // Exactly one append per completed task; failure here fails the
        // task rather than leaving a completed run out of the catalog.
        self.history.append(
            task_id,
            &result,
            &format!("{}.csv", params.source_id),
        )?;

        Ok(())
    }

    /// Read-modify-write helper. Safe because each task has exactly one
    /// background writer.
    async fn update_task(&self, task_id: &str, mutate: impl FnOnce(&mut Task)) {
        if let Some(mut task) = self.store.get(task_id).await {
            mutate(&mut task);
            self.store.upsert(task).await;
        }
    }

    /// Current view of a task.
    ///
    /// Live tasks are returned as-is. For tasks that have left the live
    /// registry an equivalent completed view is synthesized from the
    /// history record; ids known to neither are `NotFound`.
    pub async fn get_status(&self, task_id: &str) -> AppResult<Task> {
        if let Some(task) = self.store.get(task_id).await {
            return Ok(task);
        }

        let record = self.history.get(task_id).map_err(|e| match e {
            AppError::NotFound(_) => AppError::not_found(format!("task not found: {}", task_id)),
            other => other,
        })?;

        let mut task = Task::new(record.id, record.created_at.clone());
        task.mark_running(record.created_at.clone());
        task.mark_completed(record.created_at);
        Ok(task)
    }

    /// Load the normalized result of a completed run.
    ///
    /// Requires both the history record and the run's result file;
    /// `NotFound` when either is missing, a decode error when the file
    /// exists but cannot be parsed.
    pub async fn get_result(&self, task_id: &str) -> AppResult<NormalizedResult> {
        self.history.get(task_id).map_err(|e| match e {
            AppError::NotFound(_) => AppError::not_found(format!("task not found: {}", task_id)),
            other => other,
        })?;

        let result_path = self.layout.result_file(task_id);
        if !result_path.exists() {
            return Err(AppError::not_found(format!(
                "no analysis result for task {}",
                task_id
            )));
        }

        let content = std::fs::read_to_string(&result_path)?;
        normalizer::normalize_str(&content)
    }

    /// Cancel a running task. `NotFound` when the task has no live
    /// execution to cancel.
    pub async fn cancel(&self, task_id: &str) -> AppResult<()> {
        let cancellations = self.cancellations.read().await;
        match cancellations.get(task_id) {
            Some(token) => {
                token.cancel();
                info!(task_id = %task_id, "cancellation requested");
                Ok(())
            }
            None => Err(AppError::not_found(format!(
                "no running task to cancel: {}",
                task_id
            ))),
        }
    }

    /// Remove a task from the live registry. History is untouched; a
    /// completed run remains observable through `get_status`.
    pub async fn remove(&self, task_id: &str) -> Option<Task> {
        self.store.remove(task_id).await
    }

    /// Snapshot of all live tasks.
    pub async fn live_tasks(&self) -> Vec<Task> {
        self.store.list().await
    }

    /// The history store backing this orchestrator.
    pub fn history(&self) -> &HistoryStore {
        &self.history
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use forceqc_core::{InMemoryTaskStore, TaskStatus, ToleranceInput};
    use std::path::{Path, PathBuf};
    use std::time::Duration;

    const RESULT_JSON: &str = r#"{
        "overall_stats": [{"samples": 4, "mean": 25.1, "success_rate": 95.0}],
        "target_analysis": [
            {"target_force": 5.0, "samples": 2, "success_rate": 100.0},
            {"target_force": 25.0, "samples": 2, "success_rate": 90.0}
        ]
    }"#;

    /// Fake engine script that copies a canned result into the output dir.
    fn write_ok_script(dir: &Path) -> PathBuf {
        let result_fixture = dir.join("fixture.json");
        std::fs::write(&result_fixture, RESULT_JSON).unwrap();
        let script = dir.join("engine.sh");
        std::fs::write(
            &script,
            format!(
                r#"
out=""
prev=""
for arg in "$@"; do
  if [ "$prev" = "--output-dir" ]; then out="$arg"; fi
  prev="$arg"
done
mkdir -p "$out"
cp {} "$out/analysis_results.json"
"#,
                result_fixture.display()
            ),
        )
        .unwrap();
        script
    }

    fn orchestrator_with_script(tmp: &tempfile::TempDir, script: &Path) -> TaskOrchestrator {
        let layout = StorageLayout::new(tmp.path().join("data"));
        layout.ensure_layout().unwrap();
        let engine = AnalysisEngine::new(crate::models::settings::EngineConfig {
            command: "sh".to_string(),
            script: script.to_path_buf(),
            timeout_secs: 10,
            max_concurrent: 2,
        });
        TaskOrchestrator::new(Arc::new(InMemoryTaskStore::new()), engine, layout, 2)
    }

    fn stage_upload(orchestrator: &TaskOrchestrator, source_id: &str) {
        let path = orchestrator.layout.upload_file(source_id);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, "force,x,y\n5.1,0.0,0.0\n").unwrap();
    }

    fn params(source_id: &str) -> AnalysisParams {
        AnalysisParams {
            source_id: source_id.to_string(),
            target_forces: vec![5.0, 25.0],
            tolerance_abs: ToleranceInput::Scalar(2.0),
            tolerance_pct: ToleranceInput::Scalar(5.0),
        }
    }

    async fn wait_terminal(orchestrator: &TaskOrchestrator, task_id: &str) -> Task {
        for _ in 0..250 {
            let task = orchestrator.get_status(task_id).await.unwrap();
            if task.status.is_terminal() {
                return task;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        panic!("task {} never reached a terminal state", task_id);
    }

    #[tokio::test]
    async fn test_submit_twice_yields_distinct_completed_tasks() {
        let tmp = tempfile::tempdir().unwrap();
        let script = write_ok_script(tmp.path());
        let orchestrator = orchestrator_with_script(&tmp, &script);
        stage_upload(&orchestrator, "run-data");

        let id_a = orchestrator.submit(&params("run-data")).await.unwrap();
        let id_b = orchestrator.submit(&params("run-data")).await.unwrap();
        assert_ne!(id_a, id_b);

        let task_a = wait_terminal(&orchestrator, &id_a).await;
        let task_b = wait_terminal(&orchestrator, &id_b).await;
        assert_eq!(task_a.status, TaskStatus::Completed);
        assert_eq!(task_b.status, TaskStatus::Completed);
        assert_eq!(task_a.progress, 100);
    }

    #[tokio::test]
    async fn test_invalid_params_create_no_task() {
        let tmp = tempfile::tempdir().unwrap();
        let script = write_ok_script(tmp.path());
        let orchestrator = orchestrator_with_script(&tmp, &script);

        let mut bad = params("run-data");
        bad.tolerance_abs = ToleranceInput::List(vec![1.0]);
        let err = orchestrator.submit(&bad).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(orchestrator.live_tasks().await.is_empty());
    }

    #[tokio::test]
    async fn test_engine_failure_marks_task_failed_with_message() {
        let tmp = tempfile::tempdir().unwrap();
        let script = tmp.path().join("engine.sh");
        std::fs::write(&script, "echo 'no force column' >&2\nexit 2\n").unwrap();
        let orchestrator = orchestrator_with_script(&tmp, &script);
        stage_upload(&orchestrator, "run-data");

        let id = orchestrator.submit(&params("run-data")).await.unwrap();
        let task = wait_terminal(&orchestrator, &id).await;

        assert_eq!(task.status, TaskStatus::Failed);
        let error = task.error.unwrap();
        assert!(error.contains("no force column"), "error was: {}", error);
        // Failed runs are not cataloged.
        assert!(orchestrator.history().list().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_completion_appends_history_once() {
        let tmp = tempfile::tempdir().unwrap();
        let script = write_ok_script(tmp.path());
        let orchestrator = orchestrator_with_script(&tmp, &script);
        stage_upload(&orchestrator, "run-data");

        let id = orchestrator.submit(&params("run-data")).await.unwrap();
        wait_terminal(&orchestrator, &id).await;

        let records = orchestrator.history().list().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, id);
        assert_eq!(records[0].original_filename, "run-data.csv");
        // (2*100 + 2*90) / 4
        assert_eq!(records[0].success_rate, 95.0);
    }

    #[tokio::test]
    async fn test_get_status_falls_back_to_history() {
        let tmp = tempfile::tempdir().unwrap();
        let script = write_ok_script(tmp.path());
        let orchestrator = orchestrator_with_script(&tmp, &script);
        stage_upload(&orchestrator, "run-data");

        let id = orchestrator.submit(&params("run-data")).await.unwrap();
        wait_terminal(&orchestrator, &id).await;

        orchestrator.remove(&id).await.unwrap();
        let task = orchestrator.get_status(&id).await.unwrap();
        assert_eq!(task.status, TaskStatus::Completed);
        assert_eq!(task.progress, 100);

        assert!(matches!(
            orchestrator.get_status("unknown").await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_get_result_distinguishes_missing_and_corrupt() {
        let tmp = tempfile::tempdir().unwrap();
        let script = write_ok_script(tmp.path());
        let orchestrator = orchestrator_with_script(&tmp, &script);
        stage_upload(&orchestrator, "run-data");

        assert!(matches!(
            orchestrator.get_result("unknown").await,
            Err(AppError::NotFound(_))
        ));

        let id = orchestrator.submit(&params("run-data")).await.unwrap();
        wait_terminal(&orchestrator, &id).await;

        let result = orchestrator.get_result(&id).await.unwrap();
        assert_eq!(result.target_analysis.len(), 2);
        assert_eq!(result.overall_stats.samples, 4);

        // Corrupt the result file: now decodable error, not NotFound.
        std::fs::write(orchestrator.layout.result_file(&id), "{broken").unwrap();
        assert!(matches!(
            orchestrator.get_result(&id).await,
            Err(AppError::Decode(_))
        ));

        // Remove it entirely: back to NotFound.
        std::fs::remove_file(orchestrator.layout.result_file(&id)).unwrap();
        assert!(matches!(
            orchestrator.get_result(&id).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_cancel_kills_running_task() {
        let tmp = tempfile::tempdir().unwrap();
        let script = tmp.path().join("engine.sh");
        std::fs::write(&script, "sleep 30\n").unwrap();
        let orchestrator = orchestrator_with_script(&tmp, &script);
        stage_upload(&orchestrator, "run-data");

        let id = orchestrator.submit(&params("run-data")).await.unwrap();
        tokio::time::sleep(Duration::from_millis(200)).await;
        orchestrator.cancel(&id).await.unwrap();

        let task = wait_terminal(&orchestrator, &id).await;
        assert_eq!(task.status, TaskStatus::Failed);
        assert!(task.error.unwrap().contains("cancelled"));

        // The token is gone with the execution.
        assert!(matches!(
            orchestrator.cancel(&id).await,
            Err(AppError::NotFound(_))
        ));
    }
}
