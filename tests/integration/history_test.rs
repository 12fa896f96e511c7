//! History lifecycle tests over runs produced by the real pipeline.

use forceqc::{AppError, HistoryStore};

use crate::support;

#[tokio::test]
async fn test_rename_then_delete_is_irreversible() {
    let tmp = tempfile::tempdir().unwrap();
    let script = support::write_engine_script(tmp.path());
    let (orchestrator, layout) = support::orchestrator(tmp.path(), &script);
    support::stage_upload(&layout, "press_run");

    let task_id = orchestrator
        .submit(&support::params("press_run"))
        .await
        .unwrap();
    support::wait_terminal(&orchestrator, &task_id).await;

    let store = HistoryStore::new(layout.clone());
    let renamed = store.rename(&task_id, "acceptance baseline").unwrap();
    assert_eq!(renamed.name, "acceptance baseline");
    assert!(renamed.modified_at.is_some());

    // The run directory exists with charts before deletion.
    let run_dir = layout.run_dir(&task_id);
    assert!(run_dir.join("force_histogram.png").exists());

    store.delete(&task_id).unwrap();

    // Record gone, run directory gone, and the id resolves nowhere.
    assert!(store.list().unwrap().iter().all(|r| r.id != task_id));
    assert!(!run_dir.exists());
    assert!(matches!(store.get(&task_id), Err(AppError::NotFound(_))));

    // Once the live registry entry is dropped too, status is NotFound.
    orchestrator.remove(&task_id).await;
    assert!(matches!(
        orchestrator.get_status(&task_id).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_batch_delete_reports_partial_failure() {
    let tmp = tempfile::tempdir().unwrap();
    let script = support::write_engine_script(tmp.path());
    let (orchestrator, layout) = support::orchestrator(tmp.path(), &script);
    support::stage_upload(&layout, "press_run");

    let task_id = orchestrator
        .submit(&support::params("press_run"))
        .await
        .unwrap();
    support::wait_terminal(&orchestrator, &task_id).await;

    let store = HistoryStore::new(layout);
    let outcome = store.batch_delete(&[task_id.clone(), "ghost".to_string()]);

    assert_eq!(outcome.deleted, vec![task_id]);
    assert_eq!(outcome.failed.len(), 1);
    assert_eq!(outcome.failed[0].task_id, "ghost");
    assert!(outcome.failed[0].reason.contains("not found"));
}

#[tokio::test]
async fn test_completed_run_survives_registry_removal() {
    let tmp = tempfile::tempdir().unwrap();
    let script = support::write_engine_script(tmp.path());
    let (orchestrator, layout) = support::orchestrator(tmp.path(), &script);
    support::stage_upload(&layout, "press_run");

    let task_id = orchestrator
        .submit(&support::params("press_run"))
        .await
        .unwrap();
    support::wait_terminal(&orchestrator, &task_id).await;

    // Drop the disposable in-memory task; the filesystem stays the system
    // of record.
    orchestrator.remove(&task_id).await.unwrap();

    let synthesized = orchestrator.get_status(&task_id).await.unwrap();
    assert_eq!(synthesized.progress, 100);
    assert!(orchestrator.get_result(&task_id).await.is_ok());
}
