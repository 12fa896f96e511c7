//! End-to-end pipeline tests: submit, poll to completion, load the
//! normalized result.

use forceqc::AppError;
use forceqc_core::TaskStatus;

use crate::support;

#[tokio::test]
async fn test_submit_poll_and_get_result() {
    let tmp = tempfile::tempdir().unwrap();
    let script = support::write_engine_script(tmp.path());
    let (orchestrator, layout) = support::orchestrator(tmp.path(), &script);
    support::stage_upload(&layout, "press_run");

    let task_id = orchestrator
        .submit(&support::params("press_run"))
        .await
        .unwrap();
    let task = support::wait_terminal(&orchestrator, &task_id).await;
    assert_eq!(task.status, TaskStatus::Completed);
    assert_eq!(task.progress, 100);

    let result = orchestrator.get_result(&task_id).await.unwrap();

    // One entry per requested target, ascending.
    assert_eq!(result.target_analysis.len(), 3);
    let targets: Vec<f64> = result
        .target_analysis
        .iter()
        .map(|t| t.target_force)
        .collect();
    assert_eq!(targets, vec![5.0, 25.0, 50.0]);

    // The one-element-list sections arrived as single objects.
    assert_eq!(result.data_summary.total_rows, 120);
    assert_eq!(
        result
            .multi_source_variation_analysis
            .performance_by_position
            .len(),
        1
    );

    // History was appended with the sample-weighted rate.
    let records = orchestrator.history().list().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id, task_id);
    let expected = (40.0 * 97.5 + 40.0 * 95.0 + 40.0 * 90.0) / 120.0;
    assert!((records[0].success_rate - expected).abs() < 0.01);
}

#[tokio::test]
async fn test_concurrent_submissions_reach_terminal_states() {
    let tmp = tempfile::tempdir().unwrap();
    let script = support::write_engine_script(tmp.path());
    let (orchestrator, layout) = support::orchestrator(tmp.path(), &script);
    support::stage_upload(&layout, "press_run");

    let mut ids = Vec::new();
    for _ in 0..4 {
        ids.push(
            orchestrator
                .submit(&support::params("press_run"))
                .await
                .unwrap(),
        );
    }

    // Distinct ids, every one completes despite the 2-permit gate.
    let mut unique = ids.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(unique.len(), 4);

    for id in &ids {
        let task = support::wait_terminal(&orchestrator, id).await;
        assert_eq!(task.status, TaskStatus::Completed);
    }
    assert_eq!(orchestrator.history().list().unwrap().len(), 4);
}

#[tokio::test]
async fn test_unknown_task_is_not_found() {
    let tmp = tempfile::tempdir().unwrap();
    let script = support::write_engine_script(tmp.path());
    let (orchestrator, _layout) = support::orchestrator(tmp.path(), &script);

    assert!(matches!(
        orchestrator.get_status("no-such-task").await,
        Err(AppError::NotFound(_))
    ));
    assert!(matches!(
        orchestrator.get_result("no-such-task").await,
        Err(AppError::NotFound(_))
    ));
}
