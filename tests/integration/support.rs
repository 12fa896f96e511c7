//! Shared fixtures for the integration tests: a stub analysis engine
//! implemented as a shell script, plus orchestrator construction helpers.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use forceqc::models::settings::EngineConfig;
use forceqc::{AnalysisEngine, StorageLayout, TaskOrchestrator};
use forceqc_core::{AnalysisParams, InMemoryTaskStore, Task, ToleranceInput};

/// Canned engine output: three targets in ascending order, with the
/// single-aggregate sections in the one-element-list shape the real engine
/// produces for single-row frames.
pub const RESULT_JSON: &str = r#"{
    "data_summary": [{
        "total_rows": 120, "missing_values": 0, "duplicate_rows": 0,
        "force_min": 3.2, "force_max": 52.1, "force_mean": 26.7, "force_std": 18.4
    }],
    "overall_stats": {"samples": 120, "mean": 26.7, "std_dev": 18.4, "cv_percent": 4.1, "success_rate": 94.2},
    "target_analysis": [
        {"target_force": 5.0, "samples": 40, "success_rate": 97.5, "mean_force": 5.05,
         "mean_abs_deviation": 0.31, "max_abs_deviation": 1.2, "std_dev": 0.4, "tolerance_abs": 2.0},
        {"target_force": 25.0, "samples": 40, "success_rate": 95.0, "mean_force": 25.2,
         "mean_abs_deviation": 0.52, "max_abs_deviation": 1.9, "std_dev": 0.7, "tolerance_abs": 2.0},
        {"target_force": 50.0, "samples": 40, "success_rate": 90.0, "mean_force": 50.4,
         "mean_abs_deviation": 0.88, "max_abs_deviation": 2.4, "std_dev": 1.1, "tolerance_abs": 2.0}
    ],
    "process_capability": [
        {"target_force": 5.0, "cp": 1.61, "cpk": 1.52, "rating": "excellent"},
        {"target_force": 25.0, "cp": 1.34, "cpk": 1.21, "rating": "adequate"},
        {"target_force": 50.0, "cp": 1.12, "cpk": 0.98, "rating": "marginal"}
    ],
    "outlier_summary": [
        {"target_force": 5.0, "iqr_outlier_rate": 2.5, "z_outlier_rate": 0.0}
    ],
    "multi_source_variation_analysis": [{
        "performance_by_position": [
            {"position_group": "left", "target_force": 25.0, "samples": 20,
             "success_rate": 95.0, "mean_abs_deviation": 0.5, "std_dev": 0.6}
        ],
        "robot_consistency": {
            "force_repeatability": {"25": 2.1},
            "position_accuracy": {"x": 0.04, "y": 0.06}
        }
    }]
}"#;

/// Write a stub engine script that copies the canned result into the run's
/// output directory and drops two cataloged chart images (plus one file the
/// catalog does not know).
pub fn write_engine_script(dir: &Path) -> PathBuf {
    let fixture = dir.join("fixture.json");
    std::fs::write(&fixture, RESULT_JSON).unwrap();

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
cp {fixture} "$out/analysis_results.json"
printf 'png' > "$out/force_histogram.png"
printf 'png' > "$out/shewhart_control.png"
printf 'png' > "$out/unknown_extra.png"
"#,
            fixture = fixture.display()
        ),
    )
    .unwrap();
    script
}

/// Build an orchestrator over a fresh layout, driving the stub script.
pub fn orchestrator(tmp: &Path, script: &Path) -> (TaskOrchestrator, StorageLayout) {
    let layout = StorageLayout::new(tmp.join("data"));
    layout.ensure_layout().unwrap();

    let engine = AnalysisEngine::new(EngineConfig {
        command: "sh".to_string(),
        script: script.to_path_buf(),
        timeout_secs: 30,
        max_concurrent: 2,
    });
    let orchestrator =
        TaskOrchestrator::new(Arc::new(InMemoryTaskStore::new()), engine, layout.clone(), 2);
    (orchestrator, layout)
}

/// Stage a measurement file under the uploads directory.
pub fn stage_upload(layout: &StorageLayout, source_id: &str) {
    let path = layout.upload_file(source_id);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, "force,x,y\n5.1,0.0,0.0\n25.2,1.0,0.5\n").unwrap();
}

/// The submission used throughout: three targets with scalar tolerances.
pub fn params(source_id: &str) -> AnalysisParams {
    AnalysisParams {
        source_id: source_id.to_string(),
        target_forces: vec![5.0, 25.0, 50.0],
        tolerance_abs: ToleranceInput::Scalar(2.0),
        tolerance_pct: ToleranceInput::Scalar(5.0),
    }
}

/// Poll a task until it reaches a terminal state.
pub async fn wait_terminal(orchestrator: &TaskOrchestrator, task_id: &str) -> Task {
    for _ in 0..500 {
        let task = orchestrator.get_status(task_id).await.unwrap();
        if task.status.is_terminal() {
            return task;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("task {} never reached a terminal state", task_id);
}
