//! Report synthesis tests over a completed pipeline run.

use forceqc::services::report;
use forceqc::{ChartCatalog, ReportBuilder};

use crate::support;

#[tokio::test]
async fn test_report_from_completed_run() {
    let tmp = tempfile::tempdir().unwrap();
    let script = support::write_engine_script(tmp.path());
    let (orchestrator, layout) = support::orchestrator(tmp.path(), &script);
    support::stage_upload(&layout, "press_run");

    let task_id = orchestrator
        .submit(&support::params("press_run"))
        .await
        .unwrap();
    support::wait_terminal(&orchestrator, &task_id).await;
    let result = orchestrator.get_result(&task_id).await.unwrap();

    let narrative = "# Overview\nThe process is stable overall.\n\n## Risks\nCapability at 50 N is marginal.";
    let builder = ReportBuilder::new(layout.clone());
    let path = builder
        .build(&task_id, &result, Some(narrative))
        .unwrap();

    let document = std::fs::read_to_string(&path).unwrap();

    // Narrative headings re-leveled under the document hierarchy.
    assert!(document.contains("## AI Narrative Analysis"));
    assert!(document.contains("## Overview"));
    assert!(document.contains("### Risks"));

    // Statistics from the engine output.
    assert!(document.contains("| 50 | 40 | 90.0 |"));
    assert!(document.contains("| 50 | 1.120 | 0.980 | marginal |"));

    // Both cataloged charts render with embedded images; the unknown file
    // is absent.
    assert!(document.contains("Force Distribution Histogram by Target"));
    assert!(document.contains("Shewhart Control Chart by Target"));
    assert!(!document.contains("unknown_extra"));

    // Persisted to the archive as well.
    let archived = layout
        .report_archive_dir()
        .join(format!("force_analysis_report_{}.md", task_id));
    assert_eq!(
        std::fs::read_to_string(archived).unwrap(),
        document
    );
}

#[tokio::test]
async fn test_missing_chart_image_degrades_to_placeholder() {
    let tmp = tempfile::tempdir().unwrap();
    let script = support::write_engine_script(tmp.path());
    let (orchestrator, layout) = support::orchestrator(tmp.path(), &script);
    support::stage_upload(&layout, "press_run");

    let task_id = orchestrator
        .submit(&support::params("press_run"))
        .await
        .unwrap();
    support::wait_terminal(&orchestrator, &task_id).await;
    let result = orchestrator.get_result(&task_id).await.unwrap();

    // Collect descriptors while the files exist, then delete one image to
    // simulate it vanishing between cataloging and rendering.
    let charts = ChartCatalog::new(layout.clone()).collect(&task_id).unwrap();
    assert_eq!(charts.len(), 2);
    let victim = layout.run_dir(&task_id).join("force_histogram.png");
    std::fs::remove_file(&victim).unwrap();

    let document = report::render(&task_id, Some("press_run.csv"), &result, &charts, None);

    // The gap is recorded inline and everything else still renders.
    assert!(document.contains(&format!("Chart file missing: {}", victim.display())));
    assert!(document.contains("Shewhart Control Chart by Target"));
    assert!(document.contains("## Conclusions"));
}

#[tokio::test]
async fn test_report_without_narrative_omits_section() {
    let tmp = tempfile::tempdir().unwrap();
    let script = support::write_engine_script(tmp.path());
    let (orchestrator, layout) = support::orchestrator(tmp.path(), &script);
    support::stage_upload(&layout, "press_run");

    let task_id = orchestrator
        .submit(&support::params("press_run"))
        .await
        .unwrap();
    support::wait_terminal(&orchestrator, &task_id).await;
    let result = orchestrator.get_result(&task_id).await.unwrap();

    let path = ReportBuilder::new(layout)
        .build(&task_id, &result, None)
        .unwrap();
    let document = std::fs::read_to_string(path).unwrap();

    assert!(!document.contains("## AI Narrative Analysis"));
    assert!(document.contains("Source file: press_run.csv"));
    assert!(document.contains("## Conclusions"));
}
