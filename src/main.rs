//! ForceQC CLI
//!
//! Thin I/O shell around the analysis pipeline: stages a measurement file,
//! submits an analysis run, polls it to completion, and writes the
//! composite report. Usage:
//!
//! ```text
//! forceqc <measurements.csv> [targets] [tolerance_abs] [tolerance_pct]
//! forceqc data/press_run.csv 5,25,50 2.0 5.0
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context};
use forceqc_core::{AnalysisParams, InMemoryTaskStore, TaskStatus, ToleranceInput};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use forceqc::models::settings::AppConfig;
use forceqc::services::narrative::{NarrativeClient, NarrativeGenerator, NarrativeStore};
use forceqc::{AnalysisEngine, ReportBuilder, StorageLayout, TaskOrchestrator};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(input) = args.first() else {
        eprintln!("Usage: forceqc <measurements.csv> [targets] [tolerance_abs] [tolerance_pct]");
        eprintln!("Example: forceqc data/press_run.csv 5,25,50 2.0 5.0");
        std::process::exit(2);
    };
    let input = PathBuf::from(input);

    let config = AppConfig::load_default().context("loading configuration")?;
    let layout = StorageLayout::new(config.resolved_data_dir().context("resolving data dir")?);
    layout.ensure_layout().context("creating data directories")?;

    let params = build_params(&args, &config, &layout, &input)?;

    let engine = AnalysisEngine::new(config.engine.clone());
    let orchestrator = TaskOrchestrator::new(
        Arc::new(InMemoryTaskStore::new()),
        engine,
        layout.clone(),
        config.engine.max_concurrent,
    );

    let task_id = orchestrator
        .submit(&params)
        .await
        .context("submitting analysis")?;
    info!(task_id = %task_id, "analysis submitted, waiting for completion");

    let task = loop {
        let task = orchestrator.get_status(&task_id).await?;
        if task.status.is_terminal() {
            break task;
        }
        info!(progress = task.progress, "{}", task.message);
        tokio::time::sleep(Duration::from_secs(2)).await;
    };

    if task.status == TaskStatus::Failed {
        bail!(
            "analysis failed: {}",
            task.error.unwrap_or_else(|| "unknown error".to_string())
        );
    }

    let result = orchestrator.get_result(&task_id).await?;
    println!(
        "Analysis complete: {} samples, weighted success rate {:.1}%",
        result.total_samples(),
        result.weighted_success_rate()
    );

    // Narrative is best-effort: a missing key or unreachable service only
    // costs the narrative section, never the report.
    let narrative = if config.narrative.resolved_api_key().is_some() {
        let generator = NarrativeGenerator::new(
            NarrativeClient::new(config.narrative.clone()),
            NarrativeStore::new(layout.clone()),
        );
        match generator.generate(&task_id, &result, "comprehensive").await {
            Ok(record) => Some(record.report),
            Err(e) => {
                warn!(error = %e, "narrative generation failed, continuing without it");
                None
            }
        }
    } else {
        info!("no narrative API key configured, skipping narrative section");
        None
    };

    let report = ReportBuilder::new(layout);
    let report_path = report
        .build(&task_id, &result, narrative.as_deref())
        .context("building report")?;
    println!("Report written to {}", report_path.display());

    Ok(())
}

/// Assemble submission parameters from CLI arguments, staging the input
/// file into the uploads directory.
fn build_params(
    args: &[String],
    config: &AppConfig,
    layout: &StorageLayout,
    input: &Path,
) -> anyhow::Result<AnalysisParams> {
    if !input.exists() {
        bail!("measurement file not found: {}", input.display());
    }

    let source_id = input
        .file_stem()
        .and_then(|s| s.to_str())
        .map(|s| s.to_string())
        .unwrap_or_else(|| "measurements".to_string());
    let staged = layout.upload_file(&source_id);
    std::fs::copy(input, &staged)
        .with_context(|| format!("staging {} into uploads", input.display()))?;

    let target_forces = match args.get(1) {
        Some(raw) => parse_numbers(raw).context("parsing targets")?,
        None => config.default_target_forces.clone(),
    };
    let tolerance_abs = match args.get(2) {
        Some(raw) => parse_tolerance(raw).context("parsing tolerance_abs")?,
        None => ToleranceInput::Scalar(config.default_tolerance_abs),
    };
    let tolerance_pct = match args.get(3) {
        Some(raw) => parse_tolerance(raw).context("parsing tolerance_pct")?,
        None => ToleranceInput::Scalar(config.default_tolerance_pct),
    };

    Ok(AnalysisParams {
        source_id,
        target_forces,
        tolerance_abs,
        tolerance_pct,
    })
}

fn parse_numbers(raw: &str) -> anyhow::Result<Vec<f64>> {
    raw.split(',')
        .map(|part| {
            part.trim()
                .parse::<f64>()
                .with_context(|| format!("not a number: {}", part))
        })
        .collect()
}

/// A tolerance argument is a scalar unless it contains commas.
fn parse_tolerance(raw: &str) -> anyhow::Result<ToleranceInput> {
    if raw.contains(',') {
        Ok(ToleranceInput::List(parse_numbers(raw)?))
    } else {
        Ok(ToleranceInput::Scalar(
            raw.trim().parse::<f64>().with_context(|| format!("not a number: {}", raw))?,
        ))
    }
}
