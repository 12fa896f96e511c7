//! Report Synthesizer
//!
//! Assembles one exportable Markdown document per run: a title block,
//! optional AI narrative, the statistic tables, every cataloged chart with
//! its caption and reading guidance, and a conclusions section. The
//! document is written to the downloads directory and copied to the
//! archive; the downloads path is the canonical return value.
//!
//! Degradation rules: a missing narrative simply omits that section, and a
//! missing chart image becomes an inline placeholder naming the path.
//! Synthesis only fails when the normalized result itself is unavailable
//! or the document cannot be written.

use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::info;

use crate::models::analysis::NormalizedResult;
use crate::models::chart::{ChartCategory, ChartDescriptor};
use crate::services::charts::ChartCatalog;
use crate::services::history::HistoryStore;
use crate::utils::error::AppResult;
use crate::utils::paths::{ensure_dir, StorageLayout};

/// Builds and persists composite analysis reports.
#[derive(Debug, Clone)]
pub struct ReportBuilder {
    layout: StorageLayout,
    charts: ChartCatalog,
    history: HistoryStore,
}

impl ReportBuilder {
    /// Create a builder over the given storage layout.
    pub fn new(layout: StorageLayout) -> Self {
        Self {
            charts: ChartCatalog::new(layout.clone()),
            history: HistoryStore::new(layout.clone()),
            layout,
        }
    }

    /// Build the report for a run and persist it to the downloads and
    /// archive locations. Returns the downloads path.
    pub fn build(
        &self,
        task_id: &str,
        result: &NormalizedResult,
        narrative: Option<&str>,
    ) -> AppResult<PathBuf> {
        let charts = self.charts.collect(task_id)?;
        let source = self.history.get(task_id).ok().map(|r| r.original_filename);
        let document = render(task_id, source.as_deref(), result, &charts, narrative);

        let file_name = format!("force_analysis_report_{}.md", task_id);
        let download_path = self.layout.report_downloads_dir().join(&file_name);
        let archive_path = self.layout.report_archive_dir().join(&file_name);

        ensure_dir(&self.layout.report_downloads_dir())?;
        ensure_dir(&self.layout.report_archive_dir())?;
        std::fs::write(&download_path, &document)?;
        std::fs::copy(&download_path, &archive_path)?;

        info!(
            task_id = %task_id,
            path = %download_path.display(),
            "analysis report generated"
        );
        Ok(download_path)
    }
}

/// Render the report document. Pure with respect to the result and chart
/// list; only the per-chart image check touches the filesystem.
pub fn render(
    task_id: &str,
    source: Option<&str>,
    result: &NormalizedResult,
    charts: &[ChartDescriptor],
    narrative: Option<&str>,
) -> String {
    let mut doc = String::new();
    let generated_at = Utc::now().format("%Y-%m-%d %H:%M:%S UTC");

    // Title block
    doc.push_str("# Force Measurement Analysis Report\n\n");
    doc.push_str(&format!("Generated: {}\n\n", generated_at));
    doc.push_str(&format!("Run ID: {}\n\n", task_id));
    if let Some(source) = source {
        doc.push_str(&format!("Source file: {}\n\n", source));
    }

    if let Some(text) = narrative {
        push_narrative_section(&mut doc, text);
    }

    push_statistics_section(&mut doc, result);
    push_charts_section(&mut doc, charts);
    push_conclusions_section(&mut doc, result, charts.len(), narrative.is_some());

    doc.push_str("---\n\n");
    doc.push_str(&format!(
        "Generated by ForceQC | Run ID: {} | {}\n",
        task_id, generated_at
    ));
    doc
}

fn push_narrative_section(doc: &mut String, text: &str) {
    doc.push_str("## AI Narrative Analysis\n\n");
    doc.push_str(&reflow_narrative(text));
    doc.push('\n');
}

/// Re-flow generated Markdown into the document's own hierarchy: heading
/// markers shift one level deeper (capped at level 6) so the narrative
/// nests under its section heading, and consecutive plain lines merge into
/// paragraphs.
fn reflow_narrative(text: &str) -> String {
    let mut out = String::new();
    let mut paragraph: Vec<&str> = Vec::new();

    let flush = |out: &mut String, paragraph: &mut Vec<&str>| {
        if !paragraph.is_empty() {
            out.push_str(&paragraph.join("\n"));
            out.push_str("\n\n");
            paragraph.clear();
        }
    };

    for line in text.lines() {
        let line = line.trim_end();
        let trimmed = line.trim_start();
        if trimmed.is_empty() {
            flush(&mut out, &mut paragraph);
            continue;
        }

        let hashes = trimmed.chars().take_while(|c| *c == '#').count();
        if hashes > 0 && hashes <= 6 {
            flush(&mut out, &mut paragraph);
            let title = trimmed[hashes..].trim();
            let level = (hashes + 1).min(6);
            out.push_str(&format!("{} {}\n\n", "#".repeat(level), title));
        } else {
            paragraph.push(trimmed);
        }
    }
    flush(&mut out, &mut paragraph);
    out
}

fn push_statistics_section(doc: &mut String, result: &NormalizedResult) {
    doc.push_str("## Statistical Analysis\n\n");

    // Data summary
    doc.push_str("### Data Summary\n\n");
    let summary = &result.data_summary;
    doc.push_str("| Metric | Value |\n|---|---|\n");
    doc.push_str(&format!("| Total rows | {} |\n", summary.total_rows));
    doc.push_str(&format!("| Missing values | {} |\n", summary.missing_values));
    doc.push_str(&format!("| Duplicate rows | {} |\n", summary.duplicate_rows));
    doc.push_str(&format!(
        "| Force range (N) | {:.2} to {:.2} |\n",
        summary.force_min, summary.force_max
    ));
    doc.push_str(&format!(
        "| Mean force (N) | {:.2} (std {:.2}) |\n\n",
        summary.force_mean, summary.force_std
    ));

    // Overall statistics
    doc.push_str("### Overall Statistics\n\n");
    let overall = &result.overall_stats;
    doc.push_str("| Metric | Value |\n|---|---|\n");
    doc.push_str(&format!("| Samples | {} |\n", overall.samples));
    doc.push_str(&format!("| Mean (N) | {:.2} |\n", overall.mean));
    doc.push_str(&format!("| Std dev (N) | {:.3} |\n", overall.std_dev));
    doc.push_str(&format!("| CV (%) | {:.2} |\n", overall.cv_percent));
    doc.push_str(&format!(
        "| Success rate (%) | {:.1} |\n\n",
        overall.success_rate
    ));

    // Per-target table
    doc.push_str("### Target Force Analysis\n\n");
    if result.target_analysis.is_empty() {
        doc.push_str("No per-target results available.\n\n");
    } else {
        doc.push_str(
            "| Target (N) | Samples | Success (%) | Mean (N) | Mean dev (N) | Max dev (N) | Std dev (N) | Tolerance (N) |\n",
        );
        doc.push_str("|---|---|---|---|---|---|---|---|\n");
        for t in &result.target_analysis {
            doc.push_str(&format!(
                "| {} | {} | {:.1} | {:.2} | {:.2} | {:.2} | {:.3} | {:.2} |\n",
                t.target_force,
                t.samples,
                t.success_rate,
                t.mean_force,
                t.mean_abs_deviation,
                t.max_abs_deviation,
                t.std_dev,
                t.tolerance_abs
            ));
        }
        doc.push('\n');
    }

    // Process capability
    doc.push_str("### Process Capability\n\n");
    if result.process_capability.is_empty() {
        doc.push_str("No capability results available.\n\n");
    } else {
        doc.push_str("| Target (N) | Cp | Cpk | Rating |\n|---|---|---|---|\n");
        for c in &result.process_capability {
            doc.push_str(&format!(
                "| {} | {:.3} | {:.3} | {} |\n",
                c.target_force, c.cp, c.cpk, c.rating
            ));
        }
        doc.push('\n');
    }

    // Position performance
    let positions = &result.multi_source_variation_analysis.performance_by_position;
    if !positions.is_empty() {
        doc.push_str("### Position Performance\n\n");
        doc.push_str(
            "| Position | Target (N) | Samples | Success (%) | Mean dev (N) | Std dev (N) |\n",
        );
        doc.push_str("|---|---|---|---|---|---|\n");
        for p in positions {
            doc.push_str(&format!(
                "| {} | {} | {} | {:.1} | {:.2} | {:.3} |\n",
                p.position_group,
                p.target_force,
                p.samples,
                p.success_rate,
                p.mean_abs_deviation,
                p.std_dev
            ));
        }
        doc.push('\n');
    }

    // Robot consistency
    let consistency = &result.multi_source_variation_analysis.robot_consistency;
    if !consistency.force_repeatability.is_empty() || !consistency.position_accuracy.is_empty() {
        doc.push_str("### Robot Consistency\n\n");
        for (target, cv) in &consistency.force_repeatability {
            doc.push_str(&format!(
                "- Force repeatability at {} N: CV {:.2}%\n",
                target, cv
            ));
        }
        for (axis, std) in &consistency.position_accuracy {
            doc.push_str(&format!(
                "- Position accuracy, {} axis: std {:.3} mm\n",
                axis, std
            ));
        }
        doc.push('\n');
    }
}

fn push_charts_section(doc: &mut String, charts: &[ChartDescriptor]) {
    doc.push_str("## Charts\n\n");
    if charts.is_empty() {
        doc.push_str("No chart images were found for this run.\n\n");
        return;
    }

    let mut chart_number = 0;
    for category in ChartCategory::ORDERED {
        let in_category: Vec<&ChartDescriptor> =
            charts.iter().filter(|c| c.category == category).collect();
        if in_category.is_empty() {
            continue;
        }

        doc.push_str(&format!("### {}\n\n", category.label()));
        for chart in in_category {
            chart_number += 1;
            doc.push_str(&format!("**Chart {}: {}**\n\n", chart_number, chart.title));

            if Path::new(&chart.file_path).exists() {
                doc.push_str(&format!("![{}]({})\n\n", chart.title, chart.file_path));
            } else {
                // Missing image is a gap worth recording, never a failure.
                doc.push_str(&format!("Chart file missing: {}\n\n", chart.file_path));
            }

            doc.push_str(&format!("*{}*\n\n", chart.description));
            doc.push_str("Reading guide:\n\n");
            doc.push_str(&chart.interpretation);
            doc.push_str("\n\n");
        }
    }
}

fn push_conclusions_section(
    doc: &mut String,
    result: &NormalizedResult,
    chart_count: usize,
    has_narrative: bool,
) {
    doc.push_str("## Conclusions\n\n");

    let samples = result.total_samples();
    let success_rate = result.mean_success_rate();
    doc.push_str(&format!(
        "This analysis covered {} data points with a combined success rate of {:.1}%.\n\n",
        samples, success_rate
    ));
    doc.push_str(&format!(
        "- Data quality: {}\n",
        quality_grade(success_rate)
    ));
    doc.push_str(&format!(
        "- Charts: {} across basic analysis, process control, spatial analysis, and capability assessment\n",
        chart_count
    ));
    if has_narrative {
        doc.push_str("- Includes AI narrative analysis and recommendations\n");
    }
    doc.push('\n');

    doc.push_str("### Recommendations\n\n");
    for (i, recommendation) in generate_recommendations(result).iter().enumerate() {
        doc.push_str(&format!("{}. {}\n", i + 1, recommendation));
    }
    doc.push('\n');
}

/// Qualitative grade for a success rate, in percent.
fn quality_grade(success_rate: f64) -> &'static str {
    if success_rate >= 95.0 {
        "excellent"
    } else if success_rate >= 90.0 {
        "good"
    } else if success_rate >= 80.0 {
        "fair"
    } else {
        "needs improvement"
    }
}

/// Derive improvement recommendations from the headline numbers.
fn generate_recommendations(result: &NormalizedResult) -> Vec<String> {
    let mut recommendations = Vec::new();

    let success_rate = if result.overall_stats.samples > 0 {
        result.overall_stats.success_rate
    } else {
        result.weighted_success_rate()
    };

    if success_rate < 90.0 {
        recommendations.push("Check the stability of the measurement system".to_string());
        recommendations.push("Adjust process parameters to improve accuracy".to_string());
    }
    if success_rate < 80.0 {
        recommendations.push("Recalibrate the force application equipment".to_string());
        recommendations
            .push("Check whether environmental conditions affect the measurements".to_string());
    }

    if result.overall_stats.cv_percent > 10.0 {
        recommendations
            .push("Force variation is high; stabilize the process before tightening tolerances"
                .to_string());
    }

    let high_outlier_rate = result.outlier_summary.iter().any(|entry| {
        let iqr = entry
            .get("iqr_outlier_rate")
            .and_then(|v| v.as_f64())
            .unwrap_or(0.0);
        let z = entry
            .get("z_outlier_rate")
            .and_then(|v| v.as_f64())
            .unwrap_or(0.0);
        iqr > 5.0 || z > 2.0
    });
    if high_outlier_rate {
        recommendations
            .push("High outlier rate detected; review the data acquisition process".to_string());
    }

    if recommendations.is_empty() {
        recommendations.push("Process is performing well; maintain current settings".to_string());
    }
    recommendations
}
