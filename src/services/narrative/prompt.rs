//! Narrative Prompts
//!
//! Prompt construction for the narrative service. The user prompt embeds a
//! compact digest of the normalized result rather than the full payload;
//! pass-through sections (trend, autocorrelation, change points) are large
//! and the narrative only needs the headline numbers.

use serde_json::json;

use crate::models::analysis::NormalizedResult;

/// System prompt shared by every report type.
pub const SYSTEM_PROMPT: &str = "You are a senior quality engineer specializing in \
statistical process control for robotic force application systems. You analyze \
force measurement results against target forces and tolerances, and write clear, \
actionable reports in Markdown. Ground every statement in the numbers provided; \
never invent data.";

/// Build the user prompt for one run.
pub fn build_user_prompt(result: &NormalizedResult, report_type: &str) -> String {
    let instructions = match report_type {
        "summary" => {
            "Write a short executive summary (at most 300 words) of the analysis \
             below: overall verdict, main risk, one recommendation."
        }
        "quality_focus" => {
            "Write a quality-focused review of the analysis below: tolerance \
             conformance, process capability interpretation (Cp/Cpk), and concrete \
             corrective actions ranked by impact."
        }
        // "comprehensive" and anything unrecognized get the full treatment.
        _ => {
            "Write a comprehensive analysis report of the results below. Cover: \
             data quality, per-target performance, process capability, notable \
             variation sources, and a prioritized list of recommendations. Use \
             Markdown headings for each section."
        }
    };

    format!(
        "{}\n\nAnalysis results (JSON):\n```json\n{}\n```",
        instructions,
        serde_json::to_string_pretty(&digest(result)).unwrap_or_else(|_| "{}".to_string())
    )
}

/// Compact digest of the sections the narrative should reason about.
fn digest(result: &NormalizedResult) -> serde_json::Value {
    json!({
        "data_summary": result.data_summary,
        "overall_stats": result.overall_stats,
        "target_analysis": result.target_analysis,
        "process_capability": result.process_capability,
        "position_performance": result.multi_source_variation_analysis.performance_by_position,
        "weighted_success_rate": result.weighted_success_rate(),
    })
}
