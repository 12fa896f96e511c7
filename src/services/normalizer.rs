//! Result Normalizer
//!
//! Converts the raw output of the external analysis engine into the
//! canonical `NormalizedResult`. The engine's serialization layer collapses
//! single-row tabular summaries into one-element arrays, so a field that is
//! conceptually one object may arrive as `{...}` or `[{...}]`. Which shape
//! is expected is a per-field fact, declared here by typing single
//! aggregates as `OneOrMany<T>` and collections as `Vec<_>`.
//!
//! Coercion policy per field kind:
//! - single aggregate: object passes through, a non-empty list reduces to
//!   its first element, anything else becomes the empty default;
//! - collection: lists pass through unchanged, absent or malformed fields
//!   become the empty list.

use std::collections::BTreeMap;

use forceqc_core::OneOrMany;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::models::analysis::{
    CapabilityStats, DataSummary, MultiSourceVariation, NormalizedResult, OverallStats,
    TargetStats,
};
use crate::utils::error::{AppError, AppResult};

/// Raw engine output, typed with the per-field shape expectations.
#[derive(Debug, Default, Deserialize)]
struct RawAnalysisResults {
    #[serde(default, deserialize_with = "lenient")]
    data_summary: OneOrMany<DataSummary>,
    #[serde(default, deserialize_with = "lenient")]
    overall_stats: OneOrMany<OverallStats>,
    #[serde(default, deserialize_with = "lenient")]
    target_analysis: Vec<TargetStats>,
    #[serde(default)]
    trend_stats: Vec<Value>,
    #[serde(default)]
    outlier_summary: Vec<Value>,
    #[serde(default)]
    stability_analysis: Vec<Value>,
    #[serde(default)]
    change_point_analysis: Vec<Value>,
    #[serde(default)]
    autocorr_analysis: Vec<Value>,
    #[serde(default, deserialize_with = "lenient")]
    process_capability: Vec<CapabilityStats>,
    #[serde(default, deserialize_with = "lenient")]
    spatial_analysis: OneOrMany<BTreeMap<String, Value>>,
    #[serde(default, deserialize_with = "lenient")]
    error_distribution_analysis: OneOrMany<BTreeMap<String, Value>>,
    #[serde(default, deserialize_with = "lenient")]
    multi_source_variation_analysis: OneOrMany<MultiSourceVariation>,
}

/// Deserialize a field, substituting the default when the value does not
/// match the expected shape. Field-level leniency: one malformed section
/// must not discard an otherwise valid result file.
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

/// Normalize a parsed engine result document.
///
/// Fails with a decode error only when the document itself is not the
/// expected top-level object; individual sections degrade to their
/// defaults.
pub fn normalize(raw: Value) -> AppResult<NormalizedResult> {
    let raw: RawAnalysisResults = serde_json::from_value(raw)
        .map_err(|e| AppError::decode(format!("analysis result has unexpected shape: {}", e)))?;

    Ok(NormalizedResult {
        data_summary: raw.data_summary.into_single_or_default(),
        overall_stats: raw.overall_stats.into_single_or_default(),
        target_analysis: raw.target_analysis,
        trend_stats: raw.trend_stats,
        outlier_summary: raw.outlier_summary,
        stability_analysis: raw.stability_analysis,
        change_point_analysis: raw.change_point_analysis,
        autocorr_analysis: raw.autocorr_analysis,
        process_capability: raw.process_capability,
        spatial_analysis: raw.spatial_analysis.into_single_or_default(),
        error_distribution_analysis: raw.error_distribution_analysis.into_single_or_default(),
        multi_source_variation_analysis: raw
            .multi_source_variation_analysis
            .into_single_or_default(),
    })
}

/// Normalize an engine result document from its JSON text.
pub fn normalize_str(content: &str) -> AppResult<NormalizedResult> {
    let raw: Value = serde_json::from_str(content)
        .map_err(|e| AppError::decode(format!("analysis result is not valid JSON: {}", e)))?;
    normalize(raw)
}
