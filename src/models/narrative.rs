//! Narrative Models
//!
//! The persisted record of an AI-generated narrative analysis for one run.
//! At most one record exists per run; regeneration overwrites it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Persisted narrative analysis for one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NarrativeRecord {
    /// Generated narrative text (Markdown)
    pub report: String,
    /// Key metrics extracted from the analysis the narrative was built on
    #[serde(default)]
    pub analysis_summary: BTreeMap<String, Value>,
    /// Generation timestamp (RFC 3339)
    pub generated_at: String,
    /// Free-form report-type tag, e.g. "comprehensive"
    pub report_type: String,
}
