//! Narrative Generation
//!
//! Produces AI-written commentary for a completed run: a prompt is built
//! from the normalized result, sent to a DeepSeek-compatible
//! chat-completions API, and the returned text is persisted alongside the
//! run. Report synthesis consumes the stored text but never depends on
//! this service being reachable.

pub mod client;
pub mod prompt;
pub mod store;

pub use client::NarrativeClient;
pub use store::NarrativeStore;

use chrono::Utc;
use tracing::info;

use crate::models::analysis::NormalizedResult;
use crate::models::narrative::NarrativeRecord;
use crate::utils::error::AppResult;

/// End-to-end narrative generation: prompt, call, extract, persist.
#[derive(Debug, Clone)]
pub struct NarrativeGenerator {
    client: NarrativeClient,
    store: NarrativeStore,
}

impl NarrativeGenerator {
    /// Create a generator from a client and a store.
    pub fn new(client: NarrativeClient, store: NarrativeStore) -> Self {
        Self { client, store }
    }

    /// Access the underlying store (for read-only consumers).
    pub fn store(&self) -> &NarrativeStore {
        &self.store
    }

    /// Generate narrative text for a run and persist it, overwriting any
    /// previous record for the same run.
    pub async fn generate(
        &self,
        task_id: &str,
        result: &NormalizedResult,
        report_type: &str,
    ) -> AppResult<NarrativeRecord> {
        let user_prompt = prompt::build_user_prompt(result, report_type);
        let report = self
            .client
            .complete(prompt::SYSTEM_PROMPT, &user_prompt)
            .await?;

        let record = NarrativeRecord {
            report,
            analysis_summary: store::extract_summary(result),
            generated_at: Utc::now().to_rfc3339(),
            report_type: report_type.to_string(),
        };
        self.store.save(task_id, &record)?;
        info!(task_id = %task_id, report_type = %report_type, "narrative analysis generated");
        Ok(record)
    }
}
