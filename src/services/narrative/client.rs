//! Narrative API Client
//!
//! Client for a DeepSeek-compatible chat-completions endpoint. The service
//! is treated as a black box: one request, one text response, no streaming
//! and no tool calls.

use serde::Deserialize;

use crate::models::settings::NarrativeConfig;
use crate::utils::error::{AppError, AppResult};

/// Default DeepSeek API endpoint
const DEEPSEEK_API_URL: &str = "https://api.deepseek.com/v1/chat/completions";

/// Chat-completions client for narrative generation.
#[derive(Debug, Clone)]
pub struct NarrativeClient {
    config: NarrativeConfig,
    client: reqwest::Client,
}

/// Response payload (OpenAI-compatible subset).
#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: Option<ChatMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    #[serde(default)]
    prompt_tokens: u64,
    #[serde(default)]
    completion_tokens: u64,
}

impl NarrativeClient {
    /// Create a client with the given configuration.
    pub fn new(config: NarrativeConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    /// Get the API endpoint
    fn endpoint(&self) -> &str {
        self.config.base_url.as_deref().unwrap_or(DEEPSEEK_API_URL)
    }

    /// Build the request body for the API
    fn build_request_body(&self, system: &str, user: &str) -> serde_json::Value {
        serde_json::json!({
            "model": self.config.model,
            "max_tokens": self.config.max_tokens,
            "temperature": self.config.temperature,
            "stream": false,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": user }
            ]
        })
    }

    /// Send one completion request and return the generated text.
    pub async fn complete(&self, system: &str, user: &str) -> AppResult<String> {
        let api_key = self.config.resolved_api_key().ok_or_else(|| {
            AppError::config(
                "narrative API key not configured; set narrative.api_key or DEEPSEEK_API_KEY",
            )
        })?;

        let body = self.build_request_body(system, user);
        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(AppError::narrative(format!(
                "API returned {}: {}",
                status,
                detail.trim()
            )));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| AppError::narrative(format!("unparseable API response: {}", e)))?;

        if let Some(usage) = &parsed.usage {
            tracing::debug!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "narrative generation usage"
            );
        }

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());

        content.ok_or_else(|| AppError::narrative("API returned an empty response".to_string()))
    }
}
