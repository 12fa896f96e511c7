//! Settings Models
//!
//! Application configuration, loaded from `config.json` under the data
//! directory. Every field has a default, so a missing or partial config
//! file only overrides what it names.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::utils::error::AppResult;
use crate::utils::paths;

/// Environment variable consulted for the narrative API key when the
/// config file carries none.
pub const NARRATIVE_API_KEY_ENV: &str = "DEEPSEEK_API_KEY";

/// External analysis engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Interpreter used to launch the analysis script
    #[serde(default = "default_engine_command")]
    pub command: String,
    /// Path to the analysis script handed to the interpreter
    #[serde(default = "default_engine_script")]
    pub script: PathBuf,
    /// Hard ceiling on one engine invocation, in seconds
    #[serde(default = "default_engine_timeout")]
    pub timeout_secs: u64,
    /// Maximum number of engine processes running at once
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            command: default_engine_command(),
            script: default_engine_script(),
            timeout_secs: default_engine_timeout(),
            max_concurrent: default_max_concurrent(),
        }
    }
}

/// Narrative generation service configuration (DeepSeek-compatible API).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NarrativeConfig {
    /// API key; falls back to the `DEEPSEEK_API_KEY` environment variable
    #[serde(default)]
    pub api_key: Option<String>,
    /// Base URL override for self-hosted or proxied endpoints
    #[serde(default)]
    pub base_url: Option<String>,
    /// Model identifier
    #[serde(default = "default_narrative_model")]
    pub model: String,
    /// Maximum tokens in the generated response
    #[serde(default = "default_narrative_max_tokens")]
    pub max_tokens: u32,
    /// Sampling temperature
    #[serde(default = "default_narrative_temperature")]
    pub temperature: f32,
}

impl Default for NarrativeConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: None,
            model: default_narrative_model(),
            max_tokens: default_narrative_max_tokens(),
            temperature: default_narrative_temperature(),
        }
    }
}

impl NarrativeConfig {
    /// Resolve the API key from config or environment.
    pub fn resolved_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| std::env::var(NARRATIVE_API_KEY_ENV).ok().filter(|k| !k.is_empty()))
    }
}

/// Application configuration stored in config.json
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Data root; `None` resolves to `~/.forceqc`
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
    /// Analysis engine settings
    #[serde(default)]
    pub engine: EngineConfig,
    /// Narrative service settings
    #[serde(default)]
    pub narrative: NarrativeConfig,
    /// Default target forces offered by the CLI, in newtons
    #[serde(default = "default_target_forces")]
    pub default_target_forces: Vec<f64>,
    /// Default absolute tolerance, in newtons
    #[serde(default = "default_tolerance_abs")]
    pub default_tolerance_abs: f64,
    /// Default percentage tolerance
    #[serde(default = "default_tolerance_pct")]
    pub default_tolerance_pct: f64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            engine: EngineConfig::default(),
            narrative: NarrativeConfig::default(),
            default_target_forces: default_target_forces(),
            default_tolerance_abs: default_tolerance_abs(),
            default_tolerance_pct: default_tolerance_pct(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a file, falling back to defaults when the
    /// file does not exist. Fields absent from the file keep their
    /// defaults.
    pub fn load(path: &Path) -> AppResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Load from the default config path (~/.forceqc/config.json).
    pub fn load_default() -> AppResult<Self> {
        Self::load(&paths::config_path()?)
    }

    /// Persist the configuration as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            paths::ensure_dir(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Resolve the data root, applying the default when unset.
    pub fn resolved_data_dir(&self) -> AppResult<PathBuf> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => paths::default_data_dir(),
        }
    }
}

fn default_engine_command() -> String {
    "Rscript".to_string()
}

fn default_engine_script() -> PathBuf {
    PathBuf::from("analysis/force_analysis.R")
}

fn default_engine_timeout() -> u64 {
    300
}

fn default_max_concurrent() -> usize {
    4
}

fn default_narrative_model() -> String {
    "deepseek-chat".to_string()
}

fn default_narrative_max_tokens() -> u32 {
    4096
}

fn default_narrative_temperature() -> f32 {
    0.7
}

fn default_target_forces() -> Vec<f64> {
    vec![5.0, 25.0, 50.0]
}

fn default_tolerance_abs() -> f64 {
    2.0
}

fn default_tolerance_pct() -> f64 {
    5.0
}
