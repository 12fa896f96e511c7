//! Analysis Engine Adapter
//!
//! Marshals task parameters into the external analysis engine's invocation
//! contract, runs it as a child process, and loads the result file it
//! leaves behind. The engine is untyped and external; this adapter pins a
//! stable contract (fixed CLI shape, fixed result filename) so nothing else
//! in the system depends on its internals.
//!
//! Invocation contract:
//! `<command> <script> --input <csv> --output-dir <dir> --run-id <id>
//!  --target-forces a,b,c --tolerance-abs x,y,z --tolerance-pct p,q,r`
//! with exit code 0 and `analysis_results.json` written into the output
//! directory on success.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use forceqc_core::ValidatedParams;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::models::analysis::NormalizedResult;
use crate::models::settings::EngineConfig;
use crate::services::normalizer;
use crate::utils::error::{AppError, AppResult};
use crate::utils::paths::RESULT_FILE_NAME;

/// Adapter around the external analysis engine process.
#[derive(Debug, Clone)]
pub struct AnalysisEngine {
    config: EngineConfig,
}

impl AnalysisEngine {
    /// Create an adapter with the given engine configuration.
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Build the flat argument list for one invocation.
    fn build_args(
        &self,
        input_path: &Path,
        output_dir: &Path,
        task_id: &str,
        params: &ValidatedParams,
    ) -> Vec<String> {
        vec![
            self.config.script.to_string_lossy().to_string(),
            "--input".to_string(),
            input_path.to_string_lossy().to_string(),
            "--output-dir".to_string(),
            output_dir.to_string_lossy().to_string(),
            "--run-id".to_string(),
            task_id.to_string(),
            "--target-forces".to_string(),
            join_numbers(&params.target_forces),
            "--tolerance-abs".to_string(),
            join_numbers(&params.tolerance_abs),
            "--tolerance-pct".to_string(),
            join_numbers(&params.tolerance_pct),
        ]
    }

    /// Run the engine for one task and return the normalized result.
    ///
    /// Blocks (asynchronously) until the engine exits, the configured
    /// timeout elapses, or `cancel` fires; the child process is killed in
    /// the latter two cases.
    pub async fn run(
        &self,
        input_path: &Path,
        output_dir: &Path,
        task_id: &str,
        params: &ValidatedParams,
        cancel: &CancellationToken,
    ) -> AppResult<NormalizedResult> {
        if !input_path.exists() {
            return Err(AppError::not_found(format!(
                "measurement file not found: {}",
                input_path.display()
            )));
        }
        std::fs::create_dir_all(output_dir)?;

        let args = self.build_args(input_path, output_dir, task_id, params);
        info!(
            task_id = %task_id,
            command = %self.config.command,
            "launching analysis engine: {} {}",
            self.config.command,
            args.join(" ")
        );

        let mut cmd = Command::new(&self.config.command);
        cmd.args(&args);
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        // Kill the child if this future is dropped so a cancelled task
        // cannot leak a running engine process.
        cmd.kill_on_drop(true);

        let child = cmd.spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AppError::config(format!(
                    "analysis engine command not found: {}",
                    self.config.command
                ))
            } else {
                AppError::engine(format!("failed to spawn analysis engine: {}", e))
            }
        })?;

        let timeout = Duration::from_secs(self.config.timeout_secs);
        let output = tokio::select! {
            result = tokio::time::timeout(timeout, child.wait_with_output()) => match result {
                Ok(Ok(output)) => output,
                Ok(Err(e)) => {
                    return Err(AppError::engine(format!(
                        "failed to wait for analysis engine: {}",
                        e
                    )))
                }
                Err(_) => {
                    return Err(AppError::engine(format!(
                        "analysis engine timed out after {}s",
                        self.config.timeout_secs
                    )))
                }
            },
            _ = cancel.cancelled() => {
                return Err(AppError::engine("analysis cancelled".to_string()))
            }
        };

        // Diagnostics only; engine output is never parsed for control flow.
        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stdout.trim().is_empty() {
            debug!(task_id = %task_id, "engine stdout:\n{}", stdout.trim_end());
        }
        if !stderr.trim().is_empty() {
            warn!(task_id = %task_id, "engine stderr:\n{}", stderr.trim_end());
        }

        if !output.status.success() {
            let code = output
                .status
                .code()
                .map(|c| c.to_string())
                .unwrap_or_else(|| "signal".to_string());
            return Err(AppError::engine(format!(
                "analysis engine exited with status {}: {}",
                code,
                stderr.trim()
            )));
        }

        let result_path = output_dir.join(RESULT_FILE_NAME);
        if !result_path.exists() {
            return Err(AppError::missing_output(format!(
                "engine reported success but {} was not written to {}",
                RESULT_FILE_NAME,
                output_dir.display()
            )));
        }

        let content = std::fs::read_to_string(&result_path)?;
        normalizer::normalize_str(&content)
    }
}

/// Join numeric values with commas for the engine CLI.
fn join_numbers(values: &[f64]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(",")
}
