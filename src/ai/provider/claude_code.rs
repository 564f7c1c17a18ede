//! Claude Code CLI Provider
//!
//! Runs `claude -p <prompt> --output-format json` and reads the `result`
//! text and `usage` counters from its JSON envelope.
//!
//! Note: Retry logic is handled by `RetryingProvider`.
//! This provider performs single-shot execution only.

use async_trait::async_trait;
use serde_json::Value;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, info};

use super::{
    ErrorCategory, LlmError, LlmProvider, LlmRequest, LlmResponse, ResponseMetadata,
    ResponseTiming, TokenUsage,
};
use crate::config::LlmConfig;
use crate::types::{Result, WeaveError};

const PROVIDER_NAME: &str = "claude-code";

pub struct ClaudeCodeProvider {
    timeout_secs: u64,
}

impl ClaudeCodeProvider {
    pub fn new(config: &LlmConfig) -> Self {
        Self {
            timeout_secs: config.timeout_secs,
        }
    }

    /// Execute a single Claude Code CLI call
    async fn execute(&self, request: &LlmRequest) -> Result<LlmResponse> {
        let start_time = Instant::now();

        debug!(
            "Executing Claude Code CLI (model={}, temperature={})",
            request.model, request.temperature
        );

        let mut cmd = Command::new("claude");
        cmd.arg("-p")
            .arg(&request.prompt)
            .arg("--output-format")
            .arg("json")
            .arg("--model")
            .arg(&request.model)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        cmd.env("CLAUDE_CODE_TEMPERATURE", request.temperature.to_string());
        cmd.env("CLAUDE_CODE_MAX_OUTPUT_TOKENS", request.max_tokens.to_string());

        let child = cmd.spawn().map_err(|e| {
            WeaveError::Llm(LlmError::with_provider(
                ErrorCategory::Unavailable,
                format!("Failed to spawn Claude Code CLI: {}. Is it installed?", e),
                PROVIDER_NAME,
            ))
        })?;

        let output = timeout(
            Duration::from_secs(self.timeout_secs),
            child.wait_with_output(),
        )
        .await
        .map_err(|_| {
            WeaveError::timeout("Claude Code CLI", Duration::from_secs(self.timeout_secs))
        })?
        .map_err(|e| WeaveError::LlmApi(format!("Claude Code execution failed: {}", e)))?;

        let elapsed = start_time.elapsed();
        let stdout = String::from_utf8_lossy(&output.stdout);

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);

            // Check for API error in stdout
            if let Some(error_msg) = api_error(&stdout) {
                return Err(WeaveError::LlmApi(format!(
                    "Claude Code API error: {}",
                    error_msg
                )));
            }

            let error_msg = if stderr.trim().is_empty() {
                "Process exited with non-zero status"
            } else {
                stderr.as_ref()
            };
            return Err(WeaveError::LlmApi(format!(
                "Claude Code failed: {}",
                error_msg
            )));
        }

        let response: Value = serde_json::from_str(&stdout).map_err(|e| {
            WeaveError::LlmApi(format!("Failed to parse Claude Code output: {}", e))
        })?;

        if let Some(error_msg) = api_error(&stdout) {
            return Err(WeaveError::LlmApi(format!(
                "Claude Code API error: {}",
                error_msg
            )));
        }

        let text = response
            .get("result")
            .and_then(|v| v.as_str())
            .ok_or_else(|| WeaveError::LlmApi("No result in Claude Code response".to_string()))?
            .to_string();

        let api_ms = response.get("duration_api_ms").and_then(|v| v.as_u64());

        Ok(LlmResponse::with_metrics(
            text,
            extract_usage(&response),
            ResponseTiming::with_api_time(elapsed, api_ms),
            ResponseMetadata {
                model: request.model.clone(),
                provider: PROVIDER_NAME.to_string(),
            },
        ))
    }
}

/// Error message from a JSON envelope flagged `is_error`
fn api_error(stdout: &str) -> Option<String> {
    let response = serde_json::from_str::<Value>(stdout).ok()?;
    if !response.get("is_error").and_then(|v| v.as_bool()).unwrap_or(false) {
        return None;
    }
    Some(
        response
            .get("result")
            .and_then(|v| v.as_str())
            .unwrap_or("Unknown API error")
            .to_string(),
    )
}

/// Extract token usage from Claude Code response
fn extract_usage(response: &Value) -> TokenUsage {
    let usage = response.get("usage");
    let count = |key: &str| {
        usage
            .and_then(|u| u.get(key))
            .and_then(|v| v.as_u64())
            .unwrap_or(0)
    };

    TokenUsage::new(count("input_tokens"), count("output_tokens"))
}

#[async_trait]
impl LlmProvider for ClaudeCodeProvider {
    async fn generate(&self, request: &LlmRequest) -> Result<LlmResponse> {
        info!("Generating with Claude Code CLI (model: {})", request.model);
        self.execute(request).await
    }

    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    async fn health_check(&self) -> Result<bool> {
        let output = Command::new("claude")
            .arg("--version")
            .output()
            .await
            .map_err(|e| WeaveError::LlmApi(format!("Claude Code not found: {}", e)))?;

        if output.status.success() {
            let version = String::from_utf8_lossy(&output.stdout);
            info!("Claude Code CLI available: {}", version.trim());
            Ok(true)
        } else {
            Ok(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore = "requires claude CLI installed"]
    async fn test_health_check() {
        let provider = ClaudeCodeProvider::new(&LlmConfig::default());
        let result = provider.health_check().await;
        assert!(result.is_ok());
    }

    #[test]
    fn test_extract_usage() {
        let response = serde_json::json!({
            "result": "/** Doc. */",
            "usage": {
                "input_tokens": 1000,
                "output_tokens": 500,
                "cache_read_input_tokens": 100
            }
        });

        let usage = extract_usage(&response);
        assert_eq!(usage, TokenUsage::new(1000, 500));
    }

    #[test]
    fn test_extract_usage_missing() {
        assert_eq!(extract_usage(&serde_json::json!({})), TokenUsage::default());
    }

    #[test]
    fn test_api_error_detection() {
        assert_eq!(
            api_error(r#"{"is_error": true, "result": "overloaded"}"#).as_deref(),
            Some("overloaded")
        );
        assert!(api_error(r#"{"is_error": false, "result": "ok"}"#).is_none());
        assert!(api_error("not json").is_none());
    }
}
