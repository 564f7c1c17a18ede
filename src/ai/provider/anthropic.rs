//! Anthropic Messages API Provider
//!
//! Sends a single user message to `/v1/messages` and returns the
//! concatenated text blocks with token usage.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::{
    ErrorClassifier, LlmProvider, LlmRequest, LlmResponse, ResponseMetadata, ResponseTiming,
    TokenUsage,
};
use crate::config::LlmConfig;
use crate::constants::network;
use crate::types::{Result, WeaveError};

const PROVIDER_NAME: &str = "anthropic";
const API_KEY_ENV: &str = "ANTHROPIC_API_KEY";

/// Anthropic API Provider with secure API key handling
pub struct AnthropicProvider {
    /// API key stored securely - never exposed in logs or debug output
    api_key: SecretString,
    api_base: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for AnthropicProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicProvider")
            .field("api_key", &"[REDACTED]")
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl AnthropicProvider {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var(API_KEY_ENV).ok())
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                WeaveError::Config(format!(
                    "Anthropic API key not found. Set {} env var or llm.api_key in config",
                    API_KEY_ENV
                ))
            })?;

        let api_base = config
            .api_base
            .clone()
            .unwrap_or_else(|| network::ANTHROPIC_API_BASE.to_string())
            .trim_end_matches('/')
            .to_string();

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| WeaveError::LlmApi(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            api_key: SecretString::from(api_key),
            api_base,
            client,
        })
    }

    fn messages_url(&self) -> String {
        format!("{}/v1/messages", self.api_base)
    }
}

fn build_body(request: &LlmRequest) -> MessagesRequest<'_> {
    MessagesRequest {
        model: &request.model,
        max_tokens: request.max_tokens,
        temperature: request.temperature,
        messages: vec![Message {
            role: "user",
            content: &request.prompt,
        }],
    }
}

fn parse_body(body: MessagesResponse) -> Result<(String, TokenUsage)> {
    let text = body
        .content
        .iter()
        .filter(|block| block.block_type == "text")
        .filter_map(|block| block.text.as_deref())
        .collect::<Vec<_>>()
        .join("");

    if text.is_empty() {
        return Err(WeaveError::LlmApi(
            "No text content in Anthropic response".to_string(),
        ));
    }

    let usage = body
        .usage
        .map(|u| TokenUsage::new(u.input_tokens, u.output_tokens))
        .unwrap_or_default();
    Ok((text, usage))
}

fn retry_after(headers: &reqwest::header::HeaderMap) -> Option<Duration> {
    headers
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(|secs| Duration::from_secs(secs.min(300)))
}

#[async_trait]
impl LlmProvider for AnthropicProvider {
    async fn generate(&self, request: &LlmRequest) -> Result<LlmResponse> {
        info!(
            "Generating with Anthropic (model: {}, max_tokens: {})",
            request.model, request.max_tokens
        );

        let start_time = Instant::now();
        let response = self
            .client
            .post(self.messages_url())
            .header("x-api-key", self.api_key.expose_secret())
            .header("anthropic-version", network::ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&build_body(request))
            .send()
            .await
            .map_err(|e| {
                WeaveError::Llm(ErrorClassifier::classify(
                    &format!("Anthropic request failed: {}", e),
                    PROVIDER_NAME,
                ))
            })?;

        let status = response.status();
        if !status.is_success() {
            let wait = retry_after(response.headers());
            let body = response.text().await.unwrap_or_default();
            let mut err = ErrorClassifier::classify_http_status(
                status.as_u16(),
                &format!("Anthropic API error ({}): {}", status, body),
                PROVIDER_NAME,
            );
            if let Some(wait) = wait {
                err = err.retry_after(wait);
            }
            return Err(WeaveError::Llm(err));
        }

        let body: MessagesResponse = response.json().await.map_err(|e| {
            WeaveError::LlmApi(format!("Failed to parse Anthropic response: {}", e))
        })?;
        let (text, usage) = parse_body(body)?;
        debug!(
            input_tokens = usage.input_tokens,
            output_tokens = usage.output_tokens,
            "Anthropic response received"
        );

        Ok(LlmResponse::with_metrics(
            text,
            usage,
            ResponseTiming::from_duration(start_time.elapsed()),
            ResponseMetadata {
                model: request.model.clone(),
                provider: PROVIDER_NAME.to_string(),
            },
        ))
    }

    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    async fn health_check(&self) -> Result<bool> {
        let response = self
            .client
            .get(format!("{}/v1/models", self.api_base))
            .header("x-api-key", self.api_key.expose_secret())
            .header("anthropic-version", network::ANTHROPIC_VERSION)
            .send()
            .await;

        match response {
            Ok(resp) if resp.status().is_success() => {
                info!("Anthropic API is available");
                Ok(true)
            }
            Ok(resp) => {
                warn!("Anthropic API check failed: {}", resp.status());
                Ok(false)
            }
            Err(e) => {
                warn!("Anthropic API check failed: {}", e);
                Ok(false)
            }
        }
    }
}

// Request/Response types

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
    usage: Option<UsageInfo>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UsageInfo {
    input_tokens: u64,
    output_tokens: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_key() -> LlmConfig {
        LlmConfig {
            api_key: Some("sk-test-secret".to_string()),
            api_base: Some("http://localhost:9/".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_request_body_shape() {
        let request = LlmRequest::new("claude-test", 512, "Document this");
        let body = serde_json::to_value(build_body(&request)).unwrap();
        assert_eq!(body["model"], "claude-test");
        assert_eq!(body["max_tokens"], 512);
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][0]["content"], "Document this");
    }

    #[test]
    fn test_parse_response_joins_text_blocks() {
        let body: MessagesResponse = serde_json::from_value(serde_json::json!({
            "content": [
                {"type": "text", "text": "/**\n"},
                {"type": "tool_use", "id": "x"},
                {"type": "text", "text": " * Doc.\n */"}
            ],
            "usage": {"input_tokens": 120, "output_tokens": 30}
        }))
        .unwrap();

        let (text, usage) = parse_body(body).unwrap();
        assert_eq!(text, "/**\n * Doc.\n */");
        assert_eq!(usage, TokenUsage::new(120, 30));
    }

    #[test]
    fn test_parse_response_without_text_fails() {
        let body: MessagesResponse =
            serde_json::from_value(serde_json::json!({"content": []})).unwrap();
        assert!(parse_body(body).is_err());
    }

    #[test]
    fn test_debug_redacts_key() {
        let provider = AnthropicProvider::new(&config_with_key()).unwrap();
        let debug = format!("{:?}", provider);
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("sk-test-secret"));
        assert_eq!(provider.messages_url(), "http://localhost:9/v1/messages");
    }
}
