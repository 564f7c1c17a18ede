//! Timeout and bounded retry around a single provider
//!
//! Each attempt is wrapped in `with_timeout`. Failures whose category is
//! retryable are attempted again after exponential backoff with random
//! jitter; rate limits wait for the provider's `retry_after` hint instead.

use async_trait::async_trait;
use rand::Rng;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

use super::provider::{LlmProvider, LlmRequest, LlmResponse, SharedProvider};
use super::timeout::with_timeout;
use crate::config::LlmConfig;
use crate::constants::retry as retry_constants;
use crate::types::{ErrorCategory, Result, WeaveError};

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Attempts after the first one
    pub max_retries: u32,
    /// Per-attempt timeout
    pub timeout: Duration,
    /// Base delay for exponential backoff
    pub base_delay: Duration,
    /// Maximum delay between retries
    pub max_delay: Duration,
    pub backoff_factor: f32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: retry_constants::DEFAULT_MAX_RETRIES,
            timeout: Duration::from_secs(crate::constants::network::DEFAULT_TIMEOUT_SECS),
            base_delay: Duration::from_millis(retry_constants::BASE_DELAY_MS),
            max_delay: Duration::from_secs(retry_constants::MAX_DELAY_SECS),
            backoff_factor: retry_constants::BACKOFF_FACTOR,
        }
    }
}

impl RetryPolicy {
    pub fn from_config(config: &LlmConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            timeout: Duration::from_secs(config.timeout_secs),
            ..Default::default()
        }
    }
}

/// Provider decorator applying a `RetryPolicy`
pub struct RetryingProvider {
    inner: SharedProvider,
    policy: RetryPolicy,
}

impl RetryingProvider {
    pub fn new(inner: SharedProvider, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    fn delay_for(&self, err: &WeaveError, category: ErrorCategory, current: Duration) -> Duration {
        match (category, err) {
            (ErrorCategory::RateLimit, WeaveError::Llm(e)) => {
                e.recommended_delay().min(self.policy.max_delay)
            }
            (ErrorCategory::RateLimit, _) => category.recommended_delay().min(self.policy.max_delay),
            _ => current + random_jitter(current),
        }
    }
}

#[async_trait]
impl LlmProvider for RetryingProvider {
    async fn generate(&self, request: &LlmRequest) -> Result<LlmResponse> {
        let provider = self.inner.name().to_string();
        let mut current_delay = self.policy.base_delay;
        let mut attempt = 0;

        loop {
            let result = with_timeout(
                self.policy.timeout,
                self.inner.generate(request),
                "LLM request",
            )
            .await;

            let err = match result {
                Ok(response) => return Ok(response),
                Err(err) => err,
            };

            let category = err.category(&provider);
            if !category.is_retryable() || attempt >= self.policy.max_retries {
                warn!(
                    provider = %provider,
                    attempt = attempt + 1,
                    category = %category,
                    error = %err,
                    "LLM request failed"
                );
                return Err(err);
            }

            let delay = self.delay_for(&err, category, current_delay);
            debug!(
                provider = %provider,
                attempt = attempt + 1,
                category = %category,
                delay_ms = delay.as_millis() as u64,
                "Retrying after backoff"
            );
            sleep(delay).await;

            current_delay = calculate_backoff(
                current_delay,
                self.policy.backoff_factor,
                self.policy.max_delay,
            );
            attempt += 1;
        }
    }

    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn health_check(&self) -> Result<bool> {
        self.inner.health_check().await
    }
}

/// Generate random jitter using thread-local RNG
fn random_jitter(base_delay: Duration) -> Duration {
    let max_jitter_ms = (base_delay.as_millis() as u64) / 4;
    if max_jitter_ms == 0 {
        return Duration::ZERO;
    }
    Duration::from_millis(rand::rng().random_range(0..max_jitter_ms))
}

/// Calculate exponential backoff with cap
fn calculate_backoff(current: Duration, factor: f32, max: Duration) -> Duration {
    let next = Duration::from_secs_f32(current.as_secs_f32() * factor);
    std::cmp::min(next, max)
}
