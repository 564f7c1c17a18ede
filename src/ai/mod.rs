//! AI Integration Layer
//!
//! Oracle access for the audit stage and the generation invoker: provider
//! transports, timeout and retry handling, per-tier pricing, prompt templates
//! and the run-wide usage ledger.

pub mod pricing;
pub mod prompt;
pub mod provider;
pub mod retry;
pub mod timeout;
pub mod usage;

pub use pricing::Pricing;
pub use prompt::{PromptContext, PromptTemplate, TemplateSource};
pub use provider::{
    AnthropicProvider, ClaudeCodeProvider, ErrorCategory, ErrorClassifier, LlmError, LlmProvider,
    LlmRequest, LlmResponse, ResponseMetadata, ResponseTiming, SharedProvider, TokenUsage,
    create_provider,
};
pub use retry::{RetryPolicy, RetryingProvider};
pub use timeout::{with_timeout, with_timeout_map};
pub use usage::{Tier, TierUsage, UsageLedger};
