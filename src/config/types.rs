//! Configuration Types
//!
//! All configuration structures with defaults taken from `constants`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::constants::{eligibility, models, network, quality, retry, vcs};
use crate::types::{Result, WeaveError};

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Oracle transport and model tiers
    pub llm: LlmConfig,

    /// Candidate selection policy
    pub eligibility: EligibilityConfig,

    /// Structural checks on existing documentation
    pub quality: QualityConfig,

    /// Regeneration cascade options
    pub cascade: CascadeConfig,

    /// Prompt and output options
    pub generation: GenerationConfig,

    /// Version-control collaborator
    pub vcs: VcsConfig,
}

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.llm.temperature) {
            return Err(WeaveError::Config(format!(
                "llm.temperature must be between 0.0 and 1.0, got {}",
                self.llm.temperature
            )));
        }

        if self.llm.timeout_secs == 0 {
            return Err(WeaveError::Config(
                "llm.timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.vcs.timeout_secs == 0 {
            return Err(WeaveError::Config(
                "vcs.timeout_secs must be greater than 0".to_string(),
            ));
        }

        for (name, tier) in [
            ("llm.generation", &self.llm.generation),
            ("llm.audit", &self.llm.audit),
        ] {
            if tier.model.trim().is_empty() {
                return Err(WeaveError::Config(format!("{name}.model must not be empty")));
            }
            if tier.max_tokens == 0 {
                return Err(WeaveError::Config(format!(
                    "{name}.max_tokens must be greater than 0"
                )));
            }
            if tier.input_cost_per_token < 0.0 || tier.output_cost_per_token < 0.0 {
                return Err(WeaveError::Config(format!(
                    "{name} token rates must not be negative"
                )));
            }
        }

        for (name, ratio) in [
            ("eligibility.null_assignment_ratio", self.eligibility.null_assignment_ratio),
            ("eligibility.logging_ratio", self.eligibility.logging_ratio),
        ] {
            if !(0.0..=1.0).contains(&ratio) {
                return Err(WeaveError::Config(format!(
                    "{name} must be between 0.0 and 1.0, got {ratio}"
                )));
            }
        }

        if self.eligibility.min_method_lines == 0 {
            return Err(WeaveError::Config(
                "eligibility.min_method_lines must be greater than 0".to_string(),
            ));
        }

        if self.quality.max_line_length == 0 {
            return Err(WeaveError::Config(
                "quality.max_line_length must be greater than 0".to_string(),
            ));
        }

        if let Some(base) = &self.llm.api_base {
            url::Url::parse(base)
                .map_err(|e| WeaveError::Config(format!("llm.api_base is not a URL: {e}")))?;
        }

        Ok(())
    }
}

// =============================================================================
// LLM Configuration
// =============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProviderKind {
    /// Anthropic Messages HTTP API
    #[default]
    Anthropic,
    /// Local `claude` CLI
    ClaudeCode,
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Anthropic => write!(f, "anthropic"),
            Self::ClaudeCode => write!(f, "claude-code"),
        }
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "anthropic" => Ok(Self::Anthropic),
            "claude-code" => Ok(Self::ClaudeCode),
            _ => Err(format!(
                "Unknown provider: {}. Valid values: anthropic, claude-code",
                s
            )),
        }
    }
}

/// One model tier with its pricing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierConfig {
    pub model: String,
    pub max_tokens: u32,
    /// USD per input token
    pub input_cost_per_token: f64,
    /// USD per output token
    pub output_cost_per_token: f64,
}

impl TierConfig {
    pub fn generation() -> Self {
        Self {
            model: models::GENERATION_MODEL.to_string(),
            max_tokens: models::GENERATION_MAX_TOKENS,
            input_cost_per_token: models::GENERATION_INPUT_RATE,
            output_cost_per_token: models::GENERATION_OUTPUT_RATE,
        }
    }

    pub fn audit() -> Self {
        Self {
            model: models::AUDIT_MODEL.to_string(),
            max_tokens: models::AUDIT_MAX_TOKENS,
            input_cost_per_token: models::AUDIT_INPUT_RATE,
            output_cost_per_token: models::AUDIT_OUTPUT_RATE,
        }
    }
}

/// Oracle settings
///
/// The API key is never serialized and is redacted in debug output.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub provider: ProviderKind,
    /// Override for the HTTP API base URL
    pub api_base: Option<String>,
    /// Falls back to `ANTHROPIC_API_KEY`
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub timeout_secs: u64,
    /// Retries after the first attempt for retryable failures
    pub max_retries: u32,
    pub temperature: f32,
    /// Expensive tier
    pub generation: TierConfig,
    /// Cheap tier
    pub audit: TierConfig,
}

impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
            .field("provider", &self.provider)
            .field("api_base", &self.api_base)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("timeout_secs", &self.timeout_secs)
            .field("max_retries", &self.max_retries)
            .field("temperature", &self.temperature)
            .field("generation", &self.generation)
            .field("audit", &self.audit)
            .finish()
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::default(),
            api_base: None,
            api_key: None,
            timeout_secs: network::DEFAULT_TIMEOUT_SECS,
            max_retries: retry::DEFAULT_MAX_RETRIES,
            temperature: 0.0,
            generation: TierConfig::generation(),
            audit: TierConfig::audit(),
        }
    }
}

// =============================================================================
// Policy Configuration
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EligibilityConfig {
    pub min_file_lines: usize,
    pub min_method_lines: usize,
    pub null_assignment_ratio: f64,
    pub logging_ratio: f64,
    /// Treat test setup/teardown methods as trivial
    pub skip_lifecycle_methods: bool,
}

impl Default for EligibilityConfig {
    fn default() -> Self {
        Self {
            min_file_lines: eligibility::MIN_FILE_LINES,
            min_method_lines: eligibility::MIN_METHOD_LINES,
            null_assignment_ratio: eligibility::NULL_ASSIGNMENT_RATIO,
            logging_ratio: eligibility::LOGGING_RATIO,
            skip_lifecycle_methods: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityConfig {
    pub min_description_lines: usize,
    pub max_line_length: usize,
    pub min_return_description: usize,
    pub placeholders: Vec<String>,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            min_description_lines: quality::MIN_DESCRIPTION_LINES,
            max_line_length: quality::MAX_LINE_LENGTH,
            min_return_description: quality::MIN_RETURN_DESCRIPTION,
            placeholders: quality::PLACEHOLDERS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CascadeConfig {
    /// Older revision of the scoped diff
    pub diff_base: String,
    /// Newer revision of the scoped diff
    pub diff_head: String,
    /// Meaningful changed lines tolerated before a range counts as changed
    pub max_trivial_changes: usize,
    /// Send structurally sound docs to the audit even without a code change
    pub force_audit: bool,
}

impl Default for CascadeConfig {
    fn default() -> Self {
        Self {
            diff_base: vcs::DIFF_BASE.to_string(),
            diff_head: vcs::DIFF_HEAD.to_string(),
            max_trivial_changes: 0,
            force_audit: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Directory holding BASE-PROMPT.md / CUSTOMER-PROMPT.md
    pub prompt_dir: Option<PathBuf>,
    /// Ask the oracle for an implementation notes block
    pub implementation_notes: bool,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            prompt_dir: None,
            implementation_notes: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VcsConfig {
    /// Base branch for changed-file discovery (`GITHUB_BASE_REF` wins)
    pub base_ref: String,
    pub remote: String,
    pub timeout_secs: u64,
}

impl Default for VcsConfig {
    fn default() -> Self {
        Self {
            base_ref: vcs::BASE_REF.to_string(),
            remote: vcs::REMOTE.to_string(),
            timeout_secs: network::VCS_TIMEOUT_SECS,
        }
    }
}
