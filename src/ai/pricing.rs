//! Per-tier token pricing
//!
//! Cost is linear in token counts: `input * input_rate + output * output_rate`.
//! Rates come from configuration and are never derived.

use super::provider::TokenUsage;
use crate::config::TierConfig;
use crate::types::UsageRecord;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pricing {
    /// USD per input token
    pub input_rate: f64,
    /// USD per output token
    pub output_rate: f64,
}

impl Pricing {
    pub fn new(input_rate: f64, output_rate: f64) -> Self {
        Self {
            input_rate,
            output_rate,
        }
    }

    pub fn for_tier(tier: &TierConfig) -> Self {
        Self::new(tier.input_cost_per_token, tier.output_cost_per_token)
    }

    pub fn cost(&self, usage: &TokenUsage) -> f64 {
        usage.input_tokens as f64 * self.input_rate + usage.output_tokens as f64 * self.output_rate
    }

    /// Usage record with the estimated cost filled in
    pub fn record(&self, usage: &TokenUsage) -> UsageRecord {
        UsageRecord {
            input_tokens: usage.input_tokens,
            output_tokens: usage.output_tokens,
            estimated_cost_usd: self.cost(usage),
        }
    }
}
