//! Run-wide usage ledger
//!
//! One explicit accumulator threaded through the pipeline by `&mut`. Files
//! are processed sequentially, so there is a single writer.

use serde::Serialize;
use std::fmt;

use crate::types::UsageRecord;

/// Model tier an oracle call was billed against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Audit,
    Generation,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Audit => write!(f, "audit"),
            Self::Generation => write!(f, "generation"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct TierUsage {
    pub calls: u32,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub cost_usd: f64,
}

impl TierUsage {
    fn add(&mut self, record: &UsageRecord) {
        self.calls += 1;
        self.input_tokens += record.input_tokens;
        self.output_tokens += record.output_tokens;
        self.cost_usd += record.estimated_cost_usd;
    }

    pub fn total_tokens(&self) -> u64 {
        self.input_tokens + self.output_tokens
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct UsageLedger {
    pub audit: TierUsage,
    pub generation: TierUsage,
}

impl UsageLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, tier: Tier, record: &UsageRecord) {
        match tier {
            Tier::Audit => self.audit.add(record),
            Tier::Generation => self.generation.add(record),
        }
    }

    pub fn total_tokens(&self) -> u64 {
        self.audit.total_tokens() + self.generation.total_tokens()
    }

    pub fn total_cost_usd(&self) -> f64 {
        self.audit.cost_usd + self.generation.cost_usd
    }

    pub fn merge(&mut self, other: &UsageLedger) {
        for (mine, theirs) in [
            (&mut self.audit, &other.audit),
            (&mut self.generation, &other.generation),
        ] {
            mine.calls += theirs.calls;
            mine.input_tokens += theirs.input_tokens;
            mine.output_tokens += theirs.output_tokens;
            mine.cost_usd += theirs.cost_usd;
        }
    }

    /// Format totals for display
    pub fn display(&self) -> String {
        format!(
            "Audit calls: {} ({} tokens, ${:.4})\n\
             Generation calls: {} ({} tokens, ${:.4})\n\
             Total: {} tokens, ${:.4}",
            self.audit.calls,
            self.audit.total_tokens(),
            self.audit.cost_usd,
            self.generation.calls,
            self.generation.total_tokens(),
            self.generation.cost_usd,
            self.total_tokens(),
            self.total_cost_usd()
        )
    }
}
