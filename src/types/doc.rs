use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Structured tags of a documentation comment
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocFields {
    pub description: String,
    /// Parameter name to description, last tag wins on duplicates
    pub params: BTreeMap<String, String>,
    pub return_description: Option<String>,
    /// Exception type name to description
    pub throws: BTreeMap<String, String>,
    /// Unrecognized tag lines, verbatim
    pub other_tags: Vec<String>,
}

impl DocFields {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// A documentation comment found in source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocBlock {
    /// Exact source lines including delimiters
    pub raw_text: String,
    pub start_line: usize,
    pub end_line: usize,
    pub fields: DocFields,
}

impl DocBlock {
    pub fn line_count(&self) -> usize {
        self.end_line + 1 - self.start_line
    }
}

/// Tokens and estimated cost of one oracle call
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageRecord {
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub estimated_cost_usd: f64,
}

impl UsageRecord {
    pub fn total_tokens(&self) -> u64 {
        self.input_tokens + self.output_tokens
    }
}

/// Output of one generation call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedDoc {
    /// Extracted comment block, or the trimmed raw response when none was found
    pub documentation_text: String,
    pub implementation_notes: Option<String>,
    pub usage: UsageRecord,
}
