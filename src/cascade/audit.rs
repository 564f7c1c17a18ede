//! Classification audit of existing documentation
//!
//! Sends the whole file plus the declaration's current documentation and
//! implementation to the cheap tier and reads back a verdict. JSON output is
//! requested. Without JSON, a `NEEDS_UPDATE`/`NEEDS_REWRITE` keyword is
//! accepted anywhere, but `ACCURATE` only as a line of its own. Anything
//! negated or ambiguous is an error, which the cascade treats as a failed audit.

use regex::Regex;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;
use tracing::{debug, instrument};

use crate::ai::{LlmProvider, LlmRequest, Pricing, SharedProvider};
use crate::config::TierConfig;
use crate::types::{DeclarationRecord, DocBlock, Result, UsageRecord, WeaveError};

static NEEDS_KEYWORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bneeds[\s_-]+(rewrite|update)\b").expect("valid regex")
});
static NEGATED_ACCURATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\binaccurate\b|(?:\bnot|n't|\bno\s+longer|\bnever)\s+(?:\w+\s+)?accurate\b")
        .expect("valid regex")
});
static ACCURATE_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?im)^[\s*>`"-]*(?:verdict[\s*]*[:=][\s*`"]*)?accurate\b[\s*`".!]*(?:$|[.!]\s)"#)
        .expect("valid regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Accurate,
    NeedsUpdate,
    NeedsRewrite,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Accurate => "ACCURATE",
            Self::NeedsUpdate => "NEEDS_UPDATE",
            Self::NeedsRewrite => "NEEDS_REWRITE",
        }
    }

    pub fn is_accurate(&self) -> bool {
        matches!(self, Self::Accurate)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Verdict {
    type Err = WeaveError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_uppercase().replace([' ', '-'], "_").as_str() {
            "ACCURATE" => Ok(Self::Accurate),
            "NEEDS_UPDATE" => Ok(Self::NeedsUpdate),
            "NEEDS_REWRITE" => Ok(Self::NeedsRewrite),
            other => Err(WeaveError::LlmApi(format!("Unknown audit verdict: {}", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AuditReport {
    pub verdict: Verdict,
    pub confidence: Option<String>,
    pub issues: Vec<String>,
}

impl AuditReport {
    /// One-line description for decision reasons
    pub fn describe(&self) -> String {
        let mut text = self.verdict.to_string();
        if let Some(confidence) = &self.confidence {
            text.push_str(&format!(" ({} confidence)", confidence));
        }
        if !self.issues.is_empty() {
            text.push_str(": ");
            text.push_str(&self.issues.join("; "));
        }
        text
    }
}

#[derive(Debug, Deserialize)]
struct RawReport {
    verdict: String,
    #[serde(default)]
    confidence: Option<serde_json::Value>,
    #[serde(default)]
    issues: Vec<String>,
}

/// Parse an audit response, JSON first and keywords second
pub fn parse_audit_response(text: &str) -> Result<AuditReport> {
    if let Some(report) = parse_json_report(text) {
        return Ok(report);
    }

    let verdict = keyword_verdict(text).ok_or_else(|| {
        WeaveError::LlmApi("Audit response contained no unambiguous verdict".to_string())
    })?;
    debug!("Audit verdict from keyword: {}", verdict);
    Ok(AuditReport {
        verdict,
        confidence: None,
        issues: Vec::new(),
    })
}

fn keyword_verdict(text: &str) -> Option<Verdict> {
    let mut needs: Option<Verdict> = None;
    for caps in NEEDS_KEYWORD.captures_iter(text) {
        if caps[1].eq_ignore_ascii_case("rewrite") {
            return Some(Verdict::NeedsRewrite);
        }
        needs = Some(Verdict::NeedsUpdate);
    }
    if needs.is_some() {
        return needs;
    }

    if NEGATED_ACCURATE.is_match(text) || !ACCURATE_LINE.is_match(text) {
        return None;
    }
    Some(Verdict::Accurate)
}

fn parse_json_report(text: &str) -> Option<AuditReport> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    let raw: RawReport = serde_json::from_str(&text[start..=end]).ok()?;
    let verdict = raw.verdict.parse().ok()?;
    let confidence = raw.confidence.map(|c| match c {
        serde_json::Value::String(s) => s.to_lowercase(),
        other => other.to_string(),
    });
    Some(AuditReport {
        verdict,
        confidence,
        issues: raw.issues,
    })
}

pub fn build_audit_prompt(decl: &DeclarationRecord, doc: &DocBlock, file_content: &str) -> String {
    format!(
        "You are reviewing existing Javadoc for accuracy against the current code.

Java {item_type} `{name}`
Signature: {signature}

EXISTING JAVADOC:
{doc}

IMPLEMENTATION:
{implementation}

FULL FILE:
{file}

Decide whether the Javadoc still describes what the code does: parameters, \
return value, thrown exceptions and behavior.

Respond with ONLY a JSON object:
{{\"verdict\": \"ACCURATE\" | \"NEEDS_UPDATE\" | \"NEEDS_REWRITE\", \
\"confidence\": \"high\" | \"medium\" | \"low\", \"issues\": [\"...\"]}}",
        item_type = decl.kind.label(),
        name = decl.name,
        signature = decl.signature,
        doc = doc.raw_text,
        implementation = decl.body_text,
        file = file_content,
    )
}

/// Cheap-tier classifier used by stage three of the cascade
pub struct Auditor {
    provider: SharedProvider,
    tier: TierConfig,
    temperature: f32,
}

impl Auditor {
    pub fn new(provider: SharedProvider, tier: TierConfig, temperature: f32) -> Self {
        Self {
            provider,
            tier,
            temperature,
        }
    }

    /// Run the audit. Usage is returned whenever the oracle answered, even if
    /// its answer could not be parsed.
    #[instrument(skip_all, fields(item = %decl.name))]
    pub async fn audit(
        &self,
        decl: &DeclarationRecord,
        doc: &DocBlock,
        file_content: &str,
    ) -> (Result<AuditReport>, Option<UsageRecord>) {
        let request = LlmRequest::new(
            &self.tier.model,
            self.tier.max_tokens,
            build_audit_prompt(decl, doc, file_content),
        )
        .with_temperature(self.temperature);

        match self.provider.generate(&request).await {
            Ok(response) => {
                let usage = Pricing::for_tier(&self.tier).record(&response.usage);
                (parse_audit_response(&response.text), Some(usage))
            }
            Err(e) => (Err(e), None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_json_report() {
        let text = "```json\n{\"verdict\": \"NEEDS_UPDATE\", \"confidence\": \"High\", \"issues\": [\"@param id is stale\"]}\n```";
        let report = parse_audit_response(text).unwrap();
        assert_eq!(report.verdict, Verdict::NeedsUpdate);
        assert_eq!(report.confidence.as_deref(), Some("high"));
        assert_eq!(report.issues, vec!["@param id is stale".to_string()]);
        assert_eq!(
            report.describe(),
            "NEEDS_UPDATE (high confidence): @param id is stale"
        );
    }

    #[test]
    fn test_parse_keyword_fallback() {
        assert_eq!(
            parse_audit_response("Verdict: accurate. Looks fine.")
                .unwrap()
                .verdict,
            Verdict::Accurate
        );
        assert_eq!(
            parse_audit_response("It is not ACCURATE anymore, NEEDS_REWRITE")
                .unwrap()
                .verdict,
            Verdict::NeedsRewrite
        );
    }

    #[test]
    fn test_negated_accurate_is_not_a_pass() {
        for text in [
            "The Javadoc is INACCURATE: it documents a removed parameter.",
            "This documentation is not accurate.",
            "The description isn't accurate anymore.",
            "ACCURATE? Not really, it is no longer accurate.",
            "The docs look mostly accurate but miss the new parameter.",
        ] {
            let result = parse_audit_response(text);
            assert!(
                !matches!(result, Ok(AuditReport { verdict: Verdict::Accurate, .. })),
                "{text:?} parsed as {result:?}"
            );
        }
    }

    #[test]
    fn test_accurate_line_forms() {
        for text in [
            "ACCURATE",
            "accurate.",
            "**Verdict:** ACCURATE",
            "Reviewed the method.\nVerdict: ACCURATE\n",
        ] {
            assert_eq!(parse_audit_response(text).unwrap().verdict, Verdict::Accurate, "{text:?}");
        }
    }

    #[test]
    fn test_needs_keyword_forms() {
        assert_eq!(
            parse_audit_response("Verdict: needs update").unwrap().verdict,
            Verdict::NeedsUpdate
        );
        assert_eq!(
            parse_audit_response("NEEDS_UPDATE for @return, arguably NEEDS-REWRITE")
                .unwrap()
                .verdict,
            Verdict::NeedsRewrite
        );
    }

    #[test]
    fn test_parse_without_verdict_fails() {
        assert!(parse_audit_response("I cannot tell.").is_err());
        assert!(parse_audit_response("").is_err());
    }

    #[test]
    fn test_verdict_from_str_normalizes() {
        assert_eq!("needs update".parse::<Verdict>().unwrap(), Verdict::NeedsUpdate);
        assert_eq!("Needs-Rewrite".parse::<Verdict>().unwrap(), Verdict::NeedsRewrite);
        assert!("maybe".parse::<Verdict>().is_err());
    }
}
