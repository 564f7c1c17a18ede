//! Structural quality checks on existing documentation
//!
//! Free, local checks run before anything that touches version control or
//! the oracle. Every failing check contributes a reason; none short-circuits.

use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

use crate::analyzer::javadoc::clean_doc_line;
use crate::config::QualityConfig;
use crate::types::{DeclarationKind, DeclarationRecord, DocBlock, HeuristicResult};

static INLINE_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{@[^}]*\}").expect("valid regex"));
static STRAY_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s@[A-Za-z]").expect("valid regex"));
static EMPTY_PARAM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^@param\s+\S+$").expect("valid regex"));
static EMPTY_RETURN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^@return$").expect("valid regex"));

pub struct HeuristicChecker {
    config: QualityConfig,
}

impl HeuristicChecker {
    pub fn new(config: QualityConfig) -> Self {
        Self { config }
    }

    pub fn check(&self, decl: &DeclarationRecord, doc: &DocBlock) -> HeuristicResult {
        let lines: Vec<&str> = doc.raw_text.split('\n').map(clean_doc_line).collect();
        let mut reasons = Vec::new();

        reasons.extend(self.check_length(&lines));
        reasons.extend(self.check_placeholders(&doc.raw_text));
        reasons.extend(check_params(decl, doc));
        reasons.extend(self.check_return(decl, doc));
        reasons.extend(self.check_obvious_errors(&lines));

        HeuristicResult::new(reasons)
    }

    fn check_length(&self, lines: &[&str]) -> Option<String> {
        let description_lines = lines
            .iter()
            .take_while(|l| !l.starts_with('@'))
            .filter(|l| !l.is_empty())
            .count();

        (description_lines < self.config.min_description_lines).then(|| {
            format!(
                "Javadoc too short ({} lines of description)",
                description_lines
            )
        })
    }

    fn check_placeholders(&self, raw: &str) -> Option<String> {
        let lower = raw.to_lowercase();
        self.config
            .placeholders
            .iter()
            .find(|p| contains_word(&lower, &p.to_lowercase()))
            .map(|p| format!("Contains placeholder: {}", p.to_uppercase()))
    }

    fn check_return(&self, decl: &DeclarationRecord, doc: &DocBlock) -> Option<String> {
        let return_type = decl.return_type().filter(|t| *t != "void")?;
        let trivial = doc
            .fields
            .return_description
            .as_deref()
            .is_none_or(|d| d.trim().chars().count() < self.config.min_return_description);

        trivial.then(|| format!("Missing or trivial @return tag for {} method", return_type))
    }

    fn check_obvious_errors(&self, lines: &[&str]) -> Option<String> {
        let mut issues = Vec::new();

        let malformed = lines.iter().any(|line| {
            !line.starts_with('@') && STRAY_TAG.is_match(&format!(" {}", INLINE_TAG.replace_all(line, "")))
        });
        if malformed {
            issues.push("Malformed @ tag".to_string());
        }

        if lines.iter().any(|l| EMPTY_PARAM.is_match(l)) {
            issues.push("Empty @param tag (no description)".to_string());
        }
        if lines.iter().any(|l| EMPTY_RETURN.is_match(l)) {
            issues.push("Empty @return tag (no description)".to_string());
        }

        if let Some(len) = lines
            .iter()
            .map(|l| l.chars().count())
            .find(|len| *len > self.config.max_line_length)
        {
            issues.push(format!(
                "Line exceeds {} characters ({} chars)",
                self.config.max_line_length, len
            ));
        }

        (!issues.is_empty()).then(|| issues.join("; "))
    }
}

/// Parameter tag consistency. Type parameter tags (`@param <T>`) are not
/// counted against value parameters.
fn check_params(decl: &DeclarationRecord, doc: &DocBlock) -> Option<String> {
    let documented: BTreeSet<&str> = doc
        .fields
        .params
        .keys()
        .map(String::as_str)
        .filter(|k| !k.starts_with('<'))
        .collect();

    if let DeclarationKind::Type { .. } = decl.kind {
        return (!documented.is_empty()).then(|| {
            format!(
                "Class/Interface should not have @param tags (found {})",
                documented.len()
            )
        });
    }

    let actual: Vec<&str> = decl.parameters.iter().map(|p| p.name.as_str()).collect();
    if documented.len() != actual.len() {
        return Some(format!(
            "Parameter count mismatch: {} params, {} @param tags",
            actual.len(),
            documented.len()
        ));
    }
    if let Some(missing) = actual.iter().find(|name| !documented.contains(*name)) {
        return Some(format!("Parameter '{}' not documented", missing));
    }
    documented
        .iter()
        .find(|name| !actual.contains(name))
        .map(|extra| format!("@param tag '{}' doesn't match any parameter", extra))
}

/// `needle` occurs in `haystack` delimited by non-alphanumeric characters
fn contains_word(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return false;
    }
    haystack.match_indices(needle).any(|(idx, _)| {
        let before = haystack[..idx].chars().next_back();
        let after = haystack[idx + needle.len()..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}
