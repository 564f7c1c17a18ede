//! Oracle response extraction
//!
//! The response is untrusted free text. Extraction is a line-oriented
//! delimiter scan: a block opens on a line whose trimmed text starts with the
//! opening delimiter and closes on the first line whose trimmed text ends with
//! `*/`. Nested delimiters are not recognized.

use regex::Regex;
use std::sync::LazyLock;

use crate::constants::splice::NOTES_MARKER;

static LINE_COMMENT_NOTES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)//\s*Implementation notes:[^\n]+(?:\n[ \t]*//[^\n]+)*").expect("valid regex")
});

/// Lines `start..=end` of the first block opened by a line satisfying `opens`
fn scan_block<'a>(lines: &[&'a str], opens: impl Fn(&str) -> bool) -> Option<Vec<&'a str>> {
    let start = lines.iter().position(|line| opens(line.trim()))?;
    let end = lines[start..]
        .iter()
        .position(|line| line.trim_end().ends_with("*/"))
        .map(|offset| start + offset)?;
    Some(lines[start..=end].iter().map(|line| line.trim_end()).collect())
}

/// Extract the first documentation comment from a response.
///
/// Falls back to the whole trimmed response when no complete block is found.
pub fn extract_doc_block(response: &str) -> String {
    let lines: Vec<&str> = response.split('\n').collect();
    match scan_block(&lines, |line| line.starts_with("/**")) {
        Some(block) => block.join("\n"),
        None => response.trim().to_string(),
    }
}

fn opens_notes(trimmed: &str) -> bool {
    trimmed
        .strip_prefix("/*")
        .is_some_and(|rest| !rest.starts_with('*') && rest.trim_start().starts_with(NOTES_MARKER))
}

/// Extract the optional implementation notes block.
///
/// The block comment form `/* AI Implementation Notes: ... */` is preferred;
/// a run of `// Implementation notes:` line comments is accepted otherwise.
pub fn extract_notes(response: &str) -> Option<String> {
    let lines: Vec<&str> = response.split('\n').collect();
    if let Some(block) = scan_block(&lines, opens_notes) {
        return Some(block.join("\n"));
    }

    LINE_COMMENT_NOTES.find(response).map(|m| {
        m.as_str()
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    })
}
