//! Documentation comment parsing
//!
//! Locates the `/** ... */` block directly above a declaration and splits it
//! into description, `@param`, `@return`, `@throws` and other tags.

use regex::Regex;
use std::sync::LazyLock;

use crate::types::{DocBlock, DocFields};

static LEADING_DELIMITER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(/\*\*|\*/|\*)").expect("valid regex"));
static PARAM_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^@param\s+(\S+)\s*(.*)$").expect("valid regex"));
static RETURN_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^@return\b\s*(.*)$").expect("valid regex"));
static THROWS_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^@(?:throws|exception)\s+(\S+)\s*(.*)$").expect("valid regex")
});

#[derive(Clone, Copy, PartialEq, Eq)]
enum Section {
    Description,
    Param,
    Return,
    Throws,
    Other,
}

/// Strip comment delimiters from one line of a documentation block
pub fn clean_doc_line(line: &str) -> &str {
    let without_lead = match LEADING_DELIMITER.find(line) {
        Some(m) => &line[m.end()..],
        None => line,
    };
    let trimmed = without_lead.trim();
    trimmed.strip_suffix("*/").unwrap_or(trimmed).trim()
}

/// Parse the tagged fields of a documentation comment.
///
/// Continuation lines are appended, space-joined, to whichever section is
/// open. Unknown tags are kept verbatim and close structured capture.
pub fn parse_doc_fields(raw_text: &str) -> DocFields {
    let mut fields = DocFields::default();
    let mut description: Vec<&str> = Vec::new();
    let mut section = Section::Description;
    let mut current_key: Option<String> = None;

    for line in raw_text.split('\n') {
        let cleaned = clean_doc_line(line);

        if let Some(caps) = PARAM_TAG.captures(cleaned) {
            let name = caps[1].to_string();
            fields.params.insert(name.clone(), caps[2].trim().to_string());
            current_key = Some(name);
            section = Section::Param;
        } else if let Some(caps) = RETURN_TAG.captures(cleaned) {
            fields.return_description = Some(caps[1].trim().to_string());
            section = Section::Return;
        } else if let Some(caps) = THROWS_TAG.captures(cleaned) {
            let name = caps[1].to_string();
            fields.throws.insert(name.clone(), caps[2].trim().to_string());
            current_key = Some(name);
            section = Section::Throws;
        } else if cleaned.starts_with('@') {
            fields.other_tags.push(cleaned.to_string());
            section = Section::Other;
        } else if !cleaned.is_empty() {
            match section {
                Section::Description => description.push(cleaned),
                Section::Param => append_to(&mut fields.params, &current_key, cleaned),
                Section::Throws => append_to(&mut fields.throws, &current_key, cleaned),
                Section::Return => {
                    let text = fields.return_description.get_or_insert_with(String::new);
                    join_continuation(text, cleaned);
                }
                Section::Other => {}
            }
        }
    }

    fields.description = description.join(" ");
    fields
}

fn append_to(
    map: &mut std::collections::BTreeMap<String, String>,
    key: &Option<String>,
    text: &str,
) {
    if let Some(entry) = key.as_ref().and_then(|k| map.get_mut(k)) {
        join_continuation(entry, text);
    }
}

fn join_continuation(target: &mut String, text: &str) {
    if !target.is_empty() {
        target.push(' ');
    }
    target.push_str(text);
}

/// Find the documentation block directly above `decl_line` (1-indexed).
///
/// Blank lines and `//` comments between the block and the declaration are
/// skipped; any other content breaks adjacency. Plain `/* */` comments are
/// not documentation.
pub fn locate_doc_block(lines: &[&str], decl_line: usize) -> Option<DocBlock> {
    if decl_line < 2 || decl_line > lines.len() + 1 {
        return None;
    }

    let mut idx = decl_line - 2;
    loop {
        let trimmed = lines[idx].trim();
        if !(trimmed.is_empty() || trimmed.starts_with("//")) {
            break;
        }
        if idx == 0 {
            return None;
        }
        idx -= 1;
    }

    let last = lines[idx].trim();
    if !last.ends_with("*/") || !(last.starts_with("/**") || last.starts_with('*')) {
        return None;
    }
    let end = idx;

    loop {
        let trimmed = lines[idx].trim();
        if trimmed.starts_with("/**") {
            break;
        }
        if trimmed.starts_with("/*") || (idx != end && trimmed.contains("*/")) {
            return None;
        }
        if idx == 0 {
            return None;
        }
        idx -= 1;
    }
    let start = idx;

    let raw_text = lines[start..=end].join("\n");
    let fields = parse_doc_fields(&raw_text);
    Some(DocBlock {
        raw_text,
        start_line: start + 1,
        end_line: end + 1,
        fields,
    })
}
