//! Generation Prompt Templates
//!
//! Template resolution, first hit wins:
//! 1. `BASE-PROMPT.md` and `CUSTOMER-PROMPT.md` in the prompt directory
//!    (fenced blocks of each, customer text after base)
//! 2. Legacy `CLAUDE-PROMPT.md`
//! 3. Built-in template
//!
//! Placeholders are `{name}` tokens substituted in a single pass, so braces
//! in Java code and in substituted values are left alone.

use regex::{Captures, Regex};
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use crate::constants::splice::NOTES_MARKER;

pub const BASE_PROMPT_FILE: &str = "BASE-PROMPT.md";
pub const CUSTOMER_PROMPT_FILE: &str = "CUSTOMER-PROMPT.md";
pub const LEGACY_PROMPT_FILE: &str = "CLAUDE-PROMPT.md";

static FENCED_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```[^\n]*\n(.*?)\n```").expect("valid regex"));
static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([a-z_]+)\}").expect("valid regex"));

const BUILTIN_TEMPLATE: &str = "You are a Javadoc generator. Generate ONLY a Javadoc comment block for this Java {item_type}:

Name: {item_name}
Signature: {item_signature}
Modifiers: {modifiers}
Parameters: {parameters}
Return type: {return_type}

IMPLEMENTATION CODE:
{implementation_code}

{existing_content}

{potential_exceptions}

SURROUNDING FILE:
{java_content}

CORE RULES:
1. Your response must be EXACTLY a Javadoc comment block
2. Start with /** on the first line
3. End with */ on the last line
4. No explanatory text before or after
5. No \"Here is...\" or \"I notice...\" or any conversational text
6. Include @param tags for all parameters (if any)
7. Include @return tag for non-void methods
8. Include @throws tags for all exceptions that can be thrown
9. Write clear, concise descriptions based on what the code ACTUALLY does
10. Use proper grammar and punctuation
{implementation_notes_instructions}
GENERATE ONLY THE JAVADOC COMMENT BLOCK NOW:
";

/// Where a template came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSource {
    Custom,
    Legacy,
    Builtin,
}

/// Values substituted into a template
#[derive(Debug, Clone, Default)]
pub struct PromptContext {
    pub item_type: String,
    pub item_name: String,
    pub item_signature: String,
    pub modifiers: String,
    pub parameters: String,
    pub return_type: String,
    pub implementation_code: String,
    pub existing_content: String,
    pub java_content: String,
    pub potential_exceptions: String,
    pub implementation_notes_instructions: String,
}

impl PromptContext {
    fn lookup(&self, key: &str) -> Option<&str> {
        let value = match key {
            "item_type" => &self.item_type,
            "item_name" => &self.item_name,
            "item_signature" => &self.item_signature,
            "modifiers" => &self.modifiers,
            "parameters" => &self.parameters,
            "return_type" => &self.return_type,
            "implementation_code" => &self.implementation_code,
            "existing_content" => &self.existing_content,
            "java_content" => &self.java_content,
            "potential_exceptions" => &self.potential_exceptions,
            "implementation_notes_instructions" => &self.implementation_notes_instructions,
            _ => return None,
        };
        Some(value)
    }
}

/// Framing for documentation the oracle should keep and improve
pub fn existing_content_section(raw_doc: Option<&str>) -> String {
    match raw_doc {
        Some(doc) => format!("EXISTING JAVADOC TO PRESERVE/IMPROVE:\n{}", doc),
        None => String::new(),
    }
}

pub fn potential_exceptions_section(hints: &[String]) -> String {
    if hints.is_empty() {
        return String::new();
    }
    let mut section = String::from("POTENTIAL EXCEPTIONS TO CONSIDER:\n");
    for hint in hints {
        section.push_str("- ");
        section.push_str(hint);
        section.push('\n');
    }
    section.trim_end().to_string()
}

pub fn implementation_notes_instructions(enabled: bool) -> String {
    if !enabled {
        return String::new();
    }
    format!(
        "11. For methods and constructors only, you MAY follow the Javadoc block with one block comment \
starting with `/* {}` that explains non-obvious implementation details. Omit it when there is nothing worth noting.\n",
        NOTES_MARKER
    )
}

#[derive(Debug, Clone)]
pub struct PromptTemplate {
    text: String,
    source: TemplateSource,
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::builtin()
    }
}

impl PromptTemplate {
    pub fn builtin() -> Self {
        Self {
            text: BUILTIN_TEMPLATE.to_string(),
            source: TemplateSource::Builtin,
        }
    }

    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source: TemplateSource::Custom,
        }
    }

    /// Resolve a template from `dir`, falling back to the built-in one
    pub fn load(dir: Option<&Path>) -> Self {
        let Some(dir) = dir else {
            return Self::builtin();
        };

        let base = read_prompt_file(&dir.join(BASE_PROMPT_FILE));
        let customer = read_prompt_file(&dir.join(CUSTOMER_PROMPT_FILE));
        let merged = [base, customer]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join("\n\n");
        if !merged.is_empty() {
            tracing::info!("Using prompt template from {}", dir.display());
            return Self::from_text(merged);
        }

        if let Some(legacy) = read_prompt_file(&dir.join(LEGACY_PROMPT_FILE)) {
            tracing::info!("Using legacy prompt template {}", LEGACY_PROMPT_FILE);
            return Self {
                text: legacy,
                source: TemplateSource::Legacy,
            };
        }

        tracing::debug!("No prompt files in {}, using built-in template", dir.display());
        Self::builtin()
    }

    pub fn source(&self) -> &TemplateSource {
        &self.source
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Substitute known placeholders; unknown `{...}` tokens stay verbatim
    pub fn render(&self, ctx: &PromptContext) -> String {
        PLACEHOLDER
            .replace_all(&self.text, |caps: &Captures| {
                ctx.lookup(&caps[1])
                    .map(str::to_string)
                    .unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned()
    }
}

/// Fenced code blocks of a markdown document, joined by blank lines
pub fn extract_fenced_blocks(markdown: &str) -> String {
    let normalized = markdown.replace("\r\n", "\n");
    FENCED_BLOCK
        .captures_iter(&normalized)
        .map(|caps| caps[1].to_string())
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn read_prompt_file(path: &Path) -> Option<String> {
    if !path.exists() {
        return None;
    }
    match fs::read_to_string(path) {
        Ok(content) => Some(extract_fenced_blocks(&content)).filter(|p| !p.is_empty()),
        Err(e) => {
            tracing::warn!("Could not read prompt file {}: {}", path.display(), e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_render_single_pass() {
        let template = PromptTemplate::from_text("Doc {item_type} {item_name}:\n{implementation_code}\n{unknown}");
        let ctx = PromptContext {
            item_type: "method".to_string(),
            item_name: "run".to_string(),
            implementation_code: "void run() { log(\"{item_name}\"); }".to_string(),
            ..Default::default()
        };

        let rendered = template.render(&ctx);
        assert_eq!(
            rendered,
            "Doc method run:\nvoid run() { log(\"{item_name}\"); }\n{unknown}"
        );
    }

    #[test]
    fn test_builtin_contains_rules() {
        let template = PromptTemplate::builtin();
        let rendered = template.render(&PromptContext {
            item_type: "class".to_string(),
            item_name: "Order".to_string(),
            ..Default::default()
        });
        assert!(rendered.starts_with("You are a Javadoc generator"));
        assert!(rendered.contains("Name: Order"));
        assert!(rendered.contains("GENERATE ONLY THE JAVADOC COMMENT BLOCK NOW:"));
        assert!(!rendered.contains("{item_"));
    }

    #[test]
    fn test_extract_fenced_blocks() {
        let md = "# Base\n\n```\nfirst {item_name}\n```\ntext\n```text\nsecond\n```\n";
        assert_eq!(extract_fenced_blocks(md), "first {item_name}\n\nsecond");
        assert_eq!(extract_fenced_blocks("no fences"), "");
    }

    #[test]
    fn test_load_merges_base_and_customer() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(BASE_PROMPT_FILE), "```\nbase\n```").unwrap();
        fs::write(dir.path().join(CUSTOMER_PROMPT_FILE), "```\ncustomer\n```").unwrap();
        fs::write(dir.path().join(LEGACY_PROMPT_FILE), "```\nlegacy\n```").unwrap();

        let template = PromptTemplate::load(Some(dir.path()));
        assert_eq!(template.text(), "base\n\ncustomer");
        assert_eq!(template.source(), &TemplateSource::Custom);
    }

    #[test]
    fn test_load_falls_back_to_legacy_then_builtin() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(BASE_PROMPT_FILE), "no fenced content").unwrap();
        fs::write(dir.path().join(LEGACY_PROMPT_FILE), "```\nlegacy\n```").unwrap();
        let template = PromptTemplate::load(Some(dir.path()));
        assert_eq!(template.source(), &TemplateSource::Legacy);
        assert_eq!(template.text(), "legacy");

        let empty = TempDir::new().unwrap();
        assert_eq!(
            PromptTemplate::load(Some(empty.path())).source(),
            &TemplateSource::Builtin
        );
        assert_eq!(PromptTemplate::load(None).source(), &TemplateSource::Builtin);
    }

    #[test]
    fn test_sections() {
        assert_eq!(existing_content_section(None), "");
        assert!(existing_content_section(Some("/** x */")).starts_with("EXISTING JAVADOC"));
        assert_eq!(
            potential_exceptions_section(&["Explicitly throws IOException".to_string()]),
            "POTENTIAL EXCEPTIONS TO CONSIDER:\n- Explicitly throws IOException"
        );
        assert!(implementation_notes_instructions(false).is_empty());
        assert!(implementation_notes_instructions(true).contains(NOTES_MARKER));
    }
}
