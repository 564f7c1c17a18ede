//! Source Splicer
//!
//! Rewrites a Java source with generated documentation. Declarations are
//! applied bottom-up so edits never shift the line numbers of declarations
//! still waiting to be applied.

use tracing::{debug, warn};

use crate::constants::splice::{BRACE_LOOKAHEAD, INDENT_UNIT, NOTES_MARKER};
use crate::types::{DeclarationRecord, GeneratedDoc};

/// Apply every declaration's `generated_doc` to `source`.
///
/// Declarations without generated documentation are ignored. Line numbers
/// must refer to `source` as given. Inserted lines follow the source's line
/// ending; existing lines are kept byte for byte.
pub fn apply(source: &str, declarations: &[DeclarationRecord]) -> String {
    let mut lines: Vec<String> = source.split('\n').map(str::to_string).collect();
    // split on '\n' leaves the '\r' of CRLF lines in place
    let cr = if source.contains("\r\n") { "\r" } else { "" };

    let mut targets: Vec<(&DeclarationRecord, &GeneratedDoc)> = declarations
        .iter()
        .filter_map(|decl| decl.generated_doc.as_ref().map(|doc| (decl, doc)))
        .collect();
    targets.sort_by(|a, b| b.0.start_line.cmp(&a.0.start_line));

    for (decl, doc) in targets {
        splice_declaration(&mut lines, decl, doc, cr);
    }

    lines.join("\n")
}

fn splice_declaration(
    lines: &mut Vec<String>,
    decl: &DeclarationRecord,
    doc: &GeneratedDoc,
    cr: &str,
) {
    if doc.documentation_text.trim().is_empty() {
        debug!("Empty documentation for {}, leaving source untouched", decl.label());
        return;
    }
    let Some(mut decl_idx) = decl.start_line.checked_sub(1).filter(|i| *i < lines.len()) else {
        warn!(
            "Line {} of {} is outside the source, skipping",
            decl.start_line,
            decl.label()
        );
        return;
    };

    let mut insert_at = decl_idx;
    if let Some(existing) = &decl.existing_doc {
        let start = existing.start_line.saturating_sub(1);
        let end = existing.end_line;
        if start < end && end <= decl_idx {
            lines.drain(start..end);
            decl_idx -= end - start;
            insert_at = start;
        }
    }

    let indent = leading_whitespace(&lines[decl_idx]).to_string();
    let doc_lines = indent_block(&doc.documentation_text, &indent, cr);
    decl_idx += doc_lines.len();
    lines.splice(insert_at..insert_at, doc_lines);

    if decl.kind.is_callable()
        && let Some(notes) = doc.implementation_notes.as_deref()
    {
        let inner = format!("{}{}", indent, INDENT_UNIT);
        match find_body_brace(lines, decl_idx) {
            Some(brace) => insert_notes(lines, brace + 1, &indent_block(notes, &inner, cr), cr),
            None => warn!("No opening brace found for {}, notes dropped", decl.label()),
        }
    }
}

fn leading_whitespace(line: &str) -> &str {
    let end = line.len() - line.trim_start_matches([' ', '\t']).len();
    &line[..end]
}

/// Re-indent a block: strip its common leading whitespace, then prefix every
/// non-blank line with `indent`. Blank lines become empty. Every line ends
/// with `cr`.
fn indent_block(text: &str, indent: &str, cr: &str) -> Vec<String> {
    let common = text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| leading_whitespace(line).len())
        .min()
        .unwrap_or(0);

    text.trim_matches('\n')
        .lines()
        .map(|line| {
            if line.trim().is_empty() {
                cr.to_string()
            } else {
                format!("{}{}{}", indent, line[common..].trim_end(), cr)
            }
        })
        .collect()
}

/// First line at or after `from` holding the body's opening brace.
/// Annotation lines are skipped since their arguments may contain braces.
fn find_body_brace(lines: &[String], from: usize) -> Option<usize> {
    let end = (from + BRACE_LOOKAHEAD).min(lines.len());
    (from..end).find(|&i| {
        let trimmed = lines[i].trim_start();
        !trimmed.starts_with('@') && !trimmed.starts_with("//") && trimmed.contains('{')
    })
}

fn is_notes_start(line: &str) -> bool {
    line.trim_start()
        .strip_prefix("/*")
        .is_some_and(|rest| !rest.starts_with('*') && rest.trim_start().starts_with(NOTES_MARKER))
}

/// Insert notes at `at`, replacing a notes block already there, keeping one
/// blank line on each side
fn insert_notes(lines: &mut Vec<String>, at: usize, notes: &[String], cr: &str) {
    let first_code = (at..lines.len())
        .find(|&i| !lines[i].trim().is_empty())
        .unwrap_or(lines.len());
    if first_code < lines.len()
        && is_notes_start(&lines[first_code])
        && let Some(close) = (first_code..lines.len()).find(|&i| lines[i].trim_end().ends_with("*/"))
    {
        let mut remove_end = close + 1;
        if remove_end < lines.len() && lines[remove_end].trim().is_empty() {
            remove_end += 1;
        }
        lines.drain(first_code..remove_end);
    }

    let mut pos = at;
    if pos < lines.len() && lines[pos].trim().is_empty() {
        pos += 1;
    } else {
        lines.insert(pos, cr.to_string());
        pos += 1;
    }
    for line in notes {
        lines.insert(pos, line.clone());
        pos += 1;
    }
    if pos < lines.len() && !lines[pos].trim().is_empty() {
        lines.insert(pos, cr.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::{JavaParser, parse_doc_fields};
    use crate::types::UsageRecord;

    const SOURCE: &str = "package demo;

public class Greeter {

    private final String name;

    /**
     * Stale.
     */
    public Greeter(String name) {
        this.name = name;
    }

    @Override
    public String toString() {
        return name;
    }

    public String greet(String other) {
        return \"Hi \" + other;
    }
}
";

    fn generated(doc: &str, notes: Option<&str>) -> GeneratedDoc {
        GeneratedDoc {
            documentation_text: doc.to_string(),
            implementation_notes: notes.map(str::to_string),
            usage: UsageRecord::default(),
        }
    }

    fn with_docs(source: &str, docs: &[(&str, GeneratedDoc)]) -> Vec<DeclarationRecord> {
        let mut decls = JavaParser::new().parse(source);
        for decl in &mut decls {
            decl.generated_doc = docs
                .iter()
                .find(|(name, _)| *name == decl.name)
                .map(|(_, doc)| doc.clone());
        }
        decls
    }

    fn find<'a>(decls: &'a [DeclarationRecord], name: &str) -> &'a DeclarationRecord {
        decls.iter().find(|d| d.name == name).unwrap()
    }

    #[test]
    fn test_inserts_with_detected_indent() {
        let decls = with_docs(
            SOURCE,
            &[("greet", generated("/**\n * Greets.\n *\n * @param other who\n * @return text\n */", None))],
        );
        let out = apply(SOURCE, &decls);
        assert!(out.contains(
            "    }\n\n    /**\n     * Greets.\n     *\n     * @param other who\n     * @return text\n     */\n    public String greet("
        ));
    }

    #[test]
    fn test_doc_goes_above_annotations() {
        let decls = with_docs(SOURCE, &[("toString", generated("/** Name. */", None))]);
        let out = apply(SOURCE, &decls);
        assert!(out.contains("    /** Name. */\n    @Override\n    public String toString()"));
    }

    #[test]
    fn test_replaces_existing_doc() {
        let decls = with_docs(SOURCE, &[("Greeter", generated("/**\n * Creates a greeter.\n */", None))]);
        let constructor = decls
            .iter()
            .find(|d| d.kind.is_callable() && d.name == "Greeter")
            .unwrap();
        assert!(constructor.existing_doc.is_some());

        let out = apply(SOURCE, &decls);
        assert!(!out.contains("Stale."));
        assert!(out.contains("     * Creates a greeter.\n     */\n    public Greeter(String name) {"));
        // class doc at column zero
        assert!(out.contains("\n/**\n * Creates a greeter.\n */\npublic class Greeter {"));
    }

    #[test]
    fn test_bottom_up_keeps_all_targets_aligned() {
        let decls = with_docs(
            SOURCE,
            &[
                ("toString", generated("/**\n * A.\n */", None)),
                ("greet", generated("/**\n * B.\n */", None)),
            ],
        );
        let out = apply(SOURCE, &decls);
        let reparsed = JavaParser::new().parse(&out);
        let fields = |n: &str| find(&reparsed, n).existing_doc.as_ref().unwrap().fields.description.clone();
        assert_eq!(fields("toString"), "A.");
        assert_eq!(fields("greet"), "B.");
    }

    #[test]
    fn test_round_trip_through_parser() {
        let doc = "/**\n * Greets someone.\n *\n * @param other the name to greet\n * @return the greeting\n */";
        let out = apply(SOURCE, &with_docs(SOURCE, &[("greet", generated(doc, None))]));

        let reparsed = JavaParser::new().parse(&out);
        let existing = find(&reparsed, "greet").existing_doc.as_ref().unwrap();
        assert_eq!(existing.fields, parse_doc_fields(doc));
        let dedented: Vec<&str> = existing.raw_text.lines().map(|l| &l[4..]).collect();
        assert_eq!(dedented.join("\n"), doc);
    }

    #[test]
    fn test_dedents_oracle_indentation() {
        let decls = with_docs(SOURCE, &[("greet", generated("        /**\n         * B.\n         */", None))]);
        let out = apply(SOURCE, &decls);
        assert!(out.contains("\n    /**\n     * B.\n     */\n    public String greet("));
    }

    #[test]
    fn test_notes_after_brace() {
        let decls = with_docs(
            SOURCE,
            &[(
                "greet",
                generated("/** B. */", Some("/* AI Implementation Notes:\n * Concatenates.\n */")),
            )],
        );
        let out = apply(SOURCE, &decls);
        assert!(out.contains(
            "    public String greet(String other) {\n\n        /* AI Implementation Notes:\n         * Concatenates.\n         */\n\n        return \"Hi \" + other;"
        ));
    }

    #[test]
    fn test_notes_ignored_for_types() {
        let decls = with_docs(
            "public class A {\n    int x;\n}\n",
            &[("A", generated("/** A. */", Some("/* AI Implementation Notes: x */")))],
        );
        let out = apply("public class A {\n    int x;\n}\n", &decls);
        assert_eq!(out, "/** A. */\npublic class A {\n    int x;\n}\n");
    }

    #[test]
    fn test_idempotent_resplice() {
        let docs = [
            (
                "greet",
                generated(
                    "/**\n * Greets.\n * @param other who\n * @return text\n */",
                    Some("/* AI Implementation Notes:\n * Plain concat.\n */"),
                ),
            ),
            ("Greeter", generated("/**\n * Holds a name.\n */", None)),
        ];

        let once = apply(SOURCE, &with_docs(SOURCE, &docs));
        let twice = apply(&once, &with_docs(&once, &docs));
        assert_eq!(once, twice);
    }

    #[test]
    fn test_idempotent_with_blank_line_after_brace() {
        let source = "public class A {\n    public void run() {\n\n        work();\n    }\n}";
        let docs = [("run", generated("/** Runs. */", Some("/* AI Implementation Notes: once */")))];

        let once = apply(source, &with_docs(source, &docs));
        assert!(once.contains("    public void run() {\n\n        /* AI Implementation Notes: once */\n\n        work();"));
        let twice = apply(&once, &with_docs(&once, &docs));
        assert_eq!(once, twice);
    }

    #[test]
    fn test_crlf_source_keeps_crlf() {
        let source = "public class A {\r\n    public void run() {\r\n        work();\r\n    }\r\n}\r\n";
        let docs = [(
            "run",
            generated("/**\n * Runs.\n */", Some("/* AI Implementation Notes: x */")),
        )];

        let once = apply(source, &with_docs(source, &docs));
        assert_eq!(
            once,
            "public class A {\r\n    /**\r\n     * Runs.\r\n     */\r\n    public void run() {\r\n\r\n        /* AI Implementation Notes: x */\r\n\r\n        work();\r\n    }\r\n}\r\n"
        );
        assert!(once.split('\n').rev().skip(1).all(|line| line.ends_with('\r')));

        let twice = apply(&once, &with_docs(&once, &docs));
        assert_eq!(once, twice);
    }

    #[test]
    fn test_untouched_without_generated_docs() {
        let decls = JavaParser::new().parse(SOURCE);
        assert_eq!(apply(SOURCE, &decls), SOURCE);
    }
}
