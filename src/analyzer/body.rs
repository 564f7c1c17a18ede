//! Static analysis of callable bodies
//!
//! Classifies top-level statements for the triviality rules and scans body
//! text for likely exception sources to mention in generation prompts.

use regex::Regex;
use std::sync::LazyLock;

use crate::types::BodyStatement;

static NULL_ASSIGNMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[\w<>\[\],.?\s]+\s+)?[\w.\[\]]+\s*=\s*null\s*;$").expect("valid regex")
});
static LOGGING_CALL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:System\.(?:out|err)\.print\w*|(?:this\.)?(?:log|logger|LOG|LOGGER|Log|Logger)\.(?:trace|debug|info|warn|warning|error|fatal|severe|fine|finer|finest|log))\s*\(",
    )
    .expect("valid regex")
});
static ASSERTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:assert\b|(?:Assert\.|Assertions\.)?assert[A-Z]\w*\s*\()").expect("valid regex")
});
static THROW_NEW: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"throw\s+new\s+(\w+)").expect("valid regex"));

const CONTROL_FLOW_KINDS: &[&str] = &[
    "if_statement",
    "for_statement",
    "enhanced_for_statement",
    "while_statement",
    "do_statement",
    "switch_expression",
    "switch_statement",
    "try_statement",
    "try_with_resources_statement",
    "synchronized_statement",
    "labeled_statement",
];

const LOOP_KINDS: &[&str] = &[
    "for_statement",
    "enhanced_for_statement",
    "while_statement",
    "do_statement",
];

const CONCURRENCY_MARKERS: &[&str] = &[
    "Thread",
    "Executor",
    "CompletableFuture",
    "CountDownLatch",
    "Semaphore",
    "synchronized",
    "Atomic",
    "Lock",
    "parallel",
    ".submit(",
    ".execute(",
];

pub fn is_control_flow(statement: &BodyStatement) -> bool {
    CONTROL_FLOW_KINDS.contains(&statement.kind.as_str())
}

pub fn is_null_assignment(statement: &BodyStatement) -> bool {
    matches!(
        statement.kind.as_str(),
        "expression_statement" | "local_variable_declaration"
    ) && NULL_ASSIGNMENT.is_match(statement.text.trim())
}

pub fn is_logging(statement: &BodyStatement) -> bool {
    statement.kind == "expression_statement" && LOGGING_CALL.is_match(statement.text.trim())
}

pub fn is_return(statement: &BodyStatement) -> bool {
    statement.kind == "return_statement"
}

/// `a = b;` or `this.a = b;`, but not a declaration or a compound operator
pub fn is_assignment(statement: &BodyStatement) -> bool {
    if statement.kind != "expression_statement" {
        return false;
    }
    let text = statement.text.trim();
    match text.find('=') {
        Some(pos) if pos > 0 => {
            let before = text[..pos].trim_end();
            let after = &text[pos + 1..];
            !after.starts_with('=')
                && !before.ends_with(['!', '<', '>', '+', '-', '*', '/', '%', '&', '|', '^'])
                && !before.contains('(')
        }
        _ => false,
    }
}

/// A loop whose body is nothing but assertions and touches no concurrency primitive
pub fn is_simple_assertion_loop(statement: &BodyStatement) -> bool {
    if !LOOP_KINDS.contains(&statement.kind.as_str()) {
        return false;
    }
    let text = statement.text.as_str();
    if CONCURRENCY_MARKERS.iter().any(|m| text.contains(m)) {
        return false;
    }

    let inner = match (text.find('{'), text.rfind('}')) {
        (Some(open), Some(close)) if open < close => &text[open + 1..close],
        _ => match text.find(')') {
            // braceless `for (...) assertX(...);`
            Some(close) => &text[close + 1..],
            None => return false,
        },
    };
    if inner.contains('{') {
        return false;
    }

    let mut pieces = inner
        .split(';')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .peekable();
    pieces.peek().is_some() && pieces.all(|p| ASSERTION.is_match(p))
}

/// Hints about exceptions a body may raise, for the generation prompt
pub fn potential_exceptions(code: &str) -> Vec<String> {
    if code.is_empty() {
        return Vec::new();
    }

    let mut hints: Vec<String> = Vec::new();
    for caps in THROW_NEW.captures_iter(code) {
        let hint = format!("Explicitly throws {}", &caps[1]);
        if !hints.contains(&hint) {
            hints.push(hint);
        }
    }

    if code.contains('[') && code.contains(']') {
        hints.push("Array access - consider IndexOutOfBoundsException".to_string());
    }
    if [".length", ".get(", ".put("].iter().any(|p| code.contains(p)) {
        hints.push("Object method calls - consider NullPointerException".to_string());
    }
    if has_division(code) {
        hints.push(
            "Division operation - consider ArithmeticException for division by zero".to_string(),
        );
    }
    if ["substring", "charAt", "split"]
        .iter()
        .any(|p| code.contains(p))
    {
        hints.push("String operations - consider StringIndexOutOfBoundsException".to_string());
    }

    hints
}

/// A `/` that is not part of a comment delimiter
fn has_division(code: &str) -> bool {
    code.lines().any(|line| {
        let code_part = line.split("//").next().unwrap_or_default();
        let trimmed = code_part.trim_start();
        if trimmed.starts_with('*') || trimmed.starts_with("/*") {
            return false;
        }
        code_part.replace("/*", "").replace("*/", "").contains('/')
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stmt(kind: &str, text: &str) -> BodyStatement {
        BodyStatement::new(kind, text)
    }

    #[test]
    fn test_null_assignment() {
        assert!(is_null_assignment(&stmt("expression_statement", "this.cache = null;")));
        assert!(is_null_assignment(&stmt(
            "local_variable_declaration",
            "Map<String, Integer> m = null;"
        )));
        assert!(!is_null_assignment(&stmt("expression_statement", "x = compute();")));
    }

    #[test]
    fn test_logging() {
        assert!(is_logging(&stmt("expression_statement", "System.out.println(\"hi\");")));
        assert!(is_logging(&stmt("expression_statement", "logger.info(\"started {}\", id);")));
        assert!(is_logging(&stmt("expression_statement", "LOG.debug(\"x\");")));
        assert!(!is_logging(&stmt("expression_statement", "catalog.info();")));
    }

    #[test]
    fn test_assignment() {
        assert!(is_assignment(&stmt("expression_statement", "this.name = name;")));
        assert!(!is_assignment(&stmt("expression_statement", "count += 1;")));
        assert!(!is_assignment(&stmt("expression_statement", "check(a == b);")));
        assert!(!is_assignment(&stmt("return_statement", "return a;")));
    }

    #[test]
    fn test_simple_assertion_loop() {
        let loop_ = stmt(
            "enhanced_for_statement",
            "for (int v : values) {\n    assertTrue(v > 0);\n    assertNotNull(map.get(v));\n}",
        );
        assert!(is_simple_assertion_loop(&loop_));

        let threaded = stmt(
            "for_statement",
            "for (int i = 0; i < n; i++) {\n    new Thread(task).start();\n    assertTrue(ok);\n}",
        );
        assert!(!is_simple_assertion_loop(&threaded));

        let work = stmt("for_statement", "for (String s : xs) {\n    total += s.length();\n}");
        assert!(!is_simple_assertion_loop(&work));
    }

    #[test]
    fn test_potential_exceptions() {
        let hints = potential_exceptions(
            "if (x == null) throw new IllegalArgumentException(\"x\");\nint r = a / b;\nreturn s.substring(1);",
        );
        assert_eq!(hints[0], "Explicitly throws IllegalArgumentException");
        assert!(hints.iter().any(|h| h.contains("ArithmeticException")));
        assert!(hints.iter().any(|h| h.contains("StringIndexOutOfBounds")));
        assert!(!hints.iter().any(|h| h.starts_with("Array access")));
    }

    #[test]
    fn test_comment_slash_is_not_division() {
        assert!(potential_exceptions("// just a comment\nreturn 1;").is_empty());
    }
}
