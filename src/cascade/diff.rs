//! Unified diff range analysis
//!
//! Maps changed lines of a unified diff onto new-file line numbers and counts
//! the meaningful ones inside a declaration's range. Pure, no VCS access.

use regex::Regex;
use std::sync::LazyLock;

static HUNK_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^@@ -(\d+)(?:,(\d+))? \+(\d+)(?:,(\d+))? @@").expect("valid regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Hunk {
    new_start: usize,
    new_count: usize,
}

impl Hunk {
    fn parse(line: &str) -> Option<Self> {
        let caps = HUNK_HEADER.captures(line)?;
        let number = |i: usize, default: usize| {
            caps.get(i)
                .and_then(|m| m.as_str().parse().ok())
                .unwrap_or(default)
        };
        Some(Self {
            new_start: number(3, 0),
            new_count: number(4, 1),
        })
    }

    /// New-file line a deletion is attributed to. A pure deletion hunk
    /// reports the line before the gap as its start.
    fn deletion_line(&self, cursor: usize) -> usize {
        if self.new_count == 0 {
            self.new_start + 1
        } else {
            cursor
        }
    }
}

/// A changed line is meaningful unless it is blank, a full-line comment,
/// or nothing but braces and punctuation
pub fn is_meaningful_line(content: &str) -> bool {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return false;
    }
    if ["//", "/*", "*"].iter().any(|p| trimmed.starts_with(p)) {
        return false;
    }
    !trimmed.chars().all(|c| "{}()[];,".contains(c))
}

/// Count meaningful `+`/`-` lines of `diff` falling inside the inclusive
/// new-file range `start..=end`
pub fn meaningful_changes_in_range(diff: &str, start: usize, end: usize) -> usize {
    let mut hunk: Option<Hunk> = None;
    let mut cursor = 0usize;
    let mut count = 0usize;

    for line in diff.lines() {
        if line.starts_with("diff ") {
            hunk = None;
            continue;
        }
        if let Some(header) = Hunk::parse(line) {
            cursor = header.new_start;
            hunk = Some(header);
            continue;
        }
        let Some(current) = hunk else {
            continue;
        };

        let (position, content) = if let Some(added) = line.strip_prefix('+') {
            let at = cursor;
            cursor += 1;
            (at, added)
        } else if let Some(removed) = line.strip_prefix('-') {
            (current.deletion_line(cursor), removed)
        } else {
            // context line or "\ No newline at end of file"
            if line.starts_with(' ') {
                cursor += 1;
            }
            continue;
        };

        if (start..=end).contains(&position) && is_meaningful_line(content) {
            count += 1;
        }
    }

    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const DIFF: &str = "diff --git a/src/A.java b/src/A.java
index 111..222 100644
--- a/src/A.java
+++ b/src/A.java
@@ -12,1 +12,2 @@ public class A {
-        int total = 0;
+        long total = 0L;
+        // running sum
@@ -30,0 +32,3 @@
+        if (total > max) {
+            throw new IllegalStateException();
+        }
@@ -50,2 +54,0 @@
-        log(total);
-        }
";

    #[test]
    fn test_changes_inside_range() {
        // line 12: one removal and one addition are meaningful, the comment is not
        assert_eq!(meaningful_changes_in_range(DIFF, 10, 20), 2);
        // lines 32..34: the bare closing brace is not meaningful
        assert_eq!(meaningful_changes_in_range(DIFF, 30, 40), 2);
    }

    #[test]
    fn test_pure_deletion_maps_after_gap() {
        assert_eq!(meaningful_changes_in_range(DIFF, 55, 60), 1);
        assert_eq!(meaningful_changes_in_range(DIFF, 56, 60), 0);
    }

    #[test]
    fn test_range_without_changes() {
        assert_eq!(meaningful_changes_in_range(DIFF, 100, 200), 0);
        assert_eq!(meaningful_changes_in_range("", 1, 100), 0);
    }

    #[test]
    fn test_file_headers_are_not_changes() {
        let diff = "--- a/A.java\n+++ b/A.java\n";
        assert_eq!(meaningful_changes_in_range(diff, 0, usize::MAX), 0);
    }

    #[test]
    fn test_hunk_without_counts() {
        let diff = "@@ -5 +5 @@\n-return a;\n+return b;\n";
        assert_eq!(meaningful_changes_in_range(diff, 5, 5), 2);
    }

    #[test]
    fn test_meaningful_line() {
        assert!(is_meaningful_line("  return x;"));
        assert!(!is_meaningful_line("   "));
        assert!(!is_meaningful_line("  // note"));
        assert!(!is_meaningful_line("   * doc line"));
        assert!(!is_meaningful_line("  });"));
    }

    proptest! {
        #[test]
        fn prop_count_bounded_by_changed_lines(
            diff in "(?s)[-+@ ,0-9a-z{};/\\n]{0,400}",
            start in 0usize..50,
            len in 0usize..50,
        ) {
            let changed = diff.lines().filter(|l| l.starts_with('+') || l.starts_with('-')).count();
            prop_assert!(meaningful_changes_in_range(&diff, start, start + len) <= changed);
        }
    }
}
