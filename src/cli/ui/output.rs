use console::style;

use crate::pipeline::{FileReport, RunSummary};
use crate::types::CascadeAction;

/// Console output for humans.
///
/// Inside GitHub Actions, warnings and errors are also emitted as workflow
/// commands so they surface as annotations.
pub struct Output {
    github_actions: bool,
}

impl Output {
    pub fn new() -> Self {
        Self {
            github_actions: std::env::var("GITHUB_ACTIONS").is_ok_and(|v| v == "true"),
        }
    }

    pub fn success(&self, message: &str) {
        println!("{} {}", style("✓").green(), message);
    }

    pub fn error(&self, message: &str) {
        eprintln!("{} {}", style("✗").red(), message);
        if self.github_actions {
            println!("::error::{}", workflow_escape(message));
        }
    }

    pub fn warning(&self, message: &str) {
        println!("{} {}", style("⚠").yellow(), message);
        if self.github_actions {
            println!("::warning::{}", workflow_escape(message));
        }
    }

    pub fn info(&self, message: &str) {
        println!("{} {}", style("ℹ").blue(), message);
    }

    pub fn header(&self, message: &str) {
        println!("\n{}", style(message).bold().underlined());
    }

    pub fn section(&self, message: &str) {
        println!("\n{}", style(message).bold());
        println!("{}", "─".repeat(40));
    }

    pub fn file_report(&self, report: &FileReport, dry_run: bool) {
        if let Some(error) = &report.error {
            self.error(&format!("{}: {}", report.path.display(), error));
            return;
        }

        self.section(&report.path.display().to_string());
        if report.candidates.is_empty() {
            println!("  No candidates ({} declarations)", report.declarations);
            return;
        }

        for entry in &report.candidates {
            match &entry.decision {
                None if dry_run => {
                    println!("  {} {} (line {})", style("•").dim(), entry.label, entry.line)
                }
                None => {}
                Some(decision) => {
                    let marker = match (decision.action, &entry.generated) {
                        (_, Some(_)) => style("✓").green(),
                        (action, None) if action.should_regenerate() => style("✗").red(),
                        _ => style("=").dim(),
                    };
                    println!(
                        "  {} {} [{}] {}",
                        marker,
                        entry.label,
                        decision.action,
                        style(&decision.reason).dim()
                    );
                }
            }
        }
        if report.modified {
            println!("  {}", style("updated").green());
        }
    }

    pub fn summary(&self, summary: &RunSummary, dry_run: bool) {
        self.header("Summary");
        println!("  Run:            {}", summary.run_id);
        println!(
            "  Files:          {} processed, {} modified, {} failed",
            summary.files_processed, summary.files_modified, summary.files_failed
        );
        println!(
            "  Declarations:   {} parsed, {} candidates",
            summary.declarations, summary.candidates
        );
        if dry_run {
            return;
        }

        println!(
            "  Regenerated:    {} ({} generation failures)",
            summary.regenerated, summary.generation_failures
        );
        println!("  Skipped:        {}", summary.skipped());
        for (action, count) in &summary.decisions {
            let label = match action {
                CascadeAction::NoCodeChange | CascadeAction::AuditPassed => "kept",
                _ => "regenerate",
            };
            println!("    {:<16} {:>4}  {}", action.as_str(), count, style(label).dim());
        }
        println!("  Audit calls:    {}", summary.audit_calls);
        for line in summary.usage.display().lines() {
            println!("  {}", line);
        }
        println!("  Duration:       {:.1}s", summary.duration_secs());

        if summary.generation_failures > 0 {
            self.warning(&format!(
                "{} declaration(s) could not be documented, see logs",
                summary.generation_failures
            ));
        }
        if summary.files_failed > 0 {
            self.warning(&format!("{} file(s) failed", summary.files_failed));
        }
    }
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}

/// Escape data for a workflow command message
fn workflow_escape(message: &str) -> String {
    message
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workflow_escape() {
        assert_eq!(workflow_escape("50% done\nnext"), "50%25 done%0Anext");
    }
}
