//! Regeneration-Decision Cascade
//!
//! Cost-ascending admission control for one declaration:
//! 1. Structural check (free): missing or malformed documentation
//! 2. Scoped diff (one git call): untouched code keeps its documentation
//! 3. Audit (cheap oracle tier): verdict on the existing documentation
//!
//! A stage that says "skip" is final. Any stage that errors escalates
//! toward regeneration.

pub mod audit;
pub mod diff;
pub mod heuristics;

pub use audit::{AuditReport, Auditor, Verdict, parse_audit_response};
pub use diff::{is_meaningful_line, meaningful_changes_in_range};
pub use heuristics::HeuristicChecker;

use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::config::CascadeConfig;
use crate::types::{CascadeAction, CascadeDecision, DeclarationRecord};
use crate::vcs::VersionControl;

pub struct RegenerationCascade {
    heuristics: HeuristicChecker,
    auditor: Auditor,
    vcs: Arc<dyn VersionControl>,
    config: CascadeConfig,
}

impl RegenerationCascade {
    pub fn new(
        heuristics: HeuristicChecker,
        auditor: Auditor,
        vcs: Arc<dyn VersionControl>,
        config: CascadeConfig,
    ) -> Self {
        Self {
            heuristics,
            auditor,
            vcs,
            config,
        }
    }

    #[instrument(skip_all, fields(item = %decl.label()))]
    pub async fn decide(&self, decl: &DeclarationRecord, file_path: &Path) -> CascadeDecision {
        let Some(doc) = decl.existing_doc.as_ref() else {
            return CascadeDecision::new(CascadeAction::Missing, "No javadoc present");
        };

        let structural = self.heuristics.check(decl, doc);
        if !structural.passed() {
            debug!(reasons = %structural.summary(), "Structural check failed");
            return CascadeDecision::new(CascadeAction::StructuralFail, structural.summary());
        }

        if !self.config.force_audit
            && let Some(decision) = self.check_code_change(decl, file_path).await
        {
            return decision;
        }

        let content = match tokio::fs::read_to_string(file_path).await {
            Ok(content) => content,
            Err(e) => {
                warn!("Could not read {} for audit: {}", file_path.display(), e);
                return CascadeDecision::new(
                    CascadeAction::FileReadError,
                    format!("Could not read file: {}", e),
                );
            }
        };

        let (report, usage) = self.auditor.audit(decl, doc, &content).await;
        let decision = match report {
            Ok(report) if report.verdict.is_accurate() => {
                info!("Audit passed");
                CascadeDecision::new(CascadeAction::AuditPassed, report.describe())
            }
            Ok(report) => {
                info!(verdict = %report.verdict, "Audit requested regeneration");
                CascadeDecision::new(CascadeAction::AuditFailed, report.describe())
            }
            Err(e) => {
                warn!("Audit failed, regenerating: {}", e);
                CascadeDecision::new(CascadeAction::AuditFailed, format!("Audit error: {}", e))
            }
        };

        match usage {
            Some(usage) => decision.with_audit_usage(usage),
            None => decision,
        }
    }

    /// `Some(NoCodeChange)` when the declaration's range shows no meaningful
    /// change; `None` to continue to the audit, including on VCS failure
    async fn check_code_change(
        &self,
        decl: &DeclarationRecord,
        file_path: &Path,
    ) -> Option<CascadeDecision> {
        let diff = match self
            .vcs
            .file_diff(file_path, &self.config.diff_base, &self.config.diff_head)
            .await
        {
            Ok(diff) => diff,
            Err(e) => {
                warn!("Cannot determine code change, escalating to audit: {}", e);
                return None;
            }
        };

        let changes = meaningful_changes_in_range(&diff, decl.start_line, decl.end_line);
        debug!(changes, "Meaningful changes in declaration range");
        (changes <= self.config.max_trivial_changes).then(|| {
            CascadeDecision::new(
                CascadeAction::NoCodeChange,
                format!(
                    "No meaningful code changes since {} ({} changed lines)",
                    self.config.diff_base, changes
                ),
            )
        })
    }
}
