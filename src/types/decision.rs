use serde::{Deserialize, Serialize};
use std::fmt;

use super::doc::UsageRecord;

/// Outcome of the structural quality check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeuristicResult {
    passed: bool,
    reasons: Vec<String>,
}

impl HeuristicResult {
    /// `passed` is derived from `reasons` being empty
    pub fn new(reasons: Vec<String>) -> Self {
        Self {
            passed: reasons.is_empty(),
            reasons,
        }
    }

    pub fn passed(&self) -> bool {
        self.passed
    }

    pub fn reasons(&self) -> &[String] {
        &self.reasons
    }

    /// All reasons joined with `; `
    pub fn summary(&self) -> String {
        self.reasons.join("; ")
    }
}

/// Terminal state of the regeneration cascade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CascadeAction {
    Missing,
    StructuralFail,
    NoCodeChange,
    AuditPassed,
    AuditFailed,
    FileReadError,
    /// Cascade bypassed by the `--force` flag
    Forced,
}

impl CascadeAction {
    pub fn should_regenerate(&self) -> bool {
        !matches!(self, Self::NoCodeChange | Self::AuditPassed)
    }

    /// Actions reached only after the classification oracle was called,
    /// whether or not the call succeeded
    pub fn consulted_audit(&self) -> bool {
        matches!(self, Self::AuditPassed | Self::AuditFailed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Missing => "missing",
            Self::StructuralFail => "structural_fail",
            Self::NoCodeChange => "no_code_change",
            Self::AuditPassed => "audit_passed",
            Self::AuditFailed => "audit_failed",
            Self::FileReadError => "file_read_error",
            Self::Forced => "forced",
        }
    }
}

impl fmt::Display for CascadeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decision for one declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CascadeDecision {
    pub action: CascadeAction,
    pub reason: String,
    /// Present only when the audit oracle was actually called
    pub audit_usage: Option<UsageRecord>,
}

impl CascadeDecision {
    pub fn new(action: CascadeAction, reason: impl Into<String>) -> Self {
        Self {
            action,
            reason: reason.into(),
            audit_usage: None,
        }
    }

    pub fn with_audit_usage(mut self, usage: UsageRecord) -> Self {
        self.audit_usage = Some(usage);
        self
    }

    pub fn should_regenerate(&self) -> bool {
        self.action.should_regenerate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heuristic_result_invariant() {
        assert!(HeuristicResult::new(vec![]).passed());
        let failed = HeuristicResult::new(vec!["a".into(), "b".into()]);
        assert!(!failed.passed());
        assert_eq!(failed.summary(), "a; b");
    }

    #[test]
    fn test_should_regenerate_follows_action() {
        use CascadeAction::*;
        for action in [Missing, StructuralFail, AuditFailed, FileReadError, Forced] {
            assert!(action.should_regenerate(), "{action}");
        }
        for action in [NoCodeChange, AuditPassed] {
            assert!(!action.should_regenerate(), "{action}");
        }
    }
}
