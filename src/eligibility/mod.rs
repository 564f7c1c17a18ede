//! Candidate Selection
//!
//! Decides which declarations are worth documenting at all. Rules run in
//! order and the first exclusion wins:
//! 1. Visibility (public only)
//! 2. File-size floor for type declarations
//! 3. Size floor for methods and constructors
//! 4. Accessor detection
//! 5. Triviality (methods only)

mod triviality;

use std::fmt;

pub use triviality::{Triviality, classify, is_accessor};

use crate::config::EligibilityConfig;
use crate::types::{DeclarationKind, DeclarationRecord};

/// Reason a declaration is not a candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exclusion {
    NotPublic,
    SmallFile { lines: usize },
    ShortBody { lines: usize },
    Accessor,
    Trivial(Triviality),
}

impl fmt::Display for Exclusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotPublic => write!(f, "not public"),
            Self::SmallFile { lines } => write!(f, "file too small ({} lines)", lines),
            Self::ShortBody { lines } => write!(f, "body too short ({} lines)", lines),
            Self::Accessor => write!(f, "accessor"),
            Self::Trivial(t) => write!(f, "trivial: {}", t.as_str()),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct EligibilityFilter {
    policy: EligibilityConfig,
}

impl EligibilityFilter {
    pub fn new(policy: EligibilityConfig) -> Self {
        Self { policy }
    }

    pub fn is_candidate(&self, decl: &DeclarationRecord, file_line_count: usize) -> bool {
        match self.evaluate(decl, file_line_count) {
            Ok(()) => true,
            Err(reason) => {
                tracing::debug!("Excluded {}: {}", decl.label(), reason);
                false
            }
        }
    }

    pub fn evaluate(
        &self,
        decl: &DeclarationRecord,
        file_line_count: usize,
    ) -> Result<(), Exclusion> {
        if !decl.is_public() {
            return Err(Exclusion::NotPublic);
        }

        match decl.kind {
            DeclarationKind::Type { .. } => {
                if file_line_count < self.policy.min_file_lines {
                    return Err(Exclusion::SmallFile {
                        lines: file_line_count,
                    });
                }
            }
            DeclarationKind::Method { .. } | DeclarationKind::Constructor => {
                let span = decl.line_span();
                if span < self.policy.min_method_lines {
                    return Err(Exclusion::ShortBody { lines: span });
                }
                if is_accessor(decl) {
                    return Err(Exclusion::Accessor);
                }
                if matches!(decl.kind, DeclarationKind::Method { .. })
                    && let Some(t) = classify(decl, &self.policy)
                {
                    return Err(Exclusion::Trivial(t));
                }
            }
        }

        Ok(())
    }

    /// Candidates among `decls`, in input order
    pub fn candidates<'a>(
        &self,
        decls: &'a [DeclarationRecord],
        file_line_count: usize,
    ) -> Vec<&'a DeclarationRecord> {
        decls
            .iter()
            .filter(|d| self.is_candidate(d, file_line_count))
            .collect()
    }
}
