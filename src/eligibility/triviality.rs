//! Triviality rules for method bodies

use crate::analyzer::body;
use crate::config::EligibilityConfig;
use crate::constants::eligibility::LIFECYCLE_ANNOTATIONS;
use crate::types::DeclarationRecord;

/// Why a method body was judged trivial
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Triviality {
    LifecycleHook,
    AssertionLoop,
    SingleStatement,
    NullAssignments,
    Logging,
}

impl Triviality {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LifecycleHook => "test lifecycle method",
            Self::AssertionLoop => "simple assertion loop",
            Self::SingleStatement => "single statement body",
            Self::NullAssignments => "mostly null assignments",
            Self::Logging => "mostly logging",
        }
    }
}

/// Classify a method body, `None` when it is worth documenting.
///
/// Control flow makes a body non-trivial unless every control-flow statement
/// is a plain assertion loop.
pub fn classify(decl: &DeclarationRecord, policy: &EligibilityConfig) -> Option<Triviality> {
    if policy.skip_lifecycle_methods
        && LIFECYCLE_ANNOTATIONS
            .iter()
            .any(|a| decl.has_annotation(a))
    {
        return Some(Triviality::LifecycleHook);
    }

    let statements = &decl.statements;
    let control_flow: Vec<_> = statements.iter().filter(|s| body::is_control_flow(s)).collect();
    if !control_flow.is_empty() {
        return control_flow
            .iter()
            .all(|s| body::is_simple_assertion_loop(s))
            .then_some(Triviality::AssertionLoop);
    }

    if statements.len() <= 1 {
        return Some(Triviality::SingleStatement);
    }

    let total = statements.len() as f64;
    let nulls = statements.iter().filter(|s| body::is_null_assignment(s)).count() as f64;
    if nulls / total >= policy.null_assignment_ratio {
        return Some(Triviality::NullAssignments);
    }

    let logging = statements.iter().filter(|s| body::is_logging(s)).count() as f64;
    if logging / total >= policy.logging_ratio {
        return Some(Triviality::Logging);
    }

    None
}

/// Getter/setter shape: `get`/`is`/`set` prefix and a one-statement body
/// that only returns or only assigns
pub fn is_accessor(decl: &DeclarationRecord) -> bool {
    let Some(prefix) = accessor_prefix(&decl.name) else {
        return false;
    };
    let [statement] = decl.statements.as_slice() else {
        return false;
    };

    match prefix {
        "set" => body::is_assignment(statement),
        _ => body::is_return(statement),
    }
}

fn accessor_prefix(name: &str) -> Option<&'static str> {
    ["get", "is", "set"].into_iter().find(|prefix| {
        name.strip_prefix(prefix)
            .and_then(|rest| rest.chars().next())
            .is_some_and(|c| c.is_ascii_uppercase())
    })
}
