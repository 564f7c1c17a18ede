pub mod decision;
pub mod declaration;
pub mod doc;
pub mod error;

pub use decision::{CascadeAction, CascadeDecision, HeuristicResult};
pub use declaration::{BodyStatement, DeclarationKind, DeclarationRecord, Parameter, TypeForm};
pub use doc::{DocBlock, DocFields, GeneratedDoc, UsageRecord};
pub use error::{ErrorCategory, ErrorClassifier, LlmError, Result, WeaveError};
