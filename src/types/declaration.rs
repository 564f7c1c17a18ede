use serde::{Deserialize, Serialize};
use std::fmt;

use super::doc::{DocBlock, GeneratedDoc};

/// Surface form of a type declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeForm {
    Class,
    Interface,
    Enum,
    Record,
}

impl TypeForm {
    /// Map a tree-sitter node kind onto a type form
    pub fn from_node_kind(kind: &str) -> Option<Self> {
        match kind {
            "class_declaration" => Some(Self::Class),
            "interface_declaration" => Some(Self::Interface),
            "enum_declaration" => Some(Self::Enum),
            "record_declaration" => Some(Self::Record),
            _ => None,
        }
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Class => "class",
            Self::Interface => "interface",
            Self::Enum => "enum",
            Self::Record => "record",
        }
    }
}

/// Declaration kind with the data only that kind carries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DeclarationKind {
    Type { form: TypeForm },
    Method { return_type: String },
    Constructor,
}

impl DeclarationKind {
    pub fn is_type(&self) -> bool {
        matches!(self, Self::Type { .. })
    }

    pub fn is_callable(&self) -> bool {
        !self.is_type()
    }

    /// Label used in prompts and messages
    pub fn label(&self) -> &'static str {
        match self {
            Self::Type { .. } => "class",
            Self::Method { .. } => "method",
            Self::Constructor => "constructor",
        }
    }
}

impl fmt::Display for DeclarationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A formal parameter of a method or constructor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    #[serde(rename = "type")]
    pub param_type: String,
    pub name: String,
}

impl Parameter {
    pub fn new(param_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            param_type: param_type.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.param_type, self.name)
    }
}

/// A top-level statement of a callable body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BodyStatement {
    /// tree-sitter node kind, e.g. `expression_statement`
    pub kind: String,
    pub text: String,
}

impl BodyStatement {
    pub fn new(kind: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            text: text.into(),
        }
    }
}

/// One parsed declaration.
///
/// Line numbers are 1-indexed and inclusive, relative to the source text the
/// record was parsed from. `start_line` is the first line of the declaration
/// node, which includes any leading annotations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeclarationRecord {
    pub kind: DeclarationKind,
    pub name: String,
    pub start_line: usize,
    pub end_line: usize,
    pub modifiers: Vec<String>,
    /// Annotation names without the leading `@`
    pub annotations: Vec<String>,
    pub signature: String,
    pub parameters: Vec<Parameter>,
    pub body_text: String,
    /// Top-level statements of a callable body, empty for types
    pub statements: Vec<BodyStatement>,
    pub existing_doc: Option<DocBlock>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generated_doc: Option<GeneratedDoc>,
}

impl DeclarationRecord {
    pub fn return_type(&self) -> Option<&str> {
        match &self.kind {
            DeclarationKind::Method { return_type } => Some(return_type),
            _ => None,
        }
    }

    /// True for methods whose return type is anything but `void`
    pub fn returns_value(&self) -> bool {
        self.return_type().is_some_and(|t| t != "void")
    }

    pub fn is_public(&self) -> bool {
        self.has_modifier("public")
    }

    pub fn has_modifier(&self, modifier: &str) -> bool {
        self.modifiers.iter().any(|m| m == modifier)
    }

    pub fn has_annotation(&self, name: &str) -> bool {
        self.annotations.iter().any(|a| a == name)
    }

    /// Number of source lines the declaration spans
    pub fn line_span(&self) -> usize {
        self.end_line + 1 - self.start_line
    }

    /// Modifier string for prompts, `default` for package-private
    pub fn modifier_string(&self) -> String {
        if self.modifiers.is_empty() {
            "default".to_string()
        } else {
            self.modifiers.join(" ")
        }
    }

    /// Parameters rendered as `type name` pairs
    pub fn parameter_string(&self) -> String {
        self.parameters
            .iter()
            .map(Parameter::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Short label for logs: `method process`
    pub fn label(&self) -> String {
        format!("{} {}", self.kind, self.name)
    }
}
