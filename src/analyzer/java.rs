use tree_sitter::{Node, Parser as TsParser, Tree};

use super::javadoc::locate_doc_block;
use crate::types::{
    BodyStatement, DeclarationKind, DeclarationRecord, Parameter, Result, TypeForm, WeaveError,
};

const MODIFIER_KEYWORDS: &[&str] = &[
    "public",
    "private",
    "protected",
    "static",
    "final",
    "abstract",
    "synchronized",
    "native",
    "strictfp",
    "default",
    "sealed",
    "non-sealed",
    "transient",
    "volatile",
];

/// Structural parser for Java source.
///
/// Collects class, interface, enum, record, method and constructor
/// declarations in tree pre-order. Nested declarations are visited
/// independently.
#[derive(Debug, Default, Clone, Copy)]
pub struct JavaParser;

impl JavaParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse source text, logging and returning nothing on failure
    pub fn parse(&self, source: &str) -> Vec<DeclarationRecord> {
        match self.try_parse(source) {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!("Java parse failed: {}", e);
                Vec::new()
            }
        }
    }

    pub fn try_parse(&self, source: &str) -> Result<Vec<DeclarationRecord>> {
        let tree = build_tree(source)?;
        let root = tree.root_node();
        if root.has_error() {
            return Err(WeaveError::Parse {
                message: format!(
                    "syntax error near line {}",
                    first_error_line(root).unwrap_or(root.start_position().row + 1)
                ),
                path: String::new(),
            });
        }

        let content = source.as_bytes();
        let lines: Vec<&str> = source.split('\n').collect();
        let mut records = Vec::new();

        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            if let Some(record) = extract_declaration(node, content, &lines) {
                records.push(record);
            }

            let mut cursor = node.walk();
            let children: Vec<Node> = node.named_children(&mut cursor).collect();
            stack.extend(children.into_iter().rev());
        }

        tracing::debug!("Parsed {} declarations", records.len());
        Ok(records)
    }
}

fn build_tree(source: &str) -> Result<Tree> {
    let mut parser = TsParser::new();
    parser
        .set_language(&tree_sitter_java::LANGUAGE.into())
        .map_err(|e| WeaveError::Parse {
            message: format!("Failed to set Java language: {}", e),
            path: String::new(),
        })?;

    parser.parse(source, None).ok_or_else(|| WeaveError::Parse {
        message: "Failed to parse Java source".to_string(),
        path: String::new(),
    })
}

fn first_error_line(root: Node) -> Option<usize> {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if node.is_error() || node.is_missing() {
            return Some(node.start_position().row + 1);
        }
        if node.has_error() {
            let mut cursor = node.walk();
            let children: Vec<Node> = node.children(&mut cursor).collect();
            stack.extend(children.into_iter().rev());
        }
    }
    None
}

#[inline]
fn node_text<'a>(node: Node, content: &'a [u8]) -> &'a str {
    node.utf8_text(content).unwrap_or_else(|e| {
        tracing::debug!(
            "UTF-8 extraction failed at {}:{}: {}",
            node.start_position().row + 1,
            node.start_position().column,
            e
        );
        ""
    })
}

// ============================================================================
// Declaration Extraction
// ============================================================================

fn extract_declaration(node: Node, content: &[u8], lines: &[&str]) -> Option<DeclarationRecord> {
    let kind = match node.kind() {
        "method_declaration" => DeclarationKind::Method {
            return_type: node
                .child_by_field_name("type")
                .map(|t| node_text(t, content).to_string())
                .unwrap_or_else(|| "void".to_string()),
        },
        "constructor_declaration" => DeclarationKind::Constructor,
        other => DeclarationKind::Type {
            form: TypeForm::from_node_kind(other)?,
        },
    };

    let name = node
        .child_by_field_name("name")
        .map(|n| node_text(n, content))
        .filter(|n| !n.is_empty())?
        .to_string();

    let (modifiers, annotations) = extract_modifiers(node, content);
    let parameters = if kind.is_callable() {
        node.child_by_field_name("parameters")
            .map(|p| extract_parameters(p, content))
            .unwrap_or_default()
    } else {
        Vec::new()
    };
    let statements = if kind.is_callable() {
        node.child_by_field_name("body")
            .map(|b| extract_statements(b, content))
            .unwrap_or_default()
    } else {
        Vec::new()
    };

    let start_line = node.start_position().row + 1;
    let end_line = node.end_position().row + 1;
    let signature = build_signature(&kind, &name, &modifiers, &parameters);

    Some(DeclarationRecord {
        existing_doc: locate_doc_block(lines, start_line),
        kind,
        name,
        start_line,
        end_line,
        modifiers,
        annotations,
        signature,
        parameters,
        body_text: node_text(node, content).to_string(),
        statements,
        generated_doc: None,
    })
}

fn extract_modifiers(node: Node, content: &[u8]) -> (Vec<String>, Vec<String>) {
    let mut modifiers = Vec::new();
    let mut annotations = Vec::new();

    let mut cursor = node.walk();
    let Some(modifier_node) = node.children(&mut cursor).find(|c| c.kind() == "modifiers") else {
        return (modifiers, annotations);
    };

    let mut cursor = modifier_node.walk();
    for child in modifier_node.children(&mut cursor) {
        match child.kind() {
            "marker_annotation" | "annotation" => {
                if let Some(name) = child.child_by_field_name("name") {
                    annotations.push(node_text(name, content).to_string());
                }
            }
            kw if MODIFIER_KEYWORDS.contains(&kw) => modifiers.push(kw.to_string()),
            _ => {}
        }
    }

    (modifiers, annotations)
}

fn extract_parameters(params_node: Node, content: &[u8]) -> Vec<Parameter> {
    let mut params = Vec::new();
    let mut cursor = params_node.walk();

    for child in params_node.named_children(&mut cursor) {
        match child.kind() {
            "formal_parameter" => {
                let Some(name) = child.child_by_field_name("name") else {
                    continue;
                };
                let mut param_type = child
                    .child_by_field_name("type")
                    .map(|t| node_text(t, content).to_string())
                    .unwrap_or_default();
                if let Some(dims) = child.child_by_field_name("dimensions") {
                    param_type.push_str(node_text(dims, content));
                }
                params.push(Parameter::new(param_type, node_text(name, content)));
            }
            "spread_parameter" => {
                let mut inner = child.walk();
                let mut param_type = None;
                let mut name = None;
                for part in child.named_children(&mut inner) {
                    match part.kind() {
                        "modifiers" => {}
                        "variable_declarator" => {
                            name = part
                                .child_by_field_name("name")
                                .map(|n| node_text(n, content).to_string());
                        }
                        _ if param_type.is_none() => {
                            param_type = Some(format!("{}...", node_text(part, content)));
                        }
                        _ => {}
                    }
                }
                if let (Some(param_type), Some(name)) = (param_type, name) {
                    params.push(Parameter::new(param_type, name));
                }
            }
            _ => {}
        }
    }

    params
}

fn extract_statements(body: Node, content: &[u8]) -> Vec<BodyStatement> {
    let mut cursor = body.walk();
    body.named_children(&mut cursor)
        .filter(|c| !matches!(c.kind(), "line_comment" | "block_comment"))
        .map(|c| BodyStatement::new(c.kind(), node_text(c, content)))
        .collect()
}

fn build_signature(
    kind: &DeclarationKind,
    name: &str,
    modifiers: &[String],
    parameters: &[Parameter],
) -> String {
    let params = parameters
        .iter()
        .map(Parameter::to_string)
        .collect::<Vec<_>>()
        .join(", ");

    let mut parts: Vec<String> = modifiers.to_vec();
    match kind {
        DeclarationKind::Type { form } => {
            parts.push(form.keyword().to_string());
            parts.push(name.to_string());
        }
        DeclarationKind::Method { return_type } => {
            parts.push(return_type.clone());
            parts.push(format!("{}({})", name, params));
        }
        DeclarationKind::Constructor => parts.push(format!("{}({})", name, params)),
    }
    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const SAMPLE: &str = r#"package com.example;

/**
 * Holds orders.
 * Thread safe.
 */
public class OrderService {

    private final Map<String, Order> orders;

    public OrderService(Map<String, Order> orders) {
        this.orders = orders;
    }

    // lookup
    @Override
    public Order find(String id, int... flags) throws IOException {
        return orders.get(id);
    }

    static class Inner {
        void helper(String[] args) {
            System.out.println(args.length);
        }
    }
}
"#;

    fn find<'a>(records: &'a [DeclarationRecord], name: &str) -> &'a DeclarationRecord {
        records.iter().find(|r| r.name == name).unwrap()
    }

    #[test]
    fn test_parse_collects_declarations_in_order() {
        let records = JavaParser::new().parse(SAMPLE);
        let names: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["OrderService", "OrderService", "find", "Inner", "helper"]);
    }

    #[test]
    fn test_type_record() {
        let records = JavaParser::new().parse(SAMPLE);
        let class = &records[0];
        assert_eq!(
            class.kind,
            DeclarationKind::Type {
                form: TypeForm::Class
            }
        );
        assert_eq!(class.signature, "public class OrderService");
        assert_eq!(class.start_line, 7);
        assert_eq!(class.end_line, 26);
        assert!(class.parameters.is_empty());

        let doc = class.existing_doc.as_ref().unwrap();
        assert_eq!((doc.start_line, doc.end_line), (3, 6));
        assert_eq!(doc.fields.description, "Holds orders. Thread safe.");
    }

    #[test]
    fn test_method_record() {
        let records = JavaParser::new().parse(SAMPLE);
        let method = find(&records, "find");

        assert_eq!(method.return_type(), Some("Order"));
        assert_eq!(method.annotations, vec!["Override".to_string()]);
        assert_eq!(method.modifiers, vec!["public".to_string()]);
        assert_eq!(
            method.parameters,
            vec![Parameter::new("String", "id"), Parameter::new("int...", "flags")]
        );
        assert_eq!(method.signature, "public Order find(String id, int... flags)");
        assert_eq!(method.statements.len(), 1);
        assert_eq!(method.statements[0].kind, "return_statement");
        assert_eq!(method.start_line, 16);
        assert!(method.existing_doc.is_none());
    }

    #[test]
    fn test_constructor_and_nested() {
        let records = JavaParser::new().parse(SAMPLE);
        let ctor = records
            .iter()
            .find(|r| r.kind == DeclarationKind::Constructor)
            .unwrap();
        assert_eq!(ctor.signature, "public OrderService(Map<String, Order> orders)");

        let helper = find(&records, "helper");
        assert!(helper.modifiers.is_empty());
        assert_eq!(helper.parameters, vec![Parameter::new("String[]", "args")]);
        assert_eq!(helper.signature, "void helper(String[] args)");
    }

    #[test]
    fn test_interface_enum_record() {
        let source = "public interface Shape { double area(); }\nenum Color { RED }\npublic record Point(int x, int y) {}\n";
        let records = JavaParser::new().parse(source);
        let forms: Vec<_> = records
            .iter()
            .filter_map(|r| match r.kind {
                DeclarationKind::Type { form } => Some(form),
                _ => None,
            })
            .collect();
        assert_eq!(forms, vec![TypeForm::Interface, TypeForm::Enum, TypeForm::Record]);

        let area = find(&records, "area");
        assert_eq!(area.return_type(), Some("double"));
        assert!(area.statements.is_empty());
    }

    #[test]
    fn test_syntax_error_yields_empty() {
        let parser = JavaParser::new();
        assert!(parser.parse("public class { void (").is_empty());
        assert!(matches!(
            parser.try_parse("class A { void m( }"),
            Err(WeaveError::Parse { .. })
        ));
    }

    #[test]
    fn test_empty_source() {
        assert!(JavaParser::new().parse("").is_empty());
    }

    /// Index of the innermost earlier record enclosing each record
    fn parents(records: &[DeclarationRecord]) -> Vec<Option<usize>> {
        records
            .iter()
            .enumerate()
            .map(|(i, r)| {
                (0..i).rev().find(|&j| {
                    records[j].start_line <= r.start_line && r.end_line <= records[j].end_line
                })
            })
            .collect()
    }

    /// First pair of siblings whose line ranges touch or overlap
    fn overlapping_siblings(records: &[DeclarationRecord]) -> Option<(String, String)> {
        let parents = parents(records);
        for (i, a) in records.iter().enumerate() {
            for (j, b) in records.iter().enumerate().skip(i + 1) {
                if parents[i] == parents[j] && a.end_line >= b.start_line {
                    return Some((a.label(), b.label()));
                }
            }
        }
        None
    }

    #[test]
    fn test_sibling_ranges_are_disjoint() {
        let source = "public class Outer {
    public void first() {
        run();
    }

    static class Middle {
        void a() {}

        void b() {
            a();
        }

        static class Leaf {
            void c() {}
        }
    }

    public Outer() {
    }
}

interface Second {
    void d();
}
";
        let records = JavaParser::new().parse(source);
        assert_eq!(records.len(), 10);

        let parents = parents(&records);
        let parent_name = |name: &str| {
            let idx = records.iter().position(|r| r.name == name).unwrap();
            parents[idx].map(|p| records[p].name.clone())
        };
        assert_eq!(parent_name("c").as_deref(), Some("Leaf"));
        assert_eq!(parent_name("Leaf").as_deref(), Some("Middle"));
        assert_eq!(parent_name("b").as_deref(), Some("Middle"));
        assert_eq!(parent_name("Middle").as_deref(), Some("Outer"));
        assert_eq!(parent_name("Second"), None);

        assert_eq!(overlapping_siblings(&records), None);
    }

    fn member() -> impl Strategy<Value = &'static str> {
        prop_oneof![
            Just("    public int size() {\n        return 0;\n    }"),
            Just("    void run(String a) {\n        if (a == null) {\n            return;\n        }\n    }"),
            Just("    public Holder() {\n    }"),
            Just("    static class Inner {\n        void tick() {}\n\n        int tock() {\n            return 1;\n        }\n    }"),
            Just("    interface Listener {\n        void on();\n    }"),
            Just("    private int count;"),
        ]
    }

    proptest! {
        #[test]
        fn prop_parse_is_total(source in "(?s).{0,300}") {
            for record in JavaParser::new().parse(&source) {
                prop_assert!(record.start_line <= record.end_line);
                prop_assert!(!record.name.is_empty());
            }
        }

        #[test]
        fn prop_sibling_ranges_never_overlap(members in prop::collection::vec(member(), 0..8)) {
            let source = format!("public class Holder {{\n{}\n}}\n", members.join("\n\n"));
            let records = JavaParser::new().parse(&source);
            prop_assert!(!records.is_empty());
            prop_assert_eq!(overlapping_siblings(&records), None);
        }
    }
}
