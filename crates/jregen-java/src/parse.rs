//! tree-sitter parsing and member extraction.
//!
//! [`parse`] rejects any source whose tree contains an error or missing node.
//! [`ParsedSource::members`] then walks the whole tree depth-first in
//! document order and returns every method and constructor, including those
//! of nested and anonymous classes.

use tree_sitter::{Language, Node, Parser, Tree};

use crate::error::ParseError;
use crate::member::{MemberDeclaration, MemberKind};

/// Node kinds that count as parameters inside `formal_parameters`.
const PARAMETER_KINDS: &[&str] = &["formal_parameter", "spread_parameter", "receiver_parameter"];

/// Node kinds inside `modifiers` that are annotations rather than keywords.
const ANNOTATION_KINDS: &[&str] = &["marker_annotation", "annotation"];

/// Comment kinds (extras) that may appear between modifiers.
const COMMENT_KINDS: &[&str] = &["line_comment", "block_comment", "comment"];

/// Longest snippet quoted in a [`ParseError::Syntax`].
const MAX_SNIPPET: usize = 80;

/// A successfully parsed Java source text.
pub struct ParsedSource<'a> {
    text: &'a str,
    tree: Tree,
}

/// Parse Java source text.
///
/// # Errors
/// Returns [`ParseError::Syntax`] if the tree contains an error or missing
/// node, and [`ParseError::Language`] / [`ParseError::NoTree`] if tree-sitter
/// itself fails.
pub fn parse(text: &str) -> Result<ParsedSource<'_>, ParseError> {
    let language: Language = tree_sitter_java::LANGUAGE.into();
    let mut parser = Parser::new();
    parser.set_language(&language)?;

    let tree = parser.parse(text, None).ok_or(ParseError::NoTree)?;
    let root = tree.root_node();
    if root.has_error() {
        let offending = first_error(root).unwrap_or(root);
        let position = offending.start_position();
        return Err(ParseError::Syntax {
            line: position.row + 1,
            column: position.column + 1,
            snippet: snippet_at(text, offending.start_byte()),
        });
    }

    Ok(ParsedSource { text, tree })
}

/// Parse `text` and return its member declarations.
///
/// # Errors
/// Same as [`parse`].
pub fn extract_members(text: &str) -> Result<Vec<MemberDeclaration>, ParseError> {
    parse(text).map(|parsed| parsed.members())
}

impl<'a> ParsedSource<'a> {
    /// Every method and constructor in the tree, depth-first, document order.
    #[must_use]
    pub fn members(&self) -> Vec<MemberDeclaration> {
        let mut members = Vec::new();
        let mut stack = vec![self.tree.root_node()];

        while let Some(node) = stack.pop() {
            if let Some(kind) = member_kind(node.kind()) {
                members.push(self.member(node, kind));
            }
            let mut cursor = node.walk();
            let children: Vec<Node<'_>> = node.children(&mut cursor).collect();
            stack.extend(children.into_iter().rev());
        }

        tracing::trace!(count = members.len(), "extracted member declarations");
        members
    }

    fn member(&self, node: Node<'_>, kind: MemberKind) -> MemberDeclaration {
        let mut modifiers = Vec::new();
        let mut annotations = Vec::new();

        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            if child.kind() != "modifiers" {
                continue;
            }
            let mut inner = child.walk();
            for modifier in child.children(&mut inner) {
                let kind = modifier.kind();
                if ANNOTATION_KINDS.contains(&kind) {
                    annotations.push(self.node_text(modifier).to_owned());
                } else if !COMMENT_KINDS.contains(&kind) {
                    modifiers.push(self.node_text(modifier).to_owned());
                }
            }
        }

        let field_text = |field: &str| {
            node.child_by_field_name(field)
                .map(|n| self.node_text(n).to_owned())
                .unwrap_or_default()
        };

        let parameters = node
            .child_by_field_name("parameters")
            .map(|list| {
                let mut cursor = list.walk();
                list.named_children(&mut cursor)
                    .filter(|p| PARAMETER_KINDS.contains(&p.kind()))
                    .map(|p| self.node_text(p).to_owned())
                    .collect()
            })
            .unwrap_or_default();

        let return_type = match kind {
            MemberKind::Method => field_text("type"),
            MemberKind::Constructor => String::new(),
        };

        MemberDeclaration {
            kind,
            name: field_text("name"),
            modifiers,
            annotations,
            return_type,
            parameters,
            body: field_text("body"),
            range: node.start_byte()..node.end_byte(),
            source_text: self.node_text(node).to_owned(),
        }
    }

    fn node_text(&self, node: Node<'_>) -> &'a str {
        self.text.get(node.byte_range()).unwrap_or("")
    }
}

fn member_kind(kind: &str) -> Option<MemberKind> {
    match kind {
        "method_declaration" => Some(MemberKind::Method),
        "constructor_declaration" => Some(MemberKind::Constructor),
        _ => None,
    }
}

/// First error or missing node in document order.
fn first_error(node: Node<'_>) -> Option<Node<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    let mut cursor = node.walk();
    let children: Vec<Node<'_>> = node.children(&mut cursor).collect();
    children
        .into_iter()
        .filter(|child| child.has_error() || child.is_missing())
        .find_map(first_error)
}

fn snippet_at(text: &str, offset: usize) -> String {
    let start = text[..offset.min(text.len())]
        .rfind('\n')
        .map_or(0, |i| i + 1);
    let line = text[start..].lines().next().unwrap_or("").trim();
    line.chars().take(MAX_SNIPPET).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_simple_method() {
        let source = r#"
package com.test;

public class Test {
    public void simpleMethod() {
        System.out.println("Hello");
    }
}
"#;
        let members = extract_members(source).unwrap();
        assert_eq!(members.len(), 1);
        let m = &members[0];
        assert_eq!(m.kind, MemberKind::Method);
        assert_eq!(m.name, "simpleMethod");
        assert_eq!(m.modifiers, vec!["public"]);
        assert_eq!(m.return_type, "void");
        assert!(m.parameters.is_empty());
        assert!(m.body.contains("System.out.println"));
        assert_eq!(m.signature(), "public void simpleMethod()");
    }

    #[test]
    fn annotations_are_split_from_modifiers() {
        let source = r#"
public class Pet {
    @Override
    @JsonProperty("name")
    public final String toString() {
        return "Pet";
    }
}
"#;
        let members = extract_members(source).unwrap();
        assert_eq!(members.len(), 1);
        let m = &members[0];
        assert_eq!(m.annotations, vec!["@Override", "@JsonProperty(\"name\")"]);
        assert_eq!(m.modifiers, vec!["public", "final"]);
        assert_eq!(m.return_type, "String");
        assert!(m.source_text.starts_with("@Override"));
    }

    #[test]
    fn complex_signature_keeps_generics_and_arrays() {
        let source = r"
public class Test {
    public List<String> complexMethod(Map<String, Object> param1, int[] param2) throws Exception {
        return Collections.emptyList();
    }
}
";
        let members = extract_members(source).unwrap();
        assert_eq!(
            members[0].signature(),
            "public List<String> complexMethod(Map<String, Object> param1, int[] param2)"
        );
    }

    #[test]
    fn constructors_and_varargs_are_extracted() {
        let source = r"
public class Pet {
    private final long id;

    public Pet(long id, String... tags) {
        this.id = id;
    }

    public Pet() {
        this(0L);
    }
}
";
        let members = extract_members(source).unwrap();
        assert_eq!(members.len(), 2);
        assert_eq!(members[0].kind, MemberKind::Constructor);
        assert_eq!(members[0].return_type, "");
        assert_eq!(members[0].parameters, vec!["long id", "String... tags"]);
        assert_eq!(members[0].signature(), "public Pet(long id, String... tags)");
        assert_eq!(members[1].signature(), "public Pet()");
    }

    #[test]
    fn interface_methods_have_empty_bodies() {
        let source = r"
public interface PetApi {
    ResponseEntity<Pet> getPetById(@PathVariable Long petId);

    default Optional<NativeWebRequest> getRequest() {
        return Optional.empty();
    }
}
";
        let members = extract_members(source).unwrap();
        assert_eq!(members.len(), 2);
        assert_eq!(members[0].name, "getPetById");
        assert_eq!(members[0].body, "");
        assert_eq!(members[0].parameters, vec!["@PathVariable Long petId"]);
        assert_eq!(members[1].modifiers, vec!["default"]);
    }

    #[test]
    fn members_are_in_document_order_including_nested_types() {
        let source = r"
public class Outer {
    public void first() {}

    static class Inner {
        void inner() {}
    }

    public void last() {
        Runnable r = new Runnable() {
            public void run() {}
        };
    }
}
";
        let names: Vec<String> = extract_members(source)
            .unwrap()
            .into_iter()
            .map(|m| m.name)
            .collect();
        assert_eq!(names, vec!["first", "inner", "last", "run"]);
    }

    #[test]
    fn ranges_come_from_nodes_not_text_search() {
        // `getName` appears inside another method's body before its own declaration.
        let source = r#"
public class Pet {
    public String describe() {
        return "getName() is " + getName();
    }

    public String getName() {
        return "rex";
    }
}
"#;
        let members = extract_members(source).unwrap();
        let get_name = members.iter().find(|m| m.name == "getName").unwrap();
        assert!(source[get_name.range.clone()].starts_with("public String getName()"));
        assert_eq!(&source[get_name.range.clone()], get_name.source_text);

        let describe = members.iter().find(|m| m.name == "describe").unwrap();
        assert!(describe.end_byte() <= get_name.start_byte());
    }

    #[test]
    fn sibling_ranges_do_not_overlap() {
        let source = r"
public class A {
    void a() { int x = 1; }
    void b() { int y = 2; }
    void c() { int z = 3; }
}
";
        let members = extract_members(source).unwrap();
        for pair in members.windows(2) {
            assert!(pair[0].end_byte() <= pair[1].start_byte());
        }
    }

    #[test]
    fn malformed_source_is_a_syntax_error() {
        let source = "public class Broken {\n    void f( {\n    }\n";
        let err = extract_members(source).unwrap_err();
        match err {
            ParseError::Syntax { line, column, .. } => {
                assert!((1..=4).contains(&line), "line was {line}");
                assert!(column >= 1);
            }
            other => panic!("expected syntax error, got {other:?}"),
        }
    }

    #[test]
    fn empty_source_parses_to_no_members() {
        assert!(extract_members("").unwrap().is_empty());
    }
}
