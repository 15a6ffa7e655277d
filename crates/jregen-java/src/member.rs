//! Member declarations extracted from a parsed Java file.

use std::fmt;
use std::ops::Range;

/// The kind of member a [`MemberDeclaration`] was extracted from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MemberKind {
    /// A `method_declaration` node (including abstract and interface methods).
    Method,
    /// A `constructor_declaration` node.
    Constructor,
}

impl fmt::Display for MemberKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Method => write!(f, "method"),
            Self::Constructor => write!(f, "constructor"),
        }
    }
}

/// One method or constructor found in a source file.
///
/// `range` comes from the parser's node boundaries and covers the whole
/// declaration including its annotations and modifiers. Javadoc comments sit
/// outside the node and are therefore not part of the range.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemberDeclaration {
    /// Method or constructor.
    pub kind: MemberKind,
    /// Simple name (`getId`, or the class name for constructors).
    pub name: String,
    /// Keyword modifiers in source order (`public`, `static`, ...).
    pub modifiers: Vec<String>,
    /// Annotations in source order, full text (`@Override`, `@JsonProperty("id")`).
    pub annotations: Vec<String>,
    /// Return type text; empty for constructors.
    pub return_type: String,
    /// Parameter texts in source order (`final String name`, `int... ids`).
    pub parameters: Vec<String>,
    /// Body text including braces; empty for abstract and interface methods.
    pub body: String,
    /// Byte range of the declaration within the parsed source.
    pub range: Range<usize>,
    /// Full source text of the declaration (`source[range]`).
    pub source_text: String,
}

impl MemberDeclaration {
    /// Identity of this member for merge matching.
    ///
    /// Modifiers, return type, name and parameter list, with whitespace runs
    /// collapsed. Annotations and body never take part, so two declarations
    /// that differ only there are the same member.
    #[must_use]
    pub fn signature(&self) -> String {
        let params = self
            .parameters
            .iter()
            .map(|p| squash_whitespace(p))
            .collect::<Vec<_>>()
            .join(", ");
        let callable = format!("{}({params})", self.name);

        let mut parts: Vec<String> = Vec::with_capacity(3);
        if !self.modifiers.is_empty() {
            parts.push(self.modifiers.join(" "));
        }
        let return_type = squash_whitespace(&self.return_type);
        if !return_type.is_empty() {
            parts.push(return_type);
        }
        parts.push(callable);
        parts.join(" ")
    }

    /// Start byte of the declaration.
    #[must_use]
    pub const fn start_byte(&self) -> usize {
        self.range.start
    }

    /// End byte (exclusive) of the declaration.
    #[must_use]
    pub const fn end_byte(&self) -> usize {
        self.range.end
    }
}

impl fmt::Display for MemberDeclaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} `{}`", self.kind, self.signature())
    }
}

/// Collapse every run of whitespace to a single space and trim the ends.
pub(crate) fn squash_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
