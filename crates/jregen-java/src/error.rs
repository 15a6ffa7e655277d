//! Error types for Java parsing.
//!
//! A [`ParseError`] is fatal for the file it was raised for: callers must not
//! fall back to a partial member list, since a silently dropped member would
//! corrupt the merge.

use thiserror::Error;

/// Errors returned by [`parse`](crate::parse::parse).
#[derive(Debug, Error)]
pub enum ParseError {
    /// The Java grammar could not be loaded into the parser (ABI mismatch).
    #[error("failed to load the Java grammar: {0}")]
    Language(#[from] tree_sitter::LanguageError),

    /// tree-sitter returned no tree at all.
    #[error("tree-sitter produced no syntax tree")]
    NoTree,

    /// The source contains a syntax error or a missing token.
    #[error("syntax error at line {line}, column {column}: {snippet}")]
    Syntax {
        /// 1-based line of the first offending node.
        line: usize,
        /// 1-based column of the first offending node.
        column: usize,
        /// Up to one line of source text at the error position.
        snippet: String,
    },
}
