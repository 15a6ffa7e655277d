//! Java source parsing for jregen.
//!
//! This crate is the only place that talks to tree-sitter. Everything else in
//! jregen programs against [`MemberDeclaration`] values and byte ranges.
//!
//! # Crate layout
//!
//! - [`parse`]: [`parse`](parse::parse) a source text into a [`ParsedSource`]
//!   and extract its member declarations in document order.
//! - [`member`]: the [`MemberDeclaration`] value type and its signature.
//! - [`error`]: the [`ParseError`] enum.

pub mod error;
pub mod member;
pub mod parse;

pub use error::ParseError;
pub use member::{MemberDeclaration, MemberKind};
pub use parse::{ParsedSource, extract_members, parse};
