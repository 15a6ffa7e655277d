//! Customization-preserving merge of regenerated Java sources.
//!
//! Two layers:
//!
//! - **splice**: apply byte-range replacements against an immutable base text.
//! - **engine**: match generated and existing members by signature and splice
//!   the existing declarations into the generated file.
//!
//! Parsing lives in the `jregen-java` crate; this module never looks at a
//! source file except through its member list.

pub mod engine;
pub mod splice;

pub use engine::{AmbiguousSignature, MergeOutcome, merge, merge_sources};
pub use splice::{SpliceEdit, apply_edits};
