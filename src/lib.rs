//! jregen library crate.
//!
//! Places freshly generated Java sources into a project while keeping
//! developer customizations and custom package locations intact. The `jregen`
//! binary is a thin command layer over these modules; integration tests use
//! them directly.

pub mod config;
pub mod contract;
pub mod error;
pub mod layout;
pub mod merge;
pub mod package;
pub mod relocate;
pub mod tracking;

pub use jregen_java::{MemberDeclaration, MemberKind, ParseError};

// Binary-only modules (commands, telemetry) live under main.rs.
