//! Error types for placement runs.
//!
//! Per-file problems ([`PlacementError`]) are collected into the run report
//! and never abort a batch. Run-level problems ([`RelocateError`]) stop the
//! run before any file is touched.

use std::io;
use std::path::PathBuf;

use jregen_java::ParseError;
use thiserror::Error;

/// A failure confined to one file. The batch continues past it.
#[derive(Debug, Error)]
pub enum PlacementError {
    /// A generated or existing source could not be parsed, so it was not merged.
    #[error("{}: {source}", path.display())]
    Parse {
        /// File that failed to parse.
        path: PathBuf,
        /// Underlying parser error.
        #[source]
        source: ParseError,
    },

    /// Reading, writing or removing a file failed.
    #[error("{}: {source}", path.display())]
    Io {
        /// File the operation was attempted on.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
}

impl PlacementError {
    /// Build an [`PlacementError::Io`] for `path`.
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// The file this error concerns.
    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::Parse { path, .. } | Self::Io { path, .. } => path,
        }
    }
}

/// An unrecoverable problem with the run as a whole.
#[derive(Debug, Error)]
pub enum RelocateError {
    /// The generator output directory does not exist or is not a directory.
    #[error("generated source directory not found: {}", path.display())]
    GeneratedTreeMissing {
        /// Expected directory.
        path: PathBuf,
    },

    /// The output directory could not be made absolute.
    #[error("cannot resolve output directory {}: {source}", path.display())]
    OutputRoot {
        /// Directory as given.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The generator output directory could not be listed.
    #[error("failed to scan {}: {source}", path.display())]
    Scan {
        /// Directory being scanned.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
}
