//! Outcome of one placement run.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::PlacementError;
use crate::layout::FileKind;
use crate::merge::AmbiguousSignature;

/// What happened to a placed file's target.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PlacementAction {
    /// Nothing existed; the generated file was written.
    Created,
    /// An existing customized file was merged with the generated one.
    Merged {
        /// Number of members whose existing declaration was kept.
        preserved: usize,
    },
    /// An existing file was replaced because merging is disabled.
    Overwritten,
    /// The target already had exactly the resulting content; not written.
    Unchanged,
}

impl fmt::Display for PlacementAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created => write!(f, "created"),
            Self::Merged { preserved } => write!(f, "merged ({preserved} preserved)"),
            Self::Overwritten => write!(f, "overwritten"),
            Self::Unchanged => write!(f, "unchanged"),
        }
    }
}

/// One generated Java file that was placed in the project.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlacedFile {
    /// Type name (file stem).
    pub type_name: String,
    pub kind: FileKind,
    /// Where the file now lives.
    pub path: PathBuf,
    /// Package declared in the placed file; `None` for untyped sources.
    pub package: Option<String>,
    pub custom_dir: Option<String>,
    pub action: PlacementAction,
    /// Stale copies removed after the write.
    pub removed: Vec<PathBuf>,
    /// Duplicate-signature warnings raised while merging.
    pub ambiguous: Vec<AmbiguousSignature>,
}

/// A per-file failure, attributed to the type or path it concerned.
#[derive(Debug)]
pub struct FileFailure {
    /// Type name, or the generator-relative path for untyped files.
    pub subject: String,
    pub error: PlacementError,
}

impl FileFailure {
    #[must_use]
    pub fn path(&self) -> &Path {
        self.error.path()
    }
}

impl fmt::Display for FileFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.subject, self.error)
    }
}

/// Everything a run did, and everything that went wrong.
#[derive(Debug, Default)]
pub struct PlacementReport {
    /// The project had no generated-source root before this run.
    pub fresh_run: bool,
    pub placed: Vec<PlacedFile>,
    /// Support files copied into the project.
    pub copied: Vec<PathBuf>,
    /// Files whose imports were rewritten by propagation.
    pub imports_updated: Vec<PathBuf>,
    pub failures: Vec<FileFailure>,
}

impl PlacementReport {
    /// True when no file failed.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Placed files whose target was actually written.
    pub fn written(&self) -> impl Iterator<Item = &PlacedFile> {
        self.placed
            .iter()
            .filter(|p| p.action != PlacementAction::Unchanged)
    }

    pub(crate) fn fail(&mut self, subject: impl Into<String>, error: PlacementError) {
        let subject = subject.into();
        tracing::warn!(%subject, error = %error, "placement failed");
        self.failures.push(FileFailure { subject, error });
    }
}

impl fmt::Display for PlacementReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let merged = self
            .placed
            .iter()
            .filter(|p| matches!(p.action, PlacementAction::Merged { .. }))
            .count();
        write!(
            f,
            "{} placed ({} written, {merged} merged), {} support file(s) copied, {} import update(s), {} failure(s)",
            self.placed.len(),
            self.written().count(),
            self.copied.len(),
            self.imports_updated.len(),
            self.failures.len(),
        )
    }
}
