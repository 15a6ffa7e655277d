//! Where each generated type lives, remembered across runs.
//!
//! The tracker is loaded once at the start of a run, mutated in memory while
//! files are placed, and written back in full by [`LocationTracker::save`].
//! It is an owned value passed explicitly to the planner; there is no global
//! instance.
//!
//! # Resolution
//!
//! [`LocationTracker::resolve`] picks a custom directory for a type, first
//! match wins:
//!
//! 1. a contract hint recorded under the type name itself;
//! 2. a contract hint under a case-normalized variant of the name
//!    (`Pet`/`pet`, `ModelCase`/`Case`/`case`, then any case-insensitive
//!    match);
//! 3. the directory recorded for the type on a previous run (skipped on a
//!    fresh run);
//! 4. none: the default location.

pub mod store;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::contract::ContractHints;

use self::store::{STORE_VERSION, StoreRead, TrackingFile};

/// Prefix the generator adds to schema names that clash with Java types.
const MODEL_PREFIX: &str = "Model";

/// Errors reading or writing the tracking store.
#[derive(Debug, Error)]
pub enum TrackingError {
    /// The store exists but could not be read.
    #[error("failed to read tracking store {}: {source}", path.display())]
    Read {
        /// Store location.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The store could not be written.
    #[error("failed to write tracking store {}: {source}", path.display())]
    Write {
        /// Store location.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The entries could not be encoded as JSON.
    #[error("failed to encode tracking store: {0}")]
    Serialize(#[source] serde_json::Error),
}

/// The recorded location of one generated type.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationEntry {
    /// Absolute path of the placed file.
    pub file_path: PathBuf,
    /// Fully-qualified package written into the file.
    pub package: String,
    /// Custom directory, or `None` for the default location.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_dir: Option<String>,
    /// Class name the generator declared (the file stem).
    pub java_class_name: String,
}

/// Which resolution step produced a [`Resolution`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResolutionOrigin {
    /// Hint recorded under the exact type name.
    ContractHint,
    /// Hint recorded under a normalized variant of the type name.
    NormalizedHint { schema: String },
    /// Directory recorded on a previous run.
    Tracked,
    /// No hint and no history.
    Default,
}

/// Outcome of [`LocationTracker::resolve`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Resolution {
    pub custom_dir: Option<String>,
    pub origin: ResolutionOrigin,
}

impl Resolution {
    const fn default_location() -> Self {
        Self {
            custom_dir: None,
            origin: ResolutionOrigin::Default,
        }
    }
}

/// Persistent map from type name to [`LocationEntry`].
#[derive(Debug)]
pub struct LocationTracker {
    path: Option<PathBuf>,
    organization: String,
    artifact_id: String,
    entries: BTreeMap<String, LocationEntry>,
}

impl LocationTracker {
    /// Load the store at `path` for the given project.
    ///
    /// A missing, empty or malformed store, or one recorded for a different
    /// organization or artifact, starts the tracker empty.
    ///
    /// # Errors
    /// Returns [`TrackingError::Read`] if the store exists but cannot be read.
    pub fn load(path: &Path, organization: &str, artifact_id: &str) -> Result<Self, TrackingError> {
        let mut tracker = Self::in_memory(organization, artifact_id);
        tracker.path = Some(path.to_owned());

        match store::read(path)? {
            StoreRead::Missing => {
                tracing::debug!(path = %path.display(), "no tracking store; starting empty");
            }
            StoreRead::Corrupt(reason) => {
                tracing::warn!(path = %path.display(), %reason, "tracking store is unreadable; starting empty");
            }
            StoreRead::Loaded(file) if file.organization != organization || file.artifact_id != artifact_id => {
                tracing::warn!(
                    path = %path.display(),
                    recorded = %format!("{}/{}", file.organization, file.artifact_id),
                    expected = %format!("{organization}/{artifact_id}"),
                    "tracking store belongs to another project; starting empty"
                );
            }
            StoreRead::Loaded(file) => {
                if file.version != STORE_VERSION {
                    tracing::debug!(version = %file.version, "reading tracking store of another version");
                }
                tracker.entries = file.models;
                tracing::debug!(path = %path.display(), entries = tracker.entries.len(), "loaded tracking store");
            }
        }
        Ok(tracker)
    }

    /// An empty tracker that is never persisted.
    #[must_use]
    pub fn in_memory(organization: &str, artifact_id: &str) -> Self {
        Self {
            path: None,
            organization: organization.to_owned(),
            artifact_id: artifact_id.to_owned(),
            entries: BTreeMap::new(),
        }
    }

    /// Choose the custom directory for `type_name`. See the module docs for
    /// the precedence.
    #[must_use]
    pub fn resolve(&self, type_name: &str, hints: &ContractHints, fresh_run: bool) -> Resolution {
        if let Some(dir) = hints.exact(type_name) {
            return Resolution {
                custom_dir: Some(dir.to_owned()),
                origin: ResolutionOrigin::ContractHint,
            };
        }

        if let Some((schema, dir)) = normalized_hint(type_name, hints) {
            return Resolution {
                custom_dir: Some(dir.to_owned()),
                origin: ResolutionOrigin::NormalizedHint {
                    schema: schema.to_owned(),
                },
            };
        }

        if !fresh_run
            && let Some(dir) = self.entries.get(type_name).and_then(|e| e.custom_dir.as_deref())
        {
            return Resolution {
                custom_dir: Some(dir.to_owned()),
                origin: ResolutionOrigin::Tracked,
            };
        }

        Resolution::default_location()
    }

    /// Record the final location of `type_name`, replacing any earlier entry.
    pub fn record(&mut self, type_name: &str, entry: LocationEntry) {
        tracing::trace!(type_name, package = %entry.package, "recorded location");
        self.entries.insert(type_name.to_owned(), entry);
    }

    #[must_use]
    pub fn get(&self, type_name: &str) -> Option<&LocationEntry> {
        self.entries.get(type_name)
    }

    /// All entries keyed by type name.
    #[must_use]
    pub const fn entries(&self) -> &BTreeMap<String, LocationEntry> {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Write every entry back to the store. A no-op for in-memory trackers.
    ///
    /// # Errors
    /// Returns [`TrackingError`] if the store cannot be written.
    pub fn save(&self) -> Result<(), TrackingError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let file = TrackingFile {
            version: STORE_VERSION.to_owned(),
            organization: self.organization.clone(),
            artifact_id: self.artifact_id.clone(),
            models: self.entries.clone(),
        };
        store::write_atomic(path, &file)?;
        tracing::debug!(path = %path.display(), entries = self.entries.len(), "saved tracking store");
        Ok(())
    }
}

/// True when the project's generated-source root does not exist yet, so every
/// type is treated as new regardless of tracker history.
#[must_use]
pub fn is_fresh_run(source_root: &Path) -> bool {
    !source_root.is_dir()
}

fn normalized_hint<'h>(type_name: &str, hints: &'h ContractHints) -> Option<(&'h str, &'h str)> {
    let mut candidates = vec![lower_camel(type_name), upper_camel(type_name)];
    let unprefixed = type_name
        .strip_prefix(MODEL_PREFIX)
        .filter(|rest| !rest.is_empty());
    if let Some(rest) = unprefixed {
        candidates.push(rest.to_owned());
        candidates.push(lower_camel(rest));
    }

    for candidate in candidates.iter().filter(|c| c.as_str() != type_name) {
        if let Some(found) = hints.iter().find(|(schema, _)| *schema == candidate.as_str()) {
            return Some(found);
        }
    }

    hints.iter().find(|(schema, _)| {
        schema.eq_ignore_ascii_case(type_name) || unprefixed.is_some_and(|rest| schema.eq_ignore_ascii_case(rest))
    })
}

/// `pet` → `Pet`.
#[must_use]
pub fn upper_camel(name: &str) -> String {
    let mut chars = name.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

/// `Pet` → `pet`.
#[must_use]
pub fn lower_camel(name: &str) -> String {
    let mut chars = name.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_lowercase().chain(chars).collect()
    })
}
