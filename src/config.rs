//! Project configuration (`.jregen/config.toml`).
//!
//! Every field has a default, so a missing file is the same as an empty one.
//! Unknown keys are rejected so typos surface instead of being ignored.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::contract::DEFAULT_DIR_EXTENSION;
use crate::layout::ProjectLayout;

/// Directory holding configuration and tracking state, relative to the
/// output project root.
pub const STATE_DIR: &str = ".jregen";

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JregenConfig {
    #[serde(default)]
    pub project: ProjectConfig,

    #[serde(default)]
    pub tracking: TrackingConfig,

    #[serde(default)]
    pub contract: ContractConfig,

    #[serde(default)]
    pub merge: MergeConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

impl JregenConfig {
    /// Default config path under an output project root.
    #[must_use]
    pub fn default_path(root: &Path) -> PathBuf {
        root.join(STATE_DIR).join("config.toml")
    }

    /// Package layout described by `[project]`.
    #[must_use]
    pub fn layout(&self) -> ProjectLayout {
        ProjectLayout::new(
            self.project.root_package(),
            self.project.model_package.clone(),
            self.project.api_package.clone(),
        )
    }

    /// Tracking store path, resolved against `root` when relative.
    #[must_use]
    pub fn tracking_path(&self, root: &Path) -> PathBuf {
        if self.tracking.file.is_absolute() {
            self.tracking.file.clone()
        } else {
            root.join(&self.tracking.file)
        }
    }
}

// ---------------------------------------------------------------------------
// ProjectConfig
// ---------------------------------------------------------------------------

/// Identity and package names of the generated project.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    /// Organization identifier (default: `"example"`).
    #[serde(default = "default_organization")]
    pub organization: String,

    /// Artifact identifier (default: `"service"`).
    #[serde(default = "default_artifact_id")]
    pub artifact_id: String,

    /// Root package. Defaults to `com.<organization>.<artifact_id>`.
    #[serde(default)]
    pub base_package: Option<String>,

    /// Model sub-package (default: `"model"`).
    #[serde(default = "default_model_package")]
    pub model_package: String,

    /// API sub-package (default: `"api"`).
    #[serde(default = "default_api_package")]
    pub api_package: String,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            organization: default_organization(),
            artifact_id: default_artifact_id(),
            base_package: None,
            model_package: default_model_package(),
            api_package: default_api_package(),
        }
    }
}

impl ProjectConfig {
    /// The configured root package, or `com.<organization>.<artifact_id>`.
    #[must_use]
    pub fn root_package(&self) -> String {
        self.base_package
            .clone()
            .unwrap_or_else(|| format!("com.{}.{}", self.organization, self.artifact_id))
    }
}

fn default_organization() -> String {
    "example".to_owned()
}

fn default_artifact_id() -> String {
    "service".to_owned()
}

fn default_model_package() -> String {
    "model".to_owned()
}

fn default_api_package() -> String {
    "api".to_owned()
}

// ---------------------------------------------------------------------------
// TrackingConfig
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TrackingConfig {
    /// Tracking store location, relative to the output root
    /// (default: `.jregen/tracking.json`).
    #[serde(default = "default_tracking_file")]
    pub file: PathBuf,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            file: default_tracking_file(),
        }
    }
}

fn default_tracking_file() -> PathBuf {
    Path::new(STATE_DIR).join("tracking.json")
}

// ---------------------------------------------------------------------------
// ContractConfig
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContractConfig {
    /// Schema extension key carrying the custom directory (default: `"x-qi-dir"`).
    #[serde(default = "default_dir_extension")]
    pub dir_extension: String,
}

impl Default for ContractConfig {
    fn default() -> Self {
        Self {
            dir_extension: default_dir_extension(),
        }
    }
}

fn default_dir_extension() -> String {
    DEFAULT_DIR_EXTENSION.to_owned()
}

// ---------------------------------------------------------------------------
// MergeConfig
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MergeConfig {
    /// Merge existing customized files instead of overwriting them
    /// (default: `true`).
    #[serde(default = "default_preserve_customizations")]
    pub preserve_customizations: bool,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            preserve_customizations: default_preserve_customizations(),
        }
    }
}

const fn default_preserve_customizations() -> bool {
    true
}

// ---------------------------------------------------------------------------
// OutputConfig
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    /// What to do with non-Java files in the generator output.
    #[serde(default)]
    pub support_files: SupportFilePolicy,
}

/// Handling of non-Java generator output (build files, README, metadata).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SupportFilePolicy {
    /// Never copy support files.
    Skip,
    /// Copy support files that do not exist yet in the project.
    #[default]
    CreateMissing,
    /// Always copy support files over the project's copies.
    Overwrite,
}

impl fmt::Display for SupportFilePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Skip => write!(f, "skip"),
            Self::CreateMissing => write!(f, "create-missing"),
            Self::Overwrite => write!(f, "overwrite"),
        }
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Error loading a configuration file.
#[derive(Debug)]
pub struct ConfigError {
    /// The path that was being loaded (if available).
    pub path: Option<PathBuf>,
    /// Human-readable message with line-level detail when possible.
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(p) = &self.path {
            write!(f, "{}: {}", p.display(), self.message)
        } else {
            write!(f, "config error: {}", self.message)
        }
    }
}

impl std::error::Error for ConfigError {}

impl JregenConfig {
    /// Load configuration from a TOML file.
    ///
    /// A missing file yields all defaults.
    ///
    /// # Errors
    /// Returns `ConfigError` on I/O errors (other than not-found) or parse errors.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file; using defaults");
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(ConfigError {
                    path: Some(path.to_owned()),
                    message: format!("could not read file: {e}"),
                });
            }
        };
        Self::parse(&contents).map_err(|mut e| {
            e.path = Some(path.to_owned());
            e
        })
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    /// Returns `ConfigError` on invalid TOML or unknown fields.
    pub fn parse(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| {
            let mut message = e.message().to_owned();
            if let Some(span) = e.span() {
                let line = toml_str[..span.start].chars().filter(|&c| c == '\n').count() + 1;
                message = format!("line {line}: {message}");
            }
            ConfigError { path: None, message }
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
