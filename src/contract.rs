//! Per-schema placement hints read from the API contract.
//!
//! Only one thing is read from the contract: for each named schema, the
//! string value of a custom-directory extension field (`x-qi-dir` unless
//! configured otherwise). OpenAPI 3 documents keep schemas under
//! `components.schemas`, Swagger 2 documents under `definitions`; both are
//! scanned. JSON contracts are read by the YAML parser as-is.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde_yaml::Value;
use thiserror::Error;

/// Extension key used when none is configured.
pub const DEFAULT_DIR_EXTENSION: &str = "x-qi-dir";

/// Errors reading a contract document.
#[derive(Debug, Error)]
pub enum ContractError {
    /// The contract file could not be read.
    #[error("failed to read contract {}: {source}", path.display())]
    Io {
        /// Contract file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The contract is not valid YAML or JSON.
    #[error("failed to parse contract {}: {source}", path.display())]
    Parse {
        /// Contract file.
        path: PathBuf,
        /// Parser error, with line and column when available.
        #[source]
        source: serde_yaml::Error,
    },
}

/// Schema name → custom directory.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ContractHints {
    dirs: BTreeMap<String, String>,
}

impl ContractHints {
    /// No hints; every type goes to its tracked or default location.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Read hints from the contract at `path`.
    ///
    /// # Errors
    /// Returns [`ContractError`] if the file cannot be read or parsed.
    pub fn load(path: &Path, extension: &str) -> Result<Self, ContractError> {
        let text = fs::read_to_string(path).map_err(|source| ContractError::Io {
            path: path.to_owned(),
            source,
        })?;
        let hints = Self::parse(&text, extension).map_err(|source| ContractError::Parse {
            path: path.to_owned(),
            source,
        })?;
        tracing::debug!(path = %path.display(), hints = hints.len(), "loaded contract hints");
        Ok(hints)
    }

    /// Read hints from contract text.
    ///
    /// # Errors
    /// Returns the parser error if `text` is neither YAML nor JSON.
    pub fn parse(text: &str, extension: &str) -> Result<Self, serde_yaml::Error> {
        let document: Value = serde_yaml::from_str(text)?;
        Ok(Self::from_document(&document, extension))
    }

    /// Collect hints from an already parsed document.
    #[must_use]
    pub fn from_document(document: &Value, extension: &str) -> Self {
        let schema_maps = [
            document.get("components").and_then(|c| c.get("schemas")),
            document.get("definitions"),
        ];

        let mut dirs = BTreeMap::new();
        for schemas in schema_maps.into_iter().flatten() {
            let Some(schemas) = schemas.as_mapping() else {
                continue;
            };
            for (name, schema) in schemas {
                let (Some(name), Some(dir)) = (
                    name.as_str(),
                    schema.get(extension).and_then(Value::as_str),
                ) else {
                    continue;
                };
                if dir.trim().is_empty() {
                    continue;
                }
                dirs.entry(name.to_owned()).or_insert_with(|| dir.trim().to_owned());
            }
        }
        Self { dirs }
    }

    /// Build hints directly from `(schema, dir)` pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            dirs: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Hint recorded under exactly `schema`.
    #[must_use]
    pub fn exact(&self, schema: &str) -> Option<&str> {
        self.dirs.get(schema).map(String::as_str)
    }

    /// All `(schema, dir)` pairs in schema-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.dirs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.dirs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dirs.is_empty()
    }
}
