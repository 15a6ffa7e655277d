//! Import statement rewriting.
//!
//! Rewrites are line-based. A rewritten line keeps its indentation, anything
//! after the semicolon (usually a comment) and its line ending. Static imports
//! and wildcard imports are never touched by map-driven rewriting, and only
//! imports under the project's root package are considered at all.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use crate::contract::ContractHints;
use crate::error::PlacementError;
use crate::package::resolve_package;
use crate::tracking::{LocationTracker, upper_camel};

/// Simple type name → package it currently lives in.
///
/// A name maps to at most one package. The first insertion wins, so callers
/// insert the authoritative source first.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ImportRewriteMap {
    packages: BTreeMap<String, String>,
}

impl ImportRewriteMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Union of the tracker's recorded packages and, for types not yet
    /// tracked, the packages implied by contract hints under `model_base`.
    ///
    /// Types in `unplaced` failed to land this run; their hints are ignored
    /// so imports never point at a package the type is not in.
    #[must_use]
    pub fn build(
        tracker: &LocationTracker,
        hints: &ContractHints,
        model_base: &str,
        unplaced: &BTreeSet<String>,
    ) -> Self {
        let mut map = Self::new();
        for entry in tracker.entries().values() {
            map.insert(&entry.java_class_name, &entry.package);
        }
        for (schema, dir) in hints.iter() {
            let type_name = upper_camel(schema);
            if unplaced.contains(&type_name) {
                continue;
            }
            map.insert(&type_name, &resolve_package(model_base, Some(dir)));
        }
        map
    }

    /// Insert `type_name → package` unless the name is already mapped.
    /// Returns whether the entry was added.
    pub fn insert(&mut self, type_name: &str, package: &str) -> bool {
        if type_name.is_empty() || self.packages.contains_key(type_name) {
            return false;
        }
        self.packages.insert(type_name.to_owned(), package.to_owned());
        true
    }

    #[must_use]
    pub fn get(&self, type_name: &str) -> Option<&str> {
        self.packages.get(type_name).map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.packages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}

/// Files touched by [`propagate_imports`].
#[derive(Debug, Default)]
pub struct PropagationOutcome {
    /// Files that were rewritten, in the order they were visited.
    pub modified: Vec<PathBuf>,
    /// Files that could not be read or written.
    pub failures: Vec<PlacementError>,
}

impl PropagationOutcome {
    /// Number of files rewritten.
    #[must_use]
    pub fn count(&self) -> usize {
        self.modified.len()
    }
}

/// Rewrite imports in `source` that reference a mapped type under a package
/// other than its current one.
///
/// Returns `None` when nothing changed, so callers can skip the write.
#[must_use]
pub fn rewrite_imports(source: &str, project_root: &str, map: &ImportRewriteMap) -> Option<String> {
    let prefix = format!("{project_root}.");
    let mut out = String::with_capacity(source.len());
    let mut changed = false;

    for chunk in source.split_inclusive('\n') {
        let (content, eol) = split_eol(chunk);
        let replacement = ImportLine::parse(content)
            .filter(|import| !import.is_static && !import.wildcard && import.path.starts_with(&prefix))
            .and_then(|import| {
                let current = import.package()?;
                let wanted = map.get(import.simple_name())?;
                (current != wanted).then(|| import.retarget(wanted))
            });

        if let Some(line) = replacement {
            changed = true;
            out.push_str(&line);
            out.push_str(eol);
        } else {
            out.push_str(chunk);
        }
    }

    changed.then_some(out)
}

/// Apply [`rewrite_imports`] to every file in `files`, writing only those that
/// change. An unreadable or unwritable file is recorded and skipped.
pub fn propagate_imports(files: &[PathBuf], project_root: &str, map: &ImportRewriteMap) -> PropagationOutcome {
    let mut outcome = PropagationOutcome::default();
    if map.is_empty() {
        return outcome;
    }

    for path in files {
        match propagate_one(path, project_root, map) {
            Ok(true) => {
                tracing::info!(path = %path.display(), "updated imports");
                outcome.modified.push(path.clone());
            }
            Ok(false) => {}
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "import update failed");
                outcome.failures.push(err);
            }
        }
    }
    outcome
}

fn propagate_one(path: &Path, project_root: &str, map: &ImportRewriteMap) -> Result<bool, PlacementError> {
    let source = fs::read_to_string(path).map_err(|e| PlacementError::io(path, e))?;
    let Some(rewritten) = rewrite_imports(&source, project_root, map) else {
        return Ok(false);
    };
    fs::write(path, rewritten).map_err(|e| PlacementError::io(path, e))?;
    Ok(true)
}

/// Split a line produced by `split_inclusive('\n')` into content and ending.
pub(crate) fn split_eol(chunk: &str) -> (&str, &str) {
    if let Some(content) = chunk.strip_suffix("\r\n") {
        (content, "\r\n")
    } else if let Some(content) = chunk.strip_suffix('\n') {
        (content, "\n")
    } else {
        (chunk, "")
    }
}

/// One `import` statement occupying a whole line.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct ImportLine<'a> {
    indent: &'a str,
    pub(crate) is_static: bool,
    /// Imported name without the `.*` of a wildcard.
    path: &'a str,
    wildcard: bool,
    /// Text after the semicolon.
    trailer: &'a str,
}

impl<'a> ImportLine<'a> {
    pub(crate) fn parse(line: &'a str) -> Option<Self> {
        let body = line.trim_start();
        let indent = &line[..line.len() - body.len()];
        let rest = body.strip_prefix("import")?;
        if !rest.starts_with(char::is_whitespace) {
            return None;
        }
        let rest = rest.trim_start();
        let (is_static, rest) = match rest.strip_prefix("static") {
            Some(after) if after.starts_with(char::is_whitespace) => (true, after.trim_start()),
            _ => (false, rest),
        };

        let (target, trailer) = rest.split_once(';')?;
        let target = target.trim();
        let (path, wildcard) = target
            .strip_suffix(".*")
            .map_or((target, false), |path| (path, true));
        if path.is_empty() || !path.chars().all(|c| c.is_alphanumeric() || matches!(c, '_' | '$' | '.')) {
            return None;
        }

        Some(Self {
            indent,
            is_static,
            path,
            wildcard,
            trailer,
        })
    }

    /// Package part of the import: everything before the last segment for a
    /// type import, the whole path for a wildcard.
    pub(crate) fn package(&self) -> Option<&'a str> {
        if self.wildcard {
            Some(self.path)
        } else {
            self.path.rsplit_once('.').map(|(package, _)| package)
        }
    }

    fn simple_name(&self) -> &'a str {
        self.path.rsplit_once('.').map_or(self.path, |(_, name)| name)
    }

    /// This line re-pointed at `package`, formatting outside the statement kept.
    pub(crate) fn retarget(&self, package: &str) -> String {
        let keyword = if self.is_static { "import static" } else { "import" };
        if self.wildcard {
            format!("{}{keyword} {package}.*;{}", self.indent, self.trailer)
        } else {
            format!("{}{keyword} {package}.{};{}", self.indent, self.simple_name(), self.trailer)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROOT: &str = "com.acme.shop";

    fn map(entries: &[(&str, &str)]) -> ImportRewriteMap {
        let mut map = ImportRewriteMap::new();
        for (name, package) in entries {
            map.insert(name, package);
        }
        map
    }

    #[test]
    fn build_prefers_tracker_and_skips_unplaced_hints() {
        let mut tracker = LocationTracker::in_memory("acme", "shop");
        tracker.record(
            "Order",
            crate::tracking::LocationEntry {
                file_path: PathBuf::from("/p/Order.java"),
                package: "com.acme.shop.model.sales".to_owned(),
                custom_dir: Some("sales".to_owned()),
                java_class_name: "Order".to_owned(),
            },
        );
        let hints = ContractHints::from_pairs([("Order", "billing"), ("pet", "dto"), ("Tag", "meta")]);
        let unplaced = BTreeSet::from(["Tag".to_owned()]);

        let m = ImportRewriteMap::build(&tracker, &hints, "com.acme.shop.model", &unplaced);
        assert_eq!(m.get("Order"), Some("com.acme.shop.model.sales"));
        assert_eq!(m.get("Pet"), Some("com.acme.shop.model.dto"));
        assert_eq!(m.get("Tag"), None);
        assert_eq!(m.len(), 2);
    }

    #[test]
    fn parse_import_variants() {
        let plain = ImportLine::parse("import com.acme.shop.model.Pet;").unwrap();
        assert_eq!(plain.package(), Some("com.acme.shop.model"));
        assert_eq!(plain.simple_name(), "Pet");
        assert!(!plain.is_static);

        let stat = ImportLine::parse("  import static org.junit.Assert.assertEquals; // x").unwrap();
        assert!(stat.is_static);
        assert_eq!(stat.indent, "  ");
        assert_eq!(stat.trailer, " // x");

        let wild = ImportLine::parse("import com.acme.shop.model.*;").unwrap();
        assert!(wild.wildcard);
        assert_eq!(wild.package(), Some("com.acme.shop.model"));

        assert!(ImportLine::parse("important();").is_none());
        assert!(ImportLine::parse("// import a.B;").is_none());
        assert!(ImportLine::parse("import a.B").is_none());
    }

    #[test]
    fn first_insert_wins() {
        let mut m = ImportRewriteMap::new();
        assert!(m.insert("Pet", "com.acme.shop.model.dto"));
        assert!(!m.insert("Pet", "com.acme.shop.model"));
        assert_eq!(m.get("Pet"), Some("com.acme.shop.model.dto"));
        assert_eq!(m.len(), 1);
    }

    #[test]
    fn rewrites_moved_type_imports() {
        let source = "\
package com.acme.shop.api;

import com.acme.shop.model.Pet; // moved
import com.acme.shop.model.Order;
import java.util.List;
";
        let m = map(&[("Pet", "com.acme.shop.model.dto"), ("Order", "com.acme.shop.model")]);
        let out = rewrite_imports(source, ROOT, &m).unwrap();
        assert!(out.contains("import com.acme.shop.model.dto.Pet; // moved\n"));
        assert!(out.contains("import com.acme.shop.model.Order;\n"));
        assert!(out.contains("import java.util.List;\n"));
    }

    #[test]
    fn unaffected_source_is_left_alone() {
        let source = "import com.acme.shop.model.Order;\nclass A {}\n";
        let m = map(&[("Order", "com.acme.shop.model"), ("Pet", "com.acme.shop.model.dto")]);
        assert_eq!(rewrite_imports(source, ROOT, &m), None);
    }

    #[test]
    fn static_wildcard_and_foreign_imports_are_skipped() {
        let source = "\
import static com.acme.shop.model.Pet.create;
import com.acme.shop.model.*;
import org.other.Pet;
";
        let m = map(&[("Pet", "com.acme.shop.model.dto")]);
        assert_eq!(rewrite_imports(source, ROOT, &m), None);
    }

    #[test]
    fn crlf_and_indent_survive_rewrite() {
        let source = "package x;\r\n    import com.acme.shop.model.Pet;\r\nclass A {}\r\n";
        let m = map(&[("Pet", "com.acme.shop.model.dto")]);
        let out = rewrite_imports(source, ROOT, &m).unwrap();
        assert_eq!(out, "package x;\r\n    import com.acme.shop.model.dto.Pet;\r\nclass A {}\r\n");
    }

    #[test]
    fn propagation_writes_only_changed_files_and_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let api = dir.path().join("PetApi.java");
        let untouched = dir.path().join("Util.java");
        fs::write(&api, "import com.acme.shop.model.Pet;\ninterface PetApi {}\n").unwrap();
        fs::write(&untouched, "import java.util.List;\nclass Util {}\n").unwrap();
        let before = fs::read(&untouched).unwrap();

        let files = vec![api.clone(), untouched.clone()];
        let m = map(&[("Pet", "com.acme.shop.model.dto")]);

        let first = propagate_imports(&files, ROOT, &m);
        assert_eq!(first.modified, vec![api.clone()]);
        assert!(first.failures.is_empty());
        assert!(fs::read_to_string(&api).unwrap().contains("com.acme.shop.model.dto.Pet"));
        assert_eq!(fs::read(&untouched).unwrap(), before);

        let second = propagate_imports(&files, ROOT, &m);
        assert_eq!(second.count(), 0);
    }

    #[test]
    fn unreadable_file_is_reported_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("Missing.java");
        let present = dir.path().join("Present.java");
        fs::write(&present, "import com.acme.shop.model.Pet;\n").unwrap();

        let m = map(&[("Pet", "com.acme.shop.model.dto")]);
        let outcome = propagate_imports(&[missing.clone(), present.clone()], ROOT, &m);
        assert_eq!(outcome.modified, vec![present]);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].path(), missing);
    }
}
