//! Package names for relocated types.
//!
//! [`resolve_package`] is the single place a custom directory hint turns into
//! a package name. Both the `package` line written into a file and the
//! directory that file lands in are derived from its result, so the two never
//! disagree.
//!
//! Normalization of a custom directory:
//!
//! - `/`, `\` and `.` all separate segments; empty segments vanish, which
//!   strips leading and trailing separators and collapses repeats.
//! - A leading segment equal to the base package's last segment is dropped,
//!   so `model/dto` under `com.acme.model` gives `com.acme.model.dto` rather
//!   than `com.acme.model.model.dto`.
//! - The result never contains `..` and never ends in `.`.

pub mod imports;

use std::path::PathBuf;

pub use imports::{ImportRewriteMap, PropagationOutcome, propagate_imports, rewrite_imports};

use imports::{ImportLine, split_eol};

/// Package for a type declared under `base`, optionally relocated into
/// `custom_dir` (a directory path relative to the base package).
#[must_use]
pub fn resolve_package(base: &str, custom_dir: Option<&str>) -> String {
    let mut parts: Vec<&str> = segments(base).collect();
    let mut suffix: Vec<&str> = custom_dir.map(|dir| segments(dir).collect()).unwrap_or_default();

    if let (Some(last), Some(first)) = (parts.last(), suffix.first())
        && last == first
    {
        suffix.remove(0);
    }

    parts.extend(suffix);
    parts.join(".")
}

fn segments(text: &str) -> impl Iterator<Item = &str> {
    text.split(['/', '\\', '.'])
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
}

/// Relative directory for `package` (`com.acme.model` → `com/acme/model`).
#[must_use]
pub fn package_path(package: &str) -> PathBuf {
    package.split('.').filter(|s| !s.is_empty()).collect()
}

/// The name in the first `package X;` line of `source`, if any.
#[must_use]
pub fn declared_package(source: &str) -> Option<&str> {
    source.lines().find_map(|line| PackageLine::parse(line).map(|decl| decl.name))
}

/// Rewrite `source` so it belongs to `declared_base` relocated into
/// `custom_dir`.
///
/// Exactly one package line (the first) is rewritten. Imports that point into
/// the file's previous package are retargeted at the new one. Everything else
/// is left byte-for-byte, line endings included.
#[must_use]
pub fn relocate_package(source: &str, declared_base: &str, custom_dir: Option<&str>) -> String {
    let target = resolve_package(declared_base, custom_dir);
    let previous = declared_package(source).unwrap_or(declared_base).to_owned();

    let mut out = String::with_capacity(source.len() + target.len());
    let mut package_rewritten = false;

    for chunk in source.split_inclusive('\n') {
        let (content, eol) = split_eol(chunk);

        if !package_rewritten && let Some(decl) = PackageLine::parse(content) {
            package_rewritten = true;
            out.push_str(&decl.render(&target));
            out.push_str(eol);
            continue;
        }

        if previous != target
            && let Some(import) = ImportLine::parse(content)
            && !import.is_static
            && import.package() == Some(previous.as_str())
        {
            out.push_str(&import.retarget(&target));
            out.push_str(eol);
            continue;
        }

        out.push_str(chunk);
    }

    if !package_rewritten {
        tracing::debug!(package = %target, "source has no package declaration; left as is");
    }
    out
}

/// A `package X;` line split into the parts that survive a rewrite.
struct PackageLine<'a> {
    indent: &'a str,
    name: &'a str,
    trailer: &'a str,
}

impl<'a> PackageLine<'a> {
    fn parse(line: &'a str) -> Option<Self> {
        let body = line.trim_start();
        let indent = &line[..line.len() - body.len()];
        let rest = body.strip_prefix("package")?;
        if !rest.starts_with(char::is_whitespace) {
            return None;
        }
        let (name, trailer) = rest.split_once(';')?;
        let name = name.trim();
        if name.is_empty() || !name.chars().all(|c| c.is_alphanumeric() || matches!(c, '_' | '$' | '.')) {
            return None;
        }
        Some(Self { indent, name, trailer })
    }

    fn render(&self, package: &str) -> String {
        format!("{}package {package};{}", self.indent, self.trailer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const BASE: &str = "com.acme.model";

    #[test]
    fn custom_dir_variants_normalize_to_one_package() {
        for dir in ["dto", "model/dto", "model/dto/", "/dto", "\\dto\\", "dto/", "model.dto"] {
            assert_eq!(resolve_package(BASE, Some(dir)), "com.acme.model.dto", "dir {dir:?}");
        }
    }

    #[test]
    fn repeated_separators_collapse() {
        assert_eq!(resolve_package(BASE, Some("dto//sub")), "com.acme.model.dto.sub");
        assert_eq!(resolve_package(BASE, Some("dto/./sub")), "com.acme.model.dto.sub");
    }

    #[test]
    fn empty_or_missing_dir_gives_base() {
        assert_eq!(resolve_package(BASE, None), BASE);
        assert_eq!(resolve_package(BASE, Some("")), BASE);
        assert_eq!(resolve_package(BASE, Some("///")), BASE);
    }

    #[test]
    fn leading_segment_drop_follows_base() {
        assert_eq!(resolve_package("com.acme.api", Some("api/admin")), "com.acme.api.admin");
        assert_eq!(resolve_package("com.acme.api", Some("model/admin")), "com.acme.api.model.admin");
    }

    #[test]
    fn only_the_leading_segment_is_dropped() {
        assert_eq!(resolve_package(BASE, Some("model/model")), "com.acme.model.model");
    }

    #[test]
    fn package_path_splits_on_dots() {
        assert_eq!(package_path("com.acme.model.dto"), PathBuf::from("com/acme/model/dto"));
    }

    #[test]
    fn declared_package_finds_first_declaration() {
        let source = "// header\npackage com.acme.model;\n\nclass A {}\n";
        assert_eq!(declared_package(source), Some("com.acme.model"));
        assert_eq!(declared_package("class A {}"), None);
    }

    #[test]
    fn relocate_rewrites_package_and_old_package_imports() {
        let source = "\
package com.acme.model;

import com.acme.model.Category;
import com.acme.api.PetApi;
import java.util.List;

public class Pet {}
";
        let out = relocate_package(source, BASE, Some("model/dto/"));
        assert!(out.starts_with("package com.acme.model.dto;\n"));
        assert!(out.contains("import com.acme.model.dto.Category;\n"));
        assert!(out.contains("import com.acme.api.PetApi;\n"));
        assert!(out.contains("import java.util.List;\n"));
        assert!(!out.contains(".."));
    }

    #[test]
    fn relocate_rewrites_only_the_first_package_line() {
        let source = "package com.acme.model;\nclass A { String s = \"x\"; }\npackage com.acme.model;\n";
        let out = relocate_package(source, BASE, Some("dto"));
        assert_eq!(out.matches("package com.acme.model.dto;").count(), 1);
        assert_eq!(out.matches("package com.acme.model;").count(), 1);
    }

    #[test]
    fn relocate_preserves_crlf_and_comments() {
        let source = "package com.acme.model; // generated\r\n\r\nclass A {}\r\n";
        let out = relocate_package(source, BASE, Some("dto"));
        assert_eq!(out, "package com.acme.model.dto; // generated\r\n\r\nclass A {}\r\n");
    }

    #[test]
    fn relocate_back_to_default_restores_base() {
        let source = "package com.acme.model.dto;\n\nclass A {}\n";
        let out = relocate_package(source, BASE, None);
        assert_eq!(out, "package com.acme.model;\n\nclass A {}\n");
    }

    #[test]
    fn relocate_without_package_line_is_unchanged() {
        let source = "class A {}\n";
        assert_eq!(relocate_package(source, BASE, Some("dto")), source);
    }

    proptest! {
        #[test]
        fn resolved_package_has_no_empty_segments(dir in "[a-z/\\\\.]{0,24}") {
            let package = resolve_package(BASE, Some(&dir));
            prop_assert!(!package.contains(".."));
            prop_assert!(!package.ends_with('.'));
            prop_assert!(package.starts_with(BASE));
        }

        #[test]
        fn package_line_matches_resolved_package(dir in "[a-z]{1,6}(/[a-z]{1,6}){0,3}/?") {
            let source = "package com.acme.model;\nclass A {}\n";
            let out = relocate_package(source, BASE, Some(&dir));
            let expected = resolve_package(BASE, Some(&dir));
            prop_assert_eq!(declared_package(&out), Some(expected.as_str()));
        }
    }
}
