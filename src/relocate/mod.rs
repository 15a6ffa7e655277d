//! Placement of a freshly generated source tree into a project.
//!
//! A run processes the generator output in a fixed order: models, then API
//! interfaces, then any other Java sources, then non-Java support files.
//! Within each group files are taken in path order. For every model and API
//! type the planner:
//!
//! 1. resolves its custom directory through the [`LocationTracker`];
//! 2. rewrites its package line (and imports of its old package);
//! 3. merges it with the customized copy already in the project, if any;
//! 4. writes it, unless the target already holds exactly that content;
//! 5. records the final location and removes stale copies left behind by a
//!    move.
//!
//! Once every file is placed, imports throughout the project are brought in
//! line with where each type now lives.
//!
//! A failure on one file is recorded in the [`PlacementReport`] and the run
//! moves on. The tracker is updated in memory only; persisting it is the
//! caller's job.

pub mod report;

use std::collections::BTreeSet;
use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

use jregen_java::extract_members;

use crate::config::{JregenConfig, SupportFilePolicy};
use crate::contract::ContractHints;
use crate::error::{PlacementError, RelocateError};
use crate::layout::{FileKind, ProjectLayout};
use crate::merge::{AmbiguousSignature, merge};
use crate::package::{
    ImportRewriteMap, declared_package, propagate_imports, relocate_package, resolve_package, rewrite_imports,
};
use crate::tracking::{LocationEntry, LocationTracker, ResolutionOrigin, is_fresh_run};

pub use report::{FileFailure, PlacedFile, PlacementAction, PlacementReport};

/// Behaviour switches for a [`RelocationPlanner`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlannerOptions {
    /// Merge existing customized files. When off, existing files are replaced.
    pub merge_existing: bool,
    pub support_files: SupportFilePolicy,
}

impl Default for PlannerOptions {
    fn default() -> Self {
        Self {
            merge_existing: true,
            support_files: SupportFilePolicy::CreateMissing,
        }
    }
}

impl PlannerOptions {
    #[must_use]
    pub const fn from_config(config: &JregenConfig) -> Self {
        Self {
            merge_existing: config.merge.preserve_customizations,
            support_files: config.output.support_files,
        }
    }
}

/// Where one generated type goes, computed fresh for every run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlacementDecision {
    pub type_name: String,
    pub kind: FileKind,
    /// Package the generator declared.
    pub base_package: String,
    pub custom_dir: Option<String>,
    pub origin: ResolutionOrigin,
    pub target_package: String,
    pub target_path: PathBuf,
    /// Existing file whose customizations are merged into the new one: the
    /// target itself, or a copy the type is moving away from.
    pub merge_from: Option<PathBuf>,
    /// Copies at other locations to remove once the target is written.
    pub stale: Vec<PathBuf>,
}

impl PlacementDecision {
    /// True when an existing file has to be merged.
    #[must_use]
    pub const fn needs_merge(&self) -> bool {
        self.merge_from.is_some()
    }
}

/// Places generated files into a project.
#[derive(Clone, Debug)]
pub struct RelocationPlanner {
    layout: ProjectLayout,
    options: PlannerOptions,
}

/// Inputs shared by every file of one run.
struct Run<'a> {
    generated_dir: &'a Path,
    output_root: &'a Path,
    hints: &'a ContractHints,
    fresh_run: bool,
}

/// Generator output grouped by processing order. Paths are relative to the
/// generator output directory.
#[derive(Debug, Default)]
struct GeneratedTree {
    models: Vec<PathBuf>,
    apis: Vec<PathBuf>,
    sources: Vec<PathBuf>,
    support: Vec<PathBuf>,
}

type Reconciled = (String, PlacementAction, Vec<AmbiguousSignature>);

impl RelocationPlanner {
    #[must_use]
    pub const fn new(layout: ProjectLayout, options: PlannerOptions) -> Self {
        Self { layout, options }
    }

    /// Place everything under `generated_dir` into the project at
    /// `output_root`.
    ///
    /// # Errors
    /// Returns [`RelocateError`] only when the run cannot start: the generated
    /// tree is missing or unreadable, or the output root cannot be resolved.
    /// Per-file problems are reported in [`PlacementReport::failures`].
    pub fn place(
        &self,
        generated_dir: &Path,
        output_root: &Path,
        hints: &ContractHints,
        tracker: &mut LocationTracker,
    ) -> Result<PlacementReport, RelocateError> {
        if !generated_dir.is_dir() {
            return Err(RelocateError::GeneratedTreeMissing {
                path: generated_dir.to_owned(),
            });
        }
        let output_root = std::path::absolute(output_root).map_err(|source| RelocateError::OutputRoot {
            path: output_root.to_owned(),
            source,
        })?;
        let tree = self.scan(generated_dir)?;

        let run = Run {
            generated_dir,
            output_root: &output_root,
            hints,
            fresh_run: is_fresh_run(&self.layout.source_root(&output_root)),
        };
        let mut report = PlacementReport {
            fresh_run: run.fresh_run,
            ..PlacementReport::default()
        };
        tracing::info!(
            generated = %generated_dir.display(),
            output = %output_root.display(),
            fresh_run = run.fresh_run,
            models = tree.models.len(),
            apis = tree.apis.len(),
            "placing generated sources"
        );

        let mut relocated = BTreeSet::new();
        let mut unplaced = BTreeSet::new();
        for relative in &tree.models {
            let placed = self.place_typed(&run, FileKind::Model, relative, tracker, None);
            if placed.is_err() {
                unplaced.insert(subject(relative));
            }
            record(&mut report, &mut relocated, relative, placed);
        }

        // Every placed model now has its final package; API and other sources
        // are written with imports that already point there.
        let imports = ImportRewriteMap::build(tracker, hints, &self.layout.model_package(), &unplaced);
        for relative in &tree.apis {
            let placed = self.place_typed(&run, FileKind::Api, relative, tracker, Some(&imports));
            record(&mut report, &mut relocated, relative, placed);
        }
        for relative in &tree.sources {
            let placed = self.place_source(&run, relative, &imports);
            record(&mut report, &mut relocated, relative, placed);
        }
        for relative in &tree.support {
            match self.copy_support(&run, relative) {
                Ok(Some(path)) => report.copied.push(path),
                Ok(None) => {}
                Err(err) => report.fail(relative.display().to_string(), err),
            }
        }

        self.propagate(&run, tracker, &relocated, &unplaced, &mut report);

        tracing::info!(summary = %report, success = report.is_success(), "placement finished");
        Ok(report)
    }

    /// Decide where the generated type at `generated` goes.
    ///
    /// Returns `None` for [`FileKind::Other`] and for paths without a file name.
    #[must_use]
    pub fn plan(
        &self,
        kind: FileKind,
        generated: &Path,
        output_root: &Path,
        hints: &ContractHints,
        tracker: &LocationTracker,
        fresh_run: bool,
    ) -> Option<PlacementDecision> {
        let base_package = self.layout.base_package(kind)?;
        let file_name = generated.file_name()?;
        let type_name = generated.file_stem()?.to_string_lossy().into_owned();

        let resolution = tracker.resolve(&type_name, hints, fresh_run);
        let target_package = resolve_package(&base_package, resolution.custom_dir.as_deref());
        let target_path = ProjectLayout::package_dir(output_root, &target_package).join(file_name);
        let default_path = ProjectLayout::package_dir(output_root, &base_package).join(file_name);

        // A tracked path outside this project is never touched.
        let previous = if fresh_run {
            None
        } else {
            tracker
                .get(&type_name)
                .map(|entry| entry.file_path.clone())
                .filter(|path| path.starts_with(output_root))
        };

        let mut stale: Vec<PathBuf> = Vec::new();
        for candidate in previous.into_iter().chain([default_path]) {
            if candidate != target_path && candidate.is_file() && !stale.contains(&candidate) {
                stale.push(candidate);
            }
        }
        let merge_from = if target_path.is_file() {
            Some(target_path.clone())
        } else {
            stale.first().cloned()
        };

        Some(PlacementDecision {
            type_name,
            kind,
            base_package,
            custom_dir: resolution.custom_dir,
            origin: resolution.origin,
            target_package,
            target_path,
            merge_from,
            stale,
        })
    }

    fn place_typed(
        &self,
        run: &Run<'_>,
        kind: FileKind,
        relative: &Path,
        tracker: &mut LocationTracker,
        imports: Option<&ImportRewriteMap>,
    ) -> Result<PlacedFile, PlacementError> {
        let generated = run.generated_dir.join(relative);
        let decision = self
            .plan(kind, &generated, run.output_root, run.hints, tracker, run.fresh_run)
            .ok_or_else(|| {
                PlacementError::io(&generated, io::Error::new(ErrorKind::InvalidInput, "not a typed Java source"))
            })?;
        tracing::debug!(
            type_name = %decision.type_name,
            origin = ?decision.origin,
            package = %decision.target_package,
            merge = decision.needs_merge(),
            "planned placement"
        );

        let text = read(&generated)?;
        let mut text = relocate_package(&text, &decision.base_package, decision.custom_dir.as_deref());
        if let Some(map) = imports
            && let Some(rewritten) = rewrite_imports(&text, &self.layout.root_package, map)
        {
            text = rewritten;
        }

        let (text, action, ambiguous) =
            self.reconcile(text, &generated, &decision.target_path, decision.merge_from.as_deref())?;
        if action != PlacementAction::Unchanged {
            write(&decision.target_path, &text)?;
        }

        tracker.record(
            &decision.type_name,
            LocationEntry {
                file_path: decision.target_path.clone(),
                package: decision.target_package.clone(),
                custom_dir: decision.custom_dir.clone(),
                java_class_name: decision.type_name.clone(),
            },
        );

        let mut removed = Vec::with_capacity(decision.stale.len());
        for stale in &decision.stale {
            remove_stale(stale)?;
            tracing::info!(path = %stale.display(), type_name = %decision.type_name, "removed stale copy");
            removed.push(stale.clone());
        }

        tracing::info!(
            type_name = %decision.type_name,
            kind = %kind,
            package = %decision.target_package,
            action = %action,
            "placed"
        );
        Ok(PlacedFile {
            type_name: decision.type_name,
            kind,
            path: decision.target_path,
            package: Some(decision.target_package),
            custom_dir: decision.custom_dir,
            action,
            removed,
            ambiguous,
        })
    }

    /// A Java file outside the model and api packages: same relative path in
    /// the project, merged when customized, never tracked.
    fn place_source(
        &self,
        run: &Run<'_>,
        relative: &Path,
        imports: &ImportRewriteMap,
    ) -> Result<PlacedFile, PlacementError> {
        let generated = run.generated_dir.join(relative);
        let target = run.output_root.join(relative);

        let mut text = read(&generated)?;
        if let Some(rewritten) = rewrite_imports(&text, &self.layout.root_package, imports) {
            text = rewritten;
        }
        let (text, action, ambiguous) = self.reconcile(text, &generated, &target, Some(&target))?;
        if action != PlacementAction::Unchanged {
            write(&target, &text)?;
        }

        tracing::debug!(path = %relative.display(), action = %action, "placed source");
        Ok(PlacedFile {
            type_name: relative
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default(),
            kind: FileKind::Other,
            path: target,
            package: declared_package(&text).map(str::to_owned),
            custom_dir: None,
            action,
            removed: Vec::new(),
            ambiguous,
        })
    }

    /// Combine the generated `text` with whatever already exists.
    fn reconcile(
        &self,
        text: String,
        generated: &Path,
        target: &Path,
        merge_from: Option<&Path>,
    ) -> Result<Reconciled, PlacementError> {
        let current = read_optional(target)?;
        let existing = match merge_from {
            Some(path) if path == target => current.clone(),
            Some(path) => read_optional(path)?,
            None => None,
        };

        let (text, action, ambiguous) = match existing {
            Some(existing) if self.options.merge_existing => {
                let outcome = merge(&text, Some(&existing)).map_err(|source| {
                    // Attribute the failure to whichever side does not parse.
                    let path = if extract_members(&text).is_err() {
                        generated
                    } else {
                        merge_from.unwrap_or(target)
                    };
                    PlacementError::Parse {
                        path: path.to_owned(),
                        source,
                    }
                })?;
                let action = PlacementAction::Merged {
                    preserved: outcome.preserved.len(),
                };
                (outcome.text, action, outcome.ambiguous)
            }
            _ if current.is_some() => (text, PlacementAction::Overwritten, Vec::new()),
            _ => (text, PlacementAction::Created, Vec::new()),
        };

        if current.as_deref() == Some(text.as_str()) {
            return Ok((text, PlacementAction::Unchanged, ambiguous));
        }
        Ok((text, action, ambiguous))
    }

    fn copy_support(&self, run: &Run<'_>, relative: &Path) -> Result<Option<PathBuf>, PlacementError> {
        let source = run.generated_dir.join(relative);
        let target = run.output_root.join(relative);

        let copy = match self.options.support_files {
            SupportFilePolicy::Skip => false,
            SupportFilePolicy::CreateMissing => !target.exists(),
            SupportFilePolicy::Overwrite => !same_contents(&source, &target),
        };
        if !copy {
            return Ok(None);
        }

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| PlacementError::io(parent, e))?;
        }
        fs::copy(&source, &target).map_err(|e| PlacementError::io(&target, e))?;
        tracing::debug!(path = %relative.display(), "copied support file");
        Ok(Some(target))
    }

    /// Rewrite imports in every project source outside the relocated set.
    fn propagate(
        &self,
        run: &Run<'_>,
        tracker: &LocationTracker,
        relocated: &BTreeSet<PathBuf>,
        unplaced: &BTreeSet<String>,
        report: &mut PlacementReport,
    ) {
        let java_root = ProjectLayout::java_root(run.output_root);
        let mut files = Vec::new();
        if let Err(e) = collect_files(&java_root, &java_root, &mut files) {
            report.fail("import propagation", PlacementError::io(&java_root, e));
            return;
        }
        let files: Vec<PathBuf> = files
            .into_iter()
            .filter(|rel| rel.extension().is_some_and(|ext| ext == "java"))
            .map(|rel| java_root.join(rel))
            .filter(|path| !relocated.contains(path))
            .collect();

        let map = ImportRewriteMap::build(tracker, run.hints, &self.layout.model_package(), unplaced);
        let outcome = propagate_imports(&files, &self.layout.root_package, &map);
        report.imports_updated = outcome.modified;
        for err in outcome.failures {
            let subject = err.path().display().to_string();
            report.fail(subject, err);
        }
    }

    fn scan(&self, generated_dir: &Path) -> Result<GeneratedTree, RelocateError> {
        let mut files = Vec::new();
        collect_files(generated_dir, generated_dir, &mut files).map_err(|source| RelocateError::Scan {
            path: generated_dir.to_owned(),
            source,
        })?;
        files.sort();

        let mut tree = GeneratedTree::default();
        for relative in files {
            if relative.extension().is_none_or(|ext| ext != "java") {
                tree.support.push(relative);
                continue;
            }
            match self.layout.classify(generated_dir, &generated_dir.join(&relative)) {
                FileKind::Model => tree.models.push(relative),
                FileKind::Api => tree.apis.push(relative),
                FileKind::Other => tree.sources.push(relative),
            }
        }
        Ok(tree)
    }
}

/// Fold one file's outcome into the report. Files moved into a custom
/// directory join the relocated set.
fn record(
    report: &mut PlacementReport,
    relocated: &mut BTreeSet<PathBuf>,
    relative: &Path,
    placed: Result<PlacedFile, PlacementError>,
) {
    match placed {
        Ok(placed) => {
            if placed.custom_dir.is_some() {
                relocated.insert(placed.path.clone());
            }
            report.placed.push(placed);
        }
        Err(err) => report.fail(subject(relative), err),
    }
}

/// The type name a generated file is reported under.
fn subject(relative: &Path) -> String {
    relative
        .file_stem()
        .map_or_else(|| relative.display().to_string(), |s| s.to_string_lossy().into_owned())
}

/// Collect every file under `dir`, relative to `base`. A missing `dir` yields
/// nothing.
fn collect_files(dir: &Path, base: &Path, out: &mut Vec<PathBuf>) -> io::Result<()> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e),
    };
    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type()?.is_dir() {
            collect_files(&path, base, out)?;
        } else if let Ok(rel) = path.strip_prefix(base) {
            out.push(rel.to_path_buf());
        }
    }
    Ok(())
}

fn read(path: &Path) -> Result<String, PlacementError> {
    fs::read_to_string(path).map_err(|e| PlacementError::io(path, e))
}

fn read_optional(path: &Path) -> Result<Option<String>, PlacementError> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(Some(text)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(PlacementError::io(path, e)),
    }
}

fn write(path: &Path, text: &str) -> Result<(), PlacementError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| PlacementError::io(parent, e))?;
    }
    fs::write(path, text).map_err(|e| PlacementError::io(path, e))
}

fn remove_stale(path: &Path) -> Result<(), PlacementError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(PlacementError::io(path, e)),
    }
}

/// Byte equality; any read error counts as different.
fn same_contents(a: &Path, b: &Path) -> bool {
    match (fs::read(a), fs::read(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
