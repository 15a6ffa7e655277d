//! Shared test helpers for jregen integration tests.
//!
//! Every test works in its own temp directory holding a fake generator
//! output (`generated/`) and the project it is placed into (`project/`).
//! The project uses the default configuration: root package
//! `com.example.service`.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

use jregen::config::JregenConfig;
use jregen::contract::ContractHints;
use jregen::relocate::{PlacementReport, PlannerOptions, RelocationPlanner};
use jregen::tracking::LocationTracker;

pub const ROOT_PACKAGE: &str = "com.example.service";
const ROOT_PATH: &str = "src/main/java/com/example/service";

/// A generator output tree and a target project side by side.
pub struct Fixture {
    pub dir: TempDir,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("failed to create temp dir"),
        }
    }

    pub fn generated(&self) -> PathBuf {
        self.dir.path().join("generated")
    }

    pub fn project(&self) -> PathBuf {
        self.dir.path().join("project")
    }

    /// `generated/src/main/java/com/example/service/<sub>/<file>`.
    pub fn generated_file(&self, sub: &str, file: &str) -> PathBuf {
        self.generated().join(ROOT_PATH).join(sub).join(file)
    }

    /// `project/src/main/java/com/example/service/<sub>/<file>`.
    pub fn project_file(&self, sub: &str, file: &str) -> PathBuf {
        self.project().join(ROOT_PATH).join(sub).join(file)
    }

    pub fn write_generated(&self, sub: &str, file: &str, text: &str) {
        write(&self.generated_file(sub, file), text);
    }

    pub fn write_project(&self, sub: &str, file: &str, text: &str) {
        write(&self.project_file(sub, file), text);
    }

    pub fn read_project(&self, sub: &str, file: &str) -> String {
        let path = self.project_file(sub, file);
        fs::read_to_string(&path).unwrap_or_else(|e| panic!("reading {}: {e}", path.display()))
    }

    /// Throw away the generator output so the next run starts clean.
    pub fn clear_generated(&self) {
        let _ = fs::remove_dir_all(self.generated());
    }

    pub fn write_contract(&self, yaml: &str) -> PathBuf {
        let path = self.dir.path().join("api.yaml");
        write(&path, yaml);
        path
    }

    pub fn tracking_path(&self) -> PathBuf {
        JregenConfig::default().tracking_path(&self.project())
    }

    pub fn load_tracker(&self) -> LocationTracker {
        let config = JregenConfig::default();
        LocationTracker::load(
            &self.tracking_path(),
            &config.project.organization,
            &config.project.artifact_id,
        )
        .expect("failed to load tracker")
    }

    /// One full run with default configuration, flushing the tracker the way
    /// the `place` command does.
    pub fn place(&self, hints: &ContractHints) -> PlacementReport {
        let config = JregenConfig::default();
        let mut tracker = self.load_tracker();
        let planner = RelocationPlanner::new(config.layout(), PlannerOptions::from_config(&config));
        let report = planner
            .place(&self.generated(), &self.project(), hints, &mut tracker)
            .expect("placement could not start");
        tracker.save().expect("failed to save tracker");
        report
    }
}

pub fn write(path: &Path, text: &str) {
    fs::create_dir_all(path.parent().expect("path has a parent")).expect("failed to create dirs");
    fs::write(path, text).expect("failed to write file");
}

/// A model class as the generator emits it.
pub fn model(name: &str, id_body: &str) -> String {
    format!(
        r"package com.example.service.model;

import java.util.Objects;

public class {name} {{
    private Long id;

    public Long getId() {{
        {id_body}
    }}

    public void setId(Long id) {{
        this.id = id;
    }}
}}
"
    )
}

/// An API interface referencing `model_import`.
pub fn api(name: &str, model_import: &str, model: &str) -> String {
    format!(
        r"package com.example.service.api;

import {model_import};

public interface {name} {{
    default {model} get{model}(Long id) {{
        return null;
    }}
}}
"
    )
}

// ---------------------------------------------------------------------------
// Binary runners
// ---------------------------------------------------------------------------

pub fn jregen_in(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_jregen"))
        .args(args)
        .current_dir(dir)
        .env_remove("RUST_LOG")
        .env_remove("JREGEN_CONFIG")
        .output()
        .expect("failed to execute jregen")
}

/// Run jregen and assert it succeeds. Returns stdout as string.
pub fn jregen_ok(dir: &Path, args: &[&str]) -> String {
    let out = jregen_in(dir, args);
    let stderr = String::from_utf8_lossy(&out.stderr);
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(
        out.status.success(),
        "jregen {} failed:\nstdout: {stdout}\nstderr: {stderr}",
        args.join(" "),
    );
    stdout.to_string()
}

/// Run jregen and assert it fails. Returns stderr as string.
pub fn jregen_fails(dir: &Path, args: &[&str]) -> String {
    let out = jregen_in(dir, args);
    assert!(
        !out.status.success(),
        "Expected jregen {} to fail, but it succeeded.\nstdout: {}",
        args.join(" "),
        String::from_utf8_lossy(&out.stdout),
    );
    String::from_utf8_lossy(&out.stderr).to_string()
}
