//! `jregen tracked`: list the tracking store.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use jregen::tracking::LocationTracker;

use super::load_config;

#[derive(Args)]
pub struct TrackedArgs {
    /// Project root holding the tracking store
    #[arg(long, short = 'o', default_value = ".")]
    output: PathBuf,

    /// Print entries as JSON
    #[arg(long)]
    json: bool,
}

pub fn run(args: &TrackedArgs, config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path, &args.output)?;
    let tracker = LocationTracker::load(
        &config.tracking_path(&args.output),
        &config.project.organization,
        &config.project.artifact_id,
    )?;

    if args.json {
        let json = serde_json::to_string_pretty(tracker.entries()).context("encoding entries")?;
        println!("{json}");
        return Ok(());
    }

    if tracker.is_empty() {
        println!("No tracked types.");
        return Ok(());
    }
    for (type_name, entry) in tracker.entries() {
        println!(
            "{type_name:<24} {:<40} {:<12} {}",
            entry.package,
            entry.custom_dir.as_deref().unwrap_or("-"),
            entry.file_path.display()
        );
    }
    Ok(())
}
