//! `jregen place`: run the relocation planner over a generator output tree.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::Args;

use jregen::contract::ContractHints;
use jregen::relocate::{PlacementAction, PlacementReport, PlannerOptions, RelocationPlanner};
use jregen::tracking::LocationTracker;

use super::load_config;

#[derive(Args)]
pub struct PlaceArgs {
    /// Generator output directory (contains src/main/java/...)
    #[arg(long, short = 'g')]
    generated: PathBuf,

    /// Project root that receives the sources
    #[arg(long, short = 'o', default_value = ".")]
    output: PathBuf,

    /// API contract carrying per-schema directory hints
    #[arg(long, short = 'c')]
    contract: Option<PathBuf>,
}

pub fn run(args: &PlaceArgs, config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path, &args.output)?;

    let hints = match &args.contract {
        Some(path) => ContractHints::load(path, &config.contract.dir_extension)?,
        None => ContractHints::empty(),
    };

    let tracking_path = config.tracking_path(&args.output);
    let mut tracker = LocationTracker::load(
        &tracking_path,
        &config.project.organization,
        &config.project.artifact_id,
    )?;

    let planner = RelocationPlanner::new(config.layout(), PlannerOptions::from_config(&config));
    let report = planner
        .place(&args.generated, &args.output, &hints, &mut tracker)
        .context("placement could not start")?;

    // Successful placements moved files on disk; record them even if
    // other files failed.
    tracker
        .save()
        .with_context(|| format!("saving {}", tracking_path.display()))?;

    print_report(&report);

    if !report.is_success() {
        eprintln!();
        eprintln!("{} file(s) failed:", report.failures.len());
        for failure in &report.failures {
            eprintln!("  {failure}");
        }
        bail!("placement finished with {} failure(s)", report.failures.len());
    }
    Ok(())
}

fn print_report(report: &PlacementReport) {
    if report.fresh_run {
        println!("Fresh run: every type placed as new.");
    }
    for placed in report.written() {
        let action = match placed.action {
            PlacementAction::Created => "create",
            PlacementAction::Merged { .. } => "merge",
            PlacementAction::Overwritten => "overwrite",
            PlacementAction::Unchanged => "keep",
        };
        println!("  {action:<9} {:<5} {}", placed.kind.as_str(), placed.path.display());
        for removed in &placed.removed {
            println!("  {:<9} {:<5} {}", "remove", "", removed.display());
        }
        for warning in &placed.ambiguous {
            println!("  {:<9} {:<5} {warning}", "warning", "");
        }
    }
    for path in &report.copied {
        println!("  {:<9} {:<5} {}", "copy", "", path.display());
    }
    for path in &report.imports_updated {
        println!("  {:<9} {:<5} {}", "imports", "", path.display());
    }
    println!("{report}");
}
