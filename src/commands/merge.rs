//! `jregen merge`: merge a single generated file with its customized copy.

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use jregen::merge::merge;

#[derive(Args)]
pub struct MergeArgs {
    /// Freshly generated source
    generated: PathBuf,

    /// Existing customized source; a missing file means first generation
    existing: Option<PathBuf>,

    /// Write the result here instead of stdout
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,
}

pub fn run(args: &MergeArgs) -> Result<()> {
    let generated = fs::read_to_string(&args.generated)
        .with_context(|| format!("reading {}", args.generated.display()))?;

    let existing = match &args.existing {
        Some(path) => match fs::read_to_string(path) {
            Ok(text) => Some(text),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "existing file not found; treating as first generation");
                None
            }
            Err(e) => return Err(e).with_context(|| format!("reading {}", path.display())),
        },
        None => None,
    };

    let outcome = merge(&generated, existing.as_deref()).context("merge failed")?;
    for warning in &outcome.ambiguous {
        eprintln!("warning: {warning}");
    }

    match &args.output {
        Some(path) => {
            fs::write(path, &outcome.text).with_context(|| format!("writing {}", path.display()))?;
            eprintln!(
                "Wrote {} ({} member(s) preserved)",
                path.display(),
                outcome.preserved.len()
            );
        }
        None => print!("{}", outcome.text),
    }
    Ok(())
}
