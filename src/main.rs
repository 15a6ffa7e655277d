use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};

mod commands;
mod telemetry;

/// Place regenerated Java sources without losing customizations
///
/// jregen takes the output of an OpenAPI code generator and places it into
/// your project. Types with a custom directory hint (x-qi-dir) in the
/// contract, or that were moved on an earlier run, go to their custom
/// package. Methods you changed by hand in an existing file are kept: only
/// members whose signature changed, appeared or disappeared follow the
/// generator.
///
/// QUICK START:
///
///   jregen place --generated build/generated --contract api.yaml
///
/// State is kept in .jregen/ under the output root: config.toml
/// (optional) and tracking.json (where every type was placed).
#[derive(Parser)]
#[command(name = "jregen")]
#[command(version, about)]
#[command(propagate_version = true)]
#[command(after_help = "See 'jregen <command> --help' for more information on a specific command.")]
pub struct Cli {
    /// Configuration file [default: <output>/.jregen/config.toml]
    #[arg(long, global = true, env = "JREGEN_CONFIG")]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Place a generated source tree into the project
    Place(commands::place::PlaceArgs),

    /// Merge one generated file with its customized version
    Merge(commands::merge::MergeArgs),

    /// List the methods and constructors of a Java file
    Members(commands::members::MembersArgs),

    /// Show where each generated type was placed
    Tracked(commands::tracked::TrackedArgs),

    /// Generate shell completions
    Completions(commands::completions::CompletionsArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    telemetry::init(cli.verbose);

    let config = cli.config.as_deref();
    match &cli.command {
        Commands::Place(args) => commands::place::run(args, config),
        Commands::Merge(args) => commands::merge::run(args),
        Commands::Members(args) => commands::members::run(args),
        Commands::Tracked(args) => commands::tracked::run(args, config),
        Commands::Completions(args) => {
            commands::completions::run(args);
            Ok(())
        }
    }
}
