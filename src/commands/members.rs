use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use jregen_java::extract_members;

#[derive(Args)]
pub struct MembersArgs {
    /// Java source file
    file: PathBuf,

    /// Also print each member's annotations
    #[arg(long, short = 'a')]
    annotations: bool,
}

pub fn run(args: &MembersArgs) -> Result<()> {
    let text = fs::read_to_string(&args.file).with_context(|| format!("reading {}", args.file.display()))?;
    let members = extract_members(&text).with_context(|| format!("parsing {}", args.file.display()))?;

    for member in &members {
        println!(
            "{:>6}..{:<6} {:<11} {}",
            member.start_byte(),
            member.end_byte(),
            member.kind.to_string(),
            member.signature()
        );
        if args.annotations {
            for annotation in &member.annotations {
                println!("{:15} {:<11} {annotation}", "", "");
            }
        }
    }
    eprintln!("{} member(s)", members.len());
    Ok(())
}
