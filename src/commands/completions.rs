use std::io;

use clap::{Args, CommandFactory};

use crate::Cli;

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    shell: clap_complete::Shell,
}

pub fn run(args: &CompletionsArgs) {
    let mut cmd = Cli::command();
    clap_complete::generate(args.shell, &mut cmd, "jregen", &mut io::stdout());
}
