//! Shift CLI - versioned schema and data migrations

use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;
mod context;

use cli::{Cli, Commands};
use commands::{down, new, patch, status, up};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.global.verbose);

    match &cli.command {
        Commands::Up(args) => up::execute(args, &cli.global),
        Commands::Down(args) => down::execute(args, &cli.global),
        Commands::PatchUp(args) => patch::execute_up(args, &cli.global),
        Commands::PatchDown(args) => patch::execute_down(args, &cli.global),
        Commands::Status => status::execute(&cli.global),
        Commands::New(args) => new::execute(args, &cli.global),
    }
}

/// `RUST_LOG` wins; otherwise debug with `--verbose`, warn without.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}
