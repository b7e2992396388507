//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand, ValueEnum};
use shift_core::SqlKind;

/// Shift - versioned schema and data migrations
#[derive(Parser, Debug)]
#[command(name = "shift")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to project directory
    #[arg(short = 'p', long, global = true, default_value = ".")]
    pub project_dir: String,

    /// Override config file path
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Override target (database connection)
    #[arg(short, long, global = true)]
    pub target: Option<String>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Apply every pending migration up to a version
    Up(MigrateArgs),

    /// Revert applied migrations down to a version
    Down(MigrateArgs),

    /// Apply a single patch migration
    PatchUp(PatchArgs),

    /// Revert a single patch migration
    PatchDown(PatchArgs),

    /// Show the current version and every known migration
    Status,

    /// Create a new migration directory
    New(NewArgs),
}

/// Arguments for the up and down commands
#[derive(Args, Debug)]
pub struct MigrateArgs {
    /// Version to migrate to
    #[arg(value_name = "VERSION")]
    pub version: String,

    #[command(flatten)]
    pub apply: ApplyArgs,
}

/// Arguments for the patch-up and patch-down commands
#[derive(Args, Debug)]
pub struct PatchArgs {
    /// Patch version, e.g. PATCH.fix_emails
    #[arg(value_name = "VERSION")]
    pub version: String,

    #[command(flatten)]
    pub apply: ApplyArgs,
}

/// Options shared by every command that applies migrations
#[derive(Args, Debug, Clone)]
pub struct ApplyArgs {
    /// Print the preview and roll back instead of applying
    #[arg(long)]
    pub dry_run: bool,

    /// Which staged statements to execute; committing fails if a skipped kind has statements staged
    #[arg(short, long, value_enum, default_value = "all")]
    pub kind: KindArg,
}

/// Statement kinds selectable on the command line
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum KindArg {
    /// Schema changes only
    Ddl,
    /// Data changes only
    Dml,
    /// Schema changes, then data changes
    All,
}

impl KindArg {
    pub fn sql_kind(self) -> SqlKind {
        match self {
            KindArg::Ddl => SqlKind::DDL,
            KindArg::Dml => SqlKind::DML,
            KindArg::All => SqlKind::ALL,
        }
    }
}

/// Arguments for the new command
#[derive(Args, Debug)]
pub struct NewArgs {
    /// Version of the new migration (directory name)
    #[arg(value_name = "VERSION")]
    pub version: String,

    /// Remark written into the template files
    #[arg(short, long, default_value = "")]
    pub remark: String,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
