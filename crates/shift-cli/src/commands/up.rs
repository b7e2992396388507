//! Up command implementation

use anyhow::Result;

use crate::cli::{GlobalArgs, MigrateArgs};
use crate::commands::common::{apply, Operation};

/// Execute the up command
pub fn execute(args: &MigrateArgs, global: &GlobalArgs) -> Result<()> {
    apply(Operation::Up(&args.version), &args.apply, global)
}
