//! Down command implementation

use anyhow::Result;

use crate::cli::{GlobalArgs, MigrateArgs};
use crate::commands::common::{apply, Operation};

/// Execute the down command
pub fn execute(args: &MigrateArgs, global: &GlobalArgs) -> Result<()> {
    apply(Operation::Down(&args.version), &args.apply, global)
}
