//! Patch command implementations

use anyhow::Result;

use crate::cli::{GlobalArgs, PatchArgs};
use crate::commands::common::{apply, Operation};

/// Execute the patch-up command
pub fn execute_up(args: &PatchArgs, global: &GlobalArgs) -> Result<()> {
    apply(Operation::PatchUp(&args.version), &args.apply, global)
}

/// Execute the patch-down command
pub fn execute_down(args: &PatchArgs, global: &GlobalArgs) -> Result<()> {
    apply(Operation::PatchDown(&args.version), &args.apply, global)
}
