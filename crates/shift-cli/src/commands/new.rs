//! New command implementation

use anyhow::{Context, Result};
use shift_core::scaffold;

use crate::cli::{GlobalArgs, NewArgs};
use crate::context::RuntimeContext;

/// Execute the new command
pub fn execute(args: &NewArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = RuntimeContext::new(global)?;
    let path = scaffold(&ctx.migrations_dir(), &args.version, &args.remark)
        .with_context(|| format!("Failed to create migration {}", args.version))?;
    println!("Created migration {}", path.display());
    Ok(())
}
