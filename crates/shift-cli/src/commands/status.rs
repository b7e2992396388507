//! Status command implementation

use anyhow::Result;
use shift_core::{Connector, Script, Version};
use std::fmt;

use crate::cli::GlobalArgs;
use crate::context::RuntimeContext;

/// Whether a migration on disk has been applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ScriptStatus {
    Applied,
    Pending,
}

impl fmt::Display for ScriptStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScriptStatus::Applied => write!(f, "applied"),
            ScriptStatus::Pending => write!(f, "pending"),
        }
    }
}

/// Sequential versions are applied up to the current version; patches are
/// applied when recorded.
pub(crate) fn script_status(
    version: &Version,
    current: Option<&Version>,
    patches: &[Version],
) -> ScriptStatus {
    let applied = if version.is_patch() {
        patches.contains(version)
    } else {
        current.is_some_and(|c| version <= c)
    };
    if applied {
        ScriptStatus::Applied
    } else {
        ScriptStatus::Pending
    }
}

/// Execute the status command
pub fn execute(global: &GlobalArgs) -> Result<()> {
    let ctx = RuntimeContext::new(global)?;
    let scripts = ctx.scripts()?;
    let mut conn = ctx.connect()?;

    let current = conn.last_run_version()?;
    let patches = conn.applied_patches()?;
    let history = conn.history()?;
    conn.rollback()?;

    println!(
        "Project: {} (target: {})",
        ctx.config.name,
        ctx.target.as_deref().unwrap_or("base")
    );
    println!(
        "Current version: {}",
        current.as_ref().map_or("<none>", |v| v.as_str())
    );
    if let Some(last) = history.last() {
        println!(
            "Last change: {} ({}) at {}",
            last.version, last.direction, last.applied_at
        );
    }
    println!();

    if scripts.is_empty() {
        println!("No migrations found in {}", ctx.migrations_dir().display());
    }
    for script in &scripts {
        let info = script.info();
        let status = script_status(&info.version, current.as_ref(), &patches);
        if info.remark.is_empty() {
            println!("  [{status}] {}", info.version);
        } else {
            println!("  [{status}] {}  {}", info.version, info.remark);
        }
    }

    let orphaned: Vec<&Version> = patches
        .iter()
        .filter(|p| !scripts.iter().any(|s| s.version() == *p))
        .collect();
    if !orphaned.is_empty() {
        println!();
        println!("Recorded patches without a migration directory:");
        for patch in orphaned {
            println!("  {patch}");
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "status_test.rs"]
mod tests;
