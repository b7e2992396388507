//! Shared flow for commands that apply migrations

use anyhow::{Context, Result};
use shift_core::{Connector, MigrateResult, Migrator};
use shift_db::DuckDbConnector;
use std::fmt;

use crate::cli::{ApplyArgs, GlobalArgs};
use crate::context::RuntimeContext;

/// Which prepare operation an apply command performs
#[derive(Debug, Clone, Copy)]
pub(crate) enum Operation<'a> {
    Up(&'a str),
    Down(&'a str),
    PatchUp(&'a str),
    PatchDown(&'a str),
}

impl Operation<'_> {
    fn prepare(self, migrator: &mut Migrator<DuckDbConnector>) -> MigrateResult<()> {
        match self {
            Operation::Up(target) => migrator.prepare_up(target).map(|_| ()),
            Operation::Down(target) => migrator.prepare_down(target).map(|_| ()),
            Operation::PatchUp(version) => migrator.prepare_patch_up(version).map(|_| ()),
            Operation::PatchDown(version) => migrator.prepare_patch_down(version).map(|_| ()),
        }
    }
}

impl fmt::Display for Operation<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Up(v) => write!(f, "up to {v}"),
            Operation::Down(v) => write!(f, "down to {v}"),
            Operation::PatchUp(v) => write!(f, "patch up {v}"),
            Operation::PatchDown(v) => write!(f, "patch down {v}"),
        }
    }
}

/// Prepare `op`, print the preview, then either roll back (dry run) or run
/// and commit.
pub(crate) fn apply(op: Operation<'_>, args: &ApplyArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = RuntimeContext::new(global)?;
    let mut migrator = ctx.migrator()?;

    op.prepare(&mut migrator)
        .with_context(|| format!("Failed to prepare migration {op}"))?;

    let preview = migrator.preview();
    if preview.is_empty() {
        println!("Nothing staged for {op}");
    } else {
        println!("{preview}");
    }

    if args.dry_run {
        migrator.rollback()?;
        println!("Dry run: rolled back, nothing applied");
        return Ok(());
    }

    migrator
        .run(args.kind.sql_kind())
        .with_context(|| format!("Failed to run migration {op}"))?
        .commit()
        .with_context(|| format!("Failed to commit migration {op}"))?;

    match migrator.stamp() {
        Some(stamp) => println!("Applied {stamp}"),
        None => println!("No version change"),
    }
    let current = migrator.connector().last_run_version()?;
    println!(
        "Current version: {}",
        current.as_ref().map_or("<none>", |v| v.as_str())
    );
    Ok(())
}

#[cfg(test)]
#[path = "common_test.rs"]
mod tests;
