//! Migration engine.
//!
//! A [`Migrator`] wraps a connector whose transaction is already open and
//! walks one run through its lifecycle:
//!
//! ```text
//! Empty --prepare_*--> Staged --run--> Ran --commit--> Committed
//!   \                    |              |
//!    `------------------ any error -----'--> Failed
//! ```
//!
//! Every error path rolls the transaction back before the error is returned,
//! and a failed engine rejects every further operation.

use crate::connector::Connector;
use crate::error::{MigrateError, MigrateResult};
use crate::options::{Batches, Options};
use crate::script::{check_version, Script, ScriptRegistry};
use crate::span::version_span;
use crate::sql_item::{SqlItem, SqlKind};
use crate::version::{Direction, Version, VersionStamp};
use std::fmt;

/// Lifecycle position of a [`Migrator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// Scripts may be registered; nothing staged yet
    Empty,
    /// Statements staged, preview available
    Staged,
    /// Statements executed on the open transaction
    Ran,
    /// Transaction committed
    Committed,
    /// Transaction rolled back after an error or an explicit rollback
    Failed,
}

impl EngineState {
    /// Whether the connector's transaction is still open in this state.
    fn transaction_open(self) -> bool {
        matches!(
            self,
            EngineState::Empty | EngineState::Staged | EngineState::Ran
        )
    }
}

impl fmt::Display for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineState::Empty => write!(f, "empty"),
            EngineState::Staged => write!(f, "staged"),
            EngineState::Ran => write!(f, "run"),
            EngineState::Committed => write!(f, "committed"),
            EngineState::Failed => write!(f, "failed"),
        }
    }
}

/// Orchestrates one migration run against one connector.
///
/// Not meant to be shared: one instance per run, driven by a single caller.
pub struct Migrator<C: Connector> {
    conn: C,
    scripts: ScriptRegistry,
    batches: Batches,
    stamp: Option<VersionStamp>,
    ran: SqlKind,
    state: EngineState,
}

impl<C: Connector> Migrator<C> {
    /// Create an engine around a connector with an open transaction.
    pub fn new(conn: C) -> Self {
        Self {
            conn,
            scripts: ScriptRegistry::new(),
            batches: Batches::default(),
            stamp: None,
            ran: SqlKind::from_bits(0),
            state: EngineState::Empty,
        }
    }

    /// Register `script` under `version`.
    pub fn add_script<S: Script + 'static>(
        &mut self,
        version: &str,
        script: S,
    ) -> MigrateResult<&mut Self> {
        self.add_boxed_script(version, Box::new(script))
    }

    /// Register an already boxed script under `version`.
    pub fn add_boxed_script(
        &mut self,
        version: &str,
        script: Box<dyn Script>,
    ) -> MigrateResult<&mut Self> {
        self.ensure_state(EngineState::Empty, "add a script")?;
        let result = Version::parse(version).and_then(|v| self.scripts.insert(v, script));
        match result {
            Ok(()) => Ok(self),
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Stage the `up` of every sequential version above the last applied one
    /// and up to `target`, ascending.
    pub fn prepare_up(&mut self, target: &str) -> MigrateResult<&mut Self> {
        self.ensure_state(EngineState::Empty, "prepare")?;
        let result = self.stage_up(target);
        self.finish_prepare(result)
    }

    /// Stage the `down` of every sequential version above `target` and up to
    /// the last applied one, descending.
    pub fn prepare_down(&mut self, target: &str) -> MigrateResult<&mut Self> {
        self.ensure_state(EngineState::Empty, "prepare")?;
        let result = self.stage_down(target);
        self.finish_prepare(result)
    }

    /// Stage the `up` of the single patch script registered as `version`.
    pub fn prepare_patch_up(&mut self, version: &str) -> MigrateResult<&mut Self> {
        self.ensure_state(EngineState::Empty, "prepare")?;
        let result = self.stage_patch(version, Direction::PatchUp);
        self.finish_prepare(result)
    }

    /// Stage the `down` of the single patch script registered as `version`.
    pub fn prepare_patch_down(&mut self, version: &str) -> MigrateResult<&mut Self> {
        self.ensure_state(EngineState::Empty, "prepare")?;
        let result = self.stage_patch(version, Direction::PatchDown);
        self.finish_prepare(result)
    }

    /// Execute the staged batches selected by `kind` on the open transaction:
    /// DDL first, then DML, each in staged order.
    pub fn run(&mut self, kind: SqlKind) -> MigrateResult<&mut Self> {
        self.ensure_state(EngineState::Staged, "run")?;
        if kind.bits() == 0 || !SqlKind::ALL.contains(kind) {
            return Err(self.fail(MigrateError::UnsupportedKind { kind }));
        }

        match self.execute_batches(kind) {
            Ok(()) => {
                self.ran = kind;
                self.state = EngineState::Ran;
                Ok(self)
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Commit the transaction, recording the run's version stamp with it.
    ///
    /// Refused when `run` skipped a batch that has statements staged.
    pub fn commit(&mut self) -> MigrateResult<&mut Self> {
        self.ensure_state(EngineState::Ran, "commit")?;
        if let Some(skipped) = self.skipped_kind() {
            return Err(self.fail(MigrateError::PartialRun { skipped }));
        }
        if let Some(stamp) = &self.stamp {
            self.conn.stage_version(stamp.clone());
        }

        match self.conn.commit() {
            Ok(()) => {
                self.state = EngineState::Committed;
                match &self.stamp {
                    Some(stamp) => log::info!("Committed migration {stamp}"),
                    None => log::info!("Committed migration with no version change"),
                }
                Ok(self)
            }
            Err(e) => Err(self.fail(MigrateError::Commit {
                source: Box::new(e),
            })),
        }
    }

    /// Abandon the run and roll the transaction back.
    ///
    /// A no-op once the transaction is closed.
    pub fn rollback(&mut self) -> MigrateResult<()> {
        if !self.state.transaction_open() {
            return Ok(());
        }
        self.state = EngineState::Failed;
        self.conn.rollback()
    }

    /// Driver identifier of the connector
    pub fn drive(&self) -> &str {
        self.conn.drive()
    }

    /// Human-readable listing of every staged statement, DDL before DML.
    ///
    /// An empty batch contributes no section; with nothing staged the
    /// preview is empty.
    pub fn preview(&self) -> String {
        let mut sections = Vec::with_capacity(2);
        if !self.batches.ddl.is_empty() {
            sections.push(preview_section("DDL", &self.batches.ddl));
        }
        if !self.batches.dml.is_empty() {
            sections.push(preview_section("DML", &self.batches.dml));
        }
        sections.join("\n")
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn ddl(&self) -> &[SqlItem] {
        self.batches.ddl()
    }

    pub fn dml(&self) -> &[SqlItem] {
        self.batches.dml()
    }

    /// Version and direction this run records on commit, if any
    pub fn stamp(&self) -> Option<&VersionStamp> {
        self.stamp.as_ref()
    }

    pub fn scripts(&self) -> &ScriptRegistry {
        &self.scripts
    }

    pub fn connector(&self) -> &C {
        &self.conn
    }

    pub fn into_connector(self) -> C {
        self.conn
    }

    fn stage_up(&mut self, target: &str) -> MigrateResult<()> {
        let target = sequential_target(target)?;
        let current = self.conn.last_run_version()?;
        let span = version_span(&self.scripts, current.as_ref(), &target)?;
        log::debug!(
            "Up from {} to {}: {} script(s)",
            current.as_ref().map_or("<none>", |v| v.as_str()),
            target,
            span.len()
        );

        for version in &span {
            self.stage_script(version, Direction::Up)?;
        }
        if let Some(highest) = span.last() {
            self.stamp = Some(VersionStamp::new(highest.clone(), Direction::Up));
        }
        Ok(())
    }

    fn stage_down(&mut self, target: &str) -> MigrateResult<()> {
        let target = sequential_target(target)?;
        let current = self.conn.last_run_version()?;
        let span = match &current {
            Some(current) => version_span(&self.scripts, Some(&target), current)?,
            None => {
                self.scripts.check_versions()?;
                Vec::new()
            }
        };
        log::debug!(
            "Down from {} to {}: {} script(s)",
            current.as_ref().map_or("<none>", |v| v.as_str()),
            target,
            span.len()
        );

        for version in span.iter().rev() {
            self.stage_script(version, Direction::Down)?;
        }
        if !span.is_empty() {
            self.stamp = Some(VersionStamp::new(target, Direction::Down));
        }
        Ok(())
    }

    fn stage_patch(&mut self, version: &str, direction: Direction) -> MigrateResult<()> {
        let version = Version::parse(version)?;
        if !version.is_patch() {
            return Err(MigrateError::InvalidPatchVersion {
                version: version.into_inner(),
            });
        }
        let script = self
            .scripts
            .get(&version)
            .ok_or_else(|| MigrateError::PatchNotFound {
                version: version.to_string(),
            })?;
        check_version(&version, script)?;

        self.stage_script(&version, direction)?;
        self.stamp = Some(VersionStamp::new(version, direction));
        Ok(())
    }

    /// Hand a fresh [`Options`] to the script registered as `version` and let
    /// it stage its statements for `direction`.
    fn stage_script(&mut self, version: &Version, direction: Direction) -> MigrateResult<()> {
        let script = self
            .scripts
            .get(version)
            .ok_or_else(|| MigrateError::script(version.as_str(), "script is not registered"))?;
        log::debug!(
            "Preparing {} {} ({})",
            direction,
            version,
            script.info().remark
        );

        let mut opt = Options::new(&self.conn, &mut self.batches, version.clone());
        match direction {
            Direction::Up | Direction::PatchUp => script.up(&mut opt),
            Direction::Down | Direction::PatchDown => script.down(&mut opt),
        }
    }

    fn finish_prepare(&mut self, result: MigrateResult<()>) -> MigrateResult<&mut Self> {
        match result {
            Ok(()) => {
                self.state = EngineState::Staged;
                log::debug!(
                    "Staged {} DDL and {} DML statement(s)",
                    self.batches.ddl.len(),
                    self.batches.dml.len()
                );
                Ok(self)
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    fn execute_batches(&mut self, kind: SqlKind) -> MigrateResult<()> {
        if kind.contains(SqlKind::DDL) {
            for item in &self.batches.ddl {
                execute_item(&mut self.conn, item)?;
            }
        }
        if kind.contains(SqlKind::DML) {
            for item in &self.batches.dml {
                execute_item(&mut self.conn, item)?;
            }
        }
        Ok(())
    }

    /// Non-empty batches the last `run` did not execute
    fn skipped_kind(&self) -> Option<SqlKind> {
        let mut skipped = SqlKind::from_bits(0);
        if !self.ran.contains(SqlKind::DDL) && !self.batches.ddl.is_empty() {
            skipped = skipped | SqlKind::DDL;
        }
        if !self.ran.contains(SqlKind::DML) && !self.batches.dml.is_empty() {
            skipped = skipped | SqlKind::DML;
        }
        (skipped.bits() != 0).then_some(skipped)
    }

    fn ensure_state(&mut self, expected: EngineState, action: &'static str) -> MigrateResult<()> {
        if self.state == expected {
            return Ok(());
        }
        let state = self.state;
        Err(self.fail(MigrateError::InvalidState { action, state }))
    }

    /// Roll back if the transaction is still open, then hand `err` back for
    /// propagation. A failing rollback is logged; the original error wins.
    fn fail(&mut self, err: MigrateError) -> MigrateError {
        if self.state.transaction_open() {
            self.state = EngineState::Failed;
            if let Err(rollback_err) = self.conn.rollback() {
                log::warn!("Rollback after error failed: {rollback_err}");
            }
        }
        err
    }
}

impl<C: Connector> fmt::Display for Migrator<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.preview())
    }
}

/// Parse a target for a sequential run; patch versions are only reachable
/// through the patch operations.
fn sequential_target(target: &str) -> MigrateResult<Version> {
    let target = Version::parse(target)?;
    if target.is_patch() {
        return Err(MigrateError::InvalidVersion {
            message: format!(
                "'{target}' is a patch version; use a patch operation to apply it"
            ),
        });
    }
    Ok(target)
}

fn execute_item<C: Connector>(conn: &mut C, item: &SqlItem) -> MigrateResult<()> {
    log::debug!("Executing: {}", item.preview());
    conn.execute(item.template(), item.values())
        .map_err(|e| MigrateError::Execution {
            preview: item.preview().to_string(),
            source: Box::new(e),
        })
}

fn preview_section(label: &str, items: &[SqlItem]) -> String {
    let mut out = format!("===== {label} SQL EXEC PREVIEW START =====");
    for (i, item) in items.iter().enumerate() {
        out.push_str(&format!("\n{}: {}", i + 1, item.preview()));
    }
    out.push_str(&format!(
        "\nTOTAL: {}\n=====  {label} SQL EXEC PREVIEW END  =====",
        items.len()
    ));
    out
}

#[cfg(test)]
#[path = "migrator_test.rs"]
mod tests;
