//! Shared test utilities for shift-core
//!
//! [`RecordingConnector`] is an in-memory connector that renders `?`
//! placeholders naively and records every call in order. [`StubScript`]
//! stages a fixed list of statements.

use crate::connector::Connector;
use crate::error::{MigrateError, MigrateResult};
use crate::options::Options;
use crate::script::{Script, ScriptInfo};
use crate::sql_item::{SqlItem, SqlKind};
use crate::value::{Row, Value};
use crate::version::{Version, VersionStamp};

/// Connector double that records calls instead of talking to a database.
#[derive(Debug, Default)]
pub struct RecordingConnector {
    /// Reported by `last_run_version`
    pub last_version: Option<Version>,
    /// Returned by `find_one` (first row) and `find_all`
    pub rows: Vec<Row>,
    /// `execute` fails when the template contains this text
    pub fail_execute_on: Option<String>,
    /// `commit` fails
    pub fail_commit: bool,
    /// `rollback` fails
    pub fail_rollback: bool,
    /// Every mutating call in order: `execute: <sql>`, `stage: <stamp>`,
    /// `commit`, `rollback`
    pub events: Vec<String>,
    /// Statements executed successfully
    pub executed: Vec<String>,
    /// Stamp passed to `stage_version`
    pub staged: Option<VersionStamp>,
    /// Stamps recorded by successful commits
    pub committed: Vec<VersionStamp>,
    pub commits: usize,
    pub rollbacks: usize,
}

impl RecordingConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Connector whose history already reached `version`.
    pub fn at_version(version: &str) -> Self {
        Self {
            last_version: Some(Version::new(version)),
            ..Self::default()
        }
    }

    pub fn failing_on(mut self, fragment: &str) -> Self {
        self.fail_execute_on = Some(fragment.to_string());
        self
    }

    pub fn with_rows(mut self, rows: Vec<Row>) -> Self {
        self.rows = rows;
        self
    }
}

impl Connector for RecordingConnector {
    fn find_one(&self, _sql: &str, _values: &[Value]) -> MigrateResult<Option<Row>> {
        Ok(self.rows.first().cloned())
    }

    fn find_all(&self, _sql: &str, _values: &[Value]) -> MigrateResult<Vec<Row>> {
        Ok(self.rows.clone())
    }

    fn drive(&self) -> &str {
        "recording"
    }

    fn render(&self, sql: &str, values: &[Value]) -> MigrateResult<SqlItem> {
        let mut rendered = String::with_capacity(sql.len());
        let mut remaining = values.iter();
        for ch in sql.chars() {
            if ch == '?' {
                match remaining.next() {
                    Some(Value::Text(s)) => rendered.push_str(&format!("'{s}'")),
                    Some(v) => rendered.push_str(&v.to_string()),
                    None => return Err(MigrateError::Database("missing bound value".into())),
                }
            } else {
                rendered.push(ch);
            }
        }
        Ok(SqlItem::new(sql, values.to_vec(), &rendered))
    }

    fn last_run_version(&self) -> MigrateResult<Option<Version>> {
        Ok(self.last_version.clone())
    }

    fn execute(&mut self, sql: &str, _values: &[Value]) -> MigrateResult<()> {
        self.events.push(format!("execute: {sql}"));
        if let Some(fragment) = &self.fail_execute_on {
            if sql.contains(fragment.as_str()) {
                return Err(MigrateError::Database(format!("cannot execute {sql}")));
            }
        }
        self.executed.push(sql.to_string());
        Ok(())
    }

    fn stage_version(&mut self, stamp: VersionStamp) {
        self.events.push(format!("stage: {stamp}"));
        self.staged = Some(stamp);
    }

    fn rollback(&mut self) -> MigrateResult<()> {
        self.events.push("rollback".to_string());
        self.rollbacks += 1;
        self.staged = None;
        if self.fail_rollback {
            return Err(MigrateError::Database("rollback failed".into()));
        }
        Ok(())
    }

    fn commit(&mut self) -> MigrateResult<()> {
        self.events.push("commit".to_string());
        if self.fail_commit {
            return Err(MigrateError::Database("commit failed".into()));
        }
        self.commits += 1;
        if let Some(stamp) = self.staged.take() {
            self.committed.push(stamp);
        }
        Ok(())
    }
}

/// Script that stages a fixed list of statements.
#[derive(Debug, Clone)]
pub struct StubScript {
    version: String,
    reported: String,
    remark: String,
    up: Vec<(SqlKind, String, Vec<Value>)>,
    down: Vec<(SqlKind, String, Vec<Value>)>,
    fail_up: Option<String>,
}

impl StubScript {
    pub fn new(version: &str) -> Self {
        Self {
            version: version.to_string(),
            reported: version.to_string(),
            remark: format!("stub {version}"),
            up: Vec::new(),
            down: Vec::new(),
            fail_up: None,
        }
    }

    /// Script with one DDL statement each way: `-- up <version>` and
    /// `-- down <version>`.
    pub fn marked(version: &str) -> Self {
        Self::new(version)
            .on_up(SqlKind::DDL, &format!("-- up {version}"))
            .on_down(SqlKind::DDL, &format!("-- down {version}"))
    }

    pub fn on_up(mut self, kind: SqlKind, sql: &str) -> Self {
        self.up.push((kind, sql.to_string(), Vec::new()));
        self
    }

    pub fn on_up_with(mut self, kind: SqlKind, sql: &str, values: Vec<Value>) -> Self {
        self.up.push((kind, sql.to_string(), values));
        self
    }

    pub fn on_down(mut self, kind: SqlKind, sql: &str) -> Self {
        self.down.push((kind, sql.to_string(), Vec::new()));
        self
    }

    /// Report `version` from `info()` regardless of the registration key.
    pub fn reporting(mut self, version: &str) -> Self {
        self.reported = version.to_string();
        self
    }

    pub fn failing_up(mut self, message: &str) -> Self {
        self.fail_up = Some(message.to_string());
        self
    }

    fn stage(
        opt: &mut Options<'_>,
        statements: &[(SqlKind, String, Vec<Value>)],
    ) -> MigrateResult<()> {
        for (kind, sql, values) in statements {
            opt.exec(*kind, sql, values)?;
        }
        Ok(())
    }
}

impl Script for StubScript {
    fn info(&self) -> ScriptInfo {
        ScriptInfo::new(Version::new(self.reported.as_str()), self.remark.as_str())
    }

    fn up(&self, opt: &mut Options<'_>) -> MigrateResult<()> {
        Self::stage(opt, &self.up)?;
        match &self.fail_up {
            Some(message) => Err(MigrateError::script(self.version.as_str(), message)),
            None => Ok(()),
        }
    }

    fn down(&self, opt: &mut Options<'_>) -> MigrateResult<()> {
        Self::stage(opt, &self.down)
    }
}
