//! Capability handed to scripts while they stage statements.

use crate::connector::Connector;
use crate::error::{MigrateError, MigrateResult};
use crate::sql_item::{SqlItem, SqlKind};
use crate::value::{Row, Value};
use crate::version::Version;

/// The two pending statement batches of one engine.
#[derive(Debug, Default, Clone)]
pub struct Batches {
    pub(crate) ddl: Vec<SqlItem>,
    pub(crate) dml: Vec<SqlItem>,
}

impl Batches {
    pub fn ddl(&self) -> &[SqlItem] {
        &self.ddl
    }

    pub fn dml(&self) -> &[SqlItem] {
        &self.dml
    }

    pub fn is_empty(&self) -> bool {
        self.ddl.is_empty() && self.dml.is_empty()
    }
}

/// What a script may do while preparing: stage statements, read current data,
/// and check the driver.
///
/// Staging never touches the live transaction; it only records the rendered
/// statement in the engine's batches.
pub struct Options<'a> {
    conn: &'a dyn Connector,
    batches: &'a mut Batches,
    version: Version,
}

impl<'a> Options<'a> {
    pub(crate) fn new(conn: &'a dyn Connector, batches: &'a mut Batches, version: Version) -> Self {
        Self {
            conn,
            batches,
            version,
        }
    }

    /// Stage one statement into the DDL or DML batch.
    ///
    /// `kind` must be exactly [`SqlKind::DDL`] or [`SqlKind::DML`]; anything
    /// else fails without touching either batch.
    pub fn exec(&mut self, kind: SqlKind, sql: &str, values: &[Value]) -> MigrateResult<()> {
        let batch = match kind {
            SqlKind::DDL => &mut self.batches.ddl,
            SqlKind::DML => &mut self.batches.dml,
            other => return Err(MigrateError::UnsupportedKind { kind: other }),
        };
        let item = self.conn.render(sql, values)?;
        log::debug!(
            "Staged {} for {}: {}",
            kind,
            self.version,
            item.preview()
        );
        batch.push(item);
        Ok(())
    }

    /// Shorthand for `exec(SqlKind::DDL, ..)`
    pub fn ddl(&mut self, sql: &str) -> MigrateResult<()> {
        self.exec(SqlKind::DDL, sql, &[])
    }

    /// Shorthand for `exec(SqlKind::DML, ..)`
    pub fn dml(&mut self, sql: &str, values: &[Value]) -> MigrateResult<()> {
        self.exec(SqlKind::DML, sql, values)
    }

    pub fn find_one(&self, sql: &str, values: &[Value]) -> MigrateResult<Option<Row>> {
        self.conn.find_one(sql, values)
    }

    pub fn find_all(&self, sql: &str, values: &[Value]) -> MigrateResult<Vec<Row>> {
        self.conn.find_all(sql, values)
    }

    /// Driver identifier, for scripts that branch on dialect
    pub fn drive(&self) -> &str {
        self.conn.drive()
    }

    /// Version of the script being prepared
    pub fn version(&self) -> &Version {
        &self.version
    }
}

#[cfg(test)]
#[path = "options_test.rs"]
mod tests;
