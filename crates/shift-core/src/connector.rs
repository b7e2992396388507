//! Connector trait definition

use crate::error::MigrateResult;
use crate::sql_item::SqlItem;
use crate::value::{Row, Value};
use crate::version::{Version, VersionStamp};

/// Database connector consumed by the migration engine.
///
/// A connector is handed to the engine with its transaction already open.
/// Everything dialect-specific (placeholder syntax, literal quoting, where the
/// applied version is persisted) lives behind this trait.
pub trait Connector {
    /// Run a query and return its first row, if any
    fn find_one(&self, sql: &str, values: &[Value]) -> MigrateResult<Option<Row>>;

    /// Run a query and return every row
    fn find_all(&self, sql: &str, values: &[Value]) -> MigrateResult<Vec<Row>>;

    /// Driver identifier, e.g. `"duckdb"`
    fn drive(&self) -> &str;

    /// Dry-run render `sql` + `values` into a staged item without executing it
    fn render(&self, sql: &str, values: &[Value]) -> MigrateResult<SqlItem>;

    /// Highest sequential version whose commit succeeded, `None` if nothing
    /// was ever applied
    fn last_run_version(&self) -> MigrateResult<Option<Version>>;

    /// Execute one statement on the open transaction
    fn execute(&mut self, sql: &str, values: &[Value]) -> MigrateResult<()>;

    /// Stage the version to record atomically with the next [`commit`](Self::commit)
    fn stage_version(&mut self, stamp: VersionStamp);

    /// Roll back the open transaction. Rolling back a closed transaction is a no-op.
    fn rollback(&mut self) -> MigrateResult<()>;

    /// Commit the open transaction, recording the staged version if any
    fn commit(&mut self) -> MigrateResult<()>;
}
