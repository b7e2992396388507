//! DuckDB connector implementation

use crate::error::{DbError, DbResult};
use crate::history::{HistoryEntry, HistoryTable};
use crate::render::render_sql;
use duckdb::types::Value as DuckValue;
use duckdb::{params_from_iter, Connection};
use shift_core::{
    Connector, DatabaseConfig, MigrateResult, Row, SqlItem, Value, Version, VersionStamp,
};
use std::path::Path;

/// Connector settings that do not come from the connection itself
#[derive(Debug, Clone)]
pub struct DuckDbOptions {
    /// Table recording applied versions
    pub history_table: String,
}

impl Default for DuckDbOptions {
    fn default() -> Self {
        Self {
            history_table: DatabaseConfig::default().history_table,
        }
    }
}

/// DuckDB connector.
///
/// Opening the connector creates the history table if needed and then
/// starts the migration transaction.
pub struct DuckDbConnector {
    conn: Connection,
    history: HistoryTable,
    staged: Option<VersionStamp>,
    in_transaction: bool,
}

impl DuckDbConnector {
    /// Open (or create) the database file at `path`.
    pub fn open(path: &Path, options: DuckDbOptions) -> DbResult<Self> {
        let conn = Connection::open(path)
            .map_err(|e| DbError::ConnectionError(format!("{e}: {}", path.display())))?;
        Self::with_connection(conn, options)
    }

    /// Open a fresh in-memory database.
    pub fn open_memory(options: DuckDbOptions) -> DbResult<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Self::with_connection(conn, options)
    }

    /// Create from path string (handles :memory: special case)
    pub fn new(path: &str, options: DuckDbOptions) -> DbResult<Self> {
        if path == ":memory:" {
            Self::open_memory(options)
        } else {
            Self::open(Path::new(path), options)
        }
    }

    /// Open the database described by a project's database config.
    ///
    /// A relative file path is resolved against `root`.
    pub fn from_config(config: &DatabaseConfig, root: &Path) -> DbResult<Self> {
        let options = DuckDbOptions {
            history_table: config.history_table.clone(),
        };
        if config.path == ":memory:" {
            Self::open_memory(options)
        } else {
            Self::open(&root.join(&config.path), options)
        }
    }

    fn with_connection(conn: Connection, options: DuckDbOptions) -> DbResult<Self> {
        let history = HistoryTable::new(options.history_table);
        history.ensure(&conn)?;
        let mut connector = Self {
            conn,
            history,
            staged: None,
            in_transaction: false,
        };
        connector.begin()?;
        Ok(connector)
    }

    /// Start a new transaction after the previous one was committed or
    /// rolled back.
    pub fn begin(&mut self) -> DbResult<()> {
        if self.in_transaction {
            return Err(DbError::TransactionError(
                "a transaction is already open".to_string(),
            ));
        }
        self.conn
            .execute_batch("BEGIN TRANSACTION")
            .map_err(|e| DbError::TransactionError(format!("BEGIN failed: {e}")))?;
        self.in_transaction = true;
        Ok(())
    }

    /// Whether a transaction is currently open
    pub fn in_transaction(&self) -> bool {
        self.in_transaction
    }

    /// Name of the history table
    pub fn history_table(&self) -> &str {
        self.history.name()
    }

    /// Every recorded history row, oldest first
    pub fn history(&self) -> DbResult<Vec<HistoryEntry>> {
        self.history.entries(&self.conn)
    }

    /// Patch versions currently recorded as applied
    pub fn applied_patches(&self) -> DbResult<Vec<Version>> {
        self.history.patches(&self.conn)
    }

    /// Borrow the underlying DuckDB connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    fn query(&self, sql: &str, values: &[Value]) -> DbResult<Vec<Row>> {
        let mut stmt = self.conn.prepare(sql)?;

        // Column metadata is only reliable after execution.
        let raw_rows: Vec<Vec<Value>> = stmt
            .query_map(params_from_iter(values.iter().map(to_duck)), |row| {
                let col_count = row.as_ref().column_count();
                (0..col_count)
                    .map(|i| row.get::<_, DuckValue>(i).map(from_duck))
                    .collect()
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let column_count = stmt.column_count();
        let columns: Vec<String> = (0..column_count)
            .map(|i| {
                stmt.column_name(i)
                    .map_or("?".to_string(), |v| v.to_string())
            })
            .collect();

        Ok(raw_rows
            .into_iter()
            .map(|values| Row::new(columns.clone(), values))
            .collect())
    }

    fn require_transaction(&self, action: &str) -> DbResult<()> {
        if self.in_transaction {
            Ok(())
        } else {
            Err(DbError::TransactionError(format!(
                "cannot {action}: no open transaction"
            )))
        }
    }
}

impl Connector for DuckDbConnector {
    fn find_one(&self, sql: &str, values: &[Value]) -> MigrateResult<Option<Row>> {
        Ok(self.query(sql, values)?.into_iter().next())
    }

    fn find_all(&self, sql: &str, values: &[Value]) -> MigrateResult<Vec<Row>> {
        Ok(self.query(sql, values)?)
    }

    fn drive(&self) -> &str {
        "duckdb"
    }

    fn render(&self, sql: &str, values: &[Value]) -> MigrateResult<SqlItem> {
        let rendered = render_sql(sql, values)?;
        Ok(SqlItem::new(sql, values.to_vec(), &rendered))
    }

    fn last_run_version(&self) -> MigrateResult<Option<Version>> {
        Ok(self.history.last_version(&self.conn)?)
    }

    fn execute(&mut self, sql: &str, values: &[Value]) -> MigrateResult<()> {
        self.require_transaction("execute")?;
        self.conn
            .execute(sql, params_from_iter(values.iter().map(to_duck)))
            .map_err(DbError::from)?;
        Ok(())
    }

    fn stage_version(&mut self, stamp: VersionStamp) {
        self.staged = Some(stamp);
    }

    fn rollback(&mut self) -> MigrateResult<()> {
        self.staged = None;
        if !self.in_transaction {
            return Ok(());
        }
        self.in_transaction = false;
        self.conn
            .execute_batch("ROLLBACK")
            .map_err(|e| DbError::TransactionError(format!("ROLLBACK failed: {e}")))?;
        Ok(())
    }

    fn commit(&mut self) -> MigrateResult<()> {
        self.require_transaction("commit")?;
        if let Some(stamp) = self.staged.take() {
            self.history.record(&self.conn, &stamp)?;
            log::debug!("Recorded {stamp} in {}", self.history.name());
        }
        self.conn
            .execute_batch("COMMIT")
            .map_err(|e| DbError::TransactionError(format!("COMMIT failed: {e}")))?;
        self.in_transaction = false;
        Ok(())
    }
}

fn to_duck(value: &Value) -> DuckValue {
    match value {
        Value::Null => DuckValue::Null,
        Value::Bool(b) => DuckValue::Boolean(*b),
        Value::Int(n) => DuckValue::BigInt(*n),
        Value::Float(f) => DuckValue::Double(*f),
        Value::Text(s) => DuckValue::Text(s.clone()),
        Value::Blob(b) => DuckValue::Blob(b.clone()),
    }
}

fn from_duck(value: DuckValue) -> Value {
    match value {
        DuckValue::Null => Value::Null,
        DuckValue::Boolean(b) => Value::Bool(b),
        DuckValue::TinyInt(n) => Value::Int(n.into()),
        DuckValue::SmallInt(n) => Value::Int(n.into()),
        DuckValue::Int(n) => Value::Int(n.into()),
        DuckValue::BigInt(n) => Value::Int(n),
        DuckValue::UTinyInt(n) => Value::Int(n.into()),
        DuckValue::USmallInt(n) => Value::Int(n.into()),
        DuckValue::UInt(n) => Value::Int(n.into()),
        DuckValue::UBigInt(n) => i64::try_from(n)
            .map(Value::Int)
            .unwrap_or_else(|_| Value::Text(n.to_string())),
        DuckValue::HugeInt(n) => i64::try_from(n)
            .map(Value::Int)
            .unwrap_or_else(|_| Value::Text(n.to_string())),
        DuckValue::Float(f) => Value::Float(f.into()),
        DuckValue::Double(f) => Value::Float(f),
        DuckValue::Text(s) | DuckValue::Enum(s) => Value::Text(s),
        DuckValue::Blob(b) => Value::Blob(b),
        other => Value::Text(format!("{other:?}")),
    }
}

#[cfg(test)]
#[path = "duckdb_test.rs"]
mod tests;
