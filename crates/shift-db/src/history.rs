//! Version history table.
//!
//! One row per recorded commit. Sequential rows track the current version
//! through `MAX(version)`; patch rows live alongside them and are excluded
//! from that lookup.

use crate::error::{DbError, DbResult};
use duckdb::{params, Connection};
use shift_core::{Direction, Version, VersionStamp, PATCH_PREFIX};

/// One recorded row of the history table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub version: Version,
    pub direction: String,
    pub applied_at: String,
}

/// Name of the history table plus the statements that maintain it.
#[derive(Debug, Clone)]
pub(crate) struct HistoryTable {
    name: String,
}

impl HistoryTable {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    /// Create the table (and its schema, when qualified) if missing.
    pub(crate) fn ensure(&self, conn: &Connection) -> DbResult<()> {
        let mut sql = String::new();
        if let Some((schema, _)) = self.name.rsplit_once('.') {
            sql.push_str(&format!("CREATE SCHEMA IF NOT EXISTS {schema};\n"));
        }
        sql.push_str(&format!(
            "CREATE TABLE IF NOT EXISTS {} (
                 version    VARCHAR NOT NULL,
                 direction  VARCHAR NOT NULL,
                 applied_at TIMESTAMP NOT NULL DEFAULT now()
             );",
            self.name
        ));
        conn.execute_batch(&sql).map_err(|e| {
            DbError::HistoryError(format!("failed to create {}: {e}", self.name))
        })
    }

    /// Highest recorded sequential version, `None` when nothing is applied.
    pub(crate) fn last_version(&self, conn: &Connection) -> DbResult<Option<Version>> {
        let version: Option<String> = conn
            .query_row(
                &format!(
                    "SELECT MAX(version) FROM {} WHERE NOT starts_with(version, ?)",
                    self.name
                ),
                params![PATCH_PREFIX],
                |row| row.get(0),
            )
            .map_err(|e| DbError::HistoryError(format!("failed to read version: {e}")))?;
        Ok(version.and_then(Version::try_new))
    }

    /// Record `stamp` on the open transaction.
    ///
    /// A down run removes every sequential row above its target and records
    /// the target, so `MAX(version)` lands on it.
    pub(crate) fn record(&self, conn: &Connection, stamp: &VersionStamp) -> DbResult<()> {
        let version = stamp.version.as_str();
        let direction = stamp.direction.as_str();
        let result = match stamp.direction {
            Direction::Up | Direction::PatchUp => self.insert(conn, version, direction),
            Direction::Down => conn
                .execute(
                    &format!(
                        "DELETE FROM {} WHERE version > ? AND NOT starts_with(version, ?)",
                        self.name
                    ),
                    params![version, PATCH_PREFIX],
                )
                .and_then(|_| self.insert(conn, version, direction)),
            Direction::PatchDown => conn
                .execute(
                    &format!("DELETE FROM {} WHERE version = ?", self.name),
                    params![version],
                )
                .map(|_| ()),
        };
        result.map_err(|e| DbError::HistoryError(format!("failed to record {stamp}: {e}")))
    }

    fn insert(&self, conn: &Connection, version: &str, direction: &str) -> duckdb::Result<()> {
        conn.execute(
            &format!(
                "INSERT INTO {} (version, direction) VALUES (?, ?)",
                self.name
            ),
            params![version, direction],
        )
        .map(|_| ())
    }

    /// Every recorded row, oldest first.
    pub(crate) fn entries(&self, conn: &Connection) -> DbResult<Vec<HistoryEntry>> {
        let mut stmt = conn
            .prepare(&format!(
                "SELECT version, direction, CAST(applied_at AS VARCHAR)
                 FROM {} ORDER BY applied_at, version",
                self.name
            ))
            .map_err(|e| DbError::HistoryError(format!("failed to read history: {e}")))?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })
            .map_err(|e| DbError::HistoryError(format!("failed to read history: {e}")))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| DbError::HistoryError(format!("row error: {e}")))?;

        Ok(rows
            .into_iter()
            .filter_map(|(version, direction, applied_at)| {
                Version::try_new(version).map(|version| HistoryEntry {
                    version,
                    direction,
                    applied_at,
                })
            })
            .collect())
    }

    /// Recorded patch versions, sorted.
    pub(crate) fn patches(&self, conn: &Connection) -> DbResult<Vec<Version>> {
        let mut stmt = conn
            .prepare(&format!(
                "SELECT DISTINCT version FROM {} WHERE starts_with(version, ?) ORDER BY version",
                self.name
            ))
            .map_err(|e| DbError::HistoryError(format!("failed to read patches: {e}")))?;
        let versions = stmt
            .query_map(params![PATCH_PREFIX], |row| row.get::<_, String>(0))
            .map_err(|e| DbError::HistoryError(format!("failed to read patches: {e}")))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| DbError::HistoryError(format!("row error: {e}")))?;
        Ok(versions.into_iter().filter_map(Version::try_new).collect())
    }
}
