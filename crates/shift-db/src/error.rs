//! Error types for shift-db

use shift_core::MigrateError;
use thiserror::Error;

/// Database operation errors
#[derive(Error, Debug)]
pub enum DbError {
    /// Connection error (D001)
    #[error("[D001] Database connection failed: {0}")]
    ConnectionError(String),

    /// Query execution error (D002)
    #[error("[D002] SQL execution failed: {0}")]
    ExecutionError(String),

    /// Transaction management error (D003)
    #[error("[D003] Transaction failed: {0}")]
    TransactionError(String),

    /// History table could not be read or written (D004)
    #[error("[D004] Version history error: {0}")]
    HistoryError(String),

    /// Placeholder count disagrees with the bound values (D005)
    #[error("[D005] Statement has {placeholders} placeholder(s) but {values} value(s) were bound")]
    PlaceholderMismatch { placeholders: usize, values: usize },
}

/// Result type alias for DbError
pub type DbResult<T> = Result<T, DbError>;

impl From<duckdb::Error> for DbError {
    fn from(err: duckdb::Error) -> Self {
        DbError::ExecutionError(err.to_string())
    }
}

impl From<DbError> for MigrateError {
    fn from(err: DbError) -> Self {
        MigrateError::Database(err.to_string())
    }
}
