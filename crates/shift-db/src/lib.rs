//! shift-db - DuckDB connector for Shift
//!
//! This crate implements the `shift_core::Connector` trait on top of DuckDB:
//! dry-run rendering, transactional execution, and the version history table.

pub mod duckdb;
pub mod error;
pub mod history;
pub mod render;

pub use self::duckdb::{DuckDbConnector, DuckDbOptions};
pub use error::{DbError, DbResult};
pub use history::HistoryEntry;
pub use render::render_sql;
