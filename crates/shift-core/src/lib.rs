//! shift-core - Core library for Shift
//!
//! This crate provides the migration engine, the script and connector
//! contracts it is built on, version-span resolution, SQL file scripts, and
//! project configuration parsing.

pub mod config;
pub mod connector;
pub mod error;
pub mod file_script;
pub mod migrator;
pub mod options;
pub mod script;
pub mod span;
pub mod sql_item;
#[cfg(any(test, feature = "test-support"))]
pub mod test_utils;
pub mod value;
pub mod version;

pub use config::{Config, DatabaseConfig, DbType, TargetConfig};
pub use connector::Connector;
pub use error::{MigrateError, MigrateResult};
pub use file_script::{discover_scripts, scaffold, SqlFileScript};
pub use migrator::{EngineState, Migrator};
pub use options::Options;
pub use script::{Script, ScriptInfo, ScriptRegistry};
pub use span::version_span;
pub use sql_item::{SqlItem, SqlKind};
pub use value::{Row, Value};
pub use version::{Direction, Version, VersionStamp, PATCH_PREFIX};
