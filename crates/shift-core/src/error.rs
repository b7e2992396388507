//! Error types for shift-core

use crate::sql_item::SqlKind;
use thiserror::Error;

/// Core error type for Shift
#[derive(Error, Debug)]
pub enum MigrateError {
    /// M001: Registry key disagrees with the script's own version
    #[error("[M001] Script registered as '{key}' reports version '{reported}'; the version config must equal the script version")]
    VersionMismatch { key: String, reported: String },

    /// M002: Patch operation on a version without the patch prefix
    #[error("[M002] Patch migration '{version}' must have the `PATCH.` prefix")]
    InvalidPatchVersion { version: String },

    /// M003: Patch script not registered
    #[error("[M003] No script registered for patch version '{version}'")]
    PatchNotFound { version: String },

    /// M004: Statement staged with a kind other than DDL or DML
    #[error("[M004] Unsupported statement kind {kind}: only DDL or DML statements can be staged")]
    UnsupportedKind { kind: SqlKind },

    /// M005: Same version registered twice
    #[error("[M005] Duplicate script registration for version '{version}'")]
    DuplicateVersion { version: String },

    /// M006: Version text is empty
    #[error("[M006] Invalid version: {message}")]
    InvalidVersion { message: String },

    /// M007: Operation called outside its lifecycle state
    #[error("[M007] Cannot {action} while the migration is {state}")]
    InvalidState {
        action: &'static str,
        state: crate::migrator::EngineState,
    },

    /// M008: Staged statement failed against the live transaction
    #[error("[M008] Statement failed: {source}. The raw error SQL: {preview}")]
    Execution {
        preview: String,
        #[source]
        source: Box<MigrateError>,
    },

    /// M009: Final commit failed
    #[error("[M009] Commit failed: {source}")]
    Commit {
        #[source]
        source: Box<MigrateError>,
    },

    /// M010: Connector reported an error
    #[error("[M010] Database error: {0}")]
    Database(String),

    /// M011: Script raised its own error while staging statements
    #[error("[M011] Script '{version}' failed: {message}")]
    Script { version: String, message: String },

    /// M012: Configuration file not found
    #[error("[M012] Config file not found: {path}")]
    ConfigNotFound { path: String },

    /// M013: Invalid configuration value
    #[error("[M013] Invalid config: {message}")]
    ConfigInvalid { message: String },

    /// M014: Migration directory or file problem
    #[error("[M014] Invalid migration directory at '{path}': {reason}")]
    InvalidScriptDirectory { path: String, reason: String },

    /// M015: IO error with file path context
    #[error("[M015] Failed to access '{path}': {source}")]
    IoWithPath {
        path: String,
        source: std::io::Error,
    },

    /// M016: YAML parse error
    #[error("[M016] Config parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    /// M017: Commit after a run that skipped a non-empty batch
    #[error("[M017] Cannot commit: the staged {skipped} statements were not run, so the version cannot be recorded")]
    PartialRun { skipped: SqlKind },
}

impl MigrateError {
    /// Build a script error for `version` from any displayable cause.
    pub fn script(version: impl Into<String>, message: impl std::fmt::Display) -> Self {
        MigrateError::Script {
            version: version.into(),
            message: message.to_string(),
        }
    }

    /// Whether this error is a configuration error (as opposed to a failure
    /// reported by the database).
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            MigrateError::VersionMismatch { .. }
                | MigrateError::InvalidPatchVersion { .. }
                | MigrateError::PatchNotFound { .. }
                | MigrateError::UnsupportedKind { .. }
                | MigrateError::DuplicateVersion { .. }
                | MigrateError::InvalidVersion { .. }
                | MigrateError::InvalidState { .. }
                | MigrateError::PartialRun { .. }
        )
    }
}

/// Result type alias for MigrateError
pub type MigrateResult<T> = Result<T, MigrateError>;
