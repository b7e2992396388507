//! Configuration types and parsing for shift.yml

use crate::error::{MigrateError, MigrateResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Environment variable consulted when no `--target` flag is given.
pub const TARGET_ENV_VAR: &str = "SHIFT_TARGET";

const CONFIG_FILES: [&str; 2] = ["shift.yml", "shift.yaml"];

/// Main project configuration from shift.yml
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Project name
    pub name: String,

    /// Directory holding one sub-directory per migration version
    #[serde(default = "default_migrations_dir")]
    pub migrations_dir: String,

    /// Database connection configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Named target configurations (e.g., dev, staging, prod)
    #[serde(default)]
    pub targets: HashMap<String, TargetConfig>,
}

/// Target-specific configuration overrides
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct TargetConfig {
    /// Database configuration override
    #[serde(default)]
    pub database: Option<DatabaseConfig>,
}

/// Database type selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DbType {
    #[default]
    DuckDb,
}

impl std::fmt::Display for DbType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DbType::DuckDb => write!(f, "duckdb"),
        }
    }
}

/// Database connection configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    #[serde(rename = "type", default)]
    pub db_type: DbType,

    /// Database path (file-based or :memory:)
    #[serde(default = "default_db_path")]
    pub path: String,

    /// Table recording applied versions
    #[serde(default = "default_history_table")]
    pub history_table: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            db_type: DbType::default(),
            path: default_db_path(),
            history_table: default_history_table(),
        }
    }
}

fn default_migrations_dir() -> String {
    "migrations".to_string()
}

fn default_db_path() -> String {
    ":memory:".to_string()
}

fn default_history_table() -> String {
    "shift_schema_history".to_string()
}

impl Config {
    /// Load configuration from a file path
    pub fn load(path: &Path) -> MigrateResult<Self> {
        if !path.exists() {
            return Err(MigrateError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| MigrateError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        let config: Config = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a project directory
    /// Looks for shift.yml or shift.yaml
    pub fn load_from_dir(dir: &Path) -> MigrateResult<Self> {
        for file in CONFIG_FILES {
            let path = dir.join(file);
            if path.exists() {
                return Self::load(&path);
            }
        }
        Err(MigrateError::ConfigNotFound {
            path: dir.join(CONFIG_FILES[0]).display().to_string(),
        })
    }

    fn validate(&self) -> MigrateResult<()> {
        if self.name.trim().is_empty() {
            return Err(MigrateError::ConfigInvalid {
                message: "Project name cannot be empty".to_string(),
            });
        }

        if self.migrations_dir.trim().is_empty() {
            return Err(MigrateError::ConfigInvalid {
                message: "migrations_dir cannot be empty".to_string(),
            });
        }

        let databases = std::iter::once(("base", &self.database)).chain(
            self.targets
                .iter()
                .filter_map(|(name, t)| t.database.as_ref().map(|db| (name.as_str(), db))),
        );
        for (owner, db) in databases {
            validate_history_table(owner, &db.history_table)?;
        }

        Ok(())
    }

    /// Get the migrations directory as an absolute path
    pub fn migrations_dir_absolute(&self, root: &Path) -> PathBuf {
        root.join(&self.migrations_dir)
    }

    /// Get available target names, sorted
    pub fn available_targets(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.targets.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Get database config, optionally applying target overrides
    pub fn get_database_config(&self, target: Option<&str>) -> MigrateResult<DatabaseConfig> {
        match target {
            Some(name) => {
                let target_config =
                    self.targets
                        .get(name)
                        .ok_or_else(|| MigrateError::ConfigInvalid {
                            message: format!(
                                "Target '{}' not found. Available targets: {}",
                                name,
                                self.available_targets().join(", ")
                            ),
                        })?;

                Ok(target_config
                    .database
                    .clone()
                    .unwrap_or_else(|| self.database.clone()))
            }
            None => Ok(self.database.clone()),
        }
    }

    /// Resolve target from CLI flag or SHIFT_TARGET environment variable
    ///
    /// Priority: CLI flag > SHIFT_TARGET env var > None
    pub fn resolve_target(cli_target: Option<&str>) -> Option<String> {
        cli_target
            .map(String::from)
            .or_else(|| std::env::var(TARGET_ENV_VAR).ok())
            .filter(|t| !t.is_empty())
    }
}

/// The history table name is interpolated into SQL, so only plain
/// identifiers (optionally schema-qualified) are accepted.
fn validate_history_table(owner: &str, table: &str) -> MigrateResult<()> {
    let valid = !table.is_empty()
        && table.split('.').all(|part| {
            let mut chars = part.chars();
            chars
                .next()
                .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        });
    if valid {
        Ok(())
    } else {
        Err(MigrateError::ConfigInvalid {
            message: format!("Invalid history_table '{table}' in {owner} database config"),
        })
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
