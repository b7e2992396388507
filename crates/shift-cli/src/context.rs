//! Runtime context for CLI commands

use anyhow::{Context, Result};
use shift_core::{discover_scripts, Config, Migrator, SqlFileScript};
use shift_db::DuckDbConnector;
use std::path::{Path, PathBuf};

use crate::cli::GlobalArgs;

/// Loaded project configuration plus the resolved target
pub(crate) struct RuntimeContext {
    /// Project root directory
    pub root: PathBuf,

    /// Parsed shift.yml
    pub config: Config,

    /// Target from `--target` or `SHIFT_TARGET`
    pub target: Option<String>,
}

impl RuntimeContext {
    /// Load the project configuration named by the global arguments
    pub fn new(args: &GlobalArgs) -> Result<Self> {
        let root = PathBuf::from(&args.project_dir);
        let config = match &args.config {
            Some(config_path) => {
                Config::load(Path::new(config_path)).context("Failed to load configuration file")?
            }
            None => Config::load_from_dir(&root).context("Failed to load project configuration")?,
        };
        let target = Config::resolve_target(args.target.as_deref());
        log::debug!(
            "Loaded project '{}' (target: {})",
            config.name,
            target.as_deref().unwrap_or("base")
        );

        Ok(Self {
            root,
            config,
            target,
        })
    }

    pub fn migrations_dir(&self) -> PathBuf {
        self.config.migrations_dir_absolute(&self.root)
    }

    /// Open the target database with a fresh migration transaction
    pub fn connect(&self) -> Result<DuckDbConnector> {
        let db = self.config.get_database_config(self.target.as_deref())?;
        DuckDbConnector::from_config(&db, &self.root)
            .with_context(|| format!("Failed to connect to database '{}'", db.path))
    }

    /// Every migration found in the migrations directory
    pub fn scripts(&self) -> Result<Vec<SqlFileScript>> {
        let dir = self.migrations_dir();
        discover_scripts(&dir)
            .with_context(|| format!("Failed to load migrations from {}", dir.display()))
    }

    /// A migrator over the target database with every migration registered
    pub fn migrator(&self) -> Result<Migrator<DuckDbConnector>> {
        let scripts = self.scripts()?;
        let mut migrator = Migrator::new(self.connect()?);
        for script in scripts {
            let version = script.version().to_string();
            migrator
                .add_script(&version, script)
                .with_context(|| format!("Failed to register migration {version}"))?;
        }
        Ok(migrator)
    }
}
