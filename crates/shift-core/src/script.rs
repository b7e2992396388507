//! Script contract and the per-engine registry.

use crate::error::{MigrateError, MigrateResult};
use crate::options::Options;
use crate::version::Version;
use std::collections::BTreeMap;

/// Metadata a script reports about itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptInfo {
    /// Must equal the key the script is registered under
    pub version: Version,
    /// Free-form description shown in status output
    pub remark: String,
}

impl ScriptInfo {
    pub fn new(version: Version, remark: impl Into<String>) -> Self {
        Self {
            version,
            remark: remark.into(),
        }
    }
}

/// One versioned unit of change.
///
/// `up` and `down` only stage statements through [`Options::exec`]; nothing
/// they stage runs until the engine's `run`.
pub trait Script {
    fn info(&self) -> ScriptInfo;

    /// Stage the forward change
    fn up(&self, opt: &mut Options<'_>) -> MigrateResult<()>;

    /// Stage the backward change
    fn down(&self, opt: &mut Options<'_>) -> MigrateResult<()>;
}

/// Scripts keyed by the version they were registered under.
#[derive(Default)]
pub struct ScriptRegistry {
    scripts: BTreeMap<Version, Box<dyn Script>>,
}

impl ScriptRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `script` under `version`. A version can be registered once.
    pub fn insert(&mut self, version: Version, script: Box<dyn Script>) -> MigrateResult<()> {
        if self.scripts.contains_key(&version) {
            return Err(MigrateError::DuplicateVersion {
                version: version.into_inner(),
            });
        }
        self.scripts.insert(version, script);
        Ok(())
    }

    pub fn get(&self, version: &str) -> Option<&dyn Script> {
        self.scripts.get(version).map(|s| s.as_ref())
    }

    pub fn contains(&self, version: &str) -> bool {
        self.scripts.contains_key(version)
    }

    /// Entries in ascending version order.
    pub fn iter(&self) -> impl Iterator<Item = (&Version, &dyn Script)> {
        self.scripts.iter().map(|(v, s)| (v, s.as_ref()))
    }

    pub fn len(&self) -> usize {
        self.scripts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scripts.is_empty()
    }

    /// Fail if any script reports a version other than its key.
    pub fn check_versions(&self) -> MigrateResult<()> {
        for (key, script) in &self.scripts {
            check_version(key, script.as_ref())?;
        }
        Ok(())
    }
}

/// Fail if `script` reports a version other than `key`.
pub(crate) fn check_version(key: &Version, script: &dyn Script) -> MigrateResult<()> {
    let reported = script.info().version;
    if reported != *key {
        return Err(MigrateError::VersionMismatch {
            key: key.to_string(),
            reported: reported.into_inner(),
        });
    }
    Ok(())
}
