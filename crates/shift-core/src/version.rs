//! Strongly-typed migration version and the stamp recorded on commit.

use crate::error::{MigrateError, MigrateResult};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::ops::Deref;

/// Reserved prefix of out-of-band patch versions.
pub const PATCH_PREFIX: &str = "PATCH.";

/// Strongly-typed wrapper for migration versions.
///
/// Versions order lexicographically by bytes, not semantically: `"0.0.10"`
/// sorts before `"0.0.9"`. Zero-pad version components when the natural
/// order matters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Version(String);

impl Version {
    /// Create a new `Version`, panicking in debug builds if the text is empty.
    ///
    /// Prefer [`parse`](Self::parse) when handling untrusted input.
    pub fn new(version: impl Into<String>) -> Self {
        let s = version.into();
        debug_assert!(!s.is_empty(), "Version must not be empty");
        Self(s)
    }

    /// Try to create a new `Version`, returning `None` if the text is empty.
    pub fn try_new(version: impl Into<String>) -> Option<Self> {
        let s = version.into();
        if s.is_empty() {
            None
        } else {
            Some(Self(s))
        }
    }

    /// Create a `Version`, reporting empty or whitespace-padded text as an error.
    pub fn parse(version: impl Into<String>) -> MigrateResult<Self> {
        let s = version.into();
        if s.is_empty() {
            return Err(MigrateError::InvalidVersion {
                message: "version must not be empty".to_string(),
            });
        }
        if s.trim() != s {
            return Err(MigrateError::InvalidVersion {
                message: format!("version '{s}' has leading or trailing whitespace"),
            });
        }
        Ok(Self(s))
    }

    /// Whether this version lives in the `PATCH.` namespace.
    pub fn is_patch(&self) -> bool {
        self.0.starts_with(PATCH_PREFIX)
    }

    /// Return the underlying version as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the wrapper and return the inner `String`.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Version {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Deref for Version {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Version {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for Version {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Version {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Which way a run moved the schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Sequential forward application
    Up,
    /// Sequential backward application
    Down,
    /// Single patch applied
    PatchUp,
    /// Single patch reverted
    PatchDown,
}

impl Direction {
    /// Stable identifier used when persisting the direction.
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::PatchUp => "patch_up",
            Direction::PatchDown => "patch_down",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Version and direction a connector records atomically with the commit.
///
/// - `Up`: `version` is the highest version applied by the run.
/// - `Down`: `version` is the target; everything above it was reverted.
/// - `PatchUp` / `PatchDown`: `version` is the patch version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionStamp {
    pub version: Version,
    pub direction: Direction,
}

impl VersionStamp {
    pub fn new(version: Version, direction: Direction) -> Self {
        Self { version, direction }
    }
}

impl fmt::Display for VersionStamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.version, self.direction)
    }
}

#[cfg(test)]
#[path = "version_test.rs"]
mod tests;
