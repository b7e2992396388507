//! Version-span resolution.
//!
//! Selects the sequential versions strictly above a lower bound and up to an
//! inclusive upper bound. Comparison is plain lexicographic string order.

use crate::error::MigrateResult;
use crate::script::ScriptRegistry;
use crate::version::Version;

/// Return the registered sequential versions `v` with `min < v <= max`,
/// ascending.
///
/// `min = None` means nothing was applied yet and every version up to `max`
/// qualifies. Patch versions are never returned. Every registry entry is
/// checked against its script's reported version before anything is
/// selected, so a misconfigured registry fails even when the bad entry lies
/// outside the span.
pub fn version_span(
    registry: &ScriptRegistry,
    min: Option<&Version>,
    max: &Version,
) -> MigrateResult<Vec<Version>> {
    registry.check_versions()?;

    Ok(registry
        .iter()
        .map(|(version, _)| version)
        .filter(|v| !v.is_patch())
        .filter(|v| min.map_or(true, |min| *v > min))
        .filter(|v| *v <= max)
        .cloned()
        .collect())
}

#[cfg(test)]
#[path = "span_test.rs"]
mod tests;
