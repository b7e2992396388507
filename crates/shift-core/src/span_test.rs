use super::*;
use crate::error::MigrateError;
use crate::test_utils::StubScript;

fn registry(versions: &[&str]) -> ScriptRegistry {
    let mut registry = ScriptRegistry::new();
    for v in versions {
        registry
            .insert(Version::new(*v), Box::new(StubScript::marked(v)))
            .unwrap();
    }
    registry
}

fn names(span: &[Version]) -> Vec<&str> {
    span.iter().map(|v| v.as_str()).collect()
}

#[test]
fn test_span_excludes_lower_bound_includes_upper() {
    let registry = registry(&["0.0.1", "0.0.2", "0.0.3"]);
    let span = version_span(
        &registry,
        Some(&Version::new("0.0.1")),
        &Version::new("0.0.3"),
    )
    .unwrap();
    assert_eq!(names(&span), vec!["0.0.2", "0.0.3"]);
}

#[test]
fn test_span_without_lower_bound_selects_from_start() {
    let registry = registry(&["0.0.1", "0.0.2", "0.0.3"]);
    let span = version_span(&registry, None, &Version::new("0.0.2")).unwrap();
    assert_eq!(names(&span), vec!["0.0.1", "0.0.2"]);
}

#[test]
fn test_span_skips_patch_versions() {
    let registry = registry(&["0.0.1", "PATCH.hotfix1"]);
    let span = version_span(
        &registry,
        Some(&Version::new("0.0.0")),
        &Version::new("0.0.1"),
    )
    .unwrap();
    assert_eq!(names(&span), vec!["0.0.1"]);

    // Even a bound that sorts after the patch key never selects it.
    let span = version_span(&registry, None, &Version::new("zzz")).unwrap();
    assert_eq!(names(&span), vec!["0.0.1"]);
}

#[test]
fn test_span_empty_when_bounds_inverted() {
    let registry = registry(&["0.0.1", "0.0.2", "0.0.3"]);
    let span = version_span(
        &registry,
        Some(&Version::new("0.0.3")),
        &Version::new("0.0.1"),
    )
    .unwrap();
    assert!(span.is_empty());
}

#[test]
fn test_span_uses_lexicographic_order() {
    let registry = registry(&["0.0.9", "0.0.10"]);
    // "0.0.10" < "0.0.9" by bytes, so a target of "0.0.9" selects both.
    let span = version_span(&registry, None, &Version::new("0.0.9")).unwrap();
    assert_eq!(names(&span), vec!["0.0.10", "0.0.9"]);
}

#[test]
fn test_span_rejects_mismatched_registry_entry() {
    let mut registry = registry(&["0.0.1"]);
    registry
        .insert(
            Version::new("0.0.5"),
            Box::new(StubScript::marked("0.0.5").reporting("0.0.6")),
        )
        .unwrap();

    // The bad entry is outside the span but still fails the resolution.
    let err = version_span(&registry, None, &Version::new("0.0.1")).unwrap_err();
    match err {
        MigrateError::VersionMismatch { key, reported } => {
            assert_eq!(key, "0.0.5");
            assert_eq!(reported, "0.0.6");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_registry_rejects_duplicates() {
    let mut registry = registry(&["0.0.1"]);
    let err = registry
        .insert(Version::new("0.0.1"), Box::new(StubScript::marked("0.0.1")))
        .unwrap_err();
    assert!(matches!(err, MigrateError::DuplicateVersion { .. }));
    assert_eq!(registry.len(), 1);
}
