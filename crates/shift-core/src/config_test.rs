use super::*;
use tempfile::tempdir;

#[test]
fn test_parse_minimal_config() {
    let config: Config = serde_yaml::from_str("name: app").unwrap();
    assert_eq!(config.name, "app");
    assert_eq!(config.migrations_dir, "migrations");
    assert_eq!(config.database.db_type, DbType::DuckDb);
    assert_eq!(config.database.path, ":memory:");
    assert_eq!(config.database.history_table, "shift_schema_history");

    let root = PathBuf::from("/tmp/app");
    assert_eq!(
        config.migrations_dir_absolute(&root),
        root.join("migrations")
    );
}

#[test]
fn test_parse_full_config() {
    let yaml = r#"
name: app
migrations_dir: db/migrations
database:
  type: duckdb
  path: app.duckdb
  history_table: meta.versions
targets:
  prod:
    database:
      path: prod.duckdb
  dev: {}
"#;
    let config: Config = serde_yaml::from_str(yaml).unwrap();
    config.validate().unwrap();
    assert_eq!(config.migrations_dir, "db/migrations");
    assert_eq!(config.available_targets(), vec!["dev", "prod"]);

    let base = config.get_database_config(None).unwrap();
    assert_eq!(base.path, "app.duckdb");
    assert_eq!(base.history_table, "meta.versions");

    let prod = config.get_database_config(Some("prod")).unwrap();
    assert_eq!(prod.path, "prod.duckdb");
    assert_eq!(prod.history_table, "shift_schema_history");

    // A target without a database override falls back to the base config.
    assert_eq!(config.get_database_config(Some("dev")).unwrap(), base);
}

#[test]
fn test_unknown_target_lists_available() {
    let yaml = "name: app\ntargets:\n  prod: {}\n";
    let config: Config = serde_yaml::from_str(yaml).unwrap();
    let err = config.get_database_config(Some("staging")).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("staging"));
    assert!(message.contains("prod"));
}

#[test]
fn test_unknown_fields_rejected() {
    let result: Result<Config, _> = serde_yaml::from_str("name: app\nmodel_paths: [x]");
    assert!(result.is_err());

    let result: Result<Config, _> =
        serde_yaml::from_str("name: app\ndatabase:\n  type: postgres\n");
    assert!(result.is_err());
}

#[test]
fn test_validate_rejects_empty_name() {
    let config: Config = serde_yaml::from_str("name: \"  \"").unwrap();
    assert!(matches!(
        config.validate(),
        Err(MigrateError::ConfigInvalid { .. })
    ));
}

#[test]
fn test_validate_rejects_bad_history_table() {
    let yaml = r#"
name: app
targets:
  prod:
    database:
      history_table: "versions; DROP TABLE users"
"#;
    let config: Config = serde_yaml::from_str(yaml).unwrap();
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("prod"));
}

#[test]
fn test_load_from_dir_prefers_yml() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("shift.yaml"), "name: from_yaml").unwrap();
    let config = Config::load_from_dir(dir.path()).unwrap();
    assert_eq!(config.name, "from_yaml");

    std::fs::write(dir.path().join("shift.yml"), "name: from_yml").unwrap();
    let config = Config::load_from_dir(dir.path()).unwrap();
    assert_eq!(config.name, "from_yml");
}

#[test]
fn test_load_from_dir_missing() {
    let dir = tempdir().unwrap();
    let err = Config::load_from_dir(dir.path()).unwrap_err();
    assert!(matches!(err, MigrateError::ConfigNotFound { .. }));
}

#[test]
fn test_load_invalid_yaml() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("shift.yml");
    std::fs::write(&path, "name: [unterminated").unwrap();
    assert!(matches!(
        Config::load(&path),
        Err(MigrateError::YamlParse(_))
    ));
}

#[test]
fn test_resolve_target_prefers_flag() {
    assert_eq!(
        Config::resolve_target(Some("prod")),
        Some("prod".to_string())
    );
}
