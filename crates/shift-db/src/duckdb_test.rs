use super::*;
use shift_core::test_utils::StubScript;
use shift_core::{EngineState, MigrateError, Migrator, Options, Script, ScriptInfo, SqlKind};
use tempfile::tempdir;

fn users_migrator(conn: DuckDbConnector) -> Migrator<DuckDbConnector> {
    let mut m = Migrator::new(conn);
    m.add_script(
        "0.0.1",
        StubScript::new("0.0.1")
            .on_up(SqlKind::DDL, "CREATE TABLE users (id INTEGER, name VARCHAR)")
            .on_down(SqlKind::DDL, "DROP TABLE users"),
    )
    .unwrap()
    .add_script(
        "0.0.2",
        StubScript::new("0.0.2")
            .on_up(
                SqlKind::DDL,
                "CREATE TABLE orders (id INTEGER, user_id INTEGER)",
            )
            .on_up_with(
                SqlKind::DML,
                "INSERT INTO users VALUES (?, ?)",
                vec![Value::Int(1), Value::from("alice")],
            )
            .on_down(SqlKind::DDL, "DROP TABLE orders")
            .on_down(SqlKind::DML, "DELETE FROM users WHERE id = 1"),
    )
    .unwrap();
    m
}

fn table_exists(conn: &DuckDbConnector, table: &str) -> bool {
    let row = conn
        .find_one(
            "SELECT COUNT(*) AS n FROM information_schema.tables WHERE table_name = ?",
            &[Value::from(table)],
        )
        .unwrap()
        .unwrap();
    row.get_by_name("n").and_then(Value::as_i64) == Some(1)
}

fn current(conn: &DuckDbConnector) -> Option<String> {
    conn.last_run_version()
        .unwrap()
        .map(Version::into_inner)
}

#[test]
fn test_open_memory_starts_transaction() {
    let conn = DuckDbConnector::new(":memory:", DuckDbOptions::default()).unwrap();
    assert_eq!(conn.drive(), "duckdb");
    assert!(conn.in_transaction());
    assert_eq!(conn.history_table(), "shift_schema_history");
    assert!(table_exists(&conn, "shift_schema_history"));
    assert_eq!(current(&conn), None);
    assert!(conn.history().unwrap().is_empty());
}

#[test]
fn test_begin_twice_is_an_error() {
    let mut conn = DuckDbConnector::open_memory(DuckDbOptions::default()).unwrap();
    assert!(matches!(
        conn.begin(),
        Err(DbError::TransactionError(_))
    ));
}

#[test]
fn test_up_then_down_round_trip() {
    let conn = DuckDbConnector::open_memory(DuckDbOptions::default()).unwrap();
    let mut m = users_migrator(conn);
    m.prepare_up("0.0.2").unwrap();
    assert!(m
        .preview()
        .contains("1: INSERT INTO users VALUES (1, 'alice')"));
    m.run(SqlKind::ALL).unwrap().commit().unwrap();

    let mut conn = m.into_connector();
    assert!(!conn.in_transaction());
    assert_eq!(current(&conn).as_deref(), Some("0.0.2"));
    assert!(table_exists(&conn, "orders"));
    let alice = conn
        .find_one("SELECT name FROM users WHERE id = ?", &[Value::Int(1)])
        .unwrap()
        .unwrap();
    assert_eq!(alice.get(0), Some(&Value::from("alice")));

    conn.begin().unwrap();
    let mut m = users_migrator(conn);
    m.prepare_down("0.0.1").unwrap();
    assert_eq!(m.ddl().len(), 1);
    m.run(SqlKind::ALL).unwrap().commit().unwrap();

    let mut conn = m.into_connector();
    assert_eq!(current(&conn).as_deref(), Some("0.0.1"));
    assert!(!table_exists(&conn, "orders"));
    assert!(table_exists(&conn, "users"));
    assert!(conn.find_all("SELECT * FROM users", &[]).unwrap().is_empty());

    conn.begin().unwrap();
    let mut m = users_migrator(conn);
    m.prepare_down("0.0.0").unwrap();
    m.run(SqlKind::ALL).unwrap().commit().unwrap();

    let conn = m.into_connector();
    assert_eq!(current(&conn).as_deref(), Some("0.0.0"));
    assert!(!table_exists(&conn, "users"));

    let directions: Vec<String> = conn
        .history()
        .unwrap()
        .into_iter()
        .map(|e| format!("{} {}", e.version, e.direction))
        .collect();
    assert_eq!(directions, vec!["0.0.0 down"]);
}

#[test]
fn test_failed_statement_rolls_back_everything() {
    let conn = DuckDbConnector::open_memory(DuckDbOptions::default()).unwrap();
    let mut m = Migrator::new(conn);
    m.add_script(
        "0.0.1",
        StubScript::new("0.0.1")
            .on_up(SqlKind::DDL, "CREATE TABLE t (id INTEGER)")
            .on_up(SqlKind::DDL, "CREATE TABLE t (id INTEGER)"),
    )
    .unwrap();
    m.prepare_up("0.0.1").unwrap();

    let err = m.run(SqlKind::ALL).err().unwrap();
    match err {
        MigrateError::Execution { preview, .. } => {
            assert_eq!(preview, "CREATE TABLE t (id INTEGER)");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(m.state(), EngineState::Failed);

    let mut conn = m.into_connector();
    assert!(!conn.in_transaction());
    conn.begin().unwrap();
    assert!(!table_exists(&conn, "t"));
    assert_eq!(current(&conn), None);
}

#[test]
fn test_rollback_discards_staged_run() {
    let conn = DuckDbConnector::open_memory(DuckDbOptions::default()).unwrap();
    let mut m = users_migrator(conn);
    m.prepare_up("0.0.1").unwrap().run(SqlKind::DDL).unwrap();
    m.rollback().unwrap();

    let mut conn = m.into_connector();
    conn.begin().unwrap();
    assert!(!table_exists(&conn, "users"));
    assert!(conn.history().unwrap().is_empty());
}

#[test]
fn test_commit_without_transaction_fails() {
    let mut conn = DuckDbConnector::open_memory(DuckDbOptions::default()).unwrap();
    conn.rollback().unwrap();
    // A second rollback is a no-op.
    conn.rollback().unwrap();
    assert!(conn.commit().is_err());
    assert!(conn.execute("SELECT 1", &[]).is_err());
}

#[test]
fn test_patch_recorded_separately() {
    let conn = DuckDbConnector::open_memory(DuckDbOptions::default()).unwrap();
    let mut m = users_migrator(conn);
    m.prepare_up("0.0.1")
        .unwrap()
        .run(SqlKind::ALL)
        .unwrap()
        .commit()
        .unwrap();

    let patch = || {
        StubScript::new("PATCH.seed")
            .on_up(SqlKind::DML, "INSERT INTO users VALUES (9, 'admin')")
            .on_down(SqlKind::DML, "DELETE FROM users WHERE id = 9")
    };

    let mut conn = m.into_connector();
    conn.begin().unwrap();
    let mut m = Migrator::new(conn);
    m.add_script("PATCH.seed", patch()).unwrap();
    m.prepare_patch_up("PATCH.seed")
        .unwrap()
        .run(SqlKind::ALL)
        .unwrap()
        .commit()
        .unwrap();

    let mut conn = m.into_connector();
    assert_eq!(current(&conn).as_deref(), Some("0.0.1"));
    assert_eq!(
        conn.applied_patches().unwrap(),
        vec![Version::new("PATCH.seed")]
    );

    conn.begin().unwrap();
    let mut m = Migrator::new(conn);
    m.add_script("PATCH.seed", patch()).unwrap();
    m.prepare_patch_down("PATCH.seed")
        .unwrap()
        .run(SqlKind::ALL)
        .unwrap()
        .commit()
        .unwrap();

    let conn = m.into_connector();
    assert!(conn.applied_patches().unwrap().is_empty());
    assert_eq!(current(&conn).as_deref(), Some("0.0.1"));
}

struct Backfill;

impl Script for Backfill {
    fn info(&self) -> ScriptInfo {
        ScriptInfo::new(Version::new("0.0.2"), "backfill bot user")
    }

    fn up(&self, opt: &mut Options<'_>) -> MigrateResult<()> {
        let existing = opt
            .find_one("SELECT COUNT(*) FROM users", &[])?
            .and_then(|row| row.get(0).and_then(Value::as_i64))
            .unwrap_or(0);
        opt.dml(
            "INSERT INTO users VALUES (?, ?)",
            &[Value::Int(existing + 100), Value::from("bot")],
        )
    }

    fn down(&self, opt: &mut Options<'_>) -> MigrateResult<()> {
        opt.dml("DELETE FROM users WHERE name = ?", &[Value::from("bot")])
    }
}

#[test]
fn test_script_reads_current_data_while_preparing() {
    let conn = DuckDbConnector::open_memory(DuckDbOptions::default()).unwrap();
    let mut m = users_migrator(conn);
    m.prepare_up("0.0.1")
        .unwrap()
        .run(SqlKind::ALL)
        .unwrap()
        .commit()
        .unwrap();

    let mut conn = m.into_connector();
    conn.begin().unwrap();
    conn.execute("INSERT INTO users VALUES (?, ?)", &[Value::Int(1), Value::from("alice")])
        .unwrap();

    let mut m = Migrator::new(conn);
    m.add_script("0.0.2", Backfill).unwrap();
    m.prepare_up("0.0.2").unwrap();
    assert_eq!(m.dml()[0].preview(), "INSERT INTO users VALUES (101, 'bot')");
    m.run(SqlKind::ALL).unwrap().commit().unwrap();

    let conn = m.into_connector();
    let rows = conn
        .find_all("SELECT id, name FROM users ORDER BY id", &[])
        .unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1].get_by_name("ID"), Some(&Value::Int(101)));
    assert_eq!(rows[1].columns(), &["id".to_string(), "name".to_string()]);
}

#[test]
fn test_file_database_persists_history() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("app.duckdb");
    let options = DuckDbOptions {
        history_table: "meta.versions".to_string(),
    };

    let conn = DuckDbConnector::open(&path, options.clone()).unwrap();
    let mut m = users_migrator(conn);
    m.prepare_up("0.0.2")
        .unwrap()
        .run(SqlKind::ALL)
        .unwrap()
        .commit()
        .unwrap();
    drop(m);

    let conn = DuckDbConnector::open(&path, options).unwrap();
    assert_eq!(conn.history_table(), "meta.versions");
    assert_eq!(current(&conn).as_deref(), Some("0.0.2"));
    let history = conn.history().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].direction, "up");
}

#[test]
fn test_from_config_uses_history_table() {
    let config = DatabaseConfig {
        history_table: "applied".to_string(),
        ..DatabaseConfig::default()
    };
    let conn = DuckDbConnector::from_config(&config, Path::new(".")).unwrap();
    assert!(table_exists(&conn, "applied"));

    let dir = tempdir().unwrap();
    let config = DatabaseConfig {
        path: "nested.duckdb".to_string(),
        ..DatabaseConfig::default()
    };
    let conn = DuckDbConnector::from_config(&config, dir.path()).unwrap();
    drop(conn);
    assert!(dir.path().join("nested.duckdb").exists());
}
