use super::*;

#[test]
fn test_normalize_preview_collapses_whitespace() {
    let rendered = "\n\tCREATE TABLE users (\n\t\tid integer,\n\t\tPRIMARY KEY (id)\n\t)";
    assert_eq!(
        normalize_preview(rendered),
        "CREATE TABLE users ( id integer, PRIMARY KEY (id) )"
    );
}

#[test]
fn test_normalize_preview_empty() {
    assert_eq!(normalize_preview(" \n\t "), "");
}

#[test]
fn test_item_keeps_template_and_values() {
    let item = SqlItem::new(
        "INSERT INTO t VALUES (?)",
        vec![Value::Int(1)],
        "INSERT INTO t\n VALUES (1)",
    );
    assert_eq!(item.template(), "INSERT INTO t VALUES (?)");
    assert_eq!(item.values(), &[Value::Int(1)]);
    assert_eq!(item.preview(), "INSERT INTO t VALUES (1)");
}

#[test]
fn test_kind_contains() {
    assert!(SqlKind::ALL.contains(SqlKind::DDL));
    assert!(SqlKind::ALL.contains(SqlKind::DML));
    assert!(!SqlKind::DDL.contains(SqlKind::DML));
    assert_eq!(SqlKind::DDL | SqlKind::DML, SqlKind::ALL);
}

#[test]
fn test_kind_display() {
    assert_eq!(SqlKind::DDL.to_string(), "DDL");
    assert_eq!(SqlKind::ALL.to_string(), "DDL|DML");
    assert_eq!(SqlKind::from_bits(4).to_string(), "0b100");
}
