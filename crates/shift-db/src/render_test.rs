use super::*;

#[test]
fn test_render_substitutes_in_order() {
    let sql = render_sql(
        "INSERT INTO users VALUES (?, ?, ?, ?)",
        &[
            Value::Int(1),
            Value::from("alice"),
            Value::Bool(true),
            Value::Null,
        ],
    )
    .unwrap();
    assert_eq!(sql, "INSERT INTO users VALUES (1, 'alice', TRUE, NULL)");
}

#[test]
fn test_render_escapes_quotes() {
    let sql = render_sql("SELECT ?", &[Value::from("it's")]).unwrap();
    assert_eq!(sql, "SELECT 'it''s'");
}

#[test]
fn test_render_skips_quoted_and_commented_marks() {
    let sql = render_sql(
        "SELECT '?' AS a, \"b?\" -- why?\n, ? /* really? */",
        &[Value::Int(5)],
    )
    .unwrap();
    assert_eq!(sql, "SELECT '?' AS a, \"b?\" -- why?\n, 5 /* really? */");
}

#[test]
fn test_render_block_comment_opening_star_is_not_a_close() {
    let sql = render_sql("SELECT 1 /*/ ? */", &[]).unwrap();
    assert_eq!(sql, "SELECT 1 /*/ ? */");

    let sql = render_sql("SELECT /**/ ?", &[Value::Int(2)]).unwrap();
    assert_eq!(sql, "SELECT /**/ 2");
}

#[test]
fn test_render_count_mismatch() {
    let err = render_sql("SELECT ?, ?", &[Value::Int(1)]).unwrap_err();
    assert!(matches!(
        err,
        DbError::PlaceholderMismatch {
            placeholders: 2,
            values: 1
        }
    ));

    let err = render_sql("SELECT 1", &[Value::Int(1)]).unwrap_err();
    assert!(matches!(
        err,
        DbError::PlaceholderMismatch {
            placeholders: 0,
            values: 1
        }
    ));
}

#[test]
fn test_literals() {
    assert_eq!(literal(&Value::Float(1.5)), "1.5");
    assert_eq!(literal(&Value::Float(2.0)), "2.0");
    assert_eq!(literal(&Value::Float(f64::NAN)), "'NaN'::DOUBLE");
    assert_eq!(
        literal(&Value::Float(f64::NEG_INFINITY)),
        "'-Infinity'::DOUBLE"
    );
    assert_eq!(literal(&Value::Int(-42)), "-42");
    assert_eq!(literal(&Value::Bool(false)), "FALSE");
    assert_eq!(literal(&Value::Blob(vec![0x01, 0xab])), "'\\x01\\xAB'::BLOB");
}
