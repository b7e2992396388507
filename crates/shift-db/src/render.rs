//! Dry-run rendering of parameterized statements into DuckDB SQL text.
//!
//! Rendering never touches the database. Each `?` outside quoted literals,
//! quoted identifiers and comments is replaced by the literal form of the
//! next bound value.

use crate::error::{DbError, DbResult};
use shift_core::Value;
use std::fmt::Write;

/// Substitute every placeholder in `sql` with the DuckDB literal of the
/// matching value.
pub fn render_sql(sql: &str, values: &[Value]) -> DbResult<String> {
    #[derive(Clone, Copy, PartialEq)]
    enum State {
        Code,
        Single,
        Double,
        LineComment,
        BlockComment,
    }

    let mut out = String::with_capacity(sql.len());
    let mut state = State::Code;
    let mut placeholders = 0usize;
    let mut chars = sql.chars().peekable();

    while let Some(c) = chars.next() {
        match state {
            State::Code => match c {
                '?' => {
                    if let Some(value) = values.get(placeholders) {
                        out.push_str(&literal(value));
                    }
                    placeholders += 1;
                    continue;
                }
                '\'' => state = State::Single,
                '"' => state = State::Double,
                '-' if chars.peek() == Some(&'-') => state = State::LineComment,
                '/' if chars.peek() == Some(&'*') => {
                    out.push(c);
                    if let Some(star) = chars.next() {
                        out.push(star);
                    }
                    state = State::BlockComment;
                    continue;
                }
                _ => {}
            },
            State::Single if c == '\'' => state = State::Code,
            State::Double if c == '"' => state = State::Code,
            State::LineComment if c == '\n' => state = State::Code,
            State::BlockComment if c == '*' && chars.peek() == Some(&'/') => {
                out.push(c);
                if let Some(slash) = chars.next() {
                    out.push(slash);
                }
                state = State::Code;
                continue;
            }
            _ => {}
        }
        out.push(c);
    }

    if placeholders != values.len() {
        return Err(DbError::PlaceholderMismatch {
            placeholders,
            values: values.len(),
        });
    }
    Ok(out)
}

/// DuckDB literal for a bound value.
pub fn literal(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::Bool(true) => "TRUE".to_string(),
        Value::Bool(false) => "FALSE".to_string(),
        Value::Int(n) => n.to_string(),
        Value::Float(f) if f.is_nan() => "'NaN'::DOUBLE".to_string(),
        Value::Float(f) if f.is_infinite() => {
            let sign = if f.is_sign_negative() { "-" } else { "" };
            format!("'{sign}Infinity'::DOUBLE")
        }
        Value::Float(f) => format!("{f:?}"),
        Value::Text(s) => format!("'{}'", s.replace('\'', "''")),
        Value::Blob(bytes) => {
            let mut out = String::with_capacity(bytes.len() * 4 + 10);
            out.push('\'');
            for b in bytes {
                let _ = write!(out, "\\x{b:02X}");
            }
            out.push_str("'::BLOB");
            out
        }
    }
}

#[cfg(test)]
#[path = "render_test.rs"]
mod tests;
