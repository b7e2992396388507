//! Rendered statements and the DDL/DML kind selector.

use crate::value::Value;
use std::fmt;
use std::ops::BitOr;

/// Statement category bit set.
///
/// Staging accepts exactly one of [`SqlKind::DDL`] or [`SqlKind::DML`];
/// running accepts any non-empty combination, usually [`SqlKind::ALL`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SqlKind(u8);

impl SqlKind {
    /// Schema changes
    pub const DDL: SqlKind = SqlKind(1);
    /// Row changes
    pub const DML: SqlKind = SqlKind(1 << 1);
    /// Both batches, DDL first
    pub const ALL: SqlKind = SqlKind(Self::DDL.0 | Self::DML.0);

    /// Build a kind from raw bits. Unknown bits are kept so that staging can
    /// reject them.
    pub const fn from_bits(bits: u8) -> Self {
        SqlKind(bits)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Whether every bit of `other` is set in `self`.
    pub const fn contains(self, other: SqlKind) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for SqlKind {
    type Output = SqlKind;

    fn bitor(self, rhs: SqlKind) -> SqlKind {
        SqlKind(self.0 | rhs.0)
    }
}

impl fmt::Display for SqlKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            SqlKind::DDL => write!(f, "DDL"),
            SqlKind::DML => write!(f, "DML"),
            SqlKind::ALL => write!(f, "DDL|DML"),
            SqlKind(bits) => write!(f, "0b{bits:b}"),
        }
    }
}

/// A statement rendered by a connector's dry run.
///
/// Holds what will be executed (`template` + `values`) and what the operator
/// sees (`preview`). Fields are private; the item cannot change after the
/// connector builds it.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlItem {
    template: String,
    values: Vec<Value>,
    preview: String,
}

impl SqlItem {
    /// Build an item from a connector's rendering. The rendered text is
    /// whitespace-normalized into the preview.
    pub fn new(template: impl Into<String>, values: Vec<Value>, rendered: &str) -> Self {
        Self {
            template: template.into(),
            values,
            preview: normalize_preview(rendered),
        }
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn preview(&self) -> &str {
        &self.preview
    }
}

/// Collapse every run of whitespace (newlines and tabs included) into a
/// single space and trim both ends.
pub fn normalize_preview(rendered: &str) -> String {
    rendered.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
#[path = "sql_item_test.rs"]
mod tests;
