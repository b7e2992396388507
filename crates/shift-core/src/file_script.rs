//! Scripts authored as SQL files on disk.
//!
//! Each version is a directory under the migrations directory:
//!
//! ```text
//! migrations/
//!   0.0.1/
//!     up.sql
//!     down.sql
//!   PATCH.fix_emails/
//!     up.sql
//! ```
//!
//! Inside a file, `-- ddl` and `-- dml` marker lines switch which batch the
//! following statements go to (DDL until the first marker). A
//! `-- remark: <text>` line sets the script's remark. Marker lines inside a
//! multi-line string or block comment are plain text. Statements are split on
//! `;` outside quotes and comments; nothing is parsed or validated.

use crate::error::{MigrateError, MigrateResult};
use crate::options::Options;
use crate::script::{Script, ScriptInfo};
use crate::sql_item::SqlKind;
use crate::version::Version;
use chrono::Utc;
use std::path::{Path, PathBuf};

const UP_FILE: &str = "up.sql";
const DOWN_FILE: &str = "down.sql";

/// One statement read from a script file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileStatement {
    pub kind: SqlKind,
    pub sql: String,
}

/// Script backed by a version directory.
#[derive(Debug, Clone)]
pub struct SqlFileScript {
    version: Version,
    remark: String,
    path: PathBuf,
    up: Vec<FileStatement>,
    down: Vec<FileStatement>,
}

impl SqlFileScript {
    /// Load the script in `dir`; the directory name is the version.
    pub fn load(dir: &Path) -> MigrateResult<Self> {
        let name = dir
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| MigrateError::InvalidScriptDirectory {
                path: dir.display().to_string(),
                reason: "directory name is not valid UTF-8".to_string(),
            })?;
        let version = Version::parse(name)?;

        let (up, up_remark) = read_script_file(&dir.join(UP_FILE))?;
        let (down, down_remark) = read_script_file(&dir.join(DOWN_FILE))?;
        if up.is_empty() && down.is_empty() {
            log::warn!("Migration {} stages no statements", dir.display());
        }

        Ok(Self {
            version,
            remark: up_remark.or(down_remark).unwrap_or_default(),
            path: dir.to_path_buf(),
            up,
            down,
        })
    }

    pub fn version(&self) -> &Version {
        &self.version
    }

    pub fn remark(&self) -> &str {
        &self.remark
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn up_statements(&self) -> &[FileStatement] {
        &self.up
    }

    pub fn down_statements(&self) -> &[FileStatement] {
        &self.down
    }
}

impl Script for SqlFileScript {
    fn info(&self) -> ScriptInfo {
        ScriptInfo::new(self.version.clone(), self.remark.as_str())
    }

    fn up(&self, opt: &mut Options<'_>) -> MigrateResult<()> {
        stage_all(opt, &self.up)
    }

    fn down(&self, opt: &mut Options<'_>) -> MigrateResult<()> {
        stage_all(opt, &self.down)
    }
}

fn stage_all(opt: &mut Options<'_>, statements: &[FileStatement]) -> MigrateResult<()> {
    for stmt in statements {
        opt.exec(stmt.kind, &stmt.sql, &[])?;
    }
    Ok(())
}

/// Load every version directory under `dir`, sorted by version.
///
/// A missing directory yields no scripts.
pub fn discover_scripts(dir: &Path) -> MigrateResult<Vec<SqlFileScript>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let entries = std::fs::read_dir(dir).map_err(|e| MigrateError::IoWithPath {
        path: dir.display().to_string(),
        source: e,
    })?;

    let mut scripts = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| MigrateError::IoWithPath {
            path: dir.display().to_string(),
            source: e,
        })?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let hidden = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with('.'));
        if hidden {
            continue;
        }
        scripts.push(SqlFileScript::load(&path)?);
    }

    scripts.sort_by(|a, b| a.version.cmp(&b.version));
    Ok(scripts)
}

/// Create `<dir>/<version>/` with template `up.sql` and `down.sql`.
///
/// Refuses to touch an existing version directory.
pub fn scaffold(dir: &Path, version: &str, remark: &str) -> MigrateResult<PathBuf> {
    let version = Version::parse(version)?;
    let target = dir.join(version.as_str());
    if target.exists() {
        return Err(MigrateError::InvalidScriptDirectory {
            path: target.display().to_string(),
            reason: "migration already exists".to_string(),
        });
    }

    std::fs::create_dir_all(&target).map_err(|e| MigrateError::IoWithPath {
        path: target.display().to_string(),
        source: e,
    })?;

    let created = Utc::now().format("%Y-%m-%d %H:%M:%S UTC");
    for (file, direction) in [(UP_FILE, "Forward"), (DOWN_FILE, "Backward")] {
        let content = format!(
            "-- remark: {remark}\n\
             -- {direction} migration for {version}, created {created}\n\n\
             -- ddl\n\n\
             -- dml\n"
        );
        let path = target.join(file);
        std::fs::write(&path, content).map_err(|e| MigrateError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
    }
    Ok(target)
}

/// Read a script file; a missing file stages nothing.
fn read_script_file(path: &Path) -> MigrateResult<(Vec<FileStatement>, Option<String>)> {
    if !path.exists() {
        return Ok((Vec::new(), None));
    }
    let content = std::fs::read_to_string(path).map_err(|e| MigrateError::IoWithPath {
        path: path.display().to_string(),
        source: e,
    })?;
    Ok(parse_script(&content))
}

/// Split file content into statements tagged with their batch, plus the
/// remark if one is declared.
pub fn parse_script(content: &str) -> (Vec<FileStatement>, Option<String>) {
    let mut statements = Vec::new();
    let mut remark = None;
    let mut kind = SqlKind::DDL;
    let mut section = String::new();
    let mut carry = Carry::Code;

    for line in content.lines() {
        let at_code = carry == Carry::Code;
        carry = carry_over(carry, line);

        let trimmed = line.trim();
        let marker = trimmed
            .strip_prefix("--")
            .filter(|_| at_code)
            .map(|rest| rest.trim().to_ascii_lowercase());

        match marker.as_deref() {
            Some("ddl") | Some("dml") => {
                flush_section(&section, kind, &mut statements);
                section.clear();
                kind = if marker.as_deref() == Some("ddl") {
                    SqlKind::DDL
                } else {
                    SqlKind::DML
                };
                continue;
            }
            Some(rest) if rest.starts_with("remark:") => {
                if remark.is_none() {
                    let text = trimmed
                        .trim_start_matches('-')
                        .trim()
                        .get("remark:".len()..)
                        .unwrap_or_default()
                        .trim();
                    remark = Some(text.to_string());
                }
                continue;
            }
            _ => {}
        }

        section.push_str(line);
        section.push('\n');
    }
    flush_section(&section, kind, &mut statements);

    (statements, remark)
}

/// Open construct a line leaves behind for the next one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Carry {
    Code,
    Single,
    Double,
    BlockComment,
}

fn carry_over(mut state: Carry, line: &str) -> Carry {
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        state = match state {
            Carry::Code => match c {
                '-' if chars.peek() == Some(&'-') => return Carry::Code,
                '/' if chars.peek() == Some(&'*') => {
                    chars.next();
                    Carry::BlockComment
                }
                '\'' => Carry::Single,
                '"' => Carry::Double,
                _ => Carry::Code,
            },
            Carry::Single if c == '\'' => Carry::Code,
            Carry::Double if c == '"' => Carry::Code,
            Carry::BlockComment if c == '*' && chars.peek() == Some(&'/') => {
                chars.next();
                Carry::Code
            }
            other => other,
        };
    }
    state
}

fn flush_section(section: &str, kind: SqlKind, out: &mut Vec<FileStatement>) {
    out.extend(split_statements(section).into_iter().map(|sql| FileStatement {
        kind,
        sql,
    }));
}

/// Split on `;` outside single-quoted literals and double-quoted
/// identifiers. Comments are dropped from the statement text, and statements
/// left with only whitespace are dropped.
pub fn split_statements(sql: &str) -> Vec<String> {
    #[derive(Clone, Copy, PartialEq)]
    enum State {
        Code,
        Single,
        Double,
        LineComment,
        BlockComment,
    }

    let mut statements = Vec::new();
    let mut current = String::new();
    let mut state = State::Code;
    let mut chars = sql.chars().peekable();

    while let Some(c) = chars.next() {
        match state {
            State::Code => match c {
                ';' => {
                    push_statement(&mut statements, &current);
                    current.clear();
                    continue;
                }
                '-' if chars.peek() == Some(&'-') => {
                    state = State::LineComment;
                    continue;
                }
                '/' if chars.peek() == Some(&'*') => {
                    chars.next();
                    state = State::BlockComment;
                    continue;
                }
                '\'' => state = State::Single,
                '"' => state = State::Double,
                _ => {}
            },
            State::Single => {
                if c == '\'' {
                    state = State::Code;
                }
            }
            State::Double => {
                if c == '"' {
                    state = State::Code;
                }
            }
            State::LineComment => {
                if c != '\n' {
                    continue;
                }
                state = State::Code;
            }
            State::BlockComment => {
                if c == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    state = State::Code;
                }
                continue;
            }
        }
        current.push(c);
    }

    push_statement(&mut statements, &current);
    statements
}

fn push_statement(statements: &mut Vec<String>, text: &str) {
    let text = text.trim();
    if !text.is_empty() {
        statements.push(text.to_string());
    }
}

#[cfg(test)]
#[path = "file_script_test.rs"]
mod tests;
