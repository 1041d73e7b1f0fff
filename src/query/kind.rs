//! Statement classification by leading keyword.

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

static LEADING_KEYWORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([A-Za-z_]+)").expect("leading keyword pattern is valid")
});

/// Returns the statement's first word in upper case, ignoring leading whitespace.
pub fn leading_keyword(sql: &str) -> Option<String> {
    LEADING_KEYWORD
        .captures(sql)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_ascii_uppercase())
}

/// What a statement is expected to produce, derived from its leading keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatementKind {
    /// SELECT, PRAGMA: returns rows.
    Query,
    /// INSERT, REPLACE: returns the new rowid.
    Insert,
    /// UPDATE, DELETE: returns the affected-row count.
    Mutate,
    /// Everything else (DDL and friends).
    Other,
}

impl StatementKind {
    /// Classifies `sql`. Every statement maps to exactly one kind.
    pub fn classify(sql: &str) -> Self {
        match leading_keyword(sql).as_deref() {
            Some("SELECT" | "PRAGMA") => Self::Query,
            Some("INSERT" | "REPLACE") => Self::Insert,
            Some("UPDATE" | "DELETE") => Self::Mutate,
            _ => Self::Other,
        }
    }

    /// Returns true if the statement produces rows to fetch.
    pub fn returns_rows(&self) -> bool {
        matches!(self, Self::Query)
    }
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Query => write!(f, "Query"),
            Self::Insert => write!(f, "Insert"),
            Self::Mutate => write!(f, "Mutate"),
            Self::Other => write!(f, "Other"),
        }
    }
}
