//! Statement safety classification for the interactive shell.
//!
//! Decides whether a buffered statement is complete, splits it into its
//! statements, and whether they need user confirmation before they run.

mod parser;

pub use parser::{is_complete_statement, split_statements};

use std::fmt;

use crate::query::leading_keyword;

/// Leading keywords of statements that change data or schema.
pub const CONFIRM_KEYWORDS: &[&str] = &[
    "DELETE", "UPDATE", "INSERT", "REPLACE", "DROP", "CREATE", "ALTER",
];

/// How the shell treats a complete statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SafetyLevel {
    /// SELECT: runs immediately and prints its rows.
    Safe,
    /// Changes data or schema: runs only after a `y`/`yes` reply.
    Destructive,
    /// Anything else: the shell does not run it.
    Unsupported,
}

impl SafetyLevel {
    /// Classifies a statement by its leading keyword.
    pub fn classify(sql: &str) -> Self {
        match leading_keyword(sql) {
            Some(keyword) if keyword == "SELECT" => Self::Safe,
            Some(keyword) if CONFIRM_KEYWORDS.contains(&keyword.as_str()) => Self::Destructive,
            _ => Self::Unsupported,
        }
    }

    /// Classifies a batch by its most dangerous statement. An empty batch is
    /// unsupported.
    pub fn classify_all<S: AsRef<str>>(statements: &[S]) -> Self {
        statements
            .iter()
            .map(|sql| Self::classify(sql.as_ref()))
            .max_by_key(Self::priority)
            .unwrap_or(Self::Unsupported)
    }

    fn priority(&self) -> u8 {
        match self {
            Self::Safe => 0,
            Self::Destructive => 1,
            Self::Unsupported => 2,
        }
    }

    /// Returns true if this safety level requires user confirmation.
    pub fn requires_confirmation(&self) -> bool {
        matches!(self, Self::Destructive)
    }
}

impl fmt::Display for SafetyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Safe => write!(f, "Safe"),
            Self::Destructive => write!(f, "Destructive"),
            Self::Unsupported => write!(f, "Unsupported"),
        }
    }
}

/// Returns true for a `y`/`yes` reply, in any case.
pub fn is_affirmative(reply: &str) -> bool {
    matches!(reply.trim().to_lowercase().as_str(), "y" | "yes")
}
