//! Error types for db-sift.
//!
//! Defines the main error enum used throughout the crate.

use thiserror::Error;

/// Export formats accepted by the exporter, used in error messages.
pub const SUPPORTED_FORMATS: &[&str] = &["csv", "json"];

/// Main error type for db-sift operations.
#[derive(Error, Debug)]
pub enum SiftError {
    /// The store could not be opened (bad path, permissions, corrupt file).
    #[error("Connection error: {0}")]
    Connection(String),

    /// Statement execution errors reported by the store (syntax errors, missing tables, etc.)
    #[error("Query error: {0}")]
    Query(String),

    /// Export requested in a format the exporter does not know.
    #[error("Unsupported export format '{format}'. Supported formats: {}", SUPPORTED_FORMATS.join(", "))]
    UnsupportedFormat { format: String },

    /// Table iterator addressed beyond the last row.
    #[error("{0}")]
    OutOfRange(String),

    /// Export file could not be written.
    #[error("Export error: {0}")]
    Export(String),

    /// Configuration errors (invalid config file, conflicting flags, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal errors (unexpected states, bugs, etc.)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl SiftError {
    /// Creates a connection error with the given message.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Creates a query error with the given message.
    pub fn query(msg: impl Into<String>) -> Self {
        Self::Query(msg.into())
    }

    /// Creates an unsupported format error for the given tag.
    pub fn unsupported_format(format: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            format: format.into(),
        }
    }

    /// Creates an out-of-range error with the given message.
    pub fn out_of_range(msg: impl Into<String>) -> Self {
        Self::OutOfRange(msg.into())
    }

    /// Creates an export error with the given message.
    pub fn export(msg: impl Into<String>) -> Self {
        Self::Export(msg.into())
    }

    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates an internal error with the given message.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Connection(_) => "Connection Error",
            Self::Query(_) => "Query Error",
            Self::UnsupportedFormat { .. } => "Unsupported Format",
            Self::OutOfRange(_) => "Out Of Range",
            Self::Export(_) => "Export Error",
            Self::Config(_) => "Configuration Error",
            Self::Internal(_) => "Internal Error",
        }
    }
}

/// Result type alias using SiftError.
pub type Result<T> = std::result::Result<T, SiftError>;
