//! SQLite session.
//!
//! Provides the `Session` struct that owns the single connection to the store
//! and runs each statement inside its own transaction using sqlx.

use crate::config::DatabaseConfig;
use crate::db::{Record, Value};
use crate::error::{Result, SiftError};
use sqlx::error::ErrorKind;
use sqlx::query::Query;
use sqlx::sqlite::{
    Sqlite, SqliteArguments, SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow,
};
use sqlx::{Column, Row, TypeInfo, ValueRef};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Primary result code SQLite uses for every constraint failure.
const SQLITE_CONSTRAINT: i32 = 19;

/// Callback invoked with the statement text (before parameter substitution)
/// and the number of bound parameters, just before execution.
pub type TraceHook = Arc<dyn Fn(&str, usize) + Send + Sync>;

/// What the store handed back for one statement.
#[derive(Debug)]
pub(crate) enum RawOutcome {
    /// Every row the statement produced, fully fetched.
    Rows(Vec<Record>),
    /// Completion info for statements that produce no rows.
    Done {
        rows_affected: u64,
        last_insert_rowid: i64,
    },
}

/// One open connection to a SQLite store.
pub struct Session {
    pool: SqlitePool,
    location: String,
    trace: Option<TraceHook>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("location", &self.location)
            .field("trace", &self.trace.is_some())
            .finish()
    }
}

impl Session {
    /// Opens the store described by `config`.
    ///
    /// A config without a path opens a private in-memory database.
    pub async fn open(config: &DatabaseConfig) -> Result<Self> {
        let location = config.display_string();

        let options = match &config.path {
            Some(path) => SqliteConnectOptions::new()
                .filename(path)
                .create_if_missing(config.create_if_missing),
            None => SqliteConnectOptions::from_str("sqlite::memory:")
                .map_err(|e| SiftError::connection(format!("Invalid database location: {e}")))?,
        }
        .busy_timeout(Duration::from_secs(config.busy_timeout_secs));

        // One connection that never expires, so in-memory stores survive between calls.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(|e| map_connection_error(e, &location))?;

        info!("Session opened on {}", location);

        Ok(Self {
            pool,
            location,
            trace: None,
        })
    }

    /// Opens (creating if needed) the SQLite file at `path`.
    pub async fn open_path(path: impl Into<std::path::PathBuf>) -> Result<Self> {
        Self::open(&DatabaseConfig::at(path)).await
    }

    /// Opens a private in-memory store.
    pub async fn open_in_memory() -> Result<Self> {
        Self::open(&DatabaseConfig::default()).await
    }

    /// Installs a trace hook that sees every statement this session runs.
    pub fn with_trace<F>(mut self, hook: F) -> Self
    where
        F: Fn(&str, usize) + Send + Sync + 'static,
    {
        self.trace = Some(Arc::new(hook));
        self
    }

    /// Removes the trace hook, if one is installed.
    pub fn clear_trace(&mut self) {
        self.trace = None;
    }

    /// Returns a display string for the store location.
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Runs one statement in its own transaction.
    ///
    /// Commits when the statement succeeds, rolls back and returns the store's
    /// error otherwise. Rows are fetched eagerly when `fetch_rows` is set.
    pub(crate) async fn run(
        &self,
        sql: &str,
        params: &[Value],
        fetch_rows: bool,
    ) -> std::result::Result<RawOutcome, sqlx::Error> {
        if let Some(trace) = &self.trace {
            trace(sql, params.len());
        }

        let mut tx = self.pool.begin().await?;

        let result = if fetch_rows {
            bind_params(sqlx::query(sql), params)
                .fetch_all(&mut *tx)
                .await
                .map(|rows| RawOutcome::Rows(rows.iter().map(convert_row).collect()))
        } else {
            bind_params(sqlx::query(sql), params)
                .execute(&mut *tx)
                .await
                .map(|done| RawOutcome::Done {
                    rows_affected: done.rows_affected(),
                    last_insert_rowid: done.last_insert_rowid(),
                })
        };

        match result {
            Ok(outcome) => {
                tx.commit().await?;
                Ok(outcome)
            }
            Err(e) => {
                if let Err(rollback_err) = tx.rollback().await {
                    warn!("Rollback failed after statement error: {rollback_err}");
                }
                debug!("Statement rolled back: {e}");
                Err(e)
            }
        }
    }

    /// Closes the connection.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// Binds positional parameters in order.
fn bind_params<'q>(
    mut query: Query<'q, Sqlite, SqliteArguments<'q>>,
    params: &'q [Value],
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    for param in params {
        query = match param {
            Value::Null => query.bind(None::<i64>),
            Value::Integer(i) => query.bind(*i),
            Value::Real(f) => query.bind(*f),
            Value::Text(s) => query.bind(s.as_str()),
        };
    }
    query
}

/// Converts a sqlx SqliteRow to our Record type.
fn convert_row(row: &SqliteRow) -> Record {
    row.columns()
        .iter()
        .enumerate()
        .map(|(i, col)| (col.name().to_string(), convert_value(row, i)))
        .collect()
}

/// Converts a single column value using the storage class SQLite reports for it.
fn convert_value(row: &SqliteRow, index: usize) -> Value {
    let type_name = match row.try_get_raw(index) {
        Ok(raw) if raw.is_null() => return Value::Null,
        Ok(raw) => raw.type_info().name().to_uppercase(),
        Err(_) => return Value::Null,
    };

    match type_name.as_str() {
        "INTEGER" | "INT" | "INT8" | "BIGINT" | "BOOLEAN" => row
            .try_get::<Option<i64>, _>(index)
            .ok()
            .flatten()
            .map(Value::Integer)
            .unwrap_or(Value::Null),

        "REAL" | "FLOAT" | "DOUBLE" => row
            .try_get::<Option<f64>, _>(index)
            .ok()
            .flatten()
            .map(Value::Real)
            .unwrap_or(Value::Null),

        "BLOB" => row
            .try_get::<Option<Vec<u8>>, _>(index)
            .ok()
            .flatten()
            .map(|bytes| Value::Text(String::from_utf8_lossy(&bytes).into_owned()))
            .unwrap_or(Value::Null),

        // TEXT and anything else decodes as a string
        _ => row
            .try_get::<Option<String>, _>(index)
            .ok()
            .flatten()
            .map(Value::Text)
            .unwrap_or(Value::Null),
    }
}

/// Returns true for constraint failures: unique, primary key, not-null, check, foreign key.
pub(crate) fn is_integrity_violation(error: &sqlx::Error) -> bool {
    let Some(db_error) = error.as_database_error() else {
        return false;
    };

    if matches!(
        db_error.kind(),
        ErrorKind::UniqueViolation
            | ErrorKind::ForeignKeyViolation
            | ErrorKind::NotNullViolation
            | ErrorKind::CheckViolation
    ) {
        return true;
    }

    // Extended constraint codes keep SQLITE_CONSTRAINT in the low byte.
    db_error
        .code()
        .and_then(|code| code.parse::<i32>().ok())
        .map(|code| code & 0xff == SQLITE_CONSTRAINT)
        .unwrap_or(false)
}

/// Maps sqlx open errors to user-friendly connection errors.
fn map_connection_error(error: sqlx::Error, location: &str) -> SiftError {
    let error_str = error.to_string().to_lowercase();

    if error_str.contains("unable to open") {
        SiftError::connection(format!(
            "Cannot open database at {location}. Check that the directory exists and is writable."
        ))
    } else if error_str.contains("not a database") || error_str.contains("malformed") {
        SiftError::connection(format!("File at {location} is not a valid SQLite database."))
    } else if error_str.contains("locked") || error_str.contains("busy") {
        SiftError::connection(format!("Database at {location} is locked by another process."))
    } else {
        SiftError::connection(format!("{location}: {error}"))
    }
}

/// Formats a store error for display, keeping SQLite's own message.
pub(crate) fn format_query_error(error: &sqlx::Error) -> String {
    match error.as_database_error() {
        Some(db_error) => db_error.message().to_string(),
        None => error.to_string(),
    }
}
