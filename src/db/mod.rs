//! Database access layer for db-sift.
//!
//! Owns the connection to the SQLite store and the value types that rows
//! are shaped into.

mod session;
mod types;

pub use session::{Session, TraceHook};
pub use types::{Record, ResultSet, Value};

pub(crate) use session::{format_query_error, is_integrity_violation, RawOutcome};
