//! Statement classification and execution for db-sift.
//!
//! This module holds the dispatcher that every other component sends its
//! SQL through, plus the table iterator built on top of it.

pub mod dispatcher;
pub mod kind;
pub mod table_iter;

pub use dispatcher::{Dispatcher, Outcome};
pub use kind::{leading_keyword, StatementKind};
pub use table_iter::TableIterator;
