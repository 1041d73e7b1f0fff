//! db-sift - query, inspect and export SQLite databases.
//!
//! Every statement goes through [`query::Dispatcher`], which runs it in its
//! own transaction and turns integrity violations into `Ok(None)`. Schema
//! queries, table browsing, file export and the interactive shell are all
//! built on top of it.

pub mod config;
pub mod db;
pub mod error;
pub mod export;
pub mod logging;
pub mod query;
pub mod safety;
pub mod schema;
pub mod shell;
