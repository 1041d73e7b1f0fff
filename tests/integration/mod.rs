//! Integration tests for db-sift.

pub mod common;
pub mod dispatch_test;
pub mod export_test;
pub mod schema_test;
pub mod shell_test;
