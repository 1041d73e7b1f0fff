//! Statement dispatch integration tests.
//!
//! Covers outcome shaping per statement kind and integrity recovery.

use std::sync::{Arc, Mutex};

use db_sift::config::DatabaseConfig;
use db_sift::db::{Record, Session, Value};
use db_sift::error::SiftError;
use db_sift::query::{Dispatcher, Outcome};
use pretty_assertions::assert_eq;

use super::common::{fixture_dispatcher, fresh_dispatcher};

#[tokio::test]
async fn test_select_returns_records_in_declared_order() {
    let (_dir, dispatcher) = fixture_dispatcher().await;

    let rows = dispatcher
        .query("SELECT * FROM test ORDER BY id", &[])
        .await
        .unwrap();

    assert_eq!(rows.columns(), vec!["id", "name", "age"]);
    assert_eq!(rows.len(), 4);
    assert_eq!(
        rows.records()[3],
        Record::new()
            .with("id", 4i64)
            .with("name", "rat")
            .with("age", Value::Null)
    );
}

#[tokio::test]
async fn test_pragma_returns_rows() {
    let (_dir, dispatcher) = fixture_dispatcher().await;

    let outcome = dispatcher
        .execute("PRAGMA table_info(test)", &[])
        .await
        .unwrap()
        .unwrap();

    let rows = outcome.into_rows().unwrap();
    let names: Vec<&str> = rows
        .iter()
        .filter_map(|row| row.get("name").and_then(Value::as_str))
        .collect();
    assert_eq!(names, vec!["id", "name", "age"]);
}

#[tokio::test]
async fn test_inserts_return_sequential_rowids() {
    let (_dir, dispatcher) = fresh_dispatcher().await;
    dispatcher
        .execute("CREATE TABLE seq(id INTEGER PRIMARY KEY, v TEXT)", &[])
        .await
        .unwrap();

    for expected in 1..=5i64 {
        let outcome = dispatcher
            .execute("INSERT INTO seq(v) VALUES (?)", &[Value::from("x")])
            .await
            .unwrap();
        assert_eq!(outcome, Some(Outcome::Inserted(expected)));
    }
}

#[tokio::test]
async fn test_update_and_delete_counts() {
    let (_dir, dispatcher) = fixture_dispatcher().await;

    let updated = dispatcher
        .execute("UPDATE test SET age = age + 1 WHERE age IS NOT NULL", &[])
        .await
        .unwrap();
    assert_eq!(updated, Some(Outcome::Affected(3)));

    let deleted = dispatcher.execute("DELETE FROM test", &[]).await.unwrap();
    assert_eq!(deleted, Some(Outcome::Affected(4)));

    let deleted_again = dispatcher.execute("DELETE FROM test", &[]).await.unwrap();
    assert_eq!(deleted_again, Some(Outcome::Affected(0)));
}

#[tokio::test]
async fn test_unique_collision_then_replace() {
    let (_dir, dispatcher) = fixture_dispatcher().await;

    let collision = dispatcher
        .execute(
            "INSERT INTO test(name, age) VALUES (?, ?)",
            &[Value::from("cat"), Value::from(99i64)],
        )
        .await
        .unwrap();
    assert_eq!(collision, None);

    let replaced = dispatcher
        .execute(
            "REPLACE INTO test(name, age) VALUES (?, ?)",
            &[Value::from("cat"), Value::from(99i64)],
        )
        .await
        .unwrap()
        .unwrap();
    let new_id = replaced.row_id().unwrap();
    assert_eq!(new_id, 5);

    let rows = dispatcher
        .query("SELECT id, age FROM test WHERE name = ?", &[Value::from("cat")])
        .await
        .unwrap();
    assert_eq!(
        rows.records(),
        &[Record::new().with("id", new_id).with("age", 99i64)]
    );
}

#[tokio::test]
async fn test_rejected_statement_leaves_store_unchanged() {
    let (_dir, dispatcher) = fixture_dispatcher().await;

    let outcome = dispatcher
        .execute("UPDATE test SET name = 'dog' WHERE name = 'cat'", &[])
        .await
        .unwrap();
    assert_eq!(outcome, None);

    let rows = dispatcher
        .query("SELECT name FROM test ORDER BY id", &[])
        .await
        .unwrap();
    let names: Vec<&str> = rows
        .iter()
        .filter_map(|row| row.get("name").and_then(Value::as_str))
        .collect();
    assert_eq!(names, vec!["dog", "cat", "man", "rat"]);
}

#[tokio::test]
async fn test_engine_fault_is_query_error() {
    let (_dir, dispatcher) = fixture_dispatcher().await;

    let err = dispatcher
        .execute("SELECT * FROM no_such_table", &[])
        .await
        .unwrap_err();
    assert!(matches!(err, SiftError::Query(_)));

    let err = dispatcher.execute("SELEC 1", &[]).await.unwrap_err();
    assert!(matches!(err, SiftError::Query(_)));
}

#[tokio::test]
async fn test_multiple_statements_run_nothing() {
    let (_dir, dispatcher) = fixture_dispatcher().await;

    let err = dispatcher
        .execute("DELETE FROM test WHERE id = 1; DROP TABLE test;", &[])
        .await
        .unwrap_err();
    assert!(matches!(err, SiftError::Query(_)));
    assert!(err.to_string().contains("Only one statement"));

    let rows = dispatcher.query("SELECT * FROM test", &[]).await.unwrap();
    assert_eq!(rows.len(), 4);
}

#[tokio::test]
async fn test_data_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("persist.db");

    let dispatcher = Dispatcher::new(Session::open_path(&path).await.unwrap());
    dispatcher
        .execute("CREATE TABLE kv(k TEXT PRIMARY KEY, v TEXT)", &[])
        .await
        .unwrap();
    dispatcher
        .execute("INSERT INTO kv VALUES ('a', 'b')", &[])
        .await
        .unwrap();
    dispatcher.close().await;

    let reopened = Dispatcher::new(Session::open_path(&path).await.unwrap());
    let rows = reopened.query("SELECT v FROM kv", &[]).await.unwrap();
    assert_eq!(rows.records(), &[Record::new().with("v", "b")]);
}

#[tokio::test]
async fn test_missing_file_without_create_is_connection_error() {
    let dir = tempfile::tempdir().unwrap();
    let config = DatabaseConfig {
        create_if_missing: false,
        ..DatabaseConfig::at(dir.path().join("absent.db"))
    };

    let err = Session::open(&config).await.unwrap_err();
    assert!(matches!(err, SiftError::Connection(_)));
}

#[tokio::test]
async fn test_trace_hook_sees_statement_before_substitution() {
    let dir = tempfile::tempdir().unwrap();
    let seen: Arc<Mutex<Vec<(String, usize)>>> = Arc::default();
    let sink = Arc::clone(&seen);

    let session = Session::open_path(dir.path().join("trace.db"))
        .await
        .unwrap()
        .with_trace(move |sql, params| sink.lock().unwrap().push((sql.to_string(), params)));
    let dispatcher = Dispatcher::new(session);

    dispatcher
        .execute("SELECT ? + ?", &[Value::from(1i64), Value::from(2i64)])
        .await
        .unwrap();

    assert_eq!(
        seen.lock().unwrap().as_slice(),
        &[("SELECT ? + ?".to_string(), 2)]
    );
}
