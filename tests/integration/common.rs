//! Shared fixtures for the integration tests.

use db_sift::db::{Session, Value};
use db_sift::query::Dispatcher;
use tempfile::TempDir;

/// Rows of the `test` fixture table, in insertion order.
pub const TEST_ROWS: [(&str, Option<i64>); 4] = [
    ("dog", Some(10)),
    ("cat", Some(20)),
    ("man", Some(30)),
    ("rat", None),
];

/// Opens a dispatcher on a fresh database file inside a temporary directory.
///
/// The directory is removed when the returned `TempDir` is dropped.
pub async fn fresh_dispatcher() -> (TempDir, Dispatcher) {
    let dir = tempfile::tempdir().unwrap();
    let session = Session::open_path(dir.path().join("sift.db")).await.unwrap();
    (dir, Dispatcher::new(session))
}

/// Opens a dispatcher with `test(id, name, age)` holding the four fixture rows
/// and an empty `empty_test` table.
pub async fn fixture_dispatcher() -> (TempDir, Dispatcher) {
    let (dir, dispatcher) = fresh_dispatcher().await;

    dispatcher
        .execute(
            "CREATE TABLE test(id INTEGER PRIMARY KEY, name TEXT UNIQUE, age INTEGER)",
            &[],
        )
        .await
        .unwrap();
    dispatcher
        .execute("CREATE TABLE empty_test(id INTEGER PRIMARY KEY, note TEXT)", &[])
        .await
        .unwrap();

    for (name, age) in TEST_ROWS {
        dispatcher
            .execute(
                "INSERT INTO test(name, age) VALUES (?, ?)",
                &[Value::from(name), Value::from(age)],
            )
            .await
            .unwrap();
    }

    (dir, dispatcher)
}
