//! Schema introspection integration tests.

use db_sift::schema::{ColumnDescriptor, Introspector};
use pretty_assertions::assert_eq;

use super::common::{fixture_dispatcher, fresh_dispatcher};

#[tokio::test]
async fn test_table_exists_after_creation() {
    let (_dir, dispatcher) = fresh_dispatcher().await;
    let introspector = Introspector::new(&dispatcher);

    assert!(!introspector.table_exists("fresh").await.unwrap());
    dispatcher
        .execute("CREATE TABLE fresh(x INTEGER)", &[])
        .await
        .unwrap();
    assert!(introspector.table_exists("fresh").await.unwrap());
}

#[tokio::test]
async fn test_column_non_null_counts() {
    let (_dir, dispatcher) = fixture_dispatcher().await;
    let introspector = Introspector::new(&dispatcher);

    let counts = introspector
        .column_non_null_counts("test")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        counts,
        vec![
            ("id".to_string(), 4),
            ("name".to_string(), 4),
            ("age".to_string(), 3),
        ]
    );

    assert_eq!(introspector.column_non_null_counts("missing").await.unwrap(), None);
}

#[tokio::test]
async fn test_row_counts() {
    let (_dir, dispatcher) = fixture_dispatcher().await;
    let introspector = Introspector::new(&dispatcher);

    assert_eq!(introspector.row_count("test").await.unwrap(), Some(4));
    assert_eq!(introspector.row_count("missing").await.unwrap(), None);
    assert_eq!(introspector.row_count("empty_test").await.unwrap(), Some(0));
}

#[tokio::test]
async fn test_counts_are_not_cached() {
    let (_dir, dispatcher) = fixture_dispatcher().await;
    let introspector = Introspector::new(&dispatcher);

    assert_eq!(introspector.row_count("test").await.unwrap(), Some(4));
    dispatcher.execute("DELETE FROM test WHERE id > 2", &[]).await.unwrap();
    assert_eq!(introspector.row_count("test").await.unwrap(), Some(2));
}

#[tokio::test]
async fn test_column_descriptors_of_fixture() {
    let (_dir, dispatcher) = fixture_dispatcher().await;

    let columns = Introspector::new(&dispatcher)
        .column_descriptors("test")
        .await
        .unwrap()
        .unwrap();

    assert_eq!(
        columns.iter().cloned().collect::<Vec<_>>(),
        vec![
            ColumnDescriptor::new(0, "id", "INTEGER").primary_key(1),
            ColumnDescriptor::new(1, "name", "TEXT"),
            ColumnDescriptor::new(2, "age", "INTEGER"),
        ]
    );
}

#[tokio::test]
async fn test_table_names_and_handle() {
    let (_dir, dispatcher) = fixture_dispatcher().await;
    let introspector = Introspector::new(&dispatcher);

    assert_eq!(
        introspector.table_names().await.unwrap(),
        vec!["empty_test".to_string(), "test".to_string()]
    );

    let handle = introspector.table("test").await.unwrap().unwrap();
    let display = handle.format_for_display();
    assert!(display.starts_with("Table: test\n"));
    assert!(display.ends_with("Rows: 4\n"));
}

#[tokio::test]
async fn test_quoted_table_name_is_usable() {
    let (_dir, dispatcher) = fresh_dispatcher().await;
    dispatcher
        .execute("CREATE TABLE \"odd \"\"name\"(v TEXT)", &[])
        .await
        .unwrap();
    dispatcher
        .execute("INSERT INTO \"odd \"\"name\" VALUES ('x')", &[])
        .await
        .unwrap();

    let introspector = Introspector::new(&dispatcher);
    assert_eq!(introspector.row_count("odd \"name").await.unwrap(), Some(1));
    assert_eq!(
        introspector.column_names("odd \"name").await.unwrap(),
        Some(vec!["v".to_string()])
    );
}
