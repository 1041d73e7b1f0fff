//! Export integration tests.

use std::fs;

use db_sift::error::SiftError;
use db_sift::export::Exporter;
use db_sift::query::Outcome;
use pretty_assertions::assert_eq;

use super::common::{fixture_dispatcher, TEST_ROWS};

#[tokio::test]
async fn test_csv_export_of_fixture_table() {
    let (dir, dispatcher) = fixture_dispatcher().await;
    let rows = dispatcher.query("SELECT * FROM test", &[]).await.unwrap();

    let path = Exporter::new(dir.path())
        .to_file(&rows, "csv", None)
        .unwrap();
    assert_eq!(path, dir.path().join("query.csv"));

    let content = fs::read_to_string(&path).unwrap();
    let mut lines = content.lines();
    assert_eq!(lines.next(), Some("id,name,age"));

    let mut read_back: Vec<Vec<String>> = lines
        .map(|line| line.split(',').map(String::from).collect())
        .collect();
    read_back.sort();

    let mut expected: Vec<Vec<String>> = TEST_ROWS
        .iter()
        .enumerate()
        .map(|(i, (name, age))| {
            vec![
                (i + 1).to_string(),
                name.to_string(),
                age.map(|a| a.to_string()).unwrap_or_default(),
            ]
        })
        .collect();
    expected.sort();

    assert_eq!(read_back, expected);
    assert!(content.contains("4,rat,\n"));
}

#[tokio::test]
async fn test_json_export_keeps_column_order_and_nulls() {
    let (dir, dispatcher) = fixture_dispatcher().await;
    let rows = dispatcher
        .query("SELECT name, age FROM test WHERE id IN (1, 4) ORDER BY id", &[])
        .await
        .unwrap();

    let outfile = dir.path().join("nested").join("rows.json");
    let path = Exporter::default()
        .to_file(&rows, "JSON", Some(outfile.as_path()))
        .unwrap();

    let parsed: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(
        parsed,
        serde_json::json!([
            {"name": "dog", "age": 10},
            {"name": "rat", "age": null}
        ])
    );

    let raw = fs::read_to_string(&path).unwrap();
    assert!(raw.find("\"name\"").unwrap() < raw.find("\"age\"").unwrap());
}

#[tokio::test]
async fn test_unsupported_format_names_value_and_choices() {
    let (dir, dispatcher) = fixture_dispatcher().await;
    let rows = dispatcher.query("SELECT * FROM test", &[]).await.unwrap();

    let err = Exporter::new(dir.path())
        .to_file(&rows, "xml", None)
        .unwrap_err();
    assert!(matches!(&err, SiftError::UnsupportedFormat { format } if format == "xml"));

    let message = err.to_string();
    assert!(message.contains("xml"));
    assert!(message.contains("csv, json"));
    assert!(!dir.path().join("query.xml").exists());
}

#[tokio::test]
async fn test_execute_export_writes_file_instead_of_returning_rows() {
    let (dir, dispatcher) = fixture_dispatcher().await;
    let dispatcher = dispatcher.with_exporter(Exporter::new(dir.path()));

    let outcome = dispatcher
        .execute_export("SELECT * FROM test", &[], "csv", None)
        .await
        .unwrap();

    assert_eq!(
        outcome,
        Some(Outcome::Exported {
            path: dir.path().join("query.csv"),
            rows: 4
        })
    );
}

#[tokio::test]
async fn test_execute_export_rejects_format_before_running() {
    let (_dir, dispatcher) = fixture_dispatcher().await;

    let err = dispatcher
        .execute_export("DELETE FROM test", &[], "xml", None)
        .await
        .unwrap_err();
    assert!(matches!(err, SiftError::UnsupportedFormat { .. }));

    let rows = dispatcher.query("SELECT * FROM test", &[]).await.unwrap();
    assert_eq!(rows.len(), 4);
}

#[tokio::test]
async fn test_export_table_uses_catalog_header() {
    let (dir, dispatcher) = fixture_dispatcher().await;
    let exporter = Exporter::new(dir.path());

    let path = exporter
        .export_table(&dispatcher, "empty_test", "csv", None)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(path, dir.path().join("empty_test.csv"));
    assert_eq!(fs::read_to_string(&path).unwrap(), "id,note\n");

    let missing = exporter
        .export_table(&dispatcher, "missing", "csv", None)
        .await
        .unwrap();
    assert_eq!(missing, None);
}
