//! Interactive shell integration tests.
//!
//! Drives the shell with scripted input against a file-backed database.

use db_sift::schema::Introspector;
use db_sift::shell::{Shell, ShellOutput, ShellState};
use pretty_assertions::assert_eq;

use super::common::fixture_dispatcher;

async fn run_script(shell: &mut Shell<'_>, script: &str) -> String {
    let mut out = Vec::new();
    shell.run(script.as_bytes(), &mut out).await.unwrap();
    String::from_utf8(out).unwrap()
}

#[tokio::test]
async fn test_confirmed_delete_changes_store() {
    let (_dir, dispatcher) = fixture_dispatcher().await;
    let mut shell = Shell::new(&dispatcher);

    let text = run_script(&mut shell, "DELETE FROM test\nWHERE age IS NULL;\nyes\nquit\n").await;

    assert!(text.contains("About to run: DELETE FROM test WHERE age IS NULL;"));
    assert!(text.contains("1 row(s) affected"));
    assert_eq!(
        Introspector::new(&dispatcher).row_count("test").await.unwrap(),
        Some(3)
    );
}

#[tokio::test]
async fn test_declined_drop_keeps_table() {
    let (_dir, dispatcher) = fixture_dispatcher().await;
    let mut shell = Shell::new(&dispatcher);

    let text = run_script(&mut shell, "DROP TABLE test;\nn\nquit\n").await;

    assert!(text.contains("Statement discarded"));
    assert!(Introspector::new(&dispatcher).table_exists("test").await.unwrap());
}

#[tokio::test]
async fn test_select_prints_nulls_and_footer() {
    let (_dir, dispatcher) = fixture_dispatcher().await;
    let mut shell = Shell::new(&dispatcher);

    let text = run_script(&mut shell, "SELECT name, age FROM test WHERE id = 4;\n").await;

    assert!(text.contains("rat  | NULL"));
    assert!(text.contains("(1 row)"));
}

#[tokio::test]
async fn test_semicolon_in_string_keeps_buffering() {
    let (_dir, dispatcher) = fixture_dispatcher().await;
    let mut shell = Shell::new(&dispatcher);

    assert!(shell.handle_line("SELECT 'a;").await.is_empty());
    assert_eq!(shell.buffer(), "SELECT 'a;");

    let out = shell.handle_line("b' AS v;").await;
    assert_eq!(
        out,
        vec![ShellOutput::Table {
            headers: vec!["v".to_string()],
            rows: vec![vec!["a; b".to_string()]],
        }]
    );
}

#[tokio::test]
async fn test_error_then_recovery() {
    let (_dir, dispatcher) = fixture_dispatcher().await;
    let mut shell = Shell::new(&dispatcher);

    let text = run_script(
        &mut shell,
        "SELECT nope FROM test;\nSELECT COUNT(*) AS n FROM test;\nquit\n",
    )
    .await;

    assert!(text.contains("Error: Query Error"));
    assert!(text.contains("(1 row)"));
    assert_eq!(shell.state(), &ShellState::Buffering);
}

#[tokio::test]
async fn test_end_of_input_while_confirming_declines() {
    let (_dir, dispatcher) = fixture_dispatcher().await;
    let mut shell = Shell::new(&dispatcher);

    let text = run_script(&mut shell, "UPDATE test SET age = 0;\n").await;

    assert!(text.contains("Statement discarded"));
    let rows = dispatcher
        .query("SELECT COUNT(*) AS n FROM test WHERE age = 0", &[])
        .await
        .unwrap();
    assert_eq!(rows.first().and_then(|r| r.get("n")).and_then(|v| v.as_i64()), Some(0));
}

#[tokio::test]
async fn test_select_then_drop_on_one_line_is_confirmed_first() {
    let (_dir, dispatcher) = fixture_dispatcher().await;
    let mut shell = Shell::new(&dispatcher);

    let text = run_script(&mut shell, "SELECT 1; DROP TABLE test;\nn\nquit\n").await;

    assert!(text.contains("About to run: SELECT 1; DROP TABLE test;"));
    assert!(text.contains("Statement discarded"));
    assert!(!text.contains("(1 row)"));
    assert!(Introspector::new(&dispatcher).table_exists("test").await.unwrap());
}
