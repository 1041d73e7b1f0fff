//! Help text constants for the sift shell.

/// Help text printed by `help` and for statements the shell will not run.
pub const HELP_TEXT: &str = r#"Enter SQL statements terminated by ';'. A statement may span several lines.

Commands:
  quit     - Exit the shell
  help     - Show this help message
  clear    - Discard the statement being entered
  state    - Show the statement being entered

Statements:
  SELECT ...                       - Run and print the rows
  INSERT, REPLACE, UPDATE, DELETE,
  CREATE, DROP, ALTER ...          - Run after confirming with y/yes

Any other statement is not run from the shell."#;

/// Banner printed when the shell starts.
pub fn banner(location: &str) -> String {
    format!(
        "sift {} connected to {location}\nType 'help' for usage.",
        env!("CARGO_PKG_VERSION")
    )
}
