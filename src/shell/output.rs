//! Shell output types and their text rendering.
//!
//! The state machine in [`super::Shell`] produces [`ShellOutput`] values;
//! rendering them to text happens separately so tests can inspect the
//! structured form.

use crate::db::ResultSet;

/// One piece of output produced while handling a shell line.
#[derive(Debug, Clone, PartialEq)]
pub enum ShellOutput {
    /// Informational message (outcome summaries, help, buffer contents).
    Info(String),

    /// Error message; the shell keeps running.
    Error(String),

    /// Query rows for display.
    Table {
        /// Column headers.
        headers: Vec<String>,
        /// Row data, already converted to display strings.
        rows: Vec<Vec<String>>,
    },

    /// A statement is waiting for a y/yes reply.
    Confirm(String),

    /// The shell should stop.
    Exit,
}

impl ShellOutput {
    /// Creates an info message.
    pub fn info(msg: impl Into<String>) -> Self {
        Self::Info(msg.into())
    }

    /// Creates an error message.
    pub fn error(msg: impl Into<String>) -> Self {
        Self::Error(msg.into())
    }

    /// Converts query rows into a table output, NULL shown as `NULL`.
    pub fn from_result_set(rows: &ResultSet) -> Self {
        Self::Table {
            headers: rows.columns(),
            rows: rows
                .iter()
                .map(|record| record.values().map(|v| v.to_display_string()).collect())
                .collect(),
        }
    }
}

/// Renders one output as the text printed to the terminal.
///
/// `Exit` renders as nothing.
pub fn render_output(output: &ShellOutput) -> String {
    match output {
        ShellOutput::Info(msg) => format!("{msg}\n"),
        ShellOutput::Error(msg) => format!("Error: {msg}\n"),
        ShellOutput::Table { headers, rows } => render_table(headers, rows),
        ShellOutput::Confirm(sql) => format!("About to run: {sql}\n"),
        ShellOutput::Exit => String::new(),
    }
}

/// Renders rows as an aligned text table followed by a row-count footer.
pub fn render_table(headers: &[String], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            let len = cell.chars().count();
            match widths.get_mut(i) {
                Some(width) => *width = (*width).max(len),
                None => widths.push(len),
            }
        }
    }

    let mut out = String::new();
    if !headers.is_empty() {
        out.push_str(&format_row(headers, &widths));
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        out.push_str(&rule.join("-+-"));
        out.push('\n');
    }
    for row in rows {
        out.push_str(&format_row(row, &widths));
    }

    let noun = if rows.len() == 1 { "row" } else { "rows" };
    out.push_str(&format!("({} {noun})\n", rows.len()));
    out
}

fn format_row(cells: &[String], widths: &[usize]) -> String {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{cell:<width$}"))
        .collect();
    format!("{}\n", padded.join(" | ").trim_end())
}
