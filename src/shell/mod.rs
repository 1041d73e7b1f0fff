//! Line-oriented interactive SQL shell.
//!
//! Lines are collected into a statement buffer until the buffer is a
//! complete statement. A buffer holding several statements is judged by its
//! most dangerous one; statements that change data or schema wait for a
//! `y`/`yes` reply before they run.

pub mod help;
pub mod output;

use std::io::{ErrorKind, Write};

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, info, warn};

use crate::error::{Result, SiftError};
use crate::query::{Dispatcher, Outcome};
use crate::safety::{is_affirmative, is_complete_statement, split_statements, SafetyLevel};

pub use help::HELP_TEXT;
pub use output::{render_output, render_table, ShellOutput};

/// Prompt shown when no statement is being entered.
pub const PROMPT: &str = "sift> ";

/// Prompt shown while a statement spans several lines.
pub const CONTINUATION_PROMPT: &str = "  ...> ";

/// Prompt shown while a statement awaits confirmation.
pub const CONFIRM_PROMPT: &str = "Execute? [y/N] ";

/// Reply printed when a statement is rejected by a constraint.
const CONSTRAINT_MESSAGE: &str = "Statement rejected by a constraint; nothing was changed";

/// Reply printed for an input line that is not valid UTF-8.
const INVALID_LINE_MESSAGE: &str = "Input line is not valid UTF-8; line dropped";

/// Where the shell is in its input cycle.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ShellState {
    /// Collecting lines into the buffer.
    #[default]
    Buffering,
    /// A complete statement is waiting for a y/yes reply.
    AwaitingConfirmation { statement: String },
}

/// Interactive shell bound to one dispatcher.
#[derive(Debug)]
pub struct Shell<'a> {
    dispatcher: &'a Dispatcher,
    buffer: String,
    state: ShellState,
}

impl<'a> Shell<'a> {
    pub fn new(dispatcher: &'a Dispatcher) -> Self {
        Self {
            dispatcher,
            buffer: String::new(),
            state: ShellState::default(),
        }
    }

    pub fn state(&self) -> &ShellState {
        &self.state
    }

    /// The statement text collected so far.
    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// Prompt matching the current state.
    pub fn prompt(&self) -> &'static str {
        match self.state {
            ShellState::AwaitingConfirmation { .. } => CONFIRM_PROMPT,
            ShellState::Buffering if self.buffer.is_empty() => PROMPT,
            ShellState::Buffering => CONTINUATION_PROMPT,
        }
    }

    /// Handles one input line and returns what to print.
    pub async fn handle_line(&mut self, line: &str) -> Vec<ShellOutput> {
        if let ShellState::AwaitingConfirmation { statement } = std::mem::take(&mut self.state) {
            return if is_affirmative(line) {
                self.run_statements(&split_statements(&statement)).await
            } else {
                debug!("Declined: {}", statement);
                vec![ShellOutput::info("Statement discarded")]
            };
        }

        let trimmed = line.trim();
        match trimmed.to_lowercase().as_str() {
            "quit" => return vec![ShellOutput::Exit],
            "help" => return vec![ShellOutput::info(HELP_TEXT)],
            "clear" => {
                self.buffer.clear();
                return vec![ShellOutput::info("Buffer cleared")];
            }
            "state" => {
                let shown = if self.buffer.is_empty() {
                    "(empty)"
                } else {
                    self.buffer.as_str()
                };
                return vec![ShellOutput::info(shown)];
            }
            _ => {}
        }

        if trimmed.is_empty() && self.buffer.is_empty() {
            return Vec::new();
        }

        if !self.buffer.is_empty() {
            self.buffer.push(' ');
        }
        self.buffer.push_str(line);

        if !is_complete_statement(&self.buffer) {
            return Vec::new();
        }

        let statement = std::mem::take(&mut self.buffer).trim().to_string();
        let statements = split_statements(&statement);
        match SafetyLevel::classify_all(&statements) {
            SafetyLevel::Safe => self.run_statements(&statements).await,
            SafetyLevel::Destructive => {
                self.state = ShellState::AwaitingConfirmation {
                    statement: statement.clone(),
                };
                vec![ShellOutput::Confirm(statement)]
            }
            SafetyLevel::Unsupported => vec![ShellOutput::info(HELP_TEXT)],
        }
    }

    /// Handles end of input. A statement awaiting confirmation is declined.
    pub fn end_of_input(&mut self) -> Vec<ShellOutput> {
        match std::mem::take(&mut self.state) {
            ShellState::AwaitingConfirmation { statement } => {
                debug!("End of input, declined: {}", statement);
                vec![ShellOutput::info("Statement discarded"), ShellOutput::Exit]
            }
            ShellState::Buffering => vec![ShellOutput::Exit],
        }
    }

    /// Reads lines from `input` until `quit` or end of input, writing prompts
    /// and rendered output to `out`.
    pub async fn run<R, W>(&mut self, input: R, out: &mut W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        info!("Shell started on {}", self.dispatcher.session().location());
        let mut lines = input.lines();

        loop {
            write_out(out, self.prompt())?;

            let outputs = match lines.next_line().await {
                Ok(Some(line)) => self.handle_line(&line).await,
                Ok(None) => {
                    write_out(out, "\n")?;
                    self.end_of_input()
                }
                // The offending line has been consumed; keep reading
                Err(e) if e.kind() == ErrorKind::InvalidData => {
                    warn!("Dropped input line: {e}");
                    vec![ShellOutput::error(INVALID_LINE_MESSAGE)]
                }
                Err(e) => {
                    return Err(SiftError::internal(format!("Failed to read input: {e}")));
                }
            };

            let mut exit = false;
            for output in &outputs {
                exit |= matches!(output, ShellOutput::Exit);
                write_out(out, &render_output(output))?;
            }
            if exit {
                break;
            }
        }

        info!("Shell stopped");
        Ok(())
    }

    /// Runs statements in order, stopping after the first one that fails.
    async fn run_statements(&self, statements: &[String]) -> Vec<ShellOutput> {
        let mut outputs = Vec::with_capacity(statements.len());
        for statement in statements {
            let output = self.run_statement(statement).await;
            let failed = matches!(output, ShellOutput::Error(_));
            outputs.push(output);
            if failed {
                break;
            }
        }
        outputs
    }

    async fn run_statement(&self, statement: &str) -> ShellOutput {
        match self.dispatcher.execute(statement, &[]).await {
            Ok(Some(Outcome::Rows(rows))) => ShellOutput::from_result_set(&rows),
            Ok(Some(outcome)) => ShellOutput::info(outcome.summary()),
            Ok(None) => ShellOutput::error(CONSTRAINT_MESSAGE),
            Err(e) => ShellOutput::error(format!("{}: {e}", e.category())),
        }
    }
}

fn write_out<W: Write>(out: &mut W, text: &str) -> Result<()> {
    out.write_all(text.as_bytes())
        .and_then(|_| out.flush())
        .map_err(|e| SiftError::internal(format!("Failed to write output: {e}")))
}
