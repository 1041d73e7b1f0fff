//! Command-line argument parsing for sift.

use clap::Parser;
use db_sift::config::{Config, DatabaseConfig};
use db_sift::db::Value;
use db_sift::error::{Result, SiftError};
use std::path::PathBuf;

/// Rows printed by `--table` when `--take` is not given.
const DEFAULT_TAKE: usize = 10;

/// What one invocation of the binary does.
#[derive(Debug, Clone, PartialEq)]
pub enum Mode {
    /// Interactive shell on stdin/stdout.
    Shell,
    /// Dispatch one statement and print its outcome, or export its rows.
    Execute {
        sql: String,
        params: Vec<Value>,
        export: Option<String>,
        output: Option<PathBuf>,
    },
    /// Print the descriptors, row count and non-null counts of a table.
    Describe(String),
    /// List catalog tables.
    Tables,
    /// Print the first rows of a table.
    Browse { table: String, take: usize },
    /// Write a whole table to a file.
    ExportTable {
        table: String,
        format: String,
        output: Option<PathBuf>,
    },
}

/// Query, inspect and export SQLite databases.
#[derive(Parser, Debug)]
#[command(name = "sift")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to the SQLite database file
    #[arg(value_name = "DB_PATH")]
    pub db_path: Option<PathBuf>,

    /// Execute one SQL statement and exit
    #[arg(short = 'e', long, value_name = "SQL")]
    pub execute: Option<String>,

    /// Positional parameter for --execute (repeatable; NULL, integer, real or text)
    #[arg(short = 'p', long = "param", value_name = "VALUE", requires = "execute")]
    pub params: Vec<String>,

    /// Write query rows to a file in FORMAT (csv or json) instead of printing them
    #[arg(long, value_name = "FORMAT", num_args = 0..=1)]
    pub export: Option<Option<String>>,

    /// Output file for --export
    #[arg(short = 'o', long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Describe a table's columns and counts
    #[arg(short = 'd', long, value_name = "TABLE")]
    pub describe: Option<String>,

    /// List tables
    #[arg(long)]
    pub tables: bool,

    /// Browse (or with --export, export) a table
    #[arg(short = 't', long, value_name = "NAME")]
    pub table: Option<String>,

    /// Number of rows to print with --table
    #[arg(short = 'n', long, value_name = "N", requires = "table")]
    pub take: Option<usize>,

    /// Config file path
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Write logs to the log file instead of stderr
    #[arg(long)]
    pub log_file: bool,
}

impl Cli {
    /// Parses command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Resolves the flags into a single mode.
    ///
    /// `default_format` is used when `--export` is given without a value.
    pub fn mode(&self, default_format: &str) -> Result<Mode> {
        let selected = [
            self.execute.is_some(),
            self.describe.is_some(),
            self.tables,
            self.table.is_some(),
        ]
        .iter()
        .filter(|flag| **flag)
        .count();

        if selected > 1 {
            return Err(SiftError::config(
                "Use only one of --execute, --describe, --tables and --table",
            ));
        }

        let export = self
            .export
            .as_ref()
            .map(|format| format.clone().unwrap_or_else(|| default_format.to_string()));

        if let Some(sql) = &self.execute {
            return Ok(Mode::Execute {
                sql: sql.clone(),
                params: self.params.iter().map(|p| Value::parse_literal(p)).collect(),
                export,
                output: self.output.clone(),
            });
        }

        if let Some(table) = &self.table {
            return match export {
                Some(_) if self.take.is_some() => Err(SiftError::config(
                    "--take cannot be combined with --export",
                )),
                Some(format) => Ok(Mode::ExportTable {
                    table: table.clone(),
                    format,
                    output: self.output.clone(),
                }),
                None => Ok(Mode::Browse {
                    table: table.clone(),
                    take: self.take.unwrap_or(DEFAULT_TAKE),
                }),
            };
        }

        if export.is_some() || self.output.is_some() {
            return Err(SiftError::config(
                "--export and --output need --execute or --table",
            ));
        }

        if let Some(table) = &self.describe {
            return Ok(Mode::Describe(table.clone()));
        }

        if self.tables {
            return Ok(Mode::Tables);
        }

        Ok(Mode::Shell)
    }

    /// Returns the config file path to use.
    ///
    /// Uses the --config argument if provided, otherwise the default path.
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(Config::default_path)
    }

    /// Database options given on the command line only.
    pub fn to_database_config(&self) -> DatabaseConfig {
        DatabaseConfig {
            path: self.db_path.clone(),
            ..DatabaseConfig::default()
        }
    }

    /// True when no one-shot flag is given and the shell will start.
    pub fn is_interactive(&self) -> bool {
        self.execute.is_none() && self.describe.is_none() && !self.tables && self.table.is_none()
    }

    /// True when logs should go to the log file.
    pub fn logs_to_file(&self) -> bool {
        self.log_file || self.is_interactive()
    }
}
