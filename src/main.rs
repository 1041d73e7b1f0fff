//! sift - query, inspect and export SQLite databases.

mod cli;

use cli::{Cli, Mode};
use db_sift::config::{Config, DatabaseConfig};
use db_sift::db::{ResultSet, Session, Value};
use db_sift::error::{Result, SiftError};
use db_sift::export::Exporter;
use db_sift::logging::LogTarget;
use db_sift::query::{Dispatcher, Outcome, TableIterator};
use db_sift::schema::Introspector;
use db_sift::shell::{help, render_output, render_table, Shell, ShellOutput};
use tokio::io::BufReader;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    // A missing .env file is fine
    dotenvy::dotenv().ok();

    let cli = Cli::parse_args();
    let log_target = LogTarget::choose(cli.logs_to_file());
    if let Err(e) = log_target.init() {
        eprintln!("Warning: Could not open log file, logging disabled: {e}");
    }

    if let Err(e) = run(cli).await {
        error!("{}: {}", e.category(), e);
        if log_target.is_file() {
            eprintln!("{}: {e}", e.category());
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config_path();
    info!("Loading config from: {}", config_path.display());
    let config = Config::load_from_file(&config_path)?;

    let mode = cli.mode(&config.export.format)?;
    let database = resolve_database(&cli, &config);
    info!("Database: {}", database.display_string());

    let session = Session::open(&database).await?;
    let dispatcher = Dispatcher::new(session).with_exporter(Exporter::from_config(&config.export));

    let result = run_mode(&dispatcher, mode).await;
    dispatcher.close().await;
    result
}

/// Picks the database: CLI argument, then `SIFT_DATABASE`, then the config file.
fn resolve_database(cli: &Cli, config: &Config) -> DatabaseConfig {
    let mut chosen = cli.to_database_config();
    chosen.apply_env_defaults();

    let mut database = config.database.clone();
    database.merge(&chosen);
    database
}

async fn run_mode(dispatcher: &Dispatcher, mode: Mode) -> Result<()> {
    match mode {
        Mode::Shell => {
            println!("{}", help::banner(dispatcher.session().location()));
            let mut stdout = std::io::stdout();
            Shell::new(dispatcher)
                .run(BufReader::new(tokio::io::stdin()), &mut stdout)
                .await
        }
        Mode::Execute {
            sql,
            params,
            export,
            output,
        } => execute(dispatcher, &sql, &params, export.as_deref(), output.as_deref()).await,
        Mode::Describe(table) => describe(dispatcher, &table).await,
        Mode::Tables => {
            for name in Introspector::new(dispatcher).table_names().await? {
                println!("{name}");
            }
            Ok(())
        }
        Mode::Browse { table, take } => browse(dispatcher, &table, take).await,
        Mode::ExportTable {
            table,
            format,
            output,
        } => {
            let path = dispatcher
                .exporter()
                .export_table(dispatcher, &table, &format, output.as_deref())
                .await?
                .ok_or_else(|| table_not_found(&table))?;
            println!("Wrote {table} to {}", path.display());
            Ok(())
        }
    }
}

async fn execute(
    dispatcher: &Dispatcher,
    sql: &str,
    params: &[Value],
    export: Option<&str>,
    output: Option<&std::path::Path>,
) -> Result<()> {
    let outcome = match export {
        Some(format) => dispatcher.execute_export(sql, params, format, output).await?,
        None => dispatcher.execute(sql, params).await?,
    };

    match outcome {
        Some(Outcome::Rows(rows)) => print_rows(&rows),
        Some(outcome) => println!("{}", outcome.summary()),
        None => println!("Statement rejected by a constraint; nothing was changed"),
    }
    Ok(())
}

async fn describe(dispatcher: &Dispatcher, table: &str) -> Result<()> {
    let introspector = Introspector::new(dispatcher);
    let handle = introspector
        .table(table)
        .await?
        .ok_or_else(|| table_not_found(table))?;
    print!("{}", handle.format_for_display());

    if let Some(counts) = introspector.column_non_null_counts(table).await? {
        println!("Non-null values:");
        for (column, count) in counts {
            println!("  - {column}: {count}");
        }
    }
    Ok(())
}

async fn browse(dispatcher: &Dispatcher, table: &str, take: usize) -> Result<()> {
    let iter = TableIterator::open(dispatcher, table)
        .await?
        .ok_or_else(|| table_not_found(table))?;

    let available = usize::try_from(iter.len().await?).unwrap_or(0);
    let records = iter.take(take.min(available)).await?;
    let rows: Vec<Vec<String>> = records
        .iter()
        .map(|record| record.values().map(|v| v.to_display_string()).collect())
        .collect();

    print!("{}", render_table(&iter.columns().await?, &rows));
    Ok(())
}

fn print_rows(rows: &ResultSet) {
    print!("{}", render_output(&ShellOutput::from_result_set(rows)));
}

fn table_not_found(table: &str) -> SiftError {
    SiftError::query(format!("Table '{table}' not found"))
}
