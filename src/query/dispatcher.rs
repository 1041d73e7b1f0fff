//! Statement dispatch.
//!
//! Classifies each statement by its leading keyword, runs it through the
//! session and shapes the store's answer into an [`Outcome`].

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::db::{format_query_error, is_integrity_violation, RawOutcome, ResultSet, Session, Value};
use crate::error::{Result, SiftError};
use crate::export::{ExportFormat, Exporter};
use crate::safety::split_statements;

use super::StatementKind;

/// Error returned for input holding more than one statement.
const MULTIPLE_STATEMENTS_MESSAGE: &str = "Only one statement can be executed at a time";

/// File name stem used when a query result is exported without an explicit path.
const QUERY_EXPORT_STEM: &str = "query";

/// Shaped result of a successfully dispatched statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// All rows of a query, fully materialized.
    Rows(ResultSet),
    /// Query rows were written to a file instead of being returned.
    Exported { path: PathBuf, rows: usize },
    /// Rowid assigned to the inserted row.
    Inserted(i64),
    /// Number of rows the store reports as changed.
    Affected(u64),
    /// A statement with nothing to report succeeded.
    Done,
}

impl Outcome {
    /// Returns the rows of a query outcome.
    pub fn into_rows(self) -> Option<ResultSet> {
        match self {
            Self::Rows(rows) => Some(rows),
            _ => None,
        }
    }

    pub fn row_id(&self) -> Option<i64> {
        match self {
            Self::Inserted(id) => Some(*id),
            _ => None,
        }
    }

    pub fn affected(&self) -> Option<u64> {
        match self {
            Self::Affected(count) => Some(*count),
            _ => None,
        }
    }

    /// One-line description for non-tabular output.
    pub fn summary(&self) -> String {
        match self {
            Self::Rows(rows) => format!("{} row(s) returned", rows.len()),
            Self::Exported { path, rows } => {
                format!("Wrote {} row(s) to {}", rows, path.display())
            }
            Self::Inserted(id) => format!("Inserted row {id}"),
            Self::Affected(count) => format!("{count} row(s) affected"),
            Self::Done => "OK".to_string(),
        }
    }
}

/// Where a query's rows should go instead of back to the caller.
struct ExportTarget<'a> {
    format: ExportFormat,
    outfile: Option<&'a Path>,
}

/// Classifies, executes and shapes statements against one session.
#[derive(Debug)]
pub struct Dispatcher {
    session: Session,
    exporter: Exporter,
}

impl Dispatcher {
    /// Creates a dispatcher that owns `session`.
    pub fn new(session: Session) -> Self {
        Self {
            session,
            exporter: Exporter::default(),
        }
    }

    /// Replaces the exporter used by [`Dispatcher::execute_export`].
    pub fn with_exporter(mut self, exporter: Exporter) -> Self {
        self.exporter = exporter;
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn exporter(&self) -> &Exporter {
        &self.exporter
    }

    /// Executes one statement with positional parameters.
    ///
    /// Returns `Ok(None)` when the store rejects the statement with an
    /// integrity violation; the statement is rolled back and nothing changes.
    /// Every other store error is returned as [`SiftError::Query`].
    pub async fn execute(&self, sql: &str, params: &[Value]) -> Result<Option<Outcome>> {
        self.dispatch(sql, params, None).await
    }

    /// Like [`Dispatcher::execute`], but query rows are written to a file in
    /// `format` and the outcome is [`Outcome::Exported`].
    ///
    /// The format is checked before anything runs.
    pub async fn execute_export(
        &self,
        sql: &str,
        params: &[Value],
        format: &str,
        outfile: Option<&Path>,
    ) -> Result<Option<Outcome>> {
        let format: ExportFormat = format.parse()?;
        self.dispatch(sql, params, Some(ExportTarget { format, outfile }))
            .await
    }

    /// Runs a row-returning statement and hands back its rows.
    ///
    /// A statement that does not return rows is refused without running.
    pub async fn query(&self, sql: &str, params: &[Value]) -> Result<ResultSet> {
        let kind = StatementKind::classify(sql);
        if !kind.returns_rows() {
            return Err(SiftError::query(format!(
                "Expected a row-returning statement, got {kind}: {sql}"
            )));
        }

        match self.execute(sql, params).await? {
            Some(Outcome::Rows(rows)) => Ok(rows),
            Some(other) => Err(SiftError::internal(format!(
                "Expected rows from '{sql}', got: {}",
                other.summary()
            ))),
            None => Err(SiftError::query(format!(
                "Statement rejected by a constraint: {sql}"
            ))),
        }
    }

    async fn dispatch(
        &self,
        sql: &str,
        params: &[Value],
        export: Option<ExportTarget<'_>>,
    ) -> Result<Option<Outcome>> {
        if split_statements(sql).len() > 1 {
            return Err(SiftError::query(MULTIPLE_STATEMENTS_MESSAGE));
        }

        let kind = StatementKind::classify(sql);
        debug!(kind = %kind, params = params.len(), "Dispatching: {}", sql);

        let raw = match self.session.run(sql, params, kind.returns_rows()).await {
            Ok(raw) => raw,
            Err(e) if is_integrity_violation(&e) => {
                warn!("Integrity violation, statement rolled back: {}", format_query_error(&e));
                return Ok(None);
            }
            Err(e) => return Err(SiftError::query(format_query_error(&e))),
        };

        let outcome = match (kind, raw) {
            (StatementKind::Query, RawOutcome::Rows(records)) => {
                let rows = ResultSet::from_records(records);
                match export {
                    Some(target) => {
                        let path = self.exporter.write(
                            &rows,
                            None,
                            target.format,
                            target.outfile,
                            QUERY_EXPORT_STEM,
                        )?;
                        Outcome::Exported {
                            path,
                            rows: rows.len(),
                        }
                    }
                    None => Outcome::Rows(rows),
                }
            }
            (StatementKind::Insert, RawOutcome::Done { last_insert_rowid, .. }) => {
                Outcome::Inserted(last_insert_rowid)
            }
            (StatementKind::Mutate, RawOutcome::Done { rows_affected, .. }) => {
                Outcome::Affected(rows_affected)
            }
            (StatementKind::Other, RawOutcome::Done { .. }) => Outcome::Done,
            (kind, raw) => {
                return Err(SiftError::internal(format!(
                    "{kind} statement produced an unexpected result: {raw:?}"
                )))
            }
        };

        Ok(Some(outcome))
    }

    /// Closes the underlying session.
    pub async fn close(&self) {
        self.session.close().await;
    }
}
