//! Catalog queries: table existence, column descriptors and row counts.
//!
//! Every method that takes a plain table name first looks it up in
//! `sqlite_master` with a bound parameter and returns `None` when it is not
//! there. Only names that pass that lookup are spliced into SQL text.

use crate::db::Value;
use crate::error::{Result, SiftError};
use crate::query::Dispatcher;

use super::{quote_identifier, CheckedTable, ColumnDescriptor, ColumnDescriptors, TableHandle};

const TABLE_LOOKUP_SQL: &str =
    "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?";

const TABLE_LIST_SQL: &str =
    "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name";

/// Schema queries issued through a [`Dispatcher`].
#[derive(Debug, Clone, Copy)]
pub struct Introspector<'a> {
    dispatcher: &'a Dispatcher,
}

impl<'a> Introspector<'a> {
    pub fn new(dispatcher: &'a Dispatcher) -> Self {
        Self { dispatcher }
    }

    /// Returns true if a table called `name` exists.
    pub async fn table_exists(&self, name: &str) -> Result<bool> {
        Ok(self.check(name).await?.is_some())
    }

    /// Looks `name` up in the catalog.
    pub async fn check(&self, name: &str) -> Result<Option<CheckedTable>> {
        let rows = self
            .dispatcher
            .query(TABLE_LOOKUP_SQL, &[Value::from(name)])
            .await?;

        Ok(rows
            .first()
            .and_then(|row| row.get("name"))
            .and_then(Value::as_str)
            .map(CheckedTable::new))
    }

    /// Names of all user tables, sorted.
    pub async fn table_names(&self) -> Result<Vec<String>> {
        let rows = self.dispatcher.query(TABLE_LIST_SQL, &[]).await?;
        Ok(rows
            .iter()
            .filter_map(|row| row.get("name").and_then(Value::as_str))
            .map(String::from)
            .collect())
    }

    /// Column descriptors of `table`, or `None` if it does not exist.
    pub async fn column_descriptors(&self, table: &str) -> Result<Option<ColumnDescriptors>> {
        match self.check(table).await? {
            Some(checked) => self.descriptors_of(&checked).await.map(Some),
            None => Ok(None),
        }
    }

    /// Column names of `table` in declared order, or `None` if it does not exist.
    pub async fn column_names(&self, table: &str) -> Result<Option<Vec<String>>> {
        Ok(self
            .column_descriptors(table)
            .await?
            .map(|columns| columns.names()))
    }

    /// Number of rows in `table`, or `None` if it does not exist.
    pub async fn row_count(&self, table: &str) -> Result<Option<i64>> {
        match self.check(table).await? {
            Some(checked) => self.count_of(&checked).await.map(Some),
            None => Ok(None),
        }
    }

    /// Non-NULL value count per column, in declared order, or `None` if the
    /// table does not exist. Each column is counted with its own query.
    pub async fn column_non_null_counts(&self, table: &str) -> Result<Option<Vec<(String, i64)>>> {
        let Some(checked) = self.check(table).await? else {
            return Ok(None);
        };

        let columns = self.descriptors_of(&checked).await?;
        let mut counts = Vec::with_capacity(columns.len());

        for column in &columns {
            let sql = format!(
                "SELECT COUNT({}) AS count FROM {}",
                quote_identifier(&column.name),
                checked.quoted()
            );
            counts.push((column.name.clone(), self.scalar_count(&sql).await?));
        }

        Ok(Some(counts))
    }

    /// Name, columns and current row count of `table`, or `None` if it does not exist.
    pub async fn table(&self, name: &str) -> Result<Option<TableHandle>> {
        let Some(checked) = self.check(name).await? else {
            return Ok(None);
        };

        let columns = self.descriptors_of(&checked).await?;
        let row_count = self.count_of(&checked).await?;

        Ok(Some(TableHandle {
            name: checked.name().to_string(),
            columns,
            row_count,
        }))
    }

    pub(crate) async fn descriptors_of(&self, table: &CheckedTable) -> Result<ColumnDescriptors> {
        let rows = self
            .dispatcher
            .query(&format!("PRAGMA table_info({})", table.quoted()), &[])
            .await?;

        let columns = rows
            .iter()
            .map(ColumnDescriptor::from_table_info)
            .collect::<Result<Vec<_>>>()?;

        Ok(ColumnDescriptors::from_columns(columns))
    }

    pub(crate) async fn count_of(&self, table: &CheckedTable) -> Result<i64> {
        self.scalar_count(&format!("SELECT COUNT(*) AS count FROM {}", table.quoted()))
            .await
    }

    async fn scalar_count(&self, sql: &str) -> Result<i64> {
        let rows = self.dispatcher.query(sql, &[]).await?;
        rows.first()
            .and_then(|row| row.get("count"))
            .and_then(Value::as_i64)
            .ok_or_else(|| SiftError::internal(format!("No count returned by '{sql}'")))
    }
}
