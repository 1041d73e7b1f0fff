//! Random access into one table's rows by offset.
//!
//! Each access is one `LIMIT 1 OFFSET n` round trip in the table's natural
//! row order, so the table is never loaded as a whole.

use crate::db::{Record, Value};
use crate::error::{Result, SiftError};
use crate::schema::{CheckedTable, Introspector};

use super::Dispatcher;

/// Message carried by the aggregate out-of-range error.
pub const OUT_OF_RANGE_MESSAGE: &str = "table index out of range";

/// An indexable, restartable view over the rows of one table.
#[derive(Debug, Clone)]
pub struct TableIterator<'a> {
    dispatcher: &'a Dispatcher,
    table: CheckedTable,
}

impl<'a> TableIterator<'a> {
    /// Binds to `table`, or returns `None` if it does not exist.
    pub async fn open(dispatcher: &'a Dispatcher, table: &str) -> Result<Option<Self>> {
        let checked = Introspector::new(dispatcher).check(table).await?;
        Ok(checked.map(|table| Self { dispatcher, table }))
    }

    pub fn table(&self) -> &str {
        self.table.name()
    }

    /// Row at `offset`, or `None` past the last row.
    pub async fn at(&self, offset: u64) -> Result<Option<Record>> {
        let Ok(offset) = i64::try_from(offset) else {
            return Ok(None);
        };

        let sql = format!("SELECT * FROM {} LIMIT 1 OFFSET ?", self.table.quoted());
        let rows = self.dispatcher.query(&sql, &[Value::Integer(offset)]).await?;
        Ok(rows.into_records().into_iter().next())
    }

    /// The first `n` rows, in order.
    ///
    /// Fails with [`SiftError::OutOfRange`] if the table has fewer than `n`
    /// rows; no partial result is returned.
    pub async fn take(&self, n: usize) -> Result<Vec<Record>> {
        // `n` is caller-chosen and may far exceed the table
        let mut records = Vec::new();
        for offset in 0..n as u64 {
            match self.at(offset).await? {
                Some(record) => records.push(record),
                None => return Err(SiftError::out_of_range(OUT_OF_RANGE_MESSAGE)),
            }
        }
        Ok(records)
    }

    /// The first row; out of range on an empty table.
    pub async fn head(&self) -> Result<Record> {
        self.take(1)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| SiftError::out_of_range(OUT_OF_RANGE_MESSAGE))
    }

    /// Current number of rows.
    pub async fn len(&self) -> Result<i64> {
        Introspector::new(self.dispatcher).count_of(&self.table).await
    }

    pub async fn is_empty(&self) -> Result<bool> {
        Ok(self.len().await? == 0)
    }

    /// Column names in declared order.
    pub async fn columns(&self) -> Result<Vec<String>> {
        Ok(Introspector::new(self.dispatcher)
            .descriptors_of(&self.table)
            .await?
            .names())
    }
}
