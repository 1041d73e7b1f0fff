//! Schema types and catalog introspection for db-sift.
//!
//! Represents table columns as SQLite's catalog reports them, and the
//! checked table names that are safe to splice into SQL text.

mod introspector;

pub use introspector::Introspector;

use serde::{Deserialize, Serialize};

use crate::db::{Record, Value};
use crate::error::{Result, SiftError};

/// A table name that was found in the catalog.
///
/// SQLite cannot bind identifiers as parameters, so statements that name a
/// table are built with string substitution. Only an [`Introspector`] can
/// create a `CheckedTable`, and every such statement takes one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckedTable {
    name: String,
}

impl CheckedTable {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The name as a double-quoted SQL identifier.
    pub(crate) fn quoted(&self) -> String {
        quote_identifier(&self.name)
    }
}

/// Quotes an identifier, doubling embedded double quotes.
pub(crate) fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Metadata for one column, as reported by `PRAGMA table_info`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    /// Zero-based position in the table.
    pub position: usize,

    /// Column name.
    pub name: String,

    /// Declared type (e.g., "INTEGER", "VARCHAR(20)"); empty when undeclared.
    pub data_type: String,

    /// Whether the column is declared NOT NULL.
    pub not_null: bool,

    /// Default value expression, if any.
    pub default: Option<String>,

    /// 0 when not part of the primary key, else the 1-based position in it.
    pub primary_key: u32,
}

impl ColumnDescriptor {
    /// Creates a new column descriptor with the given name and data type.
    pub fn new(position: usize, name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            position,
            name: name.into(),
            data_type: data_type.into(),
            not_null: false,
            default: None,
            primary_key: 0,
        }
    }

    /// Sets whether the column is NOT NULL.
    pub fn not_null(self, not_null: bool) -> Self {
        Self { not_null, ..self }
    }

    /// Sets the default value.
    pub fn with_default(self, default: impl Into<String>) -> Self {
        Self {
            default: Some(default.into()),
            ..self
        }
    }

    /// Sets the primary-key ordinal.
    pub fn primary_key(self, ordinal: u32) -> Self {
        Self {
            primary_key: ordinal,
            ..self
        }
    }

    pub fn is_primary_key(&self) -> bool {
        self.primary_key > 0
    }

    /// Builds a descriptor from one `PRAGMA table_info` row
    /// (`cid, name, type, notnull, dflt_value, pk`).
    pub(crate) fn from_table_info(record: &Record) -> Result<Self> {
        let int = |column: &str| {
            record.get(column).and_then(Value::as_i64).ok_or_else(|| {
                SiftError::internal(format!("table_info row is missing integer '{column}'"))
            })
        };
        let name = record
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| SiftError::internal("table_info row is missing 'name'"))?;

        Ok(Self {
            position: int("cid")? as usize,
            name: name.to_string(),
            data_type: record
                .get("type")
                .map(Value::to_field_string)
                .unwrap_or_default(),
            not_null: int("notnull")? != 0,
            default: record
                .get("dflt_value")
                .filter(|v| !v.is_null())
                .map(Value::to_display_string),
            primary_key: int("pk")? as u32,
        })
    }

    /// One display line: `  - name: TYPE (PK, NOT NULL, DEFAULT x)`.
    fn format_line(&self) -> String {
        let mut annotations = Vec::new();
        if self.is_primary_key() {
            annotations.push("PK".to_string());
        }
        if self.not_null {
            annotations.push("NOT NULL".to_string());
        }
        if let Some(default) = &self.default {
            annotations.push(format!("DEFAULT {default}"));
        }

        let data_type = if self.data_type.is_empty() {
            "(untyped)"
        } else {
            self.data_type.as_str()
        };

        if annotations.is_empty() {
            format!("  - {}: {}\n", self.name, data_type)
        } else {
            format!("  - {}: {} ({})\n", self.name, data_type, annotations.join(", "))
        }
    }
}

/// Column descriptors of one table, keyed by name, in declared order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnDescriptors {
    columns: Vec<ColumnDescriptor>,
}

impl ColumnDescriptors {
    pub fn from_columns(columns: Vec<ColumnDescriptor>) -> Self {
        Self { columns }
    }

    /// Looks up a column by name.
    pub fn get(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Column names in declared order.
    pub fn names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ColumnDescriptor> {
        self.columns.iter()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl<'a> IntoIterator for &'a ColumnDescriptors {
    type Item = &'a ColumnDescriptor;
    type IntoIter = std::slice::Iter<'a, ColumnDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.columns.iter()
    }
}

/// A table as seen at the moment it was introspected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableHandle {
    /// Table name, as stored in the catalog.
    pub name: String,

    /// Columns in declared order.
    pub columns: ColumnDescriptors,

    /// Row count when the handle was built.
    pub row_count: i64,
}

impl TableHandle {
    /// Formats the table for display in the CLI.
    pub fn format_for_display(&self) -> String {
        let column_lines: String = self.columns.iter().map(ColumnDescriptor::format_line).collect();
        format!(
            "Table: {}\n{}Rows: {}\n",
            self.name, column_lines, self.row_count
        )
    }
}
