//! Result export for db-sift.
//!
//! Writes result sets to CSV or JSON files:
//! - CSV: header row from the column order, one line per record, NULL as an empty field
//! - JSON: array of objects with fields in column order, NULL as `null`

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use tracing::{info, warn};

use crate::config::ExportConfig;
use crate::db::ResultSet;
use crate::error::{Result, SiftError};
use crate::query::Dispatcher;
use crate::schema::Introspector;

/// Output file format for exports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Comma-separated values
    Csv,
    /// JSON array of objects
    Json,
}

impl ExportFormat {
    /// File extension (and format tag) for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = SiftError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            _ => Err(SiftError::unsupported_format(s)),
        }
    }
}

/// Writes result sets to files.
#[derive(Debug, Clone)]
pub struct Exporter {
    directory: PathBuf,
}

impl Default for Exporter {
    fn default() -> Self {
        Self::new(".")
    }
}

impl Exporter {
    /// Creates an exporter that puts default-named files in `directory`.
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn from_config(config: &ExportConfig) -> Self {
        config
            .directory
            .as_ref()
            .map(|dir| Self::new(dir.clone()))
            .unwrap_or_default()
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Default output path: `<directory>/<stem>.<ext>`.
    pub fn default_path(&self, stem: &str, format: ExportFormat) -> PathBuf {
        self.directory
            .join(format!("{}.{}", stem, format.extension()))
    }

    /// Writes `rows` in `format` to `outfile`, or to `query.<ext>` when no path is given.
    ///
    /// The CSV header comes from the first record, so an empty result set
    /// produces an empty CSV file. Use [`Exporter::to_file_with_columns`] when
    /// the column names are known.
    pub fn to_file(
        &self,
        rows: &ResultSet,
        format: &str,
        outfile: Option<&Path>,
    ) -> Result<PathBuf> {
        let format: ExportFormat = format.parse()?;
        self.write(rows, None, format, outfile, "query")
    }

    /// Like [`Exporter::to_file`], with an explicit CSV header.
    pub fn to_file_with_columns(
        &self,
        rows: &ResultSet,
        columns: &[String],
        format: &str,
        outfile: Option<&Path>,
    ) -> Result<PathBuf> {
        let format: ExportFormat = format.parse()?;
        self.write(rows, Some(columns), format, outfile, "query")
    }

    /// Exports every row of `table` to `outfile`, or to `<table>.<ext>`.
    ///
    /// The header comes from the catalog, so empty tables still get one.
    /// Returns `Ok(None)` when the table does not exist.
    pub async fn export_table(
        &self,
        dispatcher: &Dispatcher,
        table: &str,
        format: &str,
        outfile: Option<&Path>,
    ) -> Result<Option<PathBuf>> {
        let format: ExportFormat = format.parse()?;
        let introspector = Introspector::new(dispatcher);

        let Some(checked) = introspector.check(table).await? else {
            return Ok(None);
        };

        let columns = introspector.descriptors_of(&checked).await?.names();
        let rows = dispatcher
            .query(&format!("SELECT * FROM {}", checked.quoted()), &[])
            .await?;

        self.write(&rows, Some(columns.as_slice()), format, outfile, checked.name())
            .map(Some)
    }

    pub(crate) fn write(
        &self,
        rows: &ResultSet,
        columns: Option<&[String]>,
        format: ExportFormat,
        outfile: Option<&Path>,
        stem: &str,
    ) -> Result<PathBuf> {
        let path = match outfile {
            Some(path) => path.to_path_buf(),
            None => self.default_path(stem, format),
        };

        let content = match format {
            ExportFormat::Csv => {
                let header = match columns {
                    Some(columns) => columns.to_vec(),
                    None => rows.columns(),
                };
                if header.is_empty() {
                    warn!(
                        "Exporting an empty result without column names; {} will be empty",
                        path.display()
                    );
                }
                render_csv(&header, rows)
            }
            ExportFormat::Json => render_json(rows)?,
        };

        ensure_parent_dirs(&path)?;
        fs::write(&path, content).map_err(|e| {
            SiftError::export(format!("Failed to write {}: {e}", path.display()))
        })?;

        info!("Exported {} row(s) to {}", rows.len(), path.display());
        Ok(path)
    }
}

/// Renders CSV text. With no header and no rows the output is empty.
pub fn render_csv(header: &[String], rows: &ResultSet) -> String {
    let mut output = String::new();

    if !header.is_empty() {
        let line: Vec<String> = header.iter().map(|c| escape_csv(c)).collect();
        output.push_str(&line.join(","));
        output.push('\n');
    }

    for record in rows {
        let values: Vec<String> = record
            .values()
            .map(|v| escape_csv(&v.to_field_string()))
            .collect();
        output.push_str(&values.join(","));
        output.push('\n');
    }

    output
}

/// Renders a pretty-printed JSON array of objects.
pub fn render_json(rows: &ResultSet) -> Result<String> {
    let mut json = serde_json::to_string_pretty(rows)
        .map_err(|e| SiftError::export(format!("Failed to serialize rows as JSON: {e}")))?;
    json.push('\n');
    Ok(json)
}

/// Escapes a value for CSV output.
fn escape_csv(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') || value.contains('\r') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Ensures parent directories exist for the output path.
fn ensure_parent_dirs(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| {
            SiftError::export(format!(
                "Failed to create export directory {}: {e}",
                parent.display()
            ))
        })?;
    }
    Ok(())
}
