//! Report serialization.
//!
//! The report is rendered completely into a temporary file next to the
//! destination, then renamed over it. A failed run leaves no output behind.
//! The new file takes the permissions of the file it replaces, or `0644`.

use std::io::{self, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::error::{WriteError, WriteResult};
use crate::models::{Report, RollupLevel, SummaryRow};

/// Output file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Delimited text with the six-column header.
    #[default]
    Csv,
    /// JSON array of row objects, each tagged with its level.
    Json,
}

/// Options for writing a report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WriteOptions {
    pub format: OutputFormat,
    /// Field delimiter for [`OutputFormat::Csv`].
    pub delimiter: char,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            format: OutputFormat::Csv,
            delimiter: ',',
        }
    }
}

#[derive(Serialize)]
struct LeveledRow<'a> {
    level: RollupLevel,
    #[serde(flatten)]
    row: &'a SummaryRow,
}

/// Write the report as delimited text.
pub fn render_csv<W: Write>(report: &Report, delimiter: char, out: W) -> WriteResult<()> {
    if !delimiter.is_ascii() || delimiter == '"' || delimiter == '\n' || delimiter == '\r' {
        return Err(WriteError::InvalidDelimiter(delimiter));
    }

    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter as u8)
        .from_writer(out);

    let table = report.to_table();
    writer.write_record(&table.headers)?;
    for row in &table.rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Write the report as a pretty-printed JSON array.
pub fn render_json<W: Write>(report: &Report, mut out: W) -> WriteResult<()> {
    let rows: Vec<LeveledRow> = report
        .leveled_rows()
        .map(|(level, row)| LeveledRow { level, row })
        .collect();

    serde_json::to_writer_pretty(&mut out, &rows)?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}

/// Render a report to a string (handy for stdout and tests).
pub fn render_to_string(report: &Report, options: &WriteOptions) -> WriteResult<String> {
    let mut buf = Vec::new();
    match options.format {
        OutputFormat::Csv => render_csv(report, options.delimiter, &mut buf)?,
        OutputFormat::Json => render_json(report, &mut buf)?,
    }
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Write a report to `path`, replacing any existing file atomically.
pub fn write_report(report: &Report, path: &Path, options: &WriteOptions) -> WriteResult<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir)?;
    match options.format {
        OutputFormat::Csv => render_csv(report, options.delimiter, tmp.as_file_mut())?,
        OutputFormat::Json => render_json(report, tmp.as_file_mut())?,
    }

    match_permissions(&tmp, path)?;
    tmp.persist(path).map_err(|e| WriteError::Persist {
        path: path.to_path_buf(),
        message: e.error.to_string(),
    })?;

    Ok(())
}

/// Copy the destination's permissions onto the temporary file; `0644` for a new file.
#[cfg(unix)]
fn match_permissions(tmp: &NamedTempFile, path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let permissions = match std::fs::metadata(path) {
        Ok(meta) => meta.permissions(),
        Err(e) if e.kind() == io::ErrorKind::NotFound => std::fs::Permissions::from_mode(0o644),
        Err(e) => return Err(e),
    };
    tmp.as_file().set_permissions(permissions)
}

#[cfg(not(unix))]
fn match_permissions(_tmp: &NamedTempFile, _path: &Path) -> io::Result<()> {
    Ok(())
}
