//! High-level pipeline: two files in, one report file out.
//!
//! # Example
//!
//! ```rust,ignore
//! use rollup::pipeline::{run_report, ReportOptions};
//! use std::path::Path;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let summary = run_report(
//!         Path::new("ratings.csv"),
//!         Path::new("positions.csv"),
//!         Path::new("report.csv"),
//!         &ReportOptions::default(),
//!     )?;
//!
//!     println!("Wrote {} rows", summary.total_rows);
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ReportResult;
use crate::logs::{log_info, log_info_indent, log_success, log_success_indent, log_warning};
use crate::models::{Report, RollupLevel};
use crate::parser::{parse_csv_file_auto, ParseResult};
use crate::engine::{rollup, RollupOptions};
use crate::writer::{write_report, WriteOptions};

/// Options for the report pipeline
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportOptions {
    /// Input delimiter; auto-detected per file when `None`
    pub delimiter: Option<char>,

    /// Engine options
    pub rollup: RollupOptions,

    /// Output format and delimiter
    pub output: WriteOptions,
}

/// Input file information
#[derive(Debug, Clone, Serialize)]
pub struct InputInfo {
    pub path: PathBuf,
    pub encoding: String,
    pub delimiter: char,
    pub headers: Vec<String>,
    pub row_count: usize,
}

impl InputInfo {
    fn from_parse(path: &Path, parsed: &ParseResult) -> Self {
        Self {
            path: path.to_path_buf(),
            encoding: parsed.encoding.clone(),
            delimiter: parsed.delimiter,
            headers: parsed.table.headers.clone(),
            row_count: parsed.table.len(),
        }
    }
}

/// Result of a completed run
#[derive(Debug, Clone, Serialize)]
pub struct ReportSummary {
    pub inputs: Vec<InputInfo>,
    /// Rows per section, in assembly order
    pub sections: Vec<(RollupLevel, usize)>,
    pub total_rows: usize,
    pub output: PathBuf,
}

/// Parse both datasets and build the report without writing it.
pub fn build_report(
    dataset1: &Path,
    dataset2: &Path,
    options: &ReportOptions,
) -> ReportResult<(Report, Vec<InputInfo>)> {
    let first = read_dataset(dataset1, options.delimiter)?;
    let second = read_dataset(dataset2, options.delimiter)?;

    log_info("🔗 Joining on counter_party and rolling up...");
    let report = rollup(&first.table, &second.table, &options.rollup)?;
    if report.is_empty() {
        log_warning("No counter_party value appears in both datasets; the report has no rows");
    }

    for section in &report.sections {
        log_info_indent(
            format!("{:<28} {} rows", section.level.label(), section.rows.len()),
            1,
        );
    }

    let inputs = vec![
        InputInfo::from_parse(dataset1, &first),
        InputInfo::from_parse(dataset2, &second),
    ];
    Ok((report, inputs))
}

/// Run the whole pipeline: parse, roll up, write.
///
/// Nothing is written unless every step before it succeeded.
pub fn run_report(
    dataset1: &Path,
    dataset2: &Path,
    output: &Path,
    options: &ReportOptions,
) -> ReportResult<ReportSummary> {
    let (report, inputs) = build_report(dataset1, dataset2, options)?;

    log_info(format!("💾 Writing {}...", output.display()));
    write_report(&report, output, &options.output)?;
    log_success(format!("Wrote {} rows", report.len()));

    Ok(ReportSummary {
        inputs,
        sections: report
            .sections
            .iter()
            .map(|s| (s.level, s.rows.len()))
            .collect(),
        total_rows: report.len(),
        output: output.to_path_buf(),
    })
}

fn read_dataset(path: &Path, delimiter: Option<char>) -> ReportResult<ParseResult> {
    log_info(format!("📖 Reading {}...", path.display()));
    let parsed = parse_csv_file_auto(path, delimiter)?;

    log_success_indent(format!("Encoding: {}", parsed.encoding), 1);
    log_success_indent(
        format!(
            "Delimiter: '{}'{}",
            format_delimiter(parsed.delimiter),
            if delimiter.is_none() { " (auto-detected)" } else { "" }
        ),
        1,
    );
    log_success_indent(
        format!(
            "{} rows, columns: {}",
            parsed.table.len(),
            parsed.table.headers.join(", ")
        ),
        1,
    );

    Ok(parsed)
}

/// Format delimiter for display
pub fn format_delimiter(d: char) -> String {
    match d {
        '\t' => "\\t".to_string(),
        c => c.to_string(),
    }
}
