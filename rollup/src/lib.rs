//! # Rollup - counter-party subtotal reports
//!
//! Rollup joins two tabular datasets on `counter_party`, derives a per-row
//! maximum rating and a status split of `value`, and produces one report that
//! stacks the detail rows over four subtotal levels.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  CSV files  │────▶│   Parser    │────▶│   Rollup    │────▶│   Writer    │
//! │  (A and B)  │     │  (auto-enc) │     │ (join+aggr) │     │ (CSV/JSON)  │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use rollup::{run_report, ReportOptions};
//! use std::path::Path;
//!
//! let summary = run_report(
//!     Path::new("ratings.csv"),
//!     Path::new("positions.csv"),
//!     Path::new("report.csv"),
//!     &ReportOptions::default(),
//! )?;
//! println!("{} rows", summary.total_rows);
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`models`] - Tables, records, output rows and the report
//! - [`parser`] - CSV parsing with auto-detection
//! - [`engine`] - Join, enrichment and the subtotal levels
//! - [`writer`] - Atomic CSV/JSON output
//! - [`pipeline`] - File-to-file orchestration
//! - [`logs`] - Progress logging

// Core modules
pub mod error;
pub mod models;

// Parsing
pub mod parser;

// Engine
pub mod engine;

// Output
pub mod writer;

// Orchestration
pub mod pipeline;
pub mod logs;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{CsvError, ErrorKind, ReportError, RollupError, WriteError};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{
    columns,
    Record,
    Report,
    RollupLevel,
    Section,
    Status,
    SummaryRow,
    Table,
    TOTAL,
};

// =============================================================================
// Re-exports - CSV Parsing
// =============================================================================

pub use parser::{
    parse_table,
    parse_csv_file_auto,
    parse_bytes_auto,
    detect_encoding,
    detect_delimiter,
    decode_content,
    ParseResult,
};

// =============================================================================
// Re-exports - Engine
// =============================================================================

pub use engine::{rollup, inner_join, RollupOptions, TierPolicy};

// =============================================================================
// Re-exports - Writer
// =============================================================================

pub use writer::{render_to_string, write_report, OutputFormat, WriteOptions};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use pipeline::{
    build_report,
    run_report,
    format_delimiter,
    InputInfo,
    ReportOptions,
    ReportSummary,
};
