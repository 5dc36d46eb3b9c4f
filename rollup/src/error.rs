//! Error types for the rollup report pipeline.
//!
//! Each layer has its own error enum:
//!
//! - [`CsvError`] - reading and decoding delimited input
//! - [`RollupError`] - schema, type and grouping failures inside the engine
//! - [`WriteError`] - serializing and persisting the report
//! - [`ReportError`] - top-level orchestration errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use std::path::PathBuf;
use thiserror::Error;

// =============================================================================
// CSV Parsing Errors
// =============================================================================

/// Errors while reading a delimited input file.
#[derive(Debug, Error)]
pub enum CsvError {
    /// Failed to read file.
    #[error("Cannot read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Content could not be decoded.
    #[error("Failed to decode content as {0}")]
    Encoding(String),

    /// Malformed delimited text.
    #[error("Invalid CSV at line {line}: {message}")]
    Parse { line: usize, message: String },

    /// Empty file.
    #[error("CSV file is empty")]
    EmptyFile,

    /// No headers found.
    #[error("No headers found in CSV")]
    NoHeaders,

    /// Delimiter must be a single ASCII character.
    #[error("Invalid delimiter {0:?}: must be a single ASCII character")]
    InvalidDelimiter(char),

    /// The same column name appears twice in the header.
    #[error("Duplicate column '{0}' in header")]
    DuplicateHeader(String),
}

// =============================================================================
// Rollup Errors
// =============================================================================

/// Errors raised by the rollup engine.
#[derive(Debug, Error)]
pub enum RollupError {
    /// A required column is absent.
    #[error("Missing column '{column}' in {table}")]
    Schema { table: String, column: String },

    /// A row does not have one cell per header.
    #[error("Row {row} of {table} has {found} cells, expected {expected}")]
    RowWidth {
        table: String,
        row: usize,
        expected: usize,
        found: usize,
    },

    /// A numeric column holds non-numeric data.
    #[error("Column '{column}' in {table}, row {row}: '{value}' is not a number")]
    Type {
        table: String,
        column: String,
        row: usize,
        value: String,
    },

    /// More than one tier for the same legal entity and counter-party.
    #[error("Conflicting tiers for legal entity '{legal_entity}' and counter-party '{counter_party}': {}", tiers.join(", "))]
    TierConflict {
        legal_entity: String,
        counter_party: String,
        tiers: Vec<String>,
    },
}

// =============================================================================
// Output Errors
// =============================================================================

/// Errors while writing the report.
#[derive(Debug, Error)]
pub enum WriteError {
    /// IO failure on the temporary or destination file.
    #[error("Cannot write output: {0}")]
    Io(#[from] std::io::Error),

    /// CSV serialization error.
    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error.
    #[error("JSON write error: {0}")]
    Json(#[from] serde_json::Error),

    /// Delimiter must be a single ASCII character.
    #[error("Invalid output delimiter {0:?}: must be a single ASCII character")]
    InvalidDelimiter(char),

    /// The finished file could not be moved into place.
    #[error("Cannot move output into '{}': {message}", path.display())]
    Persist { path: PathBuf, message: String },
}

// =============================================================================
// Report Errors (top-level)
// =============================================================================

/// Coarse classification of a [`ReportError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A required column is absent.
    Schema,
    /// A file could not be read or written.
    Io,
    /// Malformed data in a numeric column.
    Type,
    /// Inconsistent tiers under the strict tier policy.
    Conflict,
}

/// Top-level pipeline errors.
///
/// This is the error type returned by [`crate::pipeline::run_report`].
#[derive(Debug, Error)]
pub enum ReportError {
    /// Input parsing error.
    #[error("CSV error: {0}")]
    Csv(#[from] CsvError),

    /// Engine error.
    #[error("Rollup error: {0}")]
    Rollup(#[from] RollupError),

    /// Output error.
    #[error("Output error: {0}")]
    Write(#[from] WriteError),
}

impl ReportError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            // Undecodable or malformed files count as unreadable input.
            ReportError::Csv(_) => ErrorKind::Io,
            ReportError::Rollup(RollupError::Schema { .. })
            | ReportError::Rollup(RollupError::RowWidth { .. }) => ErrorKind::Schema,
            ReportError::Rollup(RollupError::Type { .. }) => ErrorKind::Type,
            ReportError::Rollup(RollupError::TierConflict { .. }) => ErrorKind::Conflict,
            ReportError::Write(_) => ErrorKind::Io,
        }
    }
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for CSV operations.
pub type CsvResult<T> = Result<T, CsvError>;

/// Result type for engine operations.
pub type RollupResult<T> = Result<T, RollupError>;

/// Result type for output operations.
pub type WriteResult<T> = Result<T, WriteError>;

/// Result type for pipeline operations.
pub type ReportResult<T> = Result<T, ReportError>;
