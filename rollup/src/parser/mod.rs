//! Delimited text reader with encoding and delimiter auto-detection.
//!
//! Produces a [`Table`] of trimmed string cells. No rollup-specific logic here.

use std::path::Path;

use crate::error::{CsvError, CsvResult};
use crate::models::Table;

/// Candidate delimiters, in tie-break order.
const DELIMITERS: [char; 4] = [',', ';', '\t', '|'];

/// Result of parsing with metadata
#[derive(Debug, Clone)]
pub struct ParseResult {
    /// Parsed table
    pub table: Table,
    /// Detected encoding
    pub encoding: String,
    /// Detected or used delimiter
    pub delimiter: char,
}

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let result = chardet::detect(bytes);
    let charset = result.0;

    // Normalize charset names
    match charset.to_lowercase().as_str() {
        "" | "ascii" | "utf-8" | "utf8" | "utf-8-sig" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        other => other.to_string(),
    }
}

/// Decode bytes to string using the specified encoding
pub fn decode_content(bytes: &[u8], encoding: &str) -> CsvResult<String> {
    let decoded = match encoding.to_lowercase().as_str() {
        "utf-8" | "utf8" | "ascii" => match std::str::from_utf8(bytes) {
            Ok(s) => s.to_string(),
            Err(_) => String::from_utf8_lossy(bytes).into_owned(),
        },
        label => match encoding_rs::Encoding::for_label(label.as_bytes()) {
            Some(enc) => {
                let (text, _, had_errors) = enc.decode(bytes);
                if had_errors {
                    return Err(CsvError::Encoding(enc.name().to_string()));
                }
                text.into_owned()
            }
            // Unknown label: fall back to lossy UTF-8
            None => String::from_utf8_lossy(bytes).into_owned(),
        },
    };

    Ok(decoded.trim_start_matches('\u{feff}').to_string())
}

/// Detect the delimiter by counting occurrences in the first line.
///
/// Falls back to `,` when no candidate occurs.
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let mut best_sep = DELIMITERS[0];
    let mut best_count = 0;

    for &sep in &DELIMITERS {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

fn delimiter_byte(delimiter: char) -> CsvResult<u8> {
    if delimiter.is_ascii() && delimiter != '"' && delimiter != '\n' && delimiter != '\r' {
        Ok(delimiter as u8)
    } else {
        Err(CsvError::InvalidDelimiter(delimiter))
    }
}

fn parse_error(err: csv::Error) -> CsvError {
    let line = err
        .position()
        .map(|p| p.line() as usize)
        .unwrap_or(0);
    CsvError::Parse {
        line,
        message: err.to_string(),
    }
}

/// Parse delimited text into a table.
///
/// Cells and headers are trimmed, blank lines are skipped, short rows are
/// padded with empty cells.
///
/// # Example
/// ```
/// use rollup::parser::parse_table;
///
/// let table = parse_table("ratings", "counter_party,rating\nX,5\nY,3", ',').unwrap();
///
/// assert_eq!(table.len(), 2);
/// assert_eq!(table.headers, vec!["counter_party", "rating"]);
/// assert_eq!(table.cell(1, 1), "3");
/// ```
pub fn parse_table(name: &str, content: &str, delimiter: char) -> CsvResult<Table> {
    if content.trim().is_empty() {
        return Err(CsvError::EmptyFile);
    }

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter_byte(delimiter)?)
        .trim(csv::Trim::All)
        .flexible(true)
        .has_headers(true)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(parse_error)?
        .iter()
        .map(|h| h.to_string())
        .collect();

    if headers.iter().all(|h| h.is_empty()) {
        return Err(CsvError::NoHeaders);
    }

    for (i, header) in headers.iter().enumerate() {
        if headers[..i].contains(header) {
            return Err(CsvError::DuplicateHeader(header.clone()));
        }
    }

    let mut table = Table::new(name, headers);

    for record in reader.records() {
        let record = record.map_err(parse_error)?;
        if record.iter().all(|cell| cell.is_empty()) {
            continue;
        }
        table.push_row(record.iter().map(|cell| cell.to_string()).collect());
    }

    Ok(table)
}

/// Parse bytes with auto-detection of encoding and (unless given) delimiter.
pub fn parse_bytes_auto(name: &str, bytes: &[u8], delimiter: Option<char>) -> CsvResult<ParseResult> {
    if bytes.is_empty() {
        return Err(CsvError::EmptyFile);
    }

    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding)?;
    let delimiter = delimiter.unwrap_or_else(|| detect_delimiter(&content));
    let table = parse_table(name, &content, delimiter)?;

    Ok(ParseResult {
        table,
        encoding,
        delimiter,
    })
}

/// Parse a file with auto-detection of encoding and (unless given) delimiter.
///
/// The table is named after the file path.
///
/// # Example
/// ```ignore
/// let result = parse_csv_file_auto("/path/to/ratings.csv", None)?;
/// println!("Encoding: {}, Delimiter: '{}'", result.encoding, result.delimiter);
/// println!("Rows: {}", result.table.len());
/// ```
pub fn parse_csv_file_auto<P: AsRef<Path>>(path: P, delimiter: Option<char>) -> CsvResult<ParseResult> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|source| CsvError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    parse_bytes_auto(&path.display().to_string(), &bytes, delimiter)
}
