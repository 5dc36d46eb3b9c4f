//! Domain models for the rollup report.
//!
//! - [`Table`] - named grid of string cells, the engine's input and output shape
//! - [`Record`] - one typed row of the joined table
//! - [`Status`] - the ARAP / ACCR status categories
//! - [`SummaryRow`] - one row of the six-column output schema
//! - [`RollupLevel`], [`Section`], [`Report`] - the assembled report

use serde::{Deserialize, Serialize};

use crate::error::{RollupError, RollupResult};

/// Marks a dimension that has been aggregated over.
pub const TOTAL: &str = "Total";

/// Column names used by the engine.
pub mod columns {
    pub const LEGAL_ENTITY: &str = "legal_entity";
    pub const COUNTER_PARTY: &str = "counter_party";
    pub const TIER: &str = "tier";
    pub const RATING: &str = "rating";
    pub const VALUE: &str = "value";
    pub const STATUS: &str = "status";

    pub const MAX_RATING_BY_COUNTERPARTY: &str = "max_rating_by_counterparty";
    pub const SUM_VALUE_ARAP: &str = "sum_value_ARAP";
    pub const SUM_VALUE_ACCR: &str = "sum_value_ACCR";

    /// Columns the joined table must provide.
    pub const REQUIRED: [&str; 6] = [LEGAL_ENTITY, COUNTER_PARTY, TIER, RATING, VALUE, STATUS];

    /// Numeric input columns.
    pub const NUMERIC: [&str; 2] = [RATING, VALUE];

    /// Output schema, in order.
    pub const OUTPUT: [&str; 6] = [
        LEGAL_ENTITY,
        COUNTER_PARTY,
        TIER,
        MAX_RATING_BY_COUNTERPARTY,
        SUM_VALUE_ARAP,
        SUM_VALUE_ACCR,
    ];
}

// =============================================================================
// Table
// =============================================================================

/// A named, header-addressed table of string cells.
///
/// Every row has exactly `headers.len()` cells.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
    /// Label used in error messages (dataset name or file path).
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(name: impl Into<String>, headers: Vec<String>) -> Self {
        Self {
            name: name.into(),
            headers,
            rows: Vec::new(),
        }
    }

    /// Build a table from string slices.
    ///
    /// ```
    /// use rollup::Table;
    ///
    /// let table = Table::from_strs("ratings", &["counter_party", "rating"], &[&["X", "5"]]);
    /// assert_eq!(table.cell(0, 1), "5");
    /// ```
    pub fn from_strs(name: &str, headers: &[&str], rows: &[&[&str]]) -> Self {
        let mut table = Self::new(name, headers.iter().map(|h| h.to_string()).collect());
        for row in rows {
            table.push_row(row.iter().map(|c| c.to_string()).collect());
        }
        table
    }

    /// Append a row, padding short rows with empty cells and dropping extra cells.
    pub fn push_row(&mut self, mut row: Vec<String>) {
        row.resize(self.headers.len(), String::new());
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == column)
    }

    /// Index of `column`, or a schema error naming the table.
    pub fn require_column(&self, column: &str) -> RollupResult<usize> {
        self.column_index(column).ok_or_else(|| RollupError::Schema {
            table: self.name.clone(),
            column: column.to_string(),
        })
    }

    /// Check that every row has exactly one cell per header.
    pub fn check_shape(&self) -> RollupResult<()> {
        let expected = self.headers.len();
        match self.rows.iter().position(|row| row.len() != expected) {
            Some(i) => Err(RollupError::RowWidth {
                table: self.name.clone(),
                row: i + 1,
                expected,
                found: self.rows[i].len(),
            }),
            None => Ok(()),
        }
    }

    pub fn cell(&self, row: usize, column: usize) -> &str {
        &self.rows[row][column]
    }
}

// =============================================================================
// Records
// =============================================================================

/// Status category of a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    /// Accounts receivable / payable.
    Arap,
    /// Accruals.
    Accr,
    /// Any other status; excluded from both sums.
    Other(String),
}

impl Status {
    pub const ARAP: &'static str = "ARAP";
    pub const ACCR: &'static str = "ACCR";

    /// Exact, case-sensitive match on the status code.
    pub fn from_code(code: &str) -> Self {
        match code {
            Self::ARAP => Status::Arap,
            Self::ACCR => Status::Accr,
            other => Status::Other(other.to_string()),
        }
    }
}

/// One typed row of the joined table.
///
/// Empty dimension cells are kept as empty strings; empty numeric cells are `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub legal_entity: String,
    pub counter_party: String,
    pub tier: String,
    pub rating: Option<f64>,
    pub value: Option<f64>,
    pub status: Status,
}

// =============================================================================
// Output
// =============================================================================

/// One row of the output schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub legal_entity: String,
    pub counter_party: String,
    pub tier: String,
    pub max_rating_by_counterparty: Option<f64>,
    #[serde(rename = "sum_value_ARAP")]
    pub sum_value_arap: Option<f64>,
    #[serde(rename = "sum_value_ACCR")]
    pub sum_value_accr: Option<f64>,
}

impl SummaryRow {
    /// Cells in output column order.
    pub fn to_cells(&self) -> Vec<String> {
        vec![
            self.legal_entity.clone(),
            self.counter_party.clone(),
            self.tier.clone(),
            format_number(self.max_rating_by_counterparty),
            format_number(self.sum_value_arap),
            format_number(self.sum_value_accr),
        ]
    }
}

/// Render a number the way it is written to the report.
///
/// Missing numbers become empty cells; whole numbers lose their fraction.
pub fn format_number(value: Option<f64>) -> String {
    match value {
        None => String::new(),
        Some(v) if v.is_nan() => String::new(),
        // Avoid "-0"
        Some(v) if v == 0.0 => "0".to_string(),
        Some(v) => v.to_string(),
    }
}

/// Grouping level of a report section, in assembly order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RollupLevel {
    Detail,
    LegalEntity,
    LegalEntityCounterParty,
    CounterParty,
    Tier,
}

impl RollupLevel {
    pub const ALL: [RollupLevel; 5] = [
        RollupLevel::Detail,
        RollupLevel::LegalEntity,
        RollupLevel::LegalEntityCounterParty,
        RollupLevel::CounterParty,
        RollupLevel::Tier,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            RollupLevel::Detail => "detail",
            RollupLevel::LegalEntity => "legal_entity",
            RollupLevel::LegalEntityCounterParty => "legal_entity_counter_party",
            RollupLevel::CounterParty => "counter_party",
            RollupLevel::Tier => "tier",
        }
    }

    /// Which of (legal_entity, counter_party, tier) carry the `Total` sentinel.
    pub fn totalled(&self) -> [bool; 3] {
        match self {
            RollupLevel::Detail | RollupLevel::LegalEntityCounterParty => [false, false, false],
            RollupLevel::LegalEntity => [false, true, true],
            RollupLevel::CounterParty => [true, false, true],
            RollupLevel::Tier => [true, true, false],
        }
    }
}

/// The rows of one rollup.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section {
    pub level: RollupLevel,
    pub rows: Vec<SummaryRow>,
}

/// The assembled report: one section per [`RollupLevel`], in assembly order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub sections: Vec<Section>,
}

impl Report {
    /// All rows, concatenated in section order.
    pub fn rows(&self) -> impl Iterator<Item = &SummaryRow> {
        self.sections.iter().flat_map(|s| s.rows.iter())
    }

    /// All rows tagged with their level.
    pub fn leveled_rows(&self) -> impl Iterator<Item = (RollupLevel, &SummaryRow)> {
        self.sections
            .iter()
            .flat_map(|s| s.rows.iter().map(move |r| (s.level, r)))
    }

    pub fn section(&self, level: RollupLevel) -> Option<&Section> {
        self.sections.iter().find(|s| s.level == level)
    }

    pub fn len(&self) -> usize {
        self.sections.iter().map(|s| s.rows.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The concatenated rows as a six-column string table named `report`.
    pub fn to_table(&self) -> Table {
        let headers = columns::OUTPUT.iter().map(|c| c.to_string()).collect();
        let mut table = Table::new("report", headers);
        for row in self.rows() {
            table.push_row(row.to_cells());
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_row_pads_and_truncates() {
        let mut table = Table::from_strs("t", &["a", "b"], &[]);
        table.push_row(vec!["1".into()]);
        table.push_row(vec!["1".into(), "2".into(), "3".into()]);

        assert_eq!(table.rows[0], vec!["1", ""]);
        assert_eq!(table.rows[1], vec!["1", "2"]);
    }

    #[test]
    fn test_check_shape_reports_ragged_row() {
        let mut table = Table::from_strs("t", &["a", "b"], &[&["1", "2"]]);
        assert!(table.check_shape().is_ok());

        table.rows.push(vec!["3".into()]);
        match table.check_shape().unwrap_err() {
            RollupError::RowWidth { row, expected, found, .. } => {
                assert_eq!((row, expected, found), (2, 2, 1));
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_require_column_names_table() {
        let table = Table::from_strs("ratings.csv", &["counter_party"], &[]);
        let err = table.require_column("rating").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("rating"));
        assert!(msg.contains("ratings.csv"));
    }

    #[test]
    fn test_status_is_case_sensitive() {
        assert_eq!(Status::from_code("ARAP"), Status::Arap);
        assert_eq!(Status::from_code("ACCR"), Status::Accr);
        assert_eq!(Status::from_code("arap"), Status::Other("arap".into()));
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(Some(100.0)), "100");
        assert_eq!(format_number(Some(100.5)), "100.5");
        assert_eq!(format_number(Some(-0.0)), "0");
        assert_eq!(format_number(Some(0.1 + 0.2)), "0.30000000000000004");
        assert_eq!(format_number(None), "");
    }

    #[test]
    fn test_summary_row_json_keys() {
        let row = SummaryRow {
            legal_entity: "E1".into(),
            counter_party: TOTAL.into(),
            tier: TOTAL.into(),
            max_rating_by_counterparty: Some(5.0),
            sum_value_arap: Some(100.0),
            sum_value_accr: Some(0.0),
        };
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["sum_value_ARAP"], 100.0);
        assert_eq!(json["sum_value_ACCR"], 0.0);
        assert_eq!(json["counter_party"], "Total");
    }

    #[test]
    fn test_report_to_table() {
        let row = |le: &str, cp: &str, tier: &str, arap: f64| SummaryRow {
            legal_entity: le.into(),
            counter_party: cp.into(),
            tier: tier.into(),
            max_rating_by_counterparty: Some(5.0),
            sum_value_arap: Some(arap),
            sum_value_accr: None,
        };
        let report = Report {
            sections: vec![
                Section {
                    level: RollupLevel::Detail,
                    rows: vec![row("E1", "X", "T1", 100.0)],
                },
                Section {
                    level: RollupLevel::Tier,
                    rows: vec![row(TOTAL, TOTAL, "T1", 100.5)],
                },
            ],
        };

        let table = report.to_table();
        assert_eq!(table.headers, columns::OUTPUT.to_vec());
        assert_eq!(
            table.rows,
            vec![
                vec!["E1", "X", "T1", "5", "100", ""],
                vec!["Total", "Total", "T1", "5", "100.5", ""],
            ]
        );
        assert!(table.check_shape().is_ok());
    }

    #[test]
    fn test_levels_in_assembly_order() {
        let labels: Vec<_> = RollupLevel::ALL.iter().map(|l| l.label()).collect();
        assert_eq!(
            labels,
            vec![
                "detail",
                "legal_entity",
                "legal_entity_counter_party",
                "counter_party",
                "tier"
            ]
        );
    }
}
