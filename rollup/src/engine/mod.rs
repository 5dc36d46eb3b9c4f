//! The rollup engine.
//!
//! ```text
//! Table A ─┐
//!          ├─▶ inner join ─▶ enrich ─┬─▶ detail rows ─────────────────┐
//! Table B ─┘   (counter_party)       ├─▶ by legal_entity ─────────────┤
//!                                    ├─▶ by legal_entity×counter_party┼─▶ Report
//!                                    ├─▶ by counter_party ────────────┤
//!                                    └─▶ by tier ─────────────────────┘
//! ```
//!
//! [`rollup`] is a pure function of its two input tables: no IO, no logging.

pub mod aggregate;
pub mod enrich;
pub mod grouping;
pub mod join;

use serde::{Deserialize, Serialize};

use crate::error::RollupResult;
use crate::models::{columns, Report, RollupLevel, Section, Table};

pub use aggregate::{
    counter_party_totals, detail_rows, legal_entity_counter_party_totals, legal_entity_totals,
    project, tier_totals, Aggregates,
};
pub use enrich::{check_numeric, check_schema, enrich, parse_number, records, Enriched};
pub use join::inner_join;

/// How the legal_entity × counter_party rollup picks its tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TierPolicy {
    /// First non-empty tier in join order.
    #[default]
    First,
    /// Fail when a pair carries more than one distinct tier.
    Strict,
}

/// Engine options.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RollupOptions {
    pub tier_policy: TierPolicy,
}

/// Join two tables and build the five-section report.
///
/// # Errors
/// - [`RollupError::RowWidth`](crate::error::RollupError::RowWidth) when a row of
///   either table does not have one cell per header
/// - [`RollupError::Schema`](crate::error::RollupError::Schema) when `counter_party`
///   is missing from either table, or the joined table lacks a required column
/// - [`RollupError::Type`](crate::error::RollupError::Type) when a `rating` or
///   `value` cell of either table is not a number
/// - [`RollupError::TierConflict`](crate::error::RollupError::TierConflict) under
///   [`TierPolicy::Strict`]
///
/// # Example
/// ```
/// use rollup::{rollup, RollupOptions, Table};
///
/// let ratings = Table::from_strs("ratings", &["counter_party", "rating", "tier"], &[&["X", "5", "T1"]]);
/// let positions = Table::from_strs(
///     "positions",
///     &["counter_party", "value", "status", "legal_entity"],
///     &[&["X", "100", "ARAP", "E1"]],
/// );
///
/// let report = rollup(&ratings, &positions, &RollupOptions::default()).unwrap();
/// assert_eq!(report.len(), 5);
/// ```
pub fn rollup(left: &Table, right: &Table, options: &RollupOptions) -> RollupResult<Report> {
    let joined = inner_join(left, right, columns::COUNTER_PARTY)?;
    check_schema(&joined)?;
    check_numeric(left)?;
    check_numeric(right)?;

    let enriched = enrich(records(&joined)?);

    let mut sections = Vec::with_capacity(RollupLevel::ALL.len());
    for level in RollupLevel::ALL {
        let rows = match level {
            RollupLevel::Detail => detail_rows(&enriched),
            RollupLevel::LegalEntity => legal_entity_totals(&enriched),
            RollupLevel::LegalEntityCounterParty => {
                legal_entity_counter_party_totals(&enriched, options.tier_policy)?
            }
            RollupLevel::CounterParty => counter_party_totals(&enriched),
            RollupLevel::Tier => tier_totals(&enriched),
        };
        sections.push(Section { level, rows });
    }

    Ok(Report { sections })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RollupError;
    use crate::models::{SummaryRow, TOTAL};

    fn ratings(rows: &[&[&str]]) -> Table {
        Table::from_strs("ratings", &["counter_party", "rating", "tier"], rows)
    }

    fn positions(rows: &[&[&str]]) -> Table {
        Table::from_strs(
            "positions",
            &["counter_party", "value", "status", "legal_entity"],
            rows,
        )
    }

    fn run(left: &Table, right: &Table) -> Report {
        rollup(left, right, &RollupOptions::default()).unwrap()
    }

    fn cells(report: &Report) -> Vec<Vec<String>> {
        report.rows().map(SummaryRow::to_cells).collect()
    }

    fn book() -> (Table, Table) {
        (
            ratings(&[
                &["X", "5", "T1"],
                &["Y", "3", "T2"],
                &["Y", "7", "T2"],
                &["Z", "1", "T3"],
            ]),
            positions(&[
                &["X", "100", "ARAP", "E1"],
                &["Y", "20", "ACCR", "E1"],
                &["Y", "30", "ARAP", "E2"],
                &["X", "5.5", "PAID", "E2"],
                &["W", "999", "ARAP", "E1"],
            ]),
        )
    }

    #[test]
    fn test_single_row_scenario() {
        let report = run(
            &ratings(&[&["X", "5", "T1"]]),
            &positions(&[&["X", "100", "ARAP", "E1"]]),
        );

        assert_eq!(
            cells(&report),
            vec![
                vec!["E1", "X", "T1", "5", "100", "0"],
                vec!["E1", "Total", "Total", "5", "100", "0"],
                vec!["E1", "X", "T1", "5", "100", "0"],
                vec!["Total", "X", "Total", "5", "100", "0"],
                vec!["Total", "Total", "T1", "5", "100", "0"],
            ]
        );
    }

    #[test]
    fn test_sections_in_assembly_order() {
        let (left, right) = book();
        let report = run(&left, &right);

        let levels: Vec<_> = report.sections.iter().map(|s| s.level).collect();
        assert_eq!(levels, RollupLevel::ALL.to_vec());

        let counts: Vec<_> = report.sections.iter().map(|s| s.rows.len()).collect();
        // 6 joined rows (Y is rated twice), 2 entities, 4 entity/counter-party
        // pairs, 2 counter-parties, 2 tiers
        assert_eq!(counts, vec![6, 2, 4, 2, 2]);
    }

    #[test]
    fn test_unmatched_counter_party_contributes_nothing() {
        let (left, right) = book();
        let report = run(&left, &right);

        assert!(report.rows().all(|r| r.counter_party != "W" && r.counter_party != "Z"));
        assert!(report.rows().all(|r| r.tier != "T3"));

        let e1 = &report.section(RollupLevel::LegalEntity).unwrap().rows[0];
        assert_eq!(e1.legal_entity, "E1");
        assert_eq!(e1.sum_value_arap, Some(100.0));
    }

    #[test]
    fn test_max_rating_shared_within_counter_party() {
        let (left, right) = book();
        let report = run(&left, &right);

        let detail = &report.section(RollupLevel::Detail).unwrap().rows;
        let y_ratings: Vec<_> = detail
            .iter()
            .filter(|r| r.counter_party == "Y")
            .map(|r| r.max_rating_by_counterparty)
            .collect();
        assert_eq!(y_ratings, vec![Some(7.0); 4]);
    }

    #[test]
    fn test_sentinels_match_level() {
        let (left, right) = book();
        let report = run(&left, &right);

        for (level, row) in report.leveled_rows() {
            let dims = [&row.legal_entity, &row.counter_party, &row.tier];
            for (dim, totalled) in dims.iter().zip(level.totalled()) {
                assert_eq!(dim.as_str() == TOTAL, totalled, "{:?} row {:?}", level, row);
            }
        }
    }

    #[test]
    fn test_entity_arap_totals_match_detail() {
        let (left, right) = book();
        let report = run(&left, &right);

        let from_totals: f64 = report
            .section(RollupLevel::LegalEntity)
            .unwrap()
            .rows
            .iter()
            .filter_map(|r| r.sum_value_arap)
            .sum();

        let joined = inner_join(&left, &right, columns::COUNTER_PARTY).unwrap();
        let from_detail: f64 = records(&joined)
            .unwrap()
            .iter()
            .filter(|r| r.status == crate::models::Status::Arap)
            .filter_map(|r| r.value)
            .sum();

        assert_eq!(from_totals, from_detail);
        assert_eq!(from_totals, 100.0 + 30.0 + 30.0);
    }

    #[test]
    fn test_deterministic() {
        let (left, right) = book();
        assert_eq!(run(&left, &right), run(&left, &right));
    }

    #[test]
    fn test_input_sides_are_interchangeable() {
        let (left, right) = book();
        let forward = run(&left, &right);
        let backward = run(&right, &left);

        // Join order differs, subtotals do not.
        for level in &RollupLevel::ALL[1..] {
            assert_eq!(forward.section(*level), backward.section(*level));
        }
    }

    #[test]
    fn test_no_matches_gives_empty_report() {
        let report = run(
            &ratings(&[&["X", "5", "T1"]]),
            &positions(&[&["Y", "100", "ARAP", "E1"]]),
        );

        assert!(report.is_empty());
        assert_eq!(report.sections.len(), 5);
    }

    #[test]
    fn test_missing_required_column() {
        let right = Table::from_strs(
            "positions",
            &["counter_party", "value", "legal_entity"],
            &[&["X", "100", "E1"]],
        );

        let err = rollup(&ratings(&[&["X", "5", "T1"]]), &right, &RollupOptions::default())
            .unwrap_err();
        assert!(matches!(err, RollupError::Schema { ref column, .. } if column == "status"));
    }

    #[test]
    fn test_non_numeric_rating() {
        let err = rollup(
            &ratings(&[&["X", "A+", "T1"]]),
            &positions(&[&["X", "100", "ARAP", "E1"]]),
            &RollupOptions::default(),
        )
        .unwrap_err();

        match err {
            RollupError::Type { table, column, row, value } => {
                assert_eq!(table, "ratings");
                assert_eq!(column, "rating");
                assert_eq!(row, 1);
                assert_eq!(value, "A+");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_non_numeric_value_in_unmatched_row_still_fails() {
        let err = rollup(
            &ratings(&[&["X", "5", "T1"]]),
            &positions(&[&["X", "100", "ARAP", "E1"], &["W", "n/a", "ARAP", "E1"]]),
            &RollupOptions::default(),
        )
        .unwrap_err();

        assert!(matches!(err, RollupError::Type { ref column, .. } if column == "value"));
    }

    #[test]
    fn test_ragged_table_is_an_error() {
        let left = Table {
            name: "ratings".into(),
            headers: vec!["counter_party".into(), "rating".into(), "tier".into()],
            rows: vec![vec!["X".into()]],
        };

        let err = rollup(
            &left,
            &positions(&[&["X", "100", "ARAP", "E1"]]),
            &RollupOptions::default(),
        )
        .unwrap_err();

        match err {
            RollupError::RowWidth { table, row, expected, found } => {
                assert_eq!(table, "ratings");
                assert_eq!((row, expected, found), (1, 3, 1));
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_strict_policy_surfaces_conflict() {
        let left = ratings(&[&["X", "5", "T1"], &["X", "6", "T2"]]);
        let right = positions(&[&["X", "100", "ARAP", "E1"]]);

        let lenient = rollup(&left, &right, &RollupOptions::default()).unwrap();
        let pair = &lenient.section(RollupLevel::LegalEntityCounterParty).unwrap().rows[0];
        assert_eq!(pair.tier, "T1");

        let strict = RollupOptions {
            tier_policy: TierPolicy::Strict,
        };
        assert!(matches!(
            rollup(&left, &right, &strict),
            Err(RollupError::TierConflict { .. })
        ));
    }
}
