//! Typed records and per-row helper values.

use std::num::ParseFloatError;

use crate::error::{RollupError, RollupResult};
use crate::models::{columns, Record, Status, Table};

use super::grouping::{broadcast_by, max_of, non_empty};

/// A joined record with its derived per-row values.
#[derive(Debug, Clone, PartialEq)]
pub struct Enriched {
    pub record: Record,
    /// Highest rating among all records of the same counter-party.
    pub max_rating_by_counterparty: Option<f64>,
    /// `value` for ARAP records, `0` otherwise.
    pub value_arap: Option<f64>,
    /// `value` for ACCR records, `0` otherwise.
    pub value_accr: Option<f64>,
}

/// Parse a numeric cell. Empty and `NaN` cells are missing numbers.
pub fn parse_number(cell: &str) -> Result<Option<f64>, ParseFloatError> {
    if cell.is_empty() {
        return Ok(None);
    }
    let v: f64 = cell.parse()?;
    Ok(if v.is_nan() { None } else { Some(v) })
}

fn number_at(table: &Table, row: usize, column: usize) -> RollupResult<Option<f64>> {
    let cell = table.cell(row, column);
    parse_number(cell).map_err(|_| RollupError::Type {
        table: table.name.clone(),
        column: table.headers[column].clone(),
        row: row + 1,
        value: cell.to_string(),
    })
}

/// Check that every numeric column the table carries holds only numbers.
///
/// Columns the table does not have are ignored; the joined table is checked
/// for presence separately.
pub fn check_numeric(table: &Table) -> RollupResult<()> {
    table.check_shape()?;
    for name in columns::NUMERIC {
        let Some(column) = table.column_index(name) else {
            continue;
        };
        for row in 0..table.len() {
            number_at(table, row, column)?;
        }
    }
    Ok(())
}

/// Check that the joined table provides every required column.
pub fn check_schema(joined: &Table) -> RollupResult<()> {
    for name in columns::REQUIRED {
        joined.require_column(name)?;
    }
    Ok(())
}

/// Read typed records out of the joined table.
pub fn records(joined: &Table) -> RollupResult<Vec<Record>> {
    joined.check_shape()?;
    let legal_entity = joined.require_column(columns::LEGAL_ENTITY)?;
    let counter_party = joined.require_column(columns::COUNTER_PARTY)?;
    let tier = joined.require_column(columns::TIER)?;
    let rating = joined.require_column(columns::RATING)?;
    let value = joined.require_column(columns::VALUE)?;
    let status = joined.require_column(columns::STATUS)?;

    (0..joined.len())
        .map(|row| {
            Ok(Record {
                legal_entity: joined.cell(row, legal_entity).to_string(),
                counter_party: joined.cell(row, counter_party).to_string(),
                tier: joined.cell(row, tier).to_string(),
                rating: number_at(joined, row, rating)?,
                value: number_at(joined, row, value)?,
                status: Status::from_code(joined.cell(row, status)),
            })
        })
        .collect()
}

/// The value a record contributes to the sum of `category`.
fn contribution(record: &Record, category: &Status) -> Option<f64> {
    if &record.status == category {
        record.value
    } else {
        Some(0.0)
    }
}

/// Attach the per-row helper values to every record.
pub fn enrich(records: Vec<Record>) -> Vec<Enriched> {
    let max_ratings = broadcast_by(
        &records,
        |r| non_empty(&r.counter_party),
        |group| max_of(group.iter().map(|r| r.rating)),
    );

    records
        .into_iter()
        .zip(max_ratings)
        .map(|(record, max_rating)| Enriched {
            max_rating_by_counterparty: max_rating.flatten(),
            value_arap: contribution(&record, &Status::Arap),
            value_accr: contribution(&record, &Status::Accr),
            record,
        })
        .collect()
}
