//! The detail row set and the four subtotal rollups.
//!
//! | Level                     | Group key                     | Rating aggregate                  |
//! |---------------------------|-------------------------------|-----------------------------------|
//! | detail                    | none                          | per-row max by counter-party      |
//! | legal_entity              | legal_entity                  | max(rating)                       |
//! | legal_entity_counter_party| (legal_entity, counter_party) | max(max_rating_by_counterparty)   |
//! | counter_party             | counter_party                 | max(max_rating_by_counterparty)   |
//! | tier                      | tier                          | max(max_rating_by_counterparty)   |
//!
//! Every row goes through [`project`], which writes the `Total` sentinel into
//! the dimensions its level aggregates over.

use crate::error::{RollupError, RollupResult};
use crate::models::{RollupLevel, SummaryRow, TOTAL};

use super::enrich::Enriched;
use super::grouping::{max_of, non_empty, reduce_by, sum_of, try_reduce_by};
use super::TierPolicy;

/// Numeric columns of an output row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aggregates {
    pub max_rating: Option<f64>,
    pub sum_arap: Option<f64>,
    pub sum_accr: Option<f64>,
}

impl Aggregates {
    /// Sums of the status split over `group`, with the given rating aggregate.
    fn over(group: &[&Enriched], max_rating: Option<f64>) -> Self {
        Self {
            max_rating,
            sum_arap: Some(sum_of(group.iter().map(|e| e.value_arap))),
            sum_accr: Some(sum_of(group.iter().map(|e| e.value_accr))),
        }
    }
}

fn max_rating_by_counterparty(group: &[&Enriched]) -> Option<f64> {
    max_of(group.iter().map(|e| e.max_rating_by_counterparty))
}

/// Project dimensions and aggregates onto the output schema.
///
/// `dims` is (legal_entity, counter_party, tier); dimensions aggregated at
/// `level` are replaced by `Total` whatever was passed.
pub fn project(level: RollupLevel, dims: [&str; 3], aggregates: Aggregates) -> SummaryRow {
    let totalled = level.totalled();
    let dim = |i: usize| {
        if totalled[i] {
            TOTAL.to_string()
        } else {
            dims[i].to_string()
        }
    };

    SummaryRow {
        legal_entity: dim(0),
        counter_party: dim(1),
        tier: dim(2),
        max_rating_by_counterparty: aggregates.max_rating,
        sum_value_arap: aggregates.sum_arap,
        sum_value_accr: aggregates.sum_accr,
    }
}

/// One row per joined record, in join order.
pub fn detail_rows(rows: &[Enriched]) -> Vec<SummaryRow> {
    rows.iter()
        .map(|e| {
            project(
                RollupLevel::Detail,
                [
                    e.record.legal_entity.as_str(),
                    e.record.counter_party.as_str(),
                    e.record.tier.as_str(),
                ],
                Aggregates {
                    max_rating: e.max_rating_by_counterparty,
                    sum_arap: e.value_arap,
                    sum_accr: e.value_accr,
                },
            )
        })
        .collect()
}

/// One row per legal entity.
pub fn legal_entity_totals(rows: &[Enriched]) -> Vec<SummaryRow> {
    reduce_by(
        rows,
        |e| non_empty(&e.record.legal_entity),
        |legal_entity, group| {
            let max_rating = max_of(group.iter().map(|e| e.record.rating));
            project(
                RollupLevel::LegalEntity,
                [*legal_entity, TOTAL, TOTAL],
                Aggregates::over(group, max_rating),
            )
        },
    )
}

/// One row per (legal entity, counter-party) pair, carrying the pair's tier.
pub fn legal_entity_counter_party_totals(
    rows: &[Enriched],
    policy: TierPolicy,
) -> RollupResult<Vec<SummaryRow>> {
    try_reduce_by(
        rows,
        |e| Some((non_empty(&e.record.legal_entity)?, non_empty(&e.record.counter_party)?)),
        |&(legal_entity, counter_party), group| {
            let tier = pair_tier(legal_entity, counter_party, group, policy)?;
            Ok(project(
                RollupLevel::LegalEntityCounterParty,
                [legal_entity, counter_party, tier],
                Aggregates::over(group, max_rating_by_counterparty(group)),
            ))
        },
    )
}

/// Tier reported for a (legal entity, counter-party) group.
///
/// The first non-empty tier in join order; under [`TierPolicy::Strict`] every
/// non-empty tier of the group must agree.
fn pair_tier<'a>(
    legal_entity: &str,
    counter_party: &str,
    group: &[&'a Enriched],
    policy: TierPolicy,
) -> RollupResult<&'a str> {
    let mut tiers: Vec<&'a str> = Vec::new();
    for &e in group {
        let tier: &'a str = e.record.tier.as_str();
        if !tier.is_empty() && !tiers.contains(&tier) {
            tiers.push(tier);
        }
    }

    if policy == TierPolicy::Strict && tiers.len() > 1 {
        return Err(RollupError::TierConflict {
            legal_entity: legal_entity.to_string(),
            counter_party: counter_party.to_string(),
            tiers: tiers.iter().map(|t| t.to_string()).collect(),
        });
    }

    Ok(tiers.first().copied().unwrap_or(""))
}

/// One row per counter-party.
pub fn counter_party_totals(rows: &[Enriched]) -> Vec<SummaryRow> {
    reduce_by(
        rows,
        |e| non_empty(&e.record.counter_party),
        |counter_party, group| {
            project(
                RollupLevel::CounterParty,
                [TOTAL, *counter_party, TOTAL],
                Aggregates::over(group, max_rating_by_counterparty(group)),
            )
        },
    )
}

/// One row per tier.
pub fn tier_totals(rows: &[Enriched]) -> Vec<SummaryRow> {
    reduce_by(
        rows,
        |e| non_empty(&e.record.tier),
        |tier, group| {
            project(
                RollupLevel::Tier,
                [TOTAL, TOTAL, *tier],
                Aggregates::over(group, max_rating_by_counterparty(group)),
            )
        },
    )
}
