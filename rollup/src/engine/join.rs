//! Inner join of two tables on a shared key column.

use std::collections::HashMap;

use crate::error::RollupResult;
use crate::models::Table;

/// Suffixes for non-key columns present on both sides.
const LEFT_SUFFIX: &str = "_x";
const RIGHT_SUFFIX: &str = "_y";

/// Inner join `left` and `right` on `key`.
///
/// Every pair of rows with equal, non-empty keys produces one output row, so
/// repeated keys give the full cross-product. Rows come out in left order,
/// then right order. The output has the left columns followed by the right
/// columns minus the key; names found on both sides get `_x` / `_y` suffixes.
pub fn inner_join(left: &Table, right: &Table, key: &str) -> RollupResult<Table> {
    left.check_shape()?;
    right.check_shape()?;
    let left_key = left.require_column(key)?;
    let right_key = right.require_column(key)?;

    let shared = |name: &str, other: &Table| name != key && other.column_index(name).is_some();

    let mut headers: Vec<String> = left
        .headers
        .iter()
        .map(|h| {
            if shared(h.as_str(), right) {
                format!("{}{}", h, LEFT_SUFFIX)
            } else {
                h.clone()
            }
        })
        .collect();
    headers.extend(
        right
            .headers
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != right_key)
            .map(|(_, h)| {
                if shared(h.as_str(), left) {
                    format!("{}{}", h, RIGHT_SUFFIX)
                } else {
                    h.clone()
                }
            }),
    );

    let mut index: HashMap<&str, Vec<&Vec<String>>> = HashMap::new();
    for row in &right.rows {
        let k = row[right_key].as_str();
        if !k.is_empty() {
            index.entry(k).or_default().push(row);
        }
    }

    let mut joined = Table::new(format!("join of {} and {}", left.name, right.name), headers);

    for left_row in &left.rows {
        let Some(matches) = index.get(left_row[left_key].as_str()) else {
            continue;
        };
        for right_row in matches {
            let mut row = left_row.clone();
            row.extend(
                right_row
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| *i != right_key)
                    .map(|(_, cell)| cell.clone()),
            );
            joined.push_row(row);
        }
    }

    Ok(joined)
}
