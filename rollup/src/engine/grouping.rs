//! Generic grouping primitives.
//!
//! Two shapes of aggregation are used by the engine:
//!
//! ```text
//! reduce    (one value per group)        broadcast (group value on every row)
//! ┌─────────┐                           ┌─────────┐
//! │ X  5    │                           │ X  5  7 │
//! │ X  7    │  →  X: 7                  │ X  7  7 │
//! │ Y  3    │     Y: 3                  │ Y  3  3 │
//! └─────────┘                           └─────────┘
//! ```
//!
//! Both take a key extractor returning `Option<K>`: items without a key are
//! left out of every group. Groups come back in ascending key order, and items
//! keep their input order inside a group.

use std::collections::BTreeMap;

/// Group items by key.
pub fn group_by<'a, T, K, F>(items: &'a [T], key: F) -> BTreeMap<K, Vec<&'a T>>
where
    K: Ord,
    F: Fn(&'a T) -> Option<K>,
{
    let mut groups: BTreeMap<K, Vec<&'a T>> = BTreeMap::new();
    for item in items {
        if let Some(k) = key(item) {
            groups.entry(k).or_default().push(item);
        }
    }
    groups
}

/// Reduce every group to one value, in ascending key order.
pub fn reduce_by<'a, T, K, R, F, G>(items: &'a [T], key: F, mut reduce: G) -> Vec<R>
where
    K: Ord,
    F: Fn(&'a T) -> Option<K>,
    G: FnMut(&K, &[&'a T]) -> R,
{
    group_by(items, key)
        .iter()
        .map(|(k, group)| reduce(k, group))
        .collect()
}

/// Fallible [`reduce_by`]: stops at the first group that fails.
pub fn try_reduce_by<'a, T, K, R, E, F, G>(items: &'a [T], key: F, mut reduce: G) -> Result<Vec<R>, E>
where
    K: Ord,
    F: Fn(&'a T) -> Option<K>,
    G: FnMut(&K, &[&'a T]) -> Result<R, E>,
{
    group_by(items, key)
        .iter()
        .map(|(k, group)| reduce(k, group))
        .collect()
}

/// Reduce every group, then hand each item the value of its group.
///
/// The result is parallel to `items`; items without a key get `None`.
pub fn broadcast_by<'a, T, K, V, F, G>(items: &'a [T], key: F, mut reduce: G) -> Vec<Option<V>>
where
    K: Ord,
    V: Clone,
    F: Fn(&'a T) -> Option<K>,
    G: FnMut(&[&'a T]) -> V,
{
    let values: BTreeMap<K, V> = group_by(items, &key)
        .into_iter()
        .map(|(k, group)| {
            let v = reduce(&group);
            (k, v)
        })
        .collect();

    items
        .iter()
        .map(|item| key(item).and_then(|k| values.get(&k).cloned()))
        .collect()
}

/// Maximum of the present values; `None` when there are none.
pub fn max_of<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    values
        .into_iter()
        .flatten()
        .fold(None, |acc, v| match acc {
            Some(m) if m >= v => Some(m),
            _ => Some(v),
        })
}

/// Sum of the present values; `0` when there are none.
pub fn sum_of<I>(values: I) -> f64
where
    I: IntoIterator<Item = Option<f64>>,
{
    values.into_iter().flatten().sum()
}

/// Key helper: empty cells carry no key.
pub fn non_empty(cell: &str) -> Option<&str> {
    if cell.is_empty() {
        None
    } else {
        Some(cell)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs() -> Vec<(&'static str, i32)> {
        vec![("b", 1), ("a", 2), ("b", 3), ("", 4), ("a", 5)]
    }

    #[test]
    fn test_group_by_sorted_keys_and_stable_members() {
        let items = pairs();
        let groups = group_by(&items, |(k, _)| non_empty(k));

        let keys: Vec<_> = groups.keys().copied().collect();
        assert_eq!(keys, vec!["a", "b"]);

        let b: Vec<i32> = groups["b"].iter().map(|(_, v)| *v).collect();
        assert_eq!(b, vec![1, 3]);
    }

    #[test]
    fn test_reduce_by_skips_keyless_items() {
        let items = pairs();
        let sums = reduce_by(
            &items,
            |(k, _)| non_empty(k),
            |k, group| (k.to_string(), group.iter().map(|(_, v)| v).sum::<i32>()),
        );

        assert_eq!(sums, vec![("a".to_string(), 7), ("b".to_string(), 4)]);
    }

    #[test]
    fn test_try_reduce_by_stops_on_error() {
        let items = pairs();
        let result: Result<Vec<i32>, String> = try_reduce_by(
            &items,
            |(k, _)| non_empty(k),
            |k, group| {
                if *k == "b" {
                    Err(format!("group {} has {} items", k, group.len()))
                } else {
                    Ok(group.len() as i32)
                }
            },
        );

        assert_eq!(result.unwrap_err(), "group b has 2 items");
    }

    #[test]
    fn test_broadcast_by_is_parallel_to_input() {
        let items = pairs();
        let max = broadcast_by(
            &items,
            |(k, _)| non_empty(k),
            |group| group.iter().map(|(_, v)| *v).max().unwrap_or_default(),
        );

        assert_eq!(max, vec![Some(3), Some(5), Some(3), None, Some(5)]);
    }

    #[test]
    fn test_max_of_skips_missing() {
        assert_eq!(max_of(vec![Some(1.0), None, Some(4.5), Some(2.0)]), Some(4.5));
        assert_eq!(max_of(vec![None, None]), None);
        assert_eq!(max_of(Vec::<Option<f64>>::new()), None);
    }

    #[test]
    fn test_sum_of_skips_missing() {
        assert_eq!(sum_of(vec![Some(1.5), None, Some(2.5)]), 4.0);
        assert_eq!(sum_of(vec![None]), 0.0);
    }
}
