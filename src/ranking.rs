/// Counting and ranking helpers.
///
/// Counts are kept in insertion order and ranked with a stable sort, so equal
/// counts keep the order in which their keys were first seen.
use indexmap::IndexMap;
use std::hash::Hash;

/// Count occurrences of each item, preserving first-seen key order.
pub fn count_first_seen<K, I>(items: I) -> IndexMap<K, usize>
where
    K: Hash + Eq,
    I: IntoIterator<Item = K>,
{
    let mut counts = IndexMap::new();
    for item in items {
        *counts.entry(item).or_insert(0) += 1;
    }
    counts
}

/// Rank counted keys by descending count. Ties keep first-seen order.
pub fn rank_counts<K>(counts: IndexMap<K, usize>) -> Vec<(K, usize)> {
    let mut ranked: Vec<_> = counts.into_iter().collect();
    // sort_by is stable
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked
}

/// The most frequent item, first seen wins on ties. `None` for no items.
pub fn mode<K, I>(items: I) -> Option<K>
where
    K: Hash + Eq,
    I: IntoIterator<Item = K>,
{
    rank_counts(count_first_seen(items))
        .into_iter()
        .next()
        .map(|(key, _)| key)
}

/// Stable descending sort of `(key, count)` rows.
pub fn rank_by_count<K>(rows: &mut [(K, usize)]) {
    rows.sort_by(|a, b| b.1.cmp(&a.1));
}

/// Stable descending sort of `(key, metric)` rows by a float metric.
pub fn rank_by_metric<K>(rows: &mut [(K, f64)]) {
    rows.sort_by(|a, b| b.1.total_cmp(&a.1));
}

/// Round to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
