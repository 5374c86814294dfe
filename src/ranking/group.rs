//! Partitioned selection: per-group nearest, farthest and top-K.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use super::{farthest_first, nearest_first};
use crate::geometry::{distance_meters, GeoPoint};
use crate::models::Ranked;

/// Which end of the distance ordering to select from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankOrder {
    Nearest,
    Farthest,
}

/// Partition items into groups keyed by `key`, keeping input order inside a group.
pub fn partition_by<K, T, F>(items: impl IntoIterator<Item = T>, mut key: F) -> BTreeMap<K, Vec<T>>
where
    K: Ord,
    F: FnMut(&T) -> K,
{
    let mut groups: BTreeMap<K, Vec<T>> = BTreeMap::new();
    for item in items {
        groups.entry(key(&item)).or_default().push(item);
    }
    groups
}

/// Select up to `k` members of every group, ranked against that group's reference point.
///
/// `reference` resolves a group key to its reference point; its first error
/// aborts the selection. Groups without candidates produce no entry.
pub fn select_per_group<K, I, E, F>(
    groups: &BTreeMap<K, Vec<(I, GeoPoint)>>,
    mut reference: F,
    order: RankOrder,
    k: usize,
) -> Result<BTreeMap<K, Vec<Ranked<I>>>, E>
where
    K: Ord + Clone,
    I: Ord + Copy,
    F: FnMut(&K) -> Result<GeoPoint, E>,
{
    let compare: fn(&Ranked<I>, &Ranked<I>) -> Ordering = match order {
        RankOrder::Nearest => nearest_first::<I>,
        RankOrder::Farthest => farthest_first::<I>,
    };

    let mut selected = BTreeMap::new();
    if k == 0 {
        return Ok(selected);
    }

    for (key, members) in groups {
        if members.is_empty() {
            continue;
        }
        let origin = reference(key)?;

        let mut ranked: Vec<Ranked<I>> = members
            .iter()
            .map(|(id, location)| Ranked {
                id: *id,
                distance_meters: distance_meters(&origin, location),
            })
            .collect();
        ranked.sort_unstable_by(compare);
        ranked.truncate(k);

        selected.insert(key.clone(), ranked);
    }

    Ok(selected)
}

/// The single most distant member of each group (partitioned arg-max).
pub fn farthest_per_group<K, I, E, F>(
    groups: &BTreeMap<K, Vec<(I, GeoPoint)>>,
    reference: F,
) -> Result<BTreeMap<K, Ranked<I>>, E>
where
    K: Ord + Clone,
    I: Ord + Copy,
    F: FnMut(&K) -> Result<GeoPoint, E>,
{
    single_per_group(groups, reference, RankOrder::Farthest)
}

/// The single closest member of each group (partitioned arg-min).
pub fn nearest_per_group<K, I, E, F>(
    groups: &BTreeMap<K, Vec<(I, GeoPoint)>>,
    reference: F,
) -> Result<BTreeMap<K, Ranked<I>>, E>
where
    K: Ord + Clone,
    I: Ord + Copy,
    F: FnMut(&K) -> Result<GeoPoint, E>,
{
    single_per_group(groups, reference, RankOrder::Nearest)
}

fn single_per_group<K, I, E, F>(
    groups: &BTreeMap<K, Vec<(I, GeoPoint)>>,
    reference: F,
    order: RankOrder,
) -> Result<BTreeMap<K, Ranked<I>>, E>
where
    K: Ord + Clone,
    I: Ord + Copy,
    F: FnMut(&K) -> Result<GeoPoint, E>,
{
    Ok(select_per_group(groups, reference, order, 1)?
        .into_iter()
        .filter_map(|(key, mut ranked)| ranked.pop().map(|top| (key, top)))
        .collect())
}
