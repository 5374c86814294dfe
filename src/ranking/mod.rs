//! Proximity ranking over snapshots of located candidates.
//!
//! Orderings are total: distance first, then ascending id, so repeated calls
//! over the same input always give the same sequence.

mod group;
mod nearest;

use std::cmp::Ordering;

use crate::models::Ranked;

pub use group::{farthest_per_group, nearest_per_group, partition_by, select_per_group, RankOrder};
pub use nearest::{nearest_to, PARALLEL_THRESHOLD};

/// Ascending distance, ties by ascending id.
fn nearest_first<I: Ord>(a: &Ranked<I>, b: &Ranked<I>) -> Ordering {
    a.distance_meters
        .total_cmp(&b.distance_meters)
        .then_with(|| a.id.cmp(&b.id))
}

/// Descending distance, ties by ascending id.
fn farthest_first<I: Ord>(a: &Ranked<I>, b: &Ranked<I>) -> Ordering {
    b.distance_meters
        .total_cmp(&a.distance_meters)
        .then_with(|| a.id.cmp(&b.id))
}
