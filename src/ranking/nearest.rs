use rayon::prelude::*;

use super::nearest_first;
use crate::geometry::{distance_meters, GeoPoint};
use crate::models::Ranked;

/// Candidate count above which distances are computed on the rayon pool.
pub const PARALLEL_THRESHOLD: usize = 4096;

/// The `k` candidates closest to `reference`, nearest first.
///
/// Ties are broken by ascending id. `k == 0` gives an empty result and a `k`
/// past the candidate count returns every candidate ranked.
pub fn nearest_to<I>(reference: &GeoPoint, candidates: &[(I, GeoPoint)], k: usize) -> Vec<Ranked<I>>
where
    I: Ord + Copy + Send + Sync,
{
    if k == 0 || candidates.is_empty() {
        return Vec::new();
    }

    let measure = |(id, location): &(I, GeoPoint)| Ranked {
        id: *id,
        distance_meters: distance_meters(reference, location),
    };

    let mut ranked: Vec<Ranked<I>> = if candidates.len() > PARALLEL_THRESHOLD {
        candidates.par_iter().map(measure).collect()
    } else {
        candidates.iter().map(measure).collect()
    };

    if k < ranked.len() {
        ranked.select_nth_unstable_by(k - 1, nearest_first);
        ranked.truncate(k);
    }

    if ranked.len() > PARALLEL_THRESHOLD {
        ranked.par_sort_unstable_by(nearest_first);
    } else {
        ranked.sort_unstable_by(nearest_first);
    }

    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pt(lon: f64, lat: f64) -> GeoPoint {
        GeoPoint::new(lon, lat).unwrap()
    }

    fn candidates() -> Vec<(i32, GeoPoint)> {
        vec![
            (4, pt(-1.0, 0.0)),
            (1, pt(-3.0, 0.0)),
            (7, pt(0.5, 0.0)),
            (2, pt(-0.5, 0.0)),
            (9, pt(10.0, 0.0)),
        ]
    }

    #[test]
    fn test_nearest_order() {
        let reference = pt(0.0, 0.0);
        let ranked = nearest_to(&reference, &candidates(), 3);
        let ids: Vec<i32> = ranked.iter().map(|r| r.id).collect();
        // 7 and 2 are equidistant east/west; lower id first
        assert_eq!(ids, vec![2, 7, 4]);
    }

    #[test]
    fn test_non_decreasing_distances() {
        let ranked = nearest_to(&pt(0.0, 0.0), &candidates(), 5);
        assert!(ranked
            .windows(2)
            .all(|w| w[0].distance_meters <= w[1].distance_meters));
    }

    #[test]
    fn test_zero_k_is_empty() {
        assert!(nearest_to(&pt(0.0, 0.0), &candidates(), 0).is_empty());
    }

    #[test]
    fn test_k_past_len_returns_all() {
        let all = candidates();
        let ranked = nearest_to(&pt(0.0, 0.0), &all, all.len() + 5);
        assert_eq!(ranked.len(), all.len());
        assert_eq!(ranked.last().unwrap().id, 9);
    }

    #[test]
    fn test_parallel_path_matches_sequential_prefix() {
        let reference = pt(0.0, 0.0);
        let many: Vec<(i32, GeoPoint)> = (0..(PARALLEL_THRESHOLD as i32 + 500))
            .map(|i| (i, pt((i % 360) as f64 * 0.5 - 90.0, (i % 170) as f64 * 0.5 - 42.0)))
            .collect();

        let top = nearest_to(&reference, &many, 25);
        let all = nearest_to(&reference, &many, many.len());
        assert_eq!(top.as_slice(), &all[..25]);
        assert!(all
            .windows(2)
            .all(|w| nearest_first(&w[0], &w[1]).is_le()));
    }

    #[test]
    fn test_repeatable() {
        let reference = pt(0.0, 0.0);
        let first = nearest_to(&reference, &candidates(), 4);
        assert_eq!(nearest_to(&reference, &candidates(), 4), first);
    }
}
