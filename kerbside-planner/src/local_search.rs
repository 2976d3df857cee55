//! Bounded 2-opt over an open path.
//!
//! The path starts at a fixed anchor (the route origin or the last point of
//! an untouched prefix) and ends at its final stop; there is no return leg.
//! Reversing the segment `order[i..=j]` replaces the edges
//! `prev(i) -> order[i]` and `order[j] -> next(j)` with
//! `prev(i) -> order[j]` and `order[i] -> next(j)`. When `j` is the last
//! stop only the first edge changes.

use kerbside_core::DistanceMatrix;

/// Smallest saving that counts as an improvement.
pub(crate) const IMPROVEMENT_EPSILON: f64 = 1e-9;

/// Summary of a 2-opt run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct SearchStats {
    pub(crate) passes: usize,
    pub(crate) moves: usize,
}

/// Improve `order` in place by first-improvement 2-opt.
///
/// `anchor` and every entry of `order` are indices into `matrix`. Stops after
/// `max_passes` sweeps or once a sweep finds nothing to improve.
pub(crate) fn two_opt(
    matrix: &DistanceMatrix,
    anchor: usize,
    order: &mut [usize],
    max_passes: usize,
) -> SearchStats {
    let mut stats = SearchStats::default();
    let len = order.len();
    if len < 2 {
        return stats;
    }
    while stats.passes < max_passes {
        stats.passes += 1;
        let mut improved = false;
        for i in 0..len - 1 {
            for j in i + 1..len {
                if reversal_gain(matrix, anchor, order, i, j) > IMPROVEMENT_EPSILON
                    && let Some(segment) = order.get_mut(i..=j)
                {
                    segment.reverse();
                    stats.moves += 1;
                    improved = true;
                }
            }
        }
        if !improved {
            break;
        }
    }
    stats
}

/// Distance saved by reversing `order[i..=j]`; positive means shorter.
#[expect(
    clippy::float_arithmetic,
    reason = "reversal gain compares floating-point edge costs"
)]
fn reversal_gain(
    matrix: &DistanceMatrix,
    anchor: usize,
    order: &[usize],
    i: usize,
    j: usize,
) -> f64 {
    let predecessor = i
        .checked_sub(1)
        .map_or(Some(anchor), |index| order.get(index).copied());
    let (Some(prev), Some(&first), Some(&last)) = (predecessor, order.get(i), order.get(j)) else {
        return 0.0;
    };
    let next = order.get(j + 1).copied();

    let tail_before = next.map_or(0.0, |stop| matrix.cost(last, stop));
    let tail_after = next.map_or(0.0, |stop| matrix.cost(first, stop));
    let before = matrix.cost(prev, first) + tail_before;
    let after = matrix.cost(prev, last) + tail_after;
    before - after
}

#[cfg(test)]
mod tests {
    use super::*;
    use kerbside_core::GeoPoint;
    use kerbside_core::test_support::PlanarDistance;
    use rstest::rstest;

    fn matrix(coordinates: &[(f64, f64)]) -> DistanceMatrix {
        let points: Vec<GeoPoint> = coordinates
            .iter()
            .map(|&(latitude, longitude)| GeoPoint {
                latitude,
                longitude,
            })
            .collect();
        DistanceMatrix::new(&PlanarDistance, &points).expect("valid matrix")
    }

    #[rstest]
    fn untangles_a_crossing_path() {
        // Anchor at the origin, stops along the longitude axis visited 1, 3, 2.
        let matrix = matrix(&[(0.0, 0.0), (0.0, 1.0), (0.0, 2.0), (0.0, 3.0)]);
        let mut order = vec![1, 3, 2];
        let stats = two_opt(&matrix, 0, &mut order, 10);
        assert_eq!(order, vec![1, 2, 3]);
        assert!(stats.moves >= 1);
        assert_eq!(matrix.path_cost(&[0, 1, 2, 3]), 3.0);
    }

    #[rstest]
    fn reverses_the_tail_without_a_return_leg() {
        let matrix = matrix(&[(0.0, 0.0), (0.0, 1.0), (0.0, 5.0), (0.0, 2.0)]);
        let mut order = vec![2, 3, 1];
        two_opt(&matrix, 0, &mut order, 10);
        assert_eq!(order, vec![1, 3, 2]);
    }

    #[rstest]
    fn zero_passes_leave_order_untouched() {
        let matrix = matrix(&[(0.0, 0.0), (0.0, 1.0), (0.0, 2.0), (0.0, 3.0)]);
        let mut order = vec![3, 1, 2];
        let stats = two_opt(&matrix, 0, &mut order, 0);
        assert_eq!(order, vec![3, 1, 2]);
        assert_eq!(stats, SearchStats::default());
    }

    #[rstest]
    #[case(vec![])]
    #[case(vec![1])]
    fn short_paths_need_no_search(#[case] mut order: Vec<usize>) {
        let matrix = matrix(&[(0.0, 0.0), (0.0, 1.0)]);
        let before = order.clone();
        assert_eq!(two_opt(&matrix, 0, &mut order, 10).passes, 0);
        assert_eq!(order, before);
    }

    #[rstest]
    fn converged_path_stops_after_one_sweep() {
        let matrix = matrix(&[(0.0, 0.0), (0.0, 1.0), (0.0, 2.0), (0.0, 3.0)]);
        let mut order = vec![1, 2, 3];
        let stats = two_opt(&matrix, 0, &mut order, 10);
        assert_eq!(stats, SearchStats { passes: 1, moves: 0 });
    }
}
