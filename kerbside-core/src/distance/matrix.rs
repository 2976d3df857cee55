//! Precomputed pairwise costs for a fixed set of points.

use crate::GeoPoint;

use super::error::DistanceError;
use super::estimator::DistanceEstimator;

/// Symmetric `n x n` cost matrix stored row-major.
///
/// Each pair is evaluated once and mirrored, so the matrix is symmetric even
/// when the estimator rounds differently by direction.
///
/// # Examples
/// ```
/// use kerbside_core::{DistanceMatrix, GeoPoint, GreatCircleDistance};
///
/// let points = [
///     GeoPoint::new(0.0, 0.0).unwrap(),
///     GeoPoint::new(0.0, 1.0).unwrap(),
/// ];
/// let matrix = DistanceMatrix::new(&GreatCircleDistance, &points).unwrap();
/// assert_eq!(matrix.len(), 2);
/// assert_eq!(matrix.cost(0, 1), matrix.cost(1, 0));
/// assert_eq!(matrix.cost(1, 1), 0.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMatrix {
    size: usize,
    costs: Vec<f64>,
}

impl DistanceMatrix {
    /// Evaluate `estimator` for every pair of `points`.
    ///
    /// Fails on the first invalid coordinate or on a negative or non-finite
    /// cost.
    pub fn new<E>(estimator: &E, points: &[GeoPoint]) -> Result<Self, DistanceError>
    where
        E: DistanceEstimator + ?Sized,
    {
        for point in points {
            point.validate()?;
        }
        let size = points.len();
        let mut costs = vec![0.0; size.saturating_mul(size)];
        for (row, from) in points.iter().enumerate() {
            for (col, to) in points.iter().enumerate().skip(row.saturating_add(1)) {
                let cost = estimator.distance(*from, *to)?;
                if !cost.is_finite() || cost < 0.0 {
                    return Err(DistanceError::InvalidCost { cost });
                }
                if let Some(slot) = costs.get_mut(row * size + col) {
                    *slot = cost;
                }
                if let Some(slot) = costs.get_mut(col * size + row) {
                    *slot = cost;
                }
            }
        }
        Ok(Self { size, costs })
    }

    /// Number of points covered by the matrix.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.size
    }

    /// Return `true` when the matrix covers no points.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Cost between the points at indices `from` and `to`.
    ///
    /// Out-of-range indices yield `f64::INFINITY` so a bad lookup can never
    /// look like an improvement.
    #[must_use]
    pub fn cost(&self, from: usize, to: usize) -> f64 {
        if from >= self.size || to >= self.size {
            log::warn!(
                "distance matrix lookup ({from}, {to}) outside {size}x{size}",
                size = self.size
            );
            return f64::INFINITY;
        }
        self.costs
            .get(from * self.size + to)
            .copied()
            .unwrap_or(f64::INFINITY)
    }

    /// Total cost of visiting `order` in sequence.
    ///
    /// The first index is the starting point; an empty or single-element
    /// order costs nothing.
    #[must_use]
    #[expect(
        clippy::float_arithmetic,
        reason = "path cost is the sum of floating-point edge costs"
    )]
    pub fn path_cost(&self, order: &[usize]) -> f64 {
        order
            .windows(2)
            .map(|pair| match pair {
                [from, to] => self.cost(*from, *to),
                _ => 0.0,
            })
            .sum()
    }
}
