use thiserror::Error;

use crate::CoordinateError;

/// Errors from [`crate::distance::DistanceEstimator::distance`].
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum DistanceError {
    /// One of the points was outside the WGS84 ranges.
    #[error(transparent)]
    InvalidCoordinate(#[from] CoordinateError),
    /// An estimator produced a negative or non-finite cost.
    ///
    /// Planners rely on costs being comparable, so such values are rejected
    /// when a [`crate::DistanceMatrix`] is assembled.
    #[error("estimator returned invalid cost {cost}")]
    InvalidCost {
        /// Offending cost.
        cost: f64,
    },
}
