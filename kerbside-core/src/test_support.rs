//! Deterministic fixtures shared by unit and behaviour tests.

use crate::{Container, ContainerStatus, DistanceError, DistanceEstimator, GeoPoint};

/// Build a `ready` container at (`latitude`, `longitude`).
///
/// Coordinates are not validated so tests can construct edge cases.
#[must_use]
pub const fn container_at(id: u64, latitude: f64, longitude: f64, volume: f64) -> Container {
    Container {
        id,
        location: GeoPoint {
            latitude,
            longitude,
        },
        volume,
        status: ContainerStatus::Ready,
    }
}

/// Straight-line distance measured in degrees.
///
/// Keeps expected totals easy to compute by hand: `(0,0)` to `(3,4)` costs
/// exactly `5.0`.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlanarDistance;

impl DistanceEstimator for PlanarDistance {
    #[expect(
        clippy::float_arithmetic,
        reason = "planar distance is computed with floating-point arithmetic"
    )]
    fn distance(&self, from: GeoPoint, to: GeoPoint) -> Result<f64, DistanceError> {
        from.validate()?;
        to.validate()?;
        Ok((to.latitude - from.latitude).hypot(to.longitude - from.longitude))
    }
}

/// Estimator that rejects every request with a non-finite cost.
#[derive(Debug, Default, Clone, Copy)]
pub struct BrokenDistance;

impl DistanceEstimator for BrokenDistance {
    fn distance(&self, _from: GeoPoint, _to: GeoPoint) -> Result<f64, DistanceError> {
        Err(DistanceError::InvalidCost { cost: f64::NAN })
    }
}
