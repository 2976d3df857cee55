//! Distance estimator trait and the great-circle default.

use geo::{Distance, Haversine, Point};

use crate::GeoPoint;

use super::error::DistanceError;

/// Compute the travel cost between two points.
///
/// Implementations must return a non-negative cost and must be symmetric:
/// `distance(a, b) == distance(b, a)`. Road-network models need not satisfy
/// the triangle inequality exactly. Invalid coordinates are reported as
/// [`DistanceError::InvalidCoordinate`].
///
/// # Examples
///
/// ```rust
/// use kerbside_core::{DistanceError, DistanceEstimator, GeoPoint};
///
/// /// Manhattan distance in degrees, for illustration only.
/// struct DegreesProvider;
///
/// impl DistanceEstimator for DegreesProvider {
///     fn distance(&self, from: GeoPoint, to: GeoPoint) -> Result<f64, DistanceError> {
///         from.validate()?;
///         to.validate()?;
///         Ok((from.latitude - to.latitude).abs() + (from.longitude - to.longitude).abs())
///     }
/// }
///
/// let a = GeoPoint::new(0.0, 0.0)?;
/// let b = GeoPoint::new(1.0, 2.0)?;
/// assert_eq!(DegreesProvider.distance(a, b)?, 3.0);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub trait DistanceEstimator {
    /// Return the cost of travelling from `from` to `to`.
    fn distance(&self, from: GeoPoint, to: GeoPoint) -> Result<f64, DistanceError>;
}

impl<T> DistanceEstimator for &T
where
    T: DistanceEstimator + ?Sized,
{
    fn distance(&self, from: GeoPoint, to: GeoPoint) -> Result<f64, DistanceError> {
        (**self).distance(from, to)
    }
}

/// Great-circle distance in metres using the haversine formula.
///
/// # Examples
/// ```
/// use kerbside_core::{DistanceEstimator, GeoPoint, GreatCircleDistance};
///
/// let a = GeoPoint::new(11.54752, -72.91351).unwrap();
/// let b = GeoPoint::new(11.53855, -72.91672).unwrap();
/// let metres = GreatCircleDistance.distance(a, b).unwrap();
/// assert!(metres > 1000.0 && metres < 1100.0);
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct GreatCircleDistance;

impl DistanceEstimator for GreatCircleDistance {
    fn distance(&self, from: GeoPoint, to: GeoPoint) -> Result<f64, DistanceError> {
        from.validate()?;
        to.validate()?;
        Ok(Haversine.distance(Point::from(from), Point::from(to)))
    }
}
