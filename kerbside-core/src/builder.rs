//! Build requests and the seam route construction strategies plug into.

use thiserror::Error;

use crate::{Container, CoordinateError, GeoPoint, Route, RouteError};

/// Parameters for building a route.
///
/// The request names the route to create, the truck that will drive it, the
/// truck's capacity ceiling and the fixed start point.
///
/// # Examples
/// ```rust
/// use kerbside_core::{BuildRequest, GeoPoint};
///
/// let request = BuildRequest {
///     route_id: 11,
///     truck_id: 22,
///     capacity: 2500.0,
///     origin: GeoPoint::new(11.5, -72.9).unwrap(),
/// };
/// assert!(request.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BuildRequest {
    /// Identifier given to the new route.
    pub route_id: u64,
    /// Truck assigned to the route; must be positive.
    pub truck_id: u64,
    /// Capacity ceiling of the truck.
    pub capacity: f64,
    /// Where the truck starts.
    pub origin: GeoPoint,
}

/// Validation failures for [`BuildRequest`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BuildRequestError {
    /// Truck identifiers start at one.
    #[error("truck_id must be greater than zero")]
    ZeroTruckId,
    /// Capacity was negative or not finite.
    #[error("capacity {0} must be a finite value >= 0")]
    InvalidCapacity(f64),
    /// The origin was not a valid coordinate.
    #[error("invalid origin: {0}")]
    InvalidOrigin(#[source] CoordinateError),
}

impl BuildRequest {
    /// Check the request before planning.
    pub fn validate(&self) -> Result<(), BuildRequestError> {
        if self.truck_id == 0 {
            return Err(BuildRequestError::ZeroTruckId);
        }
        if !self.capacity.is_finite() || self.capacity < 0.0 {
            return Err(BuildRequestError::InvalidCapacity(self.capacity));
        }
        self.origin
            .validate()
            .map_err(BuildRequestError::InvalidOrigin)
    }
}

/// Produce a route visiting pending containers.
///
/// Implementations must be pure: they read the supplied containers and
/// return a new [`Route`] without persisting anything. They are `Send + Sync`
/// so a single builder can serve concurrent requests.
pub trait RouteBuilder: Send + Sync {
    /// Build a route for `request` from `containers`.
    fn build(&self, request: &BuildRequest, containers: &[Container]) -> Result<Route, RouteError>;
}
