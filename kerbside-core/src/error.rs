//! Errors raised while building or editing routes.

use thiserror::Error;

use crate::{BuildRequestError, CoordinateError, DistanceError};

/// Errors returned by route builders and mutators.
///
/// Every variant is recoverable: callers map them to a client error and may
/// retry after correcting their input, e.g. by choosing another container.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RouteError {
    /// A container or origin had an out-of-range coordinate.
    #[error(transparent)]
    InvalidCoordinate(#[from] CoordinateError),
    /// Adding the container would push the route past the truck's ceiling.
    #[error(
        "container {container_id} needs {required} of capacity but only {available} remains"
    )]
    CapacityExceeded {
        /// Container that could not be placed.
        container_id: u64,
        /// Load the container would add.
        required: f64,
        /// Capacity left on the route.
        available: f64,
    },
    /// The container is not part of the route.
    #[error("container {container_id} is not on route {route_id}")]
    NotFound {
        /// Route that was searched.
        route_id: u64,
        /// Missing container.
        container_id: u64,
    },
    /// The route was finalised and rejects further changes.
    #[error("route {route_id} is finalized and cannot be changed")]
    RouteFinalized {
        /// Finalised route.
        route_id: u64,
    },
    /// The container already appears on the route.
    #[error("container {container_id} is already on route {route_id}")]
    DuplicateContainer {
        /// Route holding the container.
        route_id: u64,
        /// Duplicated container.
        container_id: u64,
    },
    /// The distance estimator produced an unusable cost.
    #[error("estimator returned invalid cost {cost}")]
    InvalidCost {
        /// Offending cost.
        cost: f64,
    },
    /// Build parameters were invalid.
    #[error("invalid build request: {0}")]
    InvalidRequest(#[from] BuildRequestError),
}

impl From<DistanceError> for RouteError {
    fn from(err: DistanceError) -> Self {
        match err {
            DistanceError::InvalidCoordinate(coordinate) => Self::InvalidCoordinate(coordinate),
            DistanceError::InvalidCost { cost } => Self::InvalidCost { cost },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn distance_errors_keep_their_coordinate() {
        let coordinate = CoordinateError {
            latitude: 100.0,
            longitude: 0.0,
        };
        let err = RouteError::from(DistanceError::InvalidCoordinate(coordinate));
        assert_eq!(err, RouteError::InvalidCoordinate(coordinate));
    }

    #[rstest]
    fn capacity_message_names_the_container() {
        let err = RouteError::CapacityExceeded {
            container_id: 9,
            required: 5000.0,
            available: 2500.0,
        };
        assert_eq!(
            err.to_string(),
            "container 9 needs 5000 of capacity but only 2500 remains"
        );
    }
}
