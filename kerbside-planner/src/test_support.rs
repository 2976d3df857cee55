//! Fixtures shared by the planner's unit tests.

use kerbside_core::test_support::container_at;
use kerbside_core::{BuildRequest, Container, GeoPoint};

/// Build request starting at the depot used throughout the tests.
pub(crate) const fn request(capacity: f64) -> BuildRequest {
    BuildRequest {
        route_id: 1,
        truck_id: 21,
        capacity,
        origin: GeoPoint {
            latitude: 11.5,
            longitude: -72.9,
        },
    }
}

/// Containers A (id 1) and B (id 2); B is nearer the depot.
pub(crate) fn scenario_containers() -> Vec<Container> {
    vec![
        container_at(1, 11.54752, -72.91351, 1000.0),
        container_at(2, 11.53855, -72.91672, 1000.0),
    ]
}
