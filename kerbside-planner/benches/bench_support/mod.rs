//! Deterministic container layouts for benchmarks.

use kerbside_core::{Container, ContainerStatus, GeoPoint};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Seed for deterministic random number generation in benchmarks.
pub const BENCHMARK_SEED: u64 = 42;

/// Depot the benchmark trucks start from.
pub const DEPOT: GeoPoint = GeoPoint {
    latitude: 11.5,
    longitude: -72.9,
};

/// Half-width of the square containers are scattered over, in degrees.
/// Roughly 5 km at this latitude.
const AREA_HALF_WIDTH: f64 = 0.05;

/// Generate `count` collectable containers around [`DEPOT`].
///
/// Volumes fall between 100 and 1100 and statuses alternate between
/// `ready` and `filled`.
#[expect(
    clippy::float_arithmetic,
    reason = "coordinates are offsets from the depot"
)]
pub fn generate_containers(count: u64, seed: u64) -> Vec<Container> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (1..=count)
        .map(|id| Container {
            id,
            location: GeoPoint {
                latitude: DEPOT.latitude + rng.gen_range(-AREA_HALF_WIDTH..AREA_HALF_WIDTH),
                longitude: DEPOT.longitude + rng.gen_range(-AREA_HALF_WIDTH..AREA_HALF_WIDTH),
            },
            volume: rng.gen_range(100.0..1100.0),
            status: if id.is_multiple_of(2) {
                ContainerStatus::Filled
            } else {
                ContainerStatus::Ready
            },
        })
        .collect()
}
