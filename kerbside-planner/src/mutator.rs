//! Incremental edits to an existing route.
//!
//! Every operation leaves the route untouched when it fails.

use kerbside_core::{Container, DistanceEstimator, DistanceMatrix, GeoPoint, Route, RouteError};

use crate::PlannerConfig;
use crate::local_search::two_opt;

/// Where [`RouteMutator::append`] placed a container.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Insertion {
    /// Position of the new point in the route.
    pub position: usize,
    /// Distance the insertion added to the route total.
    pub added_distance: f64,
}

/// Appends, removes and re-sequences containers on a route.
///
/// # Examples
/// ```
/// use kerbside_core::{Container, ContainerStatus, GeoPoint, GreatCircleDistance, Route};
/// use kerbside_planner::RouteMutator;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mutator = RouteMutator::new(GreatCircleDistance);
/// let mut route = Route::new(1, 21, GeoPoint::new(11.5, -72.9)?, 2500.0);
/// let location = GeoPoint::new(11.53855, -72.91672)?;
///
/// mutator.append(&mut route, Container::new(2, location, 1000.0, ContainerStatus::Ready)?)?;
/// assert_eq!(route.container_ids(), vec![2]);
///
/// mutator.remove(&mut route, 2)?;
/// assert_eq!(route.total_distance(), 0.0);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct RouteMutator<D> {
    estimator: D,
    config: PlannerConfig,
}

impl<D> RouteMutator<D>
where
    D: DistanceEstimator,
{
    /// Construct a mutator with default configuration.
    pub fn new(estimator: D) -> Self {
        Self::with_config(estimator, PlannerConfig::default())
    }

    /// Construct a mutator with explicit configuration.
    pub const fn with_config(estimator: D, config: PlannerConfig) -> Self {
        Self { estimator, config }
    }

    /// Insert `container` at the slot adding the least distance.
    ///
    /// Every slot is considered, from before the first point to after the
    /// last; ties go to the earliest slot. The route total is then
    /// recomputed over the new sequence, so a later [`RouteMutator::remove`]
    /// of the same container restores it exactly.
    ///
    /// # Errors
    ///
    /// [`RouteError::RouteFinalized`] for finalised routes,
    /// [`RouteError::DuplicateContainer`] when the id is already on the route,
    /// [`RouteError::InvalidCoordinate`] for a bad location and
    /// [`RouteError::CapacityExceeded`] when the load would not fit.
    pub fn append(&self, route: &mut Route, container: Container) -> Result<Insertion, RouteError> {
        route.ensure_mutable()?;
        if route.contains(container.id) {
            return Err(RouteError::DuplicateContainer {
                route_id: route.id(),
                container_id: container.id,
            });
        }
        container.location.validate()?;
        if !route.fits(&container) {
            return Err(RouteError::CapacityExceeded {
                container_id: container.id,
                required: container.load(),
                available: route.remaining_capacity(),
            });
        }

        let insertion = self.cheapest_insertion(route, container.location)?;
        log::debug!(
            "route {}: inserting container {} at {} (+{:.1})",
            route.id(),
            container.id,
            insertion.position,
            insertion.added_distance,
        );
        route.insert_point(insertion.position, container, &self.estimator)?;
        Ok(insertion)
    }

    /// Remove `container_id`, reconnect its neighbours and recompute the
    /// route total.
    ///
    /// # Errors
    ///
    /// [`RouteError::RouteFinalized`] for finalised routes and
    /// [`RouteError::NotFound`] when the container is not on the route.
    pub fn remove(&self, route: &mut Route, container_id: u64) -> Result<Container, RouteError> {
        route.ensure_mutable()?;
        let removed = route.remove_container(container_id, &self.estimator)?;
        log::debug!("route {}: removed container {container_id}", route.id());
        Ok(removed)
    }

    /// Re-run 2-opt over the points from `from_index` onwards.
    ///
    /// The suffix is anchored at the point just before it, or at the origin
    /// when `from_index` is zero, so the prefix keeps its order. An index at
    /// or past the end leaves the route unchanged. Returns the route total.
    ///
    /// # Errors
    ///
    /// [`RouteError::RouteFinalized`] for finalised routes, or an estimator
    /// failure.
    pub fn reoptimize(&self, route: &mut Route, from_index: usize) -> Result<f64, RouteError> {
        route.ensure_mutable()?;
        if from_index >= route.points().len() {
            return Ok(route.total_distance());
        }

        let anchor = from_index
            .checked_sub(1)
            .and_then(|index| route.points().get(index))
            .map_or_else(|| route.origin(), |point| point.container.location);
        let suffix: Vec<&Container> = route.containers().skip(from_index).collect();
        let locations: Vec<GeoPoint> = std::iter::once(anchor)
            .chain(suffix.iter().map(|container| container.location))
            .collect();
        let matrix = DistanceMatrix::new(&self.estimator, &locations)?;

        let mut order: Vec<usize> = (1..locations.len()).collect();
        let stats = two_opt(&matrix, 0, &mut order, self.config.max_improvement_passes);
        if stats.moves == 0 {
            return Ok(route.total_distance());
        }

        let sequence: Vec<Container> = route
            .containers()
            .take(from_index)
            .chain(
                order
                    .iter()
                    .filter_map(|&index| index.checked_sub(1).and_then(|slot| suffix.get(slot)))
                    .copied(),
            )
            .cloned()
            .collect();
        let mut updated = route.clone();
        updated.set_sequence(sequence, 0.0);
        let total = updated.recompute_distance(&self.estimator)?;
        *route = updated;
        log::debug!(
            "route {}: reoptimised from {from_index} with {} moves, distance {total:.1}",
            route.id(),
            stats.moves,
        );
        Ok(total)
    }

    #[expect(
        clippy::float_arithmetic,
        reason = "insertion cost combines floating-point leg distances"
    )]
    fn cheapest_insertion(&self, route: &Route, location: GeoPoint) -> Result<Insertion, RouteError> {
        let stops = route.locations();
        let mut best: Option<Insertion> = None;
        for (position, pair) in stops.windows(2).enumerate() {
            let [prev, next] = pair else {
                continue;
            };
            let added_distance =
                self.leg(*prev, location)? + self.leg(location, *next)? - self.leg(*prev, *next)?;
            if best.is_none_or(|current| added_distance < current.added_distance) {
                best = Some(Insertion {
                    position,
                    added_distance,
                });
            }
        }

        let last = stops.last().copied().unwrap_or_else(|| route.origin());
        let tail = Insertion {
            position: route.points().len(),
            added_distance: self.leg(last, location)?,
        };
        Ok(match best {
            Some(inner) if inner.added_distance <= tail.added_distance => inner,
            _ => tail,
        })
    }

    fn leg(&self, from: GeoPoint, to: GeoPoint) -> Result<f64, RouteError> {
        let cost = self.estimator.distance(from, to)?;
        if !cost.is_finite() || cost < 0.0 {
            return Err(RouteError::InvalidCost { cost });
        }
        Ok(cost)
    }
}
