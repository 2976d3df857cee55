//! Collection routes: an ordered walk from a depot through containers.
//!
//! A [`Route`] owns its [`RoutePoint`]s and keeps two invariants: the summed
//! load of its containers never exceeds the truck's capacity, and
//! `total_distance` is the cost of driving origin → first point → … → last
//! point. Planners change the sequence through the methods here so positions,
//! state and distance stay in step.

use crate::{Container, DistanceError, DistanceEstimator, GeoPoint, LoadTally, RouteError};

/// Lifecycle of a route.
///
/// `Empty -> Building -> Finalized`. A building route drops back to `Empty`
/// when its last point is removed; a finalised route never changes again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum RouteState {
    /// No containers assigned yet.
    #[default]
    Empty,
    /// Containers assigned; edits allowed.
    Building,
    /// Marked complete; edits rejected.
    Finalized,
}

/// A container placed at a position in a route.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoutePoint {
    /// Zero-based index within the route.
    pub position: usize,
    /// Snapshot of the visited container.
    pub container: Container,
}

/// An ordered visitation plan for one truck.
///
/// # Examples
/// ```
/// use kerbside_core::{GeoPoint, Route, RouteState};
///
/// let origin = GeoPoint::new(11.5, -72.9).unwrap();
/// let route = Route::new(1, 21, origin, 2500.0);
///
/// assert_eq!(route.state(), RouteState::Empty);
/// assert_eq!(route.total_distance(), 0.0);
/// assert_eq!(route.remaining_capacity(), 2500.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Route {
    id: u64,
    truck_id: u64,
    origin: GeoPoint,
    capacity: f64,
    points: Vec<RoutePoint>,
    total_distance: f64,
    state: RouteState,
}

impl Route {
    /// Construct an empty route.
    #[must_use]
    pub const fn new(id: u64, truck_id: u64, origin: GeoPoint, capacity: f64) -> Self {
        Self {
            id,
            truck_id,
            origin,
            capacity,
            points: Vec::new(),
            total_distance: 0.0,
            state: RouteState::Empty,
        }
    }

    /// Route identifier.
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// Truck assigned to the route.
    #[must_use]
    pub const fn truck_id(&self) -> u64 {
        self.truck_id
    }

    /// Fixed start point.
    #[must_use]
    pub const fn origin(&self) -> GeoPoint {
        self.origin
    }

    /// Capacity ceiling of the truck.
    #[must_use]
    pub const fn capacity(&self) -> f64 {
        self.capacity
    }

    /// Points in visiting order.
    #[must_use]
    pub fn points(&self) -> &[RoutePoint] {
        &self.points
    }

    /// Containers in visiting order.
    pub fn containers(&self) -> impl Iterator<Item = &Container> + '_ {
        self.points.iter().map(|point| &point.container)
    }

    /// Container identifiers in visiting order.
    #[must_use]
    pub fn container_ids(&self) -> Vec<u64> {
        self.containers().map(|container| container.id).collect()
    }

    /// Cost of the whole route including the leg from the origin.
    #[must_use]
    pub const fn total_distance(&self) -> f64 {
        self.total_distance
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> RouteState {
        self.state
    }

    /// Return `true` once the route has been finalised.
    #[must_use]
    pub fn is_finalized(&self) -> bool {
        self.state == RouteState::Finalized
    }

    /// Summed load of the containers on the route.
    ///
    /// The total does not depend on the visiting order; see [`LoadTally`].
    #[must_use]
    pub fn load(&self) -> f64 {
        self.load_tally().total()
    }

    /// Loads of the containers on the route.
    #[must_use]
    pub fn load_tally(&self) -> LoadTally {
        LoadTally::from_containers(self.containers())
    }

    /// Return `true` when adding `container` keeps the load within capacity.
    #[must_use]
    pub fn fits(&self, container: &Container) -> bool {
        self.load_tally().total_with(container.load()) <= self.capacity
    }

    /// Capacity still available, never negative.
    #[must_use]
    #[expect(
        clippy::float_arithmetic,
        reason = "remaining capacity subtracts floating-point volumes"
    )]
    pub fn remaining_capacity(&self) -> f64 {
        (self.capacity - self.load()).max(0.0)
    }

    /// Return `true` when the container is on the route.
    #[must_use]
    pub fn contains(&self, container_id: u64) -> bool {
        self.position_of(container_id).is_some()
    }

    /// Position of the container, if present.
    #[must_use]
    pub fn position_of(&self, container_id: u64) -> Option<usize> {
        self.points
            .iter()
            .position(|point| point.container.id == container_id)
    }

    /// Origin followed by every container location, in visiting order.
    #[must_use]
    pub fn locations(&self) -> Vec<GeoPoint> {
        std::iter::once(self.origin)
            .chain(self.containers().map(|container| container.location))
            .collect()
    }

    /// Fail with [`RouteError::RouteFinalized`] when edits are not allowed.
    pub const fn ensure_mutable(&self) -> Result<(), RouteError> {
        match self.state {
            RouteState::Finalized => Err(RouteError::RouteFinalized { route_id: self.id }),
            RouteState::Empty | RouteState::Building => Ok(()),
        }
    }

    /// Mark the route complete. Further edits are rejected.
    pub const fn finalize(&mut self) {
        self.state = RouteState::Finalized;
    }

    /// Replace the whole sequence.
    ///
    /// `total_distance` must be the cost of the new sequence starting at the
    /// origin; planners compute it from the same distance matrix they used to
    /// order the containers.
    pub fn set_sequence(&mut self, containers: Vec<Container>, total_distance: f64) {
        self.points = containers
            .into_iter()
            .enumerate()
            .map(|(position, container)| RoutePoint {
                position,
                container,
            })
            .collect();
        self.total_distance = total_distance;
        self.refresh_state();
    }

    /// Insert `container` at `index` and recompute the total over the new
    /// sequence. Returns the new total.
    ///
    /// `index` is clamped to the end of the route. The route is left
    /// unchanged when the estimator fails.
    pub fn insert_point<E>(
        &mut self,
        index: usize,
        container: Container,
        estimator: &E,
    ) -> Result<f64, DistanceError>
    where
        E: DistanceEstimator + ?Sized,
    {
        let slot = index.min(self.points.len());
        let locations = self
            .containers()
            .take(slot)
            .chain(std::iter::once(&container))
            .chain(self.containers().skip(slot))
            .map(|stop| stop.location);
        let total = sequence_distance(estimator, self.origin, locations)?;

        self.points.insert(
            slot,
            RoutePoint {
                position: slot,
                container,
            },
        );
        self.renumber_from(slot);
        self.total_distance = total;
        self.refresh_state();
        Ok(total)
    }

    /// Remove `container_id`, reconnect its neighbours and recompute the
    /// total over the remaining sequence.
    ///
    /// The route is left unchanged when the container is absent or the
    /// estimator fails.
    pub fn remove_container<E>(
        &mut self,
        container_id: u64,
        estimator: &E,
    ) -> Result<Container, RouteError>
    where
        E: DistanceEstimator + ?Sized,
    {
        let index = self
            .position_of(container_id)
            .ok_or(RouteError::NotFound {
                route_id: self.id,
                container_id,
            })?;
        let remaining = self
            .containers()
            .filter(|container| container.id != container_id)
            .map(|container| container.location);
        let total = sequence_distance(estimator, self.origin, remaining)?;

        let removed = self.points.remove(index);
        self.renumber_from(index);
        self.total_distance = total;
        self.refresh_state();
        Ok(removed.container)
    }

    /// Recompute `total_distance` from scratch with `estimator`.
    pub fn recompute_distance<E>(&mut self, estimator: &E) -> Result<f64, DistanceError>
    where
        E: DistanceEstimator + ?Sized,
    {
        let locations = self.containers().map(|container| container.location);
        let total = sequence_distance(estimator, self.origin, locations)?;
        self.total_distance = total;
        Ok(total)
    }

    fn renumber_from(&mut self, index: usize) {
        for (position, point) in self.points.iter_mut().enumerate().skip(index) {
            point.position = position;
        }
    }

    fn refresh_state(&mut self) {
        if self.state == RouteState::Finalized {
            return;
        }
        self.state = if self.points.is_empty() {
            RouteState::Empty
        } else {
            RouteState::Building
        };
    }
}

/// Sum estimator costs along `origin` followed by `locations`.
#[expect(
    clippy::float_arithmetic,
    reason = "route distance is the sum of floating-point legs"
)]
fn sequence_distance<E, I>(estimator: &E, origin: GeoPoint, locations: I) -> Result<f64, DistanceError>
where
    E: DistanceEstimator + ?Sized,
    I: IntoIterator<Item = GeoPoint>,
{
    let mut total = 0.0;
    let mut previous = origin;
    for location in locations {
        let cost = estimator.distance(previous, location)?;
        if !cost.is_finite() || cost < 0.0 {
            return Err(DistanceError::InvalidCost { cost });
        }
        total += cost;
        previous = location;
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ContainerStatus;
    use crate::test_support::{BrokenDistance, PlanarDistance, container_at};
    use rstest::{fixture, rstest};

    #[fixture]
    fn origin() -> GeoPoint {
        GeoPoint::new(0.0, 0.0).expect("valid origin")
    }

    #[fixture]
    fn route(origin: GeoPoint) -> Route {
        let mut route = Route::new(1, 21, origin, 2500.0);
        route.set_sequence(
            vec![
                container_at(1, 0.0, 3.0, 1000.0),
                container_at(2, 4.0, 3.0, 1000.0),
            ],
            7.0,
        );
        route
    }

    #[rstest]
    fn set_sequence_numbers_points_and_starts_building(route: Route) {
        let positions: Vec<usize> = route.points().iter().map(|p| p.position).collect();
        assert_eq!(positions, vec![0, 1]);
        assert_eq!(route.state(), RouteState::Building);
        assert_eq!(route.total_distance(), 7.0);
    }

    #[rstest]
    fn load_ignores_containers_that_are_not_collectable(origin: GeoPoint) {
        let mut route = Route::new(1, 21, origin, 2500.0);
        let mut idle = container_at(3, 1.0, 1.0, 700.0);
        idle.status = ContainerStatus::Filling;
        route.set_sequence(vec![container_at(1, 0.0, 1.0, 1000.0), idle], 0.0);
        assert_eq!(route.load(), 1000.0);
        assert_eq!(route.remaining_capacity(), 1500.0);
    }

    #[rstest]
    fn insert_point_renumbers_and_recomputes(mut route: Route) {
        let total = route
            .insert_point(1, container_at(3, 0.0, 1.0, 10.0), &PlanarDistance)
            .expect("valid points");
        assert_eq!(route.container_ids(), vec![1, 3, 2]);
        let positions: Vec<usize> = route.points().iter().map(|p| p.position).collect();
        assert_eq!(positions, vec![0, 1, 2]);
        assert_eq!(total, 3.0 + 2.0 + 4.0_f64.hypot(2.0));
        assert_eq!(route.total_distance(), total);
    }

    #[rstest]
    fn insert_then_remove_restores_the_recomputed_total(origin: GeoPoint) {
        let mut route = Route::new(1, 21, origin, 2500.0);
        for (id, latitude, longitude) in [(1, 0.1, 0.7), (2, 0.35, 0.2), (3, 0.9, 0.45)] {
            let position = route.points().len();
            route
                .insert_point(position, container_at(id, latitude, longitude, 1.0), &PlanarDistance)
                .expect("valid points");
        }
        let before = route.clone();
        route
            .insert_point(1, container_at(9, 0.3, 0.3, 1.0), &PlanarDistance)
            .expect("valid points");
        route
            .remove_container(9, &PlanarDistance)
            .expect("container is on the route");
        assert_eq!(route, before);
    }

    #[rstest]
    fn failed_insertion_leaves_route_untouched(mut route: Route) {
        let before = route.clone();
        let err = route
            .insert_point(0, container_at(3, 0.0, 1.0, 10.0), &BrokenDistance)
            .expect_err("estimator always fails");
        assert!(matches!(err, DistanceError::InvalidCost { .. }));
        assert_eq!(route, before);
    }

    #[rstest]
    #[case(0.2, true)]
    // 0.1 + 0.2 + 0.3 rounds to 0.6000000000000001.
    #[case(0.3, false)]
    fn fits_agrees_with_the_summed_load(
        origin: GeoPoint,
        #[case] volume: f64,
        #[case] expected: bool,
    ) {
        let mut route = Route::new(1, 21, origin, 0.6);
        route.set_sequence(
            vec![container_at(2, 0.0, 1.0, 0.2), container_at(1, 0.0, 2.0, 0.1)],
            0.0,
        );
        let candidate = container_at(3, 0.0, 3.0, volume);
        assert_eq!(route.fits(&candidate), expected);

        let mut extended = route.containers().cloned().collect::<Vec<_>>();
        extended.push(candidate);
        route.set_sequence(extended, 0.0);
        assert_eq!(route.load() <= route.capacity(), expected);
    }

    #[rstest]
    fn removing_a_container_recomputes_distance(mut route: Route) {
        let removed = route
            .remove_container(1, &PlanarDistance)
            .expect("container is on the route");
        assert_eq!(removed.id, 1);
        assert_eq!(route.container_ids(), vec![2]);
        assert_eq!(route.total_distance(), 5.0);
        assert_eq!(route.points().first().map(|p| p.position), Some(0));
    }

    #[rstest]
    fn removing_last_point_returns_to_empty(origin: GeoPoint) {
        let mut route = Route::new(1, 21, origin, 2500.0);
        route
            .insert_point(0, container_at(1, 0.0, 3.0, 10.0), &PlanarDistance)
            .expect("valid points");
        assert_eq!(route.state(), RouteState::Building);
        route
            .remove_container(1, &PlanarDistance)
            .expect("container is on the route");
        assert_eq!(route.state(), RouteState::Empty);
        assert_eq!(route.total_distance(), 0.0);
    }

    #[rstest]
    fn removing_unknown_container_is_not_found(mut route: Route) {
        let err = route
            .remove_container(99, &PlanarDistance)
            .expect_err("container 99 is absent");
        assert_eq!(
            err,
            RouteError::NotFound {
                route_id: 1,
                container_id: 99
            }
        );
        assert_eq!(route.container_ids(), vec![1, 2]);
    }

    #[rstest]
    fn failed_removal_leaves_route_untouched(mut route: Route) {
        let before = route.clone();
        let err = route
            .remove_container(1, &BrokenDistance)
            .expect_err("estimator always fails");
        assert!(matches!(err, RouteError::InvalidCost { .. }));
        assert_eq!(route, before);
    }

    #[rstest]
    fn finalized_routes_are_not_mutable(mut route: Route) {
        route.finalize();
        assert!(route.is_finalized());
        assert_eq!(
            route.ensure_mutable(),
            Err(RouteError::RouteFinalized { route_id: 1 })
        );
    }

    #[rstest]
    fn recompute_distance_matches_sequence(mut route: Route) {
        let total = route
            .recompute_distance(&PlanarDistance)
            .expect("valid points");
        assert_eq!(total, 7.0);
        assert_eq!(route.locations().len(), 3);
    }

    #[rstest]
    fn lookups_find_containers_by_id(route: Route) {
        assert!(route.contains(2));
        assert_eq!(route.position_of(2), Some(1));
        assert_eq!(route.position_of(99), None);
    }
}
