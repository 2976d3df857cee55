//! Greedy nearest-neighbour route construction with 2-opt refinement.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use kerbside_core::{
    BuildRequest, Container, DistanceEstimator, DistanceMatrix, GeoPoint, LoadTally, Route,
    RouteBuilder, RouteError,
};

use crate::PlannerConfig;
use crate::local_search::two_opt;

/// Builds routes by visiting the nearest fitting container next.
///
/// Construction starts at the request origin and repeatedly picks the closest
/// unvisited collectable container whose load fits the remaining capacity.
/// Equidistant candidates are ordered by id. The resulting open path is then
/// shortened with a bounded 2-opt pass and its total recomputed with the
/// estimator.
///
/// # Examples
/// ```
/// use kerbside_core::{
///     BuildRequest, Container, ContainerStatus, GeoPoint, GreatCircleDistance, RouteBuilder,
/// };
/// use kerbside_planner::GreedyRouteBuilder;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let containers = vec![
///     Container::new(1, GeoPoint::new(11.54752, -72.91351)?, 1000.0, ContainerStatus::Ready)?,
///     Container::new(2, GeoPoint::new(11.53855, -72.91672)?, 1000.0, ContainerStatus::Ready)?,
/// ];
/// let request = BuildRequest {
///     route_id: 1,
///     truck_id: 21,
///     capacity: 2500.0,
///     origin: GeoPoint::new(11.5, -72.9)?,
/// };
///
/// let route = GreedyRouteBuilder::new(GreatCircleDistance).build(&request, &containers)?;
/// assert_eq!(route.container_ids(), vec![2, 1]);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct GreedyRouteBuilder<D> {
    estimator: D,
    config: PlannerConfig,
}

impl<D> GreedyRouteBuilder<D>
where
    D: DistanceEstimator,
{
    /// Construct a builder with default configuration.
    pub fn new(estimator: D) -> Self {
        Self::with_config(estimator, PlannerConfig::default())
    }

    /// Construct a builder with explicit configuration.
    pub const fn with_config(estimator: D, config: PlannerConfig) -> Self {
        Self { estimator, config }
    }

    /// Configuration in use.
    pub const fn config(&self) -> &PlannerConfig {
        &self.config
    }
}

impl<D> RouteBuilder for GreedyRouteBuilder<D>
where
    D: DistanceEstimator + Send + Sync,
{
    fn build(&self, request: &BuildRequest, containers: &[Container]) -> Result<Route, RouteError> {
        request.validate()?;
        let candidates = eligible_containers(containers)?;
        let mut route = Route::new(
            request.route_id,
            request.truck_id,
            request.origin,
            request.capacity,
        );
        let Some(smallest) = candidates.iter().copied().min_by(|a, b| {
            a.load()
                .total_cmp(&b.load())
                .then(a.id.cmp(&b.id))
        }) else {
            log::debug!("route {}: no collectable containers", request.route_id);
            return Ok(route);
        };

        let locations: Vec<GeoPoint> = std::iter::once(request.origin)
            .chain(candidates.iter().map(|container| container.location))
            .collect();
        let matrix = DistanceMatrix::new(&self.estimator, &locations)?;

        let mut order = nearest_neighbour(&matrix, &candidates, request.capacity);
        if order.is_empty() {
            // Capacity only shrinks, so nothing fitting at the start means nothing fits.
            return Err(RouteError::CapacityExceeded {
                container_id: smallest.id,
                required: smallest.load(),
                available: request.capacity,
            });
        }
        let stats = two_opt(&matrix, 0, &mut order, self.config.max_improvement_passes);

        let sequence = order
            .iter()
            .filter_map(|&index| index.checked_sub(1).and_then(|slot| candidates.get(slot)))
            .copied()
            .cloned()
            .collect();
        route.set_sequence(sequence, 0.0);
        route.recompute_distance(&self.estimator)?;

        log::debug!(
            "route {}: {} of {} containers, load {}/{}, distance {:.1}, 2-opt {} moves in {} passes",
            route.id(),
            route.points().len(),
            candidates.len(),
            route.load(),
            route.capacity(),
            route.total_distance(),
            stats.moves,
            stats.passes,
        );
        Ok(route)
    }
}

/// Collectable containers in input order, first occurrence of each id only.
fn eligible_containers(containers: &[Container]) -> Result<Vec<&Container>, RouteError> {
    let mut seen = BTreeSet::new();
    let mut eligible = Vec::new();
    for container in containers.iter().filter(|c| c.is_collectable()) {
        if !seen.insert(container.id) {
            log::debug!("ignoring duplicate container {}", container.id);
            continue;
        }
        container.location.validate()?;
        eligible.push(container);
    }
    Ok(eligible)
}

/// Greedy visiting order as matrix indices; index 0 is the origin.
///
/// Containers that do not fit the remaining capacity are skipped. Loads are
/// summed with [`LoadTally`] so the check agrees with [`Route::load`].
fn nearest_neighbour(
    matrix: &DistanceMatrix,
    candidates: &[&Container],
    capacity: f64,
) -> Vec<usize> {
    let mut visited = vec![false; candidates.len()];
    let mut order = Vec::with_capacity(candidates.len());
    let mut tally = LoadTally::default();
    let mut current = 0;

    loop {
        let mut best: Option<(usize, f64, u64)> = None;
        for (slot, container) in candidates.iter().enumerate() {
            let taken = visited.get(slot).copied().unwrap_or(true);
            if taken || tally.total_with(container.load()) > capacity {
                continue;
            }
            let index = slot + 1;
            let cost = matrix.cost(current, index);
            let closer = best.is_none_or(|(_, best_cost, best_id)| {
                cost.total_cmp(&best_cost).then(container.id.cmp(&best_id)) == Ordering::Less
            });
            if closer {
                best = Some((index, cost, container.id));
            }
        }
        let Some((index, _, _)) = best else {
            break;
        };
        if let Some(flag) = visited.get_mut(index - 1) {
            *flag = true;
        }
        if let Some(container) = candidates.get(index - 1) {
            tally.add(container.load());
        }
        order.push(index);
        current = index;
    }
    order
}
