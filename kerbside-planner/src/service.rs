//! Repository-backed orchestration of route planning.
//!
//! [`RouteService`] loads containers and routes from a [`RouteRepository`],
//! hands them to the builder or mutator and saves the result. Operations on
//! the same route are serialised with a per-route lock; operations that
//! assign containers also take a shared assignment lock so two routes never
//! claim the same container.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use kerbside_core::{
    BuildRequest, ContainerFilter, DistanceEstimator, RepositoryError, Route, RouteBuilder,
    RouteError, RouteRepository,
};
use thiserror::Error;

use crate::{GreedyRouteBuilder, PlannerConfig, RouteMutator};

/// Errors returned by [`RouteService`].
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Planning rejected the operation.
    #[error(transparent)]
    Route(#[from] RouteError),
    /// Loading or saving failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    /// A route with this id already exists.
    #[error("route {route_id} already exists")]
    RouteExists {
        /// Conflicting route.
        route_id: u64,
    },
    /// The container is already on another route that is still in progress.
    #[error("container {container_id} is already assigned to route {route_id}")]
    ContainerAssigned {
        /// Requested container.
        container_id: u64,
        /// Route currently holding it.
        route_id: u64,
    },
    /// A lock was poisoned by a panicking operation.
    #[error("route lock poisoned")]
    Poisoned,
}

/// Plans and edits routes stored in a repository.
///
/// # Examples
/// ```
/// use kerbside_core::{
///     BuildRequest, Container, ContainerStatus, GeoPoint, GreatCircleDistance, MemoryRepository,
/// };
/// use kerbside_planner::RouteService;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let repository = MemoryRepository::with_containers([
///     Container::new(1, GeoPoint::new(11.54752, -72.91351)?, 1000.0, ContainerStatus::Ready)?,
///     Container::new(2, GeoPoint::new(11.53855, -72.91672)?, 1000.0, ContainerStatus::Filled)?,
/// ]);
/// let service = RouteService::new(repository, GreatCircleDistance);
/// let request = BuildRequest {
///     route_id: 1,
///     truck_id: 21,
///     capacity: 2500.0,
///     origin: GeoPoint::new(11.5, -72.9)?,
/// };
///
/// let route = service.build_route(&request)?;
/// assert_eq!(route.container_ids(), vec![2, 1]);
/// assert_eq!(service.route(1)?, route);
/// # Ok(())
/// # }
/// ```
pub struct RouteService<R, D> {
    repository: R,
    builder: GreedyRouteBuilder<D>,
    mutator: RouteMutator<D>,
    route_locks: Mutex<BTreeMap<u64, Arc<Mutex<()>>>>,
    assignment: Mutex<()>,
}

impl<R, D> RouteService<R, D>
where
    R: RouteRepository,
    D: DistanceEstimator + Clone + Send + Sync,
{
    /// Construct a service with default planner configuration.
    pub fn new(repository: R, estimator: D) -> Self {
        Self::with_config(repository, estimator, PlannerConfig::default())
    }

    /// Construct a service with explicit planner configuration.
    pub fn with_config(repository: R, estimator: D, config: PlannerConfig) -> Self {
        Self {
            repository,
            builder: GreedyRouteBuilder::with_config(estimator.clone(), config),
            mutator: RouteMutator::with_config(estimator, config),
            route_locks: Mutex::new(BTreeMap::new()),
            assignment: Mutex::new(()),
        }
    }

    /// Underlying repository.
    pub const fn repository(&self) -> &R {
        &self.repository
    }

    /// Build and save a new route from the collectable containers not
    /// already held by another unfinished route.
    ///
    /// # Errors
    ///
    /// [`ServiceError::RouteExists`] when the id is taken; otherwise the
    /// builder's or repository's error.
    pub fn build_route(&self, request: &BuildRequest) -> Result<Route, ServiceError> {
        let lock = self.route_lock(request.route_id)?;
        let _route_guard = acquire(&lock)?;
        let _assignment_guard = acquire(&self.assignment)?;

        match self.repository.load_route(request.route_id) {
            Ok(_) => {
                return Err(ServiceError::RouteExists {
                    route_id: request.route_id,
                });
            }
            Err(RepositoryError::RouteNotFound { .. }) => {}
            Err(err) => return Err(err.into()),
        }

        let assigned = self.assigned_containers(None)?;
        let containers: Vec<_> = self
            .repository
            .load_containers(&ContainerFilter::collectable())?
            .into_iter()
            .filter(|container| !assigned.contains_key(&container.id))
            .collect();
        let route = self.builder.build(request, &containers)?;
        self.repository.save_route(&route)?;
        log::debug!(
            "saved route {} with {} containers",
            route.id(),
            route.points().len()
        );
        Ok(route)
    }

    /// Insert a stored container into a route at its cheapest position.
    ///
    /// # Errors
    ///
    /// [`ServiceError::ContainerAssigned`] when another unfinished route holds
    /// the container; otherwise the mutator's or repository's error.
    pub fn append_container(&self, route_id: u64, container_id: u64) -> Result<Route, ServiceError> {
        let lock = self.route_lock(route_id)?;
        let _route_guard = acquire(&lock)?;
        let _assignment_guard = acquire(&self.assignment)?;

        let mut route = self.repository.load_route(route_id)?;
        route.ensure_mutable()?;
        if let Some(&holder) = self.assigned_containers(Some(route_id))?.get(&container_id) {
            return Err(ServiceError::ContainerAssigned {
                container_id,
                route_id: holder,
            });
        }
        let container = self.repository.load_container(container_id)?;
        self.mutator.append(&mut route, container)?;
        self.repository.save_route(&route)?;
        Ok(route)
    }

    /// Remove a container from a route.
    ///
    /// # Errors
    ///
    /// The mutator's or repository's error.
    pub fn remove_container(&self, route_id: u64, container_id: u64) -> Result<Route, ServiceError> {
        self.update(route_id, |route| {
            self.mutator.remove(route, container_id).map(|_| ())
        })
    }

    /// Re-run 2-opt on a route from `from_index` onwards.
    ///
    /// # Errors
    ///
    /// The mutator's or repository's error.
    pub fn reoptimize_route(&self, route_id: u64, from_index: usize) -> Result<Route, ServiceError> {
        self.update(route_id, |route| {
            self.mutator.reoptimize(route, from_index).map(|_| ())
        })
    }

    /// Mark a route complete.
    ///
    /// # Errors
    ///
    /// The repository's error.
    pub fn finalize_route(&self, route_id: u64) -> Result<Route, ServiceError> {
        self.update(route_id, |route| {
            route.finalize();
            Ok(())
        })
    }

    /// Delete a route, releasing its containers.
    ///
    /// The route's lock entry is dropped afterwards unless another caller is
    /// waiting on it.
    ///
    /// # Errors
    ///
    /// The repository's error.
    pub fn delete_route(&self, route_id: u64) -> Result<(), ServiceError> {
        let lock = self.route_lock(route_id)?;
        let outcome = {
            let _route_guard = acquire(&lock)?;
            self.repository.delete_route(route_id)
        };
        self.release_route_lock(route_id, &lock)?;
        Ok(outcome?)
    }

    /// Delete a stored container.
    ///
    /// # Errors
    ///
    /// [`ServiceError::ContainerAssigned`] when an unfinished route holds the
    /// container; otherwise the repository's error.
    pub fn delete_container(&self, container_id: u64) -> Result<(), ServiceError> {
        let _assignment_guard = acquire(&self.assignment)?;
        if let Some(&holder) = self.assigned_containers(None)?.get(&container_id) {
            return Err(ServiceError::ContainerAssigned {
                container_id,
                route_id: holder,
            });
        }
        self.repository.delete_container(container_id)?;
        log::debug!("deleted container {container_id}");
        Ok(())
    }

    /// Load a single route.
    ///
    /// # Errors
    ///
    /// The repository's error.
    pub fn route(&self, route_id: u64) -> Result<Route, ServiceError> {
        Ok(self.repository.load_route(route_id)?)
    }

    /// Load every stored route.
    ///
    /// # Errors
    ///
    /// The repository's error.
    pub fn routes(&self) -> Result<Vec<Route>, ServiceError> {
        Ok(self.repository.load_routes()?)
    }

    fn update<F>(&self, route_id: u64, edit: F) -> Result<Route, ServiceError>
    where
        F: FnOnce(&mut Route) -> Result<(), RouteError>,
    {
        let lock = self.route_lock(route_id)?;
        let _route_guard = acquire(&lock)?;
        let mut route = self.repository.load_route(route_id)?;
        edit(&mut route)?;
        self.repository.save_route(&route)?;
        Ok(route)
    }

    /// Container ids held by unfinished routes, mapped to the holding route.
    fn assigned_containers(&self, except: Option<u64>) -> Result<BTreeMap<u64, u64>, ServiceError> {
        let mut assigned = BTreeMap::new();
        for route in self.repository.load_routes()? {
            if route.is_finalized() || Some(route.id()) == except {
                continue;
            }
            let holder = route.id();
            for container in route.containers() {
                assigned.entry(container.id).or_insert(holder);
            }
        }
        Ok(assigned)
    }

    fn route_lock(&self, route_id: u64) -> Result<Arc<Mutex<()>>, ServiceError> {
        let mut locks = acquire(&self.route_locks)?;
        Ok(Arc::clone(locks.entry(route_id).or_default()))
    }

    /// Forget `lock` when the map and the caller hold the only references.
    fn release_route_lock(&self, route_id: u64, lock: &Arc<Mutex<()>>) -> Result<(), ServiceError> {
        let mut locks = acquire(&self.route_locks)?;
        if Arc::strong_count(lock) == 2 {
            locks.remove(&route_id);
        }
        Ok(())
    }
}

fn acquire<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, ServiceError> {
    mutex.lock().map_err(|_| ServiceError::Poisoned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{request, scenario_containers};
    use kerbside_core::test_support::container_at;
    use kerbside_core::{GreatCircleDistance, MemoryRepository, RouteState};
    use rstest::{fixture, rstest};
    use std::collections::BTreeSet;
    use std::thread;

    type Service = RouteService<MemoryRepository, GreatCircleDistance>;

    #[fixture]
    fn service() -> Service {
        let mut extra = scenario_containers();
        extra.push(container_at(3, 11.52, -72.905, 400.0));
        RouteService::new(MemoryRepository::with_containers(extra), GreatCircleDistance)
    }

    fn request_for(route_id: u64, capacity: f64) -> BuildRequest {
        BuildRequest {
            route_id,
            ..request(capacity)
        }
    }

    #[rstest]
    fn build_saves_the_route(service: Service) {
        let route = service.build_route(&request_for(1, 2500.0)).expect("build");
        assert_eq!(route.points().len(), 3);
        assert_eq!(service.route(1).expect("stored"), route);
    }

    #[rstest]
    fn duplicate_route_ids_are_rejected(service: Service) {
        service.build_route(&request_for(1, 2500.0)).expect("build");
        let err = service
            .build_route(&request_for(1, 2500.0))
            .expect_err("id taken");
        assert!(matches!(err, ServiceError::RouteExists { route_id: 1 }));
    }

    #[rstest]
    fn containers_on_unfinished_routes_are_not_reused(service: Service) {
        service.build_route(&request_for(1, 2500.0)).expect("build");
        let second = service.build_route(&request_for(2, 2500.0)).expect("build");
        assert!(second.points().is_empty());
    }

    #[rstest]
    fn finalised_routes_release_their_containers(service: Service) {
        service.build_route(&request_for(1, 2500.0)).expect("build");
        service.finalize_route(1).expect("finalize");
        let second = service.build_route(&request_for(2, 2500.0)).expect("build");
        assert_eq!(second.points().len(), 3);
    }

    #[rstest]
    fn appending_a_container_held_elsewhere_fails(service: Service) {
        service.build_route(&request_for(1, 1000.0)).expect("build");
        let held = service.route(1).expect("stored").container_ids();
        service.build_route(&request_for(2, 2500.0)).expect("build");
        let container_id = *held.first().expect("route 1 holds a container");
        let err = service
            .append_container(2, container_id)
            .expect_err("held by route 1");
        assert!(matches!(
            err,
            ServiceError::ContainerAssigned { route_id: 1, .. }
        ));
    }

    #[rstest]
    fn edits_flow_through_the_repository(service: Service) {
        service.build_route(&request_for(1, 1000.0)).expect("build");
        let start = service.route(1).expect("stored");
        let free = [1, 2, 3]
            .into_iter()
            .find(|id| !start.contains(*id))
            .expect("a container is left over");

        let first = start
            .container_ids()
            .first()
            .copied()
            .expect("route 1 is not empty");
        let extended = service
            .remove_container(1, first)
            .and_then(|_| service.append_container(1, free))
            .expect("edits succeed");
        assert!(extended.contains(free));
        service.reoptimize_route(1, 0).expect("reoptimize");
        let finalized = service.finalize_route(1).expect("finalize");
        assert_eq!(finalized.state(), RouteState::Finalized);
        assert!(matches!(
            service.remove_container(1, free),
            Err(ServiceError::Route(RouteError::RouteFinalized { route_id: 1 }))
        ));
    }

    #[rstest]
    fn deleting_a_route_removes_it(service: Service) {
        service.build_route(&request_for(1, 2500.0)).expect("build");
        service.delete_route(1).expect("delete");
        assert!(matches!(
            service.route(1),
            Err(ServiceError::Repository(RepositoryError::RouteNotFound { route_id: 1 }))
        ));
        assert!(service.routes().expect("list").is_empty());
    }

    fn tracks_lock_for(service: &Service, route_id: u64) -> bool {
        service
            .route_locks
            .lock()
            .expect("lock map")
            .contains_key(&route_id)
    }

    #[rstest]
    fn deleting_a_route_forgets_its_lock(service: Service) {
        service.build_route(&request_for(1, 2500.0)).expect("build");
        assert!(tracks_lock_for(&service, 1));
        service.delete_route(1).expect("delete");
        assert!(!tracks_lock_for(&service, 1));
    }

    #[rstest]
    fn deleting_a_missing_route_leaves_no_lock_behind(service: Service) {
        let err = service.delete_route(7).expect_err("no such route");
        assert!(matches!(
            err,
            ServiceError::Repository(RepositoryError::RouteNotFound { route_id: 7 })
        ));
        assert!(!tracks_lock_for(&service, 7));
    }

    #[rstest]
    fn build_and_delete_cycles_keep_the_lock_map_empty(service: Service) {
        for route_id in 1..=5 {
            service
                .build_route(&request_for(route_id, 2500.0))
                .expect("build");
            service.delete_route(route_id).expect("delete");
        }
        assert!(service.route_locks.lock().expect("lock map").is_empty());
    }

    #[rstest]
    fn free_containers_can_be_deleted(service: Service) {
        service.delete_container(3).expect("delete");
        assert!(matches!(
            service.repository().load_container(3),
            Err(RepositoryError::ContainerNotFound { container_id: 3 })
        ));
    }

    #[rstest]
    fn containers_on_unfinished_routes_cannot_be_deleted(service: Service) {
        let route = service.build_route(&request_for(1, 2500.0)).expect("build");
        let held = *route.container_ids().first().expect("route holds a container");
        let err = service.delete_container(held).expect_err("held by route 1");
        assert!(matches!(
            err,
            ServiceError::ContainerAssigned { route_id: 1, container_id } if container_id == held
        ));
        assert!(service.repository().load_container(held).is_ok());
    }

    #[rstest]
    fn containers_on_finalised_routes_can_be_deleted(service: Service) {
        let route = service.build_route(&request_for(1, 2500.0)).expect("build");
        service.finalize_route(1).expect("finalize");
        let held = *route.container_ids().first().expect("route holds a container");
        service.delete_container(held).expect("delete");
        assert!(service.route(1).expect("route kept").contains(held));
    }

    #[rstest]
    fn deleting_an_unknown_container_fails(service: Service) {
        assert!(matches!(
            service.delete_container(42),
            Err(ServiceError::Repository(RepositoryError::ContainerNotFound {
                container_id: 42
            }))
        ));
    }

    #[rstest]
    fn concurrent_builds_never_share_containers(service: Service) {
        thread::scope(|scope| {
            for route_id in 1..=4 {
                let shared = &service;
                scope.spawn(move || {
                    shared
                        .build_route(&request_for(route_id, 2500.0))
                        .expect("build");
                });
            }
        });
        let mut seen = BTreeSet::new();
        for route in service.routes().expect("list") {
            for id in route.container_ids() {
                assert!(seen.insert(id), "container {id} planned twice");
            }
        }
        assert_eq!(seen.len(), 3);
    }
}
