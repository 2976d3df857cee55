//! In-process repository backed by ordered maps.

use std::collections::BTreeMap;
use std::sync::RwLock;

use crate::{Container, Route};

use super::{ContainerFilter, RepositoryError, RouteRepository};

/// Repository keeping containers and routes in memory.
///
/// Suitable for tests and for embedding the planner in a process that owns
/// its own persistence.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    containers: RwLock<BTreeMap<u64, Container>>,
    routes: RwLock<BTreeMap<u64, Route>>,
}

impl MemoryRepository {
    /// Create a repository pre-populated with `containers`.
    ///
    /// Later entries replace earlier ones with the same id.
    pub fn with_containers<I>(containers: I) -> Self
    where
        I: IntoIterator<Item = Container>,
    {
        Self {
            containers: RwLock::new(
                containers
                    .into_iter()
                    .map(|container| (container.id, container))
                    .collect(),
            ),
            routes: RwLock::default(),
        }
    }
}

impl RouteRepository for MemoryRepository {
    fn load_containers(&self, filter: &ContainerFilter) -> Result<Vec<Container>, RepositoryError> {
        let containers = self
            .containers
            .read()
            .map_err(|_| RepositoryError::Poisoned)?;
        Ok(containers
            .values()
            .filter(|container| filter.matches(container))
            .cloned()
            .collect())
    }

    fn load_container(&self, container_id: u64) -> Result<Container, RepositoryError> {
        let containers = self
            .containers
            .read()
            .map_err(|_| RepositoryError::Poisoned)?;
        containers
            .get(&container_id)
            .cloned()
            .ok_or(RepositoryError::ContainerNotFound { container_id })
    }

    fn save_container(&self, container: &Container) -> Result<(), RepositoryError> {
        let mut containers = self
            .containers
            .write()
            .map_err(|_| RepositoryError::Poisoned)?;
        containers.insert(container.id, container.clone());
        Ok(())
    }

    fn delete_container(&self, container_id: u64) -> Result<(), RepositoryError> {
        let mut containers = self
            .containers
            .write()
            .map_err(|_| RepositoryError::Poisoned)?;
        containers
            .remove(&container_id)
            .map(|_| ())
            .ok_or(RepositoryError::ContainerNotFound { container_id })
    }

    fn load_route(&self, route_id: u64) -> Result<Route, RepositoryError> {
        let routes = self.routes.read().map_err(|_| RepositoryError::Poisoned)?;
        routes
            .get(&route_id)
            .cloned()
            .ok_or(RepositoryError::RouteNotFound { route_id })
    }

    fn load_routes(&self) -> Result<Vec<Route>, RepositoryError> {
        let routes = self.routes.read().map_err(|_| RepositoryError::Poisoned)?;
        Ok(routes.values().cloned().collect())
    }

    fn save_route(&self, route: &Route) -> Result<(), RepositoryError> {
        let mut routes = self.routes.write().map_err(|_| RepositoryError::Poisoned)?;
        routes.insert(route.id(), route.clone());
        Ok(())
    }

    fn delete_route(&self, route_id: u64) -> Result<(), RepositoryError> {
        let mut routes = self.routes.write().map_err(|_| RepositoryError::Poisoned)?;
        routes
            .remove(&route_id)
            .map(|_| ())
            .ok_or(RepositoryError::RouteNotFound { route_id })
    }
}
