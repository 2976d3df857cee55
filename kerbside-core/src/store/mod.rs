//! Persistence boundary for containers and routes.
//!
//! The [`RouteRepository`] trait is what a service layer loads containers
//! from and saves planned routes to. Planning itself never touches storage.
//! [`MemoryRepository`] keeps everything in process; [`SqliteRepository`]
//! (behind the `store-sqlite` feature) persists to a SQLite file.

use std::collections::BTreeSet;

use thiserror::Error;

use crate::{Container, ContainerStatus, Route};

mod memory;
#[cfg(feature = "store-sqlite")]
mod sqlite;

pub use memory::MemoryRepository;
#[cfg(feature = "store-sqlite")]
pub use sqlite::SqliteRepository;

/// Selects which containers [`RouteRepository::load_containers`] returns.
///
/// An unset field matches everything.
///
/// # Examples
/// ```
/// use kerbside_core::{ContainerFilter, ContainerStatus};
///
/// let filter = ContainerFilter::collectable();
/// assert!(filter.matches_status(ContainerStatus::Filled));
/// assert!(!filter.matches_status(ContainerStatus::Filling));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContainerFilter {
    /// Statuses to include.
    pub statuses: Option<BTreeSet<ContainerStatus>>,
    /// Container identifiers to include.
    pub ids: Option<BTreeSet<u64>>,
}

impl ContainerFilter {
    /// Match every container.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Match containers worth collecting (`ready` or `filled`).
    #[must_use]
    pub fn collectable() -> Self {
        Self::with_statuses(
            ContainerStatus::ALL
                .into_iter()
                .filter(|status| status.is_collectable()),
        )
    }

    /// Match containers in any of `statuses`.
    #[must_use]
    pub fn with_statuses<I>(statuses: I) -> Self
    where
        I: IntoIterator<Item = ContainerStatus>,
    {
        Self {
            statuses: Some(statuses.into_iter().collect()),
            ids: None,
        }
    }

    /// Restrict the filter to `ids`.
    #[must_use]
    pub fn and_ids<I>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = u64>,
    {
        self.ids = Some(ids.into_iter().collect());
        self
    }

    /// Return `true` when `status` passes the filter.
    #[must_use]
    pub fn matches_status(&self, status: ContainerStatus) -> bool {
        self.statuses
            .as_ref()
            .is_none_or(|statuses| statuses.contains(&status))
    }

    /// Return `true` when `container` passes the filter.
    #[must_use]
    pub fn matches(&self, container: &Container) -> bool {
        self.matches_status(container.status)
            && self
                .ids
                .as_ref()
                .is_none_or(|ids| ids.contains(&container.id))
    }
}

/// Errors raised by repository implementations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// No container with this identifier is stored.
    #[error("container {container_id} does not exist")]
    ContainerNotFound {
        /// Requested container.
        container_id: u64,
    },
    /// No route with this identifier is stored.
    #[error("route {route_id} does not exist")]
    RouteNotFound {
        /// Requested route.
        route_id: u64,
    },
    /// A lock guarding repository state was poisoned by a panicking writer.
    #[error("repository lock poisoned")]
    Poisoned,
    /// Opening the SQLite database failed.
    #[cfg(feature = "store-sqlite")]
    #[error("failed to open SQLite database at {path}: {source}")]
    OpenDatabase {
        /// Location of the database on disk.
        path: std::path::PathBuf,
        /// Source error returned by `rusqlite`.
        #[source]
        source: rusqlite::Error,
    },
    /// A SQLite statement failed.
    #[cfg(feature = "store-sqlite")]
    #[error("failed to {operation}: {source}")]
    Query {
        /// Description of the failed operation.
        operation: &'static str,
        /// Source error returned by `rusqlite`.
        #[source]
        source: rusqlite::Error,
    },
    /// A stored status was not recognised.
    #[error("container {container_id} has unknown status '{raw}'")]
    InvalidStatus {
        /// Affected container.
        container_id: u64,
        /// Raw stored value.
        raw: String,
    },
    /// A stored route payload could not be encoded or decoded.
    #[cfg(feature = "serde")]
    #[error("failed to encode or decode route {route_id}: {source}")]
    RoutePayload {
        /// Affected route.
        route_id: u64,
        /// JSON error.
        #[source]
        source: serde_json::Error,
    },
}

/// Load and persist containers and routes.
///
/// Implementations serialise their own internal state, so a repository can
/// be shared across threads. They do not serialise *operations* on a route:
/// callers that read, modify and save a route must hold a per-route lock.
///
/// # Examples
///
/// ```rust
/// use kerbside_core::{
///     Container, ContainerFilter, ContainerStatus, GeoPoint, MemoryRepository, RouteRepository,
/// };
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let repository = MemoryRepository::default();
/// let location = GeoPoint::new(11.54752, -72.91351)?;
/// repository.save_container(&Container::new(1, location, 1000.0, ContainerStatus::Ready)?)?;
/// repository.save_container(&Container::new(2, location, 1000.0, ContainerStatus::Empty)?)?;
///
/// let pending = repository.load_containers(&ContainerFilter::collectable())?;
/// assert_eq!(pending.len(), 1);
/// # Ok(())
/// # }
/// ```
pub trait RouteRepository: Send + Sync {
    /// Return containers passing `filter`, ordered by id.
    fn load_containers(&self, filter: &ContainerFilter) -> Result<Vec<Container>, RepositoryError>;

    /// Return a single container.
    fn load_container(&self, container_id: u64) -> Result<Container, RepositoryError>;

    /// Insert or replace a container.
    fn save_container(&self, container: &Container) -> Result<(), RepositoryError>;

    /// Delete a container.
    ///
    /// Fails with [`RepositoryError::ContainerNotFound`] when it is absent.
    fn delete_container(&self, container_id: u64) -> Result<(), RepositoryError>;

    /// Return a single route.
    fn load_route(&self, route_id: u64) -> Result<Route, RepositoryError>;

    /// Return every stored route, ordered by id.
    fn load_routes(&self) -> Result<Vec<Route>, RepositoryError>;

    /// Insert or replace a route.
    fn save_route(&self, route: &Route) -> Result<(), RepositoryError>;

    /// Delete a route.
    ///
    /// Fails with [`RepositoryError::RouteNotFound`] when it is absent.
    fn delete_route(&self, route_id: u64) -> Result<(), RepositoryError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::container_at;
    use rstest::rstest;

    #[rstest]
    fn default_filter_matches_everything() {
        let mut container = container_at(1, 0.0, 0.0, 10.0);
        container.status = ContainerStatus::Empty;
        assert!(ContainerFilter::all().matches(&container));
    }

    #[rstest]
    #[case(ContainerStatus::Empty, false)]
    #[case(ContainerStatus::Filling, false)]
    #[case(ContainerStatus::Ready, true)]
    #[case(ContainerStatus::Filled, true)]
    fn collectable_filter_matches_ready_and_filled(
        #[case] status: ContainerStatus,
        #[case] expected: bool,
    ) {
        let mut container = container_at(1, 0.0, 0.0, 10.0);
        container.status = status;
        assert_eq!(ContainerFilter::collectable().matches(&container), expected);
    }

    #[rstest]
    fn id_filter_narrows_matches() {
        let filter = ContainerFilter::all().and_ids([2, 3]);
        assert!(!filter.matches(&container_at(1, 0.0, 0.0, 10.0)));
        assert!(filter.matches(&container_at(2, 0.0, 0.0, 10.0)));
    }
}
