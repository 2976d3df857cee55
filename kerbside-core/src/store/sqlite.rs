//! SQLite-backed repository for containers and routes.
//!
//! Containers are stored as plain columns so other tools can query them.
//! Routes are stored as a JSON payload keyed by id; the route owns snapshots
//! of its containers, so the payload is self-contained.

use std::fmt;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::{Connection, OptionalExtension, Row, params};

use crate::{Container, ContainerStatus, GeoPoint, Route};

use super::{ContainerFilter, RepositoryError, RouteRepository};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS containers (
    id INTEGER PRIMARY KEY,
    latitude REAL NOT NULL,
    longitude REAL NOT NULL,
    volume REAL NOT NULL,
    status TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS routes (
    id INTEGER PRIMARY KEY,
    payload TEXT NOT NULL
);
";

/// Repository persisting containers and routes in SQLite.
///
/// The connection sits behind a mutex so the repository is `Sync`.
pub struct SqliteRepository {
    connection: Mutex<Connection>,
}

impl fmt::Debug for SqliteRepository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteRepository").finish_non_exhaustive()
    }
}

impl SqliteRepository {
    /// Open (or create) the database at `path` and ensure the schema exists.
    pub fn open<P>(path: P) -> Result<Self, RepositoryError>
    where
        P: AsRef<Path>,
    {
        let location = path.as_ref();
        let connection =
            Connection::open(location).map_err(|source| RepositoryError::OpenDatabase {
                path: location.to_path_buf(),
                source,
            })?;
        Self::with_connection(connection)
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> Result<Self, RepositoryError> {
        let connection =
            Connection::open_in_memory().map_err(|source| RepositoryError::Query {
                operation: "open in-memory database",
                source,
            })?;
        Self::with_connection(connection)
    }

    fn with_connection(connection: Connection) -> Result<Self, RepositoryError> {
        connection
            .execute_batch(SCHEMA)
            .map_err(|source| RepositoryError::Query {
                operation: "create schema",
                source,
            })?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    fn connection(&self) -> Result<MutexGuard<'_, Connection>, RepositoryError> {
        self.connection.lock().map_err(|_| RepositoryError::Poisoned)
    }
}

struct ContainerRow {
    id: u64,
    latitude: f64,
    longitude: f64,
    volume: f64,
    status: String,
}

impl ContainerRow {
    fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            latitude: row.get(1)?,
            longitude: row.get(2)?,
            volume: row.get(3)?,
            status: row.get(4)?,
        })
    }

    fn into_container(self) -> Result<Container, RepositoryError> {
        let status = self
            .status
            .parse::<ContainerStatus>()
            .map_err(|_| RepositoryError::InvalidStatus {
                container_id: self.id,
                raw: self.status.clone(),
            })?;
        Ok(Container {
            id: self.id,
            location: GeoPoint {
                latitude: self.latitude,
                longitude: self.longitude,
            },
            volume: self.volume,
            status,
        })
    }
}

fn decode_route(route_id: u64, payload: &str) -> Result<Route, RepositoryError> {
    serde_json::from_str(payload)
        .map_err(|source| RepositoryError::RoutePayload { route_id, source })
}

impl RouteRepository for SqliteRepository {
    fn load_containers(&self, filter: &ContainerFilter) -> Result<Vec<Container>, RepositoryError> {
        let connection = self.connection()?;
        let query_error = |source| RepositoryError::Query {
            operation: "load containers",
            source,
        };
        let mut statement = connection
            .prepare("SELECT id, latitude, longitude, volume, status FROM containers ORDER BY id")
            .map_err(query_error)?;
        let rows = statement
            .query_map([], ContainerRow::read)
            .map_err(query_error)?;

        let mut containers = Vec::new();
        for row in rows {
            let container = row.map_err(query_error)?.into_container()?;
            if filter.matches(&container) {
                containers.push(container);
            }
        }
        Ok(containers)
    }

    fn load_container(&self, container_id: u64) -> Result<Container, RepositoryError> {
        let connection = self.connection()?;
        connection
            .query_row(
                "SELECT id, latitude, longitude, volume, status FROM containers WHERE id = ?1",
                params![container_id],
                ContainerRow::read,
            )
            .optional()
            .map_err(|source| RepositoryError::Query {
                operation: "load container",
                source,
            })?
            .ok_or(RepositoryError::ContainerNotFound { container_id })?
            .into_container()
    }

    fn save_container(&self, container: &Container) -> Result<(), RepositoryError> {
        let connection = self.connection()?;
        connection
            .execute(
                "INSERT OR REPLACE INTO containers (id, latitude, longitude, volume, status)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    container.id,
                    container.location.latitude,
                    container.location.longitude,
                    container.volume,
                    container.status.as_str(),
                ],
            )
            .map_err(|source| RepositoryError::Query {
                operation: "save container",
                source,
            })?;
        Ok(())
    }

    fn delete_container(&self, container_id: u64) -> Result<(), RepositoryError> {
        let connection = self.connection()?;
        let deleted = connection
            .execute("DELETE FROM containers WHERE id = ?1", params![container_id])
            .map_err(|source| RepositoryError::Query {
                operation: "delete container",
                source,
            })?;
        if deleted == 0 {
            return Err(RepositoryError::ContainerNotFound { container_id });
        }
        Ok(())
    }

    fn load_route(&self, route_id: u64) -> Result<Route, RepositoryError> {
        let connection = self.connection()?;
        let payload: String = connection
            .query_row(
                "SELECT payload FROM routes WHERE id = ?1",
                params![route_id],
                |row| row.get(0),
            )
            .optional()
            .map_err(|source| RepositoryError::Query {
                operation: "load route",
                source,
            })?
            .ok_or(RepositoryError::RouteNotFound { route_id })?;
        decode_route(route_id, &payload)
    }

    fn load_routes(&self) -> Result<Vec<Route>, RepositoryError> {
        let connection = self.connection()?;
        let query_error = |source| RepositoryError::Query {
            operation: "load routes",
            source,
        };
        let mut statement = connection
            .prepare("SELECT id, payload FROM routes ORDER BY id")
            .map_err(query_error)?;
        let rows = statement
            .query_map([], |row| Ok((row.get::<_, u64>(0)?, row.get::<_, String>(1)?)))
            .map_err(query_error)?;

        let mut routes = Vec::new();
        for row in rows {
            let (route_id, payload) = row.map_err(query_error)?;
            routes.push(decode_route(route_id, &payload)?);
        }
        Ok(routes)
    }

    fn save_route(&self, route: &Route) -> Result<(), RepositoryError> {
        let route_id = route.id();
        let payload = serde_json::to_string(route)
            .map_err(|source| RepositoryError::RoutePayload { route_id, source })?;
        let connection = self.connection()?;
        connection
            .execute(
                "INSERT OR REPLACE INTO routes (id, payload) VALUES (?1, ?2)",
                params![route_id, payload],
            )
            .map_err(|source| RepositoryError::Query {
                operation: "save route",
                source,
            })?;
        Ok(())
    }

    fn delete_route(&self, route_id: u64) -> Result<(), RepositoryError> {
        let connection = self.connection()?;
        let deleted = connection
            .execute("DELETE FROM routes WHERE id = ?1", params![route_id])
            .map_err(|source| RepositoryError::Query {
                operation: "delete route",
                source,
            })?;
        if deleted == 0 {
            return Err(RepositoryError::RouteNotFound { route_id });
        }
        Ok(())
    }
}
