//! Facade crate for the Kerbside collection-route engine.
//!
//! This crate re-exports the core domain types and exposes the planner and
//! the SQLite store behind feature flags.

#![forbid(unsafe_code)]

pub use kerbside_core::{
    BuildRequest, BuildRequestError, Container, ContainerError, ContainerFilter, ContainerStatus,
    CoordinateError, DistanceError, DistanceEstimator, DistanceMatrix, GeoPoint,
    GreatCircleDistance, LoadTally, MemoryRepository, RepositoryError, Route, RouteBuilder, RouteError,
    RoutePoint, RouteRepository, RouteState,
};

#[cfg(feature = "store-sqlite")]
pub use kerbside_core::SqliteRepository;

#[cfg(feature = "planner")]
pub use kerbside_planner::{
    GreedyRouteBuilder, Insertion, PlannerConfig, RouteMutator, RouteService, ServiceError,
};
