//! Core domain types for the Kerbside collection-route engine.
//!
//! The crate models waste containers, the routes collection trucks drive
//! between them, and the seams the planner depends on: a pluggable
//! [`DistanceEstimator`], the [`RouteBuilder`] trait and the
//! [`RouteRepository`] persistence boundary.
//!
//! Constructors that accept external input return `Result` so invalid
//! coordinates or volumes surface before any route is planned.
//!
//! # Examples
//!
//! ```
//! use kerbside_core::{Container, ContainerStatus, GeoPoint, Route};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let location = GeoPoint::new(11.54752, -72.91351)?;
//! let container = Container::new(1, location, 1000.0, ContainerStatus::Ready)?;
//! assert!(container.is_collectable());
//!
//! let route = Route::new(7, 21, GeoPoint::new(11.5, -72.9)?, 2500.0);
//! assert!(route.points().is_empty());
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod builder;
mod container;
pub mod distance;
mod error;
mod geo_point;
mod route;
pub mod store;
#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-support")))]
pub mod test_support;

pub use builder::{BuildRequest, BuildRequestError, RouteBuilder};
pub use container::{Container, ContainerError, ContainerStatus, LoadTally, ParseStatusError};
pub use distance::{DistanceError, DistanceEstimator, DistanceMatrix, GreatCircleDistance};
pub use error::RouteError;
pub use geo_point::{CoordinateError, GeoPoint};
pub use route::{Route, RoutePoint, RouteState};
pub use store::{ContainerFilter, MemoryRepository, RepositoryError, RouteRepository};

#[cfg(feature = "store-sqlite")]
pub use store::SqliteRepository;
