//! Estimate travel cost between geographic points.
//!
//! The [`DistanceEstimator`] trait abstracts the cost of driving from one
//! [`GeoPoint`](crate::GeoPoint) to another. [`GreatCircleDistance`] is the
//! default, measuring haversine distance in metres; a road-network model can
//! be substituted without touching the planner.
//!
//! [`DistanceMatrix`] evaluates an estimator once for every pair of points so
//! route heuristics can work over indices without re-checking coordinates.

mod error;
mod estimator;
mod matrix;

pub use error::DistanceError;
pub use estimator::{DistanceEstimator, GreatCircleDistance};
pub use matrix::DistanceMatrix;
