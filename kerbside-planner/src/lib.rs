//! Route construction and sequencing for Kerbside.
//!
//! [`GreedyRouteBuilder`] is the default [`RouteBuilder`](kerbside_core::RouteBuilder):
//! nearest-neighbour construction under a capacity ceiling followed by a
//! bounded 2-opt pass over the open path. [`RouteMutator`] edits existing
//! routes with cheapest insertion, removal and suffix re-optimisation.
//! [`RouteService`] ties both to a [`RouteRepository`](kerbside_core::RouteRepository)
//! and serialises work per route.
//!
//! Planning is synchronous and pure: no I/O happens outside the service, and
//! identical inputs always produce identical routes.

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod builder;
mod config;
mod local_search;
mod mutator;
mod service;
#[cfg(test)]
mod test_support;

pub use builder::GreedyRouteBuilder;
pub use config::{DEFAULT_MAX_IMPROVEMENT_PASSES, PlannerConfig};
pub use mutator::{Insertion, RouteMutator};
pub use service::{RouteService, ServiceError};
