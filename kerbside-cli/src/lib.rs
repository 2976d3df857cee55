//! Command-line interface for planning collection routes.
//!
//! Every subcommand works against a SQLite database resolved from
//! `--database`, `KERBSIDE_CMDS_<COMMAND>_DATABASE` or a configuration file,
//! and prints its result as JSON on stdout.
#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};

mod build;
mod containers;
mod database;
mod delete_container;
mod error;
mod fs;
mod import;
mod route;

pub use error::CliError;

use build::{BuildArgs, run_build};
use containers::{ContainersArgs, run_containers};
use delete_container::{DeleteContainerArgs, run_delete_container};
use import::{ImportArgs, run_import};
use route::{RouteArgs, run_route};

pub(crate) const ARG_DATABASE: &str = "database";
pub(crate) const ARG_IMPORT_SOURCE: &str = "containers";
pub(crate) const ARG_BUILD_REQUEST: &str = "request";
pub(crate) const ARG_MAX_IMPROVEMENT_PASSES: &str = "max-improvement-passes";
pub(crate) const ARG_STATUS: &str = "status";
pub(crate) const ARG_ROUTE_ID: &str = "route-id";
pub(crate) const ARG_ROUTE_ACTION: &str = "action";
pub(crate) const ARG_CONTAINER_ID: &str = "container-id";
pub(crate) const ARG_FROM_INDEX: &str = "from-index";

pub(crate) const ENV_IMPORT_DATABASE: &str = "KERBSIDE_CMDS_IMPORT_DATABASE";
pub(crate) const ENV_IMPORT_SOURCE: &str = "KERBSIDE_CMDS_IMPORT_CONTAINERS";
pub(crate) const ENV_CONTAINERS_DATABASE: &str = "KERBSIDE_CMDS_CONTAINERS_DATABASE";
pub(crate) const ENV_BUILD_DATABASE: &str = "KERBSIDE_CMDS_BUILD_DATABASE";
pub(crate) const ENV_BUILD_REQUEST: &str = "KERBSIDE_CMDS_BUILD_REQUEST";
pub(crate) const ENV_ROUTE_DATABASE: &str = "KERBSIDE_CMDS_ROUTE_DATABASE";
pub(crate) const ENV_ROUTE_ID: &str = "KERBSIDE_CMDS_ROUTE_ROUTE_ID";
pub(crate) const ENV_ROUTE_ACTION: &str = "KERBSIDE_CMDS_ROUTE_ACTION";
pub(crate) const ENV_CONTAINER_ID: &str = "KERBSIDE_CMDS_ROUTE_CONTAINER_ID";
pub(crate) const ENV_DELETE_CONTAINER_DATABASE: &str = "KERBSIDE_CMDS_DELETE_CONTAINER_DATABASE";
pub(crate) const ENV_DELETE_CONTAINER_ID: &str = "KERBSIDE_CMDS_DELETE_CONTAINER_CONTAINER_ID";

/// Run the Kerbside CLI with the current process arguments and environment.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    match cli.command {
        Command::Import(args) => run_import(args),
        Command::Containers(args) => run_containers(args),
        Command::DeleteContainer(args) => run_delete_container(args),
        Command::Build(args) => run_build(args),
        Command::Route(args) => run_route(args),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "kerbside",
    about = "Plan and edit waste-collection routes",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Insert or replace containers from a JSON file.
    Import(ImportArgs),
    /// List stored containers.
    Containers(ContainersArgs),
    /// Delete a container that no unfinished route holds.
    DeleteContainer(DeleteContainerArgs),
    /// Build a new route from the collectable containers.
    Build(BuildArgs),
    /// Show or edit a stored route.
    Route(RouteArgs),
}

#[cfg(test)]
mod tests;
