//! `route` command: show, edit, finalise or delete a stored route.

use std::io::Write;

use camino::Utf8PathBuf;
use clap::{Parser, ValueEnum};
use kerbside_core::{GreatCircleDistance, Route};
use kerbside_planner::RouteService;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::database::{open_existing, write_json};
use crate::{
    ARG_CONTAINER_ID, ARG_DATABASE, ARG_FROM_INDEX, ARG_ROUTE_ACTION, ARG_ROUTE_ID, CliError,
    ENV_CONTAINER_ID, ENV_ROUTE_ACTION, ENV_ROUTE_DATABASE, ENV_ROUTE_ID,
};

/// What to do with the route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum RouteAction {
    /// Print the route.
    Show,
    /// Insert a container at its cheapest position.
    Append,
    /// Remove a container and close the gap.
    Remove,
    /// Re-run 2-opt over the route from an index onwards.
    Reoptimize,
    /// Freeze the route against further edits.
    Finalize,
    /// Delete the route.
    Delete,
}

/// CLI arguments for the `route` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Operate on a stored route. `append` and `remove` need \
                 --container-id; `reoptimize` accepts --from-index to keep \
                 the points before it in place. Every action except \
                 `delete` prints the resulting route as JSON.",
    about = "Show or edit a route"
)]
#[ortho_config(prefix = "KERBSIDE")]
pub(crate) struct RouteArgs {
    /// Action to perform.
    #[arg(value_enum, value_name = "action")]
    #[serde(default)]
    pub(crate) action: Option<RouteAction>,
    /// Route to operate on.
    #[arg(long = ARG_ROUTE_ID, value_name = "id")]
    #[serde(default)]
    pub(crate) route_id: Option<u64>,
    /// Container to append or remove.
    #[arg(long = ARG_CONTAINER_ID, value_name = "id")]
    #[serde(default)]
    pub(crate) container_id: Option<u64>,
    /// First route position `reoptimize` may move; defaults to 0.
    #[arg(long = ARG_FROM_INDEX, value_name = "index")]
    #[serde(default)]
    pub(crate) from_index: Option<usize>,
    /// Path to the SQLite database.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
}

impl RouteArgs {
    fn into_config(self) -> Result<RouteConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        RouteConfig::try_from(merged)
    }
}

/// A fully specified route operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RouteOperation {
    Show,
    Append { container_id: u64 },
    Remove { container_id: u64 },
    Reoptimize { from_index: usize },
    Finalize,
    Delete,
}

/// Resolved `route` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RouteConfig {
    pub(crate) route_id: u64,
    pub(crate) operation: RouteOperation,
    pub(crate) database: Utf8PathBuf,
}

impl TryFrom<RouteArgs> for RouteConfig {
    type Error = CliError;

    fn try_from(args: RouteArgs) -> Result<Self, Self::Error> {
        let action = args.action.ok_or(CliError::MissingArgument {
            field: ARG_ROUTE_ACTION,
            env: ENV_ROUTE_ACTION,
        })?;
        let route_id = args.route_id.ok_or(CliError::MissingArgument {
            field: ARG_ROUTE_ID,
            env: ENV_ROUTE_ID,
        })?;
        let database = args.database.ok_or(CliError::MissingArgument {
            field: ARG_DATABASE,
            env: ENV_ROUTE_DATABASE,
        })?;
        let container_id = || {
            args.container_id.ok_or(CliError::MissingArgument {
                field: ARG_CONTAINER_ID,
                env: ENV_CONTAINER_ID,
            })
        };
        let operation = match action {
            RouteAction::Show => RouteOperation::Show,
            RouteAction::Append => RouteOperation::Append {
                container_id: container_id()?,
            },
            RouteAction::Remove => RouteOperation::Remove {
                container_id: container_id()?,
            },
            RouteAction::Reoptimize => RouteOperation::Reoptimize {
                from_index: args.from_index.unwrap_or(0),
            },
            RouteAction::Finalize => RouteOperation::Finalize,
            RouteAction::Delete => RouteOperation::Delete,
        };
        Ok(Self {
            route_id,
            operation,
            database,
        })
    }
}

/// Printed by `delete`, which leaves no route behind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct DeletedRoute {
    pub(crate) deleted: u64,
}

pub(crate) fn run_route(args: RouteArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_route_with(args, &mut stdout)
}

pub(crate) fn run_route_with(args: RouteArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let config = args.into_config()?;
    let service = RouteService::new(open_existing(&config.database)?, GreatCircleDistance);
    let route_id = config.route_id;
    let route: Route = match config.operation {
        RouteOperation::Show => service.route(route_id)?,
        RouteOperation::Append { container_id } => {
            service.append_container(route_id, container_id)?
        }
        RouteOperation::Remove { container_id } => {
            service.remove_container(route_id, container_id)?
        }
        RouteOperation::Reoptimize { from_index } => {
            service.reoptimize_route(route_id, from_index)?
        }
        RouteOperation::Finalize => service.finalize_route(route_id)?,
        RouteOperation::Delete => {
            service.delete_route(route_id)?;
            return write_json(writer, &DeletedRoute { deleted: route_id });
        }
    };
    write_json(writer, &route)
}
