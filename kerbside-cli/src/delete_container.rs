//! `delete-container` command: remove a container that no open route holds.

use std::io::Write;

use camino::Utf8PathBuf;
use clap::Parser;
use kerbside_core::GreatCircleDistance;
use kerbside_planner::RouteService;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::database::{open_existing, write_json};
use crate::{
    ARG_CONTAINER_ID, ARG_DATABASE, CliError, ENV_DELETE_CONTAINER_DATABASE,
    ENV_DELETE_CONTAINER_ID,
};

/// CLI arguments for the `delete-container` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Delete a stored container. Containers on a route that is \
                 still being built are refused; finalised routes keep their \
                 own copy of the container.",
    about = "Delete a stored container"
)]
#[ortho_config(prefix = "KERBSIDE")]
pub(crate) struct DeleteContainerArgs {
    /// Container to delete.
    #[arg(long = ARG_CONTAINER_ID, value_name = "id")]
    #[serde(default)]
    pub(crate) container_id: Option<u64>,
    /// Path to the SQLite database.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
}

/// Resolved `delete-container` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DeleteContainerConfig {
    pub(crate) container_id: u64,
    pub(crate) database: Utf8PathBuf,
}

impl TryFrom<DeleteContainerArgs> for DeleteContainerConfig {
    type Error = CliError;

    fn try_from(args: DeleteContainerArgs) -> Result<Self, Self::Error> {
        let container_id = args.container_id.ok_or(CliError::MissingArgument {
            field: ARG_CONTAINER_ID,
            env: ENV_DELETE_CONTAINER_ID,
        })?;
        let database = args.database.ok_or(CliError::MissingArgument {
            field: ARG_DATABASE,
            env: ENV_DELETE_CONTAINER_DATABASE,
        })?;
        Ok(Self {
            container_id,
            database,
        })
    }
}

/// Printed once the container is gone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct DeletedContainer {
    pub(crate) deleted: u64,
}

pub(crate) fn run_delete_container(args: DeleteContainerArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_delete_container_with(args, &mut stdout)
}

pub(crate) fn run_delete_container_with(
    args: DeleteContainerArgs,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let merged = args.load_and_merge().map_err(CliError::Configuration)?;
    let config = DeleteContainerConfig::try_from(merged)?;
    let service = RouteService::new(open_existing(&config.database)?, GreatCircleDistance);
    service.delete_container(config.container_id)?;
    write_json(
        writer,
        &DeletedContainer {
            deleted: config.container_id,
        },
    )
}
