//! `containers` command: list stored containers.

use std::io::Write;

use camino::Utf8PathBuf;
use clap::Parser;
use kerbside_core::{Container, ContainerFilter, ContainerStatus, RouteRepository};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::database::{open_existing, write_json};
use crate::{ARG_DATABASE, ARG_STATUS, CliError, ENV_CONTAINERS_DATABASE};

/// CLI arguments for the `containers` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(about = "List stored containers, optionally by status")]
#[ortho_config(prefix = "KERBSIDE")]
pub(crate) struct ContainersArgs {
    /// Only list containers with this status (empty, filling, ready, filled).
    #[arg(long = ARG_STATUS, value_name = "status")]
    #[serde(default)]
    pub(crate) status: Option<ContainerStatus>,
    /// Path to the SQLite database.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
}

/// Resolved `containers` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ContainersConfig {
    pub(crate) status: Option<ContainerStatus>,
    pub(crate) database: Utf8PathBuf,
}

impl TryFrom<ContainersArgs> for ContainersConfig {
    type Error = CliError;

    fn try_from(args: ContainersArgs) -> Result<Self, Self::Error> {
        let database = args.database.ok_or(CliError::MissingArgument {
            field: ARG_DATABASE,
            env: ENV_CONTAINERS_DATABASE,
        })?;
        Ok(Self {
            status: args.status,
            database,
        })
    }
}

impl ContainersConfig {
    fn filter(&self) -> ContainerFilter {
        self.status
            .map_or_else(ContainerFilter::all, |status| {
                ContainerFilter::with_statuses([status])
            })
    }
}

pub(crate) fn run_containers(args: ContainersArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_containers_with(args, &mut stdout)
}

pub(crate) fn run_containers_with(
    args: ContainersArgs,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let merged = args.load_and_merge().map_err(CliError::Configuration)?;
    let config = ContainersConfig::try_from(merged)?;
    let containers = list_containers(&config)?;
    write_json(writer, &containers)
}

fn list_containers(config: &ContainersConfig) -> Result<Vec<Container>, CliError> {
    let repository = open_existing(&config.database)?;
    Ok(repository.load_containers(&config.filter())?)
}
