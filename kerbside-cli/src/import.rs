//! `import` command: insert or replace containers from a JSON file.

use std::io::Write;

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use kerbside_core::{Container, RouteRepository};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::database::{load_json, open_or_create, require_existing, write_json};
use crate::{
    ARG_DATABASE, ARG_IMPORT_SOURCE, CliError, ENV_IMPORT_DATABASE, ENV_IMPORT_SOURCE,
};

/// CLI arguments for the `import` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Read a JSON array of containers and store each one, \
                 replacing any container with the same id. The database is \
                 created when it does not exist yet.",
    about = "Insert or replace containers"
)]
#[ortho_config(prefix = "KERBSIDE")]
pub(crate) struct ImportArgs {
    /// Path to a JSON file holding an array of containers.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) containers: Option<Utf8PathBuf>,
    /// Path to the SQLite database.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
}

impl ImportArgs {
    fn into_config(self) -> Result<ImportConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        ImportConfig::try_from(merged)
    }
}

/// Resolved `import` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ImportConfig {
    pub(crate) containers: Utf8PathBuf,
    pub(crate) database: Utf8PathBuf,
}

impl TryFrom<ImportArgs> for ImportConfig {
    type Error = CliError;

    fn try_from(args: ImportArgs) -> Result<Self, Self::Error> {
        let containers = args.containers.ok_or(CliError::MissingArgument {
            field: ARG_IMPORT_SOURCE,
            env: ENV_IMPORT_SOURCE,
        })?;
        let database = args.database.ok_or(CliError::MissingArgument {
            field: ARG_DATABASE,
            env: ENV_IMPORT_DATABASE,
        })?;
        Ok(Self {
            containers,
            database,
        })
    }
}

/// Summary printed after an import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct ImportSummary {
    pub(crate) imported: usize,
    pub(crate) ids: Vec<u64>,
}

pub(crate) fn run_import(args: ImportArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_import_with(args, &mut stdout)
}

pub(crate) fn run_import_with(args: ImportArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let config = args.into_config()?;
    let summary = import_containers(&config)?;
    write_json(writer, &summary)
}

pub(crate) fn import_containers(config: &ImportConfig) -> Result<ImportSummary, CliError> {
    let containers = load_containers(&config.containers)?;
    let repository = open_or_create(&config.database)?;
    for container in &containers {
        repository.save_container(container)?;
    }
    Ok(ImportSummary {
        imported: containers.len(),
        ids: containers.iter().map(|container| container.id).collect(),
    })
}

/// Load and validate every container before anything is written.
fn load_containers(path: &Utf8Path) -> Result<Vec<Container>, CliError> {
    require_existing(path, ARG_IMPORT_SOURCE)?;
    let containers: Vec<Container> = load_json(path, ARG_IMPORT_SOURCE)?;
    for container in &containers {
        container
            .validate()
            .map_err(|source| CliError::InvalidContainer {
                path: path.to_path_buf(),
                source,
            })?;
    }
    Ok(containers)
}
