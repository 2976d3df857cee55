//! `build` command: plan a new route from the stored containers.

use std::io::Write;

use camino::Utf8PathBuf;
use clap::Parser;
use kerbside_core::{BuildRequest, GreatCircleDistance, Route};
use kerbside_planner::{DEFAULT_MAX_IMPROVEMENT_PASSES, PlannerConfig, RouteService};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::database::{load_json, open_existing, require_existing, write_json};
use crate::{
    ARG_BUILD_REQUEST, ARG_DATABASE, ARG_MAX_IMPROVEMENT_PASSES, CliError, ENV_BUILD_DATABASE,
    ENV_BUILD_REQUEST,
};

/// CLI arguments for the `build` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Build a route for one truck from a JSON-encoded \
                 BuildRequest. Collectable containers not already held by \
                 another unfinished route are visited nearest first, then \
                 the path is shortened with 2-opt. The route is saved and \
                 printed as JSON.",
    about = "Build a new route"
)]
#[ortho_config(prefix = "KERBSIDE")]
pub(crate) struct BuildArgs {
    /// Path to a JSON file containing a BuildRequest.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) request: Option<Utf8PathBuf>,
    /// Path to the SQLite database.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
    /// Upper bound on 2-opt improvement passes.
    #[arg(long = ARG_MAX_IMPROVEMENT_PASSES, value_name = "count")]
    #[serde(default)]
    pub(crate) max_improvement_passes: Option<usize>,
}

impl BuildArgs {
    fn into_config(self) -> Result<BuildConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        BuildConfig::try_from(merged)
    }
}

/// Resolved `build` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct BuildConfig {
    pub(crate) request: Utf8PathBuf,
    pub(crate) database: Utf8PathBuf,
    pub(crate) planner: PlannerConfig,
}

impl TryFrom<BuildArgs> for BuildConfig {
    type Error = CliError;

    fn try_from(args: BuildArgs) -> Result<Self, Self::Error> {
        let request = args.request.ok_or(CliError::MissingArgument {
            field: ARG_BUILD_REQUEST,
            env: ENV_BUILD_REQUEST,
        })?;
        let database = args.database.ok_or(CliError::MissingArgument {
            field: ARG_DATABASE,
            env: ENV_BUILD_DATABASE,
        })?;
        let passes = args
            .max_improvement_passes
            .unwrap_or(DEFAULT_MAX_IMPROVEMENT_PASSES);
        Ok(Self {
            request,
            database,
            planner: PlannerConfig::default().with_max_improvement_passes(passes),
        })
    }
}

pub(crate) fn run_build(args: BuildArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_build_with(args, &mut stdout)
}

pub(crate) fn run_build_with(args: BuildArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let config = args.into_config()?;
    let route = build_route(&config)?;
    write_json(writer, &route)
}

fn build_route(config: &BuildConfig) -> Result<Route, CliError> {
    require_existing(&config.request, ARG_BUILD_REQUEST)?;
    let request: BuildRequest = load_json(&config.request, ARG_BUILD_REQUEST)?;
    let repository = open_existing(&config.database)?;
    let service = RouteService::with_config(repository, GreatCircleDistance, config.planner);
    Ok(service.build_route(&request)?)
}
