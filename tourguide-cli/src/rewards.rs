//! Rewards command implementation for the tour guide CLI.

use std::io::Write;
use std::time::Duration;

use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use tourguide_core::DEFAULT_PROXIMITY_BUFFER_MILES;
use tourguide_service::EngineConfig;
use tourguide_sim::us_attractions;

use crate::{CliError, Simulation, available_parallelism, millis, total_reward_points, write_summary};

pub(crate) const ARG_REWARDS_USERS: &str = "users";
pub(crate) const ENV_REWARDS_USERS: &str = "TOURGUIDE_CMDS_REWARDS_USERS";
pub(crate) const ARG_REWARDS_PARALLELISM: &str = "parallelism";

/// CLI arguments for the `rewards` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Provision simulated internal users, calculate their rewards \
                 on a bounded worker pool and print a JSON summary. Options \
                 can come from CLI flags, configuration files, or environment \
                 variables.",
    about = "Calculate rewards for internal users in parallel"
)]
#[ortho_config(prefix = "TOURGUIDE")]
pub(crate) struct RewardsArgs {
    /// Number of internal users to provision.
    #[arg(long = ARG_REWARDS_USERS, value_name = "count")]
    #[serde(default)]
    pub(crate) users: Option<usize>,
    /// Worker threads for the reward pool (defaults to available cores).
    #[arg(long = ARG_REWARDS_PARALLELISM, value_name = "threads")]
    #[serde(default)]
    pub(crate) parallelism: Option<usize>,
    /// Proximity buffer in statute miles.
    #[arg(long = "proximity-buffer", value_name = "miles")]
    #[serde(default)]
    pub(crate) proximity_buffer: Option<f64>,
    /// Seed for the simulated services and user generator.
    #[arg(long = "seed", value_name = "seed")]
    #[serde(default)]
    pub(crate) seed: Option<u64>,
    /// Latency of each simulated reward lookup, in milliseconds.
    #[arg(long = "oracle-latency-ms", value_name = "ms")]
    #[serde(default)]
    pub(crate) oracle_latency_ms: Option<u64>,
    /// Add a visit on the first catalog attraction to every user.
    #[arg(
        long = "visit-first-attraction",
        num_args = 0..=1,
        default_missing_value = "true",
        value_name = "bool"
    )]
    #[serde(default)]
    pub(crate) visit_first_attraction: Option<bool>,
}

impl RewardsArgs {
    pub(crate) fn into_config(self) -> Result<RewardsConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        RewardsConfig::try_from(merged)
    }
}

/// Resolved `rewards` command configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RewardsConfig {
    pub(crate) users: usize,
    pub(crate) parallelism: usize,
    pub(crate) proximity_buffer_miles: f64,
    pub(crate) seed: u64,
    pub(crate) oracle_latency: Duration,
    pub(crate) visit_first_attraction: bool,
}

impl TryFrom<RewardsArgs> for RewardsConfig {
    type Error = CliError;

    fn try_from(args: RewardsArgs) -> Result<Self, Self::Error> {
        let users = args.users.ok_or(CliError::MissingArgument {
            field: ARG_REWARDS_USERS,
            env: ENV_REWARDS_USERS,
        })?;
        let parallelism = args.parallelism.unwrap_or_else(available_parallelism);
        if parallelism == 0 {
            return Err(CliError::InvalidArgument {
                field: ARG_REWARDS_PARALLELISM,
                reason: "must be at least 1",
            });
        }
        Ok(Self {
            users,
            parallelism,
            proximity_buffer_miles: args
                .proximity_buffer
                .unwrap_or(DEFAULT_PROXIMITY_BUFFER_MILES),
            seed: args.seed.unwrap_or_default(),
            oracle_latency: Duration::from_millis(args.oracle_latency_ms.unwrap_or_default()),
            visit_first_attraction: args.visit_first_attraction.unwrap_or(false),
        })
    }
}

/// JSON summary printed by the `rewards` command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct RewardsSummary {
    pub(crate) users: usize,
    pub(crate) parallelism: usize,
    pub(crate) processed: usize,
    pub(crate) failures: usize,
    pub(crate) rewards_added: usize,
    pub(crate) total_reward_points: i64,
    pub(crate) elapsed_ms: u64,
}

pub(crate) fn run_rewards(args: RewardsArgs) -> Result<(), CliError> {
    let config = args.into_config()?;
    let mut stdout = std::io::stdout().lock();
    run_rewards_with(&config, &mut stdout)
}

pub(crate) fn run_rewards_with(
    config: &RewardsConfig,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let summary = execute_rewards(config)?;
    write_summary(writer, &summary)
}

pub(crate) fn execute_rewards(config: &RewardsConfig) -> Result<RewardsSummary, CliError> {
    let simulation = Simulation {
        seed: config.seed,
        location_latency: Duration::ZERO,
        oracle_latency: config.oracle_latency,
    };
    let engine_config =
        EngineConfig::default().with_proximity_buffer_miles(config.proximity_buffer_miles);
    let service = simulation.service(engine_config)?;

    let visit = if config.visit_first_attraction {
        us_attractions().first().map(|attraction| attraction.location)
    } else {
        None
    };
    simulation.provision(&service, config.users, visit);

    let report = service.calculate_all_rewards_in_parallel(config.parallelism)?;

    Ok(RewardsSummary {
        users: config.users,
        parallelism: config.parallelism,
        processed: report.processed,
        failures: report.failures.len(),
        rewards_added: report.rewards_added,
        total_reward_points: total_reward_points(&service),
        elapsed_ms: millis(report.elapsed),
    })
}

#[cfg(test)]
pub(crate) fn rewards_config_from_layers(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<RewardsConfig, CliError> {
    let merged = RewardsArgs::merge_from_layers(layers).map_err(CliError::from)?;
    RewardsConfig::try_from(merged)
}
