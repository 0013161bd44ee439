//! Track command implementation for the tour guide CLI.

use std::io::Write;
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use tourguide_service::{CycleSummary, DEFAULT_TRACKING_INTERVAL, EngineConfig, Tracker};

use crate::{CliError, Simulation, available_parallelism, millis, total_reward_points, write_summary};

pub(crate) const ARG_TRACK_USERS: &str = "users";
pub(crate) const ENV_TRACK_USERS: &str = "TOURGUIDE_CMDS_TRACK_USERS";
pub(crate) const ARG_TRACK_CYCLES: &str = "cycles";
pub(crate) const ENV_TRACK_CYCLES: &str = "TOURGUIDE_CMDS_TRACK_CYCLES";
pub(crate) const ARG_TRACK_WORKERS: &str = "workers";

/// Time allowed for a single cycle on top of the tracking interval.
pub(crate) const CYCLE_TIMEOUT: Duration = Duration::from_secs(600);

/// CLI arguments for the `track` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Provision simulated internal users, start the background \
                 tracker and stop it once the requested number of cycles has \
                 completed. A JSON summary of the run is printed on exit.",
    about = "Run the background tracker for a number of cycles"
)]
#[ortho_config(prefix = "TOURGUIDE")]
pub(crate) struct TrackArgs {
    /// Number of internal users to provision.
    #[arg(long = ARG_TRACK_USERS, value_name = "count")]
    #[serde(default)]
    pub(crate) users: Option<usize>,
    /// Tracking cycles to wait for before stopping.
    #[arg(long = ARG_TRACK_CYCLES, value_name = "count")]
    #[serde(default)]
    pub(crate) cycles: Option<u64>,
    /// Pause between cycles, in seconds.
    #[arg(long = "interval-secs", value_name = "secs")]
    #[serde(default)]
    pub(crate) interval_secs: Option<u64>,
    /// Worker threads for the tracker pool (defaults to available cores).
    #[arg(long = ARG_TRACK_WORKERS, value_name = "threads")]
    #[serde(default)]
    pub(crate) workers: Option<usize>,
    /// Seed for the simulated services and user generator.
    #[arg(long = "seed", value_name = "seed")]
    #[serde(default)]
    pub(crate) seed: Option<u64>,
    /// Latency of each simulated location lookup, in milliseconds.
    #[arg(long = "provider-latency-ms", value_name = "ms")]
    #[serde(default)]
    pub(crate) provider_latency_ms: Option<u64>,
}

impl TrackArgs {
    pub(crate) fn into_config(self) -> Result<TrackConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        TrackConfig::try_from(merged)
    }
}

/// Resolved `track` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TrackConfig {
    pub(crate) users: usize,
    pub(crate) cycles: u64,
    pub(crate) interval: Duration,
    pub(crate) workers: usize,
    pub(crate) seed: u64,
    pub(crate) provider_latency: Duration,
}

impl TryFrom<TrackArgs> for TrackConfig {
    type Error = CliError;

    fn try_from(args: TrackArgs) -> Result<Self, Self::Error> {
        let users = args.users.ok_or(CliError::MissingArgument {
            field: ARG_TRACK_USERS,
            env: ENV_TRACK_USERS,
        })?;
        let cycles = args.cycles.ok_or(CliError::MissingArgument {
            field: ARG_TRACK_CYCLES,
            env: ENV_TRACK_CYCLES,
        })?;
        if cycles == 0 {
            return Err(CliError::InvalidArgument {
                field: ARG_TRACK_CYCLES,
                reason: "must be at least 1",
            });
        }
        let workers = args.workers.unwrap_or_else(available_parallelism);
        if workers == 0 {
            return Err(CliError::InvalidArgument {
                field: ARG_TRACK_WORKERS,
                reason: "must be at least 1",
            });
        }
        let interval = args
            .interval_secs
            .map_or(DEFAULT_TRACKING_INTERVAL, Duration::from_secs);
        Ok(Self {
            users,
            cycles,
            interval,
            workers,
            seed: args.seed.unwrap_or_default(),
            provider_latency: Duration::from_millis(args.provider_latency_ms.unwrap_or_default()),
        })
    }
}

/// Last completed cycle as reported by the `track` command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct CycleReport {
    pub(crate) cycle: u64,
    pub(crate) processed: usize,
    pub(crate) skipped: usize,
    pub(crate) failures: usize,
    pub(crate) rewards_added: usize,
    pub(crate) elapsed_ms: u64,
}

impl From<CycleSummary> for CycleReport {
    fn from(summary: CycleSummary) -> Self {
        Self {
            cycle: summary.cycle,
            processed: summary.processed,
            skipped: summary.skipped,
            failures: summary.failures,
            rewards_added: summary.rewards_added,
            elapsed_ms: millis(summary.elapsed),
        }
    }
}

/// JSON summary printed by the `track` command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct TrackSummary {
    pub(crate) users: usize,
    pub(crate) cycles_requested: u64,
    pub(crate) cycles_completed: u64,
    pub(crate) last_cycle: Option<CycleReport>,
    pub(crate) total_reward_points: i64,
    pub(crate) elapsed_ms: u64,
}

pub(crate) fn run_track(args: TrackArgs) -> Result<(), CliError> {
    let config = args.into_config()?;
    let mut stdout = std::io::stdout().lock();
    run_track_with(&config, &mut stdout)
}

pub(crate) fn run_track_with(config: &TrackConfig, writer: &mut dyn Write) -> Result<(), CliError> {
    let summary = execute_track(config)?;
    write_summary(writer, &summary)
}

pub(crate) fn execute_track(config: &TrackConfig) -> Result<TrackSummary, CliError> {
    let simulation = Simulation {
        seed: config.seed,
        location_latency: config.provider_latency,
        oracle_latency: Duration::ZERO,
    };
    let engine_config = EngineConfig::default()
        .with_tracking_interval(config.interval)
        .with_tracker_workers(config.workers);
    let service = simulation.service(engine_config)?;
    simulation.provision(&service, config.users, None);

    let tracker = Tracker::new(Arc::clone(&service));
    let started = Instant::now();
    tracker.start()?;
    let per_cycle = config.interval.saturating_add(CYCLE_TIMEOUT);
    for cycle in 1..=config.cycles {
        if !tracker.wait_for_cycles(cycle, per_cycle) {
            tracker.stop();
            return Err(CliError::TrackTimedOut {
                completed: tracker.cycles_completed(),
                requested: config.cycles,
            });
        }
    }
    tracker.stop();
    log::info!(
        "tracker finished {} cycles for {} users",
        tracker.cycles_completed(),
        config.users
    );

    Ok(TrackSummary {
        users: config.users,
        cycles_requested: config.cycles,
        cycles_completed: tracker.cycles_completed(),
        last_cycle: tracker.last_cycle().map(CycleReport::from),
        total_reward_points: total_reward_points(&service),
        elapsed_ms: millis(started.elapsed()),
    })
}

#[cfg(test)]
pub(crate) fn track_config_from_layers(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<TrackConfig, CliError> {
    let merged = TrackArgs::merge_from_layers(layers).map_err(CliError::from)?;
    TrackConfig::try_from(merged)
}
