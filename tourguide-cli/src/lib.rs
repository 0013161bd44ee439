//! Command-line interface driving the tour guide engine against the
//! simulated GPS and reward services.
#![forbid(unsafe_code)]

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tourguide_core::VisitedLocation;
use tourguide_service::{EngineConfig, TourGuideService};
use tourguide_sim::{InternalUsers, SimulatedLocationProvider, SimulatedRewardOracle};

mod error;
mod rewards;
mod track;

pub use error::CliError;

use rewards::RewardsArgs;
use track::TrackArgs;

/// Run the tour guide CLI with the current process arguments and environment.
///
/// # Errors
/// Returns [`CliError`] when argument parsing, configuration merging or the
/// selected command fails.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    match cli.command {
        Command::Rewards(args) => rewards::run_rewards(args),
        Command::Track(args) => track::run_track(args),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "tourguide",
    about = "Drive the tour guide reward engine against simulated services",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Calculate rewards for a population of internal users in parallel.
    Rewards(RewardsArgs),
    /// Run the background tracker for a number of cycles.
    Track(TrackArgs),
}

/// Simulation knobs shared by every command.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Simulation {
    seed: u64,
    location_latency: Duration,
    oracle_latency: Duration,
}

impl Simulation {
    /// Service backed by seeded simulated providers.
    fn service(self, config: EngineConfig) -> Result<Arc<TourGuideService>, CliError> {
        let locations = SimulatedLocationProvider::new(self.seed.wrapping_add(1))
            .with_latency(self.location_latency);
        let oracle =
            SimulatedRewardOracle::new(self.seed.wrapping_add(2)).with_latency(self.oracle_latency);
        let service = TourGuideService::new(Arc::new(locations), Arc::new(oracle), config)?;
        Ok(Arc::new(service))
    }

    /// Register `count` internal users, each optionally placed at `visit`.
    fn provision(self, service: &TourGuideService, count: usize, visit: Option<geo::Coord<f64>>) {
        for user in InternalUsers::generate(count, self.seed) {
            if let Some(location) = visit {
                user.add_visited_location(VisitedLocation::now(user.id(), location));
            }
            service.add_user(user);
        }
        log::info!("provisioned {count} internal users");
    }
}

fn total_reward_points(service: &TourGuideService) -> i64 {
    service
        .all_users()
        .iter()
        .map(|user| service.total_reward_points(user))
        .sum()
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

fn available_parallelism() -> usize {
    std::thread::available_parallelism().map_or(1, std::num::NonZeroUsize::get)
}

fn write_summary<T: Serialize>(writer: &mut dyn Write, summary: &T) -> Result<(), CliError> {
    let payload = serde_json::to_string_pretty(summary).map_err(CliError::SerialiseSummary)?;
    writer
        .write_all(payload.as_bytes())
        .map_err(CliError::WriteOutput)?;
    writer.write_all(b"\n").map_err(CliError::WriteOutput)?;
    Ok(())
}

#[cfg(test)]
mod tests;
