//! Bounded parallel reward computation over many users.

use std::sync::Arc;

use rayon::ThreadPoolBuilder;
use tourguide_core::User;

use crate::report::{BatchReport, TaskOutcome, fan_out};
use crate::{RewardEngine, RewardError};

/// Runs [`RewardEngine::calculate_rewards`] for a batch of users on a
/// dedicated, bounded worker pool.
///
/// Each call builds its own pool and tears it down before returning, so a
/// batch never competes with other work for threads.
#[derive(Debug, Clone)]
pub struct ParallelRewardRunner {
    engine: Arc<RewardEngine>,
}

impl ParallelRewardRunner {
    /// Create a runner driving `engine`.
    #[must_use]
    pub const fn new(engine: Arc<RewardEngine>) -> Self {
        Self { engine }
    }

    /// Engine used for each user.
    #[must_use]
    pub fn engine(&self) -> &RewardEngine {
        &self.engine
    }

    /// Compute rewards for every user using at most `max_parallelism`
    /// threads (at least one).
    ///
    /// The call returns once every user has been handled. Per-user failures,
    /// panics included, are collected in the report.
    ///
    /// # Errors
    /// Returns [`RewardError::WorkerPool`] when the pool cannot be built.
    pub fn run_all(
        &self,
        users: &[Arc<User>],
        max_parallelism: usize,
    ) -> Result<BatchReport<RewardError>, RewardError> {
        let threads = max_parallelism.max(1);
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|index| format!("reward-worker-{index}"))
            .build()
            .map_err(RewardError::WorkerPool)?;

        let report = fan_out(
            &pool,
            users,
            |user| {
                self.engine
                    .calculate_rewards(user)
                    .map(TaskOutcome::Completed)
            },
            |user, message| RewardError::TaskPanicked {
                user_name: user.name().to_owned(),
                message,
            },
        );

        log::info!(
            "reward batch finished: {} users, {} rewards added, {} failures in {:?} on {threads} threads",
            report.total(),
            report.rewards_added,
            report.failures.len(),
            report.elapsed,
        );
        for failure in &report.failures {
            if failure.error.is_provider_failure() {
                log::warn!(
                    "reward computation failed for user {}: {}",
                    failure.user_name,
                    failure.error
                );
            } else {
                log::error!(
                    "reward computation aborted for user {}: {}",
                    failure.user_name,
                    failure.error
                );
            }
        }
        Ok(report)
    }
}
