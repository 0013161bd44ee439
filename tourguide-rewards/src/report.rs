//! Batch outcomes and the per-user fan-out shared by batch runs and the
//! tracker.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::{Duration, Instant};

use rayon::ThreadPool;
use rayon::prelude::*;
use tourguide_core::User;
use uuid::Uuid;

/// What a per-user task did when it returned successfully.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOutcome {
    /// The user was processed and this many rewards were added.
    Completed(usize),
    /// The task chose not to run, typically because of cancellation.
    Skipped,
}

/// A user whose task failed, with the error it failed with.
#[derive(Debug)]
pub struct UserFailure<E> {
    /// Identifier of the affected user.
    pub user_id: Uuid,
    /// Name of the affected user.
    pub user_name: String,
    /// Why the task failed.
    pub error: E,
}

/// Aggregate result of running one task per user.
///
/// A batch always runs to completion; individual failures are collected
/// here rather than aborting the remaining users.
#[derive(Debug)]
pub struct BatchReport<E> {
    /// Users whose task completed.
    pub processed: usize,
    /// Users whose task was skipped.
    pub skipped: usize,
    /// Rewards added across all completed tasks.
    pub rewards_added: usize,
    /// Users whose task failed, in input order.
    pub failures: Vec<UserFailure<E>>,
    /// Wall-clock time for the whole batch.
    pub elapsed: Duration,
}

impl<E> Default for BatchReport<E> {
    fn default() -> Self {
        Self {
            processed: 0,
            skipped: 0,
            rewards_added: 0,
            failures: Vec::new(),
            elapsed: Duration::ZERO,
        }
    }
}

impl<E> BatchReport<E> {
    /// Whether every user was processed without failure.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failures.is_empty() && self.skipped == 0
    }

    /// Number of users the batch covered.
    #[must_use]
    pub fn total(&self) -> usize {
        self.processed + self.skipped + self.failures.len()
    }
}

/// Run `task` once per user on `pool` and collect the outcomes.
///
/// Every task is isolated: a panic is converted into an error by
/// `panicked`, which receives the user and the rendered panic message.
pub fn fan_out<E, T, P>(pool: &ThreadPool, users: &[Arc<User>], task: T, panicked: P) -> BatchReport<E>
where
    E: Send,
    T: Fn(&User) -> Result<TaskOutcome, E> + Sync,
    P: Fn(&User, String) -> E + Sync,
{
    let started = Instant::now();
    let outcomes: Vec<Result<TaskOutcome, E>> = pool.install(|| {
        users
            .par_iter()
            .map(|user| {
                panic::catch_unwind(AssertUnwindSafe(|| task(user)))
                    .unwrap_or_else(|payload| Err(panicked(user, panic_message(payload.as_ref()))))
            })
            .collect()
    });

    let mut report = BatchReport::default();
    for (user, outcome) in users.iter().zip(outcomes) {
        match outcome {
            Ok(TaskOutcome::Completed(added)) => {
                report.processed += 1;
                report.rewards_added += added;
            }
            Ok(TaskOutcome::Skipped) => report.skipped += 1,
            Err(error) => report.failures.push(UserFailure {
                user_id: user.id(),
                user_name: user.name().to_owned(),
                error,
            }),
        }
    }
    report.elapsed = started.elapsed();
    report
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}

#[cfg(test)]
mod tests {
    #![expect(clippy::expect_used, reason = "tests should fail fast")]

    use super::*;
    use rayon::ThreadPoolBuilder;
    use rstest::{fixture, rstest};

    #[fixture]
    fn pool() -> ThreadPool {
        ThreadPoolBuilder::new()
            .num_threads(2)
            .build()
            .expect("build test pool")
    }

    fn users(count: usize) -> Vec<Arc<User>> {
        (0..count)
            .map(|i| Arc::new(User::new(Uuid::new_v4(), format!("user{i}"))))
            .collect()
    }

    #[rstest]
    fn collects_each_kind_of_outcome(pool: ThreadPool) {
        let roster = users(4);
        let report: BatchReport<String> = fan_out(
            &pool,
            &roster,
            |user| match user.name() {
                "user0" => Err("boom".to_owned()),
                "user1" => Ok(TaskOutcome::Skipped),
                _ => Ok(TaskOutcome::Completed(2)),
            },
            |_, message| message,
        );

        assert_eq!(report.processed, 2);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.rewards_added, 4);
        assert_eq!(report.total(), 4);
        assert!(!report.is_success());
        let failure = report.failures.first().expect("one failure");
        assert_eq!(failure.user_name, "user0");
        assert_eq!(failure.error, "boom");
    }

    #[rstest]
    fn panics_become_failures(pool: ThreadPool) {
        let roster = users(3);
        let report: BatchReport<String> = fan_out(
            &pool,
            &roster,
            |user| {
                assert_ne!(user.name(), "user2", "task exploded");
                Ok(TaskOutcome::Completed(0))
            },
            |user, message| format!("{}: {message}", user.name()),
        );

        assert_eq!(report.processed, 2);
        let failure = report.failures.first().expect("panic captured");
        assert!(failure.error.starts_with("user2: "));
        assert!(failure.error.contains("task exploded"));
    }

    #[rstest]
    fn empty_batches_succeed(pool: ThreadPool) {
        let report: BatchReport<String> =
            fan_out(&pool, &[], |_| Ok(TaskOutcome::Completed(1)), |_, message| message);
        assert!(report.is_success());
        assert_eq!(report.total(), 0);
    }
}
