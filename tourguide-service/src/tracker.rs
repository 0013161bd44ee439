//! Periodic location tracking.
//!
//! A [`Tracker`] owns one scheduling thread that drives a single-threaded
//! Tokio runtime. Each cycle runs on the runtime's blocking pool and fans
//! out over the tracker's own rayon pool; the next cycle starts a fixed
//! delay after the previous one finished, so cycles never overlap.
//!
//! Stopping cancels one [`CancellationToken`]. The schedule stops waiting on
//! the in-flight cycle and on the delay, and per-user tasks that have not
//! started yet are skipped.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use rayon::{ThreadPool, ThreadPoolBuilder};
use tokio_util::sync::CancellationToken;
use tourguide_rewards::BatchReport;

use crate::{TourGuideService, TrackError, TrackerError};

/// Outcome of one completed tracking cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleSummary {
    /// One-based cycle number.
    pub cycle: u64,
    /// Users in the roster snapshot the cycle worked on.
    pub users: usize,
    /// Users tracked successfully.
    pub processed: usize,
    /// Users skipped because the tracker was stopping.
    pub skipped: usize,
    /// Users whose tracking failed.
    pub failures: usize,
    /// Rewards added during the cycle.
    pub rewards_added: usize,
    /// Wall-clock duration of the cycle.
    pub elapsed: Duration,
}

#[derive(Debug, Default)]
struct Progress {
    cycles_started: AtomicU64,
    cycles_completed: AtomicU64,
    last_cycle: Mutex<Option<CycleSummary>>,
    cycle_done: Condvar,
}

impl Progress {
    fn record(&self, cycle: u64, report: &BatchReport<TrackError>) {
        let summary = CycleSummary {
            cycle,
            users: report.total(),
            processed: report.processed,
            skipped: report.skipped,
            failures: report.failures.len(),
            rewards_added: report.rewards_added,
            elapsed: report.elapsed,
        };
        for failure in &report.failures {
            log::warn!("tracking cycle {cycle}: {}", failure.error);
        }
        log::info!(
            "tracking cycle {cycle} finished: {} users, {} rewards added, {} failures in {:?}",
            summary.users,
            summary.rewards_added,
            summary.failures,
            summary.elapsed,
        );
        let mut last = self
            .last_cycle
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *last = Some(summary);
        self.cycles_completed.fetch_add(1, Ordering::SeqCst);
        self.cycle_done.notify_all();
    }
}

enum Lifecycle {
    Idle,
    Running {
        cancel: CancellationToken,
        scheduler: JoinHandle<()>,
    },
    Stopped,
}

/// Everything the scheduling thread needs for one run.
struct Schedule {
    service: Arc<TourGuideService>,
    pool: Arc<ThreadPool>,
    cancel: CancellationToken,
    interval: Duration,
    progress: Arc<Progress>,
}

impl Schedule {
    async fn run(self) {
        while !self.cancel.is_cancelled() {
            let cycle = self.progress.cycles_started.fetch_add(1, Ordering::SeqCst) + 1;
            log::debug!("tracking cycle {cycle} started");
            let job = {
                let service = Arc::clone(&self.service);
                let pool = Arc::clone(&self.pool);
                let cancel = self.cancel.clone();
                tokio::task::spawn_blocking(move || service.track_all(&pool, &cancel))
            };

            tokio::select! {
                biased;
                () = self.cancel.cancelled() => {
                    log::info!("tracker stopped during cycle {cycle}");
                    break;
                }
                joined = job => match joined {
                    Ok(report) => self.progress.record(cycle, &report),
                    Err(err) => log::error!("tracking cycle {cycle} did not complete: {err}"),
                },
            }

            tokio::select! {
                () = self.cancel.cancelled() => {
                    log::info!("tracker stopped after cycle {cycle}");
                    break;
                }
                () = tokio::time::sleep(self.interval) => {}
            }
        }
    }
}

/// Periodically refreshes every user's location and recomputes rewards.
///
/// The lifecycle is `Idle -> Running -> Stopped`; a stopped tracker cannot
/// be restarted.
///
/// # Examples
/// ```no_run
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// use tourguide_core::test_support::{FixedRewardOracle, StaticLocationProvider};
/// use tourguide_service::{EngineConfig, TourGuideService, Tracker};
///
/// let service = Arc::new(TourGuideService::new(
///     Arc::new(StaticLocationProvider::default()),
///     Arc::new(FixedRewardOracle::new(1)),
///     EngineConfig::default(),
/// )?);
/// let tracker = Tracker::new(service);
/// tracker.start()?;
/// tracker.wait_for_cycles(1, Duration::from_secs(5));
/// tracker.stop();
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct Tracker {
    service: Arc<TourGuideService>,
    interval: Duration,
    workers: usize,
    lifecycle: Mutex<Lifecycle>,
    progress: Arc<Progress>,
}

impl std::fmt::Debug for Tracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tracker")
            .field("interval", &self.interval)
            .field("workers", &self.workers)
            .field("running", &self.is_running())
            .field("cycles_completed", &self.cycles_completed())
            .finish_non_exhaustive()
    }
}

impl Tracker {
    /// Create an idle tracker using the service's interval and worker count.
    #[must_use]
    pub fn new(service: Arc<TourGuideService>) -> Self {
        let interval = service.config().tracking_interval;
        let workers = service.config().tracker_workers.max(1);
        Self {
            service,
            interval,
            workers,
            lifecycle: Mutex::new(Lifecycle::Idle),
            progress: Arc::new(Progress::default()),
        }
    }

    /// Start tracking. The first cycle begins immediately.
    ///
    /// # Errors
    /// Returns [`TrackerError::AlreadyRunning`] or [`TrackerError::Stopped`]
    /// when the tracker is not idle, and a start-up error when the worker
    /// pool, the runtime or the scheduling thread cannot be created. A
    /// failed start leaves the tracker idle.
    pub fn start(&self) -> Result<(), TrackerError> {
        let mut lifecycle = self.lock();
        match *lifecycle {
            Lifecycle::Idle => {}
            Lifecycle::Running { .. } => return Err(TrackerError::AlreadyRunning),
            Lifecycle::Stopped => return Err(TrackerError::Stopped),
        }

        let pool = ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .thread_name(|index| format!("tracker-worker-{index}"))
            .build()
            .map_err(TrackerError::WorkerPool)?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(TrackerError::Runtime)?;
        let cancel = CancellationToken::new();
        let schedule = Schedule {
            service: Arc::clone(&self.service),
            pool: Arc::new(pool),
            cancel: cancel.clone(),
            interval: self.interval,
            progress: Arc::clone(&self.progress),
        };
        let scheduler = thread::Builder::new()
            .name("tracker-scheduler".to_owned())
            .spawn(move || {
                runtime.block_on(schedule.run());
                // An abandoned cycle may still be finishing on the blocking
                // pool; its users skip once they see the cancellation.
                runtime.shutdown_background();
            })
            .map_err(TrackerError::Spawn)?;

        log::info!(
            "tracker started with {} workers and a {:?} interval",
            self.workers,
            self.interval
        );
        *lifecycle = Lifecycle::Running { cancel, scheduler };
        Ok(())
    }

    /// Stop tracking. Idempotent and callable from any thread.
    ///
    /// Returns once the scheduling thread has exited, unless called from that
    /// thread itself. No cycle starts after this returns.
    pub fn stop(&self) {
        let previous = std::mem::replace(&mut *self.lock(), Lifecycle::Stopped);
        let Lifecycle::Running { cancel, scheduler } = previous else {
            return;
        };
        cancel.cancel();
        if scheduler.thread().id() == thread::current().id() {
            return;
        }
        if scheduler.join().is_err() {
            log::error!("tracker scheduling thread panicked");
        }
        log::info!("tracker stopped");
    }

    /// Whether the tracker is currently running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        matches!(*self.lock(), Lifecycle::Running { .. })
    }

    /// Whether the tracker has been stopped.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        matches!(*self.lock(), Lifecycle::Stopped)
    }

    /// Number of cycles started so far.
    #[must_use]
    pub fn cycles_started(&self) -> u64 {
        self.progress.cycles_started.load(Ordering::SeqCst)
    }

    /// Number of cycles that ran to completion.
    #[must_use]
    pub fn cycles_completed(&self) -> u64 {
        self.progress.cycles_completed.load(Ordering::SeqCst)
    }

    /// Summary of the most recently completed cycle.
    #[must_use]
    pub fn last_cycle(&self) -> Option<CycleSummary> {
        *self
            .progress
            .last_cycle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Block until at least `cycles` cycles completed or `timeout` elapsed.
    /// Returns whether the target was reached.
    pub fn wait_for_cycles(&self, cycles: u64, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut last = self
            .progress
            .last_cycle
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        while self.cycles_completed() < cycles {
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            let (guard, _) = self
                .progress
                .cycle_done
                .wait_timeout(last, deadline - now)
                .unwrap_or_else(PoisonError::into_inner);
            last = guard;
        }
        true
    }

    fn lock(&self) -> MutexGuard<'_, Lifecycle> {
        self.lifecycle.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for Tracker {
    fn drop(&mut self) {
        self.stop();
    }
}
