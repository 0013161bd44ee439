//! Engine configuration.

use std::num::NonZeroUsize;
use std::thread;
use std::time::Duration;

use tourguide_core::DEFAULT_PROXIMITY_BUFFER_MILES;
use tourguide_rewards::{DEFAULT_REWARD_CACHE_CAPACITY, DEFAULT_REWARD_TTL, RewardCacheConfig};

/// Default delay between the end of one tracking cycle and the next start.
pub const DEFAULT_TRACKING_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Default number of attractions returned by nearby-attraction queries.
pub const DEFAULT_NEARBY_ATTRACTION_COUNT: usize = 5;

/// Tunables for a [`crate::TourGuideService`] and its [`crate::Tracker`].
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use tourguide_service::EngineConfig;
///
/// let config = EngineConfig::default()
///     .with_proximity_buffer_miles(25.0)
///     .with_tracking_interval(Duration::from_secs(30))
///     .with_tracker_workers(8);
/// assert_eq!(config.tracker_workers, 8);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Initial reward-attribution buffer in statute miles.
    pub proximity_buffer_miles: f64,
    /// How long a cached oracle answer stays valid.
    pub cache_ttl: Duration,
    /// Maximum number of cached oracle answers.
    pub cache_max_entries: usize,
    /// Fixed delay between tracking cycles.
    pub tracking_interval: Duration,
    /// Worker threads used by each tracking cycle.
    pub tracker_workers: usize,
    /// Attractions returned by nearby-attraction queries.
    pub nearby_attraction_count: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            proximity_buffer_miles: DEFAULT_PROXIMITY_BUFFER_MILES,
            cache_ttl: DEFAULT_REWARD_TTL,
            cache_max_entries: DEFAULT_REWARD_CACHE_CAPACITY,
            tracking_interval: DEFAULT_TRACKING_INTERVAL,
            tracker_workers: available_workers(),
            nearby_attraction_count: DEFAULT_NEARBY_ATTRACTION_COUNT,
        }
    }
}

impl EngineConfig {
    /// Set the initial proximity buffer.
    #[must_use]
    pub const fn with_proximity_buffer_miles(mut self, miles: f64) -> Self {
        self.proximity_buffer_miles = miles;
        self
    }

    /// Set the cache TTL.
    #[must_use]
    pub const fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Set the cache capacity.
    #[must_use]
    pub const fn with_cache_max_entries(mut self, max_entries: usize) -> Self {
        self.cache_max_entries = max_entries;
        self
    }

    /// Set the delay between tracking cycles.
    #[must_use]
    pub const fn with_tracking_interval(mut self, interval: Duration) -> Self {
        self.tracking_interval = interval;
        self
    }

    /// Set the tracker's worker count. Zero is treated as one.
    #[must_use]
    pub const fn with_tracker_workers(mut self, workers: usize) -> Self {
        self.tracker_workers = workers;
        self
    }

    /// Set how many attractions nearby-attraction queries return.
    #[must_use]
    pub const fn with_nearby_attraction_count(mut self, count: usize) -> Self {
        self.nearby_attraction_count = count;
        self
    }

    /// Cache settings derived from this configuration.
    #[must_use]
    pub const fn cache_config(&self) -> RewardCacheConfig {
        RewardCacheConfig {
            ttl: self.cache_ttl,
            max_entries: self.cache_max_entries,
        }
    }
}

fn available_workers() -> usize {
    thread::available_parallelism().map_or(1, NonZeroUsize::get)
}
