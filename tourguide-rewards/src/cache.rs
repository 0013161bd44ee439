//! Bounded, time-limited cache of oracle answers with single-flight loading.
//!
//! Entries are keyed by `(attraction, user)` and held in a [`moka`] cache
//! with a write TTL and a least-recently-used capacity bound. When several
//! workers miss on the same key at once, exactly one of them calls the
//! oracle; the others block until that call finishes and share its outcome.
//! Failed lookups are handed to every waiter but never stored, so the next
//! request retries.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use moka::notification::RemovalCause;
use moka::policy::EvictionPolicy;
use moka::sync::Cache;
use tourguide_core::ProviderError;
use uuid::Uuid;

/// Default time an entry stays valid after it was written.
pub const DEFAULT_REWARD_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Default maximum number of stored entries.
pub const DEFAULT_REWARD_CACHE_CAPACITY: usize = 200_000;

/// moka refuses TTLs longer than 1000 years.
const MAX_TTL: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

const PROVIDER: &str = "reward cache";

/// Sizing and expiry settings for a [`RewardCache`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RewardCacheConfig {
    /// How long an entry is served after it was written.
    pub ttl: Duration,
    /// Maximum number of stored entries. Zero disables storage.
    pub max_entries: usize,
}

impl Default for RewardCacheConfig {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_REWARD_TTL,
            max_entries: DEFAULT_REWARD_CACHE_CAPACITY,
        }
    }
}

/// Counters describing how the cache has been used.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups answered from a stored entry or a shared in-flight load.
    pub hits: u64,
    /// Lookups that had to start a load.
    pub misses: u64,
    /// Loads that completed successfully.
    pub loads: u64,
    /// Entries dropped to respect the capacity bound.
    pub evictions: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct RewardKey {
    attraction_id: Uuid,
    user_id: Uuid,
}

/// Thread-safe memo of `(attraction, user) -> points`.
///
/// # Examples
/// ```
/// use tourguide_rewards::RewardCache;
/// use uuid::Uuid;
///
/// let cache = RewardCache::default();
/// let (attraction, user) = (Uuid::new_v4(), Uuid::new_v4());
///
/// let first = cache.get_or_compute(attraction, user, || Ok(42));
/// let second = cache.get_or_compute(attraction, user, || Ok(7));
/// assert_eq!(first, Ok(42));
/// assert_eq!(second, Ok(42));
/// ```
pub struct RewardCache {
    config: RewardCacheConfig,
    entries: Cache<RewardKey, i32>,
    hits: AtomicU64,
    misses: AtomicU64,
    loads: AtomicU64,
    evictions: Arc<AtomicU64>,
}

impl fmt::Debug for RewardCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RewardCache")
            .field("config", &self.config)
            .field("entries", &self.entries.entry_count())
            .finish_non_exhaustive()
    }
}

impl Default for RewardCache {
    fn default() -> Self {
        Self::new(RewardCacheConfig::default())
    }
}

impl RewardCache {
    /// Create an empty cache with the given settings.
    #[must_use]
    pub fn new(config: RewardCacheConfig) -> Self {
        let evictions = Arc::new(AtomicU64::new(0));
        let evicted = Arc::clone(&evictions);
        let entries = Cache::builder()
            .max_capacity(u64::try_from(config.max_entries).unwrap_or(u64::MAX))
            .time_to_live(config.ttl.min(MAX_TTL))
            .eviction_policy(EvictionPolicy::lru())
            .eviction_listener(move |_key, _points, cause| {
                if matches!(cause, RemovalCause::Size) {
                    evicted.fetch_add(1, Ordering::Relaxed);
                }
            })
            .build();
        Self {
            config,
            entries,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            loads: AtomicU64::new(0),
            evictions,
        }
    }

    /// Settings this cache was built with.
    #[must_use]
    pub const fn config(&self) -> RewardCacheConfig {
        self.config
    }

    /// Return the cached points for the pair, computing them at most once.
    ///
    /// Only callers of the same key wait on a running `compute`; other keys
    /// are served while a slow oracle call is in progress.
    ///
    /// # Errors
    /// Returns the error produced by `compute`, either directly or as shared
    /// with concurrent callers waiting on the same key. Waiters receive
    /// [`ProviderError::Interrupted`] when the loading caller panicked.
    ///
    /// # Panics
    /// Re-raises a panic from `compute` on the thread that ran it.
    pub fn get_or_compute<F>(
        &self,
        attraction_id: Uuid,
        user_id: Uuid,
        compute: F,
    ) -> Result<i32, ProviderError>
    where
        F: FnOnce() -> Result<i32, ProviderError>,
    {
        let key = RewardKey {
            attraction_id,
            user_id,
        };
        let mut loaded = false;
        let mut unwound = None;
        let outcome = self.entries.try_get_with(key, || {
            loaded = true;
            self.misses.fetch_add(1, Ordering::Relaxed);
            panic::catch_unwind(AssertUnwindSafe(compute)).unwrap_or_else(|payload| {
                unwound = Some(payload);
                Err(ProviderError::Interrupted { provider: PROVIDER })
            })
        });
        if let Some(payload) = unwound {
            panic::resume_unwind(payload);
        }

        if !loaded {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return outcome.map_err(Arc::unwrap_or_clone);
        }
        match outcome {
            Ok(points) => {
                self.loads.fetch_add(1, Ordering::Relaxed);
                if self.config.max_entries == 0 {
                    self.entries.invalidate(&key);
                }
                Ok(points)
            }
            Err(err) => {
                log::debug!(
                    "reward lookup for attraction {attraction_id} and user {user_id} failed: {err}"
                );
                Err(Arc::unwrap_or_clone(err))
            }
        }
    }

    /// Number of live entries once pending evictions have been applied.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.run_pending_tasks();
        // Invalidated entries stay in `entry_count` until maintenance
        // reaches them; the iterator already skips them.
        self.entries.iter().count()
    }

    /// Whether the cache holds no live entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every stored entry. In-flight loads are left to finish.
    pub fn invalidate_all(&self) {
        self.entries.invalidate_all();
    }

    /// Snapshot of the usage counters.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        self.entries.run_pending_tasks();
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            loads: self.loads.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }
}
