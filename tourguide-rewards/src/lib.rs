//! Reward attribution for tracked users.
//!
//! The crate turns a user's visit history into rewards:
//! - [`RewardCache`] memoises oracle answers per `(attraction, user)` with a
//!   TTL, a size bound and single-flight loading, so concurrent workers never
//!   score the same pair twice.
//! - [`RewardEngine`] scans the attraction catalog against a user's visits
//!   and appends one reward per attraction the user came near.
//! - [`ParallelRewardRunner`] fans a batch of users out over a dedicated,
//!   bounded thread pool and reports per-user failures in a
//!   [`BatchReport`].
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//!
//! use geo::Coord;
//! use tourguide_core::test_support::{FixedRewardOracle, attraction_at};
//! use tourguide_core::{AttractionCatalog, ProximityEngine, User, VisitedLocation};
//! use tourguide_rewards::{ParallelRewardRunner, RewardCache, RewardEngine};
//! use uuid::Uuid;
//!
//! let engine = Arc::new(RewardEngine::new(
//!     Arc::new(AttractionCatalog::from_attractions(vec![attraction_at("Origin", 0.0, 0.0)])),
//!     Arc::new(FixedRewardOracle::new(10)),
//!     Arc::new(ProximityEngine::new()),
//!     Arc::new(RewardCache::default()),
//! ));
//! let user = Arc::new(User::new(Uuid::new_v4(), "jon"));
//! user.add_visited_location(VisitedLocation::now(user.id(), Coord { x: 0.0, y: 0.0 }));
//!
//! let report = ParallelRewardRunner::new(engine).run_all(&[Arc::clone(&user)], 4)?;
//! assert!(report.is_success());
//! assert_eq!(user.total_reward_points(), 10);
//! # Ok::<(), tourguide_rewards::RewardError>(())
//! ```

#![forbid(unsafe_code)]

mod cache;
mod engine;
mod error;
mod report;
mod runner;

pub use cache::{
    CacheStats, DEFAULT_REWARD_CACHE_CAPACITY, DEFAULT_REWARD_TTL, RewardCache,
    RewardCacheConfig,
};
pub use engine::RewardEngine;
pub use error::RewardError;
pub use report::{BatchReport, TaskOutcome, UserFailure, fan_out};
pub use runner::ParallelRewardRunner;
