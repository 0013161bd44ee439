//! Facade crate for the tour guide reward engine.
//!
//! This crate re-exports the domain types, the reward engine and the tour
//! guide service, and exposes the simulated providers behind the
//! `simulation` feature flag.

#![forbid(unsafe_code)]

pub use tourguide_core::{
    Attraction, AttractionCatalog, LocationProvider, ProviderError, ProximityEngine,
    ProximityError, RewardOracle, User, UserReward, VisitedLocation, distance_miles,
};

pub use tourguide_rewards::{
    BatchReport, ParallelRewardRunner, RewardCache, RewardCacheConfig, RewardEngine, RewardError,
};

pub use tourguide_service::{
    CycleSummary, EngineConfig, NearbyAttraction, ServiceError, TourGuideService, TrackError,
    Tracker, TrackerError,
};

#[cfg(feature = "simulation")]
pub use tourguide_sim::{
    InternalUsers, SimulatedLocationProvider, SimulatedRewardOracle, us_attractions,
};
