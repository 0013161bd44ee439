//! Error types raised by the service and the tracker.

use thiserror::Error;
use tourguide_core::{ProviderError, ProximityError};
use tourguide_rewards::RewardError;

/// Errors raised by [`crate::TourGuideService`] operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// No user with this name is registered.
    #[error("user {name} is not registered")]
    UserNotFound {
        /// Name that was looked up.
        name: String,
    },
    /// The user has no location history and the provider could not supply
    /// a fresh location.
    #[error("user {user_name} has no location history and could not be located")]
    EmptyHistory {
        /// Name of the affected user.
        user_name: String,
        /// Source error from the location provider.
        #[source]
        source: ProviderError,
    },
    /// The configuration was rejected.
    #[error("invalid engine configuration")]
    Configuration(#[from] ProximityError),
    /// Tracking a single user failed.
    #[error(transparent)]
    Track(#[from] TrackError),
    /// Reward computation failed.
    #[error(transparent)]
    Rewards(#[from] RewardError),
}

/// Errors raised while tracking one user.
#[derive(Debug, Error)]
pub enum TrackError {
    /// The location provider failed to report the user's position.
    #[error("failed to locate user {user_name}")]
    Location {
        /// Name of the affected user.
        user_name: String,
        /// Source error from the location provider.
        #[source]
        source: ProviderError,
    },
    /// Rewards could not be recomputed after the location refresh.
    #[error("failed to recompute rewards for user {user_name}")]
    Rewards {
        /// Name of the affected user.
        user_name: String,
        /// Source error from the reward engine.
        #[source]
        source: RewardError,
    },
    /// The tracking task panicked.
    #[error("tracking task for user {user_name} panicked: {message}")]
    Panicked {
        /// Name of the affected user.
        user_name: String,
        /// Panic payload rendered as text.
        message: String,
    },
}

/// Errors raised when starting a [`crate::Tracker`].
#[derive(Debug, Error)]
pub enum TrackerError {
    /// The tracker is already running.
    #[error("tracker is already running")]
    AlreadyRunning,
    /// The tracker was stopped and cannot be restarted.
    #[error("tracker has been stopped and cannot be restarted")]
    Stopped,
    /// The scheduling thread could not be spawned.
    #[error("failed to spawn the tracker scheduling thread")]
    Spawn(#[source] std::io::Error),
    /// The scheduling runtime could not be built.
    #[error("failed to build the tracker runtime")]
    Runtime(#[source] std::io::Error),
    /// The tracker's worker pool could not be built.
    #[error("failed to build the tracker worker pool")]
    WorkerPool(#[source] rayon::ThreadPoolBuildError),
}
