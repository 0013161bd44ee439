//! Error types raised while attributing rewards.

use thiserror::Error;
use tourguide_core::ProviderError;
use uuid::Uuid;

/// Errors raised while computing rewards for one user or a batch of users.
#[derive(Debug, Error)]
pub enum RewardError {
    /// The attraction catalog could not be loaded.
    #[error("failed to load the attraction catalog")]
    Catalog {
        /// Source error from the location provider.
        #[source]
        source: ProviderError,
    },
    /// The reward oracle failed to score an attraction for a user.
    #[error("failed to score attraction {attraction_id} for user {user_id}")]
    Oracle {
        /// Attraction being scored.
        attraction_id: Uuid,
        /// User the points were requested for.
        user_id: Uuid,
        /// Source error from the reward oracle.
        #[source]
        source: ProviderError,
    },
    /// The dedicated worker pool could not be created.
    #[error("failed to build the reward worker pool")]
    WorkerPool(#[source] rayon::ThreadPoolBuildError),
    /// A per-user task panicked and was isolated from the rest of the batch.
    #[error("reward task for user {user_name} panicked: {message}")]
    TaskPanicked {
        /// Name of the user whose task panicked.
        user_name: String,
        /// Panic payload rendered as text.
        message: String,
    },
}

impl RewardError {
    /// Whether the failure came from a provider rather than the engine.
    #[must_use]
    pub const fn is_provider_failure(&self) -> bool {
        matches!(self, Self::Catalog { .. } | Self::Oracle { .. })
    }
}
