use std::time::Duration;

use thiserror::Error;

/// Errors raised by external providers.
///
/// The type is `Clone` so one failed scoring call can be handed to every
/// caller waiting on the same result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// The provider could not serve the request.
    #[error("{provider} is unavailable: {message}")]
    Unavailable {
        /// Which collaborator failed, e.g. `"location provider"`.
        provider: &'static str,
        /// Provider-supplied detail.
        message: String,
    },
    /// The provider did not answer in time.
    #[error("{provider} timed out after {}ms", .after.as_millis())]
    Timeout {
        /// Which collaborator timed out.
        provider: &'static str,
        /// How long the caller waited.
        after: Duration,
    },
    /// The computation was abandoned before producing a value.
    #[error("{provider} call was interrupted before completing")]
    Interrupted {
        /// Which collaborator was being called.
        provider: &'static str,
    },
}

impl ProviderError {
    /// Shorthand for [`ProviderError::Unavailable`].
    pub fn unavailable(provider: &'static str, message: impl Into<String>) -> Self {
        Self::Unavailable {
            provider,
            message: message.into(),
        }
    }
}
