//! Error types emitted by the tour guide CLI.
//!
//! Keep this error type reasonably small, as every command helper returns
//! `Result<_, CliError>` and the workspace enables `clippy::result_large_err`.

use std::sync::Arc;

use thiserror::Error;
use tourguide_service::{ServiceError, TrackerError};

/// Errors emitted by the tour guide CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        /// Long flag name of the option.
        field: &'static str,
        /// Environment variable that can supply it.
        env: &'static str,
    },
    /// An option was present but outside its accepted range.
    #[error("invalid {field}: {reason}")]
    InvalidArgument {
        /// Long flag name of the option.
        field: &'static str,
        /// What the accepted range is.
        reason: &'static str,
    },
    /// Building or driving the service failed.
    #[error(transparent)]
    Service(Box<ServiceError>),
    /// The background tracker could not be started.
    #[error("tracker failed: {0}")]
    Tracker(#[from] TrackerError),
    /// The tracker did not finish the requested cycles in time.
    #[error("tracker completed {completed} of {requested} cycles before timing out")]
    TrackTimedOut {
        /// Cycles completed before the deadline.
        completed: u64,
        /// Cycles the command asked for.
        requested: u64,
    },
    /// Serialising the command summary failed.
    #[error("failed to serialise summary: {0}")]
    SerialiseSummary(#[source] serde_json::Error),
    /// Writing the command output failed.
    #[error("failed to write output: {0}")]
    WriteOutput(#[source] std::io::Error),
}

impl From<ServiceError> for CliError {
    fn from(error: ServiceError) -> Self {
        Self::Service(Box::new(error))
    }
}
