//! Tracking service for the tour guide reward engine.
//!
//! [`TourGuideService`] ties the user roster, the external providers and
//! the reward engine together and exposes the operations callers use:
//! locating users, listing their rewards, finding nearby attractions and
//! recomputing rewards in bulk. [`Tracker`] runs the periodic tracking
//! cycle on its own scheduling thread and worker pool.
//!
//! All state is owned by the service instance; there are no globals.

#![forbid(unsafe_code)]

mod config;
mod error;
mod roster;
mod service;
mod tracker;

pub use config::{DEFAULT_NEARBY_ATTRACTION_COUNT, DEFAULT_TRACKING_INTERVAL, EngineConfig};
pub use error::{ServiceError, TrackError, TrackerError};
pub use roster::UserRoster;
pub use service::{NearbyAttraction, TourGuideService};
pub use tracker::{CycleSummary, Tracker};
