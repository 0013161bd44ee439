//! In-process simulations of the external services used by the tour guide
//! engine.
//!
//! Responsibilities:
//! - Stand in for the GPS service ([`SimulatedLocationProvider`]) and the
//!   reward service ([`SimulatedRewardOracle`]) with seeded randomness and
//!   optional latency.
//! - Provide the fixed US attraction catalog ([`us_attractions`]).
//! - Generate internal test users ([`InternalUsers`]).
//!
//! Boundaries:
//! - Do not encode reward rules (live in `tourguide-rewards`).
//!
//! Invariants:
//! - The same seed always yields the same answers.

#![forbid(unsafe_code)]

mod catalog;
mod providers;
mod users;

pub use catalog::us_attractions;
pub use providers::{
    MAX_LATITUDE, MAX_LONGITUDE, MAX_REWARD_POINTS, MIN_REWARD_POINTS, SimulatedLocationProvider,
    SimulatedRewardOracle, random_coordinate,
};
pub use users::{DEFAULT_HISTORY_LEN, InternalUsers};
