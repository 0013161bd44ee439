//! Core domain types for the tour guide reward engine.
//!
//! The crate holds the leaf components every other crate builds on:
//! great-circle distance, the user/visit/reward data model, proximity
//! checks against the attraction catalog and the seams to the external
//! location provider and scoring oracle.
//!
//! Coordinates are [`geo::Coord`] values in WGS84 degrees with
//! `x = longitude` and `y = latitude`.

#![forbid(unsafe_code)]

pub mod attraction;
pub mod catalog;
pub mod distance;
pub mod location;
pub mod provider;
pub mod proximity;
pub mod user;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use attraction::Attraction;
pub use catalog::AttractionCatalog;
pub use distance::{STATUTE_MILES_PER_NAUTICAL_MILE, distance_miles};
pub use location::{CoordinateError, VisitedLocation, coordinate};
pub use provider::{LocationProvider, ProviderError, RewardOracle};
pub use proximity::{
    ATTRACTION_PROXIMITY_RANGE_MILES, DEFAULT_PROXIMITY_BUFFER_MILES, ProximityEngine,
    ProximityError, is_near,
};
pub use user::{User, UserReward};
