//! Seeded stand-ins for the external GPS and reward services.
//!
//! Both providers draw from a `ChaCha8Rng` behind a mutex, so a given seed
//! yields the same sequence of answers regardless of the platform. The
//! optional latency is slept on the calling thread to mimic a slow remote
//! call.

use std::sync::{Mutex, PoisonError};
use std::thread;
use std::time::Duration;

use geo::Coord;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tourguide_core::{Attraction, LocationProvider, ProviderError, RewardOracle, VisitedLocation};
use uuid::Uuid;

use crate::us_attractions;

/// Web-Mercator latitude bound used for generated positions.
pub const MAX_LATITUDE: f64 = 85.051_128_78;

/// Longitude bound used for generated positions.
pub const MAX_LONGITUDE: f64 = 180.0;

/// Lowest number of points the simulated oracle awards.
pub const MIN_REWARD_POINTS: i32 = 1;

/// Highest number of points the simulated oracle awards.
pub const MAX_REWARD_POINTS: i32 = 1_000;

/// A random position within the Web-Mercator bounds.
pub fn random_coordinate(rng: &mut impl Rng) -> Coord<f64> {
    Coord {
        x: rng.gen_range(-MAX_LONGITUDE..=MAX_LONGITUDE),
        y: rng.gen_range(-MAX_LATITUDE..=MAX_LATITUDE),
    }
}

fn pause(latency: Duration) {
    if !latency.is_zero() {
        thread::sleep(latency);
    }
}

/// Simulated GPS service reporting users at random positions.
#[derive(Debug)]
pub struct SimulatedLocationProvider {
    rng: Mutex<ChaCha8Rng>,
    latency: Duration,
    attractions: Vec<Attraction>,
}

impl SimulatedLocationProvider {
    /// Provider seeded with `seed`, serving the US attraction catalog.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(ChaCha8Rng::seed_from_u64(seed)),
            latency: Duration::ZERO,
            attractions: us_attractions(),
        }
    }

    /// Sleep for `latency` on every location request.
    #[must_use]
    pub const fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Serve `attractions` instead of the US catalog.
    #[must_use]
    pub fn with_attractions(mut self, attractions: Vec<Attraction>) -> Self {
        self.attractions = attractions;
        self
    }
}

impl LocationProvider for SimulatedLocationProvider {
    fn user_location(&self, user_id: Uuid) -> Result<VisitedLocation, ProviderError> {
        pause(self.latency);
        let location = {
            let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
            random_coordinate(&mut *rng)
        };
        Ok(VisitedLocation::now(user_id, location))
    }

    fn attractions(&self) -> Result<Vec<Attraction>, ProviderError> {
        Ok(self.attractions.clone())
    }
}

/// Simulated reward service awarding random points.
///
/// Every call draws a fresh value; stable answers per user come from the
/// engine's reward cache.
#[derive(Debug)]
pub struct SimulatedRewardOracle {
    rng: Mutex<ChaCha8Rng>,
    latency: Duration,
}

impl SimulatedRewardOracle {
    /// Oracle seeded with `seed`.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(ChaCha8Rng::seed_from_u64(seed)),
            latency: Duration::ZERO,
        }
    }

    /// Sleep for `latency` before answering.
    #[must_use]
    pub const fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }
}

impl RewardOracle for SimulatedRewardOracle {
    fn attraction_reward_points(
        &self,
        _attraction_id: Uuid,
        _user_id: Uuid,
    ) -> Result<i32, ProviderError> {
        pause(self.latency);
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(rng.gen_range(MIN_REWARD_POINTS..=MAX_REWARD_POINTS))
    }
}

#[cfg(test)]
mod tests {
    #![expect(clippy::expect_used, reason = "tests should fail fast")]

    use super::*;
    use rstest::rstest;

    #[rstest]
    fn locations_stay_within_bounds() {
        let provider = SimulatedLocationProvider::new(7);
        for _ in 0..500 {
            let visit = provider.user_location(Uuid::nil()).expect("location");
            assert!(visit.latitude().abs() <= MAX_LATITUDE);
            assert!(visit.longitude().abs() <= MAX_LONGITUDE);
        }
    }

    #[rstest]
    fn equal_seeds_give_equal_sequences() {
        let first = SimulatedLocationProvider::new(42);
        let second = SimulatedLocationProvider::new(42);
        for _ in 0..10 {
            let a = first.user_location(Uuid::nil()).expect("location");
            let b = second.user_location(Uuid::nil()).expect("location");
            assert_eq!(a.location, b.location);
        }
    }

    #[rstest]
    fn oracle_points_are_in_range() {
        let oracle = SimulatedRewardOracle::new(3);
        for _ in 0..500 {
            let points = oracle
                .attraction_reward_points(Uuid::nil(), Uuid::nil())
                .expect("points");
            assert!((MIN_REWARD_POINTS..=MAX_REWARD_POINTS).contains(&points));
        }
    }

    #[rstest]
    fn serves_the_us_catalog_by_default() {
        let provider = SimulatedLocationProvider::new(1);
        assert_eq!(provider.attractions().expect("catalog").len(), 26);
    }
}
