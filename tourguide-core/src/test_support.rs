//! Test-only, in-memory providers used by unit and behaviour tests.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use geo::Coord;
use uuid::Uuid;

use crate::{Attraction, LocationProvider, ProviderError, RewardOracle, VisitedLocation};

/// Deterministic `LocationProvider` backed by a fixed catalog.
///
/// Every user is reported at the default location unless a per-user
/// location was configured. Users listed through
/// [`StaticLocationProvider::failing_for`] always fail.
#[derive(Debug, Default)]
pub struct StaticLocationProvider {
    attractions: Vec<Attraction>,
    default_location: Coord<f64>,
    locations: HashMap<Uuid, Coord<f64>>,
    failing_users: HashSet<Uuid>,
    latency: Duration,
    catalog_failures: AtomicUsize,
    catalog_calls: AtomicUsize,
    location_calls: AtomicUsize,
}

impl StaticLocationProvider {
    /// Provider serving `attractions` and reporting users at the origin.
    pub fn new(attractions: Vec<Attraction>) -> Self {
        Self {
            attractions,
            ..Self::default()
        }
    }

    /// Report users without an explicit location at `location`.
    #[must_use]
    pub fn at(mut self, location: Coord<f64>) -> Self {
        self.default_location = location;
        self
    }

    /// Report `user_id` at `location`.
    #[must_use]
    pub fn with_user_location(mut self, user_id: Uuid, location: Coord<f64>) -> Self {
        self.locations.insert(user_id, location);
        self
    }

    /// Fail every location request for `user_id`.
    #[must_use]
    pub fn failing_for(mut self, user_id: Uuid) -> Self {
        self.failing_users.insert(user_id);
        self
    }

    /// Fail the first `failures` catalog requests.
    #[must_use]
    pub fn with_failing_catalog(self, failures: usize) -> Self {
        self.catalog_failures.store(failures, Ordering::SeqCst);
        self
    }

    /// Sleep for `latency` on every location request.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Number of catalog requests served or failed so far.
    pub fn catalog_calls(&self) -> usize {
        self.catalog_calls.load(Ordering::SeqCst)
    }

    /// Number of location requests served or failed so far.
    pub fn location_calls(&self) -> usize {
        self.location_calls.load(Ordering::SeqCst)
    }
}

impl LocationProvider for StaticLocationProvider {
    fn user_location(&self, user_id: Uuid) -> Result<VisitedLocation, ProviderError> {
        self.location_calls.fetch_add(1, Ordering::SeqCst);
        if !self.latency.is_zero() {
            thread::sleep(self.latency);
        }
        if self.failing_users.contains(&user_id) {
            return Err(ProviderError::unavailable(
                "location provider",
                format!("no fix for user {user_id}"),
            ));
        }
        let location = self
            .locations
            .get(&user_id)
            .copied()
            .unwrap_or(self.default_location);
        Ok(VisitedLocation::now(user_id, location))
    }

    fn attractions(&self) -> Result<Vec<Attraction>, ProviderError> {
        self.catalog_calls.fetch_add(1, Ordering::SeqCst);
        let failing = self
            .catalog_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok();
        if failing {
            return Err(ProviderError::unavailable(
                "location provider",
                "catalog temporarily unavailable",
            ));
        }
        Ok(self.attractions.clone())
    }
}

/// `RewardOracle` returning the same number of points for every pair.
#[derive(Debug, Default)]
pub struct FixedRewardOracle {
    points: i32,
    failing_users: HashSet<Uuid>,
    latency: Duration,
    calls: AtomicUsize,
}

impl FixedRewardOracle {
    /// Oracle answering `points` for every attraction and user.
    pub fn new(points: i32) -> Self {
        Self {
            points,
            ..Self::default()
        }
    }

    /// Fail every request made on behalf of `user_id`.
    #[must_use]
    pub fn failing_for(mut self, user_id: Uuid) -> Self {
        self.failing_users.insert(user_id);
        self
    }

    /// Sleep for `latency` before answering.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Number of oracle invocations so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl RewardOracle for FixedRewardOracle {
    fn attraction_reward_points(
        &self,
        attraction_id: Uuid,
        user_id: Uuid,
    ) -> Result<i32, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.latency.is_zero() {
            thread::sleep(self.latency);
        }
        if self.failing_users.contains(&user_id) {
            return Err(ProviderError::unavailable(
                "reward oracle",
                format!("cannot score attraction {attraction_id} for user {user_id}"),
            ));
        }
        Ok(self.points)
    }
}

/// Build an attraction at `latitude`/`longitude` with a fresh id.
pub fn attraction_at(name: &str, latitude: f64, longitude: f64) -> Attraction {
    Attraction::new(
        Uuid::new_v4(),
        name,
        Coord {
            x: longitude,
            y: latitude,
        },
    )
}
