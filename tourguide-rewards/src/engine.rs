//! Per-user reward attribution.

use std::sync::Arc;

use tourguide_core::{
    Attraction, AttractionCatalog, ProximityEngine, RewardOracle, User, UserReward,
};

use crate::{RewardCache, RewardError};

/// Attributes rewards for attractions a user has been near.
///
/// The engine is cheap to share: the catalog, oracle, proximity settings and
/// cache all live behind `Arc`s, and `calculate_rewards` only touches the
/// user it is given.
pub struct RewardEngine {
    catalog: Arc<AttractionCatalog>,
    oracle: Arc<dyn RewardOracle>,
    proximity: Arc<ProximityEngine>,
    cache: Arc<RewardCache>,
}

impl std::fmt::Debug for RewardEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RewardEngine")
            .field("catalog", &self.catalog)
            .field("proximity", &self.proximity)
            .field("cache", &self.cache.stats())
            .finish_non_exhaustive()
    }
}

impl RewardEngine {
    /// Build an engine from its collaborators.
    #[must_use]
    pub fn new(
        catalog: Arc<AttractionCatalog>,
        oracle: Arc<dyn RewardOracle>,
        proximity: Arc<ProximityEngine>,
        cache: Arc<RewardCache>,
    ) -> Self {
        Self {
            catalog,
            oracle,
            proximity,
            cache,
        }
    }

    /// Proximity settings used for attribution.
    #[must_use]
    pub fn proximity(&self) -> &ProximityEngine {
        &self.proximity
    }

    /// Cache of oracle answers.
    #[must_use]
    pub fn cache(&self) -> &RewardCache {
        &self.cache
    }

    /// The shared attraction catalog snapshot.
    ///
    /// # Errors
    /// Returns [`RewardError::Catalog`] when the catalog is not loaded yet
    /// and the location provider fails to serve it.
    pub fn attractions(&self) -> Result<Arc<[Attraction]>, RewardError> {
        self.catalog
            .attractions()
            .map_err(|source| RewardError::Catalog { source })
    }

    /// Points `user` earns for `attraction`, served from the cache when
    /// possible.
    ///
    /// # Errors
    /// Returns [`RewardError::Oracle`] when the oracle fails.
    pub fn reward_points(&self, attraction: &Attraction, user: &User) -> Result<i32, RewardError> {
        let attraction_id = attraction.id;
        let user_id = user.id();
        self.cache
            .get_or_compute(attraction_id, user_id, || {
                self.oracle.attraction_reward_points(attraction_id, user_id)
            })
            .map_err(|source| RewardError::Oracle {
                attraction_id,
                user_id,
                source,
            })
    }

    /// Add a reward for every attraction `user` has come near and has not
    /// been rewarded for yet.
    ///
    /// Attractions are scanned in catalog order; for each one the earliest
    /// qualifying visit earns the reward. Running this again without new
    /// visits adds nothing. Returns the number of rewards added.
    ///
    /// # Errors
    /// Returns [`RewardError::Catalog`] when the catalog cannot be loaded and
    /// [`RewardError::Oracle`] when scoring fails. Rewards added before an
    /// oracle failure are kept.
    pub fn calculate_rewards(&self, user: &User) -> Result<usize, RewardError> {
        let visits = user.visited_locations();
        let attractions = self.attractions()?;
        let mut rewarded = user.rewarded_attraction_names();
        let mut added = 0;

        for attraction in attractions.iter() {
            if rewarded.contains(&attraction.name) {
                continue;
            }
            let Some(visit) = visits
                .iter()
                .find(|visit| self.proximity.is_near_attraction(visit, attraction))
            else {
                continue;
            };
            let points = self.reward_points(attraction, user)?;
            if user.add_reward(UserReward::new(visit.clone(), attraction.clone(), points)) {
                added += 1;
            }
            rewarded.insert(attraction.name.clone());
        }

        if added > 0 {
            log::debug!("added {added} rewards for user {}", user.name());
        }
        Ok(added)
    }
}

#[cfg(test)]
mod tests {
    #![expect(clippy::expect_used, reason = "tests should fail fast")]

    use super::*;
    use geo::Coord;
    use rstest::{fixture, rstest};
    use tourguide_core::test_support::{FixedRewardOracle, StaticLocationProvider, attraction_at};
    use tourguide_core::{LocationProvider, VisitedLocation};
    use uuid::Uuid;

    struct Harness {
        engine: RewardEngine,
        oracle: Arc<FixedRewardOracle>,
    }

    fn harness_with(oracle: FixedRewardOracle, attractions: Vec<Attraction>) -> Harness {
        let oracle = Arc::new(oracle);
        let engine = RewardEngine::new(
            Arc::new(AttractionCatalog::from_attractions(attractions)),
            Arc::clone(&oracle) as Arc<dyn RewardOracle>,
            Arc::new(ProximityEngine::new()),
            Arc::new(RewardCache::default()),
        );
        Harness { engine, oracle }
    }

    #[fixture]
    fn harness() -> Harness {
        harness_with(
            FixedRewardOracle::new(25),
            vec![
                attraction_at("Origin", 0.0, 0.0),
                attraction_at("North", 45.0, 0.0),
            ],
        )
    }

    fn visit(user: &User, latitude: f64, longitude: f64) {
        user.add_visited_location(VisitedLocation::now(
            user.id(),
            Coord {
                x: longitude,
                y: latitude,
            },
        ));
    }

    #[rstest]
    fn rewards_each_nearby_attraction_once(harness: Harness) {
        let user = User::new(Uuid::new_v4(), "jon");
        visit(&user, 0.0, 0.0);
        visit(&user, 0.01, 0.0);

        assert_eq!(harness.engine.calculate_rewards(&user).expect("rewards"), 1);
        assert_eq!(harness.engine.calculate_rewards(&user).expect("rewards"), 0);

        let rewards = user.rewards();
        assert_eq!(rewards.len(), 1);
        let reward = rewards.first().expect("one reward");
        assert_eq!(reward.attraction.name, "Origin");
        assert_eq!(reward.reward_points, 25);
        // The earliest qualifying visit wins.
        assert_eq!(reward.visited_location.location, Coord { x: 0.0, y: 0.0 });
    }

    #[rstest]
    fn empty_history_earns_nothing(harness: Harness) {
        let user = User::new(Uuid::new_v4(), "jon");
        assert_eq!(harness.engine.calculate_rewards(&user).expect("rewards"), 0);
        assert_eq!(harness.oracle.calls(), 0);
    }

    #[rstest]
    fn wider_buffer_rewards_every_attraction(harness: Harness) {
        let user = User::new(Uuid::new_v4(), "jon");
        visit(&user, 0.0, 0.0);
        harness
            .engine
            .proximity()
            .set_buffer_miles(f64::from(i32::MAX))
            .expect("valid buffer");

        assert_eq!(harness.engine.calculate_rewards(&user).expect("rewards"), 2);
        let names: Vec<String> = user
            .rewards()
            .into_iter()
            .map(|reward| reward.attraction.name)
            .collect();
        assert_eq!(names, vec!["Origin".to_owned(), "North".to_owned()]);
    }

    #[rstest]
    fn points_are_cached_per_user(harness: Harness) {
        let attraction = attraction_at("Origin", 0.0, 0.0);
        let user = User::new(Uuid::new_v4(), "jon");
        let other = User::new(Uuid::new_v4(), "jane");

        assert_eq!(harness.engine.reward_points(&attraction, &user).expect("points"), 25);
        assert_eq!(harness.engine.reward_points(&attraction, &user).expect("points"), 25);
        assert_eq!(harness.oracle.calls(), 1);
        assert_eq!(harness.engine.reward_points(&attraction, &other).expect("points"), 25);
        assert_eq!(harness.oracle.calls(), 2);
    }

    #[rstest]
    fn oracle_failures_are_reported_and_retried() {
        let user = User::new(Uuid::new_v4(), "jon");
        let Harness { engine, oracle } = harness_with(
            FixedRewardOracle::new(5).failing_for(user.id()),
            vec![attraction_at("Origin", 0.0, 0.0)],
        );
        visit(&user, 0.0, 0.0);

        let err = engine.calculate_rewards(&user).expect_err("oracle fails");
        assert!(matches!(err, RewardError::Oracle { user_id, .. } if user_id == user.id()));
        assert!(user.rewards().is_empty());

        // Failures are not cached, so the next attempt calls the oracle again.
        assert!(engine.calculate_rewards(&user).is_err());
        assert_eq!(oracle.calls(), 2);
    }

    #[rstest]
    fn catalog_failures_surface_as_catalog_errors() {
        let provider: Arc<dyn LocationProvider> =
            Arc::new(StaticLocationProvider::new(Vec::new()).with_failing_catalog(1));
        let engine = RewardEngine::new(
            Arc::new(AttractionCatalog::new(provider)),
            Arc::new(FixedRewardOracle::new(1)),
            Arc::new(ProximityEngine::new()),
            Arc::new(RewardCache::default()),
        );
        let user = User::new(Uuid::new_v4(), "jon");

        assert!(matches!(
            engine.calculate_rewards(&user),
            Err(RewardError::Catalog { .. })
        ));
        assert_eq!(engine.calculate_rewards(&user).expect("catalog recovers"), 0);
    }
}
