//! User-facing operations over the roster, the providers and the reward
//! engine.

use std::sync::Arc;

use geo::Coord;
use rayon::ThreadPool;
use tokio_util::sync::CancellationToken;
use tourguide_core::{
    AttractionCatalog, LocationProvider, ProximityEngine, RewardOracle, User, UserReward,
    VisitedLocation,
};
use tourguide_rewards::{
    BatchReport, ParallelRewardRunner, RewardCache, RewardEngine, RewardError, TaskOutcome,
    fan_out,
};

use crate::{EngineConfig, ServiceError, TrackError, UserRoster};

/// An attraction close to a user, as reported by
/// [`TourGuideService::nearby_attractions`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NearbyAttraction {
    /// Attraction name.
    pub attraction_name: String,
    /// Attraction position.
    pub attraction_location: Coord<f64>,
    /// Position the distance was measured from.
    pub user_location: Coord<f64>,
    /// Distance between the two positions in statute miles.
    pub distance_miles: f64,
    /// Points the user would earn for the attraction.
    pub reward_points: i32,
}

/// Entry point for tracking users and querying their rewards.
///
/// The service owns the roster and the proximity settings; nothing is held
/// in process-wide state, so several services can coexist.
pub struct TourGuideService {
    config: EngineConfig,
    roster: UserRoster,
    locations: Arc<dyn LocationProvider>,
    engine: Arc<RewardEngine>,
}

impl std::fmt::Debug for TourGuideService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TourGuideService")
            .field("config", &self.config)
            .field("users", &self.roster.len())
            .field("engine", &self.engine)
            .finish_non_exhaustive()
    }
}

impl TourGuideService {
    /// Build a service around the external providers.
    ///
    /// # Errors
    /// Returns [`ServiceError::Configuration`] when the configured proximity
    /// buffer is negative or not finite.
    pub fn new(
        locations: Arc<dyn LocationProvider>,
        oracle: Arc<dyn RewardOracle>,
        config: EngineConfig,
    ) -> Result<Self, ServiceError> {
        let proximity = ProximityEngine::with_buffer_miles(config.proximity_buffer_miles)?;
        let engine = RewardEngine::new(
            Arc::new(AttractionCatalog::new(Arc::clone(&locations))),
            oracle,
            Arc::new(proximity),
            Arc::new(RewardCache::new(config.cache_config())),
        );
        Ok(Self {
            config,
            roster: UserRoster::new(),
            locations,
            engine: Arc::new(engine),
        })
    }

    /// Configuration the service was built with.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Live proximity settings. Buffer changes apply to later evaluations.
    #[must_use]
    pub fn proximity(&self) -> &ProximityEngine {
        self.engine.proximity()
    }

    /// The reward engine shared by every operation.
    #[must_use]
    pub const fn engine(&self) -> &Arc<RewardEngine> {
        &self.engine
    }

    /// Registered users.
    #[must_use]
    pub const fn roster(&self) -> &UserRoster {
        &self.roster
    }

    /// Register `user` unless the name is taken. Returns `true` when added.
    pub fn add_user(&self, user: User) -> bool {
        self.roster.add_user(Arc::new(user))
    }

    /// Look up a registered user by name.
    ///
    /// # Errors
    /// Returns [`ServiceError::UserNotFound`] for unknown names.
    pub fn user(&self, name: &str) -> Result<Arc<User>, ServiceError> {
        self.roster.get(name)
    }

    /// Every registered user, ordered by name.
    #[must_use]
    pub fn all_users(&self) -> Vec<Arc<User>> {
        self.roster.snapshot()
    }

    /// The user's last known location, refreshing it when the history is
    /// empty.
    ///
    /// # Errors
    /// Returns [`ServiceError::EmptyHistory`] when a refresh is needed and
    /// the location provider fails, and [`ServiceError::Rewards`] when
    /// rewards cannot be recomputed after the refresh.
    pub fn user_location(&self, user: &User) -> Result<VisitedLocation, ServiceError> {
        if let Some(visit) = user.last_visited_location() {
            return Ok(visit);
        }
        match self.track(user) {
            Ok((visit, _)) => Ok(visit),
            Err(TrackError::Location { user_name, source }) => {
                Err(ServiceError::EmptyHistory { user_name, source })
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Fetch the user's current location, append it to their history and
    /// recompute their rewards.
    ///
    /// # Errors
    /// Returns [`TrackError::Location`] when the provider fails, in which
    /// case the history is unchanged, and [`TrackError::Rewards`] when the
    /// recomputation fails after the visit was recorded.
    pub fn track_user_location(&self, user: &User) -> Result<VisitedLocation, TrackError> {
        self.track(user).map(|(visit, _)| visit)
    }

    /// Snapshot of the user's rewards.
    #[must_use]
    pub fn user_rewards(&self, user: &User) -> Vec<UserReward> {
        user.rewards()
    }

    /// Sum of the user's reward points.
    #[must_use]
    pub fn total_reward_points(&self, user: &User) -> i64 {
        user.total_reward_points()
    }

    /// The closest attractions to the user's current location.
    ///
    /// # Errors
    /// Propagates failures from [`Self::user_location`] and from
    /// [`Self::nearby_attractions_from`].
    pub fn nearby_attractions(&self, user: &User) -> Result<Vec<NearbyAttraction>, ServiceError> {
        let visit = self.user_location(user)?;
        self.nearby_attractions_from(user, &visit)
    }

    /// The closest attractions to `visit`, nearest first, with the points
    /// `user` would earn for each.
    ///
    /// The user's history and rewards are left untouched.
    ///
    /// # Errors
    /// Returns [`ServiceError::Rewards`] when the catalog cannot be loaded or
    /// the oracle fails.
    pub fn nearby_attractions_from(
        &self,
        user: &User,
        visit: &VisitedLocation,
    ) -> Result<Vec<NearbyAttraction>, ServiceError> {
        let catalog = self.engine.attractions()?;
        self.proximity()
            .closest_attractions_with_distance(
                visit.location,
                &catalog,
                self.config.nearby_attraction_count,
            )
            .into_iter()
            .map(|(attraction, distance_miles)| {
                let reward_points = self.engine.reward_points(&attraction, user)?;
                Ok(NearbyAttraction {
                    attraction_name: attraction.name,
                    attraction_location: attraction.location,
                    user_location: visit.location,
                    distance_miles,
                    reward_points,
                })
            })
            .collect()
    }

    /// Recompute rewards for every registered user on a dedicated pool of
    /// `parallelism` threads.
    ///
    /// # Errors
    /// Returns [`ServiceError::Rewards`] only when the pool cannot be built;
    /// per-user failures are part of the report.
    pub fn calculate_all_rewards_in_parallel(
        &self,
        parallelism: usize,
    ) -> Result<BatchReport<RewardError>, ServiceError> {
        let users = self.all_users();
        let runner = ParallelRewardRunner::new(Arc::clone(&self.engine));
        Ok(runner.run_all(&users, parallelism)?)
    }

    /// Track every registered user once on `pool`.
    ///
    /// Users whose task has not started when `cancel` fires are skipped.
    pub(crate) fn track_all(
        &self,
        pool: &ThreadPool,
        cancel: &CancellationToken,
    ) -> BatchReport<TrackError> {
        let users = self.all_users();
        fan_out(
            pool,
            &users,
            |user| {
                if cancel.is_cancelled() {
                    return Ok(TaskOutcome::Skipped);
                }
                self.track(user)
                    .map(|(_, added)| TaskOutcome::Completed(added))
            },
            |user, message| TrackError::Panicked {
                user_name: user.name().to_owned(),
                message,
            },
        )
    }

    fn track(&self, user: &User) -> Result<(VisitedLocation, usize), TrackError> {
        let visit = self
            .locations
            .user_location(user.id())
            .map_err(|source| TrackError::Location {
                user_name: user.name().to_owned(),
                source,
            })?;
        user.add_visited_location(visit.clone());
        let added = self
            .engine
            .calculate_rewards(user)
            .map_err(|source| TrackError::Rewards {
                user_name: user.name().to_owned(),
                source,
            })?;
        Ok((visit, added))
    }
}

#[cfg(test)]
mod tests {
    #![expect(clippy::expect_used, reason = "tests should fail fast")]

    use super::*;
    use rstest::{fixture, rstest};
    use tourguide_core::Attraction;
    use tourguide_core::test_support::{FixedRewardOracle, StaticLocationProvider, attraction_at};
    use uuid::Uuid;

    fn catalog() -> Vec<Attraction> {
        vec![
            attraction_at("Origin", 0.0, 0.0),
            attraction_at("One", 1.0, 0.0),
            attraction_at("Two", 2.0, 0.0),
            attraction_at("Three", 3.0, 0.0),
            attraction_at("Four", 4.0, 0.0),
            attraction_at("Five", 5.0, 0.0),
            attraction_at("Six", 6.0, 0.0),
        ]
    }

    fn service_with(provider: StaticLocationProvider) -> TourGuideService {
        TourGuideService::new(
            Arc::new(provider),
            Arc::new(FixedRewardOracle::new(12)),
            EngineConfig::default().with_tracker_workers(2),
        )
        .expect("valid configuration")
    }

    #[fixture]
    fn service() -> TourGuideService {
        service_with(StaticLocationProvider::new(catalog()))
    }

    #[rstest]
    fn rejects_invalid_buffers() {
        let result = TourGuideService::new(
            Arc::new(StaticLocationProvider::default()),
            Arc::new(FixedRewardOracle::new(1)),
            EngineConfig::default().with_proximity_buffer_miles(-1.0),
        );
        assert!(matches!(result, Err(ServiceError::Configuration(_))));
    }

    #[rstest]
    fn tracking_appends_a_visit_and_rewards_it(service: TourGuideService) {
        let user = User::new(Uuid::new_v4(), "jon");
        let visit = service.track_user_location(&user).expect("tracked");

        assert_eq!(visit.user_id, user.id());
        assert_eq!(user.visited_locations().len(), 1);
        let rewards = service.user_rewards(&user);
        assert_eq!(rewards.len(), 1);
        assert_eq!(service.total_reward_points(&user), 12);
    }

    #[rstest]
    fn user_location_reuses_history(service: TourGuideService) {
        let user = User::new(Uuid::new_v4(), "jon");
        let known = VisitedLocation::now(user.id(), Coord { x: 9.0, y: 9.0 });
        user.add_visited_location(known.clone());

        assert_eq!(service.user_location(&user).expect("known location"), known);
        assert_eq!(user.visited_locations().len(), 1);
    }

    #[rstest]
    fn user_location_refreshes_empty_history(service: TourGuideService) {
        let user = User::new(Uuid::new_v4(), "jon");
        let visit = service.user_location(&user).expect("refreshed");
        assert_eq!(visit.location, Coord { x: 0.0, y: 0.0 });
        assert_eq!(user.visited_locations().len(), 1);
    }

    #[rstest]
    fn empty_history_with_failing_provider_is_an_error() {
        let user = User::new(Uuid::new_v4(), "jon");
        let service = service_with(StaticLocationProvider::new(catalog()).failing_for(user.id()));

        assert!(matches!(
            service.user_location(&user),
            Err(ServiceError::EmptyHistory { user_name, .. }) if user_name == "jon"
        ));
        assert!(user.visited_locations().is_empty());
    }

    #[rstest]
    fn nearby_attractions_are_sorted_and_scored(service: TourGuideService) {
        let user = User::new(Uuid::new_v4(), "jon");
        let nearby = service.nearby_attractions(&user).expect("nearby");

        let names: Vec<&str> = nearby.iter().map(|n| n.attraction_name.as_str()).collect();
        assert_eq!(names, vec!["Origin", "One", "Two", "Three", "Four"]);
        assert!(nearby.windows(2).all(|pair| {
            pair.first().map(|n| n.distance_miles) <= pair.get(1).map(|n| n.distance_miles)
        }));
        assert!(nearby.iter().all(|n| n.reward_points == 12));
        assert!(nearby.iter().all(|n| n.user_location == Coord { x: 0.0, y: 0.0 }));
    }

    #[rstest]
    fn nearby_attractions_do_not_touch_rewards(service: TourGuideService) {
        let user = User::new(Uuid::new_v4(), "jon");
        let visit = VisitedLocation::now(user.id(), Coord { x: 0.0, y: 2.0 });
        let nearby = service
            .nearby_attractions_from(&user, &visit)
            .expect("nearby");

        assert_eq!(nearby.first().map(|n| n.attraction_name.as_str()), Some("Two"));
        assert!(user.visited_locations().is_empty());
        assert!(user.rewards().is_empty());
    }

    #[rstest]
    fn users_are_looked_up_by_name(service: TourGuideService) {
        assert!(service.add_user(User::new(Uuid::new_v4(), "jon")));
        assert!(!service.add_user(User::new(Uuid::new_v4(), "jon")));
        assert_eq!(service.user("jon").expect("registered").name(), "jon");
        assert!(matches!(
            service.user("jane"),
            Err(ServiceError::UserNotFound { .. })
        ));
        assert_eq!(service.all_users().len(), 1);
    }

    #[rstest]
    fn parallel_rewards_cover_every_user(service: TourGuideService) {
        for i in 0..20 {
            let user = User::new(Uuid::new_v4(), format!("internalUser{i}"));
            user.add_visited_location(VisitedLocation::now(user.id(), Coord { x: 0.0, y: 0.0 }));
            service.add_user(user);
        }

        let report = service
            .calculate_all_rewards_in_parallel(4)
            .expect("pool builds");
        assert!(report.is_success());
        assert_eq!(report.processed, 20);
        assert!(
            service
                .all_users()
                .iter()
                .all(|user| user.rewards().len() == 1)
        );
    }
}
