#![expect(
    clippy::indexing_slicing,
    reason = "generated indices are bounded by the strategies"
)]

//! Property-based tests for the reward cache.
//!
//! # Invariants tested
//!
//! - **Bounded size:** the cache never stores more than its capacity.
//! - **Stable answers:** while an entry is live, later computations for the
//!   same key are ignored in favour of the stored value.

use std::collections::HashMap;
use std::time::Duration;

use proptest::prelude::*;
use tourguide_rewards::{RewardCache, RewardCacheConfig};
use uuid::Uuid;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn never_exceeds_capacity(
        capacity in 1_usize..16,
        lookups in prop::collection::vec((0_u8..24, 0_u8..4, any::<i32>()), 1..200),
    ) {
        let cache = RewardCache::new(RewardCacheConfig {
            ttl: Duration::from_secs(3_600),
            max_entries: capacity,
        });
        let attractions: Vec<Uuid> = (0..24).map(|_| Uuid::new_v4()).collect();
        let users: Vec<Uuid> = (0..4).map(|_| Uuid::new_v4()).collect();

        for (attraction, user, points) in lookups {
            let attraction_id = attractions[usize::from(attraction)];
            let user_id = users[usize::from(user)];
            prop_assert!(cache.get_or_compute(attraction_id, user_id, || Ok(points)).is_ok());
            prop_assert!(cache.len() <= capacity);
        }
    }

    #[test]
    fn first_answer_wins_without_eviction(
        lookups in prop::collection::vec((0_u8..8, any::<i32>()), 1..100),
    ) {
        let cache = RewardCache::default();
        let user = Uuid::new_v4();
        let attractions: Vec<Uuid> = (0..8).map(|_| Uuid::new_v4()).collect();
        let mut first: HashMap<u8, i32> = HashMap::new();

        for (attraction, points) in lookups {
            let expected = *first.entry(attraction).or_insert(points);
            let answer = cache.get_or_compute(attractions[usize::from(attraction)], user, || Ok(points));
            prop_assert_eq!(answer, Ok(expected));
        }
    }
}
