//! Generator for the internal test users.

use chrono::{TimeDelta, Utc};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tourguide_core::{User, VisitedLocation};

use crate::catalog::random_uuid;
use crate::providers::random_coordinate;

/// Visits generated per user unless overridden.
pub const DEFAULT_HISTORY_LEN: usize = 3;

/// Generated visits fall within this many days before now.
const HISTORY_WINDOW_DAYS: i64 = 30;

/// Deterministic source of `internalUser{i}` accounts.
///
/// Every user gets phone `000`, the email `internalUser{i}@tourGuide.com`
/// and a short history of random visits from the last 30 days.
///
/// # Examples
/// ```
/// use tourguide_sim::InternalUsers;
///
/// let users = InternalUsers::generate(2, 7);
/// assert_eq!(users[1].name(), "internalUser1");
/// assert_eq!(users[1].visited_locations().len(), 3);
/// ```
#[derive(Debug)]
pub struct InternalUsers {
    rng: ChaCha8Rng,
    history_len: usize,
}

impl InternalUsers {
    /// Generator seeded with `seed`.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            history_len: DEFAULT_HISTORY_LEN,
        }
    }

    /// Generate `history_len` visits per user.
    #[must_use]
    pub const fn with_history_len(mut self, history_len: usize) -> Self {
        self.history_len = history_len;
        self
    }

    /// Generate `count` users with the default settings.
    #[must_use]
    pub fn generate(count: usize, seed: u64) -> Vec<User> {
        Self::new(seed).take_users(count)
    }

    /// Generate users `0..count`.
    pub fn take_users(&mut self, count: usize) -> Vec<User> {
        let users: Vec<User> = (0..count).map(|index| self.user(index)).collect();
        log::debug!("generated {} internal users", users.len());
        users
    }

    /// Generate the user with the given index.
    pub fn user(&mut self, index: usize) -> User {
        let name = format!("internalUser{index}");
        let email = format!("{name}@tourGuide.com");
        let user = User::with_contact(random_uuid(&mut self.rng), name, "000", email);
        for _ in 0..self.history_len {
            let days_ago = self.rng.gen_range(0..HISTORY_WINDOW_DAYS);
            let time_visited = Utc::now() - TimeDelta::days(days_ago);
            let location = random_coordinate(&mut self.rng);
            user.add_visited_location(VisitedLocation::new(user.id(), location, time_visited));
        }
        user
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn users_follow_the_naming_scheme() {
        let users = InternalUsers::generate(3, 11);
        let names: Vec<&str> = users.iter().map(User::name).collect();
        assert_eq!(names, vec!["internalUser0", "internalUser1", "internalUser2"]);
        assert!(users.iter().all(|user| user.phone_number() == "000"));
        assert_eq!(
            users.last().map(User::email_address),
            Some("internalUser2@tourGuide.com")
        );
    }

    #[rstest]
    fn histories_fall_in_the_last_month() {
        let now = Utc::now();
        for user in InternalUsers::generate(20, 5) {
            let visits = user.visited_locations();
            assert_eq!(visits.len(), DEFAULT_HISTORY_LEN);
            assert!(visits.iter().all(|visit| {
                visit.user_id == user.id()
                    && visit.time_visited <= now
                    && now - visit.time_visited <= TimeDelta::days(HISTORY_WINDOW_DAYS)
            }));
        }
    }

    #[rstest]
    fn seeds_make_generation_repeatable() {
        let first = InternalUsers::generate(5, 99);
        let second = InternalUsers::generate(5, 99);
        let ids = |users: &[User]| users.iter().map(User::id).collect::<Vec<_>>();
        assert_eq!(ids(&first), ids(&second));
    }

    #[rstest]
    fn history_length_is_configurable() {
        let user = InternalUsers::new(1).with_history_len(0).user(4);
        assert_eq!(user.name(), "internalUser4");
        assert!(user.visited_locations().is_empty());
    }
}
