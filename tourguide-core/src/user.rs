//! Tracked users, their visit history and the rewards they have earned.
//!
//! A [`User`] is shared between worker threads behind an `Arc`. Its history
//! and rewards are only reachable through append and snapshot operations, so
//! callers can never reorder or truncate them through a live reference.

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{Attraction, VisitedLocation};

/// Points granted to a user for coming near an attraction.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UserReward {
    /// The visit that qualified for the reward.
    pub visited_location: VisitedLocation,
    /// The attraction the visit was near.
    pub attraction: Attraction,
    /// Points assigned by the scoring oracle.
    pub reward_points: i32,
}

impl UserReward {
    /// Construct a reward for `attraction` earned by `visited_location`.
    pub fn new(visited_location: VisitedLocation, attraction: Attraction, reward_points: i32) -> Self {
        Self {
            visited_location,
            attraction,
            reward_points,
        }
    }
}

/// A tracked user.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use uuid::Uuid;
/// use tourguide_core::{User, VisitedLocation};
///
/// let user = User::new(Uuid::new_v4(), "jon");
/// assert!(user.last_visited_location().is_none());
///
/// user.add_visited_location(VisitedLocation::now(user.id(), Coord { x: 0.0, y: 0.0 }));
/// assert_eq!(user.visited_locations().len(), 1);
/// ```
#[derive(Debug)]
pub struct User {
    id: Uuid,
    name: String,
    phone_number: String,
    email_address: String,
    visited_locations: RwLock<Vec<VisitedLocation>>,
    rewards: Mutex<Vec<UserReward>>,
}

impl User {
    /// Create a user without contact details.
    pub fn new(id: Uuid, name: impl Into<String>) -> Self {
        Self::with_contact(id, name, String::new(), String::new())
    }

    /// Create a user with a phone number and email address.
    pub fn with_contact(
        id: Uuid,
        name: impl Into<String>,
        phone_number: impl Into<String>,
        email_address: impl Into<String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            phone_number: phone_number.into(),
            email_address: email_address.into(),
            visited_locations: RwLock::new(Vec::new()),
            rewards: Mutex::new(Vec::new()),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn phone_number(&self) -> &str {
        &self.phone_number
    }

    pub fn email_address(&self) -> &str {
        &self.email_address
    }

    /// Timestamp of the most recently appended visit, if any.
    pub fn latest_location_timestamp(&self) -> Option<DateTime<Utc>> {
        self.visited_locations
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .map(|visit| visit.time_visited)
    }

    /// Append a visit to the end of the history.
    pub fn add_visited_location(&self, visit: VisitedLocation) {
        self.visited_locations
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(visit);
    }

    /// Snapshot of the visit history in observation order.
    pub fn visited_locations(&self) -> Vec<VisitedLocation> {
        self.visited_locations
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The most recent visit, if the history is non-empty.
    pub fn last_visited_location(&self) -> Option<VisitedLocation> {
        self.visited_locations
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }

    /// Drop the whole visit history, and with it the latest timestamp.
    /// Earned rewards are kept.
    pub fn clear_visited_locations(&self) {
        self.visited_locations
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Append `reward` unless one already exists for the same attraction name.
    ///
    /// Returns `true` when the reward was stored. The check and the append
    /// happen under one lock, so racing callers cannot both add a reward for
    /// the same attraction.
    pub fn add_reward(&self, reward: UserReward) -> bool {
        let mut rewards = self.rewards.lock().unwrap_or_else(PoisonError::into_inner);
        if rewards
            .iter()
            .any(|existing| existing.attraction.name == reward.attraction.name)
        {
            return false;
        }
        rewards.push(reward);
        true
    }

    /// Snapshot of the earned rewards in the order they were granted.
    pub fn rewards(&self) -> Vec<UserReward> {
        self.rewards
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Names of the attractions this user has already been rewarded for.
    pub fn rewarded_attraction_names(&self) -> HashSet<String> {
        self.rewards
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|reward| reward.attraction.name.clone())
            .collect()
    }

    /// Sum of all earned reward points.
    pub fn total_reward_points(&self) -> i64 {
        self.rewards
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|reward| i64::from(reward.reward_points))
            .sum()
    }
}
