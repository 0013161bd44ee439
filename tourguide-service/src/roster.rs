//! Concurrent registry of tracked users.

use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tourguide_core::User;

use crate::ServiceError;

/// Users keyed by name.
///
/// Lookups and insertions are safe from any thread. Users are never
/// removed, and registering a name twice keeps the first user.
#[derive(Debug, Default)]
pub struct UserRoster {
    users: DashMap<String, Arc<User>>,
}

impl UserRoster {
    /// Create an empty roster.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `user` unless the name is taken. Returns `true` when added.
    pub fn add_user(&self, user: Arc<User>) -> bool {
        match self.users.entry(user.name().to_owned()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(user);
                true
            }
        }
    }

    /// Look up a user by name.
    ///
    /// # Errors
    /// Returns [`ServiceError::UserNotFound`] for unknown names.
    pub fn get(&self, name: &str) -> Result<Arc<User>, ServiceError> {
        self.users
            .get(name)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| ServiceError::UserNotFound {
                name: name.to_owned(),
            })
    }

    /// Every registered user, ordered by name.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Arc<User>> {
        let mut users: Vec<Arc<User>> = self
            .users
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();
        users.sort_by(|left, right| left.name().cmp(right.name()));
        users
    }

    /// Number of registered users.
    #[must_use]
    pub fn len(&self) -> usize {
        self.users.len()
    }

    /// Whether no users are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}
