//! Provider traits for user positions, the attraction catalog and points.

use std::sync::Arc;

use uuid::Uuid;

use super::error::ProviderError;
use crate::{Attraction, VisitedLocation};

/// Source of user positions and of the attraction catalog.
///
/// Implementations must be thread-safe (`Send` + `Sync`); the tracker calls
/// [`LocationProvider::user_location`] from many worker threads at once.
///
/// # Examples
///
/// ```rust
/// use geo::Coord;
/// use uuid::Uuid;
/// use tourguide_core::{Attraction, LocationProvider, ProviderError, VisitedLocation};
///
/// struct Origin;
///
/// impl LocationProvider for Origin {
///     fn user_location(&self, user_id: Uuid) -> Result<VisitedLocation, ProviderError> {
///         Ok(VisitedLocation::now(user_id, Coord { x: 0.0, y: 0.0 }))
///     }
///
///     fn attractions(&self) -> Result<Vec<Attraction>, ProviderError> {
///         Ok(vec![Attraction::new(Uuid::nil(), "Origin", Coord { x: 0.0, y: 0.0 })])
///     }
/// }
///
/// let visit = Origin.user_location(Uuid::nil())?;
/// assert_eq!(visit.location, Coord { x: 0.0, y: 0.0 });
/// # Ok::<(), ProviderError>(())
/// ```
pub trait LocationProvider: Send + Sync {
    /// Return the current position of `user_id`. May block.
    fn user_location(&self, user_id: Uuid) -> Result<VisitedLocation, ProviderError>;

    /// Return the full attraction catalog.
    ///
    /// The catalog is assumed stable for the process lifetime; callers load
    /// it once through [`crate::AttractionCatalog`].
    fn attractions(&self) -> Result<Vec<Attraction>, ProviderError>;
}

/// Authoritative source of reward points for an attraction and user.
///
/// Calls may be slow, which is why the reward engine fronts the oracle with
/// a cache.
pub trait RewardOracle: Send + Sync {
    /// Return the points `user_id` earns for visiting `attraction_id`.
    fn attraction_reward_points(
        &self,
        attraction_id: Uuid,
        user_id: Uuid,
    ) -> Result<i32, ProviderError>;
}

impl<T: LocationProvider + ?Sized> LocationProvider for Arc<T> {
    fn user_location(&self, user_id: Uuid) -> Result<VisitedLocation, ProviderError> {
        (**self).user_location(user_id)
    }

    fn attractions(&self) -> Result<Vec<Attraction>, ProviderError> {
        (**self).attractions()
    }
}

impl<T: RewardOracle + ?Sized> RewardOracle for Arc<T> {
    fn attraction_reward_points(
        &self,
        attraction_id: Uuid,
        user_id: Uuid,
    ) -> Result<i32, ProviderError> {
        (**self).attraction_reward_points(attraction_id, user_id)
    }
}
