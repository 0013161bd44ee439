//! Coordinates and observed user locations.

use chrono::{DateTime, Utc};
use geo::Coord;
use thiserror::Error;
use uuid::Uuid;

/// Errors returned by [`coordinate`].
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum CoordinateError {
    /// Latitude was outside `[-90, 90]` or not finite.
    #[error("latitude {0} is outside [-90, 90]")]
    Latitude(f64),
    /// Longitude was outside `[-180, 180]` or not finite.
    #[error("longitude {0} is outside [-180, 180]")]
    Longitude(f64),
}

/// Build a validated coordinate from latitude and longitude in degrees.
///
/// The returned [`Coord`] stores longitude in `x` and latitude in `y`.
///
/// # Examples
/// ```
/// use tourguide_core::coordinate;
///
/// let disneyland = coordinate(33.817_595, -117.922_008)?;
/// assert_eq!(disneyland.y, 33.817_595);
/// assert!(coordinate(91.0, 0.0).is_err());
/// # Ok::<(), tourguide_core::CoordinateError>(())
/// ```
pub fn coordinate(latitude: f64, longitude: f64) -> Result<Coord<f64>, CoordinateError> {
    if !(-90.0..=90.0).contains(&latitude) {
        return Err(CoordinateError::Latitude(latitude));
    }
    if !(-180.0..=180.0).contains(&longitude) {
        return Err(CoordinateError::Longitude(longitude));
    }
    Ok(Coord {
        x: longitude,
        y: latitude,
    })
}

/// A position reported for a user at a point in time.
///
/// Visits are append-only history entries; a user's history is ordered by
/// insertion, which is the order in which positions were observed.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VisitedLocation {
    /// User the observation belongs to.
    pub user_id: Uuid,
    /// Observed position.
    pub location: Coord<f64>,
    /// When the position was observed.
    pub time_visited: DateTime<Utc>,
}

impl VisitedLocation {
    /// Construct a visit observed at `time_visited`.
    pub fn new(user_id: Uuid, location: Coord<f64>, time_visited: DateTime<Utc>) -> Self {
        Self {
            user_id,
            location,
            time_visited,
        }
    }

    /// Construct a visit observed now.
    pub fn now(user_id: Uuid, location: Coord<f64>) -> Self {
        Self::new(user_id, location, Utc::now())
    }

    /// Latitude in degrees.
    pub fn latitude(&self) -> f64 {
        self.location.y
    }

    /// Longitude in degrees.
    pub fn longitude(&self) -> f64 {
        self.location.x
    }
}
