//! Proximity checks between visits and attractions.
//!
//! Reward attribution uses a buffer in statute miles that can be changed at
//! runtime; every evaluation reads the current value. A separate, fixed
//! 200-mile range backs the relaxed "is this remotely plausible" check.

use std::sync::atomic::{AtomicU64, Ordering};

use geo::Coord;
use thiserror::Error;

use crate::{Attraction, VisitedLocation, distance_miles};

/// Default reward-attribution buffer in statute miles.
pub const DEFAULT_PROXIMITY_BUFFER_MILES: f64 = 10.0;

/// Fixed range used by [`ProximityEngine::is_within_range`].
pub const ATTRACTION_PROXIMITY_RANGE_MILES: f64 = 200.0;

/// Errors returned when configuring a [`ProximityEngine`].
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ProximityError {
    /// The buffer was negative or not finite.
    #[error("proximity buffer must be a finite, non-negative number of miles (got {0})")]
    InvalidBuffer(f64),
}

/// Return whether `visit` lies within `buffer_miles` of `attraction`.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use uuid::Uuid;
/// use tourguide_core::{Attraction, VisitedLocation, is_near};
///
/// let attraction = Attraction::new(Uuid::nil(), "Origin", Coord { x: 0.0, y: 0.0 });
/// let visit = VisitedLocation::now(Uuid::nil(), Coord { x: 0.0, y: 0.0 });
/// assert!(is_near(&visit, &attraction, 10.0));
/// ```
pub fn is_near(visit: &VisitedLocation, attraction: &Attraction, buffer_miles: f64) -> bool {
    distance_miles(visit.location, attraction.location) <= buffer_miles
}

/// Decides whether locations are near attractions.
///
/// The buffer is stored as the bit pattern of an `f64` inside an atomic, so
/// one engine can be shared across worker threads while an operator adjusts
/// the buffer.
#[derive(Debug)]
pub struct ProximityEngine {
    buffer_bits: AtomicU64,
}

impl Default for ProximityEngine {
    fn default() -> Self {
        Self {
            buffer_bits: AtomicU64::new(DEFAULT_PROXIMITY_BUFFER_MILES.to_bits()),
        }
    }
}

impl ProximityEngine {
    /// Create an engine with the default 10-mile buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine with a custom buffer.
    pub fn with_buffer_miles(buffer_miles: f64) -> Result<Self, ProximityError> {
        let engine = Self::new();
        engine.set_buffer_miles(buffer_miles)?;
        Ok(engine)
    }

    /// Current reward-attribution buffer in miles.
    pub fn buffer_miles(&self) -> f64 {
        f64::from_bits(self.buffer_bits.load(Ordering::Acquire))
    }

    /// Replace the buffer. Subsequent evaluations use the new value.
    pub fn set_buffer_miles(&self, buffer_miles: f64) -> Result<(), ProximityError> {
        if !buffer_miles.is_finite() || buffer_miles < 0.0 {
            return Err(ProximityError::InvalidBuffer(buffer_miles));
        }
        self.buffer_bits
            .store(buffer_miles.to_bits(), Ordering::Release);
        log::debug!("proximity buffer set to {buffer_miles} miles");
        Ok(())
    }

    /// Restore the default buffer.
    pub fn reset_buffer(&self) {
        self.buffer_bits
            .store(DEFAULT_PROXIMITY_BUFFER_MILES.to_bits(), Ordering::Release);
    }

    /// Whether `visit` is within the current buffer of `attraction`.
    pub fn is_near_attraction(&self, visit: &VisitedLocation, attraction: &Attraction) -> bool {
        is_near(visit, attraction, self.buffer_miles())
    }

    /// Whether `location` is within the fixed 200-mile range of `attraction`.
    pub fn is_within_range(&self, attraction: &Attraction, location: Coord<f64>) -> bool {
        distance_miles(attraction.location, location) <= ATTRACTION_PROXIMITY_RANGE_MILES
    }

    /// The `limit` attractions closest to `from`, nearest first.
    ///
    /// Ties keep catalog order. The catalog itself is left untouched.
    pub fn closest_attractions(
        &self,
        from: Coord<f64>,
        catalog: &[Attraction],
        limit: usize,
    ) -> Vec<Attraction> {
        self.closest_attractions_with_distance(from, catalog, limit)
            .into_iter()
            .map(|(attraction, _)| attraction)
            .collect()
    }

    /// Like [`Self::closest_attractions`], paired with each distance in miles.
    pub fn closest_attractions_with_distance(
        &self,
        from: Coord<f64>,
        catalog: &[Attraction],
        limit: usize,
    ) -> Vec<(Attraction, f64)> {
        let mut ranked: Vec<(&Attraction, f64)> = catalog
            .iter()
            .map(|attraction| (attraction, distance_miles(attraction.location, from)))
            .collect();
        // `sort_by` is stable, so equal distances keep catalog order.
        ranked.sort_by(|(_, left), (_, right)| left.total_cmp(right));
        ranked
            .into_iter()
            .take(limit)
            .map(|(attraction, miles)| (attraction.clone(), miles))
            .collect()
    }
}
