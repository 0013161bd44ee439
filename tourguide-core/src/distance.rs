//! Great-circle distance between two coordinates.
//!
//! Distances use the spherical law of cosines. The central angle is
//! expressed in degrees and scaled by 60 nautical miles per degree, then
//! converted to statute miles.

use geo::Coord;

/// Conversion factor from nautical miles to statute miles.
pub const STATUTE_MILES_PER_NAUTICAL_MILE: f64 = 1.150_779_45;

/// One minute of arc is one nautical mile.
const NAUTICAL_MILES_PER_DEGREE: f64 = 60.0;

/// Return the distance between `a` and `b` in statute miles.
///
/// Identical points are exactly `0.0` apart. Elsewhere the cosine of the
/// central angle is clamped to `[-1.0, 1.0]` before calling `acos`, as
/// rounding can push it just past `1.0` for nearly coincident points.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use tourguide_core::distance_miles;
///
/// let origin = Coord { x: 0.0, y: 0.0 };
/// assert_eq!(distance_miles(origin, origin), 0.0);
///
/// let one_degree_north = Coord { x: 0.0, y: 1.0 };
/// let miles = distance_miles(origin, one_degree_north);
/// assert!((miles - 69.046_767).abs() < 1e-3);
/// ```
pub fn distance_miles(a: Coord<f64>, b: Coord<f64>) -> f64 {
    if a == b {
        return 0.0;
    }
    let lat1 = a.y.to_radians();
    let lon1 = a.x.to_radians();
    let lat2 = b.y.to_radians();
    let lon2 = b.x.to_radians();

    let cosine = lat1.sin() * lat2.sin() + lat1.cos() * lat2.cos() * (lon1 - lon2).cos();
    let angle = cosine.clamp(-1.0, 1.0).acos();

    let nautical_miles = NAUTICAL_MILES_PER_DEGREE * angle.to_degrees();
    STATUTE_MILES_PER_NAUTICAL_MILE * nautical_miles
}
