use geo::Coord;
use uuid::Uuid;

/// A point of interest that can earn a user reward points.
///
/// Coordinates are WGS84 with `x = longitude` and `y = latitude`.
/// Attractions are reference data owned by the location provider; the
/// engine only ever reads them.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use uuid::Uuid;
/// use tourguide_core::Attraction;
///
/// let attraction = Attraction::new(
///     Uuid::nil(),
///     "Disneyland",
///     Coord { x: -117.922_008, y: 33.817_595 },
/// )
/// .with_address("Anaheim", "CA");
///
/// assert_eq!(attraction.name, "Disneyland");
/// assert_eq!(attraction.city, "Anaheim");
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Attraction {
    pub id: Uuid,
    pub name: String,
    pub city: String,
    pub state: String,
    pub location: Coord<f64>,
}

impl Attraction {
    /// Construct an `Attraction` without address details.
    pub fn new(id: Uuid, name: impl Into<String>, location: Coord<f64>) -> Self {
        Self {
            id,
            name: name.into(),
            city: String::new(),
            state: String::new(),
            location,
        }
    }

    /// Attach the city and state the attraction lies in.
    #[must_use]
    pub fn with_address(mut self, city: impl Into<String>, state: impl Into<String>) -> Self {
        self.city = city.into();
        self.state = state.into();
        self
    }
}
