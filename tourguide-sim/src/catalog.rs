//! Fixed catalog of US attractions served by the simulated GPS service.

use geo::Coord;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tourguide_core::Attraction;
use uuid::Uuid;

/// Seed for attraction identifiers, so ids are stable across runs.
const CATALOG_SEED: u64 = 0x746f_7572_6775_6964;

/// `(name, city, state, latitude, longitude)`.
const US_ATTRACTIONS: [(&str, &str, &str, f64, f64); 26] = [
    ("Disneyland", "Anaheim", "CA", 33.817_595, -117.922_008),
    ("Jackson Hole", "Jackson Hole", "WY", 43.582_767, -110.821_999),
    ("Mojave National Preserve", "Kelso", "CA", 35.141_689, -115.510_399),
    (
        "Joshua Tree National Park",
        "Joshua Tree National Park",
        "CA",
        33.881_866,
        -115.900_65,
    ),
    ("Buffalo National River", "St Joe", "AR", 35.985_512, -92.757_652),
    ("Hot Springs National Park", "Hot Springs", "AR", 34.521_53, -93.042_267),
    ("Kartchner Caverns State Park", "Benson", "AZ", 31.837_551, -110.347_382),
    ("Legend Valley", "Thornville", "OH", 39.937_778, -82.406_67),
    (
        "Flowers Bakery of London",
        "Flowers Bakery of London",
        "KY",
        37.131_527,
        -84.074_86,
    ),
    ("McKinley Tower", "Anchorage", "AK", 61.218_887, -149.877_502),
    ("Flatiron Building", "New York City", "NY", 40.741_112, -73.989_723),
    ("Fallingwater", "Mill Run", "PA", 39.906_113, -79.468_056),
    ("Union Station", "Washington D.C.", "CA", 38.897_095, -77.006_332),
    ("Roger Dean Stadium", "Jupiter", "FL", 26.890_959, -80.116_577),
    ("Texas Memorial Stadium", "Austin", "TX", 30.283_682, -97.732_536),
    ("Bryant-Denny Stadium", "Tuscaloosa", "AL", 33.208_973, -87.550_438),
    ("Tiger Stadium", "Baton Rouge", "LA", 30.412_035, -91.183_815),
    ("Neyland Stadium", "Knoxville", "TN", 35.955_013, -83.925_011),
    ("Kyle Field", "College Station", "TX", 30.610_25, -96.339_844),
    ("San Diego Zoo", "San Diego", "CA", 32.735_317, -117.149_048),
    ("Zoo Tampa at Lowry Park", "Tampa", "FL", 28.012_804, -82.469_269),
    ("Franklin Park Zoo", "Boston", "MA", 42.302_601, -71.086_731),
    ("El Paso Zoo", "El Paso", "TX", 31.769_125, -106.444_87),
    ("Kansas City Zoo", "Kansas City", "MO", 39.007_504, -94.529_625),
    ("Bronx Zoo", "Bronx", "NY", 40.852_905, -73.872_971),
    ("Cinderella Castle", "Orlando", "FL", 28.419_411, -81.581_2),
];

/// The 26 attractions of the simulated GPS service, in catalog order.
///
/// Identifiers are derived from a fixed seed, so every call returns the
/// same ids.
#[must_use]
pub fn us_attractions() -> Vec<Attraction> {
    let mut rng = ChaCha8Rng::seed_from_u64(CATALOG_SEED);
    US_ATTRACTIONS
        .iter()
        .map(|&(name, city, state, latitude, longitude)| {
            Attraction::new(
                random_uuid(&mut rng),
                name,
                Coord {
                    x: longitude,
                    y: latitude,
                },
            )
            .with_address(city, state)
        })
        .collect()
}

/// Random version 4 identifier drawn from `rng`.
pub(crate) fn random_uuid(rng: &mut impl Rng) -> Uuid {
    let mut bytes = [0_u8; 16];
    rng.fill(&mut bytes);
    uuid::Builder::from_random_bytes(bytes).into_uuid()
}
