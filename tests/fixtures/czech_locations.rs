//! Real Czech locations for realistic test fixtures.
//!
//! Coordinates are city/landmark centers sourced from OpenStreetMap.

use stop_sequencer::model::{Coordinate, Stop, StopId};

/// A named location with coordinates.
#[derive(Debug, Clone)]
pub struct Location {
    pub name: &'static str,
    pub lat: f64,
    pub lng: f64,
}

impl Location {
    pub const fn new(name: &'static str, lat: f64, lng: f64) -> Self {
        Self { name, lat, lng }
    }

    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.lat, self.lng).expect("fixture coordinate is valid")
    }

    pub fn stop(&self, id: &str) -> Stop {
        Stop::new(StopId::new(id), self.name, self.coordinate())
    }
}

pub const PRAGUE: Location = Location::new("Praha", 50.0755, 14.4378);
pub const BRNO: Location = Location::new("Brno", 49.1951, 16.6068);
pub const OSTRAVA: Location = Location::new("Ostrava", 49.8209, 18.2625);

// ============================================================================
// Larger Cities
// ============================================================================

pub const CITIES: &[Location] = &[
    Location::new("Plzeň", 49.7384, 13.3736),
    Location::new("Liberec", 50.7663, 15.0543),
    Location::new("Olomouc", 49.5938, 17.2509),
    Location::new("České Budějovice", 48.9745, 14.4743),
    Location::new("Hradec Králové", 50.2092, 15.8328),
    Location::new("Ústí nad Labem", 50.6607, 14.0323),
    Location::new("Pardubice", 50.0343, 15.7812),
    Location::new("Zlín", 49.2265, 17.6707),
    Location::new("Havířov", 49.7798, 18.4369),
    Location::new("Kladno", 50.1473, 14.1028),
    Location::new("Most", 50.5030, 13.6362),
    Location::new("Opava", 49.9387, 17.9026),
    Location::new("Jihlava", 49.3961, 15.5912),
    Location::new("Karlovy Vary", 50.2319, 12.8720),
    Location::new("Teplice", 50.6404, 13.8245),
];

// ============================================================================
// Prague Delivery Addresses
// ============================================================================

pub const PRAGUE_STOPS: &[Location] = &[
    Location::new("Václavské náměstí 1", 50.0810, 14.4280),
    Location::new("Staroměstské náměstí 1", 50.0875, 14.4213),
    Location::new("Karlovo náměstí 10", 50.0755, 14.4187),
    Location::new("Náměstí Míru 5", 50.0755, 14.4379),
    Location::new("Vinohradská 50", 50.0768, 14.4466),
    Location::new("Anděl, Nádražní 1", 50.0706, 14.4036),
    Location::new("Holešovice, Dukelských hrdinů 47", 50.1006, 14.4316),
    Location::new("Karlín, Křižíkova 20", 50.0928, 14.4480),
    Location::new("Žižkov, Seifertova 30", 50.0842, 14.4506),
    Location::new("Smíchov, Štefánikova 5", 50.0774, 14.4047),
    Location::new("Dejvice, Vítězné náměstí 1", 50.1008, 14.3955),
    Location::new("Letná, Milady Horákové 12", 50.0983, 14.4236),
];

/// Stops named `s1..` built from `locations`.
pub fn stops_from(locations: &[Location]) -> Vec<Stop> {
    locations
        .iter()
        .enumerate()
        .map(|(idx, location)| location.stop(&format!("s{}", idx + 1)))
        .collect()
}
