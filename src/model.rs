//! Stops, starting points and tours.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::InvalidCoordinate;

/// A WGS84 position. Latitude is kept in [-90, 90] and longitude in [-180, 180].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCoordinate")]
pub struct Coordinate {
    lat: f64,
    lng: f64,
}

#[derive(Deserialize)]
struct RawCoordinate {
    lat: f64,
    lng: f64,
}

impl TryFrom<RawCoordinate> for Coordinate {
    type Error = InvalidCoordinate;

    fn try_from(raw: RawCoordinate) -> Result<Self, Self::Error> {
        Coordinate::new(raw.lat, raw.lng)
    }
}

impl Coordinate {
    pub fn new(lat: f64, lng: f64) -> Result<Self, InvalidCoordinate> {
        let valid = lat.is_finite()
            && lng.is_finite()
            && (-90.0..=90.0).contains(&lat)
            && (-180.0..=180.0).contains(&lng);
        if valid {
            Ok(Self { lat, lng })
        } else {
            Err(InvalidCoordinate { lat, lng })
        }
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn lng(&self) -> f64 {
        self.lng
    }

    /// `(lat, lng)` tuple, the order used throughout the routing code.
    pub fn as_tuple(&self) -> (f64, f64) {
        (self.lat, self.lng)
    }

    /// `lng,lat` at six decimals, the form routing services receive. Two
    /// coordinates with the same key are the same point to the router.
    pub fn location_key(&self) -> String {
        format!("{:.6},{:.6}", self.lng, self.lat)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lat, self.lng)
    }
}

/// Anything that sits at a coordinate: stops, starting points, navigation points.
pub trait Located {
    fn coordinate(&self) -> Coordinate;
}

impl Located for Coordinate {
    fn coordinate(&self) -> Coordinate {
        *self
    }
}

/// Opaque stop identity, the only key that survives reordering.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StopId(String);

impl StopId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StopId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StopStatus {
    #[default]
    Pending,
    Completed,
}

/// A geocoded delivery stop.
///
/// Address and coordinate are fixed at creation; only `priority` and `status` change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stop {
    id: StopId,
    address: String,
    coordinate: Coordinate,
    #[serde(default)]
    pub priority: bool,
    #[serde(default)]
    pub status: StopStatus,
}

impl Stop {
    pub fn new(id: StopId, address: impl Into<String>, coordinate: Coordinate) -> Self {
        Self {
            id,
            address: address.into(),
            coordinate,
            priority: false,
            status: StopStatus::Pending,
        }
    }

    pub fn with_priority(mut self, priority: bool) -> Self {
        self.priority = priority;
        self
    }

    pub fn id(&self) -> &StopId {
        &self.id
    }

    pub fn address(&self) -> &str {
        &self.address
    }
}

impl Located for Stop {
    fn coordinate(&self) -> Coordinate {
        self.coordinate
    }
}

/// Where the driver sets off. Held by the session, never part of a tour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StartingPoint {
    pub address: String,
    pub coordinate: Coordinate,
}

impl StartingPoint {
    pub fn new(address: impl Into<String>, coordinate: Coordinate) -> Self {
        Self {
            address: address.into(),
            coordinate,
        }
    }
}

impl Located for StartingPoint {
    fn coordinate(&self) -> Coordinate {
        self.coordinate
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RouteFlags {
    #[serde(default)]
    pub round_trip: bool,
}

/// An ordered visiting sequence over borrowed stops.
#[derive(Debug, Clone, PartialEq)]
pub struct Tour<'a> {
    stops: Vec<&'a Stop>,
}

impl<'a> Tour<'a> {
    pub fn new(stops: Vec<&'a Stop>) -> Self {
        Self { stops }
    }

    /// Builds a tour from positions into `stops`. Out-of-range positions are skipped.
    pub fn from_order(stops: &'a [Stop], order: &[usize]) -> Self {
        Self {
            stops: order.iter().filter_map(|&idx| stops.get(idx)).collect(),
        }
    }

    pub fn stops(&self) -> &[&'a Stop] {
        &self.stops
    }

    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    pub fn ids(&self) -> Vec<StopId> {
        self.stops.iter().map(|stop| stop.id().clone()).collect()
    }

    /// True when the tour holds exactly the ids of `input`, each once.
    pub fn is_permutation_of(&self, input: &[Stop]) -> bool {
        if self.stops.len() != input.len() {
            return false;
        }
        let mut seen = HashSet::with_capacity(self.stops.len());
        if !self.stops.iter().all(|stop| seen.insert(stop.id())) {
            return false;
        }
        input.iter().all(|stop| seen.contains(stop.id()))
    }
}
