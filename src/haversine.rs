//! Great-circle distances used as the sequencing cost.
//!
//! Straight-line distance ignores roads, so it only steers the heuristics.
//! Road distance, when known, comes from the remote optimizer.

use crate::model::{Coordinate, Located, Stop};

/// Earth radius in kilometers.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Multiplier bonus applied to the distance towards a priority stop.
pub const PRIORITY_BONUS: f64 = -0.2;

/// Haversine distance between two coordinates in kilometers.
pub fn haversine_km(from: Coordinate, to: Coordinate) -> f64 {
    let lat1_rad = from.lat().to_radians();
    let lat2_rad = to.lat().to_radians();
    let delta_lat = (to.lat() - from.lat()).to_radians();
    let delta_lng = (to.lng() - from.lng()).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().min(1.0).asin();

    EARTH_RADIUS_KM * c
}

/// Distance from `from` to `to`, shrunk by 20% when `to` is a priority stop.
///
/// A bias for greedy choice only; priority stops are not guaranteed to come first.
pub fn weighted_distance_km(from: &impl Located, to: &Stop) -> f64 {
    let bonus = if to.priority { PRIORITY_BONUS } else { 0.0 };
    haversine_km(from.coordinate(), to.coordinate()) * (1.0 + bonus)
}

/// Total length of a route in kilometers.
///
/// Includes the leg from `start` to the first point when a start is given and,
/// for round trips, the leg back to the origin (the start, or the first point
/// when there is none).
pub fn route_distance_km(start: Option<Coordinate>, points: &[Coordinate], round_trip: bool) -> f64 {
    let Some(first) = points.first() else {
        return 0.0;
    };

    let mut total = start.map_or(0.0, |origin| haversine_km(origin, *first));
    total += points
        .windows(2)
        .map(|pair| haversine_km(pair[0], pair[1]))
        .sum::<f64>();

    if round_trip {
        let origin = start.unwrap_or(*first);
        if let Some(last) = points.last() {
            total += haversine_km(*last, origin);
        }
    }

    total
}
