//! Hand-off of an ordered route to a turn-by-turn navigation tool.
//!
//! Consumer navigation links accept a limited number of points, so long
//! routes are cut into overlapping batches: each batch starts where the
//! previous one ended.

use std::thread;
use std::time::Duration;

use tracing::info;

use crate::haversine::haversine_km;
use crate::model::{Coordinate, Located, StartingPoint, Stop};
use crate::traits::NavigationLauncher;

#[derive(Debug, Clone)]
pub struct NavigationConfig {
    /// Intermediate waypoints per batch.
    pub max_waypoints: usize,
    /// Routes with at most this many points go out as a single batch.
    pub single_session_limit: usize,
    /// Pause between consecutive batch launches.
    pub batch_delay: Duration,
    /// Points closer than this (km) are the same place.
    pub same_place_km: f64,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            max_waypoints: 8,
            single_session_limit: 10,
            batch_delay: Duration::from_secs(3),
            same_place_km: 0.01,
        }
    }
}

/// A point handed to the navigation tool.
#[derive(Debug, Clone, PartialEq)]
pub struct NavPoint {
    pub label: String,
    pub coordinate: Coordinate,
}

impl NavPoint {
    pub fn new(label: impl Into<String>, coordinate: Coordinate) -> Self {
        Self {
            label: label.into(),
            coordinate,
        }
    }
}

impl Located for NavPoint {
    fn coordinate(&self) -> Coordinate {
        self.coordinate
    }
}

impl From<&Stop> for NavPoint {
    fn from(stop: &Stop) -> Self {
        Self::new(stop.address(), stop.coordinate())
    }
}

impl From<&StartingPoint> for NavPoint {
    fn from(start: &StartingPoint) -> Self {
        Self::new(start.address.clone(), start.coordinate)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NavigationBatch {
    pub origin: NavPoint,
    pub waypoints: Vec<NavPoint>,
    pub destination: NavPoint,
    /// Last batch of a round trip, ending where the route began.
    pub closes_loop: bool,
}

impl NavigationBatch {
    /// Origin, waypoints and destination.
    pub fn point_count(&self) -> usize {
        self.waypoints.len() + 2
    }

    /// Google Maps directions link with `lat,lng` points and `|`-joined waypoints.
    pub fn directions_url(&self) -> String {
        let mut url = format!(
            "https://www.google.com/maps/dir/?api=1&origin={}&destination={}",
            self.origin.coordinate, self.destination.coordinate
        );
        if !self.waypoints.is_empty() {
            let waypoints = self
                .waypoints
                .iter()
                .map(|point| point.coordinate.to_string())
                .collect::<Vec<_>>()
                .join("|");
            url.push_str("&waypoints=");
            url.push_str(&waypoints);
        }
        url.push_str("&travelmode=driving");
        url
    }
}

/// Full point list for navigation.
///
/// The starting point leads unless a stop already sits on it. Round trips
/// end back at the starting point, or at the first stop when there is none.
/// Fewer than two stops give an empty list: there is nothing to navigate.
pub fn navigation_points(
    stops: &[Stop],
    start: Option<&StartingPoint>,
    round_trip: bool,
    config: &NavigationConfig,
) -> Vec<NavPoint> {
    if stops.len() < 2 {
        return Vec::new();
    }

    let mut points: Vec<NavPoint> = Vec::with_capacity(stops.len() + 2);

    if let Some(start) = start {
        let covered = stops
            .iter()
            .any(|stop| haversine_km(stop.coordinate(), start.coordinate) < config.same_place_km);
        if !covered {
            points.push(start.into());
        }
    }
    points.extend(stops.iter().map(NavPoint::from));

    if round_trip {
        let closing = match start {
            Some(start) => Some(NavPoint::from(start)),
            None => stops.first().map(NavPoint::from),
        };
        points.extend(closing);
    }

    points
}

/// Splits `points` into navigation batches.
///
/// Up to `single_session_limit` points make one batch. Longer lists are cut
/// into chunks of `max_waypoints + 1` points that share their boundary point;
/// a trailing chunk of a single point is dropped. Fewer than two points yield
/// no batches. Only round trips mark a batch as closing the loop.
pub fn batch(points: &[NavPoint], round_trip: bool, config: &NavigationConfig) -> Vec<NavigationBatch> {
    if points.len() < 2 {
        return Vec::new();
    }

    if points.len() <= config.single_session_limit {
        return make_batch(points, round_trip, config).into_iter().collect();
    }

    let step = config.max_waypoints.max(1);
    (0..points.len())
        .step_by(step)
        .filter_map(|begin| {
            let end = (begin + step + 1).min(points.len());
            make_batch(&points[begin..end], round_trip, config)
        })
        .collect()
}

fn make_batch(chunk: &[NavPoint], round_trip: bool, config: &NavigationConfig) -> Option<NavigationBatch> {
    let (origin, rest) = chunk.split_first()?;
    let (destination, interior) = rest.split_last()?;
    let closes_loop =
        round_trip && haversine_km(origin.coordinate, destination.coordinate) < config.same_place_km;

    Some(NavigationBatch {
        origin: origin.clone(),
        waypoints: interior.to_vec(),
        destination: destination.clone(),
        closes_loop,
    })
}

/// Opens every batch in order: the first one immediately, each following
/// one after `batch_delay`.
pub fn dispatch<L>(batches: &[NavigationBatch], launcher: &L, config: &NavigationConfig)
where
    L: NavigationLauncher + ?Sized,
{
    for (index, batch) in batches.iter().enumerate() {
        if index > 0 && !config.batch_delay.is_zero() {
            thread::sleep(config.batch_delay);
        }
        info!(batch = index, total = batches.len(), points = batch.point_count(), "opening navigation batch");
        launcher.launch(index, &batch.directions_url());
    }
}
