//! OSRM HTTP adapter for the `trip` and `route` services.

use std::env;

use serde::Deserialize;
use tracing::debug;

use crate::error::OptimizeError;
use crate::model::Coordinate;
use crate::polyline::Polyline;
use crate::traits::{DirectRoute, RouteDetail, TripOptimizer, TripPlan, TripRequest};

/// Response codes meaning the service looked and found nothing drivable.
const NO_ROUTE_CODES: &[&str] = &["NoRoute", "NoTrips", "NoSegment"];

#[derive(Debug, Clone)]
pub struct OsrmConfig {
    pub base_url: String,
    pub profile: String,
    pub timeout_secs: u64,
}

impl Default for OsrmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://router.project-osrm.org".to_string(),
            profile: "driving".to_string(),
            timeout_secs: 10,
        }
    }
}

impl OsrmConfig {
    /// Defaults overridden by `OSRM_BASE_URL`, `OSRM_PROFILE` and `OSRM_TIMEOUT_SECS`.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            base_url: env::var("OSRM_BASE_URL").unwrap_or(defaults.base_url),
            profile: env::var("OSRM_PROFILE").unwrap_or(defaults.profile),
            timeout_secs: env::var("OSRM_TIMEOUT_SECS")
                .ok()
                .and_then(|value| value.parse().ok())
                .unwrap_or(defaults.timeout_secs),
        }
    }
}

#[derive(Debug, Clone)]
pub struct OsrmClient {
    config: OsrmConfig,
    client: reqwest::blocking::Client,
}

impl OsrmClient {
    pub fn new(config: OsrmConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    pub fn trip_url(&self, request: &TripRequest) -> String {
        format!(
            "{}/trip/v1/{}/{}?roundtrip={}&source={}&overview=full&geometries=geojson&steps={}",
            self.config.base_url,
            self.config.profile,
            coordinate_path(&request.coordinates),
            request.round_trip,
            request.source.as_str(),
            request.steps
        )
    }

    pub fn route_url(&self, from: Coordinate, to: Coordinate, detail: RouteDetail) -> String {
        let query = match detail {
            RouteDetail::Full => "overview=full&geometries=geojson&steps=true",
            RouteDetail::Bare => "overview=full&geometries=geojson",
        };
        format!(
            "{}/route/v1/{}/{}?{}",
            self.config.base_url,
            self.config.profile,
            coordinate_path(&[from, to]),
            query
        )
    }

    fn fetch(&self, url: &str) -> Result<String, OptimizeError> {
        debug!(url, "OSRM request");
        let response = self.client.get(url).send()?;
        let status = response.status();
        let body = response.text()?;

        if status.is_success() {
            return Ok(body);
        }

        match serde_json::from_str::<OsrmStatus>(&body) {
            Ok(parsed) if NO_ROUTE_CODES.contains(&parsed.code.as_str()) => {
                Err(OptimizeError::NoRouteFound(describe(&parsed.code, parsed.message)))
            }
            _ => Err(OptimizeError::RemoteUnavailable(format!("OSRM returned {}", status))),
        }
    }
}

impl TripOptimizer for OsrmClient {
    fn trip(&self, request: &TripRequest) -> Result<TripPlan, OptimizeError> {
        let body = self.fetch(&self.trip_url(request))?;
        parse_trip_response(&body, request.coordinates.len())
    }

    fn direct_route(
        &self,
        from: Coordinate,
        to: Coordinate,
        detail: RouteDetail,
    ) -> Result<DirectRoute, OptimizeError> {
        let body = self.fetch(&self.route_url(from, to, detail))?;
        parse_route_response(&body)
    }

    /// OSRM only accepts `roundtrip=false` together with a fixed `destination`.
    fn supports_one_way(&self) -> bool {
        false
    }
}

/// `lng,lat` pairs joined by `;`.
fn coordinate_path(coordinates: &[Coordinate]) -> String {
    coordinates
        .iter()
        .map(Coordinate::location_key)
        .collect::<Vec<_>>()
        .join(";")
}

fn describe(code: &str, message: Option<String>) -> String {
    match message {
        Some(message) => format!("{}: {}", code, message),
        None => code.to_string(),
    }
}

fn check_code(code: &str, message: Option<String>) -> Result<(), OptimizeError> {
    if code == "Ok" {
        Ok(())
    } else if NO_ROUTE_CODES.contains(&code) {
        Err(OptimizeError::NoRouteFound(describe(code, message)))
    } else {
        Err(OptimizeError::RemoteResponseInvalid(describe(code, message)))
    }
}

/// Parses an OSRM `trip` body into request indices in visiting order.
///
/// Accepts either waypoints listed per trip in visiting order (each
/// `waypoint_index` naming a request point) or the native top-level list in
/// request order (each `waypoint_index` giving the position within the trip).
pub fn parse_trip_response(body: &str, point_count: usize) -> Result<TripPlan, OptimizeError> {
    let parsed: OsrmTripResponse = serde_json::from_str(body)?;
    check_code(&parsed.code, parsed.message)?;

    let Some(trip) = parsed.trips.into_iter().next() else {
        return Err(OptimizeError::RemoteResponseInvalid("response has no trips".to_string()));
    };

    let visit_order: Vec<usize> = if !trip.waypoints.is_empty() {
        trip.waypoints.iter().map(|waypoint| waypoint.waypoint_index).collect()
    } else if !parsed.waypoints.is_empty() {
        let mut positioned: Vec<(usize, usize)> = parsed
            .waypoints
            .iter()
            .enumerate()
            .filter(|(_, waypoint)| waypoint.trips_index.unwrap_or(0) == 0)
            .map(|(input_idx, waypoint)| (waypoint.waypoint_index, input_idx))
            .collect();
        positioned.sort_unstable();
        positioned.into_iter().map(|(_, input_idx)| input_idx).collect()
    } else {
        return Err(OptimizeError::RemoteResponseInvalid("response has no waypoints".to_string()));
    };

    if let Some(bad) = visit_order.iter().find(|&&idx| idx >= point_count) {
        return Err(OptimizeError::RemoteResponseInvalid(format!(
            "waypoint index {} out of range for {} points",
            bad, point_count
        )));
    }

    Ok(TripPlan {
        visit_order,
        distance_m: trip.distance,
        duration_s: trip.duration,
        geometry: trip.geometry.map(|line| Polyline::from_geojson(&line.coordinates)),
    })
}

/// Parses an OSRM `route` body, taking the first route.
pub fn parse_route_response(body: &str) -> Result<DirectRoute, OptimizeError> {
    let parsed: OsrmRouteResponse = serde_json::from_str(body)?;
    check_code(&parsed.code, parsed.message)?;

    let route = parsed
        .routes
        .into_iter()
        .next()
        .ok_or_else(|| OptimizeError::NoRouteFound("response has no routes".to_string()))?;

    Ok(DirectRoute {
        distance_m: route.distance,
        duration_s: route.duration,
        geometry: route.geometry.map(|line| Polyline::from_geojson(&line.coordinates)),
    })
}

#[derive(Debug, Deserialize)]
struct OsrmStatus {
    code: String,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OsrmTripResponse {
    code: String,
    message: Option<String>,
    #[serde(default)]
    trips: Vec<OsrmTrip>,
    #[serde(default)]
    waypoints: Vec<OsrmWaypoint>,
}

#[derive(Debug, Deserialize)]
struct OsrmTrip {
    #[serde(default)]
    waypoints: Vec<OsrmWaypoint>,
    distance: Option<f64>,
    duration: Option<f64>,
    geometry: Option<GeoJsonLine>,
}

#[derive(Debug, Deserialize)]
struct OsrmWaypoint {
    #[allow(dead_code)]
    location: [f64; 2],
    waypoint_index: usize,
    trips_index: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct OsrmRouteResponse {
    code: String,
    message: Option<String>,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    distance: f64,
    duration: f64,
    geometry: Option<GeoJsonLine>,
}

#[derive(Debug, Deserialize)]
struct GeoJsonLine {
    coordinates: Vec<[f64; 2]>,
}
