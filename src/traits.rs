//! Seams to the collaborators the sequencing core depends on.
//!
//! Each one is an external service in production and a plain in-process fake
//! in tests. Sessions take them by value, nothing is looked up globally.

use crate::error::{OptimizeError, StoreError};
use crate::model::Coordinate;
use crate::polyline::Polyline;
use crate::store::RouteSnapshot;

/// Where the trip starts in the request. Only `first` is ever sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TripSource {
    First,
}

impl TripSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            TripSource::First => "first",
        }
    }
}

/// A request to the trip-optimization oracle.
#[derive(Debug, Clone, PartialEq)]
pub struct TripRequest {
    /// Distinct coordinates, the starting point (when present) first.
    pub coordinates: Vec<Coordinate>,
    pub round_trip: bool,
    pub source: TripSource,
    /// Ask for turn-by-turn steps alongside the full geometry.
    pub steps: bool,
}

/// Validated trip result.
#[derive(Debug, Clone, PartialEq)]
pub struct TripPlan {
    /// Request coordinate indices in visiting order.
    pub visit_order: Vec<usize>,
    pub distance_m: Option<f64>,
    pub duration_s: Option<f64>,
    pub geometry: Option<Polyline>,
}

/// Validated point-to-point route result.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectRoute {
    pub distance_m: f64,
    pub duration_s: f64,
    pub geometry: Option<Polyline>,
}

/// Detail level for a point-to-point route request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDetail {
    /// Geometry and turn-by-turn steps.
    Full,
    /// Geometry only; used for the last-resort request.
    Bare,
}

/// Remote trip optimizer (an OSRM-compatible `trip`/`route` service).
pub trait TripOptimizer {
    fn trip(&self, request: &TripRequest) -> Result<TripPlan, OptimizeError>;

    fn direct_route(
        &self,
        from: Coordinate,
        to: Coordinate,
        detail: RouteDetail,
    ) -> Result<DirectRoute, OptimizeError>;

    /// Whether `trip` can order points without returning to the first one.
    fn supports_one_way(&self) -> bool {
        true
    }
}

impl<T: TripOptimizer + ?Sized> TripOptimizer for &T {
    fn trip(&self, request: &TripRequest) -> Result<TripPlan, OptimizeError> {
        (**self).trip(request)
    }

    fn direct_route(
        &self,
        from: Coordinate,
        to: Coordinate,
        detail: RouteDetail,
    ) -> Result<DirectRoute, OptimizeError> {
        (**self).direct_route(from, to, detail)
    }

    fn supports_one_way(&self) -> bool {
        (**self).supports_one_way()
    }
}

/// Address lookup. `None` means the service found nothing or failed.
pub trait Geocoder {
    fn geocode(&self, address: &str) -> Option<Coordinate>;

    fn reverse(&self, coordinate: Coordinate) -> Option<String>;
}

/// Persistence of a session, keyed by an opaque user id.
pub trait RouteStore {
    fn load(&self, user_id: &str) -> Result<Option<RouteSnapshot>, StoreError>;

    fn save(&self, user_id: &str, snapshot: &RouteSnapshot) -> Result<(), StoreError>;
}

/// Opens one navigation batch in an external turn-by-turn tool.
pub trait NavigationLauncher {
    fn launch(&self, batch_index: usize, url: &str);
}
