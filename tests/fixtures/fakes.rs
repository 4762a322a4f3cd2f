//! In-process stand-ins for the external services.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};

use stop_sequencer::error::OptimizeError;
use stop_sequencer::model::Coordinate;
use stop_sequencer::traits::{
    DirectRoute, Geocoder, NavigationLauncher, RouteDetail, TripOptimizer, TripPlan, TripRequest,
};

type TripFn = Box<dyn Fn(&TripRequest) -> Result<TripPlan, OptimizeError>>;

/// Scripted trip optimizer that records what it was asked.
pub struct FakeOptimizer {
    trip: TripFn,
    routes: RefCell<VecDeque<Result<DirectRoute, OptimizeError>>>,
    one_way: bool,
    pub trip_calls: Cell<usize>,
    pub route_calls: RefCell<Vec<RouteDetail>>,
    pub last_request: RefCell<Option<TripRequest>>,
}

impl FakeOptimizer {
    pub fn with_trip(trip: impl Fn(&TripRequest) -> Result<TripPlan, OptimizeError> + 'static) -> Self {
        Self {
            trip: Box::new(trip),
            routes: RefCell::new(VecDeque::new()),
            one_way: true,
            trip_calls: Cell::new(0),
            route_calls: RefCell::new(Vec::new()),
            last_request: RefCell::new(None),
        }
    }

    /// Returns the given request indices as the visiting order.
    pub fn ordering(order: Vec<usize>) -> Self {
        Self::with_trip(move |_| Ok(plan(order.clone())))
    }

    /// Keeps the first point and reverses the rest.
    pub fn reversing() -> Self {
        Self::with_trip(|request| {
            let n = request.coordinates.len();
            let order = std::iter::once(0).chain((1..n).rev()).collect();
            Ok(plan(order))
        })
    }

    /// Echoes the request order back.
    pub fn identity() -> Self {
        Self::with_trip(|request| Ok(plan((0..request.coordinates.len()).collect())))
    }

    pub fn failing(err: OptimizeError) -> Self {
        Self::with_trip(move |_| Err(err.clone()))
    }

    /// Behaves like a service that only plans round trips.
    pub fn round_trips_only(mut self) -> Self {
        self.one_way = false;
        self
    }

    /// Queues results for successive `direct_route` calls.
    pub fn with_routes(self, routes: Vec<Result<DirectRoute, OptimizeError>>) -> Self {
        *self.routes.borrow_mut() = routes.into();
        self
    }
}

pub fn plan(visit_order: Vec<usize>) -> TripPlan {
    TripPlan {
        visit_order,
        distance_m: Some(1000.0),
        duration_s: Some(120.0),
        geometry: None,
    }
}

pub fn direct(distance_m: f64) -> DirectRoute {
    DirectRoute {
        distance_m,
        duration_s: distance_m / 10.0,
        geometry: None,
    }
}

impl TripOptimizer for FakeOptimizer {
    fn trip(&self, request: &TripRequest) -> Result<TripPlan, OptimizeError> {
        self.trip_calls.set(self.trip_calls.get() + 1);
        *self.last_request.borrow_mut() = Some(request.clone());
        (self.trip)(request)
    }

    fn direct_route(
        &self,
        _from: Coordinate,
        _to: Coordinate,
        detail: RouteDetail,
    ) -> Result<DirectRoute, OptimizeError> {
        self.route_calls.borrow_mut().push(detail);
        self.routes
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(OptimizeError::RemoteUnavailable("no scripted route".to_string())))
    }

    fn supports_one_way(&self) -> bool {
        self.one_way
    }
}

/// Geocoder backed by a fixed address book.
#[derive(Default)]
pub struct FakeGeocoder {
    pub addresses: HashMap<String, Coordinate>,
    pub reverse_name: Option<String>,
}

impl FakeGeocoder {
    pub fn with(mut self, address: &str, coordinate: Coordinate) -> Self {
        self.addresses.insert(address.to_string(), coordinate);
        self
    }
}

impl Geocoder for FakeGeocoder {
    fn geocode(&self, address: &str) -> Option<Coordinate> {
        self.addresses.get(address).copied()
    }

    fn reverse(&self, _coordinate: Coordinate) -> Option<String> {
        self.reverse_name.clone()
    }
}

/// Collects launched navigation links.
#[derive(Default)]
pub struct RecordingLauncher {
    pub launched: RefCell<Vec<(usize, String)>>,
}

impl NavigationLauncher for RecordingLauncher {
    fn launch(&self, batch_index: usize, url: &str) {
        self.launched.borrow_mut().push((batch_index, url.to_string()));
    }
}
