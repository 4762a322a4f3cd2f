//! Caller-owned route session.
//!
//! Owns the stop list, starting point and flags, plus the injected remote
//! optimizer and geocoder. Optimize requests are serialized by `&mut self`.

use tracing::{debug, info};

use crate::error::{FallbackReason, SessionError};
use crate::model::{Coordinate, RouteFlags, StartingPoint, Stop, StopId, StopStatus};
use crate::navigation::{NavigationBatch, NavigationConfig, batch, dispatch, navigation_points};
use crate::optimizer::{Optimization, OptimizationSource, OptimizeOptions, optimize};
use crate::remote::RoadSummary;
use crate::store::RouteSnapshot;
use crate::traits::{Geocoder, NavigationLauncher, RouteStore, TripOptimizer};
use crate::two_opt::TwoOptReport;

/// Outcome of [`RouteSession::optimize`]; the new order is already applied.
#[derive(Debug, Clone)]
pub struct OptimizeSummary {
    pub order: Vec<StopId>,
    pub source: OptimizationSource,
    pub fallback: Option<FallbackReason>,
    pub distance_km: f64,
    pub road: Option<RoadSummary>,
    pub two_opt: Option<TwoOptReport>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BulkAddReport {
    pub added: Vec<StopId>,
    /// Lines the geocoder could not resolve.
    pub failed: Vec<String>,
}

pub struct RouteSession<O, G> {
    stops: Vec<Stop>,
    starting_point: Option<StartingPoint>,
    flags: RouteFlags,
    optimizer: Option<O>,
    geocoder: G,
    options: OptimizeOptions,
    navigation: NavigationConfig,
    optimized: Option<OptimizationSource>,
    next_id: u64,
}

impl<O, G> RouteSession<O, G>
where
    O: TripOptimizer,
    G: Geocoder,
{
    pub fn new(optimizer: O, geocoder: G) -> Self {
        Self::build(Some(optimizer), geocoder)
    }

    /// A session that always sequences locally.
    pub fn local_only(geocoder: G) -> Self {
        Self::build(None, geocoder)
    }

    fn build(optimizer: Option<O>, geocoder: G) -> Self {
        Self {
            stops: Vec::new(),
            starting_point: None,
            flags: RouteFlags::default(),
            optimizer,
            geocoder,
            options: OptimizeOptions::default(),
            navigation: NavigationConfig::default(),
            optimized: None,
            next_id: 0,
        }
    }

    pub fn with_options(mut self, options: OptimizeOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_navigation(mut self, navigation: NavigationConfig) -> Self {
        self.navigation = navigation;
        self
    }

    pub fn stops(&self) -> &[Stop] {
        &self.stops
    }

    pub fn starting_point(&self) -> Option<&StartingPoint> {
        self.starting_point.as_ref()
    }

    pub fn flags(&self) -> RouteFlags {
        self.flags
    }

    /// Source of the current order, if it came from an optimize call since the last edit.
    pub fn optimized(&self) -> Option<OptimizationSource> {
        self.optimized
    }

    pub fn set_round_trip(&mut self, round_trip: bool) {
        if self.flags.round_trip != round_trip {
            self.flags.round_trip = round_trip;
            self.optimized = None;
        }
    }

    /// Geocodes `address` and appends it as a pending stop.
    pub fn add_stop(&mut self, address: &str) -> Result<StopId, SessionError> {
        let address = address.trim();
        let coordinate = self
            .geocoder
            .geocode(address)
            .ok_or_else(|| SessionError::AddressNotFound(address.to_string()))?;
        Ok(self.add_geocoded_stop(address, coordinate))
    }

    pub fn add_geocoded_stop(&mut self, address: &str, coordinate: Coordinate) -> StopId {
        let id = self.next_stop_id();
        debug!(%id, address, %coordinate, "adding stop");
        self.stops.push(Stop::new(id.clone(), address, coordinate));
        self.optimized = None;
        id
    }

    /// Adds one stop per non-empty line.
    pub fn add_stops_bulk(&mut self, text: &str) -> BulkAddReport {
        let mut report = BulkAddReport::default();
        for line in text.lines().map(str::trim).filter(|line| !line.is_empty()) {
            match self.add_stop(line) {
                Ok(id) => report.added.push(id),
                Err(_) => report.failed.push(line.to_string()),
            }
        }
        info!(added = report.added.len(), failed = report.failed.len(), "bulk add finished");
        report
    }

    pub fn remove_stop(&mut self, id: &StopId) -> Result<Stop, SessionError> {
        let position = self
            .stops
            .iter()
            .position(|stop| stop.id() == id)
            .ok_or_else(|| SessionError::UnknownStop(id.to_string()))?;
        self.optimized = None;
        Ok(self.stops.remove(position))
    }

    /// Flips the priority flag, returning the new value.
    pub fn toggle_priority(&mut self, id: &StopId) -> Result<bool, SessionError> {
        let stop = self.stop_mut(id)?;
        stop.priority = !stop.priority;
        let priority = stop.priority;
        self.optimized = None;
        Ok(priority)
    }

    /// Flips between pending and completed, returning the new status.
    pub fn toggle_status(&mut self, id: &StopId) -> Result<StopStatus, SessionError> {
        let stop = self.stop_mut(id)?;
        stop.status = match stop.status {
            StopStatus::Pending => StopStatus::Completed,
            StopStatus::Completed => StopStatus::Pending,
        };
        Ok(stop.status)
    }

    pub fn set_starting_point(&mut self, address: &str) -> Result<(), SessionError> {
        let address = address.trim();
        let coordinate = self
            .geocoder
            .geocode(address)
            .ok_or_else(|| SessionError::AddressNotFound(address.to_string()))?;
        self.replace_starting_point(StartingPoint::new(address, coordinate));
        Ok(())
    }

    /// Uses a known position (e.g. the device location), labelled by reverse geocoding.
    pub fn set_starting_point_at(&mut self, coordinate: Coordinate) {
        let label = self.geocoder.reverse(coordinate).unwrap_or_else(|| {
            format!("Position: {:.6}, {:.6}", coordinate.lat(), coordinate.lng())
        });
        self.replace_starting_point(StartingPoint::new(label, coordinate));
    }

    pub fn clear_starting_point(&mut self) {
        if self.starting_point.take().is_some() {
            self.optimized = None;
        }
    }

    /// Reorders the stops. The new order replaces the old one only as a whole.
    pub fn optimize(&mut self) -> Result<OptimizeSummary, SessionError> {
        let result = optimize(
            self.optimizer.as_ref(),
            &self.stops,
            self.starting_point.as_ref(),
            self.flags,
            &self.options,
        )?;

        let Optimization {
            tour,
            source,
            fallback,
            distance_km,
            road,
            two_opt,
        } = result;
        let summary = OptimizeSummary {
            order: tour.ids(),
            source,
            fallback,
            distance_km,
            road,
            two_opt,
        };
        drop(tour);

        self.apply_order(&summary.order);
        self.optimized = Some(summary.source);
        info!(
            source = ?summary.source,
            stops = summary.order.len(),
            distance_km = summary.distance_km,
            "route optimized"
        );
        Ok(summary)
    }

    pub fn navigation_batches(&self) -> Vec<NavigationBatch> {
        let points = navigation_points(
            &self.stops,
            self.starting_point.as_ref(),
            self.flags.round_trip,
            &self.navigation,
        );
        batch(&points, self.flags.round_trip, &self.navigation)
    }

    /// Opens the current order in the navigation tool; returns how many batches were sent.
    pub fn start_navigation<L>(&self, launcher: &L) -> usize
    where
        L: NavigationLauncher + ?Sized,
    {
        let batches = self.navigation_batches();
        dispatch(&batches, launcher, &self.navigation);
        batches.len()
    }

    pub fn snapshot(&self) -> RouteSnapshot {
        RouteSnapshot {
            stops: self.stops.clone(),
            starting_point: self.starting_point.clone(),
            flags: self.flags,
        }
    }

    pub fn restore(&mut self, snapshot: RouteSnapshot) {
        self.stops = snapshot.stops;
        self.starting_point = snapshot.starting_point;
        self.flags = snapshot.flags;
        self.optimized = None;
    }

    pub fn save<S: RouteStore + ?Sized>(&self, store: &S, user_id: &str) -> Result<(), SessionError> {
        store.save(user_id, &self.snapshot())?;
        Ok(())
    }

    /// Restores the user's saved route; returns false when nothing was stored.
    pub fn load<S: RouteStore + ?Sized>(&mut self, store: &S, user_id: &str) -> Result<bool, SessionError> {
        match store.load(user_id)? {
            Some(snapshot) => {
                self.restore(snapshot);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn replace_starting_point(&mut self, point: StartingPoint) {
        debug!(address = %point.address, coordinate = %point.coordinate, "starting point set");
        self.starting_point = Some(point);
        self.optimized = None;
    }

    fn stop_mut(&mut self, id: &StopId) -> Result<&mut Stop, SessionError> {
        self.stops
            .iter_mut()
            .find(|stop| stop.id() == id)
            .ok_or_else(|| SessionError::UnknownStop(id.to_string()))
    }

    fn next_stop_id(&mut self) -> StopId {
        loop {
            self.next_id += 1;
            let id = StopId::new(format!("stop-{}", self.next_id));
            if !self.stops.iter().any(|stop| stop.id() == &id) {
                return id;
            }
        }
    }

    fn apply_order(&mut self, order: &[StopId]) {
        let reordered: Vec<Stop> = order
            .iter()
            .filter_map(|id| self.stops.iter().find(|stop| stop.id() == id).cloned())
            .collect();
        if reordered.len() == self.stops.len() {
            self.stops = reordered;
        }
    }
}
