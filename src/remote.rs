//! Delegation to a remote trip optimizer and mapping its waypoints back to stops.

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::error::OptimizeError;
use crate::model::{Coordinate, Located, RouteFlags, StartingPoint, Stop};
use crate::polyline::Polyline;
use crate::traits::{RouteDetail, TripOptimizer, TripRequest, TripSource};

/// What a request coordinate stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Start,
    Stop(usize),
}

/// A trip request together with the table that maps its coordinates back to stops.
#[derive(Debug, Clone)]
pub struct PreparedTrip {
    pub request: TripRequest,
    slots: Vec<Slot>,
}

impl PreparedTrip {
    pub fn point_count(&self) -> usize {
        self.slots.len()
    }

    pub fn includes_start(&self) -> bool {
        self.slots.first() == Some(&Slot::Start)
    }
}

/// Road-level details returned by the remote service.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RoadSummary {
    pub distance_m: Option<f64>,
    pub duration_s: Option<f64>,
    pub geometry: Option<Polyline>,
}

/// An order produced by the remote service, as positions into the stop slice.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteRoute {
    pub order: Vec<usize>,
    pub road: RoadSummary,
    /// False when the two-point shortcut was taken and no reordering was asked for.
    pub reordered: bool,
}

/// Lists the starting point (if any) and then every stop, dropping coordinates
/// whose [`Coordinate::location_key`] repeats an earlier one.
pub fn prepare_trip(start: Option<&StartingPoint>, stops: &[Stop], flags: RouteFlags) -> PreparedTrip {
    let mut coordinates: Vec<Coordinate> = Vec::with_capacity(stops.len() + 1);
    let mut slots = Vec::with_capacity(stops.len() + 1);
    let mut seen: HashSet<String> = HashSet::with_capacity(stops.len() + 1);

    let candidates = start
        .map(|point| (Slot::Start, point.coordinate()))
        .into_iter()
        .chain(
            stops
                .iter()
                .enumerate()
                .map(|(idx, stop)| (Slot::Stop(idx), stop.coordinate())),
        );

    for (slot, coordinate) in candidates {
        if !seen.insert(coordinate.location_key()) {
            debug!(?slot, %coordinate, "dropping duplicate coordinate from trip request");
            continue;
        }
        coordinates.push(coordinate);
        slots.push(slot);
    }

    PreparedTrip {
        request: TripRequest {
            coordinates,
            round_trip: flags.round_trip,
            source: TripSource::First,
            steps: true,
        },
        slots,
    }
}

/// Maps request indices in visiting order onto stop positions.
///
/// The starting point is dropped and repeated indices are kept once. The
/// result is only accepted when it names every one of the `stop_count` stops.
pub fn remap(prepared: &PreparedTrip, visit_order: &[usize], stop_count: usize) -> Result<Vec<usize>, OptimizeError> {
    let mut seen = HashSet::with_capacity(stop_count);
    let mut order = Vec::with_capacity(stop_count);

    for &index in visit_order {
        match prepared.slots.get(index) {
            Some(Slot::Start) => {}
            Some(Slot::Stop(stop_idx)) => {
                if seen.insert(*stop_idx) {
                    order.push(*stop_idx);
                }
            }
            None => {
                return Err(OptimizeError::RemoteResponseInvalid(format!(
                    "waypoint index {} out of range for {} points",
                    index,
                    prepared.point_count()
                )));
            }
        }
    }

    if order.len() != stop_count {
        return Err(OptimizeError::RemoteResponseInvalid(format!(
            "remote order covers {} of {} stops",
            order.len(),
            stop_count
        )));
    }

    Ok(order)
}

/// Asks the remote service for an order over `stops`.
///
/// With exactly two request points the reorder step is skipped and a direct
/// route is fetched instead; if the service reports no route, a bare
/// last-resort request is made and its failure is reported as
/// [`OptimizeError::NoRouteFound`].
pub fn try_remote<O>(optimizer: &O, prepared: &PreparedTrip, stops: &[Stop]) -> Result<RemoteRoute, OptimizeError>
where
    O: TripOptimizer + ?Sized,
{
    let coordinates = &prepared.request.coordinates;
    if coordinates.len() < 2 {
        return Err(OptimizeError::RemoteResponseInvalid(
            "fewer than 2 distinct points".to_string(),
        ));
    }

    if coordinates.len() == 2 {
        let (from, to) = (coordinates[0], coordinates[1]);
        let route = match optimizer.direct_route(from, to, RouteDetail::Full) {
            Ok(route) => route,
            Err(OptimizeError::NoRouteFound(reason)) => {
                warn!(%from, %to, %reason, "no route found, trying last-resort direct route");
                optimizer
                    .direct_route(from, to, RouteDetail::Bare)
                    .map_err(|err| {
                        OptimizeError::NoRouteFound(format!("{}; last resort failed: {}", reason, err))
                    })?
            }
            Err(err) => return Err(err),
        };

        return Ok(RemoteRoute {
            order: (0..stops.len()).collect(),
            road: RoadSummary {
                distance_m: Some(route.distance_m),
                duration_s: Some(route.duration_s),
                geometry: route.geometry,
            },
            reordered: false,
        });
    }

    let plan = optimizer.trip(&prepared.request)?;
    let order = remap(prepared, &plan.visit_order, stops.len())?;

    Ok(RemoteRoute {
        order,
        road: RoadSummary {
            distance_m: plan.distance_m,
            duration_s: plan.duration_s,
            geometry: plan.geometry,
        },
        reordered: true,
    })
}
