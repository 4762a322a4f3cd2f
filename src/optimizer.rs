//! Optimize entry point: remote attempt first, local heuristic as fallback.
//!
//! Every successful result is a full permutation of the input stops. Whether
//! it came from the remote service or the local heuristic is reported through
//! [`OptimizationSource`], never through an error.

use tracing::{info, warn};

use crate::error::{FallbackReason, OptimizeError};
use crate::haversine::route_distance_km;
use crate::model::{Coordinate, Located, RouteFlags, StartingPoint, Stop, Tour};
use crate::remote::{RoadSummary, prepare_trip, try_remote};
use crate::sequencer::nearest_neighbor;
use crate::traits::TripOptimizer;
use crate::two_opt::{TwoOptPolicy, TwoOptReport, improve};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptimizationSource {
    Remote,
    Local,
}

#[derive(Debug, Clone, Default)]
pub struct OptimizeOptions {
    pub two_opt: TwoOptPolicy,
}

#[derive(Debug, Clone)]
pub struct Optimization<'a> {
    pub tour: Tour<'a>,
    pub source: OptimizationSource,
    /// Set when the local heuristic produced the tour.
    pub fallback: Option<FallbackReason>,
    /// Great-circle length of the tour, including start and return legs.
    pub distance_km: f64,
    /// Road data from the remote service, when it produced the tour.
    pub road: Option<RoadSummary>,
    pub two_opt: Option<TwoOptReport>,
}

/// Nearest neighbor followed by 2-opt. Always a full permutation of `stops`.
pub fn local_fallback<'a>(
    stops: &'a [Stop],
    start: Option<&StartingPoint>,
    flags: RouteFlags,
    policy: &TwoOptPolicy,
) -> (Tour<'a>, TwoOptReport) {
    let origin = start.map(Located::coordinate);
    let mut order = nearest_neighbor(origin, stops);
    let report = improve(&mut order, stops, origin, flags.round_trip, policy);
    (Tour::from_order(stops, &order), report)
}

/// Orders `stops` using only the local heuristic.
pub fn optimize_locally<'a>(
    stops: &'a [Stop],
    start: Option<&StartingPoint>,
    flags: RouteFlags,
    options: &OptimizeOptions,
) -> Result<Optimization<'a>, OptimizeError> {
    check_stop_count(stops)?;
    Ok(local_result(stops, start, flags, options, FallbackReason::NoOptimizer))
}

/// Orders `stops`, preferring the remote optimizer when one is given.
///
/// Recoverable remote failures and no-op remote orders fall back to the local
/// heuristic. [`OptimizeError::NoRouteFound`] is returned as is.
pub fn optimize<'a, O>(
    optimizer: Option<&O>,
    stops: &'a [Stop],
    start: Option<&StartingPoint>,
    flags: RouteFlags,
    options: &OptimizeOptions,
) -> Result<Optimization<'a>, OptimizeError>
where
    O: TripOptimizer + ?Sized,
{
    check_stop_count(stops)?;

    let Some(optimizer) = optimizer else {
        return Ok(local_result(stops, start, flags, options, FallbackReason::NoOptimizer));
    };

    let prepared = prepare_trip(start, stops, flags);
    if prepared.point_count() < 2 {
        return Ok(local_result(
            stops,
            start,
            flags,
            options,
            FallbackReason::TooFewDistinctPoints,
        ));
    }

    if !flags.round_trip && prepared.point_count() > 2 && !optimizer.supports_one_way() {
        return Ok(local_result(
            stops,
            start,
            flags,
            options,
            FallbackReason::OneWayUnsupported,
        ));
    }

    let remote = match try_remote(optimizer, &prepared, stops) {
        Ok(remote) => remote,
        Err(err) if err.is_recoverable() => {
            return Ok(local_result(stops, start, flags, options, FallbackReason::Remote(err)));
        }
        Err(err) => return Err(err),
    };

    if remote.reordered && remote.order.iter().copied().eq(0..stops.len()) {
        return Ok(local_result(stops, start, flags, options, FallbackReason::Unchanged));
    }

    let tour = Tour::from_order(stops, &remote.order);
    if !tour.is_permutation_of(stops) {
        let err = OptimizeError::RemoteResponseInvalid("remote order is not a permutation".to_string());
        return Ok(local_result(stops, start, flags, options, FallbackReason::Remote(err)));
    }

    let distance_km = tour_distance_km(&tour, start, flags);
    info!(
        stops = stops.len(),
        distance_km,
        road_distance_m = ?remote.road.distance_m,
        "remote optimizer produced the tour"
    );

    Ok(Optimization {
        tour,
        source: OptimizationSource::Remote,
        fallback: None,
        distance_km,
        road: Some(remote.road),
        two_opt: None,
    })
}

fn check_stop_count(stops: &[Stop]) -> Result<(), OptimizeError> {
    if stops.len() < 2 {
        return Err(OptimizeError::InsufficientStops { count: stops.len() });
    }
    Ok(())
}

fn local_result<'a>(
    stops: &'a [Stop],
    start: Option<&StartingPoint>,
    flags: RouteFlags,
    options: &OptimizeOptions,
    reason: FallbackReason,
) -> Optimization<'a> {
    warn!(%reason, stops = stops.len(), "using local sequencing");
    let (tour, report) = local_fallback(stops, start, flags, &options.two_opt);
    let distance_km = tour_distance_km(&tour, start, flags);

    Optimization {
        tour,
        source: OptimizationSource::Local,
        fallback: Some(reason),
        distance_km,
        road: None,
        two_opt: Some(report),
    }
}

fn tour_distance_km(tour: &Tour<'_>, start: Option<&StartingPoint>, flags: RouteFlags) -> f64 {
    let points: Vec<Coordinate> = tour.stops().iter().map(|stop| stop.coordinate()).collect();
    route_distance_km(start.map(Located::coordinate), &points, flags.round_trip)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::StopId;

    fn stop(id: &str, lat: f64, lng: f64) -> Stop {
        Stop::new(StopId::new(id), id, Coordinate::new(lat, lng).unwrap())
    }

    #[test]
    fn test_local_fallback_is_permutation() {
        let stops: Vec<Stop> = (0..12)
            .map(|k| stop(&format!("s{}", k), 50.0 + (k % 4) as f64 * 0.05, 14.0 + (k / 4) as f64 * 0.07))
            .collect();
        let (tour, report) = local_fallback(&stops, None, RouteFlags { round_trip: true }, &TwoOptPolicy::default());

        assert!(tour.is_permutation_of(&stops));
        assert!(report.final_km <= report.initial_km + 1e-9);
    }

    #[test]
    fn test_optimize_locally_rejects_single_stop() {
        let stops = vec![stop("a", 50.0, 14.0)];
        let err = optimize_locally(&stops, None, RouteFlags::default(), &OptimizeOptions::default()).unwrap_err();
        assert_eq!(err, OptimizeError::InsufficientStops { count: 1 });
    }

    #[test]
    fn test_optimize_locally_reports_source() {
        let stops = vec![stop("a", 50.0, 14.0), stop("b", 50.1, 14.1)];
        let result = optimize_locally(&stops, None, RouteFlags::default(), &OptimizeOptions::default()).unwrap();
        assert_eq!(result.source, OptimizationSource::Local);
        assert_eq!(result.fallback, Some(FallbackReason::NoOptimizer));
        assert!(result.road.is_none());
    }
}
