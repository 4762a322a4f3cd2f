//! 2-opt refinement of a stop order.
//!
//! Reverses sub-segments `[i..=j]` with `1 <= i < j < len`, taking the first
//! move that shortens the route (first-improvement), and restarts the scan
//! after every accepted move. Moves that keep the distance within a tolerance
//! are also taken when they pull priority stops forward, as long as the route
//! never ends up longer than the order it was given.

use rayon::prelude::*;
use tracing::debug;

use crate::haversine::route_distance_km;
use crate::model::{Coordinate, Located, Stop};

/// Slack for float noise when comparing route lengths.
const DISTANCE_EPSILON_KM: f64 = 1e-9;

/// Acceptance policy for 2-opt moves.
#[derive(Debug, Clone)]
pub struct TwoOptPolicy {
    /// Distances this close (km) count as equal for the priority tie-break.
    pub tie_tolerance_km: f64,
    /// Score per remaining position for each priority stop.
    pub priority_weight: f64,
    /// Hard ceiling on scan passes.
    pub max_passes: usize,
}

impl Default for TwoOptPolicy {
    fn default() -> Self {
        Self {
            tie_tolerance_km: 0.1,
            priority_weight: 10.0,
            max_passes: 1000,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TwoOptReport {
    pub passes: usize,
    pub moves: usize,
    pub initial_km: f64,
    pub final_km: f64,
}

/// Rewards priority stops placed early: each contributes `(len - position) * weight`.
pub fn priority_score(stops: &[Stop], order: &[usize], weight: f64) -> f64 {
    let len = order.len();
    order
        .iter()
        .enumerate()
        .filter(|&(_, &idx)| stops[idx].priority)
        .map(|(position, _)| (len - position) as f64 * weight)
        .sum()
}

struct Candidate {
    i: usize,
    j: usize,
    km: f64,
    score: f64,
}

struct Scan<'a> {
    stops: &'a [Stop],
    coords: Vec<Coordinate>,
    start: Option<Coordinate>,
    round_trip: bool,
    policy: &'a TwoOptPolicy,
    ceiling_km: f64,
}

impl Scan<'_> {
    fn distance(&self, order: &[usize]) -> f64 {
        let points: Vec<Coordinate> = order.iter().map(|&idx| self.coords[idx]).collect();
        route_distance_km(self.start, &points, self.round_trip)
    }

    fn evaluate(&self, order: &[usize], i: usize, j: usize) -> Candidate {
        let mut reversed = order.to_vec();
        reversed[i..=j].reverse();
        Candidate {
            i,
            j,
            km: self.distance(&reversed),
            score: priority_score(self.stops, &reversed, self.policy.priority_weight),
        }
    }

    fn accepts(&self, candidate: &Candidate, current_km: f64, current_score: f64) -> bool {
        if candidate.km < current_km - DISTANCE_EPSILON_KM {
            return true;
        }
        (candidate.km - current_km).abs() <= self.policy.tie_tolerance_km
            && candidate.score > current_score
            && candidate.km <= self.ceiling_km + DISTANCE_EPSILON_KM
    }

    /// First acceptable move in `(i, j)` scan order.
    fn find_move(&self, order: &[usize], current_km: f64, current_score: f64) -> Option<Candidate> {
        let n = order.len();
        (1..n.saturating_sub(1)).find_map(|i| {
            (i + 1..n).into_par_iter().find_map_first(|j| {
                let candidate = self.evaluate(order, i, j);
                self.accepts(&candidate, current_km, current_score)
                    .then_some(candidate)
            })
        })
    }
}

/// Refines `order` (positions into `stops`) in place.
///
/// `start` and `round_trip` shape the cost exactly as in [`route_distance_km`].
/// The first position of `order` never moves.
pub fn improve(
    order: &mut [usize],
    stops: &[Stop],
    start: Option<Coordinate>,
    round_trip: bool,
    policy: &TwoOptPolicy,
) -> TwoOptReport {
    let mut scan = Scan {
        stops,
        coords: stops.iter().map(Located::coordinate).collect(),
        start,
        round_trip,
        policy,
        ceiling_km: 0.0,
    };
    let initial_km = scan.distance(order);
    scan.ceiling_km = initial_km;

    let mut current_km = initial_km;
    let mut current_score = priority_score(stops, order, policy.priority_weight);
    let mut passes = 0;
    let mut moves = 0;

    if order.len() >= 3 {
        while passes < policy.max_passes {
            passes += 1;
            let Some(candidate) = scan.find_move(order, current_km, current_score) else {
                break;
            };
            order[candidate.i..=candidate.j].reverse();
            current_km = candidate.km;
            current_score = candidate.score;
            moves += 1;
        }
    }

    debug!(
        stops = order.len(),
        passes,
        moves,
        initial_km,
        final_km = current_km,
        "2-opt finished"
    );

    TwoOptReport {
        passes,
        moves,
        initial_km,
        final_km: current_km,
    }
}
