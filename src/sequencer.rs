//! Nearest-neighbor tour construction.

use crate::haversine::weighted_distance_km;
use crate::model::{Coordinate, Located, Stop};

/// Greedy initial order over `stops`.
///
/// Starts from `start` when given, otherwise from the first stop (which then
/// leads the tour). At each step the remaining stop with the smallest
/// [`weighted_distance_km`] from the current position is taken; on equal
/// distance the earlier stop in input order wins.
///
/// Returns positions into `stops`; the starting point is never part of the result.
pub fn nearest_neighbor(start: Option<Coordinate>, stops: &[Stop]) -> Vec<usize> {
    let mut remaining: Vec<usize> = (0..stops.len()).collect();
    let mut order = Vec::with_capacity(stops.len());

    let mut current = match start {
        Some(origin) => origin,
        None => {
            if remaining.is_empty() {
                return order;
            }
            let first = remaining.remove(0);
            order.push(first);
            stops[first].coordinate()
        }
    };

    while !remaining.is_empty() {
        let mut best_slot = 0;
        let mut best_distance = f64::INFINITY;
        for (slot, &idx) in remaining.iter().enumerate() {
            let distance = weighted_distance_km(&current, &stops[idx]);
            if distance < best_distance {
                best_distance = distance;
                best_slot = slot;
            }
        }

        let next = remaining.remove(best_slot);
        order.push(next);
        current = stops[next].coordinate();
    }

    order
}
