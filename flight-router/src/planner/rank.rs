//! Route ranking.
//!
//! One total order is used everywhere routes compete: inside the priority
//! queue, between k-shortest candidates, and on final results.

use std::cmp::Ordering;

use crate::domain::{FlightNumber, Route};

/// Anything that can be ranked as a route.
pub trait Ranked {
    /// Total weight under the query's criterion.
    fn total_weight(&self) -> f64;

    fn stop_count(&self) -> usize;

    fn max_leg_delay(&self) -> f64;

    fn flight_numbers(&self) -> impl Iterator<Item = &FlightNumber>;
}

impl Ranked for Route {
    fn total_weight(&self) -> f64 {
        self.total_cost
    }

    fn stop_count(&self) -> usize {
        self.stops()
    }

    fn max_leg_delay(&self) -> f64 {
        self.max_leg_delay_probability
    }

    fn flight_numbers(&self) -> impl Iterator<Item = &FlightNumber> {
        self.flights.iter()
    }
}

/// Compare two routes, best first.
///
/// Routes are ordered by:
/// 1. Total weight (lower is better)
/// 2. Number of stops (fewer is better)
/// 3. Highest single-leg delay probability (lower is better)
/// 4. Flight numbers, lexicographically
///
/// Weights are compared exactly; there is no epsilon.
pub fn compare<R: Ranked>(a: &R, b: &R) -> Ordering {
    a.total_weight()
        .total_cmp(&b.total_weight())
        .then_with(|| a.stop_count().cmp(&b.stop_count()))
        .then_with(|| a.max_leg_delay().total_cmp(&b.max_leg_delay()))
        .then_with(|| a.flight_numbers().cmp(b.flight_numbers()))
}

/// Whether `a` beats `b` after any common continuation.
///
/// Both must end at the same airport with the same total weight. Fewer
/// stops stays fewer whatever is appended. With equal stops, the flight
/// numbers are decided by the part already flown, so `a` wins if it is
/// ahead there and its worst leg is no riskier. A shared later leg can
/// raise both worst legs to the same value, which is why a lower worst leg
/// alone is not enough.
pub fn dominates<R: Ranked>(a: &R, b: &R) -> bool {
    match a.stop_count().cmp(&b.stop_count()) {
        Ordering::Less => true,
        Ordering::Greater => false,
        Ordering::Equal => {
            a.max_leg_delay() <= b.max_leg_delay() && a.flight_numbers().lt(b.flight_numbers())
        }
    }
}

/// Sort routes best-first.
pub fn rank_routes(mut routes: Vec<Route>) -> Vec<Route> {
    routes.sort_by(compare);
    routes
}

/// Drop routes that visit the same airports as an earlier route.
///
/// Keeps the first occurrence, so callers decide precedence by order.
pub fn deduplicate(routes: Vec<Route>) -> Vec<Route> {
    let mut result: Vec<Route> = Vec::with_capacity(routes.len());
    for route in routes {
        if !result.iter().any(|kept| kept.same_path(&route)) {
            result.push(route);
        }
    }
    result
}
