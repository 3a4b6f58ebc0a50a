//! Routes: the results of a search.

use std::fmt;

use super::{AirportCode, FlightNumber};

/// What a search minimizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Criterion {
    /// Total fare.
    Cost,
    /// Total flying time.
    Time,
    /// Probability of running into a delay.
    Reliability,
}

impl Criterion {
    pub const ALL: [Criterion; 3] = [Criterion::Cost, Criterion::Time, Criterion::Reliability];

    /// Parse a criterion name (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cost" | "price" => Some(Criterion::Cost),
            "time" | "duration" => Some(Criterion::Time),
            "reliability" => Some(Criterion::Reliability),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Criterion::Cost => "cost",
            Criterion::Time => "time",
            Criterion::Reliability => "reliability",
        }
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which pathfinder produced a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Algorithm {
    Dijkstra,
    AStar,
}

impl Algorithm {
    /// Parse an algorithm name. Accepts `a_star`, `astar` and `a*`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dijkstra" => Some(Algorithm::Dijkstra),
            "a_star" | "astar" | "a*" => Some(Algorithm::AStar),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Algorithm::Dijkstra => "dijkstra",
            Algorithm::AStar => "a_star",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A loop-free itinerary between two airports.
///
/// `airports` has one more entry than `flights`: flight `i` flies from
/// `airports[i]` to `airports[i + 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub airports: Vec<AirportCode>,
    pub flights: Vec<FlightNumber>,
    pub criterion: Criterion,
    pub algorithm: Algorithm,
    /// Sum of the edge weights under `criterion`.
    pub total_cost: f64,
    /// Sum of effective flight durations in hours.
    pub total_duration: f64,
    /// Sum of fares, after fare adjustment.
    pub total_price: f64,
    /// Mean effective delay probability over the legs.
    pub average_delay_probability: f64,
    /// Highest effective delay probability of any single leg.
    pub max_leg_delay_probability: f64,
}

impl Route {
    pub fn source(&self) -> &AirportCode {
        &self.airports[0]
    }

    pub fn destination(&self) -> &AirportCode {
        &self.airports[self.airports.len() - 1]
    }

    /// Number of intermediate airports.
    pub fn stops(&self) -> usize {
        self.airports.len().saturating_sub(2)
    }

    /// Whether the route uses the given flight.
    pub fn uses_flight(&self, number: &FlightNumber) -> bool {
        self.flights.contains(number)
    }

    /// Whether two routes visit the same airports in the same order.
    pub fn same_path(&self, other: &Route) -> bool {
        self.airports == other.airports
    }
}
