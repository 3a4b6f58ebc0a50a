//! Best-first single-path search.
//!
//! One loop serves both Dijkstra and A*: the only difference is the
//! heuristic added to a label's weight to form its queue priority.
//!
//! An airport may hold several labels of the same weight. Only labels
//! another one dominates are dropped, so the route that wins at the
//! destination is the best under the full ranking order, not just the
//! lightest.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};

use tracing::trace;

use crate::domain::{AirportCode, Algorithm, Flight, FlightNumber, Route};
use crate::network::NetworkGraph;

use super::heuristic::Heuristic;
use super::rank::{self, Ranked};
use super::weight::WeightStrategy;

/// A partial route from the query's origin.
#[derive(Debug, Clone)]
pub struct Label<'g> {
    origin: AirportCode,
    at: AirportCode,
    cost: f64,
    max_leg_delay: f64,
    flights: Vec<&'g Flight>,
}

impl<'g> Label<'g> {
    /// The empty route standing at `origin`.
    pub fn origin(origin: AirportCode) -> Self {
        Self {
            origin,
            at: origin,
            cost: 0.0,
            max_leg_delay: 0.0,
            flights: Vec::new(),
        }
    }

    pub fn at(&self) -> AirportCode {
        self.at
    }

    pub fn cost(&self) -> f64 {
        self.cost
    }

    pub fn flights(&self) -> &[&'g Flight] {
        &self.flights
    }

    /// Airports visited, origin first.
    pub fn airports(&self) -> Vec<AirportCode> {
        std::iter::once(self.origin)
            .chain(self.flights.iter().map(|f| f.destination))
            .collect()
    }

    pub fn visits(&self, airport: &AirportCode) -> bool {
        self.origin == *airport || self.flights.iter().any(|f| f.destination == *airport)
    }

    /// This route followed by `flight`, which weighs `weight`.
    pub fn extend(&self, flight: &'g Flight, weight: f64) -> Self {
        let mut flights = Vec::with_capacity(self.flights.len() + 1);
        flights.extend_from_slice(&self.flights);
        flights.push(flight);
        Self {
            origin: self.origin,
            at: flight.destination,
            cost: self.cost + weight,
            max_leg_delay: self
                .max_leg_delay
                .max(flight.effective_delay_probability()),
            flights,
        }
    }

    /// Whether two labels visit the same airports in the same order.
    pub fn same_path(&self, other: &Label<'_>) -> bool {
        self.origin == other.origin
            && self.flights.len() == other.flights.len()
            && self
                .flights
                .iter()
                .zip(&other.flights)
                .all(|(a, b)| a.destination == b.destination)
    }

    /// Materialize the finished route.
    pub fn into_route(self, weights: &WeightStrategy, algorithm: Algorithm) -> Route {
        let legs = self.flights.len().max(1) as f64;
        let delay_sum: f64 = self
            .flights
            .iter()
            .map(|f| f.effective_delay_probability())
            .sum();

        Route {
            airports: self.airports(),
            flights: self.flights.iter().map(|f| f.number.clone()).collect(),
            criterion: weights.criterion(),
            algorithm,
            total_cost: self.cost,
            total_duration: self
                .flights
                .iter()
                .map(|f| f.effective_duration_hours())
                .sum(),
            total_price: self.flights.iter().map(|f| weights.fare(f)).sum(),
            average_delay_probability: delay_sum / legs,
            max_leg_delay_probability: self.max_leg_delay,
        }
    }
}

impl Ranked for Label<'_> {
    fn total_weight(&self) -> f64 {
        self.cost
    }

    fn stop_count(&self) -> usize {
        self.flights.len().saturating_sub(1)
    }

    fn max_leg_delay(&self) -> f64 {
        self.max_leg_delay
    }

    fn flight_numbers(&self) -> impl Iterator<Item = &FlightNumber> {
        self.flights.iter().map(|f| &f.number)
    }
}

/// Restrictions on the routes a search may return.
#[derive(Debug, Clone, Default)]
pub struct Constraints {
    /// Airports every route must start with, in order. The first entry is
    /// the origin.
    pub corridor: Vec<AirportCode>,
    /// Ordered airport pairs; every flight between them is excluded.
    pub legs: HashSet<(AirportCode, AirportCode)>,
}

impl Constraints {
    fn allows(&self, label: &Label<'_>, flight: &Flight) -> bool {
        if let Some(required) = self.corridor.get(label.flights.len() + 1) {
            if flight.destination != *required {
                return false;
            }
        }
        !self.legs.contains(&(flight.source, flight.destination))
    }
}

/// Result of one single-path search.
#[derive(Debug)]
pub struct SearchOutcome<'g> {
    pub best: Option<Label<'g>>,
    /// Labels popped and expanded.
    pub expansions: usize,
}

/// Queue entry. Ordered so that `BinaryHeap` pops the lowest priority first,
/// and among equal priorities the best-ranked label.
struct State<'g> {
    priority: f64,
    label: Label<'g>,
}

impl PartialEq for State<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for State<'_> {}

impl PartialOrd for State<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for State<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .priority
            .total_cmp(&self.priority)
            .then_with(|| rank::compare(&other.label, &self.label))
    }
}

/// Find the best loop-free route from `source` to `destination`.
///
/// "Best" is the full order of [`rank::compare`]. Labels reach each
/// airport in ranking order. A label is dropped if it is heavier than the
/// lightest label already expanded there, or if an expanded label of the
/// same weight dominates it. The first label popped at the destination is
/// therefore the best route.
pub fn best_path<'g, H: Heuristic + ?Sized>(
    graph: &'g NetworkGraph,
    weights: &WeightStrategy,
    heuristic: &H,
    source: AirportCode,
    destination: AirportCode,
    constraints: &Constraints,
) -> SearchOutcome<'g> {
    let mut heap = BinaryHeap::new();
    let mut lightest: HashMap<AirportCode, f64> = HashMap::new();
    let mut expanded: HashMap<AirportCode, Vec<Label<'g>>> = HashMap::new();
    let mut expansions = 0;

    heap.push(State {
        priority: heuristic.estimate(&source),
        label: Label::origin(source),
    });

    while let Some(State { label, .. }) = heap.pop() {
        if lightest.get(&label.at).is_some_and(|&cost| label.cost > cost) {
            continue;
        }
        let rivals = expanded.entry(label.at).or_default();
        if rivals.iter().any(|rival| rank::dominates(rival, &label)) {
            continue;
        }
        lightest.entry(label.at).or_insert(label.cost);
        expansions += 1;

        if label.at == destination {
            trace!(expansions, cost = label.cost, "reached destination");
            return SearchOutcome {
                best: Some(label),
                expansions,
            };
        }

        for flight in graph.outgoing(&label.at) {
            if label.visits(&flight.destination) || !constraints.allows(&label, flight) {
                continue;
            }
            let Some(weight) = weights.weight(flight) else {
                continue;
            };
            let next = label.extend(flight, weight);
            if lightest.get(&next.at).is_some_and(|&cost| next.cost > cost) {
                continue;
            }
            heap.push(State {
                priority: next.cost + heuristic.estimate(&next.at),
                label: next,
            });
        }
        rivals.push(label);
    }

    SearchOutcome {
        best: None,
        expansions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Airport, Coordinates, Criterion, StatusChange};
    use crate::planner::heuristic::ZeroHeuristic;

    fn code(s: &str) -> AirportCode {
        AirportCode::parse(s).unwrap()
    }

    fn airport(c: &str) -> Airport {
        Airport {
            code: code(c),
            name: c.to_string(),
            city: c.to_string(),
            coordinates: Coordinates::new(0.0, 0.0).unwrap(),
            timezone: "UTC".to_string(),
        }
    }

    fn flight(n: &str, from: &str, to: &str, price: f64, p: f64) -> Flight {
        Flight::new(FlightNumber::new(n).unwrap(), code(from), code(to), 1.0, price, p).unwrap()
    }

    fn search<'g>(graph: &'g NetworkGraph, from: &str, to: &str) -> SearchOutcome<'g> {
        best_path(
            graph,
            &WeightStrategy::new(Criterion::Cost, 1.0),
            &ZeroHeuristic,
            code(from),
            code(to),
            &Constraints::default(),
        )
    }

    fn numbers(label: &Label<'_>) -> Vec<String> {
        label.flight_numbers().map(|n| n.to_string()).collect()
    }

    #[test]
    fn cheapest_path() {
        let graph = NetworkGraph::build(
            vec![airport("AAA"), airport("BBB"), airport("CCC")],
            vec![
                flight("F1", "AAA", "BBB", 10.0, 0.1),
                flight("F2", "BBB", "CCC", 10.0, 0.1),
                flight("F3", "AAA", "CCC", 30.0, 0.1),
            ],
        )
        .unwrap();

        let outcome = search(&graph, "AAA", "CCC");
        let best = outcome.best.unwrap();
        assert_eq!(numbers(&best), vec!["F1", "F2"]);
        assert_eq!(best.cost(), 20.0);
        assert_eq!(best.airports(), vec![code("AAA"), code("BBB"), code("CCC")]);
        assert_eq!(outcome.expansions, 3);
    }

    #[test]
    fn equal_weight_prefers_fewer_stops() {
        let graph = NetworkGraph::build(
            vec![airport("AAA"), airport("BBB"), airport("CCC")],
            vec![
                flight("F1", "AAA", "BBB", 10.0, 0.1),
                flight("F2", "BBB", "CCC", 10.0, 0.1),
                flight("F3", "AAA", "CCC", 20.0, 0.1),
            ],
        )
        .unwrap();

        let best = search(&graph, "AAA", "CCC").best.unwrap();
        assert_eq!(numbers(&best), vec!["F3"]);
    }

    #[test]
    fn equal_weight_prefers_lower_leg_risk_then_number() {
        let graph = NetworkGraph::build(
            vec![airport("AAA"), airport("BBB")],
            vec![
                flight("ZZ1", "AAA", "BBB", 10.0, 0.1),
                flight("AA1", "AAA", "BBB", 10.0, 0.4),
                flight("MM1", "AAA", "BBB", 10.0, 0.1),
            ],
        )
        .unwrap();

        let best = search(&graph, "AAA", "BBB").best.unwrap();
        assert_eq!(numbers(&best), vec!["MM1"]);
    }

    #[test]
    fn cancelled_flight_is_not_an_edge() {
        let mut graph = NetworkGraph::build(
            vec![airport("AAA"), airport("BBB")],
            vec![flight("F1", "AAA", "BBB", 10.0, 0.1)],
        )
        .unwrap();
        graph
            .update_flight_status(
                &FlightNumber::new("F1").unwrap(),
                &StatusChange::Cancelled,
                None,
            )
            .unwrap();

        let outcome = search(&graph, "AAA", "BBB");
        assert!(outcome.best.is_none());
        assert_eq!(outcome.expansions, 1);
    }

    #[test]
    fn shared_leg_hands_tie_to_flight_numbers() {
        // Both ways to CCC weigh 300 with one stop. The ZZ branch has the
        // safer first leg, but the shared XX1 leg lifts both to 0.5, so the
        // flight numbers decide.
        let graph = NetworkGraph::build(
            vec![
                airport("AAA"),
                airport("BBB"),
                airport("CCC"),
                airport("DDD"),
                airport("EEE"),
            ],
            vec![
                flight("AA1", "AAA", "BBB", 100.0, 0.3),
                flight("AA2", "BBB", "DDD", 100.0, 0.0),
                flight("ZZ1", "AAA", "CCC", 100.0, 0.1),
                flight("ZZ2", "CCC", "DDD", 100.0, 0.0),
                flight("XX1", "DDD", "EEE", 100.0, 0.5),
            ],
        )
        .unwrap();

        let best = search(&graph, "AAA", "EEE").best.unwrap();
        assert_eq!(numbers(&best), vec!["AA1", "AA2", "XX1"]);

        // ending at DDD the safer first leg still wins
        let best = search(&graph, "AAA", "DDD").best.unwrap();
        assert_eq!(numbers(&best), vec!["ZZ1", "ZZ2"]);
    }

    #[test]
    fn constraints_restrict_corridor_and_legs() {
        let graph = NetworkGraph::build(
            vec![airport("AAA"), airport("BBB"), airport("CCC")],
            vec![
                flight("F1", "AAA", "BBB", 10.0, 0.1),
                flight("F2", "BBB", "CCC", 10.0, 0.1),
                flight("F3", "AAA", "CCC", 30.0, 0.1),
                flight("F4", "AAA", "CCC", 40.0, 0.1),
            ],
        )
        .unwrap();
        let weights = WeightStrategy::new(Criterion::Cost, 1.0);
        let run = |constraints: &Constraints| {
            best_path(
                &graph,
                &weights,
                &ZeroHeuristic,
                code("AAA"),
                code("CCC"),
                constraints,
            )
            .best
            .map(|label| numbers(&label))
        };

        let mut constraints = Constraints::default();
        constraints.legs.insert((code("AAA"), code("BBB")));
        assert_eq!(run(&constraints), Some(vec!["F3".to_string()]));

        constraints.legs.insert((code("AAA"), code("CCC")));
        assert_eq!(run(&constraints), None);

        let corridor = Constraints {
            corridor: vec![code("AAA"), code("CCC")],
            ..Constraints::default()
        };
        assert_eq!(run(&corridor), Some(vec!["F3".to_string()]));
    }

    #[test]
    fn route_totals() {
        let graph = NetworkGraph::build(
            vec![airport("AAA"), airport("BBB"), airport("CCC")],
            vec![
                flight("F1", "AAA", "BBB", 10.0, 0.1),
                flight("F2", "BBB", "CCC", 10.0, 0.3),
            ],
        )
        .unwrap();
        let weights = WeightStrategy::new(Criterion::Cost, 2.0);
        let best = best_path(
            &graph,
            &weights,
            &ZeroHeuristic,
            code("AAA"),
            code("CCC"),
            &Constraints::default(),
        )
        .best
        .unwrap();

        let route = best.into_route(&weights, Algorithm::Dijkstra);
        assert_eq!(route.total_cost, 40.0);
        assert_eq!(route.total_price, 40.0);
        assert_eq!(route.total_duration, 2.0);
        assert!((route.average_delay_probability - 0.2).abs() < 1e-12);
        assert_eq!(route.max_leg_delay_probability, 0.3);
        assert_eq!(route.stops(), 1);
        assert_eq!(route.criterion, Criterion::Cost);
    }
}
