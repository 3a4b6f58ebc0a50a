//! Lower bounds on the remaining weight to the destination.

use crate::domain::{AirportCode, Coordinates, Criterion};
use crate::network::NetworkGraph;

use super::weight::WeightStrategy;

/// The bound is shrunk by this factor so floating-point rounding in the
/// distance computation cannot make the heuristic overestimate.
const ROUNDING_SLACK: f64 = 1.0 - 1e-9;

/// Estimates the weight still needed to reach the destination from an
/// airport. Must never overestimate, and must be consistent
/// (`h(u) <= w(u, v) + h(v)` for every usable flight).
pub trait Heuristic {
    fn estimate(&self, from: &AirportCode) -> f64;
}

/// Always zero: turns the search into plain Dijkstra.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZeroHeuristic;

impl Heuristic for ZeroHeuristic {
    fn estimate(&self, _from: &AirportCode) -> f64 {
        0.0
    }
}

/// Great-circle distance to the destination times the smallest weight per
/// kilometre any usable flight achieves.
///
/// Every flight's weight is at least its own great-circle length times that
/// bound, and great-circle distance obeys the triangle inequality, so the
/// estimate is admissible and consistent.
pub struct GreatCircleHeuristic<'g> {
    graph: &'g NetworkGraph,
    target: Coordinates,
    per_km: f64,
}

impl<'g> GreatCircleHeuristic<'g> {
    /// Derive the bound for one query from the current snapshot.
    ///
    /// Returns `None` when the destination is not an airport of the graph.
    pub fn for_query(
        graph: &'g NetworkGraph,
        weights: &WeightStrategy,
        destination: &AirportCode,
    ) -> Option<Self> {
        let target = graph.airport(destination)?.coordinates;
        Some(Self {
            graph,
            target,
            per_km: weight_per_km_bound(graph, weights),
        })
    }

    /// Weight per kilometre used by this heuristic.
    pub fn per_km(&self) -> f64 {
        self.per_km
    }
}

impl Heuristic for GreatCircleHeuristic<'_> {
    fn estimate(&self, from: &AirportCode) -> f64 {
        if self.per_km == 0.0 {
            return 0.0;
        }
        match self.graph.airport(from) {
            Some(airport) => airport.coordinates.distance_km(&self.target) * self.per_km,
            None => 0.0,
        }
    }
}

/// Smallest weight per kilometre over usable flights.
///
/// For `time` this is the reciprocal of the fastest ground speed, for `cost`
/// the cheapest fare per kilometre. Reliability has no distance bound, so it
/// gets zero. Flights between airports at the same position are ignored; a
/// free flight covering positive distance forces the bound to zero.
pub fn weight_per_km_bound(graph: &NetworkGraph, weights: &WeightStrategy) -> f64 {
    if weights.criterion() == Criterion::Reliability {
        return 0.0;
    }

    let mut bound = f64::INFINITY;
    for flight in graph.flights() {
        let Some(weight) = weights.weight(flight) else {
            continue;
        };
        let (Some(from), Some(to)) = (
            graph.airport(&flight.source),
            graph.airport(&flight.destination),
        ) else {
            continue;
        };
        let km = from.distance_km(to);
        if km <= 0.0 {
            continue;
        }
        bound = bound.min(weight / km);
    }

    if bound.is_finite() {
        bound * ROUNDING_SLACK
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Airport, Flight, FlightNumber, StatusChange};

    fn code(s: &str) -> AirportCode {
        AirportCode::parse(s).unwrap()
    }

    fn airport(c: &str, lat: f64, lon: f64) -> Airport {
        Airport {
            code: code(c),
            name: c.to_string(),
            city: c.to_string(),
            coordinates: Coordinates::new(lat, lon).unwrap(),
            timezone: "UTC".to_string(),
        }
    }

    fn flight(n: &str, from: &str, to: &str, hours: f64, price: f64) -> Flight {
        Flight::new(FlightNumber::new(n).unwrap(), code(from), code(to), hours, price, 0.1).unwrap()
    }

    fn graph() -> NetworkGraph {
        NetworkGraph::build(
            vec![
                airport("DEL", 28.5562, 77.1000),
                airport("BOM", 19.0896, 72.8656),
                airport("BLR", 12.9716, 77.5946),
            ],
            vec![
                flight("AI101", "DEL", "BOM", 2.0, 100.0),
                flight("AI202", "BOM", "BLR", 1.5, 80.0),
                flight("AI303", "DEL", "BLR", 4.0, 250.0),
            ],
        )
        .unwrap()
    }

    #[test]
    fn reliability_has_no_bound() {
        let g = graph();
        let w = WeightStrategy::new(Criterion::Reliability, 1.0);
        assert_eq!(weight_per_km_bound(&g, &w), 0.0);
        let h = GreatCircleHeuristic::for_query(&g, &w, &code("BLR")).unwrap();
        assert_eq!(h.estimate(&code("DEL")), 0.0);
    }

    #[test]
    fn admissible_on_every_flight() {
        let g = graph();
        for criterion in [Criterion::Cost, Criterion::Time] {
            let w = WeightStrategy::new(criterion, 1.0);
            let h = GreatCircleHeuristic::for_query(&g, &w, &code("BLR")).unwrap();
            assert!(h.per_km() > 0.0);
            assert_eq!(h.estimate(&code("BLR")), 0.0);

            for f in g.flights() {
                let weight = w.weight(f).unwrap();
                let lhs = h.estimate(&f.source);
                let rhs = weight + h.estimate(&f.destination);
                assert!(lhs <= rhs + 1e-9, "{criterion}: {lhs} > {rhs}");
            }
        }
    }

    #[test]
    fn cancelled_flights_ignored_for_bound() {
        let mut g = graph();
        let w = WeightStrategy::new(Criterion::Cost, 1.0);
        let before = weight_per_km_bound(&g, &w);

        // AI101 is the cheapest per km on this network
        g.update_flight_status(
            &FlightNumber::new("AI101").unwrap(),
            &StatusChange::Cancelled,
            None,
        )
        .unwrap();
        let after = weight_per_km_bound(&g, &w);
        assert!(after > before);
    }

    #[test]
    fn free_flight_disables_cost_bound() {
        let g = NetworkGraph::build(
            vec![airport("DEL", 28.5562, 77.1000), airport("BOM", 19.0896, 72.8656)],
            vec![flight("AI0", "DEL", "BOM", 2.0, 0.0)],
        )
        .unwrap();
        let w = WeightStrategy::new(Criterion::Cost, 1.0);
        assert_eq!(weight_per_km_bound(&g, &w), 0.0);
    }

    #[test]
    fn colocated_airports_skipped() {
        let g = NetworkGraph::build(
            vec![airport("AAA", 10.0, 10.0), airport("BBB", 10.0, 10.0)],
            vec![flight("X1", "AAA", "BBB", 1.0, 50.0)],
        )
        .unwrap();
        let w = WeightStrategy::new(Criterion::Time, 1.0);
        assert_eq!(weight_per_km_bound(&g, &w), 0.0);
    }

    #[test]
    fn unknown_destination() {
        let g = graph();
        let w = WeightStrategy::new(Criterion::Time, 1.0);
        assert!(GreatCircleHeuristic::for_query(&g, &w, &code("HYD")).is_none());
    }
}
