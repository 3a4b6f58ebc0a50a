//! Scenario tests for route search across the planner.

use super::*;
use crate::domain::{Airport, Coordinates, Flight, FlightNumber, StatusChange};

fn code(s: &str) -> AirportCode {
    AirportCode::parse(s).unwrap()
}

fn number(s: &str) -> FlightNumber {
    FlightNumber::new(s).unwrap()
}

const AIRPORTS: [(&str, f64, f64); 6] = [
    ("DEL", 28.5562, 77.1000),
    ("BOM", 19.0896, 72.8656),
    ("BLR", 12.9716, 77.5946),
    ("MAA", 12.9941, 80.1709),
    ("CCU", 22.6549, 88.4462),
    ("HYD", 17.2403, 78.4294),
];

fn airport(c: &str) -> Airport {
    let (_, lat, lon) = AIRPORTS
        .iter()
        .find(|(name, _, _)| *name == c)
        .copied()
        .unwrap();
    Airport {
        code: code(c),
        name: format!("{c} Airport"),
        city: c.to_string(),
        coordinates: Coordinates::new(lat, lon).unwrap(),
        timezone: "Asia/Kolkata".to_string(),
    }
}

fn flight(n: &str, from: &str, to: &str, price: f64, hours: f64, p: f64) -> Flight {
    Flight::new(number(n), code(from), code(to), hours, price, p).unwrap()
}

/// DEL → BOM → BLR against the direct DEL → BLR.
fn triangle() -> NetworkGraph {
    NetworkGraph::build(
        vec![airport("DEL"), airport("BOM"), airport("BLR")],
        vec![
            flight("AI101", "DEL", "BOM", 100.0, 2.0, 0.05),
            flight("AI202", "BOM", "BLR", 80.0, 1.5, 0.10),
            flight("AI303", "DEL", "BLR", 250.0, 4.0, 0.02),
        ],
    )
    .unwrap()
}

fn query(from: &str, to: &str, criterion: Criterion, algorithm: Algorithm, k: usize) -> RouteQuery {
    RouteQuery {
        source: code(from),
        destination: code(to),
        criterion,
        algorithm,
        num_routes: k,
    }
}

fn airports_of(route: &Route) -> Vec<&str> {
    route.airports.iter().map(|a| a.as_str()).collect()
}

#[test]
fn cheapest_route_connects_through_bom() {
    let graph = triangle();
    let config = SearchConfig::default();
    let finder = PathFinder::new(&graph, &config);

    let result = finder
        .find_routes(&query("DEL", "BLR", Criterion::Cost, Algorithm::Dijkstra, 1))
        .unwrap();

    assert_eq!(result.routes.len(), 1);
    let route = &result.routes[0];
    assert_eq!(airports_of(route), vec!["DEL", "BOM", "BLR"]);
    assert_eq!(route.total_cost, 180.0);
    assert_eq!(route.total_price, 180.0);
    assert_eq!(route.stops(), 1);
    assert_eq!(route.criterion, Criterion::Cost);
    assert_eq!(route.algorithm, Algorithm::Dijkstra);
}

#[test]
fn fastest_route_connects_through_bom() {
    let graph = triangle();
    let config = SearchConfig::default();
    let finder = PathFinder::new(&graph, &config);

    let result = finder
        .find_routes(&query("DEL", "BLR", Criterion::Time, Algorithm::Dijkstra, 1))
        .unwrap();

    let route = &result.routes[0];
    assert_eq!(airports_of(route), vec!["DEL", "BOM", "BLR"]);
    assert_eq!(route.total_duration, 3.5);
    assert_eq!(route.total_cost, 3.5);
}

#[test]
fn most_reliable_route_is_direct() {
    let graph = triangle();
    let config = SearchConfig::default();
    let finder = PathFinder::new(&graph, &config);

    let result = finder
        .find_routes(&query("DEL", "BLR", Criterion::Reliability, Algorithm::Dijkstra, 1))
        .unwrap();

    let route = &result.routes[0];
    assert_eq!(airports_of(route), vec!["DEL", "BLR"]);
    assert!((route.total_cost - reliability_weight(0.02)).abs() < 1e-12);
    assert_eq!(route.average_delay_probability, 0.02);
}

#[test]
fn cancellation_forces_direct_flight() {
    let mut graph = triangle();
    graph
        .update_flight_status(&number("AI202"), &StatusChange::Cancelled, None)
        .unwrap();
    let config = SearchConfig::default();
    let finder = PathFinder::new(&graph, &config);

    for algorithm in [Algorithm::Dijkstra, Algorithm::AStar] {
        let result = finder
            .find_routes(&query("DEL", "BLR", Criterion::Cost, algorithm, 5))
            .unwrap();

        assert_eq!(result.routes.len(), 1);
        assert_eq!(airports_of(&result.routes[0]), vec!["DEL", "BLR"]);
        assert_eq!(result.routes[0].total_cost, 250.0);
    }
}

#[test]
fn delay_changes_fastest_route() {
    let mut graph = triangle();
    graph
        .update_flight_status(&number("AI101"), &StatusChange::Delayed { minutes: 60 }, None)
        .unwrap();
    let config = SearchConfig::default();
    let finder = PathFinder::new(&graph, &config);

    let result = finder
        .find_routes(&query("DEL", "BLR", Criterion::Time, Algorithm::AStar, 1))
        .unwrap();

    // 3h + 1.5h through BOM now loses to the 4h direct flight
    assert_eq!(airports_of(&result.routes[0]), vec!["DEL", "BLR"]);
    assert_eq!(result.routes[0].total_duration, 4.0);
}

#[test]
fn k_routes_best_first() {
    let graph = triangle();
    let config = SearchConfig::default();
    let finder = PathFinder::new(&graph, &config);

    let result = finder
        .find_routes(&query("DEL", "BLR", Criterion::Cost, Algorithm::Dijkstra, 3))
        .unwrap();

    let costs: Vec<f64> = result.routes.iter().map(|r| r.total_cost).collect();
    assert_eq!(costs, vec![180.0, 250.0]);
}

#[test]
fn unreachable_is_empty_not_error() {
    let graph = triangle();
    let config = SearchConfig::default();
    let finder = PathFinder::new(&graph, &config);

    let result = finder
        .find_routes(&query("BLR", "DEL", Criterion::Cost, Algorithm::AStar, 3))
        .unwrap();
    assert!(result.routes.is_empty());
}

#[test]
fn invalid_queries() {
    let graph = triangle();
    let config = SearchConfig::default();
    let finder = PathFinder::new(&graph, &config);

    let err = finder
        .find_routes(&query("DEL", "DEL", Criterion::Cost, Algorithm::Dijkstra, 1))
        .unwrap_err();
    assert_eq!(err, RoutingError::SameEndpoints(code("DEL")));

    let err = finder
        .find_routes(&query("DEL", "HYD", Criterion::Cost, Algorithm::AStar, 1))
        .unwrap_err();
    assert_eq!(err, RoutingError::UnknownAirport(code("HYD")));
    assert_eq!(err.kind(), crate::domain::ErrorKind::Validation);

    let err = finder
        .find_routes(&query("DEL", "BLR", Criterion::Cost, Algorithm::Dijkstra, 0))
        .unwrap_err();
    assert!(matches!(err, RoutingError::Validation(_)));
}

#[test]
fn num_routes_is_clamped() {
    let graph = triangle();
    let config = SearchConfig::new(1, 100, 1.0);
    let finder = PathFinder::new(&graph, &config);

    let result = finder
        .find_routes(&query("DEL", "BLR", Criterion::Cost, Algorithm::Dijkstra, 50))
        .unwrap();
    assert_eq!(result.routes.len(), 1);
}

#[test]
fn fare_adjustment_scales_cost() {
    let graph = triangle();
    let config = SearchConfig::new(10, 100, 1.5);
    let finder = PathFinder::new(&graph, &config);

    let result = finder
        .find_routes(&query("DEL", "BLR", Criterion::Cost, Algorithm::AStar, 1))
        .unwrap();
    assert_eq!(result.routes[0].total_cost, 270.0);
    assert_eq!(result.routes[0].total_price, 270.0);
}

#[test]
fn multiple_deduplicates_by_path() {
    let graph = triangle();
    let config = SearchConfig::default();
    let finder = PathFinder::new(&graph, &config);

    let result = finder.find_multiple(code("DEL"), code("BLR"), 5).unwrap();

    // cost and time agree on DEL-BOM-BLR; reliability picks the direct flight
    assert_eq!(result.routes.len(), 2);
    assert_eq!(result.routes[0].criterion, Criterion::Cost);
    assert_eq!(result.routes[0].algorithm, Algorithm::Dijkstra);
    assert_eq!(result.routes[1].criterion, Criterion::Reliability);
    assert_eq!(airports_of(&result.routes[1]), vec!["DEL", "BLR"]);

    let truncated = finder.find_multiple(code("DEL"), code("BLR"), 1).unwrap();
    assert_eq!(truncated.routes.len(), 1);
}

#[test]
fn comparison_agrees_on_triangle() {
    let graph = triangle();
    let config = SearchConfig::default();
    let finder = PathFinder::new(&graph, &config);

    for criterion in Criterion::ALL {
        let cmp = AlgorithmComparison::run(&finder, code("DEL"), code("BLR"), criterion).unwrap();
        let div = cmp.comparison.unwrap();
        assert!(div.same_route, "{criterion}");
        assert_eq!(div.cost_difference, 0.0);
        assert_eq!(div.duration_difference, 0.0);
        assert_eq!(cmp.dijkstra.unwrap().algorithm, Algorithm::Dijkstra);
        assert_eq!(cmp.a_star.unwrap().algorithm, Algorithm::AStar);
    }
}

#[test]
fn comparison_without_route() {
    let graph = triangle();
    let config = SearchConfig::default();
    let finder = PathFinder::new(&graph, &config);

    let cmp =
        AlgorithmComparison::run(&finder, code("BLR"), code("DEL"), Criterion::Time).unwrap();
    assert!(cmp.dijkstra.is_none());
    assert!(cmp.a_star.is_none());
    assert!(cmp.comparison.is_none());
}

#[test]
fn a_star_expands_no_more_than_dijkstra_on_chain() {
    // A line of airports heading south, with a detour north from DEL.
    let graph = NetworkGraph::build(
        AIRPORTS.iter().map(|(c, _, _)| airport(c)).collect(),
        vec![
            flight("N1", "DEL", "CCU", 100.0, 2.0, 0.1),
            flight("N2", "CCU", "DEL", 100.0, 2.0, 0.1),
            flight("S1", "DEL", "HYD", 150.0, 2.0, 0.1),
            flight("S2", "HYD", "MAA", 60.0, 1.0, 0.1),
            flight("S3", "HYD", "BLR", 50.0, 1.0, 0.1),
            flight("W1", "DEL", "BOM", 120.0, 2.0, 0.1),
        ],
    )
    .unwrap();
    let config = SearchConfig::default();
    let finder = PathFinder::new(&graph, &config);

    let cmp = AlgorithmComparison::run(&finder, code("DEL"), code("BLR"), Criterion::Time).unwrap();
    assert!(cmp.comparison.unwrap().same_route);
    assert!(cmp.a_star_expansions <= cmp.dijkstra_expansions);
}

#[test]
fn algorithm_choice_dispatch() {
    assert_eq!(AlgorithmChoice::parse("Multiple"), Some(AlgorithmChoice::Multiple));
    assert_eq!(
        AlgorithmChoice::parse("astar"),
        Some(AlgorithmChoice::Single(Algorithm::AStar))
    );
    assert_eq!(AlgorithmChoice::parse("bfs"), None);
    assert_eq!(AlgorithmChoice::Multiple.to_string(), "multiple");

    let graph = triangle();
    let config = SearchConfig::default();
    let finder = PathFinder::new(&graph, &config);

    let single = finder
        .search(
            code("DEL"),
            code("BLR"),
            Criterion::Reliability,
            AlgorithmChoice::Single(Algorithm::AStar),
            3,
        )
        .unwrap();
    assert_eq!(single.routes[0].algorithm, Algorithm::AStar);
    assert_eq!(single.routes[0].criterion, Criterion::Reliability);

    let multiple = finder
        .search(code("DEL"), code("BLR"), Criterion::Time, AlgorithmChoice::Multiple, 3)
        .unwrap();
    assert_eq!(multiple.routes.len(), 2);
}

mod proptests {
    use super::*;
    use proptest::prelude::*;

    /// (from, to offset, price, hours, delay probability, cancelled)
    type FlightParams = (usize, usize, f64, f64, f64, bool);

    fn flight_strategy() -> impl Strategy<Value = FlightParams> {
        (
            0usize..6,
            1usize..6,
            0.0f64..500.0,
            0.5f64..6.0,
            0.0f64..=1.0,
            prop::bool::weighted(0.15),
        )
    }

    fn build(params: &[FlightParams]) -> NetworkGraph {
        let flights = params
            .iter()
            .enumerate()
            .map(|(i, &(from, offset, price, hours, p, cancelled))| {
                let to = (from + offset) % AIRPORTS.len();
                let mut f = flight(
                    &format!("F{i:02}"),
                    AIRPORTS[from].0,
                    AIRPORTS[to].0,
                    price,
                    hours,
                    p,
                );
                if cancelled {
                    f.apply(&StatusChange::Cancelled, None).unwrap();
                }
                f
            })
            .collect();
        NetworkGraph::build(AIRPORTS.iter().map(|(c, _, _)| airport(c)).collect(), flights)
            .unwrap()
    }

    /// Few distinct prices and risks, so equal weights are common.
    fn tied_flight_strategy() -> impl Strategy<Value = FlightParams> {
        (
            0usize..6,
            1usize..6,
            1u32..4,
            1u32..3,
            0u32..3,
            prop::bool::weighted(0.1),
        )
            .prop_map(|(from, offset, price, hours, risk, cancelled)| {
                (
                    from,
                    offset,
                    f64::from(price),
                    f64::from(hours),
                    f64::from(risk) * 0.25,
                    cancelled,
                )
            })
    }

    /// Every loop-free route over usable flights, built the way the search
    /// builds them.
    fn all_simple_routes(
        graph: &NetworkGraph,
        criterion: Criterion,
        config: &SearchConfig,
        source: AirportCode,
        destination: AirportCode,
    ) -> Vec<Route> {
        fn walk<'g>(
            graph: &'g NetworkGraph,
            weights: &WeightStrategy,
            destination: AirportCode,
            airports: &mut Vec<AirportCode>,
            flights: &mut Vec<&'g Flight>,
            out: &mut Vec<Route>,
        ) {
            let at = *airports.last().unwrap();
            if at == destination {
                let mut cost = 0.0;
                let mut max_leg_delay: f64 = 0.0;
                for f in flights.iter() {
                    cost += weights.weight(f).unwrap();
                    max_leg_delay = max_leg_delay.max(f.effective_delay_probability());
                }
                out.push(Route {
                    airports: airports.clone(),
                    flights: flights.iter().map(|f| f.number.clone()).collect(),
                    criterion: weights.criterion(),
                    algorithm: Algorithm::Dijkstra,
                    total_cost: cost,
                    total_duration: 0.0,
                    total_price: 0.0,
                    average_delay_probability: 0.0,
                    max_leg_delay_probability: max_leg_delay,
                });
                return;
            }
            for f in graph.outgoing(&at) {
                if airports.contains(&f.destination) || weights.weight(f).is_none() {
                    continue;
                }
                airports.push(f.destination);
                flights.push(f);
                walk(graph, weights, destination, airports, flights, out);
                airports.pop();
                flights.pop();
            }
        }

        let weights = WeightStrategy::new(criterion, config.fare_adjustment);
        let mut out = Vec::new();
        walk(
            graph,
            &weights,
            destination,
            &mut vec![source],
            &mut Vec::new(),
            &mut out,
        );
        out
    }

    fn endpoints() -> impl Strategy<Value = (usize, usize)> {
        (0usize..6, 1usize..6).prop_map(|(from, offset)| (from, (from + offset) % 6))
    }

    proptest! {
        #[test]
        fn a_star_matches_dijkstra(
            params in prop::collection::vec(flight_strategy(), 0..20),
            (from, to) in endpoints(),
            use_time in any::<bool>(),
        ) {
            let graph = build(&params);
            let config = SearchConfig::default();
            let finder = PathFinder::new(&graph, &config);
            let criterion = if use_time { Criterion::Time } else { Criterion::Cost };

            let d = finder
                .best_route(code(AIRPORTS[from].0), code(AIRPORTS[to].0), criterion, Algorithm::Dijkstra)
                .unwrap();
            let a = finder
                .best_route(code(AIRPORTS[from].0), code(AIRPORTS[to].0), criterion, Algorithm::AStar)
                .unwrap();

            prop_assert_eq!(d.routes.len(), a.routes.len());
            if let (Some(d), Some(a)) = (d.routes.first(), a.routes.first()) {
                let tolerance = 1e-9 * d.total_cost.max(1.0);
                prop_assert!(
                    (d.total_cost - a.total_cost).abs() <= tolerance,
                    "dijkstra {} vs a_star {}",
                    d.total_cost,
                    a.total_cost
                );
            }
        }

        #[test]
        fn routes_are_valid(
            params in prop::collection::vec(flight_strategy(), 0..20),
            (from, to) in endpoints(),
            k in 1usize..6,
            criterion_idx in 0usize..3,
            a_star in any::<bool>(),
        ) {
            let graph = build(&params);
            let config = SearchConfig::default();
            let finder = PathFinder::new(&graph, &config);
            let criterion = Criterion::ALL[criterion_idx];
            let algorithm = if a_star { Algorithm::AStar } else { Algorithm::Dijkstra };
            let weights = WeightStrategy::new(criterion, config.fare_adjustment);

            let result = finder
                .find_routes(&RouteQuery {
                    source: code(AIRPORTS[from].0),
                    destination: code(AIRPORTS[to].0),
                    criterion,
                    algorithm,
                    num_routes: k,
                })
                .unwrap();

            prop_assert!(result.routes.len() <= k);
            for (i, route) in result.routes.iter().enumerate() {
                prop_assert_eq!(route.airports.len(), route.flights.len() + 1);

                // loop-free
                let mut seen = route.airports.clone();
                seen.sort();
                seen.dedup();
                prop_assert_eq!(seen.len(), route.airports.len());

                // weight is the sum of edge weights; no cancelled flight used
                let mut sum = 0.0;
                for n in &route.flights {
                    let f = graph.flight(n).unwrap();
                    prop_assert!(f.is_usable());
                    sum += weights.weight(f).unwrap();
                }
                prop_assert!((route.total_cost - sum).abs() <= 1e-9 * sum.max(1.0));

                // pairwise distinct by airports, best first
                for other in &result.routes[i + 1..] {
                    prop_assert!(!route.same_path(other));
                    prop_assert!(route.total_cost <= other.total_cost + 1e-9);
                }
            }
            prop_assert_eq!(rank_routes(result.routes.clone()), result.routes);
        }

        #[test]
        fn best_route_heads_exhaustive_ranking(
            params in prop::collection::vec(tied_flight_strategy(), 0..12),
            (from, to) in endpoints(),
            criterion_idx in 0usize..3,
            a_star in any::<bool>(),
        ) {
            let graph = build(&params);
            let config = SearchConfig::default();
            let finder = PathFinder::new(&graph, &config);
            let criterion = Criterion::ALL[criterion_idx];
            let algorithm = if a_star { Algorithm::AStar } else { Algorithm::Dijkstra };
            let (source, destination) = (code(AIRPORTS[from].0), code(AIRPORTS[to].0));

            let mut every = all_simple_routes(&graph, criterion, &config, source, destination);
            every.sort_by(compare_routes);

            let found = finder.best_route(source, destination, criterion, algorithm).unwrap();
            prop_assert_eq!(
                found.routes.first().map(|r| &r.flights),
                every.first().map(|r| &r.flights)
            );
        }
    }
}
