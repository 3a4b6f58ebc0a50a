//! Route planner using best-first search.
//!
//! This module answers "what are the best ways from here to there?" for one
//! network snapshot. Dijkstra and A* share a single search loop and differ
//! only in the heuristic they plug in; k-shortest-paths wraps either one.

mod compare;
mod config;
mod heuristic;
mod ksp;
mod rank;
mod search;
mod weight;

#[cfg(test)]
mod search_tests;

pub use compare::{AlgorithmComparison, Divergence};
pub use config::SearchConfig;
pub use heuristic::{GreatCircleHeuristic, Heuristic, ZeroHeuristic, weight_per_km_bound};
pub use rank::{compare as compare_routes, deduplicate, rank_routes};
pub use weight::{MAX_DELAY_PROBABILITY, WeightStrategy, reliability_weight};

use std::fmt;

use tracing::debug;

use crate::domain::{AirportCode, Algorithm, Criterion, Route, RoutingError};
use crate::network::NetworkGraph;

use ksp::k_shortest_paths;

/// Algorithm selector of a route query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlgorithmChoice {
    Single(Algorithm),
    /// One route per criterion, see [`PathFinder::find_multiple`].
    Multiple,
}

impl AlgorithmChoice {
    /// Parse `dijkstra`, `a_star` (and its aliases) or `multiple`.
    pub fn parse(s: &str) -> Option<Self> {
        if s.trim().eq_ignore_ascii_case("multiple") {
            return Some(AlgorithmChoice::Multiple);
        }
        Algorithm::parse(s).map(AlgorithmChoice::Single)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AlgorithmChoice::Single(algorithm) => algorithm.as_str(),
            AlgorithmChoice::Multiple => "multiple",
        }
    }
}

impl fmt::Display for AlgorithmChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A route query against one snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteQuery {
    pub source: AirportCode,
    pub destination: AirportCode,
    pub criterion: Criterion,
    pub algorithm: Algorithm,
    /// Routes wanted. Zero is invalid; values above the configured maximum
    /// are clamped.
    pub num_routes: usize,
}

/// Result of a route query.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    /// Routes found, best first. Empty when the destination is unreachable.
    pub routes: Vec<Route>,

    /// Node expansions performed across all searches of the query.
    pub expansions: usize,
}

impl SearchResult {
    pub fn empty() -> Self {
        Self {
            routes: Vec::new(),
            expansions: 0,
        }
    }
}

/// Route planner over a borrowed network snapshot.
pub struct PathFinder<'g> {
    graph: &'g NetworkGraph,
    config: &'g SearchConfig,
}

impl<'g> PathFinder<'g> {
    pub fn new(graph: &'g NetworkGraph, config: &'g SearchConfig) -> Self {
        Self { graph, config }
    }

    pub fn graph(&self) -> &'g NetworkGraph {
        self.graph
    }

    /// Find up to `query.num_routes` loop-free routes, best first.
    pub fn find_routes(&self, query: &RouteQuery) -> Result<SearchResult, RoutingError> {
        self.validate(&query.source, &query.destination)?;
        let k = self.config.route_limit(query.num_routes)?;
        let weights = WeightStrategy::new(query.criterion, self.config.fare_adjustment);

        let outcome = match query.algorithm {
            Algorithm::Dijkstra => k_shortest_paths(
                self.graph,
                &weights,
                &ZeroHeuristic,
                query.source,
                query.destination,
                k,
                self.config.max_spur_searches,
            ),
            Algorithm::AStar => {
                let heuristic =
                    GreatCircleHeuristic::for_query(self.graph, &weights, &query.destination)
                        .ok_or(RoutingError::UnknownAirport(query.destination))?;
                k_shortest_paths(
                    self.graph,
                    &weights,
                    &heuristic,
                    query.source,
                    query.destination,
                    k,
                    self.config.max_spur_searches,
                )
            }
        };

        let routes: Vec<Route> = outcome
            .paths
            .into_iter()
            .map(|label| label.into_route(&weights, query.algorithm))
            .collect();

        debug!(
            source = %query.source,
            destination = %query.destination,
            criterion = %query.criterion,
            algorithm = %query.algorithm,
            routes = routes.len(),
            expansions = outcome.expansions,
            truncated = outcome.truncated,
            "route search complete"
        );

        Ok(SearchResult {
            routes,
            expansions: outcome.expansions,
        })
    }

    /// Run a query with any algorithm selector. `criterion` is ignored for
    /// [`AlgorithmChoice::Multiple`].
    pub fn search(
        &self,
        source: AirportCode,
        destination: AirportCode,
        criterion: Criterion,
        algorithm: AlgorithmChoice,
        num_routes: usize,
    ) -> Result<SearchResult, RoutingError> {
        match algorithm {
            AlgorithmChoice::Single(algorithm) => self.find_routes(&RouteQuery {
                source,
                destination,
                criterion,
                algorithm,
                num_routes,
            }),
            AlgorithmChoice::Multiple => self.find_multiple(source, destination, num_routes),
        }
    }

    /// The single best route under one criterion and algorithm.
    pub fn best_route(
        &self,
        source: AirportCode,
        destination: AirportCode,
        criterion: Criterion,
        algorithm: Algorithm,
    ) -> Result<SearchResult, RoutingError> {
        self.find_routes(&RouteQuery {
            source,
            destination,
            criterion,
            algorithm,
            num_routes: 1,
        })
    }

    /// One route per criterion: cost by Dijkstra, time by A*, reliability
    /// by Dijkstra. Routes over the same airports as an earlier one are
    /// dropped, and the list is cut to `num_routes`.
    pub fn find_multiple(
        &self,
        source: AirportCode,
        destination: AirportCode,
        num_routes: usize,
    ) -> Result<SearchResult, RoutingError> {
        self.validate(&source, &destination)?;
        let limit = self.config.route_limit(num_routes)?;

        let plan = [
            (Criterion::Cost, Algorithm::Dijkstra),
            (Criterion::Time, Algorithm::AStar),
            (Criterion::Reliability, Algorithm::Dijkstra),
        ];

        let mut routes = Vec::new();
        let mut expansions = 0;
        for (criterion, algorithm) in plan {
            let result = self.best_route(source, destination, criterion, algorithm)?;
            expansions += result.expansions;
            routes.extend(result.routes);
        }

        let mut routes = deduplicate(routes);
        routes.truncate(limit);
        Ok(SearchResult { routes, expansions })
    }

    fn validate(&self, source: &AirportCode, destination: &AirportCode) -> Result<(), RoutingError> {
        if source == destination {
            return Err(RoutingError::SameEndpoints(*source));
        }
        for code in [source, destination] {
            if self.graph.airport(code).is_none() {
                return Err(RoutingError::UnknownAirport(*code));
            }
        }
        Ok(())
    }
}
