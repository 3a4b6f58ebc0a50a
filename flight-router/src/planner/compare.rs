//! Side-by-side runs of Dijkstra and A*.

use tracing::{debug, warn};

use crate::domain::{AirportCode, Algorithm, Criterion, Route, RoutingError};

use super::PathFinder;

/// How far apart the two best routes are. Only reported when both
/// algorithms found one.
#[derive(Debug, Clone, PartialEq)]
pub struct Divergence {
    /// Both routes visit the same airports in the same order.
    pub same_route: bool,
    pub cost_difference: f64,
    pub duration_difference: f64,
}

/// Best route of each algorithm for the same query.
#[derive(Debug, Clone, PartialEq)]
pub struct AlgorithmComparison {
    pub criterion: Criterion,
    pub dijkstra: Option<Route>,
    pub a_star: Option<Route>,
    pub dijkstra_expansions: usize,
    pub a_star_expansions: usize,
    pub comparison: Option<Divergence>,
}

impl AlgorithmComparison {
    /// Run both algorithms with `k = 1` and compare their answers.
    ///
    /// Disagreement is reported, never an error. For `cost` and `time` it
    /// means the heuristic overestimated, so it is logged as a warning.
    pub fn run(
        finder: &PathFinder<'_>,
        source: AirportCode,
        destination: AirportCode,
        criterion: Criterion,
    ) -> Result<Self, RoutingError> {
        let dijkstra = finder.best_route(source, destination, criterion, Algorithm::Dijkstra)?;
        let a_star = finder.best_route(source, destination, criterion, Algorithm::AStar)?;

        let dijkstra_expansions = dijkstra.expansions;
        let a_star_expansions = a_star.expansions;
        let dijkstra = dijkstra.routes.into_iter().next();
        let a_star = a_star.routes.into_iter().next();

        let comparison = match (&dijkstra, &a_star) {
            (Some(d), Some(a)) => Some(Divergence {
                same_route: d.same_path(a),
                cost_difference: (d.total_cost - a.total_cost).abs(),
                duration_difference: (d.total_duration - a.total_duration).abs(),
            }),
            _ => None,
        };

        match &comparison {
            Some(div) if !div.same_route && criterion != Criterion::Reliability => {
                warn!(
                    %source,
                    %destination,
                    %criterion,
                    cost_difference = div.cost_difference,
                    "dijkstra and a_star disagree"
                );
            }
            _ => {
                debug!(
                    %source,
                    %destination,
                    %criterion,
                    dijkstra_expansions,
                    a_star_expansions,
                    "algorithms compared"
                );
            }
        }

        Ok(Self {
            criterion,
            dijkstra,
            a_star,
            dijkstra_expansions,
            a_star_expansions,
            comparison,
        })
    }
}
