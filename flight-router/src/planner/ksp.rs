//! Yen's k-shortest loop-free paths.
//!
//! Paths are distinct by airport sequence: when a spur search must avoid
//! the next leg of an already accepted path, every parallel flight on that
//! leg is excluded, not just the one the path used. A spur search is pinned
//! to the root's airports, not its flights, so each airport sequence is
//! flown by its best-ranked choice of flights.

use tracing::debug;

use crate::domain::AirportCode;
use crate::network::NetworkGraph;

use super::heuristic::Heuristic;
use super::rank;
use super::search::{Constraints, Label, best_path};
use super::weight::WeightStrategy;

/// Result of a k-shortest-paths query.
#[derive(Debug)]
pub struct KspOutcome<'g> {
    /// Accepted paths, best first.
    pub paths: Vec<Label<'g>>,
    /// Node expansions summed over every search run.
    pub expansions: usize,
    /// Whether the spur-search budget ran out before `k` paths were found.
    pub truncated: bool,
}

/// Up to `k` best loop-free paths from `source` to `destination`.
///
/// At most `max_spur_searches` spur searches run; if the budget runs out,
/// the paths accepted so far are returned.
pub fn k_shortest_paths<'g, H: Heuristic + ?Sized>(
    graph: &'g NetworkGraph,
    weights: &WeightStrategy,
    heuristic: &H,
    source: AirportCode,
    destination: AirportCode,
    k: usize,
    max_spur_searches: usize,
) -> KspOutcome<'g> {
    let first = best_path(
        graph,
        weights,
        heuristic,
        source,
        destination,
        &Constraints::default(),
    );
    let mut expansions = first.expansions;
    let Some(first) = first.best else {
        return KspOutcome {
            paths: Vec::new(),
            expansions,
            truncated: false,
        };
    };

    let mut accepted = vec![first];
    let mut candidates: Vec<Label<'g>> = Vec::new();
    let mut spur_searches = 0;
    let mut truncated = false;

    while accepted.len() < k {
        let previous = accepted[accepted.len() - 1].clone();
        let airports = previous.airports();

        // Spur positions still to try for `previous`, nearest the origin first.
        let mut worklist: Vec<usize> = (0..previous.flights().len()).rev().collect();
        while let Some(spur) = worklist.pop() {
            if spur_searches >= max_spur_searches {
                truncated = true;
                break;
            }
            spur_searches += 1;

            let mut constraints = Constraints {
                corridor: airports[..=spur].to_vec(),
                ..Constraints::default()
            };
            for path in &accepted {
                let other = path.airports();
                if other.len() > spur + 1 && other[..=spur] == airports[..=spur] {
                    constraints.legs.insert((other[spur], other[spur + 1]));
                }
            }

            let outcome = best_path(graph, weights, heuristic, source, destination, &constraints);
            expansions += outcome.expansions;
            if let Some(candidate) = outcome.best {
                offer(&mut candidates, candidate);
            }
        }

        if truncated {
            debug!(
                spur_searches,
                found = accepted.len(),
                "spur search budget exhausted"
            );
            break;
        }

        let Some(best) = candidates
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| rank::compare(*a, *b))
            .map(|(idx, _)| idx)
        else {
            break;
        };
        accepted.push(candidates.swap_remove(best));
    }

    KspOutcome {
        paths: accepted,
        expansions,
        truncated,
    }
}

/// Add a candidate, keeping only the better of two with the same airports.
fn offer<'g>(candidates: &mut Vec<Label<'g>>, candidate: Label<'g>) {
    match candidates.iter_mut().find(|c| c.same_path(&candidate)) {
        Some(existing) => {
            if rank::compare(&candidate, &*existing).is_lt() {
                *existing = candidate;
            }
        }
        None => candidates.push(candidate),
    }
}
