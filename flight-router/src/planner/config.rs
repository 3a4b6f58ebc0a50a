//! Search configuration for the route planner.

use crate::domain::RoutingError;

/// Configuration parameters for route search.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Maximum number of routes a single query may return.
    /// Larger requests are clamped to this.
    pub max_routes: usize,

    /// Maximum number of spur searches one k-shortest-paths query may run.
    /// Bounds the work on dense graphs; the routes found so far are returned.
    pub max_spur_searches: usize,

    /// Multiplier applied to every fare.
    pub fare_adjustment: f64,
}

impl SearchConfig {
    /// Create a new configuration with the given parameters.
    pub fn new(max_routes: usize, max_spur_searches: usize, fare_adjustment: f64) -> Self {
        Self {
            max_routes,
            max_spur_searches,
            fare_adjustment,
        }
    }

    /// Resolve a requested route count against the configured maximum.
    ///
    /// Zero is rejected; anything above `max_routes` is clamped.
    pub fn route_limit(&self, requested: usize) -> Result<usize, RoutingError> {
        if requested == 0 {
            return Err(RoutingError::Validation(
                "num_routes must be at least 1".to_string(),
            ));
        }
        Ok(requested.min(self.max_routes))
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_routes: 10,
            max_spur_searches: 200,
            fare_adjustment: 1.0,
        }
    }
}
