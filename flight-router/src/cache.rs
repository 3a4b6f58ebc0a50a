//! Caching layer for route query results.
//!
//! Every entry records the graph version it was computed on. A lookup
//! against a newer graph treats the entry as missing and evicts it, so a
//! disruption never serves stale routes even before the TTL runs out.

use std::sync::Arc;
use std::time::Duration;

use moka::sync::Cache as MokaCache;
use tracing::trace;

use crate::domain::{AirportCode, Criterion, Route};
use crate::planner::AlgorithmChoice;

/// Cache key: the full shape of a route query.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RouteKey {
    pub source: AirportCode,
    pub destination: AirportCode,
    pub criterion: Criterion,
    pub algorithm: AlgorithmChoice,
    pub num_routes: usize,
}

/// Cached query result.
#[derive(Debug, Clone)]
struct RouteEntry {
    version: u64,
    routes: Arc<Vec<Route>>,
}

/// Configuration for the cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL for cached entries.
    pub ttl: Duration,

    /// Maximum number of cached entries.
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(300),
            max_capacity: 10_000,
        }
    }
}

/// Cache for route query results.
pub struct RouteCache {
    routes: MokaCache<RouteKey, RouteEntry>,
}

impl RouteCache {
    /// Create a new cache with the given configuration.
    pub fn new(config: &CacheConfig) -> Self {
        let routes = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .build();

        Self { routes }
    }

    /// Get the routes cached for `key`, if they were computed on `version`.
    pub fn get(&self, key: &RouteKey, version: u64) -> Option<Arc<Vec<Route>>> {
        let entry = self.routes.get(key)?;
        if entry.version != version {
            trace!(cached = entry.version, current = version, "stale route entry");
            self.routes.invalidate(key);
            return None;
        }
        Some(entry.routes)
    }

    /// Insert the routes computed for `key` on `version`.
    pub fn insert(&self, key: RouteKey, version: u64, routes: Arc<Vec<Route>>) {
        self.routes.insert(key, RouteEntry { version, routes });
    }

    /// Get cache statistics (for monitoring).
    pub fn entry_count(&self) -> u64 {
        self.routes.entry_count()
    }

    /// Invalidate all cached entries.
    pub fn invalidate_all(&self) {
        self.routes.invalidate_all();
    }
}
