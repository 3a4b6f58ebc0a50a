//! The routing service: one network, its caches and its disruption state.
//!
//! Everything here is synchronous and may take a while on a large graph,
//! so async callers run it on a blocking thread.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::cache::{CacheConfig, RouteCache, RouteKey};
use crate::disruption::{
    DEFAULT_LISTING_LIMIT, Disruption, DisruptionManager, DisruptionOutcome, SavedRoute,
    StatusUpdate,
};
use crate::domain::{
    Airport, AirportCode, Criterion, Flight, FlightNumber, Route, RoutingError, StatusChange,
};
use crate::network::{NetworkGraph, NetworkSource, NetworkStore};
use crate::planner::{AlgorithmChoice, AlgorithmComparison, PathFinder, SearchConfig};
use crate::stats::{FlightRisk, NetworkStats, delay_risk_report};

/// Searches repeated when the network moves before their routes are saved.
const SAVE_ATTEMPTS: usize = 3;

/// Routes returned for one query.
#[derive(Debug, Clone)]
pub struct FoundRoutes {
    pub routes: Arc<Vec<Route>>,
    /// Registry ids of the returned routes, in the same order. Empty if the
    /// network kept changing under the query.
    pub saved_ids: Vec<u64>,
    pub version: u64,
    pub from_cache: bool,
}

/// Network statistics plus the service's own counters.
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkOverview {
    pub stats: NetworkStats,
    pub version: u64,
    pub saved_routes: usize,
    pub disruptions_recorded: usize,
    pub disruptions_today: usize,
    pub cached_queries: u64,
}

/// Thread-safe entry point for every routing operation.
pub struct RoutingService {
    store: NetworkStore,
    config: SearchConfig,
    cache: RouteCache,
    disruptions: DisruptionManager,
}

impl RoutingService {
    pub fn new(graph: NetworkGraph, config: SearchConfig, cache_config: &CacheConfig) -> Self {
        Self {
            store: NetworkStore::new(graph),
            config,
            cache: RouteCache::new(cache_config),
            disruptions: DisruptionManager::new(),
        }
    }

    /// Build a service from whatever a [`NetworkSource`] provides.
    pub fn from_source<S: NetworkSource + ?Sized>(
        source: &S,
        config: SearchConfig,
        cache_config: &CacheConfig,
    ) -> Result<Self, crate::network::LoadError> {
        let graph = source.fetch()?.into_graph()?;
        Ok(Self::new(graph, config, cache_config))
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// The current network snapshot.
    pub fn snapshot(&self) -> Arc<NetworkGraph> {
        self.store.snapshot()
    }

    /// Find routes, answering from the cache when the network hasn't moved.
    ///
    /// Every returned route is saved so that a later disruption can rebook
    /// it. Routes are only saved if no disruption was published after the
    /// snapshot they were found on; otherwise the query runs again.
    pub fn find_routes(
        &self,
        source: AirportCode,
        destination: AirportCode,
        criterion: Criterion,
        algorithm: AlgorithmChoice,
        num_routes: usize,
    ) -> Result<FoundRoutes, RoutingError> {
        let mut attempt = 1;
        loop {
            let mut found = self.lookup(source, destination, criterion, algorithm, num_routes)?;
            match self
                .disruptions
                .save_routes(&self.store, found.version, &found.routes)
            {
                Some(ids) => {
                    found.saved_ids = ids;
                    return Ok(found);
                }
                None if attempt < SAVE_ATTEMPTS => {
                    debug!(
                        %source,
                        %destination,
                        version = found.version,
                        "network moved, searching again"
                    );
                    attempt += 1;
                }
                None => {
                    warn!(
                        %source,
                        %destination,
                        attempts = attempt,
                        "network kept moving, routes not saved"
                    );
                    return Ok(found);
                }
            }
        }
    }

    fn lookup(
        &self,
        source: AirportCode,
        destination: AirportCode,
        criterion: Criterion,
        algorithm: AlgorithmChoice,
        num_routes: usize,
    ) -> Result<FoundRoutes, RoutingError> {
        let graph = self.store.snapshot();
        let version = graph.version();
        let key = RouteKey {
            source,
            destination,
            criterion,
            algorithm,
            num_routes,
        };

        let (routes, from_cache) = match self.cache.get(&key, version) {
            Some(routes) => {
                debug!(%source, %destination, %algorithm, version, "route cache hit");
                (routes, true)
            }
            None => {
                let finder = PathFinder::new(&graph, &self.config);
                let result = finder.search(source, destination, criterion, algorithm, num_routes)?;
                let routes = Arc::new(result.routes);
                self.cache.insert(key, version, routes.clone());
                (routes, false)
            }
        };

        Ok(FoundRoutes {
            routes,
            saved_ids: Vec::new(),
            version,
            from_cache,
        })
    }

    /// Run Dijkstra and A* on the same query and compare their answers.
    pub fn compare_algorithms(
        &self,
        source: AirportCode,
        destination: AirportCode,
        criterion: Criterion,
    ) -> Result<AlgorithmComparison, RoutingError> {
        let graph = self.store.snapshot();
        let finder = PathFinder::new(&graph, &self.config);
        AlgorithmComparison::run(&finder, source, destination, criterion)
    }

    /// Apply a disruption and rebook the itineraries it affects.
    pub fn handle_disruption(
        &self,
        disruption: &Disruption,
    ) -> Result<DisruptionOutcome, RoutingError> {
        self.disruptions
            .handle(&self.store, &self.config, disruption)
    }

    /// Change a flight's status without rebooking.
    pub fn update_flight_status(
        &self,
        number: &FlightNumber,
        change: &StatusChange,
        reason: Option<&str>,
    ) -> Result<StatusUpdate, RoutingError> {
        self.disruptions
            .update_status(&self.store, number, change, reason)
    }

    pub fn network_stats(&self) -> NetworkOverview {
        let graph = self.store.snapshot();
        NetworkOverview {
            stats: graph.stats(),
            version: graph.version(),
            saved_routes: self.disruptions.saved_route_count(),
            disruptions_recorded: self.disruptions.disruptions_recorded(),
            disruptions_today: self.disruptions.disruptions_today(),
            cached_queries: self.cache.entry_count(),
        }
    }

    /// Replace the whole network.
    ///
    /// Cached routes and saved routes belong to the old network and are
    /// dropped. On invalid data the current network stays in place.
    pub fn rebuild_network(
        &self,
        airports: Vec<Airport>,
        flights: Vec<Flight>,
    ) -> Result<NetworkOverview, RoutingError> {
        let graph = NetworkGraph::build(airports, flights)?;
        let published = self.disruptions.replace_network(&self.store, graph);
        self.cache.invalidate_all();
        info!(version = published.version(), "network rebuilt");
        Ok(self.network_stats())
    }

    /// Saved routes, most recent first. Defaults to [`DEFAULT_LISTING_LIMIT`].
    pub fn saved_routes(&self, limit: Option<usize>) -> Vec<SavedRoute> {
        self.disruptions
            .saved_routes(limit.unwrap_or(DEFAULT_LISTING_LIMIT))
    }

    pub fn delay_risk(&self) -> Vec<FlightRisk> {
        delay_risk_report(&self.store.snapshot())
    }
}
