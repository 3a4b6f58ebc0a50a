//! Saved routes and the flight → route reverse index.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::{DateTime, Utc};

use crate::domain::{AirportCode, Algorithm, Criterion, FlightNumber, Route};

/// Number of routes listed when the caller gives no limit.
pub const DEFAULT_LISTING_LIMIT: usize = 50;

/// Oldest routes are dropped once the registry holds this many.
pub const MAX_SAVED_ROUTES: usize = 10_000;

/// The query shape a route answers. Enough to search for it again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Itinerary {
    pub source: AirportCode,
    pub destination: AirportCode,
    pub criterion: Criterion,
    pub algorithm: Algorithm,
}

impl Itinerary {
    pub fn of_route(route: &Route) -> Self {
        Self {
            source: *route.source(),
            destination: *route.destination(),
            criterion: route.criterion,
            algorithm: route.algorithm,
        }
    }
}

/// A route handed out to a caller, kept so disruptions can rebook it.
#[derive(Debug, Clone, PartialEq)]
pub struct SavedRoute {
    pub id: u64,
    pub itinerary: Itinerary,
    pub route: Route,
    pub saved_at: DateTime<Utc>,
}

/// Saved routes keyed by id, plus which routes use which flight.
#[derive(Debug)]
pub struct RouteRegistry {
    next_id: u64,
    capacity: usize,
    routes: BTreeMap<u64, SavedRoute>,
    by_flight: HashMap<FlightNumber, BTreeSet<u64>>,
}

impl Default for RouteRegistry {
    fn default() -> Self {
        Self::with_capacity(MAX_SAVED_ROUTES)
    }
}

impl RouteRegistry {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            next_id: 1,
            capacity: capacity.max(1),
            routes: BTreeMap::new(),
            by_flight: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn get(&self, id: u64) -> Option<&SavedRoute> {
        self.routes.get(&id)
    }

    /// Save a route and return its id.
    pub fn save(&mut self, route: Route, saved_at: DateTime<Utc>) -> u64 {
        let id = self.next_id;
        self.next_id += 1;

        self.index(id, &route);
        self.routes.insert(
            id,
            SavedRoute {
                id,
                itinerary: Itinerary::of_route(&route),
                route,
                saved_at,
            },
        );

        while self.routes.len() > self.capacity {
            let Some((oldest, _)) = self.routes.first_key_value() else {
                break;
            };
            let oldest = *oldest;
            self.remove(oldest);
        }
        id
    }

    /// Saved routes that fly the given flight, oldest first.
    pub fn using_flight(&self, number: &FlightNumber) -> Vec<SavedRoute> {
        self.by_flight
            .get(number)
            .into_iter()
            .flatten()
            .filter_map(|id| self.routes.get(id))
            .cloned()
            .collect()
    }

    /// Replace the route stored under `id`. Returns false if `id` is gone.
    pub fn supersede(&mut self, id: u64, route: Route, saved_at: DateTime<Utc>) -> bool {
        let Some(old) = self.routes.get(&id).map(|saved| saved.route.flights.clone()) else {
            return false;
        };
        self.unindex(id, &old);
        self.index(id, &route);

        if let Some(saved) = self.routes.get_mut(&id) {
            saved.itinerary = Itinerary::of_route(&route);
            saved.route = route;
            saved.saved_at = saved_at;
        }
        true
    }

    /// Up to `limit` routes, most recently saved first.
    pub fn recent(&self, limit: usize) -> Vec<SavedRoute> {
        let mut saved: Vec<&SavedRoute> = self.routes.values().collect();
        saved.sort_by(|a, b| b.saved_at.cmp(&a.saved_at).then(b.id.cmp(&a.id)));
        saved.into_iter().take(limit).cloned().collect()
    }

    /// Forget every saved route. Ids keep counting up.
    pub fn clear(&mut self) {
        self.routes.clear();
        self.by_flight.clear();
    }

    fn remove(&mut self, id: u64) {
        if let Some(saved) = self.routes.remove(&id) {
            self.unindex(id, &saved.route.flights);
        }
    }

    fn index(&mut self, id: u64, route: &Route) {
        for number in &route.flights {
            self.by_flight.entry(number.clone()).or_default().insert(id);
        }
    }

    fn unindex(&mut self, id: u64, flights: &[FlightNumber]) {
        for number in flights {
            if let Some(ids) = self.by_flight.get_mut(number) {
                ids.remove(&id);
                if ids.is_empty() {
                    self.by_flight.remove(number);
                }
            }
        }
    }
}
