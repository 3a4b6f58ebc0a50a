//! Flight disruptions and rebooking.
//!
//! A disruption moves one flight through its status state machine,
//! publishes the new graph, and then searches again for every itinerary
//! that flew the flight. Disruptions of the same flight are serialized
//! from the status change to the last rebooking; disruptions of different
//! flights only meet at the graph swap.

mod history;
mod registry;

pub use history::{StatusHistory, StatusRecord};
pub use registry::{
    DEFAULT_LISTING_LIMIT, Itinerary, MAX_SAVED_ROUTES, RouteRegistry, SavedRoute,
};

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::Utc;
use tracing::{info, warn};

use crate::domain::{FlightNumber, FlightStatus, Route, RoutingError, StatusChange, Transition};
use crate::network::{NetworkGraph, NetworkStore};
use crate::planner::{PathFinder, SearchConfig};

/// What happened to the flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DisruptionKind {
    Delay,
    Cancellation,
}

impl DisruptionKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "delay" | "delayed" => Some(DisruptionKind::Delay),
            "cancellation" | "cancelled" | "canceled" | "cancel" => {
                Some(DisruptionKind::Cancellation)
            }
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DisruptionKind::Delay => "delay",
            DisruptionKind::Cancellation => "cancellation",
        }
    }
}

impl fmt::Display for DisruptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A reported disruption.
#[derive(Debug, Clone, PartialEq)]
pub struct Disruption {
    pub flight: FlightNumber,
    pub kind: DisruptionKind,
    /// Total delay. Required for [`DisruptionKind::Delay`].
    pub delay_minutes: Option<u32>,
    pub reason: Option<String>,
    /// Itineraries to rebook in addition to the saved routes using the flight.
    pub itineraries: Vec<Itinerary>,
}

impl Disruption {
    pub fn cancellation(flight: FlightNumber) -> Self {
        Self {
            flight,
            kind: DisruptionKind::Cancellation,
            delay_minutes: None,
            reason: None,
            itineraries: Vec::new(),
        }
    }

    pub fn delay(flight: FlightNumber, minutes: u32) -> Self {
        Self {
            flight,
            kind: DisruptionKind::Delay,
            delay_minutes: Some(minutes),
            reason: None,
            itineraries: Vec::new(),
        }
    }

    fn change(&self) -> Result<StatusChange, RoutingError> {
        let status = match self.kind {
            DisruptionKind::Delay => FlightStatus::Delayed,
            DisruptionKind::Cancellation => FlightStatus::Cancelled,
        };
        StatusChange::from_status(status, self.delay_minutes)
    }
}

/// The result of a status change.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusUpdate {
    pub flight: FlightNumber,
    pub status: FlightStatus,
    pub delay_minutes: u32,
    pub transition: Transition,
    /// Graph version after the change.
    pub version: u64,
}

/// New route for one affected itinerary.
#[derive(Debug, Clone, PartialEq)]
pub struct Rebooking {
    pub itinerary: Itinerary,
    /// Registry id, when the itinerary came from a saved route.
    pub saved_route: Option<u64>,
    /// `None` when no alternative was found.
    pub replacement: Option<Route>,
}

/// The result of handling a disruption.
#[derive(Debug, Clone, PartialEq)]
pub struct DisruptionOutcome {
    pub update: StatusUpdate,
    pub rebookings: Vec<Rebooking>,
}

impl DisruptionOutcome {
    pub fn affected_itineraries(&self) -> usize {
        self.rebookings.len()
    }
}

/// Applies status changes and rebooks the routes they affect.
#[derive(Default)]
pub struct DisruptionManager {
    locks: Mutex<HashMap<FlightNumber, Arc<Mutex<()>>>>,
    registry: Mutex<RouteRegistry>,
    history: Mutex<StatusHistory>,
}

impl DisruptionManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_registry(registry: RouteRegistry) -> Self {
        Self {
            registry: Mutex::new(registry),
            ..Self::default()
        }
    }

    /// Change a flight's status without rebooking anything.
    pub fn update_status(
        &self,
        store: &NetworkStore,
        number: &FlightNumber,
        change: &StatusChange,
        reason: Option<&str>,
    ) -> Result<StatusUpdate, RoutingError> {
        self.serialized(store, number, || {
            self.apply(store, number, change, reason)
                .map(|(update, _)| update)
        })
    }

    /// Apply a disruption and search again for every affected itinerary.
    ///
    /// A repeated cancellation changes nothing and affects nothing. An
    /// itinerary with no alternative is reported as such and does not fail
    /// the others.
    pub fn handle(
        &self,
        store: &NetworkStore,
        config: &SearchConfig,
        disruption: &Disruption,
    ) -> Result<DisruptionOutcome, RoutingError> {
        let change = disruption.change()?;
        self.serialized(store, &disruption.flight, || {
            self.apply_and_rebook(store, config, disruption, &change)
        })
    }

    fn apply_and_rebook(
        &self,
        store: &NetworkStore,
        config: &SearchConfig,
        disruption: &Disruption,
        change: &StatusChange,
    ) -> Result<DisruptionOutcome, RoutingError> {
        let (update, graph) = self.apply(
            store,
            &disruption.flight,
            change,
            disruption.reason.as_deref(),
        )?;
        if update.transition == Transition::Unchanged {
            info!(flight = %disruption.flight, kind = %disruption.kind, "disruption already applied");
            return Ok(DisruptionOutcome {
                update,
                rebookings: Vec::new(),
            });
        }

        let saved = self.lock_registry().using_flight(&disruption.flight);
        let targets = saved
            .iter()
            .map(|s| (Some(s.id), s.itinerary))
            .chain(disruption.itineraries.iter().map(|it| (None, *it)));

        let finder = PathFinder::new(&graph, config);
        let rebookings: Vec<Rebooking> = targets
            .map(|(saved_route, itinerary)| Rebooking {
                itinerary,
                saved_route,
                replacement: rebook(&finder, &itinerary),
            })
            .collect();

        let now = Utc::now();
        {
            let mut registry = self.lock_registry();
            for rebooking in &rebookings {
                if let (Some(id), Some(route)) = (rebooking.saved_route, &rebooking.replacement) {
                    registry.supersede(id, route.clone(), now);
                }
            }
        }

        info!(
            flight = %disruption.flight,
            kind = %disruption.kind,
            version = update.version,
            affected = rebookings.len(),
            rebooked = rebookings.iter().filter(|r| r.replacement.is_some()).count(),
            "disruption handled"
        );

        Ok(DisruptionOutcome { update, rebookings })
    }

    /// Save routes computed on graph `version`. Returns their ids in order.
    ///
    /// Returns `None` and saves nothing if the network has moved past
    /// `version`: a disruption published since then has already looked for
    /// the routes it affects and would never rebook these.
    pub fn save_routes(
        &self,
        store: &NetworkStore,
        version: u64,
        routes: &[Route],
    ) -> Option<Vec<u64>> {
        let mut registry = self.lock_registry();
        if store.version() != version {
            return None;
        }
        let now = Utc::now();
        Some(
            routes
                .iter()
                .map(|route| registry.save(route.clone(), now))
                .collect(),
        )
    }

    /// Publish a whole new network and forget the routes saved on the old one.
    ///
    /// Saves against the old network are rejected from the moment it is
    /// replaced, and none made against the new one are lost.
    pub fn replace_network(&self, store: &NetworkStore, graph: NetworkGraph) -> Arc<NetworkGraph> {
        let mut registry = self.lock_registry();
        let published = store.replace(graph);
        registry.clear();
        drop(registry);

        self.lock_table()
            .retain(|_, lock| Arc::strong_count(lock) > 1);
        published
    }

    /// Up to `limit` saved routes, most recent first.
    pub fn saved_routes(&self, limit: usize) -> Vec<SavedRoute> {
        self.lock_registry().recent(limit)
    }

    pub fn saved_route_count(&self) -> usize {
        self.lock_registry().len()
    }

    /// Status changes recorded since start-up.
    pub fn disruptions_recorded(&self) -> usize {
        self.lock_history().len()
    }

    /// Status changes recorded on the current UTC day.
    pub fn disruptions_today(&self) -> usize {
        self.lock_history().count_on(Utc::now().date_naive())
    }

    pub fn history_for(&self, number: &FlightNumber) -> Vec<StatusRecord> {
        self.lock_history().for_flight(number)
    }

    fn apply(
        &self,
        store: &NetworkStore,
        number: &FlightNumber,
        change: &StatusChange,
        reason: Option<&str>,
    ) -> Result<(StatusUpdate, Arc<NetworkGraph>), RoutingError> {
        let (transition, graph) =
            store.update(|g| g.update_flight_status(number, change, reason))?;
        let flight = graph
            .flight(number)
            .ok_or_else(|| RoutingError::FlightNotFound(number.clone()))?;

        let update = StatusUpdate {
            flight: number.clone(),
            status: flight.status(),
            delay_minutes: flight.delay_minutes(),
            transition,
            version: graph.version(),
        };

        if transition == Transition::Applied {
            self.lock_history().record(StatusRecord {
                flight: number.clone(),
                status: update.status,
                delay_minutes: update.delay_minutes,
                reason: reason.map(str::to_string),
                recorded_at: Utc::now(),
            });
            info!(
                flight = %number,
                status = %update.status,
                delay_minutes = update.delay_minutes,
                version = update.version,
                "flight status changed"
            );
        }

        Ok((update, graph))
    }

    /// Run `work` while holding the lock of one flight.
    ///
    /// Only flights of the current network get a lock, and a lock nobody
    /// else is waiting on is dropped afterwards.
    fn serialized<T>(
        &self,
        store: &NetworkStore,
        number: &FlightNumber,
        work: impl FnOnce() -> Result<T, RoutingError>,
    ) -> Result<T, RoutingError> {
        if store.snapshot().flight(number).is_none() {
            return Err(RoutingError::FlightNotFound(number.clone()));
        }
        let lock = self
            .lock_table()
            .entry(number.clone())
            .or_default()
            .clone();

        let result = {
            let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
            work()
        };

        let mut locks = self.lock_table();
        drop(lock);
        if locks
            .get(number)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(number);
        }
        result
    }

    #[cfg(test)]
    fn tracked_flights(&self) -> usize {
        self.lock_table().len()
    }

    fn lock_table(&self) -> std::sync::MutexGuard<'_, HashMap<FlightNumber, Arc<Mutex<()>>>> {
        self.locks.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_registry(&self) -> std::sync::MutexGuard<'_, RouteRegistry> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_history(&self) -> std::sync::MutexGuard<'_, StatusHistory> {
        self.history.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Best replacement for one itinerary on the new graph.
fn rebook(finder: &PathFinder<'_>, itinerary: &Itinerary) -> Option<Route> {
    let result = finder.best_route(
        itinerary.source,
        itinerary.destination,
        itinerary.criterion,
        itinerary.algorithm,
    );
    match result {
        Ok(result) => {
            let route = result.routes.into_iter().next();
            if route.is_none() {
                warn!(
                    source = %itinerary.source,
                    destination = %itinerary.destination,
                    criterion = %itinerary.criterion,
                    "no alternative found"
                );
            }
            route
        }
        Err(e) => {
            warn!(
                source = %itinerary.source,
                destination = %itinerary.destination,
                error = %e,
                "rebooking failed"
            );
            None
        }
    }
}
