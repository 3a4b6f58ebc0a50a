//! The flight network graph.

use std::collections::{BTreeMap, HashMap, HashSet};

use tracing::debug;

use crate::domain::{
    Airport, AirportCode, Flight, FlightNumber, RoutingError, StatusChange, Transition,
};
use crate::stats::NetworkStats;

/// Airports (nodes) and flights (directed edges) of the network.
///
/// Parallel edges are allowed: several flights may connect the same pair of
/// airports. Outgoing flights are kept in load order, which is the order
/// [`NetworkGraph::neighbors`] reports and the order searches relax them in.
///
/// Every flight's endpoints are airports of the graph; [`NetworkGraph::build`]
/// refuses anything else. Flights are never removed: a cancelled flight stays
/// in the graph for audit but is skipped by searches.
#[derive(Debug, Clone, Default)]
pub struct NetworkGraph {
    airports: BTreeMap<AirportCode, Airport>,
    flights: Vec<Flight>,
    /// Airport → indices into `flights`, in load order.
    adjacency: HashMap<AirportCode, Vec<usize>>,
    flight_index: HashMap<FlightNumber, usize>,
    version: u64,
}

impl NetworkGraph {
    /// A graph with no airports.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a graph, validating it as a whole.
    ///
    /// Fails on duplicate airport codes, duplicate flight numbers, or flights
    /// whose endpoints are not among `airports`. In the last case every
    /// offending flight is reported, not just the first.
    pub fn build(airports: Vec<Airport>, flights: Vec<Flight>) -> Result<Self, RoutingError> {
        let mut airport_map = BTreeMap::new();
        for airport in airports {
            let code = airport.code;
            if airport_map.insert(code, airport).is_some() {
                return Err(RoutingError::Validation(format!(
                    "duplicate airport code {code}"
                )));
            }
        }

        let mut seen = HashSet::new();
        let duplicates: Vec<&str> = flights
            .iter()
            .filter(|f| !seen.insert(&f.number))
            .map(|f| f.number.as_str())
            .collect();
        if !duplicates.is_empty() {
            return Err(RoutingError::Validation(format!(
                "duplicate flight numbers: {}",
                duplicates.join(", ")
            )));
        }

        let dangling: Vec<FlightNumber> = flights
            .iter()
            .filter(|f| {
                !airport_map.contains_key(&f.source) || !airport_map.contains_key(&f.destination)
            })
            .map(|f| f.number.clone())
            .collect();
        if !dangling.is_empty() {
            return Err(RoutingError::DanglingFlights { flights: dangling });
        }

        let mut adjacency: HashMap<AirportCode, Vec<usize>> = HashMap::new();
        let mut flight_index = HashMap::with_capacity(flights.len());
        for (idx, flight) in flights.iter().enumerate() {
            adjacency.entry(flight.source).or_default().push(idx);
            flight_index.insert(flight.number.clone(), idx);
        }

        debug!(
            airports = airport_map.len(),
            flights = flights.len(),
            "built network graph"
        );

        Ok(Self {
            airports: airport_map,
            flights,
            adjacency,
            flight_index,
            version: 0,
        })
    }

    /// Monotonic counter bumped by every mutation and every rebuild.
    ///
    /// Anything derived from the graph (cached routes) records the version
    /// it was computed on and is stale once this moves.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub(crate) fn set_version(&mut self, version: u64) {
        self.version = version;
    }

    pub fn airport_count(&self) -> usize {
        self.airports.len()
    }

    pub fn flight_count(&self) -> usize {
        self.flights.len()
    }

    /// Airports in code order.
    pub fn airports(&self) -> impl Iterator<Item = &Airport> {
        self.airports.values()
    }

    /// Every flight, cancelled ones included, in load order.
    pub fn flights(&self) -> impl Iterator<Item = &Flight> {
        self.flights.iter()
    }

    pub fn airport(&self, code: &AirportCode) -> Option<&Airport> {
        self.airports.get(code)
    }

    /// Look up an airport, failing if it is not part of the network.
    pub fn require_airport(&self, code: &AirportCode) -> Result<&Airport, RoutingError> {
        self.airport(code)
            .ok_or(RoutingError::AirportNotFound(*code))
    }

    pub fn flight(&self, number: &FlightNumber) -> Option<&Flight> {
        self.flight_index.get(number).map(|&idx| &self.flights[idx])
    }

    /// Outgoing flights of an airport, in load order, cancelled ones included.
    ///
    /// An airport with no departures yields an empty list; an unknown code
    /// is an error.
    pub fn neighbors(&self, code: &AirportCode) -> Result<Vec<&Flight>, RoutingError> {
        self.require_airport(code)?;
        Ok(self.outgoing(code).collect())
    }

    /// Outgoing flights without the existence check, for the search loops.
    pub(crate) fn outgoing(&self, code: &AirportCode) -> impl Iterator<Item = &Flight> {
        self.adjacency
            .get(code)
            .into_iter()
            .flatten()
            .map(|&idx| &self.flights[idx])
    }

    /// Apply a status change to one flight in place.
    ///
    /// Bumps the version when the flight actually changed.
    pub fn update_flight_status(
        &mut self,
        number: &FlightNumber,
        change: &StatusChange,
        reason: Option<&str>,
    ) -> Result<Transition, RoutingError> {
        let idx = *self
            .flight_index
            .get(number)
            .ok_or_else(|| RoutingError::FlightNotFound(number.clone()))?;

        let transition = self.flights[idx].apply(change, reason)?;
        if transition == Transition::Applied {
            self.version += 1;
        }
        Ok(transition)
    }

    /// Aggregate statistics of the current state.
    pub fn stats(&self) -> NetworkStats {
        NetworkStats::compute(self)
    }
}
