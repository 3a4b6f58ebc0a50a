//! Routing error types.
//!
//! Every failure the core can report. "No route exists" is deliberately
//! absent: a search that finds nothing returns an empty result.

use super::{AirportCode, FlightNumber, FlightStatus, InvalidAirportCode, InvalidFlightNumber};

/// Broad category of a [`RoutingError`], used by callers that map errors to
/// transport status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request or the supplied data is malformed.
    Validation,
    /// The request names an entity the network does not have.
    NotFound,
}

/// Errors from the routing core.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RoutingError {
    /// Generic malformed input
    #[error("validation failed: {0}")]
    Validation(String),

    #[error(transparent)]
    InvalidAirportCode(#[from] InvalidAirportCode),

    #[error(transparent)]
    InvalidFlightNumber(#[from] InvalidFlightNumber),

    /// Flights whose endpoints are not airports of the network
    #[error("flights reference unknown airports: {}", join(.flights))]
    DanglingFlights { flights: Vec<FlightNumber> },

    /// A query naming an airport the network does not have
    #[error("unknown airport {0}")]
    UnknownAirport(AirportCode),

    /// A query from an airport to itself
    #[error("source and destination are both {0}")]
    SameEndpoints(AirportCode),

    /// Status change not allowed by the flight state machine
    #[error("flight {flight} cannot go from {from} to {to}")]
    InvalidTransition {
        flight: FlightNumber,
        from: FlightStatus,
        to: FlightStatus,
    },

    #[error("airport {0} not found")]
    AirportNotFound(AirportCode),

    #[error("flight {0} not found")]
    FlightNotFound(FlightNumber),
}

impl RoutingError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RoutingError::AirportNotFound(_) | RoutingError::FlightNotFound(_) => {
                ErrorKind::NotFound
            }
            _ => ErrorKind::Validation,
        }
    }
}

fn join(flights: &[FlightNumber]) -> String {
    flights
        .iter()
        .map(FlightNumber::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
