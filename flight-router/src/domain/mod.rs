//! Domain types for the flight router.
//!
//! This module contains the core domain model types that represent
//! validated network data. All types enforce their invariants at construction
//! time, so code that receives these types can trust their validity.

mod airport;
mod airport_code;
mod error;
mod flight;
mod flight_number;
mod route;

pub use airport::{Airport, Coordinates, EARTH_RADIUS_KM};
pub use airport_code::{AirportCode, InvalidAirportCode};
pub use error::{ErrorKind, RoutingError};
pub use flight::{DELAYED_RISK_FACTOR, Flight, FlightStatus, StatusChange, Transition};
pub use flight_number::{FlightNumber, InvalidFlightNumber};
pub use route::{Algorithm, Criterion, Route};
