//! Flights: the directed edges of the network.

use std::fmt;

use super::{AirportCode, FlightNumber, RoutingError};

/// Multiplier applied to the delay probability of a flight that is known to
/// be delayed. Capped at 1.0.
pub const DELAYED_RISK_FACTOR: f64 = 2.0;

/// Operational status of a flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlightStatus {
    Scheduled,
    Delayed,
    Cancelled,
}

impl FlightStatus {
    /// Parse a status name (case-insensitive). `on_time` is accepted as an
    /// alias for `scheduled`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "scheduled" | "on_time" => Some(FlightStatus::Scheduled),
            "delayed" => Some(FlightStatus::Delayed),
            "cancelled" | "canceled" => Some(FlightStatus::Cancelled),
            _ => None,
        }
    }

    /// Returns the wire name of this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            FlightStatus::Scheduled => "scheduled",
            FlightStatus::Delayed => "delayed",
            FlightStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for FlightStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A requested change of operational status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusChange {
    /// Return to (or stay in) the scheduled state.
    Scheduled,
    /// Announce a delay. `minutes` is the total delay, not an increment.
    Delayed { minutes: u32 },
    Cancelled,
}

impl StatusChange {
    /// Build a change from a target status and an optional delay.
    ///
    /// A delay must say how long it is.
    pub fn from_status(
        status: FlightStatus,
        delay_minutes: Option<u32>,
    ) -> Result<Self, RoutingError> {
        match status {
            FlightStatus::Scheduled => Ok(StatusChange::Scheduled),
            FlightStatus::Cancelled => Ok(StatusChange::Cancelled),
            FlightStatus::Delayed => delay_minutes
                .map(|minutes| StatusChange::Delayed { minutes })
                .ok_or_else(|| {
                    RoutingError::Validation("delay_minutes is required for a delay".to_string())
                }),
        }
    }

    /// The status a flight ends up in after this change.
    pub fn target(&self) -> FlightStatus {
        match self {
            StatusChange::Scheduled => FlightStatus::Scheduled,
            StatusChange::Delayed { .. } => FlightStatus::Delayed,
            StatusChange::Cancelled => FlightStatus::Cancelled,
        }
    }
}

/// Outcome of applying a [`StatusChange`] to a flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The flight's fields changed.
    Applied,
    /// The flight was already in the requested state; nothing changed.
    Unchanged,
}

/// A scheduled flight between two airports.
///
/// The scheduled duration, base price and base delay probability are fixed
/// at load time. Status changes only move the derived *effective* values.
#[derive(Debug, Clone, PartialEq)]
pub struct Flight {
    pub number: FlightNumber,
    pub source: AirportCode,
    pub destination: AirportCode,
    /// Scheduled block time in hours.
    pub duration_hours: f64,
    pub price: f64,
    /// Delay probability as supplied by the prediction input, in [0, 1].
    pub delay_probability: f64,
    /// Seats on the aircraft. Informational.
    pub capacity: u32,
    /// Seats sold. Informational.
    pub bookings: u32,
    status: FlightStatus,
    delay_minutes: u32,
    reason: Option<String>,
}

impl Flight {
    /// Create a scheduled flight, validating its numeric fields.
    pub fn new(
        number: FlightNumber,
        source: AirportCode,
        destination: AirportCode,
        duration_hours: f64,
        price: f64,
        delay_probability: f64,
    ) -> Result<Self, RoutingError> {
        if source == destination {
            return Err(RoutingError::Validation(format!(
                "flight {number} departs and arrives at {source}"
            )));
        }
        if !(duration_hours.is_finite() && duration_hours > 0.0) {
            return Err(RoutingError::Validation(format!(
                "flight {number} has invalid duration {duration_hours}"
            )));
        }
        if !(price.is_finite() && price >= 0.0) {
            return Err(RoutingError::Validation(format!(
                "flight {number} has invalid price {price}"
            )));
        }
        if !(0.0..=1.0).contains(&delay_probability) {
            return Err(RoutingError::Validation(format!(
                "flight {number} has delay probability {delay_probability} outside [0, 1]"
            )));
        }

        Ok(Self {
            number,
            source,
            destination,
            duration_hours,
            price,
            delay_probability,
            capacity: 0,
            bookings: 0,
            status: FlightStatus::Scheduled,
            delay_minutes: 0,
            reason: None,
        })
    }

    /// Set the informational seat counts.
    pub fn with_seats(mut self, capacity: u32, bookings: u32) -> Self {
        self.capacity = capacity;
        self.bookings = bookings;
        self
    }

    /// Set the status the flight is loaded with.
    ///
    /// Used when a network snapshot already carries disruptions.
    pub fn with_status(mut self, status: FlightStatus, delay_minutes: u32) -> Self {
        self.status = status;
        self.delay_minutes = delay_minutes;
        self
    }

    pub fn status(&self) -> FlightStatus {
        self.status
    }

    /// Announced delay in minutes (0 when not delayed).
    pub fn delay_minutes(&self) -> u32 {
        self.delay_minutes
    }

    /// Reason given with the last status change, if any.
    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }

    /// Whether new routes may use this flight.
    pub fn is_usable(&self) -> bool {
        self.status != FlightStatus::Cancelled
    }

    /// Scheduled duration plus any announced delay, in hours.
    pub fn effective_duration_hours(&self) -> f64 {
        self.duration_hours + f64::from(self.delay_minutes) / 60.0
    }

    /// Delay probability adjusted for the current status.
    ///
    /// A flight that is already delayed is treated as twice as risky.
    pub fn effective_delay_probability(&self) -> f64 {
        match self.status {
            FlightStatus::Delayed => (self.delay_probability * DELAYED_RISK_FACTOR).min(1.0),
            _ => self.delay_probability,
        }
    }

    /// Apply a status change, enforcing the status state machine.
    ///
    /// `scheduled → {delayed, cancelled}`, `delayed → {delayed, cancelled}`,
    /// and `cancelled` is terminal. Re-cancelling and re-scheduling a
    /// scheduled flight are accepted as no-ops.
    pub fn apply(
        &mut self,
        change: &StatusChange,
        reason: Option<&str>,
    ) -> Result<Transition, RoutingError> {
        match (self.status, change) {
            (FlightStatus::Cancelled, StatusChange::Cancelled) => Ok(Transition::Unchanged),
            (FlightStatus::Cancelled, _) => Err(self.invalid_transition(change)),
            (FlightStatus::Scheduled, StatusChange::Scheduled) => Ok(Transition::Unchanged),
            (FlightStatus::Delayed, StatusChange::Scheduled) => Err(self.invalid_transition(change)),
            (_, StatusChange::Delayed { minutes }) => {
                self.status = FlightStatus::Delayed;
                self.delay_minutes = *minutes;
                self.reason = reason.map(str::to_string);
                Ok(Transition::Applied)
            }
            (_, StatusChange::Cancelled) => {
                self.status = FlightStatus::Cancelled;
                self.reason = reason.map(str::to_string);
                Ok(Transition::Applied)
            }
        }
    }

    fn invalid_transition(&self, change: &StatusChange) -> RoutingError {
        RoutingError::InvalidTransition {
            flight: self.number.clone(),
            from: self.status,
            to: change.target(),
        }
    }
}
