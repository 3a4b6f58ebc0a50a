//! Edge weights under an optimization criterion.

use crate::domain::{Criterion, Flight};

/// Delay probabilities are clamped to this before the reliability transform,
/// so a certain delay costs a large finite weight instead of infinity.
pub const MAX_DELAY_PROBABILITY: f64 = 1.0 - 1e-6;

/// Maps flights to non-negative scalar weights for one query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightStrategy {
    criterion: Criterion,
    fare_adjustment: f64,
}

impl WeightStrategy {
    pub fn new(criterion: Criterion, fare_adjustment: f64) -> Self {
        Self {
            criterion,
            fare_adjustment,
        }
    }

    pub fn criterion(&self) -> Criterion {
        self.criterion
    }

    /// Weight of a flight, or `None` if the flight may not be used.
    pub fn weight(&self, flight: &Flight) -> Option<f64> {
        if !flight.is_usable() {
            return None;
        }
        let w = match self.criterion {
            Criterion::Cost => self.fare(flight),
            Criterion::Time => flight.effective_duration_hours(),
            Criterion::Reliability => reliability_weight(flight.effective_delay_probability()),
        };
        Some(w)
    }

    /// Fare after adjustment.
    pub fn fare(&self, flight: &Flight) -> f64 {
        flight.price * self.fare_adjustment
    }
}

/// `-ln(1 - p)`, with `p` clamped below 1.
///
/// Zero risk is zero weight. Summing these along a route gives
/// `-ln(P(no leg delayed))` for independent legs.
pub fn reliability_weight(p: f64) -> f64 {
    let p = p.clamp(0.0, MAX_DELAY_PROBABILITY);
    (1.0 / (1.0 - p)).ln()
}
