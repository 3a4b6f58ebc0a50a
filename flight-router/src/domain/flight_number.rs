//! Flight number type.

use std::fmt;
use std::sync::Arc;

/// Error returned when parsing an invalid flight number.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid flight number: {reason}")]
pub struct InvalidFlightNumber {
    reason: &'static str,
}

/// An airline flight number such as `AI101`.
///
/// Flight numbers are opaque identifiers. The only validation is that they
/// are non-empty once surrounding whitespace is removed. Cloning is cheap:
/// the text is shared, since every route and index entry holds a copy.
///
/// Ordering is plain string ordering, which is what the route tie-break
/// compares.
///
/// # Examples
///
/// ```
/// use flight_router::domain::FlightNumber;
///
/// let number = FlightNumber::new("AI101").unwrap();
/// assert_eq!(number.as_str(), "AI101");
///
/// // Empty strings are rejected
/// assert!(FlightNumber::new("  ").is_err());
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FlightNumber(Arc<str>);

impl FlightNumber {
    /// Create a flight number, trimming surrounding whitespace.
    pub fn new(s: &str) -> Result<Self, InvalidFlightNumber> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(InvalidFlightNumber {
                reason: "flight number cannot be empty",
            });
        }
        Ok(FlightNumber(Arc::from(trimmed)))
    }

    /// Returns the flight number as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for FlightNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FlightNumber({})", self.0)
    }
}

impl fmt::Display for FlightNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
