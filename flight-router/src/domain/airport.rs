//! Airports and their geography.

use super::{AirportCode, RoutingError};

/// Mean Earth radius used for great-circle distances, in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    /// Create coordinates, rejecting values outside the valid ranges.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, RoutingError> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(RoutingError::Validation(format!(
                "latitude {latitude} is outside [-90, 90]"
            )));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(RoutingError::Validation(format!(
                "longitude {longitude} is outside [-180, 180]"
            )));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Great-circle distance to `other` in kilometres (haversine).
    pub fn distance_km(&self, other: &Coordinates) -> f64 {
        let lat1 = self.latitude.to_radians();
        let lat2 = other.latitude.to_radians();
        let dlat = (other.latitude - self.latitude).to_radians();
        let dlon = (other.longitude - self.longitude).to_radians();

        let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        EARTH_RADIUS_KM * c
    }
}

/// An airport: a node of the flight network.
///
/// Airports are reference data. They are created when a network is loaded
/// and never change until the next full rebuild.
#[derive(Debug, Clone, PartialEq)]
pub struct Airport {
    pub code: AirportCode,
    pub name: String,
    pub city: String,
    pub coordinates: Coordinates,
    /// IANA timezone name, e.g. `Asia/Kolkata`.
    pub timezone: String,
}

impl Airport {
    /// Great-circle distance to another airport in kilometres.
    pub fn distance_km(&self, other: &Airport) -> f64 {
        self.coordinates.distance_km(&other.coordinates)
    }
}
