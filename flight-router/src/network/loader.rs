//! Loading network data from JSON documents.
//!
//! The wire shape mirrors the airport/flight records the rest of the system
//! stores: flat records keyed by airport code and flight number.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::{
    Airport, AirportCode, Coordinates, Flight, FlightNumber, FlightStatus, RoutingError,
};

use super::graph::NetworkGraph;

/// Errors from reading network data.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The data file could not be read
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The data file is not valid JSON for a network
    #[error("failed to parse {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// The records parsed but do not form a valid network
    #[error(transparent)]
    Invalid(#[from] RoutingError),
}

/// An airport as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirportRecord {
    pub code: String,
    pub name: String,
    pub city: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

/// A flight as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightRecord {
    pub flight_number: String,
    pub source: String,
    pub destination: String,
    /// Scheduled duration in hours.
    pub duration: f64,
    pub price: f64,
    #[serde(default, alias = "delay_probability")]
    pub delay_prob: f64,
    /// `scheduled`, `delayed` or `cancelled`; absent means scheduled.
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub delay_minutes: u32,
    #[serde(default, alias = "capacity")]
    pub max_capacity: u32,
    #[serde(default)]
    pub current_bookings: u32,
}

fn default_timezone() -> String {
    "UTC".to_string()
}

impl AirportRecord {
    pub fn into_airport(self) -> Result<Airport, RoutingError> {
        Ok(Airport {
            code: AirportCode::parse(&self.code)?,
            coordinates: Coordinates::new(self.latitude, self.longitude)?,
            name: self.name,
            city: self.city,
            timezone: self.timezone,
        })
    }
}

impl FlightRecord {
    pub fn into_flight(self) -> Result<Flight, RoutingError> {
        let number = FlightNumber::new(&self.flight_number)?;
        let status = match self.status.as_deref() {
            None => FlightStatus::Scheduled,
            Some(s) => FlightStatus::parse(s).ok_or_else(|| {
                RoutingError::Validation(format!("flight {number} has unknown status {s:?}"))
            })?,
        };
        let delay_minutes = match status {
            FlightStatus::Scheduled => 0,
            _ => self.delay_minutes,
        };

        let flight = Flight::new(
            number,
            AirportCode::parse(&self.source)?,
            AirportCode::parse(&self.destination)?,
            self.duration,
            self.price,
            self.delay_prob,
        )?
        .with_seats(self.max_capacity, self.current_bookings)
        .with_status(status, delay_minutes);
        Ok(flight)
    }
}

impl From<&Airport> for AirportRecord {
    fn from(airport: &Airport) -> Self {
        Self {
            code: airport.code.to_string(),
            name: airport.name.clone(),
            city: airport.city.clone(),
            latitude: airport.coordinates.latitude,
            longitude: airport.coordinates.longitude,
            timezone: airport.timezone.clone(),
        }
    }
}

impl From<&Flight> for FlightRecord {
    fn from(flight: &Flight) -> Self {
        Self {
            flight_number: flight.number.to_string(),
            source: flight.source.to_string(),
            destination: flight.destination.to_string(),
            duration: flight.duration_hours,
            price: flight.price,
            delay_prob: flight.delay_probability,
            status: Some(flight.status().to_string()),
            delay_minutes: flight.delay_minutes(),
            max_capacity: flight.capacity,
            current_bookings: flight.bookings,
        }
    }
}

/// A complete network document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkData {
    pub airports: Vec<AirportRecord>,
    pub flights: Vec<FlightRecord>,
}

impl NetworkData {
    /// Read a network document from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self, LoadError> {
        let contents = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(|source| LoadError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Convert the records into domain values.
    ///
    /// Stops at the first malformed record. Referential checks (unknown
    /// airports) are left to [`NetworkGraph::build`], which reports all of
    /// them at once.
    pub fn into_parts(self) -> Result<(Vec<Airport>, Vec<Flight>), RoutingError> {
        let airports = self
            .airports
            .into_iter()
            .map(AirportRecord::into_airport)
            .collect::<Result<Vec<_>, _>>()?;
        let flights = self
            .flights
            .into_iter()
            .map(FlightRecord::into_flight)
            .collect::<Result<Vec<_>, _>>()?;
        Ok((airports, flights))
    }

    /// Validate and build a graph.
    pub fn into_graph(self) -> Result<NetworkGraph, RoutingError> {
        let (airports, flights) = self.into_parts()?;
        NetworkGraph::build(airports, flights)
    }

    /// Dump a graph back into records.
    pub fn from_graph(graph: &NetworkGraph) -> Self {
        Self {
            airports: graph.airports().map(AirportRecord::from).collect(),
            flights: graph.flights().map(FlightRecord::from).collect(),
        }
    }
}

/// Read-through source of network data.
pub trait NetworkSource {
    fn fetch(&self) -> Result<NetworkData, LoadError>;
}

/// A network stored as a JSON file on disk.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl NetworkSource for JsonFileSource {
    fn fetch(&self) -> Result<NetworkData, LoadError> {
        NetworkData::from_json_file(&self.path)
    }
}
