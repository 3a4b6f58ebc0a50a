//! Network-wide aggregates.
//!
//! Everything here is a pure function of one graph snapshot, computed in a
//! single pass over airports and flights.

use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::domain::{AirportCode, FlightNumber, FlightStatus};
use crate::network::NetworkGraph;

/// How many airports the congestion ranking reports.
pub const CONGESTION_TOP_N: usize = 5;

/// Upper bound (inclusive) of the low-risk band.
pub const LOW_RISK_MAX: f64 = 0.2;

/// Upper bound (inclusive) of the medium-risk band.
pub const MEDIUM_RISK_MAX: f64 = 0.5;

/// Delay risk band of a single flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DelayRisk {
    Low,
    Medium,
    High,
}

impl DelayRisk {
    pub fn from_probability(p: f64) -> Self {
        if p > MEDIUM_RISK_MAX {
            DelayRisk::High
        } else if p > LOW_RISK_MAX {
            DelayRisk::Medium
        } else {
            DelayRisk::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DelayRisk::Low => "low",
            DelayRisk::Medium => "medium",
            DelayRisk::High => "high",
        }
    }
}

impl fmt::Display for DelayRisk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Number of usable flights per risk band.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RiskDistribution {
    pub low: usize,
    pub medium: usize,
    pub high: usize,
}

impl RiskDistribution {
    fn record(&mut self, risk: DelayRisk) {
        match risk {
            DelayRisk::Low => self.low += 1,
            DelayRisk::Medium => self.medium += 1,
            DelayRisk::High => self.high += 1,
        }
    }
}

/// Usable flights touching an airport, in either direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AirportLoad {
    pub code: AirportCode,
    pub departures: usize,
    pub arrivals: usize,
}

impl AirportLoad {
    pub fn total(&self) -> usize {
        self.departures + self.arrivals
    }
}

/// Summary of a network snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkStats {
    pub total_airports: usize,
    pub total_flights: usize,
    pub scheduled_flights: usize,
    pub delayed_flights: usize,
    pub cancelled_flights: usize,
    /// Mean effective delay probability over flights that still operate.
    pub average_delay_probability: f64,
    /// Operating flights per airport.
    pub average_out_degree: f64,
    /// Share of ordered airport pairs joined by at least one operating flight.
    pub density: f64,
    /// Airports with no operating flight in or out, in code order.
    pub isolated_airports: Vec<AirportCode>,
    /// Busiest airports by operating flights in and out, busiest first.
    pub most_congested: Vec<AirportLoad>,
    pub risk_distribution: RiskDistribution,
}

impl NetworkStats {
    pub fn compute(graph: &NetworkGraph) -> Self {
        let mut scheduled = 0;
        let mut delayed = 0;
        let mut cancelled = 0;
        let mut probability_sum = 0.0;
        let mut risk_distribution = RiskDistribution::default();
        let mut pairs = HashSet::new();
        let mut loads: HashMap<AirportCode, (usize, usize)> = HashMap::new();

        for flight in graph.flights() {
            match flight.status() {
                FlightStatus::Scheduled => scheduled += 1,
                FlightStatus::Delayed => delayed += 1,
                FlightStatus::Cancelled => {
                    cancelled += 1;
                    continue;
                }
            }

            let p = flight.effective_delay_probability();
            probability_sum += p;
            risk_distribution.record(DelayRisk::from_probability(p));
            pairs.insert((flight.source, flight.destination));
            loads.entry(flight.source).or_default().0 += 1;
            loads.entry(flight.destination).or_default().1 += 1;
        }

        let total_airports = graph.airport_count();
        let operating = scheduled + delayed;

        let average_delay_probability = if operating > 0 {
            probability_sum / operating as f64
        } else {
            0.0
        };
        let average_out_degree = if total_airports > 0 {
            operating as f64 / total_airports as f64
        } else {
            0.0
        };
        let density = if total_airports > 1 {
            pairs.len() as f64 / (total_airports * (total_airports - 1)) as f64
        } else {
            0.0
        };

        let isolated_airports = graph
            .airports()
            .map(|a| a.code)
            .filter(|code| !loads.contains_key(code))
            .collect();

        let mut most_congested: Vec<AirportLoad> = loads
            .into_iter()
            .map(|(code, (departures, arrivals))| AirportLoad {
                code,
                departures,
                arrivals,
            })
            .collect();
        most_congested.sort_by(|a, b| b.total().cmp(&a.total()).then(a.code.cmp(&b.code)));
        most_congested.truncate(CONGESTION_TOP_N);

        Self {
            total_airports,
            total_flights: graph.flight_count(),
            scheduled_flights: scheduled,
            delayed_flights: delayed,
            cancelled_flights: cancelled,
            average_delay_probability,
            average_out_degree,
            density,
            isolated_airports,
            most_congested,
            risk_distribution,
        }
    }
}

/// Delay outlook of one operating flight.
#[derive(Debug, Clone, PartialEq)]
pub struct FlightRisk {
    pub number: FlightNumber,
    pub source: AirportCode,
    pub destination: AirportCode,
    pub status: FlightStatus,
    pub delay_probability: f64,
    pub risk: DelayRisk,
}

/// Risk band of every operating flight, in load order.
pub fn delay_risk_report(graph: &NetworkGraph) -> Vec<FlightRisk> {
    graph
        .flights()
        .filter(|f| f.is_usable())
        .map(|f| {
            let p = f.effective_delay_probability();
            FlightRisk {
                number: f.number.clone(),
                source: f.source,
                destination: f.destination,
                status: f.status(),
                delay_probability: p,
                risk: DelayRisk::from_probability(p),
            }
        })
        .collect()
}
