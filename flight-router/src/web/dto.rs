//! Data transfer objects for web requests and responses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::disruption::{DisruptionOutcome, Rebooking, SavedRoute, StatusUpdate};
use crate::domain::Route;
use crate::planner::{AlgorithmComparison, Divergence};
use crate::service::NetworkOverview;
use crate::stats::{AirportLoad, FlightRisk, NetworkStats};

fn default_algorithm() -> String {
    "dijkstra".to_string()
}

fn default_optimization() -> String {
    "cost".to_string()
}

fn default_num_routes() -> usize {
    3
}

fn round(value: f64, places: i32) -> f64 {
    let scale = 10f64.powi(places);
    (value * scale).round() / scale
}

/// Request to find routes between two airports.
#[derive(Debug, Deserialize)]
pub struct FindRoutesRequest {
    /// Origin airport code
    pub source: String,

    /// Destination airport code
    pub destination: String,

    /// `dijkstra`, `a_star` or `multiple`
    #[serde(default = "default_algorithm")]
    pub algorithm: String,

    /// `cost`, `time` or `reliability`
    #[serde(default = "default_optimization")]
    pub optimization: String,

    #[serde(default = "default_num_routes")]
    pub num_routes: usize,
}

/// A route in a response.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RouteResult {
    /// Criterion the route was optimized for
    pub route_type: String,
    pub algorithm: String,
    pub airports: Vec<String>,
    pub flights: Vec<String>,
    pub total_cost: f64,
    /// Hours, including announced delays
    pub total_duration: f64,
    pub total_price: f64,
    pub average_delay_probability: f64,
    pub max_leg_delay_probability: f64,
    pub stops: usize,
}

impl RouteResult {
    pub fn from_route(route: &Route) -> Self {
        Self {
            route_type: route.criterion.as_str().to_string(),
            algorithm: route.algorithm.as_str().to_string(),
            airports: route.airports.iter().map(|a| a.as_str().to_string()).collect(),
            flights: route.flights.iter().map(|f| f.as_str().to_string()).collect(),
            total_cost: round(route.total_cost, 4),
            total_duration: round(route.total_duration, 2),
            total_price: round(route.total_price, 2),
            average_delay_probability: round(route.average_delay_probability, 3),
            max_leg_delay_probability: round(route.max_leg_delay_probability, 3),
            stops: route.stops(),
        }
    }
}

/// Response to a route search.
#[derive(Debug, Serialize)]
pub struct FindRoutesResponse {
    pub source: String,
    pub destination: String,
    pub algorithm_used: String,
    pub optimization_criteria: String,
    pub routes_found: usize,
    pub routes: Vec<RouteResult>,
    /// Registry ids of the returned routes
    pub saved_route_ids: Vec<u64>,
    pub network_version: u64,
    pub cached: bool,
}

/// Request to compare Dijkstra and A*.
#[derive(Debug, Deserialize)]
pub struct CompareAlgorithmsRequest {
    pub source: String,
    pub destination: String,

    #[serde(default = "default_optimization")]
    pub optimization: String,
}

/// Differences between the two algorithms' routes.
#[derive(Debug, Serialize)]
pub struct ComparisonResult {
    pub same_route: bool,
    pub cost_difference: f64,
    pub time_difference: f64,
}

impl ComparisonResult {
    fn from_divergence(divergence: &Divergence) -> Self {
        Self {
            same_route: divergence.same_route,
            cost_difference: round(divergence.cost_difference, 4),
            time_difference: round(divergence.duration_difference, 2),
        }
    }
}

/// Response to an algorithm comparison.
#[derive(Debug, Serialize)]
pub struct CompareAlgorithmsResponse {
    pub source: String,
    pub destination: String,
    pub optimization: String,
    pub dijkstra: Option<RouteResult>,
    pub a_star: Option<RouteResult>,
    pub comparison: Option<ComparisonResult>,
    pub dijkstra_expansions: usize,
    pub a_star_expansions: usize,
}

impl CompareAlgorithmsResponse {
    pub fn from_comparison(source: String, destination: String, c: &AlgorithmComparison) -> Self {
        Self {
            source,
            destination,
            optimization: c.criterion.as_str().to_string(),
            dijkstra: c.dijkstra.as_ref().map(RouteResult::from_route),
            a_star: c.a_star.as_ref().map(RouteResult::from_route),
            comparison: c.comparison.as_ref().map(ComparisonResult::from_divergence),
            dijkstra_expansions: c.dijkstra_expansions,
            a_star_expansions: c.a_star_expansions,
        }
    }
}

/// An itinerary to rebook, named by query rather than by saved route.
#[derive(Debug, Clone, Deserialize)]
pub struct ItineraryRequest {
    pub source: String,
    pub destination: String,

    #[serde(default = "default_optimization")]
    pub optimization: String,

    /// `dijkstra` or `a_star`
    #[serde(default = "default_algorithm")]
    pub algorithm: String,
}

/// Request to handle a delay or cancellation.
#[derive(Debug, Deserialize)]
pub struct DisruptionRequest {
    pub flight_number: String,

    /// `delay` or `cancellation`
    #[serde(rename = "type")]
    pub disruption_type: String,

    /// Total delay; required for a delay
    pub delay_minutes: Option<u32>,

    pub reason: Option<String>,

    /// Extra itineraries to rebook besides saved routes using the flight
    #[serde(default)]
    pub itineraries: Vec<ItineraryRequest>,
}

/// Rebooking of one affected itinerary.
#[derive(Debug, Serialize)]
pub struct AlternativeResult {
    pub saved_route_id: Option<u64>,
    pub source: String,
    pub destination: String,
    pub optimization: String,
    pub algorithm: String,
    pub route: Option<RouteResult>,
    /// Set when no alternative was found
    pub message: Option<String>,
}

impl AlternativeResult {
    fn from_rebooking(rebooking: &Rebooking) -> Self {
        let itinerary = &rebooking.itinerary;
        Self {
            saved_route_id: rebooking.saved_route,
            source: itinerary.source.as_str().to_string(),
            destination: itinerary.destination.as_str().to_string(),
            optimization: itinerary.criterion.as_str().to_string(),
            algorithm: itinerary.algorithm.as_str().to_string(),
            route: rebooking.replacement.as_ref().map(RouteResult::from_route),
            message: rebooking
                .replacement
                .is_none()
                .then(|| "no alternative found".to_string()),
        }
    }
}

/// Response to a disruption.
#[derive(Debug, Serialize)]
pub struct DisruptionResponse {
    pub message: String,
    pub flight_number: String,
    pub disruption_type: String,
    pub status: String,
    pub delay_minutes: Option<u32>,
    /// False when the flight was already in the reported state
    pub changed: bool,
    pub network_version: u64,
    pub affected_itineraries: usize,
    pub alternative_routes_found: usize,
    pub alternatives: Vec<AlternativeResult>,
}

impl DisruptionResponse {
    pub fn from_outcome(disruption_type: &str, outcome: &DisruptionOutcome) -> Self {
        let update = &outcome.update;
        Self {
            message: format!("Flight {} {} handled successfully", update.flight, disruption_type),
            flight_number: update.flight.as_str().to_string(),
            disruption_type: disruption_type.to_string(),
            status: update.status.as_str().to_string(),
            delay_minutes: (update.delay_minutes > 0).then_some(update.delay_minutes),
            changed: update.transition == crate::domain::Transition::Applied,
            network_version: update.version,
            affected_itineraries: outcome.affected_itineraries(),
            alternative_routes_found: outcome
                .rebookings
                .iter()
                .filter(|r| r.replacement.is_some())
                .count(),
            alternatives: outcome
                .rebookings
                .iter()
                .map(AlternativeResult::from_rebooking)
                .collect(),
        }
    }
}

/// Request to set a flight's status.
#[derive(Debug, Deserialize)]
pub struct FlightStatusRequest {
    pub flight_number: String,

    /// `scheduled`, `delayed` or `cancelled`
    pub status: String,

    pub delay_minutes: Option<u32>,
    pub reason: Option<String>,
}

/// Acknowledgement of a status change.
#[derive(Debug, Serialize)]
pub struct FlightStatusResponse {
    pub message: String,
    pub flight_number: String,
    pub status: String,
    pub delay_minutes: u32,
    pub changed: bool,
    pub network_version: u64,
}

impl FlightStatusResponse {
    pub fn from_update(update: &StatusUpdate) -> Self {
        Self {
            message: format!("Flight {} is {}", update.flight, update.status),
            flight_number: update.flight.as_str().to_string(),
            status: update.status.as_str().to_string(),
            delay_minutes: update.delay_minutes,
            changed: update.transition == crate::domain::Transition::Applied,
            network_version: update.version,
        }
    }
}

/// Departures and arrivals of a busy airport.
#[derive(Debug, Serialize)]
pub struct AirportLoadResult {
    pub code: String,
    pub departures: usize,
    pub arrivals: usize,
    pub total: usize,
}

impl AirportLoadResult {
    fn from_load(load: &AirportLoad) -> Self {
        Self {
            code: load.code.as_str().to_string(),
            departures: load.departures,
            arrivals: load.arrivals,
            total: load.total(),
        }
    }
}

/// Flights per delay-risk band.
#[derive(Debug, Serialize)]
pub struct RiskDistributionResult {
    pub low: usize,
    pub medium: usize,
    pub high: usize,
}

/// Network statistics.
#[derive(Debug, Serialize)]
pub struct NetworkStatsResult {
    pub total_airports: usize,
    pub total_flights: usize,
    pub scheduled_flights: usize,
    pub delayed_flights: usize,
    pub cancelled_flights: usize,
    pub avg_delay_probability: f64,
    pub average_out_degree: f64,
    pub density: f64,
    pub isolated_airports: Vec<String>,
    pub most_congested: Vec<AirportLoadResult>,
    pub risk_distribution: RiskDistributionResult,
}

impl NetworkStatsResult {
    pub fn from_stats(stats: &NetworkStats) -> Self {
        Self {
            total_airports: stats.total_airports,
            total_flights: stats.total_flights,
            scheduled_flights: stats.scheduled_flights,
            delayed_flights: stats.delayed_flights,
            cancelled_flights: stats.cancelled_flights,
            avg_delay_probability: round(stats.average_delay_probability, 3),
            average_out_degree: round(stats.average_out_degree, 3),
            density: round(stats.density, 4),
            isolated_airports: stats
                .isolated_airports
                .iter()
                .map(|a| a.as_str().to_string())
                .collect(),
            most_congested: stats
                .most_congested
                .iter()
                .map(AirportLoadResult::from_load)
                .collect(),
            risk_distribution: RiskDistributionResult {
                low: stats.risk_distribution.low,
                medium: stats.risk_distribution.medium,
                high: stats.risk_distribution.high,
            },
        }
    }
}

/// Network statistics with the service's own counters.
#[derive(Debug, Serialize)]
pub struct NetworkOverviewResponse {
    #[serde(flatten)]
    pub stats: NetworkStatsResult,
    pub network_version: u64,
    pub saved_routes: usize,
    pub total_disruptions_recorded: usize,
    pub disruptions_today: usize,
    pub cached_queries: u64,
}

impl NetworkOverviewResponse {
    pub fn from_overview(overview: &NetworkOverview) -> Self {
        Self {
            stats: NetworkStatsResult::from_stats(&overview.stats),
            network_version: overview.version,
            saved_routes: overview.saved_routes,
            total_disruptions_recorded: overview.disruptions_recorded,
            disruptions_today: overview.disruptions_today,
            cached_queries: overview.cached_queries,
        }
    }
}

/// Response to a network rebuild.
#[derive(Debug, Serialize)]
pub struct BuildNetworkResponse {
    pub message: String,
    pub statistics: NetworkOverviewResponse,
}

/// Query for the saved-route listing.
#[derive(Debug, Deserialize)]
pub struct SavedRoutesQuery {
    pub limit: Option<usize>,
}

/// A saved route.
#[derive(Debug, Serialize)]
pub struct SavedRouteResult {
    pub id: u64,
    pub source: String,
    pub destination: String,
    pub route_type: String,
    pub algorithm: String,
    pub total_cost: f64,
    pub total_duration: f64,
    pub delay_probability: f64,
    pub airports: Vec<String>,
    pub flights: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl SavedRouteResult {
    pub fn from_saved(saved: &SavedRoute) -> Self {
        let route = RouteResult::from_route(&saved.route);
        Self {
            id: saved.id,
            source: saved.itinerary.source.as_str().to_string(),
            destination: saved.itinerary.destination.as_str().to_string(),
            route_type: route.route_type,
            algorithm: route.algorithm,
            total_cost: route.total_cost,
            total_duration: route.total_duration,
            delay_probability: route.average_delay_probability,
            airports: route.airports,
            flights: route.flights,
            created_at: saved.saved_at,
        }
    }
}

/// Saved routes, most recent first.
#[derive(Debug, Serialize)]
pub struct SavedRoutesResponse {
    pub routes: Vec<SavedRouteResult>,
    pub total_count: usize,
}

/// Delay outlook of one flight.
#[derive(Debug, Serialize)]
pub struct DelayPrediction {
    pub flight_number: String,
    pub source: String,
    pub destination: String,
    pub status: String,
    pub predicted_delay_probability: f64,
    pub risk_level: String,
}

impl DelayPrediction {
    pub fn from_risk(risk: &FlightRisk) -> Self {
        Self {
            flight_number: risk.number.as_str().to_string(),
            source: risk.source.as_str().to_string(),
            destination: risk.destination.as_str().to_string(),
            status: risk.status.as_str().to_string(),
            predicted_delay_probability: round(risk.delay_probability, 3),
            risk_level: risk.risk.as_str().to_string(),
        }
    }
}

/// Delay outlook of every operating flight.
#[derive(Debug, Serialize)]
pub struct DelayRiskResponse {
    pub predictions: Vec<DelayPrediction>,
    pub generated_at: DateTime<Utc>,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
