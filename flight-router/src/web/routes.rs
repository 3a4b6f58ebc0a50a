//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::Utc;
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

use crate::disruption::{Disruption, DisruptionKind, Itinerary};
use crate::domain::{
    AirportCode, Algorithm, Criterion, ErrorKind, FlightNumber, FlightStatus, RoutingError,
    StatusChange,
};
use crate::network::NetworkData;
use crate::planner::AlgorithmChoice;
use crate::service::RoutingService;

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/routes/find", post(find_routes))
        .route("/routes/compare-algorithms", post(compare_algorithms))
        .route("/routes/handle-disruption", post(handle_disruption))
        .route("/routes/network-stats", get(network_stats))
        .route("/routes/build-network", post(build_network))
        .route("/routes/saved-routes", get(saved_routes))
        .route("/routes/delay-risk", get(delay_risk))
        .route("/flights/status", post(update_flight_status))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Find routes between two airports.
async fn find_routes(
    State(state): State<AppState>,
    Json(req): Json<FindRoutesRequest>,
) -> Result<Json<FindRoutesResponse>, AppError> {
    let source = parse_airport("source", &req.source)?;
    let destination = parse_airport("destination", &req.destination)?;
    let criterion = parse_criterion(&req.optimization)?;
    let algorithm = AlgorithmChoice::parse(&req.algorithm).ok_or_else(|| AppError::BadRequest {
        message: format!("Invalid algorithm: {}", req.algorithm),
    })?;
    let num_routes = req.num_routes;

    let found = run_blocking(&state, move |service| {
        service.find_routes(source, destination, criterion, algorithm, num_routes)
    })
    .await?;

    let routes: Vec<RouteResult> = found.routes.iter().map(RouteResult::from_route).collect();
    Ok(Json(FindRoutesResponse {
        source: source.as_str().to_string(),
        destination: destination.as_str().to_string(),
        algorithm_used: algorithm.as_str().to_string(),
        optimization_criteria: criterion.as_str().to_string(),
        routes_found: routes.len(),
        routes,
        saved_route_ids: found.saved_ids,
        network_version: found.version,
        cached: found.from_cache,
    }))
}

/// Run Dijkstra and A* side by side.
async fn compare_algorithms(
    State(state): State<AppState>,
    Json(req): Json<CompareAlgorithmsRequest>,
) -> Result<Json<CompareAlgorithmsResponse>, AppError> {
    let source = parse_airport("source", &req.source)?;
    let destination = parse_airport("destination", &req.destination)?;
    let criterion = parse_criterion(&req.optimization)?;

    let comparison = run_blocking(&state, move |service| {
        service.compare_algorithms(source, destination, criterion)
    })
    .await?;

    Ok(Json(CompareAlgorithmsResponse::from_comparison(
        source.as_str().to_string(),
        destination.as_str().to_string(),
        &comparison,
    )))
}

/// Apply a delay or cancellation and rebook affected itineraries.
async fn handle_disruption(
    State(state): State<AppState>,
    Json(req): Json<DisruptionRequest>,
) -> Result<Json<DisruptionResponse>, AppError> {
    let flight = parse_flight_number(&req.flight_number)?;
    let kind = DisruptionKind::parse(&req.disruption_type).ok_or_else(|| AppError::BadRequest {
        message: format!("Invalid disruption type: {}", req.disruption_type),
    })?;
    let itineraries = req
        .itineraries
        .iter()
        .map(parse_itinerary)
        .collect::<Result<Vec<_>, _>>()?;

    let disruption = Disruption {
        flight,
        kind,
        delay_minutes: req.delay_minutes,
        reason: req.reason,
        itineraries,
    };
    let outcome = run_blocking(&state, move |service| {
        service.handle_disruption(&disruption)
    })
    .await?;

    Ok(Json(DisruptionResponse::from_outcome(kind.as_str(), &outcome)))
}

/// Set a flight's status without rebooking.
async fn update_flight_status(
    State(state): State<AppState>,
    Json(req): Json<FlightStatusRequest>,
) -> Result<Json<FlightStatusResponse>, AppError> {
    let flight = parse_flight_number(&req.flight_number)?;
    let status = FlightStatus::parse(&req.status).ok_or_else(|| AppError::BadRequest {
        message: format!("Invalid status: {}", req.status),
    })?;
    let change = StatusChange::from_status(status, req.delay_minutes)?;
    let reason = req.reason;

    let update = run_blocking(&state, move |service| {
        service.update_flight_status(&flight, &change, reason.as_deref())
    })
    .await?;

    Ok(Json(FlightStatusResponse::from_update(&update)))
}

/// Network statistics.
async fn network_stats(
    State(state): State<AppState>,
) -> Result<Json<NetworkOverviewResponse>, AppError> {
    let overview = run_blocking(&state, |service| Ok(service.network_stats())).await?;
    Ok(Json(NetworkOverviewResponse::from_overview(&overview)))
}

/// Replace the whole network.
async fn build_network(
    State(state): State<AppState>,
    Json(data): Json<NetworkData>,
) -> Result<Json<BuildNetworkResponse>, AppError> {
    let overview = run_blocking(&state, move |service| {
        let (airports, flights) = data.into_parts()?;
        service.rebuild_network(airports, flights)
    })
    .await?;

    Ok(Json(BuildNetworkResponse {
        message: "Flight network built successfully".to_string(),
        statistics: NetworkOverviewResponse::from_overview(&overview),
    }))
}

/// Most recently saved routes.
async fn saved_routes(
    State(state): State<AppState>,
    Query(query): Query<SavedRoutesQuery>,
) -> Json<SavedRoutesResponse> {
    let routes: Vec<SavedRouteResult> = state
        .service
        .saved_routes(query.limit)
        .iter()
        .map(SavedRouteResult::from_saved)
        .collect();

    Json(SavedRoutesResponse {
        total_count: routes.len(),
        routes,
    })
}

/// Delay risk of every operating flight.
async fn delay_risk(State(state): State<AppState>) -> Result<Json<DelayRiskResponse>, AppError> {
    let report = run_blocking(&state, |service| Ok(service.delay_risk())).await?;
    Ok(Json(DelayRiskResponse {
        predictions: report.iter().map(DelayPrediction::from_risk).collect(),
        generated_at: Utc::now(),
    }))
}

/// Run a service call on the blocking pool.
///
/// Searches are CPU-bound and disruptions may wait on a per-flight lock;
/// neither belongs on an async worker thread.
async fn run_blocking<T, F>(state: &AppState, f: F) -> Result<T, AppError>
where
    F: FnOnce(&RoutingService) -> Result<T, RoutingError> + Send + 'static,
    T: Send + 'static,
{
    let service = state.service.clone();
    tokio::task::spawn_blocking(move || f(&service))
        .await
        .map_err(|e| AppError::Internal {
            message: format!("Worker failed: {e}"),
        })?
        .map_err(AppError::from)
}

fn parse_airport(field: &str, value: &str) -> Result<AirportCode, AppError> {
    AirportCode::parse(value).map_err(|e| AppError::BadRequest {
        message: format!("Invalid {field}: {e}"),
    })
}

fn parse_flight_number(value: &str) -> Result<FlightNumber, AppError> {
    FlightNumber::new(value).map_err(|e| AppError::BadRequest {
        message: format!("Invalid flight number: {e}"),
    })
}

fn parse_criterion(value: &str) -> Result<Criterion, AppError> {
    Criterion::parse(value).ok_or_else(|| AppError::BadRequest {
        message: format!("Invalid optimization: {value}"),
    })
}

fn parse_itinerary(req: &ItineraryRequest) -> Result<Itinerary, AppError> {
    Ok(Itinerary {
        source: parse_airport("itinerary source", &req.source)?,
        destination: parse_airport("itinerary destination", &req.destination)?,
        criterion: parse_criterion(&req.optimization)?,
        algorithm: Algorithm::parse(&req.algorithm).ok_or_else(|| AppError::BadRequest {
            message: format!("Invalid itinerary algorithm: {}", req.algorithm),
        })?,
    })
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
    Internal { message: String },
}

impl From<RoutingError> for AppError {
    fn from(e: RoutingError) -> Self {
        let message = e.to_string();
        match e.kind() {
            ErrorKind::Validation => AppError::BadRequest { message },
            ErrorKind::NotFound => AppError::NotFound { message },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message),
            AppError::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };

        if status.is_server_error() {
            error!(%status, %message, "request failed");
        } else {
            warn!(%status, %message, "request rejected");
        }

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}
