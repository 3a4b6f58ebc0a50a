use std::net::SocketAddr;
use std::process;
use std::time::Duration;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use flight_router::cache::CacheConfig;
use flight_router::network::JsonFileSource;
use flight_router::planner::SearchConfig;
use flight_router::service::RoutingService;
use flight_router::web::{AppState, create_router};

const DEFAULT_ADDR: &str = "127.0.0.1:3000";
const DEFAULT_DATA: &str = "data/network.json";

/// Read an environment variable, falling back to `default` when unset.
fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    match std::env::var(name) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            error!(%name, value = %raw, "ignoring unparsable setting");
            default
        }),
        Err(_) => default,
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("flight_router=info,tower_http=info")),
        )
        .init();

    let addr: SocketAddr = match std::env::var("FLIGHT_ROUTER_ADDR")
        .unwrap_or_else(|_| DEFAULT_ADDR.to_string())
        .parse()
    {
        Ok(addr) => addr,
        Err(e) => {
            error!(error = %e, "invalid FLIGHT_ROUTER_ADDR");
            process::exit(1);
        }
    };
    let data = std::env::var("FLIGHT_ROUTER_DATA").unwrap_or_else(|_| DEFAULT_DATA.to_string());

    let defaults = SearchConfig::default();
    let search_config = SearchConfig::new(
        env_or("FLIGHT_ROUTER_MAX_ROUTES", defaults.max_routes).max(1),
        defaults.max_spur_searches,
        defaults.fare_adjustment,
    );
    let cache_config = CacheConfig {
        ttl: Duration::from_secs(env_or(
            "FLIGHT_ROUTER_CACHE_TTL_SECS",
            CacheConfig::default().ttl.as_secs(),
        )),
        ..CacheConfig::default()
    };

    let source = JsonFileSource::new(&data);
    let service = match RoutingService::from_source(&source, search_config, &cache_config) {
        Ok(service) => service,
        Err(e) => {
            error!(error = %e, path = %data, "failed to load network");
            process::exit(1);
        }
    };
    let graph = service.snapshot();
    info!(
        airports = graph.airport_count(),
        flights = graph.flight_count(),
        path = %data,
        "network loaded"
    );

    let app = create_router(AppState::new(service));

    info!(%addr, "flight router listening");
    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
