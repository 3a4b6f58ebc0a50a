//! Application state for the web layer.

use std::sync::Arc;

use crate::service::RoutingService;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Routing service over the current network
    pub service: Arc<RoutingService>,
}

impl AppState {
    /// Create a new app state.
    pub fn new(service: RoutingService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}
