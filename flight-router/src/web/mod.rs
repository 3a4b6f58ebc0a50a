//! Web layer for the flight router.
//!
//! JSON endpoints for route search, algorithm comparison, disruptions and
//! network monitoring.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
