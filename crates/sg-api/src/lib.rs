//! sqlmap Gate API Server
//!
//! Router and shared state, kept in a library so integration tests can drive
//! the full stack without binding a socket.

pub mod client_ip;
pub mod config;
pub mod error;
pub mod logging;
pub mod rate_limit;
pub mod routes;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use sg_core::ScanGate;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub use config::ServerConfig;
pub use error::{ApiError, ServerError};
pub use rate_limit::RateLimit;

/// Application state shared across handlers
pub struct AppState {
    pub gate: ScanGate,
    /// Applies to every route except `/run_sqlmap`
    pub default_limit: RateLimit,
    /// Replaces the default limit on `/run_sqlmap`
    pub scan_limit: RateLimit,
}

impl AppState {
    pub fn new(gate: ScanGate, default_per_minute: u32, scan_per_minute: u32) -> Result<Self, ServerError> {
        Ok(Self {
            gate,
            default_limit: RateLimit::per_minute(default_per_minute)?,
            scan_limit: RateLimit::per_minute(scan_per_minute)?,
        })
    }
}

pub fn build_router(state: Arc<AppState>) -> Router {
    let scan_routes = Router::new()
        .route("/run_sqlmap", post(routes::scans::run_sqlmap))
        .route_layer(middleware::from_fn_with_state(
            state.scan_limit.clone(),
            rate_limit::enforce,
        ));

    Router::new()
        .route("/", get(routes::index))
        .route("/targets", get(routes::targets::list_targets))
        .route("/health", get(routes::health_check))
        .route_layer(middleware::from_fn_with_state(
            state.default_limit.clone(),
            rate_limit::enforce,
        ))
        .merge(scan_routes)
        // No CORS layer: only the page served from `/` may read scan output
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
