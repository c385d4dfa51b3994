//! REST API for simulation state, telemetry, and run history.
//!
//! Provides three GET endpoints:
//! - `/state` - simulation config, KPI report, fallback count, and latest step
//! - `/telemetry` - full step results with optional range filtering
//! - `/history` - summaries of the runs recorded in the session

mod handlers;
mod types;

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::routing::get;

use crate::runner::SimulationOutcome;
use crate::session::History;
use crate::sim::types::SimConfig;

pub use types::{ErrorResponse, StateResponse, TelemetryQuery};

/// Immutable application state shared across all request handlers.
///
/// Constructed once after the simulation run completes and wrapped in
/// `Arc`, so no locks are needed.
pub struct AppState {
    /// Simulation configuration used for this run.
    pub config: SimConfig,
    /// Results, KPIs, and fallback count of the run being served.
    pub outcome: SimulationOutcome,
    /// Runs recorded so far in the session.
    pub history: History,
}

/// Builds the axum router with all API routes.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/state", get(handlers::get_state))
        .route("/telemetry", get(handlers::get_telemetry))
        .route("/history", get(handlers::get_history))
        .with_state(state)
}

/// Binds to `addr` and serves the API until Ctrl+C or SIGTERM.
///
/// # Errors
///
/// Returns an `io::Error` if the listener cannot bind or the server fails.
pub async fn serve(state: Arc<AppState>, addr: SocketAddr) -> io::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "API server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(crate::telemetry::shutdown_signal())
        .await
}
