//! Request handlers for the API endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use super::AppState;
use super::types::{ErrorResponse, StateResponse, TelemetryQuery};
use crate::session::HistoryEntry;
use crate::sim::types::StepResult;

/// Returns simulation config, KPI report, run summary, fallback count, and latest step.
///
/// `GET /state` → 200 + `StateResponse` JSON
pub async fn get_state(State(state): State<Arc<AppState>>) -> Json<StateResponse> {
    let outcome = &state.outcome;
    Json(StateResponse {
        config: state.config.clone(),
        kpi: outcome.kpis.clone(),
        summary: outcome.summary.clone(),
        fallback_steps: outcome.fallback_steps,
        total_steps: outcome.results.len(),
        latest_step: outcome.latest().cloned(),
    })
}

/// Returns step results, optionally filtered by timestep range.
///
/// `GET /telemetry` → 200 + `Vec<StepResult>` JSON
/// `GET /telemetry?from=N&to=M` → filtered range (inclusive)
/// `GET /telemetry?from=10&to=5` → 400 + `ErrorResponse`
pub async fn get_telemetry(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TelemetryQuery>,
) -> impl IntoResponse {
    let from = query.from.unwrap_or(0);
    let to = query.to.unwrap_or(usize::MAX);

    if from > to {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: format!("`from` ({from}) must be <= `to` ({to})"),
            }),
        ));
    }

    let records: Vec<StepResult> = state
        .outcome
        .results
        .iter()
        .filter(|r| r.timestep >= from && r.timestep <= to)
        .cloned()
        .collect();

    Ok(Json(records))
}

/// Returns recorded run summaries, oldest first.
///
/// `GET /history` → 200 + `Vec<HistoryEntry>` JSON
pub async fn get_history(State(state): State<Arc<AppState>>) -> Json<Vec<HistoryEntry>> {
    Json(state.history.iter().cloned().collect())
}
