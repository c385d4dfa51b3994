//! API response and query types.

use serde::{Deserialize, Serialize};

use crate::sim::kpi::KpiReport;
use crate::sim::summary::RunSummary;
use crate::sim::types::{SimConfig, StepResult};

/// Combined state response: config, KPIs, run summary, and latest step.
#[derive(Debug, Serialize)]
pub struct StateResponse {
    /// Simulation configuration.
    pub config: SimConfig,
    /// Aggregate KPI report.
    pub kpi: KpiReport,
    /// Self-sufficiency, battery trajectory, and trading figures.
    pub summary: RunSummary,
    /// Steps that used the fallback policy.
    pub fallback_steps: usize,
    /// Number of simulated steps.
    pub total_steps: usize,
    /// Most recent step, `null` for an empty run.
    pub latest_step: Option<StepResult>,
}

/// Optional range query parameters for the telemetry endpoint.
#[derive(Debug, Deserialize)]
pub struct TelemetryQuery {
    /// Start timestep (inclusive).
    pub from: Option<usize>,
    /// End timestep (inclusive).
    pub to: Option<usize>,
}

/// Error response body for 400-class errors.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub error: String,
}
