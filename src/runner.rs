//! Builds engines from scenario configurations and runs them to completion.

use serde::Serialize;

use crate::config::ScenarioConfig;
use crate::error::Result;
use crate::sim::controller::{Controller, ScenarioController};
use crate::sim::engine::Engine;
use crate::sim::kpi::KpiReport;
use crate::sim::summary::RunSummary;
use crate::sim::types::{SimConfig, StepResult};
use crate::weather::{WeatherGenerator, WeatherSeries};

/// Everything a finished run produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationOutcome {
    /// One row per simulated hour.
    pub results: Vec<StepResult>,
    pub kpis: KpiReport,
    pub summary: RunSummary,
    /// Steps where the controller failed and the fixed policy was applied.
    pub fallback_steps: usize,
}

impl SimulationOutcome {
    /// Last simulated step, if any.
    pub fn latest(&self) -> Option<&StepResult> {
        self.results.last()
    }
}

/// Runs `controller` over `weather` for the configured horizon.
///
/// A pure function of its arguments: identical inputs give identical outcomes.
pub fn simulate<C: Controller>(
    config: SimConfig,
    weather: WeatherSeries,
    controller: C,
) -> SimulationOutcome {
    let mut engine = Engine::new(config, weather, controller);
    let results = engine.run();
    let kpis = KpiReport::from_results(&results);
    let summary = RunSummary::from_results(&results, engine.config().total_battery_capacity());
    SimulationOutcome {
        fallback_steps: engine.fallback_steps(),
        results,
        kpis,
        summary,
    }
}

/// Generates the seasonal weather series for `config`, seeded from `config.seed`.
pub fn generate_weather(config: &SimConfig) -> WeatherSeries {
    WeatherGenerator::new(config.latitude, config.longitude, config.seed).generate(config.season)
}

/// Validates a scenario, generates its weather, and runs it.
///
/// # Errors
///
/// Returns `Error::Config` if the scenario fails validation.
pub fn run_scenario(scenario: &ScenarioConfig) -> Result<SimulationOutcome> {
    let config = scenario.to_sim_config()?;
    let weather = generate_weather(&config);
    Ok(run_config(scenario, config, weather))
}

/// Like [`run_scenario`] but with an injected weather series.
///
/// # Errors
///
/// Returns `Error::Config` if the scenario fails validation.
pub fn run_with_weather(
    scenario: &ScenarioConfig,
    weather: WeatherSeries,
) -> Result<SimulationOutcome> {
    let config = scenario.to_sim_config()?;
    Ok(run_config(scenario, config, weather))
}

fn run_config(
    scenario: &ScenarioConfig,
    config: SimConfig,
    weather: WeatherSeries,
) -> SimulationOutcome {
    let controller = ScenarioController::from_config(&scenario.controller);
    tracing::info!(
        buildings = config.building_count,
        horizon_hours = config.horizon_hours,
        season = %config.season,
        seed = config.seed,
        controller = controller.name(),
        "running scenario"
    );
    simulate(config, weather, controller)
}
