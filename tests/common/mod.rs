//! Shared test fixtures for integration tests.

#![allow(dead_code)]

use microgrid_sim::devices::BaseLoad;
use microgrid_sim::sim::controller::{ControlError, Controller};
use microgrid_sim::sim::engine::Engine;
use microgrid_sim::sim::types::{ControlState, SimConfig};
use microgrid_sim::weather::{Season, WeatherGenerator, WeatherSeries};

/// Two buildings, one day, 22 °C target, 200 m² PV, 100 kWh / 25 kW
/// battery at half charge, trading off.
pub fn two_building_day() -> SimConfig {
    SimConfig {
        building_count: 2,
        horizon_hours: 24,
        temp_target_c: 22.0,
        pv_area_m2: 200.0,
        battery_capacity_kwh: 100.0,
        battery_power_kw: 25.0,
        initial_soc: 0.5,
        trading_enabled: false,
        ..SimConfig::default()
    }
}

/// Constant weather for `len` hours.
pub fn constant_weather(temp_c: f64, irradiance: f64, len: usize) -> WeatherSeries {
    WeatherSeries::constant(temp_c, irradiance, len).expect("constant weather should be valid")
}

/// Seeded seasonal weather, the same series for the same arguments.
pub fn seasonal_weather(season: Season, seed: u64) -> WeatherSeries {
    WeatherGenerator::new(48.8566, 2.3522, seed).generate(season)
}

/// Baseline load that always draws `value` per building.
pub fn fixed_base_load(value: f64) -> BaseLoad {
    BaseLoad::with_range(value, value, 0)
}

/// Controller implementing `clamp(0.5 × (target − outdoor), −1, 1)` by hand.
pub fn explicit_fallback(state: &ControlState, _step: usize) -> Result<f64, ControlError> {
    Ok((0.5 * (state.temp_target - state.outdoor_temp)).clamp(-1.0, 1.0))
}

/// Controller that fails on every step.
pub fn always_failing(_state: &ControlState, _step: usize) -> Result<f64, ControlError> {
    Err(ControlError::Failed("controller unavailable".to_string()))
}

/// Builds an engine and runs it to completion.
pub fn run<C: Controller>(
    config: SimConfig,
    weather: WeatherSeries,
    controller: C,
) -> Vec<microgrid_sim::sim::types::StepResult> {
    Engine::new(config, weather, controller).run()
}
