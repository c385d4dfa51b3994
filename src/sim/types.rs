//! Core simulation types: configuration, controller inputs, and step data.

use std::fmt;

use serde::Serialize;

use crate::weather::Season;

/// Resolved, immutable configuration of one simulation run.
///
/// Built from a [`ScenarioConfig`](crate::config::ScenarioConfig) by the
/// runner, or directly by library callers. Battery figures are per building;
/// the engine scales them by `building_count`.
///
/// # Examples
///
/// ```
/// use microgrid_sim::sim::types::SimConfig;
///
/// let cfg = SimConfig::default();
/// assert_eq!(cfg.building_count, 2);
/// assert_eq!(cfg.total_steps(), 168);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimConfig {
    /// Number of identical buildings in the microgrid.
    pub building_count: usize,
    /// Simulated horizon in hourly steps.
    pub horizon_hours: usize,
    /// Indoor temperature target (°C).
    pub temp_target_c: f64,
    /// PV panel area per building (m²).
    pub pv_area_m2: f64,
    /// Battery energy capacity per building.
    pub battery_capacity_kwh: f64,
    /// Battery power limit per building.
    pub battery_power_kw: f64,
    /// Initial state of charge as a fraction of capacity.
    pub initial_soc: f64,
    /// Whether peer-to-peer trading is active.
    pub trading_enabled: bool,
    /// Trading price reported on each row when trading is active.
    pub trading_price: f64,
    /// Site latitude (accepted by the weather generator, not used).
    pub latitude: f64,
    /// Site longitude (accepted by the weather generator, not used).
    pub longitude: f64,
    /// Weather season.
    pub season: Season,
    /// Master random seed.
    pub seed: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            building_count: 2,
            horizon_hours: 168,
            temp_target_c: 22.0,
            pv_area_m2: 200.0,
            battery_capacity_kwh: 100.0,
            battery_power_kw: 25.0,
            initial_soc: 0.5,
            trading_enabled: true,
            trading_price: 0.12,
            latitude: 48.8566,
            longitude: 2.3522,
            season: Season::Winter,
            seed: 42,
        }
    }
}

impl SimConfig {
    /// Total number of simulation steps.
    pub fn total_steps(&self) -> usize {
        self.horizon_hours
    }

    /// Aggregate battery capacity across all buildings.
    pub fn total_battery_capacity(&self) -> f64 {
        self.battery_capacity_kwh * self.building_count as f64
    }

    /// Aggregate battery power limit across all buildings.
    pub fn total_battery_power(&self) -> f64 {
        self.battery_power_kw * self.building_count as f64
    }
}

/// Observations handed to the controller each step.
///
/// `current_temp` always equals `temp_target`: there is no thermal state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ControlState {
    pub temp_target: f64,
    pub current_temp: f64,
    pub outdoor_temp: f64,
    /// Irradiance (W/m²).
    pub solar: f64,
}

impl ControlState {
    /// Builds a state whose current temperature sits at the target.
    pub fn new(temp_target: f64, outdoor_temp: f64, solar: f64) -> Self {
        Self {
            temp_target,
            current_temp: temp_target,
            outdoor_temp,
            solar,
        }
    }
}

/// Complete record of one simulation timestep.
///
/// Consumption, HVAC, and PV are aggregated over all buildings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepResult {
    /// Timestep index (hour of horizon).
    pub timestep: usize,
    /// Outdoor temperature (°C).
    pub outdoor_temp_c: f64,
    /// Irradiance (W/m²).
    pub irradiance_w_m2: f64,
    /// Control action actually applied, in `[-1, 1]`.
    pub action: f64,
    /// Whether the fixed fallback policy replaced the controller this step.
    pub used_fallback: bool,
    /// Total consumption (HVAC plus baseline).
    pub consumption: f64,
    /// PV production.
    pub pv: f64,
    /// HVAC electrical draw.
    pub hvac: f64,
    /// Indoor temperature proxy (°C).
    pub indoor_temp_c: f64,
    /// Comfort score in `[0, 1]`.
    pub comfort: f64,
    /// Battery stored energy after this step.
    pub soc: f64,
    /// Battery flow (positive charging, negative discharging).
    pub battery_flow: f64,
    /// Traded energy.
    pub traded: f64,
    /// Trading price (zero when trading is disabled).
    pub trade_price: f64,
}

impl fmt::Display for StepResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "t={:>4} | out={:>6.2}°C irr={:>6.1} | a={:>5.2}{} | cons={:>7.2} \
             pv={:>7.2} hvac={:>6.2} | in={:>5.2}°C comfort={:.3} | soc={:>7.2} \
             flow={:>7.2} | trade={:.2}@{:.2}",
            self.timestep,
            self.outdoor_temp_c,
            self.irradiance_w_m2,
            self.action,
            if self.used_fallback { "*" } else { " " },
            self.consumption,
            self.pv,
            self.hvac,
            self.indoor_temp_c,
            self.comfort,
            self.soc,
            self.battery_flow,
            self.traded,
            self.trade_price,
        )
    }
}
