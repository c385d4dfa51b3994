//! Simulation engine that orchestrates devices, controller, and power balance.

use crate::devices::{BaseLoad, Battery, Device, DeviceContext, Hvac, PvArray, comfort_score};
use crate::devices::battery::BATTERY_EFFICIENCY;
use crate::weather::WeatherSeries;

use super::clock::Clock;
use super::controller::{Controller, fallback_action};
use super::power_balance::{net_power, residual, traded_volume};
use super::types::{ControlState, SimConfig, StepResult};

/// Seed offset separating the baseline-load stream from the weather stream.
pub const BASE_LOAD_SEED_OFFSET: u64 = 1;

/// Simulation engine owning all devices, controller, weather, and configuration.
///
/// Generic over `C: Controller` for static dispatch. Holds typed device
/// fields rather than trait objects since the device set is fixed.
pub struct Engine<C: Controller> {
    config: SimConfig,
    weather: WeatherSeries,
    base_load: BaseLoad,
    pv: PvArray,
    hvac: Hvac,
    battery: Battery,
    controller: C,
    fallback_steps: usize,
}

impl<C: Controller> Engine<C> {
    /// Creates a new simulation engine.
    ///
    /// The battery is sized for the whole microgrid (per-building figures
    /// times `building_count`) and the baseline load is seeded from
    /// `config.seed + 1`.
    ///
    /// # Arguments
    ///
    /// * `config` - Resolved simulation configuration
    /// * `weather` - Hourly weather, indexed modulo its length
    /// * `controller` - HVAC control strategy
    ///
    /// # Panics
    ///
    /// Panics if the PV area or battery figures are negative, or `initial_soc`
    /// lies outside `[0, 1]`. [`ScenarioConfig::validate`](crate::config::ScenarioConfig::validate)
    /// rejects those values first.
    pub fn new(config: SimConfig, weather: WeatherSeries, controller: C) -> Self {
        let n = config.building_count;
        let base_load = BaseLoad::new(config.seed.wrapping_add(BASE_LOAD_SEED_OFFSET));
        let pv = PvArray::new(config.pv_area_m2, n);
        let hvac = Hvac::new(config.temp_target_c);
        let battery = Battery::new(
            config.total_battery_capacity(),
            config.total_battery_power(),
            config.initial_soc,
            BATTERY_EFFICIENCY,
        );

        Self {
            config,
            weather,
            base_load,
            pv,
            hvac,
            battery,
            controller,
            fallback_steps: 0,
        }
    }

    /// Replaces the baseline load model (e.g. a fixed draw for tests).
    pub fn with_base_load(mut self, base_load: BaseLoad) -> Self {
        self.base_load = base_load;
        self
    }

    /// Executes one simulation timestep and returns the result.
    ///
    /// # Arguments
    ///
    /// * `t` - Timestep index; weather is read at `t % weather.len()`
    pub fn step(&mut self, t: usize) -> StepResult {
        let n = self.config.building_count as f64;
        let (outdoor_temp_c, irradiance_w_m2) = self.weather.at(t);
        let context = DeviceContext::new(t, outdoor_temp_c, irradiance_w_m2);

        // 1. Controller decision, falling back on failure
        let state = ControlState::new(self.config.temp_target_c, outdoor_temp_c, irradiance_w_m2);
        let (action, used_fallback) = match self.controller.action(&state, t) {
            Ok(a) if a.is_finite() => (a.clamp(-1.0, 1.0), false),
            Ok(a) => {
                tracing::debug!(step = t, action = a, "non-finite action, using fallback");
                (fallback_action(&state), true)
            }
            Err(e) => {
                tracing::debug!(step = t, error = %e, "controller failed, using fallback");
                (fallback_action(&state), true)
            }
        };
        if used_fallback {
            self.fallback_steps += 1;
        }

        // 2. Demand and generation
        let hvac_per_building = self.hvac.power(&context.with_setpoint(action));
        let base_per_building = self.base_load.power(&context);
        let consumption = (hvac_per_building + base_per_building) * n;
        let pv = self.pv.power(&context);

        // 3. Battery absorbs what it can of the net power
        let net = net_power(pv, consumption);
        let battery_flow = self.battery.power(&context.with_setpoint(net));
        let residual = residual(net, battery_flow);

        // 4. Trading
        let (traded, trade_price) = if self.config.trading_enabled {
            (traded_volume(residual), self.config.trading_price)
        } else {
            (0.0, 0.0)
        };

        StepResult {
            timestep: t,
            outdoor_temp_c,
            irradiance_w_m2,
            action,
            used_fallback,
            consumption,
            pv,
            hvac: hvac_per_building * n,
            indoor_temp_c: self.hvac.indoor_temp_c(outdoor_temp_c, action),
            comfort: comfort_score(action),
            soc: self.battery.soc,
            battery_flow,
            traded,
            trade_price,
        }
    }

    /// Executes all timesteps and returns the complete step record vector.
    pub fn run(&mut self) -> Vec<StepResult> {
        let mut clock = Clock::new(self.config.total_steps());
        let mut results = Vec::with_capacity(self.config.total_steps());
        clock.run(|t| results.push(self.step(t)));

        if self.fallback_steps > 0 {
            tracing::warn!(
                fallback_steps = self.fallback_steps,
                total_steps = results.len(),
                "controller fell back to the fixed policy"
            );
        }
        results
    }

    /// Number of steps so far that used the fallback policy.
    pub fn fallback_steps(&self) -> usize {
        self.fallback_steps
    }

    /// Returns a reference to the battery.
    pub fn battery(&self) -> &Battery {
        &self.battery
    }

    /// Returns a reference to the simulation configuration.
    pub fn config(&self) -> &SimConfig {
        &self.config
    }
}
