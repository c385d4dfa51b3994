use crate::devices::types::{Device, DeviceContext};

/// Efficiency applied on both charge and discharge.
pub const BATTERY_EFFICIENCY: f64 = 0.95;

/// Shared community battery sized for the whole microgrid.
///
/// State of charge is kept in energy units, not as a fraction. Each step the
/// requested flow is clamped to the power limit and the stored energy moves by
/// `flow × η` when charging or `flow / η` when discharging, then is clamped to
/// `[0, capacity]`.
///
/// The flow itself is limited by power only. A full battery still reports
/// the clamped charging flow while its stored energy stays at capacity, and
/// an empty one still reports the discharging flow.
///
/// # Power Flow Convention
/// - Positive flow: charging (absorbing surplus)
/// - Negative flow: discharging (covering a deficit)
#[derive(Debug, Clone)]
pub struct Battery {
    /// Energy capacity.
    pub capacity: f64,

    /// Stored energy, in `[0, capacity]`.
    pub soc: f64,

    /// Maximum charge or discharge power (positive magnitude).
    pub max_power: f64,

    /// Charge/discharge efficiency (0..1.0].
    pub efficiency: f64,
}

impl Battery {
    /// Creates a battery holding `initial_soc × capacity`.
    ///
    /// # Arguments
    ///
    /// * `capacity` - Energy capacity (>= 0; zero disables storage)
    /// * `max_power` - Power limit (>= 0)
    /// * `initial_soc` - Initial state of charge as a fraction (0.0 to 1.0)
    /// * `efficiency` - Charge/discharge efficiency (0..1.0]
    ///
    /// # Panics
    ///
    /// Panics if capacity or power is negative, the SOC fraction is out of
    /// range, or the efficiency is invalid.
    pub fn new(capacity: f64, max_power: f64, initial_soc: f64, efficiency: f64) -> Self {
        assert!(capacity >= 0.0);
        assert!(max_power >= 0.0);
        assert!((0.0..=1.0).contains(&initial_soc));
        assert!(efficiency > 0.0 && efficiency <= 1.0);

        Self {
            capacity,
            soc: initial_soc * capacity,
            max_power,
            efficiency,
        }
    }

    /// Clamps a requested flow to the power limit.
    pub fn clamp_flow(&self, requested: f64) -> f64 {
        requested.clamp(-self.max_power, self.max_power)
    }
}

impl Device for Battery {
    /// Applies the setpoint (the microgrid's net power) and returns the flow.
    fn power(&mut self, context: &DeviceContext) -> f64 {
        let flow = self.clamp_flow(context.setpoint.unwrap_or(0.0));

        let delta = if flow > 0.0 {
            flow * self.efficiency
        } else {
            flow / self.efficiency
        };
        self.soc = (self.soc + delta).clamp(0.0, self.capacity);

        flow
    }

    fn device_type(&self) -> &'static str {
        "Battery"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(battery: &mut Battery, setpoint: f64) -> f64 {
        battery.power(&DeviceContext::new(0, 20.0, 0.0).with_setpoint(setpoint))
    }

    #[test]
    fn test_new_battery() {
        let battery = Battery::new(200.0, 50.0, 0.5, 0.95);
        assert_eq!(battery.capacity, 200.0);
        assert_eq!(battery.soc, 100.0);
        assert_eq!(battery.max_power, 50.0);
    }

    #[test]
    fn zero_capacity_is_allowed() {
        let mut battery = Battery::new(0.0, 10.0, 0.5, 0.95);
        assert_eq!(request(&mut battery, 5.0), 5.0);
        assert_eq!(battery.soc, 0.0);
    }

    #[test]
    #[should_panic]
    fn test_invalid_soc_high() {
        Battery::new(10.0, 5.0, 1.1, 0.95);
    }

    #[test]
    #[should_panic]
    fn test_negative_power() {
        Battery::new(10.0, -5.0, 0.5, 0.95);
    }

    #[test]
    fn test_charge_power_limit() {
        let mut battery = Battery::new(100.0, 5.0, 0.5, 1.0);
        assert_eq!(request(&mut battery, 10.0), 5.0);
        assert_eq!(battery.soc, 55.0);
    }

    #[test]
    fn test_discharge_power_limit() {
        let mut battery = Battery::new(100.0, 5.0, 0.5, 1.0);
        assert_eq!(request(&mut battery, -10.0), -5.0);
        assert_eq!(battery.soc, 45.0);
    }

    #[test]
    fn test_efficiency_charge_and_discharge() {
        let mut battery = Battery::new(100.0, 50.0, 0.5, 0.95);
        request(&mut battery, 10.0);
        assert!((battery.soc - 59.5).abs() < 1e-9);

        let mut battery = Battery::new(100.0, 50.0, 0.5, 0.95);
        request(&mut battery, -9.5);
        assert!((battery.soc - 40.0).abs() < 1e-9);
    }

    #[test]
    fn soc_clamped_at_bounds_but_flow_reported() {
        let mut battery = Battery::new(10.0, 50.0, 0.9, 0.95);
        assert_eq!(request(&mut battery, 20.0), 20.0);
        assert_eq!(battery.soc, 10.0);

        let mut battery = Battery::new(10.0, 50.0, 0.1, 0.95);
        assert_eq!(request(&mut battery, -20.0), -20.0);
        assert_eq!(battery.soc, 0.0);
    }

    #[test]
    fn no_setpoint_is_idle() {
        let mut battery = Battery::new(10.0, 5.0, 0.5, 0.95);
        let flow = battery.power(&DeviceContext::new(0, 20.0, 0.0));
        assert_eq!(flow, 0.0);
        assert_eq!(battery.soc, 5.0);
    }
}
