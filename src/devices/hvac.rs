use crate::devices::types::{Device, DeviceContext};

/// HVAC electrical power per unit of control action, per building.
pub const HVAC_POWER_PER_ACTION: f64 = 10.0;
/// Fraction of the outdoor/target gap leaking into the indoor temperature proxy.
pub const ENVELOPE_LEAK: f64 = 0.05;
/// Indoor temperature shift per unit of control action (°C).
pub const ACTION_TEMP_GAIN_C: f64 = 1.5;

/// Per-building heating/cooling unit driven by a normalized action in `[-1, 1]`.
///
/// Positive actions heat, negative actions cool; electrical draw depends only
/// on the magnitude. The indoor temperature it reports is a display proxy, not
/// a thermal model.
#[derive(Debug, Clone)]
pub struct Hvac {
    /// Indoor temperature setpoint (°C).
    pub temp_target_c: f64,
}

impl Hvac {
    /// Creates an HVAC unit holding `temp_target_c`.
    pub fn new(temp_target_c: f64) -> Self {
        Self { temp_target_c }
    }

    /// Indoor temperature proxy for the given weather and action.
    ///
    /// `target + 0.05 × (outdoor − target) + 1.5 × action`
    pub fn indoor_temp_c(&self, outdoor_temp_c: f64, action: f64) -> f64 {
        self.temp_target_c
            + ENVELOPE_LEAK * (outdoor_temp_c - self.temp_target_c)
            + ACTION_TEMP_GAIN_C * action
    }
}

/// Occupant comfort proxy in `[0, 1]`: `max(0, 1 − |action| / 2)`.
///
/// Equals 1 exactly when the action is zero.
pub fn comfort_score(action: f64) -> f64 {
    (1.0 - action.abs() / 2.0).max(0.0)
}

impl Device for Hvac {
    /// Per-building electrical draw for the action carried as setpoint.
    fn power(&mut self, context: &DeviceContext) -> f64 {
        context.setpoint.unwrap_or(0.0).abs() * HVAC_POWER_PER_ACTION
    }

    fn device_type(&self) -> &'static str {
        "Hvac"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draw_depends_on_magnitude_only() {
        let mut hvac = Hvac::new(22.0);
        let ctx = DeviceContext::new(0, 5.0, 0.0);
        assert_eq!(hvac.power(&ctx.with_setpoint(0.5)), 5.0);
        assert_eq!(hvac.power(&ctx.with_setpoint(-0.5)), 5.0);
        assert_eq!(hvac.power(&ctx), 0.0);
    }

    #[test]
    fn indoor_proxy_formula() {
        let hvac = Hvac::new(22.0);
        // 22 + 0.05 × (2 − 22) + 1.5 × 1 = 22.5
        assert!((hvac.indoor_temp_c(2.0, 1.0) - 22.5).abs() < 1e-9);
        assert_eq!(hvac.indoor_temp_c(22.0, 0.0), 22.0);
    }

    #[test]
    fn comfort_bounds() {
        assert_eq!(comfort_score(0.0), 1.0);
        assert_eq!(comfort_score(1.0), 0.5);
        assert_eq!(comfort_score(-1.0), 0.5);
        assert_eq!(comfort_score(5.0), 0.0);
    }
}
