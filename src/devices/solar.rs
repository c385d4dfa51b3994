use crate::devices::types::{Device, DeviceContext};

/// Areal conversion factor from irradiance × panel area to PV output.
pub const PV_AREAL_EFFICIENCY: f64 = 0.0002;

/// Rooftop PV array replicated across every building of the microgrid.
///
/// Output is linear in irradiance: `irradiance × area × 0.0002 × buildings`.
/// Returns a non-negative generation magnitude.
#[derive(Debug, Clone)]
pub struct PvArray {
    /// Panel area per building in m².
    pub area_m2: f64,

    /// Number of buildings carrying an identical array.
    pub building_count: usize,
}

impl PvArray {
    /// Creates a PV array.
    ///
    /// # Panics
    ///
    /// Panics if `area_m2` is negative or NaN.
    pub fn new(area_m2: f64, building_count: usize) -> Self {
        assert!(area_m2 >= 0.0, "PV area must be >= 0, got {area_m2}");
        Self {
            area_m2,
            building_count,
        }
    }
}

impl Device for PvArray {
    /// Aggregate generation for the context's irradiance.
    fn power(&mut self, context: &DeviceContext) -> f64 {
        context.irradiance_w_m2 * self.area_m2 * PV_AREAL_EFFICIENCY * self.building_count as f64
    }

    fn device_type(&self) -> &'static str {
        "PvArray"
    }
}
