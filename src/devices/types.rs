//! Common types and traits for device simulation components.

use rand::Rng;

/// Contextual information passed to devices during power calculations.
///
/// Carries the current timestep, the weather for that hour, and an optional
/// setpoint for controllable devices (the HVAC action or the battery's
/// requested flow).
#[derive(Debug, Clone, Copy, Default)]
pub struct DeviceContext {
    pub timestep: usize,
    pub outdoor_temp_c: f64,
    pub irradiance_w_m2: f64,
    pub setpoint: Option<f64>,
}

impl DeviceContext {
    /// Creates a context for `timestep` under the given weather, with no setpoint.
    pub fn new(timestep: usize, outdoor_temp_c: f64, irradiance_w_m2: f64) -> Self {
        Self {
            timestep,
            outdoor_temp_c,
            irradiance_w_m2,
            setpoint: None,
        }
    }

    /// Returns a copy of this context carrying `setpoint`.
    pub fn with_setpoint(self, setpoint: f64) -> Self {
        Self {
            setpoint: Some(setpoint),
            ..self
        }
    }
}

/// Trait defining a device that produces, consumes, or stores electricity.
///
/// Sign convention is device-specific and documented on each implementor;
/// the stepper works with magnitudes for loads and generation and a signed
/// flow for the battery (positive = charging).
pub trait Device {
    /// Returns the device power at the context's timestep.
    ///
    /// # Arguments
    ///
    /// * `context` - Timestep, weather, and optional setpoint
    fn power(&mut self, context: &DeviceContext) -> f64;

    /// Returns a human-readable type name for the device.
    fn device_type(&self) -> &'static str;
}

/// Generates Gaussian noise using the Box-Muller transform.
///
/// Returns `0.0` without consuming randomness when `std_dev <= 0`.
///
/// # Arguments
///
/// * `rng` - Random number generator
/// * `std_dev` - Standard deviation of the noise
pub fn gaussian_noise<R: Rng + ?Sized>(rng: &mut R, std_dev: f64) -> f64 {
    if std_dev <= 0.0 {
        return 0.0;
    }

    let u1: f64 = rng.random::<f64>().clamp(1e-12, 1.0);
    let u2: f64 = rng.random::<f64>();
    let z0 = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
    z0 * std_dev
}
