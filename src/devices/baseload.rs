use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::devices::types::{Device, DeviceContext};

/// Lower bound of the per-building baseline load draw.
pub const BASELINE_MIN: f64 = 7.0;
/// Upper bound of the per-building baseline load draw.
pub const BASELINE_MAX: f64 = 13.0;

/// Non-HVAC building consumption (lighting, appliances, plug loads).
///
/// Each call draws one value uniformly from `[min, max]`, independent of the
/// hour. One draw is shared by every building in the same step.
///
/// # Examples
///
/// ```
/// use microgrid_sim::devices::{BaseLoad, Device, DeviceContext};
///
/// let mut load = BaseLoad::new(42);
/// let kw = load.power(&DeviceContext::new(0, 20.0, 0.0));
/// assert!((7.0..=13.0).contains(&kw));
/// ```
#[derive(Debug, Clone)]
pub struct BaseLoad {
    /// Minimum per-building baseline load.
    pub min: f64,

    /// Maximum per-building baseline load.
    pub max: f64,

    rng: StdRng,
}

impl BaseLoad {
    /// Creates a baseline load with the default `[7, 13]` range.
    ///
    /// # Arguments
    ///
    /// * `seed` - Random seed for reproducible draws
    pub fn new(seed: u64) -> Self {
        Self::with_range(BASELINE_MIN, BASELINE_MAX, seed)
    }

    /// Creates a baseline load drawing from `[min, max]`.
    ///
    /// # Panics
    ///
    /// Panics if `min > max` or either bound is negative.
    pub fn with_range(min: f64, max: f64, seed: u64) -> Self {
        assert!(min >= 0.0 && min <= max, "baseline range must satisfy 0 <= min <= max");
        Self {
            min,
            max,
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Device for BaseLoad {
    /// Returns one building's baseline consumption for this step.
    fn power(&mut self, _context: &DeviceContext) -> f64 {
        if self.min == self.max {
            return self.min;
        }
        self.rng.random_range(self.min..=self.max)
    }

    fn device_type(&self) -> &'static str {
        "BaseLoad"
    }
}
