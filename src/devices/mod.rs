//! Device simulation components for the microgrid.

/// Non-HVAC building load.
pub mod baseload;
/// Shared battery storage model.
pub mod battery;
/// Heating/cooling unit and comfort proxy.
pub mod hvac;
/// Rooftop PV array.
pub mod solar;
pub mod types;

pub use baseload::BaseLoad;
pub use battery::Battery;
pub use hvac::{Hvac, comfort_score};
pub use solar::PvArray;
pub use types::Device;
pub use types::DeviceContext;
