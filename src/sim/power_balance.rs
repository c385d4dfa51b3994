//! Microgrid power balance computation.
//!
//! Sign convention: positive net power is a surplus (PV exceeds demand),
//! positive battery flow is charging.

/// Net power before the battery acts: `pv − consumption`.
pub fn net_power(pv: f64, consumption: f64) -> f64 {
    pv - consumption
}

/// What remains of `net` after the battery absorbed or supplied `flow`.
pub fn residual(net: f64, flow: f64) -> f64 {
    net - flow
}

/// Traded volume for a residual.
///
/// `min(max(r, 0), max(−r, 0))`, which is zero for every real `r`: the
/// surplus and deficit sides of a single residual are never both positive.
/// Kept as a hook so a multi-party market can replace it without touching
/// the engine.
pub fn traded_volume(residual: f64) -> f64 {
    residual.max(0.0).min((-residual).max(0.0))
}
