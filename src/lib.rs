//! Hourly microgrid simulator: buildings, rooftop PV, a shared battery, and
//! HVAC control driven by seasonal synthetic weather.
//!
//! The core ([`sim`], [`devices`], [`weather`]) is a pure function of its
//! inputs, seed included. [`runner`] wires it to a [`config::ScenarioConfig`];
//! [`session`], [`reporting`], and the optional `api` module belong to the
//! calling front end.

#[cfg(feature = "api")]
pub mod api;
pub mod config;
pub mod devices;
pub mod error;
/// Weather CSV input.
pub mod io;
pub mod reporting;
pub mod runner;
pub mod session;
/// Simulation engine, controllers, and KPIs.
pub mod sim;
pub mod telemetry;
pub mod weather;

pub use error::{Error, Result};
