/// Hourly clock and season selection.
pub mod clock;
pub mod controller;
pub mod engine;
/// Restricted formula language for custom controllers.
pub mod expr;
pub mod kpi;
pub mod power_balance;
pub mod summary;
pub mod types;
