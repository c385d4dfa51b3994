//! File input for externally supplied data.

pub mod weather_csv;
