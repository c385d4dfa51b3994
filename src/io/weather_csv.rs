//! CSV import of an hourly weather series.
//!
//! Expected layout, one row per hour:
//!
//! ```text
//! temperature_c,irradiance_w_m2
//! 4.8,0.0
//! 5.1,12.5
//! ```

use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::weather::{WeatherError, WeatherSeries};

#[derive(Debug, Deserialize)]
struct WeatherRow {
    temperature_c: f64,
    irradiance_w_m2: f64,
}

/// Loads a weather series from a CSV file.
///
/// # Errors
///
/// Returns `Error::Io` if the file cannot be opened and `Error::Weather` if a
/// row is malformed or the series is empty or non-finite.
pub fn read_weather_csv(path: &Path) -> Result<WeatherSeries> {
    let file = File::open(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let series = read_weather(file)?;
    tracing::info!(path = %path.display(), hours = series.len(), "loaded weather series");
    Ok(series)
}

/// Parses a weather series from any CSV reader.
///
/// # Errors
///
/// Returns a `WeatherError` if a row is malformed or the series is invalid.
pub fn read_weather<R: Read>(reader: R) -> std::result::Result<WeatherSeries, WeatherError> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

    let mut temperature_c = Vec::new();
    let mut irradiance_w_m2 = Vec::new();
    for row in rdr.deserialize::<WeatherRow>() {
        let row = row?;
        temperature_c.push(row.temperature_c);
        irradiance_w_m2.push(row.irradiance_w_m2);
    }

    WeatherSeries::new(temperature_c, irradiance_w_m2)
}
