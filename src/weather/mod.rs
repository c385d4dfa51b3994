//! Hourly outdoor weather: seasonal synthetic generation and the series type
//! consumed by the stepper.

mod generator;
mod season;

pub use generator::{
    IRRADIANCE_NOISE_STD_W_M2, SEASON_DAYS, SERIES_LEN, TEMPERATURE_NOISE_STD_C, WeatherGenerator,
};
pub use season::{Season, SeasonProfile};

use serde::Serialize;
use thiserror::Error;

/// Errors raised while building or loading a weather series.
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("weather series is empty")]
    Empty,

    #[error("weather series lengths differ: {temperature} temperature vs {irradiance} irradiance samples")]
    LengthMismatch {
        temperature: usize,
        irradiance: usize,
    },

    #[error("weather sample {index} is not a finite number")]
    NonFinite { index: usize },

    #[error("weather sample {index} has negative irradiance {value} W/m²")]
    NegativeIrradiance { index: usize, value: f64 },

    #[error("unknown season \"{0}\", expected winter, spring, summer or autumn")]
    UnknownSeason(String),

    #[error("weather CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// Paired hourly outdoor temperature (°C) and irradiance (W/m²) samples.
///
/// Always non-empty with both sequences the same length. The stepper reads it
/// cyclically, so a horizon longer than the series wraps around.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherSeries {
    temperature_c: Vec<f64>,
    irradiance_w_m2: Vec<f64>,
}

impl WeatherSeries {
    /// Builds a series from two equal-length, non-empty, finite sequences.
    /// Irradiance must be non-negative.
    ///
    /// # Errors
    ///
    /// Returns a `WeatherError` if the sequences are empty, differ in length,
    /// contain NaN/infinite values, or contain negative irradiance.
    pub fn new(temperature_c: Vec<f64>, irradiance_w_m2: Vec<f64>) -> Result<Self, WeatherError> {
        if temperature_c.len() != irradiance_w_m2.len() {
            return Err(WeatherError::LengthMismatch {
                temperature: temperature_c.len(),
                irradiance: irradiance_w_m2.len(),
            });
        }
        if temperature_c.is_empty() {
            return Err(WeatherError::Empty);
        }
        if let Some(index) = temperature_c
            .iter()
            .zip(&irradiance_w_m2)
            .position(|(t, s)| !t.is_finite() || !s.is_finite())
        {
            return Err(WeatherError::NonFinite { index });
        }
        if let Some((index, &value)) = irradiance_w_m2.iter().enumerate().find(|(_, s)| **s < 0.0) {
            return Err(WeatherError::NegativeIrradiance { index, value });
        }
        Ok(Self {
            temperature_c,
            irradiance_w_m2,
        })
    }

    /// A series repeating the same conditions for `len` hours.
    ///
    /// # Errors
    ///
    /// Returns a `WeatherError` if `len` is zero, a value is not finite, or
    /// irradiance is negative.
    pub fn constant(
        temperature_c: f64,
        irradiance_w_m2: f64,
        len: usize,
    ) -> Result<Self, WeatherError> {
        Self::new(vec![temperature_c; len], vec![irradiance_w_m2; len])
    }

    /// Number of hourly samples.
    pub fn len(&self) -> usize {
        self.temperature_c.len()
    }

    /// Always `false`; construction rejects empty series.
    pub fn is_empty(&self) -> bool {
        self.temperature_c.is_empty()
    }

    /// Outdoor temperature samples (°C).
    pub fn temperature_c(&self) -> &[f64] {
        &self.temperature_c
    }

    /// Irradiance samples (W/m²).
    pub fn irradiance_w_m2(&self) -> &[f64] {
        &self.irradiance_w_m2
    }

    /// Returns `(temperature_c, irradiance_w_m2)` for `step`, wrapping modulo
    /// the series length.
    pub fn at(&self, step: usize) -> (f64, f64) {
        let i = step % self.len();
        (self.temperature_c[i], self.irradiance_w_m2[i])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_length_mismatch() {
        let err = WeatherSeries::new(vec![1.0, 2.0], vec![0.0]);
        assert!(matches!(
            err,
            Err(WeatherError::LengthMismatch {
                temperature: 2,
                irradiance: 1
            })
        ));
    }

    #[test]
    fn rejects_empty() {
        assert!(matches!(
            WeatherSeries::new(Vec::new(), Vec::new()),
            Err(WeatherError::Empty)
        ));
        assert!(WeatherSeries::constant(20.0, 0.0, 0).is_err());
    }

    #[test]
    fn rejects_non_finite_sample() {
        let err = WeatherSeries::new(vec![1.0, f64::NAN], vec![0.0, 0.0]);
        assert!(matches!(err, Err(WeatherError::NonFinite { index: 1 })));
    }

    #[test]
    fn rejects_negative_irradiance() {
        let err = WeatherSeries::new(vec![1.0, 2.0, 3.0], vec![0.0, -5.0, -1.0]);
        assert!(matches!(
            err,
            Err(WeatherError::NegativeIrradiance { index: 1, value }) if value == -5.0
        ));
        assert!(WeatherSeries::constant(20.0, -0.1, 3).is_err());
        // negative temperatures are fine
        assert!(WeatherSeries::constant(-20.0, 0.0, 3).is_ok());
    }

    #[test]
    fn at_wraps_around() {
        let series = WeatherSeries::new(vec![1.0, 2.0, 3.0], vec![10.0, 20.0, 30.0]);
        let series = series.ok();
        assert_eq!(series.as_ref().map(|s| s.at(0)), Some((1.0, 10.0)));
        assert_eq!(series.as_ref().map(|s| s.at(4)), Some((2.0, 20.0)));
        assert_eq!(series.as_ref().map(|s| s.at(3)), Some((1.0, 10.0)));
    }
}
