//! Crate-level error types.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;
use crate::weather::WeatherError;

/// Errors returned by scenario loading and simulation setup.
///
/// Nothing here is raised mid-run: once an engine is built, every step
/// completes (controller failures are absorbed by the fallback policy).
#[derive(Debug, Error)]
pub enum Error {
    /// One or more configuration fields failed validation.
    #[error("invalid configuration:\n{}", join_config_errors(.0))]
    Config(Vec<ConfigError>),

    /// Weather series could not be built or loaded.
    #[error(transparent)]
    Weather(#[from] WeatherError),

    /// Reading a scenario or weather file failed.
    #[error("cannot read \"{path}\": {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The HTTP server could not start or stopped with an error.
    #[error("server error: {0}")]
    Server(#[source] io::Error),
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::Config(vec![err])
    }
}

fn join_config_errors(errors: &[ConfigError]) -> String {
    errors
        .iter()
        .map(|e| format!("  {e}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Convenience alias for results carrying [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
