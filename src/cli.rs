//! CLI argument definitions using clap.

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};

use microgrid_sim::config::ScenarioConfig;
use microgrid_sim::error::Result;

#[derive(Debug, Parser)]
#[command(name = "microgrid-sim")]
#[command(author, version, about = "Hourly microgrid simulator: buildings, PV, battery, HVAC")]
#[command(
    long_about = "Simulates a small microgrid hour by hour and reports cost, PV yield,\n\
    consumption, comfort, and CO2 savings.\n\
    \nExamples:\n  \
    microgrid-sim run                                # default preset\n  \
    microgrid-sim run --preset summer_solar --steps  # print every hour\n  \
    microgrid-sim run --scenario site.toml --weather-csv july.csv\n  \
    microgrid-sim batch                              # every preset, then the history table"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run a single scenario and print its KPI report
    Run(RunArgs),

    /// Run several scenarios back to back and print the run history
    Batch(BatchArgs),
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Scenario TOML file
    #[arg(long, conflicts_with = "preset")]
    pub scenario: Option<PathBuf>,

    /// Built-in preset (default, summer_solar, no_storage)
    #[arg(long)]
    pub preset: Option<String>,

    /// Override the scenario's random seed
    #[arg(long)]
    pub seed: Option<u64>,

    /// Hourly weather CSV (temperature_c,irradiance_w_m2) replacing the generator
    #[arg(long)]
    pub weather_csv: Option<PathBuf>,

    /// Print one line per simulated hour
    #[arg(long, default_value_t = false)]
    pub steps: bool,

    /// Serve the result over HTTP after the run
    #[cfg(feature = "api")]
    #[arg(long, default_value_t = false)]
    pub serve: bool,

    /// API server port
    #[cfg(feature = "api")]
    #[arg(long, default_value_t = 3000)]
    pub port: u16,
}

#[derive(Debug, Args)]
pub struct BatchArgs {
    /// Preset to include (repeatable)
    #[arg(long = "preset")]
    pub presets: Vec<String>,

    /// Scenario file to include (repeatable)
    #[arg(long = "scenario")]
    pub scenarios: Vec<PathBuf>,

    /// Override every scenario's random seed
    #[arg(long)]
    pub seed: Option<u64>,
}

/// Where a scenario comes from, with the label used in reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScenarioSource {
    Preset(String),
    File(PathBuf),
}

impl ScenarioSource {
    pub fn label(&self) -> String {
        match self {
            Self::Preset(name) => name.clone(),
            Self::File(path) => file_label(path),
        }
    }

    /// Loads the scenario and applies a seed override.
    pub fn load(&self, seed: Option<u64>) -> Result<ScenarioConfig> {
        let mut scenario = match self {
            Self::Preset(name) => ScenarioConfig::from_preset(name)?,
            Self::File(path) => ScenarioConfig::from_toml_file(path)?,
        };
        if let Some(seed) = seed {
            scenario.simulation.seed = seed;
        }
        Ok(scenario)
    }
}

fn file_label(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

impl RunArgs {
    /// Scenario file wins over preset; neither means the default preset.
    pub fn source(&self) -> ScenarioSource {
        match (&self.scenario, &self.preset) {
            (Some(path), _) => ScenarioSource::File(path.clone()),
            (None, Some(name)) => ScenarioSource::Preset(name.clone()),
            (None, None) => ScenarioSource::Preset("default".to_string()),
        }
    }
}

impl BatchArgs {
    /// Presets first, then files; every built-in preset when none are given.
    pub fn sources(&self) -> Vec<ScenarioSource> {
        if self.presets.is_empty() && self.scenarios.is_empty() {
            return ScenarioConfig::PRESETS
                .iter()
                .map(|p| ScenarioSource::Preset((*p).to_string()))
                .collect();
        }
        self.presets
            .iter()
            .cloned()
            .map(ScenarioSource::Preset)
            .chain(self.scenarios.iter().cloned().map(ScenarioSource::File))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("microgrid-sim").chain(args.iter().copied()))
            .expect("parse should succeed")
    }

    #[test]
    fn run_defaults_to_default_preset() {
        let Command::Run(args) = parse(&["run"]).command else {
            panic!("expected run");
        };
        assert_eq!(args.source(), ScenarioSource::Preset("default".into()));
        assert!(!args.steps);
        assert!(args.seed.is_none());
    }

    #[test]
    fn run_with_scenario_and_options() {
        let Command::Run(args) = parse(&[
            "run",
            "--scenario",
            "site.toml",
            "--seed",
            "9",
            "--weather-csv",
            "w.csv",
            "--steps",
        ])
        .command
        else {
            panic!("expected run");
        };
        assert_eq!(args.source(), ScenarioSource::File("site.toml".into()));
        assert_eq!(args.source().label(), "site");
        assert_eq!(args.seed, Some(9));
        assert_eq!(args.weather_csv.as_deref(), Some(Path::new("w.csv")));
        assert!(args.steps);
    }

    #[test]
    fn scenario_and_preset_conflict() {
        let res = Cli::try_parse_from(["microgrid-sim", "run", "--scenario", "a.toml", "--preset", "default"]);
        assert!(res.is_err());
    }

    #[test]
    fn batch_defaults_to_all_presets() {
        let Command::Batch(args) = parse(&["batch"]).command else {
            panic!("expected batch");
        };
        let labels: Vec<String> = args.sources().iter().map(ScenarioSource::label).collect();
        assert_eq!(labels, ScenarioConfig::PRESETS);
    }

    #[test]
    fn batch_keeps_presets_then_files() {
        let Command::Batch(args) = parse(&[
            "batch",
            "--scenario",
            "x.toml",
            "--preset",
            "no_storage",
            "--preset",
            "default",
        ])
        .command
        else {
            panic!("expected batch");
        };
        assert_eq!(
            args.sources(),
            vec![
                ScenarioSource::Preset("no_storage".into()),
                ScenarioSource::Preset("default".into()),
                ScenarioSource::File("x.toml".into()),
            ]
        );
    }

    #[test]
    fn unknown_preset_fails_to_load() {
        let err = ScenarioSource::Preset("nope".into()).load(None);
        assert!(err.is_err());
    }

    #[test]
    fn seed_override_applies() {
        let cfg = ScenarioSource::Preset("default".into()).load(Some(5)).ok();
        assert_eq!(cfg.map(|c| c.simulation.seed), Some(5));
    }
}
