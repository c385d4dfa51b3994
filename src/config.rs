//! TOML-based scenario configuration and preset definitions.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::Error;
use crate::sim::clock::resolve_season;
use crate::sim::types::SimConfig;
use crate::weather::Season;

/// Top-level scenario configuration parsed from TOML.
///
/// All fields have defaults matching the `default` preset. Load from
/// TOML with [`ScenarioConfig::from_toml_file`] or pick a built-in with
/// [`ScenarioConfig::from_preset`].
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    /// Horizon, buildings, seed, and season selection.
    #[serde(default)]
    pub simulation: SimulationConfig,
    /// Site location and market.
    #[serde(default)]
    pub site: SiteConfig,
    /// Indoor comfort target.
    #[serde(default)]
    pub comfort: ComfortConfig,
    /// Rooftop PV parameters.
    #[serde(default)]
    pub pv: PvConfig,
    /// Battery storage parameters (per building).
    #[serde(default)]
    pub battery: BatteryConfig,
    /// Peer-to-peer trading parameters.
    #[serde(default)]
    pub trading: TradingConfig,
    /// HVAC control strategy.
    #[serde(default)]
    pub controller: ControllerConfig,
}

/// Horizon, buildings, seed, and season selection.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Selected building identifiers; only the count enters the physics.
    pub buildings: Vec<String>,
    /// Simulated horizon in hours (must be > 0).
    pub horizon_hours: usize,
    /// Master random seed.
    pub seed: u64,
    /// Season tag (`winter`, `spring`, `summer`, `autumn`). Takes precedence
    /// over `start_date`.
    pub season: Option<String>,
    /// First simulated day as `YYYY-MM-DD`; its month selects the season
    /// when `season` is unset.
    pub start_date: Option<String>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            buildings: vec!["A".to_string(), "B".to_string()],
            horizon_hours: 168,
            seed: 42,
            season: None,
            start_date: None,
        }
    }
}

/// Site location and market.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
    /// ISO 3166 alpha-2 country code, used for currency display.
    pub country_code: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            latitude: 48.8566,
            longitude: 2.3522,
            country_code: "FR".to_string(),
        }
    }
}

/// Indoor comfort target.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ComfortConfig {
    /// Indoor temperature target (°C).
    pub temp_target_c: f64,
}

impl Default for ComfortConfig {
    fn default() -> Self {
        Self {
            temp_target_c: 22.0,
        }
    }
}

/// Rooftop PV parameters.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct PvConfig {
    /// Panel area per building (m²).
    pub area_m2: f64,
}

impl Default for PvConfig {
    fn default() -> Self {
        Self { area_m2: 200.0 }
    }
}

/// Battery storage parameters (per building).
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct BatteryConfig {
    /// Energy capacity (kWh, >= 0).
    pub capacity_kwh: f64,
    /// Charge/discharge power limit (kW, >= 0).
    pub power_kw: f64,
    /// Initial state of charge (0.0–1.0).
    pub initial_soc: f64,
}

impl Default for BatteryConfig {
    fn default() -> Self {
        Self {
            capacity_kwh: 100.0,
            power_kw: 25.0,
            initial_soc: 0.5,
        }
    }
}

/// Peer-to-peer trading parameters.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct TradingConfig {
    /// Whether trading is active.
    pub enabled: bool,
    /// Price reported per traded unit.
    pub price_per_kwh: f64,
}

impl Default for TradingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            price_per_kwh: 0.12,
        }
    }
}

/// HVAC control strategy.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ControllerConfig {
    /// Controller kind: `"proportional"`, `"fallback"`, or `"formula"`.
    pub kind: String,
    /// Gain of the proportional controller.
    pub gain: f64,
    /// Formula source for the `formula` kind.
    pub formula: Option<String>,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            kind: "proportional".to_string(),
            gain: 0.6,
            formula: None,
        }
    }
}

impl ControllerConfig {
    /// Accepted values of `kind`.
    pub const KINDS: &[&str] = &["proportional", "fallback", "formula"];
}

/// Configuration error with field path and constraint description.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("config error: {field}: {message}")]
pub struct ConfigError {
    /// Dotted field path (e.g., `"simulation.horizon_hours"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl ConfigError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl ScenarioConfig {
    /// Returns a sunny summer week for three buildings with a larger array.
    pub fn summer_solar() -> Self {
        Self {
            simulation: SimulationConfig {
                buildings: vec!["A".to_string(), "B".to_string(), "C".to_string()],
                season: Some("summer".to_string()),
                ..SimulationConfig::default()
            },
            pv: PvConfig { area_m2: 300.0 },
            ..Self::default()
        }
    }

    /// Returns the default scenario without storage or trading.
    pub fn no_storage() -> Self {
        Self {
            battery: BatteryConfig {
                capacity_kwh: 0.0,
                power_kw: 0.0,
                initial_soc: 0.0,
            },
            trading: TradingConfig {
                enabled: false,
                ..TradingConfig::default()
            },
            ..Self::default()
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["default", "summer_solar", "no_storage"];

    /// Loads a scenario from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "default" => Ok(Self::default()),
            "summer_solar" => Ok(Self::summer_solar()),
            "no_storage" => Ok(Self::no_storage()),
            _ => Err(ConfigError::new(
                "preset",
                format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            )),
        }
    }

    /// Parses a scenario from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the file cannot be read and `Error::Config` if
    /// the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, Error> {
        let content = fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_toml_str(&content)?)
    }

    /// Parses a scenario from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::new("toml", e.to_string()))
    }

    /// Number of buildings in the microgrid.
    pub fn building_count(&self) -> usize {
        self.simulation.buildings.len()
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid. A formula that does
    /// not parse is not reported here: the run proceeds on the fallback policy.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let mut check = |ok: bool, field: &str, message: &str| {
            if !ok {
                errors.push(ConfigError::new(field, message));
            }
        };

        let s = &self.simulation;
        check(
            !s.buildings.is_empty(),
            "simulation.buildings",
            "must select at least one building",
        );
        check(
            s.buildings.iter().all(|b| !b.trim().is_empty()),
            "simulation.buildings",
            "building names must not be empty",
        );
        let mut seen = HashSet::new();
        check(
            s.buildings.iter().all(|b| seen.insert(b.as_str())),
            "simulation.buildings",
            "building names must be unique",
        );
        check(s.horizon_hours > 0, "simulation.horizon_hours", "must be > 0");

        let site = &self.site;
        check(
            (-90.0..=90.0).contains(&site.latitude),
            "site.latitude",
            "must be in [-90, 90]",
        );
        check(
            (-180.0..=180.0).contains(&site.longitude),
            "site.longitude",
            "must be in [-180, 180]",
        );
        check(
            site.country_code.len() == 2 && site.country_code.chars().all(|c| c.is_ascii_alphabetic()),
            "site.country_code",
            "must be a two-letter code",
        );

        check(
            self.comfort.temp_target_c.is_finite(),
            "comfort.temp_target_c",
            "must be finite",
        );
        check(
            self.pv.area_m2.is_finite() && self.pv.area_m2 >= 0.0,
            "pv.area_m2",
            "must be >= 0",
        );

        let bat = &self.battery;
        check(
            bat.capacity_kwh.is_finite() && bat.capacity_kwh >= 0.0,
            "battery.capacity_kwh",
            "must be >= 0",
        );
        check(
            bat.power_kw.is_finite() && bat.power_kw >= 0.0,
            "battery.power_kw",
            "must be >= 0",
        );
        check(
            (0.0..=1.0).contains(&bat.initial_soc),
            "battery.initial_soc",
            "must be in [0.0, 1.0]",
        );

        check(
            self.trading.price_per_kwh.is_finite() && self.trading.price_per_kwh >= 0.0,
            "trading.price_per_kwh",
            "must be >= 0",
        );

        let ctl = &self.controller;
        check(
            ctl.gain.is_finite(),
            "controller.gain",
            "must be finite",
        );
        check(
            ctl.kind != "formula" || ctl.formula.is_some(),
            "controller.formula",
            "required when controller.kind = \"formula\"",
        );

        if !ControllerConfig::KINDS.contains(&ctl.kind.as_str()) {
            errors.push(ConfigError::new(
                "controller.kind",
                format!(
                    "must be one of {}, got \"{}\"",
                    ControllerConfig::KINDS.join(", "),
                    ctl.kind
                ),
            ));
        }
        if let Some(tag) = &s.season {
            if let Err(e) = tag.parse::<Season>() {
                errors.push(ConfigError::new("simulation.season", e.to_string()));
            }
        }
        if let Some(date) = &s.start_date {
            if let Err(e) = parse_date(date) {
                errors.push(ConfigError::new(
                    "simulation.start_date",
                    format!("expected YYYY-MM-DD, got \"{date}\" ({e})"),
                ));
            }
        }

        errors
    }

    /// Parsed `simulation.start_date`; `None` when unset or malformed.
    pub fn start_date(&self) -> Option<NaiveDate> {
        self.simulation
            .start_date
            .as_deref()
            .and_then(|d| parse_date(d).ok())
    }

    /// Validates the scenario and resolves it into an engine configuration.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` listing every validation failure.
    pub fn to_sim_config(&self) -> Result<SimConfig, Error> {
        let errors = self.validate();
        if !errors.is_empty() {
            return Err(Error::Config(errors));
        }

        let season = self.simulation.season.as_deref().map(Season::from_tag_or_default);
        let start_date = self.start_date();

        Ok(SimConfig {
            building_count: self.building_count(),
            horizon_hours: self.simulation.horizon_hours,
            temp_target_c: self.comfort.temp_target_c,
            pv_area_m2: self.pv.area_m2,
            battery_capacity_kwh: self.battery.capacity_kwh,
            battery_power_kw: self.battery.power_kw,
            initial_soc: self.battery.initial_soc,
            trading_enabled: self.trading.enabled,
            trading_price: self.trading.price_per_kwh,
            latitude: self.site.latitude,
            longitude: self.site.longitude,
            season: resolve_season(season, start_date),
            seed: self.simulation.seed,
        })
    }
}

fn parse_date(s: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_preset_valid() {
        let cfg = ScenarioConfig::default();
        let errors = cfg.validate();
        assert!(errors.is_empty(), "default should be valid: {errors:?}");
        assert_eq!(cfg.building_count(), 2);
    }

    #[test]
    fn from_preset_unknown() {
        let err = ScenarioConfig::from_preset("nonexistent");
        assert!(err.is_err_and(|e| e.message.contains("unknown preset")));
    }

    #[test]
    fn all_presets_are_valid() {
        for name in ScenarioConfig::PRESETS {
            let cfg = ScenarioConfig::from_preset(name);
            assert!(cfg.is_ok(), "preset \"{name}\" should load");
            let errors = cfg.as_ref().map(|c| c.validate()).unwrap_or_default();
            assert!(
                errors.is_empty(),
                "preset \"{name}\" should be valid: {errors:?}"
            );
        }
    }

    #[test]
    fn summer_solar_has_larger_pv() {
        let base = ScenarioConfig::default();
        let sunny = ScenarioConfig::summer_solar();
        assert!(sunny.pv.area_m2 > base.pv.area_m2);
        assert_eq!(sunny.building_count(), 3);
        let sim = sunny.to_sim_config().ok();
        assert_eq!(sim.map(|s| s.season), Some(Season::Summer));
    }

    #[test]
    fn no_storage_disables_battery_and_trading() {
        let cfg = ScenarioConfig::no_storage();
        assert_eq!(cfg.battery.capacity_kwh, 0.0);
        assert!(!cfg.trading.enabled);
    }

    #[test]
    fn valid_toml_parses() {
        let toml = r#"
[simulation]
buildings = ["North", "South", "East"]
horizon_hours = 48
seed = 7
start_date = "2024-07-15"

[site]
latitude = 33.57
longitude = -7.59
country_code = "MA"

[comfort]
temp_target_c = 21.5

[pv]
area_m2 = 150.0

[battery]
capacity_kwh = 40.0
power_kw = 10.0
initial_soc = 0.25

[trading]
enabled = false
price_per_kwh = 0.2

[controller]
kind = "formula"
formula = "clamp(0.4 * (temp_target - outdoor_temp), -1, 1)"
"#;
        let cfg = ScenarioConfig::from_toml_str(toml);
        assert!(cfg.is_ok(), "valid TOML should parse: {:?}", cfg.err());
        let cfg = cfg.unwrap_or_default();
        assert_eq!(cfg.building_count(), 3);
        assert_eq!(cfg.simulation.horizon_hours, 48);
        assert_eq!(cfg.site.country_code, "MA");
        assert_eq!(cfg.controller.kind, "formula");
        assert!(cfg.validate().is_empty());

        let sim = cfg.to_sim_config().ok();
        assert_eq!(sim.as_ref().map(|s| s.season), Some(Season::Summer));
        assert_eq!(sim.as_ref().map(|s| s.building_count), Some(3));
        assert_eq!(sim.map(|s| s.trading_enabled), Some(false));
    }

    #[test]
    fn explicit_season_beats_start_date() {
        let toml = r#"
[simulation]
season = "autumn"
start_date = "2024-07-15"
"#;
        let sim = ScenarioConfig::from_toml_str(toml)
            .ok()
            .and_then(|c| c.to_sim_config().ok());
        assert_eq!(sim.map(|s| s.season), Some(Season::Autumn));
    }

    #[test]
    fn no_season_no_date_is_winter() {
        let sim = ScenarioConfig::default().to_sim_config().ok();
        assert_eq!(sim.map(|s| s.season), Some(Season::Winter));
    }

    #[test]
    fn invalid_toml_unknown_field() {
        let toml = r#"
[simulation]
horizon_hours = 24
bogus_field = true
"#;
        let result = ScenarioConfig::from_toml_str(toml);
        assert!(result.is_err_and(|e| e.field == "toml"));
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let toml = r#"
[simulation]
seed = 99
"#;
        let cfg = ScenarioConfig::from_toml_str(toml).unwrap_or_default();
        assert_eq!(cfg.simulation.seed, 99);
        assert_eq!(cfg.simulation.horizon_hours, 168);
        assert_eq!(cfg.pv.area_m2, 200.0);
        assert_eq!(cfg.controller.gain, 0.6);
    }

    #[test]
    fn validation_collects_every_error() {
        let mut cfg = ScenarioConfig::default();
        cfg.simulation.horizon_hours = 0;
        cfg.battery.initial_soc = 1.5;
        cfg.battery.power_kw = -1.0;
        cfg.pv.area_m2 = -3.0;
        let fields: Vec<String> = cfg.validate().into_iter().map(|e| e.field).collect();
        for want in [
            "simulation.horizon_hours",
            "battery.initial_soc",
            "battery.power_kw",
            "pv.area_m2",
        ] {
            assert!(fields.iter().any(|f| f == want), "missing {want}: {fields:?}");
        }
    }

    #[test]
    fn validation_catches_buildings() {
        let mut cfg = ScenarioConfig::default();
        cfg.simulation.buildings.clear();
        assert!(cfg.validate().iter().any(|e| e.field == "simulation.buildings"));

        cfg.simulation.buildings = vec!["A".into(), "A".into()];
        assert!(cfg.validate().iter().any(|e| e.message.contains("unique")));
    }

    #[test]
    fn validation_catches_unknown_season_and_bad_date() {
        let mut cfg = ScenarioConfig::default();
        cfg.simulation.season = Some("monsoon".into());
        cfg.simulation.start_date = Some("15/07/2024".into());
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "simulation.season"));
        assert!(errors.iter().any(|e| e.field == "simulation.start_date"));
    }

    #[test]
    fn validation_catches_controller_kind_and_missing_formula() {
        let mut cfg = ScenarioConfig::default();
        cfg.controller.kind = "pid".into();
        assert!(cfg.validate().iter().any(|e| e.field == "controller.kind"));

        cfg.controller.kind = "formula".into();
        assert!(cfg.validate().iter().any(|e| e.field == "controller.formula"));
    }

    #[test]
    fn unparseable_formula_is_not_a_validation_error() {
        let mut cfg = ScenarioConfig::default();
        cfg.controller.kind = "formula".into();
        cfg.controller.formula = Some("import os".into());
        assert!(cfg.validate().is_empty());
    }

    #[test]
    fn to_sim_config_rejects_invalid() {
        let mut cfg = ScenarioConfig::default();
        cfg.simulation.horizon_hours = 0;
        assert!(matches!(cfg.to_sim_config(), Err(Error::Config(ref e)) if e.len() == 1));
    }
}
