//! TOML-based scenario configuration and preset definitions.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::cost::assumptions::{CostScenario, CostTable};
use crate::error::SizingError;
use crate::optimize::{DEFAULT_GAS_PRICE_PER_MMBTU, DEFAULT_HEAT_RATE_BTU_PER_KWH, OptimizeParams};
use crate::optimizer::grid::SearchGrid;
use crate::profile::{LoadShape, Resolution};

/// Top-level scenario configuration parsed from TOML.
///
/// Every section has defaults matching the `data_center` preset. Load from
/// TOML with [`ScenarioConfig::from_toml_file`] or pick a preset with
/// [`ScenarioConfig::from_preset`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    /// Where the plant is and how much it must serve.
    #[serde(default)]
    pub site: SiteConfig,
    /// Load curve; `kind = "flat"` or `kind = "diurnal"`.
    #[serde(default)]
    pub load: LoadShape,
    /// Backup gas plant and fuel.
    #[serde(default)]
    pub fuel: FuelConfig,
    /// Optimisation constraints.
    #[serde(default)]
    pub constraints: ConstraintConfig,
    /// Cost scenario, year, and optional custom table.
    #[serde(default)]
    pub costs: CostConfig,
    /// Search grid.
    #[serde(default)]
    pub search: SearchGrid,
}

/// Site parameters.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Free-form label used in reports.
    pub name: String,
    /// Mean load (MW, >= 0).
    pub target_load_mw: f64,
    /// Latitude in degrees, [-90, 90].
    pub latitude: f64,
    /// Target solar capacity factor; 0.18 when absent, raised to the 0.12
    /// floor when lower.
    pub solar_cf_hint: Option<f64>,
    /// `"representative"` (288 steps) or `"full-year"` (8760 steps).
    pub resolution: Resolution,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            name: "data center".to_string(),
            target_load_mw: 100.0,
            latitude: 39.0,
            solar_cf_hint: Some(0.20),
            resolution: Resolution::Representative,
        }
    }
}

/// Backup gas plant and fuel parameters.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FuelConfig {
    /// Heat rate (Btu/kWh).
    pub heat_rate_btu_per_kwh: f64,
    /// Fuel price ($/MMBtu).
    pub gas_price_per_mmbtu: f64,
    /// Capacity factor of the gas-only comparison plant; clamped to
    /// [0.05, 0.95].
    pub gas_capacity_factor: Option<f64>,
    /// Cap on backup gas output (MW).
    pub gas_capacity_mw: Option<f64>,
}

impl Default for FuelConfig {
    fn default() -> Self {
        Self {
            heat_rate_btu_per_kwh: DEFAULT_HEAT_RATE_BTU_PER_KWH,
            gas_price_per_mmbtu: DEFAULT_GAS_PRICE_PER_MMBTU,
            gas_capacity_factor: None,
            gas_capacity_mw: None,
        }
    }
}

/// Optimisation constraints.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConstraintConfig {
    /// Gas-backup limit as a share of load energy, [0, 1].
    pub max_gas_backup_fraction: f64,
}

impl Default for ConstraintConfig {
    fn default() -> Self {
        Self {
            max_gas_backup_fraction: 0.05,
        }
    }
}

/// Cost assumptions selection.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CostConfig {
    /// `"base"`, `"optimistic"`, or `"conservative"`.
    pub scenario: String,
    /// Commissioning year; resolved to the nearest table year.
    pub commissioning_year: u32,
    /// TOML cost table replacing the built-in one.
    pub table: Option<PathBuf>,
}

impl Default for CostConfig {
    fn default() -> Self {
        Self {
            scenario: CostScenario::Base.to_string(),
            commissioning_year: 2027,
            table: None,
        }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("config error: {field}: {message}")]
pub struct ConfigError {
    /// Dotted field path (e.g., `"site.latitude"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl ConfigError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self::data_center()
    }
}

impl ScenarioConfig {
    /// 100 MW flat data-center load at 39°N, 5 % gas backup, base 2027 costs.
    pub fn data_center() -> Self {
        Self {
            site: SiteConfig::default(),
            load: LoadShape::Flat,
            fuel: FuelConfig::default(),
            constraints: ConstraintConfig::default(),
            costs: CostConfig::default(),
            search: SearchGrid::default(),
        }
    }

    /// Sunny low-latitude site with an evening-peaking load and a peaker
    /// comparison plant.
    pub fn desert_peaker() -> Self {
        Self {
            site: SiteConfig {
                name: "desert peaker".to_string(),
                target_load_mw: 250.0,
                latitude: 33.4,
                solar_cf_hint: Some(0.26),
                ..SiteConfig::default()
            },
            load: LoadShape::Diurnal {
                amplitude_frac: 0.3,
                phase_rad: 1.2,
                noise_std: 0.02,
                seed: 7,
            },
            fuel: FuelConfig {
                heat_rate_btu_per_kwh: 10_000.0,
                gas_price_per_mmbtu: 4.0,
                gas_capacity_factor: Some(0.15),
                gas_capacity_mw: None,
            },
            constraints: ConstraintConfig {
                max_gas_backup_fraction: 0.10,
            },
            costs: CostConfig {
                scenario: CostScenario::Optimistic.to_string(),
                commissioning_year: 2030,
                table: None,
            },
            search: SearchGrid::default(),
        }
    }

    /// High-latitude retrofit of an existing plant under conservative costs.
    pub fn northern_plant() -> Self {
        Self {
            site: SiteConfig {
                name: "northern plant".to_string(),
                target_load_mw: 500.0,
                latitude: 47.5,
                solar_cf_hint: None,
                ..SiteConfig::default()
            },
            load: LoadShape::Flat,
            fuel: FuelConfig {
                heat_rate_btu_per_kwh: 7_000.0,
                gas_price_per_mmbtu: 3.0,
                gas_capacity_factor: Some(0.55),
                gas_capacity_mw: Some(500.0),
            },
            constraints: ConstraintConfig {
                max_gas_backup_fraction: 0.20,
            },
            costs: CostConfig {
                scenario: CostScenario::Conservative.to_string(),
                commissioning_year: 2027,
                table: None,
            },
            search: SearchGrid::default(),
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["data_center", "desert_peaker", "northern_plant"];

    /// Loads a scenario from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "data_center" => Ok(Self::data_center()),
            "desert_peaker" => Ok(Self::desert_peaker()),
            "northern_plant" => Ok(Self::northern_plant()),
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
    /// A relative `costs.table` path is resolved against the directory
    /// holding the scenario file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::new("scenario", format!("cannot read \"{}\": {e}", path.display()))
        })?;
        let mut cfg = Self::from_toml_str(&content)?;
        if let (Some(table), Some(dir)) = (cfg.costs.table.as_mut(), path.parent()) {
            if table.is_relative() {
                *table = dir.join(&*table);
            }
        }
        Ok(cfg)
    }

    /// Parses a scenario from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::new("toml", e.to_string()))
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        let site = &self.site;
        if !site.target_load_mw.is_finite() || site.target_load_mw < 0.0 {
            errors.push(ConfigError::new("site.target_load_mw", "must be finite and >= 0"));
        }
        if !site.latitude.is_finite() || !(-90.0..=90.0).contains(&site.latitude) {
            errors.push(ConfigError::new("site.latitude", "must be in [-90, 90]"));
        }
        if site.solar_cf_hint.is_some_and(|cf| !cf.is_finite()) {
            errors.push(ConfigError::new("site.solar_cf_hint", "must be finite"));
        }

        if let LoadShape::Diurnal {
            amplitude_frac,
            noise_std,
            ..
        } = self.load
        {
            if !(0.0..=1.0).contains(&amplitude_frac) {
                errors.push(ConfigError::new("load.amplitude_frac", "must be in [0.0, 1.0]"));
            }
            if !noise_std.is_finite() || noise_std < 0.0 {
                errors.push(ConfigError::new("load.noise_std", "must be finite and >= 0"));
            }
        }

        let fuel = &self.fuel;
        if !fuel.heat_rate_btu_per_kwh.is_finite() || fuel.heat_rate_btu_per_kwh < 0.0 {
            errors.push(ConfigError::new("fuel.heat_rate_btu_per_kwh", "must be finite and >= 0"));
        }
        if !fuel.gas_price_per_mmbtu.is_finite() || fuel.gas_price_per_mmbtu < 0.0 {
            errors.push(ConfigError::new("fuel.gas_price_per_mmbtu", "must be finite and >= 0"));
        }
        if fuel.gas_capacity_factor.is_some_and(|cf| !cf.is_finite()) {
            errors.push(ConfigError::new("fuel.gas_capacity_factor", "must be finite"));
        }
        if fuel.gas_capacity_mw.is_some_and(|mw| !mw.is_finite() || mw < 0.0) {
            errors.push(ConfigError::new("fuel.gas_capacity_mw", "must be finite and >= 0"));
        }

        if !(0.0..=1.0).contains(&self.constraints.max_gas_backup_fraction) {
            errors.push(ConfigError::new(
                "constraints.max_gas_backup_fraction",
                "must be in [0.0, 1.0]",
            ));
        }

        if let Err(e) = self.costs.scenario.parse::<CostScenario>() {
            errors.push(ConfigError::new("costs.scenario", e.to_string()));
        }

        if let Err(e) = self.search.validate() {
            let field = match &e {
                SizingError::InvalidParameter { field, .. } => search_field(field),
                _ => "search".to_string(),
            };
            errors.push(ConfigError::new(field, e.to_string()));
        }

        errors
    }

    /// Optimisation request described by this scenario.
    pub fn to_params(&self) -> OptimizeParams {
        OptimizeParams {
            target_load_mw: self.site.target_load_mw,
            latitude: self.site.latitude,
            solar_cf_hint: self.site.solar_cf_hint,
            heat_rate_btu_per_kwh: self.fuel.heat_rate_btu_per_kwh,
            max_gas_backup_fraction: self.constraints.max_gas_backup_fraction,
            commissioning_year: self.costs.commissioning_year,
            cost_scenario: self.costs.scenario.clone(),
            gas_price_per_mmbtu: self.fuel.gas_price_per_mmbtu,
            gas_capacity_factor: self.fuel.gas_capacity_factor,
            gas_capacity_mw: self.fuel.gas_capacity_mw,
            resolution: self.site.resolution,
            load_shape: self.load.clone(),
        }
    }

    /// Grid to search.
    pub fn search_grid(&self) -> &SearchGrid {
        &self.search
    }

    /// Cost table named by `costs.table`, or the built-in one.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` on `costs.table` if the file is unreadable or malformed.
    pub fn cost_table(&self) -> Result<CostTable, ConfigError> {
        match &self.costs.table {
            Some(path) => CostTable::from_toml_file(path)
                .map_err(|e| ConfigError::new("costs.table", e.to_string())),
            None => Ok(CostTable::builtin()),
        }
    }
}

fn search_field(name: &str) -> String {
    let snake = match name {
        "solarMultiples" => "solar_multiples",
        "durationsHours" => "durations_hours",
        "powerRatios" => "power_ratios",
        "toleranceBand" => "tolerance_band",
        other => other,
    };
    format!("search.{snake}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_center_preset_valid() {
        let cfg = ScenarioConfig::data_center();
        let errors = cfg.validate();
        assert!(errors.is_empty(), "data_center should be valid: {errors:?}");
    }

    #[test]
    fn from_preset_unknown() {
        let err = ScenarioConfig::from_preset("nonexistent");
        assert!(err.as_ref().is_err_and(|e| e.message.contains("unknown preset")));
        assert_eq!(err.map_err(|e| e.field).err().as_deref(), Some("preset"));
    }

    #[test]
    fn all_presets_are_valid() {
        for name in ScenarioConfig::PRESETS {
            let cfg = ScenarioConfig::from_preset(name);
            assert!(cfg.is_ok(), "preset \"{name}\" should load");
            let errors = cfg.expect("preset should load").validate();
            assert!(
                errors.is_empty(),
                "preset \"{name}\" should be valid: {errors:?}"
            );
        }
    }

    #[test]
    fn valid_toml_parses() {
        let toml = r#"
[site]
name = "test site"
target_load_mw = 40.0
latitude = -23.5
solar_cf_hint = 0.24
resolution = "full-year"

[load]
kind = "diurnal"
amplitude_frac = 0.25
phase_rad = 0.5
noise_std = 0.01
seed = 9

[fuel]
heat_rate_btu_per_kwh = 8500.0
gas_price_per_mmbtu = 5.25
gas_capacity_mw = 40.0

[constraints]
max_gas_backup_fraction = 0.15

[costs]
scenario = "optimistic"
commissioning_year = 2032

[search]
solar_multiples = [1.0, 2.0, 3.0]
durations_hours = [0.0, 4.0, 8.0]
power_ratios = [0.5, 1.0]
tolerance_band = 1.0
"#;
        let cfg = ScenarioConfig::from_toml_str(toml).expect("valid TOML should parse");
        assert!(cfg.validate().is_empty());
        assert_eq!(cfg.site.resolution, Resolution::FullYear);
        assert_eq!(cfg.search.len(), 3 * (1 + 2 * 2));
        assert!(matches!(cfg.load, LoadShape::Diurnal { seed: 9, .. }));

        let p = cfg.to_params();
        assert_eq!(p.latitude, -23.5);
        assert_eq!(p.cost_scenario, "optimistic");
        assert_eq!(p.commissioning_year, 2032);
        assert_eq!(p.gas_capacity_mw, Some(40.0));
        assert!(p.validate().is_ok());
    }

    #[test]
    fn invalid_toml_unknown_field() {
        let toml = r#"
[site]
target_load_mw = 10.0
bogus_field = true
"#;
        let result = ScenarioConfig::from_toml_str(toml);
        assert!(result.is_err_and(|e| e.field == "toml"));
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let toml = r#"
[site]
latitude = 12.0
"#;
        let cfg = ScenarioConfig::from_toml_str(toml).expect("partial TOML should parse");
        // latitude overridden
        assert_eq!(cfg.site.latitude, 12.0);
        // load kept default
        assert_eq!(cfg.site.target_load_mw, 100.0);
        assert_eq!(cfg.search, SearchGrid::default());
        assert_eq!(cfg.costs.scenario, "base");
    }

    #[test]
    fn validation_collects_every_error() {
        let mut cfg = ScenarioConfig::data_center();
        cfg.site.latitude = 100.0;
        cfg.constraints.max_gas_backup_fraction = -0.1;
        cfg.costs.scenario = "aggressive".to_string();
        cfg.search.tolerance_band = 0.5;
        let fields: Vec<String> = cfg.validate().into_iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec![
                "site.latitude",
                "constraints.max_gas_backup_fraction",
                "costs.scenario",
                "search.tolerance_band",
            ]
        );
    }

    #[test]
    fn validation_catches_bad_load_shape() {
        let mut cfg = ScenarioConfig::data_center();
        cfg.load = LoadShape::Diurnal {
            amplitude_frac: 1.5,
            phase_rad: 0.0,
            noise_std: -1.0,
            seed: 1,
        };
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "load.amplitude_frac"));
        assert!(errors.iter().any(|e| e.field == "load.noise_std"));
    }

    #[test]
    fn missing_cost_table_file() {
        let mut cfg = ScenarioConfig::data_center();
        cfg.costs.table = Some(PathBuf::from("/nonexistent/costs.toml"));
        assert!(cfg.cost_table().is_err_and(|e| e.field == "costs.table"));
        cfg.costs.table = None;
        assert!(cfg.cost_table().is_ok());
    }

    #[test]
    fn out_of_range_capacity_factors_are_clamped_not_rejected() {
        let mut cfg = ScenarioConfig::data_center();
        cfg.site.solar_cf_hint = Some(0.0);
        cfg.fuel.gas_capacity_factor = Some(1.4);
        assert!(cfg.validate().is_empty(), "{:?}", cfg.validate());
        assert!(cfg.to_params().validate().is_ok());

        cfg.site.solar_cf_hint = Some(f64::NAN);
        cfg.fuel.gas_capacity_factor = Some(f64::INFINITY);
        let fields: Vec<String> = cfg.validate().into_iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["site.solar_cf_hint", "fuel.gas_capacity_factor"]);
    }

    #[test]
    fn cost_table_resolves_next_to_scenario_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("scenarios/storage_premium.toml");
        let cfg = ScenarioConfig::from_toml_file(&path).expect("scenario should load");
        let table = cfg.costs.table.clone().expect("scenario names a cost table");
        assert!(table.is_absolute());
        assert!(table.ends_with("scenarios/costs/storage_premium.toml"));
        assert!(cfg.cost_table().is_ok());
    }

    #[test]
    fn desert_peaker_is_larger_and_sunnier() {
        let base = ScenarioConfig::data_center();
        let desert = ScenarioConfig::desert_peaker();
        assert!(desert.site.target_load_mw > base.site.target_load_mw);
        assert!(desert.site.solar_cf_hint > base.site.solar_cf_hint);
    }

    #[test]
    fn error_display_has_path() {
        let e = ConfigError::new("site.latitude", "must be in [-90, 90]");
        assert_eq!(e.to_string(), "config error: site.latitude: must be in [-90, 90]");
    }
}
