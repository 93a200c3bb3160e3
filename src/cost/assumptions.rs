//! Technology cost assumptions by scenario and commissioning year.
//!
//! The built-in table covers three scenarios × four commissioning years.
//! Custom tables load from TOML with one sub-table per scenario and year:
//!
//! ```toml
//! [base.2027]
//! solar_capex_per_kw = 950.0
//! battery_capex_per_kwh = 200.0
//! # ...
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::SizingError;

/// Gas variable O&M used when a table omits it ($/MWh).
pub const DEFAULT_GAS_VARIABLE_OM_PER_MWH: f64 = 3.5;

/// Named cost trajectory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CostScenario {
    /// Mid-case trajectory.
    #[default]
    Base,
    /// Faster cost declines and cheaper capital.
    Optimistic,
    /// Slower declines, higher WACC, shorter asset life.
    Conservative,
}

impl CostScenario {
    /// Every scenario, in display order.
    pub const ALL: [CostScenario; 3] = [Self::Base, Self::Optimistic, Self::Conservative];

    /// Lowercase name as used in requests and config files.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Base => "base",
            Self::Optimistic => "optimistic",
            Self::Conservative => "conservative",
        }
    }
}

impl fmt::Display for CostScenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CostScenario {
    type Err = SizingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "base" => Ok(Self::Base),
            "optimistic" => Ok(Self::Optimistic),
            "conservative" => Ok(Self::Conservative),
            _ => Err(SizingError::UnknownScenario(s.to_string())),
        }
    }
}

/// Cost and performance assumptions for one (scenario, year) pair.
///
/// Deserializes from snake_case TOML keys and serializes to camelCase JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase"), deny_unknown_fields)]
pub struct CostAssumptionSet {
    /// Solar installed cost ($/kW DC).
    pub solar_capex_per_kw: f64,
    /// Battery energy-component cost ($/kWh).
    pub battery_capex_per_kwh: f64,
    /// Battery power-component cost ($/kW).
    pub battery_capex_per_kw: f64,
    /// Solar fixed O&M ($/kW-yr).
    pub solar_om_per_kw_year: f64,
    /// Battery fixed O&M ($/kW-yr).
    pub battery_om_per_kw_year: f64,
    /// Weighted average cost of capital (fraction).
    pub wacc: f64,
    /// Financing period for the annuity (years).
    pub project_lifetime_years: u32,
    /// Investment tax credit applied to solar and battery capex (fraction).
    #[serde(default)]
    pub itc_rate: f64,
    /// Battery round-trip efficiency (fraction).
    pub battery_round_trip_efficiency: f64,
    /// Solar DC→AC efficiency (fraction).
    pub inverter_efficiency: f64,
    /// New-build gas plant cost for the gas-only comparison ($/kW).
    pub gas_capex_per_kw: f64,
    /// Gas plant fixed O&M ($/kW-yr).
    pub gas_fixed_om_per_kw_year: f64,
    /// Gas variable O&M ($/MWh).
    #[serde(default = "default_gas_vom")]
    pub gas_variable_om_per_mwh: f64,
}

fn default_gas_vom() -> f64 {
    DEFAULT_GAS_VARIABLE_OM_PER_MWH
}

impl CostAssumptionSet {
    /// Returns the first out-of-range field as `(field, constraint)`.
    fn check(&self) -> Option<(&'static str, &'static str)> {
        let non_negative = [
            ("solar_capex_per_kw", self.solar_capex_per_kw),
            ("battery_capex_per_kwh", self.battery_capex_per_kwh),
            ("battery_capex_per_kw", self.battery_capex_per_kw),
            ("solar_om_per_kw_year", self.solar_om_per_kw_year),
            ("battery_om_per_kw_year", self.battery_om_per_kw_year),
            ("gas_capex_per_kw", self.gas_capex_per_kw),
            ("gas_fixed_om_per_kw_year", self.gas_fixed_om_per_kw_year),
            ("gas_variable_om_per_mwh", self.gas_variable_om_per_mwh),
        ];
        if let Some((field, _)) = non_negative
            .into_iter()
            .find(|(_, v)| !v.is_finite() || *v < 0.0)
        {
            return Some((field, "must be finite and >= 0"));
        }
        if !(0.0..1.0).contains(&self.wacc) {
            return Some(("wacc", "must be in [0, 1)"));
        }
        if self.project_lifetime_years == 0 {
            return Some(("project_lifetime_years", "must be > 0"));
        }
        if !(0.0..=1.0).contains(&self.itc_rate) {
            return Some(("itc_rate", "must be in [0, 1]"));
        }
        if !(self.battery_round_trip_efficiency > 0.0 && self.battery_round_trip_efficiency <= 1.0) {
            return Some(("battery_round_trip_efficiency", "must be in (0, 1]"));
        }
        if !(self.inverter_efficiency > 0.0 && self.inverter_efficiency <= 1.0) {
            return Some(("inverter_efficiency", "must be in (0, 1]"));
        }
        None
    }
}

/// Errors raised while loading a custom cost table.
#[derive(Debug, Error)]
pub enum CostTableError {
    /// File could not be read.
    #[error("cannot read cost table \"{}\": {source}", path.display())]
    Io {
        /// Path that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// TOML was malformed or had unknown keys.
    #[error("invalid cost table TOML: {0}")]
    Parse(#[from] toml::de::Error),
    /// A year key was not an integer.
    #[error("cost table year key \"{key}\" under \"{scenario}\" is not a year")]
    InvalidYear {
        /// Scenario the key was under.
        scenario: CostScenario,
        /// Offending key.
        key: String,
    },
    /// A value was out of range.
    #[error("{scenario}.{year}.{field} {message}")]
    InvalidValue {
        /// Scenario of the entry.
        scenario: CostScenario,
        /// Year of the entry.
        year: u32,
        /// Offending field.
        field: &'static str,
        /// Constraint description.
        message: &'static str,
    },
    /// No scenario had any entries.
    #[error("cost table is empty")]
    Empty,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawCostTable {
    #[serde(default)]
    base: BTreeMap<String, CostAssumptionSet>,
    #[serde(default)]
    optimistic: BTreeMap<String, CostAssumptionSet>,
    #[serde(default)]
    conservative: BTreeMap<String, CostAssumptionSet>,
}

/// Read-only lookup of cost assumptions per scenario, keyed by year.
#[derive(Debug, Clone, PartialEq)]
pub struct CostTable {
    entries: BTreeMap<CostScenario, BTreeMap<u32, CostAssumptionSet>>,
}

impl CostTable {
    /// Built-in assumptions for base / optimistic / conservative × 2025, 2027, 2030, 2035.
    ///
    /// The federal ITC is assumed to lapse by 2035 in the base and
    /// conservative trajectories.
    pub fn builtin() -> Self {
        let mut entries = BTreeMap::new();
        for (scenario, rows) in [
            (CostScenario::Base, BASE_ROWS),
            (CostScenario::Optimistic, OPTIMISTIC_ROWS),
            (CostScenario::Conservative, CONSERVATIVE_ROWS),
        ] {
            let by_year: BTreeMap<u32, CostAssumptionSet> =
                rows.iter().map(|row| (row.0, row.to_set())).collect();
            entries.insert(scenario, by_year);
        }
        Self { entries }
    }

    /// Parses a custom table from TOML.
    ///
    /// # Errors
    ///
    /// Returns a `CostTableError` for malformed TOML, non-numeric year keys,
    /// out-of-range values, or a table with no entries.
    pub fn from_toml_str(s: &str) -> Result<Self, CostTableError> {
        let raw: RawCostTable = toml::from_str(s)?;
        let mut entries = BTreeMap::new();
        for (scenario, rows) in [
            (CostScenario::Base, raw.base),
            (CostScenario::Optimistic, raw.optimistic),
            (CostScenario::Conservative, raw.conservative),
        ] {
            if rows.is_empty() {
                continue;
            }
            let mut by_year = BTreeMap::new();
            for (key, set) in rows {
                let year: u32 = key
                    .trim()
                    .parse()
                    .map_err(|_| CostTableError::InvalidYear { scenario, key: key.clone() })?;
                if let Some((field, message)) = set.check() {
                    return Err(CostTableError::InvalidValue {
                        scenario,
                        year,
                        field,
                        message,
                    });
                }
                by_year.insert(year, set);
            }
            entries.insert(scenario, by_year);
        }
        if entries.is_empty() {
            return Err(CostTableError::Empty);
        }
        Ok(Self { entries })
    }

    /// Reads and parses a custom table from a TOML file.
    ///
    /// # Errors
    ///
    /// See [`CostTable::from_toml_str`]; also fails when the file cannot be read.
    pub fn from_toml_file(path: &Path) -> Result<Self, CostTableError> {
        let content = fs::read_to_string(path).map_err(|source| CostTableError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Looks up the assumptions tabulated nearest to `year`.
    ///
    /// Ties resolve to the earlier year. Returns the resolved year with the set.
    ///
    /// # Errors
    ///
    /// Returns `SizingError::MissingCostData` if the scenario has no entries.
    ///
    /// # Examples
    ///
    /// ```
    /// use hybrid_sizer::cost::assumptions::{CostScenario, CostTable};
    ///
    /// let table = CostTable::builtin();
    /// let year = table.lookup(CostScenario::Base, 2028).map(|(year, _)| year);
    /// assert_eq!(year, Ok(2027));
    /// ```
    pub fn lookup(
        &self,
        scenario: CostScenario,
        year: u32,
    ) -> Result<(u32, &CostAssumptionSet), SizingError> {
        let by_year = self
            .entries
            .get(&scenario)
            .filter(|m| !m.is_empty())
            .ok_or_else(|| SizingError::MissingCostData(scenario.to_string()))?;

        // BTreeMap iterates ascending, so `min_by_key` keeps the earlier year on ties.
        by_year
            .iter()
            .min_by_key(|(y, _)| y.abs_diff(year))
            .map(|(y, set)| (*y, set))
            .ok_or_else(|| SizingError::MissingCostData(scenario.to_string()))
    }

    /// Scenarios that have at least one entry.
    pub fn scenarios(&self) -> Vec<CostScenario> {
        self.entries
            .iter()
            .filter(|(_, m)| !m.is_empty())
            .map(|(s, _)| *s)
            .collect()
    }

    /// Tabulated years for `scenario`, ascending.
    pub fn years(&self, scenario: CostScenario) -> Vec<u32> {
        self.entries
            .get(&scenario)
            .map(|m| m.keys().copied().collect())
            .unwrap_or_default()
    }
}

impl Default for CostTable {
    fn default() -> Self {
        Self::builtin()
    }
}

/// (year, solar $/kW, battery $/kWh, battery $/kW, solar O&M, battery O&M,
///  wacc, life, itc, rte, inverter eff, gas $/kW, gas FOM)
struct Row(u32, f64, f64, f64, f64, f64, f64, u32, f64, f64, f64, f64, f64);

impl Row {
    fn to_set(&self) -> CostAssumptionSet {
        CostAssumptionSet {
            solar_capex_per_kw: self.1,
            battery_capex_per_kwh: self.2,
            battery_capex_per_kw: self.3,
            solar_om_per_kw_year: self.4,
            battery_om_per_kw_year: self.5,
            wacc: self.6,
            project_lifetime_years: self.7,
            itc_rate: self.8,
            battery_round_trip_efficiency: self.9,
            inverter_efficiency: self.10,
            gas_capex_per_kw: self.11,
            gas_fixed_om_per_kw_year: self.12,
            gas_variable_om_per_mwh: DEFAULT_GAS_VARIABLE_OM_PER_MWH,
        }
    }
}

#[rustfmt::skip]
const BASE_ROWS: &[Row] = &[
    Row(2025, 1100.0, 240.0, 150.0, 18.0, 22.0, 0.065, 30, 0.30, 0.86, 0.970, 1400.0, 27.0),
    Row(2027,  950.0, 200.0, 120.0, 16.0, 20.0, 0.065, 30, 0.30, 0.87, 0.970, 1500.0, 28.0),
    Row(2030,  850.0, 170.0, 105.0, 15.0, 18.0, 0.065, 30, 0.30, 0.88, 0.975, 1550.0, 29.0),
    Row(2035,  760.0, 140.0,  90.0, 14.0, 16.0, 0.065, 30, 0.00, 0.89, 0.975, 1600.0, 30.0),
];

#[rustfmt::skip]
const OPTIMISTIC_ROWS: &[Row] = &[
    Row(2025, 1000.0, 210.0, 130.0, 16.0, 20.0, 0.060, 30, 0.30, 0.87, 0.970, 1450.0, 27.0),
    Row(2027,  850.0, 170.0, 100.0, 15.0, 18.0, 0.060, 30, 0.30, 0.88, 0.975, 1550.0, 28.0),
    Row(2030,  720.0, 135.0,  85.0, 13.0, 15.0, 0.060, 30, 0.30, 0.89, 0.980, 1600.0, 29.0),
    Row(2035,  600.0, 105.0,  70.0, 12.0, 13.0, 0.060, 30, 0.30, 0.90, 0.980, 1650.0, 30.0),
];

#[rustfmt::skip]
const CONSERVATIVE_ROWS: &[Row] = &[
    Row(2025, 1250.0, 280.0, 175.0, 20.0, 25.0, 0.075, 25, 0.30, 0.85, 0.965, 1350.0, 26.0),
    Row(2027, 1150.0, 255.0, 160.0, 19.0, 24.0, 0.075, 25, 0.30, 0.86, 0.965, 1400.0, 27.0),
    Row(2030, 1050.0, 225.0, 145.0, 18.0, 22.0, 0.075, 25, 0.30, 0.86, 0.970, 1450.0, 28.0),
    Row(2035,  960.0, 195.0, 130.0, 17.0, 20.0, 0.075, 25, 0.00, 0.87, 0.970, 1500.0, 29.0),
];
