//! Command-line arguments.

use std::path::PathBuf;

use clap::Parser;

use crate::config::{ConfigError, ScenarioConfig};
use crate::profile::Resolution;

/// Hybrid solar + battery + gas-backup sizing optimizer.
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "hybrid-sizer", author, version, about, long_about = None)]
pub struct Cli {
    /// Load scenario from a TOML file
    #[arg(long, conflicts_with = "preset")]
    pub scenario: Option<PathBuf>,

    /// Use a built-in preset (data_center, desert_peaker, northern_plant)
    #[arg(long)]
    pub preset: Option<String>,

    /// Override the target load (MW)
    #[arg(long)]
    pub load_mw: Option<f64>,

    /// Override the site latitude (degrees, south negative)
    #[arg(long, allow_negative_numbers = true)]
    pub latitude: Option<f64>,

    /// Override the target solar capacity factor
    #[arg(long)]
    pub solar_cf: Option<f64>,

    /// Override the maximum gas-backup fraction (0-1)
    #[arg(long)]
    pub max_gas: Option<f64>,

    /// Override the commissioning year
    #[arg(long)]
    pub year: Option<u32>,

    /// Override the cost scenario (base, optimistic, conservative)
    #[arg(long)]
    pub cost_scenario: Option<String>,

    /// Override the gas price ($/MMBtu)
    #[arg(long)]
    pub gas_price: Option<f64>,

    /// Simulate all 8760 hours instead of 12 representative days
    #[arg(long, default_value_t = false)]
    pub full_year: bool,

    /// Evaluate candidates on one thread
    #[arg(long, default_value_t = false)]
    pub sequential: bool,

    /// Write the winner's full dispatch trace to CSV
    #[arg(long)]
    pub dispatch_out: Option<PathBuf>,

    /// Write the 24-hour representative dispatch to CSV
    #[arg(long)]
    pub summary_out: Option<PathBuf>,

    /// Write every evaluated candidate to CSV
    #[arg(long)]
    pub candidates_out: Option<PathBuf>,

    /// Print the result as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,

    /// List built-in presets and exit
    #[arg(long, default_value_t = false)]
    pub list_presets: bool,

    /// Debug-level logging (RUST_LOG takes precedence)
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Start the REST API server instead of running once
    #[cfg(feature = "api")]
    #[arg(long, default_value_t = false)]
    pub serve: bool,

    /// API server port
    #[cfg(feature = "api")]
    #[arg(long, default_value_t = 3000)]
    pub port: u16,
}

impl Cli {
    /// Loads the selected scenario and applies command-line overrides.
    ///
    /// `--scenario` takes priority, then `--preset`, then `data_center`.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file or preset cannot be loaded.
    pub fn scenario_config(&self) -> Result<ScenarioConfig, ConfigError> {
        let mut cfg = match (&self.scenario, &self.preset) {
            (Some(path), _) => ScenarioConfig::from_toml_file(path)?,
            (None, Some(name)) => ScenarioConfig::from_preset(name)?,
            (None, None) => ScenarioConfig::data_center(),
        };

        if let Some(mw) = self.load_mw {
            cfg.site.target_load_mw = mw;
        }
        if let Some(lat) = self.latitude {
            cfg.site.latitude = lat;
        }
        if let Some(cf) = self.solar_cf {
            cfg.site.solar_cf_hint = Some(cf);
        }
        if let Some(frac) = self.max_gas {
            cfg.constraints.max_gas_backup_fraction = frac;
        }
        if let Some(year) = self.year {
            cfg.costs.commissioning_year = year;
        }
        if let Some(s) = &self.cost_scenario {
            cfg.costs.scenario = s.clone();
        }
        if let Some(price) = self.gas_price {
            cfg.fuel.gas_price_per_mmbtu = price;
        }
        if self.full_year {
            cfg.site.resolution = Resolution::FullYear;
        }
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("hybrid-sizer").chain(args.iter().copied()))
    }

    #[test]
    fn no_args_uses_data_center() {
        let cli = parse(&[]).ok();
        let cfg = cli.as_ref().map(Cli::scenario_config);
        assert!(matches!(cfg, Some(Ok(ref c)) if *c == ScenarioConfig::data_center()));
    }

    #[test]
    fn scenario_and_preset_conflict() {
        assert!(parse(&["--scenario", "x.toml", "--preset", "data_center"]).is_err());
    }

    #[test]
    fn overrides_apply() {
        let cli = parse(&[
            "--preset",
            "desert_peaker",
            "--latitude",
            "-33.9",
            "--max-gas",
            "0.2",
            "--year",
            "2035",
            "--cost-scenario",
            "conservative",
            "--full-year",
        ])
        .expect("arguments should parse");
        let cfg = cli
            .scenario_config()
            .expect("overrides should apply");
        assert_eq!(cfg.site.latitude, -33.9);
        assert_eq!(cfg.site.target_load_mw, 250.0);
        assert_eq!(cfg.constraints.max_gas_backup_fraction, 0.2);
        assert_eq!(cfg.costs.commissioning_year, 2035);
        assert_eq!(cfg.costs.scenario, "conservative");
        assert_eq!(cfg.site.resolution, Resolution::FullYear);
    }

    #[test]
    fn unknown_preset_is_config_error() {
        let cli = parse(&["--preset", "nope"]).ok();
        let cfg = cli.as_ref().map(Cli::scenario_config);
        assert!(matches!(cfg, Some(Err(ref e)) if e.field == "preset"));
    }

    #[test]
    fn rejects_bad_number() {
        assert!(parse(&["--load-mw", "lots"]).is_err());
    }
}
