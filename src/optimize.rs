//! Top-level entry point: validate, build profiles, search, assemble.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::cost::assumptions::{CostScenario, CostTable};
use crate::cost::gas_only::{DEFAULT_GAS_CAPACITY_FACTOR, gas_only_lcoe};
use crate::cost::lcoe::CostEvaluator;
use crate::error::SizingError;
use crate::optimizer::control::RunControl;
use crate::optimizer::grid::GridSearch;
use crate::optimizer::problem::{Candidate, SizingProblem};
use crate::optimizer::selection::SelectionKind;
use crate::optimizer::SizingStrategy;
use crate::profile::{LoadProfile, LoadShape, Resolution, SolarProfile};
use crate::result::{OptimizationResult, SolverStatus};
use crate::sim::summary::representative_day;
use crate::sim::types::TraceMode;

/// Smallest load the optimizer works with (MW); zero loads are raised to it.
pub const MIN_TARGET_LOAD_MW: f64 = 0.001;
/// Heat rate used when the request omits one (Btu/kWh).
pub const DEFAULT_HEAT_RATE_BTU_PER_KWH: f64 = 9000.0;
/// Gas price used when the request omits one ($/MMBtu).
pub const DEFAULT_GAS_PRICE_PER_MMBTU: f64 = 3.50;

/// Reference sizing reported when no grid candidate can be priced.
pub const FALLBACK_SOLAR_MULTIPLE: f64 = 2.0;
/// Battery power / load of the reference sizing.
pub const FALLBACK_POWER_RATIO: f64 = 0.8;
/// Battery duration of the reference sizing (h).
pub const FALLBACK_DURATION_HOURS: f64 = 4.0;

/// Optimisation request. JSON uses camelCase keys.
///
/// # Examples
///
/// ```
/// use hybrid_sizer::OptimizeParams;
///
/// let parsed: Result<OptimizeParams, _> = serde_json::from_str(
///     r#"{"targetLoadMw": 100, "latitude": 39, "maxGasBackupFraction": 0.05,
///         "commissioningYear": 2027, "costScenario": "base"}"#,
/// );
/// let params = parsed.expect("request should parse");
/// assert_eq!(params.heat_rate_btu_per_kwh, 9000.0);
/// assert!(params.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct OptimizeParams {
    /// Mean load to serve (MW).
    pub target_load_mw: f64,
    /// Site latitude (degrees, south negative).
    pub latitude: f64,
    /// Target solar capacity factor; 0.18 when absent.
    #[serde(default)]
    pub solar_cf_hint: Option<f64>,
    /// Backup gas heat rate (Btu/kWh).
    #[serde(default = "default_heat_rate")]
    pub heat_rate_btu_per_kwh: f64,
    /// Gas-backup limit as a share of load energy (0..=1).
    pub max_gas_backup_fraction: f64,
    /// Commissioning year used to pick cost assumptions.
    pub commissioning_year: u32,
    /// `base`, `optimistic`, or `conservative`.
    #[serde(default = "default_scenario")]
    pub cost_scenario: String,
    /// Fuel price ($/MMBtu).
    #[serde(default = "default_gas_price")]
    pub gas_price_per_mmbtu: f64,
    /// Capacity factor of the gas-only comparison plant; 0.25 when absent.
    #[serde(default)]
    pub gas_capacity_factor: Option<f64>,
    /// Cap on backup gas output (MW); unconstrained when absent.
    #[serde(default)]
    pub gas_capacity_mw: Option<f64>,
    /// Profile resolution.
    #[serde(default)]
    pub resolution: Resolution,
    /// Load curve shape.
    #[serde(default)]
    pub load_shape: LoadShape,
}

fn default_heat_rate() -> f64 {
    DEFAULT_HEAT_RATE_BTU_PER_KWH
}

fn default_gas_price() -> f64 {
    DEFAULT_GAS_PRICE_PER_MMBTU
}

fn default_scenario() -> String {
    CostScenario::Base.to_string()
}

impl Default for OptimizeParams {
    /// 100 MW flat load at 39°N, 5 % gas backup, base costs for 2027.
    fn default() -> Self {
        Self {
            target_load_mw: 100.0,
            latitude: 39.0,
            solar_cf_hint: None,
            heat_rate_btu_per_kwh: DEFAULT_HEAT_RATE_BTU_PER_KWH,
            max_gas_backup_fraction: 0.05,
            commissioning_year: 2027,
            cost_scenario: default_scenario(),
            gas_price_per_mmbtu: DEFAULT_GAS_PRICE_PER_MMBTU,
            gas_capacity_factor: None,
            gas_capacity_mw: None,
            resolution: Resolution::Representative,
            load_shape: LoadShape::Flat,
        }
    }
}

/// Request after validation, with clamps applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidatedParams {
    /// Target load, floored at [`MIN_TARGET_LOAD_MW`].
    pub target_load_mw: f64,
    /// Parsed cost scenario.
    pub cost_scenario: CostScenario,
    /// Gas-only comparison capacity factor (default applied, not yet clamped).
    pub gas_capacity_factor: f64,
}

impl OptimizeParams {
    /// Checks the request contract.
    ///
    /// # Errors
    ///
    /// Returns the first violation found:
    /// - `InvalidLoad` for a non-finite or negative target load
    /// - `InvalidLatitude` outside [-90, 90]
    /// - `UnknownScenario` for an unrecognised cost scenario
    /// - `InvalidParameter` for any other out-of-range field
    pub fn validate(&self) -> Result<ValidatedParams, SizingError> {
        if !self.target_load_mw.is_finite() || self.target_load_mw < 0.0 {
            return Err(SizingError::InvalidLoad(self.target_load_mw));
        }
        if !self.latitude.is_finite() || !(-90.0..=90.0).contains(&self.latitude) {
            return Err(SizingError::InvalidLatitude(self.latitude));
        }
        if self.solar_cf_hint.is_some_and(|cf| !cf.is_finite()) {
            return Err(SizingError::invalid("solarCfHint", "must be finite"));
        }
        if !self.heat_rate_btu_per_kwh.is_finite() || self.heat_rate_btu_per_kwh < 0.0 {
            return Err(SizingError::invalid(
                "heatRateBtuPerKwh",
                format!("must be finite and >= 0, got {}", self.heat_rate_btu_per_kwh),
            ));
        }
        if !self.gas_price_per_mmbtu.is_finite() || self.gas_price_per_mmbtu < 0.0 {
            return Err(SizingError::invalid(
                "gasPricePerMmbtu",
                format!("must be finite and >= 0, got {}", self.gas_price_per_mmbtu),
            ));
        }
        if !(0.0..=1.0).contains(&self.max_gas_backup_fraction) {
            return Err(SizingError::invalid(
                "maxGasBackupFraction",
                format!("must be in [0, 1], got {}", self.max_gas_backup_fraction),
            ));
        }
        if self.gas_capacity_factor.is_some_and(|cf| !cf.is_finite()) {
            return Err(SizingError::invalid("gasCapacityFactor", "must be finite"));
        }
        if self.gas_capacity_mw.is_some_and(|mw| !mw.is_finite() || mw < 0.0) {
            return Err(SizingError::invalid("gasCapacityMw", "must be finite and >= 0"));
        }
        if let LoadShape::Diurnal {
            amplitude_frac,
            phase_rad,
            noise_std,
            ..
        } = self.load_shape
        {
            if !amplitude_frac.is_finite() || !phase_rad.is_finite() {
                return Err(SizingError::invalid("loadShape", "amplitude and phase must be finite"));
            }
            if !noise_std.is_finite() || noise_std < 0.0 {
                return Err(SizingError::invalid("loadShape", "noise_std must be finite and >= 0"));
            }
        }
        let cost_scenario: CostScenario = self.cost_scenario.parse()?;

        Ok(ValidatedParams {
            target_load_mw: self.target_load_mw.max(MIN_TARGET_LOAD_MW),
            cost_scenario,
            gas_capacity_factor: self.gas_capacity_factor.unwrap_or(DEFAULT_GAS_CAPACITY_FACTOR),
        })
    }
}

/// Runs the default grid search against the built-in cost table.
///
/// # Errors
///
/// Returns a [`SizingError`] when the request violates its contract.
/// Infeasibility is reported through [`OptimizationResult::solver_status`].
pub fn optimize(params: &OptimizeParams) -> Result<OptimizationResult, SizingError> {
    optimize_with(
        params,
        &GridSearch::default(),
        &CostTable::builtin(),
        &RunControl::default(),
    )
}

/// Runs `strategy` against `table` with cancellation and progress hooks.
///
/// # Errors
///
/// As [`optimize`], plus `Cancelled` when `control` is cancelled and
/// `MissingCostData` when `table` has no entries for the scenario.
pub fn optimize_with<S>(
    params: &OptimizeParams,
    strategy: &S,
    table: &CostTable,
    control: &RunControl,
) -> Result<OptimizationResult, SizingError>
where
    S: SizingStrategy + ?Sized,
{
    let started = Instant::now();
    let v = params.validate()?;
    let (cost_year, costs) = table.lookup(v.cost_scenario, params.commissioning_year)?;

    info!(
        target_load_mw = v.target_load_mw,
        latitude = params.latitude,
        scenario = %v.cost_scenario,
        cost_year,
        max_gas = params.max_gas_backup_fraction,
        resolution = ?params.resolution,
        strategy = strategy.name(),
        "optimization started"
    );

    let solar = SolarProfile::generate(params.latitude, params.solar_cf_hint, params.resolution);
    let load = LoadProfile::build(v.target_load_mw, &params.load_shape, params.resolution);
    let evaluator = CostEvaluator::new(
        costs,
        v.target_load_mw,
        params.heat_rate_btu_per_kwh,
        params.gas_price_per_mmbtu,
    );
    let problem = SizingProblem::new(
        &load,
        &solar,
        evaluator,
        v.target_load_mw,
        costs.battery_round_trip_efficiency,
        costs.inverter_efficiency,
    )
    .with_gas_capacity(params.gas_capacity_mw)
    .with_max_gas_fraction(params.max_gas_backup_fraction);

    let outcome = strategy.search(&problem, control)?;

    let (winner, solver_status) = match outcome.selection {
        Some((SelectionKind::Feasible, eval)) => (eval, SolverStatus::Optimal),
        Some((SelectionKind::Closest, eval)) => (
            eval,
            SolverStatus::NearOptimal {
                gas_backup_fraction: eval.gas_fraction,
            },
        ),
        None => {
            let reference = Candidate::from_grid(
                v.target_load_mw,
                FALLBACK_SOLAR_MULTIPLE,
                FALLBACK_DURATION_HOURS,
                FALLBACK_POWER_RATIO,
            );
            warn!("no candidate could be priced, reporting reference sizing");
            let eval = problem.evaluate(&reference);
            (
                eval,
                SolverStatus::Fallback {
                    gas_backup_fraction: eval.gas_fraction,
                },
            )
        }
    };

    let run = problem.simulate(&winner.candidate, TraceMode::Full);
    let representative_dispatch = representative_day(&run.trace);
    let lcoe_gas_only = gas_only_lcoe(
        costs,
        params.heat_rate_btu_per_kwh,
        params.gas_price_per_mmbtu,
        v.gas_capacity_factor,
    );

    if run.totals.unmet_mwh > 0.0 {
        warn!(
            unmet_fraction = run.totals.unmet_fraction(),
            "gas capacity limit leaves load unserved"
        );
    }
    info!(
        status = %solver_status,
        solar_mw = winner.candidate.solar_mw,
        battery_mw = winner.candidate.battery_power_mw,
        battery_mwh = winner.candidate.battery_energy_mwh,
        lcoe = winner.lcoe,
        gas_only_lcoe = lcoe_gas_only,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "optimization finished"
    );

    Ok(OptimizationResult {
        solar_capacity_mw: winner.candidate.solar_mw,
        battery_power_mw: winner.candidate.battery_power_mw,
        battery_energy_mwh: winner.candidate.battery_energy_mwh,
        battery_duration_hours: winner.candidate.duration_hours,
        solar_multiple: winner.candidate.solar_multiple,
        net_lcoe_usd_per_mwh: winner.lcoe,
        lcoe_gas_only_usd_per_mwh: lcoe_gas_only,
        gas_backup_fraction_actual: winner.gas_fraction,
        unmet_load_fraction: winner.unmet_fraction,
        curtailment_fraction: run.totals.curtailment_fraction(),
        lcoe_breakdown: winner.breakdown,
        representative_dispatch,
        solver_status,
        annual_energy: run.totals.scaled(problem.annualization_factor()),
        solar_capacity_factor: solar.capacity_factor(),
        candidates_evaluated: outcome.candidates_evaluated,
        resolution: params.resolution,
        cost_scenario: v.cost_scenario,
        cost_year,
        dispatch_trace: run.trace,
        candidates: outcome.evaluations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimizer::grid::SearchGrid;

    fn tiny_search() -> GridSearch {
        GridSearch::new(SearchGrid {
            solar_multiples: vec![1.0, 3.0],
            durations_hours: vec![0.0, 4.0],
            power_ratios: vec![1.0],
            ..SearchGrid::default()
        })
    }

    #[test]
    fn default_params_are_valid() {
        let v = OptimizeParams::default().validate();
        assert!(matches!(
            v,
            Ok(ValidatedParams {
                cost_scenario: CostScenario::Base,
                ..
            })
        ));
    }

    #[test]
    fn rejects_bad_load_and_latitude() {
        let p = OptimizeParams {
            target_load_mw: -1.0,
            ..OptimizeParams::default()
        };
        assert_eq!(p.validate(), Err(SizingError::InvalidLoad(-1.0)));

        let p = OptimizeParams {
            target_load_mw: f64::NAN,
            ..OptimizeParams::default()
        };
        assert!(matches!(p.validate(), Err(SizingError::InvalidLoad(_))));

        let p = OptimizeParams {
            latitude: 95.0,
            ..OptimizeParams::default()
        };
        assert_eq!(p.validate(), Err(SizingError::InvalidLatitude(95.0)));
    }

    #[test]
    fn rejects_unknown_scenario() {
        let p = OptimizeParams {
            cost_scenario: "aggressive".into(),
            ..OptimizeParams::default()
        };
        assert!(matches!(p.validate(), Err(SizingError::UnknownScenario(_))));
    }

    #[test]
    fn rejects_out_of_range_fields() {
        let cases = [
            OptimizeParams {
                max_gas_backup_fraction: 1.2,
                ..OptimizeParams::default()
            },
            OptimizeParams {
                heat_rate_btu_per_kwh: f64::INFINITY,
                ..OptimizeParams::default()
            },
            OptimizeParams {
                gas_price_per_mmbtu: -2.0,
                ..OptimizeParams::default()
            },
            OptimizeParams {
                solar_cf_hint: Some(f64::NAN),
                ..OptimizeParams::default()
            },
            OptimizeParams {
                gas_capacity_mw: Some(-5.0),
                ..OptimizeParams::default()
            },
        ];
        for p in cases {
            assert!(
                matches!(p.validate(), Err(SizingError::InvalidParameter { .. })),
                "{p:?}"
            );
        }
    }

    #[test]
    fn zero_load_is_floored() {
        let p = OptimizeParams {
            target_load_mw: 0.0,
            ..OptimizeParams::default()
        };
        assert_eq!(p.validate().map(|v| v.target_load_mw), Ok(MIN_TARGET_LOAD_MW));
        let r = optimize_with(&p, &tiny_search(), &CostTable::builtin(), &RunControl::new());
        assert!(r.is_ok_and(|r| r.net_lcoe_usd_per_mwh.is_finite()));
    }

    #[test]
    fn json_rejects_unknown_fields() {
        let parsed: Result<OptimizeParams, _> = serde_json::from_str(
            r#"{"targetLoadMw": 1, "latitude": 0, "maxGasBackupFraction": 0.1,
                "commissioningYear": 2030, "bogus": true}"#,
        );
        assert!(parsed.is_err());
    }

    #[test]
    fn empty_table_reports_missing_data() {
        let table = CostTable::from_toml_str(
            r#"
[optimistic.2030]
solar_capex_per_kw = 700.0
battery_capex_per_kwh = 130.0
battery_capex_per_kw = 80.0
solar_om_per_kw_year = 13.0
battery_om_per_kw_year = 15.0
wacc = 0.06
project_lifetime_years = 30
battery_round_trip_efficiency = 0.89
inverter_efficiency = 0.98
gas_capex_per_kw = 1600.0
gas_fixed_om_per_kw_year = 29.0
"#,
        )
        .expect("custom table should parse");
        let r = optimize_with(
            &OptimizeParams::default(),
            &tiny_search(),
            &table,
            &RunControl::new(),
        );
        assert!(matches!(r, Err(SizingError::MissingCostData(_))));
    }

    #[test]
    fn result_carries_trace_and_summary() {
        let r = optimize_with(
            &OptimizeParams::default(),
            &tiny_search().keep_evaluations(true),
            &CostTable::builtin(),
            &RunControl::new(),
        )
        .expect("optimize should succeed");
        assert_eq!(r.dispatch_trace.len(), 288);
        assert_eq!(r.representative_dispatch.len(), 24);
        assert_eq!(r.candidates.len(), 4);
        assert_eq!(r.candidates_evaluated, 4);
        assert_eq!(r.cost_year, 2027);
    }
}
