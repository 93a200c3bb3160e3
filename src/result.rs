//! Optimisation result and its solver status.

use std::fmt;

use serde::{Serialize, Serializer};

use crate::cost::assumptions::CostScenario;
use crate::cost::lcoe::LcoeBreakdown;
use crate::optimizer::problem::CandidateEvaluation;
use crate::profile::Resolution;
use crate::sim::summary::HourlyDispatch;
use crate::sim::types::{DispatchTimestep, DispatchTotals};

/// How the reported sizing was chosen.
///
/// Serializes to its display string, e.g. `"near-optimal (gas backup: 7.4%)"`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SolverStatus {
    /// Cheapest configuration within the gas-backup limit.
    Optimal,
    /// Nothing met the limit; this is the lowest-gas configuration.
    NearOptimal {
        /// Achieved gas share of load energy.
        gas_backup_fraction: f64,
    },
    /// Nothing could be priced; a fixed reference sizing is reported.
    Fallback {
        /// Achieved gas share of load energy.
        gas_backup_fraction: f64,
    },
}

impl SolverStatus {
    /// Returns `true` for [`SolverStatus::Optimal`].
    pub fn is_optimal(&self) -> bool {
        matches!(self, Self::Optimal)
    }

    /// Short label without the gas figure.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Optimal => "optimal",
            Self::NearOptimal { .. } => "near-optimal",
            Self::Fallback { .. } => "fallback",
        }
    }
}

impl fmt::Display for SolverStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Optimal => f.write_str("optimal"),
            Self::NearOptimal {
                gas_backup_fraction,
            } => write!(f, "near-optimal (gas backup: {:.1}%)", gas_backup_fraction * 100.0),
            Self::Fallback {
                gas_backup_fraction,
            } => write!(f, "fallback (gas backup: {:.1}%)", gas_backup_fraction * 100.0),
        }
    }
}

impl Serialize for SolverStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Recommended hybrid sizing with costs and dispatch.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationResult {
    /// Solar nameplate (MW DC).
    pub solar_capacity_mw: f64,
    /// Battery power (MW).
    pub battery_power_mw: f64,
    /// Battery energy (MWh).
    pub battery_energy_mwh: f64,
    /// Battery duration (h).
    pub battery_duration_hours: f64,
    /// Solar nameplate / target load.
    pub solar_multiple: f64,
    /// Hybrid LCOE ($/MWh).
    pub net_lcoe_usd_per_mwh: f64,
    /// Gas-only comparison LCOE ($/MWh).
    pub lcoe_gas_only_usd_per_mwh: f64,
    /// Gas share of load energy.
    pub gas_backup_fraction_actual: f64,
    /// Unserved share of load energy.
    pub unmet_load_fraction: f64,
    /// Curtailed share of solar generation.
    pub curtailment_fraction: f64,
    /// LCOE by technology.
    pub lcoe_breakdown: LcoeBreakdown,
    /// 24 hour-of-day averages of the winning dispatch.
    pub representative_dispatch: Vec<HourlyDispatch>,
    /// How the sizing was chosen.
    pub solver_status: SolverStatus,
    /// Annualized energy totals of the winning dispatch (MWh).
    pub annual_energy: DispatchTotals,
    /// Mean of the solar profile actually used.
    pub solar_capacity_factor: f64,
    /// Candidates priced by the search.
    pub candidates_evaluated: usize,
    /// Profile resolution used.
    pub resolution: Resolution,
    /// Cost scenario used.
    pub cost_scenario: CostScenario,
    /// Table year the commissioning year resolved to.
    pub cost_year: u32,
    /// Per-step dispatch of the winner; exported separately.
    #[serde(skip)]
    pub dispatch_trace: Vec<DispatchTimestep>,
    /// Every candidate evaluation, when requested.
    #[serde(skip)]
    pub candidates: Vec<CandidateEvaluation>,
}

impl OptimizationResult {
    /// Hybrid saving against gas-only ($/MWh, positive = hybrid cheaper).
    pub fn savings_usd_per_mwh(&self) -> f64 {
        self.lcoe_gas_only_usd_per_mwh - self.net_lcoe_usd_per_mwh
    }
}

impl fmt::Display for OptimizationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Hybrid Sizing ---")?;
        writeln!(f, "Status:            {}", self.solver_status)?;
        writeln!(
            f,
            "Solar:             {:.1} MW ({:.2}x load, CF {:.3})",
            self.solar_capacity_mw, self.solar_multiple, self.solar_capacity_factor
        )?;
        writeln!(
            f,
            "Battery:           {:.1} MW / {:.1} MWh ({:.1} h)",
            self.battery_power_mw, self.battery_energy_mwh, self.battery_duration_hours
        )?;
        writeln!(
            f,
            "Gas backup:        {:.2}% of load",
            self.gas_backup_fraction_actual * 100.0
        )?;
        if self.unmet_load_fraction > 0.0 {
            writeln!(f, "Unmet load:        {:.2}%", self.unmet_load_fraction * 100.0)?;
        }
        writeln!(f, "Curtailment:       {:.1}% of solar", self.curtailment_fraction * 100.0)?;
        writeln!(f, "Net LCOE:          {:.2} $/MWh", self.net_lcoe_usd_per_mwh)?;
        writeln!(f, "{}", self.lcoe_breakdown)?;
        writeln!(f, "Gas-only LCOE:     {:.2} $/MWh", self.lcoe_gas_only_usd_per_mwh)?;
        write!(
            f,
            "Cost basis:        {} {} ({} resolution, {} candidates)",
            self.cost_scenario,
            self.cost_year,
            self.resolution.as_str(),
            self.candidates_evaluated
        )
    }
}
