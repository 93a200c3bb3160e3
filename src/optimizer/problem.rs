//! One sizing problem: fixed profiles and prices, varying plant sizes.

use serde::Serialize;

use crate::cost::lcoe::{CostEvaluator, LcoeBreakdown};
use crate::profile::{LoadProfile, SolarProfile};
use crate::sim::engine::simulate;
use crate::sim::types::{DispatchParams, DispatchRun, DispatchTotals, TraceMode};

/// Plant sizing under evaluation, with the grid coordinates it came from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    /// Solar nameplate as a multiple of target load.
    pub solar_multiple: f64,
    /// Battery duration (h); 0 means no battery.
    pub duration_hours: f64,
    /// Battery power as a multiple of target load; 0 when there is no battery.
    pub power_ratio: f64,
    /// Solar nameplate (MW).
    pub solar_mw: f64,
    /// Battery power (MW).
    pub battery_power_mw: f64,
    /// Battery energy (MWh).
    pub battery_energy_mwh: f64,
}

impl Candidate {
    /// Builds a candidate from grid coordinates.
    ///
    /// A non-positive duration yields a solar-only candidate.
    pub fn from_grid(load_mw: f64, solar_multiple: f64, duration_hours: f64, power_ratio: f64) -> Self {
        let solar_mw = load_mw * solar_multiple;
        if duration_hours <= 0.0 {
            return Self {
                solar_multiple,
                duration_hours: 0.0,
                power_ratio: 0.0,
                solar_mw,
                battery_power_mw: 0.0,
                battery_energy_mwh: 0.0,
            };
        }
        let battery_power_mw = load_mw * power_ratio;
        Self {
            solar_multiple,
            duration_hours,
            power_ratio,
            solar_mw,
            battery_power_mw,
            battery_energy_mwh: battery_power_mw * duration_hours,
        }
    }
}

/// Outcome of pricing one candidate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateEvaluation {
    /// Sizing evaluated.
    pub candidate: Candidate,
    /// Net LCOE ($/MWh).
    pub lcoe: f64,
    /// Gas share of load energy.
    pub gas_fraction: f64,
    /// Unserved share of load energy (non-zero only with a gas cap).
    pub unmet_fraction: f64,
    /// Per-technology LCOE.
    pub breakdown: LcoeBreakdown,
}

/// Fixed inputs shared by every candidate of a search.
///
/// Built once per optimisation; strategies only vary the [`Candidate`].
#[derive(Debug, Clone)]
pub struct SizingProblem<'a> {
    load: &'a LoadProfile,
    solar: &'a SolarProfile,
    costs: CostEvaluator<'a>,
    target_load_mw: f64,
    round_trip_efficiency: f64,
    inverter_efficiency: f64,
    gas_capacity_mw: Option<f64>,
    max_gas_fraction: f64,
}

impl<'a> SizingProblem<'a> {
    /// Creates a problem.
    ///
    /// # Arguments
    ///
    /// * `load` - Load curve, same resolution as `solar`
    /// * `solar` - Normalized solar curve
    /// * `costs` - Evaluator bound to the resolved assumptions
    /// * `target_load_mw` - Mean load the grid is scaled against
    /// * `round_trip_efficiency` - Battery efficiency
    /// * `inverter_efficiency` - Solar DC→AC efficiency
    pub fn new(
        load: &'a LoadProfile,
        solar: &'a SolarProfile,
        costs: CostEvaluator<'a>,
        target_load_mw: f64,
        round_trip_efficiency: f64,
        inverter_efficiency: f64,
    ) -> Self {
        Self {
            load,
            solar,
            costs,
            target_load_mw,
            round_trip_efficiency,
            inverter_efficiency,
            gas_capacity_mw: None,
            max_gas_fraction: 1.0,
        }
    }

    /// Caps gas output at `gas_capacity_mw`.
    pub fn with_gas_capacity(mut self, gas_capacity_mw: Option<f64>) -> Self {
        self.gas_capacity_mw = gas_capacity_mw;
        self
    }

    /// Sets the gas-backup limit used for feasibility.
    pub fn with_max_gas_fraction(mut self, max_gas_fraction: f64) -> Self {
        self.max_gas_fraction = max_gas_fraction;
        self
    }

    /// Mean load (MW).
    pub fn target_load_mw(&self) -> f64 {
        self.target_load_mw
    }

    /// Gas-backup limit (fraction of load energy).
    pub fn max_gas_fraction(&self) -> f64 {
        self.max_gas_fraction
    }

    /// Factor converting period energy into annual energy.
    pub fn annualization_factor(&self) -> f64 {
        self.solar.resolution().annualization_factor()
    }

    /// Dispatch parameters for `candidate`.
    pub fn dispatch_params(&self, candidate: &Candidate) -> DispatchParams {
        DispatchParams::new(
            candidate.solar_mw,
            candidate.battery_power_mw,
            candidate.battery_energy_mwh,
            self.round_trip_efficiency,
            self.inverter_efficiency,
        )
        .with_gas_capacity(self.gas_capacity_mw)
    }

    /// Simulates `candidate`.
    pub fn simulate(&self, candidate: &Candidate, mode: TraceMode) -> DispatchRun {
        let params = self.dispatch_params(candidate);
        simulate(self.load.values(), self.solar.values(), &params, mode)
    }

    /// Prices already-simulated totals for `candidate`.
    pub fn price(&self, candidate: &Candidate, totals: &DispatchTotals) -> CandidateEvaluation {
        let annual_gas_mwh = totals.gas_mwh * self.annualization_factor();
        let breakdown = self.costs.evaluate(
            candidate.solar_mw,
            candidate.battery_power_mw,
            candidate.battery_energy_mwh,
            annual_gas_mwh,
        );
        CandidateEvaluation {
            candidate: *candidate,
            lcoe: breakdown.total,
            gas_fraction: totals.gas_fraction(),
            unmet_fraction: totals.unmet_fraction(),
            breakdown,
        }
    }

    /// Simulates and prices `candidate` without keeping a trace.
    pub fn evaluate(&self, candidate: &Candidate) -> CandidateEvaluation {
        let run = self.simulate(candidate, TraceMode::MetricsOnly);
        self.price(candidate, &run.totals)
    }
}
