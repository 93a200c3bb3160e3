//! LCOE of serving the load with a new-build gas plant alone.

use super::assumptions::CostAssumptionSet;
use super::lcoe::{capital_recovery_factor, gas_marginal_cost_per_mwh};

/// Comparison plant capacity factor when none is given.
pub const DEFAULT_GAS_CAPACITY_FACTOR: f64 = 0.25;
/// Lower clamp for the comparison capacity factor.
pub const MIN_GAS_CAPACITY_FACTOR: f64 = 0.05;
/// Upper clamp for the comparison capacity factor.
pub const MAX_GAS_CAPACITY_FACTOR: f64 = 0.95;

/// Gas-only LCOE in $/MWh.
///
/// Fixed costs `(capex·crf + fixed O&M)` per kW-year are spread over
/// `8.76 · cf` MWh per kW-year, then fuel and variable O&M are added.
///
/// # Arguments
///
/// * `assumptions` - Cost set supplying gas capex, O&M, WACC and lifetime
/// * `heat_rate_btu_per_kwh` - Plant heat rate
/// * `gas_price_per_mmbtu` - Fuel price
/// * `capacity_factor` - Comparison plant utilization, clamped to [0.05, 0.95]
///
/// # Examples
///
/// ```
/// use hybrid_sizer::cost::assumptions::{CostScenario, CostTable};
/// use hybrid_sizer::cost::gas_only::gas_only_lcoe;
///
/// let table = CostTable::builtin();
/// if let Ok((_, set)) = table.lookup(CostScenario::Base, 2027) {
///     let lcoe = gas_only_lcoe(set, 9000.0, 3.5, 0.25);
///     assert!(lcoe > 35.0);
/// }
/// ```
pub fn gas_only_lcoe(
    assumptions: &CostAssumptionSet,
    heat_rate_btu_per_kwh: f64,
    gas_price_per_mmbtu: f64,
    capacity_factor: f64,
) -> f64 {
    let cf = clamp_capacity_factor(capacity_factor);
    let crf = capital_recovery_factor(assumptions.wacc, assumptions.project_lifetime_years);
    let fixed_per_kw_year = assumptions.gas_capex_per_kw * crf + assumptions.gas_fixed_om_per_kw_year;
    fixed_per_kw_year / (8.76 * cf)
        + gas_marginal_cost_per_mwh(
            heat_rate_btu_per_kwh,
            gas_price_per_mmbtu,
            assumptions.gas_variable_om_per_mwh,
        )
}

/// Clamps a comparison capacity factor into the modelled range.
///
/// NaN falls back to [`DEFAULT_GAS_CAPACITY_FACTOR`].
pub fn clamp_capacity_factor(capacity_factor: f64) -> f64 {
    if capacity_factor.is_nan() {
        return DEFAULT_GAS_CAPACITY_FACTOR;
    }
    capacity_factor.clamp(MIN_GAS_CAPACITY_FACTOR, MAX_GAS_CAPACITY_FACTOR)
}
