//! Levelized cost of energy for a hybrid configuration.

use std::fmt;

use serde::Serialize;

use super::assumptions::CostAssumptionSet;
use crate::profile::types::HOURS_PER_YEAR;

/// Capital recovery factor: the annuity paying back 1 unit of capital over `years`.
///
/// `wacc · (1+wacc)^n / ((1+wacc)^n − 1)`, degrading to `1/n` at zero cost of
/// capital. Returns 0 for a zero-year horizon.
///
/// ```
/// use hybrid_sizer::cost::lcoe::capital_recovery_factor;
///
/// assert_eq!(capital_recovery_factor(0.0, 20), 0.05);
/// assert!((capital_recovery_factor(0.065, 30) - 0.076577).abs() < 1e-6);
/// ```
pub fn capital_recovery_factor(wacc: f64, years: u32) -> f64 {
    if years == 0 {
        return 0.0;
    }
    if wacc.abs() < f64::EPSILON {
        return 1.0 / f64::from(years);
    }
    let compound = (1.0 + wacc).powi(years as i32);
    wacc * compound / (compound - 1.0)
}

/// Fuel plus variable O&M for one MWh of gas generation ($/MWh).
///
/// # Arguments
///
/// * `heat_rate_btu_per_kwh` - Plant heat rate
/// * `gas_price_per_mmbtu` - Delivered fuel price
/// * `variable_om_per_mwh` - Non-fuel variable cost
pub fn gas_marginal_cost_per_mwh(
    heat_rate_btu_per_kwh: f64,
    gas_price_per_mmbtu: f64,
    variable_om_per_mwh: f64,
) -> f64 {
    // Btu/kWh × $/MMBtu / 1000 = $/MWh
    heat_rate_btu_per_kwh * gas_price_per_mmbtu / 1000.0 + variable_om_per_mwh
}

/// LCOE split by technology, all in $/MWh of load served.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LcoeBreakdown {
    /// Annualized solar capex plus O&M.
    pub solar_cost: f64,
    /// Annualized battery capex plus O&M.
    pub battery_cost: f64,
    /// Gas fuel and variable O&M.
    pub gas_cost: f64,
    /// Credit for exported surplus solar; always zero until export is modelled.
    pub excess_solar_revenue: f64,
    /// `solar + battery + gas − excess`.
    pub total: f64,
}

impl fmt::Display for LcoeBreakdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "  solar:    {:>8.2} $/MWh", self.solar_cost)?;
        writeln!(f, "  battery:  {:>8.2} $/MWh", self.battery_cost)?;
        writeln!(f, "  gas:      {:>8.2} $/MWh", self.gas_cost)?;
        if self.excess_solar_revenue != 0.0 {
            writeln!(f, "  export:  -{:>8.2} $/MWh", self.excess_solar_revenue)?;
        }
        write!(f, "  total:    {:>8.2} $/MWh", self.total)
    }
}

/// Prices candidate configurations against one set of assumptions.
///
/// Everything that does not depend on the candidate (annuity factor, fuel
/// cost, annual load) is computed once so the optimizer can reuse the
/// evaluator across the whole grid.
#[derive(Debug, Clone)]
pub struct CostEvaluator<'a> {
    assumptions: &'a CostAssumptionSet,
    crf: f64,
    gas_cost_per_mwh: f64,
    annual_load_mwh: f64,
}

impl<'a> CostEvaluator<'a> {
    /// Creates an evaluator.
    ///
    /// # Arguments
    ///
    /// * `assumptions` - Resolved cost set
    /// * `target_load_mw` - Mean load; the LCOE denominator is `load × 8760`
    /// * `heat_rate_btu_per_kwh` - Backup gas heat rate
    /// * `gas_price_per_mmbtu` - Fuel price
    pub fn new(
        assumptions: &'a CostAssumptionSet,
        target_load_mw: f64,
        heat_rate_btu_per_kwh: f64,
        gas_price_per_mmbtu: f64,
    ) -> Self {
        Self {
            assumptions,
            crf: capital_recovery_factor(assumptions.wacc, assumptions.project_lifetime_years),
            gas_cost_per_mwh: gas_marginal_cost_per_mwh(
                heat_rate_btu_per_kwh,
                gas_price_per_mmbtu,
                assumptions.gas_variable_om_per_mwh,
            ),
            annual_load_mwh: target_load_mw * HOURS_PER_YEAR as f64,
        }
    }

    /// Capital recovery factor in use.
    pub fn crf(&self) -> f64 {
        self.crf
    }

    /// Annual solar cost ($/yr).
    pub fn annual_solar_cost(&self, solar_mw: f64) -> f64 {
        let a = self.assumptions;
        let kw = solar_mw * 1000.0;
        kw * a.solar_capex_per_kw * (1.0 - a.itc_rate) * self.crf + kw * a.solar_om_per_kw_year
    }

    /// Annual battery cost ($/yr); zero when there is no battery power.
    pub fn annual_battery_cost(&self, power_mw: f64, energy_mwh: f64) -> f64 {
        if power_mw <= 0.0 {
            return 0.0;
        }
        let a = self.assumptions;
        let capex = power_mw * 1000.0 * a.battery_capex_per_kw
            + energy_mwh * 1000.0 * a.battery_capex_per_kwh;
        capex * (1.0 - a.itc_rate) * self.crf + power_mw * 1000.0 * a.battery_om_per_kw_year
    }

    /// Annual gas cost ($/yr) for `annual_gas_mwh` of generation.
    pub fn annual_gas_cost(&self, annual_gas_mwh: f64) -> f64 {
        annual_gas_mwh * self.gas_cost_per_mwh
    }

    /// Prices one configuration.
    ///
    /// # Arguments
    ///
    /// * `solar_mw` - Solar nameplate
    /// * `battery_power_mw` - Battery power rating
    /// * `battery_energy_mwh` - Battery energy capacity
    /// * `annual_gas_mwh` - Gas generation already annualized by the caller
    ///
    /// # Returns
    ///
    /// Per-technology $/MWh; `total` is infinite if the annual load is zero.
    pub fn evaluate(
        &self,
        solar_mw: f64,
        battery_power_mw: f64,
        battery_energy_mwh: f64,
        annual_gas_mwh: f64,
    ) -> LcoeBreakdown {
        let denom = self.annual_load_mwh;
        if denom <= 0.0 {
            return LcoeBreakdown {
                total: f64::INFINITY,
                ..LcoeBreakdown::default()
            };
        }

        let solar_cost = self.annual_solar_cost(solar_mw) / denom;
        let battery_cost = self.annual_battery_cost(battery_power_mw, battery_energy_mwh) / denom;
        let gas_cost = self.annual_gas_cost(annual_gas_mwh) / denom;
        let excess_solar_revenue = 0.0;

        LcoeBreakdown {
            solar_cost,
            battery_cost,
            gas_cost,
            excess_solar_revenue,
            total: solar_cost + battery_cost + gas_cost - excess_solar_revenue,
        }
    }
}
