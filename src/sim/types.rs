//! Core dispatch types: plant parameters, per-step records, and period totals.

use std::fmt;

use serde::Serialize;

/// Whether the engine keeps per-timestep records.
///
/// The optimizer runs thousands of candidates in `MetricsOnly` mode and
/// re-simulates the winner with `Full` to build the dispatch trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceMode {
    /// Totals only.
    MetricsOnly,
    /// Totals plus one [`DispatchTimestep`] per step.
    Full,
}

/// Physical parameters of one hybrid configuration.
///
/// # Examples
///
/// ```
/// use hybrid_sizer::sim::types::DispatchParams;
///
/// let p = DispatchParams::new(250.0, 80.0, 320.0, 0.87, 0.97);
/// assert_eq!(p.gas_capacity_mw, None);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchParams {
    /// Solar nameplate (MW DC).
    pub solar_mw: f64,
    /// Battery charge/discharge power limit (MW).
    pub battery_power_mw: f64,
    /// Battery energy capacity (MWh).
    pub battery_energy_mwh: f64,
    /// Battery round-trip efficiency, applied on charge (0..=1).
    pub round_trip_efficiency: f64,
    /// DC→AC conversion efficiency applied to solar output (0..=1).
    pub inverter_efficiency: f64,
    /// Gas output cap (MW); `None` means gas covers any deficit.
    pub gas_capacity_mw: Option<f64>,
}

impl DispatchParams {
    /// Creates parameters with unconstrained gas.
    pub fn new(
        solar_mw: f64,
        battery_power_mw: f64,
        battery_energy_mwh: f64,
        round_trip_efficiency: f64,
        inverter_efficiency: f64,
    ) -> Self {
        Self {
            solar_mw,
            battery_power_mw,
            battery_energy_mwh,
            round_trip_efficiency,
            inverter_efficiency,
            gas_capacity_mw: None,
        }
    }

    /// Returns a copy with the gas output capped at `gas_capacity_mw`.
    pub fn with_gas_capacity(mut self, gas_capacity_mw: Option<f64>) -> Self {
        self.gas_capacity_mw = gas_capacity_mw;
        self
    }
}

/// Energy balance for one hourly timestep.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchTimestep {
    /// Timestep index.
    pub timestep: usize,
    /// Load to serve (MW).
    pub load_mw: f64,
    /// Solar energy delivered directly to load (MW).
    pub solar_to_load_mw: f64,
    /// Battery power; positive = discharge to load, negative = charging from solar.
    pub battery_net_mw: f64,
    /// Gas output (MW).
    pub gas_mw: f64,
    /// Solar surplus neither served nor stored (MW).
    pub curtailed_mw: f64,
    /// Load left unserved because gas capacity bound (MW).
    pub unmet_mw: f64,
    /// Battery state of charge after this step (MWh).
    pub state_of_charge_mwh: f64,
}

impl fmt::Display for DispatchTimestep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "t={:>4} (h{:>2}) | load={:>8.2} MW | solar={:>8.2}  bat={:>8.2}  gas={:>8.2} \
             curt={:>8.2}  unmet={:>6.2} | SoC={:>9.2} MWh",
            self.timestep,
            self.timestep % 24,
            self.load_mw,
            self.solar_to_load_mw,
            self.battery_net_mw,
            self.gas_mw,
            self.curtailed_mw,
            self.unmet_mw,
            self.state_of_charge_mwh,
        )
    }
}

/// Energy totals accumulated over a simulated period (MWh).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchTotals {
    /// Number of simulated timesteps.
    pub steps: usize,
    /// Load energy.
    pub load_mwh: f64,
    /// Solar generation after inverter losses.
    pub solar_generation_mwh: f64,
    /// Solar energy served directly to load.
    pub solar_to_load_mwh: f64,
    /// Energy drawn from solar into the battery.
    pub battery_charge_mwh: f64,
    /// Energy discharged from the battery to load.
    pub battery_discharge_mwh: f64,
    /// Gas generation.
    pub gas_mwh: f64,
    /// Curtailed solar.
    pub curtailed_mwh: f64,
    /// Unserved load.
    pub unmet_mwh: f64,
}

impl DispatchTotals {
    /// Share of load energy supplied by gas.
    pub fn gas_fraction(&self) -> f64 {
        ratio(self.gas_mwh, self.load_mwh)
    }

    /// Share of load energy left unserved.
    pub fn unmet_fraction(&self) -> f64 {
        ratio(self.unmet_mwh, self.load_mwh)
    }

    /// Share of solar generation that was curtailed.
    pub fn curtailment_fraction(&self) -> f64 {
        ratio(self.curtailed_mwh, self.solar_generation_mwh)
    }

    /// Scales every energy total by `factor` (e.g. representative → annual).
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            steps: self.steps,
            load_mwh: self.load_mwh * factor,
            solar_generation_mwh: self.solar_generation_mwh * factor,
            solar_to_load_mwh: self.solar_to_load_mwh * factor,
            battery_charge_mwh: self.battery_charge_mwh * factor,
            battery_discharge_mwh: self.battery_discharge_mwh * factor,
            gas_mwh: self.gas_mwh * factor,
            curtailed_mwh: self.curtailed_mwh * factor,
            unmet_mwh: self.unmet_mwh * factor,
        }
    }

    pub(crate) fn record(&mut self, step: &DispatchTimestep, solar_generation_mw: f64) {
        self.steps += 1;
        self.load_mwh += step.load_mw;
        self.solar_generation_mwh += solar_generation_mw;
        self.solar_to_load_mwh += step.solar_to_load_mw;
        if step.battery_net_mw >= 0.0 {
            self.battery_discharge_mwh += step.battery_net_mw;
        } else {
            self.battery_charge_mwh -= step.battery_net_mw;
        }
        self.gas_mwh += step.gas_mw;
        self.curtailed_mwh += step.curtailed_mw;
        self.unmet_mwh += step.unmet_mw;
    }
}

fn ratio(num: f64, den: f64) -> f64 {
    if den > 0.0 { num / den } else { 0.0 }
}

/// Outcome of one simulation run.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchRun {
    /// Period totals.
    pub totals: DispatchTotals,
    /// Per-step records; empty in [`TraceMode::MetricsOnly`].
    pub trace: Vec<DispatchTimestep>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(battery_net_mw: f64) -> DispatchTimestep {
        DispatchTimestep {
            timestep: 0,
            load_mw: 10.0,
            solar_to_load_mw: 4.0,
            battery_net_mw,
            gas_mw: 2.0,
            curtailed_mw: 1.0,
            unmet_mw: 0.5,
            state_of_charge_mwh: 3.0,
        }
    }

    #[test]
    fn totals_split_battery_direction() {
        let mut totals = DispatchTotals::default();
        totals.record(&step(3.0), 5.0);
        totals.record(&step(-2.0), 7.0);
        assert_eq!(totals.steps, 2);
        assert_eq!(totals.battery_discharge_mwh, 3.0);
        assert_eq!(totals.battery_charge_mwh, 2.0);
        assert_eq!(totals.solar_generation_mwh, 12.0);
        assert_eq!(totals.load_mwh, 20.0);
    }

    #[test]
    fn fractions_handle_zero_denominators() {
        let totals = DispatchTotals::default();
        assert_eq!(totals.gas_fraction(), 0.0);
        assert_eq!(totals.unmet_fraction(), 0.0);
        assert_eq!(totals.curtailment_fraction(), 0.0);
    }

    #[test]
    fn scaling_keeps_fractions() {
        let mut totals = DispatchTotals::default();
        totals.record(&step(1.0), 6.0);
        let annual = totals.scaled(365.0 / 12.0);
        assert!((annual.gas_fraction() - totals.gas_fraction()).abs() < 1e-12);
        assert_eq!(annual.steps, 1);
    }

    #[test]
    fn timestep_display_does_not_panic() {
        let s = format!("{}", step(-1.0));
        assert!(s.contains("load="));
    }
}
