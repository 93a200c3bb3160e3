//! Hourly dispatch engine: solar first, then battery, then gas.

use super::battery::BatteryStore;
use super::power_balance::split_residual;
use super::types::{DispatchParams, DispatchRun, DispatchTimestep, DispatchTotals, TraceMode};

/// Dispatch engine for one candidate configuration.
///
/// Borrows the load and solar curves so the optimizer can share one pair of
/// profiles across every candidate it evaluates. The battery is the only
/// state carried between steps.
pub struct DispatchEngine<'a> {
    params: &'a DispatchParams,
    load_mw: &'a [f64],
    solar_cf: &'a [f64],
    battery: BatteryStore,
}

impl<'a> DispatchEngine<'a> {
    /// Creates a new engine with the battery at its initial state of charge.
    ///
    /// # Arguments
    ///
    /// * `params` - Plant sizing and efficiencies
    /// * `load_mw` - Per-step load (MW)
    /// * `solar_cf` - Per-step normalized solar output (0..=1)
    ///
    /// When the two curves differ in length only the common prefix is run.
    pub fn new(params: &'a DispatchParams, load_mw: &'a [f64], solar_cf: &'a [f64]) -> Self {
        let battery = BatteryStore::new(
            params.battery_power_mw,
            params.battery_energy_mwh,
            params.round_trip_efficiency,
        );
        Self {
            params,
            load_mw,
            solar_cf,
            battery,
        }
    }

    /// Number of steps [`run`](Self::run) will execute.
    pub fn steps(&self) -> usize {
        self.load_mw.len().min(self.solar_cf.len())
    }

    /// Executes one hourly step and returns its energy balance together with
    /// the solar generation (MW AC) it was computed from.
    ///
    /// # Arguments
    ///
    /// * `t` - Timestep index, must be `< steps()`
    pub fn step(&mut self, t: usize) -> (DispatchTimestep, f64) {
        let load = self.load_mw[t];
        let generation =
            self.params.solar_mw * self.solar_cf[t] * self.params.inverter_efficiency;
        let residual = load - generation;

        let (solar_to_load, battery_net, gas, curtailed, unmet) = if residual <= 0.0 {
            let surplus = -residual;
            let charged = self.battery.charge(surplus);
            (load, -charged, 0.0, surplus - charged, 0.0)
        } else {
            let discharged = self.battery.discharge(residual);
            let (gas, unmet) =
                split_residual(residual - discharged, self.params.gas_capacity_mw);
            (generation, discharged, gas, 0.0, unmet)
        };

        let step = DispatchTimestep {
            timestep: t,
            load_mw: load,
            solar_to_load_mw: solar_to_load,
            battery_net_mw: battery_net,
            gas_mw: gas,
            curtailed_mw: curtailed,
            unmet_mw: unmet,
            state_of_charge_mwh: self.battery.soc_mwh(),
        };
        (step, generation)
    }

    /// Runs every step and returns the period totals, plus the per-step trace
    /// when `mode` is [`TraceMode::Full`].
    pub fn run(mut self, mode: TraceMode) -> DispatchRun {
        let steps = self.steps();
        let mut totals = DispatchTotals::default();
        let mut trace = match mode {
            TraceMode::Full => Vec::with_capacity(steps),
            TraceMode::MetricsOnly => Vec::new(),
        };

        for t in 0..steps {
            let (step, generation) = self.step(t);
            totals.record(&step, generation);
            if mode == TraceMode::Full {
                trace.push(step);
            }
        }

        DispatchRun { totals, trace }
    }
}

/// Simulates one configuration over the given curves.
///
/// Convenience wrapper around [`DispatchEngine`].
///
/// # Examples
///
/// ```
/// use hybrid_sizer::sim::engine::simulate;
/// use hybrid_sizer::sim::types::{DispatchParams, TraceMode};
///
/// let params = DispatchParams::new(0.0, 0.0, 0.0, 0.87, 0.97);
/// let run = simulate(&[10.0; 24], &[0.5; 24], &params, TraceMode::MetricsOnly);
/// assert_eq!(run.totals.gas_mwh, 240.0);
/// assert!(run.trace.is_empty());
/// ```
pub fn simulate(
    load_mw: &[f64],
    solar_cf: &[f64],
    params: &DispatchParams,
    mode: TraceMode,
) -> DispatchRun {
    DispatchEngine::new(params, load_mw, solar_cf).run(mode)
}
