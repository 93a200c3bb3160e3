//! Post-hoc hour-of-day averages from a dispatch trace.

use std::fmt;

use serde::Serialize;

use super::types::DispatchTimestep;

/// Average dispatch for one hour of the day across every simulated day.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HourlyDispatch {
    /// Hour of day (0–23).
    pub hour: usize,
    /// Mean load (MW).
    pub load_avg: f64,
    /// Mean solar served directly to load (MW).
    pub solar_avg: f64,
    /// Mean battery power; positive = discharge (MW).
    pub batt_avg: f64,
    /// Mean gas output (MW).
    pub gas_avg: f64,
    /// Mean curtailment (MW).
    pub curtailed_avg: f64,
    /// Mean battery state of charge (MWh).
    pub soc_avg: f64,
}

/// Collapses a trace into 24 hour-of-day averages.
///
/// Returns an empty vector for an empty trace. Hours that never occur in a
/// short trace are reported as zero.
pub fn representative_day(trace: &[DispatchTimestep]) -> Vec<HourlyDispatch> {
    if trace.is_empty() {
        return Vec::new();
    }

    let mut sums = [[0.0_f64; 6]; 24];
    let mut counts = [0_usize; 24];
    for s in trace {
        let h = s.timestep % 24;
        counts[h] += 1;
        let acc = &mut sums[h];
        acc[0] += s.load_mw;
        acc[1] += s.solar_to_load_mw;
        acc[2] += s.battery_net_mw;
        acc[3] += s.gas_mw;
        acc[4] += s.curtailed_mw;
        acc[5] += s.state_of_charge_mwh;
    }

    (0..24)
        .map(|hour| {
            let n = counts[hour].max(1) as f64;
            let acc = sums[hour];
            HourlyDispatch {
                hour,
                load_avg: acc[0] / n,
                solar_avg: acc[1] / n,
                batt_avg: acc[2] / n,
                gas_avg: acc[3] / n,
                curtailed_avg: acc[4] / n,
                soc_avg: acc[5] / n,
            }
        })
        .collect()
}

impl fmt::Display for HourlyDispatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:00  load {:>8.1}  solar {:>8.1}  batt {:>8.1}  gas {:>8.1}  curt {:>8.1}",
            self.hour, self.load_avg, self.solar_avg, self.batt_avg, self.gas_avg, self.curtailed_avg
        )
    }
}
