/// Fraction of energy capacity the battery starts each run with.
pub const INITIAL_SOC_FRACTION: f64 = 0.5;

/// Battery state tracked across one simulation run.
///
/// Works in hourly energy: a 1-hour step means MW and MWh are interchangeable.
/// Round-trip losses are charged on the way in; discharge is lossless.
///
/// # Examples
///
/// ```
/// use hybrid_sizer::sim::battery::BatteryStore;
///
/// let mut b = BatteryStore::new(50.0, 200.0, 0.9);
/// assert_eq!(b.soc_mwh(), 100.0);
/// let drawn = b.charge(80.0);
/// assert_eq!(drawn, 50.0); // power-limited
/// assert!((b.soc_mwh() - 145.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct BatteryStore {
    power_mw: f64,
    energy_capacity_mwh: f64,
    round_trip_efficiency: f64,
    soc_mwh: f64,
}

impl BatteryStore {
    /// Creates a battery at 50 % state of charge.
    ///
    /// Negative sizes are treated as zero.
    pub fn new(power_mw: f64, energy_capacity_mwh: f64, round_trip_efficiency: f64) -> Self {
        let energy_capacity_mwh = energy_capacity_mwh.max(0.0);
        Self {
            power_mw: power_mw.max(0.0),
            energy_capacity_mwh,
            round_trip_efficiency,
            soc_mwh: energy_capacity_mwh * INITIAL_SOC_FRACTION,
        }
    }

    /// Absorbs up to `surplus_mw` for one hour and returns the power drawn.
    ///
    /// Limited by the power rating and by the headroom grossed up for losses.
    pub fn charge(&mut self, surplus_mw: f64) -> f64 {
        if surplus_mw <= 0.0 || self.round_trip_efficiency <= 0.0 {
            return 0.0;
        }
        let headroom = (self.energy_capacity_mwh - self.soc_mwh) / self.round_trip_efficiency;
        let drawn = surplus_mw.min(self.power_mw).min(headroom.max(0.0));
        self.soc_mwh = (self.soc_mwh + drawn * self.round_trip_efficiency)
            .clamp(0.0, self.energy_capacity_mwh);
        drawn
    }

    /// Delivers up to `deficit_mw` for one hour and returns the power delivered.
    pub fn discharge(&mut self, deficit_mw: f64) -> f64 {
        if deficit_mw <= 0.0 {
            return 0.0;
        }
        let delivered = deficit_mw.min(self.power_mw).min(self.soc_mwh);
        self.soc_mwh = (self.soc_mwh - delivered).clamp(0.0, self.energy_capacity_mwh);
        delivered
    }

    /// Current stored energy (MWh).
    pub fn soc_mwh(&self) -> f64 {
        self.soc_mwh
    }

    /// Energy capacity (MWh).
    pub fn energy_capacity_mwh(&self) -> f64 {
        self.energy_capacity_mwh
    }

    /// Power rating (MW).
    pub fn power_mw(&self) -> f64 {
        self.power_mw
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_half_full() {
        let b = BatteryStore::new(10.0, 40.0, 0.9);
        assert_eq!(b.soc_mwh(), 20.0);
    }

    #[test]
    fn charge_limited_by_headroom_and_losses() {
        let mut b = BatteryStore::new(100.0, 10.0, 0.8);
        // 5 MWh headroom / 0.8 = 6.25 MW drawn
        let drawn = b.charge(50.0);
        assert!((drawn - 6.25).abs() < 1e-12);
        assert!((b.soc_mwh() - 10.0).abs() < 1e-12);
        assert_eq!(b.charge(5.0), 0.0);
    }

    #[test]
    fn discharge_limited_by_power() {
        let mut b = BatteryStore::new(3.0, 10.0, 1.0);
        assert_eq!(b.discharge(8.0), 3.0);
        assert_eq!(b.soc_mwh(), 2.0);
    }

    #[test]
    fn discharge_limited_by_stored_energy() {
        let mut b = BatteryStore::new(10.0, 4.0, 1.0);
        assert_eq!(b.discharge(8.0), 2.0);
        assert_eq!(b.soc_mwh(), 0.0);
        assert_eq!(b.discharge(1.0), 0.0);
    }

    #[test]
    fn zero_sized_battery_is_inert() {
        let mut b = BatteryStore::new(0.0, 0.0, 0.9);
        assert_eq!(b.charge(10.0), 0.0);
        assert_eq!(b.discharge(10.0), 0.0);
        assert_eq!(b.soc_mwh(), 0.0);
    }

    #[test]
    fn full_cycle_loses_round_trip_energy() {
        let mut b = BatteryStore::new(5.0, 20.0, 0.85);
        b.discharge(10.0);
        b.discharge(10.0);
        assert_eq!(b.soc_mwh(), 0.0);

        let mut drawn = 0.0;
        while b.soc_mwh() < 20.0 - 1e-9 {
            drawn += b.charge(5.0);
        }
        let mut delivered = 0.0;
        while b.soc_mwh() > 1e-9 {
            delivered += b.discharge(5.0);
        }
        assert!((delivered / drawn - 0.85).abs() < 1e-9);
    }
}
