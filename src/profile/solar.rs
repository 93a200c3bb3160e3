use std::f64::consts::PI;

use super::types::Resolution;

/// Capacity factor used when the caller gives no hint.
pub const DEFAULT_CAPACITY_FACTOR: f64 = 0.18;

/// Lowest capacity factor the generator will target.
pub const MIN_CAPACITY_FACTOR: f64 = 0.12;

/// Latitudes are clamped to ±60° before any trigonometry.
pub const MAX_MODELED_LATITUDE: f64 = 60.0;

/// Bound on `cos(hour_angle)` that keeps `acos` inside its domain.
const HOUR_ANGLE_COS_LIMIT: f64 = 0.99;

/// Amplitude of the seasonal output multiplier.
const SEASONAL_AMPLITUDE: f64 = 0.3;

/// Passes spent redistributing energy removed by the 1.0 clip.
const MAX_RESCALE_PASSES: usize = 64;

/// Relative error at which rescaling stops.
const RESCALE_TOLERANCE: f64 = 1e-12;

/// A normalized solar output curve, one capacity-factor value per hour.
///
/// Values lie in `[0, 1]`, are zero at night, and average to the target
/// capacity factor. Generation is a pure function of latitude, capacity factor,
/// and resolution.
///
/// # Examples
///
/// ```
/// use hybrid_sizer::profile::{Resolution, SolarProfile};
///
/// let profile = SolarProfile::generate(39.0, Some(0.20), Resolution::Representative);
/// assert_eq!(profile.len(), 288);
/// assert!((profile.capacity_factor() - 0.20).abs() < 1e-9);
/// assert_eq!(profile.values()[0], 0.0); // midnight in January
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SolarProfile {
    values: Vec<f64>,
    resolution: Resolution,
    latitude_deg: f64,
    target_cf: f64,
}

impl SolarProfile {
    /// Builds the profile for a site.
    ///
    /// # Arguments
    ///
    /// * `latitude_deg` - Site latitude; clamped to ±60°
    /// * `cf_hint` - Target annual capacity factor; `None` uses 0.18, values
    ///   below 0.12 are raised to 0.12, values above 1.0 are capped
    /// * `resolution` - Full year (8760) or representative (288)
    pub fn generate(latitude_deg: f64, cf_hint: Option<f64>, resolution: Resolution) -> Self {
        let latitude_deg = latitude_deg.clamp(-MAX_MODELED_LATITUDE, MAX_MODELED_LATITUDE);
        let target_cf = effective_capacity_factor(cf_hint);

        let mut values = Vec::with_capacity(resolution.steps());
        for day in 0..resolution.days() {
            let (day_of_year, month) = resolution.day_calendar(day);
            push_day(&mut values, latitude_deg, day_of_year, month);
        }
        rescale_to_mean(&mut values, target_cf);

        Self {
            values,
            resolution,
            latitude_deg,
            target_cf,
        }
    }

    /// Per-timestep capacity factors.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Number of timesteps.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` when the profile has no timesteps.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Resolution the profile was generated at.
    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    /// Latitude after clamping.
    pub fn latitude_deg(&self) -> f64 {
        self.latitude_deg
    }

    /// Capacity factor the profile was scaled to.
    pub fn target_capacity_factor(&self) -> f64 {
        self.target_cf
    }

    /// Realized mean capacity factor.
    pub fn capacity_factor(&self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        self.values.iter().sum::<f64>() / self.values.len() as f64
    }
}

/// Resolves the capacity-factor hint to the value the generator targets.
pub fn effective_capacity_factor(cf_hint: Option<f64>) -> f64 {
    match cf_hint {
        None => DEFAULT_CAPACITY_FACTOR,
        Some(cf) if cf > MIN_CAPACITY_FACTOR => cf.min(1.0),
        Some(_) => MIN_CAPACITY_FACTOR,
    }
}

/// Solar declination in radians for a 1-based day of year.
pub fn declination_rad(day_of_year: u32) -> f64 {
    let deg = 23.45 * (2.0 * PI / 365.0 * (284.0 + f64::from(day_of_year))).sin();
    deg.to_radians()
}

/// Hours between sunrise and sunset.
///
/// The hour-angle cosine is clamped so that polar day and night degrade to
/// very long or very short days instead of NaN.
pub fn day_length_hours(latitude_deg: f64, day_of_year: u32) -> f64 {
    let lat = latitude_deg.to_radians();
    let cos_h = (-lat.tan() * declination_rad(day_of_year).tan())
        .clamp(-HOUR_ANGLE_COS_LIMIT, HOUR_ANGLE_COS_LIMIT);
    2.0 * cos_h.acos().to_degrees() / 15.0
}

/// Seasonal output multiplier for a 1-based month.
fn seasonal_multiplier(latitude_deg: f64, month: u32) -> f64 {
    let peak_month = if latitude_deg >= 0.0 { 6.0 } else { 12.0 };
    1.0 + SEASONAL_AMPLITUDE * ((f64::from(month) - peak_month) * PI / 6.0).cos()
}

/// Appends 24 unscaled hourly values for one day.
fn push_day(values: &mut Vec<f64>, latitude_deg: f64, day_of_year: u32, month: u32) {
    let day_length = day_length_hours(latitude_deg, day_of_year);
    let sunrise = 12.0 - day_length / 2.0;
    let sunset = 12.0 + day_length / 2.0;
    let seasonal = seasonal_multiplier(latitude_deg, month);

    for hour in 0..24 {
        let t = hour as f64 + 0.5;
        let v = if t > sunrise && t < sunset {
            (PI * (t - 12.0) / day_length).cos() * seasonal
        } else {
            0.0
        };
        values.push(v);
    }
}

/// Scales `values` so their mean is `target_cf`, clipping at 1.0.
///
/// Energy lost to clipping is handed back to the unclipped values until the
/// mean matches or nothing is left to scale.
fn rescale_to_mean(values: &mut [f64], target_cf: f64) {
    let target_sum = target_cf * values.len() as f64;
    let raw_sum: f64 = values.iter().sum();
    if raw_sum <= 0.0 {
        return;
    }

    let scale = target_sum / raw_sum;
    for v in values.iter_mut() {
        *v = (*v * scale).min(1.0);
    }

    for _ in 0..MAX_RESCALE_PASSES {
        let (clipped, free) = values.iter().fold((0.0, 0.0), |(c, f), &v| {
            if v >= 1.0 { (c + v, f) } else { (c, f + v) }
        });
        if (target_sum - clipped - free).abs() <= RESCALE_TOLERANCE * target_sum || free <= 0.0 {
            break;
        }
        let scale = (target_sum - clipped) / free;
        for v in values.iter_mut().filter(|v| **v < 1.0) {
            *v = (*v * scale).min(1.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equator_day_length_is_about_twelve_hours() {
        for doy in [1, 80, 172, 355] {
            let h = day_length_hours(0.0, doy);
            assert!((h - 12.0).abs() < 1e-9, "doy={doy} len={h}");
        }
    }

    #[test]
    fn northern_summer_days_are_longer() {
        assert!(day_length_hours(39.0, 172) > 14.0);
        assert!(day_length_hours(39.0, 355) < 10.0);
        assert!(day_length_hours(-39.0, 355) > 14.0);
    }

    #[test]
    fn extreme_latitude_stays_finite() {
        for lat in [-90.0, -60.0, 60.0, 89.9] {
            let p = SolarProfile::generate(lat, Some(0.2), Resolution::Representative);
            assert!(p.values().iter().all(|v| v.is_finite()));
            assert!(p.latitude_deg().abs() <= MAX_MODELED_LATITUDE);
        }
    }

    #[test]
    fn capacity_factor_defaults_and_floor() {
        assert_eq!(effective_capacity_factor(None), 0.18);
        assert_eq!(effective_capacity_factor(Some(0.0)), 0.12);
        assert_eq!(effective_capacity_factor(Some(-0.3)), 0.12);
        assert_eq!(effective_capacity_factor(Some(0.05)), 0.12);
        assert_eq!(effective_capacity_factor(Some(0.25)), 0.25);
        assert_eq!(effective_capacity_factor(Some(3.0)), 1.0);
    }

    #[test]
    fn mean_matches_target_across_range() {
        for lat in [-60.0, -39.0, -10.0, 0.0, 25.0, 39.0, 60.0] {
            for cf in [0.12, 0.18, 0.25, 0.33, 0.40] {
                for res in [Resolution::Representative, Resolution::FullYear] {
                    let p = SolarProfile::generate(lat, Some(cf), res);
                    let rel = (p.capacity_factor() - cf).abs() / cf;
                    assert!(rel < 1e-6, "lat={lat} cf={cf} res={res:?} mean={}", p.capacity_factor());
                    assert!(p.values().iter().all(|&v| (0.0..=1.0).contains(&v)));
                }
            }
        }
    }

    #[test]
    fn night_hours_are_zero() {
        let p = SolarProfile::generate(39.0, Some(0.2), Resolution::Representative);
        for month in 0..12 {
            let day = &p.values()[month * 24..month * 24 + 24];
            assert_eq!(day[0], 0.0);
            assert_eq!(day[1], 0.0);
            assert_eq!(day[23], 0.0);
            assert!(day[12] > 0.0);
        }
    }

    #[test]
    fn summer_outproduces_winter_in_both_hemispheres() {
        let north = SolarProfile::generate(39.0, Some(0.2), Resolution::Representative);
        let south = SolarProfile::generate(-39.0, Some(0.2), Resolution::Representative);
        let day_sum = |p: &SolarProfile, m: usize| p.values()[m * 24..m * 24 + 24].iter().sum::<f64>();
        assert!(day_sum(&north, 5) > day_sum(&north, 11));
        assert!(day_sum(&south, 11) > day_sum(&south, 5));
    }

    #[test]
    fn generation_is_deterministic() {
        let a = SolarProfile::generate(33.4, Some(0.27), Resolution::FullYear);
        let b = SolarProfile::generate(33.4, Some(0.27), Resolution::FullYear);
        assert_eq!(a, b);
    }
}
