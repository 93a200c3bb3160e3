use std::f64::consts::PI;

use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};

use super::types::Resolution;

/// Shape of the load the hybrid plant has to serve.
///
/// Thermal sites and data centers are usually modelled flat; the diurnal
/// shape adds a daily swing and seeded noise for sensitivity runs.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LoadShape {
    /// Constant `target_load_mw` every hour.
    #[default]
    Flat,
    /// Sinusoidal daily swing around the target with Gaussian noise.
    Diurnal {
        /// Swing amplitude as a fraction of the target load (0.0–1.0).
        amplitude_frac: f64,
        /// Phase offset in radians; 0 puts the minimum at 06:00.
        #[serde(default)]
        phase_rad: f64,
        /// Noise standard deviation as a fraction of the target load.
        #[serde(default)]
        noise_std: f64,
        /// Seed for the noise generator.
        #[serde(default = "default_seed")]
        seed: u64,
    },
}

fn default_seed() -> u64 {
    42
}

/// Hourly load in MW aligned with a solar profile.
///
/// The mean always equals the requested target load, so annual energy and
/// LCOE denominators stay `target × 8760` whatever the shape.
///
/// # Examples
///
/// ```
/// use hybrid_sizer::profile::{LoadProfile, LoadShape, Resolution};
///
/// let flat = LoadProfile::build(100.0, &LoadShape::Flat, Resolution::Representative);
/// assert_eq!(flat.len(), 288);
/// assert!(flat.values().iter().all(|&mw| mw == 100.0));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct LoadProfile {
    values: Vec<f64>,
    mean_mw: f64,
}

impl LoadProfile {
    /// Builds a load profile.
    ///
    /// # Arguments
    ///
    /// * `target_mw` - Mean load in MW (must be finite and >= 0)
    /// * `shape` - Flat or diurnal
    /// * `resolution` - Must match the solar profile it will be paired with
    pub fn build(target_mw: f64, shape: &LoadShape, resolution: Resolution) -> Self {
        let steps = resolution.steps();
        let values = match *shape {
            LoadShape::Flat => vec![target_mw; steps],
            LoadShape::Diurnal {
                amplitude_frac,
                phase_rad,
                noise_std,
                seed,
            } => diurnal(target_mw, amplitude_frac, phase_rad, noise_std, seed, steps),
        };
        Self {
            values,
            mean_mw: target_mw,
        }
    }

    /// Wraps an explicit curve, e.g. a metered profile.
    ///
    /// The mean is taken from the data.
    pub fn from_values(values: Vec<f64>) -> Self {
        let mean_mw = if values.is_empty() {
            0.0
        } else {
            values.iter().sum::<f64>() / values.len() as f64
        };
        Self { values, mean_mw }
    }

    /// Per-timestep load in MW.
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

    /// Mean load in MW.
    pub fn mean_mw(&self) -> f64 {
        self.mean_mw
    }

    /// Total energy over the profile in MWh (1-hour steps).
    pub fn energy_mwh(&self) -> f64 {
        self.values.iter().sum()
    }
}

fn diurnal(
    target_mw: f64,
    amplitude_frac: f64,
    phase_rad: f64,
    noise_std: f64,
    seed: u64,
    steps: usize,
) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let amplitude = amplitude_frac.clamp(0.0, 1.0);

    let mut values: Vec<f64> = (0..steps)
        .map(|t| {
            let hour = (t % 24) as f64;
            let swing = amplitude * (2.0 * PI * (hour - 12.0) / 24.0 + phase_rad).sin();
            let noise = gaussian_noise(&mut rng, noise_std);
            (target_mw * (1.0 + swing + noise)).max(0.0)
        })
        .collect();

    let sum: f64 = values.iter().sum();
    if sum > 0.0 {
        let scale = target_mw * steps as f64 / sum;
        for v in &mut values {
            *v *= scale;
        }
    }
    values
}

/// Zero-mean Gaussian sample via Box-Muller.
pub fn gaussian_noise(rng: &mut StdRng, std_dev: f64) -> f64 {
    if std_dev <= 0.0 {
        return 0.0;
    }

    let u1: f64 = rng.random::<f64>().clamp(1e-12, 1.0);
    let u2: f64 = rng.random::<f64>();
    let z0 = (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos();
    z0 * std_dev
}
