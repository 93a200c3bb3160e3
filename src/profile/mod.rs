//! Hourly input curves: normalized solar output and site load.

/// Site load curves (flat or synthetic diurnal).
pub mod load;
/// Parametric solar capacity-factor profile.
pub mod solar;
pub mod types;

pub use load::{LoadProfile, LoadShape};
pub use solar::SolarProfile;
pub use types::Resolution;
