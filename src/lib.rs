//! Hybrid solar + battery + gas-backup sizing.
//!
//! Given a target load, a site latitude, and cost assumptions, the crate
//! simulates hourly dispatch for a grid of candidate plant sizes and reports
//! the configuration with the lowest levelized cost that keeps gas backup
//! under a limit, alongside a gas-only baseline.
//!
//! ```no_run
//! use hybrid_sizer::{OptimizeParams, optimize};
//!
//! let params = OptimizeParams::default();
//! if let Ok(result) = optimize(&params) {
//!     println!("{result}");
//! }
//! ```

#[cfg(feature = "api")]
pub mod api;
pub mod cli;
pub mod config;
/// Technology costs, LCOE, and the gas-only baseline.
pub mod cost;
pub mod error;
/// File export.
pub mod io;
pub mod logging;
pub mod optimize;
pub mod optimizer;
pub mod profile;
pub mod resilience;
pub mod result;
/// Hourly dispatch simulation.
pub mod sim;
pub mod task;

pub use error::SizingError;
pub use optimize::{OptimizeParams, optimize, optimize_with};
pub use result::{OptimizationResult, SolverStatus};
