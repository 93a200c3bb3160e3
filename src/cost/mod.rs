//! Cost assumptions, hybrid LCOE, and the gas-only baseline.

pub mod assumptions;
pub mod gas_only;
pub mod lcoe;

pub use assumptions::{CostAssumptionSet, CostScenario, CostTable, CostTableError};
pub use gas_only::gas_only_lcoe;
pub use lcoe::{CostEvaluator, LcoeBreakdown, capital_recovery_factor};
