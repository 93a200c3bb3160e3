//! Shared test fixtures for integration tests.

#![allow(dead_code)]

use hybrid_sizer::cost::assumptions::CostTable;
use hybrid_sizer::optimizer::control::RunControl;
use hybrid_sizer::optimizer::grid::{GridSearch, SearchGrid};
use hybrid_sizer::{OptimizationResult, OptimizeParams, SizingError, optimize_with};

/// 100 MW / 39°N / CF 0.20 / 9000 Btu/kWh / 5 % gas / base 2027 / $3.50.
pub fn prototype_params() -> OptimizeParams {
    OptimizeParams {
        target_load_mw: 100.0,
        latitude: 39.0,
        solar_cf_hint: Some(0.20),
        heat_rate_btu_per_kwh: 9000.0,
        max_gas_backup_fraction: 0.05,
        commissioning_year: 2027,
        cost_scenario: "base".to_string(),
        gas_price_per_mmbtu: 3.50,
        ..OptimizeParams::default()
    }
}

/// Coarse grid (3 × (1 + 2 × 2) = 15 candidates) for fast runs.
pub fn small_grid() -> SearchGrid {
    SearchGrid {
        solar_multiples: vec![1.0, 3.0, 6.0],
        durations_hours: vec![0.0, 4.0, 8.0],
        power_ratios: vec![0.8, 1.25],
        ..SearchGrid::default()
    }
}

/// Runs `params` over `grid` against the built-in table.
pub fn run_grid(params: &OptimizeParams, grid: SearchGrid) -> Result<OptimizationResult, SizingError> {
    optimize_with(
        params,
        &GridSearch::new(grid),
        &CostTable::builtin(),
        &RunControl::new(),
    )
}

/// Runs `params` over the default 969-point grid.
pub fn run_default(params: &OptimizeParams) -> Result<OptimizationResult, SizingError> {
    run_grid(params, SearchGrid::default())
}

/// Solar + battery + gas - excess revenue.
pub fn breakdown_sum(r: &OptimizationResult) -> f64 {
    let b = &r.lcoe_breakdown;
    b.solar_cost + b.battery_cost + b.gas_cost - b.excess_solar_revenue
}
