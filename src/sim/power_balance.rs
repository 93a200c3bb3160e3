//! Residual-load allocation between gas and unmet demand.

/// Residuals at or below this (MW) are treated as served.
pub const GAS_DISPATCH_THRESHOLD_MW: f64 = 0.001;

/// Splits the deficit left after solar and battery into `(gas_mw, unmet_mw)`.
///
/// # Arguments
///
/// * `residual_mw` - Remaining deficit (MW, may be <= 0)
/// * `gas_capacity_mw` - Gas output cap; `None` means unconstrained
///
/// # Returns
///
/// Gas dispatch and unserved load. A residual below
/// [`GAS_DISPATCH_THRESHOLD_MW`] yields `(0.0, 0.0)`.
pub fn split_residual(residual_mw: f64, gas_capacity_mw: Option<f64>) -> (f64, f64) {
    if residual_mw <= GAS_DISPATCH_THRESHOLD_MW {
        return (0.0, 0.0);
    }
    match gas_capacity_mw {
        None => (residual_mw, 0.0),
        Some(cap) => {
            let gas = residual_mw.min(cap.max(0.0));
            (gas, residual_mw - gas)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unconstrained_gas_covers_everything() {
        assert_eq!(split_residual(42.0, None), (42.0, 0.0));
    }

    #[test]
    fn capped_gas_leaves_unmet_load() {
        assert_eq!(split_residual(42.0, Some(30.0)), (30.0, 12.0));
    }

    #[test]
    fn tiny_residual_is_ignored() {
        assert_eq!(split_residual(0.0005, None), (0.0, 0.0));
        assert_eq!(split_residual(-3.0, Some(10.0)), (0.0, 0.0));
    }

    #[test]
    fn zero_capacity_means_all_unmet() {
        assert_eq!(split_residual(5.0, Some(0.0)), (0.0, 5.0));
    }
}
