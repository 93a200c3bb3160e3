//! Error types for contract violations.
//!
//! Infeasible sizings are never errors: they surface as a solver status and a
//! gas-backup fraction on the result. Everything here is a caller mistake or a
//! cancelled run.

use thiserror::Error;

/// Errors returned by the optimizer entry points.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SizingError {
    /// Target load was NaN, infinite, or negative.
    #[error("target load must be a finite, non-negative MW value, got {0}")]
    InvalidLoad(f64),

    /// Latitude was non-finite or outside [-90, 90].
    #[error("latitude must be within [-90, 90] degrees, got {0}")]
    InvalidLatitude(f64),

    /// Cost scenario name did not match a known scenario.
    #[error("unknown cost scenario \"{0}\", expected one of: base, optimistic, conservative")]
    UnknownScenario(String),

    /// Any other out-of-contract parameter.
    #[error("invalid parameter `{field}`: {message}")]
    InvalidParameter {
        /// Parameter name as it appears in the request.
        field: &'static str,
        /// Human-readable constraint description.
        message: String,
    },

    /// No cost assumptions are tabulated for the requested scenario.
    #[error("cost table has no entries for scenario \"{0}\"")]
    MissingCostData(String),

    /// The run was cancelled between grid points.
    #[error("optimization cancelled after {evaluated} of {total} candidates")]
    Cancelled {
        /// Candidates evaluated before cancellation was observed.
        evaluated: usize,
        /// Total candidates in the grid.
        total: usize,
    },

    /// A sizing backend or background worker failed before producing a result.
    #[error("sizing backend failed: {0}")]
    Backend(String),
}

impl SizingError {
    pub(crate) fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            field,
            message: message.into(),
        }
    }
}
