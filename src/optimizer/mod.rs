//! Capacity search over solar, battery power, and battery duration.
//!
//! A [`SizingStrategy`] walks candidate sizings of a [`SizingProblem`] and
//! reports the winner. [`GridSearch`] is the built-in strategy; a continuous
//! optimiser can replace it without touching profile, dispatch, or cost code.

pub mod control;
pub mod grid;
pub mod problem;
pub mod selection;

pub use control::{CancellationToken, Progress, RunControl};
pub use grid::{GridSearch, SearchGrid};
pub use problem::{Candidate, CandidateEvaluation, SizingProblem};
pub use selection::{DEFAULT_TOLERANCE_BAND, SelectionKind, SelectionTracker};

use crate::error::SizingError;

/// Result of one search.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    /// Winner and how it was chosen; `None` when no candidate had a finite LCOE.
    pub selection: Option<(SelectionKind, CandidateEvaluation)>,
    /// Number of candidates evaluated.
    pub candidates_evaluated: usize,
    /// Every evaluation in search order, when the strategy was asked to keep them.
    pub evaluations: Vec<CandidateEvaluation>,
}

/// Search procedure over candidate sizings.
pub trait SizingStrategy: Send + Sync {
    /// Short identifier for logs.
    fn name(&self) -> &'static str;

    /// Runs the search.
    ///
    /// # Errors
    ///
    /// Returns `SizingError::Cancelled` if `control` is cancelled mid-search,
    /// or `SizingError::InvalidParameter` if the strategy is misconfigured.
    fn search(
        &self,
        problem: &SizingProblem<'_>,
        control: &RunControl,
    ) -> Result<SearchOutcome, SizingError>;
}
