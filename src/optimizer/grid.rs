//! Exhaustive grid search, evaluated in parallel with rayon.

use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::control::RunControl;
use super::problem::{Candidate, CandidateEvaluation, SizingProblem};
use super::selection::{DEFAULT_TOLERANCE_BAND, SelectionTracker};
use super::{SearchOutcome, SizingStrategy};
use crate::error::SizingError;

/// Discretized search space, as multiples of target load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SearchGrid {
    /// Solar nameplate / target load.
    pub solar_multiples: Vec<f64>,
    /// Battery durations in hours; 0 means no battery.
    pub durations_hours: Vec<f64>,
    /// Battery power / target load.
    pub power_ratios: Vec<f64>,
    /// Multiplier on the gas-backup limit when testing feasibility (>= 1).
    pub tolerance_band: f64,
}

impl Default for SearchGrid {
    fn default() -> Self {
        Self {
            solar_multiples: vec![
                0.5, 0.75, 1.0, 1.25, 1.5, 1.75, 2.0, 2.5, 3.0, 3.5, 4.0, 4.5, 5.0, 5.5, 6.0,
                6.5, 7.0, 7.5, 8.0,
            ],
            durations_hours: (0..=10).map(f64::from).collect(),
            power_ratios: vec![0.6, 0.8, 1.0, 1.25, 1.5],
            tolerance_band: DEFAULT_TOLERANCE_BAND,
        }
    }
}

impl SearchGrid {
    /// Checks every axis.
    ///
    /// # Errors
    ///
    /// Returns `SizingError::InvalidParameter` naming the first bad axis.
    pub fn validate(&self) -> Result<(), SizingError> {
        if self.solar_multiples.is_empty() {
            return Err(SizingError::invalid("solarMultiples", "must not be empty"));
        }
        if self.durations_hours.is_empty() {
            return Err(SizingError::invalid("durationsHours", "must not be empty"));
        }
        if let Some(v) = self.solar_multiples.iter().find(|v| !v.is_finite() || **v < 0.0) {
            return Err(SizingError::invalid(
                "solarMultiples",
                format!("values must be finite and >= 0, got {v}"),
            ));
        }
        if let Some(v) = self.durations_hours.iter().find(|v| !v.is_finite() || **v < 0.0) {
            return Err(SizingError::invalid(
                "durationsHours",
                format!("values must be finite and >= 0, got {v}"),
            ));
        }
        if let Some(v) = self.power_ratios.iter().find(|v| !v.is_finite() || **v <= 0.0) {
            return Err(SizingError::invalid(
                "powerRatios",
                format!("values must be finite and > 0, got {v}"),
            ));
        }
        if self.power_ratios.is_empty() && self.durations_hours.iter().any(|d| *d > 0.0) {
            return Err(SizingError::invalid(
                "powerRatios",
                "must not be empty when any duration is > 0",
            ));
        }
        if !self.tolerance_band.is_finite() || self.tolerance_band < 1.0 {
            return Err(SizingError::invalid(
                "toleranceBand",
                format!("must be finite and >= 1, got {}", self.tolerance_band),
            ));
        }
        Ok(())
    }

    /// Enumerates candidates in grid order: solar, then duration, then power ratio.
    ///
    /// A zero duration contributes one solar-only candidate per solar multiple.
    ///
    /// ```
    /// use hybrid_sizer::optimizer::SearchGrid;
    ///
    /// // 19 × (1 + 10 × 5)
    /// assert_eq!(SearchGrid::default().candidates(100.0).len(), 969);
    /// ```
    pub fn candidates(&self, load_mw: f64) -> Vec<Candidate> {
        let mut out = Vec::with_capacity(self.len());
        for &sm in &self.solar_multiples {
            let mut solar_only_done = false;
            for &dur in &self.durations_hours {
                if dur <= 0.0 {
                    if !solar_only_done {
                        out.push(Candidate::from_grid(load_mw, sm, 0.0, 0.0));
                        solar_only_done = true;
                    }
                    continue;
                }
                for &ratio in &self.power_ratios {
                    out.push(Candidate::from_grid(load_mw, sm, dur, ratio));
                }
            }
        }
        out
    }

    /// Upper bound on the number of candidates.
    pub fn len(&self) -> usize {
        let with_battery = self.durations_hours.iter().filter(|d| **d > 0.0).count();
        let solar_only = usize::from(self.durations_hours.iter().any(|d| *d <= 0.0));
        self.solar_multiples.len() * (solar_only + with_battery * self.power_ratios.len())
    }

    /// Returns `true` if the grid yields no candidates.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Grid-search strategy.
#[derive(Debug, Clone)]
pub struct GridSearch {
    grid: SearchGrid,
    parallel: bool,
    keep_evaluations: bool,
}

impl GridSearch {
    /// Searches `grid` in parallel without keeping the candidate table.
    pub fn new(grid: SearchGrid) -> Self {
        Self {
            grid,
            parallel: true,
            keep_evaluations: false,
        }
    }

    /// Chooses between rayon and a plain loop. Both give identical results.
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Keeps every evaluation in [`SearchOutcome::evaluations`].
    pub fn keep_evaluations(mut self, keep: bool) -> Self {
        self.keep_evaluations = keep;
        self
    }

    /// Grid being searched.
    pub fn grid(&self) -> &SearchGrid {
        &self.grid
    }
}

impl Default for GridSearch {
    fn default() -> Self {
        Self::new(SearchGrid::default())
    }
}

impl SizingStrategy for GridSearch {
    fn name(&self) -> &'static str {
        "grid"
    }

    fn search(
        &self,
        problem: &SizingProblem<'_>,
        control: &RunControl,
    ) -> Result<SearchOutcome, SizingError> {
        self.grid.validate()?;
        let candidates = self.grid.candidates(problem.target_load_mw());
        let total = candidates.len();
        control.check(0, total)?;
        debug!(total, parallel = self.parallel, "grid search started");

        let done = AtomicUsize::new(0);
        let evaluate = |c: &Candidate| -> Option<CandidateEvaluation> {
            if control.is_cancelled() {
                return None;
            }
            let eval = problem.evaluate(c);
            trace!(
                solar_multiple = c.solar_multiple,
                duration_h = c.duration_hours,
                power_ratio = c.power_ratio,
                lcoe = eval.lcoe,
                gas_fraction = eval.gas_fraction,
                "candidate evaluated"
            );
            let n = done.fetch_add(1, Ordering::Relaxed) + 1;
            control.report(n, total);
            Some(eval)
        };

        // Order-preserving collect; the reduction below runs in grid order.
        let results: Vec<Option<CandidateEvaluation>> = if self.parallel {
            candidates.par_iter().map(evaluate).collect()
        } else {
            candidates.iter().map(evaluate).collect()
        };

        let evaluated = done.load(Ordering::Relaxed);
        if evaluated < total || control.is_cancelled() {
            return Err(SizingError::Cancelled { evaluated, total });
        }

        let mut tracker =
            SelectionTracker::new(problem.max_gas_fraction(), self.grid.tolerance_band);
        let mut evaluations = Vec::new();
        for eval in results.into_iter().flatten() {
            tracker.offer(&eval);
            if self.keep_evaluations {
                evaluations.push(eval);
            }
        }

        let candidates_evaluated = tracker.offered();
        debug!(
            candidates_evaluated,
            threshold = tracker.threshold(),
            feasible = tracker.feasible().is_some(),
            "grid search finished"
        );
        Ok(SearchOutcome {
            selection: tracker.finish(),
            candidates_evaluated,
            evaluations,
        })
    }
}
