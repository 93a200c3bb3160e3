//! Choosing the winning candidate from a stream of evaluations.

use super::problem::CandidateEvaluation;

/// Slack on the gas-backup limit before a candidate is counted infeasible.
pub const DEFAULT_TOLERANCE_BAND: f64 = 1.05;

/// Unserved-energy share still treated as fully served.
pub const UNMET_TOLERANCE: f64 = 1e-9;

/// How the winner was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionKind {
    /// Cheapest candidate within the gas-backup limit.
    Feasible,
    /// No candidate met the limit; lowest backup share instead.
    Closest,
}

/// Running best-so-far tracker.
///
/// Feed evaluations in grid order. Only strictly better candidates replace
/// the incumbent, so ties go to the earliest grid point regardless of how
/// the evaluations were computed.
#[derive(Debug, Clone)]
pub struct SelectionTracker {
    threshold: f64,
    feasible: Option<CandidateEvaluation>,
    closest: Option<CandidateEvaluation>,
    offered: usize,
}

impl SelectionTracker {
    /// Creates a tracker for a gas-backup limit widened by `tolerance_band`.
    pub fn new(max_gas_fraction: f64, tolerance_band: f64) -> Self {
        Self {
            threshold: max_gas_fraction * tolerance_band,
            feasible: None,
            closest: None,
            offered: 0,
        }
    }

    /// Effective gas-fraction threshold.
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Number of evaluations seen.
    pub fn offered(&self) -> usize {
        self.offered
    }

    /// Considers one evaluation.
    pub fn offer(&mut self, eval: &CandidateEvaluation) {
        self.offered += 1;
        if !eval.lcoe.is_finite() {
            return;
        }

        let is_feasible =
            eval.gas_fraction <= self.threshold && eval.unmet_fraction <= UNMET_TOLERANCE;
        if is_feasible && self.feasible.as_ref().is_none_or(|best| eval.lcoe < best.lcoe) {
            self.feasible = Some(*eval);
        }

        let replaces_closest = match &self.closest {
            None => true,
            Some(best) => {
                let (share, best_share) = (backup_share(eval), backup_share(best));
                share < best_share || (share == best_share && eval.lcoe < best.lcoe)
            }
        };
        if replaces_closest {
            self.closest = Some(*eval);
        }
    }

    /// Best feasible candidate so far.
    pub fn feasible(&self) -> Option<&CandidateEvaluation> {
        self.feasible.as_ref()
    }

    /// Lowest-backup candidate so far.
    pub fn closest(&self) -> Option<&CandidateEvaluation> {
        self.closest.as_ref()
    }

    /// Winner by precedence feasible → closest; `None` if nothing had a finite LCOE.
    pub fn finish(self) -> Option<(SelectionKind, CandidateEvaluation)> {
        match (self.feasible, self.closest) {
            (Some(best), _) => Some((SelectionKind::Feasible, best)),
            (None, Some(closest)) => Some((SelectionKind::Closest, closest)),
            (None, None) => None,
        }
    }
}

/// Load share not covered by solar and storage.
fn backup_share(eval: &CandidateEvaluation) -> f64 {
    eval.gas_fraction + eval.unmet_fraction
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cost::lcoe::LcoeBreakdown;
    use crate::optimizer::problem::Candidate;

    fn eval(solar_multiple: f64, lcoe: f64, gas_fraction: f64) -> CandidateEvaluation {
        CandidateEvaluation {
            candidate: Candidate::from_grid(100.0, solar_multiple, 0.0, 0.0),
            lcoe,
            gas_fraction,
            unmet_fraction: 0.0,
            breakdown: LcoeBreakdown::default(),
        }
    }

    #[test]
    fn picks_cheapest_feasible() {
        let mut t = SelectionTracker::new(0.10, DEFAULT_TOLERANCE_BAND);
        t.offer(&eval(1.0, 50.0, 0.50));
        t.offer(&eval(2.0, 80.0, 0.09));
        t.offer(&eval(3.0, 70.0, 0.104));
        t.offer(&eval(4.0, 60.0, 0.12));
        let (kind, best) = t.finish().expect("tracker should pick a winner");
        assert_eq!(kind, SelectionKind::Feasible);
        assert_eq!(best.candidate.solar_multiple, 3.0);
    }

    #[test]
    fn ties_go_to_first_offered() {
        let mut t = SelectionTracker::new(1.0, 1.0);
        t.offer(&eval(1.0, 70.0, 0.2));
        t.offer(&eval(2.0, 70.0, 0.2));
        let best = t.feasible().map(|e| e.candidate.solar_multiple);
        assert_eq!(best, Some(1.0));
        let closest = t.closest().map(|e| e.candidate.solar_multiple);
        assert_eq!(closest, Some(1.0));
    }

    #[test]
    fn closest_breaks_gas_ties_on_lcoe() {
        let mut t = SelectionTracker::new(0.0, DEFAULT_TOLERANCE_BAND);
        t.offer(&eval(1.0, 90.0, 0.08));
        t.offer(&eval(2.0, 85.0, 0.08));
        t.offer(&eval(3.0, 60.0, 0.30));
        let (kind, best) = t.finish().expect("tracker should pick a winner");
        assert_eq!(kind, SelectionKind::Closest);
        assert_eq!(best.candidate.solar_multiple, 2.0);
    }

    #[test]
    fn non_finite_lcoe_is_ignored() {
        let mut t = SelectionTracker::new(1.0, 1.0);
        t.offer(&eval(1.0, f64::INFINITY, 0.0));
        t.offer(&eval(2.0, f64::NAN, 0.0));
        assert_eq!(t.offered(), 2);
        assert!(t.finish().is_none());
    }

    #[test]
    fn unmet_load_blocks_feasibility() {
        let mut t = SelectionTracker::new(0.5, 1.0);
        let mut e = eval(1.0, 40.0, 0.1);
        e.unmet_fraction = 0.2;
        t.offer(&e);
        assert!(t.feasible().is_none());
        assert!(t.closest().is_some());
    }

    #[test]
    fn zero_limit_accepts_exactly_zero_gas() {
        let mut t = SelectionTracker::new(0.0, DEFAULT_TOLERANCE_BAND);
        t.offer(&eval(8.0, 200.0, 0.0));
        assert!(matches!(t.finish(), Some((SelectionKind::Feasible, _))));
    }
}
