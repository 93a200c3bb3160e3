//! Cancellation and progress reporting for long searches.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::SizingError;

/// Default number of candidates between progress callbacks.
pub const DEFAULT_REPORT_EVERY: usize = 50;

/// Shared flag a caller flips to stop a running search.
///
/// Clones share the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    /// Creates a token in the not-cancelled state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. Idempotent.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Returns `true` once [`cancel`](Self::cancel) has been called.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Snapshot passed to progress callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    /// Candidates evaluated so far.
    pub evaluated: usize,
    /// Candidates in the search.
    pub total: usize,
}

impl Progress {
    /// Completion in [0, 1]; an empty search counts as complete.
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.evaluated as f64 / self.total as f64
        }
    }
}

type ProgressFn = dyn Fn(Progress) + Send + Sync;

/// Cancellation and progress hooks threaded through a search.
///
/// Callbacks may fire from worker threads and in any order; `evaluated` is
/// monotonic per callback but two callbacks can arrive out of order.
#[derive(Clone)]
pub struct RunControl {
    cancel: CancellationToken,
    progress: Option<Arc<ProgressFn>>,
    report_every: usize,
}

impl RunControl {
    /// No cancellation source, no progress reporting.
    pub fn new() -> Self {
        Self {
            cancel: CancellationToken::new(),
            progress: None,
            report_every: DEFAULT_REPORT_EVERY,
        }
    }

    /// Observes `token` between grid points.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Calls `f` every `every` evaluated candidates and once at completion.
    pub fn with_progress<F>(mut self, every: usize, f: F) -> Self
    where
        F: Fn(Progress) + Send + Sync + 'static,
    {
        self.report_every = every.max(1);
        self.progress = Some(Arc::new(f));
        self
    }

    /// Token observed by this run.
    pub fn token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Returns `true` if the run should stop.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Fails with [`SizingError::Cancelled`] if cancellation was requested.
    pub fn check(&self, evaluated: usize, total: usize) -> Result<(), SizingError> {
        if self.is_cancelled() {
            Err(SizingError::Cancelled { evaluated, total })
        } else {
            Ok(())
        }
    }

    /// Reports progress if `evaluated` lands on a reporting boundary.
    pub fn report(&self, evaluated: usize, total: usize) {
        if let Some(f) = &self.progress {
            if evaluated % self.report_every == 0 || evaluated == total {
                f(Progress { evaluated, total });
            }
        }
    }
}

impl Default for RunControl {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RunControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunControl")
            .field("cancelled", &self.is_cancelled())
            .field("has_progress", &self.progress.is_some())
            .field("report_every", &self.report_every)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[test]
    fn token_clones_share_state() {
        let a = CancellationToken::new();
        let b = a.clone();
        assert!(!b.is_cancelled());
        a.cancel();
        assert!(b.is_cancelled());
    }

    #[test]
    fn check_reports_counts() {
        let token = CancellationToken::new();
        let control = RunControl::new().with_cancellation(token.clone());
        assert!(control.check(3, 10).is_ok());
        token.cancel();
        assert_eq!(
            control.check(3, 10),
            Err(SizingError::Cancelled {
                evaluated: 3,
                total: 10
            })
        );
    }

    #[test]
    fn progress_fires_on_boundaries_and_completion() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let control = RunControl::new().with_progress(4, move |p| {
            if let Ok(mut v) = sink.lock() {
                v.push(p.evaluated);
            }
        });
        for done in 1..=10 {
            control.report(done, 10);
        }
        let seen = seen.lock().expect("progress lock").clone();
        assert_eq!(seen, vec![4, 8, 10]);
    }

    #[test]
    fn fraction_of_empty_search_is_one() {
        let p = Progress {
            evaluated: 0,
            total: 0,
        };
        assert_eq!(p.fraction(), 1.0);
        let p = Progress {
            evaluated: 5,
            total: 20,
        };
        assert_eq!(p.fraction(), 0.25);
    }
}
