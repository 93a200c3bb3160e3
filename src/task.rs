//! Background optimisation with progress and cancellation.
//!
//! [`OptimizationTask`] runs [`optimize_with`] on its own thread. The caller
//! polls progress from a channel, may cancel at any time, and collects the
//! result with [`OptimizationTask::join`].

use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread::{self, JoinHandle};

use tracing::{debug, warn};

use crate::cost::assumptions::CostTable;
use crate::error::SizingError;
use crate::optimize::{OptimizeParams, optimize_with};
use crate::optimizer::SizingStrategy;
use crate::optimizer::control::{CancellationToken, DEFAULT_REPORT_EVERY, Progress, RunControl};
use crate::result::OptimizationResult;

const THREAD_NAME: &str = "hybrid-sizer-task";

/// A running optimisation.
///
/// Dropping the task without joining detaches the worker thread; it keeps
/// running until the search completes or is cancelled.
#[derive(Debug)]
pub struct OptimizationTask {
    handle: JoinHandle<Result<OptimizationResult, SizingError>>,
    token: CancellationToken,
    progress: Receiver<Progress>,
}

impl OptimizationTask {
    /// Starts `strategy` on a background thread with default progress reporting.
    ///
    /// # Errors
    ///
    /// Returns `SizingError::Backend` if the thread cannot be spawned.
    pub fn spawn<S>(
        params: OptimizeParams,
        strategy: S,
        table: Arc<CostTable>,
    ) -> Result<Self, SizingError>
    where
        S: SizingStrategy + 'static,
    {
        Self::spawn_with(
            params,
            strategy,
            table,
            CancellationToken::new(),
            DEFAULT_REPORT_EVERY,
        )
    }

    /// Starts `strategy` observing `token`, reporting every `report_every`
    /// candidates.
    ///
    /// # Errors
    ///
    /// Returns `SizingError::Backend` if the thread cannot be spawned.
    pub fn spawn_with<S>(
        params: OptimizeParams,
        strategy: S,
        table: Arc<CostTable>,
        token: CancellationToken,
        report_every: usize,
    ) -> Result<Self, SizingError>
    where
        S: SizingStrategy + 'static,
    {
        let (tx, rx) = mpsc::channel();
        let control = RunControl::new()
            .with_cancellation(token.clone())
            .with_progress(report_every, move |p| {
                // Receiver gone means nobody is listening; keep searching.
                let _ = tx.send(p);
            });

        let handle = thread::Builder::new()
            .name(THREAD_NAME.to_string())
            .spawn(move || {
                debug!(strategy = strategy.name(), "background optimisation started");
                optimize_with(&params, &strategy, &table, &control)
            })
            .map_err(|e| SizingError::Backend(format!("failed to spawn worker: {e}")))?;

        Ok(Self {
            handle,
            token,
            progress: rx,
        })
    }

    /// Requests cancellation. [`join`](Self::join) then returns
    /// `SizingError::Cancelled` unless the search had already finished.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Token observed by the worker.
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Drains pending progress updates and returns the most recent one.
    pub fn try_progress(&self) -> Option<Progress> {
        let mut latest = None;
        loop {
            match self.progress.try_recv() {
                Ok(p) => latest = Some(latest.map_or(p, |l: Progress| newest(l, p))),
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => return latest,
            }
        }
    }

    /// Raw progress channel, for callers that want to block on updates.
    ///
    /// The channel disconnects when the worker finishes.
    pub fn progress(&self) -> &Receiver<Progress> {
        &self.progress
    }

    /// Returns `true` once the worker has returned.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Waits for the worker and returns its result.
    ///
    /// # Errors
    ///
    /// Whatever the optimisation returned, or `SizingError::Backend` if the
    /// worker panicked.
    pub fn join(self) -> Result<OptimizationResult, SizingError> {
        match self.handle.join() {
            Ok(result) => result,
            Err(payload) => {
                let message = payload
                    .downcast_ref::<&str>()
                    .map(|s| (*s).to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                warn!(%message, "optimisation worker panicked");
                Err(SizingError::Backend(format!("worker panicked: {message}")))
            }
        }
    }
}

// Callbacks from rayon workers can arrive out of order.
fn newest(a: Progress, b: Progress) -> Progress {
    if b.evaluated >= a.evaluated { b } else { a }
}
