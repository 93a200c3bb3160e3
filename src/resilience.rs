//! Remote sizing backend with a circuit breaker and in-process fallback.
//!
//! A deployment may delegate optimisation to a remote numeric service. When
//! that service fails, [`ResilientSizer`] opens a [`CircuitBreaker`], skips
//! the remote for a cooldown period, and answers from the local optimiser.
//! Time is passed in explicitly so the state machine is testable.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::cost::assumptions::CostTable;
use crate::error::SizingError;
use crate::optimize::{OptimizeParams, optimize_with};
use crate::optimizer::control::RunControl;
use crate::optimizer::grid::GridSearch;
use crate::result::OptimizationResult;

/// Consecutive failures that open the breaker.
pub const DEFAULT_FAILURE_THRESHOLD: u32 = 1;
/// How long an open breaker skips the remote.
pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(60);

/// Anything that can answer an optimisation request.
pub trait SizingBackend: Send + Sync {
    /// Identifier for logs.
    fn name(&self) -> &str;

    /// Runs one request.
    ///
    /// # Errors
    ///
    /// `SizingError::Backend` for transport or service failures; contract
    /// violations are passed through unchanged.
    fn optimize(&self, params: &OptimizeParams) -> Result<OptimizationResult, SizingError>;
}

/// The in-process optimiser as a backend.
#[derive(Debug, Clone)]
pub struct LocalBackend {
    search: GridSearch,
    table: Arc<CostTable>,
}

impl LocalBackend {
    /// Backend running `search` against `table`.
    pub fn new(search: GridSearch, table: Arc<CostTable>) -> Self {
        Self { search, table }
    }
}

impl Default for LocalBackend {
    fn default() -> Self {
        Self::new(GridSearch::default(), Arc::new(CostTable::builtin()))
    }
}

impl SizingBackend for LocalBackend {
    fn name(&self) -> &str {
        "local"
    }

    fn optimize(&self, params: &OptimizeParams) -> Result<OptimizationResult, SizingError> {
        optimize_with(params, &self.search, &self.table, &RunControl::default())
    }
}

/// Breaker position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakerState {
    /// Remote calls allowed.
    Closed,
    /// Remote skipped until the cooldown elapses.
    Open,
    /// Cooldown elapsed; the next call probes the remote.
    HalfOpen,
}

impl BreakerState {
    /// Lowercase label used in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Closed => "closed",
            Self::Open => "open",
            Self::HalfOpen => "half-open",
        }
    }
}

impl fmt::Display for BreakerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Closed / open / half-open breaker with a fixed cooldown.
#[derive(Debug, Clone)]
pub struct CircuitBreaker {
    state: BreakerState,
    failure_threshold: u32,
    cooldown: Duration,
    consecutive_failures: u32,
    opened_at: Option<Instant>,
}

impl CircuitBreaker {
    /// Closed breaker; `failure_threshold` is raised to at least 1.
    pub fn new(failure_threshold: u32, cooldown: Duration) -> Self {
        Self {
            state: BreakerState::Closed,
            failure_threshold: failure_threshold.max(1),
            cooldown,
            consecutive_failures: 0,
            opened_at: None,
        }
    }

    /// Override the cooldown.
    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }

    /// Current position.
    pub fn state(&self) -> BreakerState {
        self.state
    }

    /// Time an open breaker waits before probing.
    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// Failures since the last success.
    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    /// Time left before an open breaker admits a probe.
    pub fn remaining_cooldown(&self, now: Instant) -> Duration {
        match (self.state, self.opened_at) {
            (BreakerState::Open, Some(at)) => {
                self.cooldown.saturating_sub(now.saturating_duration_since(at))
            }
            _ => Duration::ZERO,
        }
    }

    /// Returns `true` if a remote call may be attempted at `now`.
    ///
    /// An open breaker whose cooldown has elapsed moves to half-open.
    pub fn allow(&mut self, now: Instant) -> bool {
        match self.state {
            BreakerState::Closed | BreakerState::HalfOpen => true,
            BreakerState::Open => {
                if self.remaining_cooldown(now).is_zero() {
                    self.state = BreakerState::HalfOpen;
                    debug!(state = %self.state, "cooldown elapsed, probing remote");
                    true
                } else {
                    false
                }
            }
        }
    }

    /// A remote call succeeded.
    pub fn record_success(&mut self) {
        if self.state != BreakerState::Closed {
            info!(previous = %self.state, "circuit breaker closed");
        }
        self.state = BreakerState::Closed;
        self.consecutive_failures = 0;
        self.opened_at = None;
    }

    /// A remote call failed at `now`.
    pub fn record_failure(&mut self, now: Instant) {
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        let trip = match self.state {
            BreakerState::HalfOpen => true,
            BreakerState::Closed => self.consecutive_failures >= self.failure_threshold,
            BreakerState::Open => false,
        };
        if trip {
            self.state = BreakerState::Open;
            self.opened_at = Some(now);
            warn!(
                failures = self.consecutive_failures,
                cooldown_s = self.cooldown.as_secs_f64(),
                "circuit breaker opened"
            );
        }
    }
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self::new(DEFAULT_FAILURE_THRESHOLD, DEFAULT_COOLDOWN)
    }
}

/// Which backend produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Served {
    /// The remote answered.
    Remote,
    /// The remote was skipped or failed; the local backend answered.
    Local,
}

/// Routes requests to a remote backend while it is healthy, otherwise to a
/// local one.
pub struct ResilientSizer<R, L = LocalBackend> {
    remote: R,
    local: L,
    breaker: CircuitBreaker,
}

impl<R: SizingBackend, L: SizingBackend> ResilientSizer<R, L> {
    /// Pairs `remote` with `local` behind a default breaker.
    pub fn new(remote: R, local: L) -> Self {
        Self {
            remote,
            local,
            breaker: CircuitBreaker::default(),
        }
    }

    /// Replace the breaker.
    pub fn with_breaker(mut self, breaker: CircuitBreaker) -> Self {
        self.breaker = breaker;
        self
    }

    /// Breaker guarding the remote.
    pub fn breaker(&self) -> &CircuitBreaker {
        &self.breaker
    }

    /// Serves `params` using the wall clock.
    ///
    /// # Errors
    ///
    /// Contract violations from either backend, or the local backend's error
    /// when the remote is unavailable.
    pub fn optimize(
        &mut self,
        params: &OptimizeParams,
    ) -> Result<(Served, OptimizationResult), SizingError> {
        self.optimize_at(params, Instant::now())
    }

    /// Serves `params` as of `now`.
    ///
    /// # Errors
    ///
    /// See [`optimize`](Self::optimize).
    pub fn optimize_at(
        &mut self,
        params: &OptimizeParams,
        now: Instant,
    ) -> Result<(Served, OptimizationResult), SizingError> {
        // Reject bad requests before they count against the remote.
        params.validate()?;

        if self.breaker.allow(now) {
            match self.remote.optimize(params) {
                Ok(result) => {
                    self.breaker.record_success();
                    return Ok((Served::Remote, result));
                }
                Err(SizingError::Backend(reason)) => {
                    warn!(
                        backend = self.remote.name(),
                        %reason,
                        "remote sizing failed, falling back to {}",
                        self.local.name()
                    );
                    self.breaker.record_failure(now);
                }
                Err(other) => {
                    // Service answered; the request itself was rejected.
                    self.breaker.record_success();
                    return Err(other);
                }
            }
        } else {
            debug!(
                backend = self.remote.name(),
                state = %self.breaker.state(),
                remaining_s = self.breaker.remaining_cooldown(now).as_secs_f64(),
                "skipping remote during cooldown"
            );
        }

        self.local.optimize(params).map(|r| (Served::Local, r))
    }
}

impl<R, L> fmt::Debug for ResilientSizer<R, L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResilientSizer")
            .field("breaker", &self.breaker)
            .finish_non_exhaustive()
    }
}
