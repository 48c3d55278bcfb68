//! Cooperative solve budgets.
//!
//! Solvers never poll the clock ad hoc.  They receive a [`Deadline`] at entry
//! and call [`Deadline::expired`] only at their loop boundaries (per DP call,
//! per iteration, per generation, per 2-opt pass).  A deadline combines an
//! optional wall-clock limit with an optional [`CancelToken`] that another
//! thread can trip.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

// ── CancelToken ───────────────────────────────────────────────────────────────

/// Shared flag for cancelling a running solve from outside.
///
/// Cloning yields another handle to the same flag.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

// ── Deadline ──────────────────────────────────────────────────────────────────

/// A point in wall-clock time after which a solver must stop and return the
/// best result it has.
#[derive(Clone, Debug)]
pub struct Deadline {
    started: Instant,
    limit:   Option<Duration>,
    cancel:  Option<CancelToken>,
}

impl Deadline {
    /// A deadline that never expires on its own.
    pub fn none() -> Self {
        Self { started: Instant::now(), limit: None, cancel: None }
    }

    /// Expire `limit` after now.
    pub fn after(limit: Duration) -> Self {
        Self { started: Instant::now(), limit: Some(limit), cancel: None }
    }

    /// `after(limit)` when `Some`, `none()` otherwise.
    pub fn from_limit(limit: Option<Duration>) -> Self {
        match limit {
            Some(l) => Self::after(l),
            None    => Self::none(),
        }
    }

    /// Also expire as soon as `token` is cancelled.
    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// A nested budget starting now: at most `limit`, never later than
    /// `self`, and sharing `self`'s cancel token.
    pub fn sub(&self, limit: Option<Duration>) -> Deadline {
        let remaining = self.limit.map(|l| l.saturating_sub(self.started.elapsed()));
        let limit = match (remaining, limit) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        Deadline { started: Instant::now(), limit, cancel: self.cancel.clone() }
    }

    /// Wall time since the deadline was created.
    #[inline]
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// `true` once the limit has passed or the token was cancelled.
    #[inline]
    pub fn expired(&self) -> bool {
        if self.cancel.as_ref().is_some_and(CancelToken::is_cancelled) {
            return true;
        }
        self.limit.is_some_and(|l| self.started.elapsed() >= l)
    }
}

impl Default for Deadline {
    fn default() -> Self {
        Self::none()
    }
}
