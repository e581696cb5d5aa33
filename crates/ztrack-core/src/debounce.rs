//! Debounced value tracking.
//!
//! The tracker is driven by the caller's event loop: feed raw updates with
//! [`Debounced::update`] and advance time with [`Debounced::poll`] on every
//! tick. Event queues that deliver timer callbacks instead can use the
//! [`TimerToken`] returned by `update` with [`Debounced::fire`]; a token that
//! was superseded or cancelled fires as a no-op.

use std::time::{Duration, Instant};

/// Settle duration used for search input.
pub const DEFAULT_SETTLE: Duration = Duration::from_millis(300);

/// Identifies one scheduled settle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerToken(u64);

#[derive(Debug, Clone)]
struct Pending<T> {
    value: T,
    deadline: Instant,
    token: TimerToken,
}

/// A value that only changes once its input has been quiet for `settle`.
#[derive(Debug, Clone)]
pub struct Debounced<T> {
    settle: Duration,
    settled: T,
    pending: Option<Pending<T>>,
    next_token: u64,
    revision: u64,
}

impl<T: Clone + PartialEq> Debounced<T> {
    /// Start settled at `initial`.
    pub const fn new(initial: T, settle: Duration) -> Self {
        Self {
            settle,
            settled: initial,
            pending: None,
            next_token: 0,
            revision: 0,
        }
    }

    /// The last value that settled.
    pub const fn settled(&self) -> &T {
        &self.settled
    }

    /// The most recent input, settled or not.
    pub fn latest(&self) -> &T {
        self.pending.as_ref().map_or(&self.settled, |p| &p.value)
    }

    pub const fn settle_duration(&self) -> Duration {
        self.settle
    }

    pub const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// When the pending value will settle, if one is pending.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|p| p.deadline)
    }

    /// Bumped every time the settled value changes.
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    /// Record a new input at `now`, restarting the settle timer.
    ///
    /// Any pending value is discarded. Returns `None` when nothing needs to
    /// be scheduled (no pending value and `value` is already settled).
    pub fn update(&mut self, value: T, now: Instant) -> Option<TimerToken> {
        if self.pending.is_none() && value == self.settled {
            return None;
        }
        let token = TimerToken(self.next_token);
        self.next_token += 1;
        self.pending = Some(Pending {
            value,
            deadline: now + self.settle,
            token,
        });
        Some(token)
    }

    /// Settle the pending value if its deadline has passed.
    ///
    /// Returns true if the settled value changed.
    pub fn poll(&mut self, now: Instant) -> bool {
        let due = self.pending.as_ref().is_some_and(|p| now >= p.deadline);
        due && self.settle_pending()
    }

    /// Timer callback for `token`. Stale tokens are ignored.
    ///
    /// Returns true if the settled value changed.
    pub fn fire(&mut self, token: TimerToken) -> bool {
        let current = self.pending.as_ref().is_some_and(|p| p.token == token);
        current && self.settle_pending()
    }

    /// Settle any pending value immediately.
    pub fn flush(&mut self) -> bool {
        self.settle_pending()
    }

    /// Drop the pending value without settling it. Returns true if one was
    /// pending.
    pub fn cancel(&mut self) -> bool {
        self.pending.take().is_some()
    }

    fn settle_pending(&mut self) -> bool {
        let Some(pending) = self.pending.take() else {
            return false;
        };
        if pending.value == self.settled {
            return false;
        }
        self.settled = pending.value;
        self.revision += 1;
        true
    }
}
