//! Budgets and bounded waits.

use std::future::Future;
use std::time::{Duration, Instant};

/// A fixed time budget that started at a known instant.
///
/// The budget is exceeded only when strictly more than `budget` has elapsed,
/// so a check made exactly at the boundary still counts as "in time".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline {
    started_at: Instant,
    budget: Duration,
}

impl Deadline {
    /// Starts a budget of `budget` at `started_at`.
    pub fn starting_at(started_at: Instant, budget: Duration) -> Self {
        Self { started_at, budget }
    }

    /// When the budget was started.
    pub fn started_at(&self) -> Instant {
        self.started_at
    }

    /// The total budget.
    pub fn budget(&self) -> Duration {
        self.budget
    }

    /// Time spent so far as seen from `now`.
    pub fn elapsed(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.started_at)
    }

    /// Budget left at `now`, or zero once spent.
    pub fn remaining(&self, now: Instant) -> Duration {
        self.budget.saturating_sub(self.elapsed(now))
    }

    /// Returns `true` once strictly more than the budget has elapsed.
    pub fn is_expired(&self, now: Instant) -> bool {
        self.elapsed(now) > self.budget
    }
}

/// Result of a bounded wait.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Waited<T> {
    /// The awaited operation finished within the budget.
    Ready(T),
    /// The budget ran out first; the operation was dropped.
    TimedOut,
}

impl<T> Waited<T> {
    /// Converts into an `Option`, discarding the timeout marker.
    pub fn ready(self) -> Option<T> {
        match self {
            Waited::Ready(value) => Some(value),
            Waited::TimedOut => None,
        }
    }

    /// Returns `true` if the wait timed out.
    pub fn is_timed_out(&self) -> bool {
        matches!(self, Waited::TimedOut)
    }
}

/// Polls `operation` until it completes or `budget` elapses.
///
/// The wait never blocks the executor thread: while the operation is pending
/// other tasks on the same runtime keep running.  When the budget runs out
/// the operation is dropped, which closes any socket it was reading from.
///
/// # Examples
///
/// ```rust
/// use std::time::Duration;
/// use nodelink_core::timing::{with_deadline, Waited};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let fast = with_deadline(Duration::from_secs(1), async { 7 }).await;
/// assert_eq!(fast, Waited::Ready(7));
/// # }
/// ```
pub async fn with_deadline<F>(budget: Duration, operation: F) -> Waited<F::Output>
where
    F: Future,
{
    match tokio::time::timeout(budget, operation).await {
        Ok(value) => Waited::Ready(value),
        Err(_) => Waited::TimedOut,
    }
}
