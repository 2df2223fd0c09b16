//! Monotonic time sources.

use std::sync::Mutex;
use std::time::{Duration, Instant};

/// A source of monotonic timestamps.
pub trait Clock: Send + Sync {
    /// Returns the current instant.  Successive calls never go backwards.
    fn now(&self) -> Instant;

    /// Time elapsed since `earlier`, saturating at zero.
    fn elapsed_since(&self, earlier: Instant) -> Duration {
        self.now().saturating_duration_since(earlier)
    }
}

/// The production clock, backed by [`Instant::now`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that follows the tokio runtime's timer.
///
/// Identical to [`SystemClock`] in production, but when the runtime's time is
/// paused (`#[tokio::test(start_paused = true)]`) it only advances with
/// `tokio::time::advance` or auto-advance, in step with every `sleep` and
/// `timeout` on the same runtime.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioClock;

impl Clock for TokioClock {
    fn now(&self) -> Instant {
        tokio::time::Instant::now().into_std()
    }
}

/// A clock that only moves when told to.
///
/// Used by tests that need to cross a timeout boundary without sleeping.
#[derive(Debug)]
pub struct ManualClock {
    current: Mutex<Instant>,
}

impl ManualClock {
    /// Creates a clock frozen at the real current instant.
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    /// Creates a clock frozen at `start`.
    pub fn starting_at(start: Instant) -> Self {
        Self {
            current: Mutex::new(start),
        }
    }

    /// Moves the clock forward by `by`.
    pub fn advance(&self, by: Duration) {
        let mut guard = self.current.lock().unwrap_or_else(|e| e.into_inner());
        *guard += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.current.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_clock_is_monotonic() {
        let clock = SystemClock;
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }

    #[test]
    fn test_manual_clock_does_not_move_on_its_own() {
        let clock = ManualClock::new();
        let a = clock.now();
        let b = clock.now();
        assert_eq!(a, b);
    }

    #[test]
    fn test_manual_clock_advance_moves_forward_exactly() {
        // Arrange
        let start = Instant::now();
        let clock = ManualClock::starting_at(start);

        // Act
        clock.advance(Duration::from_millis(1500));

        // Assert
        assert_eq!(clock.now(), start + Duration::from_millis(1500));
        assert_eq!(clock.elapsed_since(start), Duration::from_millis(1500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_tokio_clock_follows_paused_runtime_time() {
        // Arrange
        let clock = TokioClock;
        let start = clock.now();

        // Act
        tokio::time::advance(Duration::from_secs(20)).await;

        // Assert
        assert_eq!(clock.elapsed_since(start), Duration::from_secs(20));
    }

    #[test]
    fn test_elapsed_since_future_instant_saturates_to_zero() {
        let start = Instant::now();
        let clock = ManualClock::starting_at(start);
        let later = start + Duration::from_secs(5);
        assert_eq!(clock.elapsed_since(later), Duration::ZERO);
    }
}
