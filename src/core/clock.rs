//! Clock
//!
//! Time source for expiry and polling deadlines, in seconds since the epoch.

use std::sync::atomic::{AtomicU64, Ordering};
use tokio::time::Instant;

/// Clock interface.
pub trait Clock: Send + Sync {
    /// Current time in seconds since the Unix epoch.
    fn now_seconds(&self) -> u64;
}

/// Wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_seconds(&self) -> u64 {
        chrono::Utc::now().timestamp().max(0) as u64
    }
}

/// Manually driven clock for testing.
///
/// Not tied to tokio time: under a paused runtime, polling deadlines only
/// pass when the test calls [`advance`](Self::advance). Use [`TokioClock`]
/// to have `tokio::time::advance` and auto-advance move the deadline too.
#[derive(Debug, Default)]
pub struct MockClock {
    now: AtomicU64,
}

impl MockClock {
    pub fn new(now: u64) -> Self {
        Self {
            now: AtomicU64::new(now),
        }
    }

    pub fn set(&self, now: u64) {
        self.now.store(now, Ordering::SeqCst);
    }

    pub fn advance(&self, seconds: u64) {
        self.now.fetch_add(seconds, Ordering::SeqCst);
    }
}

impl Clock for MockClock {
    fn now_seconds(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// Clock that starts at `base` seconds and follows tokio time, paused or not.
#[derive(Debug, Clone)]
pub struct TokioClock {
    origin: Instant,
    base: u64,
}

impl TokioClock {
    pub fn new(base: u64) -> Self {
        Self {
            origin: Instant::now(),
            base,
        }
    }
}

impl Clock for TokioClock {
    fn now_seconds(&self) -> u64 {
        self.base + self.origin.elapsed().as_secs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_clock() {
        let clock = MockClock::new(1000);
        assert_eq!(clock.now_seconds(), 1000);
        clock.advance(5);
        assert_eq!(clock.now_seconds(), 1005);
        clock.set(10);
        assert_eq!(clock.now_seconds(), 10);
    }

    #[tokio::test(start_paused = true)]
    async fn test_tokio_clock_follows_paused_time() {
        let clock = TokioClock::new(1000);
        tokio::time::advance(std::time::Duration::from_millis(2500)).await;
        assert_eq!(clock.now_seconds(), 1002);
    }

    #[test]
    fn test_system_clock_is_after_2020() {
        assert!(SystemClock.now_seconds() > 1_577_836_800);
    }
}
