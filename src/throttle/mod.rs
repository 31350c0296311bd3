//! Leading-edge throttle
//!
//! The first call in a window passes immediately; later calls inside the same
//! window are dropped. Nothing is deferred to the trailing edge.
//!
//! Time comes from a [`Clock`] so tests can drive it by hand.

mod clock;

pub use clock::{Clock, ManualClock, SystemClock};

use std::time::{Duration, Instant};

/// Default interval between evaluated scroll signals
pub const DEFAULT_THROTTLE_INTERVAL: Duration = Duration::from_millis(200);

/// Leading-edge rate limiter
#[derive(Debug, Clone)]
pub struct Throttle<K: Clock = SystemClock> {
    interval: Duration,
    last_fired: Option<Instant>,
    clock: K,
}

impl Throttle<SystemClock> {
    /// Create a throttle on the system clock
    pub fn new(interval: Duration) -> Self {
        Self::with_clock(interval, SystemClock)
    }
}

impl Default for Throttle<SystemClock> {
    fn default() -> Self {
        Self::new(DEFAULT_THROTTLE_INTERVAL)
    }
}

impl<K: Clock> Throttle<K> {
    /// Create a throttle on a custom clock
    pub fn with_clock(interval: Duration, clock: K) -> Self {
        Self {
            interval,
            last_fired: None,
            clock,
        }
    }

    /// Window length
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Try to pass through. Returns `true` and opens a new window when the
    /// previous one has elapsed.
    pub fn try_acquire(&mut self) -> bool {
        let now = self.clock.now();
        match self.last_fired {
            Some(last) if now.saturating_duration_since(last) < self.interval => false,
            _ => {
                self.last_fired = Some(now);
                true
            }
        }
    }

    /// Time until the next call would pass
    pub fn remaining(&self) -> Duration {
        self.last_fired.map_or(Duration::ZERO, |last| {
            self.interval
                .saturating_sub(self.clock.now().saturating_duration_since(last))
        })
    }

    /// Forget the last firing
    pub fn reset(&mut self) {
        self.last_fired = None;
    }
}
