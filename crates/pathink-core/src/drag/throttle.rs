//! Frame throttle bounding how often a drag writes geometry.

use std::time::Duration;

// Use web_time for WASM compatibility
#[cfg(not(target_arch = "wasm32"))]
pub use std::time::Instant;
#[cfg(target_arch = "wasm32")]
pub use web_time::Instant;

/// Lets at most one update through per `interval`.
#[derive(Debug, Clone)]
pub struct FrameThrottle {
    interval: Duration,
    last: Option<Instant>,
}

impl FrameThrottle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Whether an update may run at `now`. The first update always may.
    pub fn ready(&self, now: Instant) -> bool {
        match self.last {
            None => true,
            Some(last) => now.duration_since(last) >= self.interval,
        }
    }

    /// Record that an update ran at `now`.
    pub fn mark(&mut self, now: Instant) {
        self.last = Some(now);
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}
