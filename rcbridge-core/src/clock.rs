//! Monotonic time seam: the discovery cadence source and the entropy hint
//! for time-seeded key generation.

use std::time::Instant;

/// Monotonic microsecond counter.
pub trait Clock {
    /// Microseconds since an arbitrary fixed origin; never goes backwards.
    fn now_micros(&self) -> u64;
}

/// Process-uptime clock for hosts with std.
#[derive(Debug, Clone)]
pub struct StdClock(Instant);

impl StdClock {
    pub fn new() -> Self {
        StdClock(Instant::now())
    }
}

impl Default for StdClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for StdClock {
    fn now_micros(&self) -> u64 {
        self.0.elapsed().as_micros() as u64
    }
}
