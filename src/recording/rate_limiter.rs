//! Admission rate limiting
//!
//! Rolling one-second window: the counter resets once a full second has
//! passed since the window opened. Events over the cap are dropped, never
//! queued, so a noisy page cannot grow the queue without bound.

use std::time::Duration;
use tokio::time::Instant;

const WINDOW: Duration = Duration::from_secs(1);

#[derive(Debug)]
pub struct RateLimiter {
    max_per_window: u32,
    window_start: Instant,
    admitted: u32,
}

impl RateLimiter {
    pub fn new(max_per_second: u32) -> Self {
        Self::starting_at(max_per_second, Instant::now())
    }

    pub fn starting_at(max_per_second: u32, now: Instant) -> Self {
        Self {
            max_per_window: max_per_second,
            window_start: now,
            admitted: 0,
        }
    }

    pub fn try_acquire(&mut self) -> bool {
        self.try_acquire_at(Instant::now())
    }

    /// Admit one event observed at `now`
    pub fn try_acquire_at(&mut self, now: Instant) -> bool {
        if now.saturating_duration_since(self.window_start) >= WINDOW {
            self.window_start = now;
            self.admitted = 0;
        }

        if self.admitted >= self.max_per_window {
            return false;
        }

        self.admitted += 1;
        true
    }
}
