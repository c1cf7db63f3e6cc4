//! Retry schedule for batch delivery

use std::time::Duration;

/// Cap on the backoff exponent
const MAX_BACKOFF_EXPONENT: u32 = 16;

/// Wait after the `attempt`-th failed send (1-based): 2^attempt seconds
pub fn backoff_delay(attempt: u32) -> Duration {
    Duration::from_secs(1u64 << attempt.min(MAX_BACKOFF_EXPONENT))
}
