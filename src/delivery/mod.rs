//! Batch delivery
//!
//! - **Transport**: JSON POST and fire-and-forget beacon
//! - **Retry**: Exponential backoff schedule
//! - **Fallback**: Local storage for batches that exhausted retries
//!
//! # Architecture
//!
//! ```text
//! drained batch → serialize → POST ──ok──→ done
//!                              │ fail
//!                              ├─ attempt < max → sleep 2^n s → POST
//!                              └─ exhausted → FallbackStore["session-replay-failed-events"]
//!
//! beforeunload → drain → BeaconTransport (no confirmation)
//! ```

pub mod fallback;
pub mod retry;
pub mod transport;

// Re-export commonly used types
pub use fallback::{FallbackStore, MemoryFallbackStore, SqliteFallbackStore, FAILED_EVENTS_KEY};
pub use retry::backoff_delay;
pub use transport::{BeaconTransport, EventTransport, HttpBeacon, HttpTransport};

/// Serialized batches above this size are logged as compression candidates
pub const COMPRESSION_HINT_BYTES: usize = 1024;
