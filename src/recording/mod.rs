//! Event recording
//!
//! This module ties capture to delivery:
//!
//! - **Client**: `ReplayClient` lifecycle, admission and flush triggers
//! - **Event Queue**: FIFO buffer with atomic drain
//! - **Rate Limiter**: Per-second admission cap
//! - **Stats**: Counters mirrored into `metrics`
//!
//! # Architecture
//!
//! ```text
//! Host → CaptureListener::dispatch → handler → add_event
//!                                                  │ rate limit
//!                                                  ↓
//!                                             EventQueue
//!                                  len ≥ batch_size │ every flush_interval
//!                                                  ↓
//!                                        drain (swap) → deliver (retry/backoff)
//!
//! beforeunload → drain → beacon
//! ```

pub mod client;
pub mod event_queue;
pub mod rate_limiter;
pub mod stats;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export commonly used types
pub use client::{Admission, CaptureListener, ClientBuilder, FlushOutcome, ReplayClient};
pub use event_queue::EventQueue;
pub use rate_limiter::RateLimiter;
pub use stats::ClientStats;
