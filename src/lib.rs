//! Session Replay Client Library
//!
//! Captures user interactions, masks sensitive input, and delivers batched
//! events to a collector endpoint without ever disturbing the host page.
//!
//! # Architecture
//!
//! The crate is structured into several key modules:
//!
//! - **capture**: Host event model, payloads, masking, session identity
//! - **recording**: The `ReplayClient`, its queue, rate limiter and stats
//! - **delivery**: HTTP transport, teardown beacon, fallback storage, retry
//! - **observability**: Tracing and metrics setup
//! - **utils**: Configuration and errors

// Public module exports
pub mod capture;
pub mod delivery;
pub mod observability;
pub mod recording;
pub mod utils;

// Re-export commonly used types
pub use capture::{CapturedEvent, DomEvent, ElementSnapshot, EventPayload, EventType};
pub use recording::{Admission, CaptureListener, FlushOutcome, ReplayClient};
pub use utils::config::{ClientConfig, ReplayConfig};
pub use utils::errors::{ReplayError, Result};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const GIT_HASH: &str = env!("GIT_HASH");

/// Build information
pub struct BuildInfo {
    pub version: &'static str,
    pub git_hash: &'static str,
    pub build_timestamp: &'static str,
    pub rustc_version: &'static str,
}

impl BuildInfo {
    pub fn current() -> Self {
        Self {
            version: VERSION,
            git_hash: GIT_HASH,
            build_timestamp: env!("BUILD_TIMESTAMP"),
            rustc_version: env!("RUSTC_VERSION"),
        }
    }
}
