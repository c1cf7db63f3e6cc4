//! Per-client session identity and capture clock

use std::sync::atomic::{AtomicI64, Ordering};

/// One client lifetime. Never persisted or resumed.
#[derive(Debug)]
pub struct Session {
    id: String,
    last_timestamp_ms: AtomicI64,
}

impl Session {
    /// Create a session with a fresh random identifier
    pub fn new() -> Self {
        Self {
            id: generate_session_id(),
            last_timestamp_ms: AtomicI64::new(0),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Milliseconds since epoch, never earlier than a previous call
    pub fn timestamp_ms(&self) -> i64 {
        self.observe(chrono::Utc::now().timestamp_millis())
    }

    fn observe(&self, now_ms: i64) -> i64 {
        let previous = self.last_timestamp_ms.fetch_max(now_ms, Ordering::SeqCst);
        previous.max(now_ms)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// Random identifier in UUID v4 text form
pub fn generate_session_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
