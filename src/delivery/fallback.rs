//! Local fallback storage for undeliverable batches
//!
//! Stores are plain key/value byte stores. The failed-events log lives under
//! a single key as a JSON array of events; every failure does a
//! read-modify-write and nothing prunes it.

use crate::capture::event::CapturedEvent;
use crate::utils::errors::{ReplayError, Result};
use dashmap::DashMap;
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use tracing::{debug, info};

/// Key holding batches that exhausted their retries
pub const FAILED_EVENTS_KEY: &str = "session-replay-failed-events";

/// Durable key/value storage capability
pub trait FallbackStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;
    fn set(&self, key: &str, value: &[u8]) -> Result<()>;
}

/// Append a batch to the failed-events log; returns the total stored
pub fn append_failed_batch(store: &dyn FallbackStore, batch: &[CapturedEvent]) -> Result<usize> {
    let mut stored: Vec<serde_json::Value> = match store.get(FAILED_EVENTS_KEY)? {
        Some(bytes) => serde_json::from_slice(&bytes)?,
        None => Vec::new(),
    };

    for event in batch {
        stored.push(serde_json::to_value(event)?);
    }

    let encoded = serde_json::to_vec(&stored)?;
    store.set(FAILED_EVENTS_KEY, &encoded)?;

    debug!(
        "Persisted {} events to fallback store ({} total)",
        batch.len(),
        stored.len()
    );
    Ok(stored.len())
}

/// Read the failed-events log
pub fn load_failed_events(store: &dyn FallbackStore) -> Result<Vec<CapturedEvent>> {
    match store.get(FAILED_EVENTS_KEY)? {
        Some(bytes) => Ok(serde_json::from_slice(&bytes)?),
        None => Ok(Vec::new()),
    }
}

/// In-process store, optionally bounded to emulate a storage quota
#[derive(Debug, Default)]
pub struct MemoryFallbackStore {
    entries: DashMap<String, Vec<u8>>,
    quota_bytes: Option<usize>,
}

impl MemoryFallbackStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject values larger than `quota_bytes`
    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            entries: DashMap::new(),
            quota_bytes: Some(quota_bytes),
        }
    }
}

impl FallbackStore for MemoryFallbackStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.entries.get(key).map(|entry| entry.value().clone()))
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        if let Some(quota) = self.quota_bytes {
            if value.len() > quota {
                return Err(ReplayError::StorageFailed(format!(
                    "Quota exceeded: {} bytes > {} bytes",
                    value.len(),
                    quota
                )));
            }
        }
        self.entries.insert(key.to_string(), value.to_vec());
        Ok(())
    }
}

/// SQLite-backed key/value store
pub struct SqliteFallbackStore {
    db: Mutex<Connection>,
}

impl SqliteFallbackStore {
    /// Open (or create) the database file
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                ReplayError::StorageFailed(format!("Failed to create directory: {}", e))
            })?;
        }

        let conn = Connection::open(path)?;
        let store = Self::with_connection(conn)?;
        info!("Fallback store opened at {:?}", path);
        Ok(store)
    }

    pub fn in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS replay_storage (
                key TEXT PRIMARY KEY,
                value BLOB NOT NULL,
                updated_at INTEGER NOT NULL
            )
            "#,
            [],
        )?;

        Ok(Self {
            db: Mutex::new(conn),
        })
    }
}

impl FallbackStore for SqliteFallbackStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let db = self.db.lock();
        let value = db
            .query_row(
                "SELECT value FROM replay_storage WHERE key = ?",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        let db = self.db.lock();
        db.execute(
            r#"
            INSERT INTO replay_storage (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            "#,
            params![key, value, chrono::Utc::now().timestamp_millis()],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::event::{EventPayload, NavigationPayload};
    use tempfile::tempdir;

    fn nav_event(to: &str) -> CapturedEvent {
        CapturedEvent::new(
            "sess-1",
            1_000,
            EventPayload::Navigation(NavigationPayload {
                from: None,
                to: to.to_string(),
                title: "Page".to_string(),
            }),
        )
    }

    #[test]
    fn test_log_grows_across_failures() {
        let store = MemoryFallbackStore::new();

        assert_eq!(append_failed_batch(&store, &[nav_event("/a")]).unwrap(), 1);
        assert_eq!(
            append_failed_batch(&store, &[nav_event("/b"), nav_event("/c")]).unwrap(),
            3
        );

        let events = load_failed_events(&store).unwrap();
        assert_eq!(events, vec![nav_event("/a"), nav_event("/b"), nav_event("/c")]);
    }

    #[test]
    fn test_empty_log() {
        let store = MemoryFallbackStore::new();
        assert!(load_failed_events(&store).unwrap().is_empty());
    }

    #[test]
    fn test_quota_exceeded() {
        let store = MemoryFallbackStore::with_quota(16);
        let result = append_failed_batch(&store, &[nav_event("/too-large-for-quota")]);
        assert!(matches!(result, Err(ReplayError::StorageFailed(_))));
        assert!(store.get(FAILED_EVENTS_KEY).unwrap().is_none());
    }

    #[test]
    fn test_corrupt_log_is_error() {
        let store = MemoryFallbackStore::new();
        store.set(FAILED_EVENTS_KEY, b"not json").unwrap();
        assert!(append_failed_batch(&store, &[nav_event("/a")]).is_err());
    }

    #[test]
    fn test_sqlite_roundtrip() {
        let store = SqliteFallbackStore::in_memory().unwrap();
        assert!(store.get("missing").unwrap().is_none());

        store.set("k", b"one").unwrap();
        store.set("k", b"two").unwrap();
        assert_eq!(store.get("k").unwrap(), Some(b"two".to_vec()));
    }

    #[test]
    fn test_sqlite_survives_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("fallback.db");

        {
            let store = SqliteFallbackStore::open(&path).unwrap();
            append_failed_batch(&store, &[nav_event("/a")]).unwrap();
        }

        let reopened = SqliteFallbackStore::open(&path).unwrap();
        assert_eq!(load_failed_events(&reopened).unwrap(), vec![nav_event("/a")]);
    }
}
