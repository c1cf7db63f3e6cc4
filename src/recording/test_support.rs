//! Test doubles for delivery capabilities

use crate::capture::event::CapturedEvent;
use crate::delivery::transport::{BeaconTransport, EventTransport};
use crate::utils::errors::{ReplayError, Result};
use bytes::Bytes;
use futures::future::BoxFuture;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::Instant;

/// Transport that fails a fixed number of times, then forwards decoded batches
pub(crate) struct MockTransport {
    failures_remaining: AtomicUsize,
    attempts: Arc<Mutex<Vec<Instant>>>,
    delivered: mpsc::UnboundedSender<Vec<CapturedEvent>>,
}

impl MockTransport {
    fn with_failures(
        failures: usize,
    ) -> (
        Arc<Self>,
        mpsc::UnboundedReceiver<Vec<CapturedEvent>>,
        Arc<Mutex<Vec<Instant>>>,
    ) {
        let (tx, rx) = mpsc::unbounded_channel();
        let attempts = Arc::new(Mutex::new(Vec::new()));
        let transport = Arc::new(Self {
            failures_remaining: AtomicUsize::new(failures),
            attempts: Arc::clone(&attempts),
            delivered: tx,
        });
        (transport, rx, attempts)
    }

    pub(crate) fn healthy() -> (
        Arc<dyn EventTransport>,
        mpsc::UnboundedReceiver<Vec<CapturedEvent>>,
    ) {
        Self::failing_times(0)
    }

    pub(crate) fn failing_times(
        failures: usize,
    ) -> (
        Arc<dyn EventTransport>,
        mpsc::UnboundedReceiver<Vec<CapturedEvent>>,
    ) {
        let (transport, rx, _) = Self::with_failures(failures);
        (transport, rx)
    }

    /// Always fails; returns the attempt times
    pub(crate) fn failing() -> (Arc<dyn EventTransport>, Arc<Mutex<Vec<Instant>>>) {
        let (transport, _, attempts) = Self::with_failures(usize::MAX);
        (transport, attempts)
    }
}

impl EventTransport for MockTransport {
    fn send(&self, body: Bytes) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            self.attempts.lock().push(Instant::now());

            let remaining = self.failures_remaining.load(Ordering::SeqCst);
            if remaining > 0 {
                if remaining != usize::MAX {
                    self.failures_remaining.fetch_sub(1, Ordering::SeqCst);
                }
                return Err(ReplayError::HttpStatus(503));
            }

            let batch: Vec<CapturedEvent> = serde_json::from_slice(&body)?;
            let _ = self.delivered.send(batch);
            Ok(())
        })
    }
}

/// Beacon that records every payload it is handed
#[derive(Default)]
pub(crate) struct RecordingBeacon {
    payloads: Mutex<Vec<Bytes>>,
}

impl RecordingBeacon {
    pub(crate) fn batches(&self) -> Vec<Vec<CapturedEvent>> {
        self.payloads
            .lock()
            .iter()
            .map(|body| serde_json::from_slice(body).unwrap())
            .collect()
    }
}

impl BeaconTransport for RecordingBeacon {
    fn send_beacon(&self, body: Bytes) -> bool {
        self.payloads.lock().push(body);
        true
    }
}
