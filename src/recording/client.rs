//! Session replay client
//!
//! Owns the session, the event queue and the rate limiter, and drives the
//! two flush triggers (queue size and periodic timer) plus the teardown
//! flush. Capture runs synchronously in the host's dispatch; only delivery
//! awaits.

use crate::capture::dom::DomEvent;
use crate::capture::event::{CapturedEvent, EventPayload};
use crate::capture::handlers::{
    capture_click, capture_input, capture_navigation, capture_scroll, ClickPosition,
};
use crate::capture::session::Session;
use crate::delivery::fallback::{
    append_failed_batch, load_failed_events, FallbackStore, MemoryFallbackStore,
    SqliteFallbackStore,
};
use crate::delivery::retry::backoff_delay;
use crate::delivery::transport::{BeaconTransport, EventTransport, HttpBeacon, HttpTransport};
use crate::delivery::COMPRESSION_HINT_BYTES;
use crate::observability::PAYLOAD_BYTES;
use crate::recording::event_queue::EventQueue;
use crate::recording::rate_limiter::RateLimiter;
use crate::recording::stats::{ClientStats, StatsCounters};
use crate::utils::config::{ClientConfig, FallbackBackend, ReplayConfig, TransportConfig};
use crate::utils::errors::{ReplayError, Result};
use bytes::Bytes;
use parking_lot::Mutex;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

/// Result of offering an event to the queue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Appended; `flush_triggered` when the append reached the batch size
    Queued { flush_triggered: bool },

    /// Rejected by the rate limiter
    Dropped,
}

/// How a flush ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushOutcome {
    /// Nothing was queued
    Empty,

    Delivered { events: usize, attempts: u32 },

    /// Retries exhausted; batch kept in the fallback store
    Persisted { events: usize },

    /// Retries exhausted and the fallback store failed too
    Lost { events: usize },
}

#[derive(Debug, Default)]
struct Lifecycle {
    started: bool,
    timer: Option<CancellationToken>,
}

struct ClientInner {
    config: ClientConfig,
    session: Session,
    queue: EventQueue,
    limiter: Mutex<RateLimiter>,
    transport: Arc<dyn EventTransport>,
    beacon: Option<Arc<dyn BeaconTransport>>,
    fallback: Arc<dyn FallbackStore>,
    /// Serializes read-modify-write cycles on the fallback log
    fallback_lock: Mutex<()>,
    lifecycle: Mutex<Lifecycle>,
    /// Bumped on every start/stop; listeners from older generations are detached
    generation: AtomicU64,
    stats: StatsCounters,
}

/// Capture and delivery client for one session
#[derive(Clone)]
pub struct ReplayClient {
    inner: Arc<ClientInner>,
}

/// Builder for [`ReplayClient`]
pub struct ClientBuilder {
    config: ClientConfig,
    transport: Option<Arc<dyn EventTransport>>,
    beacon: Option<Arc<dyn BeaconTransport>>,
    fallback: Option<Arc<dyn FallbackStore>>,
}

impl ClientBuilder {
    pub fn transport(mut self, transport: Arc<dyn EventTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn beacon(mut self, beacon: Arc<dyn BeaconTransport>) -> Self {
        self.beacon = Some(beacon);
        self
    }

    pub fn fallback_store(mut self, store: Arc<dyn FallbackStore>) -> Self {
        self.fallback = Some(store);
        self
    }

    /// Build the client
    ///
    /// Without an explicit transport, batches are POSTed to the endpoint
    /// resolved against the default origin. The fallback store defaults to
    /// memory.
    pub fn build(self) -> Result<ReplayClient> {
        self.config.validate()?;

        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(HttpTransport::new(
                &TransportConfig::default().origin,
                &self.config.api_endpoint,
            )?),
        };
        let fallback = self
            .fallback
            .unwrap_or_else(|| Arc::new(MemoryFallbackStore::new()));

        let session = Session::new();
        debug!("Created replay client for session {}", session.id());

        Ok(ReplayClient {
            inner: Arc::new(ClientInner {
                limiter: Mutex::new(RateLimiter::new(self.config.max_events_per_second)),
                config: self.config,
                session,
                queue: EventQueue::new(),
                transport,
                beacon: self.beacon,
                fallback,
                fallback_lock: Mutex::new(()),
                lifecycle: Mutex::new(Lifecycle::default()),
                generation: AtomicU64::new(0),
                stats: StatsCounters::default(),
            }),
        })
    }
}

impl ReplayClient {
    pub fn builder(config: ClientConfig) -> ClientBuilder {
        ClientBuilder {
            config,
            transport: None,
            beacon: None,
            fallback: None,
        }
    }

    /// Wire HTTP transport, beacon and fallback store from configuration
    pub fn from_config(config: &ReplayConfig) -> Result<Self> {
        let transport = HttpTransport::new(&config.transport.origin, &config.client.api_endpoint)?;
        info!("Delivering session replay events to {}", transport.endpoint());

        let fallback: Arc<dyn FallbackStore> = match config.fallback.backend {
            FallbackBackend::Memory => Arc::new(MemoryFallbackStore::new()),
            FallbackBackend::Sqlite => Arc::new(SqliteFallbackStore::open(&config.fallback.path)?),
        };

        let mut builder = Self::builder(config.client.clone())
            .transport(Arc::new(transport.clone()))
            .fallback_store(fallback);
        if config.transport.beacon {
            builder = builder.beacon(Arc::new(HttpBeacon::new(transport)));
        }
        builder.build()
    }

    pub fn session_id(&self) -> &str {
        self.inner.session.id()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    pub fn is_started(&self) -> bool {
        self.inner.lifecycle.lock().started
    }

    pub fn queue_len(&self) -> usize {
        self.inner.queue.len()
    }

    pub fn stats(&self) -> ClientStats {
        self.inner.stats.snapshot()
    }

    /// Events parked in the fallback store, for manual inspection
    ///
    /// The client never re-sends these on its own.
    pub fn failed_events(&self) -> Result<Vec<CapturedEvent>> {
        load_failed_events(self.inner.fallback.as_ref())
    }

    /// Attach capture and start the periodic flush timer
    ///
    /// Calling this on a started client logs a warning and returns the
    /// listener that is already attached. Must run inside a Tokio runtime.
    pub fn start(&self) -> Result<CaptureListener> {
        let mut lifecycle = self.inner.lifecycle.lock();

        if lifecycle.started {
            warn!(
                "Replay client is already started (session {})",
                self.session_id()
            );
            return Ok(CaptureListener {
                inner: Arc::clone(&self.inner),
                generation: self.inner.generation.load(Ordering::SeqCst),
            });
        }

        let handle = Handle::try_current()
            .map_err(|e| ReplayError::RuntimeUnavailable(e.to_string()))?;

        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let token = CancellationToken::new();
        let period = Duration::from_millis(self.inner.config.flush_interval_ms);
        handle.spawn(run_flush_timer(
            Arc::downgrade(&self.inner),
            period,
            token.clone(),
        ));

        lifecycle.started = true;
        lifecycle.timer = Some(token);

        info!(
            "Replay client started with session {}",
            self.inner.session.id()
        );

        Ok(CaptureListener {
            inner: Arc::clone(&self.inner),
            generation,
        })
    }

    /// Stop the timer, detach listeners and flush what is left
    ///
    /// Retry loops from earlier flushes keep running to completion.
    pub async fn stop(&self) -> FlushOutcome {
        {
            let mut lifecycle = self.inner.lifecycle.lock();
            if let Some(token) = lifecycle.timer.take() {
                token.cancel();
            }
            if lifecycle.started {
                self.inner.generation.fetch_add(1, Ordering::SeqCst);
            }
            lifecycle.started = false;
        }

        info!("Replay client stopped (session {})", self.session_id());
        self.flush_events().await
    }

    /// Offer an event to the queue
    pub fn add_event(&self, payload: EventPayload) -> Admission {
        self.inner.add_event(payload)
    }

    /// Drain the queue and deliver it with retries
    ///
    /// The queue is swapped out before this returns, so events captured
    /// while the returned future runs go into the next batch.
    pub fn flush_events(&self) -> impl Future<Output = FlushOutcome> + Send + 'static {
        let batch = self.inner.queue.drain();
        let inner = Arc::clone(&self.inner);
        async move {
            if batch.is_empty() {
                FlushOutcome::Empty
            } else {
                inner.deliver(batch).await
            }
        }
    }

    /// Teardown flush through the beacon; returns the events handed off
    pub fn flush_events_sync(&self) -> usize {
        self.inner.flush_events_sync()
    }
}

/// Entry point the host dispatches interaction events into
#[derive(Clone)]
pub struct CaptureListener {
    inner: Arc<ClientInner>,
    generation: u64,
}

impl CaptureListener {
    /// Whether the client that issued this listener is still running it
    pub fn is_attached(&self) -> bool {
        self.inner.generation.load(Ordering::SeqCst) == self.generation
    }

    /// Handle one host event
    ///
    /// Returns the admission for captured events; `None` when the listener
    /// is detached, the target is excluded, or the event was a teardown.
    pub fn dispatch(&self, event: DomEvent) -> Option<Admission> {
        if !self.is_attached() {
            return None;
        }

        let payload = match event {
            DomEvent::Click {
                target,
                client_x,
                client_y,
                page_x,
                page_y,
            } => capture_click(
                &target,
                ClickPosition {
                    client_x,
                    client_y,
                    page_x,
                    page_y,
                },
            ),
            DomEvent::Scroll(snapshot) => Some(capture_scroll(&snapshot)),
            DomEvent::Input { target } => capture_input(&target),
            DomEvent::Popstate {
                referrer,
                href,
                title,
            } => Some(capture_navigation(referrer.as_deref(), &href, &title)),
            DomEvent::Beforeunload => {
                if !self.inner.queue.is_empty() {
                    self.inner.flush_events_sync();
                }
                return None;
            }
        };

        match payload {
            Some(payload) => Some(self.inner.add_event(payload)),
            None => {
                self.inner.stats.excluded();
                None
            }
        }
    }
}

impl ClientInner {
    fn add_event(self: &Arc<Self>, payload: EventPayload) -> Admission {
        if !self.limiter.lock().try_acquire() {
            trace!(
                "Rate limit reached; dropping {} event",
                payload.event_type().as_str()
            );
            self.stats.dropped();
            return Admission::Dropped;
        }

        let len = self.queue.push_with(|| {
            CapturedEvent::new(self.session.id(), self.session.timestamp_ms(), payload)
        });
        self.stats.captured();

        if len < self.config.batch_size {
            return Admission::Queued {
                flush_triggered: false,
            };
        }

        let Ok(handle) = Handle::try_current() else {
            debug!("No runtime for size-triggered flush; {} events stay queued", len);
            return Admission::Queued {
                flush_triggered: false,
            };
        };

        match self.queue.drain_if_at_least(self.config.batch_size) {
            Some(batch) => {
                handle.spawn(Arc::clone(self).deliver(batch));
                Admission::Queued {
                    flush_triggered: true,
                }
            }
            // another trigger drained it first
            None => Admission::Queued {
                flush_triggered: false,
            },
        }
    }

    async fn deliver(self: Arc<Self>, batch: Vec<CapturedEvent>) -> FlushOutcome {
        let events = batch.len();
        let body = match serde_json::to_vec(&batch) {
            Ok(body) => Bytes::from(body),
            Err(e) => {
                error!("Failed to serialize batch of {} events: {}", events, e);
                self.stats.lost(events);
                return FlushOutcome::Lost { events };
            }
        };
        observe_payload_size(body.len());

        let max_attempts = self.config.max_retries;
        let mut attempt = 0;
        loop {
            attempt += 1;
            self.stats.attempt();

            match self.transport.send(body.clone()).await {
                Ok(()) => {
                    self.stats.delivered(events);
                    debug!("Delivered {} events in {} attempt(s)", events, attempt);
                    return FlushOutcome::Delivered {
                        events,
                        attempts: attempt,
                    };
                }
                Err(e) if attempt >= max_attempts => {
                    error!("Failed to send {} events after {} attempts: {}", events, attempt, e);
                    return self.persist(&batch);
                }
                Err(e) => {
                    let delay = backoff_delay(attempt);
                    warn!(
                        "Delivery attempt {}/{} failed: {}; retrying in {:?}",
                        attempt, max_attempts, e, delay
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    fn persist(&self, batch: &[CapturedEvent]) -> FlushOutcome {
        let events = batch.len();
        let _guard = self.fallback_lock.lock();

        match append_failed_batch(self.fallback.as_ref(), batch) {
            Ok(total) => {
                self.stats.persisted(events);
                info!(
                    "Saved {} events to fallback store for retry ({} stored)",
                    events, total
                );
                FlushOutcome::Persisted { events }
            }
            Err(e) => {
                self.stats.lost(events);
                error!("Failed to save {} events to fallback store: {}", events, e);
                FlushOutcome::Lost { events }
            }
        }
    }

    fn flush_events_sync(self: &Arc<Self>) -> usize {
        let batch = self.queue.drain();
        if batch.is_empty() {
            return 0;
        }

        let events = batch.len();
        let body = match serde_json::to_vec(&batch) {
            Ok(body) => Bytes::from(body),
            Err(e) => {
                debug!("Dropping teardown batch of {} events: {}", events, e);
                return 0;
            }
        };

        let handed_off = match &self.beacon {
            Some(beacon) => beacon.send_beacon(body),
            // no beacon: one unconfirmed attempt over the regular transport
            None => match Handle::try_current() {
                Ok(handle) => {
                    let inner = Arc::clone(self);
                    handle.spawn(async move {
                        if let Err(e) = inner.transport.send(body).await {
                            debug!("Teardown send failed: {}", e);
                        }
                    });
                    true
                }
                Err(_) => false,
            },
        };

        if handed_off {
            self.stats.beacon();
            debug!("Handed {} events to teardown transport", events);
            events
        } else {
            debug!("Teardown transport unavailable; dropped {} events", events);
            0
        }
    }
}

async fn run_flush_timer(inner: Weak<ClientInner>, period: Duration, token: CancellationToken) {
    let mut interval = tokio::time::interval_at(tokio::time::Instant::now() + period, period);

    loop {
        tokio::select! {
            _ = token.cancelled() => break,
            _ = interval.tick() => {
                let Some(inner) = inner.upgrade() else {
                    break;
                };
                let batch = inner.queue.drain();
                if !batch.is_empty() {
                    debug!("Periodic flush of {} events", batch.len());
                    tokio::spawn(inner.deliver(batch));
                }
            }
        }
    }

    debug!("Flush timer stopped");
}

fn observe_payload_size(bytes: usize) {
    metrics::histogram!(PAYLOAD_BYTES).record(bytes as f64);
    if bytes > COMPRESSION_HINT_BYTES {
        info!("Payload size: {} bytes (compression recommended)", bytes);
    }
}
