//! Client counters
//!
//! Every update also feeds the `metrics` facade so an installed exporter
//! sees the same numbers `ReplayClient::stats` reports.

use crate::observability::{
    BATCHES_DELIVERED, BEACON_FLUSHES, DELIVERY_ATTEMPTS, EVENTS_CAPTURED, EVENTS_DROPPED,
    EVENTS_EXCLUDED, EVENTS_LOST, EVENTS_PERSISTED,
};
use metrics::counter;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub(crate) struct StatsCounters {
    events_captured: AtomicU64,
    events_dropped: AtomicU64,
    events_excluded: AtomicU64,
    delivery_attempts: AtomicU64,
    batches_delivered: AtomicU64,
    events_delivered: AtomicU64,
    batches_persisted: AtomicU64,
    events_persisted: AtomicU64,
    events_lost: AtomicU64,
    beacon_flushes: AtomicU64,
}

impl StatsCounters {
    pub(crate) fn captured(&self) {
        self.events_captured.fetch_add(1, Ordering::Relaxed);
        counter!(EVENTS_CAPTURED).increment(1);
    }

    pub(crate) fn dropped(&self) {
        self.events_dropped.fetch_add(1, Ordering::Relaxed);
        counter!(EVENTS_DROPPED).increment(1);
    }

    pub(crate) fn excluded(&self) {
        self.events_excluded.fetch_add(1, Ordering::Relaxed);
        counter!(EVENTS_EXCLUDED).increment(1);
    }

    pub(crate) fn attempt(&self) {
        self.delivery_attempts.fetch_add(1, Ordering::Relaxed);
        counter!(DELIVERY_ATTEMPTS).increment(1);
    }

    pub(crate) fn delivered(&self, events: usize) {
        self.batches_delivered.fetch_add(1, Ordering::Relaxed);
        self.events_delivered
            .fetch_add(events as u64, Ordering::Relaxed);
        counter!(BATCHES_DELIVERED).increment(1);
    }

    pub(crate) fn persisted(&self, events: usize) {
        self.batches_persisted.fetch_add(1, Ordering::Relaxed);
        self.events_persisted
            .fetch_add(events as u64, Ordering::Relaxed);
        counter!(EVENTS_PERSISTED).increment(events as u64);
    }

    pub(crate) fn lost(&self, events: usize) {
        self.events_lost.fetch_add(events as u64, Ordering::Relaxed);
        counter!(EVENTS_LOST).increment(events as u64);
    }

    pub(crate) fn beacon(&self) {
        self.beacon_flushes.fetch_add(1, Ordering::Relaxed);
        counter!(BEACON_FLUSHES).increment(1);
    }

    pub(crate) fn snapshot(&self) -> ClientStats {
        ClientStats {
            events_captured: self.events_captured.load(Ordering::Relaxed),
            events_dropped: self.events_dropped.load(Ordering::Relaxed),
            events_excluded: self.events_excluded.load(Ordering::Relaxed),
            delivery_attempts: self.delivery_attempts.load(Ordering::Relaxed),
            batches_delivered: self.batches_delivered.load(Ordering::Relaxed),
            events_delivered: self.events_delivered.load(Ordering::Relaxed),
            batches_persisted: self.batches_persisted.load(Ordering::Relaxed),
            events_persisted: self.events_persisted.load(Ordering::Relaxed),
            events_lost: self.events_lost.load(Ordering::Relaxed),
            beacon_flushes: self.beacon_flushes.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time client statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientStats {
    pub events_captured: u64,
    pub events_dropped: u64,
    pub events_excluded: u64,
    pub delivery_attempts: u64,
    pub batches_delivered: u64,
    pub events_delivered: u64,
    pub batches_persisted: u64,
    pub events_persisted: u64,
    pub events_lost: u64,
    pub beacon_flushes: u64,
}

impl ClientStats {
    /// Percentage of offered events rejected by the rate limiter
    pub fn drop_rate(&self) -> f64 {
        let offered = self.events_captured + self.events_dropped;
        if offered == 0 {
            0.0
        } else {
            (self.events_dropped as f64 / offered as f64) * 100.0
        }
    }
}
