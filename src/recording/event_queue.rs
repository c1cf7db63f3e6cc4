//! FIFO event queue with atomic drain
//!
//! Capture appends under a short lock; a flush swaps the whole buffer out in
//! one step, so concurrent flush triggers can never hand out the same event
//! twice or lose one between them.

use crate::capture::event::CapturedEvent;
use parking_lot::Mutex;

/// In-memory queue owned by one client
#[derive(Debug, Default)]
pub struct EventQueue {
    /// Pending events in capture order
    events: Mutex<Vec<CapturedEvent>>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build and append an event under the lock; returns the new length
    ///
    /// Building under the lock keeps timestamps in queue order.
    pub fn push_with(&self, build: impl FnOnce() -> CapturedEvent) -> usize {
        let mut events = self.events.lock();
        events.push(build());
        events.len()
    }

    pub fn push(&self, event: CapturedEvent) -> usize {
        self.push_with(|| event)
    }

    /// Take every pending event, leaving the queue empty
    pub fn drain(&self) -> Vec<CapturedEvent> {
        std::mem::take(&mut *self.events.lock())
    }

    /// Drain only when at least `threshold` events are pending
    pub fn drain_if_at_least(&self, threshold: usize) -> Option<Vec<CapturedEvent>> {
        let mut events = self.events.lock();
        if events.is_empty() || events.len() < threshold {
            return None;
        }
        Some(std::mem::take(&mut *events))
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::event::{EventPayload, ScrollPayload};
    use std::collections::HashSet;
    use std::sync::Arc;

    fn scroll_event(y: f64) -> CapturedEvent {
        CapturedEvent::new(
            "sess",
            0,
            EventPayload::Scroll(ScrollPayload {
                scroll_x: 0.0,
                scroll_y: y,
                viewport_width: 1280.0,
                viewport_height: 720.0,
                document_height: 4000.0,
            }),
        )
    }

    fn scroll_y(event: &CapturedEvent) -> f64 {
        match event.payload() {
            EventPayload::Scroll(s) => s.scroll_y,
            other => panic!("unexpected payload {:?}", other),
        }
    }

    #[test]
    fn test_push_and_drain() {
        let queue = EventQueue::new();
        assert!(queue.is_empty());

        assert_eq!(queue.push(scroll_event(1.0)), 1);
        assert_eq!(queue.push(scroll_event(2.0)), 2);

        let batch = queue.drain();
        assert_eq!(batch.iter().map(scroll_y).collect::<Vec<_>>(), vec![1.0, 2.0]);
        assert!(queue.is_empty());
        assert!(queue.drain().is_empty());
    }

    #[test]
    fn test_drain_if_at_least() {
        let queue = EventQueue::new();
        queue.push(scroll_event(1.0));
        assert!(queue.drain_if_at_least(2).is_none());

        queue.push(scroll_event(2.0));
        assert_eq!(queue.drain_if_at_least(2).map(|b| b.len()), Some(2));
        assert!(queue.drain_if_at_least(1).is_none());
    }

    #[test]
    fn test_concurrent_drains_never_duplicate() {
        use std::thread;

        let queue = Arc::new(EventQueue::new());
        let producers: Vec<_> = (0..4)
            .map(|p| {
                let q = Arc::clone(&queue);
                thread::spawn(move || {
                    for i in 0..250 {
                        q.push(scroll_event((p * 1000 + i) as f64));
                    }
                })
            })
            .collect();
        let drainers: Vec<_> = (0..3)
            .map(|_| {
                let q = Arc::clone(&queue);
                thread::spawn(move || {
                    let mut seen = Vec::new();
                    for _ in 0..200 {
                        seen.extend(q.drain());
                    }
                    seen
                })
            })
            .collect();

        for handle in producers {
            handle.join().unwrap();
        }
        let mut all: Vec<CapturedEvent> = drainers
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        all.extend(queue.drain());

        let unique: HashSet<u64> = all.iter().map(|e| scroll_y(e) as u64).collect();
        assert_eq!(all.len(), 1000);
        assert_eq!(unique.len(), 1000);
    }
}
