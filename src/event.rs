//! Event queue: bounded, lossy-on-overflow FIFO of `(tag, kind, payload)`.

use std::sync::Arc;
use std::time::{Duration, Instant};

use log::warn;

use crate::pool::BufferPool;
use crate::queue::SpscQueue;

/// A received payload. Owned by the receiver; `release` returns the backing
/// allocation to the pool it came from.
pub struct EventBuffer {
    data: Option<Vec<u8>>,
    pool: Arc<BufferPool>,
}

impl EventBuffer {
    pub(crate) fn new(data: Vec<u8>, pool: Arc<BufferPool>) -> Self {
        EventBuffer {
            data: Some(data),
            pool,
        }
    }

    pub fn as_slice(&self) -> &[u8] {
        self.data.as_deref().unwrap_or(&[])
    }

    /// Explicitly release the buffer back to the pool. Also happens on drop.
    pub fn release(mut self) {
        self.take_and_reclaim();
    }

    fn take_and_reclaim(&mut self) {
        if let Some(buf) = self.data.take() {
            self.pool.reclaim(buf);
        }
    }
}

impl Drop for EventBuffer {
    fn drop(&mut self) {
        self.take_and_reclaim();
    }
}

impl std::fmt::Debug for EventBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBuffer")
            .field("len", &self.as_slice().len())
            .finish()
    }
}

/// The three-variant tagged record delivered to the host application.
#[derive(Debug)]
pub enum Event {
    Connected { tag: String },
    Data { tag: String, bytes: EventBuffer },
    Disconnected { tag: String },
}

/// Bounded, lossy-on-overflow event queue. Single consumer: the host's
/// polling thread.
pub struct EventQueue {
    inner: SpscQueue<Event>,
    warn_threshold: usize,
    hard_cap: usize,
    last_warn: parking_lot::Mutex<Option<Instant>>,
}

const WARN_INTERVAL: Duration = Duration::from_secs(10);

impl EventQueue {
    pub fn new(warn_threshold: usize, hard_cap: usize) -> Self {
        EventQueue {
            inner: SpscQueue::new(),
            warn_threshold,
            hard_cap,
            last_warn: parking_lot::Mutex::new(None),
        }
    }

    /// Attempt to enqueue an event. Returns `false` if the hard cap was
    /// reached and the event was dropped (caller is expected to log this
    /// for `Data` events specifically; `Connected`/`Disconnected` are never
    /// dropped since the invariant "exactly one `Disconnected`" must hold).
    pub fn push(&self, event: Event) -> bool {
        let len = self.inner.len();
        if len >= self.hard_cap {
            return false;
        }
        if len >= self.warn_threshold {
            self.maybe_warn(len);
        }
        self.inner.push(event);
        true
    }

    /// Enqueue a lifecycle event (`Connected`/`Disconnected`), whose
    /// delivery the client-state invariant depends on: it is never dropped,
    /// even at the hard cap. If the queue is already full, evict the oldest
    /// queued event to make room, so the queue length still never exceeds
    /// `hard_cap`.
    pub fn push_lifecycle(&self, event: Event) {
        if self.inner.len() >= self.hard_cap {
            self.inner.pop();
            warn!("event queue at hard cap; evicting oldest event to admit a lifecycle event");
        }
        self.inner.push(event);
    }

    fn maybe_warn(&self, depth: usize) {
        let mut last = self.last_warn.lock();
        let now = Instant::now();
        let should_warn = match *last {
            Some(t) => now.duration_since(t) >= WARN_INTERVAL,
            None => true,
        };
        if should_warn {
            warn!("event queue depth {} exceeds warning threshold", depth);
            *last = Some(now);
        }
    }

    pub fn try_pop(&self) -> Option<Event> {
        self.inner.pop()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn clear(&self) {
        self.inner.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_queue() -> EventQueue {
        EventQueue::new(2, 4)
    }

    #[test]
    fn drops_past_hard_cap() {
        let q = make_queue();
        for i in 0..4 {
            assert!(q.push(Event::Disconnected { tag: format!("t#{i}") }));
        }
        assert!(!q.push(Event::Disconnected { tag: "t#overflow".into() }));
        assert_eq!(q.len(), 4);
    }

    #[test]
    fn len_never_exceeds_hard_cap() {
        let q = EventQueue::new(100, 10);
        for i in 0..50 {
            q.push(Event::Disconnected { tag: format!("t#{i}") });
            assert!(q.len() <= 10);
        }
    }

    #[test]
    fn push_lifecycle_evicts_oldest_rather_than_exceed_hard_cap() {
        let q = make_queue();
        for i in 0..4 {
            assert!(q.push(Event::Data {
                tag: format!("t#{i}"),
                bytes: EventBuffer::new(vec![], Arc::new(BufferPool::new())),
            }));
        }
        assert_eq!(q.len(), 4);

        q.push_lifecycle(Event::Disconnected { tag: "t#final".into() });
        assert_eq!(q.len(), 4);

        // The oldest entry (t#0) was evicted to make room; the lifecycle
        // event must still be present at the back.
        let mut saw_disconnected = false;
        while let Some(event) = q.try_pop() {
            if matches!(event, Event::Disconnected { tag } if tag == "t#final") {
                saw_disconnected = true;
            }
        }
        assert!(saw_disconnected);
    }
}
