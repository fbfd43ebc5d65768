//! Thread-safe FIFO with a bulk-drain operation.
//!
//! The send queue needs exactly one atomic operation beyond push/pop: moving
//! the whole backlog out in one shot so the send worker can batch it.
//! `parking_lot::Mutex` is used throughout this crate in preference to
//! `std::sync::Mutex`: no poisoning to thread through every call site.

use parking_lot::Mutex;
use std::collections::VecDeque;

/// A mutex-protected FIFO with a bulk-drain method.
pub struct SpscQueue<T> {
    inner: Mutex<VecDeque<T>>,
}

impl<T> SpscQueue<T> {
    pub fn new() -> Self {
        SpscQueue {
            inner: Mutex::new(VecDeque::new()),
        }
    }

    /// Append one item, preserving FIFO order across concurrent producers.
    pub fn push(&self, item: T) {
        self.inner.lock().push_back(item);
    }

    /// Non-blocking single-item dequeue, for the event queue's consumer side.
    pub fn pop(&self) -> Option<T> {
        self.inner.lock().pop_front()
    }

    /// Atomically move every currently queued item out, leaving the queue
    /// empty. Used by the send worker so the enqueue side never blocks on a
    /// write in progress.
    pub fn drain_all(&self) -> Vec<T> {
        let mut guard = self.inner.lock();
        if guard.is_empty() {
            return Vec::new();
        }
        std::mem::take(&mut *guard).into_iter().collect()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Discard everything in the queue (used when a connection is reset).
    pub fn clear(&self) {
        self.inner.lock().clear();
    }
}

impl<T> Default for SpscQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}
