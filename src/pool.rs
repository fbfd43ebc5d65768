//! A small buffer pool for received payloads.
//!
//! A `Vec` of spare buffers: `alloc` pops one or allocates fresh, `reclaim`
//! pushes a used one back. Buffers are sized to the payload (received
//! frames vary from 1 byte up to `MAX_MESSAGE_SIZE`), which is what
//! `Event::Data` buffers are released back to on drop.

use parking_lot::Mutex;

pub struct BufferPool {
    spares: Mutex<Vec<Vec<u8>>>,
}

impl BufferPool {
    pub fn new() -> Self {
        BufferPool {
            spares: Mutex::new(Vec::new()),
        }
    }

    /// Borrow a buffer with at least `len` bytes of capacity, resized to
    /// exactly `len` and zero-filled. Reuses a pooled allocation when one is
    /// large enough, to reduce allocator pressure at high event rates.
    pub fn alloc(&self, len: usize) -> Vec<u8> {
        let mut spares = self.spares.lock();
        if let Some(pos) = spares.iter().position(|b| b.capacity() >= len) {
            let mut buf = spares.swap_remove(pos);
            buf.clear();
            buf.resize(len, 0);
            buf
        } else {
            vec![0u8; len]
        }
    }

    /// Return a buffer to the pool for reuse. Called when an `Event::Data`
    /// payload is released by the application.
    pub fn reclaim(&self, buf: Vec<u8>) {
        const MAX_POOLED: usize = 64;
        let mut spares = self.spares.lock();
        if spares.len() < MAX_POOLED {
            spares.push(buf);
        }
    }
}

impl Default for BufferPool {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alloc_gives_exact_len() {
        let pool = BufferPool::new();
        let buf = pool.alloc(100);
        assert_eq!(buf.len(), 100);
    }

    #[test]
    fn reclaimed_buffer_is_reused() {
        let pool = BufferPool::new();
        let buf = pool.alloc(256);
        let ptr = buf.as_ptr();
        pool.reclaim(buf);
        let buf2 = pool.alloc(100);
        // Same backing allocation reused since its capacity (256) covers the request.
        assert_eq!(buf2.as_ptr(), ptr);
        assert_eq!(buf2.len(), 100);
    }
}
