//! The public `Client` facade: connect/disconnect/send/poll over a small
//! atomic state machine.
//!
//! `Idle → Connecting → Connected → Closing → Idle`, compare-and-set guarded
//! so a second `connect()` while not `Idle` is a no-op.

use std::sync::atomic::{AtomicU32, AtomicU8, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use parking_lot::Mutex;

use crate::config::ClientConfig;
use crate::error::ConnectError;
use crate::event::{Event, EventQueue};
use crate::pool::BufferPool;
use crate::transport::{self, SendHandle, Transport};

const IDLE: u8 = 0;
const CONNECTING: u8 = 1;
const CONNECTED: u8 = 2;
const CLOSING: u8 = 3;

struct ConnectionHandles {
    transport: Transport,
    send_handle: Arc<SendHandle>,
}

// State shared between `Client` and its background connect thread.
struct Shared {
    tag: String,
    ctag: Mutex<String>,
    state: AtomicU8,
    connect_id: AtomicU32,
    config: Arc<ClientConfig>,
    events: Arc<EventQueue>,
    pool: Arc<BufferPool>,
    inner: Mutex<Option<ConnectionHandles>>,
}

/// A single logical connection. Safe to share across threads: every public
/// method takes `&self`.
pub struct Client {
    shared: Arc<Shared>,
    connect_thread: Mutex<Option<JoinHandle<()>>>,
}

impl Client {
    pub fn new(tag: impl Into<String>) -> Result<Self, ConnectError> {
        Self::with_config(tag, ClientConfig::default())
    }

    pub fn with_config(tag: impl Into<String>, config: ClientConfig) -> Result<Self, ConnectError> {
        let tag = tag.into();
        if tag.is_empty() {
            return Err(ConnectError::EmptyTag);
        }
        let events = Arc::new(EventQueue::new(config.recv_queue_warn, config.max_recv_queue));
        Ok(Client {
            shared: Arc::new(Shared {
                ctag: Mutex::new(tag.clone()),
                tag,
                state: AtomicU8::new(IDLE),
                connect_id: AtomicU32::new(0),
                config: Arc::new(config),
                events,
                pool: Arc::new(BufferPool::new()),
                inner: Mutex::new(None),
            }),
            connect_thread: Mutex::new(None),
        })
    }

    /// Begin connecting to `host:port`. Returns immediately; the connection
    /// completes on a background thread and the state transitions to
    /// `Connected` (or back to `Idle` on failure) asynchronously.
    pub fn connect(&self, host: &str, port: u16) -> Result<(), ConnectError> {
        if host.is_empty() {
            return Err(ConnectError::EmptyHost);
        }

        if self
            .shared
            .state
            .compare_exchange(IDLE, CONNECTING, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            log::info!("{}: connect() called while not idle, ignoring", self.shared.tag);
            return Ok(());
        }

        let dropped = self.shared.events.len();
        self.shared.events.clear();
        if dropped > 0 {
            log::info!(
                "{}: dropped {dropped} leftover events from a previous session",
                self.shared.tag
            );
        }

        let id = self.shared.connect_id.fetch_add(1, Ordering::SeqCst) + 1;
        let ctag = format!("{}#{}", self.shared.tag, id);
        *self.shared.ctag.lock() = ctag.clone();

        let host = host.to_string();
        let shared = self.shared.clone();

        let handle = thread::spawn(move || {
            let result = transport::connect(
                &host,
                port,
                ctag.clone(),
                shared.config.clone(),
                shared.events.clone(),
                shared.pool.clone(),
            );
            match result {
                Ok((transport, send_handle)) => {
                    *shared.inner.lock() = Some(ConnectionHandles { transport, send_handle });
                    shared.state.store(CONNECTED, Ordering::SeqCst);
                }
                Err(e) => {
                    log::warn!("{ctag}: connect failed: {e}");
                    shared.state.store(IDLE, Ordering::SeqCst);
                }
            }
        });

        *self.connect_thread.lock() = Some(handle);
        Ok(())
    }

    /// Tear down the current connection (or connect attempt), if any.
    /// No-op from `Idle`.
    pub fn disconnect(&self) {
        let previous = self.shared.state.swap(CLOSING, Ordering::SeqCst);
        if previous == IDLE {
            self.shared.state.store(IDLE, Ordering::SeqCst);
            return;
        }

        if let Some(handle) = self.connect_thread.lock().take() {
            let _ = handle.join();
        }
        if let Some(mut handles) = self.shared.inner.lock().take() {
            // Joins the receive worker, whose cleanup path enqueues the
            // terminal `Disconnected` event. Leave the event queue alone
            // here: it's the caller's job to poll that event out, and
            // `connect()` already drains anything left over from a prior
            // session before starting a new one.
            handles.transport.disconnect();
        }

        self.shared.state.store(IDLE, Ordering::SeqCst);
    }

    /// Enqueue `bytes` for sending. Rejects empty or oversize messages and
    /// any call while not `Connected`.
    pub fn send(&self, bytes: &[u8]) -> bool {
        if bytes.is_empty() || bytes.len() > self.shared.config.max_message_size {
            return false;
        }
        if self.shared.state.load(Ordering::SeqCst) != CONNECTED {
            return false;
        }
        match self.shared.inner.lock().as_ref() {
            Some(handles) => {
                handles.send_handle.enqueue(bytes.to_vec());
                true
            }
            None => false,
        }
    }

    /// Non-blocking dequeue of the next event, if any.
    pub fn try_next_event(&self) -> Option<Event> {
        self.shared.events.try_pop()
    }

    pub fn connected(&self) -> bool {
        self.shared.state.load(Ordering::SeqCst) == CONNECTED
    }

    pub fn connecting(&self) -> bool {
        self.shared.state.load(Ordering::SeqCst) == CONNECTING
    }

    /// `"<tag>#<connect_id>"` of the current or most recent connect attempt.
    pub fn ctag(&self) -> String {
        self.shared.ctag.lock().clone()
    }
}

impl Drop for Client {
    fn drop(&mut self) {
        self.disconnect();
    }
}
