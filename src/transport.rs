//! The transport engine: socket lifecycle, address selection, and the two
//! worker threads that turn a blocking stream into an event-driven source.
//!
//! A receive worker turns blocking reads into queued `Event`s; a send
//! worker drains an outgoing queue and batches it onto the wire. Both
//! threads share the connected stream behind a `parking_lot::Mutex`, the
//! same primitive the rest of this crate uses in place of `std::sync::Mutex`
//! (no poisoning to thread through a worker panic path). The receive side
//! sets a short read timeout so it never holds that lock indefinitely,
//! which is what lets the send worker get a turn on an otherwise idle
//! connection.

use std::io;
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use parking_lot::{Condvar, Mutex};

use crate::config::{AddressFamily, ClientConfig};
use crate::error::TransportError;
use crate::event::{Event, EventBuffer, EventQueue};
use crate::framing::{self, ReadOutcome};
use crate::pool::BufferPool;
use crate::queue::SpscQueue;
use crate::stream::ManagedStream;
use crate::tls;

/// How often the receive worker wakes to check its cancellation token, and
/// how long the send worker waits on its condvar when the outgoing queue is
/// empty.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Resolve `host:port` to one address, honoring `family`: numeric IPs
/// resolve trivially via the standard resolver, DNS names are
/// filtered/ordered by family preference, with IPv6 preferred when
/// unspecified ("happy eyeballs", lite).
fn resolve_address(host: &str, port: u16, family: AddressFamily) -> Result<SocketAddr, TransportError> {
    let mut candidates: Vec<SocketAddr> = (host, port).to_socket_addrs()?.collect();

    match family {
        AddressFamily::V4Only => candidates.retain(|a| a.is_ipv4()),
        AddressFamily::V6Only => candidates.retain(|a| a.is_ipv6()),
        AddressFamily::Unspecified => candidates.sort_by_key(|a| if a.is_ipv6() { 0 } else { 1 }),
    }

    candidates.into_iter().next().ok_or(TransportError::NoSuitableAddress)
}

/// Outgoing-side handle shared between the client facade and the send
/// worker: a queue plus a condvar so the worker can sleep when idle instead
/// of busy-polling.
pub struct SendHandle {
    queue: SpscQueue<Vec<u8>>,
    wake_lock: Mutex<bool>,
    wake: Condvar,
}

impl SendHandle {
    fn new() -> Self {
        SendHandle {
            queue: SpscQueue::new(),
            wake_lock: Mutex::new(false),
            wake: Condvar::new(),
        }
    }

    /// Enqueue one already-encoded message for the send worker to batch.
    pub fn enqueue(&self, message: Vec<u8>) {
        self.queue.push(message);
        let mut pending = self.wake_lock.lock();
        *pending = true;
        self.wake.notify_one();
    }

    fn wait_for_work(&self, timeout: Duration) {
        let mut pending = self.wake_lock.lock();
        if !*pending {
            self.wake.wait_for(&mut pending, timeout);
        }
        *pending = false;
    }

    fn wake_now(&self) {
        let mut pending = self.wake_lock.lock();
        *pending = true;
        self.wake.notify_one();
    }
}

/// An established connection's worker threads and shutdown handle.
pub struct Transport {
    cancel: Arc<AtomicBool>,
    send_handle: Arc<SendHandle>,
    recv_thread: Option<JoinHandle<()>>,
    send_thread: Option<JoinHandle<()>>,
}

impl Transport {
    /// Signal both workers to stop and block until they have. The receive
    /// worker enqueues the terminal `Disconnected` event as part of its own
    /// shutdown; the send worker only closes the socket.
    pub fn disconnect(&mut self) {
        self.cancel.store(true, Ordering::SeqCst);
        self.send_handle.wake_now();
        if let Some(h) = self.recv_thread.take() {
            let _ = h.join();
        }
        if let Some(h) = self.send_thread.take() {
            let _ = h.join();
        }
    }
}

impl Drop for Transport {
    fn drop(&mut self) {
        self.disconnect();
    }
}

/// Resolve, connect, optionally TLS-wrap, and spin up the worker threads
/// for one client connection.
pub fn connect(
    host: &str,
    port: u16,
    tag: String,
    config: Arc<ClientConfig>,
    events: Arc<EventQueue>,
    pool: Arc<BufferPool>,
) -> Result<(Transport, Arc<SendHandle>), TransportError> {
    let addr = resolve_address(host, port, config.address_family)?;
    let tcp = TcpStream::connect(addr)?;
    tcp.set_nodelay(config.no_delay)?;
    tcp.set_write_timeout(Some(config.send_timeout))?;

    let stream = match &config.tls {
        Some(opts) => tls::handshake(opts, host, tcp)?,
        None => ManagedStream::Plain(tcp),
    };
    stream.set_read_timeout(Some(POLL_INTERVAL))?;

    events.push_lifecycle(Event::Connected { tag: tag.clone() });

    let stream = Arc::new(Mutex::new(stream));
    let cancel = Arc::new(AtomicBool::new(false));
    let send_handle = Arc::new(SendHandle::new());

    let recv_thread = spawn_receive_worker(
        stream.clone(),
        tag.clone(),
        config.clone(),
        pool,
        events,
        cancel.clone(),
    );
    let send_thread = spawn_send_worker(stream, send_handle.clone(), cancel.clone(), config);

    Ok((
        Transport {
            cancel,
            send_handle: send_handle.clone(),
            recv_thread: Some(recv_thread),
            send_thread: Some(send_thread),
        },
        send_handle,
    ))
}

fn is_timeout(e: &io::Error) -> bool {
    matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut)
}

fn spawn_receive_worker(
    stream: Arc<Mutex<ManagedStream>>,
    tag: String,
    config: Arc<ClientConfig>,
    pool: Arc<BufferPool>,
    events: Arc<EventQueue>,
    cancel: Arc<AtomicBool>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        loop {
            if cancel.load(Ordering::SeqCst) {
                break;
            }

            let outcome = {
                let mut guard = stream.lock();
                framing::read_frame(&mut *guard, config.max_message_size, |n| pool.alloc(n))
            };

            match outcome {
                Ok(ReadOutcome::Ok(payload)) => {
                    let bytes = EventBuffer::new(payload, pool.clone());
                    if !events.push(Event::Data { tag: tag.clone(), bytes }) {
                        log::warn!("receive worker: event queue full, dropping message for {tag}");
                    }
                }
                Ok(ReadOutcome::Closed) => break,
                Err(e) if is_timeout(&e) => continue,
                Err(e) => {
                    log::warn!("receive worker: {e}, disconnecting {tag}");
                    break;
                }
            }
        }

        cancel.store(true, Ordering::SeqCst);
        events.push_lifecycle(Event::Disconnected { tag });
    })
}

fn spawn_send_worker(
    stream: Arc<Mutex<ManagedStream>>,
    handle: Arc<SendHandle>,
    cancel: Arc<AtomicBool>,
    config: Arc<ClientConfig>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        loop {
            if cancel.load(Ordering::SeqCst) {
                break;
            }

            let pending = handle.queue.drain_all();
            if pending.is_empty() {
                handle.wait_for_work(POLL_INTERVAL);
                continue;
            }

            let refs: Vec<&[u8]> = pending.iter().map(Vec::as_slice).collect();
            let batches = framing::build_batches(&refs, config.max_send_buffer);

            let result = {
                let mut guard = stream.lock();
                framing::write_batches(&mut *guard, &batches)
            };

            if let Err(e) = result {
                log::warn!("send worker: {e}, disconnecting");
                break;
            }
        }

        cancel.store(true, Ordering::SeqCst);
        let _ = stream.lock().shutdown();
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_localhost_v4_only_yields_v4() {
        let addr = resolve_address("127.0.0.1", 1, AddressFamily::V4Only).unwrap();
        assert!(addr.is_ipv4());
    }

    #[test]
    fn resolve_localhost_v6_only_yields_v6() {
        let addr = resolve_address("::1", 1, AddressFamily::V6Only).unwrap();
        assert!(addr.is_ipv6());
    }

    #[test]
    fn v4_only_rejects_v6_literal() {
        assert!(resolve_address("::1", 1, AddressFamily::V4Only).is_err());
    }
}
